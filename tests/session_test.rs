//! Integration tests driving the agent against an in-process mock backend.

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use proctor_agent::{
    BackendConfig, Config, EventType, FrameSampler, HttpFrameAnalyzer, Session,
    SessionController, Severity, SimulatedCamera, SummaryPoller,
};
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;

/// Scriptable stand-in for the collector backend.
struct MockBackend {
    /// Event bodies received on POST /api/proctor/events
    events: Mutex<Vec<Value>>,
    /// Analyze bodies received on POST /api/ml/analyze-frame
    analyze_requests: Mutex<Vec<Value>>,
    /// Response served for frame analysis
    analysis: Mutex<Value>,
    /// Scripted summary responses; the last one repeats
    summaries: Mutex<VecDeque<Value>>,
    /// Force failures per endpoint
    fail_events: AtomicBool,
    fail_summary: AtomicBool,
}

impl MockBackend {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            events: Mutex::new(Vec::new()),
            analyze_requests: Mutex::new(Vec::new()),
            analysis: Mutex::new(json!({"phone_detected": false, "gaze_anomaly": false})),
            summaries: Mutex::new(VecDeque::new()),
            fail_events: AtomicBool::new(false),
            fail_summary: AtomicBool::new(false),
        })
    }

    fn received_events(&self) -> Vec<Value> {
        self.events.lock().unwrap().clone()
    }

    fn push_summary(&self, summary: Value) {
        self.summaries.lock().unwrap().push_back(summary);
    }

    fn set_analysis(&self, analysis: Value) {
        *self.analysis.lock().unwrap() = analysis;
    }
}

async fn handle_events(
    State(backend): State<Arc<MockBackend>>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    if backend.fail_events.load(Ordering::SeqCst) {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": "collector offline"})),
        );
    }
    backend.events.lock().unwrap().push(body);
    (StatusCode::OK, Json(json!({"status": "ok"})))
}

async fn handle_analyze(
    State(backend): State<Arc<MockBackend>>,
    Json(body): Json<Value>,
) -> Json<Value> {
    backend.analyze_requests.lock().unwrap().push(body);
    Json(backend.analysis.lock().unwrap().clone())
}

async fn handle_summary(
    State(backend): State<Arc<MockBackend>>,
) -> (StatusCode, Json<Value>) {
    if backend.fail_summary.load(Ordering::SeqCst) {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({"error": "scoring offline"})),
        );
    }

    let mut summaries = backend.summaries.lock().unwrap();
    let summary = if summaries.len() > 1 {
        summaries.pop_front().unwrap()
    } else {
        summaries
            .front()
            .cloned()
            .unwrap_or_else(|| json!({
                "total_events": 0,
                "suspicion_score": 0.0,
                "suspicion_level": "low",
                "counts": {}
            }))
    };
    (StatusCode::OK, Json(summary))
}

async fn start_backend() -> (SocketAddr, Arc<MockBackend>) {
    let backend = MockBackend::new();

    let app = Router::new()
        .route("/api/proctor/events", post(handle_events))
        .route("/api/ml/analyze-frame", post(handle_analyze))
        .route("/api/proctor/summary", get(handle_summary))
        .with_state(backend.clone());

    let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0)))
        .await
        .expect("Failed to bind mock backend");
    let addr = listener.local_addr().expect("Failed to read local addr");

    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    // Give the server time to start
    tokio::time::sleep(Duration::from_millis(50)).await;

    (addr, backend)
}

fn config_for(addr: SocketAddr) -> Config {
    Config {
        backend: BackendConfig::new(format!("http://{addr}")),
        ..Config::default()
    }
}

fn controller_for(config: Config, camera: Arc<SimulatedCamera>) -> SessionController {
    let analyzer = Arc::new(HttpFrameAnalyzer::new(&config.backend));
    SessionController::new(config, camera, analyzer)
}

#[tokio::test]
async fn test_manual_emission_reaches_backend_and_log() {
    let (addr, backend) = start_backend().await;
    let mut controller = controller_for(config_for(addr), Arc::new(SimulatedCamera::new()));

    let joined = chrono::Utc::now();
    controller
        .join("demo-exam-1", "student-001", Some("Alex Student".to_string()))
        .expect("join should succeed");

    controller.simulate(EventType::MultiFace, Severity::High);

    // Delivery is fire-and-forget; give the spawned POST time to land.
    tokio::time::sleep(Duration::from_millis(300)).await;

    let events = controller.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].event_type, EventType::MultiFace);
    assert_eq!(events[0].severity, Severity::High);
    assert!(events[0].timestamp >= joined);

    let received = backend.received_events();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0]["exam_id"], "demo-exam-1");
    assert_eq!(received[0]["user_id"], "student-001");
    assert_eq!(received[0]["event_type"], "multi_face");
    assert_eq!(received[0]["severity"], "high");

    controller.leave();
}

#[tokio::test]
async fn test_delivery_failures_do_not_block_logging() {
    let (addr, backend) = start_backend().await;
    backend.fail_events.store(true, Ordering::SeqCst);

    let mut controller = controller_for(config_for(addr), Arc::new(SimulatedCamera::new()));
    controller
        .join("exam-1", "user-1", None)
        .expect("join should succeed");

    controller.simulate(EventType::TabBlur, Severity::Medium);
    controller.simulate(EventType::MultiFace, Severity::High);
    controller.simulate(EventType::ScreenShare, Severity::High);

    tokio::time::sleep(Duration::from_millis(300)).await;

    // All three deliveries failed; the log still grew by three, in order.
    let events = controller.events();
    assert_eq!(events.len(), 3);
    assert_eq!(events[0].event_type, EventType::ScreenShare);
    assert_eq!(events[1].event_type, EventType::MultiFace);
    assert_eq!(events[2].event_type, EventType::TabBlur);
    assert!(backend.received_events().is_empty());

    controller.leave();
}

#[tokio::test]
async fn test_summary_polls_replace_snapshot_fully() {
    let (addr, backend) = start_backend().await;
    backend.push_summary(json!({
        "total_events": 2,
        "suspicion_score": 1.0,
        "suspicion_level": "low",
        "counts": {"tab_blur": 2}
    }));
    backend.push_summary(json!({
        "total_events": 7,
        "suspicion_score": 4.2,
        "suspicion_level": "high",
        "counts": {"phone_detected": 7}
    }));

    let session = Session::new("exam-1", "user-1", None).unwrap();
    let poller = SummaryPoller::new(&BackendConfig::new(format!("http://{addr}")), &session);

    let first = poller.refresh().await.expect("first poll should succeed");
    assert_eq!(first.total_events, 2);

    let second = poller.refresh().await.expect("second poll should succeed");
    assert_eq!(second.total_events, 7);
    assert_eq!(second.suspicion_level, "high");

    // Full replacement: no merging of counts from the stale payload.
    let latest = poller.latest().unwrap();
    assert_eq!(latest.total_events, 7);
    assert_eq!(latest.counts.get("phone_detected"), Some(&7));
    assert!(!latest.counts.contains_key("tab_blur"));
}

#[tokio::test]
async fn test_summary_failure_keeps_stale_snapshot() {
    let (addr, backend) = start_backend().await;
    backend.push_summary(json!({
        "total_events": 5,
        "suspicion_score": 2.5,
        "suspicion_level": "medium",
        "counts": {"tab_blur": 5}
    }));

    let session = Session::new("exam-1", "user-1", None).unwrap();
    let poller = SummaryPoller::new(&BackendConfig::new(format!("http://{addr}")), &session);

    poller.refresh().await.expect("seed poll should succeed");
    backend.fail_summary.store(true, Ordering::SeqCst);
    assert!(poller.refresh().await.is_err());

    let kept = poller.latest().expect("snapshot must be retained");
    assert_eq!(kept.total_events, 5);
    assert_eq!(kept.suspicion_level, "medium");
}

#[tokio::test]
async fn test_poller_refreshes_immediately_on_session_start() {
    let (addr, backend) = start_backend().await;
    backend.push_summary(json!({
        "total_events": 3,
        "suspicion_score": 1.5,
        "suspicion_level": "low",
        "counts": {"tab_blur": 3}
    }));

    let mut controller = controller_for(config_for(addr), Arc::new(SimulatedCamera::new()));
    controller
        .join("exam-1", "user-1", None)
        .expect("join should succeed");

    // The poll loop fires once at start, well before the 5s interval.
    tokio::time::sleep(Duration::from_millis(300)).await;
    let summary = controller.summary().expect("immediate poll should have landed");
    assert_eq!(summary.total_events, 3);

    controller.leave();
    assert!(controller.summary().is_none());
}

#[tokio::test]
async fn test_frame_sampling_pipeline_emits_and_reports() {
    let (addr, backend) = start_backend().await;
    backend.set_analysis(json!({"phone_detected": true, "gaze_anomaly": false}));

    let backend_config = BackendConfig::new(format!("http://{addr}"));
    let session = Session::new("exam-1", "user-1", None).unwrap();
    let log = proctor_agent::create_shared_log();
    let emitter = proctor_agent::EventEmitter::new(
        session,
        log.clone(),
        proctor_agent::ReportingChannel::new(&backend_config),
    );
    let sampler = FrameSampler::new(
        emitter,
        Arc::new(SimulatedCamera::ready()),
        Arc::new(HttpFrameAnalyzer::new(&backend_config)),
        Duration::from_secs(7),
    );

    assert!(sampler.sample_once().await);
    tokio::time::sleep(Duration::from_millis(300)).await;

    // The analyzer saw the session identity and a base64 frame payload.
    let analyze_requests = backend.analyze_requests.lock().unwrap().clone();
    assert_eq!(analyze_requests.len(), 1);
    assert_eq!(analyze_requests[0]["exam_id"], "exam-1");
    assert!(analyze_requests[0]["image_b64"]
        .as_str()
        .is_some_and(|b64| !b64.is_empty()));

    // The verdict became a canonical event, locally and at the collector.
    let events = log.snapshot();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].event_type, EventType::PhoneDetected);
    assert_eq!(events[0].severity, Severity::Medium);

    let received = backend.received_events();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0]["event_type"], "phone_detected");
}

#[tokio::test]
async fn test_frame_sampling_skips_before_camera_ready() {
    let (addr, backend) = start_backend().await;
    backend.set_analysis(json!({"phone_detected": true, "gaze_anomaly": true}));

    let mut controller = controller_for(config_for(addr), Arc::new(SimulatedCamera::new()));
    controller
        .join("exam-1", "user-1", None)
        .expect("join should succeed");

    // Immediately after join, camera negotiation has not completed:
    // nothing may reach the analyzer.
    tokio::time::sleep(Duration::from_millis(300)).await;
    assert!(backend.analyze_requests.lock().unwrap().is_empty());
    assert!(controller.events().is_empty());

    controller.leave();
}
