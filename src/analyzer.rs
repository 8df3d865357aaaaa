//! Remote frame analysis.
//!
//! Frame classification is an opaque external contract: any analyzer
//! that answers the `phone_detected`/`gaze_anomaly` shape is
//! substitutable. Unknown or missing response fields are treated as
//! false.

use crate::backend::{http_client, BackendConfig, BackendError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Result of analyzing a single frame.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct FrameAnalysis {
    /// A phone was visible in the frame
    #[serde(default)]
    pub phone_detected: bool,
    /// Gaze was directed away from the screen
    #[serde(default)]
    pub gaze_anomaly: bool,
}

impl FrameAnalysis {
    /// Whether the analysis flagged anything at all.
    pub fn any_flagged(&self) -> bool {
        self.phone_detected || self.gaze_anomaly
    }
}

/// Wire payload for `POST /api/ml/analyze-frame`.
#[derive(Debug, Serialize)]
struct AnalyzeBody<'a> {
    exam_id: &'a str,
    user_id: &'a str,
    image_b64: &'a str,
}

/// An external classifier for captured frames.
#[async_trait]
pub trait FrameAnalyzer: Send + Sync {
    /// Analyze one base64-encoded frame for the given session.
    async fn analyze(
        &self,
        exam_id: &str,
        user_id: &str,
        image_b64: &str,
    ) -> Result<FrameAnalysis, BackendError>;
}

/// Analyzer backed by the backend's frame-analysis endpoint.
pub struct HttpFrameAnalyzer {
    client: reqwest::Client,
    analyze_url: String,
}

impl HttpFrameAnalyzer {
    pub fn new(backend: &BackendConfig) -> Self {
        Self {
            client: http_client(),
            analyze_url: backend.analyze_url(),
        }
    }
}

#[async_trait]
impl FrameAnalyzer for HttpFrameAnalyzer {
    async fn analyze(
        &self,
        exam_id: &str,
        user_id: &str,
        image_b64: &str,
    ) -> Result<FrameAnalysis, BackendError> {
        let body = AnalyzeBody {
            exam_id,
            user_id,
            image_b64,
        };

        let response = self
            .client
            .post(&self.analyze_url)
            .json(&body)
            .send()
            .await
            .map_err(|e| BackendError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(BackendError::Server {
                status: status.as_u16(),
                message,
            });
        }

        let analysis: FrameAnalysis = response
            .json()
            .await
            .map_err(|e| BackendError::Serialization(e.to_string()))?;

        Ok(analysis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_fields_read_as_false() {
        let analysis: FrameAnalysis = serde_json::from_value(json!({})).unwrap();
        assert!(!analysis.phone_detected);
        assert!(!analysis.gaze_anomaly);
        assert!(!analysis.any_flagged());
    }

    #[test]
    fn test_unknown_fields_ignored() {
        let analysis: FrameAnalysis = serde_json::from_value(json!({
            "phone_detected": true,
            "face_count": 3,
            "model_version": "v2"
        }))
        .unwrap();
        assert!(analysis.phone_detected);
        assert!(!analysis.gaze_anomaly);
        assert!(analysis.any_flagged());
    }

    #[test]
    fn test_analyze_body_shape() {
        let body = AnalyzeBody {
            exam_id: "exam-1",
            user_id: "user-1",
            image_b64: "aGVsbG8=",
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(
            value,
            json!({"exam_id": "exam-1", "user_id": "user-1", "image_b64": "aGVsbG8="})
        );
    }
}
