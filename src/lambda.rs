//! Serverless event envelope.
//!
//! Function-URL and API-gateway style events carry the request as a string
//! in `body`, optionally base64-encoded. The reply envelope mirrors that
//! shape with a `statusCode` and a string `body`.

use std::collections::BTreeMap;

use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::pipeline::{EmailPipeline, PipelineError};
use crate::server::error_body;

/// Inbound serverless event. Other event fields are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LambdaEvent {
    /// Raw request body.
    #[serde(default)]
    pub body: Option<String>,
    /// Whether `body` is base64-encoded.
    #[serde(default)]
    pub is_base64_encoded: bool,
}

/// Outbound serverless response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LambdaResponse {
    /// HTTP status code.
    pub status_code: u16,
    /// Response headers.
    pub headers: BTreeMap<String, String>,
    /// JSON-encoded response body.
    pub body: String,
}

impl LambdaResponse {
    fn json(status_code: u16, body: String) -> Self {
        let mut headers = BTreeMap::new();
        headers.insert("Content-Type".to_owned(), "application/json".to_owned());
        Self {
            status_code,
            headers,
            body,
        }
    }
}

impl LambdaEvent {
    /// Decoded body bytes.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::MalformedRequest`] when the body is absent or
    /// flagged base64 but not valid base64.
    pub fn body_bytes(&self) -> Result<Vec<u8>, PipelineError> {
        let body = self
            .body
            .as_deref()
            .ok_or_else(|| PipelineError::MalformedRequest("event has no body".to_owned()))?;
        if self.is_base64_encoded {
            base64::engine::general_purpose::STANDARD
                .decode(body)
                .map_err(|e| PipelineError::MalformedRequest(format!("invalid base64 body: {e}")))
        } else {
            Ok(body.as_bytes().to_vec())
        }
    }
}

/// Run one serverless event through the pipeline.
pub async fn handle_event(pipeline: &EmailPipeline, event: &LambdaEvent) -> LambdaResponse {
    let outcome = match event.body_bytes() {
        Ok(body) => pipeline.handle_body(&body).await,
        Err(e) => Err(e),
    };

    match outcome {
        Ok(draft) => match serde_json::to_string(&draft) {
            Ok(body) => LambdaResponse::json(200, body),
            Err(e) => LambdaResponse::json(
                500,
                serde_json::json!({"error": "internal", "message": e.to_string()}).to_string(),
            ),
        },
        Err(e) => LambdaResponse::json(e.status_code(), error_body(&e).to_string()),
    }
}
