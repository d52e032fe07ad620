//! Upstream model API clients.
//!
//! Two providers back one invocation, called strictly in sequence:
//! - [`research::ResearchClient`]: Perplexity-style `/chat/completions` API
//! - [`generation::GenerationClient`]: Anthropic messages API on a model host
//!
//! Both sit behind small traits so the pipeline can be driven by stubs.

use async_trait::async_trait;
use regex::Regex;

use crate::campaign::CampaignRequest;
use crate::prompt::{RenderedPrompt, ResearchResult};

pub mod generation;
pub mod research;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors returned by upstream model providers.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// HTTP transport failure (connect, timeout, body read).
    #[error("provider request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// Response did not match expected schema.
    #[error("provider response parse error: {0}")]
    Parse(String),
    /// Credentials could not be loaded or the request could not be signed.
    #[error("provider request signing failed: {0}")]
    Signing(String),
    /// Upstream provider responded with an error status.
    #[error("provider returned non-success status {status}: {body}")]
    HttpStatus {
        /// HTTP status code.
        status: u16,
        /// Sanitized response body.
        body: String,
    },
}

impl ProviderError {
    /// Whether the failure was the client-side request timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Request(e) if e.is_timeout())
    }
}

// ---------------------------------------------------------------------------
// HTTP helpers
// ---------------------------------------------------------------------------

/// Check HTTP response status and return body text or a structured error.
///
/// # Errors
///
/// Returns `ProviderError::Request` on transport failure, `ProviderError::HttpStatus` on non-2xx.
pub async fn check_http_response(response: reqwest::Response) -> Result<String, ProviderError> {
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        return Err(ProviderError::HttpStatus {
            status: status.as_u16(),
            body: sanitize_http_error_body(&body),
        });
    }
    Ok(body)
}

fn sanitize_http_error_body(raw: &str) -> String {
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");

    let mut sanitized = collapsed;
    for pattern in [
        r"pplx-[A-Za-z0-9]{16,}",
        r"sk-ant-[A-Za-z0-9_\-]{10,}",
        r"ABSK[A-Za-z0-9+/=]{20,}",
        r"AKIA[A-Z0-9]{16}",
        r"Bearer\s+[A-Za-z0-9._\-+/=]{16,}",
    ] {
        if let Ok(regex) = Regex::new(pattern) {
            sanitized = regex.replace_all(&sanitized, "[REDACTED]").into_owned();
        }
    }

    const MAX_ERROR_BODY_CHARS: usize = 256;
    if sanitized.chars().count() > MAX_ERROR_BODY_CHARS {
        let shortened = sanitized
            .chars()
            .take(MAX_ERROR_BODY_CHARS)
            .collect::<String>();
        return format!("{shortened}...[truncated]");
    }

    sanitized
}

// ---------------------------------------------------------------------------
// Traits
// ---------------------------------------------------------------------------

/// Company research backend.
#[async_trait]
pub trait ResearchProvider: Send + Sync {
    /// Research the prospect named in `request` and return free-text analysis.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] on API, network, or parse failure.
    async fn research(&self, request: &CampaignRequest) -> Result<ResearchResult, ProviderError>;
}

/// Email generation backend.
#[async_trait]
pub trait GenerationProvider: Send + Sync {
    /// Submit the rendered prompt and return the model's raw text reply.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] on API, network, or parse failure.
    async fn generate(&self, prompt: &RenderedPrompt) -> Result<String, ProviderError>;
}
