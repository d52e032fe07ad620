//! One invocation, end to end: decode, research, render, generate, extract.
//!
//! Every stage runs strictly after the previous one. Any failure ends the
//! invocation; nothing is retried.

use std::fmt;
use std::sync::Arc;

use tracing::{info, warn, Instrument};

use crate::campaign::{CampaignRequest, EmailDraft};
use crate::config::Config;
use crate::credentials::Credentials;
use crate::extract::extract_json_object;
use crate::prompt::render;
use crate::providers::generation::{GenerationClient, HostAuth};
use crate::providers::research::ResearchClient;
use crate::providers::{GenerationProvider, ProviderError, ResearchProvider};

/// Which upstream call failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpstreamStage {
    /// Company research call.
    Research,
    /// Email generation call.
    Generation,
}

impl fmt::Display for UpstreamStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Research => f.write_str("research"),
            Self::Generation => f.write_str("generation"),
        }
    }
}

/// Invocation failures.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Inbound body is not JSON or lacks a required field.
    #[error("malformed request: {0}")]
    MalformedRequest(String),
    /// An upstream API call failed.
    #[error("{stage} upstream failed: {source}")]
    Upstream {
        /// Failing call.
        stage: UpstreamStage,
        /// Underlying provider error.
        #[source]
        source: ProviderError,
    },
    /// No parseable JSON object in the model reply.
    #[error("no parseable JSON object in model reply")]
    ExtractionFailure,
    /// Parsed JSON lacks a required string field.
    #[error("model reply is missing string field `{0}`")]
    MissingField(&'static str),
}

impl PipelineError {
    /// HTTP status code callers should see.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::MalformedRequest(_) => 400,
            Self::Upstream { source, .. } if source.is_timeout() => 504,
            Self::Upstream { .. } => 502,
            Self::ExtractionFailure | Self::MissingField(_) => 422,
        }
    }

    /// Stable machine-readable kind for error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MalformedRequest(_) => "malformed_request",
            Self::Upstream { .. } => "upstream_error",
            Self::ExtractionFailure => "extraction_failure",
            Self::MissingField(_) => "missing_field",
        }
    }
}

/// Runs invocations against a research and a generation backend.
#[derive(Clone)]
pub struct EmailPipeline {
    research: Arc<dyn ResearchProvider>,
    generation: Arc<dyn GenerationProvider>,
}

impl EmailPipeline {
    /// Build a pipeline over arbitrary backends.
    pub fn new(
        research: Arc<dyn ResearchProvider>,
        generation: Arc<dyn GenerationProvider>,
    ) -> Self {
        Self {
            research,
            generation,
        }
    }

    /// Build the HTTP-backed pipeline from config and resolved secrets.
    ///
    /// # Errors
    ///
    /// Returns an error if either HTTP client cannot be constructed or no
    /// model host auth is available.
    pub async fn from_config(config: &Config, credentials: Credentials) -> anyhow::Result<Self> {
        let research = ResearchClient::new(&config.research, credentials.research)?;
        let auth = HostAuth::resolve(&config.generation, credentials.generation).await?;
        let generation = GenerationClient::new(&config.generation, auth)?;
        Ok(Self::new(Arc::new(research), Arc::new(generation)))
    }

    /// Decode a raw request body and run it.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError`] for the first stage that fails.
    pub async fn handle_body(&self, body: &[u8]) -> Result<EmailDraft, PipelineError> {
        let request_id = uuid::Uuid::new_v4();
        let span = tracing::info_span!("invocation", %request_id);
        self.decode_and_run(body).instrument(span).await
    }

    async fn decode_and_run(&self, body: &[u8]) -> Result<EmailDraft, PipelineError> {
        let outcome = match CampaignRequest::decode(body) {
            Ok(request) => self.run(&request).await,
            Err(e) => Err(e),
        };
        if let Err(e) = &outcome {
            warn!(error = %e, status = e.status_code(), "invocation failed");
        }
        outcome
    }

    /// Run one decoded request through research, prompt, generation and extraction.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError`] for the first stage that fails.
    pub async fn run(&self, request: &CampaignRequest) -> Result<EmailDraft, PipelineError> {
        info!(company = %request.company_name, "starting email generation");

        let research = self
            .research
            .research(request)
            .await
            .map_err(|source| PipelineError::Upstream {
                stage: UpstreamStage::Research,
                source,
            })?;

        let prompt = render(request, &research);

        let reply = self
            .generation
            .generate(&prompt)
            .await
            .map_err(|source| PipelineError::Upstream {
                stage: UpstreamStage::Generation,
                source,
            })?;

        let draft = EmailDraft::from_extracted(extract_json_object(&reply))?;
        info!(subject = %draft.email_subject, "email draft ready");
        Ok(draft)
    }
}
