//! Company research client for Perplexity-style `/chat/completions` APIs.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::campaign::CampaignRequest;
use crate::config::ResearchConfig;
use crate::credentials::ApiKey;
use crate::prompt::ResearchResult;

use super::{check_http_response, ProviderError, ResearchProvider};

const TEMPERATURE: f64 = 0.2;
const TOP_P: f64 = 0.9;
const TOP_K: u32 = 0;
const PRESENCE_PENALTY: f64 = 0.0;
const FREQUENCY_PENALTY: f64 = 1.0;
const SEARCH_CONTEXT_SIZE: &str = "low";

// ---------------------------------------------------------------------------
// Wire types (pub for integration testing)
// ---------------------------------------------------------------------------

/// Chat completions request body.
#[doc(hidden)]
#[derive(Debug, Serialize)]
pub struct ResearchRequest {
    /// Model identifier.
    pub model: String,
    /// Single user message carrying the research query.
    pub messages: Vec<ResearchMessage>,
    /// Sampling temperature.
    pub temperature: f64,
    /// Nucleus sampling bound.
    pub top_p: f64,
    /// Top-k sampling (0 disables).
    pub top_k: u32,
    /// Streaming flag; always false.
    pub stream: bool,
    /// Presence penalty.
    pub presence_penalty: f64,
    /// Frequency penalty.
    pub frequency_penalty: f64,
    /// Whether to attach image results.
    pub return_images: bool,
    /// Whether to suggest follow-up questions.
    pub return_related_questions: bool,
    /// Web search tuning.
    pub web_search_options: WebSearchOptions,
}

/// A chat message.
#[doc(hidden)]
#[derive(Debug, Serialize)]
pub struct ResearchMessage {
    /// Role; always `user`.
    pub role: String,
    /// Message text.
    pub content: String,
}

/// Web search tuning options.
#[doc(hidden)]
#[derive(Debug, Serialize)]
pub struct WebSearchOptions {
    /// How much retrieved context the model may use.
    pub search_context_size: String,
}

/// Chat completions response body. Only the path we read is modelled.
#[doc(hidden)]
#[derive(Debug, Deserialize)]
pub struct ResearchResponse {
    /// Response choices.
    pub choices: Vec<ResearchChoice>,
}

/// A response choice.
#[doc(hidden)]
#[derive(Debug, Deserialize)]
pub struct ResearchChoice {
    /// Assistant message for this choice.
    pub message: ResearchResponseMessage,
}

/// Assistant message in a choice.
#[doc(hidden)]
#[derive(Debug, Deserialize)]
pub struct ResearchResponseMessage {
    /// Text content.
    pub content: Option<String>,
}

// ---------------------------------------------------------------------------
// Request / Response builders (pub for integration testing)
// ---------------------------------------------------------------------------

/// Build the natural-language research query for a prospect.
pub fn research_query(
    company_url: &str,
    company_description: &str,
    vendor_description: &str,
) -> String {
    format!(
        "Make a research about this company {company_url} ({company_description}) and give \
         description about their business and most common pain points they might face right now \
         that might be solved with our services/products provided by our company \
         ({vendor_description})."
    )
}

/// Build the API request body for a query.
#[doc(hidden)]
pub fn build_request(model: &str, query: String) -> ResearchRequest {
    ResearchRequest {
        model: model.to_owned(),
        messages: vec![ResearchMessage {
            role: "user".to_owned(),
            content: query,
        }],
        temperature: TEMPERATURE,
        top_p: TOP_P,
        top_k: TOP_K,
        stream: false,
        presence_penalty: PRESENCE_PENALTY,
        frequency_penalty: FREQUENCY_PENALTY,
        return_images: false,
        return_related_questions: false,
        web_search_options: WebSearchOptions {
            search_context_size: SEARCH_CONTEXT_SIZE.to_owned(),
        },
    }
}

/// Extract `choices[0].message.content` from a response body.
///
/// # Errors
///
/// Returns `ProviderError::Parse` if the body is not the expected shape or
/// the first choice has no text.
#[doc(hidden)]
pub fn parse_response(body: &str) -> Result<ResearchResult, ProviderError> {
    let resp: ResearchResponse =
        serde_json::from_str(body).map_err(|e| ProviderError::Parse(e.to_string()))?;

    resp.choices
        .into_iter()
        .next()
        .ok_or_else(|| ProviderError::Parse("missing choices[0]".to_owned()))?
        .message
        .content
        .map(ResearchResult::new)
        .ok_or_else(|| ProviderError::Parse("missing choices[0].message.content".to_owned()))
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Research API client.
#[derive(Debug, Clone)]
pub struct ResearchClient {
    endpoint: String,
    model: String,
    api_key: ApiKey,
    client: reqwest::Client,
}

impl ResearchClient {
    /// Create a client from config and an API key.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError::Request` if the HTTP client cannot be built.
    pub fn new(config: &ResearchConfig, api_key: ApiKey) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()?;
        Ok(Self {
            endpoint: config.endpoint.clone(),
            model: config.model.clone(),
            api_key,
            client,
        })
    }
}

#[async_trait::async_trait]
impl ResearchProvider for ResearchClient {
    async fn research(&self, request: &CampaignRequest) -> Result<ResearchResult, ProviderError> {
        info!(company_url = %request.company_url, "retrieving company research");
        let query = research_query(
            &request.company_url,
            &request.company_description,
            &request.vendor_description,
        );
        let api_request = build_request(&self.model, query);

        let response = self
            .client
            .post(&self.endpoint)
            .header("content-type", "application/json")
            .header("authorization", format!("Bearer {}", self.api_key.expose()))
            .json(&api_request)
            .send()
            .await?;

        let payload = check_http_response(response).await?;
        let result = parse_response(&payload)?;
        debug!(research = %result.as_str(), "company research retrieved");
        Ok(result)
    }
}
