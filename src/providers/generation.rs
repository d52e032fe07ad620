//! Email generation client for Anthropic messages models on a model host.
//!
//! Speaks the `InvokeModel` shape: the model id lives in the URL and the
//! body carries an `anthropic_version` protocol tag instead of a model field.
//!
//! Requests carry a bearer token when one is configured. Otherwise they are
//! SigV4-signed with credentials from the default AWS chain (env vars,
//! profile, web identity, container or instance role).

use std::time::SystemTime;

use aws_config::{BehaviorVersion, Region};
use aws_credential_types::provider::{ProvideCredentials, SharedCredentialsProvider};
use aws_credential_types::Credentials as AwsCredentials;
use aws_sigv4::http_request::{sign, SignableBody, SignableRequest, SigningParams, SigningSettings};
use aws_sigv4::sign::v4;
use aws_smithy_runtime_api::client::identity::Identity;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::config::GenerationConfig;
use crate::credentials::ApiKey;
use crate::prompt::RenderedPrompt;

use super::{check_http_response, GenerationProvider, ProviderError};

/// Assistant turn that primes the model to answer with bare JSON.
pub const ASSISTANT_PRIMER: &str =
    "Here is your JSON data without additional text before or after:";

/// SigV4 service name for the model host runtime.
pub const SIGNING_NAME: &str = "bedrock";

// ---------------------------------------------------------------------------
// Wire types (pub for integration testing)
// ---------------------------------------------------------------------------

/// Invoke request body.
#[doc(hidden)]
#[derive(Debug, Serialize)]
pub struct GenerationRequest {
    /// Protocol version tag.
    pub anthropic_version: String,
    /// Maximum tokens to generate.
    pub max_tokens: u32,
    /// User prompt followed by the assistant primer.
    pub messages: Vec<GenerationMessage>,
}

/// A message in Anthropic format.
#[doc(hidden)]
#[derive(Debug, Serialize, Deserialize)]
pub struct GenerationMessage {
    /// Role: "user" or "assistant".
    pub role: String,
    /// Content: a block array or a plain string.
    pub content: Value,
}

/// Invoke response body.
#[doc(hidden)]
#[derive(Debug, Deserialize)]
pub struct GenerationResponse {
    /// Content blocks in the response.
    pub content: Vec<GenerationContentBlock>,
}

/// A content block in the response.
#[doc(hidden)]
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GenerationContentBlock {
    /// Text content.
    Text {
        /// The text.
        text: String,
    },
    /// Any block type this client does not read.
    #[serde(other)]
    Other,
}

// ---------------------------------------------------------------------------
// Request / Response builders (pub for integration testing)
// ---------------------------------------------------------------------------

/// Build the invoke request for a rendered prompt.
#[doc(hidden)]
pub fn build_request(config: &GenerationConfig, prompt: &RenderedPrompt) -> GenerationRequest {
    GenerationRequest {
        anthropic_version: config.anthropic_version.clone(),
        max_tokens: config.max_tokens,
        messages: vec![
            GenerationMessage {
                role: "user".to_owned(),
                content: serde_json::json!([{"type": "text", "text": prompt.as_str()}]),
            },
            GenerationMessage {
                role: "assistant".to_owned(),
                content: Value::String(ASSISTANT_PRIMER.to_owned()),
            },
        ],
    }
}

/// Extract `content[0].text` from a response body.
///
/// # Errors
///
/// Returns `ProviderError::Parse` if the body is not the expected shape or the
/// first block is missing or not text.
#[doc(hidden)]
pub fn parse_response(body: &str) -> Result<String, ProviderError> {
    let resp: GenerationResponse =
        serde_json::from_str(body).map_err(|e| ProviderError::Parse(e.to_string()))?;

    match resp.content.into_iter().next() {
        Some(GenerationContentBlock::Text { text }) => Ok(text),
        Some(GenerationContentBlock::Other) => {
            Err(ProviderError::Parse("content[0] is not a text block".to_owned()))
        }
        None => Err(ProviderError::Parse("missing content[0]".to_owned())),
    }
}

// ---------------------------------------------------------------------------
// Auth
// ---------------------------------------------------------------------------

/// How requests to the model host are authenticated.
#[derive(Debug, Clone)]
pub enum HostAuth {
    /// Static `Authorization: Bearer` token.
    Bearer(ApiKey),
    /// SigV4 signing with credentials fetched per request.
    SigV4 {
        /// Credential source, usually the default chain.
        credentials: SharedCredentialsProvider,
        /// Signing region.
        region: String,
    },
}

impl HostAuth {
    /// Bearer auth when a token is set, otherwise SigV4 over the default
    /// AWS credential chain for the configured region.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError::Signing` if the environment yields no
    /// credential provider at all.
    pub async fn resolve(
        config: &GenerationConfig,
        token: Option<ApiKey>,
    ) -> Result<Self, ProviderError> {
        if let Some(token) = token {
            return Ok(Self::Bearer(token));
        }
        let sdk_config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .load()
            .await;
        let credentials = sdk_config.credentials_provider().ok_or_else(|| {
            ProviderError::Signing("no AWS credential provider available".to_owned())
        })?;
        debug!(region = %config.region, "model host requests will be SigV4-signed");
        Ok(Self::SigV4 {
            credentials,
            region: config.region.clone(),
        })
    }
}

/// Compute SigV4 headers for a POST of `body` to `url`.
///
/// `headers` must list every header that will be sent besides the returned
/// ones and `content-length`.
///
/// # Errors
///
/// Returns `ProviderError::Signing` if the request cannot be signed.
#[doc(hidden)]
pub fn sigv4_headers(
    credentials: AwsCredentials,
    region: &str,
    url: &str,
    headers: &[(&str, &str)],
    body: &[u8],
    time: SystemTime,
) -> Result<Vec<(String, String)>, ProviderError> {
    let identity: Identity = credentials.into();
    let params: SigningParams<'_> = v4::SigningParams::builder()
        .identity(&identity)
        .region(region)
        .name(SIGNING_NAME)
        .time(time)
        .settings(SigningSettings::default())
        .build()
        .map_err(|e| ProviderError::Signing(e.to_string()))?
        .into();
    let signable = SignableRequest::new(
        "POST",
        url,
        headers.iter().copied(),
        SignableBody::Bytes(body),
    )
    .map_err(|e| ProviderError::Signing(e.to_string()))?;
    let (instructions, _signature) = sign(signable, &params)
        .map_err(|e| ProviderError::Signing(e.to_string()))?
        .into_parts();
    Ok(instructions
        .headers()
        .map(|(name, value)| (name.to_owned(), value.to_owned()))
        .collect())
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

const BASE_HEADERS: [(&str, &str); 2] = [
    ("content-type", "application/json"),
    ("accept", "application/json"),
];

/// Model host client.
#[derive(Debug, Clone)]
pub struct GenerationClient {
    config: GenerationConfig,
    auth: HostAuth,
    client: reqwest::Client,
}

impl GenerationClient {
    /// Create a client with the given auth mode.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError::Request` if the HTTP client cannot be built.
    pub fn new(config: &GenerationConfig, auth: HostAuth) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()?;
        Ok(Self {
            config: config.clone(),
            auth,
            client,
        })
    }

    async fn auth_headers(
        &self,
        url: &str,
        body: &[u8],
    ) -> Result<Vec<(String, String)>, ProviderError> {
        match &self.auth {
            HostAuth::Bearer(token) => Ok(vec![(
                "authorization".to_owned(),
                format!("Bearer {}", token.expose()),
            )]),
            HostAuth::SigV4 { credentials, region } => {
                let credentials = credentials.provide_credentials().await.map_err(|e| {
                    ProviderError::Signing(format!("failed to load AWS credentials: {e}"))
                })?;
                sigv4_headers(credentials, region, url, &BASE_HEADERS, body, SystemTime::now())
            }
        }
    }
}

#[async_trait::async_trait]
impl GenerationProvider for GenerationClient {
    async fn generate(&self, prompt: &RenderedPrompt) -> Result<String, ProviderError> {
        info!(model_id = %self.config.model_id, "generating email draft");
        let url = self.config.invoke_url();
        let body = serde_json::to_vec(&build_request(&self.config, prompt))
            .map_err(|e| ProviderError::Parse(e.to_string()))?;

        let mut builder = self.client.post(&url);
        for (name, value) in BASE_HEADERS {
            builder = builder.header(name, value);
        }
        for (name, value) in self.auth_headers(&url, &body).await? {
            builder = builder.header(name, value);
        }

        let response = builder.body(body).send().await?;

        let payload = check_http_response(response).await?;
        parse_response(&payload)
    }
}
