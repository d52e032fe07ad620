//! Configuration loading and validation.
//!
//! Loads from `./outreach.toml` (or `$OUTREACH_CONFIG_PATH`). A missing file
//! yields defaults that point at the public Perplexity and Bedrock endpoints.
//!
//! Precedence: env vars > config file > defaults.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use serde::Deserialize;

const CONFIG_PATH_ENV: &str = "OUTREACH_CONFIG_PATH";
const DEFAULT_CONFIG_FILE: &str = "outreach.toml";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Inbound HTTP server settings.
    pub server: ServerConfig,
    /// Company research API settings.
    pub research: ResearchConfig,
    /// Email generation API settings.
    pub generation: GenerationConfig,
    /// Log output settings.
    pub logging: LoggingConfig,
}

/// Inbound HTTP server settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Listen address.
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8080".to_owned(),
        }
    }
}

/// Research API (`/chat/completions`) settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ResearchConfig {
    /// Full chat-completions URL.
    pub endpoint: String,
    /// Model identifier sent in the request body.
    pub model: String,
    /// Environment variable holding the bearer API key.
    pub api_key_env: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for ResearchConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.perplexity.ai/chat/completions".to_owned(),
            model: "sonar".to_owned(),
            api_key_env: "X_API_KEY".to_owned(),
            timeout_secs: 60,
        }
    }
}

impl ResearchConfig {
    /// Request timeout as a [`Duration`].
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Generation API (model host `InvokeModel`) settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Model host base URL; `/model/{model_id}/invoke` is appended.
    pub endpoint: String,
    /// Hosted model identifier.
    pub model_id: String,
    /// Protocol tag sent as `anthropic_version` in the body.
    pub anthropic_version: String,
    /// Upper bound on generated tokens.
    pub max_tokens: u32,
    /// Region used for SigV4 request signing.
    pub region: String,
    /// Environment variable holding an optional bearer token for the host.
    pub api_key_env: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://bedrock-runtime.us-east-1.amazonaws.com".to_owned(),
            model_id: "anthropic.claude-3-5-sonnet-20240620-v1:0".to_owned(),
            anthropic_version: "bedrock-2023-05-31".to_owned(),
            max_tokens: 3000,
            region: "us-east-1".to_owned(),
            api_key_env: "AWS_BEARER_TOKEN_BEDROCK".to_owned(),
            timeout_secs: 120,
        }
    }
}

impl GenerationConfig {
    /// Request timeout as a [`Duration`].
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Full invoke URL for the configured model.
    ///
    /// `:` in the model id is percent-encoded, matching the path the AWS
    /// SDKs sign.
    pub fn invoke_url(&self) -> String {
        format!(
            "{}/model/{}/invoke",
            self.endpoint.trim_end_matches('/'),
            self.model_id.replace(':', "%3A")
        )
    }
}

/// Log output settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset.
    pub level: String,
    /// Emit one JSON object per line on stdout instead of console text.
    pub json: bool,
    /// Optional directory for daily-rotated JSON log files.
    pub dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            json: false,
            dir: None,
        }
    }
}

impl Config {
    /// Load configuration with precedence: env vars > TOML file > defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if an existing config file cannot be read or parsed,
    /// or the merged configuration fails validation.
    pub fn load() -> anyhow::Result<Self> {
        Self::load_with(|key| std::env::var(key).ok())
    }

    /// Load configuration resolving environment lookups through `env`.
    ///
    /// # Errors
    ///
    /// See [`Config::load`].
    pub fn load_with(env: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let path = env(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
        let mut config = match std::fs::read_to_string(&path) {
            Ok(contents) => Self::from_toml(&contents)
                .with_context(|| format!("failed to parse config at {}", path.display()))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Self::default(),
            Err(e) => {
                return Err(anyhow::anyhow!(
                    "failed to read config at {}: {e}",
                    path.display()
                ))
            }
        };
        config.apply_overrides(env);
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML string into config without env overrides or validation.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is malformed or has mistyped values.
    pub fn from_toml(toml_str: &str) -> anyhow::Result<Self> {
        toml::from_str(toml_str).context("failed to parse config TOML")
    }

    /// Apply environment variable overrides (env > config > defaults).
    ///
    /// Takes a resolver function so tests never touch process env.
    pub fn apply_overrides(&mut self, env: impl Fn(&str) -> Option<String>) {
        if let Some(v) = env("OUTREACH_BIND") {
            self.server.bind = v;
        }
        if let Some(v) = env("OUTREACH_RESEARCH_ENDPOINT") {
            self.research.endpoint = v;
        }
        if let Some(v) = env("OUTREACH_RESEARCH_MODEL") {
            self.research.model = v;
        }
        if let Some(v) = env("OUTREACH_GENERATION_ENDPOINT") {
            self.generation.endpoint = v;
        }
        if let Some(v) = env("OUTREACH_GENERATION_MODEL_ID") {
            self.generation.model_id = v;
        }
        if let Some(v) = env("OUTREACH_GENERATION_REGION") {
            self.generation.region = v;
        }
        if let Some(v) = env("OUTREACH_LOG_LEVEL") {
            self.logging.level = v;
        }
        if let Some(v) = env("OUTREACH_LOG_JSON") {
            match v.parse() {
                Ok(flag) => self.logging.json = flag,
                Err(_) => tracing::warn!(
                    var = "OUTREACH_LOG_JSON",
                    value = %v,
                    "ignoring invalid env override"
                ),
            }
        }
    }

    /// Check values that serde cannot.
    ///
    /// # Errors
    ///
    /// Returns an error naming the first invalid setting.
    pub fn validate(&self) -> anyhow::Result<()> {
        self.bind_addr()?;
        validate_endpoint("research.endpoint", &self.research.endpoint)?;
        validate_endpoint("generation.endpoint", &self.generation.endpoint)?;
        if self.research.model.trim().is_empty() {
            anyhow::bail!("research.model must not be empty");
        }
        if self.generation.model_id.trim().is_empty() {
            anyhow::bail!("generation.model_id must not be empty");
        }
        if self.generation.region.trim().is_empty() {
            anyhow::bail!("generation.region must not be empty");
        }
        if self.generation.max_tokens == 0 {
            anyhow::bail!("generation.max_tokens must be greater than zero");
        }
        if self.research.timeout_secs == 0 || self.generation.timeout_secs == 0 {
            anyhow::bail!("timeouts must be greater than zero");
        }
        Ok(())
    }

    /// Parsed listen address.
    ///
    /// # Errors
    ///
    /// Returns an error if `server.bind` is not a socket address.
    pub fn bind_addr(&self) -> anyhow::Result<SocketAddr> {
        self.server
            .bind
            .parse()
            .with_context(|| format!("invalid server.bind {:?}", self.server.bind))
    }
}

fn validate_endpoint(name: &str, raw: &str) -> anyhow::Result<()> {
    let parsed = url::Url::parse(raw).with_context(|| format!("{name} is not a URL: {raw:?}"))?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => anyhow::bail!("{name} must use http or https, found {other:?}"),
    }
}

/// Load a config file from an explicit path, then apply process env overrides.
///
/// # Errors
///
/// Returns an error if the file cannot be read, parsed, or validated.
pub fn load_config(path: &Path) -> anyhow::Result<Config> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("failed to read config at {}: {e}", path.display()))?;
    let mut config = Config::from_toml(&contents)
        .with_context(|| format!("failed to parse config at {}", path.display()))?;
    config.apply_overrides(|key| std::env::var(key).ok());
    config.validate()?;
    Ok(config)
}
