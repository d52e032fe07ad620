//! Secret resolution from the process environment and an optional `.env` file.

use std::path::Path;

use anyhow::Context;
use tracing::debug;

use crate::config::Config;

/// An API key or bearer token. `Debug` never prints the value.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("ApiKey").field(&"[REDACTED]").finish()
    }
}

impl ApiKey {
    /// Wrap a raw secret.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The raw secret, for building auth headers.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

/// Secrets needed by the upstream clients.
#[derive(Debug, Clone)]
pub struct Credentials {
    /// Research API bearer key.
    pub research: ApiKey,
    /// Optional bearer token for the model host. `None` means requests are
    /// SigV4-signed with the default AWS credential chain.
    pub generation: Option<ApiKey>,
}

impl Credentials {
    /// Resolve secrets named by `config` through `env`.
    ///
    /// # Errors
    ///
    /// Returns an error when the research API key is missing or blank.
    pub fn resolve(config: &Config, env: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let research = non_blank(env(&config.research.api_key_env)).ok_or_else(|| {
            anyhow::anyhow!(
                "missing required credential: {}",
                config.research.api_key_env
            )
        })?;
        let generation = non_blank(env(&config.generation.api_key_env));
        if generation.is_none() {
            debug!(
                var = %config.generation.api_key_env,
                "no model host token set, using the default AWS credential chain"
            );
        }
        Ok(Self {
            research: ApiKey(research),
            generation: generation.map(ApiKey),
        })
    }

    /// Resolve secrets from the process environment.
    ///
    /// # Errors
    ///
    /// See [`Credentials::resolve`].
    pub fn from_env(config: &Config) -> anyhow::Result<Self> {
        Self::resolve(config, |key| std::env::var(key).ok())
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Load `./.env` into the process environment if present.
///
/// Existing variables are never overwritten.
///
/// # Errors
///
/// Returns an error when the file exists but cannot be parsed.
pub fn load_dotenv() -> anyhow::Result<()> {
    match dotenvy::dotenv() {
        Ok(path) => {
            debug!(path = %path.display(), "loaded .env");
            Ok(())
        }
        Err(e) if e.not_found() => Ok(()),
        Err(e) => Err(e).context("failed to load .env"),
    }
}

/// Load a specific `.env` file into the process environment.
///
/// # Errors
///
/// Returns an error when the file is missing or cannot be parsed.
pub fn load_dotenv_from(path: &Path) -> anyhow::Result<()> {
    dotenvy::from_path(path)
        .with_context(|| format!("failed to load credentials from {}", path.display()))
}
