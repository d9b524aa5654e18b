//! Configuration for the explanation service.
//!
//! Everything the service needs to know is collected into [`ExplainConfig`],
//! constructed exactly once at process start (from the environment, CLI
//! flags, or a builder) and passed by reference afterwards. Handlers never
//! re-read environment variables per call — stub mode vs. remote mode is
//! decided by the same immutable snapshot for the lifetime of the process.
//!
//! # Design choice: builder over constructor
//! The builder lets callers set only what they care about and rely on
//! well-documented defaults for the rest, and gives `build()` one place to
//! validate cross-field constraints.

use crate::error::ExplainError;
use std::fmt;

/// Model identifier used when `OPENAI_MODEL` is not set.
pub const DEFAULT_MODEL: &str = "gpt-5";

/// Base URL of the model backend's REST API.
pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";

/// Configuration for the explanation service.
///
/// Built via [`ExplainConfig::builder()`], [`ExplainConfig::from_env()`], or
/// [`ExplainConfig::default()`].
///
/// # Example
/// ```rust
/// use readpaper::ExplainConfig;
///
/// let config = ExplainConfig::builder()
///     .model("gpt-5")
///     .api_timeout_secs(30)
///     .build()
///     .unwrap();
/// assert!(!config.key_loaded());
/// ```
#[derive(Clone)]
pub struct ExplainConfig {
    /// Credential for the model backend. `None` puts every request into
    /// stub mode: no network call is ever attempted for explanations.
    pub api_key: Option<String>,

    /// Model identifier sent with every invocation. Default: [`DEFAULT_MODEL`].
    pub model: String,

    /// Base URL of the model backend. Default: [`DEFAULT_API_BASE`].
    ///
    /// Overridable so tests and proxies can point the adapter at a local
    /// endpoint without touching the invocation strategies.
    pub api_base: String,

    /// Per-invocation-attempt timeout in seconds. Default: 60.
    ///
    /// Applies to each remote attempt independently: a request that tries
    /// both call shapes can take up to twice this long before the stub
    /// takes over.
    pub api_timeout_secs: u64,

    /// Timeout for fetching a caller-supplied page URL in seconds. Default: 30.
    pub fetch_timeout_secs: u64,
}

impl Default for ExplainConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
            api_timeout_secs: 60,
            fetch_timeout_secs: 30,
        }
    }
}

// The credential must never appear in logs, so Debug is written by hand.
impl fmt::Debug for ExplainConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExplainConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("api_base", &self.api_base)
            .field("api_timeout_secs", &self.api_timeout_secs)
            .field("fetch_timeout_secs", &self.fetch_timeout_secs)
            .finish()
    }
}

impl ExplainConfig {
    /// Create a new builder for `ExplainConfig`.
    pub fn builder() -> ExplainConfigBuilder {
        ExplainConfigBuilder {
            config: Self::default(),
        }
    }

    /// Read the configuration from the process environment.
    ///
    /// `OPENAI_API_KEY` — credential; unset or empty means stub mode.
    /// `OPENAI_MODEL` — model identifier; unset means [`DEFAULT_MODEL`].
    pub fn from_env() -> Self {
        let api_key = std::env::var("OPENAI_API_KEY")
            .ok()
            .filter(|k| !k.is_empty());
        let model = std::env::var("OPENAI_MODEL")
            .ok()
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        Self {
            api_key,
            model,
            ..Self::default()
        }
    }

    /// Whether a credential is configured (reported by the health endpoint).
    pub fn key_loaded(&self) -> bool {
        self.api_key.is_some()
    }
}

/// Builder for [`ExplainConfig`].
#[derive(Debug)]
pub struct ExplainConfigBuilder {
    config: ExplainConfig,
}

impl ExplainConfigBuilder {
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        let key = key.into();
        self.config.api_key = if key.is_empty() { None } else { Some(key) };
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    pub fn api_base(mut self, base: impl Into<String>) -> Self {
        self.config.api_base = base.into();
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = secs.max(1);
        self
    }

    pub fn fetch_timeout_secs(mut self, secs: u64) -> Self {
        self.config.fetch_timeout_secs = secs.max(1);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ExplainConfig, ExplainError> {
        let c = &self.config;
        if c.model.is_empty() {
            return Err(ExplainError::InvalidConfig(
                "model identifier must not be empty".into(),
            ));
        }
        if c.api_base.is_empty() {
            return Err(ExplainError::InvalidConfig(
                "api_base must not be empty".into(),
            ));
        }
        Ok(self.config)
    }
}
