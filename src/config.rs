//! Model endpoint configuration.
//!
//! All knobs for the completion call live in [`ModelConfig`], built via its
//! [`ModelConfigBuilder`] or resolved from the environment with
//! [`ModelConfig::from_env`]. A `ModelConfig` is constructed per run and
//! passed down explicitly; no pipeline stage reads the environment itself.
//!
//! The endpoint, credential and deployment are mandatory: `build()` refuses
//! to produce a config without them, so a misconfigured process fails before
//! a PDF is even opened.

use crate::error::BriefingError;
use std::fmt;

/// API version used when none is configured.
pub const DEFAULT_API_VERSION: &str = "2024-02-15-preview";

/// First API version (normalised, `YYYYMMDD`) that accepts `json_schema` output.
pub const JSON_SCHEMA_MIN_VERSION: &str = "20240801";

/// Character budget for extracted text forwarded to the model.
pub const DEFAULT_MAX_INPUT_CHARS: usize = 8000;

/// Environment variables accepted for the endpoint, in priority order.
pub const ENDPOINT_VARS: &[&str] = &["AZURE_OPENAI_ENDPOINT", "AZURE_OPENAI_API_ENDPOINT"];
/// Environment variable holding the credential.
pub const API_KEY_VARS: &[&str] = &["AZURE_OPENAI_API_KEY"];
/// Environment variables accepted for the deployment, in priority order.
pub const DEPLOYMENT_VARS: &[&str] = &["AZURE_OPENAI_DEPLOYMENT", "AZURE_OPENAI_DEPLOYMENT_NAME"];
/// Environment variable holding the protocol version.
pub const API_VERSION_VARS: &[&str] = &["AZURE_OPENAI_API_VERSION"];

/// Configuration for one structured-completion request.
///
/// # Example
/// ```rust
/// use ta_briefing::ModelConfig;
///
/// let config = ModelConfig::builder()
///     .endpoint("https://example.openai.azure.com/openai/deployments/gpt-4o/")
///     .api_key("secret")
///     .deployment("gpt-4o")
///     .api_version("2024-08-01-preview")
///     .build()
///     .unwrap();
/// assert!(config.supports_json_schema());
/// ```
#[derive(Clone)]
pub struct ModelConfig {
    /// Base address of the chat-completion API, without trailing slash.
    pub endpoint: String,

    /// Credential sent in the `api-key` header.
    pub api_key: String,

    /// Deployment (model) identifier sent as `model`.
    pub deployment: String,

    /// Protocol version sent as the `api-version` query parameter.
    pub api_version: String,

    /// Sampling temperature. Default: 0.3.
    ///
    /// Kept low so two runs over the same report produce the same briefing.
    pub temperature: f32,

    /// Output token ceiling. Default: 2000.
    pub max_tokens: usize,

    /// Extracted text beyond this many characters is dropped. Default: 8000.
    pub max_input_chars: usize,
}

impl fmt::Debug for ModelConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelConfig")
            .field("endpoint", &self.endpoint)
            .field("api_key", &"<redacted>")
            .field("deployment", &self.deployment)
            .field("api_version", &self.api_version)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("max_input_chars", &self.max_input_chars)
            .finish()
    }
}

impl ModelConfig {
    /// Create a new builder for `ModelConfig`.
    pub fn builder() -> ModelConfigBuilder {
        ModelConfigBuilder::default()
    }

    /// Resolve the configuration from the process environment.
    ///
    /// Read afresh on every call; nothing is cached.
    pub fn from_env() -> Result<Self, BriefingError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Resolve the configuration through an arbitrary variable lookup.
    ///
    /// For each setting the first synonym with a non-blank value wins.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, BriefingError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let first = |names: &[&str]| {
            names
                .iter()
                .filter_map(|&n| lookup(n))
                .find(|v| !v.trim().is_empty())
        };

        let mut builder = Self::builder();
        builder.endpoint = first(ENDPOINT_VARS);
        builder.api_key = first(API_KEY_VARS);
        builder.deployment = first(DEPLOYMENT_VARS);
        if let Some(version) = first(API_VERSION_VARS) {
            builder.api_version = version;
        }
        builder.build()
    }

    /// Whether this API version accepts a strict `json_schema` response format.
    pub fn supports_json_schema(&self) -> bool {
        supports_json_schema(&self.api_version)
    }
}

/// Capability check on a raw API version string.
///
/// The comparison is lexicographic on the normalised string, not a date
/// comparison: `2024-08-01-preview` → `20240801`. Versions that do not
/// normalise to eight digits can be misclassified.
pub fn supports_json_schema(api_version: &str) -> bool {
    let normalised = api_version.replace("-preview", "").replace('-', "");
    normalised.as_str() >= JSON_SCHEMA_MIN_VERSION || api_version.contains("2024-08")
}

/// Builder for [`ModelConfig`].
#[derive(Debug)]
pub struct ModelConfigBuilder {
    endpoint: Option<String>,
    api_key: Option<String>,
    deployment: Option<String>,
    api_version: String,
    temperature: f32,
    max_tokens: usize,
    max_input_chars: usize,
}

impl Default for ModelConfigBuilder {
    fn default() -> Self {
        Self {
            endpoint: None,
            api_key: None,
            deployment: None,
            api_version: DEFAULT_API_VERSION.to_string(),
            temperature: 0.3,
            max_tokens: 2000,
            max_input_chars: DEFAULT_MAX_INPUT_CHARS,
        }
    }
}

impl ModelConfigBuilder {
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn deployment(mut self, deployment: impl Into<String>) -> Self {
        self.deployment = Some(deployment.into());
        self
    }

    pub fn api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = version.into();
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn max_tokens(mut self, n: usize) -> Self {
        self.max_tokens = n;
        self
    }

    pub fn max_input_chars(mut self, n: usize) -> Self {
        self.max_input_chars = n;
        self
    }

    /// Build the configuration, failing on any missing required setting.
    pub fn build(self) -> Result<ModelConfig, BriefingError> {
        let endpoint = require(self.endpoint, ENDPOINT_VARS)?;
        let api_key = require(self.api_key, API_KEY_VARS)?;
        let deployment = require(self.deployment, DEPLOYMENT_VARS)?;

        if self.max_tokens == 0 {
            return Err(BriefingError::InvalidConfig(
                "max_tokens must be ≥ 1".into(),
            ));
        }
        if self.max_input_chars == 0 {
            return Err(BriefingError::InvalidConfig(
                "max_input_chars must be ≥ 1".into(),
            ));
        }

        Ok(ModelConfig {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key,
            deployment,
            api_version: self.api_version,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            max_input_chars: self.max_input_chars,
        })
    }
}

fn require(value: Option<String>, names: &[&str]) -> Result<String, BriefingError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v.trim().to_string()),
        _ => Err(BriefingError::MissingConfig {
            setting: names.join(" or "),
        }),
    }
}
