//! Provider configuration.
//!
//! The provider block accepts `host`, `token` and `organization`. Each one
//! falls back to an environment variable when it is absent from the block:
//!
//! | Attribute      | Environment variable  | Default            |
//! |----------------|-----------------------|--------------------|
//! | `host`         | `PIPES_HOST`          | `pipes.turbot.com` |
//! | `token`        | `PIPES_TOKEN`         | (required)         |
//! | `organization` | `PIPES_ORGANIZATION`  | none               |

use std::fmt;

use serde_json::Value;

use crate::error::ProviderError;
use crate::schema::{Attribute, Schema};

/// Host used when neither the block nor the environment sets one.
pub const DEFAULT_HOST: &str = "pipes.turbot.com";

/// Path prefix of every API endpoint.
pub const API_BASE_PATH: &str = "/api/v0";

pub const ENV_HOST: &str = "PIPES_HOST";
pub const ENV_TOKEN: &str = "PIPES_TOKEN";
pub const ENV_ORGANIZATION: &str = "PIPES_ORGANIZATION";

/// Resolved provider configuration shared by every handler.
#[derive(Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    /// API host, optionally with a scheme.
    pub host: String,
    /// API token sent as a bearer token.
    pub token: String,
    /// Default organization for resources that do not set one.
    pub organization: Option<String>,
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("host", &self.host)
            .field("token", &"<redacted>")
            .field("organization", &self.organization)
            .finish()
    }
}

impl ProviderConfig {
    /// Resolve configuration from the provider block and the process environment.
    pub fn from_value(config: &Value) -> Result<Self, ProviderError> {
        Self::resolve(config, |key| std::env::var(key).ok())
    }

    /// Resolve configuration with an explicit environment lookup.
    pub fn resolve<F>(config: &Value, env: F) -> Result<Self, ProviderError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |attr: &str, var: &str| {
            config
                .get(attr)
                .and_then(Value::as_str)
                .filter(|s| !s.trim().is_empty())
                .map(str::to_string)
                .or_else(|| env(var).filter(|s| !s.trim().is_empty()))
        };

        let token = lookup("token", ENV_TOKEN).ok_or_else(|| {
            ProviderError::Configuration(format!(
                "an API token is required: set `token` in the provider block or the {} environment variable",
                ENV_TOKEN
            ))
        })?;

        Ok(Self {
            host: lookup("host", ENV_HOST).unwrap_or_else(|| DEFAULT_HOST.to_string()),
            token,
            organization: lookup("organization", ENV_ORGANIZATION),
        })
    }

    /// Base URL of the API, e.g. `https://pipes.turbot.com/api/v0`.
    pub fn base_url(&self) -> String {
        let host = self.host.trim().trim_end_matches('/');
        if host.starts_with("http://") || host.starts_with("https://") {
            format!("{}{}", host, API_BASE_PATH)
        } else {
            format!("https://{}{}", host, API_BASE_PATH)
        }
    }

    /// Schema of the provider block.
    pub fn schema() -> Schema {
        Schema::v0()
            .with_attribute(
                "host",
                Attribute::optional_string().with_description(format!(
                    "API host. Defaults to the {} environment variable, then {}.",
                    ENV_HOST, DEFAULT_HOST
                )),
            )
            .with_attribute(
                "token",
                Attribute::optional_string()
                    .sensitive()
                    .with_description(format!(
                        "API token. Defaults to the {} environment variable.",
                        ENV_TOKEN
                    )),
            )
            .with_attribute(
                "organization",
                Attribute::optional_string().with_description(format!(
                    "Organization handle used by resources that do not set their own. Defaults to the {} environment variable.",
                    ENV_ORGANIZATION
                )),
            )
    }
}
