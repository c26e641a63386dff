use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// How the attachment endpoint shapes its response body. Fixed per
/// deployment; the fetcher never sniffs the body to guess.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseMode {
    /// XML body; the `<value>` node carries the destination URL.
    #[serde(alias = "xml")]
    XmlValue,
    /// HTML fragment; the first anchor carries the destination.
    #[serde(alias = "html")]
    HtmlAnchor,
    /// JSON array of `{url, description}` records (list-service deployments).
    #[serde(alias = "json")]
    JsonList,
}

impl Default for ResponseMode {
    fn default() -> Self {
        ResponseMode::XmlValue
    }
}

impl FromStr for ResponseMode {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "xml" | "xml_value" => Ok(ResponseMode::XmlValue),
            "html" | "html_anchor" => Ok(ResponseMode::HtmlAnchor),
            "json" | "json_list" => Ok(ResponseMode::JsonList),
            _ => Err(ConfigError::InvalidValue {
                key: "response_mode",
                value: value.to_string(),
            }),
        }
    }
}

/// Endpoints and identity for one deployment of the attachment service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Base URL of the authentication service (`apiToken`,
    /// `ValidateSecurityToken`).
    pub auth_base: String,
    /// Base URL of the per-marker lookup endpoint (query-string style).
    pub lookup_base: String,
    /// Alternate lookup base tried with bearer auth when the primary
    /// transport fails at the network level. `None` disables the fallback.
    pub fallback_base: Option<String>,
    /// Base URL of the JSON attachment-list service (`JsonList` deployments).
    pub list_base: Option<String>,
    /// Response shape served by this deployment.
    pub response_mode: ResponseMode,
    /// JSON field naming the reference id in list-service request bodies.
    pub id_field: String,
    /// Report user forwarded as the `user` header and query parameter.
    pub user: Option<String>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            auth_base: String::new(),
            lookup_base: String::new(),
            fallback_base: None,
            list_base: None,
            response_mode: ResponseMode::default(),
            id_field: "assetId".to_string(),
            user: None,
        }
    }
}

impl ServiceConfig {
    /// Checks that the bases the configured mode needs are present. Run once
    /// before the first lookup, not per request.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.auth_base.trim().is_empty() {
            return Err(ConfigError::MissingAuthBase);
        }
        match self.response_mode {
            ResponseMode::JsonList => {
                if self
                    .list_base
                    .as_deref()
                    .map_or(true, |base| base.trim().is_empty())
                {
                    return Err(ConfigError::MissingListBase);
                }
            }
            ResponseMode::XmlValue | ResponseMode::HtmlAnchor => {
                if self.lookup_base.trim().is_empty() {
                    return Err(ConfigError::MissingLookupBase);
                }
            }
        }
        Ok(())
    }
}

/// Configuration rejected before any network traffic.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("service.auth_base must be set")]
    MissingAuthBase,

    #[error("service.lookup_base must be set for xml_value and html_anchor deployments")]
    MissingLookupBase,

    #[error("service.list_base must be set for json_list deployments")]
    MissingListBase,

    #[error("invalid value {value:?} for {key}")]
    InvalidValue { key: &'static str, value: String },

    #[error("http client: {0}")]
    HttpClient(String),
}
