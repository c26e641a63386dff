use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use attachlink_client::{ConfigError, ServiceConfig};
use attachlink_markers::{DiscoveryConfig, DisplayMode};

use crate::decorate::DecorateConfig;

/// Everything one resolution pipeline needs: endpoints, discovery rules, and
/// presentation. Maps to the `[service]`, `[discovery]`, and `[decorate]`
/// sections of a config file, or to the flat pairs a host hands a control.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    pub service: ServiceConfig,
    pub discovery: DiscoveryConfig,
    pub decorate: DecorateConfig,
}

impl ResolverConfig {
    /// Builds the config from the flat key/value pairs a host passes at
    /// control initialization. Unknown keys are ignored; hosts carry plenty
    /// that is not ours.
    pub fn from_host_pairs(pairs: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let mut config = ResolverConfig::default();
        for (key, value) in pairs {
            match key.as_str() {
                "auth_base" => config.service.auth_base = value.clone(),
                "lookup_base" => config.service.lookup_base = value.clone(),
                "fallback_base" => config.service.fallback_base = non_empty(value),
                "list_base" => config.service.list_base = non_empty(value),
                "response_mode" => config.service.response_mode = value.parse()?,
                "id_field" => config.service.id_field = value.clone(),
                "user" => config.service.user = non_empty(value),
                "id_prefix" => config.discovery.id_prefix = value.clone(),
                "default_env" => config.discovery.default_env = value.clone(),
                "default_display" => {
                    config.discovery.default_display =
                        DisplayMode::parse(value).ok_or_else(|| ConfigError::InvalidValue {
                            key: "default_display",
                            value: value.clone(),
                        })?;
                }
                "exclude" => {
                    config.discovery.exclude = value
                        .split(',')
                        .map(str::trim)
                        .filter(|item| !item.is_empty())
                        .map(str::to_string)
                        .collect();
                }
                "loading_icon" => config.decorate.loading_icon = non_empty(value),
                _ => {}
            }
        }
        Ok(config)
    }
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
