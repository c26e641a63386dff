use crate::document::{Document, Element};
use crate::marker::{DisplayMode, Marker, MarkerStatus};
use serde::{Deserialize, Serialize};

pub const ATTR_REFERENCE: &str = "data-ref";
pub const ATTR_SESSION: &str = "data-session";
pub const ATTR_TOKEN: &str = "data-token";
pub const ATTR_ARGUMENT: &str = "data-arg";
pub const ATTR_ENVIRONMENT: &str = "data-env";
pub const ATTR_DISPLAY: &str = "data-display";
pub const ATTR_EXCLUDE: &str = "data-exclude";

/// Which spans count as attachment markers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// A span is a marker candidate when its `id` starts with this prefix.
    pub id_prefix: String,
    /// Environment sent to the lookup service when the span carries none.
    pub default_env: String,
    /// Presentation for markers without a `data-display` attribute.
    pub default_display: DisplayMode,
    /// Rows whose `data-exclude` value appears here are dropped.
    pub exclude: Vec<String>,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            id_prefix: "attach".to_string(),
            default_env: String::new(),
            default_display: DisplayMode::Link,
            exclude: Vec::new(),
        }
    }
}

/// Scan `document` for attachment marker spans.
///
/// Produces a finite snapshot in document order. Spans missing any required
/// field (reference id, session id, token) are skipped silently; that is how
/// the report template marks rows with nothing to resolve.
pub fn discover(document: &Document, config: &DiscoveryConfig) -> Vec<Marker> {
    let mut markers = Vec::new();

    for element in document.elements() {
        if element.tag() != "span" {
            continue;
        }
        let Some(id) = element.id() else {
            continue;
        };
        if !id.starts_with(&config.id_prefix) {
            continue;
        }

        if let Some(reason) = exclusion_value(element, config) {
            log::debug!("Skipping marker {id}: excluded ({reason})");
            continue;
        }

        let (Some(reference_id), Some(session_id), Some(auth_token)) = (
            required_attr(element, ATTR_REFERENCE),
            required_attr(element, ATTR_SESSION),
            required_attr(element, ATTR_TOKEN),
        ) else {
            log::debug!("Skipping span {id}: missing required marker fields");
            continue;
        };

        let environment = element
            .attr(ATTR_ENVIRONMENT)
            .filter(|v| !v.is_empty())
            .unwrap_or(&config.default_env)
            .to_string();
        let display_mode = element
            .attr(ATTR_DISPLAY)
            .and_then(DisplayMode::parse)
            .unwrap_or(config.default_display);

        markers.push(Marker {
            id: id.to_string(),
            reference_id: reference_id.to_string(),
            session_id: session_id.to_string(),
            auth_token: auth_token.to_string(),
            raw_argument: element.attr(ATTR_ARGUMENT).unwrap_or_default().to_string(),
            environment,
            display_mode,
            status: MarkerStatus::New,
        });
    }

    log::info!("Discovered {} attachment markers", markers.len());
    markers
}

fn required_attr<'a>(element: &'a Element, name: &str) -> Option<&'a str> {
    element.attr(name).filter(|v| !v.trim().is_empty())
}

fn exclusion_value<'a>(element: &'a Element, config: &DiscoveryConfig) -> Option<&'a str> {
    let value = element.attr(ATTR_EXCLUDE)?;
    config
        .exclude
        .iter()
        .any(|excluded| excluded == value)
        .then_some(value)
}
