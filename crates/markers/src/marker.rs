use serde::{Deserialize, Serialize};

/// Lifecycle of one marker. Transitions are one-way:
/// `New -> Loading -> {Found | NotFound | Error}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerStatus {
    New,
    Loading,
    Found,
    NotFound,
    Error,
}

impl MarkerStatus {
    /// Only `New` markers are eligible for processing; the status doubles as
    /// the idempotency guard across repeated discovery passes.
    pub fn is_new(self) -> bool {
        self == MarkerStatus::New
    }
}

/// How a resolved attachment should be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DisplayMode {
    /// Inline link on the report row.
    #[default]
    Link,
    /// Dialog listing every returned document.
    Modal,
}

impl DisplayMode {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "link" => Some(DisplayMode::Link),
            "modal" => Some(DisplayMode::Modal),
            _ => None,
        }
    }
}

/// One report row that needs an attachment lookup.
///
/// Built from a marker span's attributes by discovery; mutated only by the
/// pipeline afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Marker {
    /// The span's `id` attribute (unique within a document by DOM contract).
    pub id: String,
    /// Business key of the row, e.g. an asset or invoice number.
    pub reference_id: String,
    pub session_id: String,
    pub auth_token: String,
    /// Opaque query fragment, encoded onto the lookup URL by the fetcher.
    pub raw_argument: String,
    pub environment: String,
    pub display_mode: DisplayMode,
    pub status: MarkerStatus,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn status_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&MarkerStatus::NotFound).unwrap(),
            "\"not_found\""
        );
        assert_eq!(
            serde_json::from_str::<MarkerStatus>("\"new\"").unwrap(),
            MarkerStatus::New
        );
    }

    #[test]
    fn only_new_markers_are_eligible() {
        assert!(MarkerStatus::New.is_new());
        for status in [
            MarkerStatus::Loading,
            MarkerStatus::Found,
            MarkerStatus::NotFound,
            MarkerStatus::Error,
        ] {
            assert!(!status.is_new());
        }
    }

    #[test]
    fn display_mode_parses_known_values_only() {
        assert_eq!(DisplayMode::parse("modal"), Some(DisplayMode::Modal));
        assert_eq!(DisplayMode::parse(" Link "), Some(DisplayMode::Link));
        assert_eq!(DisplayMode::parse("popup"), None);
    }
}
