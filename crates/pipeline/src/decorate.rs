use serde::{Deserialize, Serialize};

use attachlink_client::{AttachmentLink, AttachmentResult, Lookup};
use attachlink_markers::{DisplayMode, Marker, MarkerStatus};

/// Presentation knobs for the rendered artifacts.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DecorateConfig {
    /// Icon asset shown while a marker resolves.
    pub loading_icon: Option<String>,
}

/// Tone of an inline status note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoteTone {
    /// Gray annotation: the lookup finished and nothing is attached.
    Muted,
    /// Red annotation: the lookup failed.
    Error,
}

/// One entry in a multi-document dialog. Entries open in a new browsing
/// context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModalEntry {
    pub label: String,
    pub href: String,
}

/// What the host renders at a marker's position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Artifact {
    /// Progress indicator while the lookup is in flight.
    Loading { icon: Option<String> },
    /// Progress indicator removed with nothing in its place (teardown).
    Cleared,
    /// Single actionable link on the row.
    Link { href: String, label: String },
    /// Dialog trigger listing every returned document.
    Modal {
        title: String,
        entries: Vec<ModalEntry>,
    },
    /// Inline status note replacing the progress indicator.
    Note { text: String, tone: NoteTone },
}

/// Drives marker status transitions and produces the artifact the host
/// renders for each one.
///
/// Transitions are one-way: `new -> loading -> {found | not_found | error}`.
/// A marker that has left `new` is never picked up again, which is what
/// makes repeated passes over the same document idempotent.
pub struct Decorator {
    config: DecorateConfig,
}

impl Decorator {
    pub fn new(config: DecorateConfig) -> Self {
        Self { config }
    }

    /// Marks the marker in flight. No-op for markers already past `new`.
    pub fn show_loading(&self, marker: &mut Marker) -> Option<Artifact> {
        if !marker.status.is_new() {
            return None;
        }
        marker.status = MarkerStatus::Loading;
        Some(Artifact::Loading {
            icon: self.config.loading_icon.clone(),
        })
    }

    /// Lands a finished lookup. Only a `loading` marker may land; anything
    /// else keeps its status and gets no artifact.
    pub fn apply_result(&self, marker: &mut Marker, lookup: &Lookup) -> Option<Artifact> {
        if marker.status != MarkerStatus::Loading {
            return None;
        }
        Some(match lookup {
            Ok(AttachmentResult::Found(links)) => {
                marker.status = MarkerStatus::Found;
                self.render_found(marker, links)
            }
            Ok(AttachmentResult::NotFound) => {
                marker.status = MarkerStatus::NotFound;
                Artifact::Note {
                    text: "No document found".to_string(),
                    tone: NoteTone::Muted,
                }
            }
            Err(err) => {
                marker.status = MarkerStatus::Error;
                Artifact::Note {
                    text: err.to_string(),
                    tone: NoteTone::Error,
                }
            }
        })
    }

    /// Flags a marker whose whole session group failed authentication.
    pub fn apply_failure(&self, marker: &mut Marker, message: &str) -> Option<Artifact> {
        if marker.status != MarkerStatus::Loading {
            return None;
        }
        marker.status = MarkerStatus::Error;
        Some(Artifact::Note {
            text: message.to_string(),
            tone: NoteTone::Error,
        })
    }

    /// Removes the progress indicator without recording an outcome. Used at
    /// teardown for lookups that never landed; the marker stays `loading`.
    pub fn clear_loading(&self, marker: &Marker) -> Option<Artifact> {
        if marker.status != MarkerStatus::Loading {
            return None;
        }
        Some(Artifact::Cleared)
    }

    /// A single link renders inline when the marker asks for `link` display;
    /// everything else becomes a dialog.
    fn render_found(&self, marker: &Marker, links: &[AttachmentLink]) -> Artifact {
        if marker.display_mode == DisplayMode::Link && links.len() == 1 {
            let link = &links[0];
            return Artifact::Link {
                href: link.url.clone(),
                label: link
                    .description
                    .clone()
                    .unwrap_or_else(|| "Document".to_string()),
            };
        }
        let entries = links
            .iter()
            .enumerate()
            .map(|(index, link)| ModalEntry {
                label: modal_label(index, link.description.as_deref()),
                href: link.url.clone(),
            })
            .collect();
        Artifact::Modal {
            title: format!("Documents for {}", marker.reference_id),
            entries,
        }
    }
}

/// `Document {n}` with the service description appended when present. The
/// counter is 1-based.
fn modal_label(index: usize, description: Option<&str>) -> String {
    match description {
        Some(text) if !text.is_empty() => format!("Document {}: {}", index + 1, text),
        _ => format!("Document {}", index + 1),
    }
}
