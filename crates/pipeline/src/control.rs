use std::collections::HashMap;

use async_trait::async_trait;
use thiserror::Error;

use attachlink_client::ConfigError;
use attachlink_markers::{discover, Document, Marker};

use crate::config::ResolverConfig;
use crate::pipeline::{Pipeline, RunReport};

/// What the host hands a control on each lifecycle call.
#[derive(Debug, Clone, Default)]
pub struct HostContext {
    /// Flat configuration pairs from the host's property bag.
    pub configuration: HashMap<String, String>,
    /// Snapshot of the hosting document.
    pub document: Document,
}

impl HostContext {
    pub fn new(configuration: HashMap<String, String>, document: Document) -> Self {
        Self {
            configuration,
            document,
        }
    }
}

/// Control lifecycle failure.
#[derive(Error, Debug)]
pub enum ControlError {
    #[error("control used before initialize")]
    NotInitialized,

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Host-facing lifecycle of an embeddable control.
///
/// Hosts call `initialize` once, `draw` on every render pass, `set_data`
/// when bound data changes, and `destroy` at teardown.
#[async_trait]
pub trait Control {
    async fn initialize(&mut self, ctx: &HostContext) -> Result<(), ControlError>;

    async fn draw(&mut self, ctx: &HostContext) -> Result<(), ControlError>;

    /// Bound-data hand-off. Most controls ignore it.
    async fn set_data(&mut self, _ctx: &HostContext, _data: &str) -> Result<(), ControlError> {
        Ok(())
    }

    /// Teardown. Defaults to dropping nothing.
    fn destroy(&mut self) {}
}

/// The attachment-resolving control: re-discovers markers in the hosting
/// document on every draw and resolves the ones not seen before.
pub struct AttachmentControl {
    config: ResolverConfig,
    pipeline: Option<Pipeline>,
    markers: Vec<Marker>,
    last_report: Option<RunReport>,
}

impl AttachmentControl {
    pub fn new() -> Self {
        Self {
            config: ResolverConfig::default(),
            pipeline: None,
            markers: Vec::new(),
            last_report: None,
        }
    }

    /// Markers as of the last draw, statuses included.
    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    pub fn last_report(&self) -> Option<&RunReport> {
        self.last_report.as_ref()
    }

    /// Re-discovers markers in `document`, carrying statuses over from the
    /// previous snapshot so finished rows are not fetched again. A row whose
    /// reference changed under the same span id counts as new.
    fn refresh_markers(&mut self, document: &Document) {
        let previous: HashMap<String, Marker> = self
            .markers
            .drain(..)
            .map(|marker| (marker.id.clone(), marker))
            .collect();
        self.markers = discover(document, &self.config.discovery);
        for marker in &mut self.markers {
            if let Some(old) = previous.get(&marker.id) {
                if old.reference_id == marker.reference_id {
                    marker.status = old.status;
                }
            }
        }
    }
}

impl Default for AttachmentControl {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Control for AttachmentControl {
    async fn initialize(&mut self, ctx: &HostContext) -> Result<(), ControlError> {
        self.config = ResolverConfig::from_host_pairs(&ctx.configuration)?;
        self.pipeline = Some(Pipeline::new(&self.config)?);
        Ok(())
    }

    async fn draw(&mut self, ctx: &HostContext) -> Result<(), ControlError> {
        if self.pipeline.is_none() {
            return Err(ControlError::NotInitialized);
        }
        self.refresh_markers(&ctx.document);
        let pipeline = self.pipeline.as_ref().ok_or(ControlError::NotInitialized)?;
        let report = pipeline.run(&mut self.markers).await;
        self.last_report = Some(report);
        Ok(())
    }

    fn destroy(&mut self) {
        self.pipeline = None;
        self.markers.clear();
        self.last_report = None;
    }
}
