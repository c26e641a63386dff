//! # Attachlink Pipeline
//!
//! The resolution pass that turns a discovery snapshot into rendered
//! artifacts, plus the control lifecycle hosts drive it through.
//!
//! ```text
//! Document --discover--> [Marker..] --group_by_session--> [SessionGroup..]
//!                                                               |
//!                                              (strictly sequential groups)
//!                                                               v
//!                                     authenticate once --> chained lookups
//!                                                               |
//!                                                               v
//!                                        Decorator --> Artifact per marker
//! ```
//!
//! Groups resolve one after another and lookups within a group are chained,
//! never parallel. Marker statuses advance one way only, which keeps
//! repeated draws over the same document from issuing duplicate requests.

mod config;
mod control;
mod decorate;
mod pipeline;
mod stats;

pub use config::ResolverConfig;
pub use control::{AttachmentControl, Control, ControlError, HostContext};
pub use decorate::{Artifact, DecorateConfig, Decorator, ModalEntry, NoteTone};
pub use pipeline::{MarkerReport, Pipeline, RunReport};
pub use stats::RunStats;
