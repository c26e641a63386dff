//! # Attachlink Markers
//!
//! Document model and marker discovery for attachment resolution.
//!
//! ## Pipeline position
//!
//! ```text
//! Report HTML
//!     │
//!     ├──> Document::parse (best-effort tag scan)
//!     │      └─> Elements (tag + attributes)
//!     │
//!     ├──> discover (prefix + required-field filter)
//!     │      └─> Marker snapshot (status = New)
//!     │
//!     └──> group_by_session
//!            └─> SessionGroups (one auth context each)
//! ```
//!
//! A discovery pass is a snapshot: re-parsing mutated input yields a fresh,
//! possibly different sequence. Rows missing required fields are skipped
//! silently; that is the input contract, not an error.

mod discovery;
mod document;
mod groups;
mod marker;

pub use discovery::{discover, DiscoveryConfig};
pub use document::{Document, Element};
pub use groups::{group_by_session, SessionGroup};
pub use marker::{DisplayMode, Marker, MarkerStatus};
