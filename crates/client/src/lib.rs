//! # Attachlink Client
//!
//! Authenticated access to the attachment services: session tokens, cached
//! lookups, and the transport fallback.
//!
//! ```text
//! (session_id, auth_token)
//!        |
//!        v
//! [Authenticator] --GET apiToken--> --POST ValidateSecurityToken--> ApiToken
//!        |
//!        v
//! [AttachmentFetcher] --fetch_key--> [RequestCache] --miss--> network
//!        |                                 |
//!        v                                 v
//!   AttachmentResult  <------------- cached Lookup
//! ```
//!
//! Lookups are coalesced through the injected [`RequestCache`]: one network
//! call per distinct fetch key per pipeline instance, with failures cached
//! the same as successes. Response bodies are interpreted per the
//! deployment's fixed [`ResponseMode`]; an empty body is the service's way
//! of saying "no attachment" and is never an error.

mod auth;
mod cache;
mod config;
mod error;
mod fetch;
mod query;
mod response;

pub use auth::{ApiToken, Authenticator, VALIDATION_CLAIMS};
pub use cache::RequestCache;
pub use config::{ConfigError, ResponseMode, ServiceConfig};
pub use error::{AuthError, FetchError};
pub use fetch::{AttachmentFetcher, AttachmentLink, AttachmentResult, Lookup};
