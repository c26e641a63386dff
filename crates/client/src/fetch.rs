use std::sync::Arc;

use serde::{Deserialize, Serialize};

use attachlink_markers::Marker;

use crate::auth::ApiToken;
use crate::cache::RequestCache;
use crate::config::{ResponseMode, ServiceConfig};
use crate::error::FetchError;
use crate::query;
use crate::response;

/// One attachment destination returned by the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentLink {
    pub url: String,
    /// Human label when the service provides one.
    pub description: Option<String>,
}

/// Definitive answer for a lookup key: the service either knows documents
/// for the reference or it answered that there are none.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttachmentResult {
    Found(Vec<AttachmentLink>),
    NotFound,
}

/// Cached outcome of one lookup key, failure included.
pub type Lookup = Result<AttachmentResult, FetchError>;

/// Issues attachment lookups through the injected [`RequestCache`], so a
/// given fetch key hits the network at most once per pipeline instance.
pub struct AttachmentFetcher {
    http: reqwest::Client,
    config: ServiceConfig,
    cache: Arc<RequestCache>,
}

impl AttachmentFetcher {
    pub fn new(http: reqwest::Client, config: ServiceConfig, cache: Arc<RequestCache>) -> Self {
        Self {
            http,
            config,
            cache,
        }
    }

    pub fn cache(&self) -> &RequestCache {
        &self.cache
    }

    /// Cache identity of a marker's lookup. Query-style lookups are keyed by
    /// the fully constructed request URL; list lookups append the reference
    /// id the POST body carries, since the URL alone does not distinguish
    /// them.
    pub fn fetch_key(&self, marker: &Marker) -> String {
        match self.config.response_mode {
            ResponseMode::JsonList => format!("{}#{}", self.list_url(), marker.reference_id),
            ResponseMode::XmlValue | ResponseMode::HtmlAnchor => self.lookup_url(marker),
        }
    }

    /// Resolves the marker's lookup, consulting the cache first. Concurrent
    /// calls for the same key coalesce onto a single request; later calls
    /// get the stored outcome, failures included.
    pub async fn fetch(&self, marker: &Marker, token: &ApiToken) -> Lookup {
        let key = self.fetch_key(marker);
        let cell = self.cache.entry(&key);
        if let Some(done) = cell.get() {
            log::debug!("cache hit for {key}");
            return done.clone();
        }
        cell.get_or_init(|| async {
            let outcome = self.lookup(marker, token).await;
            if let Err(err) = &outcome {
                log::warn!("lookup failed for {}: {err}", marker.reference_id);
            }
            outcome
        })
        .await
        .clone()
    }

    async fn lookup(&self, marker: &Marker, token: &ApiToken) -> Lookup {
        let body = match self.config.response_mode {
            ResponseMode::JsonList => self.request_list(marker, token).await?,
            ResponseMode::XmlValue | ResponseMode::HtmlAnchor => {
                self.request_lookup(marker, token).await?
            }
        };
        response::interpret(self.config.response_mode, &body)
    }

    /// Primary transport sends the token and user as plain headers. On a
    /// network-level failure only (connect, DNS, dropped body), the same
    /// query is retried once against the fallback base with bearer auth.
    /// HTTP error statuses never trigger the fallback.
    async fn request_lookup(
        &self,
        marker: &Marker,
        token: &ApiToken,
    ) -> Result<String, FetchError> {
        let url = self.lookup_url(marker);
        let mut request = self.http.get(&url).header("token", token.as_str());
        if let Some(user) = &self.config.user {
            request = request.header("user", user);
        }
        match Self::read_body(request).await {
            Err(FetchError::Transport(primary)) => {
                let Some(fallback_base) = &self.config.fallback_base else {
                    return Err(FetchError::Transport(primary));
                };
                log::warn!("primary lookup transport failed ({primary}); retrying on fallback");
                let url = self.lookup_url_on(fallback_base, marker);
                let request = self.http.get(&url).bearer_auth(token.as_str());
                Self::read_body(request).await
            }
            outcome => outcome,
        }
    }

    /// List-service deployments POST the reference id as a one-field JSON
    /// body. The fallback policy matches the query transport.
    async fn request_list(&self, marker: &Marker, token: &ApiToken) -> Result<String, FetchError> {
        let request = self
            .http
            .post(self.list_url())
            .header("token", token.as_str())
            .json(&self.list_body(marker));
        match Self::read_body(request).await {
            Err(FetchError::Transport(primary)) => {
                let Some(fallback_base) = &self.config.fallback_base else {
                    return Err(FetchError::Transport(primary));
                };
                log::warn!("primary list transport failed ({primary}); retrying on fallback");
                let request = self
                    .http
                    .post(Self::list_url_on(fallback_base))
                    .bearer_auth(token.as_str())
                    .json(&self.list_body(marker));
                Self::read_body(request).await
            }
            outcome => outcome,
        }
    }

    async fn read_body(request: reqwest::RequestBuilder) -> Result<String, FetchError> {
        let response = request
            .send()
            .await
            .map_err(|err| FetchError::transport(&err))?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }
        response
            .text()
            .await
            .map_err(|err| FetchError::transport(&err))
    }

    fn lookup_url(&self, marker: &Marker) -> String {
        self.lookup_url_on(&self.config.lookup_base, marker)
    }

    fn lookup_url_on(&self, base: &str, marker: &Marker) -> String {
        let mut params = format!(
            "arg={}&env={}",
            query::escape(&attachlink_codec::encode(&marker.raw_argument)),
            query::escape(&marker.environment),
        );
        if let Some(user) = &self.config.user {
            params.push_str("&user=");
            params.push_str(&query::escape(user));
        }
        query::join(base, &params)
    }

    fn list_url(&self) -> String {
        Self::list_url_on(self.config.list_base.as_deref().unwrap_or_default())
    }

    fn list_url_on(base: &str) -> String {
        format!("{}/attachments/", base.trim_end_matches('/'))
    }

    fn list_body(&self, marker: &Marker) -> serde_json::Value {
        let mut body = serde_json::Map::new();
        body.insert(
            self.config.id_field.clone(),
            serde_json::Value::String(marker.reference_id.clone()),
        );
        serde_json::Value::Object(body)
    }
}
