use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use attachlink_client::{
    AttachmentFetcher, Authenticator, ConfigError, RequestCache,
};
use attachlink_markers::{group_by_session, Marker, MarkerStatus};

use crate::config::ResolverConfig;
use crate::decorate::{Artifact, Decorator};
use crate::stats::RunStats;

/// Terminal state of one marker after a pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkerReport {
    pub id: String,
    pub reference_id: String,
    pub session_id: String,
    pub status: MarkerStatus,
    /// What the host should render. `None` for markers this pass skipped.
    pub artifact: Option<Artifact>,
}

/// Outcome of one resolution pass, in document order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    pub markers: Vec<MarkerReport>,
    pub stats: RunStats,
}

/// Resolves a discovery snapshot: groups markers by session, authenticates
/// each group once, then chains the group's lookups in document order.
pub struct Pipeline {
    authenticator: Authenticator,
    fetcher: AttachmentFetcher,
    decorator: Decorator,
}

impl Pipeline {
    /// Builds a pipeline with a fresh request cache. The configuration is
    /// validated here, before any network traffic.
    pub fn new(config: &ResolverConfig) -> Result<Self, ConfigError> {
        Self::with_cache(config, Arc::new(RequestCache::new()))
    }

    /// Same as [`Pipeline::new`] but shares a caller-owned cache, letting
    /// several passes coalesce their lookups.
    pub fn with_cache(
        config: &ResolverConfig,
        cache: Arc<RequestCache>,
    ) -> Result<Self, ConfigError> {
        config.service.validate()?;
        let http = reqwest::Client::builder()
            .build()
            .map_err(|err| ConfigError::HttpClient(err.to_string()))?;
        Ok(Self {
            authenticator: Authenticator::new(http.clone(), config.service.auth_base.clone()),
            fetcher: AttachmentFetcher::new(http, config.service.clone(), cache),
            decorator: Decorator::new(config.decorate.clone()),
        })
    }

    pub fn cache(&self) -> &RequestCache {
        self.fetcher.cache()
    }

    /// Runs one pass over `markers`, mutating statuses in place.
    ///
    /// Groups resolve strictly one after another and markers within a group
    /// chain one lookup at a time, preserving the service's expected load
    /// shape. Markers already past `new` are skipped, so running the same
    /// snapshot twice issues no second request for anything.
    pub async fn run(&self, markers: &mut [Marker]) -> RunReport {
        let started = Instant::now();
        let mut stats = RunStats {
            markers: markers.len(),
            ..RunStats::default()
        };
        let mut artifacts: Vec<Option<Artifact>> = vec![None; markers.len()];

        for group in group_by_session(markers) {
            let eligible: Vec<usize> = group
                .members
                .iter()
                .copied()
                .filter(|&index| markers[index].status.is_new())
                .collect();
            stats.skipped += group.members.len() - eligible.len();
            if eligible.is_empty() {
                continue;
            }
            stats.groups += 1;

            for &index in &eligible {
                artifacts[index] = self.decorator.show_loading(&mut markers[index]);
            }

            match self
                .authenticator
                .authenticate(&group.session_id, &group.auth_token)
                .await
            {
                Ok(token) => {
                    for &index in &eligible {
                        let lookup = self.fetcher.fetch(&markers[index], &token).await;
                        if let Some(artifact) =
                            self.decorator.apply_result(&mut markers[index], &lookup)
                        {
                            artifacts[index] = Some(artifact);
                        }
                        stats.count(markers[index].status);
                    }
                }
                Err(err) => {
                    log::warn!(
                        "authentication failed for session {}: {err}",
                        group.session_id
                    );
                    stats.auth_failures += 1;
                    let message = err.to_string();
                    for &index in &eligible {
                        if let Some(artifact) =
                            self.decorator.apply_failure(&mut markers[index], &message)
                        {
                            artifacts[index] = Some(artifact);
                        }
                        stats.count(markers[index].status);
                    }
                }
            }
        }

        stats.time_ms = started.elapsed().as_millis() as u64;
        log::info!(
            "resolved {} markers in {} groups: {} found, {} not found, {} errors",
            stats.markers,
            stats.groups,
            stats.found,
            stats.not_found,
            stats.errors
        );

        let reports = markers
            .iter()
            .zip(artifacts)
            .map(|(marker, artifact)| MarkerReport {
                id: marker.id.clone(),
                reference_id: marker.reference_id.clone(),
                session_id: marker.session_id.clone(),
                status: marker.status,
                artifact,
            })
            .collect();

        RunReport {
            markers: reports,
            stats,
        }
    }
}
