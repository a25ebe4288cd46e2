//! GitHub release and sponsor fetchers.

mod sponsors;
mod types;

use anyhow::Result;
use async_trait::async_trait;
use log::debug;
use std::fmt;

use crate::http::HttpClient;

pub use sponsors::{Sponsor, SponsorDetails, SponsorError, SponsorFetcher, build_sponsors_query};
pub use types::{Asset, Release, User};

/// Repository identifier (owner/repo format).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoId {
    pub owner: String,
    pub repo: String,
}

impl fmt::Display for RepoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

/// Source of release records for a repository.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReleaseSource: Send + Sync {
    /// Fetch the first page of releases, newest first, as returned upstream.
    async fn fetch_all_releases(&self, repo: &RepoId) -> Result<Vec<Release>>;

    /// Fetch the release GitHub marks as latest.
    async fn fetch_latest_release(&self, repo: &RepoId) -> Result<Release>;
}

pub struct GitHub {
    http_client: HttpClient,
    api_url: String,
}

impl GitHub {
    pub fn new(http_client: HttpClient, api_url: &str) -> Self {
        Self {
            http_client,
            api_url: api_url.trim_end_matches('/').to_string(),
        }
    }

    fn releases_url(&self, repo: &RepoId) -> String {
        format!("{}/repos/{}/{}/releases", self.api_url, repo.owner, repo.repo)
    }
}

#[async_trait]
impl ReleaseSource for GitHub {
    #[tracing::instrument(skip(self))]
    async fn fetch_all_releases(&self, repo: &RepoId) -> Result<Vec<Release>> {
        let url = self.releases_url(repo);
        debug!("Fetching releases from {}...", url);
        self.http_client.get_json(&url).await
    }

    #[tracing::instrument(skip(self))]
    async fn fetch_latest_release(&self, repo: &RepoId) -> Result<Release> {
        let url = format!("{}/latest", self.releases_url(repo));
        debug!("Fetching latest release from {}...", url);
        self.http_client.get_json(&url).await
    }
}
