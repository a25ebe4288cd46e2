//! Download page generation.

mod render;
pub mod revalidate;

use anyhow::Result;
use futures_util::future::try_join;
use log::{info, warn};

use crate::config::Config;
use crate::github::{ReleaseSource, RepoId};
use crate::platform::Platform;
use crate::version::{Version, aggregate_versions};

pub use render::{DownloadPage, escape};
pub use revalidate::{REVALIDATE_INTERVAL, Revalidation, Revalidator, write_atomic};

/// Result of one page generation cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageOutcome {
    Found(String),
    /// Repository coordinates are not configured; nothing was fetched.
    NotFound,
}

/// Fetches all releases and the latest release, then builds the display versions.
#[tracing::instrument(skip(source))]
pub async fn load_versions<S>(source: &S, repo: &RepoId) -> Result<Vec<Version>>
where
    S: ReleaseSource + ?Sized,
{
    let (releases, latest) = try_join(
        source.fetch_all_releases(repo),
        source.fetch_latest_release(repo),
    )
    .await?;

    let fetched = releases.len();
    let versions = aggregate_versions(releases, &latest);
    info!(
        "{}: {} release(s) fetched, {} shown, latest is {}",
        repo,
        fetched,
        versions.len(),
        latest.tag_name
    );

    Ok(versions)
}

/// Generates the download page HTML for the configured repository.
#[tracing::instrument(skip(config, source))]
pub async fn generate_download_page<S>(
    config: &Config,
    source: &S,
    platform: Platform,
) -> Result<PageOutcome>
where
    S: ReleaseSource + ?Sized,
{
    let repo = match config.repository() {
        Ok(repo) => repo,
        Err(reason) => {
            warn!("Download page not generated: {}", reason);
            return Ok(PageOutcome::NotFound);
        }
    };

    let versions = load_versions(source, repo).await?;
    let page = DownloadPage::new(&versions, &config.aur_packages);

    Ok(PageOutcome::Found(page.render_document(platform)))
}
