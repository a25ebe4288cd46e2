//! Periodic regeneration of the download page.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use log::{debug, info, warn};
use tokio::time::MissedTickBehavior;

use super::{PageOutcome, generate_download_page};
use crate::config::{Config, ConfigError};
use crate::github::ReleaseSource;
use crate::platform::Platform;

/// Maximum age of a published page before it is regenerated.
pub const REVALIDATE_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// What a revalidation cycle did with the published page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Revalidation {
    /// A new page was written.
    Updated,
    /// The regenerated page matched the published one; nothing was written.
    Unchanged,
    /// Generation failed; the previously published page stays in place.
    Kept,
}

pub struct Revalidator<S> {
    config: Config,
    source: S,
    platform: Platform,
    output: PathBuf,
    interval: Duration,
    last_render: Option<String>,
}

impl<S: ReleaseSource> Revalidator<S> {
    pub fn new(config: Config, source: S, platform: Platform, output: PathBuf) -> Self {
        Self {
            config,
            source,
            platform,
            output,
            interval: REVALIDATE_INTERVAL,
            last_render: None,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn last_render(&self) -> Option<&str> {
        self.last_render.as_deref()
    }

    /// Runs one generation cycle.
    ///
    /// Fetch and write failures are logged and leave the published page
    /// untouched. A missing repository configuration is returned as an error
    /// since no later cycle can succeed either.
    #[tracing::instrument(skip(self), fields(output = %self.output.display()))]
    pub async fn revalidate_once(&mut self) -> Result<Revalidation> {
        let html = match generate_download_page(&self.config, &self.source, self.platform).await {
            Ok(PageOutcome::Found(html)) => html,
            Ok(PageOutcome::NotFound) => return Err(ConfigError::MissingRepository.into()),
            Err(err) => {
                warn!("Revalidation failed, keeping previous page: {:#}", err);
                return Ok(Revalidation::Kept);
            }
        };

        let published = tokio::fs::try_exists(&self.output).await.unwrap_or(false);
        if published && self.last_render.as_deref() == Some(html.as_str()) {
            debug!("Page unchanged");
            return Ok(Revalidation::Unchanged);
        }

        if let Err(err) = write_atomic(&self.output, &html).await {
            warn!("Revalidation failed, keeping previous page: {:#}", err);
            return Ok(Revalidation::Kept);
        }
        info!("Wrote {}", self.output.display());
        self.last_render = Some(html);
        Ok(Revalidation::Updated)
    }

    /// Regenerates the page immediately and then once per interval, forever.
    pub async fn run(mut self) -> Result<()> {
        self.config.repository()?;

        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            self.revalidate_once().await?;
        }
    }
}

/// Writes through a sibling temporary file so readers never see a partial page.
/// The temporary file is removed again if the page cannot be moved into place.
pub async fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    let result: Result<()> = async {
        tokio::fs::write(&tmp, contents)
            .await
            .with_context(|| format!("Failed to write {}", tmp.display()))?;
        tokio::fs::rename(&tmp, path)
            .await
            .with_context(|| format!("Failed to move page into place at {}", path.display()))?;
        Ok(())
    }
    .await;

    if result.is_err() && tokio::fs::remove_file(&tmp).await.is_ok() {
        debug!("Removed {}", tmp.display());
    }
    result
}
