//! Display model built from raw GitHub releases.

mod assets;

use serde::Serialize;

use crate::github::Release;

pub use assets::{AssetKind, PlatformAssets};

/// Releases with fewer assets than this are treated as incomplete builds and hidden.
pub const MIN_ASSET_COUNT: usize = 5;

/// A downloadable file of a version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionAsset {
    pub name: String,
    pub url: String,
}

/// A release as displayed on the download page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Version {
    pub tag: String,
    pub description: Option<String>,
    pub latest: bool,
    pub assets: Vec<VersionAsset>,
}

impl Version {
    fn from_release(release: Release, latest_tag: &str) -> Self {
        Version {
            latest: release.tag_name == latest_tag,
            description: release.body.filter(|body| !body.is_empty()),
            assets: release
                .assets
                .into_iter()
                .map(|asset| VersionAsset {
                    name: asset.name,
                    url: asset.browser_download_url,
                })
                .collect(),
            tag: release.tag_name,
        }
    }
}

/// Turns the upstream release list into display versions, keeping upstream order.
pub fn aggregate_versions(releases: Vec<Release>, latest: &Release) -> Vec<Version> {
    releases
        .into_iter()
        .filter(|release| release.assets.len() >= MIN_ASSET_COUNT)
        .map(|release| Version::from_release(release, &latest.tag_name))
        .collect()
}

/// The version flagged as latest, if it survived aggregation.
pub fn latest_version(versions: &[Version]) -> Option<&Version> {
    versions.iter().find(|version| version.latest)
}

/// Rows of the older versions table.
pub fn older_versions(versions: &[Version]) -> impl Iterator<Item = &Version> {
    versions
        .iter()
        .filter(|version| version.assets.len() >= MIN_ASSET_COUNT && !version.latest)
}
