use super::{Version, VersionAsset};

/// Installer formats offered on the download page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    Deb,
    AppImage,
    Msi,
    Dmg,
}

impl AssetKind {
    pub const ALL: [AssetKind; 4] = [
        AssetKind::Deb,
        AssetKind::AppImage,
        AssetKind::Msi,
        AssetKind::Dmg,
    ];

    /// File name suffix identifying the format. Matching is case-sensitive.
    pub fn suffix(self) -> &'static str {
        match self {
            AssetKind::Deb => ".deb",
            AssetKind::AppImage => ".AppImage",
            AssetKind::Msi => ".msi",
            AssetKind::Dmg => ".dmg",
        }
    }

    pub fn matches(self, file_name: &str) -> bool {
        file_name.ends_with(self.suffix())
    }
}

/// The first asset of each installer format found in a version.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlatformAssets<'a> {
    pub deb: Option<&'a VersionAsset>,
    pub app_image: Option<&'a VersionAsset>,
    pub msi: Option<&'a VersionAsset>,
    pub dmg: Option<&'a VersionAsset>,
}

impl<'a> PlatformAssets<'a> {
    pub fn find(version: &'a Version) -> Self {
        let first = move |kind: AssetKind| {
            version
                .assets
                .iter()
                .find(|asset| kind.matches(&asset.name))
        };

        PlatformAssets {
            deb: first(AssetKind::Deb),
            app_image: first(AssetKind::AppImage),
            msi: first(AssetKind::Msi),
            dmg: first(AssetKind::Dmg),
        }
    }

    /// Like [`PlatformAssets::find`], but tolerates a missing version.
    pub fn find_in(version: Option<&'a Version>) -> Self {
        version.map(Self::find).unwrap_or_default()
    }

    pub fn get(&self, kind: AssetKind) -> Option<&'a VersionAsset> {
        match kind {
            AssetKind::Deb => self.deb,
            AssetKind::AppImage => self.app_image,
            AssetKind::Msi => self.msi,
            AssetKind::Dmg => self.dmg,
        }
    }
}
