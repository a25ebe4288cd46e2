//! Visitor operating system detection.
//!
//! Detection needs the visitor's platform identifier (`navigator.platform` in
//! a browser), which is not available when the page is generated. The page is
//! therefore rendered platform-neutral first and refined afterwards, see
//! [`PlatformState`].

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Platform {
    Windows,
    Linux,
    Osx,
    #[default]
    Unknown,
}

impl Platform {
    /// Platforms that have a dedicated download block.
    pub const KNOWN: [Platform; 3] = [Platform::Windows, Platform::Linux, Platform::Osx];

    /// Classifies a platform identifier such as `Win32`, `Linux x86_64` or `MacIntel`.
    ///
    /// The page's `REFINE_SCRIPT` (`page/render.rs`) applies the same rules in
    /// the browser; keep the two in sync.
    pub fn detect(identifier: &str) -> Self {
        let identifier = identifier.to_lowercase();

        if identifier.contains("windows") || identifier.starts_with("win") {
            Platform::Windows
        } else if identifier.contains("linux") {
            Platform::Linux
        } else if identifier.contains("mac") {
            Platform::Osx
        } else {
            Platform::Unknown
        }
    }

    /// Human readable name used in headings.
    pub fn display_name(self) -> &'static str {
        match self {
            Platform::Windows => "Windows",
            Platform::Linux => "Linux",
            Platform::Osx => "MacOS",
            Platform::Unknown => "Unknown operating system",
        }
    }

    /// Identifier used in markup and on the command line.
    pub fn id(self) -> &'static str {
        match self {
            Platform::Windows => "windows",
            Platform::Linux => "linux",
            Platform::Osx => "osx",
            Platform::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// The platform shown to one visitor.
///
/// Starts as [`Platform::Unknown`] so the first render shows every platform
/// without emphasis, then is refined once the client identifier is known.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlatformState {
    current: Platform,
}

impl PlatformState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Platform {
        self.current
    }

    /// Applies the client-side identifier. Returns true when the value changed.
    pub fn refine(&mut self, identifier: &str) -> bool {
        let detected = Platform::detect(identifier);
        let changed = detected != self.current;
        self.current = detected;
        changed
    }
}
