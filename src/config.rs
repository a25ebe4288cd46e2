//! Explicit configuration passed into the fetchers and the page generator.

use std::fmt;

use url::Url;

use crate::github::RepoId;

/// Default GitHub REST/GraphQL API base URL.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Default base URL used to build sponsor profile links.
pub const DEFAULT_SITE_URL: &str = "https://github.com";

/// Errors raised when a required configuration value is absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// No personal access token was configured.
    MissingCredential,
    /// The repository owner or name was not configured.
    MissingRepository,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::MissingCredential => {
                write!(f, "GITHUB_PERSONAL_ACCESS_TOKEN is not set")
            }
            ConfigError::MissingRepository => {
                write!(f, "GITHUB_USERNAME and GITHUB_REPO must both be set")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: String,
    pub site_url: Url,
    pub token: Option<String>,
    pub repo: Option<RepoId>,
    /// AUR package names advertised in the Linux download block.
    pub aur_packages: Vec<String>,
}

impl Config {
    /// Builds a configuration from optional raw values, as supplied by the CLI.
    ///
    /// Empty strings count as absent, matching how unset variables are
    /// commonly exported by hosting pipelines.
    pub fn new(
        api_url: Option<String>,
        site_url: Option<&str>,
        token: Option<String>,
        owner: Option<String>,
        repo: Option<String>,
    ) -> anyhow::Result<Self> {
        let site_url = match site_url {
            Some(raw) => Url::parse(raw)?,
            None => Url::parse(DEFAULT_SITE_URL)?,
        };

        let repo = match (non_empty(owner), non_empty(repo)) {
            (Some(owner), Some(repo)) => Some(RepoId { owner, repo }),
            _ => None,
        };

        Ok(Self {
            api_url: non_empty(api_url)
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            site_url,
            token: non_empty(token),
            repo,
            aur_packages: Vec::new(),
        })
    }

    pub fn with_aur_packages(mut self, packages: Vec<String>) -> Self {
        self.aur_packages = packages;
        self
    }

    /// The personal access token, or the reason the sponsor feature is disabled.
    pub fn credential(&self) -> Result<&str, ConfigError> {
        self.token.as_deref().ok_or(ConfigError::MissingCredential)
    }

    /// The repository whose releases are shown on the download page.
    pub fn repository(&self) -> Result<&RepoId, ConfigError> {
        self.repo.as_ref().ok_or(ConfigError::MissingRepository)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
