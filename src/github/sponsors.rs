//! Sponsor list retrieval through the GitHub GraphQL API.

use std::fmt;

use log::{debug, info};
use serde::Serialize;
use url::Url;

use super::types::User;
use crate::config::{Config, ConfigError};
use crate::http::HttpClient;

/// A sponsor as shown on the site.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sponsor {
    pub handle: String,
    pub avatar: String,
    pub details: SponsorDetails,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct SponsorDetails {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html_url: Option<String>,
}

/// Why a sponsor list could not be produced.
#[derive(Debug)]
pub enum SponsorError {
    /// The feature is not configured; no request was made.
    Disabled(ConfigError),
    /// A request to GitHub failed or returned an unexpected shape.
    Request(anyhow::Error),
}

impl fmt::Display for SponsorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SponsorError::Disabled(reason) => write!(f, "Sponsors are disabled: {}", reason),
            SponsorError::Request(err) => write!(f, "Failed to fetch sponsors: {:#}", err),
        }
    }
}

impl std::error::Error for SponsorError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SponsorError::Disabled(reason) => Some(reason),
            SponsorError::Request(err) => Some(&**err),
        }
    }
}

impl From<anyhow::Error> for SponsorError {
    fn from(err: anyhow::Error) -> Self {
        SponsorError::Request(err)
    }
}

/// GraphQL wire types. The tier is decoded but never exposed.
mod api {
    use serde::Deserialize;

    #[derive(Deserialize, Debug)]
    pub struct AuthenticatedUser {
        pub login: String,
    }

    #[derive(Deserialize, Debug)]
    pub struct Response {
        pub data: Data,
    }

    #[derive(Deserialize, Debug)]
    pub struct Data {
        pub user: UserNode,
    }

    #[derive(Deserialize, Debug)]
    #[serde(rename_all = "camelCase")]
    pub struct UserNode {
        pub sponsorships_as_maintainer: Connection,
    }

    #[derive(Deserialize, Debug)]
    pub struct Connection {
        pub edges: Vec<Edge>,
    }

    #[derive(Deserialize, Debug)]
    pub struct Edge {
        pub node: Node,
    }

    #[derive(Deserialize, Debug)]
    #[serde(rename_all = "camelCase")]
    pub struct Node {
        pub sponsor_entity: SponsorEntity,
        #[allow(dead_code)]
        pub tier: Option<Tier>,
    }

    #[derive(Deserialize, Debug)]
    #[serde(rename_all = "camelCase")]
    pub struct SponsorEntity {
        pub login: String,
        #[allow(dead_code)]
        pub name: Option<String>,
        pub avatar_url: String,
    }

    #[derive(Deserialize, Debug)]
    #[serde(rename_all = "camelCase")]
    pub struct Tier {
        #[allow(dead_code)]
        pub monthly_price_in_dollars: u64,
    }
}

#[derive(Serialize)]
struct GraphQlRequest<'a> {
    query: &'a str,
}

/// Maximum number of sponsorship edges requested. Further pages are not fetched.
pub const SPONSORS_PAGE_SIZE: u32 = 100;

/// Builds the sponsorship query for the given maintainer login.
pub fn build_sponsors_query(username: &str) -> String {
    // Logins are limited to alphanumerics and dashes; quotes and backslashes are escaped anyway.
    let login = username.replace('\\', "\\\\").replace('"', "\\\"");
    format!(
        r#"query {{
  user(login: "{login}") {{
    sponsorshipsAsMaintainer(first: {first}) {{
      edges {{
        node {{
          sponsorEntity {{
            ... on User {{
              login
              name
              avatarUrl
            }}
            ... on Organization {{
              login
              name
              avatarUrl
            }}
          }}
          tier {{
            monthlyPriceInDollars
          }}
        }}
      }}
    }}
  }}
}}
"#,
        login = login,
        first = SPONSORS_PAGE_SIZE,
    )
}

pub struct SponsorFetcher {
    http_client: HttpClient,
    api_url: String,
    site_url: Url,
    token: Option<String>,
}

impl SponsorFetcher {
    pub fn new(http_client: HttpClient, config: &Config) -> Self {
        Self {
            http_client,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            site_url: directory_url(&config.site_url),
            token: config.token.clone(),
        }
    }

    /// Resolves the account the token belongs to.
    #[tracing::instrument(skip(self, token))]
    pub async fn fetch_authenticated_user(&self, token: &str) -> anyhow::Result<User> {
        let url = format!("{}/user", self.api_url);
        let user: api::AuthenticatedUser =
            self.http_client.get_json_authorized(&url, token).await?;
        debug!("Authenticated as {}", user.login);
        Ok(User {
            username: user.login,
        })
    }

    /// Fetches the first page of sponsors of the authenticated maintainer.
    #[tracing::instrument(skip(self))]
    pub async fn fetch_sponsors(&self) -> Result<Vec<Sponsor>, SponsorError> {
        let token = self
            .token
            .as_deref()
            .ok_or(SponsorError::Disabled(ConfigError::MissingCredential))?;

        let user = self.fetch_authenticated_user(token).await?;
        let query = build_sponsors_query(&user.username);

        let url = format!("{}/graphql", self.api_url);
        let response: api::Response = self
            .http_client
            .post_json_authorized(&url, token, &GraphQlRequest { query: &query })
            .await?;

        let sponsors: Vec<Sponsor> = response
            .data
            .user
            .sponsorships_as_maintainer
            .edges
            .into_iter()
            .map(|edge| self.to_sponsor(edge.node))
            .collect();

        info!("Fetched {} sponsor(s) for {}", sponsors.len(), user.username);
        Ok(sponsors)
    }

    fn to_sponsor(&self, node: api::Node) -> Sponsor {
        let handle = node.sponsor_entity.login;
        let html_url = self.site_url.join(&handle).ok().map(String::from);

        Sponsor {
            avatar: node.sponsor_entity.avatar_url,
            details: SponsorDetails { html_url },
            handle,
        }
    }
}

/// Makes sure relative joins append to the base path instead of replacing its last segment.
fn directory_url(url: &Url) -> Url {
    let mut url = url.clone();
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}
