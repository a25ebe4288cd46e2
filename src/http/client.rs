//! Thin JSON-over-HTTP client used by the GitHub fetchers.

use anyhow::{Context, Result};
use log::debug;
use reqwest::{
    Client, RequestBuilder,
    header::{AUTHORIZATION, HeaderValue},
};
use serde::{Serialize, de::DeserializeOwned};

const USER_AGENT: &str = concat!("relsite/", env!("CARGO_PKG_VERSION"));

/// Builds the shared reqwest client. GitHub rejects requests without a user agent.
pub fn build_http_client() -> Result<HttpClient> {
    let client = Client::builder()
        .user_agent(USER_AGENT)
        .build()
        .context("Failed to build HTTP client")?;

    Ok(HttpClient::new(client))
}

/// HTTP client for single-shot JSON requests. Failures are returned as-is, never retried.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// Creates a new HTTP client wrapping the given reqwest Client.
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Performs an unauthenticated GET request and deserializes the JSON response.
    #[tracing::instrument(skip(self))]
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        debug!("GET JSON from {}...", url);
        Self::send_json(self.client.get(url)).await
    }

    /// Performs a GET request carrying a bearer token.
    #[tracing::instrument(skip(self, token))]
    pub async fn get_json_authorized<T: DeserializeOwned>(
        &self,
        url: &str,
        token: &str,
    ) -> Result<T> {
        debug!("GET JSON from {} (authorized)...", url);
        let request = self.client.get(url).header(AUTHORIZATION, bearer(token)?);
        Self::send_json(request).await
    }

    /// Performs a POST request with a JSON body carrying a bearer token.
    #[tracing::instrument(skip(self, token, body))]
    pub async fn post_json_authorized<B, T>(&self, url: &str, token: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        debug!("POST JSON to {} (authorized)...", url);
        let request = self
            .client
            .post(url)
            .header(AUTHORIZATION, bearer(token)?)
            .json(body);
        Self::send_json(request).await
    }

    async fn send_json<T: DeserializeOwned>(request: RequestBuilder) -> Result<T> {
        let response = request
            .send()
            .await
            .context("Failed to send request")?
            .error_for_status()?;

        response
            .json::<T>()
            .await
            .context("Failed to parse JSON response")
    }
}

fn bearer(token: &str) -> Result<HeaderValue> {
    let mut value = HeaderValue::from_str(&format!("Bearer {}", token))
        .context("Access token contains invalid header characters")?;
    value.set_sensitive(true);
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    #[derive(serde::Deserialize, Debug, PartialEq)]
    struct TestResponse {
        name: String,
        value: i32,
    }

    #[tokio::test]
    async fn test_get_json_success() {
        let mut server = mockito::Server::new_async().await;
        let url = server.url();

        let mock = server
            .mock("GET", "/test")
            .match_header("Authorization", Matcher::Missing)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"name": "test", "value": 42}"#)
            .create_async()
            .await;

        let client = build_http_client().unwrap();
        let result: TestResponse = client.get_json(&format!("{}/test", url)).await.unwrap();

        mock.assert_async().await;
        assert_eq!(result.name, "test");
        assert_eq!(result.value, 42);
    }

    #[tokio::test]
    async fn test_get_json_sends_user_agent() {
        let mut server = mockito::Server::new_async().await;
        let url = server.url();

        let mock = server
            .mock("GET", "/test")
            .match_header("user-agent", Matcher::Regex("^relsite/".to_string()))
            .with_status(200)
            .with_body(r#"{"name": "ua", "value": 1}"#)
            .create_async()
            .await;

        let client = build_http_client().unwrap();
        let _: TestResponse = client.get_json(&format!("{}/test", url)).await.unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_get_json_not_found_is_not_retried() {
        let mut server = mockito::Server::new_async().await;
        let url = server.url();

        let mock = server
            .mock("GET", "/test")
            .with_status(404)
            .expect(1)
            .create_async()
            .await;

        let client = HttpClient::new(Client::new());
        let result: Result<serde_json::Value> = client.get_json(&format!("{}/test", url)).await;

        mock.assert_async().await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_get_json_server_error_is_not_retried() {
        let mut server = mockito::Server::new_async().await;
        let url = server.url();

        let mock = server
            .mock("GET", "/test")
            .with_status(502)
            .expect(1)
            .create_async()
            .await;

        let client = HttpClient::new(Client::new());
        let result: Result<serde_json::Value> = client.get_json(&format!("{}/test", url)).await;

        mock.assert_async().await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_get_json_malformed_body() {
        let mut server = mockito::Server::new_async().await;
        let url = server.url();

        let mock = server
            .mock("GET", "/test")
            .with_status(200)
            .with_body("not json")
            .create_async()
            .await;

        let client = HttpClient::new(Client::new());
        let result: Result<TestResponse> = client.get_json(&format!("{}/test", url)).await;

        mock.assert_async().await;
        let err = result.unwrap_err();
        assert!(err.to_string().contains("Failed to parse JSON response"));
    }

    #[tokio::test]
    async fn test_get_json_authorized_sends_bearer() {
        let mut server = mockito::Server::new_async().await;
        let url = server.url();

        let mock = server
            .mock("GET", "/user")
            .match_header(
                "Authorization",
                Matcher::Exact("Bearer test_token".to_string()),
            )
            .with_status(200)
            .with_body(r#"{"name": "me", "value": 7}"#)
            .create_async()
            .await;

        let client = HttpClient::new(Client::new());
        let result: TestResponse = client
            .get_json_authorized(&format!("{}/user", url), "test_token")
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(result.value, 7);
    }

    #[tokio::test]
    async fn test_post_json_authorized_sends_body() {
        let mut server = mockito::Server::new_async().await;
        let url = server.url();

        let mock = server
            .mock("POST", "/graphql")
            .match_header(
                "Authorization",
                Matcher::Exact("Bearer test_token".to_string()),
            )
            .match_body(Matcher::Json(serde_json::json!({"query": "{ viewer }"})))
            .with_status(200)
            .with_body(r#"{"name": "posted", "value": 3}"#)
            .create_async()
            .await;

        let client = HttpClient::new(Client::new());
        let body = serde_json::json!({"query": "{ viewer }"});
        let result: TestResponse = client
            .post_json_authorized(&format!("{}/graphql", url), "test_token", &body)
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(result.name, "posted");
    }

    #[test]
    fn test_bearer_rejects_newlines() {
        assert!(bearer("bad\ntoken").is_err());
        assert!(bearer("good").unwrap().is_sensitive());
    }
}
