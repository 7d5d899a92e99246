//! Retrieval of the remote manifest

use std::time::Duration;

#[cfg(test)]
use mockall::automock;
use reqwest::StatusCode;
use reqwest::header::{CACHE_CONTROL, HeaderValue};
use tracing::{debug, warn};

use crate::check::error::FetchError;
use crate::config::{FETCH_CONNECT_TIMEOUT_MS, FETCH_READ_TIMEOUT_MS};

/// Trait for fetching the manifest text
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait Fetcher: Send + Sync {
    /// GET `url` once.
    ///
    /// # Returns
    /// * `Ok(Some(body))` - The server answered 200 or 201
    /// * `Ok(None)` - Any other status; there is nothing to evaluate
    /// * `Err(FetchError)` - Transport failure or timeout
    async fn fetch(&self, url: &str) -> Result<Option<String>, FetchError>;
}

/// [`Fetcher`] over HTTP(S)
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self, FetchError> {
        Self::with_timeouts(
            Duration::from_millis(FETCH_CONNECT_TIMEOUT_MS),
            Duration::from_millis(FETCH_READ_TIMEOUT_MS),
        )
    }

    pub fn with_timeouts(connect: Duration, read: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .user_agent("update-siren")
            .connect_timeout(connect)
            .read_timeout(read)
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait::async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Option<String>, FetchError> {
        let parsed = reqwest::Url::parse(url).map_err(|e| FetchError::InvalidUrl(e.to_string()))?;

        debug!("Fetching manifest from {}", parsed);
        let response = self
            .client
            .get(parsed)
            .header(CACHE_CONTROL, HeaderValue::from_static("no-cache"))
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK && status != StatusCode::CREATED {
            warn!("Manifest server returned status {}: {}", status, url);
            return Ok(None);
        }

        Ok(Some(response.text().await?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;
    use rstest::rstest;

    #[rstest]
    #[case(200)]
    #[case(201)]
    #[tokio::test]
    async fn fetch_returns_body_for_success_statuses(#[case] status: usize) {
        let mut server = Server::new_async().await;
        let body = r#"{"com.app":{"minVersionName":"2.0.0"}}"#;

        let mock = server
            .mock("GET", "/manifest.json")
            .match_header("cache-control", "no-cache")
            .with_status(status)
            .with_header("content-type", "application/json")
            .with_body(body)
            .create_async()
            .await;

        let fetcher = HttpFetcher::new().unwrap();
        let result = fetcher
            .fetch(&format!("{}/manifest.json", server.url()))
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(result.as_deref(), Some(body));
    }

    #[rstest]
    #[case(204)]
    #[case(304)]
    #[case(404)]
    #[case(500)]
    #[tokio::test]
    async fn fetch_returns_none_for_other_statuses(#[case] status: usize) {
        let mut server = Server::new_async().await;

        let mock = server
            .mock("GET", "/manifest.json")
            .with_status(status)
            .create_async()
            .await;

        let fetcher = HttpFetcher::new().unwrap();
        let result = fetcher
            .fetch(&format!("{}/manifest.json", server.url()))
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(result, None);
    }

    #[tokio::test]
    async fn fetch_rejects_invalid_url() {
        let fetcher = HttpFetcher::new().unwrap();
        let result = fetcher.fetch("not a url").await;

        assert!(matches!(result, Err(FetchError::InvalidUrl(_))));
    }

    #[tokio::test]
    async fn fetch_reports_connection_failure_as_network_error() {
        // Nothing listens on the discard port
        let fetcher = HttpFetcher::new().unwrap();
        let result = fetcher.fetch("http://127.0.0.1:9/manifest.json").await;

        assert!(matches!(result, Err(FetchError::Network(_))));
    }

    #[tokio::test]
    async fn fetch_reports_read_timeout_as_network_error() {
        // Accept the connection but never answer
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            let (_socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(30)).await;
        });

        let fetcher =
            HttpFetcher::with_timeouts(Duration::from_secs(1), Duration::from_millis(200)).unwrap();
        let result = fetcher
            .fetch(&format!("http://{addr}/manifest.json"))
            .await;

        server.abort();
        assert!(matches!(result, Err(FetchError::Network(_))));
    }
}
