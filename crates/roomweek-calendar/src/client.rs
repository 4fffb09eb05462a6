//! HTTP client for the library events feed.

use std::time::Duration;

use reqwest::header::ACCEPT;
use reqwest::Url;
use serde_json::Value;
use tracing::instrument;

use crate::error::CalendarError;
use crate::retry::{with_retry, RetryConfig};

/// Downloads the raw feed document. Parsing into events happens later.
pub struct FeedClient {
    client: reqwest::Client,
    url: Url,
    retry: RetryConfig,
}

impl FeedClient {
    pub fn new(url: &str, timeout: Duration) -> Result<Self, CalendarError> {
        let url = Url::parse(url)
            .map_err(|e| CalendarError::invalid(format!("feed URL `{url}` is invalid: {e}")))?;
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            url,
            retry: RetryConfig::default(),
        })
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Fetch the feed as untyped JSON.
    #[instrument(skip(self), fields(url = %self.url), level = "info")]
    pub async fn fetch(&self) -> Result<Value, CalendarError> {
        let response = with_retry(&self.retry, || {
            self.client
                .get(self.url.clone())
                .header(ACCEPT, "application/json")
                .send()
        })
        .await?;

        self.handle_response(response).await
    }

    async fn handle_response(&self, response: reqwest::Response) -> Result<Value, CalendarError> {
        let status = response.status();

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            tracing::warn!("Feed request failed with {}", status);
            return Err(CalendarError::ApiError {
                status: status.as_u16(),
                message: text,
            });
        }

        let body = response.text().await?;
        let feed: Value = serde_json::from_str(&body)
            .map_err(|e| CalendarError::InvalidResponse(format!("JSON parse error: {}", e)))?;

        tracing::debug!("Fetched feed ({} bytes)", body.len());
        Ok(feed)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> FeedClient {
        FeedClient::new(&format!("{}/events.json", server.uri()), Duration::from_secs(5))
            .unwrap()
            .with_retry(RetryConfig::new(2, 1, 5))
    }

    #[tokio::test]
    async fn test_fetch_feed() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/events.json"))
            .and(header("Accept", "application/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                [[{"title": "Story Time", "start_date": "2024-02-05"}]]
            ])))
            .expect(1)
            .mount(&mock_server)
            .await;

        let feed = client_for(&mock_server).fetch().await.unwrap();
        assert_eq!(feed[0][0][0]["title"], "Story Time");
    }

    #[tokio::test]
    async fn test_not_found_is_not_retried() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/events.json"))
            .respond_with(ResponseTemplate::new(404).set_body_string("no such feed"))
            .expect(1)
            .mount(&mock_server)
            .await;

        let err = client_for(&mock_server).fetch().await.unwrap_err();
        assert!(matches!(
            err,
            CalendarError::ApiError { status: 404, ref message } if message == "no such feed"
        ));
    }

    #[tokio::test]
    async fn test_server_error_is_retried() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/events.json"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(2)
            .expect(2)
            .mount(&mock_server)
            .await;

        Mock::given(method("GET"))
            .and(path("/events.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([[]])))
            .expect(1)
            .mount(&mock_server)
            .await;

        let feed = client_for(&mock_server).fetch().await.unwrap();
        assert_eq!(feed, serde_json::json!([[]]));
    }

    #[tokio::test]
    async fn test_retries_exhausted_reports_status() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/events.json"))
            .respond_with(ResponseTemplate::new(500))
            .expect(3)
            .mount(&mock_server)
            .await;

        let err = client_for(&mock_server).fetch().await.unwrap_err();
        assert!(matches!(err, CalendarError::ApiError { status: 500, .. }));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_malformed_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/events.json"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&mock_server)
            .await;

        let err = client_for(&mock_server).fetch().await.unwrap_err();
        assert!(matches!(err, CalendarError::InvalidResponse(_)));
    }

    #[test]
    fn test_invalid_url_rejected() {
        let err = FeedClient::new("not a url", Duration::from_secs(1)).err().unwrap();
        assert!(matches!(err, CalendarError::InvalidInput(ref m) if m.contains("not a url")));
    }
}
