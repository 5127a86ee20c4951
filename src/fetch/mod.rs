//! Page fetching with bounded exponential-backoff retry.

use crate::config::FetchConfig;
use crate::error::{Error, Result};
use reqwest::{Client, StatusCode};
use scraper::Html;
use std::time::Duration;
use tracing::{debug, warn};

/// Bounded retry schedule: exponential backoff with a hard ceiling.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl RetryPolicy {
    /// Backoff to sleep after the given failed attempt (1-based).
    pub fn backoff(&self, attempt: u32) -> Duration {
        let shift = attempt.saturating_sub(1).min(20);
        let delay = self
            .initial_backoff
            .saturating_mul(1u32.checked_shl(shift).unwrap_or(u32::MAX));
        delay.min(self.max_backoff)
    }
}

impl From<&FetchConfig> for RetryPolicy {
    fn from(config: &FetchConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            initial_backoff: Duration::from_millis(config.initial_backoff_ms),
            max_backoff: Duration::from_millis(config.max_backoff_ms),
        }
    }
}

/// One failed attempt; only transient failures are retried.
#[derive(Debug, thiserror::Error)]
enum AttemptError {
    #[error("transport: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("HTTP {0}")]
    Status(StatusCode),
}

impl AttemptError {
    fn is_transient(&self) -> bool {
        match self {
            // Timeouts, connection resets and friends
            AttemptError::Transport(_) => true,
            AttemptError::Status(status) => status.is_server_error(),
        }
    }
}

/// Retrying page fetcher
pub struct Fetcher {
    client: Client,
    retry: RetryPolicy,
}

impl Fetcher {
    pub fn new(config: &FetchConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_secs))
            .gzip(true)
            .brotli(true)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()?;

        Ok(Self {
            client,
            retry: RetryPolicy::from(config),
        })
    }

    /// Fetch a URL and parse the response body into a queryable document.
    ///
    /// Transient failures (transport errors, 5xx) are retried with capped
    /// exponential backoff; exhausting the attempts, or any non-transient
    /// failure, yields [`Error::Fetch`].
    pub async fn fetch(&self, url: &str) -> Result<Html> {
        let body = self.fetch_body(url).await?;
        Ok(Html::parse_document(&body))
    }

    async fn fetch_body(&self, url: &str) -> Result<String> {
        let mut attempt = 0u32;
        loop {
            attempt += 1;
            debug!("Fetching {} (attempt {})", url, attempt);

            let err = match self.try_get(url).await {
                Ok(body) => return Ok(body),
                Err(e) => e,
            };

            if attempt >= self.retry.max_attempts || !err.is_transient() {
                return Err(Error::Fetch {
                    url: url.to_string(),
                    reason: err.to_string(),
                });
            }

            let delay = self.retry.backoff(attempt);
            warn!(
                "Attempt {}/{} for {} failed ({}); retrying in {:?}",
                attempt, self.retry.max_attempts, url, err, delay
            );
            tokio::time::sleep(delay).await;
        }
    }

    async fn try_get(&self, url: &str) -> std::result::Result<String, AttemptError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(AttemptError::Status(status));
        }
        Ok(response.text().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn fast_config() -> FetchConfig {
        FetchConfig {
            max_attempts: 3,
            initial_backoff_ms: 1,
            max_backoff_ms: 4,
            ..FetchConfig::default()
        }
    }

    #[test]
    fn backoff_doubles_up_to_the_ceiling() {
        let policy = RetryPolicy {
            max_attempts: 8,
            initial_backoff: Duration::from_millis(1_000),
            max_backoff: Duration::from_millis(128_000),
        };
        assert_eq!(policy.backoff(1), Duration::from_millis(1_000));
        assert_eq!(policy.backoff(2), Duration::from_millis(2_000));
        assert_eq!(policy.backoff(5), Duration::from_millis(16_000));
        assert_eq!(policy.backoff(30), Duration::from_millis(128_000));
    }

    #[tokio::test]
    async fn retries_5xx_until_success() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/chronik"))
            .respond_with(ResponseTemplate::new(500))
            .up_to_n_times(2)
            .expect(2)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/chronik"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html><title>ok</title></html>"))
            .expect(1)
            .mount(&server)
            .await;

        let fetcher = Fetcher::new(&fast_config()).unwrap();
        let doc = fetcher.fetch(&format!("{}/chronik", server.uri())).await.unwrap();
        assert!(doc.root_element().html().contains("ok"));
    }

    #[tokio::test]
    async fn gives_up_after_max_attempts() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/chronik"))
            .respond_with(ResponseTemplate::new(503))
            .expect(3)
            .mount(&server)
            .await;

        let fetcher = Fetcher::new(&fast_config()).unwrap();
        let err = fetcher.fetch(&format!("{}/chronik", server.uri())).await.unwrap_err();
        assert!(matches!(err, Error::Fetch { .. }));
    }

    #[tokio::test]
    async fn client_errors_are_not_retried() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/gone"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;

        let fetcher = Fetcher::new(&fast_config()).unwrap();
        let err = fetcher.fetch(&format!("{}/gone", server.uri())).await.unwrap_err();
        assert!(matches!(err, Error::Fetch { .. }));
    }
}
