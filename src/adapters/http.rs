use crate::config::{HttpSettings, RetryPolicy};
use crate::domain::ports::JsonSource;
use crate::utils::error::{HarnessError, Result};
use async_trait::async_trait;
use reqwest::{header, Client, Response};
use serde_json::Value;
use std::time::Duration;
use url::Url;

/// reqwest client that retries on the statuses named by its [`RetryPolicy`].
#[derive(Debug, Clone)]
pub struct RetryingClient {
    client: Client,
    retry: RetryPolicy,
}

impl RetryingClient {
    pub fn new(http: &HttpSettings, retry: RetryPolicy) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(http.connect_timeout)
            .read_timeout(http.read_timeout)
            .build()
            .map_err(|e| HarnessError::ConfigError {
                message: format!("failed to build HTTP client: {}", e),
            })?;

        Ok(Self { client, retry })
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// GET with status-based retries; the last retryable status becomes `RetriesExhausted`.
    pub async fn get(&self, url: &Url) -> Result<Response> {
        let mut attempts = 0;

        backoff::future::retry_notify(
            self.retry.schedule(),
            || {
                attempts += 1;
                self.attempt(url, attempts)
            },
            |err: HarnessError, delay: Duration| {
                if let HarnessError::RetriesExhausted { url, status, attempts } = err {
                    tracing::debug!(
                        "🔄 {} returned {}, retry {}/{} in {:?}",
                        url,
                        status,
                        attempts,
                        self.retry.total,
                        delay
                    );
                }
            },
        )
        .await
    }

    async fn attempt(
        &self,
        url: &Url,
        attempt: u32,
    ) -> std::result::Result<Response, backoff::Error<HarnessError>> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| backoff::Error::permanent(classify(url, e)))?;

        let status = response.status().as_u16();
        if !self.retry.should_retry(status) {
            return Ok(response);
        }

        let err = HarnessError::RetriesExhausted {
            url: url.to_string(),
            status,
            attempts: attempt,
        };
        // Retry-After bypasses the schedule, so the budget is enforced here too
        if attempt > self.retry.total {
            return Err(backoff::Error::permanent(err));
        }
        Err(backoff::Error::Transient {
            err,
            retry_after: self.retry.retry_after_delay(retry_after(&response)),
        })
    }
}

/// Maps a reqwest failure onto the harness taxonomy.
///
/// Connect timeouts count as connection failures, not read timeouts.
pub fn classify(url: &Url, err: reqwest::Error) -> HarnessError {
    let url = url.to_string();
    if err.is_connect() {
        HarnessError::Connection { url, source: err }
    } else if err.is_timeout() {
        HarnessError::Timeout { url, source: err }
    } else {
        HarnessError::Request { url, source: err }
    }
}

fn retry_after(response: &Response) -> Option<Duration> {
    let value = response.headers().get(header::RETRY_AFTER)?.to_str().ok()?;
    parse_retry_after(value, chrono::Utc::now())
}

/// Accepts delta-seconds or an HTTP-date.
pub fn parse_retry_after(value: &str, now: chrono::DateTime<chrono::Utc>) -> Option<Duration> {
    let value = value.trim();
    if let Ok(secs) = value.parse::<u64>() {
        return Some(Duration::from_secs(secs));
    }

    let at = chrono::DateTime::parse_from_rfc2822(value).ok()?;
    let delta = at.with_timezone(&chrono::Utc) - now;
    Some(delta.to_std().unwrap_or(Duration::ZERO))
}

/// One of the two servers under comparison.
#[derive(Debug, Clone)]
pub struct HttpEndpoint {
    base: Url,
    client: RetryingClient,
}

impl HttpEndpoint {
    pub fn new(base_url: &str, client: RetryingClient) -> Result<Self> {
        let base = Url::parse(base_url).map_err(|e| HarnessError::InvalidConfigValueError {
            field: "base_url".to_string(),
            value: base_url.to_string(),
            reason: format!("Invalid URL format: {}", e),
        })?;

        if base.cannot_be_a_base() {
            return Err(HarnessError::InvalidConfigValueError {
                field: "base_url".to_string(),
                value: base_url.to_string(),
                reason: "URL cannot be used as a base".to_string(),
            });
        }

        Ok(Self { base, client })
    }

    /// Appends each segment percent-encoded, so `a/b` stays one segment.
    pub fn url_for(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| HarnessError::ConfigError {
                    message: format!("{} cannot be used as a base URL", self.base),
                })?;
            path.pop_if_empty();
            for segment in segments {
                path.push(segment);
            }
        }
        Ok(url)
    }
}

#[async_trait]
impl JsonSource for HttpEndpoint {
    fn base_url(&self) -> &str {
        self.base.as_str()
    }

    async fn get_json(&self, segments: &[&str]) -> Result<Value> {
        let url = self.url_for(segments)?;
        tracing::debug!("GET {}", url);

        let response = self.client.get(&url).await?;
        tracing::debug!("{} responded {}", url, response.status());

        let body = response.text().await.map_err(|e| classify(&url, e))?;
        serde_json::from_str(&body).map_err(|source| HarnessError::InvalidJson {
            url: url.to_string(),
            source,
        })
    }
}
