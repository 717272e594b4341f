use crate::config::{DelayRange, ScoutConfig};
use crate::error::{Result, ScraperError};
use crate::scrapers::retry::{RetryEvent, RetryPolicy, RetryState};
use crate::scrapers::traits::DocumentFetcher;
use async_trait::async_trait;
use rand::seq::SliceRandom;
use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

/// Desktop browsers we present as, one picked per attempt
const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 14_4) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.4 Safari/605.1.15",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:125.0) Gecko/20100101 Firefox/125.0",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/123.0.0.0 Safari/537.36",
];

fn random_user_agent() -> &'static str {
    USER_AGENTS
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(USER_AGENTS[0])
}

fn browser_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::ACCEPT,
        HeaderValue::from_static(
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8",
        ),
    );
    headers.insert(
        header::ACCEPT_LANGUAGE,
        HeaderValue::from_static("cs-CZ,cs;q=0.9,en;q=0.7"),
    );
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    headers.insert(header::PRAGMA, HeaderValue::from_static("no-cache"));
    headers.insert(
        header::UPGRADE_INSECURE_REQUESTS,
        HeaderValue::from_static("1"),
    );
    headers
}

/// HTTP page fetcher with politeness delay, retries and UA rotation
pub struct HttpFetcher {
    client: Client,
    policy: RetryPolicy,
    timeout: Duration,
    politeness_delay: DelayRange,
    retry_delay: DelayRange,
}

impl HttpFetcher {
    pub fn new(config: &ScoutConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .default_headers(browser_headers())
            .build()
            .map_err(|e| ScraperError::internal(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            policy: RetryPolicy::new(config.max_retries),
            timeout: config.request_timeout(),
            politeness_delay: config.politeness_delay,
            retry_delay: config.retry_delay,
        })
    }

    /// One request, no retries.
    async fn attempt(&self, url: &Url, attempt: u32) -> Result<String> {
        let user_agent = random_user_agent();
        debug!(%url, attempt, user_agent, "Fetching page");

        let response = self
            .client
            .get(url.clone())
            .header(header::USER_AGENT, user_agent)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        if !status.is_success() {
            warn!(%url, status = status.as_u16(), attempt, "Listing site returned error status");
            return Err(ScraperError::HttpStatus {
                status: status.as_u16(),
            });
        }

        let html = response.text().await.map_err(|e| self.classify(e))?;
        debug!(%url, bytes = html.len(), "Downloaded page");
        Ok(html)
    }

    fn classify(&self, err: reqwest::Error) -> ScraperError {
        if err.is_timeout() {
            ScraperError::Timeout {
                timeout_secs: self.timeout.as_secs(),
            }
        } else {
            ScraperError::from(err)
        }
    }
}

#[async_trait]
impl DocumentFetcher for HttpFetcher {
    async fn fetch_document(&self, url: &Url) -> Result<String> {
        tokio::time::sleep(self.politeness_delay.sample()).await;

        let mut state = self.policy.start();
        let mut body = None;
        let mut last_error = None;

        loop {
            state = match state {
                RetryState::Attempting { attempt } => match self.attempt(url, attempt).await {
                    Ok(html) => {
                        body = Some(html);
                        self.policy.transition(state, RetryEvent::Success)
                    }
                    Err(err) => {
                        let event = if err.is_retryable() {
                            RetryEvent::RetryableFailure
                        } else {
                            RetryEvent::FatalFailure
                        };
                        warn!(%url, attempt, error = %err, "Fetch attempt failed");
                        last_error = Some(err);
                        self.policy.transition(state, event)
                    }
                },
                RetryState::Backoff { attempt } => {
                    let delay = self.retry_delay.sample();
                    info!(%url, attempt, delay_ms = delay.as_millis() as u64, "Retrying after backoff");
                    tokio::time::sleep(delay).await;
                    self.policy.transition(state, RetryEvent::BackoffElapsed)
                }
                RetryState::Succeeded => {
                    return body.ok_or_else(|| ScraperError::internal("fetch succeeded without a body"));
                }
                RetryState::Failed {
                    attempts,
                    exhausted,
                } => {
                    let err = last_error
                        .unwrap_or_else(|| ScraperError::internal("fetch failed without an error"));
                    return Err(if exhausted {
                        ScraperError::RetriesExhausted {
                            attempts,
                            last: Box::new(err),
                        }
                    } else {
                        err
                    });
                }
            };
        }
    }
}
