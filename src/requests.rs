use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::{Client, ClientBuilder, Response};

use crate::ratelimit::RateLimiter;

/// Anything that can turn a url into a page body.
///
/// The scrape loops only depend on this, so tests can feed canned markup.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch_url_body(&self, url: &str) -> anyhow::Result<String>;
}

pub struct RequestClient {
    client: Client,
    rate_limiter: RateLimiter,
}

impl RequestClient {
    pub fn new(request_delay: Duration) -> anyhow::Result<Self> {
        let client = ClientBuilder::new()
            .timeout(Duration::from_secs(30))
            .build()?;
        let rate_limiter = RateLimiter::new(request_delay);
        Ok(Self {
            client,
            rate_limiter,
        })
    }

    pub async fn fetch_url_response(&self, url: &str) -> anyhow::Result<Response> {
        let response = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()
            .with_context(|| format!("bad status fetching {url}"))?;
        Ok(response)
    }
}

#[async_trait]
impl PageFetcher for RequestClient {
    async fn fetch_url_body(&self, url: &str) -> anyhow::Result<String> {
        // The delay runs from the end of the previous fetch, body included.
        self.rate_limiter
            .throttle(async {
                let response = self.fetch_url_response(url).await?;
                let body = response.text().await?;
                Ok::<_, anyhow::Error>(body)
            })
            .await
    }
}
