//! In-memory fetcher for driving the scrape loops without a network.

use std::{collections::HashMap, sync::Mutex};

use async_trait::async_trait;

use crate::{
    config::{ScrapingConfig, ScrapingEnv},
    requests::PageFetcher,
};

#[derive(Default)]
pub struct StubFetcher {
    pages: HashMap<String, String>,
    requested: Mutex<Vec<String>>,
}

impl StubFetcher {
    pub fn with_page(mut self, url: &str, body: &str) -> Self {
        self.pages.insert(url.to_string(), body.to_string());
        self
    }

    pub fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait]
impl PageFetcher for StubFetcher {
    async fn fetch_url_body(&self, url: &str) -> anyhow::Result<String> {
        self.requested.lock().unwrap().push(url.to_string());
        self.pages
            .get(url)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("404 for {url}"))
    }
}

/// Config pointing at example.com with no delay between requests.
pub fn test_config(pages_to_parse: u32) -> ScrapingConfig {
    let mut config = ScrapingConfig::from_env(ScrapingEnv::default()).unwrap();
    config.base_url = "https://example.com/recipes".parse().unwrap();
    config.pages_to_parse = pages_to_parse;
    config.request_delay = std::time::Duration::ZERO;
    config
}
