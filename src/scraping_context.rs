use log::error;

use crate::{
    config::ScrapingConfig,
    requests::{PageFetcher, RequestClient},
};

pub struct ScrapingContext<F = RequestClient> {
    pub scraping_config: ScrapingConfig,
    pub request_client: F,
}

impl ScrapingContext {
    pub fn new() -> anyhow::Result<Self> {
        let scraping_config = ScrapingConfig::new()?;
        let request_client = RequestClient::new(scraping_config.request_delay)?;
        Ok(ScrapingContext {
            scraping_config,
            request_client,
        })
    }
}

impl<F: PageFetcher> ScrapingContext<F> {
    pub fn with_fetcher(scraping_config: ScrapingConfig, request_client: F) -> Self {
        Self {
            scraping_config,
            request_client,
        }
    }

    /// Fetches one listing page.
    ///
    /// `Ok(None)` means the fetch failed and the page should be skipped; with
    /// `abort_on_listing_error` set the failure is returned instead.
    pub async fn fetch_listing_page(&self, page: u32) -> anyhow::Result<Option<String>> {
        let url = self.scraping_config.get_listing_url_for_page(page);
        match self.request_client.fetch_url_body(&url).await {
            Ok(body) => Ok(Some(body)),
            Err(e) if self.scraping_config.abort_on_listing_error => {
                Err(e.context(format!("failed to fetch listing page {url}")))
            }
            Err(e) => {
                error!("Failed to fetch listing page {url}, skipping it: {e:#}");
                Ok(None)
            }
        }
    }
}
