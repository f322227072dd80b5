use std::{path::PathBuf, time::Duration};

use anyhow::Context;
use reqwest::Url;
use serde::{Deserialize, de::DeserializeOwned};

use crate::gigachat::{CHAT_COMPLETIONS_URL, OAUTH_URL};

const DEFAULT_BASE_URL: &str = "https://www.edimdoma.ru/retsepty";
const DEFAULT_SCOPE: &str = "GIGACHAT_API_PERS";
const DEFAULT_MODEL: &str = "GigaChat";

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_pages_to_parse() -> u32 {
    50
}

fn default_request_delay() -> f64 {
    1.0
}

fn default_classify_delay() -> f64 {
    0.5
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_scope() -> String {
    DEFAULT_SCOPE.to_string()
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_oauth_url() -> String {
    OAUTH_URL.to_string()
}

fn default_completions_url() -> String {
    CHAT_COMPLETIONS_URL.to_string()
}

/// The env vars needed for scraping.
#[derive(Debug, Deserialize)]
pub struct ScrapingEnv {
    #[serde(default = "default_base_url")]
    base_url: String,
    #[serde(default = "default_pages_to_parse")]
    pages_to_parse: u32,
    #[serde(default = "default_request_delay")]
    request_delay: f64,
    #[serde(default)]
    abort_on_listing_error: bool,
    #[serde(default = "default_output_dir")]
    output_dir: PathBuf,
}

#[cfg(test)]
impl Default for ScrapingEnv {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            pages_to_parse: default_pages_to_parse(),
            request_delay: default_request_delay(),
            abort_on_listing_error: false,
            output_dir: default_output_dir(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ScrapingConfig {
    pub base_url: Url,
    pub pages_to_parse: u32,
    pub request_delay: Duration,
    /// Propagate listing page fetch failures instead of skipping the page.
    pub abort_on_listing_error: bool,
    pub output_dir: PathBuf,
}

impl ScrapingConfig {
    pub fn new() -> anyhow::Result<Self> {
        let scraping_env = ScrapingEnv::load_from_env()?;
        Self::from_env(scraping_env)
    }

    pub fn from_env(scraping_env: ScrapingEnv) -> anyhow::Result<Self> {
        let base_url = Url::parse(&scraping_env.base_url)
            .with_context(|| format!("invalid BASE_URL: {}", scraping_env.base_url))?;
        if scraping_env.pages_to_parse == 0 {
            anyhow::bail!("PAGES_TO_PARSE must be at least 1");
        }
        let request_delay = Duration::try_from_secs_f64(scraping_env.request_delay)
            .with_context(|| format!("invalid REQUEST_DELAY: {}", scraping_env.request_delay))?;
        Ok(Self {
            base_url,
            pages_to_parse: scraping_env.pages_to_parse,
            request_delay,
            abort_on_listing_error: scraping_env.abort_on_listing_error,
            output_dir: scraping_env.output_dir,
        })
    }

    pub fn get_listing_url_for_page(&self, page: u32) -> String {
        let mut url = self.base_url.clone();
        url.set_query(Some(&format!("page={page}")));
        url.to_string()
    }

    /// Resolves a (usually site-relative) recipe link against the base url.
    pub fn resolve_link(&self, href: &str) -> anyhow::Result<String> {
        let url = self
            .base_url
            .join(href)
            .with_context(|| format!("couldn't resolve recipe link: {href}"))?;
        Ok(url.to_string())
    }
}

/// The env vars needed for the GigaChat classifier.
#[derive(Debug, Deserialize)]
pub struct GigaChatEnv {
    gigachat_client_id: Option<String>,
    gigachat_auth_token: Option<String>,
    #[serde(default = "default_scope")]
    gigachat_scope: String,
    #[serde(default = "default_model")]
    gigachat_model: String,
    #[serde(default = "default_oauth_url")]
    gigachat_oauth_url: String,
    #[serde(default = "default_completions_url")]
    gigachat_completions_url: String,
    #[serde(default = "default_classify_delay")]
    classify_delay: f64,
}

#[derive(Debug, Clone)]
pub struct ClassifierConfig {
    pub client_id: Option<String>,
    pub auth_token: Option<String>,
    pub scope: String,
    pub model: String,
    pub oauth_url: String,
    pub completions_url: String,
    pub classify_delay: Duration,
}

impl ClassifierConfig {
    pub fn new() -> anyhow::Result<Self> {
        let gigachat_env = GigaChatEnv::load_from_env()?;
        let classify_delay = Duration::try_from_secs_f64(gigachat_env.classify_delay)
            .with_context(|| format!("invalid CLASSIFY_DELAY: {}", gigachat_env.classify_delay))?;
        Ok(Self {
            client_id: gigachat_env.gigachat_client_id,
            auth_token: gigachat_env
                .gigachat_auth_token
                .filter(|token| !token.trim().is_empty()),
            scope: gigachat_env.gigachat_scope,
            model: gigachat_env.gigachat_model,
            oauth_url: gigachat_env.gigachat_oauth_url,
            completions_url: gigachat_env.gigachat_completions_url,
            classify_delay,
        })
    }
}

// Extension trait.
pub trait LoadFromEnv: DeserializeOwned {
    fn load_from_env() -> anyhow::Result<Self> {
        // Don't throw an error if .env file doesn't exist.
        let _ = dotenv::dotenv();
        let config =
            envy::from_env::<Self>().context("failed to load env variables into config struct")?;
        Ok(config)
    }
}

impl<T: DeserializeOwned> LoadFromEnv for T {}
