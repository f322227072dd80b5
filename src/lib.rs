mod extract_error;
mod ratelimit;
mod requests;
mod scraping_context;
mod text_manipulators;

pub mod classifier;
pub mod config;
pub mod gigachat;
pub mod image_scraper;
pub mod merger;
pub mod normalizer;
pub mod pipeline;
pub mod recipe_scraper;
pub mod records;
pub mod table;

#[cfg(test)]
mod test_utils;

pub use classifier::VegetarianClassifier;
pub use config::{ClassifierConfig, ScrapingConfig};
pub use extract_error::ExtractError;
pub use gigachat::{CompletionBackend, GigaChatClient};
pub use records::{ImageRecord, MergedRecipe, RecipeRecord};
pub use requests::{PageFetcher, RequestClient};
pub use scraping_context::ScrapingContext;
pub use text_manipulators::{normalize_steps_text, number_steps};
