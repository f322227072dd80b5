use dotenv::dotenv;
use recipe_scraper::{
    ClassifierConfig, GigaChatClient, ScrapingContext, VegetarianClassifier, pipeline,
};

extern crate env_logger;
extern crate log;

use log::LevelFilter;

use log::{error, info};

async fn run_scraper_job() -> anyhow::Result<()> {
    let ctx = ScrapingContext::new()?;
    let classifier_config = ClassifierConfig::new()?;
    info!(
        "Scraping {} pages of {}",
        ctx.scraping_config.pages_to_parse, ctx.scraping_config.base_url
    );

    pipeline::run(&ctx, || async move {
        GigaChatClient::authorize(&classifier_config)
            .await
            .map(|client| VegetarianClassifier::new(client, classifier_config.classify_delay))
    })
    .await?;
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    dotenv().ok();
    env_logger::Builder::new()
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .init();

    if let Err(e) = run_scraper_job().await {
        error!("Scraping failed: {e:#}");
        std::process::exit(1);
    }
}
