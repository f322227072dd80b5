use std::path::Path;

use anyhow::Context;
use log::{info, warn};

use crate::{
    classifier::VegetarianClassifier,
    gigachat::CompletionBackend,
    image_scraper::scrape_image_pages,
    merger::merge_recipes_with_images,
    normalizer::clean_image_records,
    recipe_scraper::scrape_recipe_pages,
    records::{ImageRecord, MergedRecipe, RecipeRecord},
    requests::PageFetcher,
    scraping_context::ScrapingContext,
    table::{
        IMAGE_LINKS_FILE, ImageRow, MERGED_RECIPES_FILE, MergedRow, RECIPES_FILE, RecipeRow,
        write_rows,
    },
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub image_records: usize,
    pub recipes: usize,
    pub merged: usize,
    pub vegetarian: usize,
}

/// Scrapes, cleans and checkpoints the listing images.
pub async fn run_image_phase<F: PageFetcher>(
    ctx: &ScrapingContext<F>,
) -> anyhow::Result<Vec<ImageRecord>> {
    info!("Scraping image links...");
    let image_records = scrape_image_pages(ctx, Vec::new()).await?;
    let image_records = clean_image_records(image_records);
    write_rows(
        &ctx.scraping_config.output_dir.join(IMAGE_LINKS_FILE),
        image_records.iter().map(ImageRow::from),
    )?;
    Ok(image_records)
}

/// Scrapes and checkpoints the recipes, before classification.
pub async fn run_recipe_phase<F: PageFetcher>(
    ctx: &ScrapingContext<F>,
) -> anyhow::Result<Vec<RecipeRecord>> {
    info!("Scraping recipes...");
    let recipes = scrape_recipe_pages(ctx, Vec::new()).await?;
    write_rows(
        &ctx.scraping_config.output_dir.join(RECIPES_FILE),
        recipes.iter().map(RecipeRow::from),
    )?;
    Ok(recipes)
}

/// Leaves every recipe unclassified when there is no classifier.
pub async fn run_classification_phase<B: CompletionBackend>(
    classifier: Option<&VegetarianClassifier<B>>,
    recipes: Vec<RecipeRecord>,
) -> Vec<RecipeRecord> {
    match classifier {
        Some(classifier) => {
            info!("Classifying recipes...");
            classifier.classify_recipes(recipes).await
        }
        None => {
            warn!("No GigaChat token, skipping vegetarian classification");
            recipes
        }
    }
}

pub fn run_merge_phase(
    recipes: &[RecipeRecord],
    image_records: &[ImageRecord],
    output_dir: &Path,
) -> anyhow::Result<Vec<MergedRecipe>> {
    info!("Merging recipes with images...");
    let merged = merge_recipes_with_images(recipes, image_records);
    write_rows(
        &output_dir.join(MERGED_RECIPES_FILE),
        merged.iter().map(MergedRow::from),
    )?;
    Ok(merged)
}

/// Runs every phase in order.
///
/// `authorize` is only called once the recipe checkpoint is on disk, so the
/// short-lived access token is fresh when classification starts.
pub async fn run<F, B, A, Fut>(
    ctx: &ScrapingContext<F>,
    authorize: A,
) -> anyhow::Result<RunSummary>
where
    F: PageFetcher,
    B: CompletionBackend,
    A: FnOnce() -> Fut,
    Fut: Future<Output = Option<VegetarianClassifier<B>>>,
{
    let output_dir = &ctx.scraping_config.output_dir;
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("couldn't create output dir {}", output_dir.display()))?;

    let image_records = run_image_phase(ctx).await?;
    let recipes = run_recipe_phase(ctx).await?;
    let classifier = authorize().await;
    let recipes = run_classification_phase(classifier.as_ref(), recipes).await;
    let merged = run_merge_phase(&recipes, &image_records, output_dir)?;

    let summary = RunSummary {
        image_records: image_records.len(),
        recipes: recipes.len(),
        merged: merged.len(),
        vegetarian: merged
            .iter()
            .filter(|recipe| recipe.is_vegetarian == Some(true))
            .count(),
    };
    info!(
        "Done: {} merged recipes, {} vegetarian",
        summary.merged, summary.vegetarian
    );
    Ok(summary)
}
