use std::sync::LazyLock;

use log::{debug, info, warn};
use scraper::{Html, Selector};

use crate::{
    config::ScrapingConfig,
    extract_error::ExtractError,
    records::RecipeRecord,
    requests::PageFetcher,
    scraping_context::ScrapingContext,
    text_manipulators::{extract_stripped_text, number_steps, strip_nbsp},
};

static CARD_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.card__description").expect("valid selector"));
static LINK_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a").expect("valid selector"));
static TITLE_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("h1.recipe-header__name").expect("valid selector"));
static COOK_TIME_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.entry-stats__value").expect("valid selector"));
static INGREDIENT_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"meta[itemprop="recipeIngredient"]"#).expect("valid selector")
});
static STEP_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.plain-text.recipe_step_text").expect("valid selector"));

/// Absolute detail page urls for every recipe card on a listing page.
pub fn extract_recipe_links(html: &str, scraping_config: &ScrapingConfig) -> Vec<String> {
    let document = Html::parse_document(html);
    let mut links = vec![];
    for card in document.select(&CARD_SELECTOR) {
        let Some(href) = card
            .select(&LINK_SELECTOR)
            .next()
            .and_then(|a| a.value().attr("href"))
        else {
            warn!("Recipe card without a link, skipping it");
            continue;
        };
        match scraping_config.resolve_link(href) {
            Ok(link) => links.push(link),
            Err(e) => warn!("{e:#}"),
        }
    }
    links
}

pub fn extract_recipe(html: &str, recipe_url: &str) -> Result<RecipeRecord, ExtractError> {
    let document = Html::parse_document(html);

    let title = document
        .select(&TITLE_SELECTOR)
        .next()
        .map(extract_stripped_text)
        .ok_or(ExtractError::MissingElement("title"))?;
    let cook_time = document
        .select(&COOK_TIME_SELECTOR)
        .next()
        .map(extract_stripped_text)
        .ok_or(ExtractError::MissingElement("cook_time"))?;

    let ingredients = document
        .select(&INGREDIENT_SELECTOR)
        .filter_map(|meta| meta.value().attr("content"))
        .map(str::to_string)
        .collect();

    let steps = document
        .select(&STEP_SELECTOR)
        .map(|step| strip_nbsp(&extract_stripped_text(step)));

    RecipeRecord::new(
        title,
        cook_time,
        recipe_url.to_string(),
        ingredients,
        number_steps(steps),
    )
}

async fn scrape_recipe<F: PageFetcher>(
    ctx: &ScrapingContext<F>,
    recipe_url: &str,
) -> anyhow::Result<RecipeRecord> {
    let html = ctx.request_client.fetch_url_body(recipe_url).await?;
    let recipe = extract_recipe(&html, recipe_url)?;
    Ok(recipe)
}

/// Walks listing pages 1..=N, follows every recipe card and appends each
/// successfully extracted recipe to `recipes`.
///
/// A detail page that fails to fetch or extract is logged and skipped.
pub async fn scrape_recipe_pages<F: PageFetcher>(
    ctx: &ScrapingContext<F>,
    mut recipes: Vec<RecipeRecord>,
) -> anyhow::Result<Vec<RecipeRecord>> {
    let pages = ctx.scraping_config.pages_to_parse;
    let mut skipped = 0usize;
    for page in 1..=pages {
        let Some(html) = ctx.fetch_listing_page(page).await? else {
            continue;
        };
        let links = extract_recipe_links(&html, &ctx.scraping_config);
        debug!("Listing page {page}: {} recipe links", links.len());
        for recipe_url in links {
            match scrape_recipe(ctx, &recipe_url).await {
                Ok(recipe) => recipes.push(recipe),
                Err(e) => {
                    warn!("Failed to scrape recipe {recipe_url}: {e:#}");
                    skipped += 1;
                }
            }
        }
    }
    info!(
        "Collected {} recipes from {pages} listing pages ({skipped} skipped)",
        recipes.len()
    );
    Ok(recipes)
}
