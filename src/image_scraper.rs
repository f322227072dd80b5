use std::sync::LazyLock;

use log::{debug, info};
use scraper::{ElementRef, Html, Selector};

use crate::{
    records::ImageRecord, requests::PageFetcher, scraping_context::ScrapingContext,
    text_manipulators::first_url,
};

static PICTURE_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("picture.card__picture").expect("valid selector"));
static IMG_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("img").expect("valid selector"));

// Checked in this order before falling back to the serialized tag.
const URL_ATTRS: [&str; 4] = ["src", "data-src", "srcset", "data-srcset"];

/// One record per card picture on a listing page, in document order.
pub fn extract_image_records(html: &str) -> Vec<ImageRecord> {
    let document = Html::parse_document(html);
    document
        .select(&PICTURE_SELECTOR)
        .map(|picture| {
            let img = picture.select(&IMG_SELECTOR).next();
            let image_url = img.map(image_url_of).unwrap_or_default();
            let title = img
                .and_then(|img| img.value().attr("alt"))
                .unwrap_or("")
                .to_string();
            ImageRecord { title, image_url }
        })
        .collect()
}

fn image_url_of(img: ElementRef) -> String {
    URL_ATTRS
        .iter()
        .filter_map(|attr| img.value().attr(attr))
        .map(first_url)
        .find(|url| !url.is_empty())
        .unwrap_or_else(|| first_url(&img.html()))
}

/// Walks listing pages 1..=N and appends every image record to `image_records`.
pub async fn scrape_image_pages<F: PageFetcher>(
    ctx: &ScrapingContext<F>,
    mut image_records: Vec<ImageRecord>,
) -> anyhow::Result<Vec<ImageRecord>> {
    let pages = ctx.scraping_config.pages_to_parse;
    for page in 1..=pages {
        let Some(html) = ctx.fetch_listing_page(page).await? else {
            continue;
        };
        let records = extract_image_records(&html);
        debug!("Listing page {page}: {} images", records.len());
        image_records.extend(records);
    }
    info!(
        "Collected {} image records from {pages} listing pages",
        image_records.len()
    );
    Ok(image_records)
}
