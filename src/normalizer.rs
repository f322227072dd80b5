use std::collections::HashSet;

use log::info;

use crate::records::ImageRecord;

/// Points a thumbnail url at the wide variant of the same image.
pub fn upgrade_image_url(image_url: &str) -> String {
    image_url
        .replace(['\'', '"'], "")
        .replace("small", "wide")
}

/// Cleans a batch of scraped image records.
///
/// Urls are rewritten first, then records with a blank field and exact
/// duplicates (after the rewrite) are dropped. Survivors keep their relative
/// order, and running this on its own output changes nothing.
pub fn clean_image_records(image_records: Vec<ImageRecord>) -> Vec<ImageRecord> {
    let before = image_records.len();
    let mut seen = HashSet::new();
    let cleaned: Vec<ImageRecord> = image_records
        .into_iter()
        .map(|record| ImageRecord {
            image_url: upgrade_image_url(&record.image_url),
            title: record.title,
        })
        .filter(|record| !record.has_blank_field())
        .filter(|record| seen.insert(record.clone()))
        .collect();
    info!("Image cleanup kept {} of {before} records", cleaned.len());
    cleaned
}
