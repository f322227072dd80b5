//! CSV rows for the three output tables, and reading/writing them.

use std::path::Path;

use anyhow::Context;
use log::info;
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::{
    merger::render_list,
    records::{ImageRecord, MergedRecipe, RecipeRecord},
};

pub const IMAGE_LINKS_FILE: &str = "image_links.csv";
pub const RECIPES_FILE: &str = "recipes.csv";
pub const MERGED_RECIPES_FILE: &str = "recipes_merged.csv";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageRow {
    pub title: String,
    pub image_url: String,
}

impl From<&ImageRecord> for ImageRow {
    fn from(record: &ImageRecord) -> Self {
        Self {
            title: record.title.clone(),
            image_url: record.image_url.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeRow {
    pub title: String,
    pub cook_time: String,
    pub recipe_url: String,
    pub ingredients: String,
    pub steps: String,
    pub is_vegetarian: Option<bool>,
}

impl From<&RecipeRecord> for RecipeRow {
    fn from(recipe: &RecipeRecord) -> Self {
        Self {
            title: recipe.title.clone(),
            cook_time: recipe.cook_time.clone(),
            recipe_url: recipe.recipe_url.clone(),
            ingredients: render_list(&recipe.ingredients),
            steps: render_list(&recipe.steps),
            is_vegetarian: recipe.is_vegetarian,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergedRow {
    pub title: String,
    pub cook_time: String,
    pub recipe_url: String,
    pub ingredients: String,
    pub steps: String,
    pub is_vegetarian: Option<bool>,
    pub image_url: String,
}

impl From<&MergedRecipe> for MergedRow {
    fn from(merged: &MergedRecipe) -> Self {
        Self {
            title: merged.title.clone(),
            cook_time: merged.cook_time.clone(),
            recipe_url: merged.recipe_url.clone(),
            ingredients: render_list(&merged.ingredients),
            steps: merged.steps.clone(),
            is_vegetarian: merged.is_vegetarian,
            image_url: merged.image_url.clone(),
        }
    }
}

pub fn write_rows<T: Serialize>(
    path: &Path,
    rows: impl IntoIterator<Item = T>,
) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("couldn't create {}", path.display()))?;
    let mut count = 0usize;
    for row in rows {
        writer
            .serialize(row)
            .with_context(|| format!("couldn't write a row to {}", path.display()))?;
        count += 1;
    }
    writer.flush()?;
    info!("Wrote {count} rows to {}", path.display());
    Ok(())
}

pub fn read_rows<T: DeserializeOwned>(path: &Path) -> anyhow::Result<Vec<T>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("couldn't open {}", path.display()))?;
    let rows = reader
        .deserialize()
        .collect::<Result<Vec<T>, _>>()
        .with_context(|| format!("couldn't read rows from {}", path.display()))?;
    Ok(rows)
}
