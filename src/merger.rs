use std::collections::HashMap;

use log::info;

use crate::{
    records::{ImageRecord, MergedRecipe, RecipeRecord},
    text_manipulators::normalize_steps_text,
};

/// Renders a list as a JSON array for a single table cell.
pub fn render_list(items: &[String]) -> String {
    serde_json::to_string(items).unwrap_or_default()
}

/// Inner join of recipes and images on exact title equality.
///
/// Rows come out in recipe order, then image order for the same title. A
/// title present several times on both sides yields the cross product.
/// Steps are rendered and display-normalized on the way out.
pub fn merge_recipes_with_images(
    recipes: &[RecipeRecord],
    image_records: &[ImageRecord],
) -> Vec<MergedRecipe> {
    let mut images_by_title: HashMap<&str, Vec<&ImageRecord>> = HashMap::new();
    for image in image_records {
        images_by_title
            .entry(image.title.as_str())
            .or_default()
            .push(image);
    }

    let merged: Vec<MergedRecipe> = recipes
        .iter()
        .flat_map(|recipe| {
            let matches = images_by_title
                .get(recipe.title.as_str())
                .map(Vec::as_slice)
                .unwrap_or_default();
            matches.iter().map(move |image| MergedRecipe {
                title: recipe.title.clone(),
                cook_time: recipe.cook_time.clone(),
                recipe_url: recipe.recipe_url.clone(),
                ingredients: recipe.ingredients.clone(),
                steps: normalize_steps_text(&render_list(&recipe.steps)),
                is_vegetarian: recipe.is_vegetarian,
                image_url: image.image_url.clone(),
            })
        })
        .collect();

    info!(
        "Merged {} recipes with {} images into {} rows",
        recipes.len(),
        image_records.len(),
        merged.len()
    );
    merged
}
