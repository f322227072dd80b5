use std::time::Duration;

use log::{info, warn};

use crate::{gigachat::CompletionBackend, ratelimit::RateLimiter, records::RecipeRecord};

pub fn vegetarian_prompt(ingredients_text: &str) -> String {
    format!(
        "Определи по списку ингредиентов, является ли блюдо вегетарианским. \
         Ответь только True или False. Ингредиенты: {ingredients_text}"
    )
}

/// Asks a completion backend whether a dish is vegetarian.
pub struct VegetarianClassifier<B> {
    backend: B,
    rate_limiter: RateLimiter,
}

impl<B: CompletionBackend> VegetarianClassifier<B> {
    pub fn new(backend: B, classify_delay: Duration) -> Self {
        Self {
            backend,
            rate_limiter: RateLimiter::new(classify_delay),
        }
    }

    /// `Some(true)` only for a literal "True" answer, `Some(false)` for any
    /// other answer, `None` when the call itself failed.
    pub async fn classify(&self, ingredients: &[String]) -> Option<bool> {
        let ingredients_text = ingredients.join(", ");
        let prompt = vegetarian_prompt(&ingredients_text);
        match self.rate_limiter.throttle(self.backend.complete(&prompt)).await {
            Ok(answer) => Some(answer.trim() == "True"),
            Err(e) => {
                let preview: String = ingredients_text.chars().take(50).collect();
                warn!("Failed to classify ingredients: {preview}... | {e:#}");
                None
            }
        }
    }

    /// Backfills `is_vegetarian` on every recipe.
    ///
    /// A failed call is recorded as `false`, the same as a "no" answer.
    pub async fn classify_recipes(&self, mut recipes: Vec<RecipeRecord>) -> Vec<RecipeRecord> {
        for recipe in &mut recipes {
            let verdict = self.classify(&recipe.ingredients).await;
            recipe.is_vegetarian = Some(verdict.unwrap_or(false));
        }
        let vegetarian = recipes
            .iter()
            .filter(|recipe| recipe.is_vegetarian == Some(true))
            .count();
        info!("Classified {} recipes, {vegetarian} vegetarian", recipes.len());
        recipes
    }
}
