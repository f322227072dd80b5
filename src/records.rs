use crate::extract_error::ExtractError;

/// A listing thumbnail paired with its alt text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImageRecord {
    pub title: String,
    pub image_url: String,
}

impl ImageRecord {
    pub fn new(title: impl Into<String>, image_url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            image_url: image_url.into(),
        }
    }

    pub fn has_blank_field(&self) -> bool {
        self.title.trim().is_empty() || self.image_url.trim().is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeRecord {
    pub title: String,
    pub cook_time: String,
    pub recipe_url: String,
    pub ingredients: Vec<String>,
    /// Display strings, numbered from 1 ("1. ...").
    pub steps: Vec<String>,
    /// Unset until the classifier has run.
    pub is_vegetarian: Option<bool>,
}

impl RecipeRecord {
    pub fn new(
        title: String,
        cook_time: String,
        recipe_url: String,
        ingredients: Vec<String>,
        steps: Vec<String>,
    ) -> Result<Self, ExtractError> {
        if title.trim().is_empty() {
            return Err(ExtractError::BlankField("title"));
        }
        if cook_time.trim().is_empty() {
            return Err(ExtractError::BlankField("cook_time"));
        }
        Ok(Self {
            title,
            cook_time,
            recipe_url,
            ingredients,
            steps,
            is_vegetarian: None,
        })
    }
}

/// A recipe joined with the image sharing its title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedRecipe {
    pub title: String,
    pub cook_time: String,
    pub recipe_url: String,
    pub ingredients: Vec<String>,
    /// Rendered and display-normalized step list.
    pub steps: String,
    pub is_vegetarian: Option<bool>,
    pub image_url: String,
}
