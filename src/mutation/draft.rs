use crate::api::NewRecipe;
use crate::image::EncodedImage;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please fill in all fields first")]
    MissingFields,
    #[error("Ingredients and steps must not be empty")]
    EmptyLists,
}

/// Splits multi-line input into trimmed, non-empty lines.
pub fn parse_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Unsubmitted form state of the create screen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Draft {
    pub title: String,
    /// One ingredient per line
    pub ingredients_text: String,
    /// One step per line
    pub steps_text: String,
    pub image: Option<EncodedImage>,
}

impl Draft {
    /// Validates the draft and builds the create request body.
    ///
    /// Presence is checked first (a whitespace-only title counts as missing),
    /// then the parsed ingredient and step lists must be non-empty. The title
    /// is sent as typed.
    pub fn to_request(&self) -> Result<NewRecipe, ValidationError> {
        let image = match &self.image {
            Some(image) if !image.base64.is_empty() => image,
            _ => return Err(ValidationError::MissingFields),
        };
        if self.title.trim().is_empty()
            || self.ingredients_text.is_empty()
            || self.steps_text.is_empty()
        {
            return Err(ValidationError::MissingFields);
        }

        let ingredients = parse_lines(&self.ingredients_text);
        let steps = parse_lines(&self.steps_text);
        if ingredients.is_empty() || steps.is_empty() {
            return Err(ValidationError::EmptyLists);
        }

        Ok(NewRecipe {
            title: self.title.clone(),
            ingredients,
            steps,
            image: image.data_uri(),
        })
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
