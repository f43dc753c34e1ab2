//! HTTP collaborator for the recipe service.
//!
//! - [`types`]: explicit wire schemas; mismatches fail with [`ApiError::Decode`]
//! - [`client`]: the [`RecipeApi`] contract and its reqwest implementation
//!
//! Controllers depend on `Arc<dyn RecipeApi>` rather than the concrete
//! client so they can be driven by an in-memory fake in unit tests.

mod client;
#[cfg(test)]
pub(crate) mod fake;
mod types;

pub use client::{ApiError, RecipeApi, RecipeClient};
pub use types::{Author, AuthorRef, NewRecipe, Recipe, RecipePage};
