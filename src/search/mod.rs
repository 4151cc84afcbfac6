//! Recipe search and resolution.
//!
//! Every single-criterion lookup is a [`RecipePredicate`] resolved by one
//! routine against the store. Results come back in ascending recipe id order
//! and are projected to the full view.

use std::fmt;
use std::sync::Arc;

use crate::db::Repository;
use crate::errors::AppError;
use crate::models::{FullView, ListingView};
use crate::projection::{to_full_view, to_listing_view};

/// A single typed search criterion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecipePredicate {
    ById(i64),
    /// Case-insensitive substring of the title.
    TitleContains(String),
    /// Case-insensitive substring of the description.
    DescriptionContains(String),
    /// Case-insensitive substring of any ingredient name.
    IngredientTextContains(String),
    /// Exact, case-sensitive category label.
    Category(String),
    AuthorId(i64),
    TypeId(i64),
    CuisineId(i64),
    /// Recipe's ingredient set contains this id.
    IngredientId(i64),
}

impl RecipePredicate {
    /// Text predicates with empty input match every recipe, including
    /// recipes without ingredients.
    pub fn matches_everything(&self) -> bool {
        match self {
            RecipePredicate::TitleContains(text)
            | RecipePredicate::DescriptionContains(text)
            | RecipePredicate::IngredientTextContains(text) => text.is_empty(),
            _ => false,
        }
    }
}

impl fmt::Display for RecipePredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecipePredicate::ById(id) => write!(f, "id = {}", id),
            RecipePredicate::TitleContains(text) => write!(f, "title contains {:?}", text),
            RecipePredicate::DescriptionContains(text) => {
                write!(f, "description contains {:?}", text)
            }
            RecipePredicate::IngredientTextContains(text) => {
                write!(f, "ingredient name contains {:?}", text)
            }
            RecipePredicate::Category(category) => write!(f, "category = {:?}", category),
            RecipePredicate::AuthorId(id) => write!(f, "author = {}", id),
            RecipePredicate::TypeId(id) => write!(f, "type = {}", id),
            RecipePredicate::CuisineId(id) => write!(f, "cuisine = {}", id),
            RecipePredicate::IngredientId(id) => write!(f, "ingredient = {}", id),
        }
    }
}

/// Resolves predicates and pages against the recipe store.
#[derive(Clone)]
pub struct RecipeSearch {
    repo: Arc<Repository>,
}

impl RecipeSearch {
    pub fn new(repo: Arc<Repository>) -> Self {
        Self { repo }
    }

    /// Resolve a predicate to full views. No match is an empty vector.
    pub async fn resolve(&self, predicate: &RecipePredicate) -> Result<Vec<FullView>, AppError> {
        let recipes = self.repo.find_recipes(predicate).await?;
        tracing::debug!("Resolved {} to {} recipes", predicate, recipes.len());
        Ok(recipes.iter().map(to_full_view).collect())
    }

    /// Look up a single recipe.
    pub async fn by_id(&self, id: i64) -> Result<Option<FullView>, AppError> {
        let recipe = self.repo.get_recipe(id).await?;
        Ok(recipe.as_ref().map(to_full_view))
    }

    /// Page through all recipes using the listing shape.
    ///
    /// A zero `size` or a page past the end yields an empty page.
    pub async fn list(&self, page: u32, size: u32) -> Result<Vec<ListingView>, AppError> {
        if size == 0 {
            return Ok(Vec::new());
        }

        let Some(offset) = i64::from(page).checked_mul(i64::from(size)) else {
            return Ok(Vec::new());
        };
        let recipes = self.repo.list_recipes(offset, i64::from(size)).await?;
        Ok(recipes.iter().map(to_listing_view).collect())
    }
}
