//! Recipe aggregate and the two response shapes derived from it.

use serde::{Deserialize, Serialize};

use super::{Cuisine, EntityRef, Ingredient, RecipeType, User, UserView};

/// A recipe together with every entity it relates to, as loaded from the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipe {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub instructions: String,
    pub image: Option<String>,
    pub prep_time: u32,
    pub cook_time: u32,
    pub servings: u32,
    pub category: String,
    pub author: User,
    pub recipe_type: RecipeType,
    pub cuisine: Cuisine,
    /// Collaborators. `None` when the relation was never loaded or set,
    /// `Some(vec![])` when it is known to be empty.
    pub users: Option<Vec<User>>,
    pub ingredients: Vec<Ingredient>,
}

/// Trimmed shape for bulk listings. Carries no relations.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ListingView {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub image: Option<String>,
    pub prep_time: u32,
    pub cook_time: u32,
    pub servings: u32,
    pub category: String,
}

/// Full shape with every relation resolved.
///
/// `users` serializes as `null` (never `[]`) when the recipe has no
/// collaborators.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FullView {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub instructions: String,
    pub image: Option<String>,
    pub prep_time: u32,
    pub cook_time: u32,
    pub servings: u32,
    pub category: String,
    pub author: UserView,
    #[serde(rename = "type")]
    pub recipe_type: RecipeType,
    pub cuisine: Cuisine,
    pub users: Option<Vec<UserView>>,
    pub ingredients: Vec<Ingredient>,
}

/// Request body for creating a recipe.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRecipeRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub instructions: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub prep_time: u32,
    #[serde(default)]
    pub cook_time: u32,
    #[serde(default)]
    pub servings: u32,
    #[serde(default)]
    pub category: String,
    pub author: EntityRef,
    #[serde(rename = "type")]
    pub recipe_type: EntityRef,
    pub cuisine: EntityRef,
    #[serde(default)]
    pub ingredients: Vec<EntityRef>,
    #[serde(default)]
    pub users: Option<Vec<EntityRef>>,
}
