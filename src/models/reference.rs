//! Small reference entities a recipe points at by id.

use serde::{Deserialize, Serialize};

/// Dish type such as "Main Course" or "Dessert".
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RecipeType {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Cuisine {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Ingredient {
    pub id: i64,
    pub name: String,
}

/// Request body for creating a type, cuisine or ingredient.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateReferenceRequest {
    pub name: String,
}

/// Reference to an existing entity by id, as sent by clients (`{"id": 3}`).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct EntityRef {
    pub id: i64,
}
