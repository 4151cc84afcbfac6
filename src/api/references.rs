//! Recipe type, cuisine and ingredient endpoints.

use axum::{extract::State, Json};

use super::{require_non_blank, success, ApiResult};
use crate::models::{CreateReferenceRequest, Cuisine, Ingredient, RecipeType};
use crate::AppState;

/// GET /api/types - List all recipe types.
pub async fn list_types(State(state): State<AppState>) -> ApiResult<Vec<RecipeType>> {
    success(state.repo.list_types().await?)
}

/// POST /api/types - Create a recipe type.
pub async fn create_type(
    State(state): State<AppState>,
    Json(request): Json<CreateReferenceRequest>,
) -> ApiResult<RecipeType> {
    require_non_blank(&request.name, "Name")?;
    success(state.repo.create_type(request.name.trim()).await?)
}

/// GET /api/cuisines - List all cuisines.
pub async fn list_cuisines(State(state): State<AppState>) -> ApiResult<Vec<Cuisine>> {
    success(state.repo.list_cuisines().await?)
}

/// POST /api/cuisines - Create a cuisine.
pub async fn create_cuisine(
    State(state): State<AppState>,
    Json(request): Json<CreateReferenceRequest>,
) -> ApiResult<Cuisine> {
    require_non_blank(&request.name, "Name")?;
    success(state.repo.create_cuisine(request.name.trim()).await?)
}

/// GET /api/ingredients - List all ingredients.
pub async fn list_ingredients(State(state): State<AppState>) -> ApiResult<Vec<Ingredient>> {
    success(state.repo.list_ingredients().await?)
}

/// POST /api/ingredients - Create an ingredient.
pub async fn create_ingredient(
    State(state): State<AppState>,
    Json(request): Json<CreateReferenceRequest>,
) -> ApiResult<Ingredient> {
    require_non_blank(&request.name, "Name")?;
    success(state.repo.create_ingredient(request.name.trim()).await?)
}
