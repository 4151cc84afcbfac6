//! Recipe API endpoints.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;

use super::{require_non_blank, success, ApiResult};
use crate::errors::AppError;
use crate::models::{CreateRecipeRequest, FullView, ListingView};
use crate::AppState;

/// Paging parameters for the recipe listing.
#[derive(Debug, Deserialize)]
pub struct PageQuery {
    /// Zero-based page index (default: 0).
    #[serde(default)]
    pub page: u32,
    /// Page size (default: configured default, capped at the configured maximum).
    pub size: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct TitleQuery {
    pub title: String,
}

#[derive(Debug, Deserialize)]
pub struct DescriptionQuery {
    pub description: String,
}

#[derive(Debug, Deserialize)]
pub struct IngredientsQuery {
    pub ingredients: String,
}

#[derive(Debug, Deserialize)]
pub struct CategoryQuery {
    pub category: String,
}

/// GET /api/recipes - List recipes without relations.
pub async fn list_recipes(
    State(state): State<AppState>,
    Query(params): Query<PageQuery>,
) -> ApiResult<Vec<ListingView>> {
    let size = params
        .size
        .unwrap_or(state.config.default_page_size)
        .min(state.config.max_page_size);

    success(state.service.list_recipes(params.page, size).await?)
}

/// POST /api/recipes - Create a new recipe.
pub async fn create_recipe(
    State(state): State<AppState>,
    Json(request): Json<CreateRecipeRequest>,
) -> ApiResult<FullView> {
    require_non_blank(&request.title, "Title")?;

    success(state.service.create_recipe(&request).await?)
}

/// GET /api/recipes/{id} - Get a single recipe.
pub async fn get_recipe(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<FullView> {
    match state.service.get_recipe(id).await? {
        Some(recipe) => success(recipe),
        None => Err(AppError::NotFound(format!("Recipe {} not found", id))),
    }
}

/// GET /api/recipes/search/title?title= - Recipes whose title contains the text.
pub async fn search_by_title(
    State(state): State<AppState>,
    Query(params): Query<TitleQuery>,
) -> ApiResult<Vec<FullView>> {
    success(state.service.find_by_title(&params.title).await?)
}

/// GET /api/recipes/search/description?description= - Recipes whose description contains the text.
pub async fn search_by_description(
    State(state): State<AppState>,
    Query(params): Query<DescriptionQuery>,
) -> ApiResult<Vec<FullView>> {
    success(state.service.find_by_description(&params.description).await?)
}

/// GET /api/recipes/search/ingredients?ingredients= - Recipes with an ingredient name containing the text.
pub async fn search_by_ingredient_text(
    State(state): State<AppState>,
    Query(params): Query<IngredientsQuery>,
) -> ApiResult<Vec<FullView>> {
    success(
        state
            .service
            .find_by_ingredient_text(&params.ingredients)
            .await?,
    )
}

/// GET /api/recipes/search/ingredients/{ingredient_id} - Recipes using an ingredient.
pub async fn search_by_ingredient(
    State(state): State<AppState>,
    Path(ingredient_id): Path<i64>,
) -> ApiResult<Vec<FullView>> {
    success(state.service.find_by_ingredient(ingredient_id).await?)
}

/// GET /api/recipes/search/category?category= - Recipes in a category.
pub async fn search_by_category(
    State(state): State<AppState>,
    Query(params): Query<CategoryQuery>,
) -> ApiResult<Vec<FullView>> {
    success(state.service.find_by_category(&params.category).await?)
}

/// GET /api/recipes/search/type/{type_id} - Recipes of a type.
pub async fn search_by_type(
    State(state): State<AppState>,
    Path(type_id): Path<i64>,
) -> ApiResult<Vec<FullView>> {
    success(state.service.find_by_type(type_id).await?)
}

/// GET /api/recipes/search/cuisine/{cuisine_id} - Recipes of a cuisine.
pub async fn search_by_cuisine(
    State(state): State<AppState>,
    Path(cuisine_id): Path<i64>,
) -> ApiResult<Vec<FullView>> {
    success(state.service.find_by_cuisine(cuisine_id).await?)
}

/// GET /api/recipes/author/{author_id} - Recipes by an author.
pub async fn search_by_author(
    State(state): State<AppState>,
    Path(author_id): Path<i64>,
) -> ApiResult<Vec<FullView>> {
    success(state.service.find_by_author(author_id).await?)
}
