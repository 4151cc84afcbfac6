//! Cookio Recipe Catalog Backend
//!
//! REST backend serving recipe listings, searches and creation from SQLite.

mod api;
mod auth;
mod config;
mod db;
mod errors;
mod models;
mod projection;
mod search;
mod service;

use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use config::Config;
use db::Repository;
use service::RecipeService;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<RecipeService>,
    pub repo: Arc<Repository>,
    pub config: Arc<Config>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env();

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Cookio Backend");
    tracing::info!("Database path: {:?}", config.db_path);
    tracing::info!("Bind address: {}", config.bind_addr);

    // Warn if PSK is not configured
    if config.api_psk.is_none() {
        tracing::warn!("No API PSK configured (COOKIO_API_PSK). Authentication is disabled!");
    }

    // Initialize database
    let pool = db::init_database(&config.db_path).await?;
    let repo = Arc::new(Repository::new(pool));
    tracing::info!("Recipe store ready with {} recipes", repo.count_recipes().await?);

    // Create application state
    let state = AppState {
        service: Arc::new(RecipeService::new(repo.clone())),
        repo,
        config: Arc::new(config.clone()),
    };

    // Build router
    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Clone PSK for the auth layer
    let psk = state.config.api_psk.clone();

    // API routes
    let api_routes = Router::new()
        // Recipes
        .route("/recipes", get(api::list_recipes).post(api::create_recipe))
        .route("/recipes/{id}", get(api::get_recipe))
        .route("/recipes/author/{author_id}", get(api::search_by_author))
        .route("/recipes/search/title", get(api::search_by_title))
        .route("/recipes/search/description", get(api::search_by_description))
        .route("/recipes/search/ingredients", get(api::search_by_ingredient_text))
        .route(
            "/recipes/search/ingredients/{ingredient_id}",
            get(api::search_by_ingredient),
        )
        .route("/recipes/search/category", get(api::search_by_category))
        .route("/recipes/search/type/{type_id}", get(api::search_by_type))
        .route("/recipes/search/cuisine/{cuisine_id}", get(api::search_by_cuisine))
        // Reference data
        .route("/types", get(api::list_types).post(api::create_type))
        .route("/cuisines", get(api::list_cuisines).post(api::create_cuisine))
        .route("/ingredients", get(api::list_ingredients).post(api::create_ingredient))
        // Users
        .route("/users", post(api::create_user))
        .route("/users/{id}", get(api::get_user))
        // Apply PSK auth middleware
        .layer(middleware::from_fn(move |req, next| {
            auth::psk_auth_layer(psk.clone(), req, next)
        }));

    // Health check (no auth required)
    let health_routes = Router::new().route("/health", get(health_check));

    Router::new()
        .nest("/api", api_routes)
        .merge(health_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}
