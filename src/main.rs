//! Studio Site Backend
//!
//! A production-grade REST backend with SQLite persistence and local media storage,
//! serving the studio marketing site and its password-protected admin panel.

mod api;
mod auth;
mod cache;
mod config;
mod db;
mod errors;
mod media;
mod migrate;
mod models;
mod services;

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use auth::Sessions;
use config::Config;
use db::Repository;
use media::MediaStore;
use migrate::LegacyImporter;
use services::{ContentService, PortfolioService, TeamService};

/// Multipart upload body cap: the image size limit plus envelope headroom,
/// so oversized images reach the validator and get a structured rejection.
const MAX_UPLOAD_BODY_BYTES: usize = media::MAX_IMAGE_BYTES as usize + 2 * 1024 * 1024;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub portfolio: Arc<PortfolioService>,
    pub team: Arc<TeamService>,
    pub content: Arc<ContentService>,
    pub media: Arc<MediaStore>,
    pub importer: Arc<LegacyImporter>,
    pub sessions: Sessions,
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

    tracing::info!("Starting Studio Site Backend");
    tracing::info!("Database path: {:?}", config.db_path);
    tracing::info!("Media dir: {:?}", config.media_dir);
    tracing::info!("Bind address: {}", config.bind_addr);

    // Warn if no admin password is configured
    if config.admin_password.is_none() {
        tracing::warn!("No admin password configured (STUDIO_ADMIN_PASSWORD). Authentication is disabled!");
    }

    // Initialize database
    let pool = db::init_database(&config.db_path).await?;
    let repo = Repository::new(pool);

    // Initialize media storage
    let media = Arc::new(MediaStore::new(
        config.media_dir.clone(),
        &config.public_base_url,
    ));
    tokio::fs::create_dir_all(media.root()).await?;

    // Assemble services
    let portfolio = Arc::new(PortfolioService::new(
        repo.clone(),
        config.cache_ttl,
        config.taxonomy_delete,
    ));
    let team = Arc::new(TeamService::new(repo.clone()));
    let content = Arc::new(ContentService::new(repo));
    let importer = Arc::new(LegacyImporter::new(
        portfolio.clone(),
        team.clone(),
        content.clone(),
        config.legacy_dir.clone(),
    ));

    // Seed empty tables so a fresh install renders something
    team.ensure_seed_members().await?;
    portfolio.ensure_seed_projects().await?;

    // Create application state
    let state = AppState {
        portfolio,
        team,
        content,
        media,
        importer,
        sessions: Sessions::new(),
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

    // Clone credentials for the auth layer
    let admin_password = state.config.admin_password.clone();
    let sessions = state.sessions.clone();

    // Public site reads plus login
    let public_api = Router::new()
        .route("/projects", get(api::list_projects))
        .route("/projects/cards", get(api::list_project_cards))
        .route("/projects/{id}", get(api::get_project))
        .route("/categories", get(api::list_categories))
        .route("/tags", get(api::list_tags))
        .route("/members", get(api::list_members))
        .route("/members/{id}", get(api::get_member))
        .route("/content/{key}", get(api::get_content))
        .route("/auth/login", post(api::login));

    // Admin panel writes, behind session auth
    let admin_api = Router::new()
        // Projects
        .route("/projects", post(api::create_project))
        .route("/projects", put(api::replace_projects))
        .route("/projects/{id}", put(api::update_project))
        .route("/projects/{id}", delete(api::delete_project))
        // Taxonomy
        .route("/categories", post(api::create_category))
        .route("/categories/{id}", put(api::update_category))
        .route("/categories/{id}", delete(api::delete_category))
        .route("/tags", post(api::create_tag))
        .route("/tags/{id}", put(api::update_tag))
        .route("/tags/{id}", delete(api::delete_tag))
        // Members
        .route("/members", post(api::create_member))
        .route("/members/{id}", put(api::update_member))
        .route("/members/{id}", delete(api::delete_member))
        .route("/members/{id}/skills", post(api::add_skill))
        .route("/members/{id}/skills", put(api::rename_skill))
        .route("/members/{id}/skills", delete(api::remove_skill))
        // Content
        .route("/content/{key}", put(api::put_content))
        // Media
        .route("/media", post(api::upload_image))
        .route("/media", delete(api::delete_image))
        // Maintenance
        .route("/admin/migrate", post(api::run_migration))
        .route("/auth/logout", post(api::logout))
        .layer(middleware::from_fn(move |req, next| {
            auth::session_auth_layer(admin_password.clone(), sessions.clone(), req, next)
        }));

    let api_routes = public_api
        .merge(admin_api)
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BODY_BYTES));

    // Health check (no auth required)
    let health_routes = Router::new().route("/health", get(health_check));

    Router::new()
        .nest("/api", api_routes)
        .nest_service("/media", ServeDir::new(state.config.media_dir.clone()))
        .merge(health_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests;
