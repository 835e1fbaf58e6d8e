// src/main.rs
use axum::{extract::Extension, middleware, routing::get, Json, Router};
use dotenv::dotenv;
use reqwest::Client;
use serde_json::{json, Value};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::path::PathBuf;
use std::time::Duration;
use std::{net::SocketAddr, str::FromStr, sync::Arc};
use tokio::{net::TcpListener, sync::RwLock};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::EnvFilter;

// ============================================================================
// MODULE IMPORTS
// ============================================================================

mod admin;
mod auth;
mod common;
mod content;
mod logging_middleware;

#[cfg(test)]
mod testing;

// ============================================================================
// COMMON IMPORTS
// ============================================================================

use auth::roles::SqlRoleStore;
use auth::session::{HostedAuthClient, JwtSessionProvider, NoSessionProvider, SessionProvider};
use auth::Gate;
use common::dev_mode::{apply_cli_override, print_dev_mode_status, DevModeConfig};
use common::{AppConfig, AppState, SharedState};

// ============================================================================
// MAIN APPLICATION ENTRY POINT
// ============================================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    // ========================================================================
    // ENVIRONMENT CONFIGURATION
    // ========================================================================

    let config = AppConfig::from_env();

    let dev_mode = apply_cli_override(DevModeConfig::from_env());
    print_dev_mode_status(&dev_mode);

    config.ensure_session_verification(dev_mode.is_enabled())?;

    // ========================================================================
    // DATABASE SETUP
    // ========================================================================

    if let Some(path_part) = config.database_url.strip_prefix("sqlite://") {
        let path_without_params = path_part.split('?').next().unwrap_or("");
        if !path_without_params.is_empty() && !path_without_params.starts_with(':') {
            let db_path = PathBuf::from(path_without_params);
            if let Some(parent) = db_path.parent() {
                if !parent.as_os_str().is_empty() {
                    tokio::fs::create_dir_all(parent).await?;
                }
            }
        }
    }

    let connect_options =
        SqliteConnectOptions::from_str(&config.database_url)?.create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .connect_with(connect_options)
        .await?;

    common::migrations::run_migrations(&pool).await?;
    common::migrations::grant_bootstrap_admins(&pool, &config.admin_user_ids).await?;

    // ========================================================================
    // AUTH COLLABORATORS
    // ========================================================================

    let http_client = Client::builder().timeout(Duration::from_secs(10)).build()?;

    let auth_client = config.auth_url.as_ref().map(|url| {
        Arc::new(HostedAuthClient::new(
            http_client.clone(),
            url.clone(),
            config.auth_anon_key.clone(),
        ))
    });

    let sessions: Arc<dyn SessionProvider> = match (&config.auth_jwt_secret, &auth_client) {
        (Some(secret), _) => {
            info!("Verifying session tokens locally");
            Arc::new(JwtSessionProvider::new(secret))
        }
        (None, Some(client)) => {
            info!("Verifying session tokens with the auth provider");
            client.clone()
        }
        (None, None) => Arc::new(NoSessionProvider),
    };

    let gate = Arc::new(Gate::new(
        sessions,
        Arc::new(SqlRoleStore::new(pool.clone())),
        dev_mode,
    ));

    // ========================================================================
    // APPLICATION STATE
    // ========================================================================

    let app_state = AppState {
        db: pool,
        gate,
        auth_client,
        session_cookie: config.session_cookie.clone(),
        cookie_secure: config.cookie_secure,
    };

    let shared = Arc::new(RwLock::new(app_state));
    let app = build_app(shared, &config.cors_origins);

    // ========================================================================
    // SERVER STARTUP
    // ========================================================================

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("Listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}

// ============================================================================
// ROUTER COMPOSITION
// ============================================================================

pub(crate) fn build_app(shared: SharedState, cors_origins: &[String]) -> Router {
    let origins: Vec<axum::http::HeaderValue> = cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        // Sign-in page and session endpoints
        .merge(auth::auth_routes())
        // Public content and admin mutations
        .merge(content::content_routes())
        // Admin pages (gated by prefix)
        .merge(admin::admin_routes())
        // ====================================================================
        // MIDDLEWARE AND LAYERS
        // ====================================================================
        .layer(middleware::from_fn(auth::session_gate))
        .layer(middleware::from_fn(logging_middleware::log_request_response))
        .layer(Extension(shared))
        .layer(
            CorsLayer::new()
                .allow_origin(origins)
                .allow_methods([
                    axum::http::Method::GET,
                    axum::http::Method::POST,
                    axum::http::Method::PUT,
                    axum::http::Method::DELETE,
                    axum::http::Method::PATCH,
                    axum::http::Method::OPTIONS,
                ])
                .allow_headers([axum::http::header::CONTENT_TYPE])
                .allow_credentials(true),
        )
        .layer(TraceLayer::new_for_http())
}

async fn root() -> Json<Value> {
    Json(json!({ "service": "tours_api", "status": "ok" }))
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "healthy" }))
}
