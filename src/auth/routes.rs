//! Authentication routes

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers;

/// Creates and returns the authentication router
///
/// # Routes
/// - `GET /login` - Sign-in form
/// - `POST /login` - Form sign-in
/// - `POST /logout` - Form sign-out
/// - `POST /api/auth/login` - JSON sign-in
/// - `POST /api/auth/logout` - Sign out and clear the session cookie
/// - `GET /api/me` - Current user and roles
pub fn auth_routes() -> Router {
    Router::new()
        .route(
            "/login",
            get(handlers::login_page).post(handlers::login_form),
        )
        .route("/logout", post(handlers::logout_form))
        .route("/api/auth/login", post(handlers::login_handler))
        .route("/api/auth/logout", post(handlers::logout_handler))
        .route("/api/me", get(handlers::me_handler))
}
