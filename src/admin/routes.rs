// src/admin/routes.rs

use axum::{routing::get, Router};

use super::handlers;
use crate::auth::gate::DASHBOARD_PATH;
use crate::auth::middleware::redirect;

/// Admin pages. Every path here sits under the gated `/admin` prefix.
pub fn admin_routes() -> Router {
    Router::new()
        .route("/admin", get(|| async { redirect(DASHBOARD_PATH) }))
        .route(
            "/admin/dashboard",
            get(handlers::dashboard::get_dashboard_metrics),
        )
}
