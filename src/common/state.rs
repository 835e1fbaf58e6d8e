// Application state shared across all modules

use sqlx::SqlitePool;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::auth::gate::Gate;
use crate::auth::session::HostedAuthClient;

/// Application state containing database pool, auth collaborators, and configuration
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub gate: Arc<Gate>,
    /// Present when `AUTH_URL` is configured; required for login/logout
    pub auth_client: Option<Arc<HostedAuthClient>>,
    pub session_cookie: String,
    pub cookie_secure: bool,
}

pub type SharedState = Arc<RwLock<AppState>>;
