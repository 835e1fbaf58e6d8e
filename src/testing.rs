//! Test fixtures: in-memory collaborators and a router wired against them

use async_trait::async_trait;
use axum::{body::Body, http::Request, response::Response, Router};
use serde_json::Value;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tower::ServiceExt;
use tracing::subscriber::DefaultGuard;
use tracing::Level;

use crate::auth::errors::GateError;
use crate::auth::models::SessionUser;
use crate::auth::roles::{RoleStore, SqlRoleStore};
use crate::auth::session::SessionProvider;
use crate::auth::Gate;
use crate::common::config::DEFAULT_SESSION_COOKIE;
use crate::common::dev_mode::DevModeConfig;
use crate::common::migrations::run_migrations;
use crate::common::{AppState, SharedState};

pub const ADMIN_TOKEN: &str = "admin-token";
pub const EDITOR_TOKEN: &str = "editor-token";
pub const GUEST_TOKEN: &str = "guest-token";

pub fn session_user(id: &str) -> SessionUser {
    SessionUser {
        id: id.to_string(),
        email: format!("{}@example.test", id),
    }
}

/// Token → user table; counts lookups
pub struct StaticSessions {
    users: HashMap<String, SessionUser>,
    pub calls: AtomicUsize,
}

impl StaticSessions {
    pub fn new(entries: &[(&str, &str)]) -> Self {
        Self {
            users: entries
                .iter()
                .map(|(token, id)| (token.to_string(), session_user(id)))
                .collect(),
            calls: AtomicUsize::new(0),
        }
    }

    /// admin-token → admin-user, editor-token → editor-user, guest-token → guest-user
    pub fn standard() -> Self {
        Self::new(&[
            (ADMIN_TOKEN, "admin-user"),
            (EDITOR_TOKEN, "editor-user"),
            (GUEST_TOKEN, "guest-user"),
        ])
    }
}

#[async_trait]
impl SessionProvider for StaticSessions {
    async fn session_user(&self, token: &str) -> Result<Option<SessionUser>, GateError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.users.get(token).cloned())
    }
}

pub struct FailingSessions;

#[async_trait]
impl SessionProvider for FailingSessions {
    async fn session_user(&self, _token: &str) -> Result<Option<SessionUser>, GateError> {
        Err(GateError::ProviderStatus {
            status: 503,
            body: "unavailable".to_string(),
        })
    }
}

/// User id → role names table; counts lookups
pub struct StaticRoles {
    roles: HashMap<String, Vec<String>>,
    pub calls: AtomicUsize,
}

impl StaticRoles {
    pub fn new(entries: &[(&str, &[&str])]) -> Self {
        Self {
            roles: entries
                .iter()
                .map(|(id, names)| {
                    (
                        id.to_string(),
                        names.iter().map(|n| n.to_string()).collect(),
                    )
                })
                .collect(),
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl RoleStore for StaticRoles {
    async fn roles_for_user(&self, user_id: &str) -> Result<Vec<String>, GateError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.roles.get(user_id).cloned().unwrap_or_default())
    }
}

pub struct FailingRoles;

#[async_trait]
impl RoleStore for FailingRoles {
    async fn roles_for_user(&self, _user_id: &str) -> Result<Vec<String>, GateError> {
        Err(GateError::RoleLookup(sqlx::Error::PoolTimedOut))
    }
}

pub struct PanickingRoles;

#[async_trait]
impl RoleStore for PanickingRoles {
    async fn roles_for_user(&self, _user_id: &str) -> Result<Vec<String>, GateError> {
        panic!("role store exploded");
    }
}

/// Migrated single-connection in-memory database
pub async fn memory_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory sqlite");
    run_migrations(&pool).await.expect("migrations");
    pool
}

pub async fn assign_role(db: &SqlitePool, user_id: &str, role: &str) {
    sqlx::query(
        "INSERT INTO user_roles (user_id, role_id) SELECT ?, id FROM roles WHERE name = ?",
    )
    .bind(user_id)
    .bind(role)
    .execute(db)
    .await
    .expect("assign role");
}

pub struct TestApp {
    pub router: Router,
    pub db: SqlitePool,
    pub state: SharedState,
}

impl TestApp {
    /// Standard sessions; roles read from the database, where admin-user is
    /// admin and editor-user is editor
    pub async fn new() -> Self {
        let db = memory_pool().await;
        assign_role(&db, "admin-user", "admin").await;
        assign_role(&db, "editor-user", "editor").await;
        let roles = Arc::new(SqlRoleStore::new(db.clone()));
        Self::with_collaborators(db, Arc::new(StaticSessions::standard()), roles)
    }

    pub async fn with_roles(roles: Arc<dyn RoleStore>) -> Self {
        let db = memory_pool().await;
        Self::with_collaborators(db, Arc::new(StaticSessions::standard()), roles)
    }

    pub fn with_collaborators(
        db: SqlitePool,
        sessions: Arc<dyn SessionProvider>,
        roles: Arc<dyn RoleStore>,
    ) -> Self {
        let gate = Arc::new(Gate::new(sessions, roles, DevModeConfig::disabled()));
        let state = AppState {
            db: db.clone(),
            gate,
            auth_client: None,
            session_cookie: DEFAULT_SESSION_COOKIE.to_string(),
            cookie_secure: false,
        };
        let state = Arc::new(RwLock::new(state));
        let router = crate::build_app(state.clone(), &[]);
        Self { router, db, state }
    }

    pub async fn send(&self, request: Request<Body>) -> Response {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible")
    }

    pub async fn get(&self, path: &str, token: Option<&str>) -> Response {
        self.send(request("GET", path, token, None)).await
    }
}

pub fn request(method: &str, path: &str, token: Option<&str>, json: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(path);
    if let Some(token) = token {
        builder = builder.header("cookie", format!("{}={}", DEFAULT_SESSION_COOKIE, token));
    }
    match json {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .expect("request"),
        None => builder.body(Body::empty()).expect("request"),
    }
}

/// Installs a fmt subscriber at `level` for the current thread until the guard drops
pub fn capture_logs(level: Level) -> DefaultGuard {
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_test_writer()
        .finish();
    tracing::subscriber::set_default(subscriber)
}

pub fn location(response: &Response) -> Option<&str> {
    response
        .headers()
        .get("location")
        .and_then(|v| v.to_str().ok())
}

pub async fn body_json(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json body")
}
