//! Tests for the session & role gate
//!
//! Policy tables for `decide`/`check`, resolution against in-memory
//! collaborators, and the gate driven end-to-end through the router.

use axum::{
    extract::Query,
    http::{header::AUTHORIZATION, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::Level;

use super::errors::GateError;
use super::gate::{check, decide, Decision, Gate, Requirement, Route};
use super::models::{Claims, CurrentUser, Identity, Role, RoleSet};
use super::roles::{RoleStore, SqlRoleStore};
use super::session::{
    build_session_cookie, clear_session_cookie, session_token, HostedAuthClient,
    JwtSessionProvider, SessionProvider,
};
use crate::common::dev_mode::DevModeConfig;
use crate::testing::*;

fn signed_in(roles: &[&str]) -> Identity {
    Identity::Authenticated(CurrentUser {
        id: "user-1".to_string(),
        email: "user-1@example.test".to_string(),
        roles: RoleSet::for_user(roles.iter().copied()),
    })
}

fn gate(sessions: Arc<dyn SessionProvider>, roles: Arc<dyn RoleStore>) -> Gate {
    Gate::new(sessions, roles, DevModeConfig::disabled())
}

fn standard_roles() -> Arc<StaticRoles> {
    Arc::new(StaticRoles::new(&[
        ("admin-user", &["admin"]),
        ("editor-user", &["editor"]),
        ("guest-user", &[]),
    ]))
}

// ============================================================================
// Route classification and role mapping
// ============================================================================

#[test]
fn test_route_classification() {
    assert_eq!(Route::classify("/admin"), Route::Admin);
    assert_eq!(Route::classify("/admin/"), Route::Admin);
    assert_eq!(Route::classify("/admin/tours/T_123"), Route::Admin);
    assert_eq!(Route::classify("/administrator"), Route::Public);
    assert_eq!(Route::classify("/api/admin/tours"), Route::Public);
    assert_eq!(Route::classify("/login"), Route::Login);
    assert_eq!(Route::classify("/login/"), Route::Login);
    assert_eq!(Route::classify("/login-help"), Route::Public);
    assert_eq!(Route::classify("/"), Route::Public);
    assert_eq!(Route::classify("/tours/kyoto"), Route::Public);
}

#[test]
fn test_role_names_map_onto_closed_set() {
    assert_eq!(Role::from_name("admin"), Role::Admin);
    assert_eq!(Role::from_name(" Editor "), Role::Editor);
    assert_eq!(Role::from_name("support"), Role::Authenticated);
    assert_eq!(Role::from_name("anon"), Role::Anonymous);

    let roles = RoleSet::for_user(["editor", "support"]);
    assert!(roles.contains(Role::Editor));
    assert!(roles.contains(Role::Authenticated));
    assert!(!roles.contains(Role::Admin));

    // A signed-in user never ends up anonymous, even with odd role rows
    let roles = RoleSet::for_user(["anonymous"]);
    assert!(!roles.contains(Role::Anonymous));
    assert!(roles.contains(Role::Authenticated));
}

// ============================================================================
// Policy: decide / check
// ============================================================================

#[test]
fn test_admin_route_without_session_redirects_to_login() {
    assert_eq!(
        decide(Route::Admin, &Identity::Anonymous),
        Decision::RedirectToLogin
    );
}

#[test]
fn test_admin_route_without_qualifying_role_redirects_home() {
    assert_eq!(decide(Route::Admin, &signed_in(&[])), Decision::RedirectToHome);
    assert_eq!(
        decide(Route::Admin, &signed_in(&["support", "viewer"])),
        Decision::RedirectToHome
    );
}

#[test]
fn test_admin_route_allows_admin_and_editor() {
    assert_eq!(decide(Route::Admin, &signed_in(&["admin"])), Decision::Allow);
    assert_eq!(decide(Route::Admin, &signed_in(&["editor"])), Decision::Allow);
    // Any matching row admits, regardless of order
    assert_eq!(
        decide(Route::Admin, &signed_in(&["viewer", "editor"])),
        Decision::Allow
    );
}

#[test]
fn test_login_route() {
    assert_eq!(
        decide(Route::Login, &signed_in(&[])),
        Decision::RedirectToDashboard
    );
    assert_eq!(decide(Route::Login, &Identity::Anonymous), Decision::Allow);
}

#[test]
fn test_public_routes_always_allow() {
    assert_eq!(decide(Route::Public, &Identity::Anonymous), Decision::Allow);
    assert_eq!(decide(Route::Public, &signed_in(&[])), Decision::Allow);
}

#[test]
fn test_mutation_requirements() {
    let guest = signed_in(&[]);
    let editor = signed_in(&["editor"]);
    let admin = signed_in(&["admin"]);

    for requirement in [Requirement::Auth, Requirement::Editor, Requirement::Admin] {
        assert_eq!(
            check(requirement, &Identity::Anonymous),
            Decision::RedirectToLogin
        );
    }

    assert_eq!(check(Requirement::Auth, &guest), Decision::Allow);
    assert_eq!(check(Requirement::Editor, &guest), Decision::RedirectToHome);
    assert_eq!(check(Requirement::Editor, &editor), Decision::Allow);
    assert_eq!(check(Requirement::Editor, &admin), Decision::Allow);
    assert_eq!(check(Requirement::Admin, &editor), Decision::RedirectToHome);
    assert_eq!(check(Requirement::Admin, &admin), Decision::Allow);
}

#[test]
fn test_decision_redirect_targets() {
    assert_eq!(Decision::Allow.redirect_target(), None);
    assert_eq!(Decision::RedirectToLogin.redirect_target(), Some("/login"));
    assert_eq!(Decision::RedirectToHome.redirect_target(), Some("/"));
    assert_eq!(
        Decision::RedirectToDashboard.redirect_target(),
        Some("/admin/dashboard")
    );
}

// ============================================================================
// Cookies
// ============================================================================

#[test]
fn test_session_token_is_read_from_named_cookie() {
    let mut headers = HeaderMap::new();
    headers.append(
        "cookie",
        HeaderValue::from_static("theme=dark; sb-access-token=abc.def.ghi; lang=en"),
    );
    assert_eq!(
        session_token(&headers, "sb-access-token"),
        Some("abc.def.ghi".to_string())
    );
    assert_eq!(session_token(&headers, "missing"), None);
}

#[test]
fn test_session_token_across_multiple_cookie_headers_and_empty_value() {
    let mut headers = HeaderMap::new();
    headers.append("cookie", HeaderValue::from_static("theme=dark"));
    headers.append("cookie", HeaderValue::from_static("session=tok"));
    assert_eq!(session_token(&headers, "session"), Some("tok".to_string()));

    let mut headers = HeaderMap::new();
    headers.append("cookie", HeaderValue::from_static("session="));
    assert_eq!(session_token(&headers, "session"), None);
}

#[test]
fn test_session_cookie_attributes() {
    let cookie = build_session_cookie("session", "tok", 3600, true);
    assert_eq!(
        cookie,
        "session=tok; Path=/; HttpOnly; SameSite=Lax; Max-Age=3600; Secure"
    );

    let cleared = clear_session_cookie("session", false);
    assert_eq!(cleared, "session=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0");
}

// ============================================================================
// Local JWT verification
// ============================================================================

fn mint(secret: &str, sub: &str, exp: usize) -> String {
    let claims = Claims {
        sub: sub.to_string(),
        email: Some(format!("{}@example.test", sub)),
        exp,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .expect("Failed to encode token")
}

#[tokio::test]
async fn test_jwt_provider_accepts_valid_token() {
    let provider = JwtSessionProvider::new("test_secret_key");
    let token = mint("test_secret_key", "user-123", 9999999999);

    let user = provider
        .session_user(&token)
        .await
        .unwrap()
        .expect("valid token resolves to a user");
    assert_eq!(user.id, "user-123");
    assert_eq!(user.email, "user-123@example.test");
}

#[tokio::test]
async fn test_jwt_provider_rejects_wrong_secret_expired_and_garbage() {
    let provider = JwtSessionProvider::new("test_secret_key");

    let wrong_secret = mint("wrong_secret_key", "user-123", 9999999999);
    assert!(provider.session_user(&wrong_secret).await.unwrap().is_none());

    let expired = mint("test_secret_key", "user-123", 1_000_000);
    assert!(provider.session_user(&expired).await.unwrap().is_none());

    assert!(provider.session_user("not-a-jwt").await.unwrap().is_none());
}

// ============================================================================
// Resolution against collaborators
// ============================================================================

#[tokio::test]
async fn test_missing_or_unknown_session_is_anonymous() {
    let sessions = Arc::new(StaticSessions::standard());
    let gate = gate(sessions.clone(), standard_roles());

    assert_eq!(gate.resolve(None).await, Identity::Anonymous);
    // No cookie means the provider is never asked
    assert_eq!(sessions.calls.load(Ordering::SeqCst), 0);

    assert_eq!(gate.resolve(Some("stale-token")).await, Identity::Anonymous);
}

#[tokio::test]
async fn test_provider_error_is_anonymous() {
    let gate = gate(Arc::new(FailingSessions), standard_roles());

    assert_eq!(gate.resolve(Some(ADMIN_TOKEN)).await, Identity::Anonymous);
    let auth = gate.authorize("/admin/dashboard", Some(ADMIN_TOKEN)).await;
    assert_eq!(auth.decision, Decision::RedirectToLogin);
}

#[tokio::test]
async fn test_authorize_admin_paths_per_role() {
    let gate = gate(Arc::new(StaticSessions::standard()), standard_roles());

    let cases = [
        (None, Decision::RedirectToLogin),
        (Some(GUEST_TOKEN), Decision::RedirectToHome),
        (Some(EDITOR_TOKEN), Decision::Allow),
        (Some(ADMIN_TOKEN), Decision::Allow),
    ];
    for (token, expected) in cases {
        let auth = gate.authorize("/admin/tours", token).await;
        assert_eq!(auth.decision, expected, "token {:?}", token);
    }
}

#[tokio::test]
async fn test_authorize_login_path() {
    let gate = gate(Arc::new(StaticSessions::standard()), standard_roles());

    let auth = gate.authorize("/login", Some(GUEST_TOKEN)).await;
    assert_eq!(auth.decision, Decision::RedirectToDashboard);

    let auth = gate.authorize("/login", None).await;
    assert_eq!(auth.decision, Decision::Allow);
}

#[tokio::test]
async fn test_public_paths_skip_resolution() {
    let sessions = Arc::new(StaticSessions::standard());
    let roles = standard_roles();
    let gate = gate(sessions.clone(), roles.clone());

    let auth = gate.authorize("/api/tours", Some(ADMIN_TOKEN)).await;
    assert_eq!(auth.decision, Decision::Allow);
    assert!(auth.identity.is_none());
    assert_eq!(sessions.calls.load(Ordering::SeqCst), 0);
    assert_eq!(roles.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_role_lookup_failure_fails_closed() {
    let failing = gate(Arc::new(StaticSessions::standard()), Arc::new(FailingRoles));
    let no_role = gate(
        Arc::new(StaticSessions::standard()),
        Arc::new(StaticRoles::new(&[])),
    );

    for token in [ADMIN_TOKEN, EDITOR_TOKEN] {
        let failed = failing.authorize("/admin/dashboard", Some(token)).await;
        let empty = no_role.authorize("/admin/dashboard", Some(token)).await;
        assert_eq!(failed.decision, Decision::RedirectToHome);
        assert_eq!(failed.decision, empty.decision);
    }
}

#[tokio::test]
async fn test_authorize_is_idempotent_and_uncached() {
    let sessions = Arc::new(StaticSessions::standard());
    let roles = standard_roles();
    let gate = gate(sessions.clone(), roles.clone());

    let first = gate.authorize("/admin/dashboard", Some(EDITOR_TOKEN)).await;
    let second = gate.authorize("/admin/dashboard", Some(EDITOR_TOKEN)).await;

    assert_eq!(first.decision, second.decision);
    assert_eq!(first.identity, second.identity);
    // Each call resolves afresh
    assert_eq!(sessions.calls.load(Ordering::SeqCst), 2);
    assert_eq!(roles.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_dev_mode_substitutes_dev_user() {
    let dev_mode = DevModeConfig {
        enabled: true,
        user_email: "dev@localhost.test".to_string(),
        user_role: Role::Editor,
    };
    let sessions = Arc::new(StaticSessions::standard());
    let gate = Gate::new(sessions.clone(), standard_roles(), dev_mode);

    let auth = gate.authorize("/admin/dashboard", None).await;
    assert_eq!(auth.decision, Decision::Allow);
    assert_eq!(sessions.calls.load(Ordering::SeqCst), 0);
}

// ============================================================================
// SQL role store
// ============================================================================

#[tokio::test]
async fn test_sql_role_store_returns_every_assigned_role() {
    let db = memory_pool().await;
    assign_role(&db, "user-1", "editor").await;
    assign_role(&db, "user-1", "admin").await;

    let store = SqlRoleStore::new(db);
    let mut names = store.roles_for_user("user-1").await.unwrap();
    names.sort();
    assert_eq!(names, vec!["admin".to_string(), "editor".to_string()]);

    assert!(store.roles_for_user("nobody").await.unwrap().is_empty());
}

// ============================================================================
// End-to-end through the router
// ============================================================================

#[tokio::test]
async fn test_admin_page_redirects() {
    let app = TestApp::new().await;

    let response = app.get("/admin/dashboard", None).await;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), Some("/login"));

    let response = app.get("/admin/dashboard", Some(GUEST_TOKEN)).await;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), Some("/"));

    let response = app.get("/admin/dashboard", Some("forged")).await;
    assert_eq!(location(&response), Some("/login"));
}

#[tokio::test]
async fn test_admin_page_renders_for_editor() {
    let app = TestApp::new().await;

    let response = app.get("/admin/dashboard", Some(EDITOR_TOKEN)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["viewer"]["id"], "editor-user");
    assert_eq!(body["total_tours"], 0);
}

#[tokio::test]
async fn test_login_page_redirects_signed_in_users() {
    let app = TestApp::new().await;

    let response = app.get("/login", Some(GUEST_TOKEN)).await;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), Some("/admin/dashboard"));

    let response = app.get("/login", None).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_me_requires_session() {
    let app = TestApp::new().await;

    let response = app.get("/api/me", None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["code"], "UNAUTHORIZED");

    let response = app.get("/api/me", Some(ADMIN_TOKEN)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["id"], "admin-user");
    assert_eq!(body["can_access_admin"], true);
    assert_eq!(body["roles"], json!(["authenticated", "admin"]));
}

#[tokio::test]
async fn test_logout_clears_cookie() {
    let app = TestApp::new().await;

    let response = app
        .send(request("POST", "/api/auth/logout", Some(GUEST_TOKEN), None))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let cookie = response
        .headers()
        .get("set-cookie")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    assert!(cookie.starts_with("sb-access-token=;"));
    assert!(cookie.contains("Max-Age=0"));
}

#[tokio::test]
async fn test_form_logout_returns_to_login() {
    let app = TestApp::new().await;

    let response = app
        .send(request("POST", "/logout", Some(EDITOR_TOKEN), None))
        .await;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), Some("/login"));
    assert!(response.headers().contains_key("set-cookie"));

    // Nobody to sign out
    let response = app.send(request("POST", "/logout", None, None)).await;
    assert_eq!(location(&response), Some("/login"));
    assert!(!response.headers().contains_key("set-cookie"));
}

#[tokio::test]
async fn test_login_without_provider_is_unavailable() {
    let app = TestApp::new().await;

    let response = app
        .send(request(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({ "email": "guide@example.test", "password": "secret" })),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    let response = app
        .send(request(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({ "email": "not-an-email", "password": "" })),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_role_store_failure_denies_admin_page() {
    let app = TestApp::with_roles(Arc::new(FailingRoles)).await;

    let response = app.get("/admin/dashboard", Some(ADMIN_TOKEN)).await;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), Some("/"));
}

#[tokio::test]
async fn test_gate_panic_denies_gated_route_only() {
    let app = TestApp::with_roles(Arc::new(PanickingRoles)).await;

    let response = app.get("/admin/dashboard", Some(ADMIN_TOKEN)).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    // Public routes never run resolution
    let response = app.get("/api/tours", Some(ADMIN_TOKEN)).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_admin_page_with_non_ascii_email_under_debug_logging() {
    let _logs = capture_logs(Level::DEBUG);
    let db = memory_pool().await;
    assign_role(&db, "élodie", "editor").await;
    let roles = Arc::new(SqlRoleStore::new(db.clone()));
    let sessions = Arc::new(StaticSessions::new(&[("elodie-token", "élodie")]));
    let app = TestApp::with_collaborators(db, sessions, roles);

    let response = app.get("/admin/dashboard", Some("elodie-token")).await;
    assert_eq!(response.status(), StatusCode::OK);
}

// ============================================================================
// Hosted auth provider, against a local stand-in
// ============================================================================

const ANON_KEY: &str = "anon-key";

async fn provider_user(headers: HeaderMap) -> Response {
    if headers.get("apikey").and_then(|v| v.to_str().ok()) != Some(ANON_KEY) {
        return StatusCode::BAD_REQUEST.into_response();
    }
    match headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok()) {
        Some("Bearer live-token") => {
            Json(json!({ "id": "hosted-user", "email": "hosted@example.test" })).into_response()
        }
        Some("Bearer expired-token") => StatusCode::UNAUTHORIZED.into_response(),
        Some("Bearer revoked-token") => StatusCode::FORBIDDEN.into_response(),
        _ => (StatusCode::INTERNAL_SERVER_ERROR, "upstream exploded").into_response(),
    }
}

async fn provider_token(
    Query(query): Query<HashMap<String, String>>,
    Json(body): Json<Value>,
) -> Response {
    if query.get("grant_type").map(String::as_str) != Some("password") {
        return StatusCode::UNPROCESSABLE_ENTITY.into_response();
    }
    if body["password"] != "secret" {
        return (StatusCode::BAD_REQUEST, Json(json!({ "error": "invalid_grant" })))
            .into_response();
    }
    Json(json!({
        "access_token": "live-token",
        "token_type": "bearer",
        "expires_in": 3600,
        "user": { "id": "hosted-user", "email": body["email"] }
    }))
    .into_response()
}

/// Serves the provider's user, token and logout endpoints on an ephemeral port
async fn spawn_provider() -> HostedAuthClient {
    let router = Router::new()
        .route("/auth/v1/user", get(provider_user))
        .route("/auth/v1/token", post(provider_token))
        .route("/auth/v1/logout", post(|| async { StatusCode::NO_CONTENT }));

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind provider stand-in");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("provider stand-in");
    });

    HostedAuthClient::new(reqwest::Client::new(), format!("http://{}", addr), ANON_KEY)
}

#[tokio::test]
async fn test_hosted_session_status_mapping() {
    let client = spawn_provider().await;

    let user = client
        .session_user("live-token")
        .await
        .unwrap()
        .expect("live token resolves");
    assert_eq!(user.id, "hosted-user");
    assert_eq!(user.email, "hosted@example.test");

    assert!(client.session_user("expired-token").await.unwrap().is_none());
    assert!(client.session_user("revoked-token").await.unwrap().is_none());

    match client.session_user("anything-else").await {
        Err(GateError::ProviderStatus { status, body }) => {
            assert_eq!(status, 500);
            assert_eq!(body, "upstream exploded");
        }
        other => panic!("expected provider status error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_hosted_password_grant() {
    let client = spawn_provider().await;

    let signed_in = client
        .sign_in_with_password("guide@example.test", "secret")
        .await
        .unwrap()
        .expect("credentials accepted");
    assert_eq!(signed_in.access_token, "live-token");
    assert_eq!(signed_in.expires_in, 3600);
    assert_eq!(signed_in.user.email, "guide@example.test");

    let rejected = client
        .sign_in_with_password("guide@example.test", "wrong")
        .await
        .unwrap();
    assert!(rejected.is_none());

    assert!(client.sign_out("live-token").await.is_ok());
}

#[tokio::test]
async fn test_login_sets_session_cookie() {
    let app = TestApp::new().await;
    app.state.write().await.auth_client = Some(Arc::new(spawn_provider().await));

    let response = app
        .send(request(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({ "email": "guide@example.test", "password": "secret" })),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let cookie = response
        .headers()
        .get("set-cookie")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert_eq!(
        cookie,
        "sb-access-token=live-token; Path=/; HttpOnly; SameSite=Lax; Max-Age=3600"
    );
    let body = body_json(response).await;
    assert_eq!(body["redirect_to"], "/admin/dashboard");

    let response = app
        .send(request(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({ "email": "guide@example.test", "password": "wrong" })),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(!response.headers().contains_key("set-cookie"));
}
