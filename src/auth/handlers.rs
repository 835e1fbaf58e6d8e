//! Authentication handlers

use axum::{
    extract::{Extension, Form, Json},
    http::{header::SET_COOKIE, HeaderMap, StatusCode},
    response::{Html, IntoResponse, Response},
};
use tracing::{info, warn};

use super::extractors::{ApiSession, RequireAuth};
use super::gate::{DASHBOARD_PATH, LOGIN_PATH};
use super::middleware::redirect;
use super::models::{LoginRequest, LoginResponse, MeResponse};
use super::session::{build_session_cookie, clear_session_cookie, session_token, SignedIn};
use crate::common::validation::is_valid_email;
use crate::common::{safe_email_log, ApiError, AppState, SharedState, ValidationResult};

const LOGIN_PAGE: &str = r#"<!doctype html>
<html lang="en">
<head><meta charset="utf-8"><title>Sign in</title></head>
<body>
<form method="post" action="/login">
<label>Email <input type="email" name="email" required></label>
<label>Password <input type="password" name="password" required></label>
<button type="submit">Sign in</button>
</form>
</body>
</html>
"#;

/// Forwards credentials to the auth provider
async fn sign_in(state: &AppState, req: &LoginRequest) -> Result<SignedIn, ApiError> {
    let mut validation = ValidationResult::new();
    if !is_valid_email(req.email.trim()) {
        validation.add_error("email", "A valid email address is required");
    }
    if req.password.is_empty() {
        validation.add_error("password", "Password is required");
    }
    validation.into_result()?;

    let client = state
        .auth_client
        .clone()
        .ok_or_else(|| ApiError::ServiceUnavailable("Sign-in is not configured".to_string()))?;

    match client
        .sign_in_with_password(req.email.trim(), &req.password)
        .await
    {
        Ok(Some(signed_in)) => {
            info!(
                user_id = %signed_in.user.id,
                email = %safe_email_log(&signed_in.user.email),
                "User signed in"
            );
            Ok(signed_in)
        }
        Ok(None) => {
            warn!(email = %safe_email_log(&req.email), "Sign-in rejected by auth provider");
            Err(ApiError::Unauthorized("invalid email or password".to_string()))
        }
        Err(e) => Err(e.into()),
    }
}

fn session_cookie_for(state: &AppState, signed_in: &SignedIn) -> String {
    build_session_cookie(
        &state.session_cookie,
        &signed_in.access_token,
        signed_in.expires_in,
        state.cookie_secure,
    )
}

/// GET /login - Sign-in form (signed-in callers are redirected by the gate)
pub async fn login_page() -> Html<&'static str> {
    Html(LOGIN_PAGE)
}

/// POST /login - Form sign-in; lands on the dashboard or back on the form
pub async fn login_form(
    Extension(state_lock): Extension<SharedState>,
    Form(req): Form<LoginRequest>,
) -> Response {
    let state = state_lock.read().await.clone();

    match sign_in(&state, &req).await {
        Ok(signed_in) => {
            let cookie = session_cookie_for(&state, &signed_in);
            let mut response = redirect(DASHBOARD_PATH);
            if let Ok(value) = cookie.parse() {
                response.headers_mut().insert(SET_COOKIE, value);
            }
            response
        }
        Err(_) => redirect("/login?error=1"),
    }
}

/// POST /api/auth/login - JSON sign-in, sets the session cookie
pub async fn login_handler(
    Extension(state_lock): Extension<SharedState>,
    Json(req): Json<LoginRequest>,
) -> Result<Response, ApiError> {
    let state = state_lock.read().await.clone();
    let signed_in = sign_in(&state, &req).await?;
    let cookie = session_cookie_for(&state, &signed_in);

    Ok((
        StatusCode::OK,
        [(SET_COOKIE, cookie)],
        Json(LoginResponse {
            user: signed_in.user,
            redirect_to: DASHBOARD_PATH.to_string(),
        }),
    )
        .into_response())
}

/// Revokes the session at the provider (best effort); returns the clearing cookie
async fn sign_out(state: &AppState, user_id: &str, headers: &HeaderMap) -> String {
    if let (Some(client), Some(token)) = (
        state.auth_client.as_ref(),
        session_token(headers, &state.session_cookie),
    ) {
        if let Err(e) = client.sign_out(&token).await {
            warn!(error = %e, user_id = %user_id, "Auth provider sign-out failed");
        }
    }

    info!(user_id = %user_id, "User signed out");
    clear_session_cookie(&state.session_cookie, state.cookie_secure)
}

/// POST /logout - Form sign-out, back to the sign-in page
pub async fn logout_form(
    Extension(state_lock): Extension<SharedState>,
    RequireAuth(user): RequireAuth,
    headers: HeaderMap,
) -> Response {
    let state = state_lock.read().await.clone();
    let cookie = sign_out(&state, &user.id, &headers).await;

    let mut response = redirect(LOGIN_PATH);
    if let Ok(value) = cookie.parse() {
        response.headers_mut().insert(SET_COOKIE, value);
    }
    response
}

/// POST /api/auth/logout - Revoke at the provider (best effort) and clear the cookie
pub async fn logout_handler(
    Extension(state_lock): Extension<SharedState>,
    ApiSession(user): ApiSession,
    headers: HeaderMap,
) -> Response {
    let state = state_lock.read().await.clone();
    let cookie = sign_out(&state, &user.id, &headers).await;

    (
        StatusCode::OK,
        [(SET_COOKIE, cookie)],
        Json(serde_json::json!({ "ok": true })),
    )
        .into_response()
}

/// GET /api/me - The caller's identity and roles
pub async fn me_handler(ApiSession(user): ApiSession) -> Json<MeResponse> {
    Json(MeResponse::from(user))
}
