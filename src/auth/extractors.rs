//! Authentication extractors for Axum
//!
//! `RequireAuth`, `RequireEditor` and `RequireAdmin` guard server-side
//! mutations: when the caller falls short they abort with a redirect, so the
//! handler body never runs. `ApiSession` guards JSON endpoints and answers 401.

use async_trait::async_trait;
use axum::{
    extract::{Extension, FromRequestParts},
    http::request::Parts,
    response::{IntoResponse, Response},
};
use tracing::{info, warn};

use super::gate::{catch_gate_panic, check, Decision, Requirement, LOGIN_PATH};
use super::middleware::redirect;
use super::models::{CurrentUser, Identity};
use super::session::session_token;
use crate::common::{ApiError, SharedState};

/// Identity for this request, resolved at most once.
///
/// Reuses what the gate middleware stored; otherwise resolves from the
/// session cookie and stores it for later extractors.
async fn request_identity<S>(parts: &mut Parts, state: &S) -> Result<Identity, ApiError>
where
    S: Send + Sync,
{
    if let Some(identity) = parts.extensions.get::<Identity>() {
        return Ok(identity.clone());
    }

    let Extension(state_lock): Extension<SharedState> =
        Extension::from_request_parts(parts, state)
            .await
            .map_err(|_| ApiError::InternalServer("missing app state".to_string()))?;

    let (gate, cookie_name) = {
        let state = state_lock.read().await;
        (state.gate.clone(), state.session_cookie.clone())
    };

    let token = session_token(&parts.headers, &cookie_name);
    let identity = catch_gate_panic(gate.resolve(token.as_deref()))
        .await
        .ok_or_else(|| ApiError::InternalServer("Unable to verify access".to_string()))?;

    parts.extensions.insert(identity.clone());
    Ok(identity)
}

async fn guard<S>(
    parts: &mut Parts,
    state: &S,
    requirement: Requirement,
) -> Result<CurrentUser, Response>
where
    S: Send + Sync,
{
    let identity = request_identity(parts, state)
        .await
        .map_err(IntoResponse::into_response)?;

    match (check(requirement, &identity), identity) {
        (Decision::Allow, Identity::Authenticated(user)) => Ok(user),
        (decision, identity) => {
            let target = decision.redirect_target().unwrap_or(LOGIN_PATH);
            if let Identity::Authenticated(user) = identity {
                info!(
                    user_id = %user.id,
                    requirement = ?requirement,
                    path = %parts.uri.path(),
                    "Mutation denied: insufficient role"
                );
            }
            Err(redirect(target))
        }
    }
}

/// Any signed-in user
#[derive(Debug)]
pub struct RequireAuth(pub CurrentUser);

/// Editor or admin
#[derive(Debug)]
pub struct RequireEditor(pub CurrentUser);

/// Admin only
#[derive(Debug)]
pub struct RequireAdmin(pub CurrentUser);

#[async_trait]
impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        guard(parts, state, Requirement::Auth).await.map(RequireAuth)
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for RequireEditor
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        guard(parts, state, Requirement::Editor)
            .await
            .map(RequireEditor)
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        guard(parts, state, Requirement::Admin)
            .await
            .map(RequireAdmin)
    }
}

/// Signed-in caller of a JSON endpoint; 401 otherwise
#[derive(Debug)]
pub struct ApiSession(pub CurrentUser);

#[async_trait]
impl<S> FromRequestParts<S> for ApiSession
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match request_identity(parts, state).await? {
            Identity::Authenticated(user) => Ok(ApiSession(user)),
            Identity::Anonymous => {
                warn!(path = %parts.uri.path(), "Authentication failed: no valid session");
                Err(ApiError::Unauthorized("missing or invalid session".into()))
            }
        }
    }
}
