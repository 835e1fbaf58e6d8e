//! Router-wide middleware applying the gate to admin pages and the login page

use axum::{
    extract::{Extension, Request},
    http::{header::LOCATION, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::info;

use super::gate::{catch_gate_panic, Decision};
use super::models::Identity;
use super::session::session_token;
use crate::common::{ApiError, SharedState};

/// 302 to `target`
pub fn redirect(target: &str) -> Response {
    (StatusCode::FOUND, [(LOCATION, target.to_string())]).into_response()
}

/// Gate middleware.
///
/// On `Allow` the resolved identity (if any) is stored in the request
/// extensions for extractors further down; otherwise the request is answered
/// with a redirect and never reaches its handler.
pub async fn session_gate(
    Extension(state_lock): Extension<SharedState>,
    mut request: Request,
    next: Next,
) -> Response {
    let (gate, cookie_name) = {
        let state = state_lock.read().await;
        (state.gate.clone(), state.session_cookie.clone())
    };

    let path = request.uri().path().to_string();
    let token = session_token(request.headers(), &cookie_name);

    let Some(authorization) = catch_gate_panic(gate.authorize(&path, token.as_deref())).await
    else {
        return ApiError::InternalServer("Unable to verify access".to_string()).into_response();
    };

    match authorization.decision.redirect_target() {
        None => {
            if let Some(identity) = authorization.identity {
                request.extensions_mut().insert(identity);
            }
            next.run(request).await
        }
        Some(target) => {
            if authorization.decision == Decision::RedirectToHome {
                let user_id = authorization
                    .identity
                    .as_ref()
                    .and_then(Identity::user)
                    .map(|u| u.id.clone())
                    .unwrap_or_default();
                info!(path = %path, user_id = %user_id, "Admin area denied: no admin or editor role");
            }
            redirect(target)
        }
    }
}
