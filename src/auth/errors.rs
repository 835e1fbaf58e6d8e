//! Errors raised while resolving a session or its roles

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GateError {
    #[error("auth provider request failed: {0}")]
    ProviderHttp(#[from] reqwest::Error),

    #[error("auth provider returned {status}: {body}")]
    ProviderStatus { status: u16, body: String },

    #[error("role lookup failed: {0}")]
    RoleLookup(#[from] sqlx::Error),
}
