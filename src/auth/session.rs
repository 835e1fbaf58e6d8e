//! Session resolution: cookie handling and the auth provider seam

use async_trait::async_trait;
use axum::http::{header::COOKIE, HeaderMap};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::errors::GateError;
use super::models::{Claims, SessionUser};

/// Resolves a session token to the user it belongs to.
///
/// `Ok(None)` means the token is not (or no longer) a valid session. `Err` is
/// reserved for the provider being unreachable or misbehaving.
#[async_trait]
pub trait SessionProvider: Send + Sync {
    async fn session_user(&self, token: &str) -> Result<Option<SessionUser>, GateError>;
}

/// Verifies provider-issued access tokens locally with the shared HS256 secret
pub struct JwtSessionProvider {
    key: DecodingKey,
    validation: Validation,
}

impl JwtSessionProvider {
    pub fn new(secret: &str) -> Self {
        Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::new(Algorithm::HS256),
        }
    }
}

#[async_trait]
impl SessionProvider for JwtSessionProvider {
    async fn session_user(&self, token: &str) -> Result<Option<SessionUser>, GateError> {
        match decode::<Claims>(token, &self.key, &self.validation) {
            Ok(data) => Ok(Some(SessionUser {
                id: data.claims.sub,
                email: data.claims.email.unwrap_or_default(),
            })),
            Err(e) => {
                debug!(error = %e, "Session token rejected");
                Ok(None)
            }
        }
    }
}

#[derive(Deserialize, Debug)]
struct HostedUser {
    id: String,
    #[serde(default)]
    email: Option<String>,
}

impl From<HostedUser> for SessionUser {
    fn from(user: HostedUser) -> Self {
        SessionUser {
            id: user.id,
            email: user.email.unwrap_or_default(),
        }
    }
}

#[derive(Serialize)]
struct PasswordGrant<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Deserialize, Debug)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
    user: HostedUser,
}

/// Access token handed out after a successful sign-in
#[derive(Debug)]
pub struct SignedIn {
    pub access_token: String,
    pub expires_in: u64,
    pub user: SessionUser,
}

/// Client for the hosted auth provider's REST surface
pub struct HostedAuthClient {
    http: Client,
    base_url: String,
    anon_key: String,
}

impl HostedAuthClient {
    pub fn new(http: Client, base_url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            anon_key: anon_key.into(),
        }
    }

    /// `GET /auth/v1/user` with the caller's token
    pub async fn get_user(&self, token: &str) -> Result<Option<SessionUser>, GateError> {
        let response = self
            .http
            .get(format!("{}/auth/v1/user", self.base_url))
            .header("apikey", &self.anon_key)
            .bearer_auth(token)
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => {
                let user: HostedUser = response.json().await?;
                Ok(Some(user.into()))
            }
            reqwest::StatusCode::UNAUTHORIZED | reqwest::StatusCode::FORBIDDEN => Ok(None),
            status => Err(GateError::ProviderStatus {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            }),
        }
    }

    /// Password grant. `Ok(None)` means the credentials were rejected.
    pub async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<SignedIn>, GateError> {
        let response = self
            .http
            .post(format!("{}/auth/v1/token", self.base_url))
            .query(&[("grant_type", "password")])
            .header("apikey", &self.anon_key)
            .json(&PasswordGrant { email, password })
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => {
                let token: TokenResponse = response.json().await?;
                Ok(Some(SignedIn {
                    access_token: token.access_token,
                    expires_in: token.expires_in,
                    user: token.user.into(),
                }))
            }
            reqwest::StatusCode::BAD_REQUEST | reqwest::StatusCode::UNAUTHORIZED => Ok(None),
            status => Err(GateError::ProviderStatus {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            }),
        }
    }

    /// Revokes the session at the provider
    pub async fn sign_out(&self, token: &str) -> Result<(), GateError> {
        let response = self
            .http
            .post(format!("{}/auth/v1/logout", self.base_url))
            .header("apikey", &self.anon_key)
            .bearer_auth(token)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() || status == reqwest::StatusCode::UNAUTHORIZED {
            Ok(())
        } else {
            Err(GateError::ProviderStatus {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            })
        }
    }
}

#[async_trait]
impl SessionProvider for HostedAuthClient {
    async fn session_user(&self, token: &str) -> Result<Option<SessionUser>, GateError> {
        self.get_user(token).await
    }
}

/// Reads the session token out of the request's `Cookie` headers
pub fn session_token(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .find_map(|pair| {
            let (name, value) = pair.trim().split_once('=')?;
            (name == cookie_name && !value.is_empty()).then(|| value.to_string())
        })
}

/// `Set-Cookie` value carrying a fresh session
pub fn build_session_cookie(name: &str, token: &str, max_age_secs: u64, secure: bool) -> String {
    let mut cookie = format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        name, token, max_age_secs
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// `Set-Cookie` value that expires the session cookie immediately
pub fn clear_session_cookie(name: &str, secure: bool) -> String {
    build_session_cookie(name, "", 0, secure)
}

/// Provider that knows no sessions; used when only dev mode can sign anyone in
pub struct NoSessionProvider;

#[async_trait]
impl SessionProvider for NoSessionProvider {
    async fn session_user(&self, _token: &str) -> Result<Option<SessionUser>, GateError> {
        Ok(None)
    }
}
