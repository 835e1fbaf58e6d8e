// src/common/config.rs
//! Environment configuration read once at startup

use std::env;

use super::helpers::split_csv;

pub const DEFAULT_SESSION_COOKIE: &str = "sb-access-token";

const DEFAULT_CORS_ORIGINS: &str = "http://localhost:3000,http://localhost:5173";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub port: u16,
    /// Base URL of the hosted auth provider, e.g. `https://xyz.example.co`
    pub auth_url: Option<String>,
    /// Public `apikey` sent with every auth provider request
    pub auth_anon_key: String,
    /// When set, access tokens are verified locally instead of over HTTP
    pub auth_jwt_secret: Option<String>,
    pub session_cookie: String,
    pub cookie_secure: bool,
    pub cors_origins: Vec<String>,
    /// User ids granted the admin role at startup
    pub admin_user_ids: Vec<String>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://tours.db".to_string());

        let port = env::var("PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(8080);

        let auth_url = non_empty_var("AUTH_URL").map(|url| url.trim_end_matches('/').to_string());
        let auth_anon_key = env::var("AUTH_ANON_KEY").unwrap_or_default();
        let auth_jwt_secret = non_empty_var("AUTH_JWT_SECRET");

        let session_cookie =
            non_empty_var("SESSION_COOKIE").unwrap_or_else(|| DEFAULT_SESSION_COOKIE.to_string());
        let cookie_secure = env::var("SESSION_COOKIE_SECURE")
            .map(|v| v.to_lowercase() != "false")
            .unwrap_or(true);

        let cors_origins = split_csv(
            &env::var("CORS_ORIGINS").unwrap_or_else(|_| DEFAULT_CORS_ORIGINS.to_string()),
        );
        let admin_user_ids = split_csv(&env::var("ADMIN_USER_IDS").unwrap_or_default());

        Self {
            database_url,
            port,
            auth_url,
            auth_anon_key,
            auth_jwt_secret,
            session_cookie,
            cookie_secure,
            cors_origins,
            admin_user_ids,
        }
    }

    /// Fails when no way of verifying sessions is configured
    pub fn ensure_session_verification(&self, dev_mode: bool) -> anyhow::Result<()> {
        if dev_mode || self.auth_jwt_secret.is_some() || self.auth_url.is_some() {
            Ok(())
        } else {
            anyhow::bail!("either AUTH_JWT_SECRET or AUTH_URL must be set (or run with DEV_MODE=true)")
        }
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}
