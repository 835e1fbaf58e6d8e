// src/common/dev_mode.rs
//! Development mode configuration and utilities
//! Substitutes a fixed user for every session lookup so the admin area can be
//! exercised without the hosted auth provider

use std::env;

use crate::auth::models::{Role, SessionUser};

/// Fixed id so role assignments made for the dev user survive restarts
pub const DEV_USER_ID: &str = "00000000-0000-0000-0000-000000000001";

#[derive(Debug, Clone)]
pub struct DevModeConfig {
    pub enabled: bool,
    pub user_email: String,
    pub user_role: Role,
}

impl DevModeConfig {
    pub fn from_env() -> Self {
        let enabled = env::var("DEV_MODE")
            .unwrap_or_else(|_| "false".to_string())
            .to_lowercase()
            == "true";

        let user_email =
            env::var("DEV_USER_EMAIL").unwrap_or_else(|_| "dev@localhost.test".to_string());

        let user_role = env::var("DEV_USER_ROLE")
            .map(|name| Role::from_name(&name))
            .unwrap_or(Role::Admin);

        Self {
            enabled,
            user_email,
            user_role,
        }
    }

    #[cfg(test)]
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            user_email: String::new(),
            user_role: Role::Authenticated,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn create_dev_user(&self) -> SessionUser {
        SessionUser {
            id: DEV_USER_ID.to_string(),
            email: self.user_email.clone(),
        }
    }
}

/// Print dev mode status on startup
pub fn print_dev_mode_status(config: &DevModeConfig) {
    if config.enabled {
        println!("⚠️  🔓 DEV MODE ENABLED 🔓 ⚠️");
        println!("   Session lookup bypassed, every request is the dev user");
        println!("   Dev User: {} ({})", config.user_email, config.user_role);
        println!("   ⚠️  DO NOT USE IN PRODUCTION ⚠️");
        println!();
    } else {
        println!("🔒 Production mode - sessions verified against the auth provider");
    }
}

/// CLI argument parsing for dev mode
pub fn parse_dev_mode_args() -> Option<bool> {
    for arg in env::args() {
        match arg.as_str() {
            "--dev" | "--dev-mode" => return Some(true),
            "--no-dev" | "--prod" | "--production" => return Some(false),
            _ => {}
        }
    }

    None
}

/// Override dev mode from CLI args
pub fn apply_cli_override(mut config: DevModeConfig) -> DevModeConfig {
    if let Some(cli_dev_mode) = parse_dev_mode_args() {
        println!("🔧 CLI override: DEV_MODE = {}", cli_dev_mode);
        config.enabled = cli_dev_mode;
    }

    config
}
