//! Session & role gate
//!
//! Decides whether a request may reach an admin page, the login page, or a
//! role-restricted mutation. Resolution (session → user → roles) is async and
//! never fails outward: provider trouble reads as anonymous and role lookup
//! trouble reads as "no role", so every failure lands on the deny side.
//! The decision itself is the pure [`decide`] / [`check`] pair.

use futures::FutureExt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::{debug, error, warn};

use super::models::{CurrentUser, Identity, Role, RoleSet, ADMIN_AREA_ROLES};
use super::roles::RoleStore;
use super::session::SessionProvider;
use crate::common::dev_mode::DevModeConfig;
use crate::common::{safe_email_log, safe_token_log};

pub const ADMIN_PREFIX: &str = "/admin";
pub const LOGIN_PATH: &str = "/login";
pub const HOME_PATH: &str = "/";
pub const DASHBOARD_PATH: &str = "/admin/dashboard";

/// Which gating rule a path falls under
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Admin,
    Login,
    Public,
}

impl Route {
    pub fn classify(path: &str) -> Self {
        if path == ADMIN_PREFIX
            || path
                .strip_prefix(ADMIN_PREFIX)
                .map_or(false, |rest| rest.starts_with('/'))
        {
            Route::Admin
        } else if path.trim_end_matches('/') == LOGIN_PATH {
            Route::Login
        } else {
            Route::Public
        }
    }

    pub fn is_gated(&self) -> bool {
        !matches!(self, Route::Public)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    RedirectToLogin,
    /// Soft deny: signed in, but not allowed here
    RedirectToHome,
    RedirectToDashboard,
}

impl Decision {
    pub fn redirect_target(&self) -> Option<&'static str> {
        match self {
            Decision::Allow => None,
            Decision::RedirectToLogin => Some(LOGIN_PATH),
            Decision::RedirectToHome => Some(HOME_PATH),
            Decision::RedirectToDashboard => Some(DASHBOARD_PATH),
        }
    }
}

/// Route decision for an already-resolved identity
pub fn decide(route: Route, identity: &Identity) -> Decision {
    match (route, identity) {
        (Route::Admin, Identity::Anonymous) => Decision::RedirectToLogin,
        (Route::Admin, Identity::Authenticated(user)) => {
            if user.roles.intersects(ADMIN_AREA_ROLES) {
                Decision::Allow
            } else {
                Decision::RedirectToHome
            }
        }
        (Route::Login, Identity::Authenticated(_)) => Decision::RedirectToDashboard,
        (Route::Login, Identity::Anonymous) | (Route::Public, _) => Decision::Allow,
    }
}

/// What a server-side mutation demands of its caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    /// Any signed-in user
    Auth,
    /// Editor or admin
    Editor,
    Admin,
}

impl Requirement {
    fn allowed_roles(&self) -> &'static [Role] {
        match self {
            Requirement::Auth => &[Role::Authenticated, Role::Editor, Role::Admin],
            Requirement::Editor => ADMIN_AREA_ROLES,
            Requirement::Admin => &[Role::Admin],
        }
    }
}

/// Mutation decision: allow, or abort towards login / home
pub fn check(requirement: Requirement, identity: &Identity) -> Decision {
    match identity {
        Identity::Anonymous => Decision::RedirectToLogin,
        Identity::Authenticated(user) if user.roles.intersects(requirement.allowed_roles()) => {
            Decision::Allow
        }
        Identity::Authenticated(_) => Decision::RedirectToHome,
    }
}

/// Outcome of gating one request
#[derive(Debug, Clone)]
pub struct Authorization {
    pub decision: Decision,
    /// Set when the route needed an identity; public routes skip resolution
    pub identity: Option<Identity>,
}

pub struct Gate {
    sessions: Arc<dyn SessionProvider>,
    roles: Arc<dyn RoleStore>,
    dev_mode: DevModeConfig,
}

impl Gate {
    pub fn new(
        sessions: Arc<dyn SessionProvider>,
        roles: Arc<dyn RoleStore>,
        dev_mode: DevModeConfig,
    ) -> Self {
        Self {
            sessions,
            roles,
            dev_mode,
        }
    }

    /// Resolve the caller behind `token`. Each call hits the provider and
    /// the role store afresh.
    pub async fn resolve(&self, token: Option<&str>) -> Identity {
        if self.dev_mode.is_enabled() {
            let user = self.dev_mode.create_dev_user();
            return Identity::Authenticated(CurrentUser {
                id: user.id,
                email: user.email,
                roles: RoleSet::for_user([self.dev_mode.user_role.as_str()]),
            });
        }

        let Some(token) = token else {
            return Identity::Anonymous;
        };

        let user = match self.sessions.session_user(token).await {
            Ok(Some(user)) => user,
            Ok(None) => {
                debug!(token = %safe_token_log(token), "No valid session for token");
                return Identity::Anonymous;
            }
            Err(e) => {
                warn!(error = %e, "Session lookup failed, treating caller as anonymous");
                return Identity::Anonymous;
            }
        };

        let roles = match self.roles.roles_for_user(&user.id).await {
            Ok(names) => RoleSet::for_user(names),
            Err(e) => {
                warn!(
                    error = %e,
                    user_id = %user.id,
                    "Role lookup failed, treating user as holding no role"
                );
                RoleSet::for_user(std::iter::empty::<&str>())
            }
        };

        debug!(
            user_id = %user.id,
            email = %safe_email_log(&user.email),
            roles = ?roles,
            "Session resolved"
        );

        Identity::Authenticated(CurrentUser {
            id: user.id,
            email: user.email,
            roles,
        })
    }

    /// Gate a request for `path`
    pub async fn authorize(&self, path: &str, token: Option<&str>) -> Authorization {
        let route = Route::classify(path);
        if !route.is_gated() {
            return Authorization {
                decision: Decision::Allow,
                identity: None,
            };
        }

        let identity = self.resolve(token).await;
        let decision = decide(route, &identity);
        debug!(path = %path, route = ?route, decision = ?decision, "Gate decision");

        Authorization {
            decision,
            identity: Some(identity),
        }
    }
}

/// Runs a gate future, turning a panic inside it into `None` so the caller
/// can deny instead of tearing down the connection
pub async fn catch_gate_panic<F, T>(fut: F) -> Option<T>
where
    F: Future<Output = T>,
{
    match AssertUnwindSafe(fut).catch_unwind().await {
        Ok(value) => Some(value),
        Err(_) => {
            error!("Session gate panicked, denying request");
            None
        }
    }
}
