//! Authentication data models

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Identity resolved from a session by the auth provider
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SessionUser {
    pub id: String,
    pub email: String,
}

/// Closed set of authorization tiers.
///
/// Role names coming out of the role store are mapped onto this enum; any
/// name other than `admin` or `editor` becomes [`Role::Authenticated`].
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Anonymous,
    Authenticated,
    Editor,
    Admin,
}

impl Role {
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "admin" => Role::Admin,
            "editor" => Role::Editor,
            "anon" | "anonymous" => Role::Anonymous,
            _ => Role::Authenticated,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Anonymous => "anonymous",
            Role::Authenticated => "authenticated",
            Role::Editor => "editor",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Roles admitted to the admin area
pub const ADMIN_AREA_ROLES: &[Role] = &[Role::Admin, Role::Editor];

/// The roles held by one caller
#[derive(Serialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(transparent)]
pub struct RoleSet(BTreeSet<Role>);

impl RoleSet {
    /// Role set of a signed-in user holding the named roles.
    ///
    /// Every signed-in user holds `Authenticated` in addition to whatever the
    /// names map to, so an empty name list still yields a non-empty set.
    pub fn for_user<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut roles: BTreeSet<Role> = names
            .into_iter()
            .map(|name| Role::from_name(name.as_ref()))
            .filter(|role| *role != Role::Anonymous)
            .collect();
        roles.insert(Role::Authenticated);
        Self(roles)
    }

    pub fn contains(&self, role: Role) -> bool {
        self.0.contains(&role)
    }

    /// True when any held role is in `allowed`
    pub fn intersects(&self, allowed: &[Role]) -> bool {
        allowed.iter().any(|role| self.0.contains(role))
    }
}

/// A signed-in caller with resolved roles
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: String,
    pub email: String,
    pub roles: RoleSet,
}

/// Who is making the request, as far as the gate could tell
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identity {
    Anonymous,
    Authenticated(CurrentUser),
}

impl Identity {
    pub fn user(&self) -> Option<&CurrentUser> {
        match self {
            Identity::Anonymous => None,
            Identity::Authenticated(user) => Some(user),
        }
    }
}

/// Access token claims issued by the hosted auth provider
#[derive(Serialize, Deserialize, Debug)]
pub struct Claims {
    pub sub: String,
    #[serde(default)]
    pub email: Option<String>,
    pub exp: usize,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize, Debug)]
pub struct LoginResponse {
    pub user: SessionUser,
    pub redirect_to: String,
}

#[derive(Serialize, Debug)]
pub struct MeResponse {
    pub id: String,
    pub email: String,
    pub roles: RoleSet,
    pub can_access_admin: bool,
}

impl From<CurrentUser> for MeResponse {
    fn from(user: CurrentUser) -> Self {
        let can_access_admin = user.roles.intersects(ADMIN_AREA_ROLES);
        Self {
            id: user.id,
            email: user.email,
            roles: user.roles,
            can_access_admin,
        }
    }
}
