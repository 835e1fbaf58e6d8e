//! # Auth Module
//!
//! Session resolution and the role gate:
//! - session cookie → user via the hosted auth provider (or local JWT check)
//! - user → roles via the `user_roles` join
//! - `session_gate` middleware for admin pages and the login page
//! - `RequireAuth` / `RequireEditor` / `RequireAdmin` extractors for mutations

pub mod errors;
pub mod extractors;
pub mod gate;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod roles;
pub mod routes;
pub mod session;

#[cfg(test)]
mod tests;

pub use extractors::{ApiSession, RequireAdmin, RequireAuth, RequireEditor};
pub use gate::Gate;
pub use middleware::session_gate;
pub use routes::auth_routes;
