// src/admin/mod.rs
//! Admin pages; everything here sits behind the `/admin` gate

pub mod handlers;
pub mod models;
pub mod routes;

pub use routes::admin_routes;
