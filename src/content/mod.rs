// src/content/mod.rs
//! Tours, regions, bookings and testimonials

pub mod handlers;
pub mod models;
pub mod routes;
pub mod validators;


pub use routes::content_routes;
