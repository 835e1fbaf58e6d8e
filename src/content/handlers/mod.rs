// src/content/handlers/mod.rs

pub mod bookings;
pub mod regions;
pub mod testimonials;
pub mod tours;
