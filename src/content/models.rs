// src/content/models.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// ============================================================================
// Regions
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Region {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateRegionRequest {
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
}

// ============================================================================
// Tours
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Tour {
    pub id: String,
    pub region_id: Option<String>,
    pub title: String,
    pub slug: String,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub duration_days: i64,
    pub price_cents: i64,
    pub published: i64,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateTourRequest {
    pub region_id: Option<String>,
    pub title: String,
    pub slug: String,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub duration_days: i64,
    pub price_cents: i64,
    #[serde(default)]
    pub published: bool,
}

#[derive(Debug, Deserialize)]
pub struct UpdateTourRequest {
    pub region_id: Option<String>,
    pub title: Option<String>,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub duration_days: Option<i64>,
    pub price_cents: Option<i64>,
    pub published: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct TourListQuery {
    /// Region slug
    pub region: Option<String>,
}

// ============================================================================
// Bookings
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Booking {
    pub id: String,
    pub tour_id: Option<String>,
    pub kind: String,
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub travelers: i64,
    pub travel_date: Option<String>,
    pub message: Option<String>,
    pub status: String,
    pub created_at: String,
}

/// A booking for a listed tour, or a custom trip request when `tour_id` is absent
#[derive(Debug, Deserialize)]
pub struct CreateBookingRequest {
    pub tour_id: Option<String>,
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub travelers: i64,
    pub travel_date: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateBookingStatusRequest {
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct BookingListQuery {
    pub status: Option<String>,
}

pub const BOOKING_STATUSES: &[&str] = &["pending", "confirmed", "cancelled"];

// ============================================================================
// Testimonials
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Testimonial {
    pub id: String,
    pub author_name: String,
    pub country: Option<String>,
    pub content: String,
    pub rating: i64,
    pub approved: i64,
    pub created_at: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateTestimonialRequest {
    pub author_name: String,
    pub country: Option<String>,
    pub content: String,
    pub rating: i64,
}
