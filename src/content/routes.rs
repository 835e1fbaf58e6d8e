// src/content/routes.rs

use axum::{
    routing::{delete, get, patch, post, put},
    Router,
};

use super::handlers::{bookings, regions, testimonials, tours};

pub fn content_routes() -> Router {
    Router::new()
        // Public endpoints
        .route("/api/regions", get(regions::list_regions))
        .route("/api/tours", get(tours::list_tours))
        .route("/api/tours/:slug", get(tours::get_tour))
        .route("/api/bookings", post(bookings::create_booking))
        .route(
            "/api/testimonials",
            get(testimonials::get_public_testimonials).post(testimonials::create_testimonial),
        )
        // Region management
        .route("/api/admin/regions", post(regions::create_region))
        .route("/api/admin/regions/:id", delete(regions::delete_region))
        // Tour management
        .route(
            "/api/admin/tours",
            get(tours::admin_list_tours).post(tours::create_tour),
        )
        .route(
            "/api/admin/tours/:id",
            put(tours::update_tour).delete(tours::delete_tour),
        )
        // Booking management
        .route("/api/admin/bookings", get(bookings::list_bookings))
        .route(
            "/api/admin/bookings/:id/status",
            patch(bookings::update_booking_status),
        )
        // Testimonial moderation
        .route(
            "/api/admin/testimonials",
            get(testimonials::admin_list_testimonials),
        )
        .route(
            "/api/admin/testimonials/:id/approve",
            patch(testimonials::approve_testimonial),
        )
        .route(
            "/api/admin/testimonials/:id",
            delete(testimonials::delete_testimonial),
        )
}
