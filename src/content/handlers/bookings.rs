// src/content/handlers/bookings.rs

use axum::{
    extract::{Extension, Json, Path, Query},
    http::StatusCode,
};
use tracing::info;

use crate::auth::{RequireAdmin, RequireEditor};
use crate::common::{generate_booking_id, safe_email_log, ApiError, SharedState, Validator};
use crate::content::models::{
    Booking, BookingListQuery, CreateBookingRequest, UpdateBookingStatusRequest,
};
use crate::content::validators::{validate_booking_status, BookingValidator};

/// POST /api/bookings - Book a tour or request a custom trip (public)
pub async fn create_booking(
    Extension(state_lock): Extension<SharedState>,
    Json(req): Json<CreateBookingRequest>,
) -> Result<(StatusCode, Json<Booking>), ApiError> {
    BookingValidator.validate(&req).into_result()?;
    let state = state_lock.read().await.clone();

    if let Some(tour_id) = &req.tour_id {
        let published: Option<String> =
            sqlx::query_scalar("SELECT id FROM tours WHERE id = ? AND published = 1")
                .bind(tour_id)
                .fetch_optional(&state.db)
                .await?;
        if published.is_none() {
            return Err(ApiError::BadRequest("Tour is not available".to_string()));
        }
    }

    let booking = Booking {
        id: generate_booking_id(),
        kind: if req.tour_id.is_some() { "tour" } else { "custom" }.to_string(),
        tour_id: req.tour_id,
        full_name: req.full_name.trim().to_string(),
        email: req.email.trim().to_lowercase(),
        phone: req.phone,
        travelers: req.travelers,
        travel_date: req.travel_date,
        message: req.message,
        status: "pending".to_string(),
        created_at: chrono::Utc::now().to_rfc3339(),
    };

    sqlx::query(
        r#"
        INSERT INTO bookings (id, tour_id, kind, full_name, email, phone, travelers,
                              travel_date, message, status, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&booking.id)
    .bind(&booking.tour_id)
    .bind(&booking.kind)
    .bind(&booking.full_name)
    .bind(&booking.email)
    .bind(&booking.phone)
    .bind(booking.travelers)
    .bind(&booking.travel_date)
    .bind(&booking.message)
    .bind(&booking.status)
    .bind(&booking.created_at)
    .execute(&state.db)
    .await?;

    info!(
        booking_id = %booking.id,
        kind = %booking.kind,
        email = %safe_email_log(&booking.email),
        "Booking received"
    );

    Ok((StatusCode::CREATED, Json(booking)))
}

/// GET /api/admin/bookings - Bookings, newest first, optionally by status (editor)
pub async fn list_bookings(
    Extension(state_lock): Extension<SharedState>,
    RequireEditor(_user): RequireEditor,
    Query(query): Query<BookingListQuery>,
) -> Result<Json<Vec<Booking>>, ApiError> {
    if let Some(status) = &query.status {
        validate_booking_status(status).into_result()?;
    }
    let state = state_lock.read().await.clone();

    let bookings: Vec<Booking> = sqlx::query_as(
        "SELECT * FROM bookings WHERE (? IS NULL OR status = ?) ORDER BY created_at DESC",
    )
    .bind(&query.status)
    .bind(&query.status)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(bookings))
}

/// PATCH /api/admin/bookings/:id/status - Confirm or cancel a booking (admin)
pub async fn update_booking_status(
    Extension(state_lock): Extension<SharedState>,
    RequireAdmin(user): RequireAdmin,
    Path(id): Path<String>,
    Json(req): Json<UpdateBookingStatusRequest>,
) -> Result<Json<Booking>, ApiError> {
    validate_booking_status(&req.status).into_result()?;
    let state = state_lock.read().await.clone();

    let result = sqlx::query("UPDATE bookings SET status = ? WHERE id = ?")
        .bind(&req.status)
        .bind(&id)
        .execute(&state.db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound("Booking not found".to_string()));
    }

    let booking: Booking = sqlx::query_as("SELECT * FROM bookings WHERE id = ?")
        .bind(&id)
        .fetch_one(&state.db)
        .await?;

    info!(booking_id = %id, status = %booking.status, user_id = %user.id, "Booking status changed");

    Ok(Json(booking))
}
