// src/content/handlers/tours.rs

use axum::{
    extract::{Extension, Json, Path, Query},
    http::StatusCode,
};
use sqlx::SqlitePool;
use tracing::info;

use crate::auth::{RequireAdmin, RequireEditor};
use crate::common::{generate_tour_id, ApiError, SharedState, Validator};
use crate::content::models::{CreateTourRequest, Tour, TourListQuery, UpdateTourRequest};
use crate::content::validators::TourValidator;

async fn ensure_region_exists(db: &SqlitePool, region_id: &str) -> Result<(), ApiError> {
    let exists: Option<String> = sqlx::query_scalar("SELECT id FROM regions WHERE id = ?")
        .bind(region_id)
        .fetch_optional(db)
        .await?;

    match exists {
        Some(_) => Ok(()),
        None => Err(ApiError::BadRequest(format!(
            "Region {} does not exist",
            region_id
        ))),
    }
}

/// GET /api/tours - Published tours, optionally narrowed to one region slug
pub async fn list_tours(
    Extension(state_lock): Extension<SharedState>,
    Query(query): Query<TourListQuery>,
) -> Result<Json<Vec<Tour>>, ApiError> {
    let state = state_lock.read().await.clone();

    let tours: Vec<Tour> = sqlx::query_as(
        r#"
        SELECT t.*
        FROM tours t
        LEFT JOIN regions r ON r.id = t.region_id
        WHERE t.published = 1 AND (? IS NULL OR r.slug = ?)
        ORDER BY t.title
        "#,
    )
    .bind(&query.region)
    .bind(&query.region)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(tours))
}

/// GET /api/tours/:slug - One published tour
pub async fn get_tour(
    Extension(state_lock): Extension<SharedState>,
    Path(slug): Path<String>,
) -> Result<Json<Tour>, ApiError> {
    let state = state_lock.read().await.clone();

    let tour: Option<Tour> =
        sqlx::query_as("SELECT * FROM tours WHERE slug = ? AND published = 1")
            .bind(&slug)
            .fetch_optional(&state.db)
            .await?;

    tour.map(Json)
        .ok_or_else(|| ApiError::NotFound("Tour not found".to_string()))
}

/// GET /api/admin/tours - Every tour including drafts (editor)
pub async fn admin_list_tours(
    Extension(state_lock): Extension<SharedState>,
    RequireEditor(_user): RequireEditor,
) -> Result<Json<Vec<Tour>>, ApiError> {
    let state = state_lock.read().await.clone();

    let tours: Vec<Tour> = sqlx::query_as("SELECT * FROM tours ORDER BY updated_at DESC")
        .fetch_all(&state.db)
        .await?;

    Ok(Json(tours))
}

/// POST /api/admin/tours - Create a tour (editor)
pub async fn create_tour(
    Extension(state_lock): Extension<SharedState>,
    RequireEditor(user): RequireEditor,
    Json(req): Json<CreateTourRequest>,
) -> Result<(StatusCode, Json<Tour>), ApiError> {
    TourValidator.validate(&req).into_result()?;
    let state = state_lock.read().await.clone();

    if let Some(region_id) = &req.region_id {
        ensure_region_exists(&state.db, region_id).await?;
    }

    let now = chrono::Utc::now().to_rfc3339();
    let tour = Tour {
        id: generate_tour_id(),
        region_id: req.region_id,
        title: req.title.trim().to_string(),
        slug: req.slug,
        summary: req.summary,
        description: req.description,
        duration_days: req.duration_days,
        price_cents: req.price_cents,
        published: i64::from(req.published),
        created_at: now.clone(),
        updated_at: now,
    };

    sqlx::query(
        r#"
        INSERT INTO tours (id, region_id, title, slug, summary, description,
                           duration_days, price_cents, published, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&tour.id)
    .bind(&tour.region_id)
    .bind(&tour.title)
    .bind(&tour.slug)
    .bind(&tour.summary)
    .bind(&tour.description)
    .bind(tour.duration_days)
    .bind(tour.price_cents)
    .bind(tour.published)
    .bind(&tour.created_at)
    .bind(&tour.updated_at)
    .execute(&state.db)
    .await?;

    info!(tour_id = %tour.id, slug = %tour.slug, user_id = %user.id, "Tour created");

    Ok((StatusCode::CREATED, Json(tour)))
}

/// PUT /api/admin/tours/:id - Update a tour (editor)
pub async fn update_tour(
    Extension(state_lock): Extension<SharedState>,
    RequireEditor(user): RequireEditor,
    Path(id): Path<String>,
    Json(req): Json<UpdateTourRequest>,
) -> Result<Json<Tour>, ApiError> {
    TourValidator.validate(&req).into_result()?;
    let state = state_lock.read().await.clone();

    let existing: Option<Tour> = sqlx::query_as("SELECT * FROM tours WHERE id = ?")
        .bind(&id)
        .fetch_optional(&state.db)
        .await?;
    let mut tour = existing.ok_or_else(|| ApiError::NotFound("Tour not found".to_string()))?;

    if let Some(region_id) = req.region_id {
        ensure_region_exists(&state.db, &region_id).await?;
        tour.region_id = Some(region_id);
    }
    if let Some(title) = req.title {
        tour.title = title.trim().to_string();
    }
    if req.summary.is_some() {
        tour.summary = req.summary;
    }
    if req.description.is_some() {
        tour.description = req.description;
    }
    if let Some(days) = req.duration_days {
        tour.duration_days = days;
    }
    if let Some(price) = req.price_cents {
        tour.price_cents = price;
    }
    if let Some(published) = req.published {
        tour.published = i64::from(published);
    }
    tour.updated_at = chrono::Utc::now().to_rfc3339();

    sqlx::query(
        r#"
        UPDATE tours
        SET region_id = ?, title = ?, summary = ?, description = ?,
            duration_days = ?, price_cents = ?, published = ?, updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(&tour.region_id)
    .bind(&tour.title)
    .bind(&tour.summary)
    .bind(&tour.description)
    .bind(tour.duration_days)
    .bind(tour.price_cents)
    .bind(tour.published)
    .bind(&tour.updated_at)
    .bind(&tour.id)
    .execute(&state.db)
    .await?;

    info!(tour_id = %tour.id, user_id = %user.id, "Tour updated");

    Ok(Json(tour))
}

/// DELETE /api/admin/tours/:id - Delete a tour (admin)
pub async fn delete_tour(
    Extension(state_lock): Extension<SharedState>,
    RequireAdmin(user): RequireAdmin,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let state = state_lock.read().await.clone();

    let result = sqlx::query("DELETE FROM tours WHERE id = ?")
        .bind(&id)
        .execute(&state.db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound("Tour not found".to_string()));
    }

    info!(tour_id = %id, user_id = %user.id, "Tour deleted");

    Ok(StatusCode::NO_CONTENT)
}
