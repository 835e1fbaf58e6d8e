// src/content/handlers/testimonials.rs

use axum::{
    extract::{Extension, Json, Path},
    http::StatusCode,
};
use tracing::info;

use crate::auth::{RequireAdmin, RequireEditor};
use crate::common::{generate_testimonial_id, ApiError, SharedState, Validator};
use crate::content::models::{CreateTestimonialRequest, Testimonial};
use crate::content::validators::TestimonialValidator;

/// GET /api/testimonials - Approved testimonials (public)
pub async fn get_public_testimonials(
    Extension(state_lock): Extension<SharedState>,
) -> Result<Json<Vec<Testimonial>>, ApiError> {
    let state = state_lock.read().await.clone();

    let testimonials: Vec<Testimonial> = sqlx::query_as(
        "SELECT * FROM testimonials WHERE approved = 1 ORDER BY created_at DESC LIMIT 20",
    )
    .fetch_all(&state.db)
    .await?;

    Ok(Json(testimonials))
}

/// POST /api/testimonials - Submit a testimonial; hidden until approved (public)
pub async fn create_testimonial(
    Extension(state_lock): Extension<SharedState>,
    Json(req): Json<CreateTestimonialRequest>,
) -> Result<(StatusCode, Json<Testimonial>), ApiError> {
    TestimonialValidator.validate(&req).into_result()?;
    let state = state_lock.read().await.clone();

    let testimonial = Testimonial {
        id: generate_testimonial_id(),
        author_name: req.author_name.trim().to_string(),
        country: req.country,
        content: req.content.trim().to_string(),
        rating: req.rating,
        approved: 0,
        created_at: chrono::Utc::now().to_rfc3339(),
    };

    sqlx::query(
        r#"
        INSERT INTO testimonials (id, author_name, country, content, rating, approved, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&testimonial.id)
    .bind(&testimonial.author_name)
    .bind(&testimonial.country)
    .bind(&testimonial.content)
    .bind(testimonial.rating)
    .bind(testimonial.approved)
    .bind(&testimonial.created_at)
    .execute(&state.db)
    .await?;

    info!(testimonial_id = %testimonial.id, "Testimonial submitted");

    Ok((StatusCode::CREATED, Json(testimonial)))
}

/// GET /api/admin/testimonials - Every testimonial, pending first (editor)
pub async fn admin_list_testimonials(
    Extension(state_lock): Extension<SharedState>,
    RequireEditor(_user): RequireEditor,
) -> Result<Json<Vec<Testimonial>>, ApiError> {
    let state = state_lock.read().await.clone();

    let testimonials: Vec<Testimonial> =
        sqlx::query_as("SELECT * FROM testimonials ORDER BY approved ASC, created_at DESC")
            .fetch_all(&state.db)
            .await?;

    Ok(Json(testimonials))
}

/// PATCH /api/admin/testimonials/:id/approve - Publish a testimonial (editor)
pub async fn approve_testimonial(
    Extension(state_lock): Extension<SharedState>,
    RequireEditor(user): RequireEditor,
    Path(id): Path<String>,
) -> Result<Json<Testimonial>, ApiError> {
    let state = state_lock.read().await.clone();

    let result = sqlx::query("UPDATE testimonials SET approved = 1 WHERE id = ?")
        .bind(&id)
        .execute(&state.db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound("Testimonial not found".to_string()));
    }

    let testimonial: Testimonial = sqlx::query_as("SELECT * FROM testimonials WHERE id = ?")
        .bind(&id)
        .fetch_one(&state.db)
        .await?;

    info!(testimonial_id = %id, user_id = %user.id, "Testimonial approved");

    Ok(Json(testimonial))
}

/// DELETE /api/admin/testimonials/:id - Remove a testimonial (admin)
pub async fn delete_testimonial(
    Extension(state_lock): Extension<SharedState>,
    RequireAdmin(user): RequireAdmin,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let state = state_lock.read().await.clone();

    let result = sqlx::query("DELETE FROM testimonials WHERE id = ?")
        .bind(&id)
        .execute(&state.db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound("Testimonial not found".to_string()));
    }

    info!(testimonial_id = %id, user_id = %user.id, "Testimonial deleted");

    Ok(StatusCode::NO_CONTENT)
}
