// src/content/handlers/regions.rs

use axum::{
    extract::{Extension, Json, Path},
    http::StatusCode,
};
use tracing::info;

use crate::auth::{RequireAdmin, RequireEditor};
use crate::common::{generate_region_id, ApiError, SharedState, Validator};
use crate::content::models::{CreateRegionRequest, Region};
use crate::content::validators::RegionValidator;

/// GET /api/regions - All regions (public)
pub async fn list_regions(
    Extension(state_lock): Extension<SharedState>,
) -> Result<Json<Vec<Region>>, ApiError> {
    let state = state_lock.read().await.clone();

    let regions: Vec<Region> = sqlx::query_as("SELECT * FROM regions ORDER BY name")
        .fetch_all(&state.db)
        .await?;

    Ok(Json(regions))
}

/// POST /api/admin/regions - Create a region (editor)
pub async fn create_region(
    Extension(state_lock): Extension<SharedState>,
    RequireEditor(user): RequireEditor,
    Json(req): Json<CreateRegionRequest>,
) -> Result<(StatusCode, Json<Region>), ApiError> {
    RegionValidator.validate(&req).into_result()?;
    let state = state_lock.read().await.clone();

    let region = Region {
        id: generate_region_id(),
        name: req.name.trim().to_string(),
        slug: req.slug,
        description: req.description,
        created_at: chrono::Utc::now().to_rfc3339(),
    };

    sqlx::query(
        "INSERT INTO regions (id, name, slug, description, created_at) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(&region.id)
    .bind(&region.name)
    .bind(&region.slug)
    .bind(&region.description)
    .bind(&region.created_at)
    .execute(&state.db)
    .await?;

    info!(region_id = %region.id, user_id = %user.id, "Region created");

    Ok((StatusCode::CREATED, Json(region)))
}

/// DELETE /api/admin/regions/:id - Delete a region (admin); its tours stay, unassigned
pub async fn delete_region(
    Extension(state_lock): Extension<SharedState>,
    RequireAdmin(user): RequireAdmin,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let state = state_lock.read().await.clone();

    // tours.region_id is ON DELETE SET NULL
    let result = sqlx::query("DELETE FROM regions WHERE id = ?")
        .bind(&id)
        .execute(&state.db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound("Region not found".to_string()));
    }

    info!(region_id = %id, user_id = %user.id, "Region deleted");

    Ok(StatusCode::NO_CONTENT)
}
