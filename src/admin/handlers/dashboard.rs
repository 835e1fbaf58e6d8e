// src/admin/handlers/dashboard.rs

use axum::{extract::Extension, Json};
use sqlx::SqlitePool;
use std::collections::HashMap;
use tracing::{error, info};

use crate::admin::models::DashboardMetrics;
use crate::auth::RequireEditor;
use crate::common::{ApiError, SharedState};

async fn count(db: &SqlitePool, sql: &str, label: &str) -> Result<i64, ApiError> {
    sqlx::query_scalar::<_, i64>(sql)
        .fetch_one(db)
        .await
        .map_err(|e| {
            error!(
                error = %e,
                metric = label,
                "Database error fetching dashboard metric"
            );
            ApiError::DatabaseError(e)
        })
}

/// GET /admin/dashboard - Content counts for the admin landing page
pub async fn get_dashboard_metrics(
    Extension(state_lock): Extension<SharedState>,
    RequireEditor(user): RequireEditor,
) -> Result<Json<DashboardMetrics>, ApiError> {
    let state = state_lock.read().await.clone();

    info!(user_id = %user.id, "Fetching dashboard metrics");

    let total_tours = count(&state.db, "SELECT COUNT(*) FROM tours", "total_tours").await?;
    let published_tours = count(
        &state.db,
        "SELECT COUNT(*) FROM tours WHERE published = 1",
        "published_tours",
    )
    .await?;
    let total_regions = count(&state.db, "SELECT COUNT(*) FROM regions", "total_regions").await?;
    let pending_testimonials = count(
        &state.db,
        "SELECT COUNT(*) FROM testimonials WHERE approved = 0",
        "pending_testimonials",
    )
    .await?;

    let rows: Vec<(String, i64)> =
        sqlx::query_as("SELECT status, COUNT(*) FROM bookings GROUP BY status")
            .fetch_all(&state.db)
            .await?;
    let bookings_by_status: HashMap<String, i64> = rows.into_iter().collect();
    let pending_bookings = bookings_by_status.get("pending").copied().unwrap_or(0);

    Ok(Json(DashboardMetrics {
        total_tours,
        published_tours,
        total_regions,
        pending_bookings,
        pending_testimonials,
        bookings_by_status,
        last_updated: chrono::Utc::now().to_rfc3339(),
        viewer: user,
    }))
}
