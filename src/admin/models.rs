// src/admin/models.rs

use serde::Serialize;
use std::collections::HashMap;

use crate::auth::models::CurrentUser;

#[derive(Debug, Serialize)]
pub struct DashboardMetrics {
    pub total_tours: i64,
    pub published_tours: i64,
    pub total_regions: i64,
    pub pending_bookings: i64,
    pub pending_testimonials: i64,
    pub bookings_by_status: HashMap<String, i64>,
    pub last_updated: String,
    /// Who is looking, so the dashboard can hide admin-only actions from editors
    pub viewer: CurrentUser,
}
