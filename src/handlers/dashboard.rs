// src/handlers/dashboard.rs

use axum::{Json, extract::State, response::IntoResponse};
use chrono::Utc;
use sqlx::PgPool;

use crate::{error::AppError, models::stats::DashboardData};

/// Returns aggregate statistics over the full post list.
///
/// Everything is recomputed from the current list on every call; there is no
/// caching layer, so the dashboard always reflects the latest fetch.
pub async fn get_dashboard(State(pool): State<PgPool>) -> Result<impl IntoResponse, AppError> {
    let posts = super::posts::fetch_all_posts(&pool).await?;

    Ok(Json(DashboardData::compute(&posts, Utc::now())))
}
