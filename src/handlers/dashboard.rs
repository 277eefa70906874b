//! # Dashboard Handlers
//!
//! Read-only views for the user dashboard. The user is named by the
//! `user_id` query parameter.

use std::sync::Arc;

use axum::extract::State;
use serde::Deserialize;
use time::OffsetDateTime;
use tracing::instrument;
use uuid::Uuid;

use crate::error::AppResult;
use crate::extract::{Json, Query};
use crate::handlers::user::find_user;
use crate::models::AppState;
use crate::services::dashboard::{DashboardService, DashboardStats, TodayQuest};

#[derive(Debug, Deserialize)]
pub struct UserQuery {
    pub user_id: Uuid,
}

/// GET /api/user-quests/today?user_id=
///
/// Profession quests visible to the user and catalog quests, with today's status.
#[instrument(skip_all, fields(user_id = %query.user_id))]
pub async fn get_today_quests(
    State(state): State<Arc<AppState>>,
    Query(query): Query<UserQuery>,
) -> AppResult<Json<Vec<TodayQuest>>> {
    let store = state.store.as_ref();
    let user = find_user(store, query.user_id).await?;
    let today = OffsetDateTime::now_utc().date();

    Ok(Json(
        DashboardService::today_quests(store, &user, state.config.free_quest_limit, today).await?,
    ))
}

/// GET /api/dashboard/stats?user_id=
#[instrument(skip_all, fields(user_id = %query.user_id))]
pub async fn get_dashboard_stats(
    State(state): State<Arc<AppState>>,
    Query(query): Query<UserQuery>,
) -> AppResult<Json<DashboardStats>> {
    let store = state.store.as_ref();
    let user = find_user(store, query.user_id).await?;
    let today = OffsetDateTime::now_utc().date();

    Ok(Json(
        DashboardService::stats(store, &user, state.config.free_quest_limit, today).await?,
    ))
}
