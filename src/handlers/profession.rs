//! # Profession Handlers
//!
//! Public read access to the profession catalog, per-profession progression
//! status and quest assignment.

use std::sync::Arc;

use axum::extract::State;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::extract::{Json, Path, Query};
use crate::models::{
    AppState, FullProgressionStatus, Profession, ProgressionStatus, ProgressionTier,
    RecommendedQuest,
};
use crate::services::{
    assignment::AssignmentService, catalog::CatalogService, progression::ProgressionService,
};

#[derive(Debug, Deserialize)]
pub struct ProgressionQuery {
    pub user_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct AssignQuery {
    /// Defaults to true.
    pub idempotent: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AssignResponse {
    pub assigned: usize,
}

/// GET /api/professions
#[instrument(skip_all)]
pub async fn list_professions(
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<Vec<Profession>>> {
    let professions = CatalogService::list_active(state.store.as_ref()).await?;
    debug!(count = professions.len(), "Listed active professions");
    Ok(Json(professions))
}

/// GET /api/professions/{slug}
#[instrument(skip_all, fields(slug = %slug))]
pub async fn get_profession(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> AppResult<Json<Profession>> {
    Ok(Json(
        CatalogService::get_active(state.store.as_ref(), &slug).await?,
    ))
}

/// GET /api/professions/{slug}/tiers
#[instrument(skip_all, fields(slug = %slug))]
pub async fn get_tiers(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> AppResult<Json<Vec<ProgressionTier>>> {
    let store = state.store.as_ref();
    CatalogService::get_active(store, &slug).await?;
    Ok(Json(CatalogService::tiers_for(store, &slug).await?))
}

/// GET /api/professions/{slug}/progression?user_id=
#[instrument(skip_all, fields(slug = %slug, user_id = ?query.user_id))]
pub async fn get_progression(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
    Query(query): Query<ProgressionQuery>,
) -> AppResult<Json<ProgressionStatus>> {
    let store = state.store.as_ref();
    let profession = CatalogService::get_active(store, &slug).await?;
    Ok(Json(
        ProgressionService::status(store, &profession, query.user_id).await?,
    ))
}

/// GET /api/professions/{slug}/progression/full?user_id=
#[instrument(skip_all, fields(slug = %slug, user_id = ?query.user_id))]
pub async fn get_full_progression(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
    Query(query): Query<ProgressionQuery>,
) -> AppResult<Json<FullProgressionStatus>> {
    let store = state.store.as_ref();
    let profession = CatalogService::get_active(store, &slug).await?;
    Ok(Json(
        ProgressionService::full_status(store, &profession, query.user_id).await?,
    ))
}

/// GET /api/professions/{slug}/quests
///
/// The admin override when set, the recommended list otherwise.
#[instrument(skip_all, fields(slug = %slug))]
pub async fn get_profession_quests(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> AppResult<Json<Vec<RecommendedQuest>>> {
    let profession = CatalogService::get_active(state.store.as_ref(), &slug).await?;
    Ok(Json(profession.quests().to_vec()))
}

/// POST /api/professions/{slug}/assign-quests/{user_id}?idempotent=
#[instrument(skip_all, fields(slug = %slug, user_id = %user_id))]
pub async fn assign_quests(
    State(state): State<Arc<AppState>>,
    Path((slug, user_id)): Path<(String, Uuid)>,
    Query(query): Query<AssignQuery>,
) -> AppResult<Json<AssignResponse>> {
    let store = state.store.as_ref();
    let profession = CatalogService::get_active(store, &slug).await?;
    if store.get_user(user_id).await?.is_none() {
        return Err(AppError::NotFound("User not found"));
    }

    let assigned = AssignmentService::assign(
        store,
        &profession,
        user_id,
        query.idempotent.unwrap_or(true),
    )
    .await?;
    Ok(Json(AssignResponse { assigned }))
}
