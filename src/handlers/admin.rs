//! # Admin Handlers
//!
//! Catalog maintenance and user administration. Every route here sits behind
//! [`admin_middleware`](crate::middleware::admin_middleware).

use std::sync::Arc;

use axum::{
    extract::{Extension, State},
    http::StatusCode,
};
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::extract::{Json, Path, Query};
use crate::handlers::profession::{AssignQuery, AssignResponse};
use crate::handlers::user::find_user;
use crate::middleware::AdminUser;
use crate::models::{
    AppState, NewProfession, NewQuest, PremiumRequest, Profession, ProfessionUpdate, Quest,
    RecommendedQuest, User,
};
use crate::services::{
    assignment::AssignmentService,
    catalog::CatalogService,
    recap::{RecapRun, RecapService},
};

/// POST /api/admin/professions
///
/// # Returns
///
/// - `201 Created` with the profession
/// - `409 Conflict` - Slug already taken
#[instrument(skip_all, fields(admin = %admin.email, slug = %payload.slug))]
pub async fn create_profession(
    State(state): State<Arc<AppState>>,
    Extension(admin): Extension<AdminUser>,
    Json(payload): Json<NewProfession>,
) -> AppResult<(StatusCode, Json<Profession>)> {
    payload.validate()?;
    let profession = CatalogService::create(state.store.as_ref(), payload).await?;
    Ok((StatusCode::CREATED, Json(profession)))
}

/// PUT /api/admin/professions/{slug}
#[instrument(skip_all, fields(admin = %admin.email, slug = %slug))]
pub async fn update_profession(
    State(state): State<Arc<AppState>>,
    Extension(admin): Extension<AdminUser>,
    Path(slug): Path<String>,
    Json(payload): Json<ProfessionUpdate>,
) -> AppResult<Json<Profession>> {
    payload.validate()?;
    Ok(Json(
        CatalogService::update(state.store.as_ref(), &slug, payload).await?,
    ))
}

/// PUT /api/admin/professions/{slug}/quests
///
/// Replaces the quests assigned for this profession. Quests already assigned
/// to users are left as they are.
#[instrument(skip_all, fields(admin = %admin.email, slug = %slug, count = payload.len()))]
pub async fn set_quest_override(
    State(state): State<Arc<AppState>>,
    Extension(admin): Extension<AdminUser>,
    Path(slug): Path<String>,
    Json(payload): Json<Vec<RecommendedQuest>>,
) -> AppResult<Json<Profession>> {
    if payload.is_empty() {
        return Err(AppError::BadRequest("Quest list must not be empty"));
    }
    for quest in &payload {
        quest.validate()?;
    }
    Ok(Json(
        CatalogService::set_quest_override(state.store.as_ref(), &slug, Some(payload)).await?,
    ))
}

/// DELETE /api/admin/professions/{slug}/quests
///
/// Restores the recommended quest list.
#[instrument(skip_all, fields(admin = %admin.email, slug = %slug))]
pub async fn clear_quest_override(
    State(state): State<Arc<AppState>>,
    Extension(admin): Extension<AdminUser>,
    Path(slug): Path<String>,
) -> AppResult<Json<Profession>> {
    Ok(Json(
        CatalogService::set_quest_override(state.store.as_ref(), &slug, None).await?,
    ))
}

/// POST /api/admin/quests
#[instrument(skip_all, fields(admin = %admin.email))]
pub async fn create_quest(
    State(state): State<Arc<AppState>>,
    Extension(admin): Extension<AdminUser>,
    Json(payload): Json<NewQuest>,
) -> AppResult<(StatusCode, Json<Quest>)> {
    payload.validate()?;
    let quest = Quest::from(payload);
    state.store.insert_quest(&quest).await?;
    info!(quest_id = %quest.id, "Catalog quest created");
    Ok((StatusCode::CREATED, Json(quest)))
}

/// POST /api/admin/users/{user_id}/assign-quests?idempotent=
///
/// Assigns the quests of the user's current profession.
#[instrument(skip_all, fields(admin = %admin.email, user_id = %user_id))]
pub async fn assign_user_quests(
    State(state): State<Arc<AppState>>,
    Extension(admin): Extension<AdminUser>,
    Path(user_id): Path<Uuid>,
    Query(query): Query<AssignQuery>,
) -> AppResult<Json<AssignResponse>> {
    let store = state.store.as_ref();
    let user = find_user(store, user_id).await?;
    let Some(slug) = &user.profession_slug else {
        return Err(AppError::BadRequest("User has no profession"));
    };

    let profession = CatalogService::get_by_slug(store, slug).await?;
    let assigned = AssignmentService::assign(
        store,
        &profession,
        user.id,
        query.idempotent.unwrap_or(true),
    )
    .await?;
    Ok(Json(AssignResponse { assigned }))
}

/// PUT /api/admin/users/{user_id}/premium
#[instrument(skip_all, fields(admin = %admin.email, user_id = %user_id, has_paid = payload.has_paid))]
pub async fn set_premium(
    State(state): State<Arc<AppState>>,
    Extension(admin): Extension<AdminUser>,
    Path(user_id): Path<Uuid>,
    Json(payload): Json<PremiumRequest>,
) -> AppResult<Json<User>> {
    let store = state.store.as_ref();
    if !store.set_user_paid(user_id, payload.has_paid).await? {
        return Err(AppError::NotFound("User not found"));
    }
    info!("Premium flag updated");
    Ok(Json(find_user(store, user_id).await?))
}

/// POST /api/admin/recap/run
///
/// Sends the daily recap now, outside the schedule.
#[instrument(skip_all, fields(admin = %admin.email))]
pub async fn run_recap(
    State(state): State<Arc<AppState>>,
    Extension(admin): Extension<AdminUser>,
) -> AppResult<Json<RecapRun>> {
    let run =
        RecapService::send_daily_recaps(state.store.as_ref(), state.email_service.as_ref())
            .await?;
    Ok(Json(run))
}
