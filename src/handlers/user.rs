//! # User Handlers
//!
//! Account creation, profession selection and the user's profession quests.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::extract::{Json, Path};
use crate::models::{
    AppState, ChangeProfessionRequest, CreateUserRequest, Profession, User, UserProfessionQuest,
};
use crate::services::{
    assignment::AssignmentService, catalog::CatalogService, progression::ProgressionService,
};
use crate::store::{Store, StoreError};

#[derive(Debug, Serialize, Deserialize)]
pub struct ProfessionChanged {
    pub user: User,
    pub assigned: usize,
}

/// POST /api/users
///
/// # Returns
///
/// - `201 Created` with the new user
/// - `200 OK` with the existing user when the email is already registered
/// - `404 Not Found` - Unknown or inactive profession
/// - `422 Unprocessable Entity` - Invalid email or profession slug
#[instrument(skip_all, fields(request_id = %uuid::Uuid::new_v4()))]
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateUserRequest>,
) -> AppResult<(StatusCode, Json<User>)> {
    payload.validate()?;
    let store = state.store.as_ref();

    let email = payload.email.to_ascii_lowercase();
    if let Some(existing) = store.find_user_by_email(&email).await? {
        debug!(user_id = %existing.id, "User already registered");
        return Ok((StatusCode::OK, Json(existing)));
    }

    let profession = match &payload.profession_slug {
        Some(slug) => Some(CatalogService::get_active(store, slug).await?),
        None => None,
    };

    let mut user = User::new(&payload);
    user.profession_slug = profession.as_ref().map(|p| p.slug.clone());

    match store.insert_user(&user).await {
        Ok(()) => {}
        // Registered concurrently
        Err(StoreError::Duplicate(_)) => {
            let existing = store
                .find_user_by_email(&email)
                .await?
                .ok_or(AppError::Internal)?;
            return Ok((StatusCode::OK, Json(existing)));
        }
        Err(e) => return Err(e.into()),
    }
    info!(user_id = %user.id, "User created");

    if let Some(profession) = &profession {
        onboard(store, &user, profession).await?;
    }

    Ok((StatusCode::CREATED, Json(user)))
}

/// GET /api/users/{user_id}
#[instrument(skip_all, fields(user_id = %user_id))]
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<Uuid>,
) -> AppResult<Json<User>> {
    Ok(Json(find_user(state.store.as_ref(), user_id).await?))
}

/// PUT /api/users/{user_id}/profession
///
/// Switches the user's profession. The progression of the previous
/// profession is kept; the new one starts at tier 1 unless it already exists.
#[instrument(skip_all, fields(user_id = %user_id, slug = %payload.profession_slug))]
pub async fn change_profession(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<Uuid>,
    Json(payload): Json<ChangeProfessionRequest>,
) -> AppResult<Json<ProfessionChanged>> {
    payload.validate()?;
    let store = state.store.as_ref();

    let profession = CatalogService::get_active(store, &payload.profession_slug).await?;
    if !store.set_user_profession(user_id, &profession.slug).await? {
        return Err(AppError::NotFound("User not found"));
    }
    let user = find_user(store, user_id).await?;
    info!("Profession changed");

    let assigned = onboard(store, &user, &profession).await?;
    Ok(Json(ProfessionChanged { user, assigned }))
}

/// GET /api/users/{user_id}/profession-quests
///
/// Unpaid users only see the first `FREE_QUEST_LIMIT` quests.
#[instrument(skip_all, fields(user_id = %user_id))]
pub async fn list_profession_quests(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<Uuid>,
) -> AppResult<Json<Vec<UserProfessionQuest>>> {
    let store = state.store.as_ref();
    let user = find_user(store, user_id).await?;

    let Some(slug) = &user.profession_slug else {
        return Ok(Json(Vec::new()));
    };
    let quests = AssignmentService::visible_quests(
        store,
        user.id,
        slug,
        user.has_paid,
        state.config.free_quest_limit,
    )
    .await?;
    Ok(Json(quests))
}

pub(crate) async fn find_user(store: &dyn Store, user_id: Uuid) -> AppResult<User> {
    store
        .get_user(user_id)
        .await?
        .ok_or(AppError::NotFound("User not found"))
}

/// Initializes the progression and assigns the quests of `profession`.
async fn onboard(store: &dyn Store, user: &User, profession: &Profession) -> AppResult<usize> {
    ProgressionService::initialize(store, user.id, &profession.slug).await?;
    AssignmentService::assign(store, profession, user.id, true).await
}
