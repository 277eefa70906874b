use std::sync::Arc;

use axum::extract::State;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

use crate::error::AppResult;
use crate::extract::{Json, Path};
use crate::handlers::user::find_user;
use crate::models::{AppState, HabitLog, HabitLogRequest, ProgressionTier};
use crate::services::progression::ProgressionService;

#[derive(Debug, Serialize, Deserialize)]
pub struct HabitLogged {
    pub energy_score: u8,
    /// Tiers completed by this log.
    pub completed_tiers: Vec<ProgressionTier>,
}

/// POST /api/users/{user_id}/habits
///
/// Stores today's habit log and credits the tiers whose objective it meets.
#[instrument(skip_all, fields(user_id = %user_id, request_id = %uuid::Uuid::new_v4()))]
pub async fn log_habits(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<Uuid>,
    Json(payload): Json<HabitLogRequest>,
) -> AppResult<Json<HabitLogged>> {
    payload.validate()?;
    let store = state.store.as_ref();
    find_user(store, user_id).await?;

    let log = HabitLog::from_request(user_id, payload);
    store.insert_habit_log(&log).await?;

    let habits = log.snapshot();
    let energy_score = habits.energy_score();
    let completed_tiers =
        ProgressionService::infer_completed_tiers(store, user_id, &habits).await?;

    info!(
        energy_score,
        completed = completed_tiers.len(),
        "Habit log recorded"
    );
    Ok(Json(HabitLogged {
        energy_score,
        completed_tiers,
    }))
}
