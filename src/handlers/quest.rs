use std::sync::Arc;

use axum::extract::State;
use tracing::instrument;

use crate::error::AppResult;
use crate::extract::{Json, Path};
use crate::models::{AppState, CompleteQuestRequest, CompletionResult, Quest};
use crate::services::completion::CompletionService;

/// GET /api/quests
///
/// Active catalog quests.
#[instrument(skip_all)]
pub async fn list_quests(State(state): State<Arc<AppState>>) -> AppResult<Json<Vec<Quest>>> {
    Ok(Json(state.store.list_quests(true).await?))
}

/// POST /api/quests/{quest_id}/complete
///
/// `quest_id` is either a profession quest id (`<slug>.<title>`) or a
/// catalog quest UUID. Completing an already completed quest awards 0 XP.
///
/// # Returns
///
/// - `200 OK` with the XP awarded and the progression after completion
/// - `404 Not Found` - Quest not assigned to the user, or unknown catalog quest
#[instrument(
    skip_all,
    fields(
        quest_id = %quest_id,
        user_id = %payload.user_id,
        request_id = %uuid::Uuid::new_v4()
    )
)]
pub async fn complete_quest(
    State(state): State<Arc<AppState>>,
    Path(quest_id): Path<String>,
    Json(payload): Json<CompleteQuestRequest>,
) -> AppResult<Json<CompletionResult>> {
    let result = CompletionService::complete(
        state.store.as_ref(),
        &quest_id,
        payload.user_id,
        payload.source,
    )
    .await?;
    Ok(Json(result))
}
