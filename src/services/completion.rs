//! # Quest Completion
//!
//! Completing a quest credits XP exactly once per completion event:
//!
//! - a profession quest moves `todo -> done` once and credits its
//!   `points_reward` to the matching profession progression;
//! - a catalog quest can be completed once per user and UTC day and credits
//!   the user's aggregate XP.
//!
//! A repeated completion is a no-op that reports zero XP.

use time::OffsetDateTime;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{
    CompletionResult, QuestSource, QuestStatus, UserProfessionQuest, UserQuest, XP_PER_LEVEL,
    level_for_xp,
};
use crate::services::progression::ProgressionService;
use crate::store::Store;

pub struct CompletionService;

impl CompletionService {
    #[instrument(skip(store), err)]
    pub async fn complete(
        store: &dyn Store,
        quest_id: &str,
        user_id: Uuid,
        source: Option<QuestSource>,
    ) -> AppResult<CompletionResult> {
        match Self::resolve(store, quest_id, user_id, source).await? {
            Resolved::Profession(record) => Self::complete_profession(store, record).await,
            Resolved::Catalog(id) => Self::complete_catalog(store, id, user_id).await,
        }
    }

    async fn resolve(
        store: &dyn Store,
        quest_id: &str,
        user_id: Uuid,
        source: Option<QuestSource>,
    ) -> AppResult<Resolved> {
        let catalog_id = Uuid::parse_str(quest_id).ok();

        if source != Some(QuestSource::Catalog) {
            if let Some(record) = store.find_profession_quest(user_id, quest_id).await? {
                return Ok(Resolved::Profession(record));
            }
        }

        match (source, catalog_id) {
            (Some(QuestSource::Profession), _) | (None, None) => {
                warn!("Quest not assigned to user");
                Err(AppError::NotFound("Quest not assigned"))
            }
            (_, Some(id)) => Ok(Resolved::Catalog(id)),
            (Some(QuestSource::Catalog), None) => Err(AppError::NotFound("Quest not found")),
        }
    }

    async fn complete_profession(
        store: &dyn Store,
        record: UserProfessionQuest,
    ) -> AppResult<CompletionResult> {
        if record.status == QuestStatus::Done {
            info!(quest_id = %record.quest_id, "Profession quest already completed");
            return Self::unchanged(store, &record).await;
        }

        ProgressionService::initialize(store, record.user_id, &record.profession_slug).await?;

        // Conditional write: a concurrent completion of the same record loses here
        if !store
            .complete_profession_quest(record.id, OffsetDateTime::now_utc())
            .await?
        {
            info!(quest_id = %record.quest_id, "Profession quest completed concurrently");
            return Self::unchanged(store, &record).await;
        }

        let xp = i64::from(record.points_reward);
        let award = ProgressionService::award_xp_flat(
            store,
            record.user_id,
            &record.profession_slug,
            xp,
        )
        .await?;

        info!(
            quest_id = %record.quest_id,
            xp,
            new_xp = award.new_xp,
            leveled_up = award.leveled_up,
            "Profession quest completed"
        );
        Ok(CompletionResult {
            awarded_xp: xp,
            new_progression_xp: award.new_xp.rem_euclid(XP_PER_LEVEL),
            level_up: award.leveled_up,
        })
    }

    /// Read-only result for a completion that credits nothing.
    async fn unchanged(
        store: &dyn Store,
        record: &UserProfessionQuest,
    ) -> AppResult<CompletionResult> {
        let xp = store
            .get_progression(record.user_id, &record.profession_slug)
            .await?
            .map_or(0, |p| p.xp_in_tier());
        Ok(CompletionResult {
            awarded_xp: 0,
            new_progression_xp: xp,
            level_up: false,
        })
    }

    async fn complete_catalog(
        store: &dyn Store,
        quest_id: Uuid,
        user_id: Uuid,
    ) -> AppResult<CompletionResult> {
        let quest = store
            .get_quest(quest_id)
            .await?
            .ok_or(AppError::NotFound("Quest not found"))?;
        let user = store
            .get_user(user_id)
            .await?
            .ok_or(AppError::NotFound("User not found"))?;

        let now = OffsetDateTime::now_utc();
        let today = now.date();

        if store
            .find_completed_user_quest(user_id, quest_id, today)
            .await?
            .is_some()
        {
            info!(%quest_id, "Catalog quest already completed today");
            return Ok(CompletionResult {
                awarded_xp: 0,
                new_progression_xp: user.xp_total.rem_euclid(XP_PER_LEVEL),
                level_up: false,
            });
        }

        store
            .insert_user_quest(&UserQuest {
                id: Uuid::new_v4(),
                user_id,
                quest_id,
                day: today,
                status: QuestStatus::Done,
                completed_at: Some(now),
            })
            .await?;

        let xp = i64::from(quest.points_reward);
        let updated = store
            .increment_user_xp(user_id, xp)
            .await?
            .ok_or(AppError::NotFound("User not found"))?;

        let new_level = level_for_xp(updated.xp_total);
        let level_up = new_level > user.level_number;
        if new_level != updated.level_number {
            store.set_user_level(user_id, new_level).await?;
        }

        info!(%quest_id, xp, new_level, level_up, "Catalog quest completed");
        Ok(CompletionResult {
            awarded_xp: xp,
            new_progression_xp: updated.xp_total.rem_euclid(XP_PER_LEVEL),
            level_up,
        })
    }
}

enum Resolved {
    Profession(UserProfessionQuest),
    Catalog(Uuid),
}
