//! # Progression Engine
//!
//! Per-(user, profession) state machine over tiers 1 to 5.
//!
//! XP only grows and the current tier is always re-derived from it with
//! [`tier_for_xp`], whichever path credited the XP: flat quest rewards or tier
//! completions inferred from habit logs. A tier is credited at most once.

use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{
    FullProgressionStatus, HabitSnapshot, Profession, ProgressionStatus, ProgressionTier,
    TIER_MAX, UserProgression, XpAward, tier_for_xp,
};
use crate::services::catalog::CatalogService;
use crate::store::{Store, StoreError};
use crate::utils::constant::{DEFAULT_NEXT_OBJECTIVE, LADDER_COMPLETED_OBJECTIVE};

pub struct ProgressionService;

impl ProgressionService {
    /// Returns the progression of `user_id` for `profession_slug`, creating it
    /// at tier 1 with no XP if it does not exist. An existing record is
    /// returned unchanged.
    #[instrument(skip(store), err)]
    pub async fn initialize(
        store: &dyn Store,
        user_id: Uuid,
        profession_slug: &str,
    ) -> AppResult<UserProgression> {
        if let Some(existing) = store.get_progression(user_id, profession_slug).await? {
            debug!("Progression already initialized");
            return Ok(existing);
        }

        let progression = UserProgression::new(user_id, profession_slug);
        match store.insert_progression(&progression).await {
            Ok(()) => {
                info!("Progression initialized");
                Ok(progression)
            }
            // Lost a race with a concurrent initialization
            Err(StoreError::Duplicate(_)) => store
                .get_progression(user_id, profession_slug)
                .await?
                .ok_or(AppError::Internal),
            Err(e) => Err(e.into()),
        }
    }

    /// Adds flat XP and re-derives the tier.
    #[instrument(skip(store), err)]
    pub async fn award_xp_flat(
        store: &dyn Store,
        user_id: Uuid,
        profession_slug: &str,
        xp: i64,
    ) -> AppResult<XpAward> {
        let updated = store
            .increment_progression_xp(user_id, profession_slug, xp)
            .await?
            .ok_or_else(|| {
                warn!("No progression to credit");
                AppError::NotFound("Progression not found")
            })?;

        let previous_level = updated.niveau_actuel;
        let new_level = tier_for_xp(updated.xp_total).max(previous_level);
        if new_level != previous_level {
            store
                .set_progression_tiers(
                    user_id,
                    profession_slug,
                    new_level,
                    &updated.niveaux_completes,
                )
                .await?;
            info!(previous_level, new_level, "Progression leveled up");
        }

        Ok(XpAward {
            new_xp: updated.xp_total,
            new_level,
            leveled_up: new_level > previous_level,
        })
    }

    /// Credits a completed tier. A tier already credited is left untouched and
    /// earns no XP; returns `None` in that case.
    #[instrument(skip(store), err)]
    pub async fn award_tier(
        store: &dyn Store,
        user_id: Uuid,
        profession_slug: &str,
        niveau: i32,
        xp: i64,
    ) -> AppResult<Option<XpAward>> {
        let progression = store
            .get_progression(user_id, profession_slug)
            .await?
            .ok_or(AppError::NotFound("Progression not found"))?;

        if progression.has_completed(niveau) {
            debug!("Tier already credited");
            return Ok(None);
        }

        let mut completed = progression.niveaux_completes.clone();
        completed.push(niveau);
        completed.sort_unstable();

        let updated = store
            .increment_progression_xp(user_id, profession_slug, xp)
            .await?
            .ok_or(AppError::NotFound("Progression not found"))?;

        let new_level = tier_for_xp(updated.xp_total).max(progression.niveau_actuel);
        store
            .set_progression_tiers(user_id, profession_slug, new_level, &completed)
            .await?;

        info!(niveau, new_level, xp_total = updated.xp_total, "Tier credited");
        Ok(Some(XpAward {
            new_xp: updated.xp_total,
            new_level,
            leveled_up: new_level > progression.niveau_actuel,
        }))
    }

    /// Credits every not-yet-completed tier of the user's current profession
    /// whose objective the habit snapshot meets. Returns the newly credited tiers.
    #[instrument(skip(store, habits), err)]
    pub async fn infer_completed_tiers(
        store: &dyn Store,
        user_id: Uuid,
        habits: &HabitSnapshot,
    ) -> AppResult<Vec<ProgressionTier>> {
        let Some(profession_slug) = store
            .get_user(user_id)
            .await?
            .ok_or(AppError::NotFound("User not found"))?
            .profession_slug
        else {
            debug!("User has no profession, nothing to infer");
            return Ok(Vec::new());
        };

        let Some(progression) = store.get_progression(user_id, &profession_slug).await? else {
            debug!("User has no progression, nothing to infer");
            return Ok(Vec::new());
        };

        let tiers = CatalogService::tiers_for(store, &profession_slug).await?;
        let mut credited = Vec::new();

        for tier in tiers {
            if progression.has_completed(tier.niveau) || !tier.objective.is_met(habits) {
                continue;
            }
            let award = Self::award_tier(
                store,
                user_id,
                &profession_slug,
                tier.niveau,
                tier.completion_xp(),
            )
            .await?;
            if award.is_some() {
                credited.push(tier);
            }
        }

        if !credited.is_empty() {
            info!(count = credited.len(), "Tiers completed from habit log");
        }
        Ok(credited)
    }

    /// Compact status. Without a user, or before initialization, reports tier
    /// 1 with no XP and writes nothing.
    pub async fn status(
        store: &dyn Store,
        profession: &Profession,
        user_id: Option<Uuid>,
    ) -> AppResult<ProgressionStatus> {
        let progression = Self::find(store, profession, user_id).await?;
        Ok(Self::compact(profession, progression.as_ref()))
    }

    /// Status with the objective of the current tier.
    pub async fn full_status(
        store: &dyn Store,
        profession: &Profession,
        user_id: Option<Uuid>,
    ) -> AppResult<FullProgressionStatus> {
        let progression = Self::find(store, profession, user_id).await?;
        let tiers = CatalogService::tiers_for(store, &profession.slug).await?;

        Ok(FullProgressionStatus {
            status: Self::compact(profession, progression.as_ref()),
            next_objective: next_objective(&tiers, progression.as_ref()),
            tier_max: TIER_MAX,
        })
    }

    async fn find(
        store: &dyn Store,
        profession: &Profession,
        user_id: Option<Uuid>,
    ) -> AppResult<Option<UserProgression>> {
        match user_id {
            Some(user_id) => Ok(store.get_progression(user_id, &profession.slug).await?),
            None => Ok(None),
        }
    }

    fn compact(profession: &Profession, progression: Option<&UserProgression>) -> ProgressionStatus {
        ProgressionStatus {
            profession_label: profession.label.clone(),
            profession_icon: profession.icon.clone(),
            progression_niveau: progression.map_or(1, |p| p.niveau_actuel),
            progression_xp: progression.map_or(0, UserProgression::xp_in_tier),
        }
    }
}

fn next_objective(tiers: &[ProgressionTier], progression: Option<&UserProgression>) -> String {
    if tiers.is_empty() {
        return DEFAULT_NEXT_OBJECTIVE.to_string();
    }

    let current = progression.map_or(1, |p| p.niveau_actuel);
    let pending = tiers
        .iter()
        .filter(|t| t.niveau >= current)
        .find(|t| progression.is_none_or(|p| !p.has_completed(t.niveau)));

    match pending {
        Some(tier) => tier.objectif.clone(),
        None if current >= TIER_MAX => LADDER_COMPLETED_OBJECTIVE.to_string(),
        None => DEFAULT_NEXT_OBJECTIVE.to_string(),
    }
}
