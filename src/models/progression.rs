use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use super::profession::TIER_MAX;

/// XP needed to climb one tier.
pub const XP_PER_TIER: i64 = 100;

/// Tier reached with `xp_total` XP, capped at [`TIER_MAX`].
///
/// This is the only leveling rule: every XP change re-derives the tier from it.
#[inline]
pub fn tier_for_xp(xp_total: i64) -> i32 {
    let tier = xp_total.max(0) / XP_PER_TIER + 1;
    tier.min(i64::from(TIER_MAX)) as i32
}

/// Progress of one user along one profession's ladder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct UserProgression {
    pub user_id: Uuid,
    pub profession_slug: String,
    pub niveau_actuel: i32,
    pub xp_total: i64,
    pub niveaux_completes: Vec<i32>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl UserProgression {
    pub fn new(user_id: Uuid, profession_slug: &str) -> Self {
        let now = OffsetDateTime::now_utc();
        Self {
            user_id,
            profession_slug: profession_slug.to_string(),
            niveau_actuel: 1,
            xp_total: 0,
            niveaux_completes: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// XP accumulated inside the current tier, always in `0..100`.
    #[inline]
    pub fn xp_in_tier(&self) -> i64 {
        self.xp_total.rem_euclid(XP_PER_TIER)
    }

    #[inline]
    pub fn has_completed(&self, niveau: i32) -> bool {
        self.niveaux_completes.contains(&niveau)
    }
}

/// Result of crediting flat XP to a progression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct XpAward {
    pub new_xp: i64,
    pub new_level: i32,
    pub leveled_up: bool,
}

/// Compact progression status for a profession.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressionStatus {
    pub profession_label: String,
    pub profession_icon: String,
    pub progression_niveau: i32,
    pub progression_xp: i64,
}

/// Progression status with the next objective to reach.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FullProgressionStatus {
    #[serde(flatten)]
    pub status: ProgressionStatus,
    pub next_objective: String,
    pub tier_max: i32,
}
