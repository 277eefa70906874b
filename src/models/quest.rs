//! # Quest Types
//!
//! Two quest namespaces coexist:
//!
//! - **Profession quests** are materialized per user from a profession's quest
//!   list ([`UserProfessionQuest`]) and identified by a deterministic id.
//! - **Catalog quests** are global definitions ([`Quest`]) completed at most
//!   once per day, tracked by [`UserQuest`] records.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::{Date, OffsetDateTime};
use uuid::Uuid;
use validator::Validate;

use super::profession::{QuestType, RecommendedQuest};

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type, Serialize, Deserialize)]
#[sqlx(type_name = "quest_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum QuestStatus {
    Todo,
    InProgress,
    Done,
}

/// Namespace a quest id belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestSource {
    Profession,
    Catalog,
}

/// Deterministic id of a profession quest: `<slug>.<normalized title>`.
///
/// The title is lowercased, every run of non-alphanumeric characters becomes
/// a single `-`, and leading/trailing dashes are dropped. The same profession
/// and title always map to the same id.
pub fn profession_quest_id(profession_slug: &str, title: &str) -> String {
    let mut normalized = String::with_capacity(title.len());
    let mut pending_dash = false;

    for c in title.chars().flat_map(char::to_lowercase) {
        if c.is_alphanumeric() {
            if pending_dash && !normalized.is_empty() {
                normalized.push('-');
            }
            pending_dash = false;
            normalized.push(c);
        } else {
            pending_dash = true;
        }
    }

    format!("{profession_slug}.{normalized}")
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct UserProfessionQuest {
    pub id: Uuid,
    pub quest_id: String,
    pub user_id: Uuid,
    pub profession_slug: String,
    pub title: String,
    pub description: String,
    pub points_reward: i32,
    #[serde(rename = "type")]
    pub quest_type: QuestType,
    pub status: QuestStatus,
    #[serde(with = "time::serde::rfc3339")]
    pub assigned_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339::option")]
    pub completed_at: Option<OffsetDateTime>,
}

impl UserProfessionQuest {
    pub fn assign(user_id: Uuid, profession_slug: &str, quest: &RecommendedQuest) -> Self {
        Self {
            id: Uuid::new_v4(),
            quest_id: profession_quest_id(profession_slug, &quest.title),
            user_id,
            profession_slug: profession_slug.to_string(),
            title: quest.title.clone(),
            description: quest.description.clone(),
            points_reward: quest.points_reward,
            quest_type: quest.quest_type,
            status: QuestStatus::Todo,
            assigned_at: OffsetDateTime::now_utc(),
            completed_at: None,
        }
    }
}

/// Global quest definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Quest {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub quest_type: QuestType,
    pub points_reward: i32,
    pub is_active: bool,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewQuest {
    #[validate(length(min = 1, max = 120))]
    pub title: String,
    #[serde(default)]
    #[validate(length(max = 500))]
    pub description: String,
    #[serde(rename = "type")]
    pub quest_type: QuestType,
    #[validate(range(min = 0, max = 1000))]
    pub points_reward: i32,
}

impl From<NewQuest> for Quest {
    fn from(value: NewQuest) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: value.title,
            description: value.description,
            quest_type: value.quest_type,
            points_reward: value.points_reward,
            is_active: true,
        }
    }
}

/// A user's completion of a catalog quest on a given day.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct UserQuest {
    pub id: Uuid,
    pub user_id: Uuid,
    pub quest_id: Uuid,
    pub day: Date,
    pub status: QuestStatus,
    pub completed_at: Option<OffsetDateTime>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CompleteQuestRequest {
    pub user_id: Uuid,
    pub source: Option<QuestSource>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionResult {
    pub awarded_xp: i64,
    /// XP inside the current tier or level, in `0..100`.
    pub new_progression_xp: i64,
    pub level_up: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quest_id_is_deterministic_and_normalized() {
        assert_eq!(
            profession_quest_id("infirmier", "Hydratation 2L au service"),
            "infirmier.hydratation-2l-au-service"
        );
        assert_eq!(
            profession_quest_id("ash", "  Hydratation ≥ 1,5L/jour sur 5 jours "),
            "ash.hydratation-1-5l-jour-sur-5-jours"
        );
        assert_eq!(
            profession_quest_id("kine", "Hydratation 2L"),
            profession_quest_id("kine", "HYDRATATION   2l")
        );
    }

    #[test]
    fn quest_id_keeps_accented_letters() {
        assert_eq!(
            profession_quest_id("psy", "Écrire une pensée positive"),
            "psy.écrire-une-pensée-positive"
        );
    }
}
