//! # Profession Catalog Types
//!
//! Reference data describing professions, the quests recommended for them
//! and the 5-tier progression ladder attached to each profession.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::HabitSnapshot;
use crate::utils::validator::SLUG_REGEX;

/// Highest tier of every progression ladder.
pub const TIER_MAX: i32 = 5;

/// Cadence of a quest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type, Serialize, Deserialize)]
#[sqlx(type_name = "quest_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum QuestType {
    Daily,
    Weekly,
    Special,
}

/// A quest template carried by a profession.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct RecommendedQuest {
    #[validate(length(min = 1, max = 120))]
    pub title: String,
    #[validate(length(max = 500))]
    pub description: String,
    #[validate(range(min = 0, max = 1000))]
    pub points_reward: i32,
    #[serde(rename = "type")]
    pub quest_type: QuestType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profession {
    pub slug: String,
    pub label: String,
    pub icon: String,
    pub order_index: i32,
    pub is_active: bool,
    pub recommended_quests: Vec<RecommendedQuest>,
    /// Admin-provided list replacing `recommended_quests` when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quest_override: Option<Vec<RecommendedQuest>>,
}

impl Profession {
    /// Quests materialized for users of this profession.
    #[inline]
    pub fn quests(&self) -> &[RecommendedQuest] {
        self.quest_override
            .as_deref()
            .unwrap_or(&self.recommended_quests)
    }
}

/// Payload used by admins to create a profession.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewProfession {
    #[validate(regex(path = *SLUG_REGEX))]
    pub slug: String,
    #[validate(length(min = 1, max = 80))]
    pub label: String,
    #[validate(length(min = 1, max = 16))]
    pub icon: String,
    #[serde(default = "default_order_index")]
    pub order_index: i32,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    #[validate(nested)]
    pub recommended_quests: Vec<RecommendedQuest>,
}

impl From<NewProfession> for Profession {
    fn from(value: NewProfession) -> Self {
        Self {
            slug: value.slug,
            label: value.label,
            icon: value.icon,
            order_index: value.order_index,
            is_active: value.is_active,
            recommended_quests: value.recommended_quests,
            quest_override: None,
        }
    }
}

/// Partial update of a profession. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct ProfessionUpdate {
    #[validate(length(min = 1, max = 80))]
    pub label: Option<String>,
    #[validate(length(min = 1, max = 16))]
    pub icon: Option<String>,
    pub order_index: Option<i32>,
    pub is_active: Option<bool>,
    #[validate(nested)]
    pub recommended_quests: Option<Vec<RecommendedQuest>>,
}

impl ProfessionUpdate {
    pub fn apply(self, profession: &mut Profession) {
        if let Some(label) = self.label {
            profession.label = label;
        }
        if let Some(icon) = self.icon {
            profession.icon = icon;
        }
        if let Some(order_index) = self.order_index {
            profession.order_index = order_index;
        }
        if let Some(is_active) = self.is_active {
            profession.is_active = is_active;
        }
        if let Some(quests) = self.recommended_quests {
            profession.recommended_quests = quests;
        }
    }
}

fn default_order_index() -> i32 {
    100
}

fn default_true() -> bool {
    true
}

/// Habit a tier objective is measured against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type, Serialize, Deserialize)]
#[sqlx(type_name = "objective_kind", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ObjectiveKind {
    Hydration,
    Sleep,
    Activity,
    Serenity,
    /// Only credited through quests, never inferred from habit logs.
    Manual,
}

/// Keywords of a tier's `objectif` text, checked in this order.
const OBJECTIVE_KEYWORDS: [(&str, ObjectiveKind); 4] = [
    ("hydratation", ObjectiveKind::Hydration),
    ("sommeil", ObjectiveKind::Sleep),
    ("activité", ObjectiveKind::Activity),
    ("sérénité", ObjectiveKind::Serenity),
];

impl ObjectiveKind {
    pub fn default_threshold(self) -> f64 {
        match self {
            ObjectiveKind::Hydration => 2000.0,
            ObjectiveKind::Sleep => 7.0,
            ObjectiveKind::Activity => 30.0,
            ObjectiveKind::Serenity => 10.0,
            ObjectiveKind::Manual => 0.0,
        }
    }
}

/// Machine-checkable objective of a tier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Objective {
    pub kind: ObjectiveKind,
    pub threshold: f64,
}

impl Objective {
    pub fn new(kind: ObjectiveKind) -> Self {
        Self {
            kind,
            threshold: kind.default_threshold(),
        }
    }

    /// Objective of a tier described by `objectif`. The first keyword found
    /// wins; text without any keyword is manual.
    pub fn from_objectif(objectif: &str) -> Self {
        let text = objectif.to_lowercase();
        let kind = OBJECTIVE_KEYWORDS
            .iter()
            .find(|(keyword, _)| text.contains(keyword))
            .map_or(ObjectiveKind::Manual, |&(_, kind)| kind);
        Self::new(kind)
    }

    /// Returns true if the habit snapshot satisfies this objective.
    pub fn is_met(&self, habits: &HabitSnapshot) -> bool {
        let measured = match self.kind {
            ObjectiveKind::Hydration => habits.water_ml,
            ObjectiveKind::Sleep => habits.sleep_h,
            ObjectiveKind::Activity => habits.activity_min,
            ObjectiveKind::Serenity => habits.serenity_min,
            ObjectiveKind::Manual => return false,
        };
        measured >= self.threshold
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressionTier {
    pub profession_slug: String,
    pub niveau: i32,
    pub titre: String,
    pub icon: String,
    /// Human-readable objective shown to users.
    pub objectif: String,
    pub objective: Objective,
    pub reward: String,
    pub order_index: i32,
}

impl ProgressionTier {
    /// XP credited when this tier is completed from a habit log.
    #[inline]
    pub fn completion_xp(&self) -> i64 {
        50 + i64::from(self.niveau - 1) * 20
    }
}
