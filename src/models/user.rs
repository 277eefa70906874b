use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;
use validator::Validate;

use crate::utils::validator::{EMAIL_REGEX, SLUG_REGEX};

/// XP needed to gain one aggregate user level.
pub const XP_PER_LEVEL: i64 = 100;

/// Aggregate user level, uncapped.
#[inline]
pub fn level_for_xp(xp_total: i64) -> i32 {
    (xp_total.max(0) / XP_PER_LEVEL + 1) as i32
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub profession_slug: Option<String>,
    pub has_paid: bool,
    /// XP earned from catalog quests.
    pub xp_total: i64,
    pub level_number: i32,
    pub recap_opt_in: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(regex(path = *EMAIL_REGEX))]
    pub email: String,
    #[validate(length(min = 1, max = 80))]
    pub name: Option<String>,
    #[validate(regex(path = *SLUG_REGEX))]
    pub profession_slug: Option<String>,
    #[serde(default = "default_recap_opt_in")]
    pub recap_opt_in: bool,
}

fn default_recap_opt_in() -> bool {
    true
}

impl User {
    pub fn new(request: &CreateUserRequest) -> Self {
        Self {
            id: Uuid::new_v4(),
            email: request.email.to_ascii_lowercase(),
            name: request.name.clone(),
            profession_slug: None,
            has_paid: false,
            xp_total: 0,
            level_number: 1,
            recap_opt_in: request.recap_opt_in,
            created_at: OffsetDateTime::now_utc(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ChangeProfessionRequest {
    #[validate(regex(path = *SLUG_REGEX))]
    pub profession_slug: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PremiumRequest {
    pub has_paid: bool,
}
