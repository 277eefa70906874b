//! # Document Store
//!
//! Collection-oriented persistence behind the [`Store`] trait. Each method is a
//! single point lookup, filtered scan, insert or field-level update; there are
//! no transactions across collections.
//!
//! ## Implementations
//!
//! - [`MemoryStore`] - `DashMap` collections, used by tests and when no database is configured
//! - [`PgStore`] - PostgreSQL through `sqlx`, schema in `migrations/`

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use async_trait::async_trait;
use thiserror::Error;
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use crate::models::{
    HabitLog, Profession, ProgressionTier, Quest, User, UserProfessionQuest, UserProgression,
    UserQuest,
};

#[derive(Debug, Error)]
pub enum StoreError {
    /// A unique key is already taken. Carries the entity name.
    #[error("duplicate {0}")]
    Duplicate(&'static str),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("corrupt record: {0}")]
    Corrupt(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait Store: Send + Sync {
    // Professions, keyed by slug.

    async fn count_professions(&self) -> StoreResult<u64>;

    async fn insert_professions(&self, professions: &[Profession]) -> StoreResult<()>;

    /// Fails with [`StoreError::Duplicate`] if the slug is taken.
    async fn insert_profession(&self, profession: &Profession) -> StoreResult<()>;

    /// Replaces the stored profession with the same slug. Returns false if none exists.
    async fn update_profession(&self, profession: &Profession) -> StoreResult<bool>;

    async fn get_profession(&self, slug: &str) -> StoreResult<Option<Profession>>;

    /// Professions sorted by ascending `order_index`.
    async fn list_professions(&self, active_only: bool) -> StoreResult<Vec<Profession>>;

    // Progression ladders.

    async fn insert_tiers(&self, tiers: &[ProgressionTier]) -> StoreResult<()>;

    async fn count_tiers(&self) -> StoreResult<u64>;

    /// Tiers of a profession sorted by ascending `order_index`.
    async fn list_tiers(&self, profession_slug: &str) -> StoreResult<Vec<ProgressionTier>>;

    // User progressions, keyed by (user_id, profession_slug).

    async fn get_progression(
        &self,
        user_id: Uuid,
        profession_slug: &str,
    ) -> StoreResult<Option<UserProgression>>;

    /// Fails with [`StoreError::Duplicate`] if the key is taken.
    async fn insert_progression(&self, progression: &UserProgression) -> StoreResult<()>;

    /// Atomically adds `delta` to `xp_total` and returns the updated record.
    async fn increment_progression_xp(
        &self,
        user_id: Uuid,
        profession_slug: &str,
        delta: i64,
    ) -> StoreResult<Option<UserProgression>>;

    /// Sets `niveau_actuel` and `niveaux_completes`.
    async fn set_progression_tiers(
        &self,
        user_id: Uuid,
        profession_slug: &str,
        niveau_actuel: i32,
        niveaux_completes: &[i32],
    ) -> StoreResult<()>;

    // Materialized profession quests.

    async fn insert_profession_quest(&self, quest: &UserProfessionQuest) -> StoreResult<()>;

    /// Any record for the pair, preferring one that is not done yet.
    async fn find_profession_quest(
        &self,
        user_id: Uuid,
        quest_id: &str,
    ) -> StoreResult<Option<UserProfessionQuest>>;

    /// Transitions a record to done if it is not done already.
    ///
    /// Returns false if the record was already done or does not exist.
    async fn complete_profession_quest(&self, id: Uuid, at: OffsetDateTime) -> StoreResult<bool>;

    /// Records of a user sorted by assignment time, oldest first.
    async fn list_profession_quests(
        &self,
        user_id: Uuid,
        profession_slug: &str,
    ) -> StoreResult<Vec<UserProfessionQuest>>;

    // Catalog quests and their per-day completions.

    async fn insert_quest(&self, quest: &Quest) -> StoreResult<()>;

    async fn get_quest(&self, id: Uuid) -> StoreResult<Option<Quest>>;

    async fn list_quests(&self, active_only: bool) -> StoreResult<Vec<Quest>>;

    async fn insert_user_quest(&self, user_quest: &UserQuest) -> StoreResult<()>;

    /// A done completion of `quest_id` by the user on `day`, if any.
    async fn find_completed_user_quest(
        &self,
        user_id: Uuid,
        quest_id: Uuid,
        day: Date,
    ) -> StoreResult<Option<UserQuest>>;

    /// Number of quests of either namespace the user completed on `day`.
    async fn count_quests_completed_on(&self, user_id: Uuid, day: Date) -> StoreResult<u64>;

    // Users.

    /// Fails with [`StoreError::Duplicate`] if the email is taken.
    async fn insert_user(&self, user: &User) -> StoreResult<()>;

    async fn get_user(&self, id: Uuid) -> StoreResult<Option<User>>;

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    async fn list_users(&self) -> StoreResult<Vec<User>>;

    async fn set_user_profession(&self, id: Uuid, profession_slug: &str) -> StoreResult<bool>;

    async fn set_user_paid(&self, id: Uuid, has_paid: bool) -> StoreResult<bool>;

    /// Atomically adds `delta` to the user's XP and returns the updated user.
    async fn increment_user_xp(&self, id: Uuid, delta: i64) -> StoreResult<Option<User>>;

    async fn set_user_level(&self, id: Uuid, level_number: i32) -> StoreResult<()>;

    // Habit logs.

    async fn insert_habit_log(&self, log: &HabitLog) -> StoreResult<()>;

    /// Most recent log of the user on `day`.
    async fn latest_habit_log(&self, user_id: Uuid, day: Date) -> StoreResult<Option<HabitLog>>;

    /// Logs of the user with `from <= day <= to`, oldest first.
    async fn list_habit_logs(
        &self,
        user_id: Uuid,
        from: Date,
        to: Date,
    ) -> StoreResult<Vec<HabitLog>>;
}
