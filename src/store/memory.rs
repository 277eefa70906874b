use async_trait::async_trait;
use dashmap::{DashMap, mapref::entry::Entry};
use time::{Date, OffsetDateTime};
use tracing::debug;
use uuid::Uuid;

use super::{Store, StoreError, StoreResult};
use crate::models::{
    HabitLog, Profession, ProgressionTier, Quest, QuestStatus, User, UserProfessionQuest,
    UserProgression, UserQuest,
};

/// In-process store backed by concurrent hash maps.
///
/// Single-entry updates hold the entry's shard lock, so they are atomic the
/// same way single-row updates are in Postgres. Scans are not snapshots.
#[derive(Default)]
pub struct MemoryStore {
    professions: DashMap<String, Profession>,
    tiers: DashMap<String, Vec<ProgressionTier>>,
    progressions: DashMap<(Uuid, String), UserProgression>,
    profession_quests: DashMap<Uuid, UserProfessionQuest>,
    quests: DashMap<Uuid, Quest>,
    user_quests: DashMap<Uuid, UserQuest>,
    users: DashMap<Uuid, User>,
    habit_logs: DashMap<Uuid, HabitLog>,
}

impl MemoryStore {
    pub fn new() -> Self {
        debug!("Creating in-memory store");
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn count_professions(&self) -> StoreResult<u64> {
        Ok(self.professions.len() as u64)
    }

    async fn insert_professions(&self, professions: &[Profession]) -> StoreResult<()> {
        for profession in professions {
            self.insert_profession(profession).await?;
        }
        Ok(())
    }

    async fn insert_profession(&self, profession: &Profession) -> StoreResult<()> {
        match self.professions.entry(profession.slug.clone()) {
            Entry::Occupied(_) => Err(StoreError::Duplicate("profession")),
            Entry::Vacant(slot) => {
                slot.insert(profession.clone());
                Ok(())
            }
        }
    }

    async fn update_profession(&self, profession: &Profession) -> StoreResult<bool> {
        match self.professions.get_mut(&profession.slug) {
            Some(mut stored) => {
                *stored = profession.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn get_profession(&self, slug: &str) -> StoreResult<Option<Profession>> {
        Ok(self.professions.get(slug).map(|p| p.clone()))
    }

    async fn list_professions(&self, active_only: bool) -> StoreResult<Vec<Profession>> {
        let mut professions: Vec<Profession> = self
            .professions
            .iter()
            .filter(|p| !active_only || p.is_active)
            .map(|p| p.clone())
            .collect();
        professions.sort_by(|a, b| {
            a.order_index
                .cmp(&b.order_index)
                .then_with(|| a.slug.cmp(&b.slug))
        });
        Ok(professions)
    }

    async fn insert_tiers(&self, tiers: &[ProgressionTier]) -> StoreResult<()> {
        for tier in tiers {
            self.tiers
                .entry(tier.profession_slug.clone())
                .or_default()
                .push(tier.clone());
        }
        Ok(())
    }

    async fn count_tiers(&self) -> StoreResult<u64> {
        Ok(self.tiers.iter().map(|ladder| ladder.len() as u64).sum())
    }

    async fn list_tiers(&self, profession_slug: &str) -> StoreResult<Vec<ProgressionTier>> {
        let mut tiers = self
            .tiers
            .get(profession_slug)
            .map(|ladder| ladder.clone())
            .unwrap_or_default();
        tiers.sort_by_key(|tier| tier.order_index);
        Ok(tiers)
    }

    async fn get_progression(
        &self,
        user_id: Uuid,
        profession_slug: &str,
    ) -> StoreResult<Option<UserProgression>> {
        Ok(self
            .progressions
            .get(&(user_id, profession_slug.to_string()))
            .map(|p| p.clone()))
    }

    async fn insert_progression(&self, progression: &UserProgression) -> StoreResult<()> {
        let key = (progression.user_id, progression.profession_slug.clone());
        match self.progressions.entry(key) {
            Entry::Occupied(_) => Err(StoreError::Duplicate("progression")),
            Entry::Vacant(slot) => {
                slot.insert(progression.clone());
                Ok(())
            }
        }
    }

    async fn increment_progression_xp(
        &self,
        user_id: Uuid,
        profession_slug: &str,
        delta: i64,
    ) -> StoreResult<Option<UserProgression>> {
        let key = (user_id, profession_slug.to_string());
        Ok(self.progressions.get_mut(&key).map(|mut progression| {
            progression.xp_total += delta;
            progression.updated_at = OffsetDateTime::now_utc();
            progression.clone()
        }))
    }

    async fn set_progression_tiers(
        &self,
        user_id: Uuid,
        profession_slug: &str,
        niveau_actuel: i32,
        niveaux_completes: &[i32],
    ) -> StoreResult<()> {
        let key = (user_id, profession_slug.to_string());
        if let Some(mut progression) = self.progressions.get_mut(&key) {
            progression.niveau_actuel = niveau_actuel;
            progression.niveaux_completes = niveaux_completes.to_vec();
            progression.updated_at = OffsetDateTime::now_utc();
        }
        Ok(())
    }

    async fn insert_profession_quest(&self, quest: &UserProfessionQuest) -> StoreResult<()> {
        self.profession_quests.insert(quest.id, quest.clone());
        Ok(())
    }

    async fn find_profession_quest(
        &self,
        user_id: Uuid,
        quest_id: &str,
    ) -> StoreResult<Option<UserProfessionQuest>> {
        let mut found: Option<UserProfessionQuest> = None;
        for quest in self.profession_quests.iter() {
            if quest.user_id != user_id || quest.quest_id != quest_id {
                continue;
            }
            if quest.status != QuestStatus::Done {
                return Ok(Some(quest.clone()));
            }
            found.get_or_insert_with(|| quest.clone());
        }
        Ok(found)
    }

    async fn complete_profession_quest(&self, id: Uuid, at: OffsetDateTime) -> StoreResult<bool> {
        match self.profession_quests.get_mut(&id) {
            Some(mut quest) if quest.status != QuestStatus::Done => {
                quest.status = QuestStatus::Done;
                quest.completed_at = Some(at);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn list_profession_quests(
        &self,
        user_id: Uuid,
        profession_slug: &str,
    ) -> StoreResult<Vec<UserProfessionQuest>> {
        let mut quests: Vec<UserProfessionQuest> = self
            .profession_quests
            .iter()
            .filter(|q| q.user_id == user_id && q.profession_slug == profession_slug)
            .map(|q| q.clone())
            .collect();
        quests.sort_by(|a, b| a.assigned_at.cmp(&b.assigned_at).then(a.id.cmp(&b.id)));
        Ok(quests)
    }

    async fn insert_quest(&self, quest: &Quest) -> StoreResult<()> {
        match self.quests.entry(quest.id) {
            Entry::Occupied(_) => Err(StoreError::Duplicate("quest")),
            Entry::Vacant(slot) => {
                slot.insert(quest.clone());
                Ok(())
            }
        }
    }

    async fn get_quest(&self, id: Uuid) -> StoreResult<Option<Quest>> {
        Ok(self.quests.get(&id).map(|q| q.clone()))
    }

    async fn list_quests(&self, active_only: bool) -> StoreResult<Vec<Quest>> {
        let mut quests: Vec<Quest> = self
            .quests
            .iter()
            .filter(|q| !active_only || q.is_active)
            .map(|q| q.clone())
            .collect();
        quests.sort_by(|a, b| a.title.cmp(&b.title));
        Ok(quests)
    }

    async fn insert_user_quest(&self, user_quest: &UserQuest) -> StoreResult<()> {
        self.user_quests.insert(user_quest.id, user_quest.clone());
        Ok(())
    }

    async fn find_completed_user_quest(
        &self,
        user_id: Uuid,
        quest_id: Uuid,
        day: Date,
    ) -> StoreResult<Option<UserQuest>> {
        Ok(self
            .user_quests
            .iter()
            .find(|uq| {
                uq.user_id == user_id
                    && uq.quest_id == quest_id
                    && uq.day == day
                    && uq.status == QuestStatus::Done
            })
            .map(|uq| uq.clone()))
    }

    async fn count_quests_completed_on(&self, user_id: Uuid, day: Date) -> StoreResult<u64> {
        let catalog = self
            .user_quests
            .iter()
            .filter(|uq| uq.user_id == user_id && uq.day == day && uq.status == QuestStatus::Done)
            .count();
        let profession = self
            .profession_quests
            .iter()
            .filter(|q| {
                q.user_id == user_id && q.completed_at.is_some_and(|at| at.date() == day)
            })
            .count();
        Ok((catalog + profession) as u64)
    }

    async fn insert_user(&self, user: &User) -> StoreResult<()> {
        let email_taken = self.users.iter().any(|u| u.email == user.email);
        if email_taken {
            return Err(StoreError::Duplicate("user"));
        }
        match self.users.entry(user.id) {
            Entry::Occupied(_) => Err(StoreError::Duplicate("user")),
            Entry::Vacant(slot) => {
                slot.insert(user.clone());
                Ok(())
            }
        }
    }

    async fn get_user(&self, id: Uuid) -> StoreResult<Option<User>> {
        Ok(self.users.get(&id).map(|u| u.clone()))
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        Ok(self
            .users
            .iter()
            .find(|u| u.email == email)
            .map(|u| u.clone()))
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        let mut users: Vec<User> = self.users.iter().map(|u| u.clone()).collect();
        users.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(users)
    }

    async fn set_user_profession(&self, id: Uuid, profession_slug: &str) -> StoreResult<bool> {
        Ok(match self.users.get_mut(&id) {
            Some(mut user) => {
                user.profession_slug = Some(profession_slug.to_string());
                true
            }
            None => false,
        })
    }

    async fn set_user_paid(&self, id: Uuid, has_paid: bool) -> StoreResult<bool> {
        Ok(match self.users.get_mut(&id) {
            Some(mut user) => {
                user.has_paid = has_paid;
                true
            }
            None => false,
        })
    }

    async fn increment_user_xp(&self, id: Uuid, delta: i64) -> StoreResult<Option<User>> {
        Ok(self.users.get_mut(&id).map(|mut user| {
            user.xp_total += delta;
            user.clone()
        }))
    }

    async fn set_user_level(&self, id: Uuid, level_number: i32) -> StoreResult<()> {
        if let Some(mut user) = self.users.get_mut(&id) {
            user.level_number = level_number;
        }
        Ok(())
    }

    async fn insert_habit_log(&self, log: &HabitLog) -> StoreResult<()> {
        self.habit_logs.insert(log.id, log.clone());
        Ok(())
    }

    async fn latest_habit_log(&self, user_id: Uuid, day: Date) -> StoreResult<Option<HabitLog>> {
        Ok(self
            .habit_logs
            .iter()
            .filter(|log| log.user_id == user_id && log.day == day)
            .max_by_key(|log| log.created_at)
            .map(|log| log.clone()))
    }

    async fn list_habit_logs(
        &self,
        user_id: Uuid,
        from: Date,
        to: Date,
    ) -> StoreResult<Vec<HabitLog>> {
        let mut logs: Vec<HabitLog> = self
            .habit_logs
            .iter()
            .filter(|log| log.user_id == user_id && (from..=to).contains(&log.day))
            .map(|log| log.clone())
            .collect();
        logs.sort_by_key(|log| (log.day, log.created_at));
        Ok(logs)
    }
}
