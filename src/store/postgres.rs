use async_trait::async_trait;
use sqlx::{FromRow, PgPool, postgres::PgPoolOptions, types::Json};
use time::{Date, OffsetDateTime};
use tracing::{info, instrument};
use uuid::Uuid;

use super::{Store, StoreError, StoreResult};
use crate::models::{
    HabitLog, Objective, ObjectiveKind, Profession, ProgressionTier, Quest, RecommendedQuest,
    User, UserProfessionQuest, UserProgression, UserQuest,
};
use crate::utils::constant::DB_MAX_CONNECTIONS;

/// PostgreSQL-backed store.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

#[derive(FromRow)]
struct ProfessionRow {
    slug: String,
    label: String,
    icon: String,
    order_index: i32,
    is_active: bool,
    recommended_quests: Json<Vec<RecommendedQuest>>,
    quest_override: Option<Json<Vec<RecommendedQuest>>>,
}

impl From<ProfessionRow> for Profession {
    fn from(row: ProfessionRow) -> Self {
        Self {
            slug: row.slug,
            label: row.label,
            icon: row.icon,
            order_index: row.order_index,
            is_active: row.is_active,
            recommended_quests: row.recommended_quests.0,
            quest_override: row.quest_override.map(|quests| quests.0),
        }
    }
}

#[derive(FromRow)]
struct TierRow {
    profession_slug: String,
    niveau: i32,
    titre: String,
    icon: String,
    objectif: String,
    objective_kind: ObjectiveKind,
    objective_threshold: f64,
    reward: String,
    order_index: i32,
}

impl From<TierRow> for ProgressionTier {
    fn from(row: TierRow) -> Self {
        Self {
            profession_slug: row.profession_slug,
            niveau: row.niveau,
            titre: row.titre,
            icon: row.icon,
            objectif: row.objectif,
            objective: Objective {
                kind: row.objective_kind,
                threshold: row.objective_threshold,
            },
            reward: row.reward,
            order_index: row.order_index,
        }
    }
}

const PROFESSION_COLUMNS: &str =
    "slug, label, icon, order_index, is_active, recommended_quests, quest_override";

const PROGRESSION_COLUMNS: &str =
    "user_id, profession_slug, niveau_actuel, xp_total, niveaux_completes, created_at, updated_at";

const PROFESSION_QUEST_COLUMNS: &str = "id, quest_id, user_id, profession_slug, title, description, \
     points_reward, quest_type, status, assigned_at, completed_at";

const USER_COLUMNS: &str =
    "id, email, name, profession_slug, has_paid, xp_total, level_number, recap_opt_in, created_at";

impl PgStore {
    /// Connects to `database_url` and applies pending migrations.
    #[instrument(skip_all)]
    pub async fn connect(database_url: &str) -> StoreResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(DB_MAX_CONNECTIONS)
            .connect(database_url)
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;
        info!("Connected to Postgres and applied migrations");

        Ok(Self { pool })
    }

    /// Wraps an existing pool whose schema is already migrated.
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn insert_profession_with(
        executor: impl sqlx::PgExecutor<'_>,
        profession: &Profession,
    ) -> StoreResult<()> {
        let result = sqlx::query(
            r#"
            INSERT INTO professions
                (slug, label, icon, order_index, is_active, recommended_quests, quest_override)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(&profession.slug)
        .bind(&profession.label)
        .bind(&profession.icon)
        .bind(profession.order_index)
        .bind(profession.is_active)
        .bind(Json(&profession.recommended_quests))
        .bind(profession.quest_override.as_ref().map(Json))
        .execute(executor)
        .await;

        map_unique(result, "profession")
    }
}

/// Maps a unique violation to [`StoreError::Duplicate`].
fn map_unique<T>(result: Result<T, sqlx::Error>, what: &'static str) -> StoreResult<()> {
    match result {
        Ok(_) => Ok(()),
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
            Err(StoreError::Duplicate(what))
        }
        Err(e) => Err(e.into()),
    }
}

fn to_count(count: i64) -> StoreResult<u64> {
    u64::try_from(count).map_err(|_| StoreError::Corrupt(format!("negative count {count}")))
}

#[async_trait]
impl Store for PgStore {
    async fn count_professions(&self) -> StoreResult<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM professions")
            .fetch_one(&self.pool)
            .await?;
        to_count(count)
    }

    async fn insert_professions(&self, professions: &[Profession]) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;
        for profession in professions {
            Self::insert_profession_with(&mut *tx, profession).await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn insert_profession(&self, profession: &Profession) -> StoreResult<()> {
        Self::insert_profession_with(&self.pool, profession).await
    }

    async fn update_profession(&self, profession: &Profession) -> StoreResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE professions
            SET label = $2, icon = $3, order_index = $4, is_active = $5,
                recommended_quests = $6, quest_override = $7
            WHERE slug = $1
            "#,
        )
        .bind(&profession.slug)
        .bind(&profession.label)
        .bind(&profession.icon)
        .bind(profession.order_index)
        .bind(profession.is_active)
        .bind(Json(&profession.recommended_quests))
        .bind(profession.quest_override.as_ref().map(Json))
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn get_profession(&self, slug: &str) -> StoreResult<Option<Profession>> {
        let row: Option<ProfessionRow> = sqlx::query_as(&format!(
            "SELECT {PROFESSION_COLUMNS} FROM professions WHERE slug = $1"
        ))
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Profession::from))
    }

    async fn list_professions(&self, active_only: bool) -> StoreResult<Vec<Profession>> {
        let rows: Vec<ProfessionRow> = sqlx::query_as(&format!(
            r#"
            SELECT {PROFESSION_COLUMNS} FROM professions
            WHERE is_active OR NOT $1
            ORDER BY order_index ASC, slug ASC
            "#
        ))
        .bind(active_only)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Profession::from).collect())
    }

    async fn insert_tiers(&self, tiers: &[ProgressionTier]) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;
        for tier in tiers {
            sqlx::query(
                r#"
                INSERT INTO progression_tiers
                    (profession_slug, niveau, titre, icon, objectif,
                     objective_kind, objective_threshold, reward, order_index)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
                "#,
            )
            .bind(&tier.profession_slug)
            .bind(tier.niveau)
            .bind(&tier.titre)
            .bind(&tier.icon)
            .bind(&tier.objectif)
            .bind(tier.objective.kind)
            .bind(tier.objective.threshold)
            .bind(&tier.reward)
            .bind(tier.order_index)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn count_tiers(&self) -> StoreResult<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM progression_tiers")
            .fetch_one(&self.pool)
            .await?;
        to_count(count)
    }

    async fn list_tiers(&self, profession_slug: &str) -> StoreResult<Vec<ProgressionTier>> {
        let rows: Vec<TierRow> = sqlx::query_as(
            r#"
            SELECT profession_slug, niveau, titre, icon, objectif,
                   objective_kind, objective_threshold, reward, order_index
            FROM progression_tiers
            WHERE profession_slug = $1
            ORDER BY order_index ASC
            "#,
        )
        .bind(profession_slug)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(ProgressionTier::from).collect())
    }

    async fn get_progression(
        &self,
        user_id: Uuid,
        profession_slug: &str,
    ) -> StoreResult<Option<UserProgression>> {
        let progression = sqlx::query_as(&format!(
            "SELECT {PROGRESSION_COLUMNS} FROM user_progressions \
             WHERE user_id = $1 AND profession_slug = $2"
        ))
        .bind(user_id)
        .bind(profession_slug)
        .fetch_optional(&self.pool)
        .await?;

        Ok(progression)
    }

    async fn insert_progression(&self, progression: &UserProgression) -> StoreResult<()> {
        let result = sqlx::query(
            r#"
            INSERT INTO user_progressions
                (user_id, profession_slug, niveau_actuel, xp_total, niveaux_completes,
                 created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(progression.user_id)
        .bind(&progression.profession_slug)
        .bind(progression.niveau_actuel)
        .bind(progression.xp_total)
        .bind(&progression.niveaux_completes)
        .bind(progression.created_at)
        .bind(progression.updated_at)
        .execute(&self.pool)
        .await;

        map_unique(result, "progression")
    }

    async fn increment_progression_xp(
        &self,
        user_id: Uuid,
        profession_slug: &str,
        delta: i64,
    ) -> StoreResult<Option<UserProgression>> {
        let progression = sqlx::query_as(&format!(
            "UPDATE user_progressions SET xp_total = xp_total + $3, updated_at = now() \
             WHERE user_id = $1 AND profession_slug = $2 \
             RETURNING {PROGRESSION_COLUMNS}"
        ))
        .bind(user_id)
        .bind(profession_slug)
        .bind(delta)
        .fetch_optional(&self.pool)
        .await?;

        Ok(progression)
    }

    async fn set_progression_tiers(
        &self,
        user_id: Uuid,
        profession_slug: &str,
        niveau_actuel: i32,
        niveaux_completes: &[i32],
    ) -> StoreResult<()> {
        sqlx::query(
            r#"
            UPDATE user_progressions
            SET niveau_actuel = $3, niveaux_completes = $4, updated_at = now()
            WHERE user_id = $1 AND profession_slug = $2
            "#,
        )
        .bind(user_id)
        .bind(profession_slug)
        .bind(niveau_actuel)
        .bind(niveaux_completes)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn insert_profession_quest(&self, quest: &UserProfessionQuest) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO user_profession_quests
                (id, quest_id, user_id, profession_slug, title, description,
                 points_reward, quest_type, status, assigned_at, completed_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(quest.id)
        .bind(&quest.quest_id)
        .bind(quest.user_id)
        .bind(&quest.profession_slug)
        .bind(&quest.title)
        .bind(&quest.description)
        .bind(quest.points_reward)
        .bind(quest.quest_type)
        .bind(quest.status)
        .bind(quest.assigned_at)
        .bind(quest.completed_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_profession_quest(
        &self,
        user_id: Uuid,
        quest_id: &str,
    ) -> StoreResult<Option<UserProfessionQuest>> {
        let quest = sqlx::query_as(&format!(
            "SELECT {PROFESSION_QUEST_COLUMNS} FROM user_profession_quests \
             WHERE user_id = $1 AND quest_id = $2 \
             ORDER BY (status = 'done') ASC, assigned_at ASC \
             LIMIT 1"
        ))
        .bind(user_id)
        .bind(quest_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(quest)
    }

    async fn complete_profession_quest(&self, id: Uuid, at: OffsetDateTime) -> StoreResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE user_profession_quests
            SET status = 'done', completed_at = $2
            WHERE id = $1 AND status <> 'done'
            "#,
        )
        .bind(id)
        .bind(at)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_profession_quests(
        &self,
        user_id: Uuid,
        profession_slug: &str,
    ) -> StoreResult<Vec<UserProfessionQuest>> {
        let quests = sqlx::query_as(&format!(
            "SELECT {PROFESSION_QUEST_COLUMNS} FROM user_profession_quests \
             WHERE user_id = $1 AND profession_slug = $2 \
             ORDER BY assigned_at ASC, id ASC"
        ))
        .bind(user_id)
        .bind(profession_slug)
        .fetch_all(&self.pool)
        .await?;

        Ok(quests)
    }

    async fn insert_quest(&self, quest: &Quest) -> StoreResult<()> {
        let result = sqlx::query(
            r#"
            INSERT INTO quests (id, title, description, quest_type, points_reward, is_active)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(quest.id)
        .bind(&quest.title)
        .bind(&quest.description)
        .bind(quest.quest_type)
        .bind(quest.points_reward)
        .bind(quest.is_active)
        .execute(&self.pool)
        .await;

        map_unique(result, "quest")
    }

    async fn get_quest(&self, id: Uuid) -> StoreResult<Option<Quest>> {
        let quest = sqlx::query_as(
            "SELECT id, title, description, quest_type, points_reward, is_active \
             FROM quests WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(quest)
    }

    async fn list_quests(&self, active_only: bool) -> StoreResult<Vec<Quest>> {
        let quests = sqlx::query_as(
            "SELECT id, title, description, quest_type, points_reward, is_active \
             FROM quests WHERE is_active OR NOT $1 ORDER BY title ASC",
        )
        .bind(active_only)
        .fetch_all(&self.pool)
        .await?;

        Ok(quests)
    }

    async fn insert_user_quest(&self, user_quest: &UserQuest) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO user_quests (id, user_id, quest_id, day, status, completed_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(user_quest.id)
        .bind(user_quest.user_id)
        .bind(user_quest.quest_id)
        .bind(user_quest.day)
        .bind(user_quest.status)
        .bind(user_quest.completed_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_completed_user_quest(
        &self,
        user_id: Uuid,
        quest_id: Uuid,
        day: Date,
    ) -> StoreResult<Option<UserQuest>> {
        let user_quest = sqlx::query_as(
            r#"
            SELECT id, user_id, quest_id, day, status, completed_at
            FROM user_quests
            WHERE user_id = $1 AND quest_id = $2 AND day = $3 AND status = 'done'
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .bind(quest_id)
        .bind(day)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user_quest)
    }

    async fn count_quests_completed_on(&self, user_id: Uuid, day: Date) -> StoreResult<u64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT
                (SELECT COUNT(*) FROM user_quests
                 WHERE user_id = $1 AND day = $2 AND status = 'done')
              + (SELECT COUNT(*) FROM user_profession_quests
                 WHERE user_id = $1 AND (completed_at AT TIME ZONE 'UTC')::date = $2)
            "#,
        )
        .bind(user_id)
        .bind(day)
        .fetch_one(&self.pool)
        .await?;

        to_count(count)
    }

    async fn insert_user(&self, user: &User) -> StoreResult<()> {
        let result = sqlx::query(
            r#"
            INSERT INTO users
                (id, email, name, profession_slug, has_paid, xp_total, level_number,
                 recap_opt_in, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.name)
        .bind(&user.profession_slug)
        .bind(user.has_paid)
        .bind(user.xp_total)
        .bind(user.level_number)
        .bind(user.recap_opt_in)
        .bind(user.created_at)
        .execute(&self.pool)
        .await;

        map_unique(result, "user")
    }

    async fn get_user(&self, id: Uuid) -> StoreResult<Option<User>> {
        let user = sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let user = sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1"))
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        let users = sqlx::query_as(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY created_at ASC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    async fn set_user_profession(&self, id: Uuid, profession_slug: &str) -> StoreResult<bool> {
        let result = sqlx::query("UPDATE users SET profession_slug = $2 WHERE id = $1")
            .bind(id)
            .bind(profession_slug)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn set_user_paid(&self, id: Uuid, has_paid: bool) -> StoreResult<bool> {
        let result = sqlx::query("UPDATE users SET has_paid = $2 WHERE id = $1")
            .bind(id)
            .bind(has_paid)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn increment_user_xp(&self, id: Uuid, delta: i64) -> StoreResult<Option<User>> {
        let user = sqlx::query_as(&format!(
            "UPDATE users SET xp_total = xp_total + $2 WHERE id = $1 RETURNING {USER_COLUMNS}"
        ))
        .bind(id)
        .bind(delta)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn set_user_level(&self, id: Uuid, level_number: i32) -> StoreResult<()> {
        sqlx::query("UPDATE users SET level_number = $2 WHERE id = $1")
            .bind(id)
            .bind(level_number)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn insert_habit_log(&self, log: &HabitLog) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO habit_logs
                (id, user_id, day, water_ml, sleep_h, nutrition_score, activity_min,
                 serenity_min, mood, stress, notes, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(log.id)
        .bind(log.user_id)
        .bind(log.day)
        .bind(log.water_ml)
        .bind(log.sleep_h)
        .bind(log.nutrition_score)
        .bind(log.activity_min)
        .bind(log.serenity_min)
        .bind(log.mood)
        .bind(log.stress)
        .bind(&log.notes)
        .bind(log.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn latest_habit_log(&self, user_id: Uuid, day: Date) -> StoreResult<Option<HabitLog>> {
        let log = sqlx::query_as(
            r#"
            SELECT id, user_id, day, water_ml, sleep_h, nutrition_score, activity_min,
                   serenity_min, mood, stress, notes, created_at
            FROM habit_logs
            WHERE user_id = $1 AND day = $2
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .bind(day)
        .fetch_optional(&self.pool)
        .await?;

        Ok(log)
    }

    async fn list_habit_logs(
        &self,
        user_id: Uuid,
        from: Date,
        to: Date,
    ) -> StoreResult<Vec<HabitLog>> {
        let logs = sqlx::query_as(
            r#"
            SELECT id, user_id, day, water_ml, sleep_h, nutrition_score, activity_min,
                   serenity_min, mood, stress, notes, created_at
            FROM habit_logs
            WHERE user_id = $1 AND day BETWEEN $2 AND $3
            ORDER BY day, created_at
            "#,
        )
        .bind(user_id)
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        Ok(logs)
    }
}
