//! # Dashboard
//!
//! Today's quest board of a user and the figures of the dashboard page: the
//! energy score of each of the last seven days and today's quest progress.

use serde::Serialize;
use time::{Date, Duration};
use tracing::instrument;

use crate::error::AppResult;
use crate::models::{
    HabitLog, Quest, QuestSource, QuestStatus, QuestType, User, UserProfessionQuest,
};
use crate::services::assignment::AssignmentService;
use crate::store::Store;

/// Days covered by the weekly energy chart, today included.
pub const WEEK_DAYS: i64 = 7;

time::serde::format_description!(iso_day, Date, "[year]-[month]-[day]");

/// One entry of today's quest board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TodayQuest {
    /// Id accepted by `POST /api/quests/{quest_id}/complete`.
    pub id: String,
    pub source: QuestSource,
    pub title: String,
    pub description: String,
    pub points_reward: i32,
    #[serde(rename = "type")]
    pub quest_type: QuestType,
    pub status: QuestStatus,
}

impl From<UserProfessionQuest> for TodayQuest {
    fn from(quest: UserProfessionQuest) -> Self {
        Self {
            id: quest.quest_id,
            source: QuestSource::Profession,
            title: quest.title,
            description: quest.description,
            points_reward: quest.points_reward,
            quest_type: quest.quest_type,
            status: quest.status,
        }
    }
}

impl TodayQuest {
    fn catalog(quest: Quest, done_today: bool) -> Self {
        Self {
            id: quest.id.to_string(),
            source: QuestSource::Catalog,
            title: quest.title,
            description: quest.description,
            points_reward: quest.points_reward,
            quest_type: quest.quest_type,
            status: if done_today {
                QuestStatus::Done
            } else {
                QuestStatus::Todo
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DayEnergy {
    #[serde(with = "iso_day")]
    pub day: Date,
    /// Energy score of the day's latest log, 0 without a log.
    pub valeur: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TodayStats {
    pub quests_completed: usize,
    pub total_quests: usize,
    /// Points of the quests on today's board that are done.
    pub total_points: i64,
    pub completion_percentage: u8,
    pub energy_score: Option<u8>,
    pub level_number: i32,
    pub xp_total: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardStats {
    pub weekly_data: Vec<DayEnergy>,
    pub today_stats: TodayStats,
}

pub struct DashboardService;

impl DashboardService {
    /// Visible profession quests with their status, then every active catalog
    /// quest marked done if completed on `today`.
    #[instrument(skip(store, user), fields(user_id = %user.id), err)]
    pub async fn today_quests(
        store: &dyn Store,
        user: &User,
        free_limit: usize,
        today: Date,
    ) -> AppResult<Vec<TodayQuest>> {
        let mut board = Vec::new();

        if let Some(slug) = &user.profession_slug {
            let held =
                AssignmentService::visible_quests(store, user.id, slug, user.has_paid, free_limit)
                    .await?;
            board.extend(held.into_iter().map(TodayQuest::from));
        }

        for quest in store.list_quests(true).await? {
            let done_today = store
                .find_completed_user_quest(user.id, quest.id, today)
                .await?
                .is_some();
            board.push(TodayQuest::catalog(quest, done_today));
        }

        Ok(board)
    }

    #[instrument(skip(store, user), fields(user_id = %user.id), err)]
    pub async fn stats(
        store: &dyn Store,
        user: &User,
        free_limit: usize,
        today: Date,
    ) -> AppResult<DashboardStats> {
        let from = today.saturating_sub(Duration::days(WEEK_DAYS - 1));
        let logs = store.list_habit_logs(user.id, from, today).await?;
        let board = Self::today_quests(store, user, free_limit, today).await?;

        let done: Vec<&TodayQuest> = board
            .iter()
            .filter(|q| q.status == QuestStatus::Done)
            .collect();

        Ok(DashboardStats {
            weekly_data: weekly_energy(&logs, today),
            today_stats: TodayStats {
                quests_completed: done.len(),
                total_quests: board.len(),
                total_points: done.iter().map(|q| i64::from(q.points_reward)).sum(),
                completion_percentage: percentage(done.len(), board.len()),
                energy_score: latest_on(&logs, today).map(|log| log.snapshot().energy_score()),
                level_number: user.level_number,
                xp_total: user.xp_total,
            },
        })
    }
}

/// One entry per day from `today - 6` to `today`.
fn weekly_energy(logs: &[HabitLog], today: Date) -> Vec<DayEnergy> {
    (0..WEEK_DAYS)
        .rev()
        .map(|back| {
            let day = today.saturating_sub(Duration::days(back));
            DayEnergy {
                day,
                valeur: latest_on(logs, day).map_or(0, |log| log.snapshot().energy_score()),
            }
        })
        .collect()
}

fn latest_on(logs: &[HabitLog], day: Date) -> Option<&HabitLog> {
    logs.iter()
        .filter(|log| log.day == day)
        .max_by_key(|log| log.created_at)
}

fn percentage(part: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    (part as f64 * 100.0 / total as f64).round() as u8
}
