//! # Daily Recap
//!
//! Once a day, at `RECAP_HOUR_UTC`, every user who opted in receives an email
//! summarizing their level, XP, profession tier, quests completed today and
//! today's energy score.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use time::{OffsetDateTime, Time};
use tracing::{error, info, instrument, warn};

use crate::error::AppResult;
use crate::models::{AppState, User};
use crate::services::email::EmailService;
use crate::store::Store;
use crate::utils::html::generate_recap_email_html;

const RECAP_SUBJECT: &str = "Votre récap Énergie du jour";

/// Figures shown in one user's recap.
#[derive(Debug, Clone)]
pub struct DailyRecap {
    pub email: String,
    pub name: Option<String>,
    pub level_number: i32,
    pub xp_total: i64,
    /// Label and current tier of the user's profession.
    pub profession: Option<(String, i32)>,
    pub quests_done: u64,
    pub energy_score: Option<u8>,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RecapRun {
    pub sent: usize,
    pub failed: usize,
}

pub struct RecapService;

impl RecapService {
    /// Collects the recap of `user` for the UTC day of `now`.
    pub async fn build(
        store: &dyn Store,
        user: &User,
        now: OffsetDateTime,
    ) -> AppResult<DailyRecap> {
        let today = now.date();

        let profession = match &user.profession_slug {
            Some(slug) => {
                let label = store.get_profession(slug).await?.map(|p| p.label);
                let niveau = store
                    .get_progression(user.id, slug)
                    .await?
                    .map_or(1, |p| p.niveau_actuel);
                label.map(|label| (label, niveau))
            }
            None => None,
        };

        let energy_score = store
            .latest_habit_log(user.id, today)
            .await?
            .map(|log| log.snapshot().energy_score());

        Ok(DailyRecap {
            email: user.email.clone(),
            name: user.name.clone(),
            level_number: user.level_number,
            xp_total: user.xp_total,
            profession,
            quests_done: store.count_quests_completed_on(user.id, today).await?,
            energy_score,
        })
    }

    /// Sends the recap to every opted-in user. A failure for one user is
    /// logged and counted, and does not stop the run.
    #[instrument(skip_all, err)]
    pub async fn send_daily_recaps(
        store: &dyn Store,
        email_service: &dyn EmailService,
    ) -> AppResult<RecapRun> {
        let now = OffsetDateTime::now_utc();
        let mut run = RecapRun::default();

        for user in store.list_users().await? {
            if !user.recap_opt_in {
                continue;
            }

            let sent = match Self::build(store, &user, now).await {
                Ok(recap) => email_service
                    .send_email(&recap.email, RECAP_SUBJECT, &generate_recap_email_html(&recap))
                    .await
                    .map_err(|e| e.to_string()),
                Err(e) => Err(e.to_string()),
            };

            match sent {
                Ok(()) => run.sent += 1,
                Err(e) => {
                    warn!(user_id = %user.id, error = %e, "Failed to send recap");
                    run.failed += 1;
                }
            }
        }

        info!(sent = run.sent, failed = run.failed, "Daily recap run finished");
        Ok(run)
    }

    /// Spawns the daily recap loop. Runs never overlap: the next sleep only
    /// starts once the previous run returned. The loop exits on
    /// [`AppState::shutdown`].
    pub fn spawn_scheduler_task(state: Arc<AppState>) {
        let hour = state.config.recap_hour_utc;
        let shutdown = state.shutdown_token();
        tokio::spawn(async move {
            loop {
                let wait = until_next_run(OffsetDateTime::now_utc(), hour);
                info!(hour, wait_secs = wait.as_secs(), "Next daily recap scheduled");

                tokio::select! {
                    _ = shutdown.cancelled() => {
                        info!("Recap scheduler stopped");
                        return;
                    }
                    _ = tokio::time::sleep(wait) => {}
                }

                if let Err(e) =
                    Self::send_daily_recaps(state.store.as_ref(), state.email_service.as_ref())
                        .await
                {
                    error!(error = %e, "Daily recap run failed");
                }
            }
        });
    }
}

/// Time left until the next occurrence of `hour`:00 UTC, strictly after `now`.
fn until_next_run(now: OffsetDateTime, hour: u8) -> Duration {
    let Ok(at) = Time::from_hms(hour, 0, 0) else {
        return Duration::from_secs(24 * 60 * 60);
    };

    let mut next = now.replace_time(at);
    if next <= now {
        next += time::Duration::days(1);
    }
    (next - now).try_into().unwrap_or(Duration::ZERO)
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use time::macros::datetime;

    use super::*;
    use crate::models::{CreateUserRequest, HabitLog, HabitLogRequest};
    use crate::services::email::EmailError;
    use crate::store::MemoryStore;

    #[derive(Default)]
    struct RecordingEmailer {
        sent: Mutex<Vec<String>>,
        fail_for: Option<String>,
    }

    #[async_trait]
    impl EmailService for RecordingEmailer {
        async fn send_email(&self, recipient: &str, _: &str, _: &str) -> Result<(), EmailError> {
            if self.fail_for.as_deref() == Some(recipient) {
                return Err(EmailError::SendFailed("rejected".into()));
            }
            self.sent.lock().unwrap().push(recipient.to_string());
            Ok(())
        }
    }

    fn user(email: &str, recap_opt_in: bool) -> User {
        User::new(&CreateUserRequest {
            email: email.into(),
            name: None,
            profession_slug: None,
            recap_opt_in,
        })
    }

    #[test]
    fn next_run_is_later_today_or_tomorrow() {
        let now = datetime!(2025-03-10 08:30 UTC);
        assert_eq!(until_next_run(now, 19), Duration::from_secs(10 * 3600 + 1800));

        let now = datetime!(2025-03-10 19:00 UTC);
        assert_eq!(until_next_run(now, 19), Duration::from_secs(24 * 3600));

        let now = datetime!(2025-03-10 20:15 UTC);
        assert_eq!(until_next_run(now, 19), Duration::from_secs(22 * 3600 + 45 * 60));
    }

    #[tokio::test]
    async fn only_opted_in_users_receive_recap() {
        let store = MemoryStore::new();
        store.insert_user(&user("a@energie.fr", true)).await.unwrap();
        store.insert_user(&user("b@energie.fr", false)).await.unwrap();
        let emailer = RecordingEmailer::default();

        let run = RecapService::send_daily_recaps(&store, &emailer).await.unwrap();
        assert_eq!(run, RecapRun { sent: 1, failed: 0 });
        assert_eq!(*emailer.sent.lock().unwrap(), vec!["a@energie.fr"]);
    }

    #[tokio::test]
    async fn one_failure_does_not_stop_the_run() {
        let store = MemoryStore::new();
        store.insert_user(&user("a@energie.fr", true)).await.unwrap();
        store.insert_user(&user("b@energie.fr", true)).await.unwrap();
        let emailer = RecordingEmailer {
            fail_for: Some("a@energie.fr".into()),
            ..Default::default()
        };

        let run = RecapService::send_daily_recaps(&store, &emailer).await.unwrap();
        assert_eq!(run, RecapRun { sent: 1, failed: 1 });
    }

    #[tokio::test]
    async fn recap_includes_todays_energy_score() {
        let store = MemoryStore::new();
        let user = user("a@energie.fr", true);
        store.insert_user(&user).await.unwrap();

        let log = HabitLog::from_request(
            user.id,
            HabitLogRequest {
                water_ml: 2000.0,
                sleep_h: 8.0,
                nutrition_score: 100,
                activity_min: 30.0,
                serenity_min: 10.0,
                mood: 5,
                stress: 5,
                notes: None,
            },
        );
        store.insert_habit_log(&log).await.unwrap();

        let recap = RecapService::build(&store, &user, OffsetDateTime::now_utc())
            .await
            .unwrap();
        assert_eq!(recap.energy_score, Some(100));
        assert_eq!(recap.quests_done, 0);
        assert!(recap.profession.is_none());
    }
}
