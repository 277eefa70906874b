use std::collections::HashSet;

use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::{Profession, UserProfessionQuest};
use crate::store::Store;

pub struct AssignmentService;

impl AssignmentService {
    /// Materializes the quests of `profession` for a user.
    ///
    /// On the idempotent path a quest whose id the user already holds is
    /// skipped, so calling twice inserts nothing the second time. Otherwise
    /// every quest is inserted again. Returns the number of records inserted.
    /// A failure midway leaves the records inserted so far in place.
    #[instrument(skip(store, profession), fields(slug = %profession.slug), err)]
    pub async fn assign(
        store: &dyn Store,
        profession: &Profession,
        user_id: Uuid,
        idempotent: bool,
    ) -> AppResult<usize> {
        let mut held: HashSet<String> = if idempotent {
            store
                .list_profession_quests(user_id, &profession.slug)
                .await?
                .into_iter()
                .map(|q| q.quest_id)
                .collect()
        } else {
            HashSet::new()
        };

        let mut assigned = 0;
        for quest in profession.quests() {
            let record = UserProfessionQuest::assign(user_id, &profession.slug, quest);
            if held.contains(&record.quest_id) {
                debug!(quest_id = %record.quest_id, "Quest already assigned");
                continue;
            }
            store.insert_profession_quest(&record).await?;
            if idempotent {
                held.insert(record.quest_id);
            }
            assigned += 1;
        }

        info!(assigned, idempotent, "Profession quests assigned");
        Ok(assigned)
    }

    /// Profession quests of a user, oldest first. Unpaid users only see the
    /// first `free_limit` records.
    pub async fn visible_quests(
        store: &dyn Store,
        user_id: Uuid,
        profession_slug: &str,
        has_paid: bool,
        free_limit: usize,
    ) -> AppResult<Vec<UserProfessionQuest>> {
        let mut quests = store
            .list_profession_quests(user_id, profession_slug)
            .await?;
        if !has_paid {
            quests.truncate(free_limit);
        }
        Ok(quests)
    }
}
