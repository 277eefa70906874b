//! Store tests against a live Postgres. Run with `DATABASE_URL` set and
//! `cargo test -- --ignored`.

use energie::error::AppError;
use energie::models::{CreateUserRequest, HabitLog, HabitLogRequest, QuestSource, User};
use energie::services::{
    assignment::AssignmentService,
    catalog::{CatalogService, SeedCatalog, SeedOutcome},
    completion::CompletionService,
    progression::ProgressionService,
};
use energie::store::{PgStore, Store, StoreError};
use sqlx::PgPool;

async fn seeded_store(pool: PgPool) -> PgStore {
    let store = PgStore::from_pool(pool);
    let catalog = SeedCatalog::embedded().unwrap();
    let outcome = CatalogService::seed(&store, &catalog).await.unwrap();
    assert!(matches!(outcome, SeedOutcome::Seeded { professions: 15, .. }));
    store
}

async fn insert_user(store: &PgStore, email: &str) -> User {
    let user = User::new(&CreateUserRequest {
        email: email.to_string(),
        name: None,
        profession_slug: None,
        recap_opt_in: true,
    });
    store.insert_user(&user).await.unwrap();
    user
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn seeding_twice_is_a_no_op(pool: PgPool) {
    let store = seeded_store(pool).await;
    let catalog = SeedCatalog::embedded().unwrap();

    let outcome = CatalogService::seed(&store, &catalog).await.unwrap();
    assert!(matches!(outcome, SeedOutcome::AlreadySeeded));
    assert_eq!(store.count_professions().await.unwrap(), 15);
    assert_eq!(store.count_tiers().await.unwrap(), 75);

    let active = store.list_professions(true).await.unwrap();
    assert_eq!(active[0].slug, "infirmier");
    assert_eq!(active[0].recommended_quests.len(), 2);
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn duplicate_keys_are_reported(pool: PgPool) {
    let store = seeded_store(pool).await;

    let infirmier = store.get_profession("infirmier").await.unwrap().unwrap();
    let err = store.insert_profession(&infirmier).await.unwrap_err();
    assert!(matches!(err, StoreError::Duplicate(_)));

    let user = insert_user(&store, "dup@hopital.fr").await;
    let mut twin = user.clone();
    twin.id = uuid::Uuid::new_v4();
    let err = store.insert_user(&twin).await.unwrap_err();
    assert!(matches!(err, StoreError::Duplicate(_)));
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn profession_quest_completes_once(pool: PgPool) {
    let store = seeded_store(pool).await;
    let user = insert_user(&store, "iris@hopital.fr").await;
    let infirmier = store.get_profession("infirmier").await.unwrap().unwrap();

    let assigned = AssignmentService::assign(&store, &infirmier, user.id, true)
        .await
        .unwrap();
    assert_eq!(assigned, 2);
    let assigned = AssignmentService::assign(&store, &infirmier, user.id, true)
        .await
        .unwrap();
    assert_eq!(assigned, 0);

    let quest_id = "infirmier.hydratation-2l-au-service";
    let first = CompletionService::complete(&store, quest_id, user.id, None)
        .await
        .unwrap();
    assert_eq!(first.awarded_xp, 10);
    assert_eq!(first.new_progression_xp, 10);

    let again = CompletionService::complete(&store, quest_id, user.id, None)
        .await
        .unwrap();
    assert_eq!(again.awarded_xp, 0);
    assert_eq!(again.new_progression_xp, 10);

    let err = CompletionService::complete(
        &store,
        "infirmier.inconnue",
        user.id,
        Some(QuestSource::Profession),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::NotFound("Quest not assigned")));
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn progression_increments_are_atomic(pool: PgPool) {
    let store = seeded_store(pool).await;
    let user = insert_user(&store, "kine@cabinet.fr").await;
    ProgressionService::initialize(&store, user.id, "kine")
        .await
        .unwrap();

    let tasks: Vec<_> = (0..10)
        .map(|_| {
            let store = store.clone();
            tokio::spawn(async move {
                store
                    .increment_progression_xp(user.id, "kine", 15)
                    .await
                    .unwrap()
            })
        })
        .collect();
    for task in tasks {
        task.await.unwrap();
    }

    let progression = store
        .get_progression(user.id, "kine")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(progression.xp_total, 150);
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn habit_logs_are_listed_by_day_range(pool: PgPool) {
    let store = seeded_store(pool).await;
    let user = insert_user(&store, "week@hopital.fr").await;

    let today = time::OffsetDateTime::now_utc().date();
    for back in [0, 2, 9] {
        let mut log = HabitLog::from_request(
            user.id,
            serde_json::from_value::<HabitLogRequest>(serde_json::json!({ "water_ml": 1000 }))
                .unwrap(),
        );
        log.day = today - time::Duration::days(back);
        store.insert_habit_log(&log).await.unwrap();
    }

    let week = store
        .list_habit_logs(user.id, today - time::Duration::days(6), today)
        .await
        .unwrap();
    let days: Vec<_> = week.iter().map(|log| log.day).collect();
    assert_eq!(days, vec![today - time::Duration::days(2), today]);
}
