mod common;

use serde_json::{Value, json};

use common::{TestApp, spawn_app};

async fn override_quests(app: &TestApp, slug: &str, quests: Value) {
    let response = app
        .client
        .put(app.url(&format!("/api/admin/professions/{slug}/quests")))
        .bearer_auth(app.admin_token())
        .json(&quests)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), 200);
}

fn quest(title: &str, points_reward: i32) -> Value {
    json!({
        "title": title,
        "description": format!("Quête {title}"),
        "points_reward": points_reward,
        "type": "daily",
    })
}

#[tokio::test]
async fn infirmier_scenario() {
    let app = spawn_app().await;
    override_quests(&app, "infirmier", json!([quest("A", 10), quest("B", 15)])).await;

    let user = app.create_user("lea@hopital.fr", None).await;
    let user_id = user["id"].as_str().unwrap();

    let assigned: Value = app
        .client
        .post(app.url(&format!(
            "/api/professions/infirmier/assign-quests/{user_id}"
        )))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(assigned["assigned"], 2);

    let response = app.complete("infirmier.a", user_id).await;
    assert_eq!(response.status(), 200);
    let a: Value = response.json().await.unwrap();
    assert_eq!(
        a,
        json!({ "awarded_xp": 10, "new_progression_xp": 10, "level_up": false })
    );

    let again: Value = app
        .complete("infirmier.a", user_id)
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(again["awarded_xp"], 0);
    assert_eq!(again["new_progression_xp"], 10);
    assert_eq!(again["level_up"], false);

    let b: Value = app
        .complete("infirmier.b", user_id)
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(
        b,
        json!({ "awarded_xp": 15, "new_progression_xp": 25, "level_up": false })
    );

    let status: Value = app
        .client
        .get(app.url(&format!(
            "/api/professions/infirmier/progression?user_id={user_id}"
        )))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(status["progression_niveau"], 1);
    assert_eq!(status["progression_xp"], 25);
}

#[tokio::test]
async fn crossing_hundred_xp_levels_up() {
    let app = spawn_app().await;
    override_quests(&app, "kine", json!([quest("Gros effort", 90), quest("Bonus", 20)])).await;

    let user = app.create_user("max@cabinet.fr", Some("kine")).await;
    let user_id = user["id"].as_str().unwrap();

    let first: Value = app
        .complete("kine.gros-effort", user_id)
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(first["new_progression_xp"], 90);
    assert_eq!(first["level_up"], false);

    let second: Value = app
        .complete("kine.bonus", user_id)
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(
        second,
        json!({ "awarded_xp": 20, "new_progression_xp": 10, "level_up": true })
    );

    let full: Value = app
        .client
        .get(app.url(&format!(
            "/api/professions/kine/progression/full?user_id={user_id}"
        )))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(full["progression_niveau"], 2);
    assert_eq!(full["progression_xp"], 10);
}

#[tokio::test]
async fn completing_unassigned_quest_is_not_found() {
    let app = spawn_app().await;
    let user = app.create_user("nobody@hopital.fr", None).await;
    let user_id = user["id"].as_str().unwrap();

    let response = app
        .complete("infirmier.hydratation-2l-au-service", user_id)
        .await;
    assert_eq!(response.status(), 404);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["detail"], "Quest not assigned");

    let response = app
        .client
        .post(app.url("/api/quests/infirmier.a/complete"))
        .json(&json!({ "user_id": user_id, "source": "catalog" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn catalog_quest_counts_once_per_day() {
    let app = spawn_app().await;

    let response = app
        .client
        .post(app.url("/api/admin/quests"))
        .bearer_auth(app.admin_token())
        .json(&json!({
            "title": "Marcher 20 minutes",
            "type": "daily",
            "points_reward": 60,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 201);
    let quest: Value = response.json().await.unwrap();
    let quest_id = quest["id"].as_str().unwrap();

    let listed: Value = app
        .client
        .get(app.url("/api/quests"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(listed.as_array().unwrap().len(), 1);

    let user = app.create_user("walk@hopital.fr", None).await;
    let user_id = user["id"].as_str().unwrap();

    let first: Value = app.complete(quest_id, user_id).await.json().await.unwrap();
    assert_eq!(
        first,
        json!({ "awarded_xp": 60, "new_progression_xp": 60, "level_up": false })
    );

    let second: Value = app.complete(quest_id, user_id).await.json().await.unwrap();
    assert_eq!(second["awarded_xp"], 0);
    assert_eq!(second["new_progression_xp"], 60);

    let user: Value = app
        .client
        .get(app.url(&format!("/api/users/{user_id}")))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(user["xp_total"], 60);
    assert_eq!(user["level_number"], 1);
}
