mod common;

use serde_json::{Value, json};

use common::{FREE_QUEST_LIMIT, spawn_app};

#[tokio::test]
async fn registering_twice_returns_existing_user() {
    let app = spawn_app().await;

    let created = app.create_user("Camille@Hopital.fr", Some("infirmier")).await;
    assert_eq!(created["email"], "camille@hopital.fr");
    assert_eq!(created["profession_slug"], "infirmier");
    assert_eq!(created["has_paid"], false);
    assert_eq!(created["level_number"], 1);

    let response = app
        .client
        .post(app.url("/api/users"))
        .json(&json!({ "email": "camille@hopital.fr" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let existing: Value = response.json().await.unwrap();
    assert_eq!(existing["id"], created["id"]);
}

#[tokio::test]
async fn registration_with_profession_assigns_quests() {
    let app = spawn_app().await;
    let user = app.create_user("sam@hopital.fr", Some("infirmier")).await;
    let user_id = user["id"].as_str().unwrap();

    let quests: Value = app
        .client
        .get(app.url(&format!("/api/users/{user_id}/profession-quests")))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let quests = quests.as_array().unwrap();
    assert_eq!(quests.len(), 2);
    assert!(
        quests
            .iter()
            .any(|q| q["quest_id"] == "infirmier.hydratation-2l-au-service")
    );
    assert!(quests.iter().all(|q| q["status"] == "todo"));

    let progression = app
        .state
        .store
        .get_progression(user_id.parse::<uuid::Uuid>().unwrap(), "infirmier")
        .await
        .unwrap()
        .expect("progression should be initialized");
    assert_eq!(progression.niveau_actuel, 1);
    assert_eq!(progression.xp_total, 0);
}

#[tokio::test]
async fn invalid_registrations_are_rejected() {
    let app = spawn_app().await;

    let response = app
        .client
        .post(app.url("/api/users"))
        .json(&json!({ "email": "not-an-email" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 422);

    let response = app
        .client
        .post(app.url("/api/users"))
        .json(&json!({ "email": "ok@hopital.fr", "profession_slug": "plombier" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);

    let missing = app
        .state
        .store
        .find_user_by_email("ok@hopital.fr")
        .await
        .unwrap();
    assert!(missing.is_none());
}

#[tokio::test]
async fn changing_profession_keeps_previous_progression() {
    let app = spawn_app().await;
    let user = app.create_user("alex@hopital.fr", Some("infirmier")).await;
    let user_id = user["id"].as_str().unwrap();

    let done: Value = app
        .complete("infirmier.hydratation-2l-au-service", user_id)
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(done["awarded_xp"], 10);

    let response = app
        .client
        .put(app.url(&format!("/api/users/{user_id}/profession")))
        .json(&json!({ "profession_slug": "kine" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let changed: Value = response.json().await.unwrap();
    assert_eq!(changed["user"]["profession_slug"], "kine");
    assert_eq!(changed["assigned"], 2);

    let store = &app.state.store;
    let user_id: uuid::Uuid = user_id.parse().unwrap();
    let previous = store
        .get_progression(user_id, "infirmier")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(previous.xp_total, 10);
    let current = store.get_progression(user_id, "kine").await.unwrap().unwrap();
    assert_eq!(current.xp_total, 0);

    let response = app
        .client
        .put(app.url(&format!("/api/users/{user_id}/profession")))
        .json(&json!({ "profession_slug": "kine" }))
        .send()
        .await
        .unwrap();
    let again: Value = response.json().await.unwrap();
    assert_eq!(again["assigned"], 0);
}

#[tokio::test]
async fn unpaid_users_see_limited_quests() {
    let app = spawn_app().await;
    let quests: Vec<Value> = (1..=5)
        .map(|i| {
            json!({
                "title": format!("Quête {i}"),
                "description": "",
                "points_reward": 10,
                "type": "daily",
            })
        })
        .collect();
    let response = app
        .client
        .put(app.url("/api/admin/professions/medecin/quests"))
        .bearer_auth(app.admin_token())
        .json(&quests)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let user = app.create_user("doc@hopital.fr", Some("medecin")).await;
    let user_id = user["id"].as_str().unwrap();
    let url = app.url(&format!("/api/users/{user_id}/profession-quests"));

    let free: Value = app.client.get(&url).send().await.unwrap().json().await.unwrap();
    assert_eq!(free.as_array().unwrap().len(), FREE_QUEST_LIMIT);

    let response = app
        .client
        .put(app.url(&format!("/api/admin/users/{user_id}/premium")))
        .bearer_auth(app.admin_token())
        .json(&json!({ "has_paid": true }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let user: Value = response.json().await.unwrap();
    assert_eq!(user["has_paid"], true);

    let paid: Value = app.client.get(&url).send().await.unwrap().json().await.unwrap();
    assert_eq!(paid.as_array().unwrap().len(), 5);
}

#[tokio::test]
async fn unknown_user_is_not_found() {
    let app = spawn_app().await;
    let response = app
        .client
        .get(app.url(&format!("/api/users/{}", uuid::Uuid::new_v4())))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["detail"], "User not found");
}

#[tokio::test]
async fn malformed_input_returns_json_detail() {
    let app = spawn_app().await;

    let response = app
        .client
        .get(app.url("/api/users/not-a-uuid"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.unwrap();
    assert!(body["detail"].as_str().unwrap().contains("user_id"));

    let response = app.complete("infirmier.x", "not-a-uuid").await;
    assert_eq!(response.status(), 422);
    let body: Value = response.json().await.unwrap();
    assert!(body["detail"].is_string());

    let response = app
        .client
        .post(app.url("/api/users"))
        .body("{\"email\":")
        .header("content-type", "application/json")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.unwrap();
    assert!(body["detail"].is_string());

    let response = app
        .client
        .get(app.url("/api/professions/infirmier/progression?user_id=42"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.unwrap();
    assert!(body["detail"].is_string());
}
