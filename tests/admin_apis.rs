mod common;

use serde_json::{Value, json};

use common::spawn_app;

fn new_profession(slug: &str) -> Value {
    json!({
        "slug": slug,
        "label": "Pharmacien·ne",
        "icon": "💊",
        "order_index": 16,
        "recommended_quests": [
            { "title": "Boire 1,5L", "description": "", "points_reward": 10, "type": "daily" }
        ],
    })
}

#[tokio::test]
async fn admin_routes_require_a_valid_token() {
    let app = spawn_app().await;
    let url = app.url("/api/admin/professions");

    let response = app
        .client
        .post(&url)
        .json(&new_profession("pharma"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 401);

    let response = app
        .client
        .post(&url)
        .bearer_auth("not-a-token")
        .json(&new_profession("pharma"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 401);

    let response = app
        .client
        .post(&url)
        .bearer_auth(app.token_for("nurse@hopital.fr"))
        .json(&new_profession("pharma"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 403);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["detail"], "Admin access required");

    assert!(
        app.state
            .store
            .get_profession("pharma")
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn create_profession_and_reject_duplicate_slug() {
    let app = spawn_app().await;
    let url = app.url("/api/admin/professions");

    let response = app
        .client
        .post(&url)
        .bearer_auth(app.admin_token())
        .json(&new_profession("pharma"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 201);
    let created: Value = response.json().await.unwrap();
    assert_eq!(created["is_active"], true);

    let listed: Value = app
        .client
        .get(app.url("/api/professions"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(listed.as_array().unwrap().last().unwrap()["slug"], "pharma");

    let response = app
        .client
        .post(&url)
        .bearer_auth(app.admin_token())
        .json(&new_profession("pharma"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 409);

    let response = app
        .client
        .post(&url)
        .bearer_auth(app.admin_token())
        .json(&new_profession("Pas Un Slug"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 422);
}

#[tokio::test]
async fn quest_override_can_be_set_and_cleared() {
    let app = spawn_app().await;
    let url = app.url("/api/admin/professions/psy/quests");
    let quests_url = app.url("/api/professions/psy/quests");

    let original: Value = app
        .client
        .get(&quests_url)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let response = app
        .client
        .put(&url)
        .bearer_auth(app.admin_token())
        .json(&json!([
            { "title": "Journal de gratitude", "description": "", "points_reward": 20, "type": "daily" }
        ]))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let overridden: Value = app
        .client
        .get(&quests_url)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(overridden.as_array().unwrap().len(), 1);
    assert_eq!(overridden[0]["title"], "Journal de gratitude");

    let response = app
        .client
        .put(&url)
        .bearer_auth(app.admin_token())
        .json(&json!([]))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);

    let response = app
        .client
        .delete(&url)
        .bearer_auth(app.admin_token())
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let restored: Value = app
        .client
        .get(&quests_url)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(restored, original);
}

#[tokio::test]
async fn admin_assigns_quests_of_current_profession() {
    let app = spawn_app().await;

    let user = app.create_user("nopro@hopital.fr", None).await;
    let user_id = user["id"].as_str().unwrap();
    let response = app
        .client
        .post(app.url(&format!("/api/admin/users/{user_id}/assign-quests")))
        .bearer_auth(app.admin_token())
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);

    let user = app.create_user("ergo@hopital.fr", Some("ergo")).await;
    let user_id = user["id"].as_str().unwrap();
    let url = app.url(&format!("/api/admin/users/{user_id}/assign-quests"));

    let idempotent: Value = app
        .client
        .post(&url)
        .bearer_auth(app.admin_token())
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(idempotent["assigned"], 0);

    let forced: Value = app
        .client
        .post(format!("{url}?idempotent=false"))
        .bearer_auth(app.admin_token())
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(forced["assigned"], 2);
}

#[tokio::test]
async fn recap_run_emails_opted_in_users() {
    let app = spawn_app().await;
    app.create_user("recap@hopital.fr", Some("sage_femme")).await;

    let response = app
        .client
        .post(app.url("/api/users"))
        .json(&json!({ "email": "quiet@hopital.fr", "recap_opt_in": false }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 201);

    let response = app
        .client
        .post(app.url("/api/admin/recap/run"))
        .bearer_auth(app.admin_token())
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let run: Value = response.json().await.unwrap();
    assert_eq!(run, json!({ "sent": 1, "failed": 0 }));

    let sent = app.emailer.get_sent_emails();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].recipient, "recap@hopital.fr");
    assert!(sent[0].body_html.contains("Sage-femme"));
    assert!(sent[0].body_html.contains("Niveau 1 / 5"));
}

#[tokio::test]
async fn premium_for_unknown_user_is_not_found() {
    let app = spawn_app().await;
    let response = app
        .client
        .put(app.url(&format!(
            "/api/admin/users/{}/premium",
            uuid::Uuid::new_v4()
        )))
        .bearer_auth(app.admin_token())
        .json(&json!({ "has_paid": true }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);
}
