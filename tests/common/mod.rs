#![allow(dead_code)]

use std::sync::{Arc, Mutex, Once};
use std::time::Duration;

use async_trait::async_trait;
use energie::{
    config::{Config, parse_admin_emails},
    models::AppState,
    services::{
        catalog::{CatalogService, SeedCatalog},
        email::{EmailError, EmailService},
    },
    store::{MemoryStore, Store},
};
use serde_json::{Value, json};
use tokio::net::TcpListener;

pub const ADMIN_EMAIL: &str = "admin@energie.fr";
pub const FREE_QUEST_LIMIT: usize = 3;

pub fn init_tracing_once() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter("energie=debug")
            .with_test_writer()
            .init();
    });
}

/// A mock email service that stores sent emails for testing purposes.
#[derive(Debug, Default)]
pub struct MockEmailer {
    sent_emails: Mutex<Vec<SentEmail>>,
}

#[derive(Debug, Clone)]
pub struct SentEmail {
    pub recipient: String,
    pub subject: String,
    pub body_html: String,
}

impl MockEmailer {
    pub fn get_sent_emails(&self) -> Vec<SentEmail> {
        self.sent_emails.lock().unwrap().clone()
    }

    pub fn sent_count(&self) -> usize {
        self.sent_emails.lock().unwrap().len()
    }
}

#[async_trait]
impl EmailService for MockEmailer {
    async fn send_email(
        &self,
        recipient: &str,
        subject: &str,
        body_html: &str,
    ) -> Result<(), EmailError> {
        self.sent_emails.lock().unwrap().push(SentEmail {
            recipient: recipient.to_string(),
            subject: subject.to_string(),
            body_html: body_html.to_string(),
        });
        Ok(())
    }
}

pub struct TestApp {
    /// Format: `http://127.0.0.1:8492`
    pub address: String,
    pub client: reqwest::Client,
    pub emailer: Arc<MockEmailer>,
    pub state: Arc<AppState>,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.address)
    }

    /// Bearer token for an email on the admin allow-list.
    pub fn admin_token(&self) -> String {
        self.token_for(ADMIN_EMAIL)
    }

    pub fn token_for(&self, email: &str) -> String {
        self.state
            .jwt_service
            .issue(email, Duration::from_secs(600))
            .unwrap()
    }

    /// Creates a user through the API and returns the response body.
    pub async fn create_user(&self, email: &str, profession_slug: Option<&str>) -> Value {
        let response = self
            .client
            .post(self.url("/api/users"))
            .json(&json!({ "email": email, "profession_slug": profession_slug }))
            .send()
            .await
            .expect("Failed to execute request");
        assert_eq!(response.status(), 201);
        response.json().await.unwrap()
    }

    pub async fn complete(&self, quest_id: &str, user_id: &str) -> reqwest::Response {
        self.client
            .post(self.url(&format!("/api/quests/{quest_id}/complete")))
            .json(&json!({ "user_id": user_id }))
            .send()
            .await
            .expect("Failed to execute request")
    }
}

fn test_config() -> Config {
    Config {
        bind_addr: "127.0.0.1:0".to_string(),
        database_url: None,
        jwt_secret: "test-jwt-secret".to_string(),
        admin_emails: parse_admin_emails(ADMIN_EMAIL),
        mail: None,
        recap_hour_utc: 19,
        free_quest_limit: FREE_QUEST_LIMIT,
    }
}

/// Spawns the application on a random port, backed by a seeded in-memory store.
pub async fn spawn_app() -> TestApp {
    init_tracing_once();

    let store = Arc::new(MemoryStore::new());
    let catalog = SeedCatalog::embedded().expect("embedded catalog should parse");
    CatalogService::seed(store.as_ref(), &catalog)
        .await
        .expect("Failed to seed catalog");

    let emailer = Arc::new(MockEmailer::default());
    let store: Arc<dyn Store> = store;
    let state = Arc::new(AppState::init(
        test_config(),
        store,
        Some(Arc::clone(&emailer) as Arc<dyn EmailService>),
    ));

    // Randomly choose an available port
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port at localhost");
    let port = listener.local_addr().unwrap().port();

    let router = energie::app(Arc::clone(&state));
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    let address = format!("http://127.0.0.1:{port}");

    // Wait for server to be ready
    let client = reqwest::Client::new();
    for _ in 0..10 {
        if client
            .get(format!("{address}/health-check"))
            .send()
            .await
            .is_ok()
        {
            break;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }

    TestApp {
        address,
        client,
        emailer,
        state,
    }
}
