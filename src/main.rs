use std::error::Error;
use std::sync::Arc;

use clap::Parser;
use energie::app;
use energie::cli::{Cli, Command};
use energie::config::Config;
use energie::models::AppState;
use energie::services::{
    catalog::{CatalogService, SeedCatalog},
    jwt::JwtService,
    recap::RecapService,
};
use energie::store::{MemoryStore, PgStore, Store};
use energie::utils::constant::ADMIN_TOKEN_EXPIRY;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_bunyan_formatter::{BunyanFormattingLayer, JsonStorageLayer};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "energie=info,tower_http=info".into()),
        )
        .with(JsonStorageLayer)
        .with(BunyanFormattingLayer::new("energie".into(), std::io::stdout))
        .init();

    let config = Config::from_env()?;

    if let Some(Command::AdminToken { email }) = cli.command {
        return print_admin_token(&config, &email);
    }

    let store: Arc<dyn Store> = match &config.database_url {
        Some(url) => Arc::new(PgStore::connect(url).await?),
        None => {
            warn!("DATABASE_URL is not set, data will not survive a restart");
            Arc::new(MemoryStore::new())
        }
    };

    let catalog = SeedCatalog::embedded()?;
    let outcome = CatalogService::seed(store.as_ref(), &catalog).await?;
    info!(?outcome, "Catalog ready");

    let bind_addr = config.bind_addr.clone();
    let state = Arc::new(AppState::init(config, store, None));
    RecapService::spawn_scheduler_task(Arc::clone(&state));

    let listener = TcpListener::bind(&bind_addr).await?;
    info!(%bind_addr, "Server starting");

    axum::serve(listener, app(Arc::clone(&state)).into_make_service())
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "Failed to listen for Ctrl-C");
                std::future::pending::<()>().await;
            }
            info!("Shutdown signal received");
        })
        .await?;

    state.shutdown();
    Ok(())
}

fn print_admin_token(config: &Config, email: &str) -> Result<(), Box<dyn Error>> {
    if !config.is_admin(email) {
        warn!(%email, "Email is not in ADMIN_EMAILS, the token will be rejected");
    }
    let token = JwtService::new(&config.jwt_secret).issue(email, ADMIN_TOKEN_EXPIRY)?;
    println!("{token}");
    Ok(())
}
