use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::config::Config;
use crate::services::{
    email::{EmailService, ExternalEmailer, LogEmailer},
    jwt::JwtService,
};
use crate::store::Store;

/// Application state shared across requests and background tasks.
pub struct AppState {
    pub config: Config,
    /// Persistence backend, Postgres or in-memory.
    pub store: Arc<dyn Store>,
    /// The email service used for daily recaps.
    pub email_service: Arc<dyn EmailService>,
    /// Signs and validates admin bearer tokens.
    pub jwt_service: JwtService,
    shutdown: CancellationToken,
}

impl AppState {
    /// Builds the application state.
    ///
    /// Without an explicit `email_service`, production configuration (mail
    /// credentials present) selects [`ExternalEmailer`], anything else
    /// [`LogEmailer`].
    pub fn init(
        config: Config,
        store: Arc<dyn Store>,
        email_service: Option<Arc<dyn EmailService>>,
    ) -> Self {
        info!("Initializing application state");

        let email_service: Arc<dyn EmailService> = match (email_service, &config.mail) {
            (Some(service), _) => service,
            (None, Some(mail)) => {
                info!("Running in production mode with [ExternalEmailer]");
                Arc::new(ExternalEmailer::new(mail))
            }
            (None, None) => {
                info!("Running in development mode with [LogEmailer]");
                Arc::new(LogEmailer)
            }
        };

        debug!(
            admins = config.admin_emails.len(),
            free_quest_limit = config.free_quest_limit,
            recap_hour_utc = config.recap_hour_utc,
            "Loaded configuration"
        );

        Self {
            jwt_service: JwtService::new(&config.jwt_secret),
            config,
            store,
            email_service,
            shutdown: CancellationToken::new(),
        }
    }

    /// Token cancelled by [`AppState::shutdown`], for background tasks.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.child_token()
    }

    /// Stops every background task spawned with a token from this state.
    pub fn shutdown(&self) {
        info!("Shutting down background tasks");
        self.shutdown.cancel();
    }
}
