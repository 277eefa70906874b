//! # Configuration
//!
//! Typed view of the environment variables the application reads at startup.
//! Everything is read once by [`Config::from_env`]; nothing else in the crate
//! touches `std::env`.

use std::env;

use thiserror::Error;

use crate::utils::constant::*;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("env variable `{0}` should be set")]
    Missing(&'static str),
    #[error("env variable `{0}` is invalid: {1}")]
    Invalid(&'static str, String),
}

/// Credentials of the transactional email API.
#[derive(Debug, Clone)]
pub struct MailConfig {
    pub api_url: String,
    pub api_key: String,
    pub sender_email: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    /// Postgres DSN. `None` selects the in-memory store.
    pub database_url: Option<String>,
    pub jwt_secret: String,
    /// Lowercased emails allowed on the admin surface.
    pub admin_emails: Vec<String>,
    /// Set in production only; development logs emails instead.
    pub mail: Option<MailConfig>,
    pub recap_hour_utc: u8,
    pub free_quest_limit: usize,
}

impl Config {
    /// Reads the configuration from the process environment.
    ///
    /// # Environment Variables
    ///
    /// - `APP_ENV` - "production" requires `MAIL_API_URL`, `MAIL_API_KEY` and `SENDER_EMAIL`
    /// - `JWT_SECRET` - Required, signs admin bearer tokens
    /// - `ADMIN_EMAILS` - Colon-separated admin allow-list
    /// - `DATABASE_URL`, `BIND_ADDR`, `RECAP_HOUR_UTC`, `FREE_QUEST_LIMIT` - Optional
    pub fn from_env() -> Result<Self, ConfigError> {
        let app_env = env::var("APP_ENV")
            .unwrap_or_else(|_| "development".to_string())
            .to_ascii_lowercase();

        let mail = if app_env == "production" {
            Some(MailConfig {
                api_url: required("MAIL_API_URL")?,
                api_key: required("MAIL_API_KEY")?,
                sender_email: required("SENDER_EMAIL")?,
            })
        } else {
            None
        };

        let recap_hour_utc = parsed("RECAP_HOUR_UTC", DEFAULT_RECAP_HOUR_UTC)?;
        if recap_hour_utc > 23 {
            return Err(ConfigError::Invalid(
                "RECAP_HOUR_UTC",
                format!("{recap_hour_utc} is not an hour"),
            ));
        }

        Ok(Self {
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string()),
            database_url: env::var("DATABASE_URL").ok().filter(|url| !url.is_empty()),
            jwt_secret: required("JWT_SECRET")?,
            admin_emails: parse_admin_emails(&env::var("ADMIN_EMAILS").unwrap_or_default()),
            mail,
            recap_hour_utc,
            free_quest_limit: parsed("FREE_QUEST_LIMIT", DEFAULT_FREE_QUEST_LIMIT)?,
        })
    }

    #[inline]
    pub fn is_admin(&self, email: &str) -> bool {
        let email = email.to_ascii_lowercase();
        self.admin_emails.iter().any(|admin| *admin == email)
    }
}

fn required(key: &'static str) -> Result<String, ConfigError> {
    env::var(key).map_err(|_| ConfigError::Missing(key))
}

fn parsed<T>(key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e: T::Err| ConfigError::Invalid(key, e.to_string())),
        Err(_) => Ok(default),
    }
}

/// Splits a colon-separated allow-list, dropping blanks.
pub fn parse_admin_emails(raw: &str) -> Vec<String> {
    raw.split(':')
        .map(str::trim)
        .filter(|email| !email.is_empty())
        .map(str::to_ascii_lowercase)
        .collect()
}
