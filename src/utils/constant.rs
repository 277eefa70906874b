//! # Application Constants
//!
//! Default values for tunables that are not required in the environment.

use std::time::Duration;

/// Default listen address of the HTTP server.
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8090";

/// Default hour (UTC) at which the daily recap is sent.
pub const DEFAULT_RECAP_HOUR_UTC: u8 = 19;

/// Default number of profession quests visible to unpaid users.
pub const DEFAULT_FREE_QUEST_LIMIT: usize = 3;

/// Maximum number of pooled Postgres connections.
pub const DB_MAX_CONNECTIONS: u32 = 10;

/// Lifetime of an admin bearer token minted from the command line.
pub const ADMIN_TOKEN_EXPIRY: Duration = Duration::from_secs(12 * 60 * 60);

/// Fallback shown when a profession has no progression ladder.
pub const DEFAULT_NEXT_OBJECTIVE: &str = "Complétez vos quêtes pour progresser";

/// Shown once the last tier has been credited.
pub const LADDER_COMPLETED_OBJECTIVE: &str = "Tous les niveaux sont complétés";
