//! # Énergie - Wellness Quest Backend
//!
//! Healthcare workers pick a profession, receive profession-specific quests,
//! earn XP by completing them and climb a 5-tier progression ladder. Daily
//! habit logs can complete tiers on their own.
//!
//! ## Modules
//!
//! - [`cli`] - Command line arguments
//! - [`config`] - Environment configuration
//! - [`extract`] - Request extractors with JSON rejections
//! - [`handlers`] - HTTP request handlers for various endpoints
//! - [`middleware`] - Admin authentication
//! - [`models`] - Domain types and the shared application state
//! - [`services`] - Business logic (catalog, progression, quests, recap, email, JWT)
//! - [`store`] - Persistence behind the `Store` trait
//! - [`utils`] - Utility functions and constants

pub mod cli;
pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod store;
pub mod utils;

use std::sync::Arc;

use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{get, post, put},
};
use tower_http::trace::TraceLayer;

use crate::handlers::*;
use crate::middleware::admin_middleware;
use crate::models::AppState;

/// Creates the Axum router with every application route.
pub fn app(state: Arc<AppState>) -> Router {
    let admin_routes = Router::new()
        .route("/api/admin/professions", post(create_profession))
        .route("/api/admin/professions/{slug}", put(update_profession))
        .route(
            "/api/admin/professions/{slug}/quests",
            put(set_quest_override).delete(clear_quest_override),
        )
        .route("/api/admin/quests", post(create_quest))
        .route(
            "/api/admin/users/{user_id}/assign-quests",
            post(assign_user_quests),
        )
        .route("/api/admin/users/{user_id}/premium", put(set_premium))
        .route("/api/admin/recap/run", post(run_recap))
        .route_layer(from_fn_with_state(Arc::clone(&state), admin_middleware));

    let public_routes = Router::new()
        .route("/health-check", get(health_check))
        .route("/api/professions", get(list_professions))
        .route("/api/professions/{slug}", get(get_profession))
        .route("/api/professions/{slug}/tiers", get(get_tiers))
        .route("/api/professions/{slug}/progression", get(get_progression))
        .route(
            "/api/professions/{slug}/progression/full",
            get(get_full_progression),
        )
        .route("/api/professions/{slug}/quests", get(get_profession_quests))
        .route(
            "/api/professions/{slug}/assign-quests/{user_id}",
            post(assign_quests),
        )
        .route("/api/quests", get(list_quests))
        .route("/api/quests/{quest_id}/complete", post(complete_quest))
        .route("/api/users", post(create_user))
        .route("/api/users/{user_id}", get(get_user))
        .route("/api/users/{user_id}/profession", put(change_profession))
        .route(
            "/api/users/{user_id}/profession-quests",
            get(list_profession_quests),
        )
        .route("/api/users/{user_id}/habits", post(log_habits))
        .route("/api/user-quests/today", get(get_today_quests))
        .route("/api/dashboard/stats", get(get_dashboard_stats));

    Router::new()
        .merge(public_routes)
        .merge(admin_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
