//! # Business Logic Services
//!
//! Services are stateless: every operation takes the [`Store`](crate::store::Store)
//! it works on, so handlers, background tasks and tests share the same code.
//!
//! ## Available Services
//!
//! - **Catalog** (`catalog`) - Professions, progression ladders and seeding
//! - **Progression** (`progression`) - Per-profession XP and tier state machine
//! - **Assignment** (`assignment`) - Materializing profession quests for a user
//! - **Completion** (`completion`) - Completing quests and crediting XP
//! - **Dashboard** (`dashboard`) - Today's quest board and weekly energy
//! - **Recap** (`recap`) - Daily recap emails and their scheduler
//! - **Email** (`email`) - Email delivery with multiple implementations
//! - **JWT** (`jwt`) - Admin bearer token creation and validation

pub mod assignment;
pub mod catalog;
pub mod completion;
pub mod dashboard;
pub mod email;
pub mod jwt;
pub mod progression;
pub mod recap;
