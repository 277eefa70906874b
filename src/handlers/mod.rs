//! # HTTP Request Handlers
//!
//! ## Available Handlers
//!
//! - **Health Check** (`health_check`) - Application health monitoring
//! - **Professions** (`profession`) - Catalog, progression status and quest assignment
//! - **Quests** (`quest`) - Catalog quests and quest completion
//! - **Users** (`user`) - Accounts, profession selection and profession quests
//! - **Habits** (`habit`) - Daily habit logs
//! - **Dashboard** (`dashboard`) - Today's quest board and weekly energy
//! - **Admin** (`admin`) - Catalog maintenance and user administration

mod admin;
mod dashboard;
mod habit;
mod health_check;
mod profession;
mod quest;
mod user;

pub use admin::*;
pub use dashboard::*;
pub use habit::*;
pub use health_check::*;
pub use profession::*;
pub use quest::*;
pub use user::*;
