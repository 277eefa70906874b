pub mod admin;

pub use admin::{AdminUser, admin_middleware};
