//! # Utility Modules
//!
//! This module contains utility constants and validators used throughout
//! the application.
//!
//! ## Available Utilities
//!
//! - **Constants** (`constant`) - Application-wide default values
//! - **HTML** (`html`) - Email body rendering
//! - **Validators** (`validator`) - Input validation regex patterns

pub mod constant;
pub mod html;
pub mod validator;
