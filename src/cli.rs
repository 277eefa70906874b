//! # Command Line
//!
//! Without a subcommand the binary serves the API.

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "energie")]
#[command(about = "Wellness quest backend for healthcare workers", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Print a signed admin bearer token for an email
    AdminToken {
        /// Email on the ADMIN_EMAILS allow-list
        #[arg(value_name = "EMAIL")]
        email: String,
    },
}
