//! CLI module for the Workhub API
//!
//! Subcommands:
//! - `serve`: run the HTTP API server
//! - `migrate`: apply pending database migrations
//! - `sweep`: expire overdue pending invitations

pub mod migrate;
pub mod serve;
pub mod sweep;

use clap::{Parser, Subcommand};

/// Workhub API - Multi-tenant workspace and membership backend
#[derive(Parser)]
#[command(name = "workhub-api")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP API server
    Serve,

    /// Apply pending database migrations
    Migrate,

    /// Expire overdue pending invitations
    Sweep,
}
