#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

//! bobdb - location and lifecycle utilities for file-backed SQLite databases
//!
//! A family of small databases share this crate to agree on where each
//! database file lives, to open sessions on it, and to offer the same
//! administration commands from every command-line tool built on top.
//!
//! # Feature Flags
//!
//! | Feature | Description | Key Dependencies |
//! |---------|-------------|------------------|
//! | `database` | Location resolution, provisioning, sessions, file copies | `rusqlite` |
//! | `cli` | Standard subcommands and the interactive shell launcher | `clap`, `libc` |
//!
//! # Database Location
//!
//! A database named `faces` lives at `<install-root>/faces/db.sql3`, or at
//! `$BOB_DB_DIR/faces.sql3` when `BOB_DB_DIR` is set to a non-blank value.
//! Locations are rendered as connection strings such as
//! `sqlite:////opt/db/faces/db.sql3`.
//!
//! # Architecture
//!
//! - **[`database`]**: Location resolution, provisioning, sessions and copies
//! - **[`cli`]**: `dbshell`, `location`, `copy`, `copyfrom` subcommands (requires `cli`)
//! - **[`config`]**: Configuration management
//!
//! # Quick Start Examples
//!
//! ## Sessions
//!
//! ```rust,ignore
//! use bobdb::{BobDbConfig, Session};
//!
//! let config = BobDbConfig::new(&None)?;
//! let mut session = Session::open(&config.locator(), "faces", false)?;
//! let count = session.unit_of_work(|tx| {
//!     Ok(tx.query_row("SELECT COUNT(*) FROM client", [], |row| row.get::<_, i64>(0))?)
//! })?;
//! session.close()?;
//! ```
//!
//! ## Mounting the standard commands
//!
//! ```rust,ignore
//! use bobdb::cli::{ShellProgram, StandardCommand};
//! use clap::{Parser, Subcommand};
//!
//! #[derive(Parser)]
//! struct Cli {
//!     #[clap(subcommand)]
//!     command: Commands,
//! }
//!
//! #[derive(Subcommand)]
//! enum Commands {
//!     #[command(flatten)]
//!     Standard(StandardCommand),
//! }
//!
//! let config = bobdb::BobDbConfig::new(&None)?;
//! let Commands::Standard(cmd) = Cli::parse().command;
//! let code = cmd.run("faces", &config.locator(), &ShellProgram::from_config(&config))?;
//! std::process::exit(code);
//! ```

pub mod config;
pub mod database;

// CLI module - requires CLI feature
#[cfg(feature = "cli")]
pub mod cli;

// =============================================================================
// Configuration (always available)
// =============================================================================

pub use config::BobDbConfig;

// =============================================================================
// Database Module - Re-export commonly used types (always available)
// =============================================================================

pub use database::{
    copy_from, copy_to, ensure_dir, resolve_location, CopyReport, DbError, DbResult, Locator,
    ResolvedLocation, Scheme, Session, DB_DIR_ENV, DEFAULT_EXTENSION,
};

// =============================================================================
// CLI Module - requires "cli" feature
// =============================================================================

#[cfg(feature = "cli")]
pub use cli::{CommandOptions, ShellOutcome, ShellProgram, StandardCommand};
