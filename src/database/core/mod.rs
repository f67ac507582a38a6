//! Core database infrastructure
//!
//! - `DatabaseConn`: SQLite connection bound to a resolved location

mod connection;

pub use connection::{DatabaseConn, SQL_ECHO_TARGET};
