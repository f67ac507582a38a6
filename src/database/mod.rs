//! Database module
//!
//! This module provides the database lifecycle functionality, organized into:
//!
//! - **location**: Where a named database's file lives (`$BOB_DB_DIR` or the install root)
//! - **provision**: Race-tolerant directory creation
//! - **core**: SQLite connection bound to a resolved location
//! - **session**: Unit-of-work handles for in-process callers
//! - **copy**: Copying database files to and from external directories
//!
//! # Architecture
//!
//! ```text
//! database/
//! ├── location    # Locator, ResolvedLocation, resolve_location
//! ├── provision   # ensure_dir
//! ├── core/       # Foundation
//! │   └── connection  # SQLite DatabaseConn wrapper
//! ├── session/    # Session (begin, operate, commit/rollback, close)
//! └── copy        # copy_to / copy_from
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use bobdb::database::{Locator, Session};
//!
//! let locator = Locator::new("/opt/db");
//!
//! // sqlite:////opt/db/faces/db.sql3 unless $BOB_DB_DIR is set
//! let location = locator.resolve("faces");
//!
//! let mut session = Session::open(&locator, "faces", false)?;
//! session.unit_of_work(|tx| {
//!     tx.execute("INSERT INTO client (name) VALUES (?1)", ["alice"])?;
//!     Ok(())
//! })?;
//! session.close()?;
//! ```

pub mod copy;
pub mod core;
mod error;
pub mod location;
pub mod provision;
pub mod session;

pub use copy::{copy_from, copy_to, CopyReport};
pub use core::{DatabaseConn, SQL_ECHO_TARGET};
pub use error::{DbError, DbResult};
pub use location::{
    canonicalize_lenient, database_file_name, resolve_location, Locator, ResolvedLocation, Scheme,
    DB_DIR_ENV, DEFAULT_EXTENSION,
};
pub use provision::ensure_dir;
pub use session::Session;
