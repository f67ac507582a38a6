//! Database connection management
//!
//! This module provides the SQLite connection wrapper bound to a resolved
//! database location.

use rusqlite::Connection;
use tracing::info;

use crate::database::error::{DbError, DbResult};
use crate::database::location::ResolvedLocation;

/// Target for echoed SQL statements
pub const SQL_ECHO_TARGET: &str = "bobdb::sql";

/// Core database connection wrapper
///
/// `DatabaseConn` opens the file behind a [`ResolvedLocation`] and applies a
/// consistent configuration. It never creates missing directories: opening a
/// location whose parent directory does not exist is an error.
pub struct DatabaseConn {
    pub conn: Connection,
    location: ResolvedLocation,
}

impl DatabaseConn {
    /// Open a connection to `location`
    ///
    /// With `echo` set, every statement SQLite runs is emitted as a `tracing`
    /// event with target `bobdb::sql`.
    pub fn open(location: &ResolvedLocation, echo: bool) -> DbResult<Self> {
        let mut conn = Connection::open(location.path()).map_err(|source| DbError::Session {
            location: location.uri(),
            source,
        })?;

        if echo {
            #[allow(deprecated)]
            conn.trace(Some(echo_statement));
        }

        let db = DatabaseConn {
            conn,
            location: location.clone(),
        };
        db.configure()?;
        Ok(db)
    }

    pub fn location(&self) -> &ResolvedLocation {
        &self.location
    }

    /// Configure the connection
    ///
    /// Rollback journaling is kept so the database stays a single file that
    /// can be copied as-is.
    fn configure(&self) -> DbResult<()> {
        self.conn
            .busy_timeout(std::time::Duration::from_secs(5))
            .map_err(|source| DbError::Session {
                location: self.location.uri(),
                source,
            })?;

        // Enable foreign keys
        self.conn.execute("PRAGMA foreign_keys=ON", [])?;

        Ok(())
    }

    /// Execute a SQL statement
    pub fn execute(&self, sql: &str) -> DbResult<usize> {
        Ok(self.conn.execute(sql, [])?)
    }

    /// Execute a SQL statement with parameters
    pub fn execute_with_params<P: rusqlite::Params>(
        &self,
        sql: &str,
        params: P,
    ) -> DbResult<usize> {
        Ok(self.conn.execute(sql, params)?)
    }

    /// Check if a table exists in the database
    pub fn table_exists(&self, table_name: &str) -> DbResult<bool> {
        let count: i32 = self.conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?1",
            [table_name],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Close the connection, surfacing any error SQLite reports
    pub fn close(self) -> DbResult<()> {
        let uri = self.location.uri();
        self.conn.close().map_err(|(_, e)| DbError::Session {
            location: uri.clone(),
            source: e,
        })?;
        info!("closed database {}", uri);
        Ok(())
    }
}

fn echo_statement(sql: &str) {
    info!(target: SQL_ECHO_TARGET, "{}", sql);
}
