//! Unit-of-work sessions for in-process callers
//!
//! A [`Session`] is a connection to one database location, owned by the caller
//! that opened it. The toolkit keeps no reference to it after returning.

use rusqlite::{Connection, Transaction};
use tracing::warn;

use crate::database::core::DatabaseConn;
use crate::database::error::DbResult;
use crate::database::location::{Locator, ResolvedLocation};

/// Session-scoped handle to a database
///
/// Opening a session does not provision directories: if the resolved
/// location's directory is missing the open fails with
/// [`DbError::Session`](crate::database::DbError::Session).
pub struct Session {
    db: DatabaseConn,
}

impl Session {
    /// Resolve `identity` and open a session on it
    ///
    /// # Arguments
    /// * `locator` - Resolver providing the default root
    /// * `identity` - Name of the database
    /// * `echo` - If `true`, issued statements are logged to the `bobdb::sql` target
    pub fn open(locator: &Locator, identity: &str, echo: bool) -> DbResult<Self> {
        Self::open_location(&locator.resolve(identity), echo)
    }

    /// Open a session on an already resolved location
    pub fn open_location(location: &ResolvedLocation, echo: bool) -> DbResult<Self> {
        let db = DatabaseConn::open(location, echo)?;
        Ok(Session { db })
    }

    pub fn location(&self) -> &ResolvedLocation {
        self.db.location()
    }

    /// Get the underlying connection (for queries)
    pub fn connection(&self) -> &Connection {
        &self.db.conn
    }

    pub fn execute(&self, sql: &str) -> DbResult<usize> {
        self.db.execute(sql)
    }

    pub fn execute_with_params<P: rusqlite::Params>(
        &self,
        sql: &str,
        params: P,
    ) -> DbResult<usize> {
        self.db.execute_with_params(sql, params)
    }

    pub fn table_exists(&self, table_name: &str) -> DbResult<bool> {
        self.db.table_exists(table_name)
    }

    /// Begin a transaction; it rolls back on drop unless committed
    pub fn transaction(&mut self) -> DbResult<Transaction<'_>> {
        Ok(self.db.conn.transaction()?)
    }

    /// Run `work` inside a transaction
    ///
    /// Commits when `work` returns `Ok`, rolls back when it returns `Err`. The
    /// error from `work` is returned as-is.
    pub fn unit_of_work<T, F>(&mut self, work: F) -> DbResult<T>
    where
        F: FnOnce(&Transaction<'_>) -> DbResult<T>,
    {
        let tx = self.db.conn.transaction()?;
        match work(&tx) {
            Ok(value) => {
                tx.commit()?;
                Ok(value)
            }
            Err(e) => {
                if let Err(rollback_err) = tx.rollback() {
                    warn!("rollback failed after error '{}': {}", e, rollback_err);
                }
                Err(e)
            }
        }
    }

    /// Release the session
    pub fn close(self) -> DbResult<()> {
        self.db.close()
    }
}
