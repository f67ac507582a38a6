//! Database toolkit errors

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type for database toolkit operations
pub type DbResult<T> = Result<T, DbError>;

/// Failures surfaced by provisioning, copy and session operations.
///
/// Every variant carries the underlying error unchanged; nothing here is
/// retried or cleaned up after the fact.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("failed to create directory '{}': {source}", .path.display())]
    Provision {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to remove existing file '{}': {source}", .path.display())]
    Remove {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to copy '{}' -> '{}': {source}", .from.display(), .to.display())]
    Copy {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to open database at '{location}': {source}")]
    Session {
        location: String,
        #[source]
        source: rusqlite::Error,
    },

    #[error("database error: {0}")]
    Sql(#[from] rusqlite::Error),
}

impl DbError {
    /// Raw OS error code of the underlying I/O failure, if there is one.
    pub fn raw_os_error(&self) -> Option<i32> {
        match self {
            DbError::Provision { source, .. }
            | DbError::Remove { source, .. }
            | DbError::Copy { source, .. } => source.raw_os_error(),
            DbError::Session { .. } | DbError::Sql(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_os_error_from_io() {
        let err = DbError::Copy {
            from: PathBuf::from("/a"),
            to: PathBuf::from("/b"),
            source: io::Error::from_raw_os_error(13),
        };
        assert_eq!(err.raw_os_error(), Some(13));
        assert!(err.to_string().contains("'/a' -> '/b'"));
    }

    #[test]
    fn test_raw_os_error_without_io() {
        let err = DbError::Sql(rusqlite::Error::InvalidQuery);
        assert_eq!(err.raw_os_error(), None);
    }
}
