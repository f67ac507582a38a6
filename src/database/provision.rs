//! Directory provisioning

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use tracing::info;

use super::error::{DbError, DbResult};

/// Ensure `path` exists as a directory, creating missing ancestors.
///
/// Safe against concurrent callers: if another process or thread creates the
/// directory between the existence check and the create call, the
/// "already exists" outcome counts as success. Any other failure, including
/// a non-directory already sitting at `path`, is returned.
pub fn ensure_dir(path: &Path) -> DbResult<()> {
    if path.is_dir() {
        return Ok(());
    }

    match fs::create_dir_all(path) {
        Ok(()) => {
            info!("created directory '{}'", path.display());
            Ok(())
        }
        Err(e) if e.kind() == ErrorKind::AlreadyExists && path.is_dir() => Ok(()),
        Err(source) => Err(DbError::Provision {
            path: path.to_path_buf(),
            source,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Barrier};
    use std::thread;

    #[test]
    fn test_creates_nested_directories() {
        let temp_dir = tempfile::tempdir().unwrap();
        let nested = temp_dir.path().join("a").join("b").join("c");

        ensure_dir(&nested).unwrap();
        assert!(nested.is_dir());
    }

    #[test]
    fn test_idempotent() {
        let temp_dir = tempfile::tempdir().unwrap();
        let dir = temp_dir.path().join("db");

        ensure_dir(&dir).unwrap();
        ensure_dir(&dir).unwrap();
        assert!(dir.is_dir());
    }

    #[test]
    fn test_concurrent_callers() {
        let temp_dir = tempfile::tempdir().unwrap();
        let dir = Arc::new(temp_dir.path().join("shared").join("db"));
        let barrier = Arc::new(Barrier::new(8));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let dir = Arc::clone(&dir);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    ensure_dir(&dir)
                })
            })
            .collect();

        for handle in handles {
            assert!(handle.join().unwrap().is_ok());
        }
        assert!(dir.is_dir());
    }

    #[test]
    fn test_file_in_the_way_is_an_error() {
        let temp_dir = tempfile::tempdir().unwrap();
        let file = temp_dir.path().join("occupied");
        fs::write(&file, b"not a directory").unwrap();

        let err = ensure_dir(&file).unwrap_err();
        assert!(matches!(err, DbError::Provision { .. }));

        let err = ensure_dir(&file.join("child")).unwrap_err();
        assert!(matches!(err, DbError::Provision { .. }));
    }
}
