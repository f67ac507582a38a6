//! Copying database files in and out of place
//!
//! Both directions follow the same order: make sure the destination
//! directory exists, remove a stale destination file, then copy. The stale
//! file is removed before copying starts so a half-written file is never
//! visible under the old name. Concurrent copies onto the same destination
//! are not serialized here.

use std::fs::{self, FileTimes};
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};

use tracing::info;

use super::error::{DbError, DbResult};
use super::location::{database_file_name, ResolvedLocation};
use super::provision::ensure_dir;

/// Outcome of a completed copy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyReport {
    pub from: PathBuf,
    pub to: PathBuf,
    pub bytes: u64,
}

/// Copy the live database file at `location` into `destination_dir`
///
/// The copy is named `<identity>.sql3`. `destination_dir` is created if it
/// does not exist.
pub fn copy_to(
    location: &ResolvedLocation,
    identity: &str,
    destination_dir: &Path,
    verbose: bool,
) -> DbResult<CopyReport> {
    ensure_dir(destination_dir)?;
    let destination = destination_dir.join(database_file_name(identity));
    refuse_same_file(location.path(), &destination)?;
    remove_stale(&destination, verbose)?;
    duplicate(location.path(), &destination, verbose)
}

/// Copy `<source_dir>/<identity>.sql3` into place at `location`
///
/// The directory holding `location` is created if it does not exist.
pub fn copy_from(
    location: &ResolvedLocation,
    identity: &str,
    source_dir: &Path,
    verbose: bool,
) -> DbResult<CopyReport> {
    let destination = location.path();
    if let Some(parent) = location.parent() {
        if !parent.exists() {
            progress(
                verbose,
                format!("Creating directory '{}'...", parent.display()),
            );
            ensure_dir(parent)?;
        }
    }
    let source = source_dir.join(database_file_name(identity));
    refuse_same_file(&source, destination)?;
    remove_stale(destination, verbose)?;
    duplicate(&source, destination, verbose)
}

/// Removing the destination would delete the source when both are one file
fn refuse_same_file(from: &Path, to: &Path) -> DbResult<()> {
    match (fs::canonicalize(from), fs::canonicalize(to)) {
        (Ok(a), Ok(b)) if a == b => Err(copy_error(
            from,
            to,
            io::Error::new(
                ErrorKind::InvalidInput,
                "source and destination are the same file",
            ),
        )),
        _ => Ok(()),
    }
}

fn remove_stale(path: &Path, verbose: bool) -> DbResult<()> {
    if !path.exists() {
        return Ok(());
    }
    progress(
        verbose,
        format!("Removing existing file '{}'...", path.display()),
    );
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        // removed by someone else in the meantime
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(source) => Err(DbError::Remove {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Copy contents and permissions, then carry over access and modification times
fn duplicate(from: &Path, to: &Path, verbose: bool) -> DbResult<CopyReport> {
    progress(
        verbose,
        format!("Copying {} -> {}", from.display(), to.display()),
    );

    let bytes = fs::copy(from, to).map_err(|e| copy_error(from, to, e))?;
    copy_times(from, to).map_err(|e| copy_error(from, to, e))?;

    info!("copied {} bytes from '{}' to '{}'", bytes, from.display(), to.display());
    progress(verbose, format!("Copied {} bytes", bytes));

    Ok(CopyReport {
        from: from.to_path_buf(),
        to: to.to_path_buf(),
        bytes,
    })
}

fn copy_times(from: &Path, to: &Path) -> io::Result<()> {
    let metadata = fs::metadata(from)?;
    let mut times = FileTimes::new().set_modified(metadata.modified()?);
    if let Ok(accessed) = metadata.accessed() {
        times = times.set_accessed(accessed);
    }

    #[cfg(unix)]
    let handle = fs::File::open(to)?;
    #[cfg(not(unix))]
    let handle = fs::OpenOptions::new().write(true).open(to)?;

    handle.set_times(times)
}

fn copy_error(from: &Path, to: &Path, source: io::Error) -> DbError {
    DbError::Copy {
        from: from.to_path_buf(),
        to: to.to_path_buf(),
        source,
    }
}

fn progress(verbose: bool, message: String) {
    if verbose {
        eprintln!("{}", message);
    }
}
