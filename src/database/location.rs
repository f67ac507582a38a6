//! Database file location resolution
//!
//! A database is identified by a short name. Its backing file lives either
//! under the directory named by `$BOB_DB_DIR` (as `<dir>/<name>.sql3`) or, when
//! that variable is unset or blank, under the toolkit's install root (as
//! `<root>/<name>/db.sql3`).
//!
//! Resolution is a pure computation over the identity, an environment
//! snapshot and the default root. [`Locator::resolve`] is the only place the
//! process environment is read.

use std::env;
use std::fmt;
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::str::FromStr;

use tracing::debug;

/// Environment variable overriding the directory holding database files
pub const DB_DIR_ENV: &str = "BOB_DB_DIR";

/// File extension used for database files
pub const DEFAULT_EXTENSION: &str = "sql3";

/// Database engine scheme embedded in connection strings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Scheme {
    #[default]
    Sqlite,
}

impl Scheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scheme::Sqlite => "sqlite",
        }
    }

    /// Connection string prefix, e.g. `sqlite:///`
    pub fn prefix(&self) -> String {
        format!("{}:///", self.as_str())
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Location of a database file, tagged with its engine scheme
///
/// Recomputed on demand and never mutated. The bare filesystem path is a
/// field access; the connection string form is `scheme:///` followed by the
/// absolute path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResolvedLocation {
    scheme: Scheme,
    path: PathBuf,
}

impl ResolvedLocation {
    pub fn new(scheme: Scheme, path: impl Into<PathBuf>) -> Self {
        Self {
            scheme,
            path: path.into(),
        }
    }

    pub fn scheme(&self) -> Scheme {
        self.scheme
    }

    /// Bare filesystem path of the database file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Directory expected to hold the database file
    pub fn parent(&self) -> Option<&Path> {
        self.path.parent().filter(|p| !p.as_os_str().is_empty())
    }

    /// Connection string, e.g. `sqlite:////tmp/x/faces.sql3`
    pub fn uri(&self) -> String {
        format!("{}{}", self.scheme.prefix(), self.path.display())
    }

    /// Render with or without the scheme prefix
    pub fn display(&self, with_protocol: bool) -> String {
        if with_protocol {
            self.uri()
        } else {
            self.path.display().to_string()
        }
    }
}

impl fmt::Display for ResolvedLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.uri())
    }
}

impl FromStr for ResolvedLocation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let scheme = Scheme::Sqlite;
        match s.strip_prefix(scheme.prefix().as_str()) {
            Some(path) if !path.is_empty() => Ok(Self::new(scheme, path)),
            Some(_) => Err(format!("Missing path in location '{}'", s)),
            None => Err(format!(
                "Unsupported location '{}', expected '{}<path>'",
                s,
                scheme.prefix()
            )),
        }
    }
}

/// File name of a database placed directly in a directory: `<identity>.sql3`
pub fn database_file_name(identity: &str) -> String {
    format!("{}.{}", identity, DEFAULT_EXTENSION)
}

/// Resolve the location of `identity` from an explicit environment snapshot.
///
/// `override_dir` is the value of `$BOB_DB_DIR` (if any). Blank values count
/// as unset. Nothing here touches the filesystem beyond resolving symlinks in
/// the parts of the path that already exist; missing directories are fine.
pub fn resolve_location(
    identity: &str,
    override_dir: Option<&str>,
    default_root: &Path,
) -> ResolvedLocation {
    let path = match override_dir.filter(|d| !d.trim().is_empty()) {
        Some(dir) => canonicalize_lenient(Path::new(dir)).join(database_file_name(identity)),
        None => canonicalize_lenient(default_root)
            .join(identity)
            .join(format!("db.{}", DEFAULT_EXTENSION)),
    };
    ResolvedLocation::new(Scheme::Sqlite, path)
}

/// Resolve symlinks and relative segments like `realpath`, without
/// requiring the path to exist.
///
/// Each prefix that exists is canonicalized; the remainder is normalized
/// lexically.
pub fn canonicalize_lenient(path: &Path) -> PathBuf {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        match env::current_dir() {
            Ok(cwd) => cwd.join(path),
            Err(_) => path.to_path_buf(),
        }
    };

    let mut resolved = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => resolved.push(component),
            Component::CurDir => {}
            Component::ParentDir => {
                resolved.pop();
            }
            Component::Normal(name) => {
                resolved.push(name);
                if let Ok(real) = fs::canonicalize(&resolved) {
                    resolved = real;
                }
            }
        }
    }
    resolved
}

/// Resolves database identities against a fixed default root
///
/// The default root is captured at construction. `$BOB_DB_DIR` is read once
/// per [`resolve`](Locator::resolve) call.
#[derive(Debug, Clone)]
pub struct Locator {
    default_root: PathBuf,
}

impl Locator {
    pub fn new(default_root: impl Into<PathBuf>) -> Self {
        Self {
            default_root: default_root.into(),
        }
    }

    pub fn default_root(&self) -> &Path {
        &self.default_root
    }

    /// Resolve `identity` against the current value of `$BOB_DB_DIR`
    pub fn resolve(&self, identity: &str) -> ResolvedLocation {
        let override_dir = env::var(DB_DIR_ENV).ok();
        let location = self.resolve_with(identity, override_dir.as_deref());
        debug!("resolved database '{}' to {}", identity, location);
        location
    }

    /// Resolve `identity` against an explicit override snapshot
    pub fn resolve_with(&self, identity: &str, override_dir: Option<&str>) -> ResolvedLocation {
        resolve_location(identity, override_dir, &self.default_root)
    }
}
