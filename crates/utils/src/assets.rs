//! Filesystem helpers for locating the SQLite database.

use std::path::{Path, PathBuf};

use tracing::{info, warn};

pub const DEFAULT_DATABASE_FILE: &str = "todos.db";

/// Resolve the database location, falling back to `todos.db` in the working
/// directory.
pub fn database_path(configured: Option<&Path>) -> PathBuf {
    configured
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATABASE_FILE))
}

/// Create the parent directory of `db_path` if it is missing.
///
/// Best effort: hosted deployments usually mount the volume up front, so a
/// failure here is logged and left for the database open to report.
pub fn ensure_parent_dir(db_path: &Path) -> bool {
    let Some(dir) = db_path.parent().filter(|d| !d.as_os_str().is_empty()) else {
        return true;
    };

    if dir.exists() {
        return true;
    }

    match std::fs::create_dir_all(dir) {
        Ok(()) => {
            info!(dir = %dir.display(), "Created database directory");
            true
        }
        Err(e) => {
            warn!(dir = %dir.display(), error = %e, "Failed to create database directory");
            false
        }
    }
}
