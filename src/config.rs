//! Runtime configuration
//!
//! Settings come from the environment; every binary resolves them the same way.

use std::path::PathBuf;

/// Environment variable overriding the SQLite file location
pub const DATABASE_PATH_VAR: &str = "FICHA_DATABASE_PATH";

/// Default tracing directive added on top of `RUST_LOG`
pub const DEFAULT_LOG_DIRECTIVE: &str = "ficha=info";

/// Get the database path from environment or use default
pub fn database_path() -> PathBuf {
    std::env::var(DATABASE_PATH_VAR)
        .map(PathBuf::from)
        .unwrap_or_else(|_| default_database_path())
}

/// `<project root>/data/ficha.db`, resolved from the executable location
fn default_database_path() -> PathBuf {
    let mut path = std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(|p| p.to_path_buf()))
        .unwrap_or_else(|| PathBuf::from("."));

    // Go up from target/release or target/debug to project root
    if path.ends_with("release") || path.ends_with("debug") {
        if let Some(grandparent) = path.parent().and_then(|p| p.parent()) {
            path = grandparent.to_path_buf();
        }
    }

    path.push("data");
    path.push("ficha.db");
    path
}
