//! Database module
//!
//! Handles SQLite connection, migrations and column conversions.

pub mod columns;
pub mod connection;
pub mod migrations;

pub use connection::{Database, DbError, DbResult};

#[cfg(test)]
pub(crate) fn test_database() -> Database {
    let db = Database::in_memory().expect("in-memory database");
    db.with_conn(migrations::run_migrations)
        .expect("migrations");
    db
}
