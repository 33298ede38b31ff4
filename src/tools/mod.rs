//! Ficha Tools module
//!
//! Validated operations behind the MCP tools.

pub mod comments;
pub mod ingredients;
pub mod nutrition;
pub mod recipes;
pub mod status;

use thiserror::Error;

use crate::db::DbError;
use crate::yields::YieldError;

/// Errors returned by tool operations
#[derive(Debug, Error)]
pub enum ToolError {
    /// Request rejected by validation
    #[error("{0}")]
    Invalid(String),

    /// A referenced record does not exist
    #[error("{0}")]
    NotFound(String),

    /// The technical sheet could not be computed
    #[error("Cannot compute technical sheet: {0}")]
    Yield(#[from] YieldError),

    #[error("Database error: {0}")]
    Database(#[from] DbError),
}

impl From<rusqlite::Error> for ToolError {
    fn from(e: rusqlite::Error) -> Self {
        ToolError::Database(DbError::Sqlite(e))
    }
}

impl ToolError {
    /// Whether the caller can fix the request and retry
    pub fn is_client_error(&self) -> bool {
        !matches!(self, ToolError::Database(_))
    }
}

/// Result type for tool operations
pub type ToolResult<T> = Result<T, ToolError>;

/// Trim a required text field, rejecting blank values
pub(crate) fn required_text(field: &str, value: &str) -> ToolResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ToolError::Invalid(format!("{} cannot be empty", field)));
    }
    Ok(trimmed.to_string())
}

/// Trim an optional text field, mapping blank values to None
pub(crate) fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
