// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Per-event error types.
//!
//! Startup failures (`ConfigError`, `CredentialError`) live next to the code
//! that raises them and are fatal. Everything here is scoped to a single
//! inbound event and ends up as a short diagnostic reply to the sender.

/// Row store failures.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Row store unavailable: {0}")]
    Unavailable(String),

    #[error("Row store rejected request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Authorization failed: {0}")]
    Auth(String),

    #[error("Unexpected row store response: {0}")]
    InvalidResponse(String),
}

/// Snapshot aggregation failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StatsError {
    /// Sheet row `row` (1-based, header is row 1) had too few columns.
    #[error("Row {row} has {columns} columns, expected at least {expected}")]
    MalformedRow {
        row: usize,
        columns: usize,
        expected: usize,
    },
}

/// Failure inside a command handler.
#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Stats(#[from] StatsError),
}

impl HandlerError {
    /// Short, user-facing diagnostic. Never includes response bodies.
    pub fn diagnostic(&self) -> String {
        let kind = match self {
            HandlerError::Storage(StorageError::Unavailable(_)) => "row store unreachable",
            HandlerError::Storage(StorageError::Rejected { .. }) => "row store rejected request",
            HandlerError::Storage(StorageError::Auth(_)) => "row store authorization failed",
            HandlerError::Storage(StorageError::InvalidResponse(_)) => "unexpected row store reply",
            HandlerError::Stats(_) => "stored data is malformed",
        };
        format!("⚠️ Error: {}", kind)
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, HandlerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_is_short_and_hides_details() {
        let err = HandlerError::from(StorageError::Rejected {
            status: 403,
            message: "caller does not have permission on spreadsheet abc".to_string(),
        });
        let text = err.diagnostic();
        assert!(text.contains("rejected"));
        assert!(!text.contains("spreadsheet abc"));
    }

    #[test]
    fn test_stats_error_display() {
        let err = StatsError::MalformedRow {
            row: 3,
            columns: 1,
            expected: 2,
        };
        assert_eq!(err.to_string(), "Row 3 has 1 columns, expected at least 2");
        let handler: HandlerError = err.into();
        assert_eq!(handler.diagnostic(), "⚠️ Error: stored data is malformed");
    }
}
