// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Canonical logged row and the sender identity it is built from.

use crate::time_utils::format_utc_rfc3339;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Placeholder used when the sender has no handle and no name.
pub const UNIDENTIFIED: &str = "Unidentified";

/// Header row; row stores seed it when the worksheet is empty.
pub const HEADER: [&str; 5] = ["timestamp", "user_id", "username", "full_name", "message"];

/// Column holding the sender id.
pub const USER_ID_COLUMN: usize = 1;

/// Number of columns in a canonical row.
pub const COLUMN_COUNT: usize = HEADER.len();

/// Shortest row that can still be read back as a record.
pub const MIN_COLUMNS: usize = USER_ID_COLUMN + 1;

/// Who sent an event, as reported by the transport.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SenderIdentity {
    pub id: i64,
    #[serde(default)]
    pub handle: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
}

/// One row of the chat log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Append time (RFC 3339, UTC)
    pub timestamp: String,
    /// Sender id, stringified
    pub user_id: String,
    pub username: String,
    pub full_name: String,
    pub message: String,
}

impl Record {
    /// Build a record from a sender and message text.
    ///
    /// `now` is the append time, not the time the platform stamped the event.
    pub fn build(identity: &SenderIdentity, message: &str, now: DateTime<Utc>) -> Self {
        let username = identity
            .handle
            .as_deref()
            .map(str::trim)
            .filter(|h| !h.is_empty())
            .unwrap_or(UNIDENTIFIED)
            .to_string();

        let first = identity.first_name.as_deref().unwrap_or("");
        let last = identity.last_name.as_deref().unwrap_or("");
        let joined = format!("{} {}", first, last);
        let full_name = match joined.trim() {
            "" => username.clone(),
            name => name.to_string(),
        };

        Self {
            timestamp: format_utc_rfc3339(now),
            user_id: identity.id.to_string(),
            username,
            full_name,
            message: message.to_string(),
        }
    }

    /// Cells in sheet column order.
    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.timestamp.clone(),
            self.user_id.clone(),
            self.username.clone(),
            self.full_name.clone(),
            self.message.clone(),
        ]
    }

    /// Rebuild a record from sheet cells.
    ///
    /// The Sheets API drops trailing empty cells, so missing cells after the
    /// sender id read as empty strings. Rows without a sender id yield `None`.
    pub fn from_row(row: &[String]) -> Option<Self> {
        if row.len() < MIN_COLUMNS {
            return None;
        }
        let cell = |idx: usize| row.get(idx).cloned().unwrap_or_default();
        Some(Self {
            timestamp: cell(0),
            user_id: cell(1),
            username: cell(2),
            full_name: cell(3),
            message: cell(4),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap()
    }

    fn identity(id: i64, handle: &str, first: &str, last: &str) -> SenderIdentity {
        let opt = |s: &str| Some(s.to_string());
        SenderIdentity {
            id,
            handle: opt(handle),
            first_name: opt(first),
            last_name: opt(last),
        }
    }

    #[test]
    fn test_blank_identity_uses_sentinel() {
        let record = Record::build(&identity(1, "  ", " ", ""), "hi", now());
        assert_eq!(record.username, UNIDENTIFIED);
        assert_eq!(record.full_name, UNIDENTIFIED);

        let record = Record::build(&SenderIdentity { id: 1, ..Default::default() }, "hi", now());
        assert_eq!(record.username, UNIDENTIFIED);
        assert_eq!(record.full_name, UNIDENTIFIED);
    }

    #[test]
    fn test_full_name_falls_back_to_handle() {
        let record = Record::build(&identity(7, "bob", "", ""), "hola", now());
        assert_eq!(record.username, "bob");
        assert_eq!(record.full_name, "bob");
    }

    #[test]
    fn test_name_parts_are_joined_and_trimmed() {
        let record = Record::build(&identity(3, "ana_g", "Ana", "García"), "x", now());
        assert_eq!(record.full_name, "Ana García");

        let record = Record::build(&identity(3, "", "Ana", ""), "x", now());
        assert_eq!(record.username, UNIDENTIFIED);
        assert_eq!(record.full_name, "Ana");

        let record = Record::build(&identity(3, "", "", "García"), "x", now());
        assert_eq!(record.full_name, "García");
    }

    #[test]
    fn test_message_is_preserved_exactly() {
        for text in ["", "  padded  ", "/notacommand", "línea 1\nlínea 2"] {
            let record = Record::build(&identity(9, "x", "", ""), text, now());
            assert_eq!(record.message, text);
        }
    }

    #[test]
    fn test_timestamp_and_id() {
        let record = Record::build(&identity(-100123, "x", "", ""), "m", now());
        assert_eq!(record.timestamp, "2026-01-02T03:04:05.000000Z");
        assert_eq!(record.user_id, "-100123");
    }

    #[test]
    fn test_from_row_short_row() {
        let row: Vec<String> = vec!["t".into()];
        assert!(Record::from_row(&row).is_none());
    }

    #[test]
    fn test_from_row_pads_trimmed_cells() {
        // Empty message and name were stripped by the API.
        let row: Vec<String> = vec!["t".into(), "1".into(), "bob".into()];
        let record = Record::from_row(&row).unwrap();
        assert_eq!(record.username, "bob");
        assert_eq!(record.full_name, "");
        assert_eq!(record.message, "");
    }

    #[test]
    fn test_row_conversion_keeps_column_order() {
        let record = Record::build(&identity(5, "eve", "Eve", ""), "hello", now());
        let mut row = record.to_row();
        assert_eq!(row.len(), COLUMN_COUNT);
        assert_eq!(row[USER_ID_COLUMN], "5");
        row.push("extra".to_string());
        assert_eq!(Record::from_row(&row), Some(record));
    }
}
