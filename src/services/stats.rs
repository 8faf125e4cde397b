// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Aggregates over a row store snapshot.
//!
//! The first row of every snapshot is the header and is never counted.
//! Snapshots are read fresh for each query, so these functions only see
//! data and never talk to the store themselves.

use crate::db::RowSnapshot;
use crate::error::StatsError;
use crate::models::record::{Record, MIN_COLUMNS, USER_ID_COLUMN};
use std::collections::HashMap;

/// Messages logged by one sender.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserCount {
    pub user_id: String,
    pub count: usize,
}

/// Count rows per sender id, in order of each sender's first appearance.
///
/// An empty result means there is not enough data yet.
pub fn counts_by_user(snapshot: &RowSnapshot) -> Result<Vec<UserCount>, StatsError> {
    let mut counts: Vec<UserCount> = Vec::new();
    let mut index_by_user: HashMap<&str, usize> = HashMap::new();

    for (offset, row) in snapshot.iter().enumerate().skip(1) {
        let user_id = row
            .get(USER_ID_COLUMN)
            .ok_or(StatsError::MalformedRow {
                row: offset + 1,
                columns: row.len(),
                expected: MIN_COLUMNS,
            })?
            .as_str();

        match index_by_user.get(user_id) {
            Some(&idx) => counts[idx].count += 1,
            None => {
                index_by_user.insert(user_id, counts.len());
                counts.push(UserCount {
                    user_id: user_id.to_string(),
                    count: 1,
                });
            }
        }
    }

    Ok(counts)
}

/// The last data row, or `None` if the snapshot holds only the header.
pub fn most_recent(snapshot: &RowSnapshot) -> Result<Option<Record>, StatsError> {
    if snapshot.len() < 2 {
        return Ok(None);
    }

    let row_number = snapshot.len();
    let row = &snapshot[row_number - 1];
    Record::from_row(row)
        .map(Some)
        .ok_or(StatsError::MalformedRow {
            row: row_number,
            columns: row.len(),
            expected: MIN_COLUMNS,
        })
}
