// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-process row store for offline runs and tests.

use crate::db::{RowSnapshot, SheetGateway};
use crate::error::StorageError;
use crate::models::record::{Record, HEADER};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// Worksheet held in memory, seeded with the header row.
pub struct InMemorySheet {
    rows: Mutex<RowSnapshot>,
    offline: AtomicBool,
}

impl Default for InMemorySheet {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemorySheet {
    pub fn new() -> Self {
        Self::with_rows(vec![HEADER.iter().map(|h| h.to_string()).collect()])
    }

    /// Start from arbitrary rows (the first is treated as the header).
    pub fn with_rows(rows: RowSnapshot) -> Self {
        Self {
            rows: Mutex::new(rows),
            offline: AtomicBool::new(false),
        }
    }

    /// Make every subsequent operation fail with `StorageError::Unavailable`.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Data rows appended so far, header excluded.
    pub fn records(&self) -> Vec<Record> {
        self.lock()
            .iter()
            .skip(1)
            .filter_map(|row| Record::from_row(row))
            .collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, RowSnapshot> {
        // A poisoned lock only means a test panicked mid-append.
        self.rows.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn check_online(&self) -> Result<(), StorageError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable(
                "Row store not connected (offline mode)".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl SheetGateway for InMemorySheet {
    async fn append_row(&self, record: &Record) -> Result<(), StorageError> {
        self.check_online()?;
        self.lock().push(record.to_row());
        Ok(())
    }

    async fn get_all_rows(&self) -> Result<RowSnapshot, StorageError> {
        self.check_online()?;
        Ok(self.lock().clone())
    }
}
