// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Sheet-Relay: log Telegram chat messages to a Google Sheets worksheet
//!
//! Each inbound text message is normalized into a five-column record and
//! appended to the sheet. `/stats` and `/last` read the sheet back and
//! reply with per-user counts or the most recent record.

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;
