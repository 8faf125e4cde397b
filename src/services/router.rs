// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Command routing for inbound chat events.
//!
//! | input            | effect                                   |
//! |------------------|------------------------------------------|
//! | `/start`         | append record, reply with greeting       |
//! | `/help`          | reply with help text                     |
//! | `/stats`         | reply with per-user message counts       |
//! | `/last`          | reply with the most recent record        |
//! | free text        | append record, reply with confirmation   |
//! | other `/command` | ignored                                  |
//!
//! The router holds no per-chat state. Each handler returns a typed result
//! and the router turns failures into a short diagnostic reply.

use crate::db::SheetGateway;
use crate::error::Result;
use crate::models::{InboundEvent, Record, UNIDENTIFIED};
use crate::services::stats::{self, UserCount};
use chrono::{DateTime, Utc};
use std::sync::Arc;

pub const GREETING: &str = "Hi! I'm alive and logging this chat 🤖";
pub const SAVED: &str = "Saved to Google Sheets! 🗂️";
pub const INSUFFICIENT_DATA: &str = "Not enough data yet.";
pub const NO_MESSAGES: &str = "No messages logged yet.";
pub const HELP: &str = "I log every message you send me to a spreadsheet.\n\n\
/start - say hello (logged)\n\
/stats - messages logged per user\n\
/last - the most recent logged message\n\
/help - this text";

/// How an inbound event is handled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Start,
    Help,
    Stats,
    Last,
    /// Free text to log
    Text,
    /// A `/command` with no handler
    Unknown(String),
}

impl Route {
    pub fn classify(event: &InboundEvent) -> Self {
        if !event.is_command() {
            return Route::Text;
        }
        match event.command_name() {
            Some("start") => Route::Start,
            Some("help") => Route::Help,
            Some("stats") => Route::Stats,
            Some("last") => Route::Last,
            Some(other) => Route::Unknown(other.to_string()),
            None => Route::Unknown(String::new()),
        }
    }
}

/// Dispatches events to handlers, logging through the injected gateway.
#[derive(Clone)]
pub struct CommandRouter {
    gateway: Arc<dyn SheetGateway>,
}

impl CommandRouter {
    pub fn new(gateway: Arc<dyn SheetGateway>) -> Self {
        Self { gateway }
    }

    /// Handle one event at the current time.
    pub async fn dispatch(&self, event: &InboundEvent) -> Option<String> {
        self.dispatch_at(event, Utc::now()).await
    }

    /// Handle one event, stamping any appended record with `now`.
    ///
    /// Returns the reply to send, if any. Handler errors become a diagnostic
    /// reply and are never propagated.
    pub async fn dispatch_at(&self, event: &InboundEvent, now: DateTime<Utc>) -> Option<String> {
        let route = Route::classify(event);
        tracing::info!(
            chat_id = event.chat_id,
            user_id = event.sender.id,
            route = ?route,
            "Handling event"
        );

        let result = match &route {
            Route::Start => self.handle_start(event, now).await,
            Route::Help => Ok(Some(HELP.to_string())),
            Route::Stats => self.handle_stats().await,
            Route::Last => self.handle_last().await,
            Route::Text => self.handle_text(event, now).await,
            Route::Unknown(name) => {
                tracing::debug!(command = %name, "No handler for command");
                Ok(None)
            }
        };

        match result {
            Ok(reply) => reply,
            Err(e) => {
                tracing::error!(
                    error = %e,
                    chat_id = event.chat_id,
                    route = ?route,
                    "Handler failed"
                );
                Some(e.diagnostic())
            }
        }
    }

    async fn handle_start(
        &self,
        event: &InboundEvent,
        now: DateTime<Utc>,
    ) -> Result<Option<String>> {
        self.log_record(Record::build(&event.sender, "/start", now)).await?;
        Ok(Some(GREETING.to_string()))
    }

    async fn handle_text(
        &self,
        event: &InboundEvent,
        now: DateTime<Utc>,
    ) -> Result<Option<String>> {
        self.log_record(Record::build(&event.sender, &event.text, now)).await?;
        Ok(Some(SAVED.to_string()))
    }

    async fn handle_stats(&self) -> Result<Option<String>> {
        let snapshot = self.gateway.get_all_rows().await?;
        let counts = stats::counts_by_user(&snapshot)?;
        Ok(Some(format_counts(&counts)))
    }

    async fn handle_last(&self) -> Result<Option<String>> {
        let snapshot = self.gateway.get_all_rows().await?;
        let reply = match stats::most_recent(&snapshot)? {
            Some(record) => format_last(&record),
            None => NO_MESSAGES.to_string(),
        };
        Ok(Some(reply))
    }

    async fn log_record(&self, record: Record) -> Result<()> {
        tracing::debug!(
            timestamp = %record.timestamp,
            user_id = %record.user_id,
            username = %record.username,
            "Appending row"
        );
        self.gateway.append_row(&record).await?;
        Ok(())
    }
}

/// Render per-user counts, or the insufficient-data notice.
pub fn format_counts(counts: &[UserCount]) -> String {
    if counts.is_empty() {
        return INSUFFICIENT_DATA.to_string();
    }
    let lines: Vec<String> = counts
        .iter()
        .map(|c| format!("• {}: {}", c.user_id, c.count))
        .collect();
    format!("📊 Messages per user:\n{}", lines.join("\n"))
}

/// Render the most recent record.
pub fn format_last(record: &Record) -> String {
    let who = if record.username.is_empty() || record.username == UNIDENTIFIED {
        format!("{} (id {})", record.full_name, record.user_id)
    } else {
        format!(
            "{} (@{}, id {})",
            record.full_name, record.username, record.user_id
        )
    };
    format!(
        "🕒 Last message\nFrom: {}\nAt: {}\n\n{}",
        who, record.timestamp, record.message
    )
}
