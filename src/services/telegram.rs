// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Telegram Bot API client.
//!
//! Only the two calls the relay needs: long-poll `getUpdates` and
//! `sendMessage`. Updates without text (stickers, photos, edits) are
//! skipped but still advance the offset.

use crate::models::{InboundEvent, SenderIdentity};
use crate::services::dispatcher::{ChatTransport, PolledBatch};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

pub const DEFAULT_TELEGRAM_API_BASE: &str = "https://api.telegram.org";

/// Seconds the server holds a `getUpdates` call open.
pub const LONG_POLL_TIMEOUT_SECS: u64 = 30;

/// Transport errors. Never fatal to the relay.
#[derive(Debug, thiserror::Error)]
pub enum TelegramError {
    #[error("Telegram request failed: {0}")]
    Request(String),

    #[error("Telegram API error: {0}")]
    Api(String),
}

/// Bot API envelope: `{"ok": bool, "result": ..., "description": ...}`.
#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<Message>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub chat: Chat,
    #[serde(default)]
    pub from: Option<User>,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: i64,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
}

impl From<User> for SenderIdentity {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            handle: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
        }
    }
}

impl Update {
    /// Convert to an inbound event if this is a text message with a sender.
    pub fn into_event(self) -> Option<InboundEvent> {
        let message = self.message?;
        let text = message.text?;
        let sender = message.from?;
        Some(InboundEvent::new(message.chat.id, sender.into(), text))
    }
}

/// Telegram Bot API client.
#[derive(Clone)]
pub struct TelegramClient {
    http: reqwest::Client,
    base_url: String,
    request_timeout: Duration,
}

impl TelegramClient {
    pub fn new(
        api_base: &str,
        token: &str,
        request_timeout: Duration,
    ) -> Result<Self, TelegramError> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| TelegramError::Request(e.to_string()))?;
        Ok(Self {
            http,
            base_url: format!("{}/bot{}", api_base.trim_end_matches('/'), token),
            request_timeout,
        })
    }

    /// Fetch pending updates starting at `offset`.
    pub async fn get_updates(
        &self,
        offset: i64,
        timeout_secs: u64,
    ) -> Result<Vec<Update>, TelegramError> {
        let response = self
            .http
            .get(format!("{}/getUpdates", self.base_url))
            .query(&[
                ("offset", offset.to_string()),
                ("timeout", timeout_secs.to_string()),
                ("allowed_updates", "[\"message\"]".to_string()),
            ])
            // The server holds the request open for `timeout_secs`.
            .timeout(self.request_timeout + Duration::from_secs(timeout_secs))
            .send()
            .await
            .map_err(|e| TelegramError::Request(e.to_string()))?;

        Self::parse(response).await
    }

    /// Send a plain-text message to a chat.
    pub async fn send_message(&self, chat_id: i64, text: &str) -> Result<(), TelegramError> {
        let body = serde_json::json!({
            "chat_id": chat_id,
            "text": text,
        });

        let response = self
            .http
            .post(format!("{}/sendMessage", self.base_url))
            .timeout(self.request_timeout)
            .json(&body)
            .send()
            .await
            .map_err(|e| TelegramError::Request(e.to_string()))?;

        let _: serde_json::Value = Self::parse(response).await?;
        Ok(())
    }

    async fn parse<T: for<'de> Deserialize<'de>>(
        response: reqwest::Response,
    ) -> Result<T, TelegramError> {
        let status = response.status();
        let envelope: ApiResponse<T> = response
            .json()
            .await
            .map_err(|e| TelegramError::Api(format!("HTTP {}: invalid body: {}", status, e)))?;

        if !envelope.ok {
            return Err(TelegramError::Api(format!(
                "HTTP {}: {}",
                status,
                envelope.description.unwrap_or_default()
            )));
        }

        envelope
            .result
            .ok_or_else(|| TelegramError::Api("response missing result".to_string()))
    }
}

#[async_trait]
impl ChatTransport for TelegramClient {
    async fn poll(&self, offset: i64) -> Result<PolledBatch, TelegramError> {
        let updates = self.get_updates(offset, LONG_POLL_TIMEOUT_SECS).await?;

        let next_offset = updates
            .iter()
            .map(|u| u.update_id + 1)
            .max()
            .unwrap_or(offset)
            .max(offset);
        let events = updates.into_iter().filter_map(Update::into_event).collect();

        Ok(PolledBatch {
            events,
            next_offset,
        })
    }

    async fn send_reply(&self, chat_id: i64, text: &str) -> Result<(), TelegramError> {
        self.send_message(chat_id, text).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_text_update_into_event() {
        let update: Update = serde_json::from_value(json!({
            "update_id": 100,
            "message": {
                "message_id": 1,
                "date": 1700000000,
                "chat": {"id": -55, "type": "group"},
                "from": {"id": 7, "is_bot": false, "first_name": "Bob", "username": "bob"},
                "text": "hola"
            }
        }))
        .unwrap();

        let event = update.into_event().unwrap();
        assert_eq!(event.chat_id, -55);
        assert_eq!(event.sender.id, 7);
        assert_eq!(event.sender.handle.as_deref(), Some("bob"));
        assert_eq!(event.sender.last_name, None);
        assert_eq!(event.text, "hola");
    }

    #[test]
    fn test_non_text_update_is_skipped() {
        let update: Update = serde_json::from_value(json!({
            "update_id": 101,
            "message": {
                "chat": {"id": 1},
                "from": {"id": 7, "first_name": "Bob"},
                "sticker": {"file_id": "abc"}
            }
        }))
        .unwrap();
        assert!(update.into_event().is_none());

        let edited: Update = serde_json::from_value(json!({
            "update_id": 102,
            "edited_message": {"chat": {"id": 1}, "text": "x"}
        }))
        .unwrap();
        assert!(edited.into_event().is_none());
    }
}
