// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use sheet_relay::db::InMemorySheet;
use sheet_relay::models::{InboundEvent, SenderIdentity};
use sheet_relay::services::{ChatTransport, PolledBatch, TelegramError};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// RSA key used to sign test service-account assertions.
#[allow(dead_code)]
pub const TEST_PRIVATE_KEY: &str = include_str!("../fixtures/test_service_account_key.pem");

/// Fixed append time for deterministic records.
#[allow(dead_code)]
pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 5, 17, 9, 30, 0).unwrap()
}

#[allow(dead_code)]
pub fn identity(id: i64, handle: &str, first: &str, last: &str) -> SenderIdentity {
    SenderIdentity {
        id,
        handle: Some(handle.to_string()),
        first_name: Some(first.to_string()),
        last_name: Some(last.to_string()),
    }
}

#[allow(dead_code)]
pub fn event(chat_id: i64, sender: SenderIdentity, text: &str) -> InboundEvent {
    InboundEvent::new(chat_id, sender, text)
}

/// Service-account JSON pointing its token endpoint at `token_uri`.
#[allow(dead_code)]
pub fn credential_json(token_uri: &str) -> String {
    serde_json::json!({
        "type": "service_account",
        "project_id": "relay-test",
        "private_key_id": "key-1",
        "private_key": TEST_PRIVATE_KEY,
        "client_email": "relay@relay-test.iam.gserviceaccount.com",
        "token_uri": token_uri,
    })
    .to_string()
}

/// A reply captured by `FakeTransport`, with the sheet's data rows as they
/// were at send time.
#[allow(dead_code)]
#[derive(Debug, Clone)]
pub struct SentReply {
    pub chat_id: i64,
    pub text: String,
    pub logged_messages: Vec<String>,
}

/// Transport that replays scripted batches, then idles until shutdown.
#[allow(dead_code)]
pub struct FakeTransport {
    batches: Mutex<VecDeque<Result<PolledBatch, TelegramError>>>,
    sent: Mutex<Vec<SentReply>>,
    polls: Mutex<Vec<i64>>,
    sheet: Arc<InMemorySheet>,
}

#[allow(dead_code)]
impl FakeTransport {
    pub fn new(
        sheet: Arc<InMemorySheet>,
        batches: Vec<Result<PolledBatch, TelegramError>>,
    ) -> Self {
        Self {
            batches: Mutex::new(batches.into()),
            sent: Mutex::new(Vec::new()),
            polls: Mutex::new(Vec::new()),
            sheet,
        }
    }

    pub fn sent(&self) -> Vec<SentReply> {
        self.sent.lock().unwrap().clone()
    }

    pub fn polled_offsets(&self) -> Vec<i64> {
        self.polls.lock().unwrap().clone()
    }

    /// Wait until at least `count` replies were sent.
    pub async fn wait_for_replies(&self, count: usize) {
        let wait = async {
            while self.sent.lock().unwrap().len() < count {
                tokio::time::sleep(std::time::Duration::from_millis(5)).await;
            }
        };
        tokio::time::timeout(std::time::Duration::from_secs(5), wait)
            .await
            .expect("timed out waiting for replies");
    }
}

#[async_trait]
impl ChatTransport for FakeTransport {
    async fn poll(&self, offset: i64) -> Result<PolledBatch, TelegramError> {
        self.polls.lock().unwrap().push(offset);
        let next = self.batches.lock().unwrap().pop_front();
        match next {
            Some(batch) => batch,
            None => std::future::pending().await,
        }
    }

    async fn send_reply(&self, chat_id: i64, text: &str) -> Result<(), TelegramError> {
        let logged_messages = self
            .sheet
            .records()
            .into_iter()
            .map(|r| r.message)
            .collect();
        self.sent.lock().unwrap().push(SentReply {
            chat_id,
            text: text.to_string(),
            logged_messages,
        });
        Ok(())
    }
}
