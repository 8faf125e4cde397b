// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Transport-neutral inbound chat event.

use crate::models::SenderIdentity;

/// A text message received from the chat platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundEvent {
    /// Chat to reply into
    pub chat_id: i64,
    pub sender: SenderIdentity,
    pub text: String,
}

impl InboundEvent {
    pub fn new(chat_id: i64, sender: SenderIdentity, text: impl Into<String>) -> Self {
        Self {
            chat_id,
            sender,
            text: text.into(),
        }
    }

    /// True if the text starts with the command marker.
    pub fn is_command(&self) -> bool {
        self.text.starts_with('/')
    }

    /// Command name without the leading `/` or a `@botname` suffix.
    ///
    /// `"/stats@relay_bot now"` yields `Some("stats")`. Free text yields `None`.
    pub fn command_name(&self) -> Option<&str> {
        let rest = self.text.strip_prefix('/')?;
        let word = rest.split_whitespace().next().unwrap_or("");
        let name = word.split('@').next().unwrap_or("");
        if name.is_empty() {
            None
        } else {
            Some(name)
        }
    }
}
