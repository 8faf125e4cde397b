// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod dispatcher;
pub mod router;
pub mod stats;
pub mod telegram;

pub use dispatcher::{ChatTransport, DispatcherConfig, PolledBatch};
pub use router::{CommandRouter, Route};
pub use telegram::{TelegramClient, TelegramError};
