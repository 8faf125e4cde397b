// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod credential;
pub mod event;
pub mod record;

pub use credential::{Credential, CredentialError};
pub use event::InboundEvent;
pub use record::{Record, SenderIdentity, UNIDENTIFIED};
