// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Event dispatch loop.
//!
//! A poller task long-polls the transport and pushes each event onto a
//! bounded queue; a full queue stalls the poller. Workers drain the queue
//! with bounded concurrency. Within one event the record is appended before
//! the reply is sent. Nothing is ordered across events.

use crate::models::InboundEvent;
use crate::services::router::CommandRouter;
use crate::services::telegram::TelegramError;
use async_trait::async_trait;
use futures_util::{stream, StreamExt};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

pub const DEFAULT_WORKER_COUNT: usize = 8;
pub const DEFAULT_QUEUE_CAPACITY: usize = 64;
pub const POLL_RETRY_DELAY: Duration = Duration::from_secs(5);

/// Events returned by one poll, plus the offset to poll from next.
#[derive(Debug, Default)]
pub struct PolledBatch {
    pub events: Vec<InboundEvent>,
    pub next_offset: i64,
}

/// Inbound and outbound sides of the chat platform.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Block until events are available (or the poll window elapses).
    async fn poll(&self, offset: i64) -> Result<PolledBatch, TelegramError>;

    async fn send_reply(&self, chat_id: i64, text: &str) -> Result<(), TelegramError>;
}

/// Worker pool and queue sizing.
#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    pub worker_count: usize,
    pub queue_capacity: usize,
    pub poll_retry_delay: Duration,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            worker_count: DEFAULT_WORKER_COUNT,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            poll_retry_delay: POLL_RETRY_DELAY,
        }
    }
}

/// Run the relay until `shutdown` resolves.
///
/// After shutdown the poller stops, queued events are still handled, and
/// this returns once the last in-flight event is done.
pub async fn run<F>(
    transport: Arc<dyn ChatTransport>,
    router: CommandRouter,
    config: DispatcherConfig,
    shutdown: F,
) where
    F: Future<Output = ()> + Send + 'static,
{
    let (tx, rx) = mpsc::channel(config.queue_capacity.max(1));

    tracing::info!(
        workers = config.worker_count,
        queue_capacity = config.queue_capacity,
        "Dispatcher started"
    );

    let poller = tokio::spawn(run_poller(
        transport.clone(),
        tx,
        config.poll_retry_delay,
        shutdown,
    ));

    run_workers(rx, router, transport, config.worker_count).await;

    if let Err(e) = poller.await {
        tracing::error!(error = %e, "Poller task failed");
    }
    tracing::info!("Dispatcher stopped");
}

/// Poll the transport and enqueue events until shutdown or the queue closes.
pub async fn run_poller<F>(
    transport: Arc<dyn ChatTransport>,
    tx: mpsc::Sender<InboundEvent>,
    retry_delay: Duration,
    shutdown: F,
) where
    F: Future<Output = ()> + Send,
{
    tokio::pin!(shutdown);
    let mut offset = 0;

    loop {
        let polled = tokio::select! {
            _ = &mut shutdown => break,
            polled = transport.poll(offset) => polled,
        };

        match polled {
            Ok(batch) => {
                offset = batch.next_offset;
                if !batch.events.is_empty() {
                    tracing::debug!(count = batch.events.len(), offset, "Received events");
                }
                for event in batch.events {
                    if tx.send(event).await.is_err() {
                        tracing::warn!("Event queue closed, stopping poller");
                        return;
                    }
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "Poll failed, retrying");
                tokio::select! {
                    _ = &mut shutdown => break,
                    _ = tokio::time::sleep(retry_delay) => {}
                }
            }
        }
    }

    tracing::info!("Poller stopped");
}

/// Drain the queue, handling up to `worker_count` events at once.
pub async fn run_workers(
    rx: mpsc::Receiver<InboundEvent>,
    router: CommandRouter,
    transport: Arc<dyn ChatTransport>,
    worker_count: usize,
) {
    let events = stream::unfold(rx, |mut rx| async move {
        rx.recv().await.map(|event| (event, rx))
    });

    events
        .for_each_concurrent(worker_count.max(1), |event| {
            let router = &router;
            let transport = transport.as_ref();
            async move { handle_event(router, transport, event).await }
        })
        .await;
}

/// Route one event and send its reply, if any.
pub async fn handle_event(
    router: &CommandRouter,
    transport: &dyn ChatTransport,
    event: InboundEvent,
) {
    let Some(reply) = router.dispatch(&event).await else {
        return;
    };

    if let Err(e) = transport.send_reply(event.chat_id, &reply).await {
        tracing::warn!(error = %e, chat_id = event.chat_id, "Failed to send reply");
    }
}
