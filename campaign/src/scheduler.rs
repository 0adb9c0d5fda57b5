//! Deferred deletion of transient messages.
//!
//! Deletions are detached tasks: nothing waits for them, nothing cancels
//! them, and their failures ("already deleted", "no rights") are only logged.
//! Scheduling the same message twice is harmless.

use crate::providers::MessagingGateway;
use crate::state::MessageRef;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// A message that should disappear after `delay`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EphemeralMessage {
    /// The message to delete.
    pub target: MessageRef,
    /// How long it stays visible.
    pub delay: Duration,
}

/// Schedules best-effort deletions.
#[derive(Debug)]
pub struct EphemeralScheduler<G> {
    gateway: Arc<G>,
}

impl<G> Clone for EphemeralScheduler<G> {
    fn clone(&self) -> Self {
        Self {
            gateway: Arc::clone(&self.gateway),
        }
    }
}

impl<G: MessagingGateway> EphemeralScheduler<G> {
    /// Create a scheduler deleting through `gateway`.
    #[must_use]
    pub const fn new(gateway: Arc<G>) -> Self {
        Self { gateway }
    }

    /// Delete `target` after `delay`.
    ///
    /// The returned handle may be dropped; the deletion still happens.
    pub fn schedule_delete(&self, target: MessageRef, delay: Duration) -> JoinHandle<()> {
        self.schedule(EphemeralMessage { target, delay })
    }

    /// Schedule an [`EphemeralMessage`].
    pub fn schedule(&self, message: EphemeralMessage) -> JoinHandle<()> {
        let gateway = Arc::clone(&self.gateway);
        tokio::spawn(async move {
            tokio::time::sleep(message.delay).await;
            if let Err(error) = gateway.delete_message(message.target).await {
                tracing::debug!(
                    chat_id = %message.target.chat,
                    message_id = %message.target.message,
                    error = %error,
                    "Scheduled deletion failed"
                );
            }
        })
    }
}
