//! Onboarding effects and their execution.
//!
//! Effects are **values**, not execution. The reducer returns them while the
//! participant's lock is held; the [`EffectExecutor`] runs them after the lock
//! is released, so a slow gateway never blocks another update.

use crate::error::{CampaignError, Result};
use crate::metrics;
use crate::providers::MessagingGateway;
use crate::state::{CallbackId, ChatId, MessageRef};
use crate::view::{Notice, View};
use std::sync::Arc;
use thiserror::Error;

/// A side effect requested by the onboarding reducer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CampaignEffect {
    /// Replace the screen in `target` with `view`.
    ///
    /// # Executor Responsibility
    ///
    /// 1. Edit the message in place
    /// 2. If the edit is rejected, send `view` as a new message
    /// 3. Best-effort delete the old message
    Edit {
        /// Message holding the screen.
        target: MessageRef,
        /// Screen to show.
        view: View,
    },

    /// Send `view` as a new message.
    Reply {
        /// Destination chat.
        chat: ChatId,
        /// Screen to show.
        view: View,
    },

    /// Answer a button press with a transient alert.
    Alert {
        /// Press to answer.
        callback: CallbackId,
        /// Alert content.
        notice: Notice,
    },

    /// Answer a button press silently.
    Acknowledge {
        /// Press to answer.
        callback: CallbackId,
    },
}

impl CampaignEffect {
    /// The callback this effect answers, if any.
    #[must_use]
    pub const fn answered_callback(&self) -> Option<&CallbackId> {
        match self {
            Self::Alert { callback, .. } | Self::Acknowledge { callback } => Some(callback),
            Self::Edit { .. } | Self::Reply { .. } => None,
        }
    }

    fn ineligible_reason(&self) -> Option<crate::error::IneligibleReason> {
        match self {
            Self::Alert { notice, .. } => notice.ineligible_reason(),
            Self::Reply { view, .. } | Self::Edit { view, .. } => view.ineligible_reason(),
            Self::Acknowledge { .. } => None,
        }
    }
}

/// Effect execution stopped part-way.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{error}")]
pub struct ExecutionError {
    /// The gateway failure that stopped execution.
    pub error: CampaignError,
    /// Whether a button press was already answered before the failure.
    pub answered: bool,
}

/// Runs [`CampaignEffect`]s against a [`MessagingGateway`].
#[derive(Debug)]
pub struct EffectExecutor<G> {
    gateway: Arc<G>,
}

impl<G> Clone for EffectExecutor<G> {
    fn clone(&self) -> Self {
        Self {
            gateway: Arc::clone(&self.gateway),
        }
    }
}

impl<G: MessagingGateway> EffectExecutor<G> {
    /// Create an executor over `gateway`.
    #[must_use]
    pub const fn new(gateway: Arc<G>) -> Self {
        Self { gateway }
    }

    /// Execute effects in order.
    ///
    /// Stops at the first failure. State has already been committed, so a
    /// failure here only affects what the participant sees.
    ///
    /// # Errors
    ///
    /// Returns the first gateway error that could not be recovered from,
    /// together with whether the press had already been answered (a press
    /// can only be answered once).
    pub async fn execute(
        &self,
        effects: impl IntoIterator<Item = CampaignEffect>,
    ) -> std::result::Result<(), ExecutionError> {
        let mut answered = false;
        for effect in effects {
            if let Some(reason) = effect.ineligible_reason() {
                metrics::record_ineligible(reason);
            }
            let answers = effect.answered_callback().is_some();

            self.run(effect)
                .await
                .map_err(|error| ExecutionError { error, answered })?;
            answered |= answers;
        }
        Ok(())
    }

    async fn run(&self, effect: CampaignEffect) -> Result<()> {
        match effect {
            CampaignEffect::Edit { target, view } => {
                self.render_in_place(target, &view).await?;
            }
            CampaignEffect::Reply { chat, view } => {
                let message = self.gateway.send_view(chat, &view).await?;
                tracing::debug!(chat_id = %chat, message_id = %message, view = view.name(), "Reply sent");
            }
            CampaignEffect::Alert { callback, notice } => {
                self.gateway.answer_callback(&callback, Some(&notice)).await?;
            }
            CampaignEffect::Acknowledge { callback } => {
                self.gateway.answer_callback(&callback, None).await?;
            }
        }
        Ok(())
    }

    /// Edit `target` to show `view`, falling back to a new message.
    ///
    /// Returns the message that now shows the screen.
    ///
    /// # Errors
    ///
    /// Returns an error only if both the edit and the replacement send fail.
    pub async fn render_in_place(&self, target: MessageRef, view: &View) -> Result<MessageRef> {
        let Err(error) = self.gateway.edit_view(target, view).await else {
            return Ok(target);
        };

        tracing::warn!(
            chat_id = %target.chat,
            message_id = %target.message,
            view = view.name(),
            error = %error,
            "Edit rejected, sending a new message"
        );
        metrics::record_render_fallback();

        let message = self.gateway.send_view(target.chat, view).await?;

        if let Err(error) = self.gateway.delete_message(target).await {
            tracing::debug!(
                chat_id = %target.chat,
                message_id = %target.message,
                error = %error,
                "Could not delete replaced message"
            );
        }

        Ok(MessageRef::new(target.chat, message))
    }
}
