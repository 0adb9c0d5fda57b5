//! Onboarding actions.
//!
//! Actions are built by the dispatcher after every external fact the reducer
//! needs (membership in particular) has been resolved, so reducing stays pure.

use crate::state::{CallbackId, ChatId, MessageRef, Participant};
use crate::update::Button;

/// Input to the onboarding reducer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CampaignAction {
    /// `/start` in a private chat.
    Start {
        /// Where to send the welcome screen.
        chat: ChatId,
    },

    /// A recognised inline button was pressed.
    Pressed {
        /// Which button.
        button: Button,
        /// The message holding the screen (edited in place).
        origin: MessageRef,
        /// Press to answer.
        callback: CallbackId,
        /// Membership, when [`Button::membership_need`] asked for it.
        membership: Option<bool>,
        /// Who pressed.
        participant: Participant,
    },

    /// Plain text in the private chat.
    TextReceived {
        /// Where to reply.
        chat: ChatId,
        /// Cached membership.
        membership: bool,
    },

    /// An image in the private chat.
    MediaReceived {
        /// Where to reply.
        chat: ChatId,
        /// Cached membership.
        membership: bool,
    },
}
