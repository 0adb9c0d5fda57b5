//! Inbound updates from the messaging platform.

use crate::channels::SocialChannel;
use crate::state::{CallbackId, ChatId, MessageId, MessageRef, Participant, UserId};
use serde::{Deserialize, Serialize};

/// A transport-neutral inbound event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Update {
    /// A `/command` in a private chat.
    Command {
        /// Private chat with the participant.
        chat: ChatId,
        /// Sender.
        from: Participant,
        /// Command name without the slash.
        name: String,
    },
    /// An inline button press.
    Callback {
        /// Id used to answer the press.
        id: CallbackId,
        /// Who pressed.
        from: Participant,
        /// The message the button belongs to.
        message: MessageRef,
        /// Raw callback data.
        data: String,
    },
    /// Plain text in a private chat.
    Text {
        /// Private chat with the participant.
        chat: ChatId,
        /// Sender.
        from: Participant,
        /// Message text.
        text: String,
    },
    /// An image in a private chat.
    Photo {
        /// Private chat with the participant.
        chat: ChatId,
        /// Sender.
        from: Participant,
    },
    /// New members joined the discussion group.
    MembersJoined {
        /// The group.
        chat: ChatId,
        /// Who joined.
        members: Vec<Participant>,
    },
    /// An ordinary message in the discussion group.
    GroupMessage {
        /// The group.
        chat: ChatId,
        /// The message.
        message: MessageId,
        /// Sender.
        from: Participant,
    },
}

impl Update {
    /// The participant whose state this update touches, for private-chat updates.
    #[must_use]
    pub const fn private_sender(&self) -> Option<&Participant> {
        match self {
            Self::Command { from, .. }
            | Self::Callback { from, .. }
            | Self::Text { from, .. }
            | Self::Photo { from, .. } => Some(from),
            Self::MembersJoined { .. } | Self::GroupMessage { .. } => None,
        }
    }

    /// Short stable name for logs.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Command { .. } => "command",
            Self::Callback { .. } => "callback",
            Self::Text { .. } => "text",
            Self::Photo { .. } => "photo",
            Self::MembersJoined { .. } => "members_joined",
            Self::GroupMessage { .. } => "group_message",
        }
    }

    /// The acting user, if there is exactly one.
    #[must_use]
    pub fn user(&self) -> Option<UserId> {
        match self {
            Self::GroupMessage { from, .. } => Some(from.id),
            other => other.private_sender().map(|from| from.id),
        }
    }
}

/// Which membership answer a button needs before it can be reduced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MembershipNeed {
    /// Membership does not matter.
    None,
    /// A cached answer is good enough.
    Cached,
    /// Bypass the cache and ask the platform.
    Fresh,
}

/// The closed set of inline actions.
///
/// Back controls reuse forward identifiers: the required-condition screen goes
/// back with [`Button::AdvanceWelcome`], the picker with
/// [`Button::EnterRequired`], the awaiting-story screen with
/// [`Button::StartRequired`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Button {
    /// Welcome → subscription check.
    AdvanceWelcome,
    /// Re-verify membership.
    CheckSubscription,
    /// Subscription check → required condition.
    EnterRequired,
    /// Required condition → channel picker.
    StartRequired,
    /// Open the boost flow.
    EnterBoost,
    /// Pick a channel.
    Pick(SocialChannel),
    /// Show the ticket profile.
    ViewTickets,
    /// Back to the welcome screen.
    BackToWelcome,
    /// Back to the main menu.
    BackToMenu,
}

impl Button {
    /// Every button.
    pub const ALL: [Self; 11] = [
        Self::AdvanceWelcome,
        Self::CheckSubscription,
        Self::EnterRequired,
        Self::StartRequired,
        Self::EnterBoost,
        Self::Pick(SocialChannel::Telegram),
        Self::Pick(SocialChannel::WhatsApp),
        Self::Pick(SocialChannel::Instagram),
        Self::ViewTickets,
        Self::BackToWelcome,
        Self::BackToMenu,
    ];

    /// Callback data attached to the control.
    #[must_use]
    pub const fn callback_data(self) -> &'static str {
        match self {
            Self::AdvanceWelcome => "advance_welcome",
            Self::CheckSubscription => "check_subscription",
            Self::EnterRequired => "enter_required",
            Self::StartRequired => "start_required",
            Self::EnterBoost => "enter_boost",
            Self::Pick(SocialChannel::Telegram) => "pick_telegram",
            Self::Pick(SocialChannel::WhatsApp) => "pick_whatsapp",
            Self::Pick(SocialChannel::Instagram) => "pick_instagram",
            Self::ViewTickets => "view_tickets",
            Self::BackToWelcome => "back_to_welcome",
            Self::BackToMenu => "back_to_menu",
        }
    }

    /// Parse callback data. Unknown data yields `None`.
    #[must_use]
    pub fn parse(data: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|button| button.callback_data() == data)
    }

    /// Membership answer required before reducing this press.
    #[must_use]
    pub const fn membership_need(self) -> MembershipNeed {
        match self {
            Self::AdvanceWelcome | Self::CheckSubscription => MembershipNeed::Fresh,
            Self::EnterRequired | Self::StartRequired | Self::EnterBoost | Self::Pick(_) => {
                MembershipNeed::Cached
            }
            Self::ViewTickets | Self::BackToWelcome | Self::BackToMenu => MembershipNeed::None,
        }
    }
}
