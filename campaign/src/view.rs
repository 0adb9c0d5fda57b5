//! Render requests.
//!
//! The engine never formats text or builds keyboards. It describes *which*
//! screen to show with the facts that screen needs, and the messaging gateway
//! turns that into text, media and inline controls.

use crate::channels::SocialChannel;
use crate::error::IneligibleReason;
use crate::state::UserId;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A screen of the onboarding message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "screen", rename_all = "snake_case")]
pub enum View {
    /// Campaign introduction with a single "next" control.
    Welcome,

    /// Membership check result.
    ///
    /// Members get only the "proceed" control; everyone else gets the join
    /// links plus a "recheck" control.
    Subscription {
        /// Whether the participant is in both required groups.
        subscribed: bool,
    },

    /// Call to action for the required story.
    RequiredCondition {
        /// Image to attach, rendered as text only when absent.
        promo_asset: Option<PathBuf>,
        /// Shown when the participant tried to boost too early.
        reminder: bool,
    },

    /// Channel selection. The offered list is already filtered.
    SocialPicker {
        /// Channels the participant may pick, in canonical order.
        offered: Vec<SocialChannel>,
    },

    /// Waiting for the required story screenshot.
    AwaitingStory {
        /// Channel picked for the required condition.
        channel: SocialChannel,
    },

    /// Waiting for a boost screenshot.
    AwaitingScreenshot {
        /// Channel picked for this boost.
        channel: SocialChannel,
        /// Channels that are still free (to allow switching).
        remaining: Vec<SocialChannel>,
    },

    /// Boost overview once the required condition is done.
    Boost {
        /// Current ticket count.
        tickets: u32,
        /// Channel that satisfied the required condition.
        required_social: Option<SocialChannel>,
        /// Channels that can still earn a boost.
        remaining: Vec<SocialChannel>,
    },

    /// Main menu after a grant or when navigating back.
    Menu {
        /// Current ticket count.
        tickets: u32,
        /// Channel whose submission was just accepted, if any.
        granted: Option<SocialChannel>,
        /// Channels that can still earn a boost.
        remaining: Vec<SocialChannel>,
    },

    /// Terminal screen: every channel is used, only the profile remains.
    Completed {
        /// Final ticket count.
        tickets: u32,
        /// Channel whose submission was just accepted, if any.
        granted: Option<SocialChannel>,
    },

    /// Read-only ticket summary.
    Profile {
        /// Participant display name.
        name: String,
        /// Participant id.
        user: UserId,
        /// Current ticket count.
        tickets: u32,
        /// Draw date, when configured.
        close_date: Option<String>,
        /// Whether the boost control is still offered.
        can_boost: bool,
    },

    /// Reply to free text: what to do next.
    Hint {
        /// Cached membership.
        subscribed: bool,
        /// Whether the required condition is done.
        required_done: bool,
        /// Current ticket count.
        tickets: u32,
    },

    /// Reply to a photo nobody asked for.
    SubmissionIgnored {
        /// Cached membership.
        subscribed: bool,
        /// Whether the required condition is done.
        required_done: bool,
    },

    /// Reply to a submission that can no longer be accepted.
    Rejected {
        /// Why it was refused.
        notice: Notice,
        /// Channels that are still free.
        remaining: Vec<SocialChannel>,
    },
}

impl View {
    /// Short stable name for logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Welcome => "welcome",
            Self::Subscription { .. } => "subscription",
            Self::RequiredCondition { .. } => "required_condition",
            Self::SocialPicker { .. } => "social_picker",
            Self::AwaitingStory { .. } => "awaiting_story",
            Self::AwaitingScreenshot { .. } => "awaiting_screenshot",
            Self::Boost { .. } => "boost",
            Self::Menu { .. } => "menu",
            Self::Completed { .. } => "completed",
            Self::Profile { .. } => "profile",
            Self::Hint { .. } => "hint",
            Self::SubmissionIgnored { .. } => "submission_ignored",
            Self::Rejected { .. } => "rejected",
        }
    }

    /// The refusal this screen reports, if it reports one.
    #[must_use]
    pub const fn ineligible_reason(&self) -> Option<IneligibleReason> {
        match self {
            Self::SubmissionIgnored {
                subscribed: false, ..
            } => Some(IneligibleReason::NotSubscribed),
            Self::SubmissionIgnored { .. } => Some(IneligibleReason::NoPendingSubmission),
            Self::Rejected { notice, .. } => notice.ineligible_reason(),
            _ => None,
        }
    }
}

/// A transient message: a button alert or a self-deleting group notice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "notice", rename_all = "snake_case")]
pub enum Notice {
    /// The channel already served the required condition or a boost.
    ChannelAlreadyUsed {
        /// The channel in question.
        channel: SocialChannel,
    },
    /// The participant must join the group and channel first.
    NotSubscribed,
    /// The required condition must be done before boosting.
    RequiredFirst,
    /// Something went wrong; try again.
    Retry,
    /// A non-member joined the group and was removed.
    JoinRejected {
        /// How to address the participant.
        mention: String,
    },
    /// An eligible participant joined the group.
    JoinWelcome {
        /// How to address the participant.
        mention: String,
    },
    /// A non-member's group message was deleted.
    MembershipRequired {
        /// How to address the participant.
        mention: String,
    },
}

impl Notice {
    /// The refusal this notice reports, if it reports one.
    #[must_use]
    pub const fn ineligible_reason(&self) -> Option<IneligibleReason> {
        match self {
            Self::ChannelAlreadyUsed { channel } => {
                Some(IneligibleReason::ChannelAlreadyUsed(*channel))
            }
            Self::NotSubscribed => Some(IneligibleReason::NotSubscribed),
            Self::RequiredFirst => Some(IneligibleReason::RequiredConditionMissing),
            _ => None,
        }
    }
}
