//! Error types for campaign operations.

use crate::channels::SocialChannel;
use thiserror::Error;

/// Result type alias for campaign operations.
pub type Result<T> = std::result::Result<T, CampaignError>;

/// Why a participant's action was refused.
///
/// Ineligible actions never mutate state; they surface as a transient notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IneligibleReason {
    /// The channel already served as the required or a boost channel.
    ChannelAlreadyUsed(SocialChannel),
    /// Media arrived while no submission was expected.
    NoPendingSubmission,
    /// The participant has not joined every required group.
    NotSubscribed,
    /// The boost flow was entered before the required condition.
    RequiredConditionMissing,
}

impl IneligibleReason {
    /// Stable label for metrics and logs.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::ChannelAlreadyUsed(_) => "channel_already_used",
            Self::NoPendingSubmission => "no_pending_submission",
            Self::NotSubscribed => "not_subscribed",
            Self::RequiredConditionMissing => "required_condition_missing",
        }
    }
}

/// Error taxonomy for the campaign engine.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CampaignError {
    // ═══════════════════════════════════════════════════════════
    // Membership Lookups
    // ═══════════════════════════════════════════════════════════

    /// The platform does not know the participant in that group.
    #[error("Member not found")]
    MemberNotFound,

    /// The membership lookup itself failed.
    #[error("Membership lookup failed: {reason}")]
    LookupFailed {
        /// Reason reported by the platform
        reason: String,
    },

    // ═══════════════════════════════════════════════════════════
    // Messaging Gateway
    // ═══════════════════════════════════════════════════════════

    /// An in-place edit was rejected (stale message, wrong content type).
    #[error("Render rejected: {reason}")]
    RenderRejected {
        /// Reason reported by the gateway
        reason: String,
    },

    /// The target message no longer exists.
    #[error("Message not found")]
    MessageNotFound,

    /// Sending, deleting or moderating failed.
    #[error("Delivery failed: {reason}")]
    DeliveryFailed {
        /// Reason reported by the gateway
        reason: String,
    },

    // ═══════════════════════════════════════════════════════════
    // Campaign Rules
    // ═══════════════════════════════════════════════════════════

    /// The participant may not do this right now.
    #[error("Ineligible action: {}", .0.label())]
    Ineligible(IneligibleReason),

    // ═══════════════════════════════════════════════════════════
    // System Errors
    // ═══════════════════════════════════════════════════════════

    /// A configuration value is missing or malformed.
    #[error("Invalid configuration for {key}: {reason}")]
    Config {
        /// Environment key
        key: String,
        /// What was wrong with it
        reason: String,
    },

    /// Unexpected failure (should not be exposed to participants).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CampaignError {
    /// Returns `true` if this error came from a membership lookup.
    ///
    /// # Examples
    ///
    /// ```
    /// # use giveaway_campaign::CampaignError;
    /// assert!(CampaignError::MemberNotFound.is_lookup_failure());
    /// assert!(!CampaignError::MessageNotFound.is_lookup_failure());
    /// ```
    #[must_use]
    pub const fn is_lookup_failure(&self) -> bool {
        matches!(self, Self::MemberNotFound | Self::LookupFailed { .. })
    }

    /// Returns `true` if the participant caused this error.
    ///
    /// # Examples
    ///
    /// ```
    /// # use giveaway_campaign::{CampaignError, IneligibleReason};
    /// assert!(CampaignError::Ineligible(IneligibleReason::NotSubscribed).is_user_error());
    /// assert!(!CampaignError::Internal("boom".into()).is_user_error());
    /// ```
    #[must_use]
    pub const fn is_user_error(&self) -> bool {
        matches!(self, Self::Ineligible(_))
    }
}
