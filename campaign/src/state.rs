//! Campaign state types.
//!
//! This module defines identifiers, the per-participant eligibility record and
//! the membership cache entry. All types are `Clone` so that snapshots can be
//! handed out without holding a participant's lock.

use crate::channels::{remaining_channels, SocialChannel};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

// ═══════════════════════════════════════════════════════════════════════
// ID Types
// ═══════════════════════════════════════════════════════════════════════

/// Opaque identity of a participant on the messaging platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(pub i64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a chat (private conversation or group).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChatId(pub i64);

impl fmt::Display for ChatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a message within a chat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub i32);

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A specific message: the unit that screens are edited in place on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageRef {
    /// Chat the message lives in.
    pub chat: ChatId,
    /// Message within that chat.
    pub message: MessageId,
}

impl MessageRef {
    /// Create a message reference.
    #[must_use]
    pub const fn new(chat: ChatId, message: MessageId) -> Self {
        Self { chat, message }
    }
}

/// Identifier of a button press, used to answer it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CallbackId(pub String);

impl fmt::Display for CallbackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A group or channel whose membership gates participation (`@handle` or numeric id).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GroupRef(String);

impl GroupRef {
    /// Create a group reference.
    #[must_use]
    pub fn new(handle: impl Into<String>) -> Self {
        Self(handle.into())
    }

    /// The handle as given.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GroupRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The sender of an inbound update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    /// Platform identity.
    pub id: UserId,
    /// First name, if the platform provided one.
    pub first_name: Option<String>,
    /// Last name, if the platform provided one.
    pub last_name: Option<String>,
    /// Public handle without the leading `@`.
    pub username: Option<String>,
    /// Whether the account is a bot.
    pub is_bot: bool,
}

impl Participant {
    /// A human participant known only by id.
    #[must_use]
    pub const fn anonymous(id: UserId) -> Self {
        Self {
            id,
            first_name: None,
            last_name: None,
            username: None,
            is_bot: false,
        }
    }

    /// Set the first name.
    #[must_use]
    pub fn with_first_name(mut self, name: impl Into<String>) -> Self {
        self.first_name = Some(name.into());
        self
    }

    /// Set the username.
    #[must_use]
    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    /// Mark the account as a bot.
    #[must_use]
    pub const fn bot(mut self) -> Self {
        self.is_bot = true;
        self
    }

    /// "First Last", falling back to a generic label.
    #[must_use]
    pub fn display_name(&self) -> String {
        match (&self.first_name, &self.last_name) {
            (Some(first), Some(last)) => format!("{first} {last}"),
            (Some(first), None) => first.clone(),
            (None, Some(last)) => last.clone(),
            (None, None) => "Participant".to_string(),
        }
    }

    /// `@username`, falling back to the display name.
    #[must_use]
    pub fn mention(&self) -> String {
        self.username
            .as_ref()
            .map_or_else(|| self.display_name(), |username| format!("@{username}"))
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Eligibility
// ═══════════════════════════════════════════════════════════════════════

/// What kind of media submission the participant is expected to send next.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PendingAction {
    /// No submission expected; photos are answered with a hint.
    #[default]
    None,
    /// The story for the required condition.
    AwaitingRequiredStory,
    /// A boost screenshot for the given channel.
    AwaitingBoostScreenshot(SocialChannel),
}

/// Per-participant campaign record.
///
/// Created lazily with defaults on first access and kept for the lifetime of
/// the process. Fields are only mutated through the ticket ledger and the
/// onboarding reducer, both of which run under the participant's lock.
///
/// # Examples
///
/// ```
/// # use giveaway_campaign::EligibilityState;
/// let state = EligibilityState::default();
/// assert_eq!(state.ticket_count(), 0);
/// assert!(state.is_consistent());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EligibilityState {
    pub(crate) required_condition_done: bool,
    pub(crate) required_social: Option<SocialChannel>,
    pub(crate) used_boost_socials: BTreeSet<SocialChannel>,
    pub(crate) ticket_count: u32,
    pub(crate) pending: PendingAction,
}

impl EligibilityState {
    /// Whether the required story has been accepted.
    #[must_use]
    pub const fn required_condition_done(&self) -> bool {
        self.required_condition_done
    }

    /// Channel chosen for the required condition.
    #[must_use]
    pub const fn required_social(&self) -> Option<SocialChannel> {
        self.required_social
    }

    /// Channels that already earned a boost ticket.
    #[must_use]
    pub const fn used_boost_socials(&self) -> &BTreeSet<SocialChannel> {
        &self.used_boost_socials
    }

    /// Tickets allocated so far.
    #[must_use]
    pub const fn ticket_count(&self) -> u32 {
        self.ticket_count
    }

    /// The submission currently expected.
    #[must_use]
    pub const fn pending(&self) -> PendingAction {
        self.pending
    }

    /// Whether `channel` has already served a purpose (required or boost).
    #[must_use]
    pub fn is_channel_consumed(&self, channel: SocialChannel) -> bool {
        self.required_social == Some(channel) || self.used_boost_socials.contains(&channel)
    }

    /// Channels still available for a boost, in canonical order.
    #[must_use]
    pub fn remaining_channels(&self) -> Vec<SocialChannel> {
        remaining_channels(self.required_social, &self.used_boost_socials)
    }

    /// Check the allocation invariants.
    ///
    /// - `ticket_count == (required done ? 1 : 0) + |used boosts|`
    /// - the required channel is never also a boost channel
    /// - at most `channels - 1` boosts
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        let expected = u32::from(self.required_condition_done)
            + u32::try_from(self.used_boost_socials.len()).unwrap_or(u32::MAX);
        let disjoint = self
            .required_social
            .is_none_or(|required| !self.used_boost_socials.contains(&required));

        self.ticket_count == expected
            && disjoint
            && self.used_boost_socials.len() < SocialChannel::COUNT
    }
}

/// Cached result of a membership verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MembershipCacheEntry {
    /// Whether the participant was a member of every required group.
    pub is_member: bool,
    /// When the lookup completed.
    pub checked_at: DateTime<Utc>,
}

impl MembershipCacheEntry {
    /// Whether the entry may still be served at `now`.
    #[must_use]
    pub fn is_fresh(&self, now: DateTime<Utc>, ttl: chrono::Duration) -> bool {
        now - self.checked_at < ttl
    }
}
