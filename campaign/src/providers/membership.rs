//! Membership lookup provider trait.

use crate::error::Result;
use crate::state::{GroupRef, UserId};
use serde::{Deserialize, Serialize};

/// A participant's standing in a group, as reported by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MemberStatus {
    /// Created the group.
    Owner,
    /// Group administrator.
    Administrator,
    /// Regular member.
    Member,
    /// Member with restricted permissions (still a member).
    Restricted,
    /// Left the group.
    Left,
    /// Removed by an administrator.
    Banned,
}

impl MemberStatus {
    /// Whether this status counts as membership.
    ///
    /// # Examples
    ///
    /// ```
    /// # use giveaway_campaign::providers::MemberStatus;
    /// assert!(MemberStatus::Restricted.is_member());
    /// assert!(!MemberStatus::Left.is_member());
    /// ```
    #[must_use]
    pub const fn is_member(self) -> bool {
        matches!(
            self,
            Self::Owner | Self::Administrator | Self::Member | Self::Restricted
        )
    }
}

/// Membership lookup.
///
/// This trait abstracts over the platform's "get chat member" query.
pub trait MembershipProvider: Send + Sync + 'static {
    /// Look up `user` in `group`.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - The platform does not know the user in that group (`MemberNotFound`)
    /// - The request fails (`LookupFailed`)
    fn member_status(
        &self,
        group: &GroupRef,
        user: UserId,
    ) -> impl std::future::Future<Output = Result<MemberStatus>> + Send;
}
