//! In-memory membership directory for development.

use crate::error::{CampaignError, Result};
use crate::providers::{MemberStatus, MembershipProvider};
use crate::state::{GroupRef, UserId};
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

/// In-memory membership directory.
///
/// Answers lookups from a `(group, user) → status` table that the console
/// binary edits as its script runs. Users the table has never seen are
/// reported as not found, like the real platform does for strangers.
#[derive(Debug, Default)]
pub struct InMemoryDirectory {
    members: RwLock<HashMap<(GroupRef, UserId), MemberStatus>>,
}

impl InMemoryDirectory {
    /// Create an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an explicit status.
    pub fn set_status(&self, group: &GroupRef, user: UserId, status: MemberStatus) {
        self.members
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert((group.clone(), user), status);
    }

    /// `user` joins `group`.
    pub fn join(&self, group: &GroupRef, user: UserId) {
        self.set_status(group, user, MemberStatus::Member);
    }

    /// `user` leaves `group`.
    pub fn leave(&self, group: &GroupRef, user: UserId) {
        self.set_status(group, user, MemberStatus::Left);
    }
}

impl MembershipProvider for InMemoryDirectory {
    async fn member_status(&self, group: &GroupRef, user: UserId) -> Result<MemberStatus> {
        self.members
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&(group.clone(), user))
            .copied()
            .ok_or(CampaignError::MemberNotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn join_and_leave_update_status() {
        let directory = InMemoryDirectory::new();
        let group = GroupRef::new("@chat");
        let user = UserId(1);

        assert_eq!(
            directory.member_status(&group, user).await,
            Err(CampaignError::MemberNotFound)
        );

        directory.join(&group, user);
        assert_eq!(directory.member_status(&group, user).await, Ok(MemberStatus::Member));

        directory.leave(&group, user);
        assert_eq!(directory.member_status(&group, user).await, Ok(MemberStatus::Left));
    }
}
