//! Mock membership provider for testing.

use crate::error::{CampaignError, Result};
use crate::providers::{MemberStatus, MembershipProvider};
use crate::state::{GroupRef, UserId};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

/// Mock membership provider.
///
/// Unknown `(group, user)` pairs are reported as [`CampaignError::MemberNotFound`].
#[derive(Debug, Default)]
pub struct MockMembershipProvider {
    statuses: Mutex<HashMap<(GroupRef, UserId), MemberStatus>>,
    failures: Mutex<HashMap<GroupRef, CampaignError>>,
    lookups: AtomicUsize,
    panic_on_lookup: AtomicBool,
    latency: Option<Duration>,
}

impl MockMembershipProvider {
    /// Create a provider that knows nobody.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every lookup by `latency` (tokio time, so paused clocks apply).
    #[must_use]
    pub const fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Set `user`'s status in `group`.
    pub fn set_status(&self, group: &GroupRef, user: UserId, status: MemberStatus) {
        self.statuses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert((group.clone(), user), status);
    }

    /// Set `user`'s status in every group of `groups`.
    pub fn set_status_in<'a>(
        &self,
        groups: impl IntoIterator<Item = &'a GroupRef>,
        user: UserId,
        status: MemberStatus,
    ) {
        for group in groups {
            self.set_status(group, user, status);
        }
    }

    /// Make every lookup in `group` fail with `error`.
    pub fn fail_lookups(&self, group: &GroupRef, error: CampaignError) {
        self.failures
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(group.clone(), error);
    }

    /// Stop injecting lookup failures.
    pub fn clear_failures(&self) {
        self.failures
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Make lookups panic, simulating a crashed lookup task.
    pub fn panic_on_lookup(&self, enabled: bool) {
        self.panic_on_lookup.store(enabled, Ordering::SeqCst);
    }

    /// Number of lookups served so far.
    #[must_use]
    pub fn lookup_count(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

impl MembershipProvider for MockMembershipProvider {
    #[allow(clippy::panic)] // Injected on purpose
    async fn member_status(&self, group: &GroupRef, user: UserId) -> Result<MemberStatus> {
        self.lookups.fetch_add(1, Ordering::SeqCst);

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        if self.panic_on_lookup.load(Ordering::SeqCst) {
            panic!("injected membership lookup panic");
        }

        let failure = self
            .failures
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(group)
            .cloned();
        if let Some(error) = failure {
            return Err(error);
        }

        self.statuses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&(group.clone(), user))
            .copied()
            .ok_or(CampaignError::MemberNotFound)
    }
}
