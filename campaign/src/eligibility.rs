//! Process-wide eligibility table.
//!
//! One entry per participant, created lazily and never removed. Each entry sits
//! behind its own async mutex, which is the participant's critical section:
//! every read-check-mutate sequence on an [`EligibilityState`] (including the
//! membership check that gates it) runs while holding that lock.

use crate::channels::SocialChannel;
use crate::state::{EligibilityState, UserId};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::{Mutex, OwnedMutexGuard};

type Entry = Arc<Mutex<EligibilityState>>;

/// Owner of every participant's [`EligibilityState`].
///
/// Cloning is cheap; clones share the same table.
#[derive(Debug, Clone, Default)]
pub struct EligibilityStore {
    entries: Arc<RwLock<HashMap<UserId, Entry>>>,
}

impl EligibilityStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn entry(&self, user: UserId) -> Entry {
        if let Some(entry) = self
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&user)
        {
            return Arc::clone(entry);
        }

        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(entries.entry(user).or_default())
    }

    /// Enter the participant's critical section.
    ///
    /// The guard owns the lock, so it can be held across `.await` points and
    /// moved between tasks. Drop it before rendering.
    pub async fn lock(&self, user: UserId) -> OwnedMutexGuard<EligibilityState> {
        self.entry(user).lock_owned().await
    }

    /// A copy of the participant's current state.
    pub async fn snapshot(&self, user: UserId) -> EligibilityState {
        self.lock(user).await.clone()
    }

    /// Tickets allocated so far (0 for unknown participants).
    pub async fn ticket_count(&self, user: UserId) -> u32 {
        self.lock(user).await.ticket_count()
    }

    /// Channels still available for a boost.
    pub async fn remaining_channels(&self, user: UserId) -> Vec<SocialChannel> {
        self.lock(user).await.remaining_channels()
    }

    /// Number of participants seen so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether no participant has been seen yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
