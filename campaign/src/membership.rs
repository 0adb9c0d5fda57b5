//! Membership verification with a TTL cache.
//!
//! A participant is eligible when they belong to both the discussion group
//! and the broadcast channel. Answers are cached per participant for the
//! configured TTL; stale entries are refreshed lazily on the next read.
//!
//! The service never fails: lookup errors count as "not a member", and if the
//! lookups themselves blow up the last cached answer (or `false`) is used.

use crate::error::{CampaignError, Result};
use crate::metrics::{self, CheckSource};
use crate::providers::{MemberStatus, MembershipProvider};
use crate::state::{GroupRef, MembershipCacheEntry, UserId};
use futures::future::join_all;
use giveaway_core::environment::Clock;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

/// TTL-cached membership verification.
pub struct MembershipService<P> {
    provider: Arc<P>,
    clock: Arc<dyn Clock>,
    groups: [GroupRef; 2],
    ttl: chrono::Duration,
    cache: RwLock<HashMap<UserId, MembershipCacheEntry>>,
}

impl<P: MembershipProvider> MembershipService<P> {
    /// Create a service checking `groups` through `provider`.
    #[must_use]
    pub fn new(provider: Arc<P>, clock: Arc<dyn Clock>, groups: [GroupRef; 2], ttl: Duration) -> Self {
        Self {
            provider,
            clock,
            groups,
            ttl: chrono::Duration::from_std(ttl).unwrap_or(chrono::TimeDelta::MAX),
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Whether `user` is a member of both required groups.
    ///
    /// With `bypass_cache` the platform is always asked; otherwise a fresh
    /// cache entry is returned without any external call.
    #[tracing::instrument(skip(self), fields(user_id = %user))]
    pub async fn is_eligible_member(&self, user: UserId, bypass_cache: bool) -> bool {
        let cached = self.cache_entry(user);

        if let Some(entry) =
            cached.filter(|entry| !bypass_cache && entry.is_fresh(self.clock.now(), self.ttl))
        {
            metrics::record_membership_check(CheckSource::Cache);
            return entry.is_member;
        }

        match self.lookup(user).await {
            Ok(is_member) => {
                let entry = MembershipCacheEntry {
                    is_member,
                    checked_at: self.clock.now(),
                };
                self.cache
                    .write()
                    .unwrap_or_else(PoisonError::into_inner)
                    .insert(user, entry);
                metrics::record_membership_check(CheckSource::Lookup);
                tracing::debug!(is_member, "Membership verified");
                is_member
            }
            Err(error) => {
                let fallback = cached.is_some_and(|entry| entry.is_member);
                metrics::record_membership_check(CheckSource::Fallback);
                tracing::error!(error = %error, fallback, "Membership check failed, using last known value");
                fallback
            }
        }
    }

    /// The cached answer for `user`, fresh or not.
    #[must_use]
    pub fn cache_entry(&self, user: UserId) -> Option<MembershipCacheEntry> {
        self.cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&user)
            .copied()
    }

    /// The groups a participant must belong to.
    #[must_use]
    pub const fn groups(&self) -> &[GroupRef; 2] {
        &self.groups
    }

    /// Query every group concurrently and AND the results.
    ///
    /// Individual lookup errors are not errors here; they mean "not a
    /// member". Only a lookup task that dies is reported.
    async fn lookup(&self, user: UserId) -> Result<bool> {
        let lookups = self.groups.iter().cloned().map(|group| {
            let provider = Arc::clone(&self.provider);
            tokio::spawn(async move {
                let status = provider.member_status(&group, user).await;
                (group, status)
            })
        });

        let mut is_member = true;
        for joined in join_all(lookups).await {
            let (group, status) =
                joined.map_err(|e| CampaignError::Internal(format!("membership lookup task: {e}")))?;
            is_member &= Self::interpret(&group, user, status);
        }
        Ok(is_member)
    }

    fn interpret(group: &GroupRef, user: UserId, status: Result<MemberStatus>) -> bool {
        match status {
            Ok(status) => status.is_member(),
            Err(CampaignError::MemberNotFound) => {
                tracing::debug!(group = %group, user_id = %user, "Member not found");
                false
            }
            Err(error) => {
                tracing::warn!(group = %group, user_id = %user, error = %error, "Membership lookup failed");
                metrics::record_lookup_failure();
                false
            }
        }
    }
}

impl<P> std::fmt::Debug for MembershipService<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MembershipService")
            .field("groups", &self.groups)
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}
