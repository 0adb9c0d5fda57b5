//! Group guard: keeps non-members out of the discussion group.
//!
//! - A joiner who is not in both required groups is removed with a ban
//!   immediately followed by an unban (they may come back once subscribed).
//! - Messages from non-members are deleted.
//!
//! Every notice the guard posts deletes itself. All platform calls are best
//! effort: failures are logged and the event is dropped.

use crate::config::NoticeTtls;
use crate::eligibility::EligibilityStore;
use crate::membership::MembershipService;
use crate::metrics;
use crate::providers::{MembershipProvider, MessagingGateway};
use crate::scheduler::EphemeralScheduler;
use crate::state::{ChatId, MessageId, MessageRef, Participant};
use crate::view::Notice;
use std::sync::Arc;
use std::time::Duration;

/// Join and message moderation for the discussion group.
pub struct GroupGuard<P, G> {
    membership: Arc<MembershipService<P>>,
    gateway: Arc<G>,
    scheduler: EphemeralScheduler<G>,
    store: EligibilityStore,
    ttls: NoticeTtls,
}

impl<P, G> Clone for GroupGuard<P, G> {
    fn clone(&self) -> Self {
        Self {
            membership: Arc::clone(&self.membership),
            gateway: Arc::clone(&self.gateway),
            scheduler: self.scheduler.clone(),
            store: self.store.clone(),
            ttls: self.ttls,
        }
    }
}

impl<P: MembershipProvider, G: MessagingGateway> GroupGuard<P, G> {
    /// Create a guard.
    #[must_use]
    pub fn new(
        membership: Arc<MembershipService<P>>,
        gateway: Arc<G>,
        store: EligibilityStore,
        ttls: NoticeTtls,
    ) -> Self {
        Self {
            scheduler: EphemeralScheduler::new(Arc::clone(&gateway)),
            membership,
            gateway,
            store,
            ttls,
        }
    }

    /// Vet every human who just joined `chat`.
    #[tracing::instrument(skip_all, fields(chat_id = %chat, joined = members.len()))]
    pub async fn on_members_joined(&self, chat: ChatId, members: &[Participant]) {
        for member in members.iter().filter(|member| !member.is_bot) {
            self.vet_joiner(chat, member).await;
        }
    }

    async fn vet_joiner(&self, chat: ChatId, member: &Participant) {
        let eligible = {
            let _critical = self.store.lock(member.id).await;
            self.membership.is_eligible_member(member.id, true).await
        };

        if eligible {
            tracing::info!(user_id = %member.id, "Eligible member joined");
            let notice = Notice::JoinWelcome {
                mention: member.mention(),
            };
            self.post_ephemeral(chat, &notice, self.ttls.join_welcome).await;
            return;
        }

        tracing::info!(user_id = %member.id, "Removing non-member from group");
        if let Err(error) = self.gateway.ban_member(chat, member.id).await {
            tracing::warn!(user_id = %member.id, error = %error, "Could not remove non-member");
            return;
        }

        metrics::record_guard_removal();
        if let Err(error) = self.gateway.unban_member(chat, member.id).await {
            tracing::warn!(user_id = %member.id, error = %error, "Unban after removal failed");
        }

        let notice = Notice::JoinRejected {
            mention: member.mention(),
        };
        self.post_ephemeral(chat, &notice, self.ttls.join_rejected).await;
    }

    /// Delete `message` if its author is not a member.
    #[tracing::instrument(skip_all, fields(chat_id = %chat, user_id = %from.id))]
    pub async fn on_group_message(&self, chat: ChatId, message: MessageId, from: &Participant) {
        if from.is_bot || self.membership.is_eligible_member(from.id, false).await {
            return;
        }

        let notice = Notice::MembershipRequired {
            mention: from.mention(),
        };
        let (deleted, warning) = tokio::join!(
            self.gateway.delete_message(MessageRef::new(chat, message)),
            self.gateway.send_notice(chat, &notice),
        );

        if let Err(error) = deleted {
            tracing::warn!(message_id = %message, error = %error, "Could not delete non-member message");
        }
        match warning {
            Ok(warning) => {
                self.scheduler
                    .schedule_delete(MessageRef::new(chat, warning), self.ttls.message_warning);
            }
            Err(error) => tracing::warn!(error = %error, "Could not post membership warning"),
        }
    }

    async fn post_ephemeral(&self, chat: ChatId, notice: &Notice, ttl: Duration) {
        match self.gateway.send_notice(chat, notice).await {
            Ok(message) => {
                self.scheduler.schedule_delete(MessageRef::new(chat, message), ttl);
            }
            Err(error) => tracing::warn!(chat_id = %chat, error = %error, "Could not post notice"),
        }
    }
}
