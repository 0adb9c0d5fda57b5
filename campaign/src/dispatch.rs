//! Update dispatch.
//!
//! The dispatcher is the imperative shell around the onboarding reducer. For
//! every private-chat update it:
//!
//! 1. enters the participant's critical section,
//! 2. resolves membership if the update needs it,
//! 3. reduces the action against the participant's state,
//! 4. leaves the critical section,
//! 5. executes the resulting effects.
//!
//! Group updates go to the [`GroupGuard`]. Any failure (including a panic in a
//! handler) is caught here, logged, and answered with a retry notice; the
//! caller never sees an error.

use crate::actions::CampaignAction;
use crate::config::CampaignConfig;
use crate::effects::{EffectExecutor, ExecutionError};
use crate::eligibility::EligibilityStore;
use crate::environment::CampaignEnvironment;
use crate::error::CampaignError;
use crate::guard::GroupGuard;
use crate::ledger::TicketLedger;
use crate::membership::MembershipService;
use crate::metrics;
use crate::providers::{MembershipProvider, MessagingGateway};
use crate::reducers::{OnboardingEnvironment, OnboardingReducer};
use crate::state::{CallbackId, ChatId, UserId};
use crate::update::{Button, MembershipNeed, Update};
use crate::view::Notice;
use futures::FutureExt;
use giveaway_core::reducer::Reducer;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

/// Why an update could not be handled.
struct Failure {
    error: CampaignError,
    /// The button press was answered before the failure.
    answered: bool,
}

impl From<CampaignError> for Failure {
    fn from(error: CampaignError) -> Self {
        Self {
            error,
            answered: false,
        }
    }
}

impl From<ExecutionError> for Failure {
    fn from(failure: ExecutionError) -> Self {
        Self {
            error: failure.error,
            answered: failure.answered,
        }
    }
}

struct Inner<P, G> {
    config: CampaignConfig,
    store: EligibilityStore,
    membership: Arc<MembershipService<P>>,
    gateway: Arc<G>,
    executor: EffectExecutor<G>,
    guard: GroupGuard<P, G>,
    reducer: OnboardingReducer,
    env: OnboardingEnvironment,
}

/// Routes inbound updates. Cloning is cheap; clones share all state.
pub struct Dispatcher<P, G> {
    inner: Arc<Inner<P, G>>,
}

impl<P, G> Clone for Dispatcher<P, G> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<P: MembershipProvider, G: MessagingGateway> Dispatcher<P, G> {
    /// Wire a dispatcher from configuration and injected collaborators.
    #[must_use]
    pub fn new(config: CampaignConfig, environment: CampaignEnvironment<P, G>) -> Self {
        let store = EligibilityStore::new();
        let membership = Arc::new(MembershipService::new(
            environment.membership,
            environment.clock,
            config.required_groups(),
            config.membership_ttl,
        ));
        let gateway = environment.gateway;
        let guard = GroupGuard::new(
            Arc::clone(&membership),
            Arc::clone(&gateway),
            store.clone(),
            config.notice_ttls,
        );
        let env = OnboardingEnvironment {
            close_date: config.close_date.clone(),
            promo_asset: config.promo_asset.clone(),
        };

        Self {
            inner: Arc::new(Inner {
                store,
                membership,
                executor: EffectExecutor::new(Arc::clone(&gateway)),
                gateway,
                guard,
                reducer: OnboardingReducer::new(),
                env,
                config,
            }),
        }
    }

    /// Handle one update. Never fails.
    ///
    /// A failed button press gets the retry notice as its answer, or as a chat
    /// message when the press was already answered.
    #[tracing::instrument(skip_all, fields(kind = update.kind(), user_id = tracing::field::Empty))]
    pub async fn dispatch(&self, update: Update) {
        if let Some(user) = update.user() {
            tracing::Span::current().record("user_id", tracing::field::display(user));
        }

        let callback = match &update {
            Update::Callback { id, .. } => Some(id.clone()),
            _ => None,
        };
        let private_chat = match &update {
            Update::Command { chat, .. } | Update::Text { chat, .. } | Update::Photo { chat, .. } => {
                Some(*chat)
            }
            Update::Callback { message, .. } => Some(message.chat),
            Update::MembersJoined { .. } | Update::GroupMessage { .. } => None,
        };

        let failure = match AssertUnwindSafe(self.handle(update)).catch_unwind().await {
            Ok(Ok(())) => return,
            Ok(Err(failure)) => failure,
            Err(_) => Failure::from(CampaignError::Internal("update handler panicked".to_string())),
        };

        tracing::error!(error = %failure.error, answered = failure.answered, "Update handling failed");
        metrics::record_dispatch_failure();
        let callback = callback.filter(|_| !failure.answered);
        self.notify_retry(callback, private_chat).await;
    }

    /// The eligibility table.
    #[must_use]
    pub fn store(&self) -> &EligibilityStore {
        &self.inner.store
    }

    /// Ledger over the eligibility table.
    #[must_use]
    pub fn ledger(&self) -> TicketLedger {
        TicketLedger::new(self.inner.store.clone())
    }

    /// The membership verification service.
    #[must_use]
    pub fn membership(&self) -> &MembershipService<P> {
        &self.inner.membership
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &CampaignConfig {
        &self.inner.config
    }

    async fn handle(&self, update: Update) -> Result<(), Failure> {
        match update {
            Update::Command { chat, from, name } => {
                if name == "start" {
                    self.run(from.id, MembershipNeed::None, |_| CampaignAction::Start { chat })
                        .await
                } else {
                    tracing::debug!(command = %name, "Ignoring unknown command");
                    Ok(())
                }
            }

            Update::Callback {
                id,
                from,
                message,
                data,
            } => {
                let Some(button) = Button::parse(&data) else {
                    tracing::debug!(data = %data, "Ignoring unknown callback data");
                    return Ok(self.inner.gateway.answer_callback(&id, None).await?);
                };

                self.run(from.id, button.membership_need(), |membership| {
                    CampaignAction::Pressed {
                        button,
                        origin: message,
                        callback: id,
                        membership,
                        participant: from,
                    }
                })
                .await
            }

            Update::Text { chat, from, .. } => {
                self.run(from.id, MembershipNeed::Cached, |membership| {
                    CampaignAction::TextReceived {
                        chat,
                        membership: membership.unwrap_or(false),
                    }
                })
                .await
            }

            Update::Photo { chat, from } => {
                self.run(from.id, MembershipNeed::Cached, |membership| {
                    CampaignAction::MediaReceived {
                        chat,
                        membership: membership.unwrap_or(false),
                    }
                })
                .await
            }

            Update::MembersJoined { chat, members } => {
                self.inner.guard.on_members_joined(chat, &members).await;
                Ok(())
            }

            Update::GroupMessage {
                chat,
                message,
                from,
            } => {
                self.inner.guard.on_group_message(chat, message, &from).await;
                Ok(())
            }
        }
    }

    /// Reduce under the participant's lock, then execute effects outside it.
    async fn run<F>(
        &self,
        user: UserId,
        need: MembershipNeed,
        action: F,
    ) -> Result<(), Failure>
    where
        F: FnOnce(Option<bool>) -> CampaignAction,
    {
        let effects = {
            let mut state = self.inner.store.lock(user).await;
            let membership = match need {
                MembershipNeed::None => None,
                MembershipNeed::Cached => {
                    Some(self.inner.membership.is_eligible_member(user, false).await)
                }
                MembershipNeed::Fresh => {
                    Some(self.inner.membership.is_eligible_member(user, true).await)
                }
            };

            let effects = self
                .inner
                .reducer
                .reduce(&mut state, action(membership), &self.inner.env);
            tracing::debug!(
                tickets = state.ticket_count(),
                pending = ?state.pending(),
                effects = effects.len(),
                "Action reduced"
            );
            effects
        };

        Ok(self.inner.executor.execute(effects).await?)
    }

    async fn notify_retry(&self, callback: Option<CallbackId>, chat: Option<ChatId>) {
        let delivered = match (callback, chat) {
            (Some(callback), _) => {
                self.inner
                    .gateway
                    .answer_callback(&callback, Some(&Notice::Retry))
                    .await
            }
            (None, Some(chat)) => self
                .inner
                .gateway
                .send_notice(chat, &Notice::Retry)
                .await
                .map(|_| ()),
            (None, None) => Ok(()),
        };

        if let Err(error) = delivered {
            tracing::warn!(error = %error, "Could not deliver retry notice");
        }
    }
}
