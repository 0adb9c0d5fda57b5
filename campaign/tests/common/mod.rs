//! Shared harness for dispatcher integration tests.

#![allow(dead_code)]

use giveaway_campaign::mocks::{GatewayCall, MockGateway, MockMembershipProvider};
use giveaway_campaign::providers::MemberStatus;
use giveaway_campaign::{
    Button, CallbackId, CampaignConfig, CampaignEnvironment, ChatId, Dispatcher, GroupRef,
    MessageId, MessageRef, Participant, Update, UserId,
};
use giveaway_testing::{test_time, ManualClock};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// The discussion group used by guard tests.
pub const GROUP: ChatId = ChatId(-100);

/// A dispatcher wired to mocks and a manual clock.
pub struct Harness {
    pub dispatcher: Dispatcher<MockMembershipProvider, MockGateway>,
    pub provider: Arc<MockMembershipProvider>,
    pub gateway: Arc<MockGateway>,
    pub clock: ManualClock,
    callbacks: AtomicU64,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(Self::config())
    }

    pub fn config() -> CampaignConfig {
        CampaignConfig::new(GroupRef::new("@test_chat"), GroupRef::new("@test_channel"))
    }

    pub fn with_config(config: CampaignConfig) -> Self {
        Self::with_provider(MockMembershipProvider::new(), config)
    }

    /// Wire `provider`, e.g. one with injected latency.
    pub fn with_provider(provider: MockMembershipProvider, config: CampaignConfig) -> Self {
        let provider = Arc::new(provider);
        let gateway = Arc::new(MockGateway::new());
        let clock = ManualClock::new(test_time());
        let environment = CampaignEnvironment::new(Arc::clone(&provider), Arc::clone(&gateway))
            .with_clock(Arc::new(clock.clone()));

        Self {
            dispatcher: Dispatcher::new(config, environment),
            provider,
            gateway,
            clock,
            callbacks: AtomicU64::new(1),
        }
    }

    pub fn participant(user: UserId) -> Participant {
        Participant::anonymous(user).with_username(format!("user{user}"))
    }

    /// Put `user` in both required groups.
    pub fn join(&self, user: UserId) {
        self.set_status(user, MemberStatus::Member);
    }

    /// Set `user`'s status in both required groups.
    pub fn set_status(&self, user: UserId, status: MemberStatus) {
        let groups = self.dispatcher.config().required_groups();
        self.provider.set_status_in(&groups, user, status);
    }

    /// `/start`; returns the message holding the welcome screen.
    pub async fn start(&self, user: UserId) -> MessageRef {
        let before = self.gateway.calls().len();
        self.dispatcher
            .dispatch(Update::Command {
                chat: ChatId(user.0),
                from: Self::participant(user),
                name: "start".to_string(),
            })
            .await;
        let sent = self.gateway.calls()[before..]
            .iter()
            .find_map(|call| match call {
                GatewayCall::SendView { chat, message, .. } if chat.0 == user.0 => Some(*message),
                _ => None,
            })
            .unwrap_or(MessageId(0));
        MessageRef::new(ChatId(user.0), sent)
    }

    /// Press `button` on `screen`; returns the callback id used.
    pub async fn press(&self, user: UserId, screen: MessageRef, button: Button) -> CallbackId {
        self.press_raw(user, screen, button.callback_data()).await
    }

    pub async fn press_raw(&self, user: UserId, screen: MessageRef, data: &str) -> CallbackId {
        let id = CallbackId(format!(
            "cb-{}",
            self.callbacks.fetch_add(1, Ordering::Relaxed)
        ));
        self.dispatcher
            .dispatch(Update::Callback {
                id: id.clone(),
                from: Self::participant(user),
                message: screen,
                data: data.to_string(),
            })
            .await;
        id
    }

    pub async fn photo(&self, user: UserId) {
        self.dispatcher.dispatch(Self::photo_update(user)).await;
    }

    pub fn photo_update(user: UserId) -> Update {
        Update::Photo {
            chat: ChatId(user.0),
            from: Self::participant(user),
        }
    }

    pub async fn text(&self, user: UserId, text: &str) {
        self.dispatcher
            .dispatch(Update::Text {
                chat: ChatId(user.0),
                from: Self::participant(user),
                text: text.to_string(),
            })
            .await;
    }

    /// Walk a subscribed `user` through the required condition on `channel`.
    pub async fn complete_required(
        &self,
        user: UserId,
        channel: giveaway_campaign::SocialChannel,
    ) -> MessageRef {
        self.join(user);
        let screen = self.start(user).await;
        self.press(user, screen, Button::AdvanceWelcome).await;
        self.press(user, screen, Button::EnterRequired).await;
        self.press(user, screen, Button::StartRequired).await;
        self.press(user, screen, Button::Pick(channel)).await;
        self.photo(user).await;
        screen
    }
}
