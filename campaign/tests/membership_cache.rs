//! Membership caching as seen through the dispatcher.

mod common;

use common::Harness;
use giveaway_campaign::providers::MemberStatus;
use giveaway_campaign::mocks::MockMembershipProvider;
use giveaway_campaign::{Button, CampaignError, PendingAction, SocialChannel, UserId, View};
use giveaway_testing::test_time;
use std::time::Duration;

const ALICE: UserId = UserId(1);

#[tokio::test]
async fn cached_answer_is_reused_until_the_ttl_expires() {
    let harness = Harness::new();
    harness.join(ALICE);
    let screen = harness.start(ALICE).await;
    assert_eq!(harness.provider.lookup_count(), 0);

    harness.press(ALICE, screen, Button::AdvanceWelcome).await;
    assert_eq!(harness.provider.lookup_count(), 2);

    harness.press(ALICE, screen, Button::EnterRequired).await;
    harness.press(ALICE, screen, Button::StartRequired).await;
    assert_eq!(harness.provider.lookup_count(), 2);

    harness.clock.advance(chrono::Duration::seconds(301));
    harness.press(ALICE, screen, Button::EnterRequired).await;
    assert_eq!(harness.provider.lookup_count(), 4);
}

#[tokio::test]
async fn check_button_always_asks_the_platform() {
    let harness = Harness::new();
    harness.join(ALICE);
    let screen = harness.start(ALICE).await;

    harness.press(ALICE, screen, Button::AdvanceWelcome).await;
    harness.press(ALICE, screen, Button::CheckSubscription).await;
    harness.press(ALICE, screen, Button::CheckSubscription).await;

    assert_eq!(harness.provider.lookup_count(), 6);
}

#[tokio::test]
async fn leaving_is_noticed_on_the_next_fresh_check() {
    let harness = Harness::new();
    harness.join(ALICE);
    let screen = harness.start(ALICE).await;
    harness.press(ALICE, screen, Button::AdvanceWelcome).await;

    harness.set_status(ALICE, MemberStatus::Left);

    // Still inside the TTL: the cached answer stands.
    harness.press(ALICE, screen, Button::EnterRequired).await;
    assert!(matches!(
        harness.gateway.last_view(),
        Some(View::RequiredCondition { .. })
    ));

    harness.press(ALICE, screen, Button::CheckSubscription).await;
    assert_eq!(
        harness.gateway.last_view(),
        Some(View::Subscription { subscribed: false })
    );
}

#[tokio::test]
async fn failed_lookup_counts_as_not_a_member() {
    let harness = Harness::new();
    harness.join(ALICE);
    let screen = harness.start(ALICE).await;
    harness.press(ALICE, screen, Button::AdvanceWelcome).await;

    let [chat, _] = harness.dispatcher.config().required_groups();
    harness.provider.fail_lookups(
        &chat,
        CampaignError::LookupFailed {
            reason: "timeout".to_string(),
        },
    );
    harness.press(ALICE, screen, Button::CheckSubscription).await;

    assert_eq!(
        harness.gateway.last_view(),
        Some(View::Subscription { subscribed: false })
    );

    harness.provider.clear_failures();
    harness.press(ALICE, screen, Button::CheckSubscription).await;
    assert_eq!(
        harness.gateway.last_view(),
        Some(View::Subscription { subscribed: true })
    );
}

#[tokio::test]
async fn entry_is_stale_exactly_at_the_ttl() {
    let harness = Harness::new();
    harness.join(ALICE);
    let screen = harness.start(ALICE).await;
    harness.press(ALICE, screen, Button::AdvanceWelcome).await;
    assert_eq!(harness.provider.lookup_count(), 2);

    harness.clock.set(test_time() + chrono::Duration::seconds(299));
    harness.press(ALICE, screen, Button::EnterRequired).await;
    assert_eq!(harness.provider.lookup_count(), 2);

    harness.clock.set(test_time() + chrono::Duration::seconds(300));
    harness.press(ALICE, screen, Button::EnterRequired).await;
    assert_eq!(harness.provider.lookup_count(), 4);
}

#[tokio::test(start_paused = true)]
async fn slow_lookups_do_not_let_a_screenshot_count_twice() {
    let harness = Harness::with_provider(
        MockMembershipProvider::new().with_latency(Duration::from_millis(50)),
        Harness::config(),
    );
    let screen = harness
        .complete_required(ALICE, SocialChannel::Instagram)
        .await;
    harness
        .press(ALICE, screen, Button::Pick(SocialChannel::Telegram))
        .await;

    // Both photos must go back to the platform while holding the user.
    harness.clock.advance(chrono::Duration::seconds(301));
    tokio::join!(
        harness.dispatcher.dispatch(Harness::photo_update(ALICE)),
        harness.dispatcher.dispatch(Harness::photo_update(ALICE)),
    );

    let state = harness.dispatcher.store().snapshot(ALICE).await;
    assert_eq!(state.ticket_count(), 2);
    assert!(state.is_consistent());
    assert_eq!(state.pending(), PendingAction::None);

    let views = harness.gateway.views();
    let replies = &views[views.len() - 2..];
    assert!(replies.iter().any(|view| matches!(view, View::Menu { tickets: 2, .. })));
    assert!(replies
        .iter()
        .any(|view| matches!(view, View::SubmissionIgnored { .. })));
}

#[tokio::test(start_paused = true)]
async fn slow_lookups_serialise_a_pick_against_a_screenshot() {
    let harness = Harness::with_provider(
        MockMembershipProvider::new().with_latency(Duration::from_millis(50)),
        Harness::config(),
    );
    let screen = harness
        .complete_required(ALICE, SocialChannel::Instagram)
        .await;
    harness
        .press(ALICE, screen, Button::Pick(SocialChannel::Telegram))
        .await;

    harness.clock.advance(chrono::Duration::seconds(301));
    tokio::join!(
        harness.press(ALICE, screen, Button::Pick(SocialChannel::WhatsApp)),
        harness.photo(ALICE),
    );

    // Whichever ran first, exactly one boost was granted.
    let state = harness.dispatcher.store().snapshot(ALICE).await;
    assert_eq!(state.ticket_count(), 2);
    assert!(state.is_consistent());
}

#[tokio::test]
async fn crashed_lookup_reuses_the_last_known_answer() {
    let harness = Harness::new();
    harness.join(ALICE);
    let screen = harness.start(ALICE).await;
    harness.press(ALICE, screen, Button::AdvanceWelcome).await;

    harness.provider.panic_on_lookup(true);
    harness.press(ALICE, screen, Button::CheckSubscription).await;

    assert_eq!(
        harness.gateway.last_view(),
        Some(View::Subscription { subscribed: true })
    );
}

#[tokio::test]
async fn failed_channel_lookup_blocks_the_flow() {
    let harness = Harness::new();
    harness.join(ALICE);
    let [_, channel] = harness.dispatcher.config().required_groups();
    harness.provider.fail_lookups(
        &channel,
        CampaignError::LookupFailed {
            reason: "bad gateway".to_string(),
        },
    );
    let screen = harness.start(ALICE).await;

    harness.press(ALICE, screen, Button::AdvanceWelcome).await;

    assert_eq!(
        harness.gateway.last_view(),
        Some(View::Subscription { subscribed: false })
    );
}

#[tokio::test]
async fn crashed_lookup_is_contained() {
    let harness = Harness::new();
    harness.join(ALICE);
    harness.provider.panic_on_lookup(true);
    let screen = harness.start(ALICE).await;

    let callback = harness.press(ALICE, screen, Button::AdvanceWelcome).await;

    assert_eq!(
        harness.gateway.last_view(),
        Some(View::Subscription { subscribed: false })
    );
    assert_eq!(harness.gateway.answers(), vec![(callback, None)]);
}
