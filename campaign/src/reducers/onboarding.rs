//! Onboarding state machine.
//!
//! Walks a participant through the campaign screens, all rendered into one
//! message that is edited in place:
//!
//! ```text
//! Welcome → Subscription → RequiredCondition → SocialPicker → AwaitingStory
//!                                                                  │ photo
//!                              Completed ◀── Menu/Boost ◀──────────┘
//!                                               │ pick
//!                                               ▼
//!                                       AwaitingScreenshot ── photo ──▶ Menu
//! ```
//!
//! The picker works in two modes derived from state. Before the required
//! condition is done a pick records the required channel; afterwards it arms a
//! boost for a channel that has not been used yet.
//!
//! The reducer runs under the participant's lock, so every check it makes is
//! against the state it mutates. Refusals never mutate state, and nothing that
//! can lead to a grant (a pick or a submission) is honoured for a non-member.

use crate::actions::CampaignAction;
use crate::channels::SocialChannel;
use crate::effects::CampaignEffect;
use crate::ledger::{self, RequiredGrant};
use crate::state::{CallbackId, EligibilityState, MessageRef, Participant, PendingAction};
use crate::update::Button;
use crate::view::{Notice, View};
use giveaway_core::reducer::Reducer;
use giveaway_core::{smallvec, SmallVec};
use std::path::PathBuf;

/// Read-only inputs for rendering.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OnboardingEnvironment {
    /// Draw date shown on the profile screen.
    pub close_date: Option<String>,
    /// Image attached to the required-condition screen.
    pub promo_asset: Option<PathBuf>,
}

/// Onboarding reducer.
#[derive(Debug, Clone, Copy, Default)]
pub struct OnboardingReducer;

/// What a button press resolves to.
enum Screen {
    /// Show the view and answer silently.
    Show(View),
    /// Show the view and explain why with an alert.
    Redirect(View, Notice),
    /// Leave the screen alone and answer with an alert.
    Refuse(Notice),
}

impl OnboardingReducer {
    /// Create the reducer.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn press(
        state: &mut EligibilityState,
        button: Button,
        membership: Option<bool>,
        participant: &Participant,
        env: &OnboardingEnvironment,
    ) -> Screen {
        let subscribed = membership.unwrap_or(false);
        let not_subscribed = || Screen::Redirect(View::Subscription { subscribed: false }, Notice::NotSubscribed);

        match button {
            Button::AdvanceWelcome | Button::CheckSubscription => {
                Screen::Show(View::Subscription { subscribed })
            }

            Button::EnterRequired if !subscribed => not_subscribed(),
            Button::EnterRequired if state.required_condition_done => Screen::Show(boost_screen(state)),
            Button::EnterRequired => Screen::Show(View::RequiredCondition {
                promo_asset: env.promo_asset.clone(),
                reminder: false,
            }),

            Button::StartRequired if !subscribed => not_subscribed(),
            // The required channel can never be re-picked once it earned its ticket.
            Button::StartRequired if state.required_condition_done => Screen::Show(boost_screen(state)),
            Button::StartRequired => Screen::Show(View::SocialPicker {
                offered: SocialChannel::ALL.to_vec(),
            }),

            Button::EnterBoost if !subscribed => not_subscribed(),
            Button::EnterBoost if !state.required_condition_done => Screen::Redirect(
                View::RequiredCondition {
                    promo_asset: env.promo_asset.clone(),
                    reminder: true,
                },
                Notice::RequiredFirst,
            ),
            Button::EnterBoost => {
                let remaining = state.remaining_channels();
                if remaining.is_empty() {
                    Screen::Show(View::Completed {
                        tickets: state.ticket_count,
                        granted: None,
                    })
                } else {
                    Screen::Show(View::SocialPicker { offered: remaining })
                }
            }

            Button::Pick(_) if !subscribed => not_subscribed(),
            Button::Pick(channel) if !state.required_condition_done => {
                state.required_social = Some(channel);
                state.pending = PendingAction::AwaitingRequiredStory;
                Screen::Show(View::AwaitingStory { channel })
            }
            Button::Pick(channel) if state.is_channel_consumed(channel) => {
                Screen::Refuse(Notice::ChannelAlreadyUsed { channel })
            }
            Button::Pick(channel) => {
                state.pending = PendingAction::AwaitingBoostScreenshot(channel);
                Screen::Show(View::AwaitingScreenshot {
                    channel,
                    remaining: state.remaining_channels(),
                })
            }

            Button::ViewTickets => Screen::Show(View::Profile {
                name: participant.display_name(),
                user: participant.id,
                tickets: state.ticket_count,
                close_date: env.close_date.clone(),
                can_boost: !state.remaining_channels().is_empty(),
            }),
            Button::BackToWelcome => Screen::Show(View::Welcome),
            Button::BackToMenu => Screen::Show(menu_screen(state, None)),
        }
    }

    fn submit(state: &mut EligibilityState, subscribed: bool) -> View {
        match state.pending {
            // Non-members keep their pending action but earn nothing.
            _ if !subscribed => View::SubmissionIgnored {
                subscribed,
                required_done: state.required_condition_done,
            },
            PendingAction::None => View::SubmissionIgnored {
                subscribed,
                required_done: state.required_condition_done,
            },
            PendingAction::AwaitingRequiredStory => {
                if let RequiredGrant::Granted { tickets } = ledger::grant_required(state) {
                    tracing::info!(tickets, "Required condition completed");
                }
                state.pending = PendingAction::None;
                menu_screen(state, state.required_social)
            }
            PendingAction::AwaitingBoostScreenshot(channel) => {
                match ledger::grant_boost(state, channel) {
                    Ok(tickets) => {
                        tracing::info!(channel = channel.as_str(), tickets, "Boost accepted");
                        state.pending = PendingAction::None;
                        menu_screen(state, Some(channel))
                    }
                    // Consumed since the pick; keep the pending action so the
                    // participant can switch channels.
                    Err(_) => View::Rejected {
                        notice: Notice::ChannelAlreadyUsed { channel },
                        remaining: state.remaining_channels(),
                    },
                }
            }
        }
    }
}

/// Boost overview, or the terminal screen once nothing remains.
fn boost_screen(state: &EligibilityState) -> View {
    let remaining = state.remaining_channels();
    if remaining.is_empty() {
        View::Completed {
            tickets: state.ticket_count,
            granted: None,
        }
    } else {
        View::Boost {
            tickets: state.ticket_count,
            required_social: state.required_social,
            remaining,
        }
    }
}

/// Main menu, or the terminal screen once nothing remains.
fn menu_screen(state: &EligibilityState, granted: Option<SocialChannel>) -> View {
    let remaining = state.remaining_channels();
    if remaining.is_empty() {
        View::Completed {
            tickets: state.ticket_count,
            granted,
        }
    } else {
        View::Menu {
            tickets: state.ticket_count,
            granted,
            remaining,
        }
    }
}

fn answer(screen: Screen, origin: MessageRef, callback: CallbackId) -> SmallVec<[CampaignEffect; 4]> {
    match screen {
        Screen::Show(view) => smallvec![
            CampaignEffect::Acknowledge { callback },
            CampaignEffect::Edit { target: origin, view },
        ],
        Screen::Redirect(view, notice) => smallvec![
            CampaignEffect::Alert { callback, notice },
            CampaignEffect::Edit { target: origin, view },
        ],
        Screen::Refuse(notice) => smallvec![CampaignEffect::Alert { callback, notice }],
    }
}

impl Reducer for OnboardingReducer {
    type State = EligibilityState;
    type Action = CampaignAction;
    type Effect = CampaignEffect;
    type Environment = OnboardingEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Self::Effect; 4]> {
        match action {
            CampaignAction::Start { chat } => smallvec![CampaignEffect::Reply {
                chat,
                view: View::Welcome,
            }],

            CampaignAction::Pressed {
                button,
                origin,
                callback,
                membership,
                participant,
            } => {
                let screen = Self::press(state, button, membership, &participant, env);
                answer(screen, origin, callback)
            }

            CampaignAction::TextReceived { chat, membership } => smallvec![CampaignEffect::Reply {
                chat,
                view: View::Hint {
                    subscribed: membership,
                    required_done: state.required_condition_done,
                    tickets: state.ticket_count,
                },
            }],

            CampaignAction::MediaReceived { chat, membership } => {
                let view = Self::submit(state, membership);
                smallvec![CampaignEffect::Reply { chat, view }]
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{ChatId, MessageId, UserId};
    use giveaway_testing::reducer_test::assertions;
    use giveaway_testing::ReducerTest;

    const CHAT: ChatId = ChatId(77);

    fn origin() -> MessageRef {
        MessageRef::new(CHAT, MessageId(500))
    }

    fn press(button: Button, membership: Option<bool>) -> CampaignAction {
        CampaignAction::Pressed {
            button,
            origin: origin(),
            callback: CallbackId("cb".to_string()),
            membership,
            participant: Participant::anonymous(UserId(77)).with_first_name("Ada"),
        }
    }

    fn env() -> OnboardingEnvironment {
        OnboardingEnvironment {
            close_date: Some("December 31".to_string()),
            promo_asset: Some(PathBuf::from("story.png")),
        }
    }

    fn required_done(channel: SocialChannel) -> EligibilityState {
        let mut state = EligibilityState::default();
        state.required_social = Some(channel);
        ledger::grant_required(&mut state);
        state
    }

    fn edited_view(effects: &[CampaignEffect]) -> Option<&View> {
        effects.iter().find_map(|effect| match effect {
            CampaignEffect::Edit { view, .. } => Some(view),
            _ => None,
        })
    }

    fn replied_view(effects: &[CampaignEffect]) -> Option<&View> {
        effects.iter().find_map(|effect| match effect {
            CampaignEffect::Reply { view, .. } => Some(view),
            _ => None,
        })
    }

    fn answers(effects: &[CampaignEffect]) -> usize {
        effects
            .iter()
            .filter(|effect| effect.answered_callback().is_some())
            .count()
    }

    #[test]
    fn start_replies_with_welcome() {
        ReducerTest::new(OnboardingReducer::new())
            .with_env(env())
            .given_state(EligibilityState::default())
            .when_action(CampaignAction::Start { chat: CHAT })
            .then_state(|state| assert_eq!(state, &EligibilityState::default()))
            .then_effects(|effects| {
                assert_eq!(
                    effects,
                    &[CampaignEffect::Reply {
                        chat: CHAT,
                        view: View::Welcome
                    }]
                );
            })
            .run();
    }

    #[test]
    fn advancing_shows_subscription_result() {
        ReducerTest::new(OnboardingReducer::new())
            .with_env(env())
            .given_state(EligibilityState::default())
            .when_action(press(Button::AdvanceWelcome, Some(false)))
            .then_effects(|effects| {
                assert_eq!(answers(effects), 1);
                assert_eq!(
                    edited_view(effects),
                    Some(&View::Subscription { subscribed: false })
                );
            })
            .run();
    }

    #[test]
    fn required_condition_needs_membership() {
        ReducerTest::new(OnboardingReducer::new())
            .with_env(env())
            .given_state(EligibilityState::default())
            .when_action(press(Button::EnterRequired, Some(false)))
            .then_effects(|effects| {
                assert!(effects.contains(&CampaignEffect::Alert {
                    callback: CallbackId("cb".to_string()),
                    notice: Notice::NotSubscribed,
                }));
                assert_eq!(
                    edited_view(effects),
                    Some(&View::Subscription { subscribed: false })
                );
            })
            .run();
    }

    #[test]
    fn required_condition_carries_the_promo_asset() {
        ReducerTest::new(OnboardingReducer::new())
            .with_env(env())
            .given_state(EligibilityState::default())
            .when_action(press(Button::EnterRequired, Some(true)))
            .then_effects(|effects| {
                assert_eq!(
                    edited_view(effects),
                    Some(&View::RequiredCondition {
                        promo_asset: Some(PathBuf::from("story.png")),
                        reminder: false,
                    })
                );
            })
            .run();
    }

    #[test]
    fn completed_required_condition_redirects_to_boost() {
        ReducerTest::new(OnboardingReducer::new())
            .with_env(env())
            .given_state(required_done(SocialChannel::Instagram))
            .when_action(press(Button::StartRequired, Some(true)))
            .then_effects(|effects| {
                assert_eq!(
                    edited_view(effects),
                    Some(&View::Boost {
                        tickets: 1,
                        required_social: Some(SocialChannel::Instagram),
                        remaining: vec![SocialChannel::Telegram, SocialChannel::WhatsApp],
                    })
                );
            })
            .run();
    }

    #[test]
    fn required_pick_arms_the_story() {
        ReducerTest::new(OnboardingReducer::new())
            .with_env(env())
            .given_state(EligibilityState::default())
            .when_action(press(Button::Pick(SocialChannel::Instagram), Some(true)))
            .then_state(|state| {
                assert_eq!(state.required_social(), Some(SocialChannel::Instagram));
                assert_eq!(state.pending(), PendingAction::AwaitingRequiredStory);
                assert_eq!(state.ticket_count(), 0);
            })
            .then_effects(|effects| {
                assert_eq!(
                    edited_view(effects),
                    Some(&View::AwaitingStory {
                        channel: SocialChannel::Instagram
                    })
                );
            })
            .run();
    }

    #[test]
    fn boost_pick_of_required_channel_is_refused() {
        let state = required_done(SocialChannel::Instagram);
        let expected = state.clone();

        ReducerTest::new(OnboardingReducer::new())
            .with_env(env())
            .given_state(state)
            .when_action(press(Button::Pick(SocialChannel::Instagram), Some(true)))
            .then_state(move |state| assert_eq!(state, &expected))
            .then_effects(|effects| {
                assert_eq!(
                    effects,
                    &[CampaignEffect::Alert {
                        callback: CallbackId("cb".to_string()),
                        notice: Notice::ChannelAlreadyUsed {
                            channel: SocialChannel::Instagram
                        },
                    }]
                );
            })
            .run();
    }

    #[test]
    fn boost_before_required_condition_is_redirected() {
        ReducerTest::new(OnboardingReducer::new())
            .with_env(env())
            .given_state(EligibilityState::default())
            .when_action(press(Button::EnterBoost, Some(true)))
            .then_effects(|effects| {
                assert!(effects.iter().any(|effect| matches!(
                    effect,
                    CampaignEffect::Alert {
                        notice: Notice::RequiredFirst,
                        ..
                    }
                )));
                assert!(matches!(
                    edited_view(effects),
                    Some(View::RequiredCondition { reminder: true, .. })
                ));
            })
            .run();
    }

    #[test]
    fn photo_without_pending_action_is_ignored() {
        ReducerTest::new(OnboardingReducer::new())
            .with_env(env())
            .given_state(EligibilityState::default())
            .when_action(CampaignAction::MediaReceived {
                chat: CHAT,
                membership: true,
            })
            .then_state(|state| assert_eq!(state, &EligibilityState::default()))
            .then_effects(|effects| {
                assert_eq!(
                    replied_view(effects),
                    Some(&View::SubmissionIgnored {
                        subscribed: true,
                        required_done: false
                    })
                );
            })
            .run();
    }

    #[test]
    fn required_story_grants_first_ticket() {
        let mut state = EligibilityState::default();
        state.required_social = Some(SocialChannel::Instagram);
        state.pending = PendingAction::AwaitingRequiredStory;

        ReducerTest::new(OnboardingReducer::new())
            .with_env(env())
            .given_state(state)
            .when_action(CampaignAction::MediaReceived {
                chat: CHAT,
                membership: true,
            })
            .then_state(|state| {
                assert!(state.required_condition_done());
                assert_eq!(state.ticket_count(), 1);
                assert_eq!(state.pending(), PendingAction::None);
                assert!(state.is_consistent());
            })
            .then_effects(|effects| {
                assertions::assert_effects_count(effects, 1);
                assert_eq!(
                    replied_view(effects),
                    Some(&View::Menu {
                        tickets: 1,
                        granted: Some(SocialChannel::Instagram),
                        remaining: vec![SocialChannel::Telegram, SocialChannel::WhatsApp],
                    })
                );
            })
            .run();
    }

    #[test]
    fn stale_boost_submission_is_rejected_and_stays_pending() {
        let mut state = required_done(SocialChannel::Instagram);
        ledger::grant_boost(&mut state, SocialChannel::Telegram).ok();
        state.pending = PendingAction::AwaitingBoostScreenshot(SocialChannel::Telegram);
        let expected = state.clone();

        ReducerTest::new(OnboardingReducer::new())
            .with_env(env())
            .given_state(state)
            .when_action(CampaignAction::MediaReceived {
                chat: CHAT,
                membership: true,
            })
            .then_state(move |state| assert_eq!(state, &expected))
            .then_effects(|effects| {
                assert_eq!(
                    replied_view(effects),
                    Some(&View::Rejected {
                        notice: Notice::ChannelAlreadyUsed {
                            channel: SocialChannel::Telegram
                        },
                        remaining: vec![SocialChannel::WhatsApp],
                    })
                );
            })
            .run();
    }

    #[test]
    fn last_boost_reaches_the_terminal_screen() {
        let mut state = required_done(SocialChannel::Instagram);
        ledger::grant_boost(&mut state, SocialChannel::Telegram).ok();
        state.pending = PendingAction::AwaitingBoostScreenshot(SocialChannel::WhatsApp);

        ReducerTest::new(OnboardingReducer::new())
            .with_env(env())
            .given_state(state)
            .when_action(CampaignAction::MediaReceived {
                chat: CHAT,
                membership: true,
            })
            .then_state(|state| {
                assert_eq!(state.ticket_count(), 3);
                assert!(state.remaining_channels().is_empty());
            })
            .then_effects(|effects| {
                assert_eq!(
                    replied_view(effects),
                    Some(&View::Completed {
                        tickets: 3,
                        granted: Some(SocialChannel::WhatsApp),
                    })
                );
            })
            .run();
    }

    #[test]
    fn profile_reports_tickets_and_close_date() {
        ReducerTest::new(OnboardingReducer::new())
            .with_env(env())
            .given_state(required_done(SocialChannel::Telegram))
            .when_action(press(Button::ViewTickets, None))
            .then_effects(|effects| {
                assert_eq!(
                    edited_view(effects),
                    Some(&View::Profile {
                        name: "Ada".to_string(),
                        user: UserId(77),
                        tickets: 1,
                        close_date: Some("December 31".to_string()),
                        can_boost: true,
                    })
                );
            })
            .run();
    }

    #[test]
    fn text_gets_a_hint() {
        ReducerTest::new(OnboardingReducer::new())
            .with_env(env())
            .given_state(required_done(SocialChannel::Telegram))
            .when_action(CampaignAction::TextReceived {
                chat: CHAT,
                membership: false,
            })
            .then_effects(|effects| {
                assert_eq!(
                    replied_view(effects),
                    Some(&View::Hint {
                        subscribed: false,
                        required_done: true,
                        tickets: 1
                    })
                );
            })
            .run();
    }

    #[test]
    fn pick_without_membership_is_redirected_untouched() {
        ReducerTest::new(OnboardingReducer::new())
            .with_env(env())
            .given_state(EligibilityState::default())
            .when_action(press(Button::Pick(SocialChannel::Instagram), Some(false)))
            .then_state(|state| assert_eq!(state, &EligibilityState::default()))
            .then_effects(|effects| {
                assert!(effects.contains(&CampaignEffect::Alert {
                    callback: CallbackId("cb".to_string()),
                    notice: Notice::NotSubscribed,
                }));
                assert_eq!(
                    edited_view(effects),
                    Some(&View::Subscription { subscribed: false })
                );
            })
            .run();
    }

    #[test]
    fn armed_story_is_not_granted_after_leaving() {
        let mut state = EligibilityState::default();
        state.required_social = Some(SocialChannel::Instagram);
        state.pending = PendingAction::AwaitingRequiredStory;
        let expected = state.clone();

        ReducerTest::new(OnboardingReducer::new())
            .with_env(env())
            .given_state(state)
            .when_action(CampaignAction::MediaReceived {
                chat: CHAT,
                membership: false,
            })
            .then_state(move |state| assert_eq!(state, &expected))
            .then_effects(|effects| {
                let view = replied_view(effects);
                assert_eq!(
                    view,
                    Some(&View::SubmissionIgnored {
                        subscribed: false,
                        required_done: false
                    })
                );
                assert_eq!(
                    view.and_then(View::ineligible_reason),
                    Some(crate::error::IneligibleReason::NotSubscribed)
                );
            })
            .run();
    }
}
