//! # Giveaway Campaign
//!
//! Eligibility engine behind a promotional chat bot. Participants walk through
//! a fixed onboarding sequence, prove membership in a discussion group and a
//! broadcast channel, and earn tickets for posting stories on social channels.
//!
//! ## Components
//!
//! - **Membership verification**: TTL-cached AND of two external lookups
//! - **Eligibility store**: per-participant record behind a per-participant lock
//! - **Ticket ledger**: exactly one ticket per channel, never double counted
//! - **Onboarding reducer**: the screen state machine, pure
//! - **Ephemeral scheduler**: best-effort deletion of transient notices
//! - **Group guard**: removes non-members from the discussion group
//!
//! ## Architecture
//!
//! ```text
//! Update → Dispatcher ─┬─ lock(user) → membership → Reducer → unlock → Effects → Gateway
//!                      └─ GroupGuard → membership → Gateway (+ scheduled deletes)
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use giveaway_campaign::*;
//!
//! let env = CampaignEnvironment::new(Arc::new(directory), Arc::new(gateway));
//! let dispatcher = Dispatcher::new(CampaignConfig::from_env()?, env);
//!
//! dispatcher.dispatch(Update::Command { chat, from, name: "start".into() }).await;
//! ```

#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]

pub mod actions;
pub mod channels;
pub mod config;
pub mod dispatch;
pub mod effects;
pub mod eligibility;
pub mod environment;
pub mod error;
pub mod guard;
pub mod ledger;
pub mod membership;
pub mod metrics;
pub mod providers;
pub mod reducers;
pub mod scheduler;
pub mod script;
pub mod state;
pub mod update;
pub mod view;

// Mock implementations (for testing)
#[cfg(feature = "test-utils")]
pub mod mocks;

// Re-export main types for convenience
pub use actions::CampaignAction;
pub use channels::SocialChannel;
pub use config::CampaignConfig;
pub use dispatch::Dispatcher;
pub use effects::CampaignEffect;
pub use eligibility::EligibilityStore;
pub use environment::CampaignEnvironment;
pub use error::{CampaignError, IneligibleReason, Result};
pub use ledger::TicketLedger;
pub use membership::MembershipService;
pub use state::{
    CallbackId, ChatId, EligibilityState, GroupRef, MessageId, MessageRef, Participant,
    PendingAction, UserId,
};
pub use update::{Button, Update};
pub use view::{Notice, View};
