//! Campaign environment.
//!
//! Everything the dispatcher needs from the outside world, injected so tests
//! can swap in mocks and a controllable clock.

use crate::providers::{MembershipProvider, MessagingGateway};
use giveaway_core::environment::{Clock, SystemClock};
use std::sync::Arc;

/// Campaign environment.
///
/// # Type Parameters
///
/// - `P`: Membership provider
/// - `G`: Messaging gateway
pub struct CampaignEnvironment<P, G> {
    /// Membership lookups.
    pub membership: Arc<P>,

    /// Outbound messaging.
    pub gateway: Arc<G>,

    /// Time source for cache freshness.
    pub clock: Arc<dyn Clock>,
}

impl<P: MembershipProvider, G: MessagingGateway> CampaignEnvironment<P, G> {
    /// Create an environment using the wall clock.
    #[must_use]
    pub fn new(membership: Arc<P>, gateway: Arc<G>) -> Self {
        Self {
            membership,
            gateway,
            clock: Arc::new(SystemClock),
        }
    }

    /// Replace the clock.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }
}

impl<P, G> Clone for CampaignEnvironment<P, G> {
    fn clone(&self) -> Self {
        Self {
            membership: Arc::clone(&self.membership),
            gateway: Arc::clone(&self.gateway),
            clock: Arc::clone(&self.clock),
        }
    }
}
