//! # Giveaway Testing
//!
//! Testing utilities for the giveaway campaign engine.
//!
//! This crate provides:
//! - Deterministic clocks (`FixedClock`, `ManualClock`)
//! - A Given-When-Then harness for reducers (`ReducerTest`)
//!
//! ## Example
//!
//! ```ignore
//! use giveaway_testing::ManualClock;
//!
//! #[tokio::test]
//! async fn cached_membership_expires() {
//!     let clock = ManualClock::new(test_time());
//!     let service = MembershipService::new(provider, Arc::new(clock.clone()), groups, ttl);
//!
//!     service.is_eligible_member(user, false).await;
//!     clock.advance(chrono::Duration::seconds(301));
//!     service.is_eligible_member(user, false).await; // looks up again
//! }
//! ```

use chrono::{DateTime, Utc};
use giveaway_core::environment::Clock;


/// Mock implementations of Environment traits.
pub mod mocks {
    use super::{Clock, DateTime, Utc};
    use std::sync::{Arc, Mutex, PoisonError};

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making tests reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use giveaway_testing::mocks::FixedClock;
    /// use giveaway_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// assert_eq!(clock.now(), clock.now());
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Clock that only moves when a test tells it to.
    ///
    /// Clones share the same instant, so a test can keep one handle and hand
    /// another to the component under test.
    ///
    /// ```
    /// use giveaway_testing::mocks::{ManualClock, test_time};
    /// use giveaway_core::environment::Clock;
    ///
    /// let clock = ManualClock::new(test_time());
    /// let shared = clock.clone();
    /// clock.advance(chrono::Duration::seconds(90));
    /// assert_eq!(shared.now(), test_time() + chrono::Duration::seconds(90));
    /// ```
    #[derive(Debug, Clone)]
    pub struct ManualClock {
        time: Arc<Mutex<DateTime<Utc>>>,
    }

    impl ManualClock {
        /// Create a clock frozen at `time`.
        #[must_use]
        pub fn new(time: DateTime<Utc>) -> Self {
            Self {
                time: Arc::new(Mutex::new(time)),
            }
        }

        /// Move the clock forward by `by`.
        pub fn advance(&self, by: chrono::Duration) {
            let mut time = self.time.lock().unwrap_or_else(PoisonError::into_inner);
            *time += by;
        }

        /// Jump to an absolute instant.
        pub fn set(&self, to: DateTime<Utc>) {
            *self.time.lock().unwrap_or_else(PoisonError::into_inner) = to;
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> DateTime<Utc> {
            *self.time.lock().unwrap_or_else(PoisonError::into_inner)
        }
    }

    /// The instant all test clocks start from (2025-01-01 00:00:00 UTC).
    #[must_use]
    pub fn test_time() -> DateTime<Utc> {
        DateTime::<Utc>::from_timestamp(1_735_689_600, 0).unwrap_or_default()
    }

    /// Create a default fixed clock for tests (2025-01-01 00:00:00 UTC)
    #[must_use]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(test_time())
    }
}

// Re-export commonly used items
pub use mocks::{test_clock, test_time, FixedClock, ManualClock};
pub use reducer_test::ReducerTest;
