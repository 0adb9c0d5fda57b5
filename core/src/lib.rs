//! # Giveaway Core
//!
//! Functional-core abstractions shared by the campaign engine.
//!
//! Business logic is written as reducers: pure functions
//! `(State, Action, Environment) → (State, Effects)`. Effects are plain values
//! describing I/O (render a screen, answer a button press); an imperative shell
//! executes them after the state mutation has been committed.
//!
//! ## Core Concepts
//!
//! - **State**: the record a reducer owns for one invocation (e.g. one participant)
//! - **Action**: an input with every external fact already resolved
//! - **Effect**: a description of I/O, never the I/O itself
//! - **Environment**: read-only dependencies injected into the reducer
//!
//! ## Example
//!
//! ```
//! use giveaway_core::reducer::Reducer;
//! use giveaway_core::{smallvec, SmallVec};
//!
//! #[derive(Default)]
//! struct Tally { tickets: u32 }
//!
//! enum TallyAction { Grant }
//!
//! #[derive(Debug, PartialEq)]
//! enum TallyEffect { Announce(u32) }
//!
//! struct TallyReducer;
//!
//! impl Reducer for TallyReducer {
//!     type State = Tally;
//!     type Action = TallyAction;
//!     type Effect = TallyEffect;
//!     type Environment = ();
//!
//!     fn reduce(&self, state: &mut Tally, action: TallyAction, _env: &()) -> SmallVec<[TallyEffect; 4]> {
//!         match action {
//!             TallyAction::Grant => {
//!                 state.tickets += 1;
//!                 smallvec![TallyEffect::Announce(state.tickets)]
//!             }
//!         }
//!     }
//! }
//!
//! let mut state = Tally::default();
//! let effects = TallyReducer.reduce(&mut state, TallyAction::Grant, &());
//! assert_eq!(effects.as_slice(), &[TallyEffect::Announce(1)]);
//! ```

// Re-export commonly used types
pub use chrono::{DateTime, Utc};
pub use smallvec::{smallvec, SmallVec};

/// Reducer module - The core trait for business logic
pub mod reducer {
    use smallvec::SmallVec;

    /// The Reducer trait - core abstraction for business logic
    ///
    /// # Type Parameters
    ///
    /// - `State`: The state this reducer mutates in place
    /// - `Action`: The input this reducer processes
    /// - `Effect`: The effect description type handed to the executor
    /// - `Environment`: The injected, read-only dependencies
    ///
    /// Reducers must not perform I/O. Anything that needs the outside world is
    /// either resolved before the action is built or returned as an effect.
    pub trait Reducer {
        /// The state type this reducer operates on
        type State;

        /// The action type this reducer processes
        type Action;

        /// The effect type this reducer emits
        type Effect;

        /// The environment type with injected dependencies
        type Environment;

        /// Reduce an action into state changes and effects
        ///
        /// This is a pure function that:
        /// 1. Validates the action against the current state
        /// 2. Updates state in place
        /// 3. Returns effect descriptions to be executed
        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            env: &Self::Environment,
        ) -> SmallVec<[Self::Effect; 4]>;
    }
}

/// Environment module - Dependency injection traits
pub mod environment {
    use chrono::{DateTime, Utc};

    /// Clock trait - abstracts time operations for testability
    ///
    /// Production code uses [`SystemClock`]; tests inject a fixed or manually
    /// advanced clock so that TTL-driven behavior is deterministic.
    pub trait Clock: Send + Sync {
        /// Get the current time
        fn now(&self) -> DateTime<Utc>;
    }

    /// Wall-clock time.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct SystemClock;

    impl Clock for SystemClock {
        fn now(&self) -> DateTime<Utc> {
            Utc::now()
        }
    }
}
