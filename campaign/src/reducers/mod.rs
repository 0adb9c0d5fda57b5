//! Campaign reducers.
//!
//! Reducers are pure functions: `(State, Action, Environment) → (State, Effects)`.

pub mod onboarding;

pub use onboarding::{OnboardingEnvironment, OnboardingReducer};
