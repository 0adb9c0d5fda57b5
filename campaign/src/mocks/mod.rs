//! Mock provider implementations for testing.
//!
//! In-memory implementations of the provider traits that record what they
//! were asked and let a test inject failures.

pub mod gateway;
pub mod membership;

pub use gateway::{GatewayCall, MockGateway};
pub use membership::MockMembershipProvider;
