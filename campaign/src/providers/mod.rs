//! External collaborators.
//!
//! The engine talks to the outside world through two traits: a membership
//! lookup and a messaging gateway. Both are injected, which lets the same
//! dispatcher run against the real platform, the console, or test mocks.
//!
//! ```text
//!  Update ──▶ Dispatcher ──▶ MembershipService ──▶ MembershipProvider
//!                 │
//!                 └──▶ Reducer ──▶ Effects ──▶ MessagingGateway
//! ```

pub mod console;
pub mod directory;
pub mod gateway;
pub mod membership;

pub use console::ConsoleGateway;
pub use directory::InMemoryDirectory;
pub use gateway::MessagingGateway;
pub use membership::{MemberStatus, MembershipProvider};
