//! Line-oriented console script.
//!
//! Each line names an action and the user id performing it:
//!
//! ```text
//! start 42
//! press 42 advance_welcome
//! text 42 hello there
//! photo 42
//! join 42          # join the group and the channel
//! leave 42
//! group-join 42
//! group-say 42
//! state 42
//! ```
//!
//! Blank lines and `#` comments are skipped.

use crate::config::CampaignConfig;
use crate::dispatch::Dispatcher;
use crate::environment::CampaignEnvironment;
use crate::providers::{ConsoleGateway, InMemoryDirectory};
use crate::state::{CallbackId, ChatId, MessageId, MessageRef, Participant, UserId};
use crate::update::Update;
use std::sync::atomic::{AtomicI32, AtomicU64, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tokio::task::JoinSet;

/// Chat id used for the discussion group.
pub const GROUP_CHAT: ChatId = ChatId(-1_001_000);

/// Why a script line could not be parsed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ScriptError {
    /// The first word is not a known command.
    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    /// The user id is missing or not a number.
    #[error("Invalid user id: {0:?}")]
    InvalidUser(String),

    /// A command that takes an argument was given none.
    #[error("Missing argument for {0}")]
    MissingArgument(&'static str),
}

/// One parsed script line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptCommand {
    /// `/start` in the private chat.
    Start(UserId),
    /// Press a button on the current screen.
    Press(UserId, String),
    /// Send plain text.
    Text(UserId, String),
    /// Send a photo.
    Photo(UserId),
    /// Join both required groups.
    Join(UserId),
    /// Leave both required groups.
    Leave(UserId),
    /// Join the discussion group (runs the group guard).
    GroupJoin(UserId),
    /// Post in the discussion group (runs the group guard).
    GroupSay(UserId),
    /// Print the participant's eligibility state.
    State(UserId),
}

impl ScriptCommand {
    /// Parse one line. Returns `Ok(None)` for blank lines and comments.
    ///
    /// # Errors
    ///
    /// Returns [`ScriptError`] if the line is not a valid command.
    pub fn parse(line: &str) -> Result<Option<Self>, ScriptError> {
        let line = line.split('#').next().unwrap_or_default().trim();
        if line.is_empty() {
            return Ok(None);
        }

        let mut words = line.splitn(3, char::is_whitespace);
        let command = words.next().unwrap_or_default();
        let raw_user = words.next().unwrap_or_default();
        let rest = words.next().map(str::trim).unwrap_or_default();

        let user = raw_user
            .parse::<i64>()
            .map(UserId)
            .map_err(|_| ScriptError::InvalidUser(raw_user.to_string()));

        let parsed = match command {
            "start" => Self::Start(user?),
            "press" if rest.is_empty() => return Err(ScriptError::MissingArgument("press")),
            "press" => Self::Press(user?, rest.to_string()),
            "text" => Self::Text(user?, rest.to_string()),
            "photo" => Self::Photo(user?),
            "join" => Self::Join(user?),
            "leave" => Self::Leave(user?),
            "group-join" => Self::GroupJoin(user?),
            "group-say" => Self::GroupSay(user?),
            "state" => Self::State(user?),
            other => return Err(ScriptError::UnknownCommand(other.to_string())),
        };
        Ok(Some(parsed))
    }
}

/// Runs script commands against an in-memory directory and the console.
pub struct ScriptRunner {
    dispatcher: Dispatcher<InMemoryDirectory, ConsoleGateway>,
    directory: Arc<InMemoryDirectory>,
    gateway: Arc<ConsoleGateway>,
    callbacks: AtomicU64,
    group_messages: AtomicI32,
}

impl ScriptRunner {
    /// Wire a dispatcher over a fresh directory and console gateway.
    #[must_use]
    pub fn new(config: CampaignConfig) -> Self {
        let directory = Arc::new(InMemoryDirectory::new());
        let gateway = Arc::new(ConsoleGateway::new());
        let environment = CampaignEnvironment::new(Arc::clone(&directory), Arc::clone(&gateway));
        Self {
            dispatcher: Dispatcher::new(config, environment),
            directory,
            gateway,
            callbacks: AtomicU64::new(1),
            group_messages: AtomicI32::new(1),
        }
    }

    /// The dispatcher commands go through.
    #[must_use]
    pub const fn dispatcher(&self) -> &Dispatcher<InMemoryDirectory, ConsoleGateway> {
        &self.dispatcher
    }

    /// The console gateway screens are printed by.
    #[must_use]
    pub fn gateway(&self) -> &ConsoleGateway {
        &self.gateway
    }

    fn participant(user: UserId) -> Participant {
        Participant::anonymous(user)
            .with_first_name(format!("User {user}"))
            .with_username(format!("user{user}"))
    }

    /// Apply directory edits inline; spawn everything else onto `tasks`.
    pub fn run(&self, command: ScriptCommand, tasks: &mut JoinSet<()>) {
        let update = match command {
            ScriptCommand::Start(user) => Update::Command {
                chat: ChatId(user.0),
                from: Self::participant(user),
                name: "start".to_string(),
            },
            ScriptCommand::Press(user, data) => {
                let id = self.callbacks.fetch_add(1, Ordering::Relaxed);
                let dispatcher = self.dispatcher.clone();
                let gateway = Arc::clone(&self.gateway);
                // Resolve the screen when the press runs, not when it is read,
                // so a preceding `start` has had the chance to send it.
                tasks.spawn(async move {
                    tokio::task::yield_now().await;
                    let chat = ChatId(user.0);
                    let message = gateway.current_screen(chat).unwrap_or(MessageId(0));
                    dispatcher
                        .dispatch(Update::Callback {
                            id: CallbackId(format!("cb-{id}")),
                            from: Self::participant(user),
                            message: MessageRef::new(chat, message),
                            data,
                        })
                        .await;
                });
                return;
            }
            ScriptCommand::Text(user, text) => Update::Text {
                chat: ChatId(user.0),
                from: Self::participant(user),
                text,
            },
            ScriptCommand::Photo(user) => Update::Photo {
                chat: ChatId(user.0),
                from: Self::participant(user),
            },
            ScriptCommand::GroupJoin(user) => Update::MembersJoined {
                chat: GROUP_CHAT,
                members: vec![Self::participant(user)],
            },
            ScriptCommand::GroupSay(user) => Update::GroupMessage {
                chat: GROUP_CHAT,
                message: MessageId(self.group_messages.fetch_add(1, Ordering::Relaxed)),
                from: Self::participant(user),
            },
            ScriptCommand::Join(user) => {
                for group in self.dispatcher.config().required_groups() {
                    self.directory.join(&group, user);
                }
                tracing::info!(user_id = %user, "Joined required groups");
                return;
            }
            ScriptCommand::Leave(user) => {
                for group in self.dispatcher.config().required_groups() {
                    self.directory.leave(&group, user);
                }
                tracing::info!(user_id = %user, "Left required groups");
                return;
            }
            ScriptCommand::State(user) => {
                let dispatcher = self.dispatcher.clone();
                tasks.spawn(async move {
                    let state = dispatcher.store().snapshot(user).await;
                    match serde_json::to_string(&state) {
                        Ok(json) => println!("[state {user}] {json}"),
                        Err(error) => tracing::warn!(error = %error, "Could not serialize state"),
                    }
                });
                return;
            }
        };

        let dispatcher = self.dispatcher.clone();
        tasks.spawn(async move { dispatcher.dispatch(update).await });
    }
}
