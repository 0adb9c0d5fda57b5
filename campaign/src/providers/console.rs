//! Console messaging gateway for development.

use crate::error::{CampaignError, Result};
use crate::providers::MessagingGateway;
use crate::state::{CallbackId, ChatId, MessageId, MessageRef, UserId};
use crate::view::{Notice, View};
use std::collections::HashMap;
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::{Mutex, PoisonError};
use tracing::info;

/// Console messaging gateway.
///
/// Prints every render to stdout as JSON instead of talking to a chat
/// platform, and remembers the latest screen message per chat so a script can
/// press buttons on it.
///
/// # Examples
///
/// ```ignore
/// use giveaway_campaign::providers::ConsoleGateway;
///
/// let gateway = ConsoleGateway::new();
/// let message = gateway.send_view(ChatId(42), &View::Welcome).await?;
/// assert_eq!(gateway.current_screen(ChatId(42)), Some(message));
/// ```
#[derive(Debug)]
pub struct ConsoleGateway {
    next_id: AtomicI32,
    screens: Mutex<HashMap<ChatId, MessageId>>,
}

impl ConsoleGateway {
    /// Create a console gateway.
    #[must_use]
    pub fn new() -> Self {
        Self {
            next_id: AtomicI32::new(1),
            screens: Mutex::new(HashMap::new()),
        }
    }

    /// The message currently showing the onboarding screen in `chat`.
    #[must_use]
    pub fn current_screen(&self, chat: ChatId) -> Option<MessageId> {
        self.screens
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&chat)
            .copied()
    }

    fn allocate(&self) -> MessageId {
        MessageId(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    fn print(target: MessageRef, payload: &impl serde::Serialize) -> Result<()> {
        let json = serde_json::to_string(payload)
            .map_err(|e| CampaignError::Internal(format!("render: {e}")))?;
        println!("[chat {} #{}] {json}", target.chat, target.message);
        Ok(())
    }
}

impl Default for ConsoleGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl MessagingGateway for ConsoleGateway {
    async fn send_view(&self, chat: ChatId, view: &View) -> Result<MessageId> {
        let message = self.allocate();
        info!(chat_id = %chat, message_id = %message, view = view.name(), "📨 Send view");
        Self::print(MessageRef::new(chat, message), view)?;

        self.screens
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(chat, message);
        Ok(message)
    }

    async fn edit_view(&self, target: MessageRef, view: &View) -> Result<()> {
        if self.current_screen(target.chat) != Some(target.message) {
            return Err(CampaignError::MessageNotFound);
        }

        info!(
            chat_id = %target.chat,
            message_id = %target.message,
            view = view.name(),
            "✏️ Edit view"
        );
        Self::print(target, view)
    }

    async fn send_notice(&self, chat: ChatId, notice: &Notice) -> Result<MessageId> {
        let message = self.allocate();
        info!(chat_id = %chat, message_id = %message, "📢 Notice");
        Self::print(MessageRef::new(chat, message), notice)?;
        Ok(message)
    }

    async fn answer_callback(&self, callback: &CallbackId, notice: Option<&Notice>) -> Result<()> {
        match notice {
            Some(notice) => {
                let json = serde_json::to_string(notice)
                    .map_err(|e| CampaignError::Internal(format!("render: {e}")))?;
                println!("[alert {callback}] {json}");
            }
            None => info!(callback = %callback, "Callback acknowledged"),
        }
        Ok(())
    }

    async fn delete_message(&self, target: MessageRef) -> Result<()> {
        info!(chat_id = %target.chat, message_id = %target.message, "🗑️ Delete message");
        let mut screens = self.screens.lock().unwrap_or_else(PoisonError::into_inner);
        if screens.get(&target.chat) == Some(&target.message) {
            screens.remove(&target.chat);
        }
        Ok(())
    }

    async fn ban_member(&self, chat: ChatId, user: UserId) -> Result<()> {
        info!(chat_id = %chat, user_id = %user, "🚫 Ban member");
        Ok(())
    }

    async fn unban_member(&self, chat: ChatId, user: UserId) -> Result<()> {
        info!(chat_id = %chat, user_id = %user, "↩️ Unban member");
        Ok(())
    }
}
