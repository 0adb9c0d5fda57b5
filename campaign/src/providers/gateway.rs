//! Messaging gateway trait.

use crate::error::Result;
use crate::state::{CallbackId, ChatId, MessageId, MessageRef, UserId};
use crate::view::{Notice, View};
use std::future::Future;

/// Messaging gateway.
///
/// This trait abstracts over the chat platform's send/edit/delete and
/// moderation calls. Implementations own all presentation: text, media,
/// captions and inline controls.
pub trait MessagingGateway: Send + Sync + 'static {
    /// Send `view` as a new message.
    ///
    /// # Errors
    ///
    /// Returns `DeliveryFailed` if the message could not be sent.
    fn send_view(&self, chat: ChatId, view: &View) -> impl Future<Output = Result<MessageId>> + Send;

    /// Replace the content of `target` with `view`.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - The edit is rejected, e.g. stale or wrong content type (`RenderRejected`)
    /// - The message no longer exists (`MessageNotFound`)
    fn edit_view(&self, target: MessageRef, view: &View) -> impl Future<Output = Result<()>> + Send;

    /// Post a transient notice.
    ///
    /// # Errors
    ///
    /// Returns `DeliveryFailed` if the message could not be sent.
    fn send_notice(
        &self,
        chat: ChatId,
        notice: &Notice,
    ) -> impl Future<Output = Result<MessageId>> + Send;

    /// Answer a button press, optionally with an alert.
    ///
    /// # Errors
    ///
    /// Returns `DeliveryFailed` if the answer could not be delivered.
    fn answer_callback(
        &self,
        callback: &CallbackId,
        notice: Option<&Notice>,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Delete a message.
    ///
    /// # Errors
    ///
    /// Returns `MessageNotFound` if it is already gone, `DeliveryFailed` if
    /// the bot lacks the rights.
    fn delete_message(&self, target: MessageRef) -> impl Future<Output = Result<()>> + Send;

    /// Remove `user` from `chat`.
    ///
    /// # Errors
    ///
    /// Returns `DeliveryFailed` if the bot lacks the rights.
    fn ban_member(&self, chat: ChatId, user: UserId) -> impl Future<Output = Result<()>> + Send;

    /// Lift a ban so `user` may join again later.
    ///
    /// # Errors
    ///
    /// Returns `DeliveryFailed` if the bot lacks the rights.
    fn unban_member(&self, chat: ChatId, user: UserId) -> impl Future<Output = Result<()>> + Send;
}
