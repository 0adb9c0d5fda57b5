//! Mock messaging gateway for testing.

use crate::error::{CampaignError, Result};
use crate::providers::MessagingGateway;
use crate::state::{CallbackId, ChatId, MessageId, MessageRef, UserId};
use crate::view::{Notice, View};
use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};
use std::sync::{Mutex, PoisonError};

/// A call the gateway received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayCall {
    /// `send_view`, with the allocated message id.
    SendView {
        /// Destination chat.
        chat: ChatId,
        /// Rendered screen.
        view: View,
        /// Allocated id.
        message: MessageId,
    },
    /// Accepted `edit_view`.
    EditView {
        /// Edited message.
        target: MessageRef,
        /// New screen.
        view: View,
    },
    /// `send_notice`, with the allocated message id.
    SendNotice {
        /// Destination chat.
        chat: ChatId,
        /// Notice content.
        notice: Notice,
        /// Allocated id.
        message: MessageId,
    },
    /// `answer_callback`.
    AnswerCallback {
        /// Answered press.
        callback: CallbackId,
        /// Alert content, if any.
        notice: Option<Notice>,
    },
    /// `delete_message`.
    DeleteMessage {
        /// Deleted message.
        target: MessageRef,
    },
    /// `ban_member`.
    Ban {
        /// Group.
        chat: ChatId,
        /// Removed user.
        user: UserId,
    },
    /// `unban_member`.
    Unban {
        /// Group.
        chat: ChatId,
        /// Unbanned user.
        user: UserId,
    },
}

/// Mock messaging gateway.
///
/// Records every call in order and allocates message ids from 1000 upwards.
#[derive(Debug)]
pub struct MockGateway {
    calls: Mutex<Vec<GatewayCall>>,
    next_id: AtomicI32,
    reject_edits: AtomicBool,
    fail_deletes: AtomicBool,
    fail_view_sends: AtomicBool,
    fail_bans: AtomicBool,
}

impl MockGateway {
    /// Create a gateway that accepts everything.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            next_id: AtomicI32::new(1000),
            reject_edits: AtomicBool::new(false),
            fail_deletes: AtomicBool::new(false),
            fail_view_sends: AtomicBool::new(false),
            fail_bans: AtomicBool::new(false),
        }
    }

    /// Reject every edit with [`CampaignError::RenderRejected`].
    pub fn reject_edits(&self, enabled: bool) {
        self.reject_edits.store(enabled, Ordering::SeqCst);
    }

    /// Fail every delete with [`CampaignError::MessageNotFound`].
    pub fn fail_deletes(&self, enabled: bool) {
        self.fail_deletes.store(enabled, Ordering::SeqCst);
    }

    /// Fail every `send_view` with [`CampaignError::DeliveryFailed`].
    /// Notices still go through.
    pub fn fail_view_sends(&self, enabled: bool) {
        self.fail_view_sends.store(enabled, Ordering::SeqCst);
    }

    /// Fail every `ban_member` with [`CampaignError::DeliveryFailed`].
    pub fn fail_bans(&self, enabled: bool) {
        self.fail_bans.store(enabled, Ordering::SeqCst);
    }

    /// Every recorded call, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<GatewayCall> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Forget recorded calls.
    pub fn clear(&self) {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Screens shown, whether by edit or by a new message.
    #[must_use]
    pub fn views(&self) -> Vec<View> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                GatewayCall::SendView { view, .. } | GatewayCall::EditView { view, .. } => Some(view),
                _ => None,
            })
            .collect()
    }

    /// The most recently shown screen.
    #[must_use]
    pub fn last_view(&self) -> Option<View> {
        self.views().pop()
    }

    /// Callback answers as `(callback, alert)`.
    #[must_use]
    pub fn answers(&self) -> Vec<(CallbackId, Option<Notice>)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                GatewayCall::AnswerCallback { callback, notice } => Some((callback, notice)),
                _ => None,
            })
            .collect()
    }

    /// Notices posted to chats.
    #[must_use]
    pub fn notices(&self) -> Vec<(MessageRef, Notice)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                GatewayCall::SendNotice { chat, notice, message } => {
                    Some((MessageRef::new(chat, message), notice))
                }
                _ => None,
            })
            .collect()
    }

    /// Deleted messages.
    #[must_use]
    pub fn deleted(&self) -> Vec<MessageRef> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                GatewayCall::DeleteMessage { target } => Some(target),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: GatewayCall) {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(call);
    }

    fn allocate(&self) -> MessageId {
        MessageId(self.next_id.fetch_add(1, Ordering::SeqCst))
    }
}

impl Default for MockGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl MessagingGateway for MockGateway {
    async fn send_view(&self, chat: ChatId, view: &View) -> Result<MessageId> {
        if self.fail_view_sends.load(Ordering::SeqCst) {
            return Err(CampaignError::DeliveryFailed {
                reason: "injected send failure".to_string(),
            });
        }
        let message = self.allocate();
        self.record(GatewayCall::SendView {
            chat,
            view: view.clone(),
            message,
        });
        Ok(message)
    }

    async fn edit_view(&self, target: MessageRef, view: &View) -> Result<()> {
        if self.reject_edits.load(Ordering::SeqCst) {
            return Err(CampaignError::RenderRejected {
                reason: "message can't be edited".to_string(),
            });
        }
        self.record(GatewayCall::EditView {
            target,
            view: view.clone(),
        });
        Ok(())
    }

    async fn send_notice(&self, chat: ChatId, notice: &Notice) -> Result<MessageId> {
        let message = self.allocate();
        self.record(GatewayCall::SendNotice {
            chat,
            notice: notice.clone(),
            message,
        });
        Ok(message)
    }

    async fn answer_callback(&self, callback: &CallbackId, notice: Option<&Notice>) -> Result<()> {
        self.record(GatewayCall::AnswerCallback {
            callback: callback.clone(),
            notice: notice.cloned(),
        });
        Ok(())
    }

    async fn delete_message(&self, target: MessageRef) -> Result<()> {
        self.record(GatewayCall::DeleteMessage { target });
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(CampaignError::MessageNotFound);
        }
        Ok(())
    }

    async fn ban_member(&self, chat: ChatId, user: UserId) -> Result<()> {
        self.record(GatewayCall::Ban { chat, user });
        if self.fail_bans.load(Ordering::SeqCst) {
            return Err(CampaignError::DeliveryFailed {
                reason: "not enough rights".to_string(),
            });
        }
        Ok(())
    }

    async fn unban_member(&self, chat: ChatId, user: UserId) -> Result<()> {
        self.record(GatewayCall::Unban { chat, user });
        Ok(())
    }
}
