//! Outbound chat capability and inbound event types.

use std::pin::Pin;

use async_trait::async_trait;
use futures::Stream;

use crate::error::ChannelError;

/// One inbound chat event, already reduced to what the dispatchers
/// need.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TelegramEvent {
    /// A free-text message from a user.
    Message(IncomingMessage),
    /// An inline keyboard button press.
    Callback(CallbackData),
}

/// A free-text message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingMessage {
    pub user_id: i64,
    pub text: String,
    /// Id of the user's own message; deleted after a field write to
    /// keep the conversation clean.
    pub message_id: i64,
}

/// An inline keyboard button press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallbackData {
    pub from_id: i64,
    /// Id of the message the pressed keyboard is attached to.
    pub message_id: i64,
    /// Callback action name, e.g. `ChangeContactName`.
    pub action: String,
    /// Opaque id used to acknowledge the press.
    pub callback_id: String,
}

/// Stream of inbound events, single consumer.
pub type EventStream = Pin<Box<dyn Stream<Item = TelegramEvent> + Send>>;

/// What can respond to the user. Dispatchers depend only on this, so
/// tests can substitute a recording double.
#[async_trait]
pub trait Responder: Send + Sync {
    /// Send a plain text message.
    async fn send_message(&self, text: &str, user_id: i64) -> Result<(), ChannelError>;

    /// Send a new contact view with the edit keyboard attached.
    async fn send_contact_view(&self, text: &str, user_id: i64) -> Result<(), ChannelError>;

    /// Edit an existing contact view in place, keeping the keyboard.
    async fn edit_contact_view(
        &self,
        text: &str,
        user_id: i64,
        message_id: i64,
    ) -> Result<(), ChannelError>;

    /// Delete a message from the chat.
    async fn delete_message(&self, user_id: i64, message_id: i64) -> Result<(), ChannelError>;

    /// Acknowledge a button press with a transient alert.
    async fn answer_callback(&self, text: &str, callback_id: &str) -> Result<(), ChannelError>;
}
