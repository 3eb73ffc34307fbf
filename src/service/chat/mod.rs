pub mod slack;

use std::{ops::Deref, sync::Arc};

use async_trait::async_trait;
use serde_json::Value;

use crate::base::types::{PostedMessage, Res, Void};

// Traits.

/// Generic "chat" trait that clients must implement.
///
/// This trait defines the core functionality for interacting with chat platforms
/// like Slack. Implementing this trait allows different chat services to be used
/// with the bot.
#[async_trait]
pub trait GenericChatClient: Send + Sync + 'static {
    /// Get the bot user ID.
    ///
    /// Used to ignore the bot's own messages.
    fn bot_user_id(&self) -> &str;

    /// Start the chat client listener.
    ///
    /// This sets up event listeners for the chat platform and begins processing
    /// incoming messages and events.
    async fn start(&self) -> Void;

    /// Send a top-level message to a channel.
    async fn send_message(&self, channel_id: &str, text: &str) -> Void;

    /// Reply in the thread of an existing message.
    async fn reply_in_thread(&self, channel_id: &str, thread_ts: &str, text: &str) -> Void;

    /// Post a Block Kit message, with `text` as the notification fallback.
    ///
    /// Returns where the message landed so that it can be reacted to.
    async fn post_blocks(&self, channel_id: &str, text: &str, blocks: Value) -> Res<PostedMessage>;

    /// React to a message with an emoji.
    async fn react_to_message(&self, channel_id: &str, ts: &str, emoji: &str) -> Void;

    /// Get the text of the message at exactly `ts`.
    ///
    /// Returns `None` when the message cannot be found or has no text.
    async fn get_message_text(&self, channel_id: &str, ts: &str) -> Res<Option<String>>;

    /// Open a modal view in response to a user interaction.
    async fn open_modal(&self, trigger_id: &str, view: Value) -> Void;
}

// Structs.

/// Chat client for the application.
///
/// It is designed to be trivially cloneable, allowing it to be passed around
/// without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct ChatClient {
    inner: Arc<dyn GenericChatClient>,
}

impl Deref for ChatClient {
    type Target = dyn GenericChatClient;

    fn deref(&self) -> &Self::Target {
        &*self.inner
    }
}

impl ChatClient {
    pub fn new(inner: Arc<dyn GenericChatClient>) -> Self {
        Self { inner }
    }
}
