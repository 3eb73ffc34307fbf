//! Result aliases and the records passed from the chat service to the handlers.

/// Error type used throughout the bot.
pub type Err = anyhow::Error;
/// Result with the bot's error type.
pub type Res<T> = Result<T, Err>;
/// Result carrying no value.
pub type Void = Res<()>;

/// A channel message the greeting responder looks at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingMessage {
    /// Channel the message was posted in.
    pub channel_id: String,
    /// Author of the message.
    pub user_id: String,
    /// Message text (empty when the message has none).
    pub text: String,
}

/// A reaction added by a user to an existing message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlagReaction {
    /// Emoji short name, without colons (e.g. `flag-mx`).
    pub reaction: String,
    /// User who added the reaction.
    pub user_id: String,
    /// Channel of the reacted message.
    pub channel_id: String,
    /// Timestamp of the message the reaction was added to.
    pub message_ts: String,
}

/// An invocation of the `create_poll` shortcut.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollShortcut {
    /// Short-lived trigger used to open the modal.
    pub trigger_id: String,
    /// User who invoked the shortcut.
    pub user_id: String,
}

/// The values a user entered in the poll modal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollSubmission {
    /// User who submitted the poll.
    pub user_id: String,
    /// Conversation the poll is posted to.
    pub conversation_id: String,
    /// The question being asked.
    pub question: String,
    /// The three answers, in display order.
    pub options: [String; 3],
}

/// Location of a message the bot just posted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostedMessage {
    /// Channel the message landed in.
    pub channel_id: String,
    /// Timestamp identifying the message.
    pub ts: String,
}
