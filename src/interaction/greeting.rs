//! Replies to channel messages that say hello.

use tracing::{Instrument, debug, error, instrument};

use crate::{
    base::types::{IncomingMessage, Void},
    service::chat::ChatClient,
};

/// Keyword that triggers the greeting.
pub const GREETING_KEYWORD: &str = "hello";

/// Whether the message text should be answered with a greeting.
pub fn is_greeting(text: &str) -> bool {
    text.contains(GREETING_KEYWORD)
}

/// The greeting sent back to `user_id`.
pub fn greeting_for(user_id: &str) -> String {
    format!("Hello, <@{user_id}>!")
}

#[instrument(skip_all)]
pub fn handle_greeting(message: IncomingMessage, chat: ChatClient) {
    tokio::spawn(async move {
        // Process the event.
        let result = process_greeting(&message, &chat).in_current_span().await;

        // Log any errors.
        if let Err(err) = &result {
            error!("Error while handling: {}", err);
        }
    });
}

#[instrument(skip_all, fields(channel_id = %message.channel_id))]
pub async fn process_greeting(message: &IncomingMessage, chat: &ChatClient) -> Void {
    if !is_greeting(&message.text) {
        debug!("Message is not a greeting.");
        return Ok(());
    }

    chat.send_message(&message.channel_id, &greeting_for(&message.user_id)).await
}

// Tests.

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_the_keyword_anywhere_in_the_text() {
        assert!(is_greeting("hello"));
        assert!(is_greeting("well hello there"));
        assert!(is_greeting("othello"));
    }

    #[test]
    fn keyword_match_is_case_sensitive() {
        assert!(!is_greeting("Hello"));
        assert!(!is_greeting("HELLO everyone"));
        assert!(!is_greeting("hi"));
    }

    #[test]
    fn greeting_mentions_the_user() {
        assert_eq!(greeting_for("U123"), "Hello, <@U123>!");
    }
}
