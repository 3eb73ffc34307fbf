//! Publishes a poll once the creation modal is submitted.

use serde_json::{Value, json};
use tracing::{Instrument, error, info, instrument};

use crate::{
    base::types::{PollSubmission, Res, Void},
    interaction::poll_shortcut::{INPUT_ACTION_ID, OPTION_BLOCKS, QUESTION_BLOCK, TARGET_CONVERSATION_BLOCK},
    service::chat::ChatClient,
};

/// Reactions added to a poll, one per option.
pub const POLL_REACTIONS: [&str; 3] = ["one", "two", "three"];

impl PollSubmission {
    /// Extracts the submission from a modal's serialized view state
    /// (`{"values": {block_id: {action_id: {...}}}}`).
    pub fn from_view_state(user_id: &str, state: &Value) -> Res<Self> {
        let conversation_id = state_value(state, TARGET_CONVERSATION_BLOCK, "selected_conversation")?;
        let question = state_value(state, QUESTION_BLOCK, "value")?;
        let [first, second, third] = OPTION_BLOCKS.map(|block_id| state_value(state, block_id, "value"));

        Ok(Self {
            user_id: user_id.to_string(),
            conversation_id,
            question,
            options: [first?, second?, third?],
        })
    }
}

fn state_value(state: &Value, block_id: &str, field: &str) -> Res<String> {
    let pointer = format!("/values/{block_id}/{INPUT_ACTION_ID}/{field}");

    state
        .pointer(&pointer)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or(anyhow::anyhow!("Poll submission is missing `{}`", block_id))
}

/// Plain-text fallback for the poll message.
pub fn poll_fallback_text(poll: &PollSubmission) -> String {
    let mut text = format!("<@{}> wants to know: {}", poll.user_id, poll.question);

    for (emoji, option) in POLL_REACTIONS.iter().zip(&poll.options) {
        text.push_str(&format!("\n:{emoji}: {option}"));
    }

    text
}

/// Block Kit layout of the poll message.
pub fn poll_message_blocks(poll: &PollSubmission) -> Value {
    let mut blocks = vec![json!({
        "type": "section",
        "text": {
            "type": "mrkdwn",
            "text": format!("<@{}> wants to know: *{}*", poll.user_id, poll.question),
        },
    })];

    for (emoji, option) in POLL_REACTIONS.iter().zip(&poll.options) {
        blocks.push(json!({
            "type": "section",
            "text": {
                "type": "plain_text",
                "text": format!(":{emoji}: {option}"),
                "emoji": true,
            },
        }));
    }

    Value::Array(blocks)
}

#[instrument(skip_all)]
pub fn handle_poll_submission(poll: PollSubmission, chat: ChatClient) {
    tokio::spawn(async move {
        // Process the event.
        let result = process_poll_submission(&poll, &chat).in_current_span().await;

        // Log any errors.
        if let Err(err) = &result {
            error!("Error while handling: {}", err);
        }
    });
}

/// Posts the poll, then seeds it with one reaction per option, in order.
///
/// The first failure stops processing; nothing is retried.
#[instrument(skip_all, fields(conversation_id = %poll.conversation_id))]
pub async fn process_poll_submission(poll: &PollSubmission, chat: &ChatClient) -> Void {
    info!("Publishing poll ...");

    let posted = chat
        .post_blocks(&poll.conversation_id, &poll_fallback_text(poll), poll_message_blocks(poll))
        .await?;

    for emoji in POLL_REACTIONS {
        chat.react_to_message(&posted.channel_id, &posted.ts, emoji).await?;
    }

    Ok(())
}

// Tests.
