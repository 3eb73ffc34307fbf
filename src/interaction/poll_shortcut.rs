//! Opens the poll creation modal when the `create_poll` shortcut is used.

use serde_json::{Value, json};
use tracing::{Instrument, error, info, instrument};

use crate::{
    base::types::{PollShortcut, Void},
    service::chat::ChatClient,
};

/// Callback ID of the global shortcut.
pub const POLL_SHORTCUT_CALLBACK_ID: &str = "create_poll";

/// Callback ID of the modal the shortcut opens.
pub const POLL_MODAL_CALLBACK_ID: &str = "poll_shortcut_modal";

/// Block IDs of the modal inputs, in display order.
pub const TARGET_CONVERSATION_BLOCK: &str = "target_conversation";
pub const QUESTION_BLOCK: &str = "poll_question";
pub const OPTION_BLOCKS: [&str; 3] = ["option_1", "option_2", "option_3"];

/// Action ID shared by every input element.
pub const INPUT_ACTION_ID: &str = "input";

fn plain_text(text: &str) -> Value {
    json!({ "type": "plain_text", "text": text, "emoji": true })
}

fn text_input_block(block_id: &str, label: &str) -> Value {
    json!({
        "type": "input",
        "block_id": block_id,
        "element": {
            "type": "plain_text_input",
            "action_id": INPUT_ACTION_ID,
        },
        "label": plain_text(label),
    })
}

/// The poll creation modal.
pub fn poll_modal_view() -> Value {
    let mut blocks = vec![json!({
        "type": "input",
        "block_id": TARGET_CONVERSATION_BLOCK,
        "element": {
            "type": "conversations_select",
            "placeholder": plain_text("Select a conversation"),
            "filter": {
                "include": ["public", "mpim"],
                "exclude_bot_users": true,
            },
            "action_id": INPUT_ACTION_ID,
        },
        "label": plain_text("Select the conversation to publish your poll to:"),
    })];

    blocks.push(text_input_block(QUESTION_BLOCK, "Poll Question"));

    for (index, block_id) in OPTION_BLOCKS.iter().enumerate() {
        blocks.push(text_input_block(block_id, &format!("Option {}", index + 1)));
    }

    json!({
        "type": "modal",
        "callback_id": POLL_MODAL_CALLBACK_ID,
        "title": { "type": "plain_text", "text": "Create new poll" },
        "submit": { "type": "plain_text", "text": "Start Poll" },
        "blocks": blocks,
    })
}

#[instrument(skip_all)]
pub fn handle_poll_shortcut(shortcut: PollShortcut, chat: ChatClient) {
    tokio::spawn(async move {
        // Process the event.
        let result = process_poll_shortcut(&shortcut, &chat).in_current_span().await;

        // Log any errors.
        if let Err(err) = &result {
            error!("Error while handling: {}", err);
        }
    });
}

#[instrument(skip_all, fields(user_id = %shortcut.user_id))]
pub async fn process_poll_shortcut(shortcut: &PollShortcut, chat: &ChatClient) -> Void {
    info!("Opening poll modal ...");

    chat.open_modal(&shortcut.trigger_id, poll_modal_view()).await
}

// Tests.

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modal_is_identified_by_its_callback_id() {
        let view = poll_modal_view();

        assert_eq!(view["type"], "modal");
        assert_eq!(view["callback_id"], POLL_MODAL_CALLBACK_ID);
        assert_eq!(view["submit"]["text"], "Start Poll");
    }

    #[test]
    fn modal_asks_for_a_conversation_a_question_and_three_options() {
        let view = poll_modal_view();
        let blocks = view["blocks"].as_array().unwrap();

        let block_ids: Vec<_> = blocks.iter().map(|b| b["block_id"].as_str().unwrap()).collect();
        assert_eq!(block_ids, ["target_conversation", "poll_question", "option_1", "option_2", "option_3"]);

        assert_eq!(blocks[0]["element"]["type"], "conversations_select");
        assert_eq!(blocks[0]["element"]["filter"]["include"], json!(["public", "mpim"]));
        assert!(blocks[1..].iter().all(|b| b["element"]["type"] == "plain_text_input"));
        assert!(blocks.iter().all(|b| b["element"]["action_id"] == INPUT_ACTION_ID));
        assert_eq!(blocks[4]["label"]["text"], "Option 3");
    }
}
