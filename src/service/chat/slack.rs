//! Slack implementation of the chat client.
//!
//! This module provides functionality for interacting with Slack:
//! - Receiving Events API and interactivity payloads over signed webhooks
//! - Sending messages, threaded replies, and reactions
//! - Opening modals and reading message history
//!
//! Inbound requests are acknowledged immediately; the work itself is handed to
//! the `interaction` handlers, which run on their own tasks.

use crate::{
    base::{
        config::Config,
        types::{FlagReaction, IncomingMessage, PollShortcut, PollSubmission, PostedMessage, Res, Void},
    },
    interaction::{self, poll_shortcut::{POLL_MODAL_CALLBACK_ID, POLL_SHORTCUT_CALLBACK_ID}},
    service::translate::TranslateClient,
};
use async_trait::async_trait;
use axum::{
    Extension, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};
use hyper_rustls::HttpsConnector;
use hyper_util::client::legacy::connect::HttpConnector;
use serde_json::Value;
use slack_morphism::prelude::*;
use tracing::{debug, info, instrument, warn};

use std::sync::Arc;

use super::{ChatClient, GenericChatClient};

// Type aliases.

type FullClient = slack_morphism::SlackClient<SlackClientHyperConnector<HttpsConnector<HttpConnector>>>;

/// Route receiving Events API push events.
pub const EVENTS_PATH: &str = "/slack/events";

/// Route receiving shortcuts and view submissions.
pub const INTERACTIONS_PATH: &str = "/slack/interactions";

// Extra methods on `ChatClient` applied by the slack implementation.

impl ChatClient {
    /// Creates a new Slack chat client.
    pub async fn slack(config: &Config, translate: TranslateClient) -> Res<Self> {
        let client = SlackChatClient::new(config, translate).await?;
        Ok(Self { inner: Arc::new(client) })
    }
}

impl From<SlackChatClient> for ChatClient {
    fn from(client: SlackChatClient) -> Self {
        Self { inner: Arc::new(client) }
    }
}

// Structs.

/// State shared with the webhook handlers.
#[derive(Clone)]
struct SlackUserState {
    chat: ChatClient,
    translate: TranslateClient,
}

/// Slack client implementation.
#[derive(Clone)]
struct SlackChatClient {
    pub bot_token: SlackApiToken,
    pub signing_secret: SlackSigningSecret,
    pub listen_address: String,
    pub bot_user_id: String,
    pub client: Arc<FullClient>,
    pub translate: TranslateClient,
}

impl SlackChatClient {
    /// Create a new Slack chat client.
    #[instrument(name = "SlackChatClient::new", skip_all)]
    pub async fn new(config: &Config, translate: TranslateClient) -> Res<Self> {
        // Initialize tokens.

        let bot_token = SlackApiToken::new(SlackApiTokenValue(config.slack_bot_token.clone()));
        let signing_secret: SlackSigningSecret = config.slack_signing_secret.clone().into();

        // Initialize the Slack client.

        let https_connector = HttpsConnector::<HttpConnector>::builder().with_native_roots()?.https_only().enable_all_versions().build();
        let connector = SlackClientHyperConnector::with_connector(https_connector);
        let client = Arc::new(slack_morphism::SlackClient::new(connector));

        // Get the bot's user ID.

        let session = client.open_session(&bot_token);
        let bot_user = session.auth_test().await?;
        let bot_user_id = bot_user.user_id.0;

        info!("Slack bot user ID: {}", bot_user_id);

        Ok(Self {
            bot_token,
            signing_secret,
            listen_address: config.listen_address(),
            bot_user_id,
            client,
            translate,
        })
    }
}

#[async_trait]
impl GenericChatClient for SlackChatClient {
    fn bot_user_id(&self) -> &str {
        &self.bot_user_id
    }

    async fn start(&self) -> Void {
        // Initialize the listener environment.

        let listener_environment = Arc::new(SlackClientEventsListenerEnvironment::new(self.client.clone()));
        let listener = SlackEventsAxumListener::new(listener_environment);

        let user_state = SlackUserState {
            chat: ChatClient::from(self.clone()),
            translate: self.translate.clone(),
        };

        // Every route verifies the request signature before the handler runs.

        let app = Router::new()
            .route(
                EVENTS_PATH,
                post(handle_push_event).layer(listener.events_layer(&self.signing_secret).with_event_extractor(SlackEventsExtractors::push_event())),
            )
            .route(
                INTERACTIONS_PATH,
                post(handle_interaction_event).layer(listener.events_layer(&self.signing_secret).with_event_extractor(SlackEventsExtractors::interaction_event())),
            )
            .with_state(user_state);

        let tcp_listener = tokio::net::TcpListener::bind(&self.listen_address).await?;

        info!("Listening for Slack events on {} ...", self.listen_address);

        axum::serve(tcp_listener, app).with_graceful_shutdown(shutdown_signal()).await?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn send_message(&self, channel_id: &str, text: &str) -> Void {
        let message = SlackMessageContent::new().with_text(text.to_string());
        let request = SlackApiChatPostMessageRequest::new(SlackChannelId(channel_id.to_string()), message);

        let session = self.client.open_session(&self.bot_token);

        let _ = session.chat_post_message(&request).await.map_err(|e| anyhow::anyhow!("Failed to send message: {}", e))?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn reply_in_thread(&self, channel_id: &str, thread_ts: &str, text: &str) -> Void {
        let message = SlackMessageContent::new().with_text(text.to_string());
        let request = SlackApiChatPostMessageRequest::new(SlackChannelId(channel_id.to_string()), message).with_thread_ts(SlackTs(thread_ts.to_string()));

        let session = self.client.open_session(&self.bot_token);

        let _ = session.chat_post_message(&request).await.map_err(|e| anyhow::anyhow!("Failed to reply in thread: {}", e))?;

        Ok(())
    }

    #[instrument(skip(self, blocks))]
    async fn post_blocks(&self, channel_id: &str, text: &str, blocks: Value) -> Res<PostedMessage> {
        let blocks: Vec<SlackBlock> = serde_json::from_value(blocks)?;
        let message = SlackMessageContent::new().with_text(text.to_string()).with_blocks(blocks);
        let request = SlackApiChatPostMessageRequest::new(SlackChannelId(channel_id.to_string()), message);

        let session = self.client.open_session(&self.bot_token);

        // Fails with `not_in_channel` when the bot has not been added to the conversation.
        let response = session.chat_post_message(&request).await.map_err(|e| anyhow::anyhow!("Failed to post message to {}: {}", channel_id, e))?;

        Ok(PostedMessage {
            channel_id: response.channel.0,
            ts: response.ts.0,
        })
    }

    #[instrument(skip(self))]
    async fn react_to_message(&self, channel_id: &str, ts: &str, emoji: &str) -> Void {
        let request = SlackApiReactionsAddRequest::new(SlackChannelId(channel_id.to_string()), SlackReactionName(emoji.to_string()), SlackTs(ts.to_string()));

        let session = self.client.open_session(&self.bot_token);

        let _ = session.reactions_add(&request).await.map_err(|e| anyhow::anyhow!("Failed to react to message: {}", e))?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn get_message_text(&self, channel_id: &str, ts: &str) -> Res<Option<String>> {
        let request = SlackApiConversationsHistoryRequest::new()
            .with_channel(SlackChannelId(channel_id.to_string()))
            .with_latest(SlackTs(ts.to_string()))
            .with_inclusive(true)
            .with_limit(1);

        let session = self.client.open_session(&self.bot_token);

        let response = session.conversations_history(&request).await.map_err(|e| anyhow::anyhow!("Failed to fetch message history: {}", e))?;

        Ok(exact_message_text(response.messages, ts))
    }

    #[instrument(skip(self, view))]
    async fn open_modal(&self, trigger_id: &str, view: Value) -> Void {
        let view: SlackView = serde_json::from_value(view)?;
        let request = SlackApiViewsOpenRequest::new(SlackTriggerId(trigger_id.to_string()), view);

        let session = self.client.open_session(&self.bot_token);

        let _ = session.views_open(&request).await.map_err(|e| anyhow::anyhow!("Failed to open modal: {}", e))?;

        Ok(())
    }
}

/// Resolves once the process is asked to stop.
async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", err);
        std::future::pending::<()>().await;
    }

    info!("Shutting down ...");
}

// Webhook handlers for Slack.

/// Handles Events API push events.
#[instrument(skip_all)]
async fn handle_push_event(State(state): State<SlackUserState>, Extension(event): Extension<SlackPushEvent>) -> Response {
    match event {
        SlackPushEvent::UrlVerification(url_verification) => {
            info!("Answering URL verification challenge ...");
            url_verification.challenge.into_response()
        }
        SlackPushEvent::EventCallback(event_callback) => {
            dispatch_event_callback(event_callback.event, &state);
            StatusCode::OK.into_response()
        }
        _ => {
            warn!("Received unhandled push event.");
            StatusCode::OK.into_response()
        }
    }
}

/// Routes a push event body to its handler.
fn dispatch_event_callback(event: SlackEventCallbackBody, state: &SlackUserState) {
    match event {
        SlackEventCallbackBody::Message(message_event) => {
            debug!("Received message event ...");

            if let Some(message) = incoming_message(&message_event, state.chat.bot_user_id()) {
                interaction::greeting::handle_greeting(message, state.chat.clone());
            }
        }
        SlackEventCallbackBody::ReactionAdded(reaction_event) => {
            debug!("Received reaction added event ...");

            match flag_reaction(&reaction_event) {
                Some(reaction) => interaction::reaction_translation::handle_reaction_added(reaction, state.chat.clone(), state.translate.clone()),
                None => debug!("Skipping reaction on a non-message item."),
            }
        }
        _ => {
            debug!("Received unhandled event callback.")
        }
    }
}

/// Handles shortcut and view submission payloads.
#[instrument(skip_all)]
async fn handle_interaction_event(State(state): State<SlackUserState>, Extension(event): Extension<SlackInteractionEvent>) -> Response {
    match event {
        SlackInteractionEvent::Shortcut(shortcut_event) if shortcut_event.callback_id.0 == POLL_SHORTCUT_CALLBACK_ID => {
            info!("Received poll shortcut ...");

            let shortcut = PollShortcut {
                trigger_id: shortcut_event.trigger_id.0,
                user_id: shortcut_event.user.id.0,
            };

            interaction::poll_shortcut::handle_poll_shortcut(shortcut, state.chat.clone());
        }
        SlackInteractionEvent::ViewSubmission(submission_event) if modal_callback_id(&submission_event.view.view) == Some(POLL_MODAL_CALLBACK_ID) => {
            info!("Received poll submission ...");

            match poll_submission(&submission_event) {
                Ok(poll) => interaction::poll_submission::handle_poll_submission(poll, state.chat.clone()),
                Err(err) => warn!("Ignoring malformed poll submission: {}", err),
            }
        }
        _ => {
            warn!("Received unhandled interaction event.");
        }
    }

    // An empty 200 acknowledges the interaction (and closes the modal).
    StatusCode::OK.into_response()
}

// Conversions from Slack payloads.

/// Extracts the parts of a message event the greeting cares about.
///
/// Edits, joins and other subtyped messages are skipped, as are messages
/// sent by bots (including this one).
fn incoming_message(event: &SlackMessageEvent, bot_user_id: &str) -> Option<IncomingMessage> {
    if event.subtype.is_some() || event.sender.bot_id.is_some() {
        return None;
    }

    let user_id = event.sender.user.as_ref()?.0.clone();
    if user_id == bot_user_id {
        return None;
    }

    Some(IncomingMessage {
        channel_id: event.origin.channel.as_ref()?.0.clone(),
        user_id,
        text: event.content.as_ref().and_then(|c| c.text.clone()).unwrap_or_default(),
    })
}

/// Extracts the reaction, when it was added to a message.
fn flag_reaction(event: &SlackReactionAddedEvent) -> Option<FlagReaction> {
    let SlackReactionsItem::Message(message) = &event.item else {
        return None;
    };

    Some(FlagReaction {
        reaction: event.reaction.0.clone(),
        user_id: event.user.0.clone(),
        channel_id: message.origin.channel.as_ref()?.0.clone(),
        message_ts: message.origin.ts.0.clone(),
    })
}

/// Text of the history message posted at exactly `ts`.
///
/// Thread replies are not part of the channel history, so the closest
/// top-level message may come back instead; only an exact match counts.
fn exact_message_text(messages: Vec<SlackHistoryMessage>, ts: &str) -> Option<String> {
    messages.into_iter().find(|m| m.origin.ts.0 == ts).and_then(|m| m.content.text)
}

/// Reads the poll modal's input values out of a view submission.
fn poll_submission(event: &SlackInteractionViewSubmissionEvent) -> Res<PollSubmission> {
    let values = serde_json::to_value(&event.view.state_params.state)?;

    PollSubmission::from_view_state(&event.user.id.0, &values)
}

/// The callback ID of a modal view, if any.
fn modal_callback_id(view: &SlackView) -> Option<&str> {
    match view {
        SlackView::Modal(modal) => modal.callback_id.as_ref().map(|c| c.0.as_str()),
        SlackView::Home(_) => None,
    }
}

// Tests.

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn reaction_events_on_messages_become_flag_reactions() {
        let event: SlackReactionAddedEvent = serde_json::from_value(json!({
            "type": "reaction_added",
            "user": "U024BE7LH",
            "reaction": "flag-mx",
            "item_user": "U0G9QF9C6",
            "item": { "type": "message", "channel": "C0G9QF9GZ", "ts": "1360782400.498405" },
            "event_ts": "1360782804.083113"
        }))
        .unwrap();

        assert_eq!(
            flag_reaction(&event),
            Some(FlagReaction {
                reaction: "flag-mx".to_string(),
                user_id: "U024BE7LH".to_string(),
                channel_id: "C0G9QF9GZ".to_string(),
                message_ts: "1360782400.498405".to_string(),
            })
        );
    }

    fn message_event(value: serde_json::Value) -> SlackMessageEvent {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn human_messages_reach_the_greeting() {
        let event = message_event(json!({ "type": "message", "channel": "C1", "user": "U9", "text": "hello", "ts": "1700000000.000100" }));

        assert_eq!(
            incoming_message(&event, "UBOT"),
            Some(IncomingMessage {
                channel_id: "C1".to_string(),
                user_id: "U9".to_string(),
                text: "hello".to_string(),
            })
        );
    }

    #[test]
    fn the_bots_own_messages_are_skipped() {
        let event = message_event(json!({ "type": "message", "channel": "C1", "user": "UBOT", "text": "hello", "ts": "1700000000.000100" }));

        assert_eq!(incoming_message(&event, "UBOT"), None);
    }

    #[test]
    fn bot_and_subtyped_messages_are_skipped() {
        let from_bot = message_event(json!({ "type": "message", "channel": "C1", "user": "U9", "bot_id": "B1", "text": "hello", "ts": "1700000000.000100" }));
        let bot_message = message_event(json!({ "type": "message", "subtype": "bot_message", "channel": "C1", "text": "hello", "ts": "1700000000.000100" }));
        let join = message_event(json!({ "type": "message", "subtype": "channel_join", "channel": "C1", "user": "U9", "text": "hello", "ts": "1700000000.000100" }));

        assert_eq!(incoming_message(&from_bot, "UBOT"), None);
        assert_eq!(incoming_message(&bot_message, "UBOT"), None);
        assert_eq!(incoming_message(&join, "UBOT"), None);
    }

    #[test]
    fn messages_without_a_user_are_skipped() {
        let event = message_event(json!({ "type": "message", "channel": "C1", "text": "hello", "ts": "1700000000.000100" }));

        assert_eq!(incoming_message(&event, "UBOT"), None);
    }

    #[test]
    fn history_text_requires_an_exact_timestamp() {
        let messages: Vec<SlackHistoryMessage> = serde_json::from_value(json!([
            { "type": "message", "user": "U9", "text": "Older top-level message", "ts": "1700000000.000100" }
        ]))
        .unwrap();

        assert_eq!(exact_message_text(messages.clone(), "1700000000.000100"), Some("Older top-level message".to_string()));
        assert_eq!(exact_message_text(messages, "1700000050.000200"), None);
        assert_eq!(exact_message_text(Vec::new(), "1700000050.000200"), None);
    }

    #[test]
    fn view_submissions_carry_the_poll() {
        let mut view = interaction::poll_shortcut::poll_modal_view();
        view["id"] = json!("V123");
        view["team_id"] = json!("T1");
        view["hash"] = json!("1700000000.abcdef");
        view["state"] = json!({
            "values": {
                "target_conversation": { "input": { "type": "conversations_select", "selected_conversation": "C42" } },
                "poll_question": { "input": { "type": "plain_text_input", "value": "Lunch?" } },
                "option_1": { "input": { "type": "plain_text_input", "value": "Pizza" } },
                "option_2": { "input": { "type": "plain_text_input", "value": "Tacos" } },
                "option_3": { "input": { "type": "plain_text_input", "value": "Sushi" } }
            }
        });

        let event: SlackInteractionEvent = serde_json::from_value(json!({
            "type": "view_submission",
            "team": { "id": "T1", "domain": "example" },
            "user": { "id": "U9", "team_id": "T1" },
            "view": view
        }))
        .unwrap();

        let SlackInteractionEvent::ViewSubmission(submission) = event else {
            panic!("expected a view submission");
        };

        assert_eq!(modal_callback_id(&submission.view.view), Some(POLL_MODAL_CALLBACK_ID));
        assert_eq!(
            poll_submission(&submission).unwrap(),
            PollSubmission {
                user_id: "U9".to_string(),
                conversation_id: "C42".to_string(),
                question: "Lunch?".to_string(),
                options: ["Pizza".to_string(), "Tacos".to_string(), "Sushi".to_string()],
            }
        );
    }

    #[test]
    fn modal_views_expose_their_callback_id() {
        let view: SlackView = serde_json::from_value(interaction::poll_shortcut::poll_modal_view()).unwrap();

        assert_eq!(modal_callback_id(&view), Some(POLL_MODAL_CALLBACK_ID));
    }

    #[test]
    fn poll_blocks_are_valid_block_kit() {
        let poll = PollSubmission {
            user_id: "U1".to_string(),
            conversation_id: "C1".to_string(),
            question: "Lunch?".to_string(),
            options: ["Pizza".to_string(), "Tacos".to_string(), "Sushi".to_string()],
        };

        let blocks: Vec<SlackBlock> = serde_json::from_value(interaction::poll_submission::poll_message_blocks(&poll)).unwrap();

        assert_eq!(blocks.len(), 4);
    }
}
