//! Translates a message when someone reacts to it with a country flag.

use tracing::{Instrument, debug, error, info, instrument};

use crate::{
    base::{
        languages::{FlagResolution, resolve_flag},
        types::{FlagReaction, Void},
    },
    service::{chat::ChatClient, translate::TranslateClient},
};

/// The threaded reply carrying a translation.
pub fn translation_reply(reaction: &str, language_name: &str, translated: &str) -> String {
    format!(":{reaction}: *Here is the translation of this message in {language_name}:*\n {translated}")
}

#[instrument(skip_all)]
pub fn handle_reaction_added(reaction: FlagReaction, chat: ChatClient, translate: TranslateClient) {
    tokio::spawn(async move {
        // Process the event.
        let result = process_reaction_added(&reaction, &chat, &translate).in_current_span().await;

        // Log any errors.
        if let Err(err) = &result {
            error!("Error while handling: {}", err);
        }
    });
}

/// Translates the reacted message and replies in its thread.
///
/// Reactions that are not flags, or flags without a supported language, are
/// ignored. A failed translation is logged and swallowed; a failed history
/// lookup is returned to the caller.
#[instrument(skip_all, fields(reaction = %reaction.reaction, channel_id = %reaction.channel_id))]
pub async fn process_reaction_added(reaction: &FlagReaction, chat: &ChatClient, translate: &TranslateClient) -> Void {
    let language = match resolve_flag(&reaction.reaction) {
        FlagResolution::Supported(language) => language,
        FlagResolution::Unsupported(country) => {
            debug!("No language for flag `{}`.", country);
            return Ok(());
        }
        FlagResolution::NotAFlag => return Ok(()),
    };

    // Fetch the message that was reacted to.

    let text = chat.get_message_text(&reaction.channel_id, &reaction.message_ts).await?;
    let Some(text) = text.filter(|t| !t.trim().is_empty()) else {
        debug!("Reacted message has no text.");
        return Ok(());
    };

    // Translate it; failures end here.

    let translated = match translate.translate(&text, language.code).await {
        Ok(translated) => translated,
        Err(err) => {
            error!("Translation to {} failed: {}", language.code, err);
            return Ok(());
        }
    };

    info!("Replying with {} translation ...", language.name);

    let reply = translation_reply(&reaction.reaction, language.name, &translated);
    chat.reply_in_thread(&reaction.channel_id, &reaction.message_ts, &reply).await
}

// Tests.

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reply_quotes_the_emoji_and_the_language() {
        assert_eq!(
            translation_reply("flag-mx", "Spanish", "Hola mundo"),
            ":flag-mx: *Here is the translation of this message in Spanish:*\n Hola mundo"
        );
    }
}
