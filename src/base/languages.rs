//! Flag emoji to translation language resolution.
//!
//! Slack names most country flags `flag-xx`, but a handful of common ones
//! (United States, Spain, Japan, Russia, ...) use the bare country code. Both
//! forms are keyed in the same table.

use std::{collections::HashMap, sync::LazyLock};

/// A supported translation target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Language {
    /// Code understood by the translation service.
    pub code: &'static str,
    /// Human-readable name used in replies.
    pub name: &'static str,
}

const fn lang(code: &'static str, name: &'static str) -> Language {
    Language { code, name }
}

/// Emoji country code -> translation target.
pub static LANGUAGES: LazyLock<HashMap<&'static str, Language>> = LazyLock::new(|| {
    HashMap::from([
        // Spanish.
        ("es", lang("es", "Spanish")),
        ("mx", lang("es", "Spanish")),
        ("ar", lang("es", "Spanish")),
        ("co", lang("es", "Spanish")),
        ("pe", lang("es", "Spanish")),
        ("ve", lang("es", "Spanish")),
        ("cu", lang("es", "Spanish")),
        // English.
        ("us", lang("en", "English")),
        ("gb", lang("en", "English")),
        ("uk", lang("en", "English")),
        ("au", lang("en", "English")),
        ("ca", lang("en", "English")),
        ("nz", lang("en", "English")),
        ("ie", lang("en", "English")),
        // Portuguese.
        ("pt", lang("pt", "Portuguese")),
        ("br", lang("pt", "Portuguese")),
        // Others.
        ("fr", lang("fr", "French")),
        ("de", lang("de", "German")),
        ("at", lang("de", "German")),
        ("it", lang("it", "Italian")),
        ("nl", lang("nl", "Dutch")),
        ("se", lang("sv", "Swedish")),
        ("no", lang("no", "Norwegian")),
        ("dk", lang("da", "Danish")),
        ("fi", lang("fi", "Finnish")),
        ("pl", lang("pl", "Polish")),
        ("gr", lang("el", "Greek")),
        ("tr", lang("tr", "Turkish")),
        ("ru", lang("ru", "Russian")),
        ("ua", lang("uk", "Ukrainian")),
        ("jp", lang("ja", "Japanese")),
        ("kr", lang("ko", "Korean")),
        ("cn", lang("zh-CN", "Chinese (Simplified)")),
        ("tw", lang("zh-TW", "Chinese (Traditional)")),
        ("in", lang("hi", "Hindi")),
        ("vn", lang("vi", "Vietnamese")),
        ("th", lang("th", "Thai")),
        ("il", lang("iw", "Hebrew")),
        ("eg", lang("ar", "Arabic")),
    ])
});

/// Outcome of looking up a reaction name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagResolution<'a> {
    /// The flag maps to a supported language.
    Supported(&'static Language),
    /// A flag, but for a country we have no language for.
    Unsupported(&'a str),
    /// Not a flag at all.
    NotAFlag,
}

/// Resolves an emoji short name (e.g. `flag-mx` or `jp`) to a language.
pub fn resolve_flag(reaction: &str) -> FlagResolution<'_> {
    if let Some(language) = LANGUAGES.get(reaction) {
        return FlagResolution::Supported(language);
    }

    if !reaction.contains("flag-") {
        return FlagResolution::NotAFlag;
    }

    let country = reaction.split('-').nth(1).unwrap_or_default();

    match LANGUAGES.get(country) {
        Some(language) => FlagResolution::Supported(language),
        None => FlagResolution::Unsupported(country),
    }
}

// Tests.
