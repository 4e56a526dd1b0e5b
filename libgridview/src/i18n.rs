//! String tables for the widget chrome.

use std::collections::HashMap;
use std::sync::LazyLock;
use tracing::{error, warn};

pub const DEFAULT_LANGUAGE: &str = "en";

macro_rules! locale {
    ($tag:expr) => {
        ($tag, include_str!(concat!("../locales/", $tag, ".toml")))
    };
}

static BUILTIN_LOCALES: LazyLock<HashMap<&'static str, Locale>> = LazyLock::new(|| {
    [locale!("en"), locale!("de")]
        .into_iter()
        .map(|(tag, content)| (tag, Locale::parse(tag, content)))
        .collect()
});

/// Translated strings of one language.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Locale {
    tag: String,
    strings: HashMap<String, String>,
}

impl Locale {
    fn parse(tag: &str, content: &str) -> Self {
        let strings = toml::from_str(content).unwrap_or_else(|e| {
            error!("Failed to parse string table '{tag}': {e}");
            HashMap::new()
        });
        Self {
            tag: tag.to_string(),
            strings,
        }
    }

    #[must_use]
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// The translation of `key`, or `key` itself if the table lacks it.
    #[must_use]
    pub fn get<'a>(&'a self, key: &'a str) -> &'a str {
        self.strings.get(key).map_or(key, String::as_str)
    }
}

/// Primary language subtag of a tag: `de-CH` and `de_CH` become `de`.
fn primary_subtag(tag: &str) -> String {
    tag.split(['-', '_'])
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase()
}

/// Looks up the string table for a language tag, falling back to English.
#[must_use]
pub fn locale(tag: &str) -> &'static Locale {
    let primary = primary_subtag(tag);
    if let Some(locale) = BUILTIN_LOCALES.get(primary.as_str()) {
        return locale;
    }
    warn!("No string table for '{tag}', using '{DEFAULT_LANGUAGE}'");
    &BUILTIN_LOCALES[DEFAULT_LANGUAGE]
}

/// Language tag of the operating system, or English if it cannot be determined.
#[must_use]
pub fn system_language() -> String {
    sys_locale::get_locale().unwrap_or_else(|| DEFAULT_LANGUAGE.to_string())
}

#[must_use]
pub fn available_languages() -> Vec<&'static str> {
    let mut tags: Vec<_> = BUILTIN_LOCALES.keys().copied().collect();
    tags.sort_unstable();
    tags
}
