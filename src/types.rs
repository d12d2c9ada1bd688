//! Core types used throughout the project.

use chrono::{
    DateTime,
    Local,
    Utc,
};
use serde::{
    Deserialize,
    Serialize,
};

/// Languages understood by Paradox localisation files.
pub const PARADOX_LANGUAGES: [&str; 10] = [
    "braz_por",
    "english",
    "french",
    "german",
    "japanese",
    "korean",
    "polish",
    "russian",
    "simp_chinese",
    "spanish",
];

/// Display format of update times on the wire.
const UPDATE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// The value of a source key in one language.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LocalisedValue {
    pub language: String,
    pub value: String,
}

impl LocalisedValue {
    #[must_use]
    pub fn new(language: impl Into<String>, value: impl Into<String>) -> Self {
        Self { language: language.into(), value: value.into() }
    }
}

/// Header line of a localisation file, e.g. `l_english:`.
#[must_use]
pub fn file_header(language: &str) -> String {
    format!("l_{language}:")
}

/// File name suffix of a localisation file, e.g. `_l_english.yml`.
#[must_use]
pub fn file_suffix(language: &str) -> String {
    format!("_l_{language}.yml")
}

/// Resolves a header line such as `l_english:` against the known languages.
#[must_use]
pub fn language_from_header<'a>(line: &str, languages: &'a [String]) -> Option<&'a str> {
    let name = line.trim().strip_suffix(':')?.strip_prefix("l_")?;
    languages.iter().find(|language| *language == name).map(String::as_str)
}

/// Current Unix time in seconds.
#[must_use]
pub fn now_timestamp() -> i64 {
    Utc::now().timestamp()
}

/// Formats a Unix timestamp (seconds) in local time.
#[must_use]
pub fn format_update_time(timestamp: i64) -> Option<String> {
    DateTime::from_timestamp(timestamp, 0)
        .map(|time| time.with_timezone(&Local).format(UPDATE_TIME_FORMAT).to_string())
}
