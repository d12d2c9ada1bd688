//! Source localisation input definitions.
//!
//! Paradox localisation files are only YAML-like: real-world files carry
//! indented blank lines, bare numbers after the colon and unescaped quotes.
//! They are parsed line by line here and malformed entry lines are ignored.

use std::collections::BTreeMap;

use thiserror::Error;

use crate::db::L10nDatabase;
use crate::types::{
    LocalisedValue,
    language_from_header,
};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    /// The first line is not `l_<language>:` for a configured language
    #[error("Invalid file. Malformed header line [{0}].")]
    MalformedHeader(String),
}

/// A translatable key with its values in every loaded language.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceKey {
    pub key: String,
    /// Values in load order. The first one is the reference value.
    pub values: Vec<LocalisedValue>,
}

impl SourceKey {
    #[must_use]
    pub fn new(key: impl Into<String>, values: Vec<LocalisedValue>) -> Self {
        Self { key: key.into(), values }
    }

    /// The value translations are produced against; `""` when the key has no value.
    #[must_use]
    pub fn current_value(&self) -> &str {
        self.values.first().map_or("", |value| value.value.as_str())
    }

    /// Value in `language`, if the key was loaded for it.
    #[must_use]
    pub fn value_in(&self, language: &str) -> Option<&str> {
        self.values.iter().find(|value| value.language == language).map(|value| value.value.as_str())
    }
}

/// Salsa input holding every source key.
#[salsa::input]
pub struct SourceCatalog {
    /// Keys in byte-wise sorted order.
    #[returns(ref)]
    pub keys: BTreeMap<String, SourceKey>,
}

impl SourceCatalog {
    /// Looks up one source key.
    pub fn get<'db>(self, db: &'db dyn L10nDatabase, key: &str) -> Option<&'db SourceKey> {
        self.keys(db).get(key)
    }
}

/// Entries of one parsed localisation file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalisationFile {
    pub language: String,
    /// `(key, value)` pairs in file order.
    pub entries: Vec<(String, String)>,
}

/// Parses the content of a `*_l_<language>.yml` file.
///
/// # Errors
/// Returns [`SourceError::MalformedHeader`] when the first line is not a
/// header for one of `languages`.
pub fn parse_localisation_file(
    content: &str,
    languages: &[String],
) -> Result<LocalisationFile, SourceError> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let mut lines = content.lines();

    let header = lines.next().unwrap_or_default().trim();
    let language = language_from_header(header, languages)
        .ok_or_else(|| SourceError::MalformedHeader(header.to_string()))?;

    let entries = lines.filter_map(parse_entry_line).collect();

    Ok(LocalisationFile { language: language.to_string(), entries })
}

/// Parses `key:0 "value"`; `None` for blank, comment and malformed lines.
fn parse_entry_line(line: &str) -> Option<(String, String)> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') || !line.ends_with('"') {
        return None;
    }

    let colon = line.find(':')?;
    let quote = line.find('"')?;

    let key = line.get(..colon)?.trim();
    if key.is_empty() {
        return None;
    }

    // Opening quote to closing quote; a lone quote yields an empty value.
    let value = line.get(quote + 1..line.len() - 1).unwrap_or_default().trim();

    Some((key.to_string(), unescape_value(value)))
}

/// Reverses the `\n`, `\"` and `\\` escapes of localisation values.
fn unescape_value(value: &str) -> String {
    let mut result = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            result.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => result.push('\n'),
            Some('"') => result.push('"'),
            Some('\\') => result.push('\\'),
            Some(other) => {
                result.push('\\');
                result.push(other);
            }
            None => result.push('\\'),
        }
    }
    result
}

/// Merges parsed files into catalog keys.
///
/// Files are merged in the given order, so a key's values follow file order.
/// With `source_language` set, files of other languages are ignored.
#[must_use]
pub fn merge_localisation_files(
    files: Vec<LocalisationFile>,
    source_language: Option<&str>,
) -> BTreeMap<String, SourceKey> {
    let mut keys: BTreeMap<String, SourceKey> = BTreeMap::new();

    for file in files {
        if source_language.is_some_and(|language| language != file.language) {
            tracing::debug!(language = %file.language, "Skipping file of non-source language");
            continue;
        }
        for (key, value) in file.entries {
            let value = LocalisedValue::new(file.language.clone(), value);
            keys.entry(key.clone()).or_insert_with(|| SourceKey::new(key, Vec::new())).values.push(value);
        }
    }

    keys
}
