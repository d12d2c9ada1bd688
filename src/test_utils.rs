//! Shared test fixtures.
#![cfg(test)]

use std::collections::BTreeMap;

use crate::config::WorkbenchSettings;
use crate::input::source::{
    LocalisationFile,
    SourceKey,
    merge_localisation_files,
};
use crate::input::translation::TranslationRecord;

/// Builds catalog keys with English values.
///
/// # Arguments
/// * `entries` - `(key, value)` pairs
pub(crate) fn source_keys(entries: &[(&str, &str)]) -> BTreeMap<String, SourceKey> {
    let file = LocalisationFile {
        language: "english".to_string(),
        entries: entries.iter().map(|(key, value)| ((*key).to_string(), (*value).to_string())).collect(),
    };
    merge_localisation_files(vec![file], None)
}

/// Builds a never-written record.
pub(crate) fn record(original_value: &str, value: &str, skipped: bool) -> TranslationRecord {
    TranslationRecord {
        original_value: original_value.to_string(),
        value: value.to_string(),
        skipped,
        update_time: None,
    }
}

/// Settings with one placeholder source path, as validation requires.
pub(crate) fn test_settings() -> WorkbenchSettings {
    WorkbenchSettings {
        name: "test_mod".to_string(),
        source_paths: vec!["localisation".into()],
        ..WorkbenchSettings::default()
    }
}
