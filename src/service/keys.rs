//! Classified key lists for one target language.

use std::collections::HashMap;

use serde::Serialize;

use crate::classify::{
    Classification,
    classify,
    classify_translation_set,
};
use crate::service::{
    ServerState,
    ServiceError,
};

/// Key lists as sent to the editor.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct KeyLists {
    pub new_keys: Vec<String>,
    pub changed_keys: Vec<String>,
    pub done_keys: Vec<String>,
    pub skipped_keys: Vec<String>,
}

impl From<Classification> for KeyLists {
    fn from(classification: Classification) -> Self {
        Self {
            new_keys: classification.new,
            changed_keys: classification.changed,
            done_keys: classification.done,
            skipped_keys: classification.skipped,
        }
    }
}

/// Classifies every source key against `language`, keeping keys containing `query`.
///
/// # Errors
/// Returns [`ServiceError::Validation`] for an unknown language.
pub async fn list_keys(
    state: &ServerState,
    language: &str,
    query: &str,
) -> Result<KeyLists, ServiceError> {
    let language = state.target_language(language);
    if !state.settings.is_known_language(language) {
        tracing::warn!(language, "Rejected key listing for unknown language");
        return Err(ServiceError::validation(format!("unknown language: {language}")));
    }

    let (db, translations) = state.lock_db_and_translations().await;

    let classification = match translations.get(language) {
        Some(set) => classify_translation_set(&*db, state.catalog, *set).filtered(query),
        None => classify(state.catalog.keys(&*db), &HashMap::new(), query),
    };
    tracing::debug!(language, query, keys = classification.len(), "Listed keys");

    Ok(classification.into())
}
