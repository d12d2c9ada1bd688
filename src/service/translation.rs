//! Reading and writing the translation of one key.

use serde::{
    Deserialize,
    Serialize,
};

use crate::input::translation::{
    TranslationRecord,
    translation_set_for,
};
use crate::service::{
    ServerState,
    ServiceError,
};
use crate::types::{
    LocalisedValue,
    format_update_time,
    now_timestamp,
};

/// Source side of a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceSnapshot {
    pub key: String,
    pub values: Vec<LocalisedValue>,
}

/// Translation side of a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TranslationValue {
    pub value: String,
    pub skipped: bool,
    /// Local time as `%Y-%m-%d %H:%M:%S`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update_time: Option<String>,
}

/// Everything the editor shows for one key.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct TranslationSnapshot {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<SourceSnapshot>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub translation: Option<TranslationValue>,
}

/// A submitted translation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TranslationUpdate {
    pub key: String,
    pub language: String,
    /// `null` is stored as an empty value.
    pub value: Option<String>,
    pub skipped: bool,
}

/// Reads the source values and the translation of `key`.
///
/// Unknown keys and languages yield an empty snapshot.
pub async fn get_translation(state: &ServerState, key: &str, language: &str) -> TranslationSnapshot {
    let language = state.target_language(language);
    if key.is_empty() || !state.settings.is_known_language(language) {
        tracing::debug!(key, language, "Empty translation snapshot");
        return TranslationSnapshot::default();
    }

    let (db, translations) = state.lock_db_and_translations().await;

    let source = state
        .catalog
        .get(&*db, key)
        .map(|source| SourceSnapshot { key: source.key.clone(), values: source.values.clone() });
    let translation = translations
        .get(language)
        .and_then(|set| set.record(&*db, key))
        .map(|record| TranslationValue {
            value: record.value.clone(),
            skipped: record.skipped,
            update_time: record.update_time.and_then(format_update_time),
        });

    TranslationSnapshot { source, translation }
}

/// Stores the translation of `key`, replacing any previous one.
///
/// # Errors
/// Returns [`ServiceError::Validation`] for an empty key, an unknown language
/// or a key missing from the source localisation. Nothing is written then.
pub async fn put_translation(
    state: &ServerState,
    update: TranslationUpdate,
) -> Result<(), ServiceError> {
    if update.key.is_empty() {
        tracing::warn!("Rejected translation without key");
        return Err(ServiceError::validation("key is required"));
    }
    let language = state.target_language(&update.language).to_string();
    if !state.settings.is_known_language(&language) {
        tracing::warn!(language, "Rejected translation for unknown language");
        return Err(ServiceError::validation(format!("unknown language: {language}")));
    }

    let (mut db, mut translations) = state.lock_db_and_translations().await;

    let Some(original_value) =
        state.catalog.get(&*db, &update.key).map(|source| source.current_value().to_string())
    else {
        tracing::warn!(key = %update.key, "Rejected translation for unknown key");
        return Err(ServiceError::validation("source localisation not found"));
    };

    let set = translation_set_for(&db, &mut translations, &language);
    let previous_time = set.record(&*db, &update.key).and_then(|record| record.update_time);
    let update_time = previous_time.map_or_else(now_timestamp, |time| time.max(now_timestamp()));

    let record = TranslationRecord {
        original_value,
        value: update.value.unwrap_or_default(),
        skipped: update.skipped,
        update_time: Some(update_time),
    };
    tracing::debug!(key = %update.key, language, skipped = record.skipped, "Storing translation");
    set.upsert(&mut db, update.key, record);

    Ok(())
}
