//! Key classification against one target language.

use std::collections::{
    BTreeMap,
    HashMap,
};

use serde::Serialize;

use crate::db::L10nDatabase;
use crate::input::source::{
    SourceCatalog,
    SourceKey,
};
use crate::input::translation::{
    TranslationRecord,
    TranslationSet,
};

/// State of a source key relative to a target language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyState {
    /// No usable translation yet.
    New,
    /// Translated against a source value that has since changed.
    Changed,
    /// Translated against the current source value.
    Done,
    /// Deliberately left untranslated.
    Skipped,
}

impl KeyState {
    /// Classifies one key. A skip decision wins over everything else.
    #[must_use]
    pub fn of(source: &SourceKey, record: Option<&TranslationRecord>) -> Self {
        match record {
            Some(record) if record.skipped => Self::Skipped,
            Some(record) if record.is_translated() => {
                if source.current_value() == record.original_value {
                    Self::Done
                } else {
                    Self::Changed
                }
            }
            _ => Self::New,
        }
    }
}

/// Source key identifiers partitioned by [`KeyState`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Classification {
    pub new: Vec<String>,
    pub changed: Vec<String>,
    pub done: Vec<String>,
    pub skipped: Vec<String>,
}

impl Classification {
    /// Appends `key` to the list of `state`.
    fn push(&mut self, state: KeyState, key: String) {
        match state {
            KeyState::New => self.new.push(key),
            KeyState::Changed => self.changed.push(key),
            KeyState::Done => self.done.push(key),
            KeyState::Skipped => self.skipped.push(key),
        }
    }

    /// Keeps only keys containing `query` (case-sensitive). Order is preserved.
    #[must_use]
    pub fn filtered(&self, query: &str) -> Self {
        if query.is_empty() {
            return self.clone();
        }
        let keep = |keys: &[String]| -> Vec<String> {
            keys.iter().filter(|key| key.contains(query)).cloned().collect()
        };
        Self {
            new: keep(&self.new),
            changed: keep(&self.changed),
            done: keep(&self.done),
            skipped: keep(&self.skipped),
        }
    }

    /// Total number of classified keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.new.len() + self.changed.len() + self.done.len() + self.skipped.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Partitions `source_keys` against `records`, keeping only keys containing `query`.
///
/// Keys keep the iteration order of `source_keys` inside each list.
#[must_use]
pub fn classify(
    source_keys: &BTreeMap<String, SourceKey>,
    records: &HashMap<String, TranslationRecord>,
    query: &str,
) -> Classification {
    let mut classification = Classification::default();
    for (key, source) in source_keys {
        if !key.contains(query) {
            continue;
        }
        classification.push(KeyState::of(source, records.get(key)), key.clone());
    }
    classification
}

/// Memoised unfiltered classification of the catalog against one translation set.
#[salsa::tracked]
pub fn classify_translation_set(
    db: &dyn L10nDatabase,
    catalog: SourceCatalog,
    set: TranslationSet,
) -> Classification {
    let classification = classify(catalog.keys(db), set.records(db), "");
    tracing::debug!(
        language = %set.language(db),
        keys = classification.len(),
        "Classified translation set"
    );
    classification
}
