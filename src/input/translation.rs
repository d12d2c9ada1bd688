//! Translation data input definitions.

use std::collections::{
    BTreeMap,
    HashMap,
};

use salsa::Setter;

use crate::db::{
    L10nDatabase,
    L10nDatabaseImpl,
};

/// A translation of one key into one target language.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct TranslationRecord {
    /// Source value the translation was produced against.
    pub original_value: String,
    pub value: String,
    pub skipped: bool,
    /// Unix timestamp in seconds. `None` when never written.
    pub update_time: Option<i64>,
}

impl TranslationRecord {
    /// Whether the record carries a translated value.
    #[must_use]
    pub fn is_translated(&self) -> bool {
        !self.value.is_empty()
    }

    /// Records that hold neither a value nor a skip decision are not saved.
    #[must_use]
    pub fn is_persistable(&self) -> bool {
        self.is_translated() || self.skipped
    }
}

/// Salsa input holding every record of one target language.
#[salsa::input]
pub struct TranslationSet {
    #[returns(ref)]
    pub language: String,

    /// Key to record mapping.
    #[returns(ref)]
    pub records: HashMap<String, TranslationRecord>,
}

impl TranslationSet {
    /// Looks up the record of `key`.
    pub fn record<'db>(
        self,
        db: &'db dyn L10nDatabase,
        key: &str,
    ) -> Option<&'db TranslationRecord> {
        self.records(db).get(key)
    }

    /// Inserts or replaces the record of `key`, bumping the set's revision.
    pub fn upsert(self, db: &mut L10nDatabaseImpl, key: String, record: TranslationRecord) {
        let mut records = self.records(&*db).clone();
        records.insert(key, record);
        self.set_records(db).to(records);
    }
}

/// Translation sets by language.
pub type TranslationSets = BTreeMap<String, TranslationSet>;

/// Returns the set of `language`, creating an empty one on first use.
pub fn translation_set_for(
    db: &L10nDatabaseImpl,
    sets: &mut TranslationSets,
    language: &str,
) -> TranslationSet {
    *sets
        .entry(language.to_string())
        .or_insert_with(|| TranslationSet::new(db, language.to_string(), HashMap::new()))
}
