//! Shared workbench state.

use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::sync::{
    Mutex,
    MutexGuard,
};

use crate::config::WorkbenchSettings;
use crate::db::L10nDatabaseImpl;
use crate::indexer::SourceIndexer;
use crate::input::source::{
    SourceCatalog,
    SourceKey,
};
use crate::input::translation::{
    TranslationSet,
    TranslationSets,
};
use crate::service::ServiceError;
use crate::store::{
    self,
    StoredTranslations,
};

/// State shared between request handlers.
///
/// # Lock order
///
/// When holding more than one lock, always acquire in this order:
/// 1. `files`
/// 2. `db`
/// 3. `translations`
#[derive(Clone)]
pub struct ServerState {
    /// Held while rendering and writing the data file or built files.
    pub files: Arc<Mutex<()>>,
    /// Salsa database
    pub db: Arc<Mutex<L10nDatabaseImpl>>,
    /// Translation sets by language
    pub translations: Arc<Mutex<TranslationSets>>,
    /// Source keys. Never written after loading.
    pub catalog: SourceCatalog,
    pub settings: Arc<WorkbenchSettings>,
}

impl ServerState {
    /// Builds the state from loaded source keys and translation data.
    #[must_use]
    pub fn from_parts(
        settings: WorkbenchSettings,
        source_keys: BTreeMap<String, SourceKey>,
        stored: StoredTranslations,
    ) -> Self {
        let db = L10nDatabaseImpl::default();
        let catalog = SourceCatalog::new(&db, source_keys);
        let translations: TranslationSets = stored
            .into_iter()
            .map(|(language, records)| {
                let set = TranslationSet::new(&db, language.clone(), records);
                (language, set)
            })
            .collect();

        Self {
            files: Arc::new(Mutex::new(())),
            db: Arc::new(Mutex::new(db)),
            translations: Arc::new(Mutex::new(translations)),
            catalog,
            settings: Arc::new(settings),
        }
    }

    /// Indexes the source paths and loads the data file named by `settings`.
    ///
    /// # Errors
    /// Fails when a source file or the data file cannot be loaded.
    pub async fn load(settings: WorkbenchSettings) -> Result<Self, ServiceError> {
        let source_keys = SourceIndexer::new(&settings).index(&settings.source_paths).await?;
        let stored = store::load_data_file(&settings.data_file).await?;
        Ok(Self::from_parts(settings, source_keys, stored))
    }

    /// Acquires the file lock. Take it before `db` and `translations`.
    pub async fn lock_files(&self) -> MutexGuard<'_, ()> {
        self.files.lock().await
    }

    /// Acquires `db` and `translations` in lock order.
    pub async fn lock_db_and_translations(
        &self,
    ) -> (MutexGuard<'_, L10nDatabaseImpl>, MutexGuard<'_, TranslationSets>) {
        let db = self.db.lock().await;
        let translations = self.translations.lock().await;
        (db, translations)
    }

    /// Resolves the requested language. Empty means the default target language.
    #[must_use]
    pub fn target_language<'a>(&'a self, requested: &'a str) -> &'a str {
        if requested.is_empty() { &self.settings.default_target_language } else { requested }
    }

    /// Copies every translation record out of the database.
    #[must_use]
    pub fn snapshot_records(db: &L10nDatabaseImpl, sets: &TranslationSets) -> StoredTranslations {
        sets.iter()
            .map(|(language, set)| (language.clone(), set.records(db).clone()))
            .filter(|(_, records)| !records.is_empty())
            .collect()
    }
}

impl std::fmt::Debug for ServerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerState")
            .field("files", &"<Mutex<()>>")
            .field("db", &"<L10nDatabaseImpl>")
            .field("translations", &"<BTreeMap<String, TranslationSet>>")
            .field("catalog", &"<SourceCatalog>")
            .field("settings", &self.settings)
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;
    use std::fs;

    use googletest::prelude::*;

    use super::*;
    use crate::test_utils::{
        record,
        source_keys,
        test_settings,
    };

    #[googletest::test]
    fn test_from_parts_creates_sets_per_language() {
        let stored = StoredTranslations::from([(
            "german".to_string(),
            HashMap::from([("hello".to_string(), record("Hi", "Hallo", false))]),
        )]);

        let state = ServerState::from_parts(test_settings(), source_keys(&[("hello", "Hi")]), stored);

        expect_that!(Arc::strong_count(&state.db), eq(1));
        let translations = tokio_test::block_on(state.translations.lock());
        expect_that!(translations.len(), eq(1));
        expect_that!(translations.contains_key("german"), eq(true));
    }

    #[googletest::test]
    fn test_target_language() {
        let state = ServerState::from_parts(test_settings(), BTreeMap::new(), BTreeMap::new());

        expect_that!(state.target_language(""), eq("simp_chinese"));
        expect_that!(state.target_language("german"), eq("german"));
    }

    #[tokio::test]
    async fn test_load_reads_sources_and_data_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        fs::write(temp_dir.path().join("mod_l_english.yml"), "l_english:\n hello: \"Hi\"\n").unwrap();
        fs::write(
            temp_dir.path().join("translations.jsonl"),
            r#"{"k":"hello","l":"german","t":10,"v0":"Hi","v1":"Hallo"}"#,
        )
        .unwrap();
        let settings = WorkbenchSettings {
            source_paths: vec![temp_dir.path().to_path_buf()],
            data_file: temp_dir.path().join("translations.jsonl"),
            ..test_settings()
        };

        let state = ServerState::load(settings).await.unwrap();

        let (db, translations) = state.lock_db_and_translations().await;
        assert!(state.catalog.get(&*db, "hello").is_some());
        let german = translations.get("german").copied().unwrap();
        assert_eq!(german.record(&*db, "hello").map(|r| r.value.as_str()), Some("Hallo"));
    }
}
