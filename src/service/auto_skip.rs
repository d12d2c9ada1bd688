//! Skipping keys whose source value only references another key.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::service::keys::{
    KeyLists,
    list_keys,
};
use crate::service::translation::{
    TranslationUpdate,
    put_translation,
};
use crate::service::{
    ServerState,
    ServiceError,
};

/// Matches values such as `"$OTHER_KEY$"`.
const ALIAS_PATTERN: &str = r"^ *\$[^$]*\$ *$";

static ALIAS_VALUE: LazyLock<Result<Regex, regex::Error>> = LazyLock::new(|| Regex::new(ALIAS_PATTERN));

/// Key counts per category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct KeyCounts {
    pub new: usize,
    pub changed: usize,
    pub done: usize,
    pub skipped: usize,
}

impl From<&KeyLists> for KeyCounts {
    fn from(lists: &KeyLists) -> Self {
        Self {
            new: lists.new_keys.len(),
            changed: lists.changed_keys.len(),
            done: lists.done_keys.len(),
            skipped: lists.skipped_keys.len(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AutoSkipReport {
    pub before: KeyCounts,
    /// Keys newly marked as skipped.
    pub skipped: usize,
    pub after: KeyCounts,
}

/// Regex matching values that are nothing but a `$key$` reference.
///
/// # Errors
/// Returns [`ServiceError::AliasPattern`] if the pattern does not compile.
pub fn alias_value_regex() -> Result<&'static Regex, ServiceError> {
    ALIAS_VALUE.as_ref().map_err(|error| ServiceError::AliasPattern(error.clone()))
}

/// Marks every new or changed key with an alias source value as skipped.
///
/// # Errors
/// Returns [`ServiceError::Validation`] for an unknown language.
pub async fn auto_skip(state: &ServerState, language: &str) -> Result<AutoSkipReport, ServiceError> {
    let alias = alias_value_regex()?;
    let language = state.target_language(language).to_string();
    let lists = list_keys(state, &language, "").await?;
    let before = KeyCounts::from(&lists);

    let candidates: Vec<String> = {
        let db = state.db.lock().await;
        lists
            .new_keys
            .into_iter()
            .chain(lists.changed_keys)
            .filter(|key| {
                state.catalog.get(&*db, key).is_some_and(|source| alias.is_match(source.current_value()))
            })
            .collect()
    };

    let skipped = candidates.len();
    for key in candidates {
        let update = TranslationUpdate {
            key,
            language: language.clone(),
            value: Some(String::new()),
            skipped: true,
        };
        put_translation(state, update).await?;
    }

    let after = KeyCounts::from(&list_keys(state, &language, "").await?);
    tracing::info!(language, skipped, "Auto skipped alias keys");

    Ok(AutoSkipReport { before, skipped, after })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use googletest::prelude::*;
    use rstest::rstest;

    use super::*;
    use crate::store::StoredTranslations;
    use crate::test_utils::{
        record,
        source_keys,
        test_settings,
    };

    #[rstest]
    #[case::alias("$OTHER_KEY$", true)]
    #[case::padded("  $OTHER_KEY$ ", true)]
    #[case::empty_reference("$$", true)]
    #[case::text_around("See $OTHER_KEY$", false)]
    #[case::two_references("$A$ $B$", false)]
    #[case::plain("Hello", false)]
    #[case::empty("", false)]
    fn test_alias_value_regex(#[case] value: &str, #[case] expected: bool) {
        let alias = alias_value_regex().unwrap();

        assert_that!(alias.is_match(value), eq(expected));
    }

    #[rstest]
    fn test_alias_pattern_compiles() {
        assert!(Regex::new(ALIAS_PATTERN).is_ok());
        assert!(alias_value_regex().is_ok());
    }

    #[rstest]
    fn test_alias_pattern_error_is_not_validation() {
        let error = ServiceError::AliasPattern(Regex::new("(").unwrap_err());

        assert!(!error.is_validation());
        assert!(error.to_string().starts_with("Invalid alias pattern"));
    }

    #[tokio::test]
    async fn test_auto_skip_only_touches_new_and_changed_aliases() {
        let stored = StoredTranslations::from([(
            "german".to_string(),
            [
                ("changed_alias".to_string(), record("$OLD$", "Alt", false)),
                ("done_alias".to_string(), record("$DONE$", "Fertig", false)),
            ]
            .into_iter()
            .collect(),
        )]);
        let state = ServerState::from_parts(
            test_settings(),
            source_keys(&[
                ("changed_alias", "$NEW$"),
                ("done_alias", "$DONE$"),
                ("new_alias", "$OTHER$"),
                ("plain", "Hello"),
            ]),
            stored,
        );

        let report = auto_skip(&state, "german").await.unwrap();

        assert_eq!(report.before, KeyCounts { new: 2, changed: 1, done: 1, skipped: 0 });
        assert_that!(report.skipped, eq(2));
        assert_eq!(report.after, KeyCounts { new: 1, changed: 0, done: 1, skipped: 2 });
        let lists = list_keys(&state, "german", "").await.unwrap();
        assert_that!(lists.skipped_keys, elements_are![eq("changed_alias"), eq("new_alias")]);
    }
}
