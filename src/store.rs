//! Translation data file (JSON Lines).
//!
//! One record per line with keys in sorted order:
//! `{"k": key, "l": language, "s": true, "t": update_time, "v0": original_value, "v1": value}`.
//! `s` is only present for skipped records.

use std::collections::{
    BTreeMap,
    HashMap,
};
use std::io::ErrorKind;
use std::path::{
    Path,
    PathBuf,
};

use serde::{
    Deserialize,
    Deserializer,
    Serialize,
};
use serde_json::Value;
use thiserror::Error;

use crate::input::translation::TranslationRecord;

/// Records by language, then by key.
pub type StoredTranslations = BTreeMap<String, HashMap<String, TranslationRecord>>;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Failed to access data file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Malformed record at line {line}: {source}")]
    Parse {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
    #[error("Failed to serialize record: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Line layout when reading. Every field is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawRecord {
    k: Option<String>,
    l: Option<String>,
    /// `None` only when the field is missing. `null` counts as skipped.
    #[serde(deserialize_with = "present")]
    s: Option<Value>,
    t: Option<Value>,
    v0: Option<String>,
    v1: Option<String>,
}

/// Wraps any present value, `null` included, in `Some`.
fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// Line layout when writing. Field order is the key order on disk.
#[derive(Debug, Serialize)]
struct LineRecord<'a> {
    k: &'a str,
    l: &'a str,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    s: bool,
    t: i64,
    v0: &'a str,
    v1: &'a str,
}

/// Parses the content of a data file.
///
/// Blank lines and records without a language or key are skipped. A later
/// record for the same (language, key) replaces an earlier one.
pub fn parse_data(content: &str) -> Result<StoredTranslations, StoreError> {
    let mut translations = StoredTranslations::new();

    for (index, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let raw: Option<RawRecord> = serde_json::from_str(line)
            .map_err(|source| StoreError::Parse { line: index + 1, source })?;
        let Some(raw) = raw else {
            continue;
        };

        let language = raw.l.as_deref().unwrap_or_default().trim();
        let key = raw.k.as_deref().unwrap_or_default().trim();
        if language.is_empty() || key.is_empty() {
            tracing::warn!(line = index + 1, "Skipping record without language or key");
            continue;
        }

        let record = TranslationRecord {
            original_value: raw.v0.unwrap_or_default(),
            value: raw.v1.unwrap_or_default(),
            skipped: !matches!(raw.s, None | Some(Value::Bool(false))),
            update_time: raw.t.as_ref().and_then(Value::as_i64).filter(|time| *time != 0),
        };
        translations.entry(language.to_string()).or_default().insert(key.to_string(), record);
    }

    Ok(translations)
}

/// Renders records sorted by language then key.
///
/// Records with neither a value nor a skip decision are left out.
pub fn render_data(translations: &StoredTranslations) -> Result<String, StoreError> {
    let mut content = String::new();

    for (language, records) in translations {
        let mut keys: Vec<&String> =
            records.iter().filter(|(_, record)| record.is_persistable()).map(|(key, _)| key).collect();
        keys.sort_unstable();

        for key in keys {
            let Some(record) = records.get(key) else {
                continue;
            };
            let line = LineRecord {
                k: key,
                l: language,
                s: record.skipped,
                t: record.update_time.unwrap_or_default(),
                v0: &record.original_value,
                v1: &record.value,
            };
            content.push_str(&serde_json::to_string(&line)?);
            content.push('\n');
        }
    }

    Ok(content)
}

/// Loads a data file. A missing file is an empty store.
pub async fn load_data_file(path: &Path) -> Result<StoredTranslations, StoreError> {
    match tokio::fs::read_to_string(path).await {
        Ok(content) => {
            let translations = parse_data(&content)?;
            tracing::info!(
                path = %path.display(),
                languages = translations.len(),
                records = translations.values().map(HashMap::len).sum::<usize>(),
                "Loaded translation data"
            );
            Ok(translations)
        }
        Err(error) if error.kind() == ErrorKind::NotFound => {
            tracing::info!(path = %path.display(), "Data file not found, starting empty");
            Ok(StoredTranslations::new())
        }
        Err(error) => Err(error.into()),
    }
}

/// Writes rendered data file content, replacing the previous file at once.
pub async fn write_data_file(path: &Path, content: &str) -> Result<(), StoreError> {
    replace_file(path, content).await?;
    tracing::info!(path = %path.display(), "Saved translation data");
    Ok(())
}

/// Writes `content` to `<path>.tmp` and renames it over `path`.
///
/// Readers see either the old or the new file, never a partial one. Callers
/// must not write the same `path` concurrently.
pub async fn replace_file(path: &Path, content: &str) -> std::io::Result<()> {
    let temp_path = temp_path_for(path);
    tokio::fs::write(&temp_path, content).await?;
    if let Err(error) = tokio::fs::rename(&temp_path, path).await {
        let _ = tokio::fs::remove_file(&temp_path).await;
        return Err(error);
    }
    Ok(())
}

/// `<path>.tmp`, next to `path` so the rename stays on one filesystem.
fn temp_path_for(path: &Path) -> PathBuf {
    let mut temp_path = path.as_os_str().to_owned();
    temp_path.push(".tmp");
    PathBuf::from(temp_path)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use googletest::prelude::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;
    use crate::test_utils::record;

    fn timed(mut record: TranslationRecord, time: i64) -> TranslationRecord {
        record.update_time = Some(time);
        record
    }

    #[rstest]
    fn test_render_data_sorts_and_drops_empty_records() {
        let translations = StoredTranslations::from([
            (
                "simp_chinese".to_string(),
                HashMap::from([("b".to_string(), timed(record("B", "乙", false), 20))]),
            ),
            (
                "german".to_string(),
                HashMap::from([
                    ("z".to_string(), timed(record("Z", "", true), 30)),
                    ("a".to_string(), timed(record("A", "Ah", false), 10)),
                    ("empty".to_string(), record("E", "", false)),
                ]),
            ),
        ]);

        let content = render_data(&translations).unwrap();

        assert_eq!(
            content,
            concat!(
                r#"{"k":"a","l":"german","t":10,"v0":"A","v1":"Ah"}"#,
                "\n",
                r#"{"k":"z","l":"german","s":true,"t":30,"v0":"Z","v1":""}"#,
                "\n",
                r#"{"k":"b","l":"simp_chinese","t":20,"v0":"B","v1":"乙"}"#,
                "\n",
            )
        );
    }

    #[googletest::test]
    fn test_parse_data() {
        let content = concat!(
            r#"{"k":"a","l":"german","t":10,"v0":"A","v1":"Ah"}"#,
            "\n\n",
            r#"{"k":" z ","l":"german","s":true,"t":"yesterday","v0":"Z","v1":""}"#,
            "\n",
            r#"{"k":"","l":"german","v1":"dropped"}"#,
            "\n",
        );

        let translations = parse_data(content).unwrap();

        let german = &translations["german"];
        expect_that!(german.len(), eq(2));
        assert_eq!(german["a"], timed(record("A", "Ah", false), 10));
        assert_eq!(german["z"], record("Z", "", true));
        expect_that!(german["z"].update_time, none());
    }

    #[rstest]
    #[case::missing(r#"{"k":"a","l":"german"}"#, false)]
    #[case::explicit_false(r#"{"k":"a","l":"german","s":false}"#, false)]
    #[case::explicit_true(r#"{"k":"a","l":"german","s":true}"#, true)]
    #[case::null(r#"{"k":"a","l":"german","s":null}"#, true)]
    #[case::number(r#"{"k":"a","l":"german","s":1}"#, true)]
    fn test_parse_data_skip_flag(#[case] line: &str, #[case] expected: bool) {
        let translations = parse_data(line).unwrap();

        assert_eq!(translations["german"]["a"].skipped, expected);
    }

    #[rstest]
    fn test_parse_data_reports_line() {
        let content = "{\"k\":\"a\",\"l\":\"german\"}\n{broken\n";

        let result = parse_data(content);

        assert!(matches!(result, Err(StoreError::Parse { line: 2, .. })));
    }

    #[rstest]
    fn test_saved_content_loads_back() {
        let translations = StoredTranslations::from([(
            "german".to_string(),
            HashMap::from([
                ("a".to_string(), timed(record("A", "Ah", false), 10)),
                ("b".to_string(), timed(record("B", "", true), 11)),
            ]),
        )]);

        let loaded = parse_data(&render_data(&translations).unwrap()).unwrap();

        assert_eq!(loaded, translations);
    }

    #[tokio::test]
    async fn test_load_missing_data_file_is_empty() {
        let temp_dir = tempfile::tempdir().unwrap();

        let loaded = load_data_file(&temp_dir.path().join("missing.jsonl")).await.unwrap();

        assert!(loaded.is_empty());
    }

    #[tokio::test]
    async fn test_write_then_load_data_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("translations.jsonl");
        let content = r#"{"k":"a","l":"german","t":10,"v0":"A","v1":"Ah"}"#;

        write_data_file(&path, content).await.unwrap();
        let loaded = load_data_file(&path).await.unwrap();

        assert_eq!(loaded["german"]["a"].value, "Ah");
    }

    #[tokio::test]
    async fn test_replace_file_overwrites_without_leftovers() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("translations.jsonl");
        std::fs::write(&path, "a much longer previous content\n").unwrap();

        replace_file(&path, "short\n").await.unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "short\n");
        assert!(!temp_path_for(&path).exists());
    }
}
