//! Saving translation data and building mod localisation files.

use std::collections::{
    BTreeMap,
    HashMap,
};
use std::fmt::Write as _;
use std::path::{
    Path,
    PathBuf,
};

use serde::Serialize;

use crate::config::WorkbenchSettings;
use crate::input::source::SourceKey;
use crate::input::translation::TranslationRecord;
use crate::service::{
    ServerState,
    ServiceError,
};
use crate::store;
use crate::types::{
    file_header,
    file_suffix,
};

/// Result of a save.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SaveSummary {
    pub languages: usize,
    pub records: usize,
}

/// Result of a build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildSummary {
    /// Written localisation files.
    pub files: Vec<PathBuf>,
}

/// Writes the translation data file.
///
/// # Errors
/// Fails when the data file cannot be written.
pub async fn save(state: &ServerState) -> Result<SaveSummary, ServiceError> {
    let _files = state.lock_files().await;
    save_locked(state).await
}

/// Writes `<output>/replace/<language>/<name>_l_<language>.yml` for every
/// language with translation data.
///
/// # Errors
/// Fails without a name or output path, or when a file cannot be written.
pub async fn build(state: &ServerState) -> Result<BuildSummary, ServiceError> {
    let output_path = build_output_path(&state.settings)?;
    let _files = state.lock_files().await;
    build_locked(state, output_path).await
}

/// Saves, then builds, without another save or build in between.
///
/// # Errors
/// Fails when either step fails. A failed build leaves the saved data file in place.
pub async fn save_and_build(state: &ServerState) -> Result<BuildSummary, ServiceError> {
    let output_path = build_output_path(&state.settings)?;
    let _files = state.lock_files().await;
    save_locked(state).await?;
    build_locked(state, output_path).await
}

fn build_output_path(settings: &WorkbenchSettings) -> Result<&Path, ServiceError> {
    if settings.name.is_empty() {
        return Err(ServiceError::validation("name is required to build"));
    }
    settings.output_path.as_deref().ok_or_else(|| ServiceError::validation("outputPath is required to build"))
}

/// Caller holds the file lock.
async fn save_locked(state: &ServerState) -> Result<SaveSummary, ServiceError> {
    let (content, summary) = {
        let (db, translations) = state.lock_db_and_translations().await;
        let stored = ServerState::snapshot_records(&db, &translations);
        let summary = SaveSummary {
            languages: stored.len(),
            records: stored
                .values()
                .map(|records| records.values().filter(|record| record.is_persistable()).count())
                .sum(),
        };
        (store::render_data(&stored)?, summary)
    };

    store::write_data_file(&state.settings.data_file, &content).await?;
    Ok(summary)
}

/// Caller holds the file lock.
async fn build_locked(state: &ServerState, output_path: &Path) -> Result<BuildSummary, ServiceError> {
    let settings = &state.settings;
    let outputs: Vec<(PathBuf, String)> = {
        let (db, translations) = state.lock_db_and_translations().await;
        let source_keys = state.catalog.keys(&*db);
        ServerState::snapshot_records(&db, &translations)
            .iter()
            .map(|(language, records)| {
                let path = output_file_path(output_path, &settings.name, language);
                let content = render_localisation_file(
                    language,
                    source_keys,
                    records,
                    settings.build_untranslated_keys,
                );
                (path, content)
            })
            .collect()
    };

    let mut files = Vec::with_capacity(outputs.len());
    for (path, content) in outputs {
        write_output(&path, &content).await?;
        tracing::info!(path = %path.display(), "Built localisation file");
        files.push(path);
    }

    Ok(BuildSummary { files })
}

/// Path of the built file for `language`.
#[must_use]
pub fn output_file_path(output_path: &Path, name: &str, language: &str) -> PathBuf {
    output_path.join("replace").join(language).join(format!("{name}{}", file_suffix(language)))
}

/// Renders one localisation file, BOM included.
///
/// Keys follow catalog order. A translated, non-skipped record contributes its
/// value. Otherwise, with `build_untranslated_keys`, the source value in
/// `language` is written, falling back to the first loaded value.
#[must_use]
pub fn render_localisation_file(
    language: &str,
    source_keys: &BTreeMap<String, SourceKey>,
    records: &HashMap<String, TranslationRecord>,
    build_untranslated_keys: bool,
) -> String {
    let mut content = String::from('\u{feff}');
    content.push_str(&file_header(language));
    content.push('\n');

    for (key, source) in source_keys {
        let value = match records.get(key) {
            Some(record) if !record.skipped && record.is_translated() => Some(record.value.as_str()),
            _ if build_untranslated_keys && !source.values.is_empty() => {
                Some(source.value_in(language).unwrap_or_else(|| source.current_value()))
            }
            _ => None,
        };
        if let Some(value) = value {
            let _ = writeln!(content, " {key}: \"{}\"", escape_value(value));
        }
    }

    content
}

/// Escapes a value for a double-quoted scalar.
fn escape_value(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\t' => escaped.push_str("\\t"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Creates parent directories and writes `content`.
async fn write_output(path: &Path, content: &str) -> Result<(), ServiceError> {
    let to_error = |source| ServiceError::Build { path: path.display().to_string(), source };
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await.map_err(to_error)?;
    }
    store::replace_file(path, content).await.map_err(to_error)
}
