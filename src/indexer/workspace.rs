//! Source localisation discovery and loading.

use std::collections::BTreeMap;
use std::path::{
    Path,
    PathBuf,
};

use futures::{
    StreamExt,
    TryStreamExt,
};
use globset::{
    Glob,
    GlobSet,
    GlobSetBuilder,
};
use ignore::WalkBuilder;

use crate::config::WorkbenchSettings;
use crate::indexer::types::IndexerError;
use crate::input::source::{
    LocalisationFile,
    SourceKey,
    merge_localisation_files,
    parse_localisation_file,
};

/// Loads source keys from files and directories.
#[derive(Clone, Debug)]
pub struct SourceIndexer {
    /// Languages accepted in file names and headers.
    languages: Vec<String>,
    /// Only files of this language are merged when set.
    source_language: Option<String>,
    /// Maximum number of files read at once.
    num_threads: usize,
}

impl SourceIndexer {
    /// Creates an indexer for the given settings.
    #[must_use]
    pub fn new(settings: &WorkbenchSettings) -> Self {
        Self {
            languages: settings.languages.clone(),
            source_language: settings.source_language.clone(),
            num_threads: settings.indexing.thread_count(),
        }
    }

    /// Loads every localisation file under `source_paths` into catalog keys.
    ///
    /// # Errors
    /// Fails on missing paths, unreadable files and malformed headers.
    pub async fn index(
        &self,
        source_paths: &[PathBuf],
    ) -> Result<BTreeMap<String, SourceKey>, IndexerError> {
        let files = self.find_source_files(source_paths)?;
        tracing::debug!(files = files.len(), threads = self.num_threads, "Indexing source files");

        let parsed: Vec<LocalisationFile> = futures::stream::iter(files)
            .map(|path| self.load_file(path))
            .buffered(self.num_threads.max(1))
            .try_collect()
            .await?;

        let keys = merge_localisation_files(parsed, self.source_language.as_deref());
        tracing::info!(keys = keys.len(), "Loaded source localisation");
        Ok(keys)
    }

    /// Reads and parses a single file.
    async fn load_file(&self, path: PathBuf) -> Result<LocalisationFile, IndexerError> {
        let content = tokio::fs::read_to_string(&path).await.map_err(|source| IndexerError::Io {
            path: path.display().to_string(),
            source,
        })?;

        parse_localisation_file(&content, &self.languages)
            .map_err(|source| IndexerError::Source { path: path.display().to_string(), source })
    }

    /// Collects localisation files in sorted path order.
    ///
    /// Files given directly are always taken. Directories are walked and
    /// filtered by the `*_l_<language>.yml` name pattern.
    fn find_source_files(&self, source_paths: &[PathBuf]) -> Result<Vec<PathBuf>, IndexerError> {
        let file_names = self.file_name_set()?;
        let mut found_files = Vec::new();

        for source_path in source_paths {
            if source_path.is_file() {
                found_files.push(source_path.clone());
            } else if source_path.is_dir() {
                found_files.extend(Self::walk_directory(source_path, &file_names));
            } else {
                return Err(IndexerError::InvalidPath(source_path.display().to_string()));
            }
        }

        found_files.sort();
        found_files.dedup();
        Ok(found_files)
    }

    /// Builds the file name matcher for the configured languages.
    fn file_name_set(&self) -> Result<GlobSet, IndexerError> {
        let pattern = format!("*_l_{{{}}}.yml", self.languages.join(","));
        let glob = Glob::new(&pattern)
            .map_err(|e| IndexerError::Error(format!("Invalid file pattern '{pattern}': {e}")))?;

        let mut builder = GlobSetBuilder::new();
        builder.add(glob);
        builder
            .build()
            .map_err(|e| IndexerError::Error(format!("Failed to build file pattern: {e}")))
    }

    /// Walks `directory` and returns matching files.
    fn walk_directory(directory: &Path, file_names: &GlobSet) -> Vec<PathBuf> {
        let mut found_files = Vec::new();

        for result in WalkBuilder::new(directory)
            .hidden(false)
            .git_ignore(false)
            .git_global(false)
            .git_exclude(false)
            .follow_links(false)
            .build()
        {
            let entry = match result {
                Ok(entry) => entry,
                Err(err) => {
                    tracing::debug!(?err, "Failed to read directory entry");
                    continue;
                }
            };

            if !entry.file_type().is_some_and(|ft| ft.is_file()) {
                continue;
            }

            if file_names.is_match(entry.file_name()) {
                found_files.push(entry.path().to_path_buf());
            }
        }

        found_files
    }
}
