use std::net::SocketAddr;
use std::path::{
    Path,
    PathBuf,
};

use serde::{
    Deserialize,
    Serialize,
};
use thiserror::Error;

use crate::types::PARADOX_LANGUAGES;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Configuration error in '{field_path}': {message}")]
pub struct ValidationError {
    /// JSON path to the field (e.g., "sourcePaths[0]")
    pub field_path: String,
    pub message: String,
}

impl ValidationError {
    #[must_use]
    pub fn new(field_path: impl Into<String>, message: impl Into<String>) -> Self {
        Self { field_path: field_path.into(), message: message.into() }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration validation failed:\n{}", format_validation_errors(.0))]
    ValidationErrors(Vec<ValidationError>),

    #[error("Failed to load configuration file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] serde_json::Error),
}

fn format_validation_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .enumerate()
        .map(|(i, err)| format!("  {}. {} - {}", i + 1, err.field_path, err.message))
        .collect::<Vec<_>>()
        .join("\n")
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WorkbenchSettings {
    /// Name used in built file names (`<name>_l_<language>.yml`).
    pub name: String,

    /// Source localisation files or directories. Load files of one language only.
    pub source_paths: Vec<PathBuf>,

    /// Only keep source values of this language.
    ///
    /// - `None`: values of every language found are kept, the first loaded one
    ///   being the reference value
    pub source_language: Option<String>,

    /// JSON Lines file storing translation records.
    pub data_file: PathBuf,

    /// Build output directory, usually the `localisation` directory of the mod.
    pub output_path: Option<PathBuf>,

    /// Used when a request does not name a target language.
    pub default_target_language: String,

    /// Language names accepted in file headers and requests.
    pub languages: Vec<String>,

    /// Write source values for keys without a translation when building.
    pub build_untranslated_keys: bool,

    pub server: ServerConfig,
    pub indexing: IndexingConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerConfig {
    /// Address the HTTP server binds to (host:port).
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { bind: "0.0.0.0:8080".to_string() }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct IndexingConfig {
    /// Number of source files read concurrently.
    /// Default: 80% of CPU cores (minimum 1).
    pub num_threads: Option<usize>,
}

impl IndexingConfig {
    #[must_use]
    pub fn thread_count(&self) -> usize {
        self.num_threads.unwrap_or_else(|| (num_cpus::get() * 4 / 5).max(1))
    }
}

/// Values given on the command line. `Some` wins over the config file.
#[derive(Debug, Clone, Default)]
pub struct SettingsOverrides {
    pub name: Option<String>,
    pub source_paths: Vec<PathBuf>,
    pub source_language: Option<String>,
    pub data_file: Option<PathBuf>,
    pub output_path: Option<PathBuf>,
    pub default_target_language: Option<String>,
    pub build_untranslated_keys: Option<bool>,
    pub bind: Option<String>,
}

impl SettingsOverrides {
    /// Applies the overrides on top of `settings`.
    #[must_use]
    pub fn apply(&self, mut settings: WorkbenchSettings) -> WorkbenchSettings {
        if let Some(name) = &self.name {
            settings.name.clone_from(name);
        }
        if !self.source_paths.is_empty() {
            settings.source_paths.clone_from(&self.source_paths);
        }
        if self.source_language.is_some() {
            settings.source_language.clone_from(&self.source_language);
        }
        if let Some(data_file) = &self.data_file {
            settings.data_file.clone_from(data_file);
        }
        if self.output_path.is_some() {
            settings.output_path.clone_from(&self.output_path);
        }
        if let Some(language) = &self.default_target_language {
            settings.default_target_language.clone_from(language);
        }
        if let Some(build_untranslated_keys) = self.build_untranslated_keys {
            settings.build_untranslated_keys = build_untranslated_keys;
        }
        if let Some(bind) = &self.bind {
            settings.server.bind.clone_from(bind);
        }
        settings
    }
}

impl WorkbenchSettings {
    /// Whether `language` is one of the configured languages.
    #[must_use]
    pub fn is_known_language(&self, language: &str) -> bool {
        self.languages.iter().any(|known| known == language)
    }

    /// Makes relative paths absolute against `root`.
    pub fn resolve_paths(&mut self, root: &Path) {
        for path in &mut self.source_paths {
            if path.is_relative() {
                *path = root.join(&*path);
            }
        }
        if self.data_file.is_relative() {
            self.data_file = root.join(&self.data_file);
        }
        if let Some(output_path) = &mut self.output_path
            && output_path.is_relative()
        {
            *output_path = root.join(&*output_path);
        }
    }

    /// # Errors
    /// - Required field is empty
    /// - Unknown language
    /// - Invalid bind address
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if self.source_paths.is_empty() {
            errors.push(ValidationError::new(
                "sourcePaths",
                "At least one source path is required. Example: [\"localisation/english\"]",
            ));
        }

        for (index, path) in self.source_paths.iter().enumerate() {
            if path.as_os_str().is_empty() {
                errors.push(ValidationError::new(
                    format!("sourcePaths[{index}]"),
                    "The path cannot be empty",
                ));
            }
        }

        if self.data_file.as_os_str().is_empty() {
            errors.push(ValidationError::new(
                "dataFile",
                "The path cannot be empty. Example: \"translations.jsonl\"",
            ));
        }

        if self.languages.is_empty() {
            errors.push(ValidationError::new(
                "languages",
                "At least one language is required. Example: [\"english\", \"simp_chinese\"]",
            ));
        }

        for (index, language) in self.languages.iter().enumerate() {
            if language.is_empty() {
                errors.push(ValidationError::new(
                    format!("languages[{index}]"),
                    "The language name cannot be empty",
                ));
            }
        }

        if !self.is_known_language(&self.default_target_language) {
            errors.push(ValidationError::new(
                "defaultTargetLanguage",
                format!("Unknown language '{}'", self.default_target_language),
            ));
        }

        if let Some(language) = &self.source_language
            && !self.is_known_language(language)
        {
            errors.push(ValidationError::new(
                "sourceLanguage",
                format!("Unknown language '{language}'"),
            ));
        }

        if let Err(e) = self.server.bind.parse::<SocketAddr>() {
            errors.push(ValidationError::new(
                "server.bind",
                format!("Invalid address '{}': {e}", self.server.bind),
            ));
        }

        if self.indexing.num_threads == Some(0) {
            errors.push(ValidationError::new(
                "indexing.numThreads",
                "The thread count must be at least 1, or removed to use the default",
            ));
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

impl Default for WorkbenchSettings {
    fn default() -> Self {
        Self {
            name: String::new(),
            source_paths: Vec::new(),
            source_language: None,
            data_file: PathBuf::from("translations.jsonl"),
            output_path: None,
            default_target_language: "simp_chinese".to_string(),
            languages: PARADOX_LANGUAGES.iter().map(ToString::to_string).collect(),
            build_untranslated_keys: false,
            server: ServerConfig::default(),
            indexing: IndexingConfig::default(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing, clippy::expect_used, clippy::panic)]
mod tests {
    use googletest::prelude::*;
    use rstest::*;

    use super::*;

    fn valid_settings() -> WorkbenchSettings {
        WorkbenchSettings {
            source_paths: vec![PathBuf::from("localisation/english")],
            ..WorkbenchSettings::default()
        }
    }

    #[rstest]
    fn validate_valid_settings() {
        let settings = valid_settings();

        assert_that!(settings.validate(), ok(anything()));
    }

    #[rstest]
    fn deserialize_partial_settings() {
        let json = r#"{"sourceLanguage": "english", "server": {"bind": "127.0.0.1:9000"}}"#;

        let settings: WorkbenchSettings = serde_json::from_str(json).unwrap();

        assert_that!(settings.source_language, some(eq("english")));
        assert_that!(settings.server.bind, eq("127.0.0.1:9000"));
        assert_that!(settings.default_target_language, eq("simp_chinese"));
        assert_that!(settings.languages, len(eq(10)));
    }

    #[rstest]
    fn deserialize_empty_settings() {
        let settings: WorkbenchSettings = serde_json::from_str("{}").unwrap();

        assert_that!(settings.name, eq(""));
        assert_that!(settings.source_paths, len(eq(0)));
        assert_eq!(settings.data_file, PathBuf::from("translations.jsonl"));
        assert_that!(settings.build_untranslated_keys, eq(false));
        assert_that!(settings.server.bind, eq("0.0.0.0:8080"));
    }

    #[rstest]
    fn validate_source_paths_empty() {
        let settings = WorkbenchSettings::default();

        assert_that!(
            settings.validate(),
            err(elements_are![all![
                field!(ValidationError.field_path, eq("sourcePaths")),
                field!(ValidationError.message, contains_substring("At least one source path"))
            ]])
        );
    }

    #[rstest]
    fn validate_unknown_default_target_language() {
        let settings = WorkbenchSettings {
            default_target_language: "klingon".to_string(),
            ..valid_settings()
        };

        assert_that!(
            settings.validate(),
            err(elements_are![all![
                field!(ValidationError.field_path, eq("defaultTargetLanguage")),
                field!(ValidationError.message, contains_substring("klingon"))
            ]])
        );
    }

    #[rstest]
    fn validate_unknown_source_language() {
        let settings =
            WorkbenchSettings { source_language: Some("elvish".to_string()), ..valid_settings() };

        assert_that!(
            settings.validate(),
            err(elements_are![field!(ValidationError.field_path, eq("sourceLanguage"))])
        );
    }

    #[rstest]
    #[case::missing_port("127.0.0.1")]
    #[case::not_an_address("localhost:port")]
    fn validate_invalid_bind(#[case] bind: &str) {
        let settings = WorkbenchSettings {
            server: ServerConfig { bind: bind.to_string() },
            ..valid_settings()
        };

        assert_that!(
            settings.validate(),
            err(elements_are![all![
                field!(ValidationError.field_path, eq("server.bind")),
                field!(ValidationError.message, contains_substring("Invalid address"))
            ]])
        );
    }

    #[rstest]
    fn validate_zero_threads() {
        let settings = WorkbenchSettings {
            indexing: IndexingConfig { num_threads: Some(0) },
            ..valid_settings()
        };

        assert_that!(
            settings.validate(),
            err(elements_are![field!(ValidationError.field_path, eq("indexing.numThreads"))])
        );
    }

    #[rstest]
    fn thread_count_is_at_least_one() {
        assert_that!(IndexingConfig::default().thread_count(), ge(1));
        assert_that!(IndexingConfig { num_threads: Some(3) }.thread_count(), eq(3));
    }

    #[rstest]
    fn overrides_win_over_file_values() {
        let overrides = SettingsOverrides {
            name: Some("my_mod".to_string()),
            source_paths: vec![PathBuf::from("cli/english")],
            build_untranslated_keys: Some(true),
            bind: Some("127.0.0.1:3000".to_string()),
            ..SettingsOverrides::default()
        };

        let settings = overrides.apply(valid_settings());

        assert_that!(settings.name, eq("my_mod"));
        assert_eq!(settings.source_paths, vec![PathBuf::from("cli/english")]);
        assert_that!(settings.build_untranslated_keys, eq(true));
        assert_that!(settings.server.bind, eq("127.0.0.1:3000"));
        assert_that!(settings.default_target_language, eq("simp_chinese"));
    }

    #[rstest]
    fn resolve_paths_joins_relative_paths_only() {
        let mut settings = WorkbenchSettings {
            source_paths: vec![PathBuf::from("loc"), PathBuf::from("/abs/loc")],
            output_path: Some(PathBuf::from("out")),
            ..WorkbenchSettings::default()
        };

        settings.resolve_paths(Path::new("/work"));

        assert_eq!(
            settings.source_paths,
            vec![PathBuf::from("/work/loc"), PathBuf::from("/abs/loc")]
        );
        assert_eq!(settings.data_file, PathBuf::from("/work/translations.jsonl"));
        assert_eq!(settings.output_path, Some(PathBuf::from("/work/out")));
    }

    #[rstest]
    fn config_error_validation_errors_format() {
        let settings = WorkbenchSettings {
            default_target_language: "klingon".to_string(),
            ..WorkbenchSettings::default()
        };

        let errors = settings.validate().unwrap_err();
        let config_error = ConfigError::ValidationErrors(errors);

        let error_message = format!("{config_error}");
        assert_that!(error_message, contains_substring("Configuration validation failed"));
        assert_that!(error_message, contains_substring("1. sourcePaths"));
        assert_that!(error_message, contains_substring("2. defaultTargetLanguage"));
    }
}
