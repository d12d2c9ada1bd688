//! Entry point of the localisation workbench.

use std::net::{
    AddrParseError,
    SocketAddr,
};
use std::path::{
    Path,
    PathBuf,
};
use std::process::ExitCode;

use clap::{
    Args,
    Parser,
    Subcommand,
};
use l10n_workbench::config::{
    ConfigError,
    ConfigManager,
    SettingsOverrides,
};
use l10n_workbench::server;
use l10n_workbench::service::{
    ServerState,
    ServiceError,
    auto_skip,
    build,
};
use thiserror::Error;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "l10n-workbench", version, about = "Paradox mod localisation workbench")]
struct Cli {
    /// Directory holding `.l10n-workbench.json`. Relative paths resolve against it.
    #[arg(long, global = true, default_value = ".")]
    workspace: PathBuf,

    /// Write logs to this file instead of stderr.
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Serve the translation API
    Serve {
        #[command(flatten)]
        source: SourceArgs,
        #[command(flatten)]
        build: BuildArgs,
        /// Language used when a request names none.
        #[arg(long)]
        target_language: Option<String>,
        /// Address to bind the HTTP server to (host:port).
        #[arg(long)]
        bind: Option<String>,
    },
    /// Build mod localisation files from the data file
    Build {
        #[command(flatten)]
        source: SourceArgs,
        #[command(flatten)]
        build: BuildArgs,
    },
    /// Skip alias keys (values that only reference another key)
    AutoSkip {
        #[command(flatten)]
        source: SourceArgs,
        /// Target language, the configured default when omitted.
        #[arg(long)]
        target_language: Option<String>,
    },
}

#[derive(Debug, Args)]
struct SourceArgs {
    /// Source file or directory, usually the `localisation` directory of a mod. Repeatable.
    #[arg(long = "source-path")]
    source_paths: Vec<PathBuf>,
    /// Only keep values of this language.
    #[arg(long)]
    source_language: Option<String>,
    /// JSON Lines file storing translation data.
    #[arg(long)]
    data_file: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct BuildArgs {
    /// Name used in built file names.
    #[arg(long)]
    name: Option<String>,
    /// Build output directory, usually the `localisation` directory of the mod.
    #[arg(long)]
    output_path: Option<PathBuf>,
    /// Write source values for keys without a translation.
    #[arg(long)]
    build_untranslated_keys: bool,
}

#[derive(Error, Debug)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Service(#[from] ServiceError),
    #[error("Invalid bind address: {0}")]
    Bind(#[from] AddrParseError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Command {
    /// Flags that take precedence over the config file.
    fn overrides(&self) -> SettingsOverrides {
        let (source, build, target_language, bind) = match self {
            Self::Serve { source, build, target_language, bind } => {
                (source, Some(build), target_language.clone(), bind.clone())
            }
            Self::Build { source, build } => (source, Some(build), None, None),
            Self::AutoSkip { source, target_language } => {
                (source, None, target_language.clone(), None)
            }
        };

        SettingsOverrides {
            name: build.and_then(|build| build.name.clone()),
            source_paths: source.source_paths.clone(),
            source_language: source.source_language.clone(),
            data_file: source.data_file.clone(),
            output_path: build.and_then(|build| build.output_path.clone()),
            default_target_language: target_language,
            build_untranslated_keys: build
                .filter(|build| build.build_untranslated_keys)
                .map(|_| true),
            bind,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let _guard = init_tracing(cli.log_file.as_deref());

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            tracing::error!("{error}");
            ExitCode::FAILURE
        }
    }
}

/// Installs the subscriber. The returned guard flushes the log file on drop.
fn init_tracing(log_file: Option<&Path>) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    let Some(log_file) = log_file else {
        builder.with_writer(std::io::stderr).init();
        return None;
    };

    let directory = log_file.parent().unwrap_or_else(|| Path::new("."));
    let file_name = log_file.file_name().unwrap_or(log_file.as_os_str());
    let (writer, guard) =
        tracing_appender::non_blocking(tracing_appender::rolling::never(directory, file_name));
    builder.with_writer(writer).with_ansi(false).init();
    Some(guard)
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let workspace_root = std::path::absolute(&cli.workspace)?;
    let mut config_manager = ConfigManager::new();
    config_manager.load_settings(Some(workspace_root), &cli.command.overrides())?;
    let settings = config_manager.get_settings().clone();

    match cli.command {
        Command::Serve { .. } => {
            let addr: SocketAddr = settings.server.bind.parse()?;
            let state = ServerState::load(settings).await?;
            server::serve(state, addr).await?;
        }
        Command::Build { .. } => {
            let state = ServerState::load(settings).await?;
            let summary = build::build(&state).await?;
            tracing::info!(files = summary.files.len(), "Build finished");
        }
        Command::AutoSkip { .. } => {
            let state = ServerState::load(settings).await?;
            let language = state.target_language("").to_string();
            let report = auto_skip::auto_skip(&state, &language).await?;
            tracing::info!(
                new = report.before.new,
                changed = report.before.changed,
                done = report.before.done,
                skipped = report.before.skipped,
                "Before generating skip keys"
            );
            tracing::info!(count = report.skipped, "Found new skipped keys");
            build::save(&state).await?;
            tracing::info!(
                new = report.after.new,
                changed = report.after.changed,
                done = report.after.done,
                skipped = report.after.skipped,
                "After generating skip keys"
            );
        }
    }

    Ok(())
}
