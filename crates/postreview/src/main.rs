mod config;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::{Parser, ValueEnum};

use postreview_core::{ExportRequest, ExportSummary, ReviewExporter, DEFAULT_BATCH_LIMIT};
use postreview_git::{host_locator, verify_refs, ExplicitLocator, GitCli, GitLocator};
use postreview_logging::{init_tracing, LogFormat, Logger};

use crate::config::ProjectConfig;

const USAGE: &str = "Usage: postreview <FROM_COMMIT> <TO_COMMIT> <EXPORT_DIR>";

#[derive(Parser, Debug)]
#[command(
    name = "postreview",
    about = "Export the files changed between two commits as old/ and new/ trees",
    version,
    author
)]
struct Cli {
    /// Commit the old/ tree is taken from
    from: String,

    /// Commit the new/ tree is taken from
    to: String,

    /// Existing directory to write old/ and new/ into
    export_dir: PathBuf,

    /// Repository to run git in (default: current directory)
    #[arg(short = 'C', long)]
    repo: Option<PathBuf>,

    /// Path to the git executable (default: search PATH)
    #[arg(long)]
    git: Option<PathBuf>,

    /// Command length at which an archive batch is closed
    #[arg(long)]
    batch_limit: Option<usize>,

    /// Log output format
    #[arg(long, value_enum)]
    log_format: Option<LogFormatChoice>,

    /// Tracing level (overridden by RUST_LOG)
    #[arg(long)]
    log_level: Option<String>,

    /// Also append JSON log events to this file
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Print the export summary as JSON on stdout
    #[arg(long)]
    json_output: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogFormatChoice {
    Pretty,
    Json,
    Compact,
}

impl From<LogFormatChoice> for LogFormat {
    fn from(choice: LogFormatChoice) -> Self {
        match choice {
            LogFormatChoice::Pretty => LogFormat::Pretty,
            LogFormatChoice::Json => LogFormat::Json,
            LogFormatChoice::Compact => LogFormat::Compact,
        }
    }
}

/// Effective settings after applying CLI flags over config files
#[derive(Debug, PartialEq)]
struct Settings {
    git: Option<PathBuf>,
    batch_limit: usize,
    log_format: LogFormat,
    log_level: String,
    log_file: Option<PathBuf>,
}

impl Settings {
    /// Priority: CLI flag > config file > default
    fn resolve(cli: &Cli, config: ProjectConfig) -> Result<Self> {
        let log_format = match (cli.log_format, config.log_format) {
            (Some(choice), _) => choice.into(),
            (None, Some(name)) => name
                .parse::<LogFormat>()
                .map_err(anyhow::Error::msg)
                .context("Invalid log_format in config")?,
            (None, None) => LogFormat::default(),
        };

        let batch_limit = cli
            .batch_limit
            .or(config.batch_limit)
            .unwrap_or(DEFAULT_BATCH_LIMIT);
        if batch_limit == 0 {
            anyhow::bail!("batch limit must be greater than zero");
        }

        Ok(Self {
            git: cli.git.clone().or(config.git),
            batch_limit,
            log_format,
            log_level: cli
                .log_level
                .clone()
                .or(config.log_level)
                .unwrap_or_else(|| "warn".to_string()),
            log_file: cli.log_file.clone().or(config.log_file),
        })
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            e.exit()
        }
        Err(_) => usage_and_exit(),
    };

    if !cli.export_dir.is_dir() {
        usage_and_exit();
    }

    let current_dir = std::env::current_dir().context("Failed to get current directory")?;
    let repo_dir = absolute(&current_dir, cli.repo.as_deref().unwrap_or(Path::new(".")));
    // git runs inside the repository, so `-o` needs an absolute path
    let export_dir = absolute(&current_dir, &cli.export_dir);

    let config = ProjectConfig::load_layered(&repo_dir)?;
    let settings = Settings::resolve(&cli, config)?;

    init_tracing(&settings.log_level, settings.log_format);

    let logger = match &settings.log_file {
        Some(path) => Logger::with_file(settings.log_format, path)
            .with_context(|| format!("Failed to open log file {}", path.display()))?,
        None => Logger::new(settings.log_format),
    };

    let locator: Box<dyn GitLocator> = match &settings.git {
        Some(path) => Box::new(ExplicitLocator::new(path.clone())),
        None => Box::new(host_locator()),
    };
    let git = GitCli::locate(locator.as_ref(), repo_dir.clone())?;

    if !git.is_available().await {
        anyhow::bail!(
            "Git executable '{}' could not be launched",
            git.binary_path().display()
        );
    }

    verify_refs(&repo_dir, &[cli.from.as_str(), cli.to.as_str()])?;

    let exporter =
        ReviewExporter::new(&git, Arc::new(logger)).with_batch_limit(settings.batch_limit);
    let request = ExportRequest::new(cli.from.clone(), cli.to.clone(), export_dir);
    let summary = exporter.run(&request).await?;

    if cli.json_output {
        print_json(&summary)?;
    }

    Ok(())
}

fn usage_and_exit() -> ! {
    eprintln!("{}", USAGE);
    std::process::exit(1);
}

fn absolute(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

fn print_json(summary: &ExportSummary) -> Result<()> {
    let json = serde_json::to_string_pretty(summary)?;
    println!("{}", json);
    Ok(())
}
