use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Structured log events for one export run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum LogEvent {
    ExportStarted {
        from: String,
        to: String,
        export_dir: PathBuf,
    },
    FilesClassified {
        old_files: usize,
        new_files: usize,
    },
    BatchExtracted {
        side: String,
        batch: usize,
        files: usize,
    },
    SideCompleted {
        side: String,
        files: usize,
        batches: usize,
    },
    ExportCompleted {
        old_files: usize,
        new_files: usize,
        batches: usize,
        duration_secs: f64,
    },
    ErrorEncountered {
        error: String,
    },
}

impl LogEvent {
    /// Add a timestamp to serialize with the event
    fn with_timestamp(&self) -> serde_json::Value {
        let mut value = serde_json::to_value(self).unwrap_or_default();
        if let Some(obj) = value.as_object_mut() {
            obj.insert(
                "timestamp".to_string(),
                serde_json::Value::String(chrono::Utc::now().to_rfc3339()),
            );
        }
        value
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable format with colors
    #[default]
    Pretty,
    /// JSON lines format for machine consumption
    Json,
    /// Compact single-line format
    Compact,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            "compact" => Ok(LogFormat::Compact),
            _ => Err(format!("Unknown log format: {}", s)),
        }
    }
}

/// Logger for export events - handles both console output and file logging
pub struct Logger {
    format: LogFormat,
    file_writer: Option<Mutex<File>>,
}

impl Logger {
    pub fn new(format: LogFormat) -> Self {
        Self {
            format,
            file_writer: None,
        }
    }

    /// Create a logger with file output in addition to console
    pub fn with_file(format: LogFormat, log_path: &Path) -> std::io::Result<Self> {
        if let Some(parent) = log_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_path)?;

        Ok(Self {
            format,
            file_writer: Some(Mutex::new(file)),
        })
    }

    pub fn log(&self, event: &LogEvent) {
        // File output is always JSON
        if let Some(ref writer) = self.file_writer {
            if let Ok(mut file) = writer.lock() {
                let json = event.with_timestamp();
                let _ = writeln!(file, "{}", json);
            }
        }

        match self.format {
            LogFormat::Json => self.log_json(event),
            LogFormat::Pretty => self.log_pretty(event),
            LogFormat::Compact => self.log_compact(event),
        }
    }

    fn log_json(&self, event: &LogEvent) {
        if let Ok(json) = serde_json::to_string(event) {
            let _ = writeln!(std::io::stderr(), "{}", json);
        }
    }

    fn log_pretty(&self, event: &LogEvent) {
        let mut stderr = std::io::stderr();
        match event {
            LogEvent::ExportStarted {
                from,
                to,
                export_dir,
            } => {
                let _ = writeln!(
                    stderr,
                    "{} {} {} {}",
                    "▶".bright_cyan(),
                    "postreview".bold().bright_white(),
                    format!("{}..{}", short_ref(from), short_ref(to)).bright_blue(),
                    format!("→ {}", export_dir.display()).dimmed()
                );
            }
            LogEvent::FilesClassified {
                old_files,
                new_files,
            } => {
                let _ = writeln!(
                    stderr,
                    "  {} {} {} {}",
                    "Changed:".dimmed(),
                    format!("{} old", old_files).red(),
                    "/".dimmed(),
                    format!("{} new", new_files).green()
                );
            }
            LogEvent::BatchExtracted { side, batch, files } => {
                let _ = writeln!(
                    stderr,
                    "    {} {} batch {} ({} {})",
                    "│".dimmed(),
                    side,
                    batch + 1,
                    files,
                    if *files == 1 { "file" } else { "files" }
                );
            }
            LogEvent::SideCompleted {
                side,
                files,
                batches,
            } => {
                let _ = writeln!(
                    stderr,
                    "  {} {}/ {} {} in {} {}",
                    "✓".bright_green(),
                    side.bold(),
                    files,
                    if *files == 1 { "file" } else { "files" },
                    batches,
                    if *batches == 1 { "batch" } else { "batches" }
                );
            }
            LogEvent::ExportCompleted { duration_secs, .. } => {
                let _ = writeln!(
                    stderr,
                    "{} Done ({:.1}s)",
                    "✓".bright_green(),
                    duration_secs
                );
            }
            LogEvent::ErrorEncountered { error } => {
                let _ = writeln!(stderr, "{} {}", "✗".bright_red(), error.bright_red());
            }
        }
    }

    fn log_compact(&self, event: &LogEvent) {
        let mut stderr = std::io::stderr();
        let timestamp = chrono::Utc::now().format("%H:%M:%S");
        let msg = match event {
            LogEvent::ExportStarted { from, to, .. } => {
                format!("[{}] export:start {}..{}", timestamp, from, to)
            }
            LogEvent::FilesClassified {
                old_files,
                new_files,
            } => format!(
                "[{}] classify old={} new={}",
                timestamp, old_files, new_files
            ),
            LogEvent::BatchExtracted { side, batch, files } => {
                format!("[{}] {}:batch:{} {}f", timestamp, side, batch + 1, files)
            }
            LogEvent::SideCompleted {
                side,
                files,
                batches,
            } => format!("[{}] {}:done {}f {}b", timestamp, side, files, batches),
            LogEvent::ExportCompleted {
                batches,
                duration_secs,
                ..
            } => format!(
                "[{}] export:done {}b {:.1}s",
                timestamp, batches, duration_secs
            ),
            LogEvent::ErrorEncountered { error } => format!("[{}] error:{}", timestamp, error),
        };
        let _ = writeln!(stderr, "{}", msg);
    }
}

/// Abbreviate full object ids for display
fn short_ref(reference: &str) -> &str {
    let is_oid = reference.len() == 40 && reference.chars().all(|c| c.is_ascii_hexdigit());
    if is_oid {
        &reference[..8]
    } else {
        reference
    }
}
