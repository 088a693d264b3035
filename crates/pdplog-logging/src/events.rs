use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Structured log events for a log conversion run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum LogEvent {
    ConversionStarted {
        input: PathBuf,
        output: PathBuf,
        input_bytes: usize,
    },
    SessionDecoded {
        index: usize,
        channel: String,
        epoch: i64,
        values: usize,
    },
    ConversionCompleted {
        sessions: usize,
        output: Option<PathBuf>,
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
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable format with colors
    #[default]
    Pretty,
    /// JSON lines format for machine consumption
    Json,
    /// Compact single-line format
    Compact,
}

/// Logger for conversion events - handles both console output and file logging
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

        let mut stderr = std::io::stderr();
        let _ = match self.format {
            LogFormat::Json => Self::write_json(&mut stderr, event),
            LogFormat::Pretty => Self::write_pretty(&mut stderr, event),
            LogFormat::Compact => Self::write_compact(&mut stderr, event),
        };
    }

    fn write_json(w: &mut impl Write, event: &LogEvent) -> std::io::Result<()> {
        match serde_json::to_string(event) {
            Ok(json) => writeln!(w, "{}", json),
            Err(_) => Ok(()),
        }
    }

    fn write_pretty(w: &mut impl Write, event: &LogEvent) -> std::io::Result<()> {
        match event {
            LogEvent::ConversionStarted {
                input,
                output,
                input_bytes,
            } => {
                writeln!(
                    w,
                    "{} {} {} {}",
                    "▶".bright_cyan(),
                    input.display().to_string().bold(),
                    "→".dimmed(),
                    output.display()
                )?;
                writeln!(w, "  {}", format!("{} bytes", input_bytes).dimmed())
            }
            LogEvent::SessionDecoded {
                index,
                channel,
                epoch,
                values,
            } => writeln!(
                w,
                "  {} {:>4} {} {} {}",
                "✓".bright_green(),
                index + 1,
                format!("{:<10}", channel).bright_white(),
                format!("epoch={}", epoch).dimmed(),
                Self::plural(*values, "value", "values")
            ),
            LogEvent::ConversionCompleted {
                sessions,
                output,
                duration_secs,
            } => {
                let done = format!(
                    "Converted {} ({:.2}s)",
                    Self::plural(*sessions, "session", "sessions"),
                    duration_secs
                );
                match output {
                    Some(path) => writeln!(
                        w,
                        "{} {} {} {}",
                        "✓".bright_green(),
                        done.bright_green(),
                        "→".dimmed(),
                        path.display()
                    ),
                    None => writeln!(w, "{} {} {}", "✓".bright_green(), done, "(dry run)".dimmed()),
                }
            }
            LogEvent::ErrorEncountered { error } => {
                writeln!(w, "{} {}", "✗".bright_red(), error.bright_red())
            }
        }
    }

    fn write_compact(w: &mut impl Write, event: &LogEvent) -> std::io::Result<()> {
        let timestamp = chrono::Utc::now().format("%H:%M:%S");
        let msg = match event {
            LogEvent::ConversionStarted {
                input, input_bytes, ..
            } => format!(
                "[{}] convert:start {} {}b",
                timestamp,
                input.display(),
                input_bytes
            ),
            LogEvent::SessionDecoded {
                index,
                channel,
                epoch,
                values,
            } => format!(
                "[{}] session:{} {} epoch={} n={}",
                timestamp,
                index + 1,
                channel,
                epoch,
                values
            ),
            LogEvent::ConversionCompleted {
                sessions,
                duration_secs,
                ..
            } => format!(
                "[{}] convert:done {} {:.2}s",
                timestamp, sessions, duration_secs
            ),
            LogEvent::ErrorEncountered { error } => format!("[{}] error:{}", timestamp, error),
        };
        writeln!(w, "{}", msg)
    }

    fn plural(n: usize, one: &str, many: &str) -> String {
        format!("{} {}", n, if n == 1 { one } else { many })
    }
}
