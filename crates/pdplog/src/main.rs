use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing::{debug, info};

use pdplog_logging::{init_tracing, LogEvent, LogFormat, Logger};
use pdplog_sessions::{convert_with, write_json_file, ConvertError, Session};

mod config;

use config::Config;

const USAGE: &str = "Usage: pdplog [INFILE] [[OUTFILE]]";

#[derive(Parser, Debug)]
#[command(
    name = "pdplog",
    about = "Convert PDP armband session logs to JSON",
    version
)]
struct Cli {
    /// Log file to convert
    input: Option<PathBuf>,

    /// Output file (default: data.json)
    output: Option<PathBuf>,

    /// Log output format
    #[arg(long, value_enum)]
    log_format: Option<LogFormatChoice>,

    /// Tracing filter (RUST_LOG takes precedence)
    #[arg(long)]
    log_level: Option<String>,

    /// Indent the JSON output
    #[arg(long)]
    pretty: bool,

    /// Config file (default: ./pdplog.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Report every decoded session
    #[arg(short, long)]
    verbose: bool,

    /// Parse the input but do not write any output
    #[arg(long)]
    dry_run: bool,
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

/// Settings for one conversion, merged from the CLI and the config file.
#[derive(Debug, Clone)]
struct Options {
    input: PathBuf,
    output: PathBuf,
    pretty: bool,
    verbose: bool,
    dry_run: bool,
}

impl Options {
    /// CLI flags win over the config file, which wins over the defaults.
    fn resolve(cli: &Cli, config: &Config) -> Result<Self> {
        let input = cli
            .input
            .clone()
            .ok_or_else(|| ConvertError::Usage(USAGE.to_string()))?;

        Ok(Self {
            input,
            output: cli.output.clone().unwrap_or_else(|| config.output()),
            pretty: cli.pretty || config.pretty.unwrap_or(false),
            verbose: cli.verbose,
            dry_run: cli.dry_run,
        })
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let working_dir = std::env::current_dir().context("Failed to get current directory")?;
    let config = Config::discover(cli.config.as_deref(), &working_dir)?.unwrap_or_default();

    let log_format = cli
        .log_format
        .map(LogFormat::from)
        .or(config.log_format)
        .unwrap_or_default();
    init_tracing(
        cli.log_level.as_deref().unwrap_or(config.log_level()),
        log_format,
    );
    debug!(?config, "loaded configuration");

    let options = Options::resolve(&cli, &config)?;

    let logger = match config.log_file {
        Some(ref path) => Logger::with_file(log_format, path)
            .with_context(|| format!("Failed to open log file {}", path.display()))?,
        None => Logger::new(log_format),
    };

    // Reported once, through the logger.
    if let Err(err) = run(&options, &logger) {
        logger.log(&LogEvent::ErrorEncountered {
            error: format!("{:#}", err),
        });
        std::process::exit(1);
    }

    Ok(())
}

/// Decode the whole input, then write it. Nothing is written unless every
/// session decodes.
fn run(options: &Options, logger: &Logger) -> Result<()> {
    let Options {
        input,
        output,
        pretty,
        verbose,
        dry_run,
    } = options;

    // The whole log is buffered before scanning starts.
    let data = std::fs::read(input)
        .with_context(|| format!("Error opening data: {}", input.display()))?;

    logger.log(&LogEvent::ConversionStarted {
        input: input.clone(),
        output: output.clone(),
        input_bytes: data.len(),
    });
    let started = Instant::now();

    let sessions = convert_with(data.as_slice(), |index, session: &Session| {
        if *verbose {
            logger.log(&LogEvent::SessionDecoded {
                index,
                channel: session.channel.clone(),
                epoch: session.epoch,
                values: session.payload.len(),
            });
        }
    })
    .context("Error parsing session")?;

    info!(sessions = sessions.len(), "decoded log");

    let written = if *dry_run {
        None
    } else {
        write_json_file(output, &sessions, *pretty).context("Error encoding json output")?;
        Some(output.clone())
    };

    logger.log(&LogEvent::ConversionCompleted {
        sessions: sessions.len(),
        output: written,
        duration_secs: started.elapsed().as_secs_f64(),
    });

    Ok(())
}
