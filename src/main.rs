// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{anyhow, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{error, info, warn, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::io::Write;
use std::path::{Path, PathBuf};

use srtkit::app_config::{self, Config};
use srtkit::file_utils::FileManager;
use srtkit::{AppError, Controller, FolderCheckReport};

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Move every subtitle forwards or backwards in time
    Shift {
        /// Subtitle file to edit
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Offset in milliseconds (negative moves earlier)
        #[arg(short, long, allow_hyphen_values = true)]
        by: i64,

        /// Output file (default: <INPUT stem>.shifted.srt)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Stretch or compress all timecodes, e.g. to fix a frame-rate mismatch
    Scale {
        /// Subtitle file to edit
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Multiply every timecode by this factor
        #[arg(long, conflicts_with_all = ["from_fps", "to_fps"])]
        factor: Option<f64>,

        /// Frame rate the subtitles were timed for
        #[arg(long, requires = "to_fps")]
        from_fps: Option<f64>,

        /// Frame rate of the video they should match
        #[arg(long, requires = "from_fps")]
        to_fps: Option<f64>,

        /// Output file (default: <INPUT stem>.scaled.srt)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Move the subtitles so the first one starts at 00:00:00,000
    Zero {
        /// Subtitle file to edit
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Output file (default: <INPUT stem>.zeroed.srt)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Rewrite a file with contiguous sequence numbers
    Renumber {
        /// Subtitle file to edit
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Output file (default: <INPUT stem>.renumbered.srt)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Report overlaps, numbering problems and timing issues
    Check {
        /// Subtitle file or directory to inspect
        #[arg(value_name = "PATH")]
        path: PathBuf,
    },

    /// Generate shell completions for srtkit
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// srtkit - SubRip subtitle toolkit
///
/// Reads, retimes and rewrites .srt subtitle files.
#[derive(Parser, Debug)]
#[command(name = "srtkit")]
#[command(version)]
#[command(about = "SubRip subtitle toolkit")]
#[command(long_about = "srtkit reads SubRip (.srt) files, edits their timing and writes them back.

EXAMPLES:
    srtkit shift movie.srt --by 1500             # Delay all subtitles by 1.5s
    srtkit shift movie.srt --by -800 -o out.srt  # Show them 0.8s earlier
    srtkit scale movie.srt --from-fps 25 --to-fps 23.976
    srtkit zero movie.srt                        # First subtitle at 00:00:00,000
    srtkit renumber movie.srt
    srtkit check /subtitles/                     # Check every .srt in a directory
    srtkit completions bash > srtkit.bash

CONFIGURATION:
    Settings are read from srtkit.json by default (see --config). A missing
    file means defaults: strict parsing, UTF-8, LF line endings.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true, default_value = "srtkit.json")]
    config_path: PathBuf,

    /// Set logging level
    #[arg(short, long, global = true, value_enum)]
    log_level: Option<CliLogLevel>,

    /// Force overwrite of existing output files
    #[arg(short, long, global = true)]
    force_overwrite: bool,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: Tag and ANSI colour for a level
    fn style_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("ERROR", "1;31"),
            Level::Warn => ("WARN ", "1;33"),
            Level::Info => ("INFO ", "1;32"),
            Level::Debug => ("DEBUG", "1;36"),
            Level::Trace => ("TRACE", "1;35"),
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level && metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let (tag, colour) = Self::style_for_level(record.level());
            let _ = writeln!(
                std::io::stderr(),
                "\x1B[{}m{} {} {}\x1B[0m",
                colour, now, tag, record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

fn main() {
    // Everything is let through here; the effective level is set once the
    // configuration is known
    if let Err(e) = CustomLogger::init(LevelFilter::Trace) {
        eprintln!("Failed to initialize logger: {}", e);
    }
    log::set_max_level(LevelFilter::Info);

    let cli = CommandLineOptions::parse();

    if let Err(e) = run(cli) {
        error!("{:#}", e);
        let app_error = AppError::from(e);
        std::process::exit(app_error.exit_code());
    }
}

fn run(cli: CommandLineOptions) -> Result<()> {
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(*shell, &mut cmd, "srtkit", &mut std::io::stdout());
        return Ok(());
    }

    // Command line log level wins over the config file
    if let Some(level) = &cli.log_level {
        let level: app_config::LogLevel = level.clone().into();
        log::set_max_level(level.into());
    }

    let mut config = Config::from_file(&cli.config_path)?;
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone().into();
    }
    log::set_max_level(config.log_level.into());

    let controller = Controller::with_config(config)?;
    let force = cli.force_overwrite;

    match cli.command {
        Commands::Shift { input, by, output } => {
            if let Some(output) = resolve_output(&input, output, "shifted", force) {
                controller.shift_file(&input, &output, by)?;
            }
        }
        Commands::Scale { input, factor, from_fps, to_fps, output } => {
            let factor = scale_factor(factor, from_fps, to_fps)?;
            if let Some(output) = resolve_output(&input, output, "scaled", force) {
                controller.scale_file(&input, &output, factor)?;
            }
        }
        Commands::Zero { input, output } => {
            if let Some(output) = resolve_output(&input, output, "zeroed", force) {
                controller.shift_to_zero_file(&input, &output)?;
            }
        }
        Commands::Renumber { input, output } => {
            if let Some(output) = resolve_output(&input, output, "renumbered", force) {
                controller.renumber_file(&input, &output)?;
            }
        }
        Commands::Check { path } => run_check(&controller, &path)?,
        Commands::Completions { .. } => {}
    }

    Ok(())
}

// Subtitles timed for `from_fps` played against a `to_fps` video need every
// timecode multiplied by from / to.
fn scale_factor(factor: Option<f64>, from_fps: Option<f64>, to_fps: Option<f64>) -> Result<f64> {
    match (factor, from_fps, to_fps) {
        (Some(factor), _, _) => Ok(factor),
        (None, Some(from), Some(to)) if from > 0.0 && to > 0.0 => Ok(from / to),
        (None, Some(_), Some(_)) => Err(anyhow!("Frame rates must be positive")),
        _ => Err(anyhow!("Either --factor or both --from-fps and --to-fps are required")),
    }
}

// @returns: Output path, or None when it exists and may not be overwritten
fn resolve_output(input: &Path, output: Option<PathBuf>, suffix: &str, force_overwrite: bool) -> Option<PathBuf> {
    let output = output.unwrap_or_else(|| {
        let dir = input.parent().unwrap_or(Path::new(""));
        FileManager::generate_output_path(input, dir, suffix)
    });

    if output.exists() && !force_overwrite {
        warn!("Output file already exists: {:?}. Use -f to force overwrite.", output);
        return None;
    }
    Some(output)
}

fn run_check(controller: &Controller, path: &Path) -> Result<()> {
    let folder = if path.is_dir() {
        controller.check_folder(path)?
    } else if path.is_file() {
        FolderCheckReport {
            reports: vec![controller.check_file(path)?],
            failures: Vec::new(),
        }
    } else {
        return Err(anyhow!("Input path does not exist: {:?}", path));
    };

    for report in &folder.reports {
        if report.is_clean() {
            info!("{:?}: {} entries, no issues", report.path, report.entry_count);
        } else {
            warn!(
                "{:?}: {} entries, {} overlap(s), {} numbering issue(s), {} timing issue(s)",
                report.path,
                report.entry_count,
                report.overlaps.len(),
                report.sequence_mismatches.len(),
                report.timing.total_issues
            );
        }
    }
    for (file, _) in &folder.failures {
        warn!("{:?}: could not be checked", file);
    }

    if !folder.is_clean() {
        return Err(anyhow!("{} of {} file(s) have issues", folder.dirty_count(), folder.file_count()));
    }
    Ok(())
}
