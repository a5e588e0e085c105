use anyhow::{anyhow, Context, Result};
use log::{debug, error, info, warn};
use std::path::{Path, PathBuf};

use crate::app_config::Config;
use crate::file_utils::FileManager;
use crate::subtitle::{self, ParseOptions, ParseWarning, SequenceMismatch, SubtitleStream};
use crate::validation::{TimecodeValidationResult, TimecodeValidator};

// @module: Application controller for file-level subtitle edits

/// Findings of a `check` run over one file
#[derive(Debug, Clone)]
pub struct CheckReport {
    /// File that was checked
    pub path: PathBuf,
    /// Number of entries parsed
    pub entry_count: usize,
    /// Overlapping position pairs
    pub overlaps: Vec<(usize, usize)>,
    /// Entries whose carried index is off
    pub sequence_mismatches: Vec<SequenceMismatch>,
    /// Timing quality results
    pub timing: TimecodeValidationResult,
}

impl CheckReport {
    /// Nothing that would change on a rewrite and no failed timing checks
    pub fn is_clean(&self) -> bool {
        self.overlaps.is_empty() && self.sequence_mismatches.is_empty() && self.timing.passed
    }
}

/// Findings of a `check` run over a directory
#[derive(Debug, Default)]
pub struct FolderCheckReport {
    /// Files that could be loaded, sorted by path
    pub reports: Vec<CheckReport>,
    /// Files that could not be read or parsed
    pub failures: Vec<(PathBuf, anyhow::Error)>,
}

impl FolderCheckReport {
    /// Every file loaded and came back clean
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty() && self.reports.iter().all(CheckReport::is_clean)
    }

    /// Files with issues, unreadable ones included
    pub fn dirty_count(&self) -> usize {
        self.failures.len() + self.reports.iter().filter(|r| !r.is_clean()).count()
    }

    /// Number of files looked at
    pub fn file_count(&self) -> usize {
        self.reports.len() + self.failures.len()
    }
}

/// Main application controller: loads files, applies stream edits and
/// writes the results back using the configured options.
pub struct Controller {
    // @field: App configuration
    config: Config,
}

impl Controller {
    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        config.validate().context("Configuration validation failed")?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Read and parse a subtitle file using the configured parser options
    pub fn load<P: AsRef<Path>>(&self, path: P) -> Result<SubtitleStream> {
        self.load_with(path.as_ref(), &self.config.parser)
    }

    fn load_with(&self, path: &Path, options: &ParseOptions) -> Result<SubtitleStream> {
        let text = FileManager::read_subtitle_file(path, &self.config.encoding)?;
        let report = subtitle::parse_with_warnings(&text, options)
            .with_context(|| format!("Failed to parse {:?}", path))?;

        for warning in &report.warnings {
            match warning {
                ParseWarning::Overlap { line_number, other_line_number } => warn!(
                    "{:?}:{}: block overlaps the block timed at line {}",
                    path, line_number, other_line_number
                ),
                ParseWarning::OutOfSequence { line_number, found, expected } => debug!(
                    "{:?}:{}: sequence number {} where {} was expected",
                    path, line_number, found, expected
                ),
            }
        }

        debug!("Loaded {} entries from {:?}", report.stream.len(), path);
        Ok(report.stream)
    }

    /// Serialize and write a stream using the configured output options
    pub fn save<P: AsRef<Path>>(&self, stream: &SubtitleStream, path: P) -> Result<()> {
        let text = subtitle::serialize_with(stream, &self.config.output);
        FileManager::write_subtitle_file(path, &text, &self.config.encoding)
    }

    /// Shift every entry of `input` by `delta_ms` and write to `output`
    pub fn shift_file(&self, input: &Path, output: &Path, delta_ms: i64) -> Result<()> {
        self.edit_file(input, output, |stream| {
            stream.shift_all(delta_ms)?;
            info!("Shifted {} entries by {}ms", stream.len(), delta_ms);
            Ok(())
        })
    }

    /// Scale every timecode of `input` by `factor` and write to `output`
    pub fn scale_file(&self, input: &Path, output: &Path, factor: f64) -> Result<()> {
        self.edit_file(input, output, |stream| {
            stream.scale_all(factor)?;
            info!("Scaled {} entries by {:.6}", stream.len(), factor);
            Ok(())
        })
    }

    /// Move `input` so its first entry starts at zero
    pub fn shift_to_zero_file(&self, input: &Path, output: &Path) -> Result<()> {
        self.edit_file(input, output, |stream| {
            let first = stream.get(0).map(|entry| entry.start());
            stream.shift_to_zero()?;
            if let Some(first) = first {
                info!("Moved {} entries back by {}", stream.len(), first);
            }
            Ok(())
        })
    }

    /// Rewrite `input` with contiguous sequence numbers
    pub fn renumber_file(&self, input: &Path, output: &Path) -> Result<()> {
        self.edit_file(input, output, |stream| {
            let mismatches = stream.check_sequence().len();
            stream.renumber();
            info!("Renumbered {} entries ({} were out of sequence)", stream.len(), mismatches);
            Ok(())
        })
    }

    /// Inspect a file without changing it. Overlaps are collected rather
    /// than stopping the parse, whatever the parser mode.
    pub fn check_file<P: AsRef<Path>>(&self, path: P) -> Result<CheckReport> {
        let path = path.as_ref();
        let options = ParseOptions {
            strict: false,
            ..self.config.parser
        };
        let stream = self.load_with(path, &options)?;
        let validator = TimecodeValidator::with_config(self.config.validation.clone());

        let report = CheckReport {
            path: path.to_path_buf(),
            entry_count: stream.len(),
            overlaps: stream.find_overlapping().into_iter().collect(),
            sequence_mismatches: stream.check_sequence(),
            timing: validator.validate_stream(&stream),
        };

        for (earlier, later) in &report.overlaps {
            if let (Some(a), Some(b)) = (stream.get(*earlier), stream.get(*later)) {
                warn!("Overlap between entries {} and {}:\n{}\n{}", earlier + 1, later + 1, a, b);
            }
        }
        for failed in report.timing.failed_entries() {
            for issue in &failed.issues {
                warn!("Entry {}: {}", failed.position + 1, issue);
            }
        }

        Ok(report)
    }

    /// Check every subtitle file below a directory. Files that fail to load
    /// are logged and listed as failures.
    pub fn check_folder<P: AsRef<Path>>(&self, dir: P) -> Result<FolderCheckReport> {
        let dir = dir.as_ref();
        if !FileManager::dir_exists(dir) {
            return Err(anyhow!("Directory does not exist: {:?}", dir));
        }

        let files = FileManager::find_subtitle_files(dir)?;
        info!("Checking {} subtitle file(s) in {:?}", files.len(), dir);

        let mut folder = FolderCheckReport::default();
        for file in files {
            match self.check_file(&file) {
                Ok(report) => folder.reports.push(report),
                Err(e) => {
                    error!("Error checking {:?}: {:#}", file, e);
                    folder.failures.push((file, e));
                }
            }
        }

        Ok(folder)
    }

    fn edit_file<F>(&self, input: &Path, output: &Path, edit: F) -> Result<()>
    where
        F: FnOnce(&mut SubtitleStream) -> Result<()>,
    {
        if !FileManager::file_exists(input) {
            return Err(anyhow!("Input file does not exist: {:?}", input));
        }

        let mut stream = self.load(input)?;
        edit(&mut stream).with_context(|| format!("Failed to edit {:?}", input))?;
        self.save(&stream, output)?;

        info!("Success: {:?}", output);
        Ok(())
    }
}
