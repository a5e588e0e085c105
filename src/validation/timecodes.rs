/*!
 * Timing quality checks for subtitle streams.
 *
 * Entries are already well formed once they are in a stream; this module
 * looks at whether their timing is comfortable to read:
 * - Durations within sensible limits
 * - Reading speed (characters per second)
 * - Overlaps in permissive streams
 * - Unusually large gaps between entries
 */

use log::debug;
use serde::{Deserialize, Serialize};

use crate::subtitle::{SubtitleEntry, SubtitleStream};

/// Maximum characters per second for readable subtitles
/// Research suggests 15-25 CPS is readable
const DEFAULT_MAX_CPS: f64 = 25.0;

/// Minimum duration for a subtitle in milliseconds
const MIN_SUBTITLE_DURATION_MS: u64 = 500;

/// Maximum duration for a single subtitle in milliseconds (30 seconds)
const MAX_SUBTITLE_DURATION_MS: u64 = 30_000;

/// Result of timecode validation for a single entry
#[derive(Debug, Clone)]
pub struct TimecodeEntryResult {
    /// Stream position of the entry
    pub position: usize,
    /// Whether the entry passed validation
    pub passed: bool,
    /// Issues found
    pub issues: Vec<TimecodeIssue>,
}

impl TimecodeEntryResult {
    fn from_issues(position: usize, issues: Vec<TimecodeIssue>) -> Self {
        Self {
            position,
            passed: issues.iter().all(TimecodeIssue::is_warning),
            issues,
        }
    }
}

/// Types of timecode issues
#[derive(Debug, Clone, PartialEq)]
pub enum TimecodeIssue {
    /// Duration is too short
    DurationTooShort {
        duration_ms: u64,
        min_duration_ms: u64,
    },
    /// Duration is too long
    DurationTooLong {
        duration_ms: u64,
        max_duration_ms: u64,
    },
    /// Reading speed exceeds limit
    ReadingSpeedTooHigh {
        cps: f64,
        max_cps: f64,
    },
    /// Overlaps with an earlier entry
    OverlapsWithEntry {
        other_position: usize,
        overlap_ms: u64,
    },
    /// Gap too large after the previous entry
    LargeGap {
        prev_position: usize,
        gap_ms: u64,
    },
}

impl TimecodeIssue {
    /// Warnings are reported but do not fail the entry
    pub fn is_warning(&self) -> bool {
        matches!(self, TimecodeIssue::LargeGap { .. })
    }
}

impl std::fmt::Display for TimecodeIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TimecodeIssue::DurationTooShort { duration_ms, min_duration_ms } => {
                write!(
                    f,
                    "Duration too short: {}ms (min: {}ms)",
                    duration_ms, min_duration_ms
                )
            }
            TimecodeIssue::DurationTooLong { duration_ms, max_duration_ms } => {
                write!(
                    f,
                    "Duration too long: {}ms (max: {}ms)",
                    duration_ms, max_duration_ms
                )
            }
            TimecodeIssue::ReadingSpeedTooHigh { cps, max_cps } => {
                write!(f, "Reading speed too high: {:.1} CPS (max: {:.1})", cps, max_cps)
            }
            TimecodeIssue::OverlapsWithEntry { other_position, overlap_ms } => {
                write!(
                    f,
                    "Overlaps with entry at position {} by {}ms",
                    other_position, overlap_ms
                )
            }
            TimecodeIssue::LargeGap { prev_position, gap_ms } => {
                write!(
                    f,
                    "Large gap of {}ms after entry at position {}",
                    gap_ms, prev_position
                )
            }
        }
    }
}

/// Result of validating all timecodes in a stream
#[derive(Debug, Clone)]
pub struct TimecodeValidationResult {
    /// Overall pass/fail status
    pub passed: bool,
    /// Results for each entry, in stream order
    pub entry_results: Vec<TimecodeEntryResult>,
    /// Total number of issues
    pub total_issues: usize,
    /// Number of overlapping pairs
    pub overlap_count: usize,
}

impl TimecodeValidationResult {
    /// Get all failed entries
    pub fn failed_entries(&self) -> Vec<&TimecodeEntryResult> {
        self.entry_results.iter().filter(|r| !r.passed).collect()
    }
}

/// Configuration for timecode validation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimecodeValidatorConfig {
    /// Maximum characters per second
    pub max_cps: f64,
    /// Minimum subtitle duration in ms
    pub min_duration_ms: u64,
    /// Maximum subtitle duration in ms
    pub max_duration_ms: u64,
    /// Whether to check for overlaps
    pub check_overlaps: bool,
    /// Maximum gap in ms before warning (0 = disable)
    pub max_gap_warning_ms: u64,
}

impl Default for TimecodeValidatorConfig {
    fn default() -> Self {
        Self {
            max_cps: DEFAULT_MAX_CPS,
            min_duration_ms: MIN_SUBTITLE_DURATION_MS,
            max_duration_ms: MAX_SUBTITLE_DURATION_MS,
            check_overlaps: true,
            max_gap_warning_ms: 0, // Disabled by default
        }
    }
}

/// Timecode validator for subtitle streams
#[derive(Debug, Clone, Default)]
pub struct TimecodeValidator {
    config: TimecodeValidatorConfig,
}

impl TimecodeValidator {
    /// Create a new validator with default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new validator with custom configuration
    pub fn with_config(config: TimecodeValidatorConfig) -> Self {
        Self { config }
    }

    /// Issues of a single entry taken on its own
    pub fn entry_issues(&self, entry: &SubtitleEntry) -> Vec<TimecodeIssue> {
        let mut issues = Vec::new();
        let duration_ms = entry.duration();

        if duration_ms < self.config.min_duration_ms {
            issues.push(TimecodeIssue::DurationTooShort {
                duration_ms,
                min_duration_ms: self.config.min_duration_ms,
            });
        }

        if duration_ms > self.config.max_duration_ms {
            issues.push(TimecodeIssue::DurationTooLong {
                duration_ms,
                max_duration_ms: self.config.max_duration_ms,
            });
        }

        let cps = Self::calculate_cps(entry);
        if cps > self.config.max_cps {
            issues.push(TimecodeIssue::ReadingSpeedTooHigh {
                cps,
                max_cps: self.config.max_cps,
            });
        }

        issues
    }

    /// Validate every entry of a stream, including how neighbours relate
    pub fn validate_stream(&self, stream: &SubtitleStream) -> TimecodeValidationResult {
        let entries: Vec<&SubtitleEntry> = stream.entries().collect();
        let mut issues: Vec<Vec<TimecodeIssue>> = entries.iter().map(|e| self.entry_issues(e)).collect();

        let mut overlap_count = 0;
        if self.config.check_overlaps {
            for (earlier, later) in stream.find_overlapping() {
                overlap_count += 1;
                let overlap_ms = entries[earlier].end().min(entries[later].end()).as_millis()
                    - entries[later].start().as_millis();
                issues[later].push(TimecodeIssue::OverlapsWithEntry {
                    other_position: earlier,
                    overlap_ms,
                });
            }
        }

        if self.config.max_gap_warning_ms > 0 {
            for (position, pair) in entries.windows(2).enumerate() {
                let (current, next) = (pair[0], pair[1]);
                if next.start() > current.end() {
                    let gap_ms = next.start().as_millis() - current.end().as_millis();
                    if gap_ms > self.config.max_gap_warning_ms {
                        issues[position + 1].push(TimecodeIssue::LargeGap {
                            prev_position: position,
                            gap_ms,
                        });
                    }
                }
            }
        }

        let entry_results: Vec<TimecodeEntryResult> = issues
            .into_iter()
            .enumerate()
            .map(|(position, issues)| TimecodeEntryResult::from_issues(position, issues))
            .collect();
        let total_issues: usize = entry_results.iter().map(|r| r.issues.len()).sum();
        let passed = entry_results.iter().all(|r| r.passed);

        debug!(
            "Timecode validation: {} entries, {} issues, {} overlaps",
            entries.len(),
            total_issues,
            overlap_count
        );

        TimecodeValidationResult {
            passed,
            entry_results,
            total_issues,
            overlap_count,
        }
    }

    /// Calculate reading speed (characters per second) for an entry.
    /// Line breaks are not counted.
    pub fn calculate_cps(entry: &SubtitleEntry) -> f64 {
        let char_count: usize = entry.lines().iter().map(|l| l.chars().count()).sum();
        let duration_secs = entry.duration() as f64 / 1000.0;
        char_count as f64 / duration_secs
    }
}
