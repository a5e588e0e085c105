use std::fmt;
use std::ops::Add;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::SubtitleError;

// @const: SRT timecode, hours may grow past two digits
static TIMECODE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{2,}):(\d{2}):(\d{2}),(\d{3})$").expect("timecode regex is valid")
});

const MS_PER_SECOND: u64 = 1_000;
const MS_PER_MINUTE: u64 = 60 * MS_PER_SECOND;
const MS_PER_HOUR: u64 = 60 * MS_PER_MINUTE;

/// A point on the media timeline with millisecond precision.
///
/// Timecodes are never negative and have no upper bound; hours are not
/// wrapped at 24.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Timecode(u64);

impl Timecode {
    /// The start of the timeline
    pub const ZERO: Timecode = Timecode(0);

    /// Build a timecode from a signed millisecond count
    pub fn from_millis(ms: i64) -> Result<Self, SubtitleError> {
        u64::try_from(ms)
            .map(Timecode)
            .map_err(|_| SubtitleError::InvalidTimecode(format!("negative millisecond count {}", ms)))
    }

    /// Build a timecode from clock components
    pub fn from_components(hours: u64, minutes: u64, seconds: u64, millis: u64) -> Result<Self, SubtitleError> {
        if minutes >= 60 || seconds >= 60 || millis >= 1000 {
            return Err(SubtitleError::InvalidTimecode(format!(
                "component out of range: {}h {}m {}s {}ms",
                hours, minutes, seconds, millis
            )));
        }

        hours
            .checked_mul(MS_PER_HOUR)
            .and_then(|ms| ms.checked_add(minutes * MS_PER_MINUTE + seconds * MS_PER_SECOND + millis))
            .map(Timecode)
            .ok_or_else(|| SubtitleError::InvalidTimecode(format!("{} hours does not fit", hours)))
    }

    /// Total milliseconds
    pub const fn as_millis(self) -> u64 {
        self.0
    }

    /// Split into (hours, minutes, seconds, milliseconds)
    pub const fn to_components(self) -> (u64, u64, u64, u64) {
        let hours = self.0 / MS_PER_HOUR;
        let minutes = (self.0 % MS_PER_HOUR) / MS_PER_MINUTE;
        let seconds = (self.0 % MS_PER_MINUTE) / MS_PER_SECOND;
        let millis = self.0 % MS_PER_SECOND;
        (hours, minutes, seconds, millis)
    }

    /// `self - other`, refusing to go below zero
    pub fn subtract(self, other: Timecode) -> Result<Self, SubtitleError> {
        self.0.checked_sub(other.0).map(Timecode).ok_or_else(|| {
            SubtitleError::InvalidTimecode(format!("{} - {} would be negative", self, other))
        })
    }

    /// Move by a signed number of milliseconds
    pub fn offset(self, delta_ms: i64) -> Result<Self, SubtitleError> {
        let shifted = if delta_ms < 0 {
            self.0.checked_sub(delta_ms.unsigned_abs())
        } else {
            self.0.checked_add(delta_ms.unsigned_abs())
        };

        shifted.map(Timecode).ok_or_else(|| {
            SubtitleError::InvalidTimecode(format!("{} shifted by {}ms is out of range", self, delta_ms))
        })
    }

    /// Multiply by `factor`, rounding to the nearest millisecond (ties away
    /// from zero). Used for frame-rate correction.
    pub fn scale(self, factor: f64) -> Result<Self, SubtitleError> {
        if !factor.is_finite() || factor <= 0.0 {
            return Err(SubtitleError::InvalidTimecode(format!(
                "scale factor must be a positive number, got {}",
                factor
            )));
        }

        let scaled = (self.0 as f64 * factor).round();
        if scaled >= u64::MAX as f64 {
            return Err(SubtitleError::InvalidTimecode(format!("{} scaled by {} overflows", self, factor)));
        }

        Ok(Timecode(scaled as u64))
    }
}

impl Add for Timecode {
    type Output = Timecode;

    fn add(self, other: Timecode) -> Timecode {
        Timecode(self.0.saturating_add(other.0))
    }
}

impl From<u64> for Timecode {
    fn from(ms: u64) -> Self {
        Timecode(ms)
    }
}

impl fmt::Display for Timecode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (hours, minutes, seconds, millis) = self.to_components();
        write!(f, "{:02}:{:02}:{:02},{:03}", hours, minutes, seconds, millis)
    }
}

impl FromStr for Timecode {
    type Err = SubtitleError;

    /// Parse `HH:MM:SS,mmm`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let caps = TIMECODE_REGEX
            .captures(s)
            .ok_or_else(|| SubtitleError::InvalidTimecode(format!("'{}' is not in HH:MM:SS,mmm form", s)))?;

        let field = |i: usize| -> Result<u64, SubtitleError> {
            caps[i]
                .parse::<u64>()
                .map_err(|_| SubtitleError::InvalidTimecode(format!("'{}' has an out of range field", s)))
        };

        Self::from_components(field(1)?, field(2)?, field(3)?, field(4)?)
    }
}
