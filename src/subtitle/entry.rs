use std::fmt;

use crate::errors::SubtitleError;
use crate::subtitle::Timecode;

/// One caption: a sequence index, a half-open time range and its text lines.
///
/// Entries are immutable values. Every "edit" returns a new entry and the
/// owning stream decides whether to store it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtitleEntry {
    index: usize,
    start: Timecode,
    end: Timecode,
    lines: Vec<String>,
}

impl SubtitleEntry {
    /// Creates a validated entry.
    ///
    /// Trailing whitespace is stripped from every line. Fails with
    /// `InvalidEntry` when `start >= end`, the index is 0, there are no lines,
    /// or a line is blank or contains a line break.
    pub fn new<I, S>(index: usize, start: Timecode, end: Timecode, lines: I) -> Result<Self, SubtitleError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if index == 0 {
            return Err(SubtitleError::InvalidEntry("sequence index must be positive".to_string()));
        }

        if start >= end {
            return Err(SubtitleError::InvalidEntry(format!(
                "start {} is not before end {}",
                start, end
            )));
        }

        Ok(SubtitleEntry {
            index,
            start,
            end,
            lines: validate_lines(lines)?,
        })
    }

    /// Sequence index as carried from the source or last renumbering
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn start(&self) -> Timecode {
        self.start
    }

    pub fn end(&self) -> Timecode {
        self.end
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Lines joined with `\n`
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    /// Length of the time range in milliseconds
    pub fn duration(&self) -> u64 {
        self.end.as_millis() - self.start.as_millis()
    }

    /// Whether the two half-open ranges intersect
    pub fn overlaps(&self, other: &SubtitleEntry) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Same entry moved by `delta_ms` (negative moves backwards)
    pub fn shift(&self, delta_ms: i64) -> Result<Self, SubtitleError> {
        let start = self.start.offset(delta_ms).map_err(|e| {
            if delta_ms < 0 {
                SubtitleError::InvalidEntry(format!(
                    "shifting entry {} by {}ms would start before zero",
                    self.index, delta_ms
                ))
            } else {
                SubtitleError::InvalidEntry(e.to_string())
            }
        })?;
        let end = self
            .end
            .offset(delta_ms)
            .map_err(|e| SubtitleError::InvalidEntry(e.to_string()))?;

        Ok(SubtitleEntry {
            start,
            end,
            ..self.clone()
        })
    }

    /// Same entry with both bounds multiplied by `factor`
    pub fn scale(&self, factor: f64) -> Result<Self, SubtitleError> {
        let start = self.start.scale(factor)?;
        let end = self.end.scale(factor)?;
        if start >= end {
            return Err(SubtitleError::InvalidEntry(format!(
                "scaling entry {} by {} collapses it to {} --> {}",
                self.index, factor, start, end
            )));
        }

        Ok(SubtitleEntry {
            start,
            end,
            ..self.clone()
        })
    }

    /// Same timing, new text
    pub fn with_text<I, S>(&self, lines: I) -> Result<Self, SubtitleError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Ok(SubtitleEntry {
            lines: validate_lines(lines)?,
            ..self.clone()
        })
    }

    /// Same entry carrying a different sequence index
    pub fn with_index(&self, index: usize) -> Result<Self, SubtitleError> {
        if index == 0 {
            return Err(SubtitleError::InvalidEntry("sequence index must be positive".to_string()));
        }
        Ok(SubtitleEntry {
            index,
            ..self.clone()
        })
    }

    pub(crate) fn set_index(&mut self, index: usize) {
        self.index = index;
    }
}

fn validate_lines<I, S>(lines: I) -> Result<Vec<String>, SubtitleError>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut validated = Vec::new();
    for line in lines {
        let line: String = line.into();
        if line.contains(['\n', '\r']) {
            return Err(SubtitleError::InvalidEntry(format!("line {:?} contains a line break", line)));
        }
        let line = line.trim_end();
        // A blank line would end the block when read back
        if line.is_empty() {
            return Err(SubtitleError::InvalidEntry("text lines must not be blank".to_string()));
        }
        validated.push(line.to_string());
    }

    if validated.is_empty() {
        return Err(SubtitleError::InvalidEntry("an entry needs at least one line of text".to_string()));
    }

    Ok(validated)
}

impl fmt::Display for SubtitleEntry {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{}", self.index)?;
        writeln!(f, "{} --> {}", self.start, self.end)?;
        for line in &self.lines {
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}
