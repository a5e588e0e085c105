use serde::{Deserialize, Serialize};

use crate::errors::SubtitleError;
use crate::subtitle::{StreamOptions, SubtitleEntry, SubtitleStream, Timecode};

const BYTE_ORDER_MARK: char = '\u{feff}';
const ARROW: &str = "-->";

/// Parser behaviour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseOptions {
    /// Reject overlapping blocks. When false the stream is permissive and
    /// overlaps are reported as warnings.
    pub strict: bool,
    /// Accept input without any block
    pub allow_empty: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            strict: true,
            allow_empty: true,
        }
    }
}

/// Something worth telling the user that did not stop the parse
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseWarning {
    /// Block overlapping an earlier one (permissive parses only)
    Overlap {
        /// Timing line of the block
        line_number: usize,
        /// Timing line of the earlier block it overlaps
        other_line_number: usize,
    },
    /// Block whose index does not follow on from the previous block
    OutOfSequence {
        /// Line of the index
        line_number: usize,
        found: usize,
        expected: usize,
    },
}

/// A parsed stream together with its warnings
#[derive(Debug, Clone)]
pub struct ParseReport {
    pub stream: SubtitleStream,
    pub warnings: Vec<ParseWarning>,
}

/// Parse SubRip text into a stream
pub fn parse(text: &str, options: &ParseOptions) -> Result<SubtitleStream, SubtitleError> {
    parse_with_warnings(text, options).map(|report| report.stream)
}

/// Parse SubRip text, also collecting non-fatal findings
pub fn parse_with_warnings(text: &str, options: &ParseOptions) -> Result<ParseReport, SubtitleError> {
    let text = text.strip_prefix(BYTE_ORDER_MARK).unwrap_or(text);
    let mut builder = StreamBuilder::new(options);
    let mut state = State::Idle;

    for (i, raw_line) in split_lines(text).enumerate() {
        let line_number = i + 1;
        let line = raw_line.trim_end();

        state = match state {
            State::Idle if line.is_empty() => State::Idle,
            State::Idle => State::ExpectTiming {
                index: parse_index(line, line_number)?,
                index_line: line_number,
            },
            State::ExpectTiming { index, index_line } => {
                let (start, end) = parse_timing(line, line_number)?;
                State::Text(PendingBlock {
                    index,
                    index_line,
                    timing_line: line_number,
                    start,
                    end,
                    lines: Vec::new(),
                })
            }
            State::Text(mut block) => {
                if !line.is_empty() {
                    block.lines.push(line.to_string());
                    State::Text(block)
                } else if block.lines.is_empty() {
                    return Err(SubtitleError::parse("missing subtitle text after the timing line", line_number));
                } else {
                    builder.push(block)?;
                    State::Idle
                }
            }
        };
    }

    match state {
        State::Idle => {}
        State::ExpectTiming { index_line, .. } => {
            return Err(SubtitleError::parse("missing timing line after the sequence number", index_line));
        }
        State::Text(block) if block.lines.is_empty() => {
            return Err(SubtitleError::parse("missing subtitle text after the timing line", block.timing_line));
        }
        State::Text(block) => builder.push(block)?,
    }

    builder.finish()
}

enum State {
    Idle,
    ExpectTiming { index: usize, index_line: usize },
    Text(PendingBlock),
}

struct PendingBlock {
    index: usize,
    index_line: usize,
    timing_line: usize,
    start: Timecode,
    end: Timecode,
    lines: Vec<String>,
}

struct StreamBuilder {
    stream: SubtitleStream,
    warnings: Vec<ParseWarning>,
    allow_empty: bool,
    accepted: usize,
    // Timing line of every accepted block, in stream order
    timing_lines: Vec<usize>,
}

impl StreamBuilder {
    fn new(options: &ParseOptions) -> Self {
        Self {
            stream: SubtitleStream::with_options(StreamOptions {
                allow_overlap: !options.strict,
            }),
            warnings: Vec::new(),
            allow_empty: options.allow_empty,
            accepted: 0,
            timing_lines: Vec::new(),
        }
    }

    fn push(&mut self, block: PendingBlock) -> Result<(), SubtitleError> {
        let expected = self.accepted + 1;
        if block.index != expected {
            self.warnings.push(ParseWarning::OutOfSequence {
                line_number: block.index_line,
                found: block.index,
                expected,
            });
        }

        let entry = SubtitleEntry::new(block.index, block.start, block.end, block.lines)
            .map_err(|e| SubtitleError::parse(e.to_string(), block.timing_line))?;

        let position = match self.stream.insert(entry) {
            Ok(position) => position,
            Err(SubtitleError::OverlapError { position, .. }) => {
                let other_line_number = self.timing_lines.get(position).copied().unwrap_or_default();
                return Err(SubtitleError::parse(
                    format!("block overlaps the block timed at line {}", other_line_number),
                    block.timing_line,
                ));
            }
            Err(e) => return Err(SubtitleError::parse(e.to_string(), block.timing_line)),
        };
        self.timing_lines.insert(position, block.timing_line);
        self.accepted += 1;
        Ok(())
    }

    fn finish(mut self) -> Result<ParseReport, SubtitleError> {
        if self.stream.is_empty() && !self.allow_empty {
            return Err(SubtitleError::parse("no subtitle blocks found", 1));
        }

        // Only permissive streams can hold overlaps
        let mut overlaps: Vec<(usize, usize)> = self
            .stream
            .find_overlapping()
            .into_iter()
            .map(|(a, b)| {
                let (a, b) = (self.timing_lines[a], self.timing_lines[b]);
                (a.max(b), a.min(b))
            })
            .collect();
        overlaps.sort_unstable();
        let overlaps = overlaps
            .into_iter()
            .map(|(line_number, other_line_number)| ParseWarning::Overlap {
                line_number,
                other_line_number,
            });
        self.warnings.extend(overlaps);

        Ok(ParseReport {
            stream: self.stream,
            warnings: self.warnings,
        })
    }
}

// Like `str::lines`, but a lone `\r` (old Mac files) also ends a line
fn split_lines(text: &str) -> impl Iterator<Item = &str> {
    let mut rest = Some(text);
    std::iter::from_fn(move || {
        let current = rest.filter(|r| !r.is_empty())?;
        match current.find(['\r', '\n']) {
            Some(i) => {
                let terminator = if current[i..].starts_with("\r\n") { 2 } else { 1 };
                rest = Some(&current[i + terminator..]);
                Some(&current[..i])
            }
            None => {
                rest = None;
                Some(current)
            }
        }
    })
}

fn parse_index(line: &str, line_number: usize) -> Result<usize, SubtitleError> {
    let index: usize = line
        .trim_start()
        .parse()
        .map_err(|_| SubtitleError::parse(format!("'{}' is not a valid sequence number", line), line_number))?;
    if index == 0 {
        return Err(SubtitleError::parse("sequence numbers start at 1", line_number));
    }
    Ok(index)
}

fn parse_timing(line: &str, line_number: usize) -> Result<(Timecode, Timecode), SubtitleError> {
    if line.is_empty() {
        return Err(SubtitleError::parse("expected a timing line after the sequence number", line_number));
    }
    let mut halves = line.trim_start().splitn(2, ARROW);
    let (start, end) = match (halves.next(), halves.next()) {
        (Some(start), Some(end)) => (start.trim(), end.trim()),
        _ => {
            return Err(SubtitleError::parse(
                format!("'{}' does not have a '{}' between start and end", line, ARROW),
                line_number,
            ));
        }
    };

    let timecode = |s: &str| {
        s.parse::<Timecode>()
            .map_err(|e| SubtitleError::parse(e.to_string(), line_number))
    };
    Ok((timecode(start)?, timecode(end)?))
}
