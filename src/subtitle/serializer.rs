use serde::{Deserialize, Serialize};

use crate::subtitle::{SubtitleEntry, SubtitleStream};

/// Line terminator used when writing SubRip text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineEnding {
    #[default]
    Lf,
    CrLf,
}

impl LineEnding {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Lf => "\n",
            Self::CrLf => "\r\n",
        }
    }
}

/// Serializer behaviour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SerializeOptions {
    pub line_ending: LineEnding,
}

/// Canonical SubRip text for `stream`, with `\n` line endings.
///
/// Indices are emitted as 1..=N in stream order whatever the entries carry,
/// and every block (the last one included) is followed by a blank line. An
/// empty stream gives an empty string.
pub fn serialize(stream: &SubtitleStream) -> String {
    serialize_with(stream, &SerializeOptions::default())
}

/// Same as [`serialize`] with explicit options
pub fn serialize_with(stream: &SubtitleStream, options: &SerializeOptions) -> String {
    let eol = options.line_ending.as_str();
    let mut out = String::new();
    for (position, entry) in stream.entries().enumerate() {
        write_block(&mut out, position + 1, entry, eol);
    }
    out
}

fn write_block(out: &mut String, index: usize, entry: &SubtitleEntry, eol: &str) {
    out.push_str(&index.to_string());
    out.push_str(eol);
    out.push_str(&format!("{} --> {}", entry.start(), entry.end()));
    out.push_str(eol);
    for line in entry.lines() {
        out.push_str(line);
        out.push_str(eol);
    }
    out.push_str(eol);
}
