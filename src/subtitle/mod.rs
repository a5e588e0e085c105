/*!
 * SubRip subtitle core.
 *
 * Raw text goes through the parser into a `SubtitleStream`, gets edited
 * through the stream API and comes back out through the serializer:
 *
 * - `timecode`: millisecond timeline positions and their arithmetic
 * - `entry`: a single caption (index, time range, text lines)
 * - `stream`: ordered, overlap-checked collection of entries
 * - `parser`: SubRip text to stream
 * - `serializer`: stream to canonical SubRip text
 *
 * Everything here is pure and synchronous; file access and logging belong to
 * the callers.
 */

pub mod entry;
pub mod parser;
pub mod serializer;
pub mod stream;
pub mod timecode;

pub use entry::SubtitleEntry;
pub use parser::{parse, parse_with_warnings, ParseOptions, ParseReport, ParseWarning};
pub use serializer::{serialize, serialize_with, LineEnding, SerializeOptions};
pub use stream::{SequenceMismatch, StreamOptions, SubtitleStream};
pub use timecode::Timecode;
