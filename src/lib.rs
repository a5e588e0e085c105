/*!
 * # srtkit - SubRip subtitle toolkit
 *
 * A Rust library for reading, editing and writing SubRip (.srt) subtitles.
 *
 * ## Features
 *
 * - Parse SubRip text into an ordered, overlap-checked subtitle stream
 * - Shift, rescale (frame-rate correction), edit, insert and remove entries
 * - Serialize back to canonical SubRip text with contiguous numbering
 * - Strict or permissive handling of overlapping entries
 * - Explicitly configured file encodings
 * - Timing quality checks (duration, reading speed, gaps)
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `subtitle`: The pure subtitle core:
 *   - `subtitle::timecode`: Millisecond timecodes
 *   - `subtitle::entry`: Single captions
 *   - `subtitle::stream`: Ordered entry collections
 *   - `subtitle::parser`: SubRip text to stream
 *   - `subtitle::serializer`: Stream to SubRip text
 * - `validation`: Advisory timing checks
 * - `app_config`: Configuration management
 * - `file_utils`: File system operations and encodings
 * - `app_controller`: File-level workflows used by the command line tool
 * - `errors`: Custom error types for the library
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod errors;
pub mod file_utils;
pub mod subtitle;
pub mod validation;

// Re-export main types for easier usage
pub use app_config::Config;
pub use app_controller::{CheckReport, Controller, FolderCheckReport};
pub use errors::{AppError, SubtitleError};
pub use subtitle::{
    parse, parse_with_warnings, serialize, serialize_with, ParseOptions, SerializeOptions, StreamOptions,
    SubtitleEntry, SubtitleStream, Timecode,
};
