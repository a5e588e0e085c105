/*!
 * Validation of subtitle timing quality.
 *
 * Streams already guarantee well formed entries; the checks here are
 * advisory and never change a stream:
 *
 * - `timecodes`: durations, reading speed, overlaps and gaps
 */

pub mod timecodes;

// Re-export main types
pub use timecodes::{TimecodeIssue, TimecodeValidationResult, TimecodeValidator, TimecodeValidatorConfig};
