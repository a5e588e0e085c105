/*!
 * Tests for subtitle entry construction and edits
 */

use std::fmt::Write;

use srtkit::subtitle::{SubtitleEntry, Timecode};
use srtkit::SubtitleError;
use crate::common;

fn tc(ms: u64) -> Timecode {
    Timecode::from(ms)
}

#[test]
fn test_new_withValidParts_shouldKeepValues() {
    let entry = SubtitleEntry::new(42, tc(61_234), tc(65_432), ["Hello", "World"]).unwrap();

    assert_eq!(entry.index(), 42);
    assert_eq!(entry.start(), tc(61_234));
    assert_eq!(entry.end(), tc(65_432));
    assert_eq!(entry.lines(), ["Hello".to_string(), "World".to_string()]);
    assert_eq!(entry.text(), "Hello\nWorld");
    assert_eq!(entry.duration(), 4_198);
}

#[test]
fn test_new_withEmptyOrInvertedRange_shouldFail() {
    let zero_length = SubtitleEntry::new(1, tc(1_000), tc(1_000), ["Hi"]);
    let inverted = SubtitleEntry::new(1, tc(2_000), tc(1_000), ["Hi"]);

    assert!(matches!(zero_length, Err(SubtitleError::InvalidEntry(_))));
    assert!(matches!(inverted, Err(SubtitleError::InvalidEntry(_))));
}

#[test]
fn test_new_withBadText_shouldFail() {
    let no_lines: Vec<String> = Vec::new();
    let cases = vec![
        SubtitleEntry::new(1, tc(0), tc(1_000), no_lines),
        SubtitleEntry::new(1, tc(0), tc(1_000), vec!["two\nlines".to_string()]),
        SubtitleEntry::new(1, tc(0), tc(1_000), vec!["carriage\rreturn".to_string()]),
        SubtitleEntry::new(1, tc(0), tc(1_000), vec!["ok".to_string(), "   ".to_string()]),
    ];

    for result in cases {
        assert!(matches!(result, Err(SubtitleError::InvalidEntry(_))));
    }
}

#[test]
fn test_new_withZeroIndex_shouldFail() {
    assert!(matches!(
        SubtitleEntry::new(0, tc(0), tc(1_000), ["Hi"]),
        Err(SubtitleError::InvalidEntry(_))
    ));
}

#[test]
fn test_new_withTrailingWhitespace_shouldStripIt() {
    let entry = SubtitleEntry::new(1, tc(0), tc(1_000), ["  indented  ", "tab\t"]).unwrap();

    assert_eq!(entry.lines(), ["  indented".to_string(), "tab".to_string()]);
}

#[test]
fn test_shift_withPositiveAndNegativeDelta_shouldMoveBothBounds() {
    let entry = common::entry(3, 1_000, 2_500, "Moving");

    let later = entry.shift(500).unwrap();
    let earlier = entry.shift(-1_000).unwrap();

    assert_eq!((later.start(), later.end()), (tc(1_500), tc(3_000)));
    assert_eq!((earlier.start(), earlier.end()), (Timecode::ZERO, tc(1_500)));
    assert_eq!(later.index(), 3);
    assert_eq!(later.lines(), entry.lines());
    // The original is untouched
    assert_eq!(entry.start(), tc(1_000));
}

#[test]
fn test_shift_pastZero_shouldFailWithInvalidEntry() {
    let entry = common::entry(1, 1_000, 2_000, "Too early");

    assert!(matches!(entry.shift(-1_001), Err(SubtitleError::InvalidEntry(_))));
}

#[test]
fn test_shift_pastMaximum_shouldReportOutOfRange() {
    let entry = common::entry(1, u64::MAX - 10, u64::MAX - 5, "Too late");

    match entry.shift(100) {
        Err(SubtitleError::InvalidEntry(message)) => {
            assert!(message.contains("out of range"), "message was {}", message);
            assert!(!message.contains("before zero"), "message was {}", message);
        }
        other => panic!("expected an invalid entry, got {:?}", other),
    }
}

#[test]
fn test_scale_shouldScaleBothBounds() {
    let entry = common::entry(1, 1_000, 2_001, "Scaled");

    let scaled = entry.scale(2.0).unwrap();

    assert_eq!((scaled.start(), scaled.end()), (tc(2_000), tc(4_002)));
}

#[test]
fn test_scale_collapsingRange_shouldFail() {
    let entry = common::entry(1, 1_000, 1_001, "Tiny");

    assert!(matches!(entry.scale(0.0001), Err(SubtitleError::InvalidEntry(_))));
}

#[test]
fn test_withText_shouldKeepTiming() {
    let entry = common::entry(7, 1_000, 2_000, "Before");

    let edited = entry.with_text(["After", "and more"]).unwrap();

    assert_eq!(edited.lines(), ["After".to_string(), "and more".to_string()]);
    assert_eq!((edited.index(), edited.start(), edited.end()), (7, tc(1_000), tc(2_000)));
    assert!(entry.with_text(Vec::<String>::new()).is_err());
}

#[test]
fn test_overlaps_shouldTreatRangesAsHalfOpen() {
    let first = common::entry(1, 1_000, 2_000, "A");
    let touching = common::entry(2, 2_000, 3_000, "B");
    let crossing = common::entry(3, 1_500, 2_500, "C");

    assert!(!first.overlaps(&touching));
    assert!(first.overlaps(&crossing));
    assert!(crossing.overlaps(&first));
}

#[test]
fn test_display_withValidEntry_shouldFormatAsBlock() {
    let entry = SubtitleEntry::new(1, tc(5_000), tc(10_000), ["Test subtitle", "Line two"]).unwrap();
    let mut output = String::new();
    write!(output, "{}", entry).unwrap();

    assert_eq!(output, "1\n00:00:05,000 --> 00:00:10,000\nTest subtitle\nLine two\n");
}
