/*!
 * End-to-end tests for file-level subtitle edits
 */

use anyhow::Result;
use std::fs;

use srtkit::app_config::Config;
use srtkit::subtitle::{LineEnding, Timecode};
use srtkit::{AppError, Controller, SubtitleError};
use crate::common;

fn controller() -> Controller {
    common::init_logging();
    Controller::with_config(Config::default()).unwrap()
}

#[test]
fn test_shiftFile_shouldWriteShiftedCopy() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_subtitle(temp_dir.path(), "movie.srt")?;
    let output = temp_dir.path().join("movie.shifted.srt");

    controller().shift_file(&input, &output, 2_500)?;

    let shifted = fs::read_to_string(&output)?;
    assert!(shifted.starts_with("1\n00:00:03,500 --> 00:00:06,500\nThis is a test subtitle.\n\n"));
    assert!(shifted.contains("3\n00:00:12,500 --> 00:00:16,500\n"));
    // The input is left alone
    assert_eq!(fs::read_to_string(&input)?, common::SAMPLE_SRT);

    Ok(())
}

#[test]
fn test_shiftFile_pastZero_shouldFailWithoutWriting() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_subtitle(temp_dir.path(), "movie.srt")?;
    let output = temp_dir.path().join("out.srt");

    let result = controller().shift_file(&input, &output, -5_000);

    let error = AppError::from(result.unwrap_err());
    assert!(matches!(error, AppError::Subtitle(SubtitleError::InvalidEntry(_))));
    assert!(!output.exists());

    Ok(())
}

#[test]
fn test_scaleFile_shouldScaleAndKeepOrder() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_subtitle(temp_dir.path(), "movie.srt")?;
    let output = temp_dir.path().join("scaled.srt");
    let controller = controller();

    controller.scale_file(&input, &output, 0.5)?;

    let stream = controller.load(&output)?;
    let starts: Vec<u64> = stream.entries().map(|e| e.start().as_millis()).collect();
    assert_eq!(starts, vec![500, 2_500, 5_000]);
    assert_eq!(stream.duration(), Some(Timecode::from(7_000)));

    Ok(())
}

#[test]
fn test_shiftToZeroFile_shouldStartAtZero() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_subtitle(temp_dir.path(), "movie.srt")?;
    let output = temp_dir.path().join("zero.srt");
    let controller = controller();

    controller.shift_to_zero_file(&input, &output)?;

    let stream = controller.load(&output)?;
    assert_eq!(stream.get(0).unwrap().start(), Timecode::ZERO);
    assert_eq!(stream.get(2).unwrap().start(), Timecode::from(9_000));

    Ok(())
}

#[test]
fn test_renumberFile_shouldFixGappyIndicesInPlace() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_file(
        temp_dir.path(),
        "gappy.srt",
        "4\n00:00:01,000 --> 00:00:02,000\nA\n\n9\n00:00:03,000 --> 00:00:04,000\nB\n",
    )?;
    let controller = controller();

    assert_eq!(controller.check_file(&input)?.sequence_mismatches.len(), 2);

    controller.renumber_file(&input, &input)?;

    assert_eq!(
        fs::read_to_string(&input)?,
        "1\n00:00:01,000 --> 00:00:02,000\nA\n\n2\n00:00:03,000 --> 00:00:04,000\nB\n\n"
    );
    assert!(controller.check_file(&input)?.is_clean());

    Ok(())
}

#[test]
fn test_load_withMalformedFile_shouldReportParseLine() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_file(
        temp_dir.path(),
        "broken.srt",
        "1\n00:00:01.000 --> 00:00:03,500\nHello\n",
    )?;

    let error = AppError::from(controller().load(&input).unwrap_err());

    assert!(matches!(error, AppError::Subtitle(SubtitleError::ParseError { line_number: 2, .. })));
    assert_eq!(error.exit_code(), 65);

    Ok(())
}

#[test]
fn test_checkFile_withStrictParser_shouldStillReportEveryOverlap() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_file(
        temp_dir.path(),
        "overlap.srt",
        "1\n00:00:01,000 --> 00:00:05,000\nFirst line here\n\n\
         2\n00:00:02,000 --> 00:00:03,000\nSecond line\n\n\
         3\n00:00:04,000 --> 00:00:06,000\nThird line\n",
    )?;
    let controller = controller();

    let report = controller.check_file(&input)?;

    assert_eq!(report.entry_count, 3);
    assert_eq!(report.overlaps, vec![(0, 1), (0, 2)]);
    assert_eq!(report.timing.overlap_count, 2);
    assert!(!report.is_clean());
    // Editing commands keep rejecting the file
    assert!(controller.load(&input).is_err());

    Ok(())
}

#[test]
fn test_checkFolder_shouldReportUnreadableFiles() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    common::create_test_subtitle(temp_dir.path(), "good.srt")?;
    common::create_test_file(temp_dir.path(), "bad.srt", "not a subtitle\n")?;

    let folder = controller().check_folder(temp_dir.path())?;

    assert_eq!(folder.reports.len(), 1);
    assert_eq!(folder.reports[0].path, temp_dir.path().join("good.srt"));
    assert!(folder.reports[0].is_clean());
    assert_eq!(folder.failures.len(), 1);
    assert_eq!(folder.failures[0].0, temp_dir.path().join("bad.srt"));
    assert!(matches!(
        AppError::from(folder.failures.into_iter().next().unwrap().1),
        AppError::Subtitle(SubtitleError::ParseError { line_number: 1, .. })
    ));
    assert!(controller().check_folder(temp_dir.path().join("missing")).is_err());

    Ok(())
}

#[test]
fn test_checkFolder_withUnreadableFile_shouldNotBeClean() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    common::create_test_subtitle(temp_dir.path(), "good.srt")?;
    common::create_test_file(temp_dir.path(), "bad.srt", "garbage\n")?;

    let folder = controller().check_folder(temp_dir.path())?;

    assert!(!folder.is_clean());
    assert_eq!(folder.dirty_count(), 1);
    assert_eq!(folder.file_count(), 2);

    Ok(())
}

#[test]
fn test_shiftFile_withUtf16Encoding_shouldReadBackWithSameConfig() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = temp_dir.path().join("wide.srt");
    let mut bytes = vec![0xff, 0xfe];
    bytes.extend(common::SAMPLE_SRT.encode_utf16().flat_map(u16::to_le_bytes));
    fs::write(&input, bytes)?;
    let output = temp_dir.path().join("wide.shifted.srt");
    let config = Config {
        encoding: "utf-16le".to_string(),
        ..Config::default()
    };
    let controller = Controller::with_config(config)?;

    controller.shift_file(&input, &output, 1_000)?;

    assert_eq!(&fs::read(&output)?[..4], &[0xff, 0xfe, b'1', 0]);
    let stream = controller.load(&output)?;
    assert_eq!(stream.len(), 3);
    assert_eq!(stream.get(0).unwrap().start(), Timecode::from(2_000));

    Ok(())
}

#[test]
fn test_save_withCrlfAndLegacyEncoding_shouldHonourConfig() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_file(
        temp_dir.path(),
        "accents.srt",
        "1\n00:00:01,000 --> 00:00:02,000\nDéjà vu\n",
    )?;
    let output = temp_dir.path().join("legacy.srt");
    let mut config = Config::default();
    config.output.line_ending = LineEnding::CrLf;
    let reader = Controller::with_config(config.clone())?;
    config.encoding = "windows-1252".to_string();
    let writer = Controller::with_config(config)?;

    writer.save(&reader.load(&input)?, &output)?;

    assert_eq!(
        fs::read(&output)?,
        b"1\r\n00:00:01,000 --> 00:00:02,000\r\nD\xe9j\xe0 vu\r\n\r\n"
    );
    assert_eq!(writer.load(&output)?.get(0).unwrap().text(), "Déjà vu");

    Ok(())
}

#[test]
fn test_withConfig_withInvalidConfig_shouldFail() {
    let config = Config {
        encoding: "bogus".to_string(),
        ..Config::default()
    };

    assert!(Controller::with_config(config).is_err());
}
