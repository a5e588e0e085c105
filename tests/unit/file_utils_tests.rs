/*!
 * Tests for file system helpers and encodings
 */

use anyhow::Result;
use std::fs;
use std::path::Path;

use srtkit::file_utils::FileManager;
use crate::common;

#[test]
fn test_existsChecks_shouldTellFilesFromDirectories() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let file = common::create_test_subtitle(temp_dir.path(), "movie.srt")?;

    assert!(FileManager::file_exists(&file));
    assert!(!FileManager::dir_exists(&file));
    assert!(FileManager::dir_exists(temp_dir.path()));
    assert!(!FileManager::file_exists(temp_dir.path().join("missing.srt")));

    Ok(())
}

#[test]
fn test_ensureDir_shouldCreateNestedDirectories() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let nested = temp_dir.path().join("a").join("b");

    FileManager::ensure_dir(&nested)?;
    FileManager::ensure_dir(&nested)?;

    assert!(FileManager::dir_exists(&nested));

    Ok(())
}

#[test]
fn test_generateOutputPath_shouldInsertSuffixBeforeExtension() {
    let path = FileManager::generate_output_path("/videos/movie.en.srt", "/out", "shifted");

    assert_eq!(path, Path::new("/out/movie.en.shifted.srt"));
}

#[test]
fn test_findSubtitleFiles_shouldWalkRecursivelyAndSort() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let root = temp_dir.path();
    fs::create_dir(root.join("season1"))?;
    common::create_test_subtitle(root, "b.srt")?;
    common::create_test_subtitle(&root.join("season1"), "a.SRT")?;
    common::create_test_file(root, "notes.txt", "not a subtitle")?;

    let files = FileManager::find_subtitle_files(root)?;

    assert_eq!(files, vec![root.join("b.srt"), root.join("season1").join("a.SRT")]);

    Ok(())
}

#[test]
fn test_readSubtitleFile_withLegacyEncoding_shouldDecode() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = temp_dir.path().join("latin.srt");
    // "Café €5" in ISO-8859-15
    fs::write(&path, b"1\n00:00:01,000 --> 00:00:02,000\nCaf\xe9 \xa45\n")?;

    let text = FileManager::read_subtitle_file(&path, "iso-8859-15")?;

    assert!(text.ends_with("Café €5\n"));

    Ok(())
}

#[test]
fn test_readSubtitleFile_withBom_shouldPreferBomOverLabel() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = temp_dir.path().join("bom.srt");
    let mut bytes = vec![0xef, 0xbb, 0xbf];
    bytes.extend_from_slice("1\n00:00:01,000 --> 00:00:02,000\nÜber\n".as_bytes());
    fs::write(&path, bytes)?;

    let text = FileManager::read_subtitle_file(&path, "windows-1252")?;

    assert!(text.starts_with('1'));
    assert!(text.contains("Über"));

    Ok(())
}

#[test]
fn test_writeSubtitleFile_shouldEncodeAndReplaceContent() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = temp_dir.path().join("out").join("written.srt");

    FileManager::write_subtitle_file(&path, "old", "utf-8")?;
    FileManager::write_subtitle_file(&path, "Señor", "windows-1252")?;

    assert_eq!(fs::read(&path)?, b"Se\xf1or");
    assert_eq!(FileManager::read_subtitle_file(&path, "windows-1252")?, "Señor");

    Ok(())
}

#[test]
fn test_readSubtitleFile_withUnknownEncoding_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_subtitle(temp_dir.path(), "movie.srt")?;

    let result = FileManager::read_subtitle_file(&path, "no-such-encoding");

    assert!(result.unwrap_err().to_string().contains("no-such-encoding"));

    Ok(())
}

#[test]
fn test_writeSubtitleFile_withUtf16_shouldWriteUtf16WithBom() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let little = temp_dir.path().join("le.srt");
    let big = temp_dir.path().join("be.srt");

    FileManager::write_subtitle_file(&little, "1\né", "utf-16le")?;
    FileManager::write_subtitle_file(&big, "1\né", "utf-16be")?;

    assert_eq!(fs::read(&little)?, vec![0xff, 0xfe, b'1', 0, b'\n', 0, 0xe9, 0]);
    assert_eq!(fs::read(&big)?, vec![0xfe, 0xff, 0, b'1', 0, b'\n', 0, 0xe9]);
    assert_eq!(FileManager::read_subtitle_file(&little, "utf-16le")?, "1\né");
    assert_eq!(FileManager::read_subtitle_file(&big, "utf-16be")?, "1\né");

    Ok(())
}

#[test]
fn test_lookupEncoding_withReplacementEncoding_shouldFail() {
    assert!(FileManager::lookup_encoding("iso-2022-kr").is_err());
    assert!(FileManager::lookup_encoding("utf-16le").is_ok());
    assert!(FileManager::lookup_encoding("latin1").is_ok());
}
