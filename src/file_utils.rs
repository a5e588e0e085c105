use anyhow::{anyhow, Context, Result};
use encoding_rs::{Encoding, REPLACEMENT, UTF_16BE, UTF_16LE};
use log::{debug, warn};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use walkdir::WalkDir;

// @module: File and directory utilities

const SUBTITLE_EXTENSION: &str = "srt";

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_file()
    }

    // @checks: Directory existence
    pub fn dir_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_dir()
    }

    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.as_os_str().is_empty() && !path.exists() {
            fs::create_dir_all(path)
                .with_context(|| format!("Failed to create directory: {}", path.display()))?;
        }
        Ok(())
    }

    // @generates: Output path for an edited subtitle
    // @params: input_file, output_dir, suffix
    pub fn generate_output_path<P1: AsRef<Path>, P2: AsRef<Path>>(
        input_file: P1,
        output_dir: P2,
        suffix: &str,
    ) -> PathBuf {
        let input_file = input_file.as_ref();
        let output_dir = output_dir.as_ref();

        // Get the file stem (filename without extension)
        let stem = input_file.file_stem().unwrap_or_default();

        let mut output_filename = stem.to_string_lossy().to_string();
        output_filename.push('.');
        output_filename.push_str(suffix);
        output_filename.push('.');
        output_filename.push_str(SUBTITLE_EXTENSION);

        output_dir.join(output_filename)
    }

    /// Find `.srt` files below a directory, sorted by path
    pub fn find_subtitle_files<P: AsRef<Path>>(dir: P) -> Result<Vec<PathBuf>> {
        let mut result = Vec::new();

        for entry in WalkDir::new(dir.as_ref()).follow_links(true) {
            let entry = entry.context("Failed to read directory entry")?;
            let path = entry.path();

            if path.is_file() && Self::is_subtitle_file(path) {
                result.push(path.to_path_buf());
            }
        }

        result.sort();
        Ok(result)
    }

    /// Whether the path carries the SubRip extension
    pub fn is_subtitle_file<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref()
            .extension()
            .is_some_and(|ext| ext.to_string_lossy().eq_ignore_ascii_case(SUBTITLE_EXTENSION))
    }

    /// Read a subtitle file, decoding it with the given encoding label.
    /// A UTF-8 or UTF-16 byte-order mark takes precedence over the label.
    pub fn read_subtitle_file<P: AsRef<Path>>(path: P, encoding_label: &str) -> Result<String> {
        let path = path.as_ref();
        let encoding = Self::lookup_encoding(encoding_label)?;
        let bytes = fs::read(path)
            .with_context(|| format!("Failed to read file: {:?}", path))?;

        let (text, used, had_errors) = encoding.decode(&bytes);
        if had_errors {
            warn!(
                "Could not decode {:?} accurately with {}, some characters were replaced",
                path,
                used.name()
            );
        }
        debug!("Read {} bytes from {:?} as {}", bytes.len(), path, used.name());

        Ok(text.into_owned())
    }

    /// Write a subtitle file in the given encoding. The file is written to a
    /// temporary sibling first and renamed into place.
    pub fn write_subtitle_file<P: AsRef<Path>>(path: P, content: &str, encoding_label: &str) -> Result<()> {
        let path = path.as_ref();
        let encoding = Self::lookup_encoding(encoding_label)?;

        let bytes = Self::encode(content, encoding);

        let parent = path.parent().unwrap_or_else(|| Path::new(""));
        Self::ensure_dir(parent)?;
        let dir = if parent.as_os_str().is_empty() { Path::new(".") } else { parent };

        let mut temp = NamedTempFile::new_in(dir)
            .with_context(|| format!("Failed to create temporary file in {:?}", dir))?;
        temp.write_all(&bytes)
            .with_context(|| format!("Failed to write subtitle data for {:?}", path))?;
        temp.persist(path)
            .map_err(|e| anyhow!("Failed to move subtitle file into place at {:?}: {}", path, e.error))?;

        debug!("Wrote {} bytes to {:?} as {}", bytes.len(), path, encoding.name());
        Ok(())
    }

    /// Resolve an encoding label to an encoding files can be both read and
    /// written in
    pub fn lookup_encoding(label: &str) -> Result<&'static Encoding> {
        let encoding = Encoding::for_label(label.as_bytes())
            .ok_or_else(|| anyhow!("Unknown character encoding: {}", label))?;
        if encoding == REPLACEMENT {
            return Err(anyhow!("Character encoding {} cannot be used for subtitle files", label));
        }
        Ok(encoding)
    }

    // encoding_rs only encodes to ASCII-compatible encodings and falls back to
    // UTF-8 for UTF-16, so UTF-16 is written here with a byte-order mark.
    fn encode(content: &str, encoding: &'static Encoding) -> Vec<u8> {
        let utf16 = |to_bytes: fn(u16) -> [u8; 2]| -> Vec<u8> {
            std::iter::once('\u{feff}' as u16)
                .chain(content.encode_utf16())
                .flat_map(to_bytes)
                .collect()
        };

        if encoding == UTF_16LE {
            return utf16(u16::to_le_bytes);
        }
        if encoding == UTF_16BE {
            return utf16(u16::to_be_bytes);
        }

        let (bytes, used, had_unmappable) = encoding.encode(content);
        if had_unmappable {
            warn!(
                "Some characters cannot be represented in {} and were written as HTML entities",
                used.name()
            );
        }
        bytes.into_owned()
    }
}
