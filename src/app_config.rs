use anyhow::{anyhow, Context, Result};
use log::{warn, LevelFilter};
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::file_utils::FileManager;
use crate::subtitle::{ParseOptions, SerializeOptions};
use crate::validation::TimecodeValidatorConfig;

/// Application configuration module
/// This module handles loading, validating and saving the settings the
/// command line tool hands to the subtitle core.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Config {
    /// How input files are parsed
    #[serde(default)]
    pub parser: ParseOptions,

    /// How output files are written
    #[serde(default)]
    pub output: SerializeOptions,

    /// Character encoding of subtitle files (any WHATWG label)
    #[serde(default = "default_encoding")]
    pub encoding: String,

    /// Timing checks run by `check`
    #[serde(default)]
    pub validation: TimecodeValidatorConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

fn default_encoding() -> String {
    "utf-8".to_string()
}

impl Config {
    /// Load a configuration file, falling back to defaults when it is missing
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            warn!("Config file not found at {:?}, using defaults", path);
            return Ok(Config::default());
        }

        let file = File::open(path)
            .with_context(|| format!("Failed to open config file: {:?}", path))?;
        let reader = BufReader::new(file);
        let config: Config = serde_json::from_reader(reader)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;

        Ok(config)
    }

    /// Write the configuration as pretty JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)
            .context("Failed to serialize config to JSON")?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write config to file: {:?}", path))?;
        Ok(())
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        FileManager::lookup_encoding(&self.encoding)?;

        let validation = &self.validation;
        if !(validation.max_cps.is_finite() && validation.max_cps > 0.0) {
            return Err(anyhow!("validation.max_cps must be a positive number"));
        }
        if validation.min_duration_ms > validation.max_duration_ms {
            return Err(anyhow!(
                "validation.min_duration_ms ({}) exceeds validation.max_duration_ms ({})",
                validation.min_duration_ms,
                validation.max_duration_ms
            ));
        }

        Ok(())
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            parser: ParseOptions::default(),
            output: SerializeOptions::default(),
            encoding: default_encoding(),
            validation: TimecodeValidatorConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}
