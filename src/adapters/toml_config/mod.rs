// TOML config adapter - Configuration loaded from TOML files and environment

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::info;

use crate::adapters::tracing_log::LogLevel;
use crate::domain::errors::*;
use crate::domain::model::ConvertOptions;

/// Config file looked up in the current directory when none is given
pub const DEFAULT_CONFIG_FILE: &str = "vid2gif.toml";

/// Application configuration
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub tools: ToolsConfig,
    pub conversion: ConversionConfig,
    pub logging: LoggingConfig,
}

/// External executables
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToolsConfig {
    pub ffmpeg: String,
    pub ffprobe: String,
    pub gifski: String,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            ffmpeg: "ffmpeg".to_string(),
            ffprobe: "ffprobe".to_string(),
            gifski: "gifski".to_string(),
        }
    }
}

/// Conversion defaults
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConversionConfig {
    pub fps: f64,
    pub quality: u8,
    pub max_width: u32,
    /// Parent directory for working directories
    pub temp_dir: Option<PathBuf>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        let options = ConvertOptions::default();
        Self {
            fps: options.fps,
            quality: options.quality,
            max_width: options.max_width,
            temp_dir: None,
        }
    }
}

/// Logging and progress display
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
    pub progress: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            json: false,
            progress: true,
        }
    }
}

impl AppConfig {
    /// Parse configuration from TOML text; missing keys take defaults
    pub fn from_toml_str(content: &str) -> Result<Self, DomainError> {
        toml::from_str(content)
            .map_err(|e| DomainError::Config(format!("Failed to parse TOML config: {}", e)))
    }

    /// Load configuration from a file
    pub fn load_file(path: &Path) -> Result<Self, DomainError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            DomainError::Config(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;
        info!(path = %path.display(), "Loaded configuration file");
        Self::from_toml_str(&content)
    }

    /// Apply `VID2GIF_*` overrides read through `lookup`.
    ///
    /// Returns the number of overrides applied.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<usize, DomainError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut applied = 0;

        for (var, slot) in [
            ("VID2GIF_FFMPEG", &mut self.tools.ffmpeg),
            ("VID2GIF_FFPROBE", &mut self.tools.ffprobe),
            ("VID2GIF_GIFSKI", &mut self.tools.gifski),
            ("VID2GIF_LOG_LEVEL", &mut self.logging.level),
        ] {
            if let Some(value) = lookup(var) {
                *slot = value;
                applied += 1;
            }
        }

        if let Some(value) = lookup("VID2GIF_FPS") {
            self.conversion.fps = value
                .trim()
                .parse()
                .map_err(|e| DomainError::Config(format!("Invalid VID2GIF_FPS '{}': {}", value, e)))?;
            applied += 1;
        }
        if let Some(value) = lookup("VID2GIF_QUALITY") {
            self.conversion.quality = value.trim().parse().map_err(|e| {
                DomainError::Config(format!("Invalid VID2GIF_QUALITY '{}': {}", value, e))
            })?;
            applied += 1;
        }

        Ok(applied)
    }

    /// Validate the merged configuration
    pub fn validate(&self) -> Result<(), DomainError> {
        LogLevel::parse(&self.logging.level)
            .map_err(|e| DomainError::Config(e.to_string()))?;

        for (name, value) in [
            ("ffmpeg", &self.tools.ffmpeg),
            ("ffprobe", &self.tools.ffprobe),
            ("gifski", &self.tools.gifski),
        ] {
            if value.trim().is_empty() {
                return Err(DomainError::Config(format!(
                    "Tool path for {} cannot be empty",
                    name
                )));
            }
        }

        self.convert_options(false)
            .validate()
            .map_err(|e| DomainError::Config(e.to_string()))
    }

    /// Conversion options built from the configured defaults
    pub fn convert_options(&self, keep_original_size: bool) -> ConvertOptions {
        ConvertOptions {
            fps: self.conversion.fps,
            keep_original_size,
            quality: self.conversion.quality,
            max_width: self.conversion.max_width,
        }
    }
}
