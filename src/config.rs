//! Configuration file support.
//!
//! A labelling session can be described in a JSON file: the classes, the
//! keymap, navigation keys, labelling mode and presentation options. The file
//! seeds a [`LabellerBuilder`]; images are always supplied separately.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::keybindings::{KeymapSpec, NavigationKeys};
use crate::labeller::LabellerBuilder;
use crate::presenter::PresentationOptions;
use crate::source::ImageSource;

/// Log level setting for the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Show only errors
    Error,
    /// Show errors and warnings
    Warn,
    /// Show errors, warnings, and info messages
    #[default]
    Info,
    /// Show debug-level logging
    Debug,
    /// Show all log messages including trace
    Trace,
}

impl LogLevel {
    /// Convert to log crate's LevelFilter.
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Current configuration file format version.
/// Increment this when making breaking changes to the config format.
pub const CONFIG_VERSION: u32 = 1;

/// Labelling session configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabellerConfig {
    /// Version of the configuration file format
    pub version: u32,

    /// Available classes, in keymap order
    pub classes: Vec<String>,

    /// Class keymap: "digits", "row", or a list of keys
    #[serde(default)]
    pub keymap: KeymapSpec,

    /// Previous/next image keys
    #[serde(default)]
    pub navigation: NavigationKeys,

    /// Whether labelling an image moves to the next one (exclusive mode only)
    #[serde(default = "default_labelling_advances_image")]
    pub labelling_advances_image: bool,

    /// Allow several classes per image
    #[serde(default)]
    pub multiclass: bool,

    /// Log verbosity level
    #[serde(default)]
    pub log_level: LogLevel,

    /// Options passed through to the presenter
    #[serde(default)]
    pub presentation: PresentationOptions,
}

fn default_labelling_advances_image() -> bool {
    true
}

impl LabellerConfig {
    /// Create a configuration for the given classes with default settings.
    pub fn new(classes: Vec<String>) -> Self {
        Self {
            version: CONFIG_VERSION,
            classes,
            keymap: KeymapSpec::default(),
            navigation: NavigationKeys::default(),
            labelling_advances_image: default_labelling_advances_image(),
            multiclass: false,
            log_level: LogLevel::default(),
            presentation: PresentationOptions::new(),
        }
    }

    /// Serialize the configuration to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigFileError> {
        let config: Self = serde_json::from_str(json)?;

        // Validate version compatibility
        if config.version > CONFIG_VERSION {
            return Err(ConfigFileError::VersionTooNew {
                file_version: config.version,
                supported_version: CONFIG_VERSION,
            });
        }

        Ok(config)
    }

    /// Seed a labeller builder with this configuration.
    pub fn builder<I: Clone>(&self, images: ImageSource<I>) -> LabellerBuilder<I, String> {
        LabellerBuilder::new(images, self.classes.clone())
            .keymap(self.keymap.clone())
            .navigation(self.navigation.clone())
            .labelling_advances_image(self.labelling_advances_image)
            .multiclass(self.multiclass)
            .presentation_options(self.presentation.clone())
    }

    /// Get the default filename for the config file.
    pub fn default_filename() -> &'static str {
        "image-labeller.json"
    }

    /// Get the default config file path.
    pub fn default_path() -> Option<PathBuf> {
        // Try to use XDG config directory, fall back to home directory
        if let Some(config_dir) = dirs::config_dir() {
            Some(config_dir.join("image-labeller").join(Self::default_filename()))
        } else {
            dirs::home_dir().map(|home_dir| {
                home_dir
                    .join(".config")
                    .join("image-labeller")
                    .join(Self::default_filename())
            })
        }
    }

    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self, ConfigFileError> {
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Try to load configuration from the default path.
    /// Returns None if the file doesn't exist or can't be read.
    pub fn load_from_default_path() -> Option<Self> {
        let path = Self::default_path()?;
        if !path.exists() {
            log::debug!("No config file found at {:?}", path);
            return None;
        }

        match Self::load(&path) {
            Ok(config) => Some(config),
            Err(e) => {
                log::warn!("Failed to load config file {:?}: {}", path, e);
                None
            }
        }
    }

    /// Save configuration to a file, creating parent directories if needed.
    pub fn save(&self, path: &Path) -> Result<(), ConfigFileError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = self.to_json()?;
        std::fs::write(path, json)?;
        log::info!("Saved configuration to {:?}", path);
        Ok(())
    }
}

/// Errors that can occur when loading or saving configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigFileError {
    /// JSON parsing error
    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] serde_json::Error),

    /// Configuration version is newer than supported
    #[error(
        "Configuration file version {file_version} is newer than supported version {supported_version}"
    )]
    VersionTooNew {
        file_version: u32,
        supported_version: u32,
    },

    /// I/O error when reading/writing config
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}
