//! Engine configuration.
//!
//! Layers, later ones overriding earlier ones:
//! 1. Built-in defaults
//! 2. Global: $XDG_CONFIG_HOME/texlua/config.toml
//! 3. Project: ./texlua.toml (or the file given with `--config`, replacing 2 and 3)
//! 4. The `SOURCE_DATE_EPOCH` environment variable
//! 5. Command line flags
//! 6. The `texconfig` table filled in by the startup script
//!
//! Example texlua.toml:
//! ```toml
//! formatname = "lualatex"
//! interaction = "nonstopmode"
//! file_line_error = true
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// How much the engine stops to ask when it runs into trouble.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
pub enum Interaction {
    #[serde(rename = "batchmode")]
    Batch,
    #[serde(rename = "nonstopmode")]
    NonStop,
    #[serde(rename = "scrollmode")]
    Scroll,
    #[default]
    #[serde(rename = "errorstopmode")]
    ErrorStop,
}

impl Interaction {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "batchmode" => Some(Self::Batch),
            "nonstopmode" => Some(Self::NonStop),
            "scrollmode" => Some(Self::Scroll),
            "errorstopmode" => Some(Self::ErrorStop),
            _ => None,
        }
    }

    /// Numeric level as scripts see it, 0 (batch) to 3 (errorstop).
    pub fn level(self) -> i64 {
        self as i64
    }

    /// Levels outside 0..=3 fall back to errorstop.
    pub fn from_level(level: i64) -> Self {
        match level {
            0 => Self::Batch,
            1 => Self::NonStop,
            2 => Self::Scroll,
            3 => Self::ErrorStop,
            other => {
                tracing::debug!(level = other, "interaction level out of range, using errorstopmode");
                Self::ErrorStop
            }
        }
    }
}

/// Interaction as written in a layer: a mode name or a numeric level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum InteractionSetting {
    Name(Interaction),
    Level(i64),
}

impl InteractionSetting {
    pub fn resolve(self) -> Interaction {
        match self {
            InteractionSetting::Name(mode) => mode,
            InteractionSetting::Level(level) => Interaction::from_level(level),
        }
    }
}

/// Fully resolved configuration handed to the engine.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct EngineConfig {
    pub formatname: Option<String>,
    pub jobname: Option<String>,
    /// Report opened files on the terminal.
    pub trace_file_names: bool,
    pub file_line_error: bool,
    pub halt_on_error: bool,
    pub interaction: Interaction,
    /// Seconds since the epoch, negative or absent means "now".
    pub start_time: Option<i64>,
    #[serde(rename = "SOURCE_DATE_EPOCH")]
    pub source_date_epoch: Option<i64>,
    pub use_utc_time: bool,
    /// Write a `.fls` file listing every input.
    pub recorder: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            formatname: None,
            jobname: None,
            trace_file_names: true,
            file_line_error: false,
            halt_on_error: false,
            interaction: Interaction::default(),
            start_time: None,
            source_date_epoch: None,
            use_utc_time: false,
            recorder: false,
        }
    }
}

/// One configuration source. Only the fields it sets override.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ConfigLayer {
    pub formatname: Option<String>,
    pub jobname: Option<String>,
    pub trace_file_names: Option<bool>,
    pub file_line_error: Option<bool>,
    pub halt_on_error: Option<bool>,
    pub interaction: Option<InteractionSetting>,
    pub start_time: Option<i64>,
    #[serde(rename = "SOURCE_DATE_EPOCH")]
    pub source_date_epoch: Option<i64>,
    pub use_utc_time: Option<bool>,
    pub recorder: Option<bool>,
}

impl EngineConfig {
    /// Load defaults and the configuration files.
    ///
    /// With `explicit`, that file replaces the global and project files and
    /// must exist.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let epoch = std::env::var("SOURCE_DATE_EPOCH").ok();
        Self::resolve(
            Self::global_config_path().as_deref(),
            Path::new("texlua.toml"),
            explicit,
            epoch.as_deref(),
        )
    }

    fn resolve(
        global: Option<&Path>,
        project: &Path,
        explicit: Option<&Path>,
        epoch: Option<&str>,
    ) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        match explicit {
            Some(path) => config.apply(Self::read_layer(path)?),
            None => {
                if let Some(global) = global {
                    if let Some(layer) = Self::load_file(global)? {
                        config.apply(layer);
                    }
                }
                if let Some(layer) = Self::load_file(project)? {
                    config.apply(layer);
                }
            }
        }

        if let Some(epoch) = epoch {
            match epoch.trim().parse::<i64>() {
                Ok(seconds) => config.source_date_epoch = Some(seconds),
                Err(_) => tracing::warn!("ignoring invalid SOURCE_DATE_EPOCH: {:?}", epoch),
            }
        }

        Ok(config)
    }

    /// Get the global config path.
    fn global_config_path() -> Option<PathBuf> {
        let config_home = std::env::var("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .ok()
            .or_else(dirs::config_dir)?;
        Some(config_home.join("texlua").join("config.toml"))
    }

    /// Load an optional layer; a missing file is not an error.
    fn load_file(path: &Path) -> Result<Option<ConfigLayer>, ConfigError> {
        if !path.is_file() {
            return Ok(None);
        }
        Self::read_layer(path).map(Some)
    }

    fn read_layer(path: &Path) -> Result<ConfigLayer, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "loaded config file");
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Override every field the layer sets.
    pub fn apply(&mut self, layer: ConfigLayer) {
        if layer.formatname.is_some() {
            self.formatname = layer.formatname;
        }
        if layer.jobname.is_some() {
            self.jobname = layer.jobname;
        }
        if let Some(value) = layer.trace_file_names {
            self.trace_file_names = value;
        }
        if let Some(value) = layer.file_line_error {
            self.file_line_error = value;
        }
        if let Some(value) = layer.halt_on_error {
            self.halt_on_error = value;
        }
        if let Some(setting) = layer.interaction {
            self.interaction = setting.resolve();
        }
        if layer.start_time.is_some() {
            self.start_time = layer.start_time;
        }
        if layer.source_date_epoch.is_some() {
            self.source_date_epoch = layer.source_date_epoch;
        }
        if let Some(value) = layer.use_utc_time {
            self.use_utc_time = value;
        }
        if let Some(value) = layer.recorder {
            self.recorder = value;
        }
    }

    /// Start time to stamp the job with, `None` for the wall clock.
    pub fn effective_start_time(&self) -> Option<i64> {
        self.start_time
            .filter(|&t| t >= 0)
            .or(self.source_date_epoch.filter(|&t| t >= 0))
    }
}
