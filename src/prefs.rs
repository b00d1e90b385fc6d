//! User preferences, stored as JSON in the platform config directory.

use eframe::egui;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::caliper::{CaliperShape, CaliperStyle, MeasurementMode};
use crate::canvas::OverlayStyle;
use crate::error::{Result, ViewerError};

const APP_DIR: &str = "eepee";
const PREFS_FILE: &str = "preferences.json";

/// Log verbosity used when `RUST_LOG` is not set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn name(&self) -> &'static str {
        match self {
            LogLevel::Error => "Error",
            LogLevel::Warn => "Warn",
            LogLevel::Info => "Info",
            LogLevel::Debug => "Debug",
            LogLevel::Trace => "Trace",
        }
    }

    pub fn all() -> &'static [LogLevel] {
        &[
            LogLevel::Error,
            LogLevel::Warn,
            LogLevel::Info,
            LogLevel::Debug,
            LogLevel::Trace,
        ]
    }

    /// Filter string understood by `env_logger`.
    pub fn filter(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preferences {
    #[serde(default = "default_caliper_color")]
    pub caliper_color: [u8; 3],

    /// Colour of the caliper part under the pointer
    #[serde(default = "default_active_caliper_color")]
    pub active_caliper_color: [u8; 3],

    #[serde(default = "default_caliper_width")]
    pub caliper_width: f32,

    #[serde(default)]
    pub caliper_shape: CaliperShape,

    #[serde(default)]
    pub measurement: MeasurementMode,

    #[serde(default = "default_doodle_color")]
    pub doodle_color: [u8; 3],

    #[serde(default = "default_doodle_width")]
    pub doodle_width: f32,

    /// Where the open dialog starts
    #[serde(default)]
    pub default_dir: Option<PathBuf>,

    /// Start the open dialog in the last directory used instead
    #[serde(default = "default_true")]
    pub reuse_last_dir: bool,

    #[serde(default)]
    pub last_dir: Option<PathBuf>,

    #[serde(default = "default_true")]
    pub show_fullscreen_help: bool,

    #[serde(default)]
    pub log_level: LogLevel,
}

fn default_caliper_color() -> [u8; 3] {
    [255, 0, 0]
}

fn default_active_caliper_color() -> [u8; 3] {
    [0, 120, 255]
}

fn default_caliper_width() -> f32 {
    1.0
}

fn default_doodle_color() -> [u8; 3] {
    [0, 0, 255]
}

fn default_doodle_width() -> f32 {
    2.0
}

fn default_true() -> bool {
    true
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            caliper_color: default_caliper_color(),
            active_caliper_color: default_active_caliper_color(),
            caliper_width: default_caliper_width(),
            caliper_shape: CaliperShape::default(),
            measurement: MeasurementMode::default(),
            doodle_color: default_doodle_color(),
            doodle_width: default_doodle_width(),
            default_dir: None,
            reuse_last_dir: true,
            last_dir: None,
            show_fullscreen_help: true,
            log_level: LogLevel::default(),
        }
    }
}

fn color([r, g, b]: [u8; 3]) -> egui::Color32 {
    egui::Color32::from_rgb(r, g, b)
}

impl Preferences {
    /// `<config dir>/eepee/preferences.json`, if the platform has one.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(APP_DIR).join(PREFS_FILE))
    }

    /// Load from the default location; anything unreadable gives defaults.
    pub fn load_or_default() -> Self {
        let Some(path) = Self::default_path() else {
            return Self::default();
        };
        match Self::load(&path) {
            Ok(prefs) => prefs,
            Err(ViewerError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                Self::default()
            }
            Err(e) => {
                log::warn!("Using default preferences: {e}");
                Self::default()
            }
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&data)?)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_string_pretty(self)?;
        std::fs::write(path, data).map_err(|source| ViewerError::Persistence {
            path: path.to_path_buf(),
            source,
        })?;
        log::debug!("Saved preferences to {}", path.display());
        Ok(())
    }

    pub fn save_to_default(&self) -> Result<()> {
        match Self::default_path() {
            Some(path) => self.save(&path),
            None => {
                log::warn!("No config directory; preferences not saved");
                Ok(())
            }
        }
    }

    /// Directory the open dialog should start in.
    pub fn start_dir(&self) -> Option<&Path> {
        if self.reuse_last_dir {
            self.last_dir.as_deref().or(self.default_dir.as_deref())
        } else {
            self.default_dir.as_deref()
        }
    }

    pub fn overlay_style(&self) -> OverlayStyle {
        OverlayStyle {
            caliper: CaliperStyle {
                stroke: egui::Stroke::new(self.caliper_width, color(self.caliper_color)),
                active: egui::Stroke::new(self.caliper_width, color(self.active_caliper_color)),
                mode: self.measurement,
            },
            doodle: egui::Stroke::new(self.doodle_width, color(self.doodle_color)),
            ..OverlayStyle::default()
        }
    }
}
