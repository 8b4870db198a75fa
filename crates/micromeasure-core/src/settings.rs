//! Editor configuration
//!
//! Settings are grouped into sections and every field has a default, so a
//! partial file (or none at all) is always usable. Files are JSON or TOML,
//! chosen by extension.

use crate::error::{ConfigError, SettingsError, SettingsResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Axis along which a scale bar is measured
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScaleBarDirection {
    /// Measure the x extent
    #[default]
    Horizontal,
    /// Measure the y extent
    Vertical,
}

impl fmt::Display for ScaleBarDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Horizontal => write!(f, "horizontal"),
            Self::Vertical => write!(f, "vertical"),
        }
    }
}

/// Pointer and keyboard behaviour of the canvas
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionSettings {
    /// Pick radius for handles and outlines, in image pixels
    pub hit_tolerance_px: f64,
    /// Pointer travel below which a press/release counts as a click
    pub min_drag_distance_px: f64,
    /// Step used by the angle-snap modifier
    pub snap_angle_degrees: f64,
    /// Key that starts a new trailing point on the selected polyline
    pub append_point_key: char,
}

impl Default for InteractionSettings {
    fn default() -> Self {
        Self {
            hit_tolerance_px: 5.0,
            min_drag_distance_px: 2.0,
            snap_angle_degrees: 45.0,
            append_point_key: 'a',
        }
    }
}

/// Intensity profile sampling
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileSettings {
    /// 0 = nearest, 1 = bilinear, 3 = bicubic
    pub interpolation_order: u8,
    pub samples_per_pixel: f64,
}

impl Default for ProfileSettings {
    fn default() -> Self {
        Self {
            interpolation_order: 1,
            samples_per_pixel: 1.0,
        }
    }
}

/// Scale-bar detection defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScaleBarSettings {
    /// Maximum per-channel colour difference accepted by the flood fill
    pub default_threshold: u8,
    pub default_direction: ScaleBarDirection,
}

impl Default for ScaleBarSettings {
    fn default() -> Self {
        Self {
            default_threshold: 30,
            default_direction: ScaleBarDirection::Horizontal,
        }
    }
}

/// Undo history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistorySettings {
    pub max_depth: usize,
}

impl Default for HistorySettings {
    fn default() -> Self {
        Self { max_depth: 100 }
    }
}

/// Complete editor configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorSettings {
    pub interaction: InteractionSettings,
    pub profile: ProfileSettings,
    pub scale_bar: ScaleBarSettings,
    pub history: HistorySettings,
}

impl EditorSettings {
    /// Default location of the settings file in the platform config directory.
    pub fn default_path() -> SettingsResult<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join("micromeasure").join("settings.toml"))
            .ok_or_else(|| {
                SettingsError::ConfigDirectory("no platform config directory".to_string())
            })
    }

    /// Loads settings from a `.json` or `.toml` file and validates them.
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| SettingsError::LoadError(format!("{}: {}", path.display(), e)))?;

        let settings: Self = match extension(path).as_deref() {
            Some("json") => serde_json::from_str(&content)?,
            Some("toml") => toml::from_str(&content)?,
            other => {
                return Err(ConfigError::UnsupportedFormat(other.unwrap_or("").to_string()).into())
            }
        };

        settings.validate()?;
        tracing::debug!("Loaded editor settings from {}", path.display());
        Ok(settings)
    }

    /// Loads settings if the file exists, otherwise returns defaults.
    pub fn load_or_default(path: &Path) -> SettingsResult<Self> {
        if path.exists() {
            Self::load_from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Saves settings as `.json` or `.toml`, creating parent directories.
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;

        let content = match extension(path).as_deref() {
            Some("json") => serde_json::to_string_pretty(self)?,
            Some("toml") => toml::to_string_pretty(self)?,
            other => {
                return Err(ConfigError::UnsupportedFormat(other.unwrap_or("").to_string()).into())
            }
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)
            .map_err(|e| SettingsError::SaveError(format!("{}: {}", path.display(), e)))?;
        Ok(())
    }

    /// Rejects values the editor cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let i = &self.interaction;
        check(
            "interaction.hit_tolerance_px",
            i.hit_tolerance_px,
            i.hit_tolerance_px.is_finite() && i.hit_tolerance_px >= 0.0,
        )?;
        check(
            "interaction.min_drag_distance_px",
            i.min_drag_distance_px,
            i.min_drag_distance_px.is_finite() && i.min_drag_distance_px >= 0.0,
        )?;
        check(
            "interaction.snap_angle_degrees",
            i.snap_angle_degrees,
            i.snap_angle_degrees > 0.0 && i.snap_angle_degrees <= 180.0,
        )?;
        check(
            "profile.interpolation_order",
            self.profile.interpolation_order,
            matches!(self.profile.interpolation_order, 0 | 1 | 3),
        )?;
        check(
            "profile.samples_per_pixel",
            self.profile.samples_per_pixel,
            self.profile.samples_per_pixel.is_finite() && self.profile.samples_per_pixel > 0.0,
        )?;
        check(
            "history.max_depth",
            self.history.max_depth,
            self.history.max_depth > 0,
        )?;
        Ok(())
    }

    /// Snap step in radians.
    pub fn snap_step(&self) -> f64 {
        self.interaction.snap_angle_degrees.to_radians()
    }
}

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}

fn check(key: &str, value: impl fmt::Display, ok: bool) -> Result<(), ConfigError> {
    if ok {
        Ok(())
    } else {
        Err(ConfigError::ValueOutOfRange {
            key: key.to_string(),
            value: value.to_string(),
        })
    }
}
