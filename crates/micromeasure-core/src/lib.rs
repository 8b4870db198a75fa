//! # MicroMeasure Core
//!
//! Shared building blocks for MicroMeasure: pixel-space geometry, physical
//! units and calibration, and editor settings. Nothing here knows about shapes
//! or user interaction.

pub mod error;
pub mod geometry;
pub mod settings;
pub mod units;

pub use error::{ConfigError, SettingsError, SettingsResult};
pub use geometry::{BoundingBox, Point};
pub use settings::{
    EditorSettings, HistorySettings, InteractionSettings, ProfileSettings, ScaleBarDirection,
    ScaleBarSettings,
};
pub use units::{Calibration, LengthUnit};
