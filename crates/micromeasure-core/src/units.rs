//! Physical units and pixel calibration
//!
//! Measurements are computed in pixels. A [`Calibration`] maps a reference
//! pixel length (usually a detected scale bar) onto a physical length so any
//! measurement can be reported in physical units.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Length unit of a calibrated image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LengthUnit {
    /// Uncalibrated image pixels
    #[default]
    Pixel,
    /// Nanometres
    Nanometer,
    /// Micrometres
    Micrometer,
    /// Millimetres
    Millimeter,
}

impl LengthUnit {
    /// Symbol used in measurement tables.
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Pixel => "px",
            Self::Nanometer => "nm",
            Self::Micrometer => "µm",
            Self::Millimeter => "mm",
        }
    }

    /// Symbol for an area in this unit.
    pub fn area_symbol(&self) -> String {
        format!("{}²", self.symbol())
    }
}

impl fmt::Display for LengthUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

impl FromStr for LengthUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "px" | "pixel" | "pixels" => Ok(Self::Pixel),
            "nm" | "nanometer" | "nanometre" => Ok(Self::Nanometer),
            "µm" | "um" | "micrometer" | "micrometre" | "micron" => Ok(Self::Micrometer),
            "mm" | "millimeter" | "millimetre" => Ok(Self::Millimeter),
            _ => Err(format!("Unknown length unit: {}", s)),
        }
    }
}

/// Unit string for angles.
pub const DEGREES: &str = "°";

/// Maps a pixel length onto a physical length.
///
/// All three parts are optional because an image starts uncalibrated and the
/// scale-bar detector only fills in the pixel side.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Calibration {
    pub pixels: Option<f64>,
    pub length: Option<f64>,
    pub unit: Option<LengthUnit>,
}

impl Calibration {
    pub fn new(pixels: f64, length: f64, unit: LengthUnit) -> Self {
        Self {
            pixels: Some(pixels),
            length: Some(length),
            unit: Some(unit),
        }
    }

    /// Physical units per pixel, or `None` while the calibration is incomplete.
    pub fn factor(&self) -> Option<f64> {
        match (self.pixels, self.length) {
            (Some(px), Some(len)) if px > 0.0 && len > 0.0 && px.is_finite() && len.is_finite() => {
                Some(len / px)
            }
            _ => None,
        }
    }

    /// Scaling factor, falling back to 1 (pixels) when uncalibrated.
    pub fn factor_or_unit(&self) -> f64 {
        self.factor().unwrap_or(1.0)
    }

    /// Unit the scaled values are expressed in.
    pub fn display_unit(&self) -> LengthUnit {
        match (self.factor(), self.unit) {
            (Some(_), Some(unit)) => unit,
            _ => LengthUnit::Pixel,
        }
    }
}
