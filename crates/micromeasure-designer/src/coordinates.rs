//! Coordinate services: the user origin and quarter-turn image rotation.
//!
//! Positions live in continuous pixel space where pixel `(i, j)` covers
//! `[i, i + 1) × [j, j + 1)`. Rotating an image by a quarter turn is then an
//! exact map of that space onto the rotated image's space.

use image::{imageops, RgbImage};
use serde::{Deserialize, Serialize};

use micromeasure_core::geometry::QUARTER_TURN;
use micromeasure_core::Point;

/// Direction of a quarter-turn image rotation as seen on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RotationDirection {
    Clockwise,
    CounterClockwise,
}

impl RotationDirection {
    /// Signed degrees, clockwise positive.
    pub fn degrees(&self) -> i32 {
        match self {
            Self::Clockwise => 90,
            Self::CounterClockwise => -90,
        }
    }

    pub fn inverse(&self) -> Self {
        match self {
            Self::Clockwise => Self::CounterClockwise,
            Self::CounterClockwise => Self::Clockwise,
        }
    }

    /// Change applied to shape angles, which turn counter-clockwise positive.
    pub fn angle_delta(&self) -> f64 {
        match self {
            Self::Clockwise => -QUARTER_TURN,
            Self::CounterClockwise => QUARTER_TURN,
        }
    }

    /// Maps a position in an image of `size` (before rotation) into the rotated image.
    pub fn map_point(&self, p: Point, (width, height): (u32, u32)) -> Point {
        match self {
            Self::Clockwise => Point::new(height as f64 - p.y, p.x),
            Self::CounterClockwise => Point::new(p.y, width as f64 - p.x),
        }
    }
}

/// Rotation in degrees reduced to `[0, 360)`, clockwise positive.
pub fn normalize_degrees(degrees: i32) -> i32 {
    degrees.rem_euclid(360)
}

/// Rotates a raster by a quarter turn.
pub fn rotate_image(image: &RgbImage, direction: RotationDirection) -> RgbImage {
    match direction {
        RotationDirection::Clockwise => imageops::rotate90(image),
        RotationDirection::CounterClockwise => imageops::rotate270(image),
    }
}

/// Applies a stored rotation (multiple of 90°, clockwise positive) to an
/// unrotated source image.
pub fn apply_rotation(source: &RgbImage, degrees: i32) -> RgbImage {
    match normalize_degrees(degrees) {
        90 => imageops::rotate90(source),
        180 => imageops::rotate180(source),
        270 => imageops::rotate270(source),
        _ => source.clone(),
    }
}

/// Position relative to the user origin.
pub fn to_origin_relative(p: Point, origin: Point) -> Point {
    p - origin
}

/// Absolute position from an origin-relative one.
pub fn from_origin_relative(p: Point, origin: Point) -> Point {
    p + origin
}
