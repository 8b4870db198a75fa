//! Intensity profiles sampled along a shape's medial path.
//!
//! Sampling works on a single-channel `f64` copy of the image. Out-of-range
//! coordinates are clamped to the nearest edge pixel so profiles that touch
//! the border stay defined.

use image::RgbImage;

use micromeasure_core::geometry::local_axes;
use micromeasure_core::Point;

/// Interpolation used between pixel centres.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Interpolation {
    /// Order 0
    Nearest,
    /// Order 1
    #[default]
    Bilinear,
    /// Order 3, Catmull-Rom
    Bicubic,
}

impl Interpolation {
    /// Maps a spline order onto the closest supported interpolation.
    pub fn from_order(order: u8) -> Self {
        match order {
            0 => Self::Nearest,
            1 | 2 => Self::Bilinear,
            _ => Self::Bicubic,
        }
    }
}

/// Sampling parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProfileOptions {
    pub interpolation: Interpolation,
    /// Samples per pixel of path length
    pub samples_per_pixel: f64,
    /// Subtracted from sample coordinates before they are reported
    pub origin: Point,
}

impl Default for ProfileOptions {
    fn default() -> Self {
        Self {
            interpolation: Interpolation::Bilinear,
            samples_per_pixel: 1.0,
            origin: Point::ORIGIN,
        }
    }
}

/// Sampled intensities and the (origin-relative) position of each sample.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct IntensityProfile {
    pub values: Vec<f64>,
    pub coordinates: Vec<Point>,
}

impl IntensityProfile {
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }
}

/// Grey-level image used for profile sampling.
#[derive(Debug, Clone, PartialEq)]
pub struct IntensityImage {
    width: u32,
    height: u32,
    data: Vec<f64>,
}

impl IntensityImage {
    /// Builds from raw row-major values. Returns `None` if the length does not match.
    pub fn new(width: u32, height: u32, data: Vec<f64>) -> Option<Self> {
        (data.len() == width as usize * height as usize).then_some(Self {
            width,
            height,
            data,
        })
    }

    /// Mean of the three channels of every pixel.
    pub fn from_rgb(image: &RgbImage) -> Self {
        let data = image
            .pixels()
            .map(|p| (p[0] as f64 + p[1] as f64 + p[2] as f64) / 3.0)
            .collect();
        Self {
            width: image.width(),
            height: image.height(),
            data,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    fn pixel(&self, x: i64, y: i64) -> f64 {
        let x = x.clamp(0, self.width as i64 - 1) as usize;
        let y = y.clamp(0, self.height as i64 - 1) as usize;
        self.data[y * self.width as usize + x]
    }

    /// Samples at a non-integer position. Pixel `(i, j)` covers
    /// `[i, i + 1) × [j, j + 1)`, so its centre is at `(i + 0.5, j + 0.5)`.
    pub fn sample(&self, p: Point, interpolation: Interpolation) -> f64 {
        if self.is_empty() {
            return 0.0;
        }
        let x = p.x - 0.5;
        let y = p.y - 0.5;
        match interpolation {
            Interpolation::Nearest => self.pixel(x.round() as i64, y.round() as i64),
            Interpolation::Bilinear => {
                let (x0, y0) = (x.floor(), y.floor());
                let (fx, fy) = (x - x0, y - y0);
                let (x0, y0) = (x0 as i64, y0 as i64);
                let top = lerp(self.pixel(x0, y0), self.pixel(x0 + 1, y0), fx);
                let bottom = lerp(self.pixel(x0, y0 + 1), self.pixel(x0 + 1, y0 + 1), fx);
                lerp(top, bottom, fy)
            }
            Interpolation::Bicubic => {
                let (x0, y0) = (x.floor(), y.floor());
                let (fx, fy) = (x - x0, y - y0);
                let (x0, y0) = (x0 as i64, y0 as i64);
                let mut rows = [0.0; 4];
                for (row, dy) in rows.iter_mut().zip(-1..=2) {
                    let v = [-1, 0, 1, 2].map(|dx| self.pixel(x0 + dx, y0 + dy));
                    *row = catmull_rom(v, fx);
                }
                catmull_rom(rows, fy)
            }
        }
    }
}

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a * (1.0 - t) + b * t
}

fn catmull_rom([p0, p1, p2, p3]: [f64; 4], t: f64) -> f64 {
    let t2 = t * t;
    let t3 = t2 * t;
    0.5 * (2.0 * p1
        + (p2 - p0) * t
        + (2.0 * p0 - 5.0 * p1 + 4.0 * p2 - p3) * t2
        + (3.0 * p1 - p0 - 3.0 * p2 + p3) * t3)
}

/// Samples along each segment of a path.
///
/// Segment ends are shared, so every vertex is sampled once. A path without
/// length gives an empty profile.
pub fn polyline_profile(
    points: &[Point],
    image: &IntensityImage,
    options: &ProfileOptions,
) -> IntensityProfile {
    let positions = path_positions(points, options.samples_per_pixel);
    if positions.is_empty() || image.is_empty() {
        return IntensityProfile::default();
    }
    IntensityProfile {
        values: positions
            .iter()
            .map(|p| image.sample(*p, options.interpolation))
            .collect(),
        coordinates: positions.iter().map(|p| *p - options.origin).collect(),
    }
}

/// Averages parallel lines laid along the long axis of a rotated box.
///
/// Each line runs between the two short edges. Zero width or height gives an
/// empty profile.
pub fn box_profile(
    center: Point,
    width: f64,
    height: f64,
    angle: f64,
    image: &IntensityImage,
    options: &ProfileOptions,
) -> IntensityProfile {
    let (width, height) = (width.abs(), height.abs());
    if width <= f64::EPSILON || height <= f64::EPSILON || image.is_empty() {
        return IntensityProfile::default();
    }
    let (u, v) = local_axes(angle);
    let (axis, across, length, span) = if width >= height {
        (u, v, width, height)
    } else {
        (v, u, height, width)
    };
    let density = sample_density(options.samples_per_pixel);
    let steps = ((length * density).round() as usize).max(1);
    let lines = ((span * density).round() as usize).max(1);

    let start = center - axis * (length / 2.0);
    let mut profile = IntensityProfile::default();
    for i in 0..=steps {
        let on_axis = start + axis * (length * i as f64 / steps as f64);
        let sum: f64 = (0..lines)
            .map(|j| {
                let offset = ((j as f64 + 0.5) / lines as f64 - 0.5) * span;
                image.sample(on_axis + across * offset, options.interpolation)
            })
            .sum();
        profile.values.push(sum / lines as f64);
        profile.coordinates.push(on_axis - options.origin);
    }
    profile
}

fn sample_density(samples_per_pixel: f64) -> f64 {
    if samples_per_pixel.is_finite() && samples_per_pixel > 0.0 {
        samples_per_pixel
    } else {
        1.0
    }
}

fn path_positions(points: &[Point], samples_per_pixel: f64) -> Vec<Point> {
    let density = sample_density(samples_per_pixel);
    let mut positions = Vec::new();
    for segment in points.windows(2) {
        let (a, b) = (segment[0], segment[1]);
        let length = a.distance_to(&b);
        if length <= f64::EPSILON {
            continue;
        }
        let steps = ((length * density).round() as usize).max(1);
        positions.extend((0..steps).map(|k| a + (b - a) * (k as f64 / steps as f64)));
    }
    if !positions.is_empty() {
        if let Some(last) = points.last() {
            positions.push(*last);
        }
    }
    positions
}
