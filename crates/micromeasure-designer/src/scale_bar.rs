//! Scale-bar detection by flood fill.
//!
//! The fill runs on a copy of the image. The detected length is the extent of
//! the pixels the fill changed, measured along the configured direction and
//! counted inclusively, so a single changed pixel measures 1.

use image::{Rgb, RgbImage};
use serde::{Deserialize, Serialize};

use micromeasure_core::{Point, ScaleBarDirection};

/// Everything needed to reproduce a detection on a given image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScaleBarParams {
    /// Seed position, in pixels or as a fraction of the image size
    pub seed: Point,
    /// `seed` is a fraction of width and height instead of a pixel position
    pub relative: bool,
    /// Largest per-channel difference from the seed colour that is still filled
    pub threshold: u8,
    pub direction: ScaleBarDirection,
}

impl ScaleBarParams {
    pub fn absolute(seed: Point, threshold: u8, direction: ScaleBarDirection) -> Self {
        Self {
            seed,
            relative: false,
            threshold,
            direction,
        }
    }

    /// Seed position in pixels for an image of the given size.
    pub fn seed_position(&self, width: u32, height: u32) -> Point {
        if self.relative {
            Point::new(self.seed.x * width as f64, self.seed.y * height as f64)
        } else {
            self.seed
        }
    }

    /// Pixel holding the seed, or `None` if it lies outside the image.
    pub fn seed_pixel(&self, width: u32, height: u32) -> Option<(u32, u32)> {
        let p = self.seed_position(width, height);
        if !p.is_finite() || p.x < 0.0 || p.y < 0.0 {
            return None;
        }
        let (x, y) = (p.x.floor(), p.y.floor());
        (x < width as f64 && y < height as f64).then_some((x as u32, y as u32))
    }

    /// Same seed expressed in the frame of an image of `width` × `height`
    /// after `map` was applied to absolute positions.
    ///
    /// A seed inside the image is moved by the centre of its pixel, so the
    /// mapped seed falls on the pixel the raster rotation moved it to.
    pub fn mapped(
        &self,
        old_size: (u32, u32),
        new_size: (u32, u32),
        map: impl Fn(Point) -> Point,
    ) -> Self {
        let source = match self.seed_pixel(old_size.0, old_size.1) {
            Some((x, y)) => Point::new(x as f64 + 0.5, y as f64 + 0.5),
            None => self.seed_position(old_size.0, old_size.1),
        };
        let absolute = map(source);
        let seed = if self.relative && new_size.0 > 0 && new_size.1 > 0 {
            Point::new(
                absolute.x / new_size.0 as f64,
                absolute.y / new_size.1 as f64,
            )
        } else {
            absolute
        };
        Self {
            seed,
            relative: self.relative && new_size.0 > 0 && new_size.1 > 0,
            threshold: self.threshold,
            direction: match self.direction {
                ScaleBarDirection::Horizontal => ScaleBarDirection::Vertical,
                ScaleBarDirection::Vertical => ScaleBarDirection::Horizontal,
            },
        }
    }
}

/// A stored detection: the parameters and the measured pixel length.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScaleBarDetection {
    pub params: ScaleBarParams,
    pub pixels: u32,
}

/// Runs the detection.
pub fn detect(image: &RgbImage, params: &ScaleBarParams) -> ScaleBarDetection {
    let filled = fill(image, params);
    let pixels = measure_extent(image, &filled, params.direction);
    tracing::debug!(
        "Scale bar detection at {:?} (threshold {}): {} px",
        params.seed,
        params.threshold,
        pixels
    );
    ScaleBarDetection {
        params: params.clone(),
        pixels,
    }
}

/// Copy of `image` with the seed region filled. The source is never modified.
pub fn fill(image: &RgbImage, params: &ScaleBarParams) -> RgbImage {
    let mut filled = image.clone();
    let (width, height) = image.dimensions();
    let Some((sx, sy)) = params.seed_pixel(width, height) else {
        return filled;
    };

    let seed_color = *image.get_pixel(sx, sy);
    let fill_color = complement(&seed_color);
    let w = width as usize;
    let mut visited = vec![false; w * height as usize];
    let mut stack: Vec<(u32, u32)> = Vec::with_capacity(1024);
    visited[sy as usize * w + sx as usize] = true;
    stack.push((sx, sy));

    while let Some((x, y)) = stack.pop() {
        filled.put_pixel(x, y, fill_color);
        let neighbours = [
            (x.checked_sub(1), Some(y)),
            ((x + 1 < width).then_some(x + 1), Some(y)),
            (Some(x), y.checked_sub(1)),
            (Some(x), (y + 1 < height).then_some(y + 1)),
        ];
        for (nx, ny) in neighbours {
            let (Some(nx), Some(ny)) = (nx, ny) else {
                continue;
            };
            let idx = ny as usize * w + nx as usize;
            if !visited[idx] && colors_match(image.get_pixel(nx, ny), &seed_color, params.threshold)
            {
                visited[idx] = true;
                stack.push((nx, ny));
            }
        }
    }
    filled
}

/// Largest per-channel difference is within `threshold`.
fn colors_match(a: &Rgb<u8>, b: &Rgb<u8>, threshold: u8) -> bool {
    a.0.iter()
        .zip(b.0.iter())
        .all(|(x, y)| x.abs_diff(*y) <= threshold)
}

fn complement(color: &Rgb<u8>) -> Rgb<u8> {
    Rgb(color.0.map(|c| 255 - c))
}

/// Inclusive extent of the pixels that differ between the two images.
fn measure_extent(original: &RgbImage, filled: &RgbImage, direction: ScaleBarDirection) -> u32 {
    let mut range: Option<(u32, u32)> = None;
    for (x, y, pixel) in filled.enumerate_pixels() {
        if pixel == original.get_pixel(x, y) {
            continue;
        }
        let coord = match direction {
            ScaleBarDirection::Horizontal => x,
            ScaleBarDirection::Vertical => y,
        };
        range = Some(match range {
            Some((lo, hi)) => (lo.min(coord), hi.max(coord)),
            None => (coord, coord),
        });
    }
    range.map_or(0, |(lo, hi)| hi - lo + 1)
}
