//! Point and vector math in image pixel space.
//!
//! Image space has its y axis growing downward. Angles follow the on-screen
//! convention instead: a positive angle turns counter-clockwise as seen by the
//! user, so the bearing of a vector `(dx, dy)` is `atan2(-dy, dx)`.

use serde::{Deserialize, Serialize};
use std::f64::consts::{FRAC_PI_2, PI, TAU};
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};

/// A point (or free vector) in image pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: &Point) -> f64 {
        (*self - *other).length()
    }

    pub fn length(&self) -> f64 {
        self.x.hypot(self.y)
    }

    pub fn dot(&self, other: &Point) -> f64 {
        self.x * other.x + self.y * other.y
    }

    pub fn midpoint(&self, other: &Point) -> Point {
        Point::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }

    /// Bearing of this vector in radians, counter-clockwise on screen.
    pub fn bearing(&self) -> f64 {
        (-self.y).atan2(self.x)
    }

    /// Rotates this vector by `angle` radians (counter-clockwise on screen).
    pub fn rotated(&self, angle: f64) -> Point {
        let (sin, cos) = angle.sin_cos();
        Point::new(self.x * cos + self.y * sin, -self.x * sin + self.y * cos)
    }

    /// Rotates this point about `center` by `angle` radians.
    pub fn rotated_about(&self, center: &Point, angle: f64) -> Point {
        *center + (*self - *center).rotated(angle)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    pub fn approx_eq(&self, other: &Point, tolerance: f64) -> bool {
        (self.x - other.x).abs() <= tolerance && (self.y - other.y).abs() <= tolerance
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self::new(x, y)
    }
}

impl From<Point> for (f64, f64) {
    fn from(p: Point) -> Self {
        (p.x, p.y)
    }
}

impl Add for Point {
    type Output = Point;
    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Point {
    fn add_assign(&mut self, rhs: Point) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Point {
    type Output = Point;
    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl SubAssign for Point {
    fn sub_assign(&mut self, rhs: Point) {
        self.x -= rhs.x;
        self.y -= rhs.y;
    }
}

impl Mul<f64> for Point {
    type Output = Point;
    fn mul(self, rhs: f64) -> Point {
        Point::new(self.x * rhs, self.y * rhs)
    }
}

impl Neg for Point {
    type Output = Point;
    fn neg(self) -> Point {
        Point::new(-self.x, -self.y)
    }
}

/// Unit vectors of a frame rotated by `angle`: the width axis and the height axis.
///
/// The width axis is `(cos θ, -sin θ)` and the height axis `(sin θ, cos θ)`,
/// which is the identity frame rotated counter-clockwise on a y-down screen.
pub fn local_axes(angle: f64) -> (Point, Point) {
    let (sin, cos) = angle.sin_cos();
    (Point::new(cos, -sin), Point::new(sin, cos))
}

/// Normalizes an angle in radians into `[0, 2π)`.
pub fn normalize_angle(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(TAU);
    // rem_euclid can round up to exactly TAU for tiny negative inputs
    if wrapped >= TAU {
        0.0
    } else {
        wrapped
    }
}

/// Reflects an angle difference in degrees into `[0, 180]`.
pub fn fold_degrees(angle: f64) -> f64 {
    let a = angle.abs().rem_euclid(360.0);
    if a > 180.0 {
        360.0 - a
    } else {
        a
    }
}

/// Rounds an angle to the nearest multiple of `step` (both in radians).
pub fn snap_angle(angle: f64, step: f64) -> f64 {
    if step <= 0.0 {
        return angle;
    }
    (angle / step).round() * step
}

/// Snaps `end` so the segment from `start` lies on a multiple of `step` radians,
/// keeping the segment length.
pub fn snap_segment(start: Point, end: Point, step: f64) -> Point {
    let delta = end - start;
    let length = delta.length();
    if length == 0.0 {
        return end;
    }
    let bearing = snap_angle(delta.bearing(), step);
    start + Point::new(length, 0.0).rotated(bearing)
}

/// Quarter turn, used by image rotation.
pub const QUARTER_TURN: f64 = FRAC_PI_2;
/// Half turn.
pub const HALF_TURN: f64 = PI;

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min: Point,
    pub max: Point,
}

impl BoundingBox {
    pub fn new(min: Point, max: Point) -> Self {
        Self {
            min: Point::new(min.x.min(max.x), min.y.min(max.y)),
            max: Point::new(min.x.max(max.x), min.y.max(max.y)),
        }
    }

    /// Smallest box that contains every point; `None` for an empty iterator.
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Point>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = *iter.next()?;
        let (min, max) = iter.fold((first, first), |(min, max), p| {
            (
                Point::new(min.x.min(p.x), min.y.min(p.y)),
                Point::new(max.x.max(p.x), max.y.max(p.y)),
            )
        });
        Some(Self { min, max })
    }

    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    pub fn center(&self) -> Point {
        self.min.midpoint(&self.max)
    }

    pub fn contains(&self, p: &Point, tolerance: f64) -> bool {
        p.x >= self.min.x - tolerance
            && p.x <= self.max.x + tolerance
            && p.y >= self.min.y - tolerance
            && p.y <= self.max.y + tolerance
    }
}

/// Shortest distance from `p` to the segment `a`–`b`.
pub fn distance_to_segment(p: &Point, a: &Point, b: &Point) -> f64 {
    let ab = *b - *a;
    let l2 = ab.dot(&ab);
    if l2 == 0.0 {
        return p.distance_to(a);
    }
    let t = ((*p - *a).dot(&ab) / l2).clamp(0.0, 1.0);
    p.distance_to(&(*a + ab * t))
}

/// Even-odd point-in-polygon test for a closed ring.
pub fn polygon_contains(points: &[Point], p: &Point) -> bool {
    if points.len() < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = points.len() - 1;
    for i in 0..points.len() {
        let (pi, pj) = (points[i], points[j]);
        if (pi.y > p.y) != (pj.y > p.y) {
            let x_cross = (pj.x - pi.x) * (p.y - pi.y) / (pj.y - pi.y) + pi.x;
            if p.x < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// Unsigned shoelace area of a closed ring.
pub fn polygon_area(points: &[Point]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let mut twice = 0.0;
    for (i, a) in points.iter().enumerate() {
        let b = points[(i + 1) % points.len()];
        twice += a.x * b.y - b.x * a.y;
    }
    twice.abs() / 2.0
}
