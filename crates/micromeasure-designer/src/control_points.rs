//! Control-point models: the handles a user drags to edit a shape.
//!
//! Two variants exist. [`BoxControlPoints`] stores center, signed width,
//! signed height and angle, and derives four corner handles from them.
//! [`PolylineControlPoints`] stores an ordered point list where every point is
//! its own handle.

use micromeasure_core::geometry::{local_axes, normalize_angle, snap_angle, snap_segment};
use micromeasure_core::{BoundingBox, Point};
use std::f64::consts::{FRAC_1_SQRT_2, SQRT_2};

/// Modifier keys held during a pointer drag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    /// Force equal width and height (square / circle)
    pub constrain: bool,
    /// Resize symmetrically about the center
    pub from_center: bool,
    /// Rotate instead of move/resize
    pub rotate: bool,
    /// Snap angles and segment directions to the configured step
    pub snap: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        constrain: false,
        from_center: false,
        rotate: false,
        snap: false,
    };
}

/// Width and height signs of each corner handle.
///
/// Under this table the corner opposite the dragged handle stays fixed when
/// the new size is taken from the projection of the pointer onto the local
/// axes with the width negated for anchors 1 and 2 and the height negated for
/// anchors 0 and 1.
pub const CORNER_SIGNS: [(f64, f64); 4] = [(-1.0, 1.0), (1.0, 1.0), (1.0, -1.0), (-1.0, -1.0)];

/// Four-corner handle set of rectangles and ellipses.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxControlPoints {
    center: Point,
    width: f64,
    height: f64,
    angle: f64,
    corners: [Point; 4],
    visible: bool,
    active: Option<usize>,
    opposite: Option<usize>,
    drag_reference_angle: f64,
}

impl BoxControlPoints {
    pub fn new(center: Point, width: f64, height: f64, angle: f64) -> Self {
        let mut cp = Self {
            center,
            width,
            height,
            angle: normalize_angle(angle),
            corners: [center; 4],
            visible: false,
            active: None,
            opposite: None,
            drag_reference_angle: 0.0,
        };
        cp.update_points();
        cp
    }

    pub fn center(&self) -> Point {
        self.center
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    /// Angle in radians, in `[0, 2π)`.
    pub fn angle(&self) -> f64 {
        self.angle
    }

    pub fn corners(&self) -> &[Point; 4] {
        &self.corners
    }

    /// Takes center and size from an axis-aligned box, keeping the angle.
    pub fn update_bounds(&mut self, bounds: &BoundingBox) {
        self.center = bounds.center();
        self.width = bounds.width();
        self.height = bounds.height();
        self.update_points();
    }

    /// Recomputes the corner handles from center, size and angle.
    pub fn update_points(&mut self) {
        let (u, v) = local_axes(self.angle);
        for (corner, (sw, sh)) in self.corners.iter_mut().zip(CORNER_SIGNS) {
            *corner = self.center + u * (sw * self.width / 2.0) + v * (sh * self.height / 2.0);
        }
    }

    pub fn set_center(&mut self, center: Point) {
        self.center = center;
        self.update_points();
    }

    pub fn set_size(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
        self.update_points();
    }

    pub fn set_angle(&mut self, angle: f64) {
        self.angle = normalize_angle(angle);
        self.update_points();
    }

    /// Shows or hides the handles. With a handle index the handle becomes the
    /// active one and its diagonal partner the resize pivot.
    pub fn select(&mut self, visible: bool, handle: Option<usize>) {
        self.visible = visible;
        self.active = handle.filter(|&i| i < 4);
        self.opposite = self.active.map(|i| (i + 2) % 4);
    }

    pub fn handles_visible(&self) -> bool {
        self.visible
    }

    pub fn active_handle(&self) -> Option<usize> {
        self.active
    }

    pub fn opposite_handle(&self) -> Option<usize> {
        self.opposite
    }

    /// Records the angle between the grab vector and the current orientation.
    pub fn set_drag_reference_angle(&mut self, reference: f64) {
        self.drag_reference_angle = reference;
    }

    /// Sets the angle so the point grabbed at drag start follows `pointer_bearing`.
    pub fn rotate(&mut self, pointer_bearing: f64, snap_step: Option<f64>) {
        let mut angle = pointer_bearing - self.drag_reference_angle;
        if let Some(step) = snap_step {
            angle = snap_angle(angle, step);
        }
        self.set_angle(angle);
    }

    /// Resizes by dragging the active handle to `end`.
    ///
    /// With `from_center` the shape grows symmetrically about its center;
    /// otherwise the opposite corner stays where it is. `constrain` forces a
    /// square.
    pub fn drag_handle(&mut self, end: Point, modifiers: Modifiers) {
        let Some(handle) = self.active else {
            return;
        };
        let (u, v) = local_axes(self.angle);

        if modifiers.from_center {
            let (sw, sh) = CORNER_SIGNS[handle];
            let rel = end - self.center;
            let mut width = 2.0 * sw * rel.dot(&u);
            let mut height = 2.0 * sh * rel.dot(&v);
            if modifiers.constrain {
                (width, height) = squared(width, height);
            }
            self.width = width;
            self.height = height;
        } else {
            let anchor_index = self.opposite.unwrap_or((handle + 2) % 4);
            let anchor = self.corners[anchor_index];
            let rel = end - anchor;
            let mut width = rel.dot(&u);
            let mut height = rel.dot(&v);
            if matches!(anchor_index, 1 | 2) {
                width = -width;
            }
            if matches!(anchor_index, 0 | 1) {
                height = -height;
            }

            if modifiers.constrain {
                (width, height) = squared(width, height);
                let side = width.abs();
                // center sits on the 45° diagonal leaving the anchor, side/√2 away
                let (aw, ah) = CORNER_SIGNS[anchor_index];
                let diagonal =
                    (u * (-aw * width.signum()) + v * (-ah * height.signum())) * FRAC_1_SQRT_2;
                self.center = anchor + diagonal * (side / SQRT_2);
            } else {
                self.center = anchor.midpoint(&end);
            }
            self.width = width;
            self.height = height;
        }
        self.update_points();
    }
}

fn squared(width: f64, height: f64) -> (f64, f64) {
    let side = width.abs().max(height.abs());
    (side.copysign(width), side.copysign(height))
}

/// Ordered point handles of lines, angles, multi-lines and polygons.
#[derive(Debug, Clone, PartialEq)]
pub struct PolylineControlPoints {
    points: Vec<Point>,
    visible: bool,
    active: Option<usize>,
    drag_reference_angle: f64,
}

impl PolylineControlPoints {
    pub fn new(points: Vec<Point>) -> Self {
        Self {
            points,
            visible: false,
            active: None,
            drag_reference_angle: 0.0,
        }
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Midpoint of the first and last point.
    pub fn center(&self) -> Point {
        match (self.points.first(), self.points.last()) {
            (Some(first), Some(last)) => first.midpoint(last),
            _ => Point::ORIGIN,
        }
    }

    /// Bearing of the first segment in radians.
    pub fn orientation(&self) -> Option<f64> {
        match self.points.as_slice() {
            [a, b, ..] => Some((*b - *a).bearing()),
            _ => None,
        }
    }

    pub fn select(&mut self, visible: bool, handle: Option<usize>) {
        self.visible = visible;
        self.active = handle.filter(|&i| i < self.points.len());
    }

    pub fn handles_visible(&self) -> bool {
        self.visible
    }

    pub fn active_handle(&self) -> Option<usize> {
        self.active
    }

    /// Inserts `point` before `index`; an index past the end appends.
    pub fn add_point(&mut self, point: Point, index: usize) -> usize {
        let index = index.min(self.points.len());
        self.points.insert(index, point);
        if let Some(active) = self.active.as_mut() {
            if *active >= index {
                *active += 1;
            }
        }
        index
    }

    /// Removes the point at `index`. Refused when it would leave fewer than
    /// two points or the index is out of range.
    pub fn remove_point(&mut self, index: usize) -> Option<Point> {
        if self.points.len() <= 2 || index >= self.points.len() {
            return None;
        }
        Some(self.take_point(index))
    }

    /// Removes a point without the two-point floor; used for preview points.
    pub(crate) fn take_point(&mut self, index: usize) -> Point {
        let removed = self.points.remove(index);
        self.active = match self.active {
            Some(a) if a == index => None,
            Some(a) if a > index => Some(a - 1),
            other => other,
        };
        removed
    }

    pub fn set_point(&mut self, index: usize, point: Point) {
        if let Some(p) = self.points.get_mut(index) {
            *p = point;
        }
    }

    pub fn set_points(&mut self, points: Vec<Point>) {
        self.points = points;
        self.active = self.active.filter(|&i| i < self.points.len());
    }

    /// Moves the active handle to `end`, optionally snapping the segment that
    /// leads into it.
    pub fn drag_handle(&mut self, end: Point, snap_step: Option<f64>) {
        let Some(index) = self.active else {
            return;
        };
        let end = match snap_step {
            Some(step) => {
                let neighbour = if index > 0 {
                    self.points.get(index - 1)
                } else {
                    self.points.get(1)
                };
                neighbour.map_or(end, |n| snap_segment(*n, end, step))
            }
            None => end,
        };
        self.set_point(index, end);
    }

    pub fn translate(&mut self, delta: Point) {
        for p in &mut self.points {
            *p += delta;
        }
    }

    pub fn set_center(&mut self, center: Point) {
        let delta = center - self.center();
        self.translate(delta);
    }

    pub fn set_drag_reference_angle(&mut self, reference: f64) {
        self.drag_reference_angle = reference;
    }

    /// Rotates every point about the center by `delta` radians.
    pub fn rotate_by(&mut self, delta: f64) {
        let center = self.center();
        for p in &mut self.points {
            *p = p.rotated_about(&center, delta);
        }
    }

    /// Turns the polyline so its first segment points along
    /// `pointer_bearing` minus the drag reference.
    pub fn rotate(&mut self, pointer_bearing: f64, snap_step: Option<f64>) {
        let Some(current) = self.orientation() else {
            return;
        };
        let mut target = pointer_bearing - self.drag_reference_angle;
        if let Some(step) = snap_step {
            target = snap_angle(target, step);
        }
        self.rotate_by(target - current);
    }
}
