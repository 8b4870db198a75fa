//! Lines, angles and multi-segment lines.
//!
//! All three share one polyline model and differ only in how many points they
//! accept. A shape under construction keeps a live preview point at the end of
//! its point list until construction finishes.

use micromeasure_core::geometry::{distance_to_segment, fold_degrees};
use micromeasure_core::{BoundingBox, Point};

use super::rectangle::{degrees_value, scaled_center, scaled_length};
use super::{
    check_scaling_factor, invalid_params, not_modifiable, BuildState, MeasurementShape,
    OutputProperties, PropertyValue, RenderForm, ShapeParams, ShapeType,
};
use crate::control_points::{Modifiers, PolylineControlPoints};
use crate::error::ShapeError;
use crate::profile::{polyline_profile, IntensityImage, IntensityProfile, ProfileOptions};

/// Which polyline tool drew the shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// Two points
    Line,
    /// Three points: two arms meeting at a vertex
    Angle,
    /// Any number of points
    MultiLine,
}

impl LineKind {
    pub fn max_points(&self) -> Option<usize> {
        match self {
            Self::Line => Some(2),
            Self::Angle => Some(3),
            Self::MultiLine => None,
        }
    }

    pub fn shape_type(&self) -> ShapeType {
        match self {
            Self::Line => ShapeType::Line,
            Self::Angle => ShapeType::Angle,
            Self::MultiLine => ShapeType::MultiLine,
        }
    }

    fn modifiable(&self) -> &'static [&'static str] {
        match self {
            Self::Line => &["center", "length", "angle"],
            Self::Angle | Self::MultiLine => &["center"],
        }
    }
}

/// Open polyline measurement.
#[derive(Debug, Clone, PartialEq)]
pub struct MeasureLine {
    kind: LineKind,
    control_points: PolylineControlPoints,
    build: BuildState,
    render: RenderForm,
}

impl MeasureLine {
    pub fn new(kind: LineKind, points: Vec<Point>) -> Self {
        let mut line = Self {
            kind,
            control_points: PolylineControlPoints::new(points),
            build: BuildState::Closed,
            render: RenderForm::Path { points: Vec::new() },
        };
        line.update_from_controlpoints();
        line
    }

    pub fn kind(&self) -> LineKind {
        self.kind
    }

    pub fn control_points(&self) -> &PolylineControlPoints {
        &self.control_points
    }

    pub fn points(&self) -> &[Point] {
        self.control_points.points()
    }

    pub fn build_state(&self) -> BuildState {
        self.build
    }

    pub fn set_build_state(&mut self, state: BuildState) {
        self.build = state;
    }

    pub fn add_point(&mut self, point: Point, index: usize) -> usize {
        let index = self.control_points.add_point(point, index);
        self.update_from_controlpoints();
        index
    }

    pub fn remove_point(&mut self, index: usize) -> Option<Point> {
        let removed = self.control_points.remove_point(index);
        self.update_from_controlpoints();
        removed
    }

    /// Appends a live preview point when the kind still accepts one.
    pub fn begin_append(&mut self, at: Point) -> bool {
        begin_append(&mut self.control_points, &mut self.build, self.kind.max_points(), at);
        self.update_from_controlpoints();
        self.build == BuildState::Constructing
    }

    pub fn drop_preview_point(&mut self) {
        drop_preview_point(&mut self.control_points, &mut self.build);
        self.update_from_controlpoints();
    }

    pub fn length(&self) -> f64 {
        segment_lengths(self.points()).iter().sum()
    }
}

pub(super) fn begin_append(
    cp: &mut PolylineControlPoints,
    build: &mut BuildState,
    max_points: Option<usize>,
    at: Point,
) {
    if *build == BuildState::Constructing || max_points.is_some_and(|max| cp.len() >= max) {
        return;
    }
    let index = cp.add_point(at, cp.len());
    cp.select(true, Some(index));
    *build = BuildState::Constructing;
}

pub(super) fn drop_preview_point(cp: &mut PolylineControlPoints, build: &mut BuildState) {
    if *build != BuildState::Constructing {
        return;
    }
    if cp.len() > 2 {
        cp.take_point(cp.len() - 1);
    }
    cp.select(cp.handles_visible(), None);
    *build = BuildState::Closed;
}

pub(super) fn segment_lengths(points: &[Point]) -> Vec<f64> {
    points.windows(2).map(|w| w[0].distance_to(&w[1])).collect()
}

/// Reported angle in degrees: the signed bearing of a single segment, or the
/// folded difference between the bearings of the first two segments.
pub(super) fn polyline_angle(points: &[Point]) -> Option<f64> {
    match points {
        [a, b] => Some((*b - *a).bearing().to_degrees()),
        [a, b, c, ..] => {
            let first = (*b - *a).bearing().to_degrees();
            let second = (*c - *b).bearing().to_degrees();
            Some(fold_degrees((first - second).abs()))
        }
        _ => None,
    }
}

/// Length and angle outputs shared by every open polyline.
pub(super) fn polyline_properties(points: &[Point]) -> OutputProperties {
    let lengths = segment_lengths(points);
    let props = match lengths.as_slice() {
        [] => OutputProperties::new().length("length", 0.0),
        [single] => OutputProperties::new().length("length", *single),
        _ => OutputProperties::new().length("length", lengths),
    };
    match polyline_angle(points) {
        Some(angle) => props.angle("angle", angle),
        None => props,
    }
}

pub(super) fn near_path(points: &[Point], p: &Point, tolerance: f64) -> bool {
    match points {
        [] => false,
        [only] => only.distance_to(p) <= tolerance,
        _ => points
            .windows(2)
            .any(|w| distance_to_segment(p, &w[0], &w[1]) <= tolerance),
    }
}

pub(super) fn restore_polyline(
    cp: &mut PolylineControlPoints,
    params: &ShapeParams,
    shape: ShapeType,
) -> Result<(), ShapeError> {
    let points = params
        .polyline_points()
        .ok_or_else(|| invalid_params(shape, "expected points matching point_count"))?;
    if points.is_empty() || !points.iter().all(Point::is_finite) {
        return Err(invalid_params(shape, "points must be finite and non-empty"));
    }
    cp.set_points(points);
    Ok(())
}

impl MeasurementShape for MeasureLine {
    fn shape_type(&self) -> ShapeType {
        self.kind.shape_type()
    }

    fn center(&self) -> Point {
        self.control_points.center()
    }

    fn set_center(&mut self, center: Point) {
        self.control_points.set_center(center);
        self.update_from_controlpoints();
    }

    fn angle(&self) -> f64 {
        polyline_angle(self.points()).unwrap_or(0.0)
    }

    fn orientation(&self) -> f64 {
        self.control_points.orientation().unwrap_or(0.0)
    }

    fn update_from_controlpoints(&mut self) {
        self.render = RenderForm::Path {
            points: self.points().to_vec(),
        };
    }

    fn render_form(&self) -> &RenderForm {
        &self.render
    }

    fn output_properties(&self) -> OutputProperties {
        polyline_properties(self.points())
    }

    fn modifiable_properties(&self) -> &'static [&'static str] {
        self.kind.modifiable()
    }

    fn update_property(
        &mut self,
        name: &str,
        value: &PropertyValue,
        scaling_factor: f64,
    ) -> Result<(), ShapeError> {
        check_scaling_factor(scaling_factor)?;
        if !self.modifiable_properties().contains(&name) {
            return Err(not_modifiable(name, self.shape_type()));
        }
        let cp = &mut self.control_points;
        match name {
            "center" => cp.set_center(scaled_center(value, scaling_factor)?),
            "length" => {
                let length = scaled_length(name, value, scaling_factor)?;
                if let [start, end] = cp.points() {
                    let (start, delta) = (*start, *end - *start);
                    let direction = if delta.length() > 0.0 {
                        delta * (1.0 / delta.length())
                    } else {
                        Point::new(1.0, 0.0)
                    };
                    cp.set_point(1, start + direction * length);
                }
            }
            "angle" => {
                let target = degrees_value(name, value)?;
                if let Some(current) = cp.orientation() {
                    cp.rotate_by(target - current);
                }
            }
            _ => return Err(not_modifiable(name, self.kind.shape_type())),
        }
        self.update_from_controlpoints();
        Ok(())
    }

    fn save(&self) -> ShapeParams {
        ShapeParams::polyline(self.points())
    }

    fn restore(&mut self, params: &ShapeParams) -> Result<(), ShapeError> {
        restore_polyline(&mut self.control_points, params, self.kind.shape_type())?;
        self.build = BuildState::Closed;
        self.update_from_controlpoints();
        Ok(())
    }

    fn handles(&self) -> Vec<Point> {
        self.points().to_vec()
    }

    fn handles_visible(&self) -> bool {
        self.control_points.handles_visible()
    }

    fn active_handle(&self) -> Option<usize> {
        self.control_points.active_handle()
    }

    fn select(&mut self, visible: bool, handle: Option<usize>) {
        self.control_points.select(visible, handle);
    }

    fn drag_handle(&mut self, end: Point, _modifiers: Modifiers, snap_step: Option<f64>) {
        self.control_points.drag_handle(end, snap_step);
        self.update_from_controlpoints();
    }

    fn supports_rotation(&self) -> bool {
        self.control_points.len() >= 2
    }

    fn set_drag_reference_angle(&mut self, reference: f64) {
        self.control_points.set_drag_reference_angle(reference);
    }

    fn rotate(&mut self, pointer_bearing: f64, snap_step: Option<f64>) {
        self.control_points.rotate(pointer_bearing, snap_step);
        self.update_from_controlpoints();
    }

    fn transform(&mut self, map: &dyn Fn(Point) -> Point, _angle_delta: f64) {
        let points = self.points().iter().map(|p| map(*p)).collect();
        self.control_points.set_points(points);
        self.update_from_controlpoints();
    }

    fn contains_point(&self, p: &Point, tolerance: f64) -> bool {
        near_path(self.points(), p, tolerance)
    }

    fn bounds(&self) -> Option<BoundingBox> {
        BoundingBox::from_points(self.points())
    }

    fn intensity_profile(
        &self,
        image: &IntensityImage,
        options: &ProfileOptions,
    ) -> IntensityProfile {
        polyline_profile(self.points(), image, options)
    }
}
