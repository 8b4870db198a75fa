//! Polygon measurement shape
//!
//! A polygon behaves like an open multi-line until it has three distinct
//! vertices. From then on it renders as a closed ring and reports area and
//! perimeter instead of segment lengths.

use micromeasure_core::geometry::{polygon_area, polygon_contains};
use micromeasure_core::{BoundingBox, Point};

use super::line::{
    begin_append, drop_preview_point, near_path, polyline_angle, polyline_properties,
    restore_polyline,
};
use super::rectangle::scaled_center;
use super::{
    check_scaling_factor, not_modifiable, BuildState, MeasurementShape, OutputProperties,
    PropertyValue, RenderForm, ShapeParams, ShapeType,
};
use crate::control_points::{Modifiers, PolylineControlPoints};
use crate::error::ShapeError;
use crate::profile::{polyline_profile, IntensityImage, IntensityProfile, ProfileOptions};

const MODIFIABLE: &[&str] = &["center"];

/// Points closer than this count as duplicates.
const DUPLICATE_TOLERANCE: f64 = 1e-9;

#[derive(Debug, Clone, PartialEq)]
pub struct MeasurePolygon {
    control_points: PolylineControlPoints,
    build: BuildState,
    render: RenderForm,
}

impl MeasurePolygon {
    pub fn new(points: Vec<Point>) -> Self {
        let mut polygon = Self {
            control_points: PolylineControlPoints::new(points),
            build: BuildState::Closed,
            render: RenderForm::Path { points: Vec::new() },
        };
        polygon.update_from_controlpoints();
        polygon
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

    pub fn begin_append(&mut self, at: Point) -> bool {
        begin_append(&mut self.control_points, &mut self.build, None, at);
        self.update_from_controlpoints();
        self.build == BuildState::Constructing
    }

    pub fn drop_preview_point(&mut self) {
        drop_preview_point(&mut self.control_points, &mut self.build);
        self.update_from_controlpoints();
    }

    /// Number of points that are not repeats of an earlier point.
    pub fn distinct_points(&self) -> usize {
        let points = self.points();
        points
            .iter()
            .enumerate()
            .filter(|(i, p)| {
                !points[..*i]
                    .iter()
                    .any(|q| q.approx_eq(p, DUPLICATE_TOLERANCE))
            })
            .count()
    }

    /// True once the polygon encloses an area.
    pub fn is_closed(&self) -> bool {
        self.distinct_points() >= 3
    }

    pub fn area(&self) -> f64 {
        if self.is_closed() {
            polygon_area(self.points())
        } else {
            0.0
        }
    }

    pub fn perimeter(&self) -> f64 {
        ring(self.points()).windows(2).map(|w| w[0].distance_to(&w[1])).sum()
    }

    fn path(&self) -> Vec<Point> {
        if self.is_closed() {
            ring(self.points())
        } else {
            self.points().to_vec()
        }
    }
}

/// The points with the first repeated at the end.
fn ring(points: &[Point]) -> Vec<Point> {
    let mut ring = points.to_vec();
    if let Some(first) = points.first() {
        ring.push(*first);
    }
    ring
}

impl MeasurementShape for MeasurePolygon {
    fn shape_type(&self) -> ShapeType {
        ShapeType::Polygon
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
        let points = self.points().to_vec();
        self.render = if self.is_closed() {
            RenderForm::Polygon { points }
        } else {
            RenderForm::Path { points }
        };
    }

    fn render_form(&self) -> &RenderForm {
        &self.render
    }

    fn output_properties(&self) -> OutputProperties {
        if self.is_closed() {
            OutputProperties::new()
                .length("center", self.center())
                .area("area", self.area())
                .length("perimeter", self.perimeter())
        } else {
            polyline_properties(self.points())
        }
    }

    fn modifiable_properties(&self) -> &'static [&'static str] {
        MODIFIABLE
    }

    fn update_property(
        &mut self,
        name: &str,
        value: &PropertyValue,
        scaling_factor: f64,
    ) -> Result<(), ShapeError> {
        check_scaling_factor(scaling_factor)?;
        match name {
            "center" => {
                let center = scaled_center(value, scaling_factor)?;
                self.control_points.set_center(center);
            }
            _ => return Err(not_modifiable(name, ShapeType::Polygon)),
        }
        self.update_from_controlpoints();
        Ok(())
    }

    fn save(&self) -> ShapeParams {
        ShapeParams::polyline(self.points())
    }

    fn restore(&mut self, params: &ShapeParams) -> Result<(), ShapeError> {
        restore_polyline(&mut self.control_points, params, ShapeType::Polygon)?;
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
        near_path(&self.path(), p, tolerance)
            || (self.is_closed() && polygon_contains(self.points(), p))
    }

    fn bounds(&self) -> Option<BoundingBox> {
        BoundingBox::from_points(self.points())
    }

    fn intensity_profile(
        &self,
        image: &IntensityImage,
        options: &ProfileOptions,
    ) -> IntensityProfile {
        polyline_profile(&self.path(), image, options)
    }
}
