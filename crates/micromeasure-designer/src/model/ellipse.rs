//! Ellipse measurement shape

use std::f64::consts::PI;

use micromeasure_core::geometry::local_axes;
use micromeasure_core::{BoundingBox, Point};

use super::rectangle::{
    box_params, box_render, degrees_value, restore_box, scaled_center, to_local,
};
use super::{
    check_scaling_factor, invalid_value, not_modifiable, MeasurementShape, OutputProperties,
    PropertyValue, RenderForm, ShapeParams, ShapeType,
};
use crate::control_points::{BoxControlPoints, Modifiers};
use crate::error::ShapeError;
use crate::profile::{polyline_profile, IntensityImage, IntensityProfile, ProfileOptions};

const MODIFIABLE: &[&str] = &["center", "radius", "angle"];

/// Radii closer than this are reported as a single radius.
const CIRCLE_TOLERANCE: f64 = 1e-9;

/// Rotatable ellipse inscribed in its control-point box.
#[derive(Debug, Clone, PartialEq)]
pub struct MeasureEllipse {
    control_points: BoxControlPoints,
    render: RenderForm,
}

impl MeasureEllipse {
    pub fn new(center: Point, width: f64, height: f64, angle: f64) -> Self {
        let control_points = BoxControlPoints::new(center, width, height, angle);
        Self {
            render: box_render(&control_points, true),
            control_points,
        }
    }

    pub fn control_points(&self) -> &BoxControlPoints {
        &self.control_points
    }

    /// Semi-axes along the width and height directions.
    pub fn radii(&self) -> (f64, f64) {
        (
            self.control_points.width().abs() / 2.0,
            self.control_points.height().abs() / 2.0,
        )
    }

    pub fn is_circle(&self) -> bool {
        let (rx, ry) = self.radii();
        (rx - ry).abs() <= CIRCLE_TOLERANCE
    }

    pub fn area(&self) -> f64 {
        let (rx, ry) = self.radii();
        PI * rx * ry
    }

    /// End points of the longer axis.
    fn major_axis(&self) -> [Point; 2] {
        let cp = &self.control_points;
        let (u, v) = local_axes(cp.angle());
        let (rx, ry) = self.radii();
        let half = if rx >= ry { u * rx } else { v * ry };
        [cp.center() - half, cp.center() + half]
    }
}

impl MeasurementShape for MeasureEllipse {
    fn shape_type(&self) -> ShapeType {
        ShapeType::Ellipse
    }

    fn center(&self) -> Point {
        self.control_points.center()
    }

    fn set_center(&mut self, center: Point) {
        self.control_points.set_center(center);
        self.update_from_controlpoints();
    }

    fn angle(&self) -> f64 {
        self.control_points.angle().to_degrees()
    }

    fn orientation(&self) -> f64 {
        self.control_points.angle()
    }

    fn update_from_controlpoints(&mut self) {
        self.render = box_render(&self.control_points, true);
    }

    fn render_form(&self) -> &RenderForm {
        &self.render
    }

    fn output_properties(&self) -> OutputProperties {
        let (rx, ry) = self.radii();
        let radius = if self.is_circle() {
            PropertyValue::Scalar(rx)
        } else {
            PropertyValue::Pair(rx, ry)
        };
        OutputProperties::new()
            .length("center", self.center())
            .length("radius", radius)
            .area("area", self.area())
            .angle("angle", self.angle())
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
        let cp = &mut self.control_points;
        match name {
            "center" => cp.set_center(scaled_center(value, scaling_factor)?),
            "radius" => {
                let (rx, ry) = match value {
                    PropertyValue::Scalar(r) => (*r, *r),
                    PropertyValue::Pair(rx, ry) => (*rx, *ry),
                    PropertyValue::List(_) => {
                        return Err(invalid_value(name, "expected one radius or a pair"))
                    }
                };
                if !(rx.is_finite() && ry.is_finite() && rx > 0.0 && ry > 0.0) {
                    return Err(invalid_value(name, "radii must be positive"));
                }
                let width = (2.0 * rx / scaling_factor).copysign(cp.width());
                let height = (2.0 * ry / scaling_factor).copysign(cp.height());
                cp.set_size(width, height);
            }
            "angle" => cp.set_angle(degrees_value(name, value)?),
            _ => return Err(not_modifiable(name, ShapeType::Ellipse)),
        }
        self.update_from_controlpoints();
        Ok(())
    }

    fn save(&self) -> ShapeParams {
        box_params(&self.control_points)
    }

    fn restore(&mut self, params: &ShapeParams) -> Result<(), ShapeError> {
        restore_box(&mut self.control_points, params, ShapeType::Ellipse)?;
        self.update_from_controlpoints();
        Ok(())
    }

    fn handles(&self) -> Vec<Point> {
        self.control_points.corners().to_vec()
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

    fn drag_handle(&mut self, end: Point, modifiers: Modifiers, _snap_step: Option<f64>) {
        self.control_points.drag_handle(end, modifiers);
        self.update_from_controlpoints();
    }

    fn supports_rotation(&self) -> bool {
        true
    }

    fn set_drag_reference_angle(&mut self, reference: f64) {
        self.control_points.set_drag_reference_angle(reference);
    }

    fn rotate(&mut self, pointer_bearing: f64, snap_step: Option<f64>) {
        self.control_points.rotate(pointer_bearing, snap_step);
        self.update_from_controlpoints();
    }

    fn transform(&mut self, map: &dyn Fn(Point) -> Point, angle_delta: f64) {
        let cp = &mut self.control_points;
        let angle = cp.angle() + angle_delta;
        cp.set_center(map(cp.center()));
        cp.set_angle(angle);
        self.update_from_controlpoints();
    }

    fn contains_point(&self, p: &Point, tolerance: f64) -> bool {
        let (a, b) = to_local(&self.control_points, p);
        let (rx, ry) = self.radii();
        let (rx, ry) = (rx + tolerance, ry + tolerance);
        if rx <= 0.0 || ry <= 0.0 {
            return false;
        }
        (a / rx).powi(2) + (b / ry).powi(2) <= 1.0
    }

    fn bounds(&self) -> Option<BoundingBox> {
        BoundingBox::from_points(self.control_points.corners())
    }

    /// Samples along the major axis.
    fn intensity_profile(
        &self,
        image: &IntensityImage,
        options: &ProfileOptions,
    ) -> IntensityProfile {
        polyline_profile(&self.major_axis(), image, options)
    }
}
