//! Rectangle measurement shape

use micromeasure_core::geometry::local_axes;
use micromeasure_core::{BoundingBox, Point};

use super::{
    check_scaling_factor, invalid_params, invalid_value, not_modifiable, MeasurementShape,
    OutputProperties, PropertyValue, RenderForm, ShapeParams, ShapeType,
};
use crate::control_points::{BoxControlPoints, Modifiers};
use crate::error::ShapeError;
use crate::profile::{box_profile, IntensityImage, IntensityProfile, ProfileOptions};

const MODIFIABLE: &[&str] = &["center", "width", "height", "angle"];

/// Rotatable rectangle.
#[derive(Debug, Clone, PartialEq)]
pub struct MeasureRectangle {
    control_points: BoxControlPoints,
    render: RenderForm,
}

impl MeasureRectangle {
    pub fn new(center: Point, width: f64, height: f64, angle: f64) -> Self {
        let control_points = BoxControlPoints::new(center, width, height, angle);
        let mut rect = Self {
            render: box_render(&control_points, false),
            control_points,
        };
        rect.update_from_controlpoints();
        rect
    }

    /// Rectangle spanning an axis-aligned box.
    pub fn from_bounds(bounds: &BoundingBox) -> Self {
        let mut rect = Self::new(Point::ORIGIN, 0.0, 0.0, 0.0);
        rect.control_points.update_bounds(bounds);
        rect.update_from_controlpoints();
        rect
    }

    pub fn control_points(&self) -> &BoxControlPoints {
        &self.control_points
    }

    /// Signed width.
    pub fn width(&self) -> f64 {
        self.control_points.width()
    }

    /// Signed height.
    pub fn height(&self) -> f64 {
        self.control_points.height()
    }

    pub fn area(&self) -> f64 {
        (self.width() * self.height()).abs()
    }
}

/// Render form shared by the two box shapes.
pub(super) fn box_render(cp: &BoxControlPoints, ellipse: bool) -> RenderForm {
    if ellipse {
        RenderForm::Ellipse {
            center: cp.center(),
            radii: (cp.width().abs() / 2.0, cp.height().abs() / 2.0),
            angle: cp.angle(),
        }
    } else {
        RenderForm::Rectangle {
            center: cp.center(),
            width: cp.width().abs(),
            height: cp.height().abs(),
            angle: cp.angle(),
        }
    }
}

/// Coordinates of `p` in the box's local frame, relative to its center.
pub(super) fn to_local(cp: &BoxControlPoints, p: &Point) -> (f64, f64) {
    let (u, v) = local_axes(cp.angle());
    let rel = *p - cp.center();
    (rel.dot(&u), rel.dot(&v))
}

pub(super) fn box_params(cp: &BoxControlPoints) -> ShapeParams {
    ShapeParams::Box {
        center: cp.center().into(),
        width: cp.width(),
        height: cp.height(),
        angle: cp.angle(),
    }
}

pub(super) fn restore_box(
    cp: &mut BoxControlPoints,
    params: &ShapeParams,
    shape: ShapeType,
) -> Result<(), ShapeError> {
    let ShapeParams::Box {
        center,
        width,
        height,
        angle,
    } = params
    else {
        return Err(invalid_params(shape, "expected center, width, height and angle"));
    };
    let center = Point::from(*center);
    if !center.is_finite() || !width.is_finite() || !height.is_finite() || !angle.is_finite() {
        return Err(invalid_params(shape, "non-finite parameter"));
    }
    *cp = BoxControlPoints::new(center, *width, *height, *angle);
    Ok(())
}

/// Applies a scaled center edit.
pub(super) fn scaled_center(value: &PropertyValue, scaling_factor: f64) -> Result<Point, ShapeError> {
    value
        .as_point()
        .filter(Point::is_finite)
        .map(|p| p * (1.0 / scaling_factor))
        .ok_or_else(|| invalid_value("center", "expected a finite (x, y) pair"))
}

/// Applies a scaled length edit. Lengths must be positive.
pub(super) fn scaled_length(
    name: &str,
    value: &PropertyValue,
    scaling_factor: f64,
) -> Result<f64, ShapeError> {
    match value.as_scalar() {
        Some(v) if v.is_finite() && v > 0.0 => Ok(v / scaling_factor),
        _ => Err(invalid_value(name, "expected a positive number")),
    }
}

pub(super) fn degrees_value(name: &str, value: &PropertyValue) -> Result<f64, ShapeError> {
    value
        .as_scalar()
        .filter(|v| v.is_finite())
        .map(f64::to_radians)
        .ok_or_else(|| invalid_value(name, "expected an angle in degrees"))
}

impl MeasurementShape for MeasureRectangle {
    fn shape_type(&self) -> ShapeType {
        ShapeType::Rectangle
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
        self.render = box_render(&self.control_points, false);
    }

    fn render_form(&self) -> &RenderForm {
        &self.render
    }

    fn output_properties(&self) -> OutputProperties {
        OutputProperties::new()
            .length("center", self.center())
            .length("width", self.width().abs())
            .length("height", self.height().abs())
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
            "width" => {
                let width = scaled_length(name, value, scaling_factor)?;
                cp.set_size(width.copysign(cp.width()), cp.height());
            }
            "height" => {
                let height = scaled_length(name, value, scaling_factor)?;
                cp.set_size(cp.width(), height.copysign(cp.height()));
            }
            "angle" => cp.set_angle(degrees_value(name, value)?),
            _ => return Err(not_modifiable(name, ShapeType::Rectangle)),
        }
        self.update_from_controlpoints();
        Ok(())
    }

    fn save(&self) -> ShapeParams {
        box_params(&self.control_points)
    }

    fn restore(&mut self, params: &ShapeParams) -> Result<(), ShapeError> {
        restore_box(&mut self.control_points, params, ShapeType::Rectangle)?;
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
        a.abs() <= self.width().abs() / 2.0 + tolerance
            && b.abs() <= self.height().abs() / 2.0 + tolerance
    }

    fn bounds(&self) -> Option<BoundingBox> {
        BoundingBox::from_points(self.control_points.corners())
    }

    fn intensity_profile(
        &self,
        image: &IntensityImage,
        options: &ProfileOptions,
    ) -> IntensityProfile {
        let cp = &self.control_points;
        box_profile(cp.center(), cp.width(), cp.height(), cp.angle(), image, options)
    }
}
