//! Measurement shapes.
//!
//! Every shape embeds its control points and a render form derived from them.
//! The control points are authoritative; the render form is rebuilt by
//! `update_from_controlpoints` after every mutation and only feeds display and
//! export.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use micromeasure_core::{BoundingBox, Point};

use crate::control_points::{Modifiers, PolylineControlPoints};
use crate::error::ShapeError;
use crate::profile::{IntensityImage, IntensityProfile, ProfileOptions};

mod ellipse;
mod line;
mod polygon;
mod property;
mod rectangle;

pub use ellipse::MeasureEllipse;
pub use line::{LineKind, MeasureLine};
pub use polygon::MeasurePolygon;
pub use property::{
    Dimension, OutputProperties, Property, PropertyValue, AREA_UNIT, LENGTH_UNIT,
};
pub use rectangle::MeasureRectangle;

/// Concrete shape type. Structures only ever hold one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeType {
    Rectangle,
    Ellipse,
    Line,
    Angle,
    MultiLine,
    Polygon,
}

impl ShapeType {
    /// Tag written to saved files.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Rectangle => "rectangle",
            Self::Ellipse => "ellipse",
            Self::Line => "line",
            Self::Angle => "angle",
            Self::MultiLine => "multiline",
            Self::Polygon => "polygon",
        }
    }

    pub fn is_box(&self) -> bool {
        matches!(self, Self::Rectangle | Self::Ellipse)
    }
}

impl fmt::Display for ShapeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for ShapeType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "rectangle" => Ok(Self::Rectangle),
            "ellipse" => Ok(Self::Ellipse),
            "line" => Ok(Self::Line),
            "angle" => Ok(Self::Angle),
            "multiline" => Ok(Self::MultiLine),
            "polygon" => Ok(Self::Polygon),
            other => Err(other.to_string()),
        }
    }
}

/// Parameters that fully rebuild a shape's control points.
///
/// This is both the saved-file contract and the snapshot type used by undo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ShapeParams {
    Box {
        center: (f64, f64),
        width: f64,
        height: f64,
        angle: f64,
    },
    Polyline {
        points: Vec<(f64, f64)>,
        point_count: usize,
    },
}

impl ShapeParams {
    pub fn polyline(points: &[Point]) -> Self {
        Self::Polyline {
            points: points.iter().map(|p| (*p).into()).collect(),
            point_count: points.len(),
        }
    }

    /// Points of a polyline snapshot, checked against the stored count.
    pub fn polyline_points(&self) -> Option<Vec<Point>> {
        match self {
            Self::Polyline {
                points,
                point_count,
            } if points.len() == *point_count => {
                Some(points.iter().map(|&p| Point::from(p)).collect())
            }
            _ => None,
        }
    }
}

/// Display geometry derived from control points.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderForm {
    Rectangle {
        center: Point,
        width: f64,
        height: f64,
        angle: f64,
    },
    Ellipse {
        center: Point,
        radii: (f64, f64),
        angle: f64,
    },
    /// Open path through the points
    Path { points: Vec<Point> },
    /// Closed, fillable ring
    Polygon { points: Vec<Point> },
}

/// Construction sub-state of growing polylines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BuildState {
    /// Finished; every point is a committed vertex
    #[default]
    Closed,
    /// Still being drawn; the last point is a live preview that follows the pointer
    Constructing,
}

/// Behaviour shared by every shape variant.
pub trait MeasurementShape {
    fn shape_type(&self) -> ShapeType;

    fn center(&self) -> Point;

    fn set_center(&mut self, center: Point);

    /// Reported angle in degrees.
    fn angle(&self) -> f64;

    /// Orientation used as the rotation reference, in radians.
    fn orientation(&self) -> f64;

    /// Rebuilds the render form from the control points.
    fn update_from_controlpoints(&mut self);

    fn render_form(&self) -> &RenderForm;

    /// Ordered measurements in pixel units.
    fn output_properties(&self) -> OutputProperties;

    /// Names accepted by `update_property`.
    fn modifiable_properties(&self) -> &'static [&'static str];

    /// Applies a user-edited value expressed in scaled units.
    fn update_property(
        &mut self,
        name: &str,
        value: &PropertyValue,
        scaling_factor: f64,
    ) -> Result<(), ShapeError>;

    fn save(&self) -> ShapeParams;

    /// Rebuilds control points from saved parameters.
    fn restore(&mut self, params: &ShapeParams) -> Result<(), ShapeError>;

    fn handles(&self) -> Vec<Point>;

    fn handles_visible(&self) -> bool;

    fn active_handle(&self) -> Option<usize>;

    fn select(&mut self, visible: bool, handle: Option<usize>);

    fn drag_handle(&mut self, end: Point, modifiers: Modifiers, snap_step: Option<f64>);

    fn supports_rotation(&self) -> bool;

    fn set_drag_reference_angle(&mut self, reference: f64);

    /// Rotates so the grabbed point follows a pointer at `pointer_bearing`.
    fn rotate(&mut self, pointer_bearing: f64, snap_step: Option<f64>);

    /// Maps every control point through `map` and turns box angles by `angle_delta`.
    fn transform(&mut self, map: &dyn Fn(Point) -> Point, angle_delta: f64);

    fn contains_point(&self, p: &Point, tolerance: f64) -> bool;

    fn bounds(&self) -> Option<BoundingBox>;

    fn intensity_profile(&self, image: &IntensityImage, options: &ProfileOptions)
        -> IntensityProfile;
}

/// A measurement shape of any variant.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Rectangle(MeasureRectangle),
    Ellipse(MeasureEllipse),
    Line(MeasureLine),
    Polygon(MeasurePolygon),
}

macro_rules! dispatch {
    ($self:expr, $s:ident => $body:expr) => {
        match $self {
            Shape::Rectangle($s) => $body,
            Shape::Ellipse($s) => $body,
            Shape::Line($s) => $body,
            Shape::Polygon($s) => $body,
        }
    };
}

impl Shape {
    /// Creates a degenerate shape of `shape_type` anchored at `at`, ready for
    /// its creation handle to be dragged.
    pub fn new_at(shape_type: ShapeType, at: Point) -> Self {
        match shape_type {
            ShapeType::Rectangle => Shape::Rectangle(MeasureRectangle::new(at, 0.0, 0.0, 0.0)),
            ShapeType::Ellipse => Shape::Ellipse(MeasureEllipse::new(at, 0.0, 0.0, 0.0)),
            ShapeType::Line => Shape::Line(MeasureLine::new(LineKind::Line, vec![at, at])),
            ShapeType::Angle => Shape::Line(MeasureLine::new(LineKind::Angle, vec![at, at])),
            ShapeType::MultiLine => {
                Shape::Line(MeasureLine::new(LineKind::MultiLine, vec![at, at]))
            }
            ShapeType::Polygon => Shape::Polygon(MeasurePolygon::new(vec![at, at])),
        }
    }

    /// Builds a shape of `shape_type` from saved parameters.
    pub fn from_params(shape_type: ShapeType, params: &ShapeParams) -> Result<Self, ShapeError> {
        let mut shape = Self::new_at(shape_type, Point::ORIGIN);
        shape.restore(params)?;
        Ok(shape)
    }

    /// Index of the handle dragged while the shape is being created.
    pub fn creation_handle(&self) -> usize {
        match self {
            // dragging corner 1 away from corner 3 grows width and height positively
            Shape::Rectangle(_) | Shape::Ellipse(_) => 1,
            Shape::Line(s) => s.control_points().len().saturating_sub(1),
            Shape::Polygon(s) => s.control_points().len().saturating_sub(1),
        }
    }

    pub fn polyline(&self) -> Option<&PolylineControlPoints> {
        match self {
            Shape::Line(s) => Some(s.control_points()),
            Shape::Polygon(s) => Some(s.control_points()),
            _ => None,
        }
    }

    pub fn is_polyline(&self) -> bool {
        self.polyline().is_some()
    }

    /// Maximum number of points, `None` when unbounded or not a polyline.
    pub fn max_points(&self) -> Option<usize> {
        match self {
            Shape::Line(s) => s.kind().max_points(),
            _ => None,
        }
    }

    pub fn build_state(&self) -> BuildState {
        match self {
            Shape::Line(s) => s.build_state(),
            Shape::Polygon(s) => s.build_state(),
            _ => BuildState::Closed,
        }
    }

    pub fn set_build_state(&mut self, state: BuildState) {
        match self {
            Shape::Line(s) => s.set_build_state(state),
            Shape::Polygon(s) => s.set_build_state(state),
            _ => {}
        }
    }

    pub fn add_point(&mut self, point: Point, index: usize) -> Option<usize> {
        match self {
            Shape::Line(s) => Some(s.add_point(point, index)),
            Shape::Polygon(s) => Some(s.add_point(point, index)),
            _ => None,
        }
    }

    pub fn remove_point(&mut self, index: usize) -> Option<Point> {
        match self {
            Shape::Line(s) => s.remove_point(index),
            Shape::Polygon(s) => s.remove_point(index),
            _ => None,
        }
    }

    /// Drops the live preview point and closes the polyline.
    pub fn finish_construction(&mut self) {
        if self.build_state() != BuildState::Constructing {
            return;
        }
        match self {
            Shape::Line(s) => s.drop_preview_point(),
            Shape::Polygon(s) => s.drop_preview_point(),
            _ => {}
        }
    }

    /// Starts a new live trailing point at `at`.
    pub fn begin_append(&mut self, at: Point) -> bool {
        match self {
            Shape::Line(s) => s.begin_append(at),
            Shape::Polygon(s) => s.begin_append(at),
            _ => false,
        }
    }
}

impl MeasurementShape for Shape {
    fn shape_type(&self) -> ShapeType {
        dispatch!(self, s => s.shape_type())
    }

    fn center(&self) -> Point {
        dispatch!(self, s => s.center())
    }

    fn set_center(&mut self, center: Point) {
        dispatch!(self, s => s.set_center(center))
    }

    fn angle(&self) -> f64 {
        dispatch!(self, s => s.angle())
    }

    fn orientation(&self) -> f64 {
        dispatch!(self, s => s.orientation())
    }

    fn update_from_controlpoints(&mut self) {
        dispatch!(self, s => s.update_from_controlpoints())
    }

    fn render_form(&self) -> &RenderForm {
        dispatch!(self, s => s.render_form())
    }

    fn output_properties(&self) -> OutputProperties {
        dispatch!(self, s => s.output_properties())
    }

    fn modifiable_properties(&self) -> &'static [&'static str] {
        dispatch!(self, s => s.modifiable_properties())
    }

    fn update_property(
        &mut self,
        name: &str,
        value: &PropertyValue,
        scaling_factor: f64,
    ) -> Result<(), ShapeError> {
        dispatch!(self, s => s.update_property(name, value, scaling_factor))
    }

    fn save(&self) -> ShapeParams {
        dispatch!(self, s => s.save())
    }

    fn restore(&mut self, params: &ShapeParams) -> Result<(), ShapeError> {
        dispatch!(self, s => s.restore(params))
    }

    fn handles(&self) -> Vec<Point> {
        dispatch!(self, s => s.handles())
    }

    fn handles_visible(&self) -> bool {
        dispatch!(self, s => s.handles_visible())
    }

    fn active_handle(&self) -> Option<usize> {
        dispatch!(self, s => s.active_handle())
    }

    fn select(&mut self, visible: bool, handle: Option<usize>) {
        dispatch!(self, s => s.select(visible, handle))
    }

    fn drag_handle(&mut self, end: Point, modifiers: Modifiers, snap_step: Option<f64>) {
        dispatch!(self, s => s.drag_handle(end, modifiers, snap_step))
    }

    fn supports_rotation(&self) -> bool {
        dispatch!(self, s => s.supports_rotation())
    }

    fn set_drag_reference_angle(&mut self, reference: f64) {
        dispatch!(self, s => s.set_drag_reference_angle(reference))
    }

    fn rotate(&mut self, pointer_bearing: f64, snap_step: Option<f64>) {
        dispatch!(self, s => s.rotate(pointer_bearing, snap_step))
    }

    fn transform(&mut self, map: &dyn Fn(Point) -> Point, angle_delta: f64) {
        dispatch!(self, s => s.transform(map, angle_delta))
    }

    fn contains_point(&self, p: &Point, tolerance: f64) -> bool {
        dispatch!(self, s => s.contains_point(p, tolerance))
    }

    fn bounds(&self) -> Option<BoundingBox> {
        dispatch!(self, s => s.bounds())
    }

    fn intensity_profile(
        &self,
        image: &IntensityImage,
        options: &ProfileOptions,
    ) -> IntensityProfile {
        dispatch!(self, s => s.intensity_profile(image, options))
    }
}

/// Rejects scaling factors that would corrupt geometry.
pub(crate) fn check_scaling_factor(scaling_factor: f64) -> Result<(), ShapeError> {
    if scaling_factor.is_finite() && scaling_factor > 0.0 {
        Ok(())
    } else {
        Err(ShapeError::InvalidScalingFactor(scaling_factor))
    }
}

pub(crate) fn not_modifiable(name: &str, shape: ShapeType) -> ShapeError {
    ShapeError::PropertyNotModifiable {
        property: name.to_string(),
        shape,
    }
}

pub(crate) fn invalid_value(name: &str, reason: &str) -> ShapeError {
    ShapeError::InvalidPropertyValue {
        property: name.to_string(),
        reason: reason.to_string(),
    }
}

pub(crate) fn invalid_params(shape: ShapeType, reason: &str) -> ShapeError {
    ShapeError::InvalidParameters {
        shape,
        reason: reason.to_string(),
    }
}
