//! Measurement output values.

use serde::{Deserialize, Serialize};

use micromeasure_core::units::DEGREES;
use micromeasure_core::{Calibration, Point};

/// Unit of pixel lengths.
pub const LENGTH_UNIT: &str = "px";
/// Unit of pixel areas.
pub const AREA_UNIT: &str = "px²";

/// What a property measures, which decides how calibration scales it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Dimension {
    Length,
    Area,
    Angle,
}

/// A measured value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Scalar(f64),
    Pair(f64, f64),
    List(Vec<f64>),
}

impl PropertyValue {
    pub fn as_scalar(&self) -> Option<f64> {
        match self {
            Self::Scalar(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_pair(&self) -> Option<(f64, f64)> {
        match self {
            Self::Pair(a, b) => Some((*a, *b)),
            _ => None,
        }
    }

    pub fn as_point(&self) -> Option<Point> {
        self.as_pair().map(Point::from)
    }

    pub fn map(&self, f: impl Fn(f64) -> f64) -> Self {
        match self {
            Self::Scalar(v) => Self::Scalar(f(*v)),
            Self::Pair(a, b) => Self::Pair(f(*a), f(*b)),
            Self::List(values) => Self::List(values.iter().copied().map(f).collect()),
        }
    }

    pub fn is_finite(&self) -> bool {
        match self {
            Self::Scalar(v) => v.is_finite(),
            Self::Pair(a, b) => a.is_finite() && b.is_finite(),
            Self::List(values) => values.iter().all(|v| v.is_finite()),
        }
    }
}

impl From<Point> for PropertyValue {
    fn from(p: Point) -> Self {
        Self::Pair(p.x, p.y)
    }
}

/// One named measurement with its unit string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    pub name: String,
    pub value: PropertyValue,
    pub unit: String,
    pub dimension: Dimension,
}

/// Ordered measurement mapping.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OutputProperties(Vec<Property>);

impl OutputProperties {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn length(mut self, name: &str, value: impl Into<PropertyValue>) -> Self {
        self.push(name, value.into(), LENGTH_UNIT, Dimension::Length);
        self
    }

    pub fn area(mut self, name: &str, value: f64) -> Self {
        self.push(name, PropertyValue::Scalar(value), AREA_UNIT, Dimension::Area);
        self
    }

    pub fn angle(mut self, name: &str, degrees: f64) -> Self {
        self.push(name, PropertyValue::Scalar(degrees), DEGREES, Dimension::Angle);
        self
    }

    fn push(&mut self, name: &str, value: PropertyValue, unit: &str, dimension: Dimension) {
        self.0.push(Property {
            name: name.to_string(),
            value,
            unit: unit.to_string(),
            dimension,
        });
    }

    pub fn get(&self, name: &str) -> Option<&PropertyValue> {
        self.0.iter().find(|p| p.name == name).map(|p| &p.value)
    }

    pub fn scalar(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(PropertyValue::as_scalar)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn names(&self) -> Vec<&str> {
        self.0.iter().map(|p| p.name.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Property> {
        self.0.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Property> {
        self.0.iter_mut()
    }

    /// Converts pixel values into the calibrated unit: lengths scale with the
    /// factor, areas with its square, angles are untouched.
    pub fn scaled(&self, calibration: &Calibration) -> Self {
        let factor = calibration.factor_or_unit();
        let unit = calibration.display_unit();
        let scaled = self
            .0
            .iter()
            .map(|p| match p.dimension {
                Dimension::Length => Property {
                    value: p.value.map(|v| v * factor),
                    unit: unit.symbol().to_string(),
                    ..p.clone()
                },
                Dimension::Area => Property {
                    value: p.value.map(|v| v * factor * factor),
                    unit: unit.area_symbol(),
                    ..p.clone()
                },
                Dimension::Angle => p.clone(),
            })
            .collect();
        Self(scaled)
    }

    /// Applies `f` to the value of the named property, if present.
    pub fn update(&mut self, name: &str, f: impl FnOnce(&PropertyValue) -> PropertyValue) {
        if let Some(p) = self.0.iter_mut().find(|p| p.name == name) {
            p.value = f(&p.value);
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<f64> for PropertyValue {
    fn from(v: f64) -> Self {
        Self::Scalar(v)
    }
}

impl From<Vec<f64>> for PropertyValue {
    fn from(values: Vec<f64>) -> Self {
        Self::List(values)
    }
}

impl From<(f64, f64)> for PropertyValue {
    fn from((a, b): (f64, f64)) -> Self {
        Self::Pair(a, b)
    }
}
