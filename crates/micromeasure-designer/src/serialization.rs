//! Saved measurement records.
//!
//! A record is a JSON array of two to five elements:
//!
//! 1. PNG bytes of the unrotated image, or `null`
//! 2. structure data: `[[name, [[tag, params], ...]], ...]`
//! 3. scaling: `[pixels, length, unit]`, each possibly `null`
//! 4. origin: `[x, y]`
//! 5. image rotation in degrees, clockwise positive
//!
//! Missing trailing elements take their defaults: no scaling, origin at
//! `(0, 0)` and no rotation.

use std::io::Cursor;

use image::{ImageFormat, RgbImage};
use serde_json::Value;

use micromeasure_core::{Calibration, LengthUnit, Point};

use crate::error::PersistenceError;
use crate::model::{Shape, ShapeParams, ShapeType};

/// Supported range of record arity.
pub const MIN_RECORD_LEN: usize = 2;
pub const MAX_RECORD_LEN: usize = 5;

/// One saved shape: its type and the parameters that rebuild it.
#[derive(Debug, Clone, PartialEq)]
pub struct SavedShape {
    pub shape_type: ShapeType,
    pub params: ShapeParams,
}

impl SavedShape {
    pub fn to_shape(&self) -> Result<Shape, PersistenceError> {
        Ok(Shape::from_params(self.shape_type, &self.params)?)
    }
}

/// Decoded saved state.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SavedRecord {
    pub image: Option<RgbImage>,
    pub structures: Vec<(String, Vec<SavedShape>)>,
    pub calibration: Calibration,
    pub origin: Point,
    pub rotation_degrees: i32,
}

impl SavedRecord {
    /// Encodes the full five-element record.
    pub fn to_json(&self) -> Result<Vec<u8>, PersistenceError> {
        let image = match &self.image {
            Some(image) => Value::from(encode_png(image)?),
            None => Value::Null,
        };
        let structures = self
            .structures
            .iter()
            .map(|(name, shapes)| {
                let shapes = shapes
                    .iter()
                    .map(|s| {
                        Ok(Value::Array(vec![
                            Value::from(s.shape_type.tag()),
                            serde_json::to_value(&s.params)?,
                        ]))
                    })
                    .collect::<Result<Vec<_>, serde_json::Error>>()?;
                Ok(Value::Array(vec![Value::from(name.as_str()), Value::Array(shapes)]))
            })
            .collect::<Result<Vec<_>, serde_json::Error>>()?;
        let scaling = serde_json::to_value((
            self.calibration.pixels,
            self.calibration.length,
            self.calibration.unit.map(|u| u.symbol()),
        ))?;
        let record = Value::Array(vec![
            image,
            Value::Array(structures),
            scaling,
            serde_json::to_value((self.origin.x, self.origin.y))?,
            Value::from(self.rotation_degrees),
        ]);
        Ok(serde_json::to_vec(&record)?)
    }

    /// Decodes a record of any supported arity.
    pub fn from_json(bytes: &[u8]) -> Result<Self, PersistenceError> {
        let value: Value = serde_json::from_slice(bytes)?;
        let Value::Array(elements) = value else {
            return Err(PersistenceError::Malformed("record is not an array".to_string()));
        };
        if !(MIN_RECORD_LEN..=MAX_RECORD_LEN).contains(&elements.len()) {
            return Err(PersistenceError::UnsupportedArity(elements.len()));
        }
        let mut elements = elements.into_iter();

        let image = match elements.next() {
            Some(Value::Null) | None => None,
            Some(value) => {
                let bytes: Vec<u8> = serde_json::from_value(value)?;
                Some(decode_png(&bytes)?)
            }
        };
        let structures = match elements.next() {
            Some(value) => decode_structures(value)?,
            None => Vec::new(),
        };
        let calibration = match elements.next() {
            Some(value) => decode_scaling(value)?,
            None => Calibration::default(),
        };
        let origin = match elements.next() {
            Some(value) => {
                let (x, y): (f64, f64) = serde_json::from_value(value)?;
                Point::new(x, y)
            }
            None => Point::ORIGIN,
        };
        let rotation_degrees = match elements.next() {
            Some(value) => serde_json::from_value::<f64>(value)?.round() as i32,
            None => 0,
        };
        if rotation_degrees % 90 != 0 {
            return Err(PersistenceError::Malformed(format!(
                "rotation {rotation_degrees}° is not a multiple of 90°"
            )));
        }

        Ok(Self {
            image,
            structures,
            calibration,
            origin,
            rotation_degrees,
        })
    }
}

fn decode_structures(value: Value) -> Result<Vec<(String, Vec<SavedShape>)>, PersistenceError> {
    let entries: Vec<(String, Vec<(String, Value)>)> = serde_json::from_value(value)?;
    entries
        .into_iter()
        .map(|(name, shapes)| {
            let shapes = shapes
                .into_iter()
                .map(|(tag, params)| {
                    let shape_type: ShapeType = tag
                        .parse()
                        .map_err(PersistenceError::UnknownShapeTag)?;
                    let params: ShapeParams = serde_json::from_value(params)?;
                    Ok(SavedShape { shape_type, params })
                })
                .collect::<Result<Vec<_>, PersistenceError>>()?;
            Ok((name, shapes))
        })
        .collect()
}

fn decode_scaling(value: Value) -> Result<Calibration, PersistenceError> {
    let (pixels, length, unit): (Option<f64>, Option<f64>, Option<String>) =
        serde_json::from_value(value)?;
    let unit = unit
        .map(|u| u.parse::<LengthUnit>())
        .transpose()
        .map_err(PersistenceError::Malformed)?;
    Ok(Calibration {
        pixels,
        length,
        unit,
    })
}

pub fn encode_png(image: &RgbImage) -> Result<Vec<u8>, PersistenceError> {
    let mut bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .map_err(|e| PersistenceError::CorruptImage(e.to_string()))?;
    Ok(bytes)
}

pub fn decode_png(bytes: &[u8]) -> Result<RgbImage, PersistenceError> {
    image::load_from_memory_with_format(bytes, ImageFormat::Png)
        .map(|img| img.to_rgb8())
        .map_err(|e| PersistenceError::CorruptImage(e.to_string()))
}
