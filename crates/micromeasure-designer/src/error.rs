//! Error types for the designer crate.
//!
//! - `RegistryError`: structure naming and type-homogeneity violations
//! - `ShapeError`: rejected property edits
//! - `PersistenceError`: malformed saved state
//!
//! `DesignerError` wraps all of them for callers that do not care which layer
//! failed.

use crate::model::ShapeType;
use thiserror::Error;

/// Structure registry errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RegistryError {
    /// Structure already holds shapes of a different type
    #[error("Structure '{structure}' holds {existing} shapes, cannot add a {requested}")]
    TypeMismatch {
        structure: String,
        existing: ShapeType,
        requested: ShapeType,
    },

    /// Structure names must be non-empty
    #[error("Invalid structure name: '{0}'")]
    InvalidName(String),

    /// Target name of a rename is already in use
    #[error("Structure '{0}' already exists")]
    NameTaken(String),

    #[error("Structure '{0}' not found")]
    StructureNotFound(String),

    #[error("Shape {0} not found")]
    ShapeNotFound(u64),
}

/// Shape property and parameter errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ShapeError {
    #[error("Property '{property}' of a {shape} cannot be modified")]
    PropertyNotModifiable { property: String, shape: ShapeType },

    #[error("Invalid value for '{property}': {reason}")]
    InvalidPropertyValue { property: String, reason: String },

    #[error("Scaling factor must be positive and finite, got {0}")]
    InvalidScalingFactor(f64),

    #[error("Shape {0} is not editable")]
    NotEditable(u64),

    #[error("Invalid parameters for {shape}: {reason}")]
    InvalidParameters { shape: ShapeType, reason: String },
}

/// Saved-state decoding errors
#[derive(Error, Debug)]
pub enum PersistenceError {
    /// Record tuple has fewer than 2 or more than 5 elements
    #[error("Unsupported record arity {0}, expected 2 to 5 elements")]
    UnsupportedArity(usize),

    #[error("Unknown shape tag: '{0}'")]
    UnknownShapeTag(String),

    #[error("Corrupt image data: {0}")]
    CorruptImage(String),

    #[error("Malformed record: {0}")]
    Malformed(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Shape error: {0}")]
    Shape(#[from] ShapeError),

    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),
}

/// Top-level error of the designer crate
#[derive(Error, Debug)]
pub enum DesignerError {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Shape(#[from] ShapeError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for designer operations.
pub type Result<T> = std::result::Result<T, DesignerError>;
