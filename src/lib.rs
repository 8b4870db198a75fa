//! # MicroMeasure
//!
//! Interactive measurement of structures in micrographs:
//! - Rectangles, ellipses, lines, angles, multi-lines and polygons drawn over
//!   an image and edited through drag handles
//! - Named structures grouping shapes of one type
//! - Calibration from a detected scale bar, origin offset and quarter-turn
//!   image rotation
//! - Undo/redo for every edit, saved records and coordinate export
//!
//! ## Architecture
//!
//! MicroMeasure is organized as a workspace with multiple crates:
//!
//! 1. **micromeasure-core** - Geometry, units, calibration and settings
//! 2. **micromeasure-designer** - Shapes, canvas controller, structures,
//!    history, scale bar, persistence
//! 3. **micromeasure** - This crate: re-exports and logging setup

// Re-export modules
pub use micromeasure_core::{geometry, settings, units};
pub use micromeasure_designer as designer;

pub use micromeasure_core::{
    BoundingBox, Calibration, ConfigError, EditorSettings, LengthUnit, Point, SettingsError,
};

pub use micromeasure_designer::{
    export_coordinates, BuildState, Canvas, DesignerCommand, DesignerError, DragState,
    EditorState, Hit, IntensityProfile, Key, LineKind, MeasureEllipse, MeasureLine,
    MeasurePolygon, MeasureRectangle, MeasurementShape, Modifiers, Outcome, OutputProperties,
    PersistenceError, PointerButton, PointerEvent, PropertyValue, RegistryError,
    RotationDirection, SavedRecord, ScaleBarParams, Shape, ShapeError, ShapeParams, ShapeType,
    StructureRegistry, Tool,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Initialize logging with the default configuration
///
/// Sets up structured logging with:
/// - Console output with pretty formatting
/// - RUST_LOG environment variable support
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into());

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stdout)
        .with_target(true)
        .with_level(true)
        .with_thread_ids(true)
        .with_thread_names(true)
        .with_line_number(true)
        .pretty();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}
