//! # MicroMeasure Designer
//!
//! The interactive measurement editing core: shapes drawn over a micrograph,
//! the handles used to edit them, and everything needed to turn pixel
//! geometry into calibrated measurements.
//!
//! ## Core Components
//!
//! - **Control points**: box handles (center, signed size, angle) and
//!   polyline handles
//! - **Shapes**: rectangle, ellipse, line/angle/multi-line and polygon
//! - **Canvas**: tool modes, hit-testing and the pointer drag state machine
//! - **Structures**: named, type-homogeneous groups of shapes
//! - **History**: snapshot-based undo/redo commands
//! - **Scale bar**: flood-fill detection of the image scale bar
//! - **Coordinates**: origin offset and quarter-turn image rotation
//! - **Profiles**: intensity sampling along shapes
//! - **Persistence**: saved records and coordinate export
//!
//! ## Architecture
//!
//! ```text
//! Canvas (pointer/key events)
//!   └── EditorState
//!         ├── ShapeStore (draw order, visibility, selection)
//!         ├── StructureRegistry (name -> shape ids)
//!         ├── History (DesignerCommand undo/redo)
//!         └── image, origin, calibration, scale bar
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use micromeasure_designer::{Canvas, EditorState, PointerEvent, Tool};
//!
//! let mut state = EditorState::new();
//! let mut canvas = Canvas::new();
//! canvas.set_tool(&mut state, Tool::Line);
//! canvas.pointer_press(&mut state, PointerEvent::left(Point::new(0.0, 0.0)));
//! canvas.pointer_move(&mut state, PointerEvent::left(Point::new(10.0, 0.0)));
//! canvas.pointer_release(&mut state, PointerEvent::left(Point::new(10.0, 0.0)));
//! ```

pub mod canvas;
pub mod commands;
pub mod control_points;
pub mod coordinates;
pub mod editor_state;
pub mod error;
pub mod export;
pub mod history;
pub mod model;
pub mod profile;
pub mod scale_bar;
pub mod serialization;
pub mod shape_store;
pub mod structures;

pub use canvas::{Canvas, DragState, Hit, Key, Outcome, PointerButton, PointerEvent, Tool};
pub use commands::DesignerCommand;
pub use control_points::{BoxControlPoints, Modifiers, PolylineControlPoints};
pub use coordinates::RotationDirection;
pub use editor_state::{DetachedShape, EditorState, RotationSnapshot};
pub use error::{DesignerError, PersistenceError, RegistryError, Result, ShapeError};
pub use export::export_coordinates;
pub use history::History;
pub use model::{
    BuildState, LineKind, MeasureEllipse, MeasureLine, MeasurePolygon, MeasureRectangle,
    MeasurementShape, OutputProperties, Property, PropertyValue, RenderForm, Shape, ShapeParams,
    ShapeType,
};
pub use profile::{IntensityImage, IntensityProfile, Interpolation, ProfileOptions};
pub use scale_bar::{ScaleBarDetection, ScaleBarParams};
pub use serialization::{SavedRecord, SavedShape};
pub use shape_store::{DrawingObject, ShapeStore};
pub use structures::{Structure, StructureRegistry, StructureSlot};

pub use micromeasure_core::{Calibration, LengthUnit, Point};
