//! Editor state shared by the canvas controller and the command layer.
//!
//! This module is split into submodules:
//! - `history`: undo/redo entry points
//! - `shapes`: shape attach/detach, deletion, visibility, properties, points
//! - `transforms`: origin, image rotation, scale-bar detection, profiles
//! - `file_io`: save, load and coordinate export

mod file_io;
mod history;
mod shapes;
mod transforms;

pub use shapes::DetachedShape;
pub use transforms::RotationSnapshot;

use std::path::PathBuf;

use image::RgbImage;

use micromeasure_core::{Calibration, EditorSettings, Point};

use crate::history::History;
use crate::scale_bar::ScaleBarDetection;
use crate::shape_store::ShapeStore;
use crate::structures::StructureRegistry;

/// Everything the measurement editor knows about one image.
///
/// Shapes, structures, origin and scale bar are all expressed in the pixel
/// space of the currently displayed (possibly rotated) image.
#[derive(Debug, Clone)]
pub struct EditorState {
    pub shapes: ShapeStore,
    pub structures: StructureRegistry,
    /// User origin that displayed coordinates are relative to
    pub origin: Point,
    pub calibration: Calibration,
    /// Last scale-bar detection; drives the overlay
    pub scale_bar: Option<ScaleBarDetection>,
    pub settings: EditorSettings,
    pub current_file_path: Option<PathBuf>,
    pub is_modified: bool,
    pub document_name: String,
    pub(crate) history: History,
    /// Image as loaded, never rotated or written to
    source_image: Option<RgbImage>,
    /// `source_image` turned by `rotation_degrees`
    image: Option<RgbImage>,
    /// Clockwise positive, always a multiple of 90 in `[0, 360)`
    rotation_degrees: i32,
}

impl EditorState {
    /// Creates an empty editor state.
    pub fn new() -> Self {
        Self::with_settings(EditorSettings::default())
    }

    pub fn with_settings(settings: EditorSettings) -> Self {
        Self {
            shapes: ShapeStore::new(),
            structures: StructureRegistry::new(),
            origin: Point::ORIGIN,
            calibration: Calibration::default(),
            scale_bar: None,
            history: History::new(settings.history.max_depth),
            settings,
            current_file_path: None,
            is_modified: false,
            document_name: "Untitled".to_string(),
            source_image: None,
            image: None,
            rotation_degrees: 0,
        }
    }

    /// Replaces the image, dropping any rotation and scale-bar overlay.
    pub fn set_image(&mut self, image: RgbImage) {
        tracing::info!("Image set: {}x{}", image.width(), image.height());
        self.image = Some(image.clone());
        self.source_image = Some(image);
        self.rotation_degrees = 0;
        self.scale_bar = None;
    }

    /// Displayed image, with rotation applied.
    pub fn image(&self) -> Option<&RgbImage> {
        self.image.as_ref()
    }

    /// Image as originally loaded.
    pub fn source_image(&self) -> Option<&RgbImage> {
        self.source_image.as_ref()
    }

    pub fn rotation_degrees(&self) -> i32 {
        self.rotation_degrees
    }

    /// Physical units per pixel, 1 while uncalibrated.
    pub fn scaling_factor(&self) -> f64 {
        self.calibration.factor_or_unit()
    }

    pub fn settings(&self) -> &EditorSettings {
        &self.settings
    }

    /// Replaces the settings and applies the new history depth.
    pub fn set_settings(&mut self, settings: EditorSettings) {
        self.history.set_max_depth(settings.history.max_depth);
        self.settings = settings;
    }

    /// Marks the document as modified.
    pub fn mark_modified(&mut self) {
        self.is_modified = true;
    }
}

impl Default for EditorState {
    fn default() -> Self {
        Self::new()
    }
}
