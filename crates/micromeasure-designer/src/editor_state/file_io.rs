//! File I/O operations (save, load, new, export) for editor state.

use std::path::Path;

use anyhow::Context;

use super::EditorState;
use crate::coordinates::apply_rotation;
use crate::error::PersistenceError;
use crate::model::MeasurementShape;
use crate::serialization::{SavedRecord, SavedShape};
use crate::shape_store::{DrawingObject, ShapeStore};
use crate::structures::StructureRegistry;

impl EditorState {
    /// Builds the persisted record of the current state.
    pub fn to_record(&self) -> SavedRecord {
        let structures = self
            .structures
            .iter()
            .map(|structure| {
                let shapes = structure
                    .members
                    .iter()
                    .filter_map(|id| self.shapes.get(*id))
                    .map(|obj| SavedShape {
                        shape_type: obj.shape_type(),
                        params: obj.shape.save(),
                    })
                    .collect();
                (structure.name.clone(), shapes)
            })
            .collect();
        SavedRecord {
            image: self.source_image.clone(),
            structures,
            calibration: self.calibration.clone(),
            origin: self.origin,
            rotation_degrees: self.rotation_degrees,
        }
    }

    /// Replaces the document with a decoded record.
    ///
    /// Shapes and structures are built aside first; on any error the current
    /// state is left untouched.
    pub fn apply_record(&mut self, record: SavedRecord) -> Result<(), PersistenceError> {
        let mut shapes = ShapeStore::new();
        let mut structures = StructureRegistry::new();
        for (name, saved) in &record.structures {
            for entry in saved {
                let shape = entry.to_shape()?;
                let id = shapes.generate_id();
                structures.save_object(Some(name), id, entry.shape_type)?;
                shapes.insert(DrawingObject::new(id, shape));
            }
        }

        self.shapes = shapes;
        self.structures = structures;
        self.calibration = record.calibration;
        self.origin = record.origin;
        self.scale_bar = None;
        self.rotation_degrees = record.rotation_degrees.rem_euclid(360);
        self.image = record
            .image
            .as_ref()
            .map(|source| apply_rotation(source, self.rotation_degrees));
        self.source_image = record.image;
        self.clear_history();
        Ok(())
    }

    /// Save measurements to file.
    pub fn save_to_file(&mut self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let path = path.as_ref();
        let bytes = self
            .to_record()
            .to_json()
            .context("Failed to encode measurements")?;
        std::fs::write(path, bytes)
            .with_context(|| format!("Failed to write {}", path.display()))?;

        self.current_file_path = Some(path.to_path_buf());
        self.is_modified = false;
        tracing::info!("Saved measurements to {}", path.display());
        Ok(())
    }

    /// Load measurements from file. A failed load leaves the state unchanged.
    pub fn load_from_file(&mut self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let path = path.as_ref();
        let bytes =
            std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
        let record = SavedRecord::from_json(&bytes)
            .with_context(|| format!("Failed to decode {}", path.display()))?;
        self.apply_record(record)
            .with_context(|| format!("Failed to load {}", path.display()))?;

        self.document_name = path
            .file_stem()
            .and_then(|n| n.to_str())
            .unwrap_or("Untitled")
            .to_string();
        self.current_file_path = Some(path.to_path_buf());
        self.is_modified = false;
        tracing::info!(
            "Loaded {} shapes in {} structures from {}",
            self.shapes.len(),
            self.structures.len(),
            path.display()
        );
        Ok(())
    }

    /// Writes the coordinate dump.
    pub fn export_coordinates_to_file(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let path = path.as_ref();
        std::fs::write(path, crate::export::export_coordinates(self))
            .with_context(|| format!("Failed to write {}", path.display()))?;
        tracing::info!("Exported coordinates to {}", path.display());
        Ok(())
    }

    /// Clears shapes, structures, image and history.
    pub fn new_document(&mut self) {
        *self = Self::with_settings(self.settings.clone());
    }

    /// Get display name for the document.
    pub fn display_name(&self) -> String {
        let name = if let Some(path) = &self.current_file_path {
            path.file_name()
                .and_then(|n| n.to_str())
                .unwrap_or(&self.document_name)
        } else {
            &self.document_name
        };

        if self.is_modified {
            format!("{}*", name)
        } else {
            name.to_string()
        }
    }
}
