//! Shape operations (add, delete, visibility, properties, points) for editor state.

use micromeasure_core::Point;

use super::EditorState;
use crate::commands::*;
use crate::error::{DesignerError, RegistryError, ShapeError};
use crate::model::{MeasurementShape, OutputProperties, PropertyValue, Shape, ShapeParams};
use crate::shape_store::DrawingObject;
use crate::structures::StructureSlot;

/// A shape taken off the canvas together with where it came from.
#[derive(Debug, Clone)]
pub struct DetachedShape {
    pub object: DrawingObject,
    /// Position in the draw order
    pub draw_index: usize,
    /// Position in the structure registry, if the shape was registered
    pub slot: Option<StructureSlot>,
}

impl EditorState {
    /// Adds a finished shape to a structure (a generated one when `None`)
    /// with undo.
    pub fn add_shape(
        &mut self,
        shape: Shape,
        structure: Option<&str>,
    ) -> Result<u64, RegistryError> {
        let id = self.insert_shape(shape, structure)?;
        self.record_command(DesignerCommand::CreateShape(CreateShape { id, detached: None }));
        Ok(id)
    }

    /// Puts a shape on the canvas and into the registry without recording
    /// anything. Nothing changes if the structure rejects the shape type.
    pub(crate) fn insert_shape(
        &mut self,
        shape: Shape,
        structure: Option<&str>,
    ) -> Result<u64, RegistryError> {
        let shape_type = shape.shape_type();
        if let Some(name) = structure {
            self.structures.check_creation_allowed(shape_type, name)?;
        }
        let id = self.shapes.generate_id();
        let name = self.structures.save_object(structure, id, shape_type)?;
        self.shapes.insert(DrawingObject::new(id, shape));
        tracing::debug!("Created {} {} in structure '{}'", shape_type, id, name);
        Ok(id)
    }

    /// Removes a shape from the canvas and the registry.
    ///
    /// A polyline still under construction loses its preview point and its
    /// handles are hidden, so the detached shape is always a finished one.
    pub fn detach_shape(&mut self, id: u64) -> Option<DetachedShape> {
        let (draw_index, mut object) = self.shapes.remove(id)?;
        let slot = self.structures.delete_object(id).ok();
        object.shape.finish_construction();
        object.shape.select(false, None);
        object.selected = false;
        tracing::debug!("Detached shape {}", id);
        Some(DetachedShape {
            object,
            draw_index,
            slot,
        })
    }

    /// Reverses `detach_shape`. A structure deleted in the meantime is recreated.
    pub fn attach_shape(&mut self, detached: DetachedShape) {
        let DetachedShape {
            object,
            draw_index,
            slot,
        } = detached;
        if let Some(slot) = slot {
            self.structures.insert_at(&slot, object.id, object.shape_type());
        }
        tracing::debug!("Attached shape {}", object.id);
        self.shapes.insert_at(draw_index, object);
    }

    /// Rebuilds a shape's geometry from a snapshot. Returns false if the shape
    /// is missing or the snapshot does not fit it.
    pub fn restore_shape_params(&mut self, id: u64, params: &ShapeParams) -> bool {
        let Some(obj) = self.shapes.get_mut(id) else {
            tracing::warn!("Cannot restore shape {}: not found", id);
            return false;
        };
        match obj.shape.restore(params) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("Cannot restore shape {}: {}", id, e);
                false
            }
        }
    }

    /// Deletes a shape with undo.
    pub fn delete_shape(&mut self, id: u64) -> Result<(), RegistryError> {
        if !self.shapes.contains(id) {
            return Err(RegistryError::ShapeNotFound(id));
        }
        self.push_command(DesignerCommand::DeleteShape(DeleteShape { id, detached: None }));
        tracing::info!("Deleted shape {}", id);
        Ok(())
    }

    /// Deletes every shape with a single undo step.
    pub fn delete_all_shapes(&mut self) {
        if self.shapes.is_empty() {
            return;
        }
        self.push_command(DesignerCommand::DeleteAllShapes(DeleteAllShapes::default()));
        tracing::info!("Deleted all shapes");
    }

    pub fn hide_all_shapes(&mut self) {
        self.push_command(DesignerCommand::HideAllShapes(VisibilityChange::default()));
    }

    pub fn show_all_shapes(&mut self) {
        self.push_command(DesignerCommand::ShowAllShapes(VisibilityChange::default()));
    }

    /// Sets every shape's visibility, returning the previous values.
    pub(crate) fn set_all_visible(&mut self, visible: bool) -> Vec<(u64, bool)> {
        self.shapes
            .iter_mut()
            .map(|obj| {
                let previous = obj.visible;
                obj.visible = visible;
                if !visible {
                    obj.selected = false;
                    obj.shape.select(false, None);
                }
                (obj.id, previous)
            })
            .collect()
    }

    /// Renames a structure with undo.
    pub fn rename_structure(&mut self, from: &str, to: &str) -> Result<(), RegistryError> {
        if from == to {
            return Ok(());
        }
        self.structures.rename_structure(from, to)?;
        tracing::info!("Renamed structure '{}' to '{}'", from, to);
        self.record_command(DesignerCommand::RenameStructure(RenameStructure {
            from: from.to_string(),
            to: to.to_string(),
        }));
        Ok(())
    }

    /// Measurements of a shape as displayed: centers relative to the origin,
    /// values converted by the calibration.
    pub fn measurements(&self, id: u64) -> Option<OutputProperties> {
        let obj = self.shapes.get(id)?;
        let mut props = obj.shape.output_properties();
        let origin = self.origin;
        props.update("center", |value| match value.as_point() {
            Some(center) => (center - origin).into(),
            None => value.clone(),
        });
        Some(props.scaled(&self.calibration))
    }

    /// Applies a user edit given in displayed units, with undo.
    ///
    /// `center` is interpreted relative to the origin, like `measurements`.
    pub fn update_shape_property(
        &mut self,
        id: u64,
        name: &str,
        value: PropertyValue,
    ) -> Result<(), DesignerError> {
        let factor = self.scaling_factor();
        let origin = self.origin;
        let obj = self
            .shapes
            .get_mut(id)
            .ok_or(RegistryError::ShapeNotFound(id))?;
        if !obj.editable {
            return Err(ShapeError::NotEditable(id).into());
        }
        let value = if name == "center" {
            value.as_point().map_or(value.clone(), |p| {
                PropertyValue::from(p + origin * factor)
            })
        } else {
            value
        };

        let before = obj.shape.save();
        obj.shape.update_property(name, &value, factor)?;
        let after = obj.shape.save();
        if before != after {
            self.record_command(DesignerCommand::UpdateShapeProperty(UpdateShapeProperty {
                id,
                property: name.to_string(),
                before,
                after,
            }));
        }
        Ok(())
    }

    /// Inserts a point into a polyline shape with undo. Returns the index used.
    pub fn insert_point(
        &mut self,
        id: u64,
        index: usize,
        point: Point,
    ) -> Result<usize, DesignerError> {
        let obj = self.editable_polyline(id)?;
        let before = obj.shape.save();
        let index = obj.shape.add_point(point, index).unwrap_or(index);
        let after = obj.shape.save();
        self.record_command(DesignerCommand::AddPoint(AddPoint { id, before, after }));
        Ok(index)
    }

    /// Removes a point from a polyline shape with undo. Polylines keep at
    /// least two points.
    pub fn remove_point(&mut self, id: u64, index: usize) -> Result<Point, DesignerError> {
        let obj = self.editable_polyline(id)?;
        let count = obj.shape.polyline().map_or(0, |cp| cp.len());
        if count <= 2 || index >= count {
            return Err(ShapeError::InvalidPropertyValue {
                property: "points".to_string(),
                reason: format!("cannot remove point {index} of {count}"),
            }
            .into());
        }
        let mut command = DesignerCommand::RemovePoint(RemovePoint {
            id,
            index,
            removed: None,
        });
        command.apply(self);
        let removed = match &command {
            DesignerCommand::RemovePoint(RemovePoint {
                removed: Some(p), ..
            }) => *p,
            _ => {
                return Err(ShapeError::InvalidPropertyValue {
                    property: "points".to_string(),
                    reason: format!("point {index} was not removed"),
                }
                .into())
            }
        };
        self.record_command(command);
        Ok(removed)
    }

    fn editable_polyline(&mut self, id: u64) -> Result<&mut DrawingObject, DesignerError> {
        let obj = self
            .shapes
            .get_mut(id)
            .ok_or(RegistryError::ShapeNotFound(id))?;
        if !obj.editable {
            return Err(ShapeError::NotEditable(id).into());
        }
        if !obj.shape.is_polyline() {
            return Err(ShapeError::PropertyNotModifiable {
                property: "points".to_string(),
                shape: obj.shape_type(),
            }
            .into());
        }
        Ok(obj)
    }
}
