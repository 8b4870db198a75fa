//! Reversible editor commands.
//!
//! Every command stores full snapshots of what it changes, never deltas, so
//! `undo` followed by `apply` reproduces the exact prior geometry. Commands
//! that record an interaction the user already performed (a drag, a point
//! commit) are constructed after the fact; applying them the first time is
//! then a no-op or an idempotent restore.

use micromeasure_core::{Calibration, Point};

use crate::coordinates::RotationDirection;
use crate::editor_state::{DetachedShape, EditorState, RotationSnapshot};
use crate::model::{MeasurementShape, ShapeParams};
use crate::scale_bar::ScaleBarDetection;

#[derive(Debug, Clone)]
#[allow(clippy::large_enum_variant)]
pub enum DesignerCommand {
    CreateShape(CreateShape),
    DeleteShape(DeleteShape),
    MoveOrResizeShape(MoveOrResizeShape),
    AddPoint(AddPoint),
    RemovePoint(RemovePoint),
    SetOrigin(SetOrigin),
    RotateImage90(RotateImage90),
    FindScaleBarWidth(FindScaleBarWidth),
    HideAllShapes(VisibilityChange),
    ShowAllShapes(VisibilityChange),
    DeleteAllShapes(DeleteAllShapes),
    RenameStructure(RenameStructure),
    UpdateShapeProperty(UpdateShapeProperty),
}

#[derive(Debug, Clone)]
pub struct CreateShape {
    pub id: u64,
    pub detached: Option<DetachedShape>, // None when on canvas, Some when undone
}

#[derive(Debug, Clone)]
pub struct DeleteShape {
    pub id: u64,
    pub detached: Option<DetachedShape>, // Some when deleted, None when undone
}

#[derive(Debug, Clone)]
pub struct MoveOrResizeShape {
    pub id: u64,
    pub before: ShapeParams,
    pub after: ShapeParams,
}

#[derive(Debug, Clone)]
pub struct AddPoint {
    pub id: u64,
    pub before: ShapeParams,
    pub after: ShapeParams,
}

#[derive(Debug, Clone)]
pub struct RemovePoint {
    pub id: u64,
    pub index: usize,
    pub removed: Option<Point>,
}

#[derive(Debug, Clone)]
pub struct SetOrigin {
    pub before: Point,
    pub after: Point,
}

#[derive(Debug, Clone)]
pub struct RotateImage90 {
    pub direction: RotationDirection,
    pub before: Option<RotationSnapshot>,
    pub after: Option<RotationSnapshot>,
}

impl RotateImage90 {
    pub fn new(direction: RotationDirection) -> Self {
        Self {
            direction,
            before: None,
            after: None,
        }
    }
}

/// Detection overlay and calibration before and after a detection (or a clear).
#[derive(Debug, Clone)]
pub struct FindScaleBarWidth {
    pub before: (Option<ScaleBarDetection>, Calibration),
    pub after: (Option<ScaleBarDetection>, Calibration),
}

/// Previous visibility of every shape touched by a hide/show-all.
#[derive(Debug, Clone, Default)]
pub struct VisibilityChange {
    pub previous: Vec<(u64, bool)>,
}

#[derive(Debug, Clone, Default)]
pub struct DeleteAllShapes {
    /// Detached top-most first
    pub detached: Vec<DetachedShape>,
}

#[derive(Debug, Clone)]
pub struct RenameStructure {
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone)]
pub struct UpdateShapeProperty {
    pub id: u64,
    pub property: String,
    pub before: ShapeParams,
    pub after: ShapeParams,
}

impl DesignerCommand {
    pub fn apply(&mut self, state: &mut EditorState) {
        match self {
            DesignerCommand::CreateShape(cmd) => {
                if let Some(detached) = cmd.detached.take() {
                    state.attach_shape(detached);
                }
            }
            DesignerCommand::DeleteShape(cmd) => {
                if let Some(detached) = state.detach_shape(cmd.id) {
                    cmd.detached = Some(detached);
                }
            }
            DesignerCommand::MoveOrResizeShape(cmd) => {
                state.restore_shape_params(cmd.id, &cmd.after);
            }
            DesignerCommand::AddPoint(cmd) => {
                state.restore_shape_params(cmd.id, &cmd.after);
            }
            DesignerCommand::RemovePoint(cmd) => {
                cmd.removed = state
                    .shapes
                    .get_mut(cmd.id)
                    .and_then(|obj| {
                        let removed = obj.shape.remove_point(cmd.index);
                        obj.shape.update_from_controlpoints();
                        removed
                    });
            }
            DesignerCommand::SetOrigin(cmd) => {
                state.origin = cmd.after;
            }
            DesignerCommand::RotateImage90(cmd) => match &cmd.after {
                Some(after) => state.restore_rotation(after),
                None => {
                    cmd.before = Some(state.capture_rotation());
                    state.perform_rotation(cmd.direction);
                    cmd.after = Some(state.capture_rotation());
                }
            },
            DesignerCommand::FindScaleBarWidth(cmd) => {
                state.scale_bar = cmd.after.0.clone();
                state.calibration = cmd.after.1.clone();
            }
            DesignerCommand::HideAllShapes(cmd) => {
                cmd.previous = state.set_all_visible(false);
            }
            DesignerCommand::ShowAllShapes(cmd) => {
                cmd.previous = state.set_all_visible(true);
            }
            DesignerCommand::DeleteAllShapes(cmd) => {
                cmd.detached.clear();
                for id in state.shapes.ids().into_iter().rev() {
                    if let Some(detached) = state.detach_shape(id) {
                        cmd.detached.push(detached);
                    }
                }
            }
            DesignerCommand::RenameStructure(cmd) => {
                if let Err(e) = state.structures.rename_structure(&cmd.from, &cmd.to) {
                    tracing::warn!("Rename of '{}' could not be reapplied: {}", cmd.from, e);
                }
            }
            DesignerCommand::UpdateShapeProperty(cmd) => {
                state.restore_shape_params(cmd.id, &cmd.after);
            }
        }
    }

    pub fn undo(&mut self, state: &mut EditorState) {
        match self {
            DesignerCommand::CreateShape(cmd) => match state.detach_shape(cmd.id) {
                Some(detached) => cmd.detached = Some(detached),
                None => tracing::warn!("Undo create: shape {} is already gone", cmd.id),
            },
            DesignerCommand::DeleteShape(cmd) => match cmd.detached.take() {
                Some(detached) => state.attach_shape(detached),
                None => tracing::warn!("Undo delete: shape {} was never removed", cmd.id),
            },
            DesignerCommand::MoveOrResizeShape(cmd) => {
                state.restore_shape_params(cmd.id, &cmd.before);
            }
            DesignerCommand::AddPoint(cmd) => {
                state.restore_shape_params(cmd.id, &cmd.before);
            }
            DesignerCommand::RemovePoint(cmd) => {
                let Some(point) = cmd.removed.take() else {
                    return;
                };
                if let Some(obj) = state.shapes.get_mut(cmd.id) {
                    obj.shape.add_point(point, cmd.index);
                    obj.shape.update_from_controlpoints();
                }
            }
            DesignerCommand::SetOrigin(cmd) => {
                state.origin = cmd.before;
            }
            DesignerCommand::RotateImage90(cmd) => {
                if let Some(before) = &cmd.before {
                    state.restore_rotation(before);
                }
            }
            DesignerCommand::FindScaleBarWidth(cmd) => {
                state.scale_bar = cmd.before.0.clone();
                state.calibration = cmd.before.1.clone();
            }
            DesignerCommand::HideAllShapes(cmd) | DesignerCommand::ShowAllShapes(cmd) => {
                for (id, visible) in &cmd.previous {
                    if let Some(obj) = state.shapes.get_mut(*id) {
                        obj.visible = *visible;
                    }
                }
            }
            DesignerCommand::DeleteAllShapes(cmd) => {
                while let Some(detached) = cmd.detached.pop() {
                    state.attach_shape(detached);
                }
            }
            DesignerCommand::RenameStructure(cmd) => {
                if let Err(e) = state.structures.rename_structure(&cmd.to, &cmd.from) {
                    tracing::warn!("Undo rename of '{}' failed: {}", cmd.to, e);
                }
            }
            DesignerCommand::UpdateShapeProperty(cmd) => {
                state.restore_shape_params(cmd.id, &cmd.before);
            }
        }
    }

    /// Returns the name of the command for display.
    pub fn name(&self) -> &str {
        match self {
            DesignerCommand::CreateShape(_) => "Create Shape",
            DesignerCommand::DeleteShape(_) => "Delete Shape",
            DesignerCommand::MoveOrResizeShape(_) => "Move/Resize Shape",
            DesignerCommand::AddPoint(_) => "Add Point",
            DesignerCommand::RemovePoint(_) => "Remove Point",
            DesignerCommand::SetOrigin(_) => "Set Origin",
            DesignerCommand::RotateImage90(cmd) => match cmd.direction {
                RotationDirection::Clockwise => "Rotate Image Clockwise",
                RotationDirection::CounterClockwise => "Rotate Image Counter-Clockwise",
            },
            DesignerCommand::FindScaleBarWidth(cmd) => {
                if cmd.after.0.is_some() {
                    "Find Scale Bar Width"
                } else {
                    "Clear Scale Bar"
                }
            }
            DesignerCommand::HideAllShapes(_) => "Hide All Shapes",
            DesignerCommand::ShowAllShapes(_) => "Show All Shapes",
            DesignerCommand::DeleteAllShapes(_) => "Delete All Shapes",
            DesignerCommand::RenameStructure(_) => "Rename Structure",
            DesignerCommand::UpdateShapeProperty(_) => "Update Shape Property",
        }
    }
}
