//! Canvas interaction controller.
//!
//! Turns pointer and key events into shape mutations on an [`EditorState`].
//! The active [`Tool`] picks the branch of press/move/release logic, and
//! [`DragState`] tracks what the pointer is doing between press and release.
//! Every committed change goes through the editor's undo history.

mod types;

pub use hit_test::{handle_at, hit_test, Hit};
pub use types::{DragState, Key, Outcome, PointerButton, PointerEvent, Tool};

use micromeasure_core::Point;

use crate::commands::{AddPoint, CreateShape, DesignerCommand, MoveOrResizeShape};
use crate::editor_state::EditorState;
use crate::model::{BuildState, MeasurementShape, Shape, ShapeParams, ShapeType};

/// Pointer-driven editing on top of an editor state.
#[derive(Debug, Clone, Default)]
pub struct Canvas {
    tool: Tool,
    drag: DragState,
    selected: Option<u64>,
    /// Structure new shapes join; a generated name is used when `None`
    active_structure: Option<String>,
    last_pointer: Point,
}

impl Canvas {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tool(&self) -> Tool {
        self.tool
    }

    /// Switches tool, finishing whatever interaction is in progress.
    pub fn set_tool(&mut self, state: &mut EditorState, tool: Tool) {
        if tool == self.tool {
            return;
        }
        self.finish_interaction(state);
        if !tool.edits_shapes() {
            self.deselect(state);
        }
        tracing::debug!("Tool changed: {:?} -> {:?}", self.tool, tool);
        self.tool = tool;
    }

    pub fn drag_state(&self) -> &DragState {
        &self.drag
    }

    pub fn selected_id(&self) -> Option<u64> {
        self.selected
    }

    pub fn active_structure(&self) -> Option<&str> {
        self.active_structure.as_deref()
    }

    pub fn set_active_structure(&mut self, name: Option<String>) {
        self.active_structure = name;
    }

    /// Selects a shape, showing its handles with `handle` active.
    pub fn select(&mut self, state: &mut EditorState, id: u64, handle: Option<usize>) {
        if self.selected != Some(id) {
            self.deselect(state);
        }
        if let Some(obj) = state.shapes.get_mut(id) {
            obj.selected = true;
            obj.shape.select(true, handle);
            self.selected = Some(id);
        }
    }

    pub fn deselect(&mut self, state: &mut EditorState) {
        if let Some(id) = self.selected.take() {
            if let Some(obj) = state.shapes.get_mut(id) {
                obj.selected = false;
                obj.shape.select(false, None);
            }
        }
    }

    pub fn pointer_press(&mut self, state: &mut EditorState, event: PointerEvent) -> Outcome {
        let pos = event.position;
        self.last_pointer = pos;

        match self.drag {
            DragState::Idle => {}
            DragState::Constructing { id, .. } => {
                // the release commits the preview point
                return match event.button {
                    PointerButton::Left => Outcome::Nothing,
                    PointerButton::Right => {
                        self.drag = DragState::Idle;
                        self.finish_construction(state, id)
                    }
                };
            }
            DragState::PendingPlacement { id } => {
                if event.button == PointerButton::Right {
                    return self.cancel_creation(state, id);
                }
                let snap = snap_step(state, &event);
                if let Some(obj) = state.shapes.get_mut(id) {
                    obj.visible = true;
                    obj.shape.drag_handle(pos, event.modifiers, snap);
                }
                self.drag = DragState::Creating {
                    id,
                    anchor: pos,
                    moved: true,
                };
                return Outcome::Updated(id);
            }
            _ => return Outcome::Nothing,
        }

        match self.tool {
            Tool::Move => {
                self.deselect(state);
                self.drag = DragState::Panning { last: pos };
                Outcome::Nothing
            }
            Tool::IdentifyScaling => match event.button {
                PointerButton::Left => state
                    .find_scale_bar_at(pos)
                    .map_or(Outcome::Nothing, Outcome::ScaleBarDetected),
                PointerButton::Right => {
                    state.clear_scale_bar();
                    Outcome::ScaleBarCleared
                }
            },
            Tool::SetOrigin => match event.button {
                PointerButton::Left => {
                    state.set_origin(pos);
                    Outcome::OriginSet(pos)
                }
                PointerButton::Right => Outcome::Nothing,
            },
            _ => self.press_on_shapes(state, event),
        }
    }

    fn press_on_shapes(&mut self, state: &mut EditorState, event: PointerEvent) -> Outcome {
        let pos = event.position;
        let tolerance = state.settings.interaction.hit_tolerance_px;
        let hit = hit_test(&state.shapes, pos, tolerance);

        match (event.button, hit) {
            (PointerButton::Right, Some(Hit::Handle { id, index }))
                if self.tool == Tool::Edit && has_removable_points(state, id) =>
            {
                match state.remove_point(id, index) {
                    Ok(_) => Outcome::PointRemoved { id, index },
                    Err(e) => {
                        tracing::warn!("Cannot remove point {} of shape {}: {}", index, id, e);
                        Outcome::Nothing
                    }
                }
            }
            (PointerButton::Right, Some(hit)) => self.delete(state, hit.id()),
            (PointerButton::Right, None) => Outcome::Nothing,
            (PointerButton::Left, Some(Hit::Handle { id, index })) if self.tool != Tool::Select => {
                self.grab(state, id, Some(index), pos)
            }
            (PointerButton::Left, Some(hit)) => self.grab(state, hit.id(), None, pos),
            (PointerButton::Left, None) => match self.tool.creates() {
                Some(shape_type) => self.create(state, shape_type, pos),
                None => {
                    self.deselect(state);
                    Outcome::Deselected
                }
            },
        }
    }

    /// Selects a shape and arms a drag: a handle drag when `handle` is set,
    /// a whole-shape move otherwise.
    fn grab(
        &mut self,
        state: &mut EditorState,
        id: u64,
        handle: Option<usize>,
        pos: Point,
    ) -> Outcome {
        self.select(state, id, handle);
        let Some(obj) = state.shapes.get_mut(id) else {
            return Outcome::Nothing;
        };
        if !obj.editable {
            return Outcome::Selected(id);
        }

        let center = obj.shape.center();
        if obj.shape.supports_rotation() {
            obj.shape
                .set_drag_reference_angle((pos - center).bearing() - obj.shape.orientation());
        }
        let before = obj.shape.save();
        self.drag = match handle {
            Some(_) => DragState::Handle { id, before },
            None => DragState::Moving {
                id,
                offset: pos - center,
                before,
            },
        };
        Outcome::Selected(id)
    }

    fn create(&mut self, state: &mut EditorState, shape_type: ShapeType, pos: Point) -> Outcome {
        self.deselect(state);
        let mut shape = Shape::new_at(shape_type, pos);
        shape.select(true, Some(shape.creation_handle()));

        match state.insert_shape(shape, self.active_structure.as_deref()) {
            Ok(id) => {
                if let Some(obj) = state.shapes.get_mut(id) {
                    // stays hidden until the pointer actually drags
                    obj.visible = false;
                    obj.selected = true;
                }
                self.selected = Some(id);
                self.drag = DragState::Creating {
                    id,
                    anchor: pos,
                    moved: false,
                };
                Outcome::Selected(id)
            }
            Err(e) => {
                tracing::info!("Creation of {} refused: {}", shape_type, e);
                Outcome::CreationRejected(e)
            }
        }
    }

    pub fn pointer_move(&mut self, state: &mut EditorState, event: PointerEvent) -> Outcome {
        let pos = event.position;
        self.last_pointer = pos;
        let snap = snap_step(state, &event);
        let min_drag = state.settings.interaction.min_drag_distance_px;

        match &mut self.drag {
            DragState::Idle => Outcome::Nothing,
            DragState::Panning { last } => {
                let delta = pos - *last;
                *last = pos;
                Outcome::Pan(delta)
            }
            DragState::Moving { id, offset, .. } => {
                let (id, offset) = (*id, *offset);
                let Some(obj) = state.shapes.get_mut(id) else {
                    return Outcome::Nothing;
                };
                if event.modifiers.rotate && obj.shape.supports_rotation() {
                    let bearing = (pos - obj.shape.center()).bearing();
                    obj.shape.rotate(bearing, snap);
                } else {
                    obj.shape.set_center(pos - offset);
                }
                Outcome::Updated(id)
            }
            DragState::Handle { id, .. } => {
                let id = *id;
                let Some(obj) = state.shapes.get_mut(id) else {
                    return Outcome::Nothing;
                };
                if event.modifiers.rotate && obj.shape.supports_rotation() {
                    let bearing = (pos - obj.shape.center()).bearing();
                    obj.shape.rotate(bearing, snap);
                } else {
                    obj.shape.drag_handle(pos, event.modifiers, snap);
                }
                Outcome::Updated(id)
            }
            DragState::Creating { id, anchor, moved } => {
                if !*moved && pos.distance_to(anchor) < min_drag {
                    return Outcome::Nothing;
                }
                *moved = true;
                let id = *id;
                drag_visible(state, id, pos, &event, snap)
            }
            DragState::PendingPlacement { id } | DragState::Constructing { id, .. } => {
                let id = *id;
                drag_visible(state, id, pos, &event, snap)
            }
        }
    }

    pub fn pointer_release(&mut self, state: &mut EditorState, event: PointerEvent) -> Outcome {
        let pos = event.position;
        self.last_pointer = pos;

        match std::mem::take(&mut self.drag) {
            DragState::Idle | DragState::Panning { .. } => Outcome::Nothing,
            DragState::Moving { id, before, .. } | DragState::Handle { id, before } => {
                self.commit_geometry(state, id, before)
            }
            DragState::Creating { id, moved: true, .. } => self.place(state, id, pos),
            DragState::Creating { id, moved: false, .. } | DragState::PendingPlacement { id } => {
                self.drag = DragState::PendingPlacement { id };
                Outcome::Nothing
            }
            DragState::Constructing { id, before } => {
                if event.button != PointerButton::Left {
                    self.drag = DragState::Constructing { id, before };
                    return Outcome::Nothing;
                }
                self.commit_point(state, id, before, &event)
            }
        }
    }

    /// Records a move, resize or rotation unless nothing actually changed.
    fn commit_geometry(&mut self, state: &mut EditorState, id: u64, before: ShapeParams) -> Outcome {
        let Some(obj) = state.shapes.get_mut(id) else {
            return Outcome::Nothing;
        };
        obj.shape.select(true, None);
        let after = obj.shape.save();
        if after == before {
            return Outcome::Nothing;
        }
        state.record_command(DesignerCommand::MoveOrResizeShape(MoveOrResizeShape {
            id,
            before,
            after,
        }));
        Outcome::Changed(id)
    }

    /// Finishes creation. Polylines that accept more points continue with a
    /// preview point under the pointer.
    fn place(&mut self, state: &mut EditorState, id: u64, pos: Point) -> Outcome {
        let Some(obj) = state.shapes.get_mut(id) else {
            return Outcome::Nothing;
        };
        obj.visible = true;
        let before = obj.shape.save();
        let constructing = obj.shape.begin_append(pos);
        if !constructing {
            obj.shape.select(true, None);
        }
        tracing::info!("Placed {} {}", obj.shape.shape_type(), id);

        state.record_command(DesignerCommand::CreateShape(CreateShape { id, detached: None }));
        if constructing {
            self.drag = DragState::Constructing { id, before };
        }
        Outcome::Created(id)
    }

    /// Moves the preview point to the release position, turns it into a
    /// vertex and starts the next one.
    fn commit_point(
        &mut self,
        state: &mut EditorState,
        id: u64,
        before: ShapeParams,
        event: &PointerEvent,
    ) -> Outcome {
        let pos = event.position;
        let snap = snap_step(state, event);
        let Some(obj) = state.shapes.get_mut(id) else {
            return Outcome::Nothing;
        };
        obj.shape.drag_handle(pos, event.modifiers, snap);
        obj.shape.set_build_state(BuildState::Closed);
        let after = obj.shape.save();
        let more = obj.shape.begin_append(pos);
        if !more {
            obj.shape.select(true, None);
        }

        state.record_command(DesignerCommand::AddPoint(AddPoint {
            id,
            before,
            after: after.clone(),
        }));
        if more {
            self.drag = DragState::Constructing { id, before: after };
        }
        Outcome::PointCommitted(id)
    }

    pub fn key_press(&mut self, state: &mut EditorState, key: Key) -> Outcome {
        match key {
            Key::Escape => match std::mem::take(&mut self.drag) {
                DragState::Constructing { id, .. } => self.finish_construction(state, id),
                DragState::Creating { id, .. } | DragState::PendingPlacement { id } => {
                    self.cancel_creation(state, id)
                }
                DragState::Moving { id, before, .. } | DragState::Handle { id, before } => {
                    state.restore_shape_params(id, &before);
                    Outcome::Updated(id)
                }
                DragState::Idle | DragState::Panning { .. } => {
                    self.deselect(state);
                    Outcome::Deselected
                }
            },
            Key::Delete => {
                self.finish_interaction(state);
                match self.selected {
                    Some(id) => self.delete(state, id),
                    None => Outcome::Nothing,
                }
            }
            Key::Char(c) if c == state.settings.interaction.append_point_key => {
                self.start_append(state)
            }
            Key::Char(_) => Outcome::Nothing,
        }
    }

    /// Starts a trailing preview point on the selected polyline.
    fn start_append(&mut self, state: &mut EditorState) -> Outcome {
        if self.drag != DragState::Idle {
            return Outcome::Nothing;
        }
        let Some(id) = self.selected else {
            return Outcome::Nothing;
        };
        let Some(obj) = state.shapes.get_mut(id) else {
            return Outcome::Nothing;
        };
        if !obj.editable || !obj.shape.is_polyline() {
            return Outcome::Nothing;
        }
        let before = obj.shape.save();
        if !obj.shape.begin_append(self.last_pointer) {
            return Outcome::Nothing;
        }
        self.drag = DragState::Constructing { id, before };
        Outcome::AppendStarted(id)
    }

    fn finish_construction(&mut self, state: &mut EditorState, id: u64) -> Outcome {
        if let Some(obj) = state.shapes.get_mut(id) {
            obj.shape.finish_construction();
            obj.shape.select(true, None);
        }
        Outcome::ConstructionFinished(id)
    }

    /// Drops a shape that was never placed. Nothing was recorded for it.
    fn cancel_creation(&mut self, state: &mut EditorState, id: u64) -> Outcome {
        self.drag = DragState::Idle;
        if self.selected == Some(id) {
            self.selected = None;
        }
        state.detach_shape(id);
        tracing::debug!("Creation of shape {} cancelled", id);
        Outcome::CreationCancelled
    }

    fn delete(&mut self, state: &mut EditorState, id: u64) -> Outcome {
        if self.selected == Some(id) {
            self.selected = None;
        }
        match state.delete_shape(id) {
            Ok(()) => Outcome::Deleted(id),
            Err(e) => {
                tracing::warn!("Delete failed: {}", e);
                Outcome::Nothing
            }
        }
    }

    /// Completes any in-progress interaction: drags are committed, preview
    /// points dropped and unplaced shapes discarded.
    pub fn finish_interaction(&mut self, state: &mut EditorState) {
        match std::mem::take(&mut self.drag) {
            DragState::Moving { id, before, .. } | DragState::Handle { id, before } => {
                self.commit_geometry(state, id, before);
            }
            DragState::Creating { id, .. } | DragState::PendingPlacement { id } => {
                self.cancel_creation(state, id);
            }
            DragState::Constructing { id, .. } => {
                self.finish_construction(state, id);
            }
            DragState::Idle | DragState::Panning { .. } => {}
        }
    }

    pub fn undo(&mut self, state: &mut EditorState) -> bool {
        self.finish_interaction(state);
        let done = state.undo();
        self.drop_stale_selection(state);
        done
    }

    pub fn redo(&mut self, state: &mut EditorState) -> bool {
        self.finish_interaction(state);
        let done = state.redo();
        self.drop_stale_selection(state);
        done
    }

    fn drop_stale_selection(&mut self, state: &EditorState) {
        if self.selected.is_some_and(|id| !state.shapes.contains(id)) {
            self.selected = None;
        }
    }
}

fn snap_step(state: &EditorState, event: &PointerEvent) -> Option<f64> {
    event.modifiers.snap.then(|| state.settings.snap_step())
}

fn has_removable_points(state: &EditorState, id: u64) -> bool {
    state
        .shapes
        .get(id)
        .and_then(|obj| obj.shape.polyline())
        .is_some_and(|cp| cp.len() > 2)
}

fn drag_visible(
    state: &mut EditorState,
    id: u64,
    pos: Point,
    event: &PointerEvent,
    snap: Option<f64>,
) -> Outcome {
    let Some(obj) = state.shapes.get_mut(id) else {
        return Outcome::Nothing;
    };
    obj.visible = true;
    obj.shape.drag_handle(pos, event.modifiers, snap);
    Outcome::Updated(id)
}
