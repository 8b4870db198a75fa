//! Canvas type definitions: Tool, PointerEvent, Key, Outcome, DragState.

use micromeasure_core::Point;

use crate::control_points::Modifiers;
use crate::error::RegistryError;
use crate::model::{ShapeParams, ShapeType};

/// Active tool of the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tool {
    /// Pans the view
    Move,
    #[default]
    Select,
    /// Edits existing shapes without creating new ones
    Edit,
    Line,
    Angle,
    MultiLine,
    Rectangle,
    Ellipse,
    Polygon,
    IdentifyScaling,
    SetOrigin,
}

impl Tool {
    /// Shape type created by a left click on empty canvas.
    pub fn creates(&self) -> Option<ShapeType> {
        match self {
            Tool::Line => Some(ShapeType::Line),
            Tool::Angle => Some(ShapeType::Angle),
            Tool::MultiLine => Some(ShapeType::MultiLine),
            Tool::Rectangle => Some(ShapeType::Rectangle),
            Tool::Ellipse => Some(ShapeType::Ellipse),
            Tool::Polygon => Some(ShapeType::Polygon),
            _ => None,
        }
    }

    /// Whether presses hit-test shapes for editing.
    pub fn edits_shapes(&self) -> bool {
        matches!(self, Tool::Select | Tool::Edit) || self.creates().is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PointerButton {
    #[default]
    Left,
    Right,
}

/// Pointer event in image pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PointerEvent {
    pub position: Point,
    pub button: PointerButton,
    pub modifiers: Modifiers,
}

impl PointerEvent {
    pub fn left(position: Point) -> Self {
        Self {
            position,
            button: PointerButton::Left,
            modifiers: Modifiers::NONE,
        }
    }

    pub fn right(position: Point) -> Self {
        Self {
            position,
            button: PointerButton::Right,
            modifiers: Modifiers::NONE,
        }
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Delete,
    Escape,
    Char(char),
}

/// What an event did, for the surrounding UI to refresh.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Nothing,
    /// Pan the view by this many pixels
    Pan(Point),
    Selected(u64),
    Deselected,
    /// Geometry changed during a drag; measurements should refresh
    Updated(u64),
    /// A move, resize or rotation was committed
    Changed(u64),
    /// Shape placed on the canvas
    Created(u64),
    /// Creation refused by the structure registry; the caller may pick
    /// another structure and retry
    CreationRejected(RegistryError),
    CreationCancelled,
    PointCommitted(u64),
    PointRemoved { id: u64, index: usize },
    /// A trailing preview point was started
    AppendStarted(u64),
    ConstructionFinished(u64),
    Deleted(u64),
    ScaleBarDetected(u32),
    ScaleBarCleared,
    OriginSet(Point),
}

/// Drag tracking between press and release.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Panning {
        last: Point,
    },
    /// Whole-shape move; `offset` is the grab point relative to the center
    Moving {
        id: u64,
        offset: Point,
        before: ShapeParams,
    },
    /// A single handle is dragged
    Handle {
        id: u64,
        before: ShapeParams,
    },
    /// New shape with its creation handle armed
    Creating {
        id: u64,
        anchor: Point,
        moved: bool,
    },
    /// Click without drag; the creation handle follows the pointer until the
    /// next click
    PendingPlacement {
        id: u64,
    },
    /// Polyline with a live preview point; `before` is the shape without it
    Constructing {
        id: u64,
        before: ShapeParams,
    },
}

impl DragState {
    /// Shape that the current interaction works on.
    pub fn shape_id(&self) -> Option<u64> {
        match self {
            DragState::Idle | DragState::Panning { .. } => None,
            DragState::Moving { id, .. }
            | DragState::Handle { id, .. }
            | DragState::Creating { id, .. }
            | DragState::PendingPlacement { id }
            | DragState::Constructing { id, .. } => Some(*id),
        }
    }
}
