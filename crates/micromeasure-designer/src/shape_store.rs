//! Arena of drawing objects in draw order.
//!
//! Shapes are addressed by a stable `u64` id. The vector order is the draw
//! order: later objects are drawn on top and hit-tested first.

use crate::model::{MeasurementShape, Shape, ShapeType};

/// A shape plus the per-object flags the canvas needs.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawingObject {
    pub id: u64,
    pub shape: Shape,
    pub visible: bool,
    pub selected: bool,
    pub editable: bool,
    pub selectable: bool,
}

impl DrawingObject {
    pub fn new(id: u64, shape: Shape) -> Self {
        Self {
            id,
            shape,
            visible: true,
            selected: false,
            editable: true,
            selectable: true,
        }
    }

    pub fn shape_type(&self) -> ShapeType {
        self.shape.shape_type()
    }

    /// Visible and selectable, so pointer events may pick it.
    pub fn is_pickable(&self) -> bool {
        self.visible && self.selectable
    }
}

#[derive(Debug, Clone, Default)]
pub struct ShapeStore {
    objects: Vec<DrawingObject>,
    next_id: u64,
}

impl ShapeStore {
    pub fn new() -> Self {
        Self {
            objects: Vec::new(),
            next_id: 1,
        }
    }

    pub fn generate_id(&mut self) -> u64 {
        let id = self.next_id.max(1);
        self.next_id = id + 1;
        id
    }

    /// Ensures future ids are at least `id`.
    pub fn set_next_id(&mut self, id: u64) {
        self.next_id = self.next_id.max(id);
    }

    /// Appends on top of the draw order.
    pub fn insert(&mut self, object: DrawingObject) {
        self.set_next_id(object.id + 1);
        self.objects.push(object);
    }

    /// Inserts at a draw position, clamped to the end.
    pub fn insert_at(&mut self, index: usize, object: DrawingObject) {
        self.set_next_id(object.id + 1);
        let index = index.min(self.objects.len());
        self.objects.insert(index, object);
    }

    /// Removes and returns the object with its draw position.
    pub fn remove(&mut self, id: u64) -> Option<(usize, DrawingObject)> {
        let index = self.index_of(id)?;
        Some((index, self.objects.remove(index)))
    }

    pub fn index_of(&self, id: u64) -> Option<usize> {
        self.objects.iter().position(|o| o.id == id)
    }

    pub fn get(&self, id: u64) -> Option<&DrawingObject> {
        self.objects.iter().find(|o| o.id == id)
    }

    pub fn get_mut(&mut self, id: u64) -> Option<&mut DrawingObject> {
        self.objects.iter_mut().find(|o| o.id == id)
    }

    pub fn contains(&self, id: u64) -> bool {
        self.index_of(id).is_some()
    }

    /// Bottom to top.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &DrawingObject> {
        self.objects.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut DrawingObject> {
        self.objects.iter_mut()
    }

    /// Top to bottom, the order hit-testing walks.
    pub fn iter_topmost(&self) -> impl Iterator<Item = &DrawingObject> {
        self.objects.iter().rev()
    }

    pub fn ids(&self) -> Vec<u64> {
        self.objects.iter().map(|o| o.id).collect()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn clear(&mut self) {
        self.objects.clear();
    }
}
