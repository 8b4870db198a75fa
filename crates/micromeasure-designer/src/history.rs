//! Linear undo/redo stacks.

use crate::commands::DesignerCommand;

/// Undo and redo stacks with a depth limit. Pushing a new command discards
/// everything that could have been redone.
#[derive(Debug, Clone)]
pub struct History {
    undo_stack: Vec<DesignerCommand>,
    redo_stack: Vec<DesignerCommand>,
    max_depth: usize,
}

impl History {
    pub fn new(max_depth: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_depth: max_depth.max(1),
        }
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn set_max_depth(&mut self, max_depth: usize) {
        self.max_depth = max_depth.max(1);
        self.trim();
    }

    /// Records a new command, dropping the redo stack.
    pub fn push(&mut self, command: DesignerCommand) {
        self.undo_stack.push(command);
        self.redo_stack.clear();
        self.trim();
    }

    fn trim(&mut self) {
        if self.undo_stack.len() > self.max_depth {
            let excess = self.undo_stack.len() - self.max_depth;
            self.undo_stack.drain(..excess);
        }
    }

    pub(crate) fn take_undo(&mut self) -> Option<DesignerCommand> {
        self.undo_stack.pop()
    }

    pub(crate) fn take_redo(&mut self) -> Option<DesignerCommand> {
        self.redo_stack.pop()
    }

    pub(crate) fn push_undone(&mut self, command: DesignerCommand) {
        self.redo_stack.push(command);
    }

    pub(crate) fn push_redone(&mut self, command: DesignerCommand) {
        self.undo_stack.push(command);
        self.trim();
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_depth(&self) -> usize {
        self.redo_stack.len()
    }

    /// Name of the command `undo` would revert.
    pub fn undo_name(&self) -> Option<&str> {
        self.undo_stack.last().map(DesignerCommand::name)
    }

    pub fn redo_name(&self) -> Option<&str> {
        self.redo_stack.last().map(DesignerCommand::name)
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new(100)
    }
}
