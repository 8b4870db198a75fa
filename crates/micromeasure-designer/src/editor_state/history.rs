//! Undo/redo for editor state.

use super::EditorState;
use crate::commands::DesignerCommand;

impl EditorState {
    /// Applies a command and records it for undo.
    pub fn push_command(&mut self, mut command: DesignerCommand) {
        command.apply(self);
        tracing::debug!("Command: {}", command.name());
        self.history.push(command);
        self.is_modified = true;
    }

    /// Records a command whose effect is already in place, without applying it.
    pub fn record_command(&mut self, command: DesignerCommand) {
        tracing::debug!("Command: {}", command.name());
        self.history.push(command);
        self.is_modified = true;
    }

    /// Reverts the most recent command. Returns false if there was nothing to undo.
    pub fn undo(&mut self) -> bool {
        let Some(mut command) = self.history.take_undo() else {
            return false;
        };
        tracing::debug!("Undo: {}", command.name());
        command.undo(self);
        self.history.push_undone(command);
        self.is_modified = true;
        true
    }

    /// Re-applies the most recently undone command.
    pub fn redo(&mut self) -> bool {
        let Some(mut command) = self.history.take_redo() else {
            return false;
        };
        tracing::debug!("Redo: {}", command.name());
        command.apply(self);
        self.history.push_redone(command);
        self.is_modified = true;
        true
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn undo_depth(&self) -> usize {
        self.history.undo_depth()
    }

    pub fn redo_depth(&self) -> usize {
        self.history.redo_depth()
    }

    /// Name of the next command to undo, for menus.
    pub fn undo_name(&self) -> Option<&str> {
        self.history.undo_name()
    }

    pub fn redo_name(&self) -> Option<&str> {
        self.history.redo_name()
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }
}
