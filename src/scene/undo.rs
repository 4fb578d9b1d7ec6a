//! Undo capture and notification suppression as scoped guards.

use std::ops::{Deref, DerefMut};

use crate::foundation::core::NodePath;
use crate::foundation::error::StackResult;
use crate::scene::storage::{SceneStorage, StageEdit};

/// Storage edits captured by an [`UndoBlock`], replayable in both directions.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct UndoableItem {
    edits: Vec<StageEdit>,
}

impl UndoableItem {
    /// True when nothing was captured.
    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    /// Captured edits, oldest first.
    pub fn edits(&self) -> &[StageEdit] {
        &self.edits
    }

    fn extend(&mut self, edits: Vec<StageEdit>) {
        self.edits.extend(edits);
    }

    /// Revert every captured edit, newest first.
    pub fn undo<S: SceneStorage + ?Sized>(&self, storage: &mut S) -> StackResult<()> {
        for edit in self.edits.iter().rev() {
            storage.apply_edit(&edit.inverse())?;
        }
        Ok(())
    }

    /// Re-apply every captured edit, oldest first.
    pub fn redo<S: SceneStorage + ?Sized>(&self, storage: &mut S) -> StackResult<()> {
        for edit in &self.edits {
            storage.apply_edit(edit)?;
        }
        Ok(())
    }
}

/// Captures storage edits into an [`UndoableItem`] until dropped.
pub struct UndoBlock<'a, S: SceneStorage + ?Sized> {
    storage: &'a mut S,
    item: &'a mut UndoableItem,
}

impl<'a, S: SceneStorage + ?Sized> UndoBlock<'a, S> {
    /// Start capturing edits made through `storage` into `item`.
    pub fn open(storage: &'a mut S, item: &'a mut UndoableItem) -> Self {
        storage.begin_undo_capture();
        Self { storage, item }
    }
}

impl<S: SceneStorage + ?Sized> Deref for UndoBlock<'_, S> {
    type Target = S;

    fn deref(&self) -> &S {
        &*self.storage
    }
}

impl<S: SceneStorage + ?Sized> DerefMut for UndoBlock<'_, S> {
    fn deref_mut(&mut self) -> &mut S {
        &mut *self.storage
    }
}

impl<S: SceneStorage + ?Sized> Drop for UndoBlock<'_, S> {
    fn drop(&mut self) {
        let edits = self.storage.end_undo_capture();
        self.item.extend(edits);
    }
}

/// Suppresses change notifications for one node until dropped.
///
/// Observers see a single change for everything done while the guard is alive.
pub struct NotificationGuard<'a, S: SceneStorage + ?Sized> {
    storage: &'a mut S,
    node: NodePath,
}

impl<'a, S: SceneStorage + ?Sized> NotificationGuard<'a, S> {
    /// Hold back notifications for `node` made through `storage`.
    pub fn enter(storage: &'a mut S, node: NodePath) -> Self {
        storage.suppress_notifications(&node);
        Self { storage, node }
    }
}

impl<S: SceneStorage + ?Sized> Deref for NotificationGuard<'_, S> {
    type Target = S;

    fn deref(&self) -> &S {
        &*self.storage
    }
}

impl<S: SceneStorage + ?Sized> DerefMut for NotificationGuard<'_, S> {
    fn deref_mut(&mut self) -> &mut S {
        &mut *self.storage
    }
}

impl<S: SceneStorage + ?Sized> Drop for NotificationGuard<'_, S> {
    fn drop(&mut self) {
        self.storage.resume_notifications(&self.node);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/undo.rs"]
mod tests;
