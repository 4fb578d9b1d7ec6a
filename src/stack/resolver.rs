//! Decides whether a node can be driven through the canonical transform stack.

use std::rc::Rc;

use crate::foundation::config::StackOptions;
use crate::foundation::core::NodePath;
use crate::foundation::error::StackResult;
use crate::scene::diagnostics::{Diagnostics, TracingDiagnostics};
use crate::scene::storage::{Permission, SceneStorage};
use crate::stack::order::is_matching_substack;
use crate::transform::view::TransformStack;

/// Outcome of binding a node to the canonical stack.
#[derive(Debug)]
pub enum Resolution<T> {
    /// The node's ops fit the canonical stack.
    Stack(TransformStack),
    /// The ops do not fit; carries whatever the fallback produced.
    Deferred(T),
    /// The node is missing or cannot carry transform ops.
    NotTransformable,
    /// Editing the node is not allowed; the reason was reported.
    Refused,
}

impl<T> Resolution<T> {
    /// The bound stack, if any.
    pub fn stack(self) -> Option<TransformStack> {
        match self {
            Self::Stack(stack) => Some(stack),
            _ => None,
        }
    }

    /// True when the fallback produced the result.
    pub fn is_deferred(&self) -> bool {
        matches!(self, Self::Deferred(_))
    }
}

/// Binds nodes to [`TransformStack`]s.
#[derive(Clone)]
pub struct StackResolver {
    opts: StackOptions,
    diagnostics: Rc<dyn Diagnostics>,
}

impl Default for StackResolver {
    fn default() -> Self {
        Self::new(StackOptions::default())
    }
}

impl StackResolver {
    /// A resolver reporting user-visible errors through [`TracingDiagnostics`].
    pub fn new(opts: StackOptions) -> Self {
        Self {
            opts,
            diagnostics: Rc::new(TracingDiagnostics),
        }
    }

    /// Route user-visible errors to `diagnostics` instead of the log.
    pub fn with_diagnostics(mut self, diagnostics: Rc<dyn Diagnostics>) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    /// Options handed to every bound stack.
    pub fn options(&self) -> StackOptions {
        self.opts
    }

    /// Bind `node` if its op list is a matching substack of the canonical stack.
    ///
    /// Nodes with no ops always bind. When the ops do not fit, `next` runs and its result is
    /// returned as [`Resolution::Deferred`].
    #[tracing::instrument(skip(self, storage, next))]
    pub fn try_bind<S, T>(
        &self,
        storage: &S,
        node: &NodePath,
        next: impl FnOnce() -> T,
    ) -> StackResult<Resolution<T>>
    where
        S: SceneStorage + ?Sized,
    {
        if !storage.is_transformable(node) {
            return Ok(Resolution::NotTransformable);
        }

        let (ops, _) = storage.ordered_operations(node)?;
        if ops.is_empty() || is_matching_substack(&ops) {
            return Ok(Resolution::Stack(TransformStack::new(
                node.clone(),
                self.opts,
                Rc::clone(&self.diagnostics),
            )));
        }

        tracing::debug!(
            ops = ?ops.iter().map(|op| op.name()).collect::<Vec<_>>(),
            "op list does not fit the canonical stack, deferring"
        );
        Ok(Resolution::Deferred(next()))
    }

    /// Like [`Self::try_bind`], but refuses nodes that cannot be edited.
    ///
    /// Instance proxies and read-only edit targets are refused with a user-visible error.
    #[tracing::instrument(skip(self, storage, next))]
    pub fn try_bind_for_edit<S, T>(
        &self,
        storage: &S,
        node: &NodePath,
        next: impl FnOnce() -> T,
    ) -> StackResult<Resolution<T>>
    where
        S: SceneStorage + ?Sized,
    {
        if !storage.is_transformable(node) {
            return Ok(Resolution::NotTransformable);
        }

        if storage.is_instance_proxy(node) {
            let msg = format!(
                "Authoring to the descendant of an instance [{}] is not allowed. \
                 Please mark 'instanceable=false' to author edits to instance proxies.",
                node.name()
            );
            return Ok(self.refuse(&msg));
        }
        if let Permission::Denied(reason) = storage.edit_target_permission() {
            return Ok(self.refuse(&reason));
        }

        self.try_bind(storage, node, next)
    }

    fn refuse<T>(&self, msg: &str) -> Resolution<T> {
        tracing::warn!(%msg, "edit refused");
        self.diagnostics.display_error(msg);
        Resolution::Refused
    }
}

#[cfg(test)]
#[path = "../../tests/unit/stack/resolver.rs"]
mod tests;
