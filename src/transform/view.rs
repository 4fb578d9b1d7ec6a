//! Read path of the canonical transform stack.

use std::fmt;
use std::rc::Rc;

use crate::foundation::config::StackOptions;
use crate::foundation::core::{DVec3, NodePath, OpValue};
use crate::foundation::error::{StackError, StackResult};
use crate::scene::diagnostics::Diagnostics;
use crate::scene::storage::{Operation, SceneStorage};
use crate::stack::order::ordered_ops;
use crate::stack::registry::{OpKind, OpNdx, op_name, suffix_of};
use crate::stack::rotation::conversion_for;

/// Result of locating a canonical op on a node.
#[derive(Clone, Debug, PartialEq)]
pub enum OpLookup {
    /// No such op in the node's op order.
    Absent,
    /// The op exists but has no authored value.
    Unauthored(Operation),
    /// The op exists and carries a value.
    Authored(Operation),
}

impl OpLookup {
    /// The located op, authored or not.
    pub fn op(&self) -> Option<&Operation> {
        match self {
            Self::Absent => None,
            Self::Unauthored(op) | Self::Authored(op) => Some(op),
        }
    }

    fn classify<S: SceneStorage + ?Sized>(
        storage: &S,
        node: &NodePath,
        op: Option<Operation>,
    ) -> Self {
        match op {
            None => Self::Absent,
            Some(op) if storage.has_authored_value(node, op.attr_name()) => Self::Authored(op),
            Some(op) => Self::Unauthored(op),
        }
    }
}

/// Attribute name of a translate-family op at `ndx`.
fn translate_attr(ndx: OpNdx) -> String {
    op_name(OpKind::Translate, suffix_of(ndx), false)
}

/// Canonical transform stack bound to one node.
///
/// Holds no op data: every read resolves through the storage passed in. Obtain one through
/// [`crate::StackResolver`].
#[derive(Clone)]
pub struct TransformStack {
    node: NodePath,
    opts: StackOptions,
    diagnostics: Rc<dyn Diagnostics>,
}

impl fmt::Debug for TransformStack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransformStack")
            .field("node", &self.node)
            .field("opts", &self.opts)
            .finish_non_exhaustive()
    }
}

impl TransformStack {
    /// A stack over `node`. Prefer [`crate::StackResolver`], which checks the op list first.
    pub fn new(node: NodePath, opts: StackOptions, diagnostics: Rc<dyn Diagnostics>) -> Self {
        Self {
            node,
            opts,
            diagnostics,
        }
    }

    /// Node this stack reads and edits.
    pub fn node(&self) -> &NodePath {
        &self.node
    }

    /// Read and write times.
    pub fn options(&self) -> StackOptions {
        self.opts
    }

    pub(crate) fn diagnostics(&self) -> &dyn Diagnostics {
        self.diagnostics.as_ref()
    }

    /// Locate an op by its stored name.
    pub fn lookup_by_name<S: SceneStorage + ?Sized>(
        &self,
        storage: &S,
        name: &str,
    ) -> StackResult<OpLookup> {
        let (ops, _) = storage.ordered_operations(&self.node)?;
        let op = ops.into_iter().find(|op| op.name() == name);
        Ok(OpLookup::classify(storage, &self.node, op))
    }

    /// Locate whichever op occupies a canonical position.
    pub fn lookup_by_position<S: SceneStorage + ?Sized>(
        &self,
        storage: &S,
        ndx: OpNdx,
    ) -> StackResult<OpLookup> {
        let op = ordered_ops(storage, &self.node)?.remove(&ndx);
        Ok(OpLookup::classify(storage, &self.node, op))
    }

    fn read_vector<S: SceneStorage + ?Sized>(
        &self,
        storage: &S,
        lookup: OpLookup,
        fallback: DVec3,
    ) -> StackResult<DVec3> {
        let OpLookup::Authored(op) = lookup else {
            return Ok(fallback);
        };
        match self.read_value(storage, &op) {
            Some(value) => value.as_dvec3().ok_or_else(|| {
                StackError::invariant(format!(
                    "'{}' on '{}' holds a scalar, expected a 3-vector",
                    op.name(),
                    self.node
                ))
            }),
            None => Ok(fallback),
        }
    }

    fn read_value<S: SceneStorage + ?Sized>(&self, storage: &S, op: &Operation) -> Option<OpValue> {
        storage.attribute_value(&self.node, op.attr_name(), self.opts.read_time)
    }

    fn read_translate_family<S: SceneStorage + ?Sized>(
        &self,
        storage: &S,
        ndx: OpNdx,
    ) -> StackResult<DVec3> {
        let lookup = self.lookup_by_name(storage, &translate_attr(ndx))?;
        self.read_vector(storage, lookup, DVec3::ZERO)
    }

    /// Translation, `(0,0,0)` when unauthored.
    pub fn translation<S: SceneStorage + ?Sized>(&self, storage: &S) -> StackResult<DVec3> {
        self.read_translate_family(storage, OpNdx::Translate)
    }

    /// Rotation as XYZ Euler angles in degrees, whatever convention the rotate op stores.
    pub fn rotation<S: SceneStorage + ?Sized>(&self, storage: &S) -> StackResult<DVec3> {
        let OpLookup::Authored(op) = self.lookup_by_position(storage, OpNdx::Rotate)? else {
            return Ok(DVec3::ZERO);
        };
        match self.read_value(storage, &op) {
            Some(value) => conversion_for(op.name())?.from_value(value),
            None => Ok(DVec3::ZERO),
        }
    }

    /// Scale, `(1,1,1)` when unauthored.
    pub fn scale<S: SceneStorage + ?Sized>(&self, storage: &S) -> StackResult<DVec3> {
        let lookup = self.lookup_by_position(storage, OpNdx::Scale)?;
        self.read_vector(storage, lookup, DVec3::ONE)
    }

    /// Common pivot shared by rotation and scale.
    pub fn pivot<S: SceneStorage + ?Sized>(&self, storage: &S) -> StackResult<DVec3> {
        self.read_translate_family(storage, OpNdx::Pivot)
    }

    /// Rotate pivot, `(0,0,0)` when unauthored.
    pub fn rotate_pivot<S: SceneStorage + ?Sized>(&self, storage: &S) -> StackResult<DVec3> {
        self.read_translate_family(storage, OpNdx::RotatePivot)
    }

    /// Scale pivot, `(0,0,0)` when unauthored.
    pub fn scale_pivot<S: SceneStorage + ?Sized>(&self, storage: &S) -> StackResult<DVec3> {
        self.read_translate_family(storage, OpNdx::ScalePivot)
    }

    /// Translation compensating a rotate-pivot move.
    pub fn rotate_pivot_translation<S: SceneStorage + ?Sized>(
        &self,
        storage: &S,
    ) -> StackResult<DVec3> {
        self.read_translate_family(storage, OpNdx::RotatePivotTranslate)
    }

    /// Translation compensating a scale-pivot move.
    pub fn scale_pivot_translation<S: SceneStorage + ?Sized>(
        &self,
        storage: &S,
    ) -> StackResult<DVec3> {
        self.read_translate_family(storage, OpNdx::ScalePivotTranslate)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/transform/view.rs"]
mod tests;
