//! Canonical ordering of a node's op list.

use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet};

use crate::foundation::core::NodePath;
use crate::foundation::error::{StackError, StackResult};
use crate::scene::storage::{Operation, SceneStorage};
use crate::stack::registry::OpNdx;

fn bucket(ops: Vec<Operation>) -> StackResult<BTreeMap<OpNdx, Operation>> {
    let mut by_ndx = BTreeMap::new();
    for op in ops {
        let ndx = op.position()?;
        match by_ndx.entry(ndx) {
            Entry::Vacant(slot) => {
                slot.insert(op);
            }
            Entry::Occupied(slot) => {
                return Err(StackError::invariant(format!(
                    "'{}' and '{}' both occupy stack position {ndx:?}",
                    slot.get().name(),
                    op.name()
                )));
            }
        }
    }
    Ok(by_ndx)
}

/// A node's ops keyed by canonical position.
///
/// Fails with [`StackError::Lookup`] on a non-canonical op and with
/// [`StackError::InvariantViolation`] when two ops claim one position.
pub fn ordered_ops<S: SceneStorage + ?Sized>(
    storage: &S,
    node: &NodePath,
) -> StackResult<BTreeMap<OpNdx, Operation>> {
    let (ops, _) = storage.ordered_operations(node)?;
    bucket(ops)
}

/// Rewrite a node's op order in canonical stack order, keeping the reset flag.
///
/// Storage appends new ops at the end, so this runs after every op addition.
#[tracing::instrument(skip(storage))]
pub fn normalize<S: SceneStorage + ?Sized>(storage: &mut S, node: &NodePath) -> StackResult<()> {
    let (ops, resets_xform_stack) = storage.ordered_operations(node)?;
    let ordered: Vec<Operation> = bucket(ops)?.into_values().collect();
    tracing::debug!(ops = ordered.len(), "writing canonical op order");

    storage
        .set_ordered_operations(node, &ordered, resets_xform_stack)
        .map_err(|e| match e {
            StackError::Permission(_) | StackError::InvariantViolation(_) => e,
            other => StackError::invariant(format!("cannot write op order on '{node}': {other}")),
        })
}

/// Whether `ops`, in stored order, fit the canonical stack.
///
/// Every op must be canonical, positions must strictly ascend, and pivot pairs must be
/// complete.
pub fn is_matching_substack(ops: &[Operation]) -> bool {
    let mut seen = BTreeSet::new();
    let mut prev: Option<OpNdx> = None;
    for op in ops {
        let Ok(ndx) = op.position() else {
            return false;
        };
        if prev.is_some_and(|p| p >= ndx) {
            return false;
        }
        prev = Some(ndx);
        seen.insert(ndx);
    }
    seen.iter()
        .all(|ndx| ndx.pivot_twin().is_none_or(|twin| seen.contains(&twin)))
}

#[cfg(test)]
#[path = "../../tests/unit/stack/order.rs"]
mod tests;
