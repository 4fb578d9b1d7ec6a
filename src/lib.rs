//! xform-stack drives a scene node's transform ops through one canonical
//! translate/rotate/scale stack.
//!
//! A node stores an arbitrary, ordered list of named ops (`xformOp:translate`,
//! `xformOp:rotateZXY`, `!invert!xformOp:translate:pivot`, ...). This crate presents that list
//! as a fixed stack of thirteen positions, reads it as plain XYZ vectors, and edits it through
//! undoable commands that create missing ops on first use.
//!
//! # Flow
//!
//! 1. **Resolve**: [`StackResolver::try_bind`] checks that a node's ops fit the canonical stack
//!    and yields a [`TransformStack`], or defers to a caller-supplied fallback.
//! 2. **Read**: [`TransformStack::translation`], [`TransformStack::rotation`], ... resolve op
//!    values at the configured read time.
//! 3. **Edit**: the `*_cmd` builders check edit permission and return a [`SetOpCommand`]
//!    carrying the value to set. Executing it (or [`SetOpCommand::set_value`]) binds it,
//!    creating and re-ordering ops as one undo unit.
//!
//! Storage is abstracted by [`SceneStorage`]; [`InMemoryStage`] is a complete in-memory
//! implementation.
//!
//! The key design constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **Storage owns the data**: stacks and commands hold a node path and borrow the storage
//!   per call.
//! - **Atomic op-order changes**: observers see one change per op creation, never the
//!   intermediate order.
#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![allow(missing_docs_in_private_items)]

mod foundation;
mod scene;
mod stack;
mod transform;

pub use foundation::config::StackOptions;
pub use foundation::core::{DVec3, NodePath, OpValue, Precision, TimeCode, Vec3};
pub use foundation::error::{StackError, StackResult};
pub use scene::diagnostics::{CollectingDiagnostics, Diagnostics, TracingDiagnostics};
pub use scene::memory::{InMemoryStage, Notification};
pub use scene::storage::{EditTarget, OpOrder, Operation, Permission, SceneStorage, StageEdit};
pub use scene::undo::{NotificationGuard, UndoBlock, UndoableItem};
pub use stack::order::{is_matching_substack, normalize, ordered_ops};
pub use stack::registry::{
    INVERT_PREFIX, OP_ORDER_ATTR, OpKind, OpNdx, RotationOrder, XFORM_OP_NAMESPACE,
    canonical_names, op_name, position_of, split_inverse, suffix_of,
};
pub use stack::resolver::{Resolution, StackResolver};
pub use stack::rotation::{
    RotationAttr, RotationConversion, compose, conversion_for, conversions, decompose,
    default_conversion, default_rotate_op_name,
};
pub use transform::builders::PivotKind;
pub use transform::command::{OpTarget, SetOpCommand, UndoableCommand, ValueShape};
pub use transform::view::{OpLookup, TransformStack};
