//! Boundary between the stack adapter and the host's scene description.

use crate::foundation::core::{NodePath, OpValue, Precision, TimeCode};
use crate::foundation::error::StackResult;
use crate::stack::registry::{OpKind, OpNdx, position_of, split_inverse};

/// A transform op as it appears in a node's op order.
#[derive(Clone, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Operation {
    name: String,
    precision: Precision,
}

impl Operation {
    /// Describe an op by its stored name (including any `!invert!` prefix).
    pub fn new(name: impl Into<String>, precision: Precision) -> Self {
        Self {
            name: name.into(),
            precision,
        }
    }

    /// Stored op name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Attribute holding the op's value; shared by an op and its inverse twin.
    pub fn attr_name(&self) -> &str {
        split_inverse(&self.name).0
    }

    /// Whether the op applies the inverse of its attribute's value.
    pub fn is_inverse(&self) -> bool {
        split_inverse(&self.name).1
    }

    /// Storage width of the op's attribute.
    pub fn precision(&self) -> Precision {
        self.precision
    }

    /// Op type parsed from the name, if it is a transform op at all.
    pub fn kind(&self) -> Option<OpKind> {
        OpKind::parse(&self.name)
    }

    /// Canonical stack position of this op.
    pub fn position(&self) -> StackResult<OpNdx> {
        position_of(&self.name)
    }
}

/// The op-order attribute: op names in application order plus the reset flag.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct OpOrder {
    /// Op names in application order.
    pub names: Vec<String>,
    /// Whether the node ignores its parent's transform.
    pub resets_xform_stack: bool,
}

/// What an edit-permission query is about.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EditTarget<'a> {
    /// An existing op attribute.
    Attribute(&'a str),
    /// The node's op-order attribute.
    OpOrder,
}

/// Outcome of an edit-permission query.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Permission {
    /// The edit may proceed.
    Allowed,
    /// Edit refused, with a message suitable for the user.
    Denied(String),
}

impl Permission {
    /// True for [`Permission::Allowed`].
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed)
    }
}

/// One reversible storage mutation, as captured by an undo block.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum StageEdit {
    /// A new, valueless op attribute.
    CreateAttribute {
        /// Owning node.
        node: NodePath,
        /// Attribute name.
        attr: String,
        /// Storage width of the attribute.
        precision: Precision,
    },
    /// Removal of a valueless op attribute.
    DeleteAttribute {
        /// Owning node.
        node: NodePath,
        /// Attribute name.
        attr: String,
        /// Storage width, kept so the deletion can be reverted.
        precision: Precision,
    },
    /// A rewrite of the op order.
    SetOrder {
        /// Owning node.
        node: NodePath,
        /// Order before the edit.
        before: OpOrder,
        /// Order after the edit.
        after: OpOrder,
    },
    /// A value authored or cleared at one time.
    SetValue {
        /// Owning node.
        node: NodePath,
        /// Attribute name.
        attr: String,
        /// Time the value is authored at.
        time: TimeCode,
        /// Value authored exactly at `time` before the edit.
        before: Option<OpValue>,
        /// Value authored exactly at `time` after the edit; `None` clears it.
        after: Option<OpValue>,
    },
}

impl StageEdit {
    /// The edit that reverts this one.
    pub fn inverse(&self) -> StageEdit {
        match self {
            Self::CreateAttribute {
                node,
                attr,
                precision,
            } => Self::DeleteAttribute {
                node: node.clone(),
                attr: attr.clone(),
                precision: *precision,
            },
            Self::DeleteAttribute {
                node,
                attr,
                precision,
            } => Self::CreateAttribute {
                node: node.clone(),
                attr: attr.clone(),
                precision: *precision,
            },
            Self::SetOrder {
                node,
                before,
                after,
            } => Self::SetOrder {
                node: node.clone(),
                before: after.clone(),
                after: before.clone(),
            },
            Self::SetValue {
                node,
                attr,
                time,
                before,
                after,
            } => Self::SetValue {
                node: node.clone(),
                attr: attr.clone(),
                time: *time,
                before: *after,
                after: *before,
            },
        }
    }

    /// Node the edit applies to.
    pub fn node(&self) -> &NodePath {
        match self {
            Self::CreateAttribute { node, .. }
            | Self::DeleteAttribute { node, .. }
            | Self::SetOrder { node, .. }
            | Self::SetValue { node, .. } => node,
        }
    }
}

/// Scene description consumed by the adapter.
///
/// Implementations own all op data. Mutations made between [`Self::begin_undo_capture`] and
/// [`Self::end_undo_capture`] must be returned as [`StageEdit`]s so they can be replayed in
/// either direction through [`Self::apply_edit`]. Nested captures are collected by the
/// outermost one.
pub trait SceneStorage {
    /// Whether `node` exists and can carry transform ops.
    fn is_transformable(&self, node: &NodePath) -> bool;

    /// Whether `node` is a read-only proxy of an instanced subtree.
    fn is_instance_proxy(&self, _node: &NodePath) -> bool {
        false
    }

    /// Whether the current edit target accepts edits at all.
    fn edit_target_permission(&self) -> Permission {
        Permission::Allowed
    }

    /// Whether the attribute exists, authored or not.
    fn has_attribute(&self, node: &NodePath, attr: &str) -> bool;

    /// Whether the attribute has a default or any time sample.
    fn has_authored_value(&self, node: &NodePath, attr: &str) -> bool;

    /// Resolved value at `time`, or `None` when nothing is authored.
    fn attribute_value(&self, node: &NodePath, attr: &str, time: TimeCode) -> Option<OpValue>;

    /// Author `value` at `time`.
    fn set_attribute_value(
        &mut self,
        node: &NodePath,
        attr: &str,
        value: OpValue,
        time: TimeCode,
    ) -> StackResult<()>;

    /// Remove the value authored exactly at `time`.
    fn clear_attribute_value(
        &mut self,
        node: &NodePath,
        attr: &str,
        time: TimeCode,
    ) -> StackResult<()>;

    /// Create an op and append it to the node's op order.
    fn create_operation(
        &mut self,
        node: &NodePath,
        kind: OpKind,
        precision: Precision,
        suffix: Option<&str>,
        inverse: bool,
    ) -> StackResult<Operation>;

    /// Ops in stored order plus the reset flag.
    fn ordered_operations(&self, node: &NodePath) -> StackResult<(Vec<Operation>, bool)>;

    /// Replace the node's op order.
    fn set_ordered_operations(
        &mut self,
        node: &NodePath,
        ops: &[Operation],
        resets_xform_stack: bool,
    ) -> StackResult<()>;

    /// Whether `target` may be edited under the current authoring rules.
    fn edit_permission(&self, node: &NodePath, target: EditTarget<'_>) -> Permission;

    /// Start recording edits. Captures nest.
    fn begin_undo_capture(&mut self);

    /// Stop recording; the outermost end returns everything captured.
    fn end_undo_capture(&mut self) -> Vec<StageEdit>;

    /// Apply a captured edit (or its inverse).
    fn apply_edit(&mut self, edit: &StageEdit) -> StackResult<()>;

    /// Hold back change notifications for `node` until the matching resume.
    fn suppress_notifications(&mut self, node: &NodePath);

    /// Undo one suppression; the last one delivers a single batched notification.
    fn resume_notifications(&mut self, node: &NodePath);
}
