//! In-memory scene description implementing [`SceneStorage`].

use std::collections::{BTreeMap, BTreeSet};

use crate::foundation::core::{NodePath, OpValue, Precision, TimeCode};
use crate::foundation::error::{StackError, StackResult};
use crate::scene::storage::{EditTarget, OpOrder, Operation, Permission, SceneStorage, StageEdit};
use crate::stack::registry::{OpKind, op_name, split_inverse};

/// Change signal delivered to stage observers.
#[derive(Clone, Debug, PartialEq)]
pub enum Notification {
    /// A node's op set or op order changed; carries the order observers will see.
    StackChanged {
        /// Node whose op order changed.
        node: NodePath,
        /// The op order after the change.
        ops: Vec<String>,
    },
    /// An op attribute's value changed.
    ValueChanged {
        /// Node owning the attribute.
        node: NodePath,
        /// Attribute whose value changed.
        attr: String,
    },
}

type Observer = Box<dyn FnMut(&Notification)>;

#[derive(Clone, Debug)]
struct Attribute {
    precision: Precision,
    default: Option<OpValue>,
    // Sorted by time.
    samples: Vec<(f64, OpValue)>,
    lock: Option<String>,
}

impl Attribute {
    fn new(precision: Precision) -> Self {
        Self {
            precision,
            default: None,
            samples: Vec::new(),
            lock: None,
        }
    }

    fn authored_at(&self, time: TimeCode) -> Option<OpValue> {
        match time {
            TimeCode::Default => self.default,
            TimeCode::At(t) => self.samples.iter().find(|(st, _)| *st == t).map(|s| s.1),
        }
    }

    fn resolve(&self, time: TimeCode) -> Option<OpValue> {
        let TimeCode::At(t) = time else {
            return self.default;
        };
        if self.samples.is_empty() {
            return self.default;
        }

        let idx = self.samples.partition_point(|(st, _)| *st <= t);
        if idx == 0 {
            return Some(self.samples[0].1);
        }
        if idx >= self.samples.len() {
            return Some(self.samples[self.samples.len() - 1].1);
        }

        let (ta, a) = self.samples[idx - 1];
        let (tb, b) = self.samples[idx];
        if ta == t || tb <= ta {
            return Some(a);
        }
        Some(OpValue::lerp(a, b, (t - ta) / (tb - ta)))
    }

    fn write(&mut self, time: TimeCode, value: Option<OpValue>) {
        match time {
            TimeCode::Default => self.default = value,
            TimeCode::At(t) => {
                self.samples.retain(|(st, _)| *st != t);
                if let Some(v) = value {
                    let idx = self.samples.partition_point(|(st, _)| *st < t);
                    self.samples.insert(idx, (t, v));
                }
            }
        }
    }
}

#[derive(Clone, Debug, Default)]
struct Node {
    attributes: BTreeMap<String, Attribute>,
    order: OpOrder,
    instance_proxy: bool,
    order_lock: Option<String>,
}

#[derive(Debug, Default)]
struct Suppression {
    depth: usize,
    stack_dirty: bool,
    values_dirty: BTreeSet<String>,
}

/// Scene description held in memory.
///
/// Records every edit made while an undo capture is open, and batches change notifications
/// for suppressed nodes into a single signal.
#[derive(Default)]
pub struct InMemoryStage {
    nodes: BTreeMap<NodePath, Node>,
    edit_target_lock: Option<String>,
    reject_creation: bool,
    capture_depth: usize,
    captured: Vec<StageEdit>,
    suppressed: BTreeMap<NodePath, Suppression>,
    observers: Vec<Observer>,
}

impl InMemoryStage {
    /// An empty stage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Define a transformable node with no ops.
    pub fn define_node(&mut self, node: impl Into<NodePath>) -> NodePath {
        let node = node.into();
        self.nodes.entry(node.clone()).or_default();
        node
    }

    /// Define a node that proxies an instanced subtree.
    pub fn define_instance_proxy(&mut self, node: impl Into<NodePath>) -> NodePath {
        let node = self.define_node(node);
        if let Some(n) = self.nodes.get_mut(&node) {
            n.instance_proxy = true;
        }
        node
    }

    /// Append an op to a node's order, creating its attribute if needed.
    ///
    /// Scene setup only: bypasses undo capture and notifications.
    pub fn author_op(
        &mut self,
        node: &NodePath,
        name: &str,
        precision: Precision,
        value: Option<OpValue>,
    ) -> StackResult<()> {
        let n = self.node_mut(node)?;
        let (attr, _) = split_inverse(name);
        let attribute = n
            .attributes
            .entry(attr.to_string())
            .or_insert_with(|| Attribute::new(precision));
        if value.is_some() {
            attribute.default = value;
        }
        n.order.names.push(name.to_string());
        Ok(())
    }

    /// Author a time sample directly. Scene setup only.
    pub fn author_sample(
        &mut self,
        node: &NodePath,
        attr: &str,
        time: f64,
        value: OpValue,
    ) -> StackResult<()> {
        self.attribute_mut(node, attr)?
            .write(TimeCode::At(time), Some(value));
        Ok(())
    }

    /// Set a node's reset-xform-stack flag. Scene setup only.
    pub fn set_resets_xform_stack(&mut self, node: &NodePath, resets: bool) -> StackResult<()> {
        self.node_mut(node)?.order.resets_xform_stack = resets;
        Ok(())
    }

    /// Make an attribute refuse edits with `reason`.
    pub fn lock_attribute(
        &mut self,
        node: &NodePath,
        attr: &str,
        reason: impl Into<String>,
    ) -> StackResult<()> {
        self.attribute_mut(node, attr)?.lock = Some(reason.into());
        Ok(())
    }

    /// Make a node's op order refuse edits with `reason`.
    pub fn lock_op_order(&mut self, node: &NodePath, reason: impl Into<String>) -> StackResult<()> {
        self.node_mut(node)?.order_lock = Some(reason.into());
        Ok(())
    }

    /// Make the whole edit target read-only.
    pub fn lock_edit_target(&mut self, reason: impl Into<String>) {
        self.edit_target_lock = Some(reason.into());
    }

    /// Make every subsequent op creation fail.
    pub fn reject_operation_creation(&mut self, reject: bool) {
        self.reject_creation = reject;
    }

    /// Current op order of a node.
    pub fn op_order(&self, node: &NodePath) -> Option<&OpOrder> {
        self.nodes.get(node).map(|n| &n.order)
    }

    /// Names of every attribute defined on a node.
    pub fn attribute_names(&self, node: &NodePath) -> Vec<String> {
        self.nodes
            .get(node)
            .map(|n| n.attributes.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Register an observer for change notifications.
    pub fn subscribe(&mut self, observer: impl FnMut(&Notification) + 'static) {
        self.observers.push(Box::new(observer));
    }

    fn node(&self, node: &NodePath) -> StackResult<&Node> {
        self.nodes
            .get(node)
            .ok_or_else(|| StackError::invariant(format!("node '{node}' does not exist")))
    }

    fn node_mut(&mut self, node: &NodePath) -> StackResult<&mut Node> {
        self.nodes
            .get_mut(node)
            .ok_or_else(|| StackError::invariant(format!("node '{node}' does not exist")))
    }

    fn attribute(&self, node: &NodePath, attr: &str) -> Option<&Attribute> {
        self.nodes.get(node)?.attributes.get(attr)
    }

    fn attribute_mut(&mut self, node: &NodePath, attr: &str) -> StackResult<&mut Attribute> {
        self.node_mut(node)?
            .attributes
            .get_mut(attr)
            .ok_or_else(|| StackError::invariant(format!("'{node}' has no attribute '{attr}'")))
    }

    fn check_write_allowed(&self, node: &NodePath, target: EditTarget<'_>) -> StackResult<()> {
        match self.edit_permission(node, target) {
            Permission::Allowed => Ok(()),
            Permission::Denied(reason) => Err(StackError::permission(reason)),
        }
    }

    fn commit(&mut self, edit: StageEdit) -> StackResult<()> {
        self.apply_raw(&edit)?;
        let structural = !matches!(edit, StageEdit::SetValue { .. });
        let node = edit.node().clone();
        let attr = match &edit {
            StageEdit::SetValue { attr, .. } => Some(attr.clone()),
            _ => None,
        };
        if self.capture_depth > 0 {
            self.captured.push(edit);
        }

        if let Some(s) = self.suppressed.get_mut(&node) {
            if structural {
                s.stack_dirty = true;
            }
            s.values_dirty.extend(attr);
            return Ok(());
        }
        let notification = match attr {
            Some(attr) => Notification::ValueChanged { node, attr },
            None => self.stack_changed(node),
        };
        self.notify(&notification);
        Ok(())
    }

    fn apply_raw(&mut self, edit: &StageEdit) -> StackResult<()> {
        match edit {
            StageEdit::CreateAttribute {
                node,
                attr,
                precision,
            } => {
                let n = self.node_mut(node)?;
                if n.attributes.contains_key(attr) {
                    return Err(StackError::invariant(format!(
                        "'{node}' already has attribute '{attr}'"
                    )));
                }
                n.attributes.insert(attr.clone(), Attribute::new(*precision));
            }
            StageEdit::DeleteAttribute { node, attr, .. } => {
                if self.node_mut(node)?.attributes.remove(attr).is_none() {
                    return Err(StackError::invariant(format!(
                        "'{node}' has no attribute '{attr}' to delete"
                    )));
                }
            }
            StageEdit::SetOrder { node, after, .. } => {
                self.node_mut(node)?.order = after.clone();
            }
            StageEdit::SetValue {
                node,
                attr,
                time,
                after,
                ..
            } => {
                self.attribute_mut(node, attr)?.write(*time, *after);
            }
        }
        Ok(())
    }

    fn stack_changed(&self, node: NodePath) -> Notification {
        let ops = self
            .nodes
            .get(&node)
            .map(|n| n.order.names.clone())
            .unwrap_or_default();
        Notification::StackChanged { node, ops }
    }

    fn notify(&mut self, notification: &Notification) {
        for observer in &mut self.observers {
            observer(notification);
        }
    }
}

impl SceneStorage for InMemoryStage {
    fn is_transformable(&self, node: &NodePath) -> bool {
        self.nodes.contains_key(node)
    }

    fn is_instance_proxy(&self, node: &NodePath) -> bool {
        self.nodes.get(node).is_some_and(|n| n.instance_proxy)
    }

    fn edit_target_permission(&self) -> Permission {
        match &self.edit_target_lock {
            Some(reason) => Permission::Denied(reason.clone()),
            None => Permission::Allowed,
        }
    }

    fn has_attribute(&self, node: &NodePath, attr: &str) -> bool {
        self.attribute(node, attr).is_some()
    }

    fn has_authored_value(&self, node: &NodePath, attr: &str) -> bool {
        self.attribute(node, attr)
            .is_some_and(|a| a.default.is_some() || !a.samples.is_empty())
    }

    fn attribute_value(&self, node: &NodePath, attr: &str, time: TimeCode) -> Option<OpValue> {
        self.attribute(node, attr)?.resolve(time)
    }

    fn set_attribute_value(
        &mut self,
        node: &NodePath,
        attr: &str,
        value: OpValue,
        time: TimeCode,
    ) -> StackResult<()> {
        self.check_write_allowed(node, EditTarget::Attribute(attr))?;
        let current = self.attribute_mut(node, attr)?;
        if value.precision() != current.precision {
            return Err(StackError::invariant(format!(
                "'{attr}' stores {:?} values, got {:?}",
                current.precision,
                value.precision()
            )));
        }
        let before = current.authored_at(time);
        self.commit(StageEdit::SetValue {
            node: node.clone(),
            attr: attr.to_string(),
            time,
            before,
            after: Some(value),
        })
    }

    fn clear_attribute_value(
        &mut self,
        node: &NodePath,
        attr: &str,
        time: TimeCode,
    ) -> StackResult<()> {
        self.check_write_allowed(node, EditTarget::Attribute(attr))?;
        let before = self.attribute_mut(node, attr)?.authored_at(time);
        if before.is_none() {
            return Ok(());
        }
        self.commit(StageEdit::SetValue {
            node: node.clone(),
            attr: attr.to_string(),
            time,
            before,
            after: None,
        })
    }

    fn create_operation(
        &mut self,
        node: &NodePath,
        kind: OpKind,
        precision: Precision,
        suffix: Option<&str>,
        inverse: bool,
    ) -> StackResult<Operation> {
        self.check_write_allowed(node, EditTarget::OpOrder)?;
        if self.reject_creation {
            return Err(StackError::invariant(format!(
                "op creation rejected on '{node}'"
            )));
        }

        let name = op_name(kind, suffix, inverse);
        let (attr, _) = split_inverse(&name);
        let n = self.node(node)?;
        if n.order.names.iter().any(|existing| *existing == name) {
            return Err(StackError::invariant(format!(
                "'{node}' already has op '{name}'"
            )));
        }
        match n.attributes.get(attr) {
            Some(existing) if existing.precision != precision => {
                return Err(StackError::invariant(format!(
                    "'{attr}' exists with {:?} precision",
                    existing.precision
                )));
            }
            Some(_) => {}
            None => self.commit(StageEdit::CreateAttribute {
                node: node.clone(),
                attr: attr.to_string(),
                precision,
            })?,
        }

        let before = self.node(node)?.order.clone();
        let mut after = before.clone();
        after.names.push(name.clone());
        self.commit(StageEdit::SetOrder {
            node: node.clone(),
            before,
            after,
        })?;
        Ok(Operation::new(name, precision))
    }

    fn ordered_operations(&self, node: &NodePath) -> StackResult<(Vec<Operation>, bool)> {
        let n = self.node(node)?;
        let ops = n
            .order
            .names
            .iter()
            .map(|name| {
                let (attr, _) = split_inverse(name);
                n.attributes
                    .get(attr)
                    .map(|a| Operation::new(name.clone(), a.precision))
                    .ok_or_else(|| {
                        StackError::invariant(format!(
                            "op '{name}' on '{node}' has no attribute '{attr}'"
                        ))
                    })
            })
            .collect::<StackResult<Vec<_>>>()?;
        Ok((ops, n.order.resets_xform_stack))
    }

    fn set_ordered_operations(
        &mut self,
        node: &NodePath,
        ops: &[Operation],
        resets_xform_stack: bool,
    ) -> StackResult<()> {
        self.check_write_allowed(node, EditTarget::OpOrder)?;
        let n = self.node(node)?;
        if let Some(missing) = ops
            .iter()
            .find(|op| !n.attributes.contains_key(op.attr_name()))
        {
            return Err(StackError::invariant(format!(
                "cannot order '{}' on '{node}': attribute missing",
                missing.name()
            )));
        }
        let before = n.order.clone();
        let after = OpOrder {
            names: ops.iter().map(|op| op.name().to_string()).collect(),
            resets_xform_stack,
        };
        self.commit(StageEdit::SetOrder {
            node: node.clone(),
            before,
            after,
        })
    }

    fn edit_permission(&self, node: &NodePath, target: EditTarget<'_>) -> Permission {
        if let Some(reason) = &self.edit_target_lock {
            return Permission::Denied(reason.clone());
        }
        let lock = match target {
            EditTarget::Attribute(attr) => self.attribute(node, attr).and_then(|a| a.lock.clone()),
            EditTarget::OpOrder => self.nodes.get(node).and_then(|n| n.order_lock.clone()),
        };
        match lock {
            Some(reason) => Permission::Denied(reason),
            None => Permission::Allowed,
        }
    }

    fn begin_undo_capture(&mut self) {
        self.capture_depth += 1;
    }

    fn end_undo_capture(&mut self) -> Vec<StageEdit> {
        self.capture_depth = self.capture_depth.saturating_sub(1);
        if self.capture_depth > 0 {
            return Vec::new();
        }
        std::mem::take(&mut self.captured)
    }

    fn apply_edit(&mut self, edit: &StageEdit) -> StackResult<()> {
        self.commit(edit.clone())
    }

    fn suppress_notifications(&mut self, node: &NodePath) {
        self.suppressed.entry(node.clone()).or_default().depth += 1;
    }

    fn resume_notifications(&mut self, node: &NodePath) {
        let Some(s) = self.suppressed.get_mut(node) else {
            return;
        };
        s.depth = s.depth.saturating_sub(1);
        if s.depth > 0 {
            return;
        }
        let Some(s) = self.suppressed.remove(node) else {
            return;
        };

        if s.stack_dirty {
            let notification = self.stack_changed(node.clone());
            self.notify(&notification);
            return;
        }
        for attr in s.values_dirty {
            self.notify(&Notification::ValueChanged {
                node: node.clone(),
                attr,
            });
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/memory.rs"]
mod tests;
