//! Undoable commands that set one op of the canonical stack.
//!
//! A command starts unbound. The first value assignment (or the first redo) binds it to the
//! target op, creating that op when the node lacks it. Creation and the re-normalized op
//! order are captured as one [`UndoableItem`], with notifications for the node held back so
//! observers only see the final order. Repeated [`SetOpCommand::set_value`] calls keep
//! overwriting the live value; undo always returns to the value seen at bind time.

use crate::foundation::config::StackOptions;
use crate::foundation::core::{DVec3, NodePath, OpValue, Precision, TimeCode};
use crate::foundation::error::{StackError, StackResult};
use crate::scene::storage::{Operation, SceneStorage};
use crate::scene::undo::{NotificationGuard, UndoBlock, UndoableItem};
use crate::stack::order::normalize;
use crate::stack::registry::{OpKind, op_name};
use crate::stack::rotation::RotationConversion;

/// A unit of undoable work over a scene storage.
pub trait UndoableCommand<S: SceneStorage + ?Sized> {
    /// First application; same as [`Self::redo`].
    fn execute(&mut self, storage: &mut S) -> StackResult<()> {
        self.redo(storage)
    }

    /// Revert the command. Legal in any state.
    fn undo(&mut self, storage: &mut S) -> StackResult<()>;

    /// Re-apply the command.
    fn redo(&mut self, storage: &mut S) -> StackResult<()>;
}

/// The op a command writes to, and how to create it.
#[derive(Clone, Debug, PartialEq)]
pub struct OpTarget {
    name: String,
    kind: OpKind,
    precision: Precision,
    suffix: Option<&'static str>,
    pivot_pair: bool,
}

impl OpTarget {
    /// A single op.
    pub fn new(kind: OpKind, suffix: Option<&'static str>, precision: Precision) -> Self {
        Self {
            name: op_name(kind, suffix, false),
            kind,
            precision,
            suffix,
            pivot_pair: false,
        }
    }

    /// A pivot translate and its inverse twin, created together.
    pub fn pivot_pair(suffix: &'static str, precision: Precision) -> Self {
        Self {
            pivot_pair: true,
            ..Self::new(OpKind::Translate, Some(suffix), precision)
        }
    }

    /// Name of the forward op, which is also its attribute name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Precision used when the op has to be created.
    pub fn precision(&self) -> Precision {
        self.precision
    }

    /// Whether the op is created together with its inverse twin.
    pub fn is_pivot_pair(&self) -> bool {
        self.pivot_pair
    }

    fn create<S: SceneStorage + ?Sized>(
        &self,
        storage: &mut S,
        node: &NodePath,
    ) -> StackResult<Operation> {
        let op = storage.create_operation(node, self.kind, self.precision, self.suffix, false)?;
        if self.pivot_pair {
            storage.create_operation(node, self.kind, self.precision, self.suffix, true)?;
        }
        normalize(storage, node)?;
        Ok(op)
    }
}

/// How a command's XYZ input maps onto the stored value.
#[derive(Clone, Copy, Debug)]
pub enum ValueShape {
    /// Stored as a 3-vector of the op's precision.
    Vector,
    /// XYZ Euler degrees converted into the rotate op's convention.
    Rotation(RotationConversion),
}

impl ValueShape {
    fn encode(&self, xyz: DVec3, precision: Precision) -> StackResult<OpValue> {
        match self {
            Self::Vector => Ok(OpValue::vector(xyz, precision)),
            Self::Rotation(conversion) => conversion.to_value(xyz, precision),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
enum Origin {
    /// The op was already on the node.
    Existing,
    /// This command created the op; the item reverts the creation.
    Created(UndoableItem),
}

#[derive(Clone, Debug, PartialEq)]
struct Binding {
    op: Operation,
    origin: Origin,
    baseline: Option<OpValue>,
    // Whether the command's effects, creation included, are live in storage.
    applied: bool,
}

/// Sets one canonical op of a node to an XYZ value.
#[derive(Clone, Debug)]
pub struct SetOpCommand {
    node: NodePath,
    target: OpTarget,
    shape: ValueShape,
    new_value: DVec3,
    read_time: TimeCode,
    write_time: TimeCode,
    // None while unbound.
    binding: Option<Binding>,
}

impl SetOpCommand {
    /// An unbound command that will set `target` on `node` to `value`.
    ///
    /// Nothing touches storage until the first [`Self::set_value`] or redo.
    pub fn new(
        node: NodePath,
        target: OpTarget,
        shape: ValueShape,
        value: DVec3,
        opts: StackOptions,
    ) -> Self {
        Self {
            node,
            target,
            shape,
            new_value: value,
            read_time: opts.read_time,
            write_time: opts.write_time,
            binding: None,
        }
    }

    /// Node the command edits.
    pub fn node(&self) -> &NodePath {
        &self.node
    }

    /// Op the command writes to.
    pub fn target(&self) -> &OpTarget {
        &self.target
    }

    /// Value the next redo writes.
    pub fn value(&self) -> DVec3 {
        self.new_value
    }

    /// Whether the command has resolved its op, creating it if needed.
    pub fn is_bound(&self) -> bool {
        self.binding.is_some()
    }

    /// Op the command is bound to.
    pub fn bound_op(&self) -> Option<&Operation> {
        self.binding.as_ref().map(|b| &b.op)
    }

    /// Whether binding created the op (as opposed to attaching to an existing one).
    pub fn created_op(&self) -> bool {
        self.binding
            .as_ref()
            .is_some_and(|b| matches!(b.origin, Origin::Created(_)))
    }

    /// Value the op held when the command bound, which undo restores.
    pub fn baseline(&self) -> Option<OpValue> {
        self.binding.as_ref().and_then(|b| b.baseline)
    }

    /// Set the op to `(x, y, z)`, binding the command on first use.
    ///
    /// Repeated calls coalesce: they all belong to this one command, and undo returns to the
    /// value seen before the first call.
    #[tracing::instrument(skip(self, storage), fields(node = %self.node, op = %self.target.name))]
    pub fn set_value<S: SceneStorage + ?Sized>(
        &mut self,
        storage: &mut S,
        x: f64,
        y: f64,
        z: f64,
    ) -> StackResult<()> {
        self.new_value = DVec3::new(x, y, z);
        self.apply(storage)
    }

    fn apply<S: SceneStorage + ?Sized>(&mut self, storage: &mut S) -> StackResult<()> {
        // Fails before any storage change when the convention has no conversion.
        self.shape.encode(self.new_value, self.target.precision)?;

        let binding = match self.binding.take() {
            Some(binding) => binding,
            None => self.bind(storage)?,
        };
        let binding = self.binding.insert(binding);
        let value = self.shape.encode(self.new_value, binding.op.precision())?;

        let mut guard = NotificationGuard::enter(storage, self.node.clone());
        if !binding.applied {
            if let Origin::Created(item) = &binding.origin {
                item.redo(&mut *guard)?;
                tracing::debug!("replayed op creation");
            }
            binding.applied = true;
        }
        guard.set_attribute_value(&self.node, binding.op.attr_name(), value, self.write_time)
    }

    fn bind<S: SceneStorage + ?Sized>(&self, storage: &mut S) -> StackResult<Binding> {
        if !storage.is_transformable(&self.node) {
            return Err(StackError::invariant(format!(
                "cannot bind '{}': node '{}' does not exist",
                self.target.name, self.node
            )));
        }

        let (ops, _) = storage.ordered_operations(&self.node)?;
        if let Some(op) = ops.into_iter().find(|op| op.name() == self.target.name) {
            let baseline = storage.attribute_value(&self.node, op.attr_name(), self.read_time);
            tracing::debug!(op = op.name(), "bound to existing op");
            return Ok(Binding {
                op,
                origin: Origin::Existing,
                baseline,
                applied: true,
            });
        }

        // One guard spans creation and any rollback, so observers never see a partial order.
        let mut guard = NotificationGuard::enter(storage, self.node.clone());
        let mut item = UndoableItem::default();
        let created = {
            let mut block = UndoBlock::open(&mut *guard, &mut item);
            self.target.create(&mut *block, &self.node)
        };

        match created {
            Ok(op) => {
                let baseline = guard.attribute_value(&self.node, op.attr_name(), self.read_time);
                tracing::debug!(op = op.name(), edits = item.edits().len(), "created op");
                Ok(Binding {
                    op,
                    origin: Origin::Created(item),
                    baseline,
                    applied: true,
                })
            }
            Err(err) => {
                if let Err(rollback) = item.undo(&mut *guard) {
                    tracing::error!(error = %rollback, "rolling back failed op creation");
                }
                Err(StackError::invariant(format!(
                    "failed to create '{}' on '{}': {err}",
                    self.target.name, self.node
                )))
            }
        }
    }
}

impl<S: SceneStorage + ?Sized> UndoableCommand<S> for SetOpCommand {
    #[tracing::instrument(skip(self, storage), fields(node = %self.node, op = %self.target.name))]
    fn undo(&mut self, storage: &mut S) -> StackResult<()> {
        let Some(binding) = self.binding.as_mut() else {
            return Ok(());
        };
        if !binding.applied {
            return Ok(());
        }

        let mut guard = NotificationGuard::enter(storage, self.node.clone());
        let attr = binding.op.attr_name();
        match binding.baseline {
            Some(value) => guard.set_attribute_value(&self.node, attr, value, self.write_time)?,
            None => guard.clear_attribute_value(&self.node, attr, self.write_time)?,
        }
        if let Origin::Created(item) = &binding.origin {
            item.undo(&mut *guard)?;
            tracing::debug!("reverted op creation");
        }
        binding.applied = false;
        Ok(())
    }

    #[tracing::instrument(skip(self, storage), fields(node = %self.node, op = %self.target.name))]
    fn redo(&mut self, storage: &mut S) -> StackResult<()> {
        self.apply(storage)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/transform/command.rs"]
mod tests;
