//! Edit-permission gate and command constructors for [`TransformStack`].

use crate::foundation::core::{DVec3, Precision};
use crate::foundation::error::{StackError, StackResult};
use crate::scene::storage::{EditTarget, Permission, SceneStorage};
use crate::stack::order::ordered_ops;
use crate::stack::registry::{OpKind, OpNdx, RotationOrder, suffix_of};
use crate::stack::rotation::{conversion_for, default_conversion};
use crate::transform::command::{OpTarget, SetOpCommand, ValueShape};
use crate::transform::view::TransformStack;

/// Which pivot pair a pivot command edits.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PivotKind {
    /// `xformOp:translate:rotatePivot` and its inverse.
    Rotate,
    /// `xformOp:translate:scalePivot` and its inverse.
    Scale,
    /// The pivot shared by rotation and scale.
    Common,
}

impl PivotKind {
    fn ndx(self) -> OpNdx {
        match self {
            Self::Rotate => OpNdx::RotatePivot,
            Self::Scale => OpNdx::ScalePivot,
            Self::Common => OpNdx::Pivot,
        }
    }
}

impl TransformStack {
    /// Whether `attr` may be edited; reports the refusal when it may not.
    ///
    /// An existing attribute is checked directly. A missing one would be created, so the op
    /// order is checked instead.
    fn can_edit<S: SceneStorage + ?Sized>(&self, storage: &S, attr: &str) -> bool {
        let target = if storage.has_attribute(self.node(), attr) {
            EditTarget::Attribute(attr)
        } else {
            EditTarget::OpOrder
        };
        match storage.edit_permission(self.node(), target) {
            Permission::Allowed => true,
            Permission::Denied(reason) => {
                tracing::warn!(node = %self.node(), attr, %reason, "edit refused");
                self.diagnostics().display_error(&reason);
                false
            }
        }
    }

    fn gated<S: SceneStorage + ?Sized>(
        &self,
        storage: &S,
        target: OpTarget,
        shape: ValueShape,
        value: DVec3,
    ) -> Option<SetOpCommand> {
        self.can_edit(storage, target.name()).then(|| {
            SetOpCommand::new(self.node().clone(), target, shape, value, self.options())
        })
    }

    fn translate_family_cmd<S: SceneStorage + ?Sized>(
        &self,
        storage: &S,
        ndx: OpNdx,
        precision: Precision,
        value: DVec3,
    ) -> Option<SetOpCommand> {
        let target = OpTarget::new(OpKind::Translate, suffix_of(ndx), precision);
        self.gated(storage, target, ValueShape::Vector, value)
    }

    /// Command setting the translation to `(x, y, z)`.
    ///
    /// `None` when the edit is not allowed; the reason has been reported.
    #[tracing::instrument(skip(self, storage), fields(node = %self.node()))]
    pub fn translate_cmd<S: SceneStorage + ?Sized>(
        &self,
        storage: &S,
        x: f64,
        y: f64,
        z: f64,
    ) -> StackResult<Option<SetOpCommand>> {
        Ok(self.translate_family_cmd(
            storage,
            OpNdx::Translate,
            Precision::Double,
            DVec3::new(x, y, z),
        ))
    }

    /// Command setting the rotation to `(x, y, z)` XYZ Euler degrees.
    ///
    /// Writes through the node's existing rotate op in whatever convention it stores; creates
    /// `xformOp:rotateXYZ` when the node has none.
    #[tracing::instrument(skip(self, storage), fields(node = %self.node()))]
    pub fn rotate_cmd<S: SceneStorage + ?Sized>(
        &self,
        storage: &S,
        x: f64,
        y: f64,
        z: f64,
    ) -> StackResult<Option<SetOpCommand>> {
        let existing = ordered_ops(storage, self.node())?.remove(&OpNdx::Rotate);
        let (target, conversion) = match existing {
            Some(op) => {
                let kind = op.kind().ok_or_else(|| {
                    StackError::lookup(format!("'{}' is not a transform op", op.name()))
                })?;
                (
                    OpTarget::new(kind, None, op.precision()),
                    conversion_for(op.name())?,
                )
            }
            None => (
                OpTarget::new(OpKind::Rotate(RotationOrder::XYZ), None, Precision::Float),
                default_conversion(),
            ),
        };
        Ok(self.gated(
            storage,
            target,
            ValueShape::Rotation(conversion),
            DVec3::new(x, y, z),
        ))
    }

    /// Command setting the scale to `(x, y, z)`.
    #[tracing::instrument(skip(self, storage), fields(node = %self.node()))]
    pub fn scale_cmd<S: SceneStorage + ?Sized>(
        &self,
        storage: &S,
        x: f64,
        y: f64,
        z: f64,
    ) -> StackResult<Option<SetOpCommand>> {
        let target = OpTarget::new(OpKind::Scale, None, Precision::Float);
        Ok(self.gated(storage, target, ValueShape::Vector, DVec3::new(x, y, z)))
    }

    /// Command setting a pivot; creates the pivot translate and its inverse together.
    #[tracing::instrument(skip(self, storage), fields(node = %self.node()))]
    pub fn pivot_cmd<S: SceneStorage + ?Sized>(
        &self,
        storage: &S,
        kind: PivotKind,
        x: f64,
        y: f64,
        z: f64,
    ) -> StackResult<Option<SetOpCommand>> {
        let suffix = suffix_of(kind.ndx()).ok_or_else(|| {
            StackError::invariant(format!("pivot position {:?} has no suffix", kind.ndx()))
        })?;
        let target = OpTarget::pivot_pair(suffix, Precision::Float);
        Ok(self.gated(storage, target, ValueShape::Vector, DVec3::new(x, y, z)))
    }

    /// Shorthand for [`Self::pivot_cmd`] with [`PivotKind::Rotate`].
    pub fn rotate_pivot_cmd<S: SceneStorage + ?Sized>(
        &self,
        storage: &S,
        x: f64,
        y: f64,
        z: f64,
    ) -> StackResult<Option<SetOpCommand>> {
        self.pivot_cmd(storage, PivotKind::Rotate, x, y, z)
    }

    /// Shorthand for [`Self::pivot_cmd`] with [`PivotKind::Scale`].
    pub fn scale_pivot_cmd<S: SceneStorage + ?Sized>(
        &self,
        storage: &S,
        x: f64,
        y: f64,
        z: f64,
    ) -> StackResult<Option<SetOpCommand>> {
        self.pivot_cmd(storage, PivotKind::Scale, x, y, z)
    }

    /// Command setting the rotate-pivot translation, which has no inverse twin.
    #[tracing::instrument(skip(self, storage), fields(node = %self.node()))]
    pub fn rotate_pivot_translate_cmd<S: SceneStorage + ?Sized>(
        &self,
        storage: &S,
        x: f64,
        y: f64,
        z: f64,
    ) -> StackResult<Option<SetOpCommand>> {
        Ok(self.translate_family_cmd(
            storage,
            OpNdx::RotatePivotTranslate,
            Precision::Float,
            DVec3::new(x, y, z),
        ))
    }

    /// Command setting the scale-pivot translation.
    #[tracing::instrument(skip(self, storage), fields(node = %self.node()))]
    pub fn scale_pivot_translate_cmd<S: SceneStorage + ?Sized>(
        &self,
        storage: &S,
        x: f64,
        y: f64,
        z: f64,
    ) -> StackResult<Option<SetOpCommand>> {
        Ok(self.translate_family_cmd(
            storage,
            OpNdx::ScalePivotTranslate,
            Precision::Float,
            DVec3::new(x, y, z),
        ))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/transform/builders.rs"]
mod tests;
