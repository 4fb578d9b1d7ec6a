//! Canonical stack positions and the op-name registry.

use std::collections::HashMap;
use std::sync::LazyLock;

use crate::foundation::error::{StackError, StackResult};

/// Prefix marking an op that applies the inverse of its attribute's value.
pub const INVERT_PREFIX: &str = "!invert!";
/// Namespace shared by every transform op attribute.
pub const XFORM_OP_NAMESPACE: &str = "xformOp";
/// Name of the attribute holding the op order.
pub const OP_ORDER_ATTR: &str = "xformOpOrder";

/// Canonical stack position. Declaration order is stack order.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub enum OpNdx {
    /// `xformOp:translate`.
    Translate,
    /// `xformOp:translate:pivot`, the pivot shared by rotation and scale.
    Pivot,
    /// `xformOp:translate:rotatePivotTranslate`.
    RotatePivotTranslate,
    /// `xformOp:translate:rotatePivot`.
    RotatePivot,
    /// Any Euler rotate op, or `xformOp:orient`.
    Rotate,
    /// `xformOp:rotateXYZ:rotateAxis`.
    RotateAxis,
    /// `!invert!xformOp:translate:rotatePivot`.
    RotatePivotInverse,
    /// `xformOp:translate:scalePivotTranslate`.
    ScalePivotTranslate,
    /// `xformOp:translate:scalePivot`.
    ScalePivot,
    /// `xformOp:transform:shear`.
    Shear,
    /// `xformOp:scale`.
    Scale,
    /// `!invert!xformOp:translate:scalePivot`.
    ScalePivotInverse,
    /// `!invert!xformOp:translate:pivot`.
    PivotInverse,
}

impl OpNdx {
    /// Every position, in stack order.
    pub const ALL: [OpNdx; 13] = [
        OpNdx::Translate,
        OpNdx::Pivot,
        OpNdx::RotatePivotTranslate,
        OpNdx::RotatePivot,
        OpNdx::Rotate,
        OpNdx::RotateAxis,
        OpNdx::RotatePivotInverse,
        OpNdx::ScalePivotTranslate,
        OpNdx::ScalePivot,
        OpNdx::Shear,
        OpNdx::Scale,
        OpNdx::ScalePivotInverse,
        OpNdx::PivotInverse,
    ];

    /// True for the three inverse-pivot positions.
    pub fn is_pivot_inverse(self) -> bool {
        matches!(
            self,
            Self::RotatePivotInverse | Self::ScalePivotInverse | Self::PivotInverse
        )
    }

    /// The other half of a pivot pair, if this position belongs to one.
    pub fn pivot_twin(self) -> Option<OpNdx> {
        match self {
            Self::Pivot => Some(Self::PivotInverse),
            Self::PivotInverse => Some(Self::Pivot),
            Self::RotatePivot => Some(Self::RotatePivotInverse),
            Self::RotatePivotInverse => Some(Self::RotatePivot),
            Self::ScalePivot => Some(Self::ScalePivotInverse),
            Self::ScalePivotInverse => Some(Self::ScalePivot),
            _ => None,
        }
    }
}

/// Axis order of an Euler rotate op; `X`/`Y`/`Z` are single-axis ops.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum RotationOrder {
    /// About X only.
    X,
    /// About Y only.
    Y,
    /// About Z only.
    Z,
    /// X, then Y, then Z.
    XYZ,
    /// X, then Z, then Y.
    XZY,
    /// Y, then X, then Z.
    YXZ,
    /// Y, then Z, then X.
    YZX,
    /// Z, then X, then Y.
    ZXY,
    /// Z, then Y, then X.
    ZYX,
}

impl RotationOrder {
    fn token(self) -> &'static str {
        match self {
            Self::X => "rotateX",
            Self::Y => "rotateY",
            Self::Z => "rotateZ",
            Self::XYZ => "rotateXYZ",
            Self::XZY => "rotateXZY",
            Self::YXZ => "rotateYXZ",
            Self::YZX => "rotateYZX",
            Self::ZXY => "rotateZXY",
            Self::ZYX => "rotateZYX",
        }
    }

    /// Axis indices in application order, or `None` for single-axis ops.
    pub fn axes(self) -> Option<[usize; 3]> {
        match self {
            Self::X | Self::Y | Self::Z => None,
            Self::XYZ => Some([0, 1, 2]),
            Self::XZY => Some([0, 2, 1]),
            Self::YXZ => Some([1, 0, 2]),
            Self::YZX => Some([1, 2, 0]),
            Self::ZXY => Some([2, 0, 1]),
            Self::ZYX => Some([2, 1, 0]),
        }
    }
}

/// Type of a transform op, as encoded in its attribute name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum OpKind {
    /// `translate`, with or without a suffix.
    Translate,
    /// `scale`.
    Scale,
    /// An Euler rotation in the given axis order.
    Rotate(RotationOrder),
    /// A quaternion rotation.
    Orient,
    /// A full matrix, which only the shear position uses.
    Transform,
}

impl OpKind {
    const ROTATIONS: [RotationOrder; 9] = [
        RotationOrder::X,
        RotationOrder::Y,
        RotationOrder::Z,
        RotationOrder::XYZ,
        RotationOrder::XZY,
        RotationOrder::YXZ,
        RotationOrder::YZX,
        RotationOrder::ZXY,
        RotationOrder::ZYX,
    ];

    /// Attribute-name token for this kind (`translate`, `rotateXYZ`, ...).
    pub fn token(self) -> &'static str {
        match self {
            Self::Translate => "translate",
            Self::Scale => "scale",
            Self::Rotate(order) => order.token(),
            Self::Orient => "orient",
            Self::Transform => "transform",
        }
    }

    fn from_token(token: &str) -> Option<Self> {
        match token {
            "translate" => Some(Self::Translate),
            "scale" => Some(Self::Scale),
            "orient" => Some(Self::Orient),
            "transform" => Some(Self::Transform),
            _ => Self::ROTATIONS
                .into_iter()
                .find(|o| o.token() == token)
                .map(Self::Rotate),
        }
    }

    /// Parse the kind out of an op or attribute name.
    pub fn parse(name: &str) -> Option<Self> {
        let (attr, _) = split_inverse(name);
        let rest = attr.strip_prefix(XFORM_OP_NAMESPACE)?.strip_prefix(':')?;
        let token = rest.split(':').next()?;
        Self::from_token(token)
    }
}

/// Build a stored op name from its kind, optional suffix and inverse flag.
pub fn op_name(kind: OpKind, suffix: Option<&str>, inverse: bool) -> String {
    let mut name = String::new();
    if inverse {
        name.push_str(INVERT_PREFIX);
    }
    name.push_str(XFORM_OP_NAMESPACE);
    name.push(':');
    name.push_str(kind.token());
    if let Some(suffix) = suffix.filter(|s| !s.is_empty()) {
        name.push(':');
        name.push_str(suffix);
    }
    name
}

/// Split an op name into its attribute name and inverse flag.
pub fn split_inverse(name: &str) -> (&str, bool) {
    match name.strip_prefix(INVERT_PREFIX) {
        Some(attr) => (attr, true),
        None => (name, false),
    }
}

const CANONICAL_OPS: &[(&str, OpNdx)] = &[
    ("xformOp:translate", OpNdx::Translate),
    ("xformOp:translate:pivot", OpNdx::Pivot),
    (
        "xformOp:translate:rotatePivotTranslate",
        OpNdx::RotatePivotTranslate,
    ),
    ("xformOp:translate:rotatePivot", OpNdx::RotatePivot),
    ("xformOp:rotateX", OpNdx::Rotate),
    ("xformOp:rotateY", OpNdx::Rotate),
    ("xformOp:rotateZ", OpNdx::Rotate),
    ("xformOp:rotateXYZ", OpNdx::Rotate),
    ("xformOp:rotateXZY", OpNdx::Rotate),
    ("xformOp:rotateYXZ", OpNdx::Rotate),
    ("xformOp:rotateYZX", OpNdx::Rotate),
    ("xformOp:rotateZXY", OpNdx::Rotate),
    ("xformOp:rotateZYX", OpNdx::Rotate),
    ("xformOp:orient", OpNdx::Rotate),
    ("xformOp:rotateXYZ:rotateAxis", OpNdx::RotateAxis),
    (
        "!invert!xformOp:translate:rotatePivot",
        OpNdx::RotatePivotInverse,
    ),
    (
        "xformOp:translate:scalePivotTranslate",
        OpNdx::ScalePivotTranslate,
    ),
    ("xformOp:translate:scalePivot", OpNdx::ScalePivot),
    ("xformOp:transform:shear", OpNdx::Shear),
    ("xformOp:scale", OpNdx::Scale),
    (
        "!invert!xformOp:translate:scalePivot",
        OpNdx::ScalePivotInverse,
    ),
    ("!invert!xformOp:translate:pivot", OpNdx::PivotInverse),
];

static OP_NAME_TO_NDX: LazyLock<HashMap<&'static str, OpNdx>> =
    LazyLock::new(|| CANONICAL_OPS.iter().copied().collect());

/// Canonical position of a stored op name.
///
/// Unknown names fail with [`StackError::Lookup`].
pub fn position_of(name: &str) -> StackResult<OpNdx> {
    OP_NAME_TO_NDX
        .get(name)
        .copied()
        .ok_or_else(|| StackError::lookup(format!("'{name}' is not a canonical stack op")))
}

/// Every op name the registry recognizes.
pub fn canonical_names() -> impl Iterator<Item = &'static str> {
    CANONICAL_OPS.iter().map(|(name, _)| *name)
}

/// Op-name suffix for positions that need one.
pub fn suffix_of(ndx: OpNdx) -> Option<&'static str> {
    match ndx {
        OpNdx::Pivot | OpNdx::PivotInverse => Some("pivot"),
        OpNdx::RotatePivotTranslate => Some("rotatePivotTranslate"),
        OpNdx::RotatePivot | OpNdx::RotatePivotInverse => Some("rotatePivot"),
        OpNdx::RotateAxis => Some("rotateAxis"),
        OpNdx::ScalePivotTranslate => Some("scalePivotTranslate"),
        OpNdx::ScalePivot | OpNdx::ScalePivotInverse => Some("scalePivot"),
        OpNdx::Shear => Some("shear"),
        OpNdx::Translate | OpNdx::Rotate | OpNdx::Scale => None,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/stack/registry.rs"]
mod tests;
