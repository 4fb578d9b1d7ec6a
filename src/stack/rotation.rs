//! Conversions between XYZ Euler angles and the value stored on each rotate op.
//!
//! Callers always speak XYZ Euler angles in degrees. Each rotate op stores its own
//! convention: single-axis ops store one scalar, the six Euler orders store per-axis angles
//! of an equivalent rotation applied in that order.

use std::collections::HashMap;
use std::sync::LazyLock;

use glam::DMat3;

use crate::foundation::core::{DVec3, OpValue, Precision};
use crate::foundation::error::{StackError, StackResult};
use crate::stack::registry::{OpKind, RotationOrder, op_name};

/// Rotation value in the shape a rotate op stores, before precision is applied.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RotationAttr {
    /// Angle in degrees, for single-axis ops.
    Scalar(f64),
    /// Euler angles in degrees, in the op's own axis order.
    Vector(DVec3),
}

impl RotationAttr {
    /// Shape this value for an op of the given precision.
    pub fn to_value(self, precision: Precision) -> OpValue {
        match self {
            Self::Scalar(v) => OpValue::scalar(v, precision),
            Self::Vector(v) => OpValue::vector(v, precision),
        }
    }

    /// Read a stored value back into rotation shape.
    pub fn from_value(value: OpValue) -> Self {
        match value.as_scalar() {
            Some(s) => Self::Scalar(s),
            None => Self::Vector(value.as_dvec3().unwrap_or(DVec3::ZERO)),
        }
    }
}

type ToAttrFn = fn(DVec3) -> RotationAttr;
type FromAttrFn = fn(RotationAttr) -> StackResult<DVec3>;

/// Conversion pair for one rotate op convention.
#[derive(Clone, Copy, Debug)]
pub struct RotationConversion {
    op_name: &'static str,
    to: Option<ToAttrFn>,
    from: Option<FromAttrFn>,
}

impl RotationConversion {
    /// Op name this conversion belongs to.
    pub fn op_name(&self) -> &'static str {
        self.op_name
    }

    /// Whether conversions exist for this convention.
    pub fn is_supported(&self) -> bool {
        self.to.is_some() && self.from.is_some()
    }

    /// Convert XYZ Euler angles (degrees) into the stored shape.
    pub fn to_attr(&self, xyz: DVec3) -> StackResult<RotationAttr> {
        let to = self.to.ok_or_else(|| self.unsupported())?;
        Ok(to(xyz))
    }

    /// Convert a stored rotation back into XYZ Euler angles (degrees).
    pub fn from_attr(&self, attr: RotationAttr) -> StackResult<DVec3> {
        let from = self.from.ok_or_else(|| self.unsupported())?;
        from(attr)
    }

    /// [`Self::to_attr`] followed by precision shaping.
    pub fn to_value(&self, xyz: DVec3, precision: Precision) -> StackResult<OpValue> {
        Ok(self.to_attr(xyz)?.to_value(precision))
    }

    /// [`Self::from_attr`] over a stored value.
    pub fn from_value(&self, value: OpValue) -> StackResult<DVec3> {
        self.from_attr(RotationAttr::from_value(value))
    }

    fn unsupported(&self) -> StackError {
        StackError::unsupported(format!(
            "rotation convention '{}' has no XYZ conversion",
            self.op_name
        ))
    }
}

const XYZ: [usize; 3] = [0, 1, 2];

fn axis_rotation(axis: usize, degrees: f64) -> DMat3 {
    let rad = degrees.to_radians();
    match axis {
        0 => DMat3::from_rotation_x(rad),
        1 => DMat3::from_rotation_y(rad),
        _ => DMat3::from_rotation_z(rad),
    }
}

/// Rotation matrix of per-axis angles applied in `order` (first axis first).
pub fn compose(angles: DVec3, order: [usize; 3]) -> DMat3 {
    let [i, j, k] = order;
    axis_rotation(k, angles[k]) * axis_rotation(j, angles[j]) * axis_rotation(i, angles[i])
}

/// Per-axis angles (degrees) that rebuild `m` when applied in `order`.
pub fn decompose(m: DMat3, order: [usize; 3]) -> DVec3 {
    let [i, j, k] = order;
    let s = if j == (i + 1) % 3 { 1.0 } else { -1.0 };
    let r = |row: usize, col: usize| m.col(col)[row];

    let sin_b = (-s * r(k, i)).clamp(-1.0, 1.0);
    let b = sin_b.asin();
    let (a, c) = if sin_b.abs() < 1.0 - 1e-12 {
        (
            f64::atan2(s * r(k, j), r(k, k)),
            f64::atan2(s * r(j, i), r(i, i)),
        )
    } else {
        // Gimbal lock: fold the whole twist into the first axis.
        (f64::atan2(-s * r(j, k), r(j, j)), 0.0)
    };

    let mut out = DVec3::ZERO;
    out[i] = a.to_degrees();
    out[j] = b.to_degrees();
    out[k] = c.to_degrees();
    out
}

fn reorder(angles: DVec3, from: [usize; 3], to: [usize; 3]) -> DVec3 {
    decompose(compose(angles, from), to)
}

fn expect_vector(attr: RotationAttr) -> StackResult<DVec3> {
    match attr {
        RotationAttr::Vector(v) => Ok(v),
        RotationAttr::Scalar(_) => Err(StackError::invariant(
            "three-axis rotate op holds a scalar value",
        )),
    }
}

fn expect_scalar(attr: RotationAttr) -> StackResult<f64> {
    match attr {
        RotationAttr::Scalar(v) => Ok(v),
        RotationAttr::Vector(_) => Err(StackError::invariant(
            "single-axis rotate op holds a vector value",
        )),
    }
}

fn to_x(v: DVec3) -> RotationAttr {
    RotationAttr::Scalar(v.x)
}
fn to_y(v: DVec3) -> RotationAttr {
    RotationAttr::Scalar(v.y)
}
fn to_z(v: DVec3) -> RotationAttr {
    RotationAttr::Scalar(v.z)
}
fn from_x(a: RotationAttr) -> StackResult<DVec3> {
    Ok(DVec3::new(expect_scalar(a)?, 0.0, 0.0))
}
fn from_y(a: RotationAttr) -> StackResult<DVec3> {
    Ok(DVec3::new(0.0, expect_scalar(a)?, 0.0))
}
fn from_z(a: RotationAttr) -> StackResult<DVec3> {
    Ok(DVec3::new(0.0, 0.0, expect_scalar(a)?))
}

fn to_xyz(v: DVec3) -> RotationAttr {
    RotationAttr::Vector(v)
}
fn from_xyz(a: RotationAttr) -> StackResult<DVec3> {
    expect_vector(a)
}

macro_rules! reorder_pair {
    ($to:ident, $from:ident, $order:expr) => {
        fn $to(v: DVec3) -> RotationAttr {
            RotationAttr::Vector(reorder(v, XYZ, $order))
        }
        fn $from(a: RotationAttr) -> StackResult<DVec3> {
            Ok(reorder(expect_vector(a)?, $order, XYZ))
        }
    };
}

reorder_pair!(to_xzy, from_xzy, [0, 2, 1]);
reorder_pair!(to_yxz, from_yxz, [1, 0, 2]);
reorder_pair!(to_yzx, from_yzx, [1, 2, 0]);
reorder_pair!(to_zxy, from_zxy, [2, 0, 1]);
reorder_pair!(to_zyx, from_zyx, [2, 1, 0]);

const ORIENT_OP: &str = "xformOp:orient";

static CONVERSIONS: [RotationConversion; 10] = [
    RotationConversion {
        op_name: "xformOp:rotateX",
        to: Some(to_x),
        from: Some(from_x),
    },
    RotationConversion {
        op_name: "xformOp:rotateY",
        to: Some(to_y),
        from: Some(from_y),
    },
    RotationConversion {
        op_name: "xformOp:rotateZ",
        to: Some(to_z),
        from: Some(from_z),
    },
    RotationConversion {
        op_name: "xformOp:rotateXYZ",
        to: Some(to_xyz),
        from: Some(from_xyz),
    },
    RotationConversion {
        op_name: "xformOp:rotateXZY",
        to: Some(to_xzy),
        from: Some(from_xzy),
    },
    RotationConversion {
        op_name: "xformOp:rotateYXZ",
        to: Some(to_yxz),
        from: Some(from_yxz),
    },
    RotationConversion {
        op_name: "xformOp:rotateYZX",
        to: Some(to_yzx),
        from: Some(from_yzx),
    },
    RotationConversion {
        op_name: "xformOp:rotateZXY",
        to: Some(to_zxy),
        from: Some(from_zxy),
    },
    RotationConversion {
        op_name: "xformOp:rotateZYX",
        to: Some(to_zyx),
        from: Some(from_zyx),
    },
    // Orient is unsupported: the entry exists so lookups succeed, and using it fails.
    RotationConversion {
        op_name: ORIENT_OP,
        to: None,
        from: None,
    },
];

static ROTATION_CONVERSIONS: LazyLock<HashMap<&'static str, RotationConversion>> =
    LazyLock::new(|| CONVERSIONS.iter().map(|c| (c.op_name, *c)).collect());

/// Conversion pair for a rotate op name.
///
/// Non-rotate names fail with [`StackError::Lookup`]; unsupported conventions resolve and only
/// fail when a conversion is invoked.
pub fn conversion_for(op_name: &str) -> StackResult<RotationConversion> {
    ROTATION_CONVERSIONS
        .get(op_name)
        .copied()
        .ok_or_else(|| StackError::lookup(format!("'{op_name}' is not a rotate op")))
}

/// Conversion used when a rotate op has to be created.
pub fn default_conversion() -> RotationConversion {
    CONVERSIONS[3]
}

/// Op name of the rotate op created when none exists.
pub fn default_rotate_op_name() -> String {
    op_name(OpKind::Rotate(RotationOrder::XYZ), None, false)
}

/// Every conversion in the table.
pub fn conversions() -> impl Iterator<Item = &'static RotationConversion> {
    CONVERSIONS.iter()
}

#[cfg(test)]
#[path = "../../tests/unit/stack/rotation.rs"]
mod tests;
