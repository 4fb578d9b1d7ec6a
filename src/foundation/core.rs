use std::fmt;

pub use glam::{DVec3, Vec3};

/// Absolute path of a scene node, e.g. `/World/Cube`.
#[derive(
    Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
pub struct NodePath(String);

impl NodePath {
    /// Wrap a node path string.
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    /// Borrow the path text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Last path component.
    pub fn name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or_default()
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodePath {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Time at which an attribute value is read or written.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeCode {
    /// The non-time-sampled (default) value.
    #[default]
    Default,
    /// A time sample, in frames.
    At(f64),
}

/// Numeric storage width of an op value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Precision {
    /// 32-bit floats.
    Float,
    /// 64-bit floats.
    Double,
}

/// Value stored on a transform op attribute.
///
/// Single-axis rotations store a scalar; everything else stores a 3-vector.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpValue {
    /// Single-width scalar.
    Float(f32),
    /// Double-width scalar.
    Double(f64),
    /// Single-width 3-vector.
    Vec3f(Vec3),
    /// Double-width 3-vector.
    Vec3d(DVec3),
}

impl OpValue {
    /// Build a 3-vector value with the requested precision.
    pub fn vector(v: DVec3, precision: Precision) -> Self {
        match precision {
            Precision::Float => Self::Vec3f(v.as_vec3()),
            Precision::Double => Self::Vec3d(v),
        }
    }

    /// Build a scalar value with the requested precision.
    pub fn scalar(v: f64, precision: Precision) -> Self {
        match precision {
            Precision::Float => Self::Float(v as f32),
            Precision::Double => Self::Double(v),
        }
    }

    /// Storage width of this value.
    pub fn precision(self) -> Precision {
        match self {
            Self::Float(_) | Self::Vec3f(_) => Precision::Float,
            Self::Double(_) | Self::Vec3d(_) => Precision::Double,
        }
    }

    /// True for the scalar shapes.
    pub fn is_scalar(self) -> bool {
        matches!(self, Self::Float(_) | Self::Double(_))
    }

    /// Widen a vector value to `DVec3`; `None` for scalars.
    pub fn as_dvec3(self) -> Option<DVec3> {
        match self {
            Self::Vec3f(v) => Some(v.as_dvec3()),
            Self::Vec3d(v) => Some(v),
            Self::Float(_) | Self::Double(_) => None,
        }
    }

    /// Widen a scalar value to `f64`; `None` for vectors.
    pub fn as_scalar(self) -> Option<f64> {
        match self {
            Self::Float(v) => Some(f64::from(v)),
            Self::Double(v) => Some(v),
            Self::Vec3f(_) | Self::Vec3d(_) => None,
        }
    }

    /// Interpolate between two samples of the same shape; mismatched shapes hold `a`.
    pub fn lerp(a: Self, b: Self, t: f64) -> Self {
        match (a, b) {
            (Self::Float(a), Self::Float(b)) => {
                Self::Float((f64::from(a) + (f64::from(b) - f64::from(a)) * t) as f32)
            }
            (Self::Double(a), Self::Double(b)) => Self::Double(a + (b - a) * t),
            (Self::Vec3f(a), Self::Vec3f(b)) => Self::Vec3f(a.lerp(b, t as f32)),
            (Self::Vec3d(a), Self::Vec3d(b)) => Self::Vec3d(a.lerp(b, t)),
            (a, _) => a,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
