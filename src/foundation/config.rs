use crate::foundation::core::TimeCode;
use crate::foundation::error::{StackError, StackResult};

/// Options shared by every [`crate::TransformStack`] a resolver binds.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StackOptions {
    /// Time at which op values are read (views and undo baselines).
    pub read_time: TimeCode,
    /// Time at which commands author new values.
    pub write_time: TimeCode,
}

impl StackOptions {
    /// Parse options from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> StackResult<Self> {
        serde_json::from_reader(r)
            .map_err(|e| StackError::config(format!("parse stack options JSON: {e}")))
    }

    /// Parse options from a JSON string.
    pub fn from_json_str(s: &str) -> StackResult<Self> {
        Self::from_reader(s.as_bytes())
    }

    /// Options reading at `time` and writing default values.
    pub fn reading_at(time: f64) -> Self {
        Self {
            read_time: TimeCode::At(time),
            ..Self::default()
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/config.rs"]
mod tests;
