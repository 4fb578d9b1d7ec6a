/// Convenience result type used across the crate.
pub type StackResult<T> = Result<T, StackError>;

/// Top-level error taxonomy used by stack APIs.
#[derive(thiserror::Error, Debug)]
pub enum StackError {
    /// An op name is not part of the canonical stack.
    ///
    /// Callers treat this as a signal to defer to another transform model.
    #[error("lookup error: {0}")]
    Lookup(String),

    /// Storage refused an edit under the current authoring rules.
    #[error("permission error: {0}")]
    Permission(String),

    /// Storage is inconsistent in a way this crate cannot repair.
    #[error("invariant violation: {0}")]
    InvariantViolation(String),

    /// A rotation convention without a conversion was exercised.
    #[error("unsupported conversion: {0}")]
    UnsupportedConversion(String),

    /// Invalid or unparsable options.
    #[error("config error: {0}")]
    Config(String),

    /// Wrapped lower-level error from dependencies or host storage.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl StackError {
    /// Build a [`StackError::Lookup`] value.
    pub fn lookup(msg: impl Into<String>) -> Self {
        Self::Lookup(msg.into())
    }

    /// Build a [`StackError::Permission`] value.
    pub fn permission(msg: impl Into<String>) -> Self {
        Self::Permission(msg.into())
    }

    /// Build a [`StackError::InvariantViolation`] value.
    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::InvariantViolation(msg.into())
    }

    /// Build a [`StackError::UnsupportedConversion`] value.
    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::UnsupportedConversion(msg.into())
    }

    /// Build a [`StackError::Config`] value.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// True for [`StackError::Lookup`].
    pub fn is_lookup(&self) -> bool {
        matches!(self, Self::Lookup(_))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
