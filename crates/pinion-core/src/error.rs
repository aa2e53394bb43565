//! Reference and name error types.

/// Errors raised while parsing references or validating artifact names.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReferenceError {
    /// The reference has no `name@selector` shape.
    #[error("invalid reference '{input}': {detail}")]
    Malformed { input: String, detail: String },

    /// A namespace or name contains characters outside `[A-Za-z0-9_-]`.
    #[error("invalid {kind} '{value}': only ASCII letters, digits, '-' and '_' are allowed")]
    InvalidIdentifier { kind: &'static str, value: String },
}

/// Result type alias for reference parsing.
pub type Result<T> = std::result::Result<T, ReferenceError>;
