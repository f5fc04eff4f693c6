//! Error types for CTL descriptor parsing.

use thiserror::Error;

/// Errors raised while parsing a CTL descriptor.
#[derive(Error, Debug)]
pub enum CtlError {
    /// A handled directive is present but cannot be parsed.
    #[error("malformed {directive} directive: {reason}")]
    MalformedDescriptor { directive: String, reason: String },

    /// A mandatory directive never appeared in the descriptor text.
    #[error("descriptor is missing the mandatory {0} directive")]
    MissingDirective(&'static str),
}

impl CtlError {
    /// Create a MalformedDescriptor error.
    pub fn malformed(directive: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedDescriptor {
            directive: directive.into(),
            reason: reason.into(),
        }
    }
}

/// Result type for descriptor parsing.
pub type Result<T> = std::result::Result<T, CtlError>;
