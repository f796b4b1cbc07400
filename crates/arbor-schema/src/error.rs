//! Schema error types
//!
//! Errors raised by matching rules and attribute type construction.

use crate::bytes::ByteString;
use thiserror::Error;

/// Error that can occur while applying schema contracts.
#[derive(Debug, Clone, Error)]
pub enum SchemaError {
    /// A matching rule rejected a value during normalization.
    ///
    /// Carries the offending bytes and the identity of the rule that
    /// rejected them, so the caller can report which attribute value of
    /// which entry could not be processed.
    #[error("value '{value}' is not valid for matching rule {rule}")]
    Normalization {
        /// Name of the rule that rejected the value.
        rule: String,
        /// The raw bytes that failed normalization.
        value: ByteString,
    },

    /// An attribute type descriptor is malformed.
    #[error("invalid attribute type '{name}': {message}")]
    InvalidAttributeType {
        /// The offending type name or OID.
        name: String,
        /// Description of the problem.
        message: String,
    },
}

impl SchemaError {
    /// Convenience constructor for a normalization failure.
    pub fn normalization(rule: impl Into<String>, value: ByteString) -> Self {
        SchemaError::Normalization {
            rule: rule.into(),
            value,
        }
    }
}

/// Result alias for schema operations.
pub type SchemaResult<T> = Result<T, SchemaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalization_display() {
        let err = SchemaError::normalization("integerMatch", ByteString::from("abc"));
        assert_eq!(
            err.to_string(),
            "value 'abc' is not valid for matching rule integerMatch"
        );
    }

    #[test]
    fn test_normalization_carries_offending_bytes() {
        let err = SchemaError::normalization("integerMatch", ByteString::from("12x"));
        match err {
            SchemaError::Normalization { rule, value } => {
                assert_eq!(rule, "integerMatch");
                assert_eq!(value.as_bytes(), b"12x");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
