//! Model error types
//!
//! The failure taxonomy of the entry data model. Normalization failures
//! originate in `arbor-schema` and are wrapped transparently; the rest are
//! model-level: missing rules where a fault (rather than a tri-state
//! `Undefined`) is the contract, provider failures, and DN/RDN construction
//! or parse errors.

use arbor_schema::SchemaError;
use thiserror::Error;

/// Error that can occur in the entry data model.
#[derive(Debug, Error)]
pub enum ModelError {
    /// A matching rule rejected a value (normalization failure).
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// An operation required an ordering matching rule the attribute type
    /// does not have, in a context with no tri-state result (sort orders).
    #[error("attribute type '{attribute}' has no ordering matching rule")]
    NoOrderingRule {
        /// The attribute type lacking the rule.
        attribute: String,
    },

    /// A virtual attribute provider failed internally. Propagated to the
    /// caller unchanged.
    #[error("virtual attribute provider failed: {message}")]
    Provider {
        /// Description of the failure.
        message: String,
        /// The underlying provider error, when available.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A DN string could not be parsed.
    #[error("invalid DN '{input}': {message}")]
    InvalidDn {
        /// The offending DN string.
        input: String,
        /// Description of the problem.
        message: String,
    },

    /// An RDN was malformed (for example, empty).
    #[error("invalid RDN: {message}")]
    InvalidRdn {
        /// Description of the problem.
        message: String,
    },

    /// An RDN listed the same attribute type twice.
    #[error("RDN contains attribute type '{name}' more than once")]
    DuplicateRdnType {
        /// The duplicated type name.
        name: String,
    },

    /// A sort order was constructed with no keys.
    #[error("a sort order requires at least one sort key")]
    EmptySortOrder,
}

impl ModelError {
    /// Convenience constructor for a provider failure.
    pub fn provider(message: impl Into<String>) -> Self {
        ModelError::Provider {
            message: message.into(),
            source: None,
        }
    }

    /// Provider failure wrapping an underlying error.
    pub fn provider_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        ModelError::Provider {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Convenience constructor for a DN parse failure.
    pub fn invalid_dn(input: impl Into<String>, message: impl Into<String>) -> Self {
        ModelError::InvalidDn {
            input: input.into(),
            message: message.into(),
        }
    }
}

/// Result alias for model operations.
pub type ModelResult<T> = Result<T, ModelError>;
