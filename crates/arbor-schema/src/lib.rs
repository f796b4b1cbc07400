//! # arbor Schema Contracts
//!
//! Schema-level building blocks for the arbor directory server: immutable
//! byte strings, the matching-rule capability traits, attribute type
//! descriptors, and the basic built-in rules.
//!
//! The entry data model (`arbor-model`) consumes these contracts to give
//! attribute values their schema-aware equality and ordering; index key
//! generation, filter evaluation, and result sorting all flow through them.
//!
//! ## Crate Organization
//!
//! - [`bytes`] - Immutable [`ByteString`] values
//! - [`matching`] - Matching rule capability traits and [`ConditionResult`]
//! - [`attribute_type`] - [`AttributeType`] descriptors and the [`Schema`] registry
//! - [`rules`] - Built-in string/integer/octet-string rules
//! - [`error`] - [`SchemaError`]
//!
//! ## Example
//!
//! ```
//! use arbor_schema::prelude::*;
//! use std::sync::Arc;
//!
//! let cn = Arc::new(AttributeType::case_ignore_string("cn", "2.5.4.3"));
//! let rule = cn.equality_rule().expect("cn has an equality rule");
//!
//! let a = rule.normalize(&ByteString::from("Babs  Jensen")).unwrap();
//! let b = rule.normalize(&ByteString::from("babs jensen")).unwrap();
//! assert!(rule.values_match(&a, &b));
//! ```

pub mod attribute_type;
pub mod bytes;
pub mod error;
pub mod matching;
pub mod rules;

pub use attribute_type::{AttributeType, Schema};
pub use bytes::ByteString;
pub use error::{SchemaError, SchemaResult};
pub use matching::{
    ApproximateMatchingRule, ConditionResult, EqualityMatchingRule, MatchingRule,
    OrderingMatchingRule, SubstringMatchingRule,
};

/// Prelude module for convenient imports.
///
/// ```
/// use arbor_schema::prelude::*;
/// ```
pub mod prelude {
    pub use crate::attribute_type::{AttributeType, Schema};
    pub use crate::bytes::ByteString;
    pub use crate::error::{SchemaError, SchemaResult};
    pub use crate::matching::{
        ApproximateMatchingRule, ConditionResult, EqualityMatchingRule, MatchingRule,
        OrderingMatchingRule, SubstringMatchingRule,
    };
    pub use crate::rules::{CaseExactMatch, CaseIgnoreMatch, IntegerMatch, OctetStringMatch};
}
