//! Attribute Types and the Schema Registry
//!
//! An [`AttributeType`] is the schema descriptor the data model hangs its
//! comparison semantics on: it names the attribute, and carries the matching
//! rules that define equality, ordering, substring, and approximate matching
//! for its values. Types are referenced (via `Arc`), never owned, by
//! attributes, RDNs, and DNs.
//!
//! [`Schema`] is a plain in-memory registry resolving names and OIDs to
//! attribute types, used by the DN parser. It is an explicit object passed
//! where needed — there is no process-wide registry — so tests can build
//! their own.
//!
//! # Example
//!
//! ```
//! use arbor_schema::{AttributeType, Schema};
//! use std::sync::Arc;
//!
//! let cn = Arc::new(AttributeType::case_ignore_string("cn", "2.5.4.3"));
//! let mut schema = Schema::new();
//! schema.register(cn.clone());
//!
//! assert_eq!(schema.attribute_type("CN"), Some(cn));
//! ```

use crate::matching::{
    ApproximateMatchingRule, EqualityMatchingRule, OrderingMatchingRule, SubstringMatchingRule,
};
use crate::rules::{CaseIgnoreMatch, IntegerMatch, OctetStringMatch};
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Schema descriptor for one attribute type.
///
/// Identity (`Eq`/`Hash`) is defined over the case-folded name-or-OID, so
/// `cn` and `CN` denote the same type.
#[derive(Clone)]
pub struct AttributeType {
    name: String,
    oid: String,
    single_valued: bool,
    operational: bool,
    equality: Option<Arc<dyn EqualityMatchingRule>>,
    ordering: Option<Arc<dyn OrderingMatchingRule>>,
    substring: Option<Arc<dyn SubstringMatchingRule>>,
    approximate: Option<Arc<dyn ApproximateMatchingRule>>,
}

impl AttributeType {
    /// Create an attribute type with no matching rules.
    pub fn new(name: impl Into<String>, oid: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            oid: oid.into(),
            single_valued: false,
            operational: false,
            equality: None,
            ordering: None,
            substring: None,
            approximate: None,
        }
    }

    /// Create a directory-string type with case-ignore equality, ordering,
    /// and substring rules (the common case for `cn`, `ou`, `dc`, ...).
    pub fn case_ignore_string(name: impl Into<String>, oid: impl Into<String>) -> Self {
        Self::new(name, oid)
            .with_equality(Arc::new(CaseIgnoreMatch))
            .with_ordering(Arc::new(CaseIgnoreMatch))
            .with_substring(Arc::new(CaseIgnoreMatch))
    }

    /// Create an integer type with integer equality and ordering rules.
    pub fn integer(name: impl Into<String>, oid: impl Into<String>) -> Self {
        Self::new(name, oid)
            .with_equality(Arc::new(IntegerMatch))
            .with_ordering(Arc::new(IntegerMatch))
    }

    /// Create a binary type with octet-string equality and ordering rules.
    pub fn octet_string(name: impl Into<String>, oid: impl Into<String>) -> Self {
        Self::new(name, oid)
            .with_equality(Arc::new(OctetStringMatch))
            .with_ordering(Arc::new(OctetStringMatch))
    }

    /// Set the equality matching rule.
    #[must_use]
    pub fn with_equality(mut self, rule: Arc<dyn EqualityMatchingRule>) -> Self {
        self.equality = Some(rule);
        self
    }

    /// Set the ordering matching rule.
    #[must_use]
    pub fn with_ordering(mut self, rule: Arc<dyn OrderingMatchingRule>) -> Self {
        self.ordering = Some(rule);
        self
    }

    /// Set the substring matching rule.
    #[must_use]
    pub fn with_substring(mut self, rule: Arc<dyn SubstringMatchingRule>) -> Self {
        self.substring = Some(rule);
        self
    }

    /// Set the approximate matching rule.
    #[must_use]
    pub fn with_approximate(mut self, rule: Arc<dyn ApproximateMatchingRule>) -> Self {
        self.approximate = Some(rule);
        self
    }

    /// Mark the type single-valued.
    #[must_use]
    pub fn with_single_valued(mut self) -> Self {
        self.single_valued = true;
        self
    }

    /// Mark the type operational.
    #[must_use]
    pub fn with_operational(mut self) -> Self {
        self.operational = true;
        self
    }

    /// The primary name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The OID.
    #[must_use]
    pub fn oid(&self) -> &str {
        &self.oid
    }

    /// The primary name, or the OID when the type has no name.
    #[must_use]
    pub fn name_or_oid(&self) -> &str {
        if self.name.is_empty() {
            &self.oid
        } else {
            &self.name
        }
    }

    /// Whether values of this type are limited to one per attribute.
    #[must_use]
    pub fn is_single_valued(&self) -> bool {
        self.single_valued
    }

    /// Whether this is an operational attribute type.
    #[must_use]
    pub fn is_operational(&self) -> bool {
        self.operational
    }

    /// The equality matching rule, if any.
    #[must_use]
    pub fn equality_rule(&self) -> Option<&Arc<dyn EqualityMatchingRule>> {
        self.equality.as_ref()
    }

    /// The ordering matching rule, if any.
    #[must_use]
    pub fn ordering_rule(&self) -> Option<&Arc<dyn OrderingMatchingRule>> {
        self.ordering.as_ref()
    }

    /// The substring matching rule, if any.
    #[must_use]
    pub fn substring_rule(&self) -> Option<&Arc<dyn SubstringMatchingRule>> {
        self.substring.as_ref()
    }

    /// The approximate matching rule, if any.
    #[must_use]
    pub fn approximate_rule(&self) -> Option<&Arc<dyn ApproximateMatchingRule>> {
        self.approximate.as_ref()
    }

    /// The case-folded identity key.
    #[must_use]
    pub fn key(&self) -> String {
        self.name_or_oid().to_ascii_lowercase()
    }
}

impl PartialEq for AttributeType {
    fn eq(&self, other: &Self) -> bool {
        self.name_or_oid()
            .eq_ignore_ascii_case(other.name_or_oid())
    }
}

impl Eq for AttributeType {}

impl Hash for AttributeType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for byte in self.name_or_oid().bytes() {
            state.write_u8(byte.to_ascii_lowercase());
        }
    }
}

impl fmt::Debug for AttributeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AttributeType")
            .field("name", &self.name)
            .field("oid", &self.oid)
            .field("single_valued", &self.single_valued)
            .field("operational", &self.operational)
            .field("equality", &self.equality.as_ref().map(|r| r.name()))
            .field("ordering", &self.ordering.as_ref().map(|r| r.name()))
            .field("substring", &self.substring.as_ref().map(|r| r.name()))
            .field("approximate", &self.approximate.as_ref().map(|r| r.name()))
            .finish()
    }
}

impl fmt::Display for AttributeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name_or_oid())
    }
}

/// In-memory attribute type registry.
///
/// Lookups are case-insensitive over both names and OIDs.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    types: HashMap<String, Arc<AttributeType>>,
}

impl Schema {
    /// Create an empty schema.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an attribute type under its name and OID.
    ///
    /// A later registration under the same name or OID replaces the
    /// earlier one.
    pub fn register(&mut self, attribute_type: Arc<AttributeType>) {
        if !attribute_type.name().is_empty() {
            self.types.insert(
                attribute_type.name().to_ascii_lowercase(),
                attribute_type.clone(),
            );
        }
        if !attribute_type.oid().is_empty() {
            self.types
                .insert(attribute_type.oid().to_ascii_lowercase(), attribute_type);
        }
    }

    /// Resolve a name or OID to an attribute type.
    #[must_use]
    pub fn attribute_type(&self, name_or_oid: &str) -> Option<Arc<AttributeType>> {
        self.types.get(&name_or_oid.to_ascii_lowercase()).cloned()
    }

    /// Whether the schema knows the given name or OID.
    #[must_use]
    pub fn has_attribute_type(&self, name_or_oid: &str) -> bool {
        self.types.contains_key(&name_or_oid.to_ascii_lowercase())
    }

    /// The number of distinct registrations (names plus OIDs).
    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Whether the schema is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}
