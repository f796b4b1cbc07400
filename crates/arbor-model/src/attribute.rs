//! Attributes
//!
//! [`Attribute`] is the polymorphic, named, value-bearing container of the
//! entry data model, a tagged-variant type with three behaviors:
//!
//! - [`StoredAttribute`] owns a materialized value set and evaluates every
//!   operation against it with the type's matching rules.
//! - [`VirtualAttribute`] owns no values; every operation recomputes
//!   through a [`VirtualAttributeProvider`](crate::provider::VirtualAttributeProvider),
//!   so successive reads may observe different results.
//! - [`CollectiveVirtualAttribute`] wraps another attribute and forwards
//!   everything to it unchanged — except `is_virtual`, which is always
//!   true. This lets a statically stored collective-subentry value surface
//!   through an entry's attribute list while still being flagged as
//!   non-authoritative to callers that branch on the flag.
//!
//! Search, sort, and index code consume attributes only through this
//! capability surface; no caller branches on the variant.

use crate::entry::Entry;
use crate::error::ModelResult;
use crate::provider::VirtualAttributeRule;
use crate::value::AttributeValue;
use arbor_schema::{AttributeType, ByteString, ConditionResult};
use std::cmp::Ordering;
use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;
use tracing::warn;

/// Whether any of `values` matches the assertion under the value's bound
/// equality rule. Normalization failures make individual values unmatchable.
pub(crate) fn contains_value(values: &[AttributeValue], assertion: &AttributeValue) -> bool {
    values.iter().any(|v| v.matches(assertion).is_true())
}

/// Substring evaluation shared by stored attributes and the provider
/// defaults. `Undefined` when the type has no substring rule or when
/// normalization failures prevent a definite answer.
pub(crate) fn substring_match(
    attribute_type: &AttributeType,
    values: &[AttributeValue],
    initial: Option<&ByteString>,
    any: &[ByteString],
    r#final: Option<&ByteString>,
) -> ConditionResult {
    let Some(rule) = attribute_type.substring_rule() else {
        return ConditionResult::Undefined;
    };

    let Ok(initial) = initial.map(|c| rule.normalize(c)).transpose() else {
        return ConditionResult::Undefined;
    };
    let Ok(any) = any
        .iter()
        .map(|c| rule.normalize(c))
        .collect::<Result<Vec<_>, _>>()
    else {
        return ConditionResult::Undefined;
    };
    let Ok(r#final) = r#final.map(|c| rule.normalize(c)).transpose() else {
        return ConditionResult::Undefined;
    };

    let mut had_failure = false;
    for value in values {
        match rule.normalize(value.raw()) {
            Ok(normalized) => {
                if rule.matches_substring(&normalized, initial.as_ref(), &any, r#final.as_ref()) {
                    return ConditionResult::True;
                }
            }
            Err(_) => had_failure = true,
        }
    }
    if had_failure {
        ConditionResult::Undefined
    } else {
        ConditionResult::False
    }
}

/// Ordering-based evaluation (`>=`, `<=`) shared by stored attributes and
/// the provider defaults.
pub(crate) fn ordered_match(
    attribute_type: &AttributeType,
    values: &[AttributeValue],
    assertion: &AttributeValue,
    accept: fn(Ordering) -> bool,
) -> ConditionResult {
    let Some(rule) = attribute_type.ordering_rule() else {
        return ConditionResult::Undefined;
    };
    let Ok(assertion) = rule.normalize(assertion.raw()) else {
        return ConditionResult::Undefined;
    };

    let mut had_failure = false;
    for value in values {
        match rule.normalize(value.raw()) {
            Ok(normalized) => {
                if accept(rule.compare(&normalized, &assertion)) {
                    return ConditionResult::True;
                }
            }
            Err(_) => had_failure = true,
        }
    }
    if had_failure {
        ConditionResult::Undefined
    } else {
        ConditionResult::False
    }
}

/// Approximate-match evaluation shared by stored attributes and the
/// provider defaults.
pub(crate) fn approximate_match(
    attribute_type: &AttributeType,
    values: &[AttributeValue],
    assertion: &AttributeValue,
) -> ConditionResult {
    let Some(rule) = attribute_type.approximate_rule() else {
        return ConditionResult::Undefined;
    };
    let Ok(assertion) = rule.normalize(assertion.raw()) else {
        return ConditionResult::Undefined;
    };

    let mut had_failure = false;
    for value in values {
        match rule.normalize(value.raw()) {
            Ok(normalized) => {
                if rule.approximately_match(&normalized, &assertion) {
                    return ConditionResult::True;
                }
            }
            Err(_) => had_failure = true,
        }
    }
    if had_failure {
        ConditionResult::Undefined
    } else {
        ConditionResult::False
    }
}

/// Builder for stored attributes.
///
/// Collects values, deduplicating by normalized form (raw form for values
/// the rule rejects), and carries the attribute's options.
#[derive(Debug, Clone)]
pub struct AttributeBuilder {
    attribute_type: Arc<AttributeType>,
    options: BTreeSet<String>,
    values: Vec<AttributeValue>,
    seen: HashSet<ByteString>,
}

impl AttributeBuilder {
    /// Start building an attribute of the given type.
    #[must_use]
    pub fn new(attribute_type: Arc<AttributeType>) -> Self {
        Self {
            attribute_type,
            options: BTreeSet::new(),
            values: Vec::new(),
            seen: HashSet::new(),
        }
    }

    /// Add an option (e.g. a language tag such as `lang-fr`).
    #[must_use]
    pub fn option(mut self, option: impl Into<String>) -> Self {
        self.options.insert(option.into());
        self
    }

    /// Add a raw value.
    #[must_use]
    pub fn value(self, value: impl Into<ByteString>) -> Self {
        let value = AttributeValue::new(&self.attribute_type, value);
        self.attribute_value(value)
    }

    /// Add an existing attribute value.
    #[must_use]
    pub fn attribute_value(mut self, value: AttributeValue) -> Self {
        let key = value
            .normalized()
            .cloned()
            .unwrap_or_else(|_| value.raw().clone());
        if self.seen.insert(key) {
            self.values.push(value);
        }
        self
    }

    /// Build the stored attribute.
    #[must_use]
    pub fn build(self) -> StoredAttribute {
        StoredAttribute {
            attribute_type: self.attribute_type,
            options: self.options,
            values: self.values,
        }
    }
}

/// An attribute with a materialized value set.
#[derive(Debug, Clone)]
pub struct StoredAttribute {
    attribute_type: Arc<AttributeType>,
    options: BTreeSet<String>,
    values: Vec<AttributeValue>,
}

impl StoredAttribute {
    /// The attribute type.
    #[must_use]
    pub fn attribute_type(&self) -> &Arc<AttributeType> {
        &self.attribute_type
    }

    /// The attribute options, in their original spelling.
    #[must_use]
    pub fn options(&self) -> &BTreeSet<String> {
        &self.options
    }

    /// The materialized values.
    #[must_use]
    pub fn values(&self) -> &[AttributeValue] {
        &self.values
    }

    /// The number of values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the attribute holds no values.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Whether the attribute contains a value matching the assertion.
    #[must_use]
    pub fn contains(&self, assertion: &AttributeValue) -> bool {
        contains_value(&self.values, assertion)
    }
}

impl PartialEq for StoredAttribute {
    /// Equality over (type, options, value set); options compare
    /// case-insensitively, values by normalized form.
    fn eq(&self, other: &Self) -> bool {
        self.attribute_type == other.attribute_type
            && folded_options(&self.options) == folded_options(&other.options)
            && self.values.len() == other.values.len()
            && self.values.iter().all(|v| contains_value(&other.values, v))
    }
}

fn folded_options(options: &BTreeSet<String>) -> BTreeSet<String> {
    options.iter().map(|o| o.to_ascii_lowercase()).collect()
}

/// An attribute whose values are computed on demand by a provider.
///
/// Holds a reference to the entry it was created for; every operation
/// re-invokes the provider against that entry, with no caching. Provider
/// invocation is synchronous and may be expensive — callers must not hold
/// broader locks across virtual attribute reads.
#[derive(Debug, Clone)]
pub struct VirtualAttribute {
    entry: Arc<Entry>,
    rule: Arc<VirtualAttributeRule>,
    // Virtual attributes carry no options; kept as a field so the
    // capability surface can hand out a reference uniformly.
    options: BTreeSet<String>,
}

impl VirtualAttribute {
    /// Create a virtual attribute over the given entry and rule.
    #[must_use]
    pub fn new(entry: Arc<Entry>, rule: Arc<VirtualAttributeRule>) -> Self {
        Self {
            entry,
            rule,
            options: BTreeSet::new(),
        }
    }

    /// The attribute type (taken from the rule).
    #[must_use]
    pub fn attribute_type(&self) -> &Arc<AttributeType> {
        self.rule.attribute_type()
    }

    /// The rule driving this attribute.
    #[must_use]
    pub fn rule(&self) -> &Arc<VirtualAttributeRule> {
        &self.rule
    }

    /// The entry the provider computes against.
    #[must_use]
    pub fn entry(&self) -> &Arc<Entry> {
        &self.entry
    }

    /// Compute the current values.
    ///
    /// # Errors
    ///
    /// [`ModelError::Provider`](crate::ModelError::Provider) when the provider fails.
    pub fn values(&self) -> ModelResult<Vec<AttributeValue>> {
        self.rule.provider().values(&self.entry, &self.rule)
    }

    fn len(&self) -> usize {
        match self.values() {
            Ok(values) => values.len(),
            Err(error) => {
                warn!(
                    attribute = %self.attribute_type(),
                    %error,
                    "virtual attribute size unavailable"
                );
                0
            }
        }
    }
}

/// A wrapper surfacing a collective-subentry attribute as virtual.
///
/// Forwards every operation to the wrapped attribute unchanged; only
/// `is_virtual` is overridden to `true`, even when the delegate is stored.
#[derive(Debug, Clone)]
pub struct CollectiveVirtualAttribute {
    attribute: Box<Attribute>,
}

impl CollectiveVirtualAttribute {
    /// Wrap an attribute.
    #[must_use]
    pub fn new(attribute: Attribute) -> Self {
        Self {
            attribute: Box::new(attribute),
        }
    }

    /// The wrapped attribute.
    #[must_use]
    pub fn wrapped(&self) -> &Attribute {
        &self.attribute
    }
}

/// The polymorphic attribute.
#[derive(Debug, Clone)]
pub enum Attribute {
    /// Materialized values.
    Stored(StoredAttribute),
    /// Provider-computed values.
    Virtual(VirtualAttribute),
    /// A delegate forced to report itself virtual.
    CollectiveVirtual(CollectiveVirtualAttribute),
}

impl Attribute {
    /// The attribute type.
    #[must_use]
    pub fn attribute_type(&self) -> &Arc<AttributeType> {
        match self {
            Attribute::Stored(a) => a.attribute_type(),
            Attribute::Virtual(a) => a.attribute_type(),
            Attribute::CollectiveVirtual(a) => a.wrapped().attribute_type(),
        }
    }

    /// The attribute options.
    #[must_use]
    pub fn options(&self) -> &BTreeSet<String> {
        match self {
            Attribute::Stored(a) => a.options(),
            Attribute::Virtual(a) => &a.options,
            Attribute::CollectiveVirtual(a) => a.wrapped().options(),
        }
    }

    /// Whether the attribute carries the given option
    /// (ASCII-case-insensitive).
    #[must_use]
    pub fn has_option(&self, option: &str) -> bool {
        self.options()
            .iter()
            .any(|o| o.eq_ignore_ascii_case(option))
    }

    /// Whether the attribute carries every one of the given options.
    #[must_use]
    pub fn has_all_options(&self, required: &BTreeSet<String>) -> bool {
        required.iter().all(|o| self.has_option(o))
    }

    /// Whether this attribute is virtual. `CollectiveVirtual` always
    /// reports true, regardless of its delegate.
    #[must_use]
    pub fn is_virtual(&self) -> bool {
        match self {
            Attribute::Stored(_) => false,
            Attribute::Virtual(_) | Attribute::CollectiveVirtual(_) => true,
        }
    }

    /// Whether the attribute contains a value matching the assertion.
    #[must_use]
    pub fn contains(&self, assertion: &AttributeValue) -> bool {
        match self {
            Attribute::Stored(a) => a.contains(assertion),
            Attribute::Virtual(a) => {
                a.rule
                    .provider()
                    .has_value(&a.entry, &a.rule, assertion)
            }
            Attribute::CollectiveVirtual(a) => a.wrapped().contains(assertion),
        }
    }

    /// Tri-state substring match; `Undefined` when the type has no
    /// substring rule.
    #[must_use]
    pub fn matches_substring(
        &self,
        initial: Option<&ByteString>,
        any: &[ByteString],
        r#final: Option<&ByteString>,
    ) -> ConditionResult {
        match self {
            Attribute::Stored(a) => {
                substring_match(&a.attribute_type, &a.values, initial, any, r#final)
            }
            Attribute::Virtual(a) => a
                .rule
                .provider()
                .matches_substring(&a.entry, &a.rule, initial, any, r#final),
            Attribute::CollectiveVirtual(a) => {
                a.wrapped().matches_substring(initial, any, r#final)
            }
        }
    }

    /// Tri-state `>=` match; `Undefined` when the type has no ordering
    /// rule.
    #[must_use]
    pub fn greater_than_or_equal_to(&self, assertion: &AttributeValue) -> ConditionResult {
        match self {
            Attribute::Stored(a) => ordered_match(
                &a.attribute_type,
                &a.values,
                assertion,
                Ordering::is_ge,
            ),
            Attribute::Virtual(a) => a
                .rule
                .provider()
                .greater_than_or_equal_to(&a.entry, &a.rule, assertion),
            Attribute::CollectiveVirtual(a) => a.wrapped().greater_than_or_equal_to(assertion),
        }
    }

    /// Tri-state `<=` match; `Undefined` when the type has no ordering
    /// rule.
    #[must_use]
    pub fn less_than_or_equal_to(&self, assertion: &AttributeValue) -> ConditionResult {
        match self {
            Attribute::Stored(a) => ordered_match(
                &a.attribute_type,
                &a.values,
                assertion,
                Ordering::is_le,
            ),
            Attribute::Virtual(a) => a
                .rule
                .provider()
                .less_than_or_equal_to(&a.entry, &a.rule, assertion),
            Attribute::CollectiveVirtual(a) => a.wrapped().less_than_or_equal_to(assertion),
        }
    }

    /// Tri-state approximate match; `Undefined` when the type has no
    /// approximate rule.
    #[must_use]
    pub fn approximately_equal_to(&self, assertion: &AttributeValue) -> ConditionResult {
        match self {
            Attribute::Stored(a) => approximate_match(&a.attribute_type, &a.values, assertion),
            Attribute::Virtual(a) => a
                .rule
                .provider()
                .approximately_equal_to(&a.entry, &a.rule, assertion),
            Attribute::CollectiveVirtual(a) => a.wrapped().approximately_equal_to(assertion),
        }
    }

    /// The current values: a clone of the materialized set for stored
    /// attributes, a fresh provider computation for virtual ones.
    ///
    /// # Errors
    ///
    /// [`ModelError::Provider`](crate::ModelError::Provider) when a provider fails; stored attributes
    /// never fail.
    pub fn values(&self) -> ModelResult<Vec<AttributeValue>> {
        match self {
            Attribute::Stored(a) => Ok(a.values.clone()),
            Attribute::Virtual(a) => a.values(),
            Attribute::CollectiveVirtual(a) => a.wrapped().values(),
        }
    }

    /// The number of values currently visible.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Attribute::Stored(a) => a.len(),
            Attribute::Virtual(a) => a.len(),
            Attribute::CollectiveVirtual(a) => a.wrapped().len(),
        }
    }

    /// Whether the attribute currently has no values.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<StoredAttribute> for Attribute {
    fn from(attribute: StoredAttribute) -> Self {
        Attribute::Stored(attribute)
    }
}

impl From<VirtualAttribute> for Attribute {
    fn from(attribute: VirtualAttribute) -> Self {
        Attribute::Virtual(attribute)
    }
}

impl From<CollectiveVirtualAttribute> for Attribute {
    fn from(attribute: CollectiveVirtualAttribute) -> Self {
        Attribute::CollectiveVirtual(attribute)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arbor_schema::AttributeType;

    fn cn() -> Arc<AttributeType> {
        Arc::new(AttributeType::case_ignore_string("cn", "2.5.4.3"))
    }

    fn uid_number() -> Arc<AttributeType> {
        Arc::new(AttributeType::integer("uidNumber", "1.3.6.1.1.1.1.0"))
    }

    fn stored(values: &[&str]) -> StoredAttribute {
        let mut builder = AttributeBuilder::new(cn());
        for v in values {
            builder = builder.value(*v);
        }
        builder.build()
    }

    #[test]
    fn test_builder_deduplicates_by_normalized_form() {
        let attr = stored(&["Babs Jensen", "babs  JENSEN", "Tim Howes"]);
        assert_eq!(attr.len(), 2);
        // The first spelling wins.
        assert_eq!(attr.values()[0].raw().as_bytes(), b"Babs Jensen");
    }

    #[test]
    fn test_stored_contains_is_schema_aware() {
        let attr = Attribute::from(stored(&["Babs Jensen"]));
        assert!(attr.contains(&AttributeValue::new(&cn(), "BABS  jensen")));
        assert!(!attr.contains(&AttributeValue::new(&cn(), "Tim Howes")));
        assert!(!attr.is_virtual());
    }

    #[test]
    fn test_stored_equality_ignores_value_order_and_option_case() {
        let a = AttributeBuilder::new(cn())
            .option("lang-FR")
            .value("one")
            .value("two")
            .build();
        let b = AttributeBuilder::new(cn())
            .option("lang-fr")
            .value("TWO")
            .value("ONE")
            .build();
        assert_eq!(a, b);
        let c = AttributeBuilder::new(cn()).value("one").build();
        assert_ne!(a, c);
    }

    #[test]
    fn test_substring_matching() {
        let attr = Attribute::from(stored(&["Babs Jensen"]));
        let initial = ByteString::from("babs");
        let any = [ByteString::from("jen")];
        assert_eq!(
            attr.matches_substring(Some(&initial), &any, None),
            ConditionResult::True
        );
        assert_eq!(
            attr.matches_substring(Some(&ByteString::from("tim")), &[], None),
            ConditionResult::False
        );
    }

    #[test]
    fn test_substring_undefined_without_rule() {
        let mut builder = AttributeBuilder::new(uid_number());
        builder = builder.value("42");
        let attr = Attribute::from(builder.build());
        assert_eq!(
            attr.matches_substring(Some(&ByteString::from("4")), &[], None),
            ConditionResult::Undefined
        );
    }

    #[test]
    fn test_ordering_predicates() {
        let attr = Attribute::from(
            AttributeBuilder::new(uid_number())
                .value("100")
                .value("200")
                .build(),
        );
        let assertion = |s: &str| AttributeValue::new(&uid_number(), s);
        assert_eq!(
            attr.greater_than_or_equal_to(&assertion("150")),
            ConditionResult::True
        );
        assert_eq!(
            attr.greater_than_or_equal_to(&assertion("201")),
            ConditionResult::False
        );
        assert_eq!(
            attr.less_than_or_equal_to(&assertion("99")),
            ConditionResult::False
        );
        assert_eq!(
            attr.less_than_or_equal_to(&assertion("100")),
            ConditionResult::True
        );
    }

    #[test]
    fn test_ordering_undefined_on_unnormalizable_assertion() {
        let attr = Attribute::from(AttributeBuilder::new(uid_number()).value("100").build());
        let bad = AttributeValue::new(&uid_number(), "many");
        assert_eq!(
            attr.greater_than_or_equal_to(&bad),
            ConditionResult::Undefined
        );
    }

    #[test]
    fn test_approximate_undefined_without_rule() {
        let attr = Attribute::from(stored(&["Babs"]));
        assert_eq!(
            attr.approximately_equal_to(&AttributeValue::new(&cn(), "Babs")),
            ConditionResult::Undefined
        );
    }

    #[test]
    fn test_collective_virtual_reports_virtual_over_stored_delegate() {
        let inner = Attribute::from(stored(&["shared value"]));
        assert!(!inner.is_virtual());
        let collective = Attribute::from(CollectiveVirtualAttribute::new(inner.clone()));
        assert!(collective.is_virtual());
        // Everything else is forwarded unchanged.
        assert_eq!(collective.len(), inner.len());
        assert!(collective.contains(&AttributeValue::new(&cn(), "Shared  Value")));
        assert_eq!(
            collective.attribute_type().name(),
            inner.attribute_type().name()
        );
    }

    #[test]
    fn test_empty_stored_attribute() {
        let attr = Attribute::from(AttributeBuilder::new(cn()).build());
        assert!(attr.is_empty());
        assert_eq!(attr.len(), 0);
        assert_eq!(attr.values().unwrap(), Vec::<AttributeValue>::new());
    }

    #[test]
    fn test_has_option_is_case_insensitive() {
        let attr = Attribute::from(AttributeBuilder::new(cn()).option("lang-fr").build());
        assert!(attr.has_option("LANG-FR"));
        assert!(!attr.has_option("lang-de"));
        let mut required = BTreeSet::new();
        required.insert("lang-FR".to_string());
        assert!(attr.has_all_options(&required));
        required.insert("binary".to_string());
        assert!(!attr.has_all_options(&required));
    }
}
