//! Virtual Attribute Providers
//!
//! The capability interface through which virtual attributes compute their
//! values and evaluate predicates. A provider is invoked synchronously,
//! per entry and per rule, with no caching anywhere between it and the
//! caller — "seconds until expiration" style attributes stay live.
//!
//! Only [`VirtualAttributeProvider::values`] is required; the predicate
//! methods have defaults that compute the values and evaluate them with
//! the attribute type's matching rules, exactly as a stored attribute
//! would. Providers with a cheaper direct answer (membership tests against
//! an index, say) override them.

use crate::attribute;
use crate::entry::Entry;
use crate::error::ModelResult;
use crate::value::AttributeValue;
use arbor_schema::{AttributeType, ByteString, ConditionResult};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;
use tracing::warn;

/// How a virtual attribute behaves when the entry already has a real
/// attribute of the same type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictBehavior {
    /// The real attribute is kept; the virtual one is not added.
    #[default]
    RealOverridesVirtual,
    /// The virtual attribute replaces the real one.
    VirtualOverridesReal,
    /// Both are kept.
    MergeRealAndVirtual,
}

/// Computes values for a virtual attribute.
///
/// Invocation is synchronous and may block (a provider may consult
/// external state); callers must not hold broader locks across a call.
/// Failures surface as [`ModelError::Provider`](crate::ModelError::Provider)
/// from [`values`](Self::values); the predicate defaults degrade to
/// `false`/`Undefined` with a warning, matching the tri-state contract.
pub trait VirtualAttributeProvider: Send + Sync + fmt::Debug {
    /// Compute the current values for the entry.
    ///
    /// # Errors
    ///
    /// [`ModelError::Provider`](crate::ModelError::Provider) on internal
    /// failure; propagated unchanged to the caller.
    fn values(&self, entry: &Entry, rule: &VirtualAttributeRule)
        -> ModelResult<Vec<AttributeValue>>;

    /// Whether this provider may generate more than one value per entry.
    fn is_multi_valued(&self) -> bool {
        true
    }

    /// Whether the computed values contain a match for the assertion.
    fn has_value(
        &self,
        entry: &Entry,
        rule: &VirtualAttributeRule,
        assertion: &AttributeValue,
    ) -> bool {
        match self.values(entry, rule) {
            Ok(values) => attribute::contains_value(&values, assertion),
            Err(error) => {
                warn!(attribute = %rule.attribute_type(), %error, "provider has_value failed");
                false
            }
        }
    }

    /// Substring evaluation over the computed values.
    fn matches_substring(
        &self,
        entry: &Entry,
        rule: &VirtualAttributeRule,
        initial: Option<&ByteString>,
        any: &[ByteString],
        r#final: Option<&ByteString>,
    ) -> ConditionResult {
        match self.values(entry, rule) {
            Ok(values) => attribute::substring_match(
                rule.attribute_type(),
                &values,
                initial,
                any,
                r#final,
            ),
            Err(error) => {
                warn!(attribute = %rule.attribute_type(), %error, "provider substring match failed");
                ConditionResult::Undefined
            }
        }
    }

    /// `>=` evaluation over the computed values.
    fn greater_than_or_equal_to(
        &self,
        entry: &Entry,
        rule: &VirtualAttributeRule,
        assertion: &AttributeValue,
    ) -> ConditionResult {
        self.ordered(entry, rule, assertion, Ordering::is_ge)
    }

    /// `<=` evaluation over the computed values.
    fn less_than_or_equal_to(
        &self,
        entry: &Entry,
        rule: &VirtualAttributeRule,
        assertion: &AttributeValue,
    ) -> ConditionResult {
        self.ordered(entry, rule, assertion, Ordering::is_le)
    }

    /// Ordering evaluation shared by the two bound predicates.
    #[doc(hidden)]
    fn ordered(
        &self,
        entry: &Entry,
        rule: &VirtualAttributeRule,
        assertion: &AttributeValue,
        accept: fn(Ordering) -> bool,
    ) -> ConditionResult {
        match self.values(entry, rule) {
            Ok(values) => {
                attribute::ordered_match(rule.attribute_type(), &values, assertion, accept)
            }
            Err(error) => {
                warn!(attribute = %rule.attribute_type(), %error, "provider ordering match failed");
                ConditionResult::Undefined
            }
        }
    }

    /// Approximate-match evaluation over the computed values.
    fn approximately_equal_to(
        &self,
        entry: &Entry,
        rule: &VirtualAttributeRule,
        assertion: &AttributeValue,
    ) -> ConditionResult {
        match self.values(entry, rule) {
            Ok(values) => {
                attribute::approximate_match(rule.attribute_type(), &values, assertion)
            }
            Err(error) => {
                warn!(attribute = %rule.attribute_type(), %error, "provider approximate match failed");
                ConditionResult::Undefined
            }
        }
    }
}

/// Binds an attribute type to the provider that computes it, with the
/// behavior to apply when a real attribute of the same type exists.
#[derive(Debug, Clone)]
pub struct VirtualAttributeRule {
    attribute_type: Arc<AttributeType>,
    provider: Arc<dyn VirtualAttributeProvider>,
    conflict_behavior: ConflictBehavior,
}

impl VirtualAttributeRule {
    /// Create a rule with the default conflict behavior
    /// (real overrides virtual).
    #[must_use]
    pub fn new(
        attribute_type: Arc<AttributeType>,
        provider: Arc<dyn VirtualAttributeProvider>,
    ) -> Self {
        Self {
            attribute_type,
            provider,
            conflict_behavior: ConflictBehavior::default(),
        }
    }

    /// Set the conflict behavior.
    #[must_use]
    pub fn with_conflict_behavior(mut self, conflict_behavior: ConflictBehavior) -> Self {
        self.conflict_behavior = conflict_behavior;
        self
    }

    /// The attribute type this rule generates.
    #[must_use]
    pub fn attribute_type(&self) -> &Arc<AttributeType> {
        &self.attribute_type
    }

    /// The provider.
    #[must_use]
    pub fn provider(&self) -> &Arc<dyn VirtualAttributeProvider> {
        &self.provider
    }

    /// The conflict behavior.
    #[must_use]
    pub fn conflict_behavior(&self) -> ConflictBehavior {
        self.conflict_behavior
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dn::Dn;
    use crate::error::ModelError;
    use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};

    fn uid_number() -> Arc<AttributeType> {
        Arc::new(AttributeType::integer("uidNumber", "1.3.6.1.1.1.1.0"))
    }

    /// Provider backed by a mutable counter, for observing live reads.
    #[derive(Debug, Default)]
    struct CounterProvider {
        counter: AtomicU64,
    }

    impl VirtualAttributeProvider for CounterProvider {
        fn values(
            &self,
            _entry: &Entry,
            rule: &VirtualAttributeRule,
        ) -> ModelResult<Vec<AttributeValue>> {
            let current = self.counter.load(AtomicOrdering::SeqCst);
            Ok(vec![AttributeValue::new(
                rule.attribute_type(),
                current.to_string(),
            )])
        }
    }

    #[derive(Debug)]
    struct FailingProvider;

    impl VirtualAttributeProvider for FailingProvider {
        fn values(
            &self,
            _entry: &Entry,
            _rule: &VirtualAttributeRule,
        ) -> ModelResult<Vec<AttributeValue>> {
            Err(ModelError::provider("backing data unavailable"))
        }
    }

    #[test]
    fn test_default_predicates_compute_from_values() {
        let provider = Arc::new(CounterProvider::default());
        provider.counter.store(42, AtomicOrdering::SeqCst);
        let rule = VirtualAttributeRule::new(uid_number(), provider.clone());
        let entry = Entry::new(Dn::root());

        assert!(provider.has_value(&entry, &rule, &AttributeValue::new(&uid_number(), "42")));
        assert!(!provider.has_value(&entry, &rule, &AttributeValue::new(&uid_number(), "41")));
        assert_eq!(
            provider.greater_than_or_equal_to(
                &entry,
                &rule,
                &AttributeValue::new(&uid_number(), "40")
            ),
            ConditionResult::True
        );
        assert_eq!(
            provider.matches_substring(&entry, &rule, Some(&ByteString::from("4")), &[], None),
            ConditionResult::Undefined,
            "integer types have no substring rule"
        );
    }

    #[test]
    fn test_failing_provider_degrades_predicates() {
        let provider = FailingProvider;
        let rule = VirtualAttributeRule::new(uid_number(), Arc::new(FailingProvider));
        let entry = Entry::new(Dn::root());

        assert!(!provider.has_value(&entry, &rule, &AttributeValue::new(&uid_number(), "1")));
        assert_eq!(
            provider.less_than_or_equal_to(&entry, &rule, &AttributeValue::new(&uid_number(), "1")),
            ConditionResult::Undefined
        );
        assert!(matches!(
            provider.values(&entry, &rule),
            Err(ModelError::Provider { .. })
        ));
    }

    #[test]
    fn test_conflict_behavior_default() {
        let rule = VirtualAttributeRule::new(uid_number(), Arc::new(CounterProvider::default()));
        assert_eq!(
            rule.conflict_behavior(),
            ConflictBehavior::RealOverridesVirtual
        );
        let rule = rule.with_conflict_behavior(ConflictBehavior::MergeRealAndVirtual);
        assert_eq!(
            rule.conflict_behavior(),
            ConflictBehavior::MergeRealAndVirtual
        );
    }
}
