//! Attribute Values
//!
//! [`AttributeValue`] pairs the raw byte form of a value with a lazily
//! computed, matching-rule-specific normalized form. The normalized form —
//! never the raw form — is what equality and hashing are defined over: a
//! `cn` value of `"ABC"` equals `"abc"` because `caseIgnoreMatch`
//! normalizes both to the same bytes.
//!
//! A value has no intrinsic normalized form; it borrows its semantics from
//! the equality rule of the attribute type it was created under. Types with
//! no equality rule treat the raw form as canonical.
//!
//! # Equality under normalization failure
//!
//! `normalized()` propagates the rule's rejection to the caller, but
//! `PartialEq` and `Hash` cannot fail. The adopted policy: a value whose
//! bytes the rule rejects compares equal to *nothing* — itself included —
//! and hashes over its raw bytes. Equal values therefore always hash
//! identically, at the cost of unnormalizable values being unable to
//! participate in set or map equality. This is also why the type implements
//! `PartialEq` but deliberately not `Eq`, and why attributes keep their
//! values in `Vec`s rather than hash sets.
//!
//! # Example
//!
//! ```
//! use arbor_model::AttributeValue;
//! use arbor_schema::AttributeType;
//!
//! let cn = AttributeType::case_ignore_string("cn", "2.5.4.3");
//! let a = AttributeValue::new(&cn, "Babs Jensen");
//! let b = AttributeValue::new(&cn, "babs  JENSEN");
//!
//! assert_eq!(a.raw().as_bytes(), b"Babs Jensen");
//! assert_eq!(a, b);
//! ```

use crate::error::ModelResult;
use arbor_schema::{AttributeType, ByteString, ConditionResult, EqualityMatchingRule};
use std::hash::{Hash, Hasher};
use std::sync::{Arc, OnceLock};
use tracing::debug;

/// An immutable attribute value: raw bytes plus a cached normalized form.
///
/// Clones are cheap and share both the raw bytes and the normalization
/// cache, so normalizing one clone benefits all of them. Once constructed a
/// value is safe to read from any number of threads; the only interior
/// mutability is the write-once cache, and two threads racing to fill it
/// compute the identical bytes (normalization is idempotent and pure), so
/// whichever write wins is correct.
#[derive(Debug, Clone)]
pub struct AttributeValue {
    raw: ByteString,
    rule: Option<Arc<dyn EqualityMatchingRule>>,
    normalized: Arc<OnceLock<ByteString>>,
}

impl AttributeValue {
    /// Create a value of the given attribute type.
    ///
    /// The type's equality matching rule is captured here; the type itself
    /// is not retained.
    pub fn new(attribute_type: &AttributeType, raw: impl Into<ByteString>) -> Self {
        Self {
            raw: raw.into(),
            rule: attribute_type.equality_rule().cloned(),
            normalized: Arc::new(OnceLock::new()),
        }
    }

    /// The raw byte form. Never fails.
    #[must_use]
    pub fn raw(&self) -> &ByteString {
        &self.raw
    }

    /// The name of the bound equality rule, if the type had one.
    #[must_use]
    pub fn rule_name(&self) -> Option<&str> {
        self.rule.as_deref().map(|r| r.name())
    }

    /// The normalized byte form.
    ///
    /// Returns the cached form when present; otherwise invokes the bound
    /// rule, caches on success, and propagates the rule's rejection.
    ///
    /// # Errors
    ///
    /// [`SchemaError::Normalization`](arbor_schema::SchemaError::Normalization)
    /// when the rule rejects the raw bytes.
    pub fn normalized(&self) -> ModelResult<&ByteString> {
        if let Some(cached) = self.normalized.get() {
            return Ok(cached);
        }
        let computed = match &self.rule {
            Some(rule) => rule.normalize(&self.raw)?,
            // No equality rule: the raw form is canonical.
            None => self.raw.clone(),
        };
        Ok(self.normalized.get_or_init(|| computed))
    }

    /// Whether the normalized form has been computed and cached.
    #[must_use]
    pub fn is_normalized(&self) -> bool {
        self.normalized.get().is_some()
    }

    /// Tri-state equality: `Undefined` when either side fails normalization.
    ///
    /// This is the form attribute predicates use; `PartialEq` collapses
    /// `Undefined` to "not equal".
    #[must_use]
    pub fn matches(&self, other: &AttributeValue) -> ConditionResult {
        let (Ok(a), Ok(b)) = (self.normalized(), other.normalized()) else {
            debug!(
                value = %self.raw,
                other = %other.raw,
                "value comparison undefined: normalization failed"
            );
            return ConditionResult::Undefined;
        };
        match &self.rule {
            Some(rule) => rule.values_match(a, b).into(),
            None => (a == b).into(),
        }
    }
}

impl PartialEq for AttributeValue {
    /// Equal iff both sides normalize successfully and the rule matches the
    /// normalized forms. A value that fails normalization equals nothing.
    fn eq(&self, other: &Self) -> bool {
        self.matches(other).is_true()
    }
}

impl Hash for AttributeValue {
    /// Hashes the normalized form, falling back to the raw bytes when
    /// normalization fails. Agrees with `PartialEq`: values that compare
    /// equal normalize to identical bytes and so hash identically.
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self.normalized() {
            Ok(normalized) => normalized.hash(state),
            Err(_) => self.raw.hash(state),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arbor_schema::SchemaError;
    use std::collections::hash_map::DefaultHasher;

    fn hash_of(value: &AttributeValue) -> u64 {
        let mut hasher = DefaultHasher::new();
        value.hash(&mut hasher);
        hasher.finish()
    }

    fn cn() -> AttributeType {
        AttributeType::case_ignore_string("cn", "2.5.4.3")
    }

    #[test]
    fn test_raw_never_fails() {
        let t = AttributeType::integer("uidNumber", "1.3.6.1.1.1.1.0");
        let v = AttributeValue::new(&t, "not a number");
        assert_eq!(v.raw().as_bytes(), b"not a number");
    }

    #[test]
    fn test_normalized_is_cached() {
        let v = AttributeValue::new(&cn(), "Babs  Jensen");
        assert!(!v.is_normalized());
        assert_eq!(v.normalized().unwrap(), &ByteString::from("babs jensen"));
        assert!(v.is_normalized());
        // Second call returns the cached form.
        assert_eq!(v.normalized().unwrap(), &ByteString::from("babs jensen"));
    }

    #[test]
    fn test_clones_share_the_cache() {
        let v = AttributeValue::new(&cn(), "Shared");
        let clone = v.clone();
        v.normalized().unwrap();
        assert!(clone.is_normalized());
    }

    #[test]
    fn test_case_insensitive_equality_and_hash() {
        let a = AttributeValue::new(&cn(), "abc");
        let b = AttributeValue::new(&cn(), "ABC");
        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));
    }

    #[test]
    fn test_no_rule_means_raw_is_canonical() {
        let t = AttributeType::new("x-opaque", "1.2.3.4");
        let v = AttributeValue::new(&t, "AbC");
        assert_eq!(v.normalized().unwrap(), &ByteString::from("AbC"));
        let same = AttributeValue::new(&t, "AbC");
        let other = AttributeValue::new(&t, "abc");
        assert_eq!(v, same);
        assert_ne!(v, other);
    }

    #[test]
    fn test_normalization_failure_propagates_from_accessor() {
        let t = AttributeType::integer("uidNumber", "1.3.6.1.1.1.1.0");
        let v = AttributeValue::new(&t, "twelve");
        match v.normalized() {
            Err(crate::ModelError::Schema(SchemaError::Normalization { rule, value })) => {
                assert_eq!(rule, "integerMatch");
                assert_eq!(value.as_bytes(), b"twelve");
            }
            other => panic!("expected normalization error, got {other:?}"),
        }
    }

    #[test]
    fn test_unnormalizable_value_equals_nothing() {
        // The documented fallback policy: a value the rule rejects is never
        // equal to any value, itself included, and hashes its raw bytes.
        let t = AttributeType::integer("uidNumber", "1.3.6.1.1.1.1.0");
        let bad = AttributeValue::new(&t, "twelve");
        let same_bytes = AttributeValue::new(&t, "twelve");
        let good = AttributeValue::new(&t, "12");

        assert_eq!(bad.matches(&same_bytes), ConditionResult::Undefined);
        assert_ne!(bad, same_bytes);
        assert_ne!(bad, bad.clone());
        assert_ne!(bad, good);
        assert_eq!(hash_of(&bad), hash_of(&same_bytes));
    }

    #[test]
    fn test_normalization_is_idempotent() {
        let v = AttributeValue::new(&cn(), "  Some  Value ");
        let once = v.normalized().unwrap().clone();
        let renormalized = AttributeValue::new(&cn(), once.clone());
        assert_eq!(renormalized.normalized().unwrap(), &once);
    }

    #[test]
    fn test_integer_equality_ignores_leading_zeros() {
        let t = AttributeType::integer("uidNumber", "1.3.6.1.1.1.1.0");
        let a = AttributeValue::new(&t, "007");
        let b = AttributeValue::new(&t, "7");
        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));
    }
}
