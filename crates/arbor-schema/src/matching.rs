//! Matching rule contracts
//!
//! Capability traits for the pluggable matching rules that give attribute
//! values their equality, ordering, substring, and approximate-match
//! semantics. The data model consumes these contracts; the rule algorithms
//! themselves are supplied by the schema (see [`crate::rules`] for the
//! built-in ones).
//!
//! Every rule provides [`MatchingRule::normalize`], which maps raw bytes to
//! the canonical form used for comparison. Normalization is required to be
//! idempotent: normalizing an already-normalized byte string yields the same
//! bytes. The trait does not enforce this; rule implementations must.

use crate::bytes::ByteString;
use crate::error::SchemaResult;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Base contract shared by all matching rules.
///
/// Implementations must be thread-safe: a rule is registered once in the
/// schema and invoked concurrently by every request thread.
pub trait MatchingRule: Send + Sync + fmt::Debug {
    /// The rule's short name (e.g. `"caseIgnoreMatch"`).
    fn name(&self) -> &str;

    /// The rule's OID.
    fn oid(&self) -> &str;

    /// Map raw bytes to the canonical form used for comparison.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::Normalization`](crate::SchemaError::Normalization)
    /// when the bytes are not acceptable to this rule (malformed syntax).
    fn normalize(&self, value: &ByteString) -> SchemaResult<ByteString>;
}

/// A rule that decides whether two normalized values match.
pub trait EqualityMatchingRule: MatchingRule {
    /// Whether two *normalized* values are considered equal.
    ///
    /// The default is bytewise equality of the normalized forms, which is
    /// correct for every rule whose `normalize` produces a canonical form.
    fn values_match(&self, normalized_a: &ByteString, normalized_b: &ByteString) -> bool {
        normalized_a == normalized_b
    }
}

/// A rule that defines a total order over normalized values.
pub trait OrderingMatchingRule: MatchingRule {
    /// Compare two *normalized* values.
    ///
    /// The default is bytewise comparison of the normalized forms.
    fn compare(&self, normalized_a: &ByteString, normalized_b: &ByteString) -> Ordering {
        normalized_a.cmp(normalized_b)
    }
}

/// A rule that evaluates substring assertions against normalized values.
pub trait SubstringMatchingRule: MatchingRule {
    /// Whether a normalized value matches the given substring assertion.
    ///
    /// All components are normalized byte strings. `initial` must match at
    /// the start of the value, each `any` component must match in order
    /// without overlap, and `final` must match at the end.
    fn matches_substring(
        &self,
        normalized_value: &ByteString,
        initial: Option<&ByteString>,
        any: &[ByteString],
        r#final: Option<&ByteString>,
    ) -> bool {
        default_substring_match(
            normalized_value.as_bytes(),
            initial.map(ByteString::as_bytes),
            any,
            r#final.map(ByteString::as_bytes),
        )
    }
}

/// A rule that decides whether two normalized values are approximately equal
/// (e.g. phonetic matching).
pub trait ApproximateMatchingRule: MatchingRule {
    /// Whether two *normalized* values approximately match.
    fn approximately_match(&self, normalized_a: &ByteString, normalized_b: &ByteString) -> bool;
}

/// Shared substring evaluation over normalized byte slices.
fn default_substring_match(
    value: &[u8],
    initial: Option<&[u8]>,
    any: &[ByteString],
    r#final: Option<&[u8]>,
) -> bool {
    let mut pos = 0;

    if let Some(prefix) = initial {
        if !value.starts_with(prefix) {
            return false;
        }
        pos = prefix.len();
    }

    for component in any {
        let needle = component.as_bytes();
        match find_subslice(&value[pos..], needle) {
            Some(offset) => pos += offset + needle.len(),
            None => return false,
        }
    }

    match r#final {
        Some(suffix) => value.len() >= pos + suffix.len() && value.ends_with(suffix),
        None => true,
    }
}

fn find_subslice(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() {
        return Some(0);
    }
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

/// Tri-state result of a schema-aware predicate.
///
/// `Undefined` arises when the attribute type lacks the matching rule the
/// predicate needs, or when a value cannot be normalized; callers treat it
/// as "cannot be determined", never as a fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionResult {
    /// The predicate holds.
    True,
    /// The predicate does not hold.
    False,
    /// The predicate cannot be evaluated.
    Undefined,
}

impl ConditionResult {
    /// Three-valued conjunction (`Undefined` absorbs unless refuted).
    #[must_use]
    pub fn and(self, other: ConditionResult) -> ConditionResult {
        match (self, other) {
            (ConditionResult::False, _) | (_, ConditionResult::False) => ConditionResult::False,
            (ConditionResult::Undefined, _) | (_, ConditionResult::Undefined) => {
                ConditionResult::Undefined
            }
            _ => ConditionResult::True,
        }
    }

    /// Three-valued disjunction.
    #[must_use]
    pub fn or(self, other: ConditionResult) -> ConditionResult {
        match (self, other) {
            (ConditionResult::True, _) | (_, ConditionResult::True) => ConditionResult::True,
            (ConditionResult::Undefined, _) | (_, ConditionResult::Undefined) => {
                ConditionResult::Undefined
            }
            _ => ConditionResult::False,
        }
    }

    /// Whether this result is `True`.
    #[must_use]
    pub fn is_true(self) -> bool {
        self == ConditionResult::True
    }
}

impl From<bool> for ConditionResult {
    fn from(value: bool) -> Self {
        if value {
            ConditionResult::True
        } else {
            ConditionResult::False
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_condition_result_from_bool() {
        assert_eq!(ConditionResult::from(true), ConditionResult::True);
        assert_eq!(ConditionResult::from(false), ConditionResult::False);
    }

    #[test]
    fn test_condition_result_and() {
        use ConditionResult::{False, True, Undefined};
        assert_eq!(True.and(True), True);
        assert_eq!(True.and(False), False);
        assert_eq!(Undefined.and(False), False);
        assert_eq!(True.and(Undefined), Undefined);
        assert_eq!(Undefined.and(Undefined), Undefined);
    }

    #[test]
    fn test_condition_result_or() {
        use ConditionResult::{False, True, Undefined};
        assert_eq!(False.or(True), True);
        assert_eq!(Undefined.or(True), True);
        assert_eq!(False.or(Undefined), Undefined);
        assert_eq!(False.or(False), False);
    }

    #[test]
    fn test_default_substring_match() {
        let value = ByteString::from("babs jensen");
        let initial = ByteString::from("babs");
        let any = [ByteString::from("jen")];
        let fin = ByteString::from("sen");
        assert!(default_substring_match(
            value.as_bytes(),
            Some(initial.as_bytes()),
            &any,
            Some(fin.as_bytes())
        ));
        assert!(!default_substring_match(
            value.as_bytes(),
            Some(b"jensen".as_slice()),
            &[],
            None
        ));
    }

    #[test]
    fn test_substring_any_components_do_not_overlap() {
        // "aba" in "ababa": the two "ab" components must consume distinct
        // regions, leaving no room for a third.
        let value = ByteString::from("ababa");
        let any = [ByteString::from("ab"), ByteString::from("ab")];
        assert!(default_substring_match(value.as_bytes(), None, &any, None));
        let any3 = [
            ByteString::from("ab"),
            ByteString::from("ab"),
            ByteString::from("ab"),
        ];
        assert!(!default_substring_match(value.as_bytes(), None, &any3, None));
    }
}
