//! Built-in matching rules
//!
//! The basic string, integer, and octet-string rules. These are the rules
//! the stock attribute types use; a full server schema would register many
//! more, all through the same contracts in [`crate::matching`].

use crate::bytes::ByteString;
use crate::error::{SchemaError, SchemaResult};
use crate::matching::{
    EqualityMatchingRule, MatchingRule, OrderingMatchingRule, SubstringMatchingRule,
};

/// Trim leading/trailing spaces and collapse interior runs of spaces,
/// optionally case-folding. Shared by the directory-string rules.
fn normalize_directory_string(
    rule: &dyn MatchingRule,
    value: &ByteString,
    fold_case: bool,
) -> SchemaResult<ByteString> {
    let text = value.as_str().ok_or_else(|| {
        SchemaError::normalization(rule.name().to_string(), value.clone())
    })?;

    let mut normalized = String::with_capacity(text.len());
    let mut pending_space = false;
    for ch in text.trim_matches(' ').chars() {
        if ch == ' ' {
            pending_space = true;
            continue;
        }
        if pending_space {
            normalized.push(' ');
            pending_space = false;
        }
        if fold_case {
            normalized.extend(ch.to_lowercase());
        } else {
            normalized.push(ch);
        }
    }

    Ok(ByteString::from(normalized))
}

/// Case-insensitive directory string matching (`caseIgnoreMatch`).
///
/// Normalization trims outer spaces, collapses interior space runs, and
/// lowercases. Non-UTF-8 input is rejected.
#[derive(Debug, Clone, Copy, Default)]
pub struct CaseIgnoreMatch;

impl MatchingRule for CaseIgnoreMatch {
    fn name(&self) -> &str {
        "caseIgnoreMatch"
    }

    fn oid(&self) -> &str {
        "2.5.13.2"
    }

    fn normalize(&self, value: &ByteString) -> SchemaResult<ByteString> {
        normalize_directory_string(self, value, true)
    }
}

impl EqualityMatchingRule for CaseIgnoreMatch {}
impl OrderingMatchingRule for CaseIgnoreMatch {}
impl SubstringMatchingRule for CaseIgnoreMatch {}

/// Case-sensitive directory string matching (`caseExactMatch`).
#[derive(Debug, Clone, Copy, Default)]
pub struct CaseExactMatch;

impl MatchingRule for CaseExactMatch {
    fn name(&self) -> &str {
        "caseExactMatch"
    }

    fn oid(&self) -> &str {
        "2.5.13.5"
    }

    fn normalize(&self, value: &ByteString) -> SchemaResult<ByteString> {
        normalize_directory_string(self, value, false)
    }
}

impl EqualityMatchingRule for CaseExactMatch {}
impl OrderingMatchingRule for CaseExactMatch {}
impl SubstringMatchingRule for CaseExactMatch {}

/// Signed decimal integer matching (`integerMatch`).
///
/// Normalization canonicalizes the decimal form: optional sign, no leading
/// zeros, no surrounding whitespace in the canonical form. Anything that is
/// not a decimal integer is rejected.
#[derive(Debug, Clone, Copy, Default)]
pub struct IntegerMatch;

impl MatchingRule for IntegerMatch {
    fn name(&self) -> &str {
        "integerMatch"
    }

    fn oid(&self) -> &str {
        "2.5.13.14"
    }

    fn normalize(&self, value: &ByteString) -> SchemaResult<ByteString> {
        let reject = || SchemaError::normalization(self.name().to_string(), value.clone());

        let text = value.as_str().ok_or_else(reject)?.trim();
        let (negative, digits) = match text.as_bytes() {
            [b'-', rest @ ..] => (true, rest),
            [b'+', rest @ ..] => (false, rest),
            rest => (false, rest),
        };
        if digits.is_empty() || !digits.iter().all(u8::is_ascii_digit) {
            return Err(reject());
        }

        let stripped: &[u8] = {
            let first_nonzero = digits.iter().position(|b| *b != b'0');
            match first_nonzero {
                Some(i) => &digits[i..],
                None => b"0",
            }
        };

        let mut canonical = Vec::with_capacity(stripped.len() + 1);
        if negative && stripped != b"0" {
            canonical.push(b'-');
        }
        canonical.extend_from_slice(stripped);
        Ok(ByteString::from(canonical))
    }
}

impl EqualityMatchingRule for IntegerMatch {}

impl OrderingMatchingRule for IntegerMatch {
    fn compare(&self, normalized_a: &ByteString, normalized_b: &ByteString) -> std::cmp::Ordering {
        // Canonical forms: optional '-', then digits with no leading zeros.
        let a = normalized_a.as_bytes();
        let b = normalized_b.as_bytes();
        let a_neg = a.first() == Some(&b'-');
        let b_neg = b.first() == Some(&b'-');
        match (a_neg, b_neg) {
            (true, false) => std::cmp::Ordering::Less,
            (false, true) => std::cmp::Ordering::Greater,
            (false, false) => a.len().cmp(&b.len()).then_with(|| a.cmp(b)),
            (true, true) => b.len().cmp(&a.len()).then_with(|| b.cmp(a)),
        }
    }
}

/// Bytewise octet string matching (`octetStringMatch`).
///
/// Normalization is the identity and never fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct OctetStringMatch;

impl MatchingRule for OctetStringMatch {
    fn name(&self) -> &str {
        "octetStringMatch"
    }

    fn oid(&self) -> &str {
        "2.5.13.17"
    }

    fn normalize(&self, value: &ByteString) -> SchemaResult<ByteString> {
        Ok(value.clone())
    }
}

impl EqualityMatchingRule for OctetStringMatch {}
impl OrderingMatchingRule for OctetStringMatch {}
