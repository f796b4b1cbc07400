//! Server-Side Sort Ordering
//!
//! [`SortOrder`] defines a deterministic total pre-order over entries for
//! result-set ordering: an ordered, non-empty chain of [`SortKey`]s, each
//! naming an attribute type, a direction, and (optionally) an ordering
//! rule overriding the type's own.
//!
//! Keys are evaluated in sequence; the first key under which the two
//! entries differ decides. When every key ties, the relative order of the
//! two entries is unspecified — `compare_entries` reports `Equal`, and a
//! stable surrounding sort keeps ties stable.
//!
//! An entry's candidate value for a key is its smallest value of that
//! attribute for an ascending key and its largest for a descending one;
//! an entry with no value for the key sorts after every entry that has
//! one, regardless of direction.

use crate::entry::Entry;
use crate::error::{ModelError, ModelResult};
use arbor_schema::{AttributeType, ByteString, OrderingMatchingRule};
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// One unit of a sort order's priority chain.
#[derive(Clone)]
pub struct SortKey {
    attribute_type: Arc<AttributeType>,
    ascending: bool,
    ordering_rule: Option<Arc<dyn OrderingMatchingRule>>,
}

impl SortKey {
    /// An ascending key over the given type.
    #[must_use]
    pub fn ascending(attribute_type: Arc<AttributeType>) -> Self {
        Self {
            attribute_type,
            ascending: true,
            ordering_rule: None,
        }
    }

    /// A descending key over the given type.
    #[must_use]
    pub fn descending(attribute_type: Arc<AttributeType>) -> Self {
        Self {
            attribute_type,
            ascending: false,
            ordering_rule: None,
        }
    }

    /// Override the type's ordering rule for this key.
    #[must_use]
    pub fn with_ordering_rule(mut self, rule: Arc<dyn OrderingMatchingRule>) -> Self {
        self.ordering_rule = Some(rule);
        self
    }

    /// The attribute type this key sorts on.
    #[must_use]
    pub fn attribute_type(&self) -> &Arc<AttributeType> {
        &self.attribute_type
    }

    /// Whether this key sorts ascending.
    #[must_use]
    pub fn is_ascending(&self) -> bool {
        self.ascending
    }

    /// The effective ordering rule: the override, or the type's own.
    ///
    /// # Errors
    ///
    /// [`ModelError::NoOrderingRule`] when neither exists — there is no
    /// tri-state escape hatch in a sort.
    pub fn effective_rule(&self) -> ModelResult<&Arc<dyn OrderingMatchingRule>> {
        self.ordering_rule
            .as_ref()
            .or_else(|| self.attribute_type.ordering_rule())
            .ok_or_else(|| ModelError::NoOrderingRule {
                attribute: self.attribute_type.name_or_oid().to_string(),
            })
    }

    /// The entry's candidate value under this key: minimum of the entry's
    /// normalized values for an ascending key, maximum for a descending
    /// one. Values the rule rejects are ignored.
    fn candidate_value(&self, entry: &Entry) -> ModelResult<Option<ByteString>> {
        let rule = self.effective_rule()?;
        let mut best: Option<ByteString> = None;
        for value in &entry.values(&self.attribute_type, None) {
            let normalized = match rule.normalize(value.raw()) {
                Ok(normalized) => normalized,
                Err(error) => {
                    debug!(%error, "ignoring unnormalizable value in sort");
                    continue;
                }
            };
            best = Some(match best.take() {
                None => normalized,
                Some(current) => {
                    let keep_new = if self.ascending {
                        rule.compare(&normalized, &current) == Ordering::Less
                    } else {
                        rule.compare(&normalized, &current) == Ordering::Greater
                    };
                    if keep_new {
                        normalized
                    } else {
                        current
                    }
                }
            });
        }
        Ok(best)
    }

    /// Compare two entries under this key alone.
    ///
    /// # Errors
    ///
    /// [`ModelError::NoOrderingRule`] when no ordering rule is available;
    /// [`ModelError::Provider`] when a virtual attribute fails.
    pub fn compare_entries(&self, a: &Entry, b: &Entry) -> ModelResult<Ordering> {
        let rule = self.effective_rule()?;
        let va = self.candidate_value(a)?;
        let vb = self.candidate_value(b)?;
        Ok(match (va, vb) {
            (None, None) => Ordering::Equal,
            // Entries missing the attribute sort after all others,
            // regardless of direction.
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (Some(va), Some(vb)) => {
                let ordering = rule.compare(&va, &vb);
                if self.ascending {
                    ordering
                } else {
                    ordering.reverse()
                }
            }
        })
    }
}

impl PartialEq for SortKey {
    /// Keys are equal iff they sort the same type, in the same direction,
    /// under the same effective rule identity.
    fn eq(&self, other: &Self) -> bool {
        self.attribute_type == other.attribute_type
            && self.ascending == other.ascending
            && self.ordering_rule.as_ref().map(|r| r.name())
                == other.ordering_rule.as_ref().map(|r| r.name())
    }
}

impl Eq for SortKey {}

impl fmt::Debug for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SortKey")
            .field("attribute_type", &self.attribute_type.name_or_oid())
            .field("ascending", &self.ascending)
            .field(
                "ordering_rule",
                &self.ordering_rule.as_ref().map(|r| r.name()),
            )
            .finish()
    }
}

impl fmt::Display for SortKey {
    /// `+name` for ascending, `-name` for descending.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}",
            if self.ascending { '+' } else { '-' },
            self.attribute_type.name_or_oid()
        )
    }
}

/// An ordered, non-empty chain of sort keys.
///
/// Stateless and immutable once built. Two sort orders are equal iff
/// their key chains are equal element-wise in the same order — reordering
/// keys changes priority, hence identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortOrder {
    keys: Vec<SortKey>,
}

impl SortOrder {
    /// Create a sort order.
    ///
    /// # Errors
    ///
    /// [`ModelError::EmptySortOrder`] when `keys` is empty.
    pub fn new(keys: Vec<SortKey>) -> ModelResult<Self> {
        if keys.is_empty() {
            return Err(ModelError::EmptySortOrder);
        }
        Ok(Self { keys })
    }

    /// The key chain, highest priority first.
    #[must_use]
    pub fn keys(&self) -> &[SortKey] {
        &self.keys
    }

    /// Compare two entries: keys in sequence, first non-tie wins.
    ///
    /// An `Equal` result means every key tied; the relative order of the
    /// entries is then unspecified and callers needing stability must use
    /// a stable surrounding sort.
    ///
    /// # Errors
    ///
    /// [`ModelError::NoOrderingRule`] when a key's type has no ordering
    /// rule and the key carries no override; [`ModelError::Provider`]
    /// when a virtual attribute fails.
    pub fn compare_entries(&self, a: &Entry, b: &Entry) -> ModelResult<Ordering> {
        for key in &self.keys {
            let ordering = key.compare_entries(a, b)?;
            if ordering != Ordering::Equal {
                return Ok(ordering);
            }
        }
        Ok(Ordering::Equal)
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, key) in self.keys.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{key}")?;
        }
        Ok(())
    }
}
