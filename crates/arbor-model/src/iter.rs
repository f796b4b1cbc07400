//! Flattened Attribute Value Iteration
//!
//! [`AttributeValueIterable`] presents the values of a collection of
//! attributes — same type, differing option sets (language-tagged
//! variants, say) — as one flat, filtered sequence, without copying the
//! backing collection.
//!
//! The iterable itself is restartable: every [`iter`](AttributeValueIterable::iter)
//! call produces a fresh, independent, single-pass iterator. Attributes
//! whose options do not satisfy the filter are skipped, as are attributes
//! that contribute no values; an absent backing collection simply yields
//! nothing. Virtual attributes are evaluated lazily, per traversal.
//!
//! # Example
//!
//! ```
//! use arbor_model::{AttributeBuilder, Attribute, AttributeValueIterable};
//! use arbor_schema::AttributeType;
//! use std::sync::Arc;
//!
//! let cn = Arc::new(AttributeType::case_ignore_string("cn", "2.5.4.3"));
//! let attributes = vec![
//!     Attribute::from(AttributeBuilder::new(cn.clone()).value("Babs Jensen").build()),
//!     Attribute::from(AttributeBuilder::new(cn).option("lang-fr").value("Barbara").build()),
//! ];
//!
//! let all = AttributeValueIterable::new(Some(&attributes), None);
//! assert_eq!(all.iter().count(), 2);
//! // Restartable: a second traversal is independent of the first.
//! assert_eq!(all.iter().count(), 2);
//! ```

use crate::attribute::Attribute;
use crate::value::AttributeValue;
use std::collections::BTreeSet;
use tracing::warn;

/// A lazy, option-filtered, flattening view over a slice of attributes.
#[derive(Debug, Clone, Copy)]
pub struct AttributeValueIterable<'a> {
    attributes: Option<&'a [Attribute]>,
    required_options: Option<&'a BTreeSet<String>>,
}

impl<'a> AttributeValueIterable<'a> {
    /// Create a view over `attributes`, keeping only attributes whose
    /// option sets contain every option in `required_options`.
    ///
    /// `attributes: None` models "no attributes of this type exist": the
    /// iterator reports no elements rather than failing.
    #[must_use]
    pub fn new(
        attributes: Option<&'a [Attribute]>,
        required_options: Option<&'a BTreeSet<String>>,
    ) -> Self {
        Self {
            attributes,
            required_options,
        }
    }

    /// Start a fresh traversal.
    #[must_use]
    pub fn iter(&self) -> AttributeValueIter<'a> {
        AttributeValueIter {
            attributes: self.attributes.unwrap_or_default().iter(),
            required_options: self.required_options,
            current: Vec::new().into_iter(),
        }
    }

    /// Whether a traversal would yield no values at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }
}

impl<'a> IntoIterator for &AttributeValueIterable<'a> {
    type Item = AttributeValue;
    type IntoIter = AttributeValueIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// A single-pass traversal created by [`AttributeValueIterable::iter`].
///
/// Yields owned values (clones are cheap; the bytes are shared). There is
/// no removal — the underlying attributes are never touched.
#[derive(Debug)]
pub struct AttributeValueIter<'a> {
    attributes: std::slice::Iter<'a, Attribute>,
    required_options: Option<&'a BTreeSet<String>>,
    current: std::vec::IntoIter<AttributeValue>,
}

impl Iterator for AttributeValueIter<'_> {
    type Item = AttributeValue;

    fn next(&mut self) -> Option<AttributeValue> {
        loop {
            if let Some(value) = self.current.next() {
                return Some(value);
            }
            let attribute = self.attributes.next()?;
            if let Some(required) = self.required_options {
                if !attribute.has_all_options(required) {
                    continue;
                }
            }
            match attribute.values() {
                Ok(values) => self.current = values.into_iter(),
                Err(error) => {
                    // A failing virtual attribute is skipped; values from
                    // earlier attributes have already been yielded.
                    warn!(
                        attribute = %attribute.attribute_type(),
                        %error,
                        "skipping attribute whose values could not be computed"
                    );
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attribute::AttributeBuilder;
    use arbor_schema::AttributeType;
    use std::sync::Arc;

    fn cn() -> Arc<AttributeType> {
        Arc::new(AttributeType::case_ignore_string("cn", "2.5.4.3"))
    }

    fn raw_strings(iterable: &AttributeValueIterable<'_>) -> Vec<String> {
        iterable
            .iter()
            .map(|v| String::from_utf8_lossy(v.raw().as_bytes()).into_owned())
            .collect()
    }

    #[test]
    fn test_absent_collection_yields_nothing() {
        let iterable = AttributeValueIterable::new(None, None);
        assert_eq!(iterable.iter().next(), None);
        assert!(iterable.is_empty());
    }

    #[test]
    fn test_flattens_across_attributes() {
        let attributes = vec![
            Attribute::from(
                AttributeBuilder::new(cn()).value("one").value("two").build(),
            ),
            Attribute::from(AttributeBuilder::new(cn()).value("three").build()),
        ];
        let iterable = AttributeValueIterable::new(Some(&attributes), None);
        assert_eq!(raw_strings(&iterable), vec!["one", "two", "three"]);
    }

    #[test]
    fn test_iterators_are_independent() {
        let attributes = vec![Attribute::from(
            AttributeBuilder::new(cn()).value("a").value("b").build(),
        )];
        let iterable = AttributeValueIterable::new(Some(&attributes), None);
        let mut first = iterable.iter();
        let mut second = iterable.iter();
        first.next();
        first.next();
        assert_eq!(first.next(), None);
        // The second traversal starts from the beginning.
        assert_eq!(second.next().unwrap().raw().as_bytes(), b"a");
    }

    #[test]
    fn test_option_filter() {
        let attributes = vec![
            Attribute::from(AttributeBuilder::new(cn()).value("untagged").build()),
            Attribute::from(
                AttributeBuilder::new(cn())
                    .option("lang-fr")
                    .value("français")
                    .build(),
            ),
            Attribute::from(
                AttributeBuilder::new(cn())
                    .option("lang-fr")
                    .option("x-variant")
                    .value("québécois")
                    .build(),
            ),
        ];
        let mut required = BTreeSet::new();
        required.insert("lang-fr".to_string());
        let iterable = AttributeValueIterable::new(Some(&attributes), Some(&required));
        assert_eq!(raw_strings(&iterable), vec!["français", "québécois"]);
    }

    #[test]
    fn test_empty_attributes_are_transparent() {
        let attributes = vec![
            Attribute::from(AttributeBuilder::new(cn()).build()),
            Attribute::from(AttributeBuilder::new(cn()).value("only").build()),
            Attribute::from(AttributeBuilder::new(cn()).build()),
        ];
        let iterable = AttributeValueIterable::new(Some(&attributes), None);
        assert_eq!(raw_strings(&iterable), vec!["only"]);
    }

    #[test]
    fn test_filter_that_excludes_everything() {
        let attributes = vec![Attribute::from(
            AttributeBuilder::new(cn()).value("untagged").build(),
        )];
        let mut required = BTreeSet::new();
        required.insert("lang-de".to_string());
        let iterable = AttributeValueIterable::new(Some(&attributes), Some(&required));
        assert!(iterable.is_empty());
    }

    #[test]
    fn test_for_loop_over_reference() {
        let attributes = vec![Attribute::from(
            AttributeBuilder::new(cn()).value("x").build(),
        )];
        let iterable = AttributeValueIterable::new(Some(&attributes), None);
        let mut count = 0;
        for value in &iterable {
            assert_eq!(value.raw().as_bytes(), b"x");
            count += 1;
        }
        assert_eq!(count, 1);
    }
}
