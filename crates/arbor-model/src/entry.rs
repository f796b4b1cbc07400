//! Directory Entries
//!
//! An [`Entry`] is a DN plus attributes, grouped per attribute type: one
//! type may carry several [`Attribute`]s differing only in their option
//! sets (`cn` and `cn;lang-fr`, say). Lookup by type is case-insensitive
//! through the type's canonical key.
//!
//! Entries are plain values. Virtual attribute decoration is a pure
//! function: [`apply_virtual_attributes`](Entry::apply_virtual_attributes)
//! leaves the receiver untouched and returns a new entry whose virtual
//! attributes compute against the undecorated original.
//!
//! # Example
//!
//! ```
//! use arbor_model::{Attribute, AttributeBuilder, AttributeValue, Dn, Entry};
//! use arbor_schema::AttributeType;
//! use std::sync::Arc;
//!
//! let cn = Arc::new(AttributeType::case_ignore_string("cn", "2.5.4.3"));
//! let mut entry = Entry::new(Dn::root());
//! entry.put_attribute(Attribute::from(
//!     AttributeBuilder::new(cn.clone()).value("Babs Jensen").build(),
//! ));
//!
//! assert!(entry.has_attribute_type(&cn));
//! let values = entry.values(&cn, None);
//! assert!(values.iter().any(|v| v.matches(&AttributeValue::new(&cn, "babs jensen")).is_true()));
//! ```

use crate::attribute::{Attribute, VirtualAttribute};
use crate::dn::Dn;
use crate::iter::AttributeValueIterable;
use crate::provider::{ConflictBehavior, VirtualAttributeRule};
use arbor_schema::AttributeType;
use std::collections::btree_map;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// A directory entry: a DN and its attributes, grouped by attribute type.
#[derive(Debug, Clone)]
pub struct Entry {
    dn: Dn,
    // Keyed by the attribute type's canonical (case-folded) key; each
    // list holds the option-set variants of that type.
    attributes: BTreeMap<String, Vec<Attribute>>,
}

impl Entry {
    /// Create an empty entry with the given DN.
    #[must_use]
    pub fn new(dn: Dn) -> Self {
        Self {
            dn,
            attributes: BTreeMap::new(),
        }
    }

    /// The entry's DN.
    #[must_use]
    pub fn dn(&self) -> &Dn {
        &self.dn
    }

    /// Add an attribute, appending to the variants already present for
    /// its type.
    pub fn put_attribute(&mut self, attribute: Attribute) {
        self.attributes
            .entry(attribute.attribute_type().key())
            .or_default()
            .push(attribute);
    }

    /// All attributes of the given type (every option-set variant), or
    /// `None` when the entry has none.
    #[must_use]
    pub fn attributes_for_type(&self, attribute_type: &AttributeType) -> Option<&[Attribute]> {
        self.attributes
            .get(&attribute_type.key())
            .map(Vec::as_slice)
    }

    /// Every attribute on the entry, grouped by type.
    pub fn all_attributes(&self) -> impl Iterator<Item = &Attribute> {
        self.attributes.values().flatten()
    }

    /// Whether the entry has any attribute of the given type.
    #[must_use]
    pub fn has_attribute_type(&self, attribute_type: &AttributeType) -> bool {
        self.attributes.contains_key(&attribute_type.key())
    }

    /// A lazy view over the values of the given type, optionally filtered
    /// to attributes carrying all of `required_options`.
    #[must_use]
    pub fn values<'a>(
        &'a self,
        attribute_type: &AttributeType,
        required_options: Option<&'a BTreeSet<String>>,
    ) -> AttributeValueIterable<'a> {
        AttributeValueIterable::new(self.attributes_for_type(attribute_type), required_options)
    }

    /// Decorate this entry with virtual attributes.
    ///
    /// Returns a new entry; the receiver is untouched, and the virtual
    /// attributes in the result compute against the undecorated receiver.
    /// For each rule:
    ///
    /// - no attribute of the type present: the virtual attribute is added;
    /// - the type is already virtual (an earlier rule claimed it): the
    ///   rule is skipped — the first virtual wins;
    /// - a real attribute is present: the rule's conflict behavior
    ///   decides whether the real one stays, is replaced, or both remain.
    #[must_use]
    pub fn apply_virtual_attributes(
        self: &Arc<Self>,
        rules: &[Arc<VirtualAttributeRule>],
    ) -> Entry {
        let mut decorated = Entry {
            dn: self.dn.clone(),
            attributes: self.attributes.clone(),
        };
        for rule in rules {
            let key = rule.attribute_type().key();
            let virtual_attribute = || {
                Attribute::from(VirtualAttribute::new(Arc::clone(self), Arc::clone(rule)))
            };
            match decorated.attributes.entry(key) {
                btree_map::Entry::Vacant(slot) => {
                    slot.insert(vec![virtual_attribute()]);
                }
                btree_map::Entry::Occupied(mut slot) => {
                    let existing = slot.get_mut();
                    if existing.is_empty() {
                        existing.push(virtual_attribute());
                    } else if existing[0].is_virtual() {
                        debug!(
                            attribute = %rule.attribute_type(),
                            "type already virtual, keeping the earlier rule"
                        );
                    } else {
                        match rule.conflict_behavior() {
                            ConflictBehavior::RealOverridesVirtual => {}
                            ConflictBehavior::VirtualOverridesReal => {
                                *existing = vec![virtual_attribute()];
                            }
                            ConflictBehavior::MergeRealAndVirtual => {
                                existing.push(virtual_attribute());
                            }
                        }
                    }
                }
            }
        }
        decorated
    }
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Entry({})", self.dn)
    }
}
