//! Distinguished Names
//!
//! A [`Dn`] is an ordered sequence of RDNs, index 0 being the most specific
//! (leaf) component: `cn=Babs Jensen,dc=example,dc=com` has `cn=Babs
//! Jensen` at index 0. The empty sequence is the root DN.
//!
//! The comparison walks both RDN sequences from the root end toward the
//! leaf, so every ancestor sorts strictly before every proper descendant
//! and siblings order by their nearest differing RDN — the property index
//! key generation and subtree iteration depend on.
//!
//! # Example
//!
//! ```
//! use arbor_model::Dn;
//! use arbor_schema::{AttributeType, Schema};
//! use std::sync::Arc;
//!
//! let mut schema = Schema::new();
//! schema.register(Arc::new(AttributeType::case_ignore_string("dc", "0.9.2342.19200300.100.1.25")));
//! schema.register(Arc::new(AttributeType::case_ignore_string("cn", "2.5.4.3")));
//!
//! let base = Dn::parse(&schema, "dc=example,dc=com").unwrap();
//! let entry = Dn::parse(&schema, "cn=Babs Jensen,dc=example,dc=com").unwrap();
//!
//! assert!(base.is_ancestor_of(&entry));
//! assert!(base < entry);
//! assert_eq!(entry.parent(), Some(base));
//! ```

use crate::error::{ModelError, ModelResult};
use crate::rdn::{parse, Rdn};
use arbor_schema::Schema;
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// A distinguished name: leaf-first sequence of RDNs.
///
/// Immutable and cheap to clone; the RDN sequence is shared.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Dn {
    rdns: Arc<[Rdn]>,
}

impl Dn {
    /// The root (null) DN.
    #[must_use]
    pub fn root() -> Self {
        Self {
            rdns: Arc::from(Vec::new().into_boxed_slice()),
        }
    }

    /// Create a DN from leaf-first RDN components.
    #[must_use]
    pub fn new(rdns: Vec<Rdn>) -> Self {
        Self {
            rdns: Arc::from(rdns.into_boxed_slice()),
        }
    }

    /// Parse a DN string against a schema.
    ///
    /// RFC 4514 basics: `,` separates components, `+` joins AVAs within a
    /// multi-valued RDN, backslash escapes specials and two-digit hex.
    /// Attribute type names resolve case-insensitively. The empty string
    /// is the root DN.
    ///
    /// # Errors
    ///
    /// [`ModelError::InvalidDn`] for malformed input or unknown types.
    pub fn parse(schema: &Schema, input: &str) -> ModelResult<Self> {
        // Plain trim would eat the space of a trailing `\ ` escape.
        let trimmed = parse::trim_unescaped(input);
        if trimmed.is_empty() {
            return Ok(Self::root());
        }
        let mut rdns = Vec::new();
        for component in parse::split_unescaped(trimmed, ',') {
            let avas = parse::rdn_avas(schema, &component).map_err(|message| {
                debug!(input, %message, "rejected DN string");
                ModelError::invalid_dn(input, message)
            })?;
            let rdn = Rdn::multi_valued(avas)
                .map_err(|e| ModelError::invalid_dn(input, e.to_string()))?;
            rdns.push(rdn);
        }
        Ok(Self::new(rdns))
    }

    /// Whether this is the root DN.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.rdns.is_empty()
    }

    /// The number of RDN components.
    #[must_use]
    pub fn num_components(&self) -> usize {
        self.rdns.len()
    }

    /// The leaf RDN, or `None` for the root DN.
    #[must_use]
    pub fn rdn(&self) -> Option<&Rdn> {
        self.rdns.first()
    }

    /// The RDN components, leaf first.
    #[must_use]
    pub fn rdns(&self) -> &[Rdn] {
        &self.rdns
    }

    /// The parent DN, or `None` for the root DN. The parent of a
    /// single-component DN is the root DN.
    #[must_use]
    pub fn parent(&self) -> Option<Dn> {
        if self.rdns.is_empty() {
            None
        } else {
            Some(Dn::new(self.rdns[1..].to_vec()))
        }
    }

    /// A child of this DN with the given leaf RDN.
    #[must_use]
    pub fn child(&self, rdn: Rdn) -> Dn {
        let mut rdns = Vec::with_capacity(self.rdns.len() + 1);
        rdns.push(rdn);
        rdns.extend_from_slice(&self.rdns);
        Dn::new(rdns)
    }

    /// Whether this DN is a strict ancestor of `other`: its RDN sequence,
    /// read from the root end, is a proper prefix of the other's. The root
    /// DN is an ancestor of every other DN.
    #[must_use]
    pub fn is_ancestor_of(&self, other: &Dn) -> bool {
        self.num_components() < other.num_components()
            && self
                .rdns
                .iter()
                .rev()
                .zip(other.rdns.iter().rev())
                .all(|(a, b)| a == b)
    }

    /// Whether this DN is a strict descendant of `other`.
    #[must_use]
    pub fn is_descendant_of(&self, other: &Dn) -> bool {
        other.is_ancestor_of(self)
    }

    /// The canonical string form: each RDN normalized, leaf first.
    #[must_use]
    pub fn normalized_string(&self) -> String {
        self.rdns
            .iter()
            .map(Rdn::normalized_string)
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl PartialOrd for Dn {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Dn {
    /// Hierarchical total order: walk both RDN sequences from the root end
    /// toward the leaf; the first differing RDN decides. A DN that runs
    /// out first is an ancestor and sorts before its descendants.
    fn cmp(&self, other: &Self) -> Ordering {
        let shorter = self.rdns.len().min(other.rdns.len());
        for i in 0..shorter {
            let a = &self.rdns[self.rdns.len() - 1 - i];
            let b = &other.rdns[other.rdns.len() - 1 - i];
            let ordering = a.cmp(b);
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        self.rdns.len().cmp(&other.rdns.len())
    }
}

impl fmt::Display for Dn {
    /// RFC 4514 text form, leaf first; the root DN renders as the empty
    /// string.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, rdn) in self.rdns.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{rdn}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arbor_schema::AttributeType;
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    fn schema() -> Schema {
        let mut schema = Schema::new();
        for (name, oid) in [
            ("cn", "2.5.4.3"),
            ("sn", "2.5.4.4"),
            ("ou", "2.5.4.11"),
            ("dc", "0.9.2342.19200300.100.1.25"),
        ] {
            schema.register(Arc::new(AttributeType::case_ignore_string(name, oid)));
        }
        schema
    }

    fn dn(s: &str) -> Dn {
        Dn::parse(&schema(), s).unwrap()
    }

    fn hash_of(dn: &Dn) -> u64 {
        let mut hasher = DefaultHasher::new();
        dn.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn test_root_dn() {
        let root = Dn::root();
        assert!(root.is_root());
        assert_eq!(root.num_components(), 0);
        assert_eq!(root.rdn(), None);
        assert_eq!(root.parent(), None);
        assert_eq!(root.to_string(), "");
        assert_eq!(dn(""), root);
    }

    #[test]
    fn test_parse_and_display_round_trip() {
        let parsed = dn("cn=Babs Jensen,dc=example,dc=com");
        assert_eq!(parsed.num_components(), 3);
        assert_eq!(parsed.to_string(), "cn=Babs Jensen,dc=example,dc=com");
        assert_eq!(dn(&parsed.to_string()), parsed);
    }

    #[test]
    fn test_parse_rejects_unknown_type_and_garbage() {
        let schema = schema();
        for bad in ["uid=x,dc=com", "cn=", "cn=a,,dc=com", "dc"] {
            assert!(
                matches!(
                    Dn::parse(&schema, bad),
                    Err(ModelError::InvalidDn { .. })
                ),
                "expected rejection for {bad:?}"
            );
        }
    }

    #[test]
    fn test_equality_is_schema_aware() {
        assert_eq!(dn("DC=Example, DC=COM"), dn("dc=example,dc=com"));
        assert_eq!(
            hash_of(&dn("DC=Example, DC=COM")),
            hash_of(&dn("dc=example,dc=com"))
        );
        assert_ne!(dn("dc=example,dc=com"), dn("dc=example,dc=org"));
    }

    #[test]
    fn test_parent_and_child() {
        let base = dn("dc=example,dc=com");
        let entry = dn("cn=Babs Jensen,dc=example,dc=com");
        assert_eq!(entry.parent(), Some(base.clone()));
        assert_eq!(
            base.child(entry.rdn().unwrap().clone()),
            entry
        );
        assert_eq!(dn("dc=com").parent(), Some(Dn::root()));
    }

    #[test]
    fn test_ancestry() {
        let root = Dn::root();
        let base = dn("dc=example,dc=com");
        let entry = dn("cn=Babs Jensen,dc=example,dc=com");
        let sibling = dn("cn=Tim Howes,dc=example,dc=com");

        assert!(root.is_ancestor_of(&base));
        assert!(base.is_ancestor_of(&entry));
        assert!(entry.is_descendant_of(&base));
        assert!(!base.is_ancestor_of(&base));
        assert!(!entry.is_ancestor_of(&base));
        assert!(!sibling.is_ancestor_of(&entry));
        assert!(!dn("dc=example,dc=org").is_ancestor_of(&entry));
    }

    #[test]
    fn test_ancestor_sorts_before_descendant() {
        let base = dn("dc=example,dc=com");
        let entry = dn("cn=Babs,dc=example,dc=com");
        assert_eq!(base.cmp(&entry), Ordering::Less);
        assert_eq!(entry.cmp(&base), Ordering::Greater);
        assert!(Dn::root() < base);
    }

    #[test]
    fn test_compare_is_total_and_antisymmetric() {
        let dns = [
            Dn::root(),
            dn("dc=com"),
            dn("dc=example,dc=com"),
            dn("cn=Alice,dc=example,dc=com"),
            dn("cn=Bob,dc=example,dc=com"),
            dn("dc=example,dc=org"),
        ];
        for a in &dns {
            assert_eq!(a.cmp(a), Ordering::Equal);
            for b in &dns {
                assert_eq!(a.cmp(b), b.cmp(a).reverse());
                // Consistency with equality.
                assert_eq!(a.cmp(b) == Ordering::Equal, a == b);
            }
        }
        // Transitivity over a sorted chain.
        let mut sorted = dns.to_vec();
        sorted.sort();
        for window in sorted.windows(2) {
            assert!(window[0] <= window[1]);
        }
    }

    #[test]
    fn test_siblings_order_by_nearest_differing_rdn() {
        let alice = dn("cn=Alice,dc=example,dc=com");
        let bob = dn("cn=Bob,dc=example,dc=com");
        assert_eq!(alice.cmp(&bob), Ordering::Less);
    }

    #[test]
    fn test_normalized_string() {
        assert_eq!(
            dn("CN=Babs  Jensen,DC=Example,DC=Com").normalized_string(),
            "cn=babs jensen,dc=example,dc=com"
        );
    }

    #[test]
    fn test_display_round_trips_escaped_trailing_space() {
        // The root-most component ends in `\ `, so the escape sits at the
        // very end of the DN string; parsing must keep its space.
        let parsed = dn(r"cn=Babs,ou=\ padded\ ");
        assert_eq!(parsed.to_string(), r"cn=Babs,ou=\ padded\ ");
        assert_eq!(dn(&parsed.to_string()), parsed);
    }

    #[test]
    fn test_parse_multi_valued_component() {
        let parsed = dn("cn=Babs+sn=Jensen,dc=example,dc=com");
        assert_eq!(parsed.num_components(), 2);
        assert!(parsed.rdn().unwrap().is_multi_valued());
    }
}
