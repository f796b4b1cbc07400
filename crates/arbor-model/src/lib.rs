//! # arbor Entry Data Model
//!
//! The core data model of the arbor directory server: schema-aware
//! attribute values, relative distinguished names, distinguished names
//! with a hierarchical total order, polymorphic attributes (stored,
//! virtual, collective-virtual), entries, and server-side sort orders.
//!
//! Everything here is schema-aware: equality, ordering, and substring
//! evaluation delegate to the matching rules of `arbor-schema` rather
//! than comparing raw bytes, so `cn=Babs Jensen` and `CN=babs jensen`
//! denote the same name. Evaluations that cannot produce a definite
//! answer report `Undefined` instead of failing.
//!
//! ## Crate Organization
//!
//! - [`value`] - [`AttributeValue`] with lazily cached normalization
//! - [`rdn`] - [`Rdn`] components and their AVAs
//! - [`dn`] - [`Dn`] with ancestor-before-descendant ordering
//! - [`attribute`] - [`Attribute`] and its stored/virtual variants
//! - [`provider`] - [`VirtualAttributeProvider`] and conflict handling
//! - [`iter`] - [`AttributeValueIterable`] flattened value views
//! - [`entry`] - [`Entry`] and virtual attribute decoration
//! - [`sort`] - [`SortOrder`] multi-key entry comparison
//! - [`error`] - [`ModelError`]
//!
//! ## Example
//!
//! ```
//! use arbor_model::{Attribute, AttributeBuilder, AttributeValue, Dn, Entry};
//! use arbor_schema::{AttributeType, Schema};
//! use std::sync::Arc;
//!
//! let mut schema = Schema::new();
//! schema.register(Arc::new(AttributeType::case_ignore_string("dc", "0.9.2342.19200300.100.1.25")));
//! schema.register(Arc::new(AttributeType::case_ignore_string("cn", "2.5.4.3")));
//! let cn = schema.attribute_type("cn").unwrap();
//!
//! let dn = Dn::parse(&schema, "cn=Babs Jensen,dc=example,dc=com").unwrap();
//! let mut entry = Entry::new(dn);
//! entry.put_attribute(Attribute::from(
//!     AttributeBuilder::new(cn.clone()).value("Babs Jensen").build(),
//! ));
//!
//! let assertion = AttributeValue::new(&cn, "BABS  jensen");
//! assert!(entry
//!     .values(&cn, None)
//!     .iter()
//!     .any(|v| v.matches(&assertion).is_true()));
//! ```

pub mod attribute;
pub mod dn;
pub mod entry;
pub mod error;
pub mod iter;
pub mod provider;
pub mod rdn;
pub mod sort;
pub mod value;

pub use attribute::{
    Attribute, AttributeBuilder, CollectiveVirtualAttribute, StoredAttribute, VirtualAttribute,
};
pub use dn::Dn;
pub use entry::Entry;
pub use error::{ModelError, ModelResult};
pub use iter::{AttributeValueIter, AttributeValueIterable};
pub use provider::{ConflictBehavior, VirtualAttributeProvider, VirtualAttributeRule};
pub use rdn::{Ava, Rdn};
pub use sort::{SortKey, SortOrder};
pub use value::AttributeValue;

/// Prelude module for convenient imports.
///
/// ```
/// use arbor_model::prelude::*;
/// ```
pub mod prelude {
    pub use crate::attribute::{
        Attribute, AttributeBuilder, CollectiveVirtualAttribute, StoredAttribute,
        VirtualAttribute,
    };
    pub use crate::dn::Dn;
    pub use crate::entry::Entry;
    pub use crate::error::{ModelError, ModelResult};
    pub use crate::iter::{AttributeValueIter, AttributeValueIterable};
    pub use crate::provider::{ConflictBehavior, VirtualAttributeProvider, VirtualAttributeRule};
    pub use crate::rdn::{Ava, Rdn};
    pub use crate::sort::{SortKey, SortOrder};
    pub use crate::value::AttributeValue;
}
