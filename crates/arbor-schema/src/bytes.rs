//! Immutable Byte Strings
//!
//! [`ByteString`] is the raw currency of the directory data model: attribute
//! values, normalized forms, and assertion values are all byte strings.
//!
//! The type is strictly immutable. Updating a value means constructing a new
//! `ByteString` and replacing the reference at the owner; this is what makes
//! values, RDNs, and DNs safe to share across request threads without locks.
//!
//! # Example
//!
//! ```
//! use arbor_schema::ByteString;
//!
//! let value = ByteString::from("Babs Jensen");
//! assert_eq!(value.as_bytes(), b"Babs Jensen");
//! assert_eq!(value.to_string(), "Babs Jensen");
//!
//! let binary = ByteString::from(vec![0xCA, 0xFE]);
//! assert_eq!(binary.to_string(), "base64:yv4=");
//! ```

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use std::fmt;
use std::sync::Arc;

/// An immutable, cheaply cloneable byte string.
///
/// Clones share the underlying allocation. Equality, ordering, and hashing
/// are bytewise; schema-aware comparison belongs to the matching rules, not
/// to this type.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ByteString {
    bytes: Arc<[u8]>,
}

impl ByteString {
    /// Create a byte string from anything that can become one.
    pub fn new(bytes: impl Into<ByteString>) -> Self {
        bytes.into()
    }

    /// Create an empty byte string.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            bytes: Arc::from(&[][..]),
        }
    }

    /// The underlying bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// The length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the byte string is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// The bytes interpreted as UTF-8, if they are valid UTF-8.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.bytes).ok()
    }

    /// The bytes rendered as base64.
    #[must_use]
    pub fn to_base64(&self) -> String {
        BASE64.encode(&self.bytes)
    }

    /// Decode a base64 rendering back into a byte string.
    ///
    /// Returns `None` when the input is not valid base64.
    #[must_use]
    pub fn from_base64(encoded: &str) -> Option<Self> {
        BASE64.decode(encoded).ok().map(Self::from)
    }
}

impl From<&str> for ByteString {
    fn from(s: &str) -> Self {
        Self {
            bytes: Arc::from(s.as_bytes()),
        }
    }
}

impl From<String> for ByteString {
    fn from(s: String) -> Self {
        Self {
            bytes: Arc::from(s.into_bytes().into_boxed_slice()),
        }
    }
}

impl From<&[u8]> for ByteString {
    fn from(bytes: &[u8]) -> Self {
        Self {
            bytes: Arc::from(bytes),
        }
    }
}

impl From<Vec<u8>> for ByteString {
    fn from(bytes: Vec<u8>) -> Self {
        Self {
            bytes: Arc::from(bytes.into_boxed_slice()),
        }
    }
}

impl AsRef<[u8]> for ByteString {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

impl fmt::Display for ByteString {
    /// UTF-8 text is printed as-is; binary content is printed as
    /// `base64:<encoded>`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.as_str() {
            Some(s) => f.write_str(s),
            None => write!(f, "base64:{}", self.to_base64()),
        }
    }
}

impl fmt::Debug for ByteString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.as_str() {
            Some(s) => write!(f, "ByteString({s:?})"),
            None => write!(f, "ByteString(base64:{})", self.to_base64()),
        }
    }
}
