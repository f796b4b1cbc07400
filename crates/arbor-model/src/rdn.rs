//! Relative Distinguished Names
//!
//! An [`Rdn`] is one naming component of a DN: a non-empty set of
//! attribute-type/value pairs ([`Ava`]s) in which no two pairs share a
//! type. Most RDNs hold a single AVA (`cn=Babs Jensen`); multi-valued RDNs
//! join theirs with `+` (`cn=Babs+sn=Jensen`).
//!
//! Equality is set equality: the order the AVAs were supplied in never
//! matters. Ordering canonicalizes the AVAs by case-folded type name before
//! comparing pairwise, so semantically equal RDNs built in different input
//! orders also *compare* as equal — `Ord` agrees with `Eq`.

use crate::error::{ModelError, ModelResult};
use crate::value::AttributeValue;
use arbor_schema::{AttributeType, ByteString, Schema};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// One attribute-type/value pair within an RDN.
#[derive(Debug, Clone)]
pub struct Ava {
    attribute_type: Arc<AttributeType>,
    value: AttributeValue,
}

impl Ava {
    /// Create an AVA from a type and a raw value.
    pub fn new(attribute_type: Arc<AttributeType>, value: impl Into<ByteString>) -> Self {
        let value = AttributeValue::new(&attribute_type, value);
        Self {
            attribute_type,
            value,
        }
    }

    /// Create an AVA from a type and an existing attribute value.
    pub fn from_value(attribute_type: Arc<AttributeType>, value: AttributeValue) -> Self {
        Self {
            attribute_type,
            value,
        }
    }

    /// The attribute type.
    #[must_use]
    pub fn attribute_type(&self) -> &Arc<AttributeType> {
        &self.attribute_type
    }

    /// The attribute value.
    #[must_use]
    pub fn value(&self) -> &AttributeValue {
        &self.value
    }

    /// The canonical bytes used for equality and hashing: the normalized
    /// form, or the raw bytes when the rule rejects the value. The raw
    /// fallback keeps RDN/DN equality total and reflexive so they can
    /// serve as map keys.
    fn canonical_bytes(&self) -> ByteString {
        self.value
            .normalized()
            .cloned()
            .unwrap_or_else(|_| self.value.raw().clone())
    }
}

/// A relative distinguished name.
#[derive(Debug, Clone)]
pub struct Rdn {
    // Sorted by case-folded type name at construction; comparison and
    // equality rely on this canonical order.
    avas: Vec<Ava>,
}

impl Rdn {
    /// Create a single-valued RDN.
    pub fn new(attribute_type: Arc<AttributeType>, value: impl Into<ByteString>) -> Self {
        Self {
            avas: vec![Ava::new(attribute_type, value)],
        }
    }

    /// Create a (possibly multi-valued) RDN from AVAs.
    ///
    /// # Errors
    ///
    /// [`ModelError::InvalidRdn`] when `avas` is empty, and
    /// [`ModelError::DuplicateRdnType`] when two AVAs share a type.
    pub fn multi_valued(mut avas: Vec<Ava>) -> ModelResult<Self> {
        if avas.is_empty() {
            return Err(ModelError::InvalidRdn {
                message: "an RDN requires at least one attribute-value pair".to_string(),
            });
        }
        avas.sort_by(|a, b| a.attribute_type.key().cmp(&b.attribute_type.key()));
        for pair in avas.windows(2) {
            if pair[0].attribute_type == pair[1].attribute_type {
                return Err(ModelError::DuplicateRdnType {
                    name: pair[0].attribute_type.name_or_oid().to_string(),
                });
            }
        }
        Ok(Self { avas })
    }

    /// Parse an RDN string (`cn=Babs Jensen`, `cn=Babs+sn=Jensen`) against
    /// a schema.
    ///
    /// # Errors
    ///
    /// [`ModelError::InvalidRdn`] for malformed input or unknown attribute
    /// types.
    pub fn parse(schema: &Schema, input: &str) -> ModelResult<Self> {
        let avas = parse::rdn_avas(schema, input)
            .map_err(|message| ModelError::InvalidRdn { message })?;
        Self::multi_valued(avas)
    }

    /// The AVAs in canonical (type-name) order.
    #[must_use]
    pub fn avas(&self) -> &[Ava] {
        &self.avas
    }

    /// The number of AVAs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.avas.len()
    }

    /// Whether this RDN holds more than one AVA.
    #[must_use]
    pub fn is_multi_valued(&self) -> bool {
        self.avas.len() > 1
    }

    /// Whether this RDN contains the given attribute type.
    #[must_use]
    pub fn has_attribute_type(&self, attribute_type: &AttributeType) -> bool {
        self.avas
            .iter()
            .any(|ava| ava.attribute_type.as_ref() == attribute_type)
    }

    /// The value for the given attribute type, if present.
    #[must_use]
    pub fn value(&self, attribute_type: &AttributeType) -> Option<&AttributeValue> {
        self.avas
            .iter()
            .find(|ava| ava.attribute_type.as_ref() == attribute_type)
            .map(Ava::value)
    }

    /// The canonical string form: case-folded type names, normalized
    /// values, AVAs in canonical order.
    #[must_use]
    pub fn normalized_string(&self) -> String {
        let mut out = String::new();
        for (i, ava) in self.avas.iter().enumerate() {
            if i > 0 {
                out.push('+');
            }
            out.push_str(&ava.attribute_type.key());
            out.push('=');
            out.push_str(&parse::escape_value(ava.canonical_bytes().as_bytes()));
        }
        out
    }

    /// Position-by-position comparison of two RDNs over their canonical
    /// AVA order.
    ///
    /// At each position: matching types compare their values through the
    /// type's ordering rule (bytewise over normalized forms when the type
    /// has none, raw bytewise when normalization fails); differing types
    /// compare by case-folded name. An exhausted RDN sorts before a longer
    /// one.
    fn compare(&self, other: &Rdn) -> Ordering {
        for (a, b) in self.avas.iter().zip(other.avas.iter()) {
            let ordering = compare_avas(a, b);
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        self.avas.len().cmp(&other.avas.len())
    }
}

fn compare_avas(a: &Ava, b: &Ava) -> Ordering {
    if a.attribute_type == b.attribute_type {
        match (a.value.normalized(), b.value.normalized()) {
            (Ok(na), Ok(nb)) => match a.attribute_type.ordering_rule() {
                Some(rule) => rule.compare(na, nb),
                None => na.cmp(nb),
            },
            // One side failed normalization: compare the raw forms so the
            // ordering stays total.
            _ => a.value.raw().cmp(b.value.raw()),
        }
    } else {
        a.attribute_type.key().cmp(&b.attribute_type.key())
    }
}

impl PartialEq for Rdn {
    /// Set equality over (type, value) pairs, independent of the order the
    /// pairs were supplied in.
    fn eq(&self, other: &Self) -> bool {
        self.avas.len() == other.avas.len()
            && self.avas.iter().zip(other.avas.iter()).all(|(a, b)| {
                a.attribute_type == b.attribute_type && a.canonical_bytes() == b.canonical_bytes()
            })
    }
}

impl Eq for Rdn {}

impl Hash for Rdn {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for ava in &self.avas {
            ava.attribute_type.hash(state);
            ava.canonical_bytes().hash(state);
        }
    }
}

impl PartialOrd for Rdn {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Rdn {
    fn cmp(&self, other: &Self) -> Ordering {
        self.compare(other)
    }
}

impl fmt::Display for Rdn {
    /// RFC 4514 text form with original type-name spelling.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, ava) in self.avas.iter().enumerate() {
            if i > 0 {
                f.write_str("+")?;
            }
            write!(
                f,
                "{}={}",
                ava.attribute_type.name_or_oid(),
                parse::escape_value(ava.value.raw().as_bytes())
            )?;
        }
        Ok(())
    }
}

/// RFC 4514 escaping and parsing helpers, shared with the DN parser.
pub(crate) mod parse {
    use super::{Ava, Schema};

    /// Escape a raw attribute value for the text form: specials get a
    /// backslash, control bytes become `\XX`, leading `#`/space and
    /// trailing space are escaped.
    pub(crate) fn escape_value(bytes: &[u8]) -> String {
        // Valid UTF-8 keeps its text form with specials escaped; anything
        // else is rendered entirely as hex escapes.
        let Ok(text) = std::str::from_utf8(bytes) else {
            return bytes.iter().map(|b| format!("\\{b:02X}")).collect();
        };
        let mut out = String::with_capacity(text.len());
        let char_count = text.chars().count();
        for (i, ch) in text.chars().enumerate() {
            let first = i == 0;
            let last = i == char_count - 1;
            match ch {
                '"' | '+' | ',' | ';' | '<' | '>' | '\\' => {
                    out.push('\\');
                    out.push(ch);
                }
                '#' | ' ' if first => {
                    out.push('\\');
                    out.push(ch);
                }
                ' ' if last => {
                    out.push('\\');
                    out.push(' ');
                }
                c if (c as u32) < 0x20 || c as u32 == 0x7F => {
                    out.push_str(&format!("\\{:02X}", c as u32));
                }
                c => out.push(c),
            }
        }
        out
    }

    /// Trim outer whitespace without touching escape sequences: a trailing
    /// `\ ` keeps its space, so the output of `escape_value` parses back.
    /// A genuinely dangling trailing backslash is kept for the unescape
    /// step to reject.
    pub(crate) fn trim_unescaped(input: &str) -> &str {
        let input = input.trim_start();
        let mut end = 0;
        let mut escaped = false;
        for (i, ch) in input.char_indices() {
            if escaped {
                escaped = false;
                end = i + ch.len_utf8();
            } else if ch == '\\' {
                escaped = true;
                end = i + 1;
            } else if !ch.is_whitespace() {
                end = i + ch.len_utf8();
            }
        }
        &input[..end]
    }

    /// Split on a separator, honoring backslash escapes.
    pub(crate) fn split_unescaped(input: &str, separator: char) -> Vec<String> {
        let mut parts = Vec::new();
        let mut current = String::new();
        let mut escaped = false;
        for ch in input.chars() {
            if escaped {
                current.push('\\');
                current.push(ch);
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == separator {
                parts.push(std::mem::take(&mut current));
            } else {
                current.push(ch);
            }
        }
        if escaped {
            // Trailing backslash; surface it for the unescape step to
            // reject.
            current.push('\\');
        }
        parts.push(current);
        parts
    }

    /// Decode backslash escapes (`\,` and `\XX`) into raw bytes.
    pub(crate) fn unescape_value(input: &str) -> Result<Vec<u8>, String> {
        let mut bytes = Vec::with_capacity(input.len());
        let mut chars = input.chars().peekable();
        while let Some(ch) = chars.next() {
            if ch != '\\' {
                let mut buf = [0u8; 4];
                bytes.extend_from_slice(ch.encode_utf8(&mut buf).as_bytes());
                continue;
            }
            let Some(escaped) = chars.next() else {
                return Err("value ends with a dangling escape".to_string());
            };
            let is_hex = escaped.is_ascii_hexdigit()
                && chars.peek().is_some_and(char::is_ascii_hexdigit);
            if is_hex {
                let high = escaped.to_digit(16).unwrap_or(0);
                let low = chars
                    .next()
                    .and_then(|c| c.to_digit(16))
                    .unwrap_or(0);
                bytes.push(((high << 4) | low) as u8);
            } else {
                let mut buf = [0u8; 4];
                bytes.extend_from_slice(escaped.encode_utf8(&mut buf).as_bytes());
            }
        }
        Ok(bytes)
    }

    /// Parse the AVAs of one RDN component.
    pub(crate) fn rdn_avas(schema: &Schema, input: &str) -> Result<Vec<Ava>, String> {
        let trimmed = trim_unescaped(input);
        if trimmed.is_empty() {
            return Err("empty RDN component".to_string());
        }
        let mut avas = Vec::new();
        for ava_text in split_unescaped(trimmed, '+') {
            let ava_text = trim_unescaped(&ava_text);
            let Some((name, value_text)) = split_once_unescaped(ava_text, '=') else {
                return Err(format!("missing '=' in '{ava_text}'"));
            };
            let name = name.trim();
            if name.is_empty() {
                return Err(format!("missing attribute type in '{ava_text}'"));
            }
            let Some(attribute_type) = schema.attribute_type(name) else {
                return Err(format!("unknown attribute type '{name}'"));
            };
            let value = unescape_value(value_text.trim_start())?;
            if value.is_empty() {
                return Err(format!("empty value for attribute type '{name}'"));
            }
            avas.push(Ava::new(attribute_type, value));
        }
        Ok(avas)
    }

    fn split_once_unescaped(input: &str, separator: char) -> Option<(&str, &str)> {
        let mut escaped = false;
        for (i, ch) in input.char_indices() {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == separator {
                return Some((&input[..i], &input[i + ch.len_utf8()..]));
            }
        }
        None
    }
}
