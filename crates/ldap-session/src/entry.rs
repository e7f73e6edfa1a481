//! Directory entries returned to callers.

use std::collections::HashMap;
use std::fmt;

use ldap_proto::RawEntry;

/// A directory entry: a DN and its attributes.
///
/// Attribute names are matched case-insensitively, as LDAP attribute type
/// names are. Values that are not valid UTF-8 are kept apart and reachable
/// through [`Entry::get_binary`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    dn: String,
    attrs: HashMap<String, Vec<String>>,
    bin_attrs: HashMap<String, Vec<Vec<u8>>>,
}

impl Entry {
    /// Convert a search result entry.
    ///
    /// Returns `None` for entries without any attribute. Such entries are
    /// server artifacts and are never handed to callers.
    #[must_use]
    pub fn from_raw(raw: RawEntry) -> Option<Self> {
        if raw.attribute_count() == 0 {
            return None;
        }
        Some(Self {
            dn: raw.dn,
            attrs: raw.attrs,
            bin_attrs: raw.bin_attrs,
        })
    }

    /// Distinguished name.
    #[must_use]
    pub fn dn(&self) -> &str {
        &self.dn
    }

    /// Textual values of an attribute.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&[String]> {
        lookup(&self.attrs, name).map(Vec::as_slice)
    }

    /// First textual value of an attribute.
    #[must_use]
    pub fn get_first(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(|v| v.first()).map(String::as_str)
    }

    /// Binary values of an attribute.
    #[must_use]
    pub fn get_binary(&self, name: &str) -> Option<&[Vec<u8>]> {
        lookup(&self.bin_attrs, name).map(Vec::as_slice)
    }

    /// Check if the entry has an attribute, textual or binary.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some() || self.get_binary(name).is_some()
    }

    /// Attribute names, sorted case-insensitively.
    #[must_use]
    pub fn attribute_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .attrs
            .keys()
            .chain(self.bin_attrs.keys())
            .map(String::as_str)
            .collect();
        names.sort_by_key(|n| n.to_ascii_lowercase());
        names
    }

    /// Number of attributes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.attrs.len() + self.bin_attrs.len()
    }

    /// Always false for entries produced by [`Entry::from_raw`].
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Textual attributes.
    #[must_use]
    pub fn attributes(&self) -> &HashMap<String, Vec<String>> {
        &self.attrs
    }

    /// Split into DN, textual attributes and binary attributes.
    #[must_use]
    pub fn into_parts(
        self,
    ) -> (
        String,
        HashMap<String, Vec<String>>,
        HashMap<String, Vec<Vec<u8>>>,
    ) {
        (self.dn, self.attrs, self.bin_attrs)
    }
}

fn lookup<'a, V>(map: &'a HashMap<String, V>, name: &str) -> Option<&'a V> {
    map.get(name).or_else(|| {
        map.iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v)
    })
}

/// LDIF-like rendering. Binary values are shown by length only.
impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "dn: {}", self.dn)?;
        for name in self.attribute_names() {
            if let Some(values) = self.attrs.get(name) {
                for value in values {
                    writeln!(f, "{name}: {value}")?;
                }
            } else if let Some(values) = self.bin_attrs.get(name) {
                for value in values {
                    writeln!(f, "{name}:: <{} bytes>", value.len())?;
                }
            }
        }
        Ok(())
    }
}
