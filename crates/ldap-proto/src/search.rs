//! Search request parameters and the response item stream.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::ProtocolError;
use crate::result::LdapOutcome;
use crate::types::Scope;

/// Parameters of a single search request as handed to a transport.
///
/// These are already normalized: an absent filter means "match all" and an
/// absent time limit means "no limit". A transport must not translate
/// `time_limit: None` into a zero-second bound.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchParams {
    /// Base DN.
    pub base: String,
    /// Search scope.
    pub scope: Scope,
    /// Filter string, `None` for match-all.
    pub filter: Option<String>,
    /// Attributes to return, `None` for all user attributes.
    pub attributes: Option<Vec<String>>,
    /// Return attribute names only, without values.
    pub attrs_only: bool,
    /// Server and client time bound.
    pub time_limit: Option<Duration>,
    /// Maximum number of entries, 0 for unbounded.
    pub size_limit: u32,
}

impl SearchParams {
    /// Filter used on the wire when none was supplied.
    pub const MATCH_ALL_FILTER: &'static str = "(objectClass=*)";

    /// Create parameters for a search of `base` with the given scope.
    pub fn new(base: impl Into<String>, scope: Scope) -> Self {
        Self {
            base: base.into(),
            scope,
            filter: None,
            attributes: None,
            attrs_only: false,
            time_limit: None,
            size_limit: 0,
        }
    }

    /// The filter to put on the wire.
    #[must_use]
    pub fn effective_filter(&self) -> &str {
        self.filter.as_deref().unwrap_or(Self::MATCH_ALL_FILTER)
    }
}

/// A search result entry as delivered by the transport.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawEntry {
    /// Distinguished name.
    pub dn: String,
    /// Textual attribute values.
    pub attrs: HashMap<String, Vec<String>>,
    /// Attribute values that are not valid UTF-8.
    pub bin_attrs: HashMap<String, Vec<Vec<u8>>>,
}

impl RawEntry {
    /// Create an entry with no attributes.
    pub fn new(dn: impl Into<String>) -> Self {
        Self {
            dn: dn.into(),
            ..Self::default()
        }
    }

    /// Add a textual attribute.
    #[must_use]
    pub fn with_attr<I, S>(mut self, name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.attrs
            .insert(name.into(), values.into_iter().map(Into::into).collect());
        self
    }

    /// Add a binary attribute.
    #[must_use]
    pub fn with_bin_attr(mut self, name: impl Into<String>, values: Vec<Vec<u8>>) -> Self {
        self.bin_attrs.insert(name.into(), values);
        self
    }

    /// Number of attributes, textual and binary.
    #[must_use]
    pub fn attribute_count(&self) -> usize {
        self.attrs.len() + self.bin_attrs.len()
    }
}

/// One item of a search response, in server order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchItem {
    /// A search result entry.
    Entry(RawEntry),
    /// A search result reference (continuation URLs).
    Reference(Vec<String>),
    /// The final search result. Nothing follows it.
    Done(LdapOutcome),
}

/// A lazy, finite, single-pass stream of search response items.
#[async_trait]
pub trait ResponseStream: Send {
    /// Read the next item, or `None` once the stream is exhausted.
    async fn next_item(&mut self) -> Result<Option<SearchItem>, ProtocolError>;

    /// Stop the search and discard anything not yet read.
    async fn abandon(&mut self) -> Result<(), ProtocolError> {
        Ok(())
    }
}

/// Boxed response stream returned by transports.
pub type BoxResponseStream = Box<dyn ResponseStream>;
