//! Search requests and result folding.
//!
//! [`SearchExecutor`] issues one search on a transport and folds the
//! response stream into a [`SearchOutcome`]:
//!
//! - entries without attributes are dropped
//! - search references are skipped
//! - in first-only mode the stream is abandoned after the first entry
//! - otherwise entries are collected in server order until the final result

use std::time::Duration;

use ldap_proto::{
    LdapOutcome, ResponseStream, ResultCode, Scope, SearchItem, SearchParams, Transport,
};

use crate::entry::Entry;
use crate::error::{Error, Result};

/// A search request.
///
/// An empty filter matches all entries and a zero timeout means no time
/// bound; both are normalized before the request reaches the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    /// Search base DN.
    pub base: String,
    /// Search scope (default: subtree).
    pub scope: Scope,
    /// Filter, `None` for match-all.
    pub filter: Option<String>,
    /// Attributes to return, `None` for all user attributes.
    pub attributes: Option<Vec<String>>,
    /// Return attribute names without values.
    pub attrs_only: bool,
    /// Time bound, `None` for unbounded.
    pub timeout: Option<Duration>,
    /// Maximum number of entries, 0 for unbounded.
    pub size_limit: u32,
    /// Stop at the first entry.
    pub first_only: bool,
}

impl SearchRequest {
    /// Create a subtree search of `base` matching all entries.
    pub fn new(base: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            scope: Scope::Subtree,
            filter: None,
            attributes: None,
            attrs_only: false,
            timeout: None,
            size_limit: 0,
            first_only: false,
        }
    }

    /// Set the scope.
    #[must_use]
    pub fn scope(mut self, scope: Scope) -> Self {
        self.scope = scope;
        self
    }

    /// Set the filter.
    #[must_use]
    pub fn filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    /// Select the attributes to return.
    #[must_use]
    pub fn attributes<I, S>(mut self, attributes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.attributes = Some(attributes.into_iter().map(Into::into).collect());
        self
    }

    /// Return attribute names without values.
    #[must_use]
    pub fn attrs_only(mut self, attrs_only: bool) -> Self {
        self.attrs_only = attrs_only;
        self
    }

    /// Bound the search in time.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Bound the search in whole seconds.
    #[must_use]
    pub fn timeout_secs(self, seconds: u64) -> Self {
        self.timeout(Duration::from_secs(seconds))
    }

    /// Limit the number of entries the server returns.
    #[must_use]
    pub fn size_limit(mut self, limit: u32) -> Self {
        self.size_limit = limit;
        self
    }

    /// Stop at the first entry.
    #[must_use]
    pub fn first_only(mut self, first_only: bool) -> Self {
        self.first_only = first_only;
        self
    }

    /// The filter that will be sent, `None` for match-all.
    #[must_use]
    pub fn effective_filter(&self) -> Option<&str> {
        self.filter.as_deref().filter(|f| !f.trim().is_empty())
    }

    /// The time bound that will be sent, `None` for unbounded.
    #[must_use]
    pub fn effective_timeout(&self) -> Option<Duration> {
        self.timeout.filter(|t| !t.is_zero())
    }

    /// Transport parameters for this request.
    #[must_use]
    pub fn to_params(&self) -> SearchParams {
        SearchParams {
            base: self.base.clone(),
            scope: self.scope,
            filter: self.effective_filter().map(str::to_string),
            attributes: self.attributes.clone(),
            attrs_only: self.attrs_only,
            time_limit: self.effective_timeout(),
            size_limit: self.size_limit,
        }
    }
}

/// Result of a search, shaped by the request's first-only flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    /// First-only search: the first entry, if any.
    First(Option<Entry>),
    /// Full search: all entries in server order.
    List(Vec<Entry>),
}

impl SearchOutcome {
    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::First(entry) => usize::from(entry.is_some()),
            Self::List(entries) => entries.len(),
        }
    }

    /// Check if no entry was returned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All entries as a list.
    #[must_use]
    pub fn into_entries(self) -> Vec<Entry> {
        match self {
            Self::First(entry) => entry.into_iter().collect(),
            Self::List(entries) => entries,
        }
    }

    /// The first entry.
    #[must_use]
    pub fn into_first(self) -> Option<Entry> {
        match self {
            Self::First(entry) => entry,
            Self::List(entries) => entries.into_iter().next(),
        }
    }
}

/// Runs searches and folds their response streams.
#[derive(Debug, Clone, Copy, Default)]
pub struct SearchExecutor;

impl SearchExecutor {
    /// Create an executor.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Run `request` on `transport`.
    ///
    /// A missing base yields `First(None)` for first-only requests and
    /// [`Error::NoSuchObject`] otherwise. Any other unsuccessful final result
    /// is [`Error::Search`] carrying the server diagnostic.
    pub async fn execute(
        &self,
        transport: &mut dyn Transport,
        request: &SearchRequest,
    ) -> Result<SearchOutcome> {
        let params = request.to_params();
        tracing::debug!(
            base = %params.base,
            scope = %params.scope,
            filter = params.effective_filter(),
            size_limit = params.size_limit,
            time_limit = ?params.time_limit,
            first_only = request.first_only,
            "issuing search"
        );

        let mut stream = transport.search(&params).await.map_err(Error::Protocol)?;

        if request.first_only {
            self.fold_first(stream.as_mut()).await
        } else {
            self.fold_list(stream.as_mut()).await
        }
    }

    async fn fold_first(&self, stream: &mut dyn ResponseStream) -> Result<SearchOutcome> {
        while let Some(item) = stream.next_item().await.map_err(Error::Protocol)? {
            match item {
                SearchItem::Entry(raw) => {
                    let dn = raw.dn.clone();
                    match Entry::from_raw(raw) {
                        Some(entry) => {
                            if let Err(e) = stream.abandon().await {
                                tracing::debug!(error = %e, "abandon after first entry failed");
                            }
                            return Ok(SearchOutcome::First(Some(entry)));
                        }
                        None => skip_attributeless(&dn),
                    }
                }
                SearchItem::Reference(urls) => skip_reference(&urls),
                SearchItem::Done(outcome) => {
                    return match outcome.code {
                        ResultCode::Success | ResultCode::NoSuchObject => {
                            Ok(SearchOutcome::First(None))
                        }
                        _ => Err(Error::Search(outcome)),
                    };
                }
            }
        }
        Ok(SearchOutcome::First(None))
    }

    async fn fold_list(&self, stream: &mut dyn ResponseStream) -> Result<SearchOutcome> {
        let mut entries: Vec<Entry> = Vec::new();

        while let Some(item) = stream.next_item().await.map_err(Error::Protocol)? {
            match item {
                SearchItem::Entry(raw) => {
                    let dn = raw.dn.clone();
                    let Some(entry) = Entry::from_raw(raw) else {
                        skip_attributeless(&dn);
                        continue;
                    };
                    if entries.try_reserve(1).is_err() {
                        let collected = entries.len();
                        drop(entries);
                        return Err(Error::OutOfMemory { collected });
                    }
                    entries.push(entry);
                }
                SearchItem::Reference(urls) => skip_reference(&urls),
                SearchItem::Done(outcome) => return finish_list(entries, outcome),
            }
        }

        tracing::debug!(entries = entries.len(), "search stream ended without a final result");
        Ok(SearchOutcome::List(entries))
    }
}

fn finish_list(entries: Vec<Entry>, outcome: LdapOutcome) -> Result<SearchOutcome> {
    match outcome.code {
        ResultCode::Success => {
            tracing::debug!(entries = entries.len(), "search complete");
            Ok(SearchOutcome::List(entries))
        }
        ResultCode::NoSuchObject => Err(Error::NoSuchObject(outcome)),
        _ => {
            tracing::debug!(
                entries = entries.len(),
                code = %outcome.code,
                "search failed, discarding partial results"
            );
            Err(Error::Search(outcome))
        }
    }
}

fn skip_attributeless(dn: &str) {
    tracing::trace!(dn = %dn, "dropping entry without attributes");
}

fn skip_reference(urls: &[String]) {
    tracing::debug!(urls = ?urls, "ignoring search reference");
}

#[cfg(test)]
mod tests {
    use super::*;
    use ldap_proto::{ConnectionDescriptor, Connector, ProtocolError, RawEntry};
    use ldap_testing::{MockDirectory, MockSearch, fixtures};

    async fn connection(directory: &MockDirectory) -> ldap_testing::MockConnection {
        let descriptor = ConnectionDescriptor::parse("ldap://mock/").unwrap();
        directory.initialize(&descriptor).await.unwrap()
    }

    #[test]
    fn test_request_normalization() {
        let request = SearchRequest::new("dc=example,dc=com")
            .filter("")
            .timeout_secs(0);
        let params = request.to_params();
        assert!(params.filter.is_none());
        assert!(params.time_limit.is_none());
        assert_eq!(params.scope, Scope::Subtree);
        assert_eq!(params.size_limit, 0);

        let params = SearchRequest::new("dc=example,dc=com")
            .filter("(uid=jdoe)")
            .timeout_secs(5)
            .to_params();
        assert_eq!(params.filter.as_deref(), Some("(uid=jdoe)"));
        assert_eq!(params.time_limit, Some(Duration::from_secs(5)));
    }

    #[test]
    fn test_outcome_accessors() {
        let entry = Entry::from_raw(RawEntry::new("cn=a").with_attr("cn", ["a"])).unwrap();
        let first = SearchOutcome::First(Some(entry.clone()));
        assert_eq!(first.len(), 1);
        assert_eq!(first.into_entries(), vec![entry.clone()]);
        assert!(SearchOutcome::First(None).is_empty());
        assert_eq!(
            SearchOutcome::List(vec![entry.clone()]).into_first(),
            Some(entry)
        );
    }

    #[tokio::test]
    async fn test_list_preserves_order_and_drops_artifacts() {
        let directory = MockDirectory::builder()
            .with_default_search(MockSearch::Items(vec![
                SearchItem::Entry(fixtures::person("a", "A", "a@x")),
                SearchItem::Entry(fixtures::attributeless("cn=artifact")),
                SearchItem::Reference(vec!["ldap://other/dc=x".into()]),
                SearchItem::Entry(fixtures::person("b", "B", "b@x")),
                SearchItem::Entry(fixtures::person("c", "C", "c@x")),
                SearchItem::Done(LdapOutcome::success()),
            ]))
            .build();
        let mut conn = connection(&directory).await;

        let outcome = SearchExecutor::new()
            .execute(&mut conn, &SearchRequest::new(fixtures::BASE_DN))
            .await
            .unwrap();

        let dns: Vec<String> = outcome
            .into_entries()
            .iter()
            .map(|e| e.dn().to_string())
            .collect();
        assert_eq!(
            dns,
            vec![
                format!("uid=a,{}", fixtures::PEOPLE_DN),
                format!("uid=b,{}", fixtures::PEOPLE_DN),
                format!("uid=c,{}", fixtures::PEOPLE_DN),
            ]
        );
        assert_eq!(directory.stats().messages_read, 6);
    }

    #[tokio::test]
    async fn test_first_only_stops_reading() {
        let directory = MockDirectory::builder()
            .with_default_search(MockSearch::entries(vec![
                fixtures::attributeless("cn=artifact"),
                fixtures::person("a", "A", "a@x"),
                fixtures::person("b", "B", "b@x"),
                fixtures::person("c", "C", "c@x"),
            ]))
            .build();
        let mut conn = connection(&directory).await;

        let request = SearchRequest::new(fixtures::BASE_DN).first_only(true);
        let outcome = SearchExecutor::new().execute(&mut conn, &request).await.unwrap();

        let entry = outcome.into_first().unwrap();
        assert_eq!(entry.get_first("uid"), Some("a"));
        let stats = directory.stats();
        assert_eq!(stats.messages_read, 2);
        assert_eq!(stats.abandoned_searches, 1);
    }

    #[tokio::test]
    async fn test_no_such_object_policy() {
        let directory = MockDirectory::builder()
            .with_default_search(MockSearch::result(ResultCode::NoSuchObject, "no such base"))
            .build();
        let mut conn = connection(&directory).await;
        let executor = SearchExecutor::new();

        let first = SearchRequest::new("cn=missing").first_only(true);
        assert_eq!(
            executor.execute(&mut conn, &first).await.unwrap(),
            SearchOutcome::First(None)
        );

        let list = SearchRequest::new("cn=missing");
        let err = executor.execute(&mut conn, &list).await.unwrap_err();
        assert!(err.is_no_such_object());
        assert_eq!(err.diagnostic(), Some("no such base"));
    }

    #[tokio::test]
    async fn test_failure_discards_partial_results() {
        let directory = MockDirectory::builder()
            .with_default_search(MockSearch::entries_then(
                vec![fixtures::person("a", "A", "a@x")],
                LdapOutcome::new(ResultCode::SizeLimitExceeded, "size limit"),
            ))
            .build();
        let mut conn = connection(&directory).await;

        let err = SearchExecutor::new()
            .execute(&mut conn, &SearchRequest::new(fixtures::BASE_DN))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Search(ref o) if o.code == ResultCode::SizeLimitExceeded));
    }

    #[tokio::test]
    async fn test_transport_failure_mid_stream() {
        let directory = MockDirectory::builder()
            .with_default_search(MockSearch::FailAfter {
                items: vec![SearchItem::Entry(fixtures::person("a", "A", "a@x"))],
                error: ProtocolError::ConnectionClosed,
            })
            .build();
        let mut conn = connection(&directory).await;

        let err = SearchExecutor::new()
            .execute(&mut conn, &SearchRequest::new(fixtures::BASE_DN))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Protocol(ProtocolError::ConnectionClosed)));
    }
}
