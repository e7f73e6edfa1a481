//! In-memory mock directory for unit testing.
//!
//! [`MockDirectory`] implements the [`Connector`] / [`Transport`] contract
//! without any network I/O. It holds a small entry tree, evaluates searches
//! against it, enforces a configurable bind policy and counts every call so
//! tests can assert lifecycle behavior (one unbind per handle, no bind
//! after a failed StartTLS, and so on).
//!
//! ## Search evaluation
//!
//! Searches with a scripted response ([`MockDirectoryBuilder::with_search`])
//! replay that response. Otherwise the entry tree is searched: scope is
//! honored, filters of the form `(attr=value)` and `(attr=*)` are evaluated
//! case-insensitively, compound filters match everything, the size limit is
//! enforced and the attribute list is projected.
//!
//! ## Example
//!
//! ```rust
//! use ldap_proto::{RawEntry, ResultCode};
//! use ldap_testing::{MockDirectory, MockSearch};
//!
//! let directory = MockDirectory::builder()
//!     .with_user("cn=admin,dc=example,dc=com", "secret")
//!     .with_entry(RawEntry::new("dc=example,dc=com").with_attr("dc", ["example"]))
//!     .with_search(
//!         "ou=gone,dc=example,dc=com",
//!         MockSearch::result(ResultCode::Busy, "try again later"),
//!     )
//!     .build();
//! assert!(directory.contains("DC=Example,DC=Com"));
//! ```

use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use ldap_proto::{
    BoxResponseStream, ConnectionDescriptor, Connector, LdapOutcome, ProtocolError,
    ProtocolVersion, RawEntry, ResponseStream, ResultCode, SaslInteract, SaslPrompt,
    SaslPromptKind, Scope, SearchItem, SearchParams, Transport,
};
use parking_lot::Mutex;

/// Scripted search response.
#[derive(Clone)]
pub enum MockSearch {
    /// Deliver these items in order.
    Items(Vec<SearchItem>),

    /// Fail the search request itself.
    Fail(ProtocolError),

    /// Deliver these items, then fail the stream.
    FailAfter {
        /// Items delivered before the failure.
        items: Vec<SearchItem>,
        /// Error returned once the items are exhausted.
        error: ProtocolError,
    },

    /// Compute the response from the request.
    Custom(Arc<dyn Fn(&SearchParams) -> MockSearch + Send + Sync>),
}

impl fmt::Debug for MockSearch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Items(items) => f.debug_tuple("Items").field(items).finish(),
            Self::Fail(e) => f.debug_tuple("Fail").field(e).finish(),
            Self::FailAfter { items, error } => f
                .debug_struct("FailAfter")
                .field("items", items)
                .field("error", error)
                .finish(),
            Self::Custom(_) => f.debug_tuple("Custom").field(&"<fn>").finish(),
        }
    }
}

impl MockSearch {
    /// Deliver `entries` followed by a success result.
    pub fn entries(entries: Vec<RawEntry>) -> Self {
        Self::entries_then(entries, LdapOutcome::success())
    }

    /// Deliver `entries` followed by `outcome`.
    pub fn entries_then(entries: Vec<RawEntry>, outcome: LdapOutcome) -> Self {
        let mut items: Vec<SearchItem> = entries.into_iter().map(SearchItem::Entry).collect();
        items.push(SearchItem::Done(outcome));
        Self::Items(items)
    }

    /// Deliver only a final result.
    pub fn result(code: ResultCode, diagnostic: impl Into<String>) -> Self {
        Self::Items(vec![SearchItem::Done(LdapOutcome::new(code, diagnostic))])
    }

    /// Fail the search request with a transport error.
    pub fn fail(error: ProtocolError) -> Self {
        Self::Fail(error)
    }

    /// Compute the response from the request.
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(&SearchParams) -> MockSearch + Send + Sync + 'static,
    {
        Self::Custom(Arc::new(f))
    }
}

/// A recorded SASL bind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaslBindRecord {
    /// Mechanism requested by the client.
    pub mechanism: String,
    /// DN sent along with the bind, if any.
    pub dn: Option<String>,
    /// Answers given to each prompt, in prompt order.
    pub answers: Vec<(SaslPromptKind, String)>,
}

/// Call counters and request records.
#[derive(Debug, Clone, Default)]
pub struct MockStats {
    /// Descriptor of every `initialize` call, including failed ones.
    pub descriptors: Vec<ConnectionDescriptor>,
    /// Protocol versions set on handles.
    pub protocol_versions: Vec<ProtocolVersion>,
    /// StartTLS requests.
    pub start_tls_calls: usize,
    /// Bind DN of every simple bind.
    pub simple_binds: Vec<String>,
    /// Every SASL bind.
    pub sasl_binds: Vec<SaslBindRecord>,
    /// Every search request.
    pub search_requests: Vec<SearchParams>,
    /// Response items handed out by search streams.
    pub messages_read: usize,
    /// Searches abandoned before their final result was read.
    pub abandoned_searches: usize,
    /// DN of every delete request.
    pub delete_requests: Vec<String>,
    /// DNs actually removed from the tree.
    pub deleted: Vec<String>,
    /// "Who am I?" requests.
    pub whoami_calls: usize,
    /// Unbind requests.
    pub unbind_calls: usize,
    /// Handles released by unbind or drop.
    pub released: usize,
}

impl MockStats {
    /// Number of `initialize` calls.
    #[must_use]
    pub fn initialize_calls(&self) -> usize {
        self.descriptors.len()
    }

    /// Number of bind attempts of either kind.
    #[must_use]
    pub fn bind_calls(&self) -> usize {
        self.simple_binds.len() + self.sasl_binds.len()
    }

    /// Handles created and not yet released.
    #[must_use]
    pub fn open_handles(&self) -> usize {
        self.descriptors.len().saturating_sub(self.released)
    }
}

#[derive(Debug, Clone)]
struct DirectoryConfig {
    scripted: HashMap<String, MockSearch>,
    default_search: Option<MockSearch>,
    users: HashMap<String, String>,
    allow_anonymous: bool,
    sasl_mechanisms: Vec<String>,
    sasl_users: HashMap<String, String>,
    sasl_prompts: Vec<SaslPrompt>,
    whoami_identity: Option<String>,
    whoami_failure: Option<LdapOutcome>,
    delete_results: HashMap<String, LdapOutcome>,
    fail_initialize: Option<ProtocolError>,
    fail_start_tls: Option<ProtocolError>,
    fail_bind: Option<ProtocolError>,
    fail_unbind: Option<ProtocolError>,
    latency: Option<Duration>,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            scripted: HashMap::new(),
            default_search: None,
            users: HashMap::new(),
            allow_anonymous: true,
            sasl_mechanisms: Vec::new(),
            sasl_users: HashMap::new(),
            sasl_prompts: vec![
                SaslPrompt::new(SaslPromptKind::AuthName),
                SaslPrompt::new(SaslPromptKind::User),
                SaslPrompt::new(SaslPromptKind::Realm),
                SaslPrompt::new(SaslPromptKind::Pass),
            ],
            whoami_identity: None,
            whoami_failure: None,
            delete_results: HashMap::new(),
            fail_initialize: None,
            fail_start_tls: None,
            fail_bind: None,
            fail_unbind: None,
            latency: None,
        }
    }
}

#[derive(Debug, Default)]
struct DirectoryState {
    entries: Vec<RawEntry>,
    stats: MockStats,
}

#[derive(Debug)]
struct Shared {
    config: DirectoryConfig,
    state: Mutex<DirectoryState>,
}

/// Builder for [`MockDirectory`].
#[derive(Debug, Default)]
pub struct MockDirectoryBuilder {
    config: DirectoryConfig,
    entries: Vec<RawEntry>,
}

impl MockDirectoryBuilder {
    /// Create a builder for an empty directory that allows anonymous binds.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry to the tree.
    #[must_use]
    pub fn with_entry(mut self, entry: RawEntry) -> Self {
        self.entries.push(entry);
        self
    }

    /// Add several entries to the tree.
    #[must_use]
    pub fn with_entries(mut self, entries: impl IntoIterator<Item = RawEntry>) -> Self {
        self.entries.extend(entries);
        self
    }

    /// Script the response for searches based at `base`.
    #[must_use]
    pub fn with_search(mut self, base: impl AsRef<str>, response: MockSearch) -> Self {
        self.config
            .scripted
            .insert(normalize(base.as_ref()), response);
        self
    }

    /// Script the response for searches with no specific script.
    #[must_use]
    pub fn with_default_search(mut self, response: MockSearch) -> Self {
        self.config.default_search = Some(response);
        self
    }

    /// Accept simple binds for `dn` with `password`.
    #[must_use]
    pub fn with_user(mut self, dn: impl AsRef<str>, password: impl Into<String>) -> Self {
        self.config
            .users
            .insert(normalize(dn.as_ref()), password.into());
        self
    }

    /// Allow or refuse anonymous simple binds.
    #[must_use]
    pub fn allow_anonymous(mut self, allow: bool) -> Self {
        self.config.allow_anonymous = allow;
        self
    }

    /// Advertise a SASL mechanism.
    #[must_use]
    pub fn with_sasl_mechanism(mut self, mechanism: impl Into<String>) -> Self {
        self.config.sasl_mechanisms.push(mechanism.into());
        self
    }

    /// Require SASL binds to authenticate as `authcid` with `password`.
    ///
    /// Without any SASL users every SASL bind with an advertised mechanism
    /// succeeds.
    #[must_use]
    pub fn with_sasl_user(mut self, authcid: impl Into<String>, password: impl Into<String>) -> Self {
        self.config
            .sasl_users
            .insert(authcid.into(), password.into());
        self
    }

    /// Replace the prompts issued during SASL binds.
    #[must_use]
    pub fn with_sasl_prompts(mut self, prompts: Vec<SaslPrompt>) -> Self {
        self.config.sasl_prompts = prompts;
        self
    }

    /// Return `identity` from every "Who am I?" request.
    #[must_use]
    pub fn with_whoami_identity(mut self, identity: impl Into<String>) -> Self {
        self.config.whoami_identity = Some(identity.into());
        self
    }

    /// Answer every "Who am I?" request with `outcome`.
    #[must_use]
    pub fn with_whoami_failure(mut self, outcome: LdapOutcome) -> Self {
        self.config.whoami_failure = Some(outcome);
        self
    }

    /// Answer deletes of `dn` with `outcome` without touching the tree.
    #[must_use]
    pub fn with_delete_result(mut self, dn: impl AsRef<str>, outcome: LdapOutcome) -> Self {
        self.config
            .delete_results
            .insert(normalize(dn.as_ref()), outcome);
        self
    }

    /// Fail every `initialize` call.
    #[must_use]
    pub fn fail_initialize(mut self, error: ProtocolError) -> Self {
        self.config.fail_initialize = Some(error);
        self
    }

    /// Fail every StartTLS request.
    #[must_use]
    pub fn fail_start_tls(mut self, error: ProtocolError) -> Self {
        self.config.fail_start_tls = Some(error);
        self
    }

    /// Fail every bind request at the transport level.
    #[must_use]
    pub fn fail_bind(mut self, error: ProtocolError) -> Self {
        self.config.fail_bind = Some(error);
        self
    }

    /// Fail every unbind request. The handle is released regardless.
    #[must_use]
    pub fn fail_unbind(mut self, error: ProtocolError) -> Self {
        self.config.fail_unbind = Some(error);
        self
    }

    /// Delay binds, searches, deletes and "Who am I?" requests.
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.config.latency = Some(latency);
        self
    }

    /// Build the directory.
    #[must_use]
    pub fn build(self) -> MockDirectory {
        MockDirectory {
            shared: Arc::new(Shared {
                config: self.config,
                state: Mutex::new(DirectoryState {
                    entries: self.entries,
                    stats: MockStats::default(),
                }),
            }),
        }
    }
}

/// In-memory directory server.
///
/// Cloning is cheap; clones share the tree and the counters.
#[derive(Debug, Clone)]
pub struct MockDirectory {
    shared: Arc<Shared>,
}

impl Default for MockDirectory {
    fn default() -> Self {
        MockDirectoryBuilder::new().build()
    }
}

impl MockDirectory {
    /// Create a builder.
    #[must_use]
    pub fn builder() -> MockDirectoryBuilder {
        MockDirectoryBuilder::new()
    }

    /// Snapshot of the counters.
    #[must_use]
    pub fn stats(&self) -> MockStats {
        self.shared.state.lock().stats.clone()
    }

    /// Clear the counters. The tree is kept.
    pub fn reset_stats(&self) {
        self.shared.state.lock().stats = MockStats::default();
    }

    /// Snapshot of the entry tree.
    #[must_use]
    pub fn entries(&self) -> Vec<RawEntry> {
        self.shared.state.lock().entries.clone()
    }

    /// Check if the tree holds an entry named `dn` (case-insensitive).
    #[must_use]
    pub fn contains(&self, dn: &str) -> bool {
        let dn = normalize(dn);
        self.shared
            .state
            .lock()
            .entries
            .iter()
            .any(|e| normalize(&e.dn) == dn)
    }
}

#[async_trait]
impl Connector for MockDirectory {
    type Transport = MockConnection;

    async fn initialize(
        &self,
        descriptor: &ConnectionDescriptor,
    ) -> Result<MockConnection, ProtocolError> {
        self.shared
            .state
            .lock()
            .stats
            .descriptors
            .push(descriptor.clone());

        if let Some(error) = &self.shared.config.fail_initialize {
            // A failed initialize never hands out a handle.
            self.shared.state.lock().stats.released += 1;
            return Err(error.clone());
        }

        tracing::trace!(url = %descriptor.to_connection_url(), "mock handle created");
        Ok(MockConnection {
            shared: Arc::clone(&self.shared),
            secure: descriptor.is_secure(),
            tls_active: false,
            identity: None,
            closed: false,
            released: false,
        })
    }
}

/// A handle on a [`MockDirectory`].
#[derive(Debug)]
pub struct MockConnection {
    shared: Arc<Shared>,
    secure: bool,
    tls_active: bool,
    identity: Option<String>,
    closed: bool,
    released: bool,
}

impl MockConnection {
    /// Check if StartTLS completed on this handle.
    #[must_use]
    pub fn is_tls_active(&self) -> bool {
        self.tls_active
    }

    fn ensure_open(&self) -> Result<(), ProtocolError> {
        if self.closed {
            Err(ProtocolError::ConnectionClosed)
        } else {
            Ok(())
        }
    }

    async fn delay(&self) {
        if let Some(latency) = self.shared.config.latency {
            tokio::time::sleep(latency).await;
        }
    }

    fn release(&mut self) {
        if !self.released {
            self.released = true;
            self.shared.state.lock().stats.released += 1;
        }
    }

    fn resolve_search(&self, params: &SearchParams) -> MockSearch {
        let config = &self.shared.config;
        let scripted = config
            .scripted
            .get(&normalize(&params.base))
            .or(config.default_search.as_ref())
            .cloned();

        match scripted {
            Some(MockSearch::Custom(f)) => f(params),
            Some(response) => response,
            None => self.evaluate(params),
        }
    }

    fn evaluate(&self, params: &SearchParams) -> MockSearch {
        let state = self.shared.state.lock();
        let base = normalize(&params.base);

        let base_exists = (base.is_empty() && params.scope != Scope::Base)
            || state.entries.iter().any(|e| normalize(&e.dn) == base);
        if !base_exists {
            return MockSearch::result(ResultCode::NoSuchObject, "no such object");
        }

        let mut matched: Vec<RawEntry> = state
            .entries
            .iter()
            .filter(|e| in_scope(&normalize(&e.dn), &base, params.scope))
            .filter(|e| matches_filter(e, params.filter.as_deref()))
            .map(|e| project(e, params))
            .collect();

        let limit = params.size_limit as usize;
        if limit > 0 && matched.len() > limit {
            matched.truncate(limit);
            return MockSearch::entries_then(
                matched,
                LdapOutcome::new(ResultCode::SizeLimitExceeded, ""),
            );
        }
        MockSearch::entries(matched)
    }

    fn check_simple(&self, dn: &str, password: &str) -> (LdapOutcome, Option<String>) {
        let config = &self.shared.config;
        if dn.is_empty() && password.is_empty() {
            return if config.allow_anonymous {
                (LdapOutcome::success(), Some(String::new()))
            } else {
                (
                    LdapOutcome::new(
                        ResultCode::InappropriateAuthentication,
                        "anonymous bind disallowed",
                    ),
                    None,
                )
            };
        }
        if password.is_empty() {
            return (
                LdapOutcome::new(
                    ResultCode::UnwillingToPerform,
                    "unauthenticated bind (DN with no password) disallowed",
                ),
                None,
            );
        }
        match config.users.get(&normalize(dn)) {
            Some(expected) if expected == password => {
                (LdapOutcome::success(), Some(format!("dn:{dn}")))
            }
            _ => (
                LdapOutcome::new(ResultCode::InvalidCredentials, ""),
                None,
            ),
        }
    }

    fn check_sasl(
        &self,
        mechanism: &str,
        answers: &[(SaslPromptKind, String)],
    ) -> (LdapOutcome, Option<String>) {
        let config = &self.shared.config;
        let advertised = config
            .sasl_mechanisms
            .iter()
            .any(|m| m.eq_ignore_ascii_case(mechanism));
        if !advertised {
            return (
                LdapOutcome::new(
                    ResultCode::AuthMethodNotSupported,
                    "SASL(-4): no mechanism available",
                ),
                None,
            );
        }

        let answer = |kind: SaslPromptKind| {
            answers
                .iter()
                .find(|(k, _)| *k == kind)
                .map(|(_, v)| v.as_str())
                .unwrap_or_default()
        };
        let authcid = answer(SaslPromptKind::AuthName);
        let authzid = answer(SaslPromptKind::User);

        if !config.sasl_users.is_empty() {
            let accepted = config
                .sasl_users
                .get(authcid)
                .is_some_and(|p| p == answer(SaslPromptKind::Pass));
            if !accepted {
                return (
                    LdapOutcome::new(ResultCode::InvalidCredentials, "SASL(-13): user not found"),
                    None,
                );
            }
        }

        let identity = if !authzid.is_empty() {
            format!("u:{authzid}")
        } else if !authcid.is_empty() {
            format!(
                "dn:uid={authcid},cn={},cn=auth",
                mechanism.to_ascii_lowercase()
            )
        } else {
            String::new()
        };
        (LdapOutcome::success(), Some(identity))
    }
}

#[async_trait]
impl Transport for MockConnection {
    fn set_protocol_version(&mut self, version: ProtocolVersion) {
        self.shared
            .state
            .lock()
            .stats
            .protocol_versions
            .push(version);
    }

    async fn start_tls(&mut self) -> Result<(), ProtocolError> {
        self.ensure_open()?;
        self.shared.state.lock().stats.start_tls_calls += 1;

        if let Some(error) = &self.shared.config.fail_start_tls {
            return Err(error.clone());
        }
        if self.secure || self.tls_active {
            return Err(ProtocolError::Tls("TLS already started".into()));
        }
        if self.identity.is_some() {
            return Err(ProtocolError::Tls(
                "StartTLS is not allowed after bind".into(),
            ));
        }
        self.tls_active = true;
        Ok(())
    }

    async fn simple_bind(
        &mut self,
        dn: &str,
        password: &str,
    ) -> Result<LdapOutcome, ProtocolError> {
        self.ensure_open()?;
        self.shared
            .state
            .lock()
            .stats
            .simple_binds
            .push(dn.to_string());
        self.delay().await;

        if let Some(error) = &self.shared.config.fail_bind {
            return Err(error.clone());
        }
        let (outcome, identity) = self.check_simple(dn, password);
        self.identity = identity;
        Ok(outcome)
    }

    async fn sasl_interactive_bind(
        &mut self,
        dn: Option<&str>,
        mechanism: &str,
        interact: &dyn SaslInteract,
    ) -> Result<LdapOutcome, ProtocolError> {
        self.ensure_open()?;
        let answers: Vec<(SaslPromptKind, String)> = self
            .shared
            .config
            .sasl_prompts
            .iter()
            .map(|prompt| (prompt.kind, interact.answer(prompt)))
            .collect();
        self.shared
            .state
            .lock()
            .stats
            .sasl_binds
            .push(SaslBindRecord {
                mechanism: mechanism.to_string(),
                dn: dn.map(str::to_string),
                answers: answers.clone(),
            });
        self.delay().await;

        if let Some(error) = &self.shared.config.fail_bind {
            return Err(error.clone());
        }
        let (outcome, identity) = self.check_sasl(mechanism, &answers);
        self.identity = identity;
        Ok(outcome)
    }

    async fn search(&mut self, params: &SearchParams) -> Result<BoxResponseStream, ProtocolError> {
        self.ensure_open()?;
        self.shared
            .state
            .lock()
            .stats
            .search_requests
            .push(params.clone());
        self.delay().await;

        let (items, error_after) = match self.resolve_search(params) {
            MockSearch::Items(items) => (items, None),
            MockSearch::FailAfter { items, error } => (items, Some(error)),
            MockSearch::Fail(error) => return Err(error),
            MockSearch::Custom(_) => {
                return Err(ProtocolError::Unsupported(
                    "nested custom search responses".into(),
                ));
            }
        };

        Ok(Box::new(MockResponseStream {
            shared: Arc::clone(&self.shared),
            items: items.into(),
            error_after,
            abandoned: false,
        }))
    }

    async fn delete(&mut self, dn: &str) -> Result<LdapOutcome, ProtocolError> {
        self.ensure_open()?;
        self.shared
            .state
            .lock()
            .stats
            .delete_requests
            .push(dn.to_string());
        self.delay().await;

        let target = normalize(dn);
        if let Some(outcome) = self.shared.config.delete_results.get(&target) {
            return Ok(outcome.clone());
        }
        if self.identity.as_deref().is_none_or(str::is_empty) {
            return Ok(LdapOutcome::new(
                ResultCode::InsufficientAccessRights,
                "no write access to parent",
            ));
        }

        let mut state = self.shared.state.lock();
        let Some(index) = state.entries.iter().position(|e| normalize(&e.dn) == target) else {
            return Ok(LdapOutcome::new(ResultCode::NoSuchObject, ""));
        };
        let has_children = state
            .entries
            .iter()
            .any(|e| parent(&normalize(&e.dn)) == target);
        if has_children {
            return Ok(LdapOutcome::new(ResultCode::NotAllowedOnNonLeaf, ""));
        }
        state.entries.remove(index);
        state.stats.deleted.push(dn.to_string());
        Ok(LdapOutcome::success())
    }

    async fn whoami(&mut self) -> Result<(LdapOutcome, String), ProtocolError> {
        self.ensure_open()?;
        self.shared.state.lock().stats.whoami_calls += 1;
        self.delay().await;

        let config = &self.shared.config;
        if let Some(outcome) = &config.whoami_failure {
            return Ok((outcome.clone(), String::new()));
        }
        let identity = config
            .whoami_identity
            .clone()
            .or_else(|| self.identity.clone())
            .unwrap_or_default();
        Ok((LdapOutcome::success(), identity))
    }

    async fn unbind(&mut self) -> Result<(), ProtocolError> {
        self.ensure_open()?;
        self.shared.state.lock().stats.unbind_calls += 1;
        self.closed = true;
        self.release();

        match &self.shared.config.fail_unbind {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

impl Drop for MockConnection {
    fn drop(&mut self) {
        self.release();
    }
}

struct MockResponseStream {
    shared: Arc<Shared>,
    items: VecDeque<SearchItem>,
    error_after: Option<ProtocolError>,
    abandoned: bool,
}

#[async_trait]
impl ResponseStream for MockResponseStream {
    async fn next_item(&mut self) -> Result<Option<SearchItem>, ProtocolError> {
        if self.abandoned {
            return Ok(None);
        }
        match self.items.pop_front() {
            Some(item) => {
                self.shared.state.lock().stats.messages_read += 1;
                Ok(Some(item))
            }
            None => match self.error_after.take() {
                Some(error) => Err(error),
                None => Ok(None),
            },
        }
    }

    async fn abandon(&mut self) -> Result<(), ProtocolError> {
        if !self.abandoned {
            self.abandoned = true;
            self.items.clear();
            self.shared.state.lock().stats.abandoned_searches += 1;
        }
        Ok(())
    }
}

fn normalize(dn: &str) -> String {
    dn.split(',')
        .map(str::trim)
        .collect::<Vec<_>>()
        .join(",")
        .to_ascii_lowercase()
}

fn parent(dn: &str) -> &str {
    dn.split_once(',').map_or("", |(_, rest)| rest)
}

fn in_scope(dn: &str, base: &str, scope: Scope) -> bool {
    match scope {
        Scope::Base => dn == base,
        Scope::OneLevel => !dn.is_empty() && parent(dn) == base,
        Scope::Subtree if base.is_empty() => !dn.is_empty(),
        Scope::Subtree => dn == base || dn.ends_with(&format!(",{base}")),
    }
}

fn matches_filter(entry: &RawEntry, filter: Option<&str>) -> bool {
    let Some(inner) = filter
        .map(str::trim)
        .and_then(|f| f.strip_prefix('('))
        .and_then(|f| f.strip_suffix(')'))
    else {
        return true;
    };
    if inner.starts_with(['&', '|', '!']) {
        return true;
    }
    let Some((attr, value)) = inner.split_once('=') else {
        return true;
    };
    if attr.eq_ignore_ascii_case("objectClass") && value == "*" {
        return true;
    }

    let text = entry
        .attrs
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(attr))
        .map(|(_, values)| values.as_slice());
    let has_binary = entry
        .bin_attrs
        .keys()
        .any(|name| name.eq_ignore_ascii_case(attr));

    if value == "*" {
        return text.is_some_and(|v| !v.is_empty()) || has_binary;
    }
    text.is_some_and(|values| values.iter().any(|v| v.eq_ignore_ascii_case(value)))
}

fn project(entry: &RawEntry, params: &SearchParams) -> RawEntry {
    let wanted = params
        .attributes
        .as_ref()
        .filter(|attrs| !attrs.iter().any(|a| a == "*"));
    let keep = |name: &str| wanted.is_none_or(|w| w.iter().any(|a| a.eq_ignore_ascii_case(name)));

    let mut projected = RawEntry::new(entry.dn.clone());
    for (name, values) in entry.attrs.iter().filter(|(n, _)| keep(n)) {
        let values = if params.attrs_only { Vec::new() } else { values.clone() };
        projected.attrs.insert(name.clone(), values);
    }
    for (name, values) in entry.bin_attrs.iter().filter(|(n, _)| keep(n)) {
        let values = if params.attrs_only { Vec::new() } else { values.clone() };
        projected.bin_attrs.insert(name.clone(), values);
    }
    projected
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree() -> MockDirectory {
        MockDirectory::builder()
            .with_user("cn=admin,dc=example,dc=com", "secret")
            .with_entries([
                RawEntry::new("dc=example,dc=com").with_attr("dc", ["example"]),
                RawEntry::new("ou=People,dc=example,dc=com").with_attr("ou", ["People"]),
                RawEntry::new("uid=a,ou=People,dc=example,dc=com")
                    .with_attr("uid", ["a"])
                    .with_attr("cn", ["Alice"]),
                RawEntry::new("uid=b,ou=People,dc=example,dc=com")
                    .with_attr("uid", ["b"])
                    .with_attr("cn", ["Bob"]),
            ])
            .build()
    }

    #[test]
    fn test_scope_evaluation() {
        let base = normalize("ou=People, dc=example, dc=com");
        assert!(in_scope("uid=a,ou=people,dc=example,dc=com", &base, Scope::OneLevel));
        assert!(!in_scope(&base, &base, Scope::OneLevel));
        assert!(in_scope(&base, &base, Scope::Subtree));
        assert!(in_scope(&base, &base, Scope::Base));
        assert!(!in_scope("dc=example,dc=com", &base, Scope::Subtree));
    }

    #[test]
    fn test_filter_evaluation() {
        let entry = RawEntry::new("uid=a").with_attr("uid", ["a"]);
        assert!(matches_filter(&entry, None));
        assert!(matches_filter(&entry, Some("(UID=A)")));
        assert!(matches_filter(&entry, Some("(uid=*)")));
        assert!(!matches_filter(&entry, Some("(mail=*)")));
        assert!(!matches_filter(&entry, Some("(uid=b)")));
        assert!(matches_filter(&entry, Some("(&(uid=b)(cn=x))")));
        assert!(matches_filter(&RawEntry::new("cn=x"), Some("(objectclass=*)")));
    }

    #[test]
    fn test_projection_and_attrs_only() {
        let entry = RawEntry::new("uid=a")
            .with_attr("uid", ["a"])
            .with_attr("cn", ["Alice"]);
        let mut params = SearchParams::new("uid=a", Scope::Base);
        params.attributes = Some(vec!["CN".into()]);
        let projected = project(&entry, &params);
        assert_eq!(projected.attrs.len(), 1);
        assert_eq!(projected.attrs["cn"], vec!["Alice".to_string()]);

        params.attrs_only = true;
        assert!(project(&entry, &params).attrs["cn"].is_empty());
    }

    #[tokio::test]
    async fn test_size_limit_reports_exceeded() {
        let directory = tree();
        let descriptor = ConnectionDescriptor::parse("ldap://mock/").unwrap();
        let mut conn = directory.initialize(&descriptor).await.unwrap();

        let mut params = SearchParams::new("ou=People,dc=example,dc=com", Scope::OneLevel);
        params.size_limit = 1;
        let mut stream = conn.search(&params).await.unwrap();
        let mut items = Vec::new();
        while let Some(item) = stream.next_item().await.unwrap() {
            items.push(item);
        }
        assert_eq!(items.len(), 2);
        assert!(matches!(
            items.last(),
            Some(SearchItem::Done(outcome)) if outcome.code == ResultCode::SizeLimitExceeded
        ));
    }

    #[tokio::test]
    async fn test_delete_rules() {
        let directory = tree();
        let descriptor = ConnectionDescriptor::parse("ldap://mock/").unwrap();
        let mut conn = directory.initialize(&descriptor).await.unwrap();

        let anon = conn.delete("uid=a,ou=People,dc=example,dc=com").await.unwrap();
        assert_eq!(anon.code, ResultCode::InsufficientAccessRights);

        let bound = conn
            .simple_bind("cn=admin,dc=example,dc=com", "secret")
            .await
            .unwrap();
        assert!(bound.is_success());

        let non_leaf = conn.delete("ou=People,dc=example,dc=com").await.unwrap();
        assert_eq!(non_leaf.code, ResultCode::NotAllowedOnNonLeaf);

        let ok = conn.delete("uid=a,ou=People,dc=example,dc=com").await.unwrap();
        assert!(ok.is_success());
        assert!(!directory.contains("uid=a,ou=People,dc=example,dc=com"));

        let again = conn.delete("uid=a,ou=People,dc=example,dc=com").await.unwrap();
        assert_eq!(again.code, ResultCode::NoSuchObject);
    }

    #[tokio::test]
    async fn test_drop_releases_handle() {
        let directory = tree();
        let descriptor = ConnectionDescriptor::parse("ldap://mock/").unwrap();
        let conn = directory.initialize(&descriptor).await.unwrap();
        assert_eq!(directory.stats().open_handles(), 1);
        drop(conn);
        let stats = directory.stats();
        assert_eq!(stats.open_handles(), 0);
        assert_eq!(stats.unbind_calls, 0);
    }
}
