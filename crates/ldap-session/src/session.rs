//! Directory session.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use ldap_auth::{BindOptions, CredentialBinder, DefaultBinder};
use ldap_proto::{
    ConnectionDescriptor, Connector, ProtocolError, ProtocolVersion, Scope, Transport,
};
use ldap_tls::TlsMode;
use tracing::Instrument;

use crate::config::SessionConfig;
use crate::entry::Entry;
use crate::error::{Error, Result};
use crate::instrumentation::InstrumentationContext;
use crate::search::{SearchExecutor, SearchOutcome, SearchRequest};
use crate::state::{ConnectionState, SessionState};
use crate::transport::Ldap3Connector;

/// Filter used to read the root DSE.
pub const ROOT_DSE_FILTER: &str = "(objectclass=*)";

/// Attributes requested from the root DSE.
pub const ROOT_DSE_ATTRIBUTES: [&str; 6] = [
    "namingContexts",
    "altServer",
    "supportedExtension",
    "supportedControl",
    "supportedSASLMechanisms",
    "supportedLDAPVersion",
];

/// Identity reported by [`Session::whoami`] when the server returns none.
pub const ANONYMOUS_IDENTITY: &str = "anonym";

/// A session with one directory server.
///
/// A session owns at most one connection. It starts disconnected;
/// [`connect`](Self::connect) opens the connection, optionally upgrades it
/// with StartTLS and binds. Directory operations fail with
/// [`Error::NotConnected`] until a bind has succeeded.
///
/// Operations take `&mut self`, so a session carries one operation at a
/// time. Share a session between tasks behind a mutex.
///
/// # Example
///
/// ```rust,no_run
/// use ldap_auth::BindOptions;
/// use ldap_proto::Scope;
/// use ldap_session::{SearchRequest, Session};
///
/// # async fn example() -> ldap_session::Result<()> {
/// let mut session = Session::new(Some("ldap://ldap.example.com/"), true)?;
/// session
///     .connect(
///         BindOptions::new()
///             .binddn("cn=admin,dc=example,dc=com")
///             .password("secret"),
///     )
///     .await?;
///
/// let people = session
///     .search(
///         SearchRequest::new("ou=People,dc=example,dc=com")
///             .scope(Scope::OneLevel)
///             .filter("(objectClass=person)"),
///     )
///     .await?
///     .into_entries();
/// println!("{} people", people.len());
///
/// session.close().await?;
/// # Ok(())
/// # }
/// ```
pub struct Session<C: Connector = Ldap3Connector> {
    config: SessionConfig,
    descriptor: ConnectionDescriptor,
    connector: C,
    binder: Arc<dyn CredentialBinder>,
    executor: SearchExecutor,
    state: ConnectionState<C::Transport>,
    instrumentation: InstrumentationContext,
}

impl Session<Ldap3Connector> {
    /// Create a session for `uri`, or `ldap://localhost:389/` when `None`.
    ///
    /// `tls` requests StartTLS; it is ignored for `ldaps://` URLs, which are
    /// encrypted from the start. The URL is validated here, before any
    /// network activity.
    pub fn new(uri: Option<&str>, tls: bool) -> Result<Self> {
        let mut config = SessionConfig::new().start_tls(tls);
        if let Some(uri) = uri {
            config = config.uri(uri);
        }
        Self::from_config(config)
    }

    /// Create a session from a configuration.
    pub fn from_config(config: SessionConfig) -> Result<Self> {
        config.validate()?;
        let connector = Ldap3Connector::new(&config)?;
        Self::with_connector(config, connector)
    }
}

impl<C: Connector> Session<C> {
    /// Create a session that opens connections through `connector`.
    pub fn with_connector(config: SessionConfig, connector: C) -> Result<Self> {
        config.validate()?;
        let descriptor = config.descriptor()?;
        if config.start_tls && descriptor.is_secure() {
            tracing::debug!(uri = %config.uri, "StartTLS ignored for ldaps:// URL");
        }
        let instrumentation = InstrumentationContext::new(&descriptor);
        Ok(Self {
            config,
            descriptor,
            connector,
            binder: Arc::new(DefaultBinder::new()),
            executor: SearchExecutor::new(),
            state: ConnectionState::Disconnected,
            instrumentation,
        })
    }

    /// Use `binder` for binds instead of the default binder.
    #[must_use]
    pub fn with_binder(mut self, binder: impl CredentialBinder + 'static) -> Self {
        self.binder = Arc::new(binder);
        self
    }

    /// The server URL.
    #[must_use]
    pub fn uri(&self) -> &str {
        &self.config.uri
    }

    /// Check if StartTLS will run on connect.
    ///
    /// Always false for `ldaps://` URLs.
    #[must_use]
    pub fn tls_requested(&self) -> bool {
        self.tls_mode().uses_start_tls()
    }

    /// How TLS is applied on connect.
    #[must_use]
    pub fn tls_mode(&self) -> TlsMode {
        TlsMode::resolve(self.descriptor.is_secure(), self.config.start_tls)
    }

    /// The parsed server URL of the latest connect.
    #[must_use]
    pub fn descriptor(&self) -> &ConnectionDescriptor {
        &self.descriptor
    }

    /// The session configuration.
    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state.public()
    }

    /// Check if the session is bound.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.state().is_connected()
    }

    /// Connect and bind.
    ///
    /// A non-empty `mechanism` selects a SASL bind; otherwise a simple bind
    /// with `binddn` and `password` is performed. Without options the bind
    /// is anonymous.
    pub async fn connect(&mut self, options: BindOptions) -> Result<()> {
        self.connect_with_tls(options, None).await
    }

    /// Connect and bind, overriding the StartTLS request for this connect.
    ///
    /// A session that is already connected is unbound first. On any failure
    /// the session is left disconnected.
    pub async fn connect_with_tls(
        &mut self,
        options: BindOptions,
        tls_override: Option<bool>,
    ) -> Result<()> {
        let descriptor = ConnectionDescriptor::parse(&self.config.uri)?;
        self.instrumentation = InstrumentationContext::new(&descriptor);
        self.descriptor = descriptor;

        if self.is_connected() {
            tracing::debug!(uri = %self.config.uri, "reconnecting, closing previous connection");
            if let Err(e) = self.close().await {
                tracing::warn!(error = %e, "previous connection did not unbind cleanly");
            }
        }

        let requested = tls_override.unwrap_or(self.config.start_tls);
        let tls_mode = TlsMode::resolve(self.descriptor.is_secure(), requested);
        let credentials = options.into_credentials();
        let span = self
            .instrumentation
            .connect_span(&tls_mode.to_string(), credentials.method_name());

        let limit = self.config.timeouts.operation_timeout;
        let result = async {
            let mut transport = self
                .connector
                .initialize(&self.descriptor)
                .await
                .map_err(Error::Connection)?;
            transport.set_protocol_version(ProtocolVersion::V3);

            if tls_mode.uses_start_tls() {
                tracing::debug!("starting TLS");
                bounded(limit, async {
                    transport.start_tls().await.map_err(|e| match e {
                        ProtocolError::Tls(msg) => Error::Tls(msg),
                        other => Error::Tls(other.to_string()),
                    })
                })
                .await?;
            }

            bounded(limit, async {
                self.binder
                    .bind(&mut transport, &credentials)
                    .await
                    .map_err(Error::from)
            })
            .await?;

            Ok::<_, Error>(transport)
        }
        .instrument(span.clone())
        .await
        .map_err(|e| match e {
            Error::Protocol(err) => Error::Connection(err),
            other => other,
        });

        match result {
            Ok(transport) => {
                self.state = ConnectionState::Connected(transport);
                tracing::info!(
                    uri = %self.config.uri,
                    tls = %tls_mode,
                    method = credentials.method_name(),
                    "connected"
                );
                Ok(())
            }
            Err(e) => {
                InstrumentationContext::record_error(&span, &e);
                tracing::warn!(uri = %self.config.uri, error = %e, "connect failed");
                Err(e)
            }
        }
    }

    /// Unbind and disconnect.
    ///
    /// Closing a disconnected session succeeds without contacting the
    /// server. The session is disconnected afterwards even when the unbind
    /// fails; that failure is reported as [`Error::Unbind`].
    pub async fn close(&mut self) -> Result<()> {
        let Some(mut transport) = self.state.take() else {
            tracing::trace!("close on disconnected session");
            return Ok(());
        };

        let span = self.instrumentation.unbind_span();
        let limit = self.config.timeouts.operation_timeout;
        let result = bounded(limit, async {
            transport.unbind().await.map_err(Error::Unbind)
        })
        .instrument(span.clone())
        .await
        .map_err(|e| match e {
            Error::Protocol(err) => Error::Unbind(err),
            other => other,
        });
        drop(transport);

        match result {
            Ok(()) => {
                tracing::debug!(uri = %self.config.uri, "disconnected");
                Ok(())
            }
            Err(e) => {
                InstrumentationContext::record_error(&span, &e);
                tracing::warn!(uri = %self.config.uri, error = %e, "unbind failed");
                Err(e)
            }
        }
    }

    /// Run a search.
    pub async fn search(&mut self, request: SearchRequest) -> Result<SearchOutcome> {
        let transport = self.state.handle_mut().ok_or(Error::NotConnected)?;
        let span = self.instrumentation.search_span(&request);
        let limit = request
            .effective_timeout()
            .or(self.config.timeouts.operation_timeout);

        let result = bounded(limit, self.executor.execute(transport, &request))
            .instrument(span.clone())
            .await;

        match &result {
            Ok(outcome) => InstrumentationContext::record_entries(&span, outcome.len()),
            Err(e) => InstrumentationContext::record_error(&span, e),
        }
        result
    }

    /// Read one entry.
    ///
    /// Returns `None` when the entry does not exist or has no readable
    /// attributes.
    pub async fn get_entry(&mut self, dn: &str) -> Result<Option<Entry>> {
        let request = SearchRequest::new(dn).scope(Scope::Base).first_only(true);
        Ok(self.search(request).await?.into_first())
    }

    /// Read the root DSE.
    pub async fn get_root_dse(&mut self) -> Result<Option<Entry>> {
        let request = SearchRequest::new("")
            .scope(Scope::Base)
            .filter(ROOT_DSE_FILTER)
            .attributes(ROOT_DSE_ATTRIBUTES)
            .first_only(true);
        Ok(self.search(request).await?.into_first())
    }

    /// Delete an entry.
    ///
    /// An empty DN deletes nothing and succeeds.
    pub async fn delete_entry(&mut self, dn: &str) -> Result<()> {
        let transport = self.state.handle_mut().ok_or(Error::NotConnected)?;
        if dn.is_empty() {
            tracing::debug!("delete with empty DN ignored");
            return Ok(());
        }

        let span = self.instrumentation.delete_span(dn);
        let limit = self.config.timeouts.operation_timeout;
        let result = bounded(limit, async {
            let outcome = transport.delete(dn).await.map_err(Error::Protocol)?;
            if outcome.is_success() {
                Ok(())
            } else {
                Err(Error::Delete(outcome))
            }
        })
        .instrument(span.clone())
        .await;

        match &result {
            Ok(()) => tracing::debug!(dn = %dn, "entry deleted"),
            Err(e) => InstrumentationContext::record_error(&span, e),
        }
        result
    }

    /// Ask the server which identity this session is bound as.
    ///
    /// Anonymous sessions report `"anonym"`.
    pub async fn whoami(&mut self) -> Result<String> {
        let transport = self.state.handle_mut().ok_or(Error::NotConnected)?;
        let span = self.instrumentation.whoami_span();
        let limit = self.config.timeouts.operation_timeout;

        let result = bounded(limit, async {
            let (outcome, identity) = transport.whoami().await.map_err(Error::Protocol)?;
            if !outcome.is_success() {
                return Err(Error::Whoami(outcome));
            }
            if identity.is_empty() {
                Ok(ANONYMOUS_IDENTITY.to_string())
            } else {
                Ok(identity)
            }
        })
        .instrument(span.clone())
        .await;

        if let Err(e) = &result {
            InstrumentationContext::record_error(&span, e);
        }
        result
    }
}

/// Run `future` under an optional client-side deadline.
async fn bounded<T, F>(limit: Option<Duration>, future: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match limit {
        Some(limit) => tokio::time::timeout(limit, future)
            .await
            .map_err(|_| Error::Protocol(ProtocolError::Timeout))?,
        None => future.await,
    }
}

impl<C: Connector> Drop for Session<C> {
    fn drop(&mut self) {
        if self.is_connected() {
            tracing::debug!(
                uri = %self.config.uri,
                "session dropped while connected, releasing connection without unbind"
            );
        }
    }
}

impl<C: Connector> std::fmt::Debug for Session<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("uri", &self.config.uri)
            .field("tls_mode", &self.tls_mode())
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ldap_testing::{MockDirectory, fixtures};

    fn session(directory: &MockDirectory, uri: &str, tls: bool) -> Session<MockDirectory> {
        let config = SessionConfig::new().uri(uri).start_tls(tls);
        Session::with_connector(config, directory.clone()).unwrap()
    }

    #[test]
    fn test_default_uri() {
        let session = Session::new(None, false).unwrap();
        assert_eq!(session.uri(), "ldap://localhost:389/");
        assert_eq!(session.state(), SessionState::Disconnected);
        assert!(!session.tls_requested());
    }

    #[test]
    fn test_invalid_uri_fails_at_construction() {
        let err = Session::new(Some("localhost:389"), false).unwrap_err();
        assert!(matches!(err, Error::InvalidUrl(_)));
    }

    #[test]
    fn test_ldaps_forces_tls_flag_off() {
        let session = Session::new(Some("ldaps://ldap.example.com/"), true).unwrap();
        assert!(!session.tls_requested());
        assert_eq!(session.tls_mode(), TlsMode::Implicit);

        let session = Session::new(Some("ldap://ldap.example.com/"), true).unwrap();
        assert!(session.tls_requested());
        assert_eq!(session.tls_mode(), TlsMode::StartTls);
    }

    #[tokio::test]
    async fn test_operations_require_connection() {
        let directory = fixtures::sample_directory().build();
        let mut session = session(&directory, "ldap://mock/", false);

        assert!(session.search(SearchRequest::new("")).await.unwrap_err().is_not_connected());
        assert!(session.get_entry(fixtures::BASE_DN).await.unwrap_err().is_not_connected());
        assert!(session.get_root_dse().await.unwrap_err().is_not_connected());
        assert!(session.delete_entry("").await.unwrap_err().is_not_connected());
        assert!(session.whoami().await.unwrap_err().is_not_connected());
        assert_eq!(directory.stats().initialize_calls(), 0);
    }

    #[tokio::test]
    async fn test_protocol_version_is_set_before_bind() {
        let directory = fixtures::sample_directory().build();
        let mut session = session(&directory, "ldap://mock/", false);
        session.connect(BindOptions::new()).await.unwrap();

        let stats = directory.stats();
        assert_eq!(stats.protocol_versions, vec![ProtocolVersion::V3]);
        assert_eq!(stats.start_tls_calls, 0);
        assert_eq!(stats.bind_calls(), 1);
    }

    #[tokio::test]
    async fn test_drop_releases_handle_without_unbind() {
        let directory = fixtures::sample_directory().build();
        {
            let mut session = session(&directory, "ldap://mock/", false);
            session.connect(BindOptions::new()).await.unwrap();
            assert_eq!(directory.stats().open_handles(), 1);
        }
        let stats = directory.stats();
        assert_eq!(stats.unbind_calls, 0);
        assert_eq!(stats.open_handles(), 0);
    }

    #[tokio::test]
    async fn test_debug_does_not_leak_internals() {
        let directory = fixtures::sample_directory().build();
        let session = session(&directory, "ldap://mock/", true);
        let rendered = format!("{session:?}");
        assert!(rendered.contains("ldap://mock/"));
        assert!(rendered.contains("StartTls"));
    }
}
