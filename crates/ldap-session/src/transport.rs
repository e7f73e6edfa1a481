//! Transport backed by the `ldap3` crate.
//!
//! `ldap3` owns BER framing, socket I/O and TLS. This module adapts it to
//! the [`Transport`] contract:
//!
//! - the connection is opened lazily by the first operation, or by
//!   [`Transport::start_tls`], which opens it with StartTLS enabled
//! - `ldaps://` URLs use implicit TLS with the same rustls configuration
//! - search responses are streamed through `Ldap::streaming_search`
//!
//! A connection driver task is spawned per connection and aborted when the
//! handle is dropped.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use ldap3::exop::WhoAmI;
use ldap3::result::ExopResult;
use ldap3::{
    Ldap, LdapConnAsync, LdapConnSettings, LdapError, LdapResult, SearchEntry, SearchOptions,
    SearchStream,
};
use ldap_proto::{
    BoxResponseStream, ConnectionDescriptor, Connector, LdapOutcome, ProtocolError,
    ProtocolVersion, RawEntry, ResponseStream, ResultCode, SaslInteract, SaslPrompt,
    SaslPromptKind, Scope, SearchItem, SearchParams, Transport,
};
use rustls::ClientConfig;
use tokio::task::JoinHandle;

use crate::config::SessionConfig;
use crate::error::Error;

/// Creates [`Ldap3Transport`] handles.
#[derive(Clone)]
pub struct Ldap3Connector {
    tls: Arc<ClientConfig>,
    connect_timeout: Duration,
}

impl Ldap3Connector {
    /// Create a connector from a session configuration.
    ///
    /// Builds the rustls client configuration up front so that certificate
    /// problems surface before any network activity.
    pub fn new(config: &SessionConfig) -> Result<Self, Error> {
        let tls = ldap_tls::build_client_config(&config.tls)?;
        Ok(Self {
            tls,
            connect_timeout: config.timeouts.connect_timeout,
        })
    }
}

impl std::fmt::Debug for Ldap3Connector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ldap3Connector")
            .field("connect_timeout", &self.connect_timeout)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Connector for Ldap3Connector {
    type Transport = Ldap3Transport;

    async fn initialize(
        &self,
        descriptor: &ConnectionDescriptor,
    ) -> Result<Ldap3Transport, ProtocolError> {
        tracing::trace!(url = %descriptor.to_connection_url(), "ldap3 handle initialized");
        Ok(Ldap3Transport {
            url: descriptor.to_connection_url(),
            host: descriptor.host.trim_matches(['[', ']']).to_string(),
            tls: Arc::clone(&self.tls),
            connect_timeout: self.connect_timeout,
            version: ProtocolVersion::V3,
            ldap: None,
            driver: None,
        })
    }
}

/// One `ldap3` connection.
pub struct Ldap3Transport {
    url: String,
    host: String,
    tls: Arc<ClientConfig>,
    connect_timeout: Duration,
    version: ProtocolVersion,
    ldap: Option<Ldap>,
    driver: Option<JoinHandle<()>>,
}

impl Ldap3Transport {
    async fn open(&mut self, start_tls: bool) -> Result<(), ProtocolError> {
        if self.version != ProtocolVersion::V3 {
            return Err(ProtocolError::Unsupported(format!(
                "LDAP protocol version {}",
                self.version as u8
            )));
        }

        let settings = LdapConnSettings::new()
            .set_conn_timeout(self.connect_timeout)
            .set_starttls(start_tls)
            .set_config(Arc::clone(&self.tls));

        tracing::debug!(url = %self.url, start_tls, "opening LDAP connection");
        let (conn, ldap) = LdapConnAsync::with_settings(settings, &self.url)
            .await
            .map_err(|e| {
                let err = map_ldap_error(e);
                match err {
                    ProtocolError::Connection(msg) if start_tls => ProtocolError::Tls(msg),
                    other => other,
                }
            })?;

        let driver = tokio::spawn(async move {
            if let Err(e) = conn.drive().await {
                tracing::warn!(error = %e, "LDAP connection driver error");
            }
        });

        self.ldap = Some(ldap);
        self.driver = Some(driver);
        Ok(())
    }

    async fn connection(&mut self) -> Result<&mut Ldap, ProtocolError> {
        if self.ldap.is_none() {
            self.open(false).await?;
        }
        self.ldap.as_mut().ok_or(ProtocolError::ConnectionClosed)
    }
}

impl std::fmt::Debug for Ldap3Transport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ldap3Transport")
            .field("url", &self.url)
            .field("host", &self.host)
            .field("version", &self.version)
            .field("connected", &self.ldap.is_some())
            .finish_non_exhaustive()
    }
}

impl Drop for Ldap3Transport {
    fn drop(&mut self) {
        if let Some(driver) = self.driver.take() {
            driver.abort();
        }
    }
}

#[async_trait]
impl Transport for Ldap3Transport {
    fn set_protocol_version(&mut self, version: ProtocolVersion) {
        self.version = version;
    }

    async fn start_tls(&mut self) -> Result<(), ProtocolError> {
        if self.ldap.is_some() {
            return Err(ProtocolError::Tls(
                "StartTLS must precede any other operation".into(),
            ));
        }
        self.open(true).await
    }

    async fn simple_bind(
        &mut self,
        dn: &str,
        password: &str,
    ) -> Result<LdapOutcome, ProtocolError> {
        let ldap = self.connection().await?;
        let result = ldap.simple_bind(dn, password).await.map_err(map_ldap_error)?;
        Ok(outcome(result))
    }

    async fn sasl_interactive_bind(
        &mut self,
        dn: Option<&str>,
        mechanism: &str,
        interact: &dyn SaslInteract,
    ) -> Result<LdapOutcome, ProtocolError> {
        if dn.is_some_and(|d| !d.is_empty()) {
            tracing::debug!("SASL bind DN is not sent by this transport");
        }
        let answer = |kind| interact.answer(&SaslPrompt::new(kind));

        let result = match mechanism.to_ascii_uppercase().as_str() {
            "EXTERNAL" => {
                if !answer(SaslPromptKind::User).is_empty() {
                    return Err(ProtocolError::Sasl(
                        "EXTERNAL with an authorization identity is not supported".into(),
                    ));
                }
                let ldap = self.connection().await?;
                ldap.sasl_external_bind().await
            }
            #[cfg(feature = "gssapi")]
            "GSSAPI" => {
                let host = self.host.clone();
                let ldap = self.connection().await?;
                ldap.sasl_gssapi_bind(&host).await
            }
            #[cfg(feature = "ntlm")]
            "NTLM" => {
                let user = answer(SaslPromptKind::AuthName);
                let password = answer(SaslPromptKind::Pass);
                let ldap = self.connection().await?;
                ldap.sasl_ntlm_bind(&user, &password).await
            }
            other => return Err(ProtocolError::Unsupported(other.to_string())),
        };

        Ok(outcome(result.map_err(map_ldap_error)?))
    }

    async fn search(
        &mut self,
        params: &SearchParams,
    ) -> Result<BoxResponseStream, ProtocolError> {
        let ldap = self.connection().await?;

        let mut options = SearchOptions::new()
            .sizelimit(clamp_i32(u64::from(params.size_limit)))
            .typesonly(params.attrs_only);
        if let Some(limit) = params.time_limit {
            options = options.timelimit(clamp_i32(whole_seconds(limit)));
            ldap.with_timeout(limit);
        }
        ldap.with_search_options(options);

        let attributes = params.attributes.clone().unwrap_or_default();
        let stream = ldap
            .streaming_search(
                &params.base,
                to_ldap3_scope(params.scope),
                params.effective_filter(),
                attributes,
            )
            .await
            .map_err(map_ldap_error)?;

        Ok(Box::new(Ldap3ResponseStream {
            stream,
            finished: false,
        }))
    }

    async fn delete(&mut self, dn: &str) -> Result<LdapOutcome, ProtocolError> {
        let ldap = self.connection().await?;
        let result = ldap.delete(dn).await.map_err(map_ldap_error)?;
        Ok(outcome(result))
    }

    async fn whoami(&mut self) -> Result<(LdapOutcome, String), ProtocolError> {
        let ldap = self.connection().await?;
        let ExopResult(exop, result) =
            ldap.extended(WhoAmI).await.map_err(map_ldap_error)?;
        let identity = exop
            .val
            .map(|v| String::from_utf8_lossy(&v).into_owned())
            .unwrap_or_default();
        Ok((outcome(result), identity))
    }

    async fn unbind(&mut self) -> Result<(), ProtocolError> {
        let Some(mut ldap) = self.ldap.take() else {
            // Never connected: nothing to send.
            return Ok(());
        };
        let result = ldap.unbind().await.map_err(map_ldap_error);
        if let Some(driver) = self.driver.take() {
            driver.abort();
        }
        result
    }
}

/// Response stream over an `ldap3` streaming search.
struct Ldap3ResponseStream {
    stream: SearchStream<'static, String, Vec<String>>,
    finished: bool,
}

#[async_trait]
impl ResponseStream for Ldap3ResponseStream {
    async fn next_item(&mut self) -> Result<Option<SearchItem>, ProtocolError> {
        if self.finished {
            return Ok(None);
        }
        loop {
            match self.stream.next().await.map_err(map_ldap_error)? {
                Some(entry) if entry.is_ref() => {
                    return Ok(Some(SearchItem::Reference(ldap3::parse_refs(entry.0))));
                }
                Some(entry) if entry.is_intermediate() => {
                    tracing::trace!("skipping intermediate response");
                }
                Some(entry) => {
                    let entry = SearchEntry::construct(entry);
                    return Ok(Some(SearchItem::Entry(RawEntry {
                        dn: entry.dn,
                        attrs: entry.attrs,
                        bin_attrs: entry.bin_attrs,
                    })));
                }
                None => {
                    self.finished = true;
                    let result = self.stream.finish().await;
                    return Ok(Some(SearchItem::Done(outcome(result))));
                }
            }
        }
    }

    async fn abandon(&mut self) -> Result<(), ProtocolError> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        let ldap = self.stream.ldap_handle();
        let msgid = ldap.last_id();
        ldap.abandon(msgid).await.map_err(map_ldap_error)
    }
}

fn outcome(result: LdapResult) -> LdapOutcome {
    LdapOutcome::new(ResultCode::from_u32(result.rc), result.text).with_matched_dn(result.matched)
}

fn map_ldap_error(err: LdapError) -> ProtocolError {
    match err {
        LdapError::Io { source } => ProtocolError::from(source),
        LdapError::Timeout { .. } => ProtocolError::Timeout,
        LdapError::EndOfStream => ProtocolError::ConnectionClosed,
        other => ProtocolError::Connection(other.to_string()),
    }
}

fn to_ldap3_scope(scope: Scope) -> ldap3::Scope {
    match scope {
        Scope::Base => ldap3::Scope::Base,
        Scope::OneLevel => ldap3::Scope::OneLevel,
        Scope::Subtree => ldap3::Scope::Subtree,
    }
}

/// Round up to whole seconds so that sub-second bounds are not sent as zero.
fn whole_seconds(duration: Duration) -> u64 {
    let secs = duration.as_secs();
    if duration.subsec_nanos() > 0 {
        secs.saturating_add(1)
    } else {
        secs
    }
}

fn clamp_i32(value: u64) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whole_seconds_rounds_up() {
        assert_eq!(whole_seconds(Duration::from_secs(5)), 5);
        assert_eq!(whole_seconds(Duration::from_millis(1500)), 2);
        assert_eq!(whole_seconds(Duration::from_millis(1)), 1);
    }

    #[test]
    fn test_clamp() {
        assert_eq!(clamp_i32(10), 10);
        assert_eq!(clamp_i32(u64::from(u32::MAX)), i32::MAX);
    }

    #[test]
    fn test_outcome_keeps_server_text() {
        let result = LdapResult {
            rc: 32,
            matched: "dc=example,dc=com".into(),
            text: "entry does not exist".into(),
            refs: Vec::new(),
            ctrls: Vec::new(),
        };
        let outcome = outcome(result);
        assert_eq!(outcome.code, ResultCode::NoSuchObject);
        assert_eq!(outcome.matched_dn, "dc=example,dc=com");
        assert_eq!(outcome.diagnostic, "entry does not exist");
    }

    #[test]
    fn test_error_mapping() {
        assert!(matches!(
            map_ldap_error(LdapError::EndOfStream),
            ProtocolError::ConnectionClosed
        ));
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        assert!(matches!(
            map_ldap_error(LdapError::Io { source: io }),
            ProtocolError::Io(_)
        ));
    }

    #[tokio::test]
    async fn test_initialize_does_not_connect() {
        let connector = Ldap3Connector::new(&SessionConfig::default()).unwrap();
        let descriptor = ConnectionDescriptor::parse("ldap://[::1]:10389/").unwrap();
        let transport = connector.initialize(&descriptor).await.unwrap();
        assert!(transport.ldap.is_none());
        assert_eq!(transport.host, "::1");
        assert_eq!(transport.url, "ldap://[::1]:10389");
    }

    #[tokio::test]
    async fn test_unbind_without_connection_is_noop() {
        let connector = Ldap3Connector::new(&SessionConfig::default()).unwrap();
        let descriptor = ConnectionDescriptor::parse("ldap://localhost/").unwrap();
        let mut transport = connector.initialize(&descriptor).await.unwrap();
        assert!(transport.unbind().await.is_ok());
    }

    #[tokio::test]
    async fn test_external_with_authzid_fails_before_connecting() {
        struct Authzid;
        impl SaslInteract for Authzid {
            fn answer(&self, prompt: &SaslPrompt) -> String {
                match prompt.kind {
                    SaslPromptKind::User => "u:admin".into(),
                    _ => String::new(),
                }
            }
        }

        let connector = Ldap3Connector::new(&SessionConfig::default()).unwrap();
        let descriptor = ConnectionDescriptor::parse("ldap://localhost/").unwrap();
        let mut transport = connector.initialize(&descriptor).await.unwrap();
        let err = transport
            .sasl_interactive_bind(None, "external", &Authzid)
            .await
            .unwrap_err();
        assert!(matches!(err, ProtocolError::Sasl(_)));
        assert!(transport.ldap.is_none());
    }

    #[tokio::test]
    async fn test_v2_is_refused_before_connecting() {
        let connector = Ldap3Connector::new(&SessionConfig::default()).unwrap();
        let descriptor = ConnectionDescriptor::parse("ldap://localhost/").unwrap();
        let mut transport = connector.initialize(&descriptor).await.unwrap();
        transport.set_protocol_version(ProtocolVersion::V2);
        assert!(matches!(
            transport.delete("cn=x").await,
            Err(ProtocolError::Unsupported(_))
        ));
    }
}
