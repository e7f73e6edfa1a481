//! rustls client configuration for LDAP connections.

use std::sync::Arc;

use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::crypto::WebPkiSupportedAlgorithms;
use rustls::pki_types::{CertificateDer, ServerName, UnixTime};
use rustls::{ClientConfig, DigitallySignedStruct, RootCertStore, SignatureScheme};

use crate::config::{TlsConfig, TlsVersion};
use crate::error::TlsError;

/// Accepts any server certificate.
///
/// Handshake signatures are still checked, so the peer must hold the key of
/// the certificate it presents.
#[derive(Debug)]
struct AcceptAnyServerCert {
    algorithms: WebPkiSupportedAlgorithms,
}

impl ServerCertVerifier for AcceptAnyServerCert {
    fn verify_server_cert(
        &self,
        _end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: UnixTime,
    ) -> Result<ServerCertVerified, rustls::Error> {
        Ok(ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        rustls::crypto::verify_tls12_signature(message, cert, dss, &self.algorithms)
    }

    fn verify_tls13_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        rustls::crypto::verify_tls13_signature(message, cert, dss, &self.algorithms)
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.algorithms.supported_schemes()
    }
}

/// Build the rustls client configuration for `config`.
///
/// The ring provider is used explicitly so the result does not depend on a
/// process-wide default provider being installed.
pub fn build_client_config(config: &TlsConfig) -> Result<Arc<ClientConfig>, TlsError> {
    let provider = Arc::new(rustls::crypto::ring::default_provider());
    let versions = select_versions(config)?;

    let builder = ClientConfig::builder_with_provider(Arc::clone(&provider))
        .with_protocol_versions(&versions)?;

    let builder = if config.trust_server_certificate {
        tracing::warn!(
            "trust_server_certificate is enabled: server certificates are NOT validated. \
             Use this only for development and testing."
        );
        builder
            .dangerous()
            .with_custom_certificate_verifier(Arc::new(AcceptAnyServerCert {
                algorithms: provider.signature_verification_algorithms,
            }))
    } else {
        builder.with_root_certificates(build_root_store(config)?)
    };

    let client_config = match &config.client_auth {
        Some(client_auth) => builder
            .with_client_auth_cert(client_auth.certificates.clone(), client_auth.key.clone_key())
            .map_err(|e| TlsError::Configuration(format!("client auth setup failed: {e}")))?,
        None => builder.with_no_client_auth(),
    };

    tracing::debug!(
        versions = ?versions.iter().map(|v| v.version).collect::<Vec<_>>(),
        custom_roots = config.root_certificates.len(),
        client_auth = config.has_client_auth(),
        "built TLS client configuration"
    );

    Ok(Arc::new(client_config))
}

fn build_root_store(config: &TlsConfig) -> Result<RootCertStore, TlsError> {
    let mut root_store = RootCertStore::empty();

    if config.root_certificates.is_empty() {
        root_store.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
    } else {
        for cert in &config.root_certificates {
            root_store
                .add(cert.clone())
                .map_err(|e| TlsError::InvalidCertificate(e.to_string()))?;
        }
    }

    Ok(root_store)
}

fn select_versions(
    config: &TlsConfig,
) -> Result<Vec<&'static rustls::SupportedProtocolVersion>, TlsError> {
    if config.min_protocol_version > config.max_protocol_version {
        return Err(TlsError::Configuration(format!(
            "minimum TLS version {:?} is above maximum {:?}",
            config.min_protocol_version, config.max_protocol_version
        )));
    }

    Ok([TlsVersion::Tls12, TlsVersion::Tls13]
        .into_iter()
        .filter(|v| *v >= config.min_protocol_version && *v <= config.max_protocol_version)
        .map(|v| v.to_rustls())
        .collect())
}
