//! PEM loading for certificates and keys.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use rustls::pki_types::{CertificateDer, PrivateKeyDer};

use crate::error::TlsError;

/// Parse every certificate in a PEM stream.
///
/// A stream without any certificate is an error.
pub fn parse_certificates(reader: &mut dyn BufRead) -> Result<Vec<CertificateDer<'static>>, TlsError> {
    let certs = rustls_pemfile::certs(reader)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| TlsError::InvalidCertificate(e.to_string()))?;
    if certs.is_empty() {
        return Err(TlsError::InvalidCertificate(
            "no certificates found in PEM input".into(),
        ));
    }
    Ok(certs)
}

/// Parse the first private key (PKCS#1, PKCS#8 or SEC1) in a PEM stream.
pub fn parse_private_key(reader: &mut dyn BufRead) -> Result<PrivateKeyDer<'static>, TlsError> {
    rustls_pemfile::private_key(reader)
        .map_err(|e| TlsError::InvalidPrivateKey(e.to_string()))?
        .ok_or_else(|| TlsError::InvalidPrivateKey("no private key found in PEM input".into()))
}

/// Load every certificate from a PEM file.
pub fn load_certificates(path: impl AsRef<Path>) -> Result<Vec<CertificateDer<'static>>, TlsError> {
    let path = path.as_ref();
    tracing::debug!(path = %path.display(), "loading PEM certificates");
    let mut reader = BufReader::new(File::open(path)?);
    parse_certificates(&mut reader)
}

/// Load the first private key from a PEM file.
pub fn load_private_key(path: impl AsRef<Path>) -> Result<PrivateKeyDer<'static>, TlsError> {
    let path = path.as_ref();
    tracing::debug!(path = %path.display(), "loading PEM private key");
    let mut reader = BufReader::new(File::open(path)?);
    parse_private_key(&mut reader)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input_has_no_certificates() {
        let mut input: &[u8] = b"";
        assert!(matches!(
            parse_certificates(&mut input),
            Err(TlsError::InvalidCertificate(_))
        ));
    }

    #[test]
    fn test_certificate_is_not_a_key() {
        let mut input: &[u8] =
            b"-----BEGIN CERTIFICATE-----\nMAA=\n-----END CERTIFICATE-----\n";
        assert!(matches!(
            parse_private_key(&mut input),
            Err(TlsError::InvalidPrivateKey(_))
        ));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        assert!(matches!(
            load_certificates("/nonexistent/ca.pem"),
            Err(TlsError::Io(_))
        ));
    }
}
