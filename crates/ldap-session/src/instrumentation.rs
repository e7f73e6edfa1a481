//! Tracing instrumentation for directory operations.
//!
//! Every network operation of a [`Session`](crate::Session) runs inside a
//! `tracing` span. Span names and field keys follow the OpenTelemetry
//! semantic conventions where one exists:
//!
//! - `server.address`, `server.port`: server endpoint
//! - `ldap.base`, `ldap.scope`, `ldap.filter`: search request
//! - `ldap.entries`: number of entries returned
//! - `error.type`: [`Error::kind`](crate::Error::kind) of a failure
//!
//! Credentials are never recorded. Filters are recorded up to
//! [`MAX_FILTER_LENGTH`] bytes.

use tracing::Span;

use ldap_proto::ConnectionDescriptor;

use crate::error::Error;
use crate::search::SearchRequest;

/// Directory system identifier.
pub const SYSTEM: &str = "ldap";

/// Longest filter text recorded on a span.
pub const MAX_FILTER_LENGTH: usize = 512;

/// Span names for directory operations.
pub mod span_names {
    /// Span name for connection establishment and bind.
    pub const CONNECT: &str = "ldap.connect";
    /// Span name for searches.
    pub const SEARCH: &str = "ldap.search";
    /// Span name for entry deletion.
    pub const DELETE: &str = "ldap.delete";
    /// Span name for the "Who am I?" operation.
    pub const WHOAMI: &str = "ldap.whoami";
    /// Span name for unbind.
    pub const UNBIND: &str = "ldap.unbind";
}

/// Field keys used on spans.
pub mod attributes {
    /// Directory system type.
    pub const SYSTEM: &str = "db.system";
    /// Server hostname.
    pub const SERVER_ADDRESS: &str = "server.address";
    /// Server port.
    pub const SERVER_PORT: &str = "server.port";
    /// TLS mode.
    pub const TLS_MODE: &str = "ldap.tls_mode";
    /// Bind method.
    pub const BIND_METHOD: &str = "ldap.bind_method";
    /// Search base.
    pub const BASE: &str = "ldap.base";
    /// Search scope.
    pub const SCOPE: &str = "ldap.scope";
    /// Search filter.
    pub const FILTER: &str = "ldap.filter";
    /// Number of entries returned.
    pub const ENTRIES: &str = "ldap.entries";
    /// Target DN.
    pub const DN: &str = "ldap.dn";
    /// Error type.
    pub const ERROR_TYPE: &str = "error.type";
}

/// Span factory bound to one server endpoint.
#[derive(Debug, Clone)]
pub struct InstrumentationContext {
    server_address: String,
    server_port: u16,
}

impl InstrumentationContext {
    /// Create a context for the server named by `descriptor`.
    #[must_use]
    pub fn new(descriptor: &ConnectionDescriptor) -> Self {
        Self {
            server_address: descriptor.host.clone(),
            server_port: descriptor.port,
        }
    }

    /// Span for connect and bind.
    #[must_use]
    pub fn connect_span(&self, tls_mode: &str, bind_method: &str) -> Span {
        tracing::info_span!(
            "ldap.connect",
            db.system = SYSTEM,
            server.address = %self.server_address,
            server.port = self.server_port,
            ldap.tls_mode = tls_mode,
            ldap.bind_method = bind_method,
            "error.type" = tracing::field::Empty,
        )
    }

    /// Span for a search. `ldap.entries` is filled in on completion.
    #[must_use]
    pub fn search_span(&self, request: &SearchRequest) -> Span {
        tracing::info_span!(
            "ldap.search",
            db.system = SYSTEM,
            server.address = %self.server_address,
            server.port = self.server_port,
            ldap.base = %request.base,
            ldap.scope = %request.scope,
            ldap.filter = %truncate(request.effective_filter().unwrap_or(""), MAX_FILTER_LENGTH),
            ldap.entries = tracing::field::Empty,
            "error.type" = tracing::field::Empty,
        )
    }

    /// Span for an entry deletion.
    #[must_use]
    pub fn delete_span(&self, dn: &str) -> Span {
        tracing::info_span!(
            "ldap.delete",
            db.system = SYSTEM,
            server.address = %self.server_address,
            server.port = self.server_port,
            ldap.dn = %dn,
            "error.type" = tracing::field::Empty,
        )
    }

    /// Span for the "Who am I?" operation.
    #[must_use]
    pub fn whoami_span(&self) -> Span {
        tracing::info_span!(
            "ldap.whoami",
            db.system = SYSTEM,
            server.address = %self.server_address,
            server.port = self.server_port,
            "error.type" = tracing::field::Empty,
        )
    }

    /// Span for unbind.
    #[must_use]
    pub fn unbind_span(&self) -> Span {
        tracing::debug_span!(
            "ldap.unbind",
            db.system = SYSTEM,
            server.address = %self.server_address,
            server.port = self.server_port,
            "error.type" = tracing::field::Empty,
        )
    }

    /// Record a failure on `span`.
    pub fn record_error(span: &Span, error: &Error) {
        span.record(attributes::ERROR_TYPE, error.kind());
    }

    /// Record the number of returned entries on `span`.
    pub fn record_entries(span: &Span, entries: usize) {
        span.record(attributes::ENTRIES, entries);
    }
}

/// Truncate on a character boundary.
fn truncate(s: &str, max_len: usize) -> &str {
    if s.len() <= max_len {
        return s;
    }
    let mut end = max_len;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}
