//! Error taxonomy for bootstrapping.
//!
//! # Data Flow
//! ```text
//! io::Error from a bind
//!     → BindError (classified: in use / permission / address / other)
//!     → PortBinder decides: retry (in use + auto-listen) or surface
//!     → ListenError returned to the caller of `listen`
//!
//! Hook / adapter / transport failure
//!     → InitError returned to every caller of `init`
//! ```

use std::io;

use thiserror::Error;

/// Classification of a failed bind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindErrorKind {
    /// The port is already taken by another listener.
    AddrInUse,
    /// The process may not bind this port (e.g. privileged port).
    PermissionDenied,
    /// The host does not resolve to a local address.
    AddrNotAvailable,
    /// Malformed host or a request the transport rejects outright.
    InvalidInput,
    /// Anything else reported by the network stack.
    Other,
}

impl BindErrorKind {
    /// Map an I/O error kind onto a bind classification.
    pub fn classify(kind: io::ErrorKind) -> Self {
        match kind {
            io::ErrorKind::AddrInUse => BindErrorKind::AddrInUse,
            io::ErrorKind::PermissionDenied => BindErrorKind::PermissionDenied,
            io::ErrorKind::AddrNotAvailable => BindErrorKind::AddrNotAvailable,
            io::ErrorKind::InvalidInput => BindErrorKind::InvalidInput,
            _ => BindErrorKind::Other,
        }
    }

    /// Standardized error code, as reported by POSIX network stacks.
    pub fn code(&self) -> &'static str {
        match self {
            BindErrorKind::AddrInUse => "EADDRINUSE",
            BindErrorKind::PermissionDenied => "EACCES",
            BindErrorKind::AddrNotAvailable => "EADDRNOTAVAIL",
            BindErrorKind::InvalidInput => "EINVAL",
            BindErrorKind::Other => "EUNKNOWN",
        }
    }
}

/// A single failed attempt to bind a port.
#[derive(Debug, Error)]
#[error("{code}: failed to bind port {port}: {source}", code = .kind.code())]
pub struct BindError {
    pub port: u16,
    pub kind: BindErrorKind,
    #[source]
    pub source: io::Error,
}

impl BindError {
    /// Wrap an I/O error, classifying it by its kind.
    pub fn from_io(port: u16, source: io::Error) -> Self {
        Self {
            port,
            kind: BindErrorKind::classify(source.kind()),
            source,
        }
    }

    /// Build an error that did not come from the network stack.
    pub fn other(port: u16, kind: io::ErrorKind, message: impl Into<String>) -> Self {
        Self::from_io(port, io::Error::new(kind, message.into()))
    }

    pub fn is_addr_in_use(&self) -> bool {
        self.kind == BindErrorKind::AddrInUse
    }

    pub fn code(&self) -> &'static str {
        self.kind.code()
    }
}

/// Failure while bringing an application or microservice up.
///
/// Cloneable so that an eager hybrid initialization failure can be
/// replayed to whoever awaits the instance's readiness later.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InitError {
    #[error("module `{module}` failed during {hook}: {message}")]
    Module {
        module: String,
        hook: &'static str,
        message: String,
    },
    #[error("http adapter `{adapter}` failed to initialize: {message}")]
    Adapter { adapter: String, message: String },
    #[error("transport `{transport}` failed to initialize: {message}")]
    Transport { transport: String, message: String },
}

/// Failure of a `listen` request.
#[derive(Debug, Error)]
pub enum ListenError {
    /// The port was busy and no retry was permitted.
    #[error("EADDRINUSE: port {port} is already in use")]
    AddressInUse {
        port: u16,
        #[source]
        source: BindError,
    },
    /// Any other bind failure. Never retried.
    #[error(transparent)]
    Bind(BindError),
    /// Every candidate port in the retry window was busy.
    #[error("EADDRINUSE: retries exhausted after {attempts} attempts (ports {first}..={last} in use)")]
    RetryExhausted { first: u16, last: u16, attempts: u32 },
    #[error(transparent)]
    Init(#[from] InitError),
}

impl ListenError {
    /// Standardized code of the underlying failure, if it was a bind failure.
    pub fn code(&self) -> Option<&'static str> {
        match self {
            ListenError::AddressInUse { .. } | ListenError::RetryExhausted { .. } => {
                Some(BindErrorKind::AddrInUse.code())
            }
            ListenError::Bind(err) => Some(err.code()),
            ListenError::Init(_) => None,
        }
    }
}

impl From<BindError> for ListenError {
    fn from(err: BindError) -> Self {
        if err.is_addr_in_use() {
            ListenError::AddressInUse {
                port: err.port,
                source: err,
            }
        } else {
            ListenError::Bind(err)
        }
    }
}
