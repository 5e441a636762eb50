//! Error types for the prediction server.
//!
//! Covers binding the listener and serving connections. Request-level
//! failures never surface here; they become HTTP responses.

use std::{fmt, io};

/// Errors that can occur while starting or running the server.
#[derive(Debug)]
pub struct ServerError {
    kind: ServerErrorKind,
}

#[derive(Debug)]
enum ServerErrorKind {
    /// Failed to bind the listening socket.
    Bind {
        addr: std::net::SocketAddr,
        source: io::Error,
    },
    /// I/O error while accepting or serving connections.
    Io(io::Error),
}

impl fmt::Display for ServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ServerErrorKind::Bind { addr, source } => {
                write!(f, "failed to bind {addr}: {source}")
            }
            ServerErrorKind::Io(e) => write!(f, "I/O error: {e}"),
        }
    }
}

impl std::error::Error for ServerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self.kind {
            ServerErrorKind::Bind { source, .. } => Some(source),
            ServerErrorKind::Io(e) => Some(e),
        }
    }
}

impl ServerError {
    pub(crate) fn bind(addr: std::net::SocketAddr, source: io::Error) -> Self {
        Self {
            kind: ServerErrorKind::Bind { addr, source },
        }
    }

    pub(crate) fn io(err: io::Error) -> Self {
        Self {
            kind: ServerErrorKind::Io(err),
        }
    }

    /// Returns true if the listening socket could not be bound.
    pub fn is_bind(&self) -> bool {
        matches!(self.kind, ServerErrorKind::Bind { .. })
    }
}

impl From<io::Error> for ServerError {
    fn from(err: io::Error) -> Self {
        Self::io(err)
    }
}
