//! Error types for cfpush.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("platform API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("invalid route format: {0}")]
    InvalidRouteFormat(String),

    #[error("conflicting route attributes: {0}")]
    ConflictingAttributes(String),

    #[error("no domain found for route: {0}")]
    DomainNotFound(String),

    #[error("missing port for tcp route: {0}")]
    MissingPort(String),

    #[error("port is only supported on tcp domains: {0}")]
    UnsupportedPort(String),

    #[error("no service instance named {0}")]
    ServiceNotFound(String),

    #[error("more than one application named {0}")]
    AmbiguousApplication(String),

    #[error("unsupported: {0}")]
    Unsupported(String),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, Error>;
