// Error types for the Phobos framework

use crate::HttpStatus;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// Any dependency-resolution failure: unresolvable dependency (untyped,
    /// primitive, union, intersection), circular dependency (the message
    /// names the chain), invalid callback shape, non-instantiable target.
    #[error("Container error: {0}")]
    Container(String),

    /// No registered route matches method+path, or URL generation was
    /// attempted against an unregistered route name.
    #[error("Route not found: {0}")]
    RouteNotFound(String),

    #[error("Duplicate route name: {0}")]
    DuplicateRouteName(String),

    #[error("Missing route parameters: {0}")]
    MissingRouteParameters(String),

    #[error("Invalid route pattern: {0}")]
    InvalidRoutePattern(String),

    /// HTTP-semantic error raised by application code. The core never
    /// translates these into responses; they propagate to the caller.
    #[error("{0}")]
    Http(HttpException),
}

impl Error {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Error::RouteNotFound(_) => HttpStatus::NotFound.code(),
            Error::Http(e) => e.status,
            Error::Container(_)
            | Error::DuplicateRouteName(_)
            | Error::MissingRouteParameters(_)
            | Error::InvalidRoutePattern(_) => HttpStatus::InternalServerError.code(),
        }
    }

    /// Check if this is a client error (4xx)
    pub fn is_client_error(&self) -> bool {
        HttpStatus::from_code(self.status_code())
            .map(|s| s.is_client_error())
            .unwrap_or(false)
    }

    /// Check if this is a server error (5xx)
    pub fn is_server_error(&self) -> bool {
        HttpStatus::from_code(self.status_code())
            .map(|s| s.is_server_error())
            .unwrap_or(true)
    }
}

/// An HTTP-facing error value: status code, short label, optional response
/// headers, and a human-readable message.
#[derive(Debug, Clone)]
pub struct HttpException {
    pub status: u16,
    pub label: String,
    pub message: String,
    pub headers: HashMap<String, String>,
}

impl HttpException {
    /// Create an exception for an arbitrary status code. The label defaults
    /// to the standard reason phrase when the code is known.
    pub fn new(status: u16, message: impl Into<String>) -> Self {
        let label = HttpStatus::from_code(status)
            .map(|s| s.reason().to_string())
            .unwrap_or_else(|| format!("HTTP {status}"));
        Self {
            status,
            label,
            message: message.into(),
            headers: HashMap::new(),
        }
    }

    /// Attach a response header to carry alongside the error
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(400, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(401, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(403, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(404, message)
    }

    pub fn unprocessable(message: impl Into<String>) -> Self {
        Self::new(422, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(500, message)
    }
}

impl std::fmt::Display for HttpException {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}: {}", self.status, self.label, self.message)
    }
}

impl From<HttpException> for Error {
    fn from(exception: HttpException) -> Self {
        Error::Http(exception)
    }
}
