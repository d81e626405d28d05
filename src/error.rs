//! Typed error hierarchy for the armis-client crate.
//!
//! `ArmisError` separates failures by the boundary they crossed, so callers
//! can tell "never reached the server" (`Network`) apart from "the server
//! rejected the request" (`Api`) and from "we could not obtain a token"
//! (`Auth`, `MissingCredential`).
//!
//! - `Auth` wraps every way the token exchange can fail (transport error,
//!   non-2xx status, malformed envelope, `success: false`, bad timestamp).
//!   The underlying cause is reachable through `source()`.
//! - `Api` preserves the status and raw body of any non-2xx response from a
//!   non-auth endpoint. It is never retried by the client.
//! - `Network` carries transport-level `reqwest::Error`s (DNS, TCP, TLS,
//!   timeouts) for regular requests, unchanged.

use reqwest::StatusCode;

/// Unified error type for all armis-client operations.
#[derive(Debug, thiserror::Error)]
pub enum ArmisError {
    /// The client was constructed without a secret key.
    #[error("no API secret key was supplied")]
    MissingCredential,

    /// Obtaining an access token failed.
    ///
    /// Raised during construction (terminal: no client is produced) and
    /// during a lazy refresh (aborts only the triggering request).
    #[error("authentication failed: {message}")]
    Auth {
        /// What went wrong, including HTTP status when there was one.
        message: String,
        /// The underlying transport, parse, or API error, if any.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The API returned a non-success HTTP status code.
    #[error("API error {status}: {body}")]
    Api {
        /// The HTTP status code returned by the API.
        status: StatusCode,
        /// The raw response body, or an empty string if it could not be read.
        body: String,
    },

    /// A caller-supplied identifier cannot be addressed as a single path
    /// segment (empty, `.` or `..`). No request is sent.
    #[error("invalid resource identifier {0:?}")]
    InvalidIdentifier(String),

    /// A JSON body could not be encoded or decoded.
    #[error("failed to parse response: {0}")]
    Parse(#[from] serde_json::Error),

    /// The request never produced an HTTP response (connectivity, timeout).
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl ArmisError {
    /// Builds an `Auth` error with a chained cause.
    pub(crate) fn auth<E>(message: impl Into<String>, source: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        ArmisError::Auth {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Returns the HTTP status carried by an `Api` error.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ArmisError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// True for failures to obtain a token, including a missing secret.
    pub fn is_auth(&self) -> bool {
        matches!(self, ArmisError::Auth { .. } | ArmisError::MissingCredential)
    }
}

/// Convenience alias used throughout the library.
pub type Result<T> = std::result::Result<T, ArmisError>;
