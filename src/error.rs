// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Error types for simplehttp
//!
//! Every failure a send can hit ends up in [`crate::Response::error`] instead of
//! aborting the call chain. The variants follow three broad classes: request
//! construction, transport and body decoding.

use thiserror::Error;

/// Result type alias for simplehttp operations
pub type Result<T> = std::result::Result<T, Error>;

/// Message fragment that marks an error as a transient cancellation.
pub const TRANSIENT_CANCELLATION: &str = "request canceled";

/// Main error type for simplehttp
#[derive(Error, Debug)]
pub enum Error {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// URL parsing failed
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// Method name is not a valid HTTP token
    #[error("Invalid method: {0}")]
    InvalidMethod(String),

    /// Header name or value rejected
    #[error("Invalid header '{name}': {reason}")]
    InvalidHeader { name: String, reason: String },

    /// Network failure below HTTP (DNS, connect, reset)
    #[error("Network error: {0}")]
    Network(String),

    /// The request was canceled mid-flight, usually by a timeout
    #[error("request canceled: {0}")]
    Canceled(String),

    /// Response body could not be read in full
    #[error("Body read error: {0}")]
    Body(String),

    /// Cookie handling error
    #[error("Cookie error: {0}")]
    Cookie(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a new network error
    pub fn network<S: Into<String>>(msg: S) -> Self {
        Error::Network(msg.into())
    }

    /// Create a cancellation error
    pub fn canceled<S: Into<String>>(reason: S) -> Self {
        Error::Canceled(reason.into())
    }

    /// Create a body read error
    pub fn body<S: Into<String>>(msg: S) -> Self {
        Error::Body(msg.into())
    }

    /// Create an invalid header error
    pub fn invalid_header(name: impl Into<String>, reason: impl ToString) -> Self {
        Error::InvalidHeader {
            name: name.into(),
            reason: reason.to_string(),
        }
    }

    /// Create a generic error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        Error::Other(msg.into())
    }

    /// Check if this is a cancellation error
    pub fn is_canceled(&self) -> bool {
        matches!(self, Error::Canceled(_))
    }

    /// Check if the error was raised while building the request,
    /// before anything went over the wire
    pub fn is_construction(&self) -> bool {
        matches!(
            self,
            Error::Url(_)
                | Error::InvalidMethod(_)
                | Error::InvalidHeader { .. }
                | Error::Serialization(_)
        )
    }

    /// Check if this is a network error
    pub fn is_network(&self) -> bool {
        matches!(self, Error::Network(_) | Error::Http(_) | Error::Canceled(_))
    }
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Other(s)
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Error::Other(s.to_string())
    }
}

/// Decide whether a failed attempt may be retried.
///
/// Only errors whose message carries [`TRANSIENT_CANCELLATION`] qualify. The
/// match is done on the rendered message so that transports which only report
/// text (and wrapped errors) are classified the same way.
pub fn is_transient_cancellation(err: &Error) -> bool {
    err.to_string().contains(TRANSIENT_CANCELLATION)
}
