// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! HTTP response types

use bytes::Bytes;
use reqwest::header::{HeaderMap, CONTENT_TYPE, SET_COOKIE};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use url::Url;

use crate::charset::Charset;
use crate::error::{Error, Result};

/// Outcome of one send.
///
/// Check [`Response::error`] before trusting the other fields: when it is
/// set, status, headers and body hold whatever was known at the point of
/// failure (usually nothing).
#[derive(Debug, Default)]
pub struct Response {
    /// Response status code
    pub status: StatusCode,
    /// Response headers
    pub headers: HeaderMap,
    /// Raw response body, never decoded
    pub body: Bytes,
    /// Final URL (after redirects)
    pub url: Option<Url>,
    /// Charset declared by the Content-Type header, if supported
    pub encoding: Option<Charset>,
    /// Terminal failure of the send
    pub error: Option<Error>,
}

impl Response {
    /// Create a successful response
    pub fn new(
        status: StatusCode,
        headers: HeaderMap,
        body: Bytes,
        url: Url,
        encoding: Option<Charset>,
    ) -> Self {
        Self {
            status,
            headers,
            body,
            url: Some(url),
            encoding,
            error: None,
        }
    }

    /// Create a response carrying only an error
    pub fn from_error(error: Error) -> Self {
        Self {
            error: Some(error),
            ..Default::default()
        }
    }

    /// True when the send completed without error
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    /// Borrow the terminal error, if any
    pub fn error(&self) -> Option<&Error> {
        self.error.as_ref()
    }

    /// Turn into a `Result`, moving the error out
    pub fn into_result(mut self) -> Result<Self> {
        match self.error.take() {
            Some(err) => Err(err),
            None => Ok(self),
        }
    }

    /// Check if status is success (2xx)
    pub fn is_success(&self) -> bool {
        self.is_ok() && self.status.is_success()
    }

    /// Get status code as u16
    pub fn status_code(&self) -> u16 {
        self.status.as_u16()
    }

    /// Decode the body with the declared charset, falling back to UTF-8
    pub fn text(&self) -> String {
        self.text_with(self.encoding.unwrap_or_default())
    }

    /// Decode the body with an explicit charset
    pub fn text_with(&self, charset: Charset) -> String {
        charset.decode(&self.body).into_owned()
    }

    /// Parse body as JSON
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_slice(&self.body).map_err(Error::from)
    }

    /// Get a header value
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Get all values for a header
    pub fn header_all(&self, name: &str) -> Vec<&str> {
        self.headers
            .get_all(name)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .collect()
    }

    /// Get content type
    pub fn content_type(&self) -> Option<&str> {
        self.header(CONTENT_TYPE.as_str())
    }

    /// Get Set-Cookie headers
    pub fn set_cookies(&self) -> Vec<&str> {
        self.header_all(SET_COOKIE.as_str())
    }

    /// Get the final URL as string
    pub fn url_str(&self) -> Option<&str> {
        self.url.as_ref().map(Url::as_str)
    }

    /// Get raw body bytes
    pub fn bytes(&self) -> &Bytes {
        &self.body
    }
}
