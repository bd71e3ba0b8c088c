// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Network transport
//!
//! The driver never touches sockets itself. It hands a fully prepared
//! [`TransportRequest`] to a [`Transport`] and gets back status, headers,
//! the drained body and the final URL. [`ReqwestTransport`] is the bundled
//! implementation; tests plug in stubs.
//!
//! A transport that follows redirects itself exposes a [`CookieJarSlot`] so
//! cookies are read and stored on every hop, not only the last one.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::redirect::Policy;
use reqwest::{Client, Method, StatusCode};
use url::Url;

use crate::error::{Error, Result};
use crate::http::{CookieJarSlot, DEFAULT_USER_AGENT};

/// A request ready to go over the wire
#[derive(Debug, Clone)]
pub struct TransportRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// What came back from the wire, body fully read
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
    /// Final URL after redirects
    pub url: Url,
}

/// Executes prepared requests.
///
/// Implementations must be safe to call from many sends at once. Errors
/// whose message contains `request canceled` are retried by the driver;
/// every other error ends the send.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Perform one request and read the whole response body
    async fn execute(&self, request: TransportRequest) -> Result<TransportResponse>;

    /// Jar slot this transport consults and updates on every hop.
    ///
    /// `None` means the transport ignores cookies, and the driver stores
    /// `Set-Cookie` from the response it gets back.
    fn cookie_slot(&self) -> Option<CookieJarSlot> {
        None
    }
}

/// Settings for [`ReqwestTransport`]
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// User agent string
    pub user_agent: String,
    /// Whole-request timeout (None = wait forever)
    pub timeout: Option<Duration>,
    /// Maximum redirects to follow
    pub max_redirects: usize,
    /// Accept invalid certificates (dangerous!)
    pub accept_invalid_certs: bool,
    /// Headers added to every request unless the request sets them
    pub default_headers: HeaderMap,
    /// Proxy URL
    pub proxy: Option<String>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        let mut default_headers = HeaderMap::new();
        default_headers.insert("accept", HeaderValue::from_static("*/*"));

        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: Some(Duration::from_secs(30)),
            max_redirects: 10,
            accept_invalid_certs: false,
            default_headers,
            proxy: None,
        }
    }
}

impl TransportConfig {
    /// Create a config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set user agent
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Disable timeout
    pub fn no_timeout(mut self) -> Self {
        self.timeout = None;
        self
    }

    /// Set max redirects (0 disables redirects)
    pub fn max_redirects(mut self, max: usize) -> Self {
        self.max_redirects = max;
        self
    }

    /// Accept invalid TLS certificates
    pub fn accept_invalid_certs(mut self, accept: bool) -> Self {
        self.accept_invalid_certs = accept;
        self
    }

    /// Add a default header. Invalid names or values are ignored.
    pub fn header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        if let (Ok(name), Ok(value)) = (
            HeaderName::try_from(name.as_ref()),
            HeaderValue::try_from(value.as_ref()),
        ) {
            self.default_headers.insert(name, value);
        }
        self
    }

    /// Set proxy
    pub fn proxy(mut self, proxy: impl Into<String>) -> Self {
        self.proxy = Some(proxy.into());
        self
    }
}

/// [`Transport`] backed by a `reqwest::Client`.
///
/// The client's cookie provider is a [`CookieJarSlot`]; clones of the
/// transport share it.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
    config: TransportConfig,
    cookies: CookieJarSlot,
}

impl ReqwestTransport {
    /// Create a transport with default configuration
    pub fn new() -> Result<Self> {
        Self::with_config(TransportConfig::default())
    }

    /// Create a transport with custom configuration
    pub fn with_config(config: TransportConfig) -> Result<Self> {
        let redirect = if config.max_redirects == 0 {
            Policy::none()
        } else {
            Policy::limited(config.max_redirects)
        };

        let cookies = CookieJarSlot::new();
        let mut builder = Client::builder()
            .user_agent(&config.user_agent)
            .redirect(redirect)
            .cookie_provider(Arc::new(cookies.clone()))
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .default_headers(config.default_headers.clone());

        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        if let Some(ref proxy_url) = config.proxy {
            builder = builder.proxy(
                reqwest::Proxy::all(proxy_url)
                    .map_err(|e| Error::Config(format!("Invalid proxy URL: {}", e)))?,
            );
        }

        Ok(Self {
            client: builder.build()?,
            config,
            cookies,
        })
    }

    /// Get transport configuration
    pub fn config(&self) -> &TransportConfig {
        &self.config
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn execute(&self, request: TransportRequest) -> Result<TransportResponse> {
        let response = self
            .client
            .request(request.method, request.url)
            .headers(request.headers)
            .body(request.body)
            .send()
            .await
            .map_err(from_reqwest)?;

        let status = response.status();
        let headers = response.headers().clone();
        let url = response.url().clone();

        // Consumes the response; the connection goes back to the pool or is
        // dropped on both the Ok and Err paths.
        let body = response.bytes().await.map_err(|err| {
            if err.is_timeout() {
                Error::canceled(err.to_string())
            } else {
                Error::body(err.to_string())
            }
        })?;

        Ok(TransportResponse {
            status,
            headers,
            body,
            url,
        })
    }

    fn cookie_slot(&self) -> Option<CookieJarSlot> {
        Some(self.cookies.clone())
    }
}

fn from_reqwest(err: reqwest::Error) -> Error {
    if err.is_timeout() {
        Error::canceled(err.to_string())
    } else {
        Error::Http(err)
    }
}
