// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Request execution
//!
//! [`HttpDriver`] turns a [`Request`] into exactly one [`Response`]:
//!
//! 1. query pairs are appended to the URL, form fields and then a JSON
//!    payload replace the body (JSON wins when both are set);
//! 2. the cookie jar is reset if asked (or created on first use) and seeded
//!    with the request's explicit cookies;
//! 3. the transport is called, retrying only transient cancellations;
//! 4. Set-Cookie headers land in the jar, the store hook runs and the
//!    response charset is read from Content-Type.
//!
//! When the transport exposes a cookie slot (as [`ReqwestTransport`] does)
//! the driver shares it, so redirect hops read and fill the same jar.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE, COOKIE};
use reqwest::Method;
use tracing::{debug, warn};
use url::Url;

use crate::charset::Charset;
use crate::encode::{encode_form, encode_query};
use crate::error::{is_transient_cancellation, Result};
use crate::http::{CookieJar, CookieJarSlot, Request, RequestParts, Response};
use crate::transport::{ReqwestTransport, Transport, TransportConfig, TransportRequest};

/// Callback run with the jar after every successful send, e.g. to persist it
pub type StoreCookie = Arc<dyn Fn(&CookieJar) + Send + Sync>;

/// Sends requests.
///
/// Implementations may be shared between tasks; every send is independent
/// apart from the cookie state the driver keeps.
#[async_trait]
pub trait Driver: Send + Sync {
    /// Execute `request`. Failures are reported on [`Response::error`].
    async fn send(&self, request: Request) -> Response;
}

/// The request after body and URL construction
#[derive(Debug)]
struct Prepared {
    method: Method,
    url: Url,
    headers: HeaderMap,
    body: Bytes,
}

/// Driver executing requests through a [`Transport`] with a shared cookie jar
pub struct HttpDriver<T: Transport = ReqwestTransport> {
    transport: T,
    /// Empty until the first send
    jar: CookieJarSlot,
    /// The transport stores Set-Cookie itself, on every hop
    transport_cookies: bool,
    store_cookie: Option<StoreCookie>,
}

impl HttpDriver<ReqwestTransport> {
    /// Create a reqwest-backed driver with custom transport configuration
    pub fn with_config(config: TransportConfig) -> Result<Self> {
        Ok(Self::new(ReqwestTransport::with_config(config)?))
    }
}

impl Default for HttpDriver<ReqwestTransport> {
    fn default() -> Self {
        Self::new(ReqwestTransport::new().expect("Failed to create default HTTP transport"))
    }
}

impl<T: Transport> HttpDriver<T> {
    /// Create a driver over `transport`
    pub fn new(transport: T) -> Self {
        let (jar, transport_cookies) = match transport.cookie_slot() {
            Some(slot) => (slot, true),
            None => (CookieJarSlot::new(), false),
        };
        Self {
            transport,
            jar,
            transport_cookies,
            store_cookie: None,
        }
    }

    /// Start from an existing jar instead of an empty one
    pub fn with_cookie_jar(self, jar: CookieJar) -> Self {
        self.jar.install(jar);
        self
    }

    /// Run `hook` with the jar after every successful send
    pub fn with_store_cookie(mut self, hook: impl Fn(&CookieJar) + Send + Sync + 'static) -> Self {
        self.store_cookie = Some(Arc::new(hook));
        self
    }

    /// Current cookie jar, if one has been created
    pub fn cookie_jar(&self) -> Option<CookieJar> {
        self.jar.current()
    }

    /// Underlying transport
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Send many requests concurrently through this driver
    pub async fn send_all(&self, requests: Vec<Request>) -> Vec<Response> {
        let sends = requests.into_iter().map(|request| Driver::send(self, request));
        futures::future::join_all(sends).await
    }

    /// Apply query, form and JSON construction, in that order
    fn prepare(parts: &mut RequestParts) -> Result<Prepared> {
        if let Some(err) = parts.error.take() {
            return Err(err);
        }

        let mut url = std::mem::take(&mut parts.url);
        if !parts.queries.is_empty() {
            url.push(if url.contains('?') { '&' } else { '?' });
            url.push_str(&encode_query(&parts.queries, parts.charset));
        }

        let mut body = parts.body.take().unwrap_or_default();
        if let Some(forms) = &parts.forms {
            body = encode_form(forms, parts.charset);
        }
        if let Some(json) = &parts.json {
            body = Bytes::from(serde_json::to_vec(json)?);
        }

        Ok(Prepared {
            method: parts.method.clone(),
            url: Url::parse(&url)?,
            headers: std::mem::take(&mut parts.headers),
            body,
        })
    }

    /// One transport call, producing a brand-new response
    async fn attempt(&self, prepared: &Prepared, jar: &CookieJar) -> Response {
        let mut headers = prepared.headers.clone();
        if let Some(jar_cookies) = jar.cookie_header(&prepared.url) {
            let value = match headers.get(COOKIE).and_then(|v| v.to_str().ok()) {
                Some(existing) => format!("{}; {}", existing, jar_cookies),
                None => jar_cookies,
            };
            if let Ok(value) = HeaderValue::try_from(value) {
                headers.insert(COOKIE, value);
            }
        }

        let request = TransportRequest {
            method: prepared.method.clone(),
            url: prepared.url.clone(),
            headers,
            body: prepared.body.clone(),
        };

        let response = match self.transport.execute(request).await {
            Ok(response) => response,
            Err(err) => return Response::from_error(err),
        };

        if !self.transport_cookies {
            jar.store_response_cookies(&response.url, &response.headers);
        }
        if let Some(hook) = &self.store_cookie {
            hook(jar);
        }

        let encoding = response
            .headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .and_then(Charset::sniff_content_type);

        Response::new(
            response.status,
            response.headers,
            response.body,
            response.url,
            encoding,
        )
    }
}

#[async_trait]
impl<T: Transport> Driver for HttpDriver<T> {
    async fn send(&self, request: Request) -> Response {
        let mut parts = request.into_parts();
        let prepared = match Self::prepare(&mut parts) {
            Ok(prepared) => prepared,
            Err(err) => {
                debug!(error = %err, "request construction failed");
                return Response::from_error(err);
            }
        };

        let jar = self.jar.checkout(parts.clear_cookies);
        if let Some(cookies) = parts.cookies.take() {
            debug!(count = cookies.len(), url = %prepared.url, "seeding cookies");
            jar.set_cookies(&prepared.url, cookies);
        }

        let attempts = parts.retry + 1;
        let mut attempt = 0;
        loop {
            attempt += 1;
            debug!(method = %prepared.method, url = %prepared.url, attempt, "sending request");

            let response = self.attempt(&prepared, &jar).await;
            match &response.error {
                Some(err) if attempt < attempts && is_transient_cancellation(err) => {
                    warn!(error = %err, attempt, attempts, "request canceled, retrying");
                }
                _ => return response,
            }
        }
    }
}

impl<T: Transport + fmt::Debug> fmt::Debug for HttpDriver<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpDriver")
            .field("transport", &self.transport)
            .field("jar", &self.jar.current())
            .field("transport_cookies", &self.transport_cookies)
            .field("store_cookie", &self.store_cookie.is_some())
            .finish()
    }
}
