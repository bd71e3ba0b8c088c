// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Fluent request builder
//!
//! A [`Request`] only accumulates configuration. Nothing is validated or
//! encoded until it is handed to a [`Driver`]; setter failures (bad method,
//! bad header, unserializable JSON) are kept and reported on the
//! [`Response`] of that send.

use std::collections::HashMap;

use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE, ORIGIN, REFERER};
use reqwest::Method;
use serde::Serialize;

use super::cookie::Cookie;
use super::response::Response;
use super::FORM_CONTENT_TYPE;
use crate::charset::Charset;
use crate::driver::Driver;
use crate::error::Error;

/// HTTP request configuration
#[derive(Debug, Default)]
pub struct Request {
    method: Method,
    url: String,
    headers: HeaderMap,
    queries: Vec<(String, String)>,
    forms: Option<HashMap<String, Vec<String>>>,
    json: Option<serde_json::Value>,
    body: Option<Bytes>,
    cookies: Option<Vec<Cookie>>,
    charset: Option<Charset>,
    clear_cookies: bool,
    retry: usize,
    error: Option<Error>,
}

impl Request {
    /// Create an empty GET request
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a GET request for `url`
    pub fn get(url: impl Into<String>) -> Self {
        Self::new().url(url)
    }

    /// Create a POST request for `url`
    pub fn post(url: impl Into<String>) -> Self {
        Self::new().method_post().url(url)
    }

    /// Set the method by name, e.g. `"PROPFIND"`
    pub fn method(mut self, method: impl AsRef<str>) -> Self {
        match Method::from_bytes(method.as_ref().as_bytes()) {
            Ok(method) => self.method = method,
            Err(_) => self.fail(Error::InvalidMethod(method.as_ref().to_string())),
        }
        self
    }

    /// Use GET
    pub fn method_get(mut self) -> Self {
        self.method = Method::GET;
        self
    }

    /// Use POST
    pub fn method_post(mut self) -> Self {
        self.method = Method::POST;
        self
    }

    /// Use PUT
    pub fn method_put(mut self) -> Self {
        self.method = Method::PUT;
        self
    }

    /// Use PATCH
    pub fn method_patch(mut self) -> Self {
        self.method = Method::PATCH;
        self
    }

    /// Use DELETE
    pub fn method_delete(mut self) -> Self {
        self.method = Method::DELETE;
        self
    }

    /// Use HEAD
    pub fn method_head(mut self) -> Self {
        self.method = Method::HEAD;
        self
    }

    /// Use OPTIONS
    pub fn method_options(mut self) -> Self {
        self.method = Method::OPTIONS;
        self
    }

    /// Use CONNECT
    pub fn method_connect(mut self) -> Self {
        self.method = Method::CONNECT;
        self
    }

    /// Set the URL. Query pairs are appended to it at send time.
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Set a header, replacing any existing values
    pub fn header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        if let Some((name, value)) = self.header_pair(name.as_ref(), value.as_ref()) {
            self.headers.insert(name, value);
        }
        self
    }

    /// Add another value for a header
    pub fn append_header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        if let Some((name, value)) = self.header_pair(name.as_ref(), value.as_ref()) {
            self.headers.append(name, value);
        }
        self
    }

    /// Set the Referer header
    pub fn referer(self, referer: impl AsRef<str>) -> Self {
        self.header(REFERER, referer)
    }

    /// Set the Origin header
    pub fn origin(self, origin: impl AsRef<str>) -> Self {
        self.header(ORIGIN, origin)
    }

    /// Append a query pair
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.queries.push((key.into(), value.into()));
        self
    }

    /// Append one query pair per value, all under `key`
    pub fn query_array<I, V>(mut self, key: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        let key = key.into();
        self.queries
            .extend(values.into_iter().map(|v| (key.clone(), v.into())));
        self
    }

    /// Replace all query pairs
    pub fn queries(mut self, queries: Vec<(String, String)>) -> Self {
        self.queries = queries;
        self
    }

    /// Append a form value
    pub fn form(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.forms_mut()
            .entry(key.into())
            .or_default()
            .push(value.into());
        self
    }

    /// Set a form field to exactly one value
    pub fn form_force(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.forms_mut().insert(key.into(), vec![value.into()]);
        self
    }

    /// Set a form field to the given values
    pub fn form_array<I, V>(mut self, key: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        let values = values.into_iter().map(Into::into).collect();
        self.forms_mut().insert(key.into(), values);
        self
    }

    /// Replace all form fields
    pub fn forms(mut self, forms: HashMap<String, Vec<String>>) -> Self {
        self.forms_mut();
        self.forms = Some(forms);
        self
    }

    /// Set a JSON payload.
    ///
    /// The payload takes precedence over form fields when both are set.
    /// Content-Type is left to the caller.
    pub fn json<T: Serialize + ?Sized>(mut self, data: &T) -> Self {
        match serde_json::to_value(data) {
            Ok(value) => self.json = Some(value),
            Err(err) => self.fail(Error::Serialization(err)),
        }
        self
    }

    /// Set the raw body. Form fields and JSON payloads override it.
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Cookies to seed into the jar for this request's URL
    pub fn cookies(mut self, cookies: Vec<Cookie>) -> Self {
        self.cookies = Some(cookies);
        self
    }

    /// Cookies from a `Cookie` header style string, e.g. `a=1; b=2`
    pub fn cookie_str(self, cookies: &str) -> Self {
        self.cookies(Cookie::parse_list(cookies))
    }

    /// Add one cookie
    pub fn add_cookie(mut self, cookie: Cookie) -> Self {
        self.cookies.get_or_insert_with(Vec::new).push(cookie);
        self
    }

    /// Start this send with a fresh, empty cookie jar
    pub fn clear_cookies(mut self) -> Self {
        self.clear_cookies = true;
        self
    }

    /// Extra attempts allowed when a send is canceled mid-flight
    pub fn retry(mut self, retry: usize) -> Self {
        self.retry = retry;
        self
    }

    /// Charset used to encode query and form text
    pub fn charset(mut self, charset: Charset) -> Self {
        self.charset = Some(charset);
        self
    }

    /// Encode query and form text as GB18030
    pub fn gb18030(self) -> Self {
        self.charset(Charset::gb18030())
    }

    /// Encode query and form text as UTF-8
    pub fn utf8(self) -> Self {
        self.charset(Charset::utf8())
    }

    /// Send through `driver`
    pub async fn send<D: Driver + ?Sized>(self, driver: &D) -> Response {
        driver.send(self).await
    }

    /// Request method
    pub fn get_method(&self) -> &Method {
        &self.method
    }

    /// URL as configured, without the query pairs
    pub fn get_url(&self) -> &str {
        &self.url
    }

    /// Configured headers
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Query pairs in send order
    pub fn get_queries(&self) -> &[(String, String)] {
        &self.queries
    }

    /// Form fields, if any were set
    pub fn get_forms(&self) -> Option<&HashMap<String, Vec<String>>> {
        self.forms.as_ref()
    }

    /// JSON payload, if set
    pub fn get_json(&self) -> Option<&serde_json::Value> {
        self.json.as_ref()
    }

    /// Raw body, if set
    pub fn get_body(&self) -> Option<&Bytes> {
        self.body.as_ref()
    }

    /// Explicit cookies, if set
    pub fn get_cookies(&self) -> Option<&[Cookie]> {
        self.cookies.as_deref()
    }

    /// Declared charset (None = auto)
    pub fn get_charset(&self) -> Option<Charset> {
        self.charset
    }

    /// Whether this send starts from an empty jar
    pub fn is_clear_cookies(&self) -> bool {
        self.clear_cookies
    }

    /// Retry budget
    pub fn get_retry(&self) -> usize {
        self.retry
    }

    /// Break the request into the parts the driver consumes
    pub(crate) fn into_parts(self) -> RequestParts {
        RequestParts {
            method: self.method,
            url: self.url,
            headers: self.headers,
            queries: self.queries,
            forms: self.forms,
            json: self.json,
            body: self.body,
            cookies: self.cookies,
            charset: self.charset,
            clear_cookies: self.clear_cookies,
            retry: self.retry,
            error: self.error,
        }
    }

    fn forms_mut(&mut self) -> &mut HashMap<String, Vec<String>> {
        if self.forms.is_none() {
            self.headers
                .insert(CONTENT_TYPE, HeaderValue::from_static(FORM_CONTENT_TYPE));
        }
        self.forms.get_or_insert_with(HashMap::new)
    }

    fn header_pair(&mut self, name: &str, value: &str) -> Option<(HeaderName, HeaderValue)> {
        let parsed = HeaderName::try_from(name)
            .map_err(|e| Error::invalid_header(name, e))
            .and_then(|n| {
                HeaderValue::try_from(value)
                    .map(|v| (n, v))
                    .map_err(|e| Error::invalid_header(name, e))
            });
        match parsed {
            Ok(pair) => Some(pair),
            Err(err) => {
                self.fail(err);
                None
            }
        }
    }

    /// Keep the first setter failure; it is reported when the request is sent
    fn fail(&mut self, err: Error) {
        if self.error.is_none() {
            self.error = Some(err);
        }
    }
}

/// Owned request fields, as consumed by the driver
#[derive(Debug)]
pub(crate) struct RequestParts {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    pub queries: Vec<(String, String)>,
    pub forms: Option<HashMap<String, Vec<String>>>,
    pub json: Option<serde_json::Value>,
    pub body: Option<Bytes>,
    pub cookies: Option<Vec<Cookie>>,
    pub charset: Option<Charset>,
    pub clear_cookies: bool,
    pub retry: usize,
    pub error: Option<Error>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_creation() {
        let req = Request::get("https://example.com/path");
        assert_eq!(req.get_method(), &Method::GET);
        assert_eq!(req.get_url(), "https://example.com/path");
        assert_eq!(req.get_retry(), 0);
        assert!(!req.is_clear_cookies());
    }

    #[test]
    fn test_request_headers() {
        let req = Request::get("https://example.com")
            .header("x-custom", "value")
            .header("x-custom", "replaced")
            .append_header("x-multi", "1")
            .append_header("x-multi", "2")
            .referer("https://example.com/from");
        assert_eq!(req.headers().get("x-custom").unwrap(), "replaced");
        assert_eq!(req.headers().get_all("x-multi").iter().count(), 2);
        assert_eq!(req.headers().get(REFERER).unwrap(), "https://example.com/from");
    }

    #[test]
    fn test_invalid_header_is_deferred() {
        let req = Request::get("https://example.com").header("bad header", "v");
        assert!(req.headers().is_empty());
        let parts = req.into_parts();
        assert!(matches!(parts.error, Some(Error::InvalidHeader { .. })));
    }

    #[test]
    fn test_invalid_method_is_deferred() {
        let parts = Request::new().method("GE T").into_parts();
        assert!(matches!(parts.error, Some(Error::InvalidMethod(_))));

        let req = Request::new().method("PROPFIND");
        assert_eq!(req.get_method().as_str(), "PROPFIND");
    }

    #[test]
    fn test_query_accumulation() {
        let req = Request::get("https://example.com")
            .query("q", "go")
            .query_array("q", ["rust", "zig"])
            .query("page", "1");
        let values: Vec<&str> = req.get_queries().iter().map(|(_, v)| v.as_str()).collect();
        assert_eq!(values, vec!["go", "rust", "zig", "1"]);

        let req = req.queries(vec![("only".into(), "one".into())]);
        assert_eq!(req.get_queries().len(), 1);
    }

    #[test]
    fn test_form_sets_content_type() {
        let req = Request::post("https://example.com").form("name", "value");
        assert_eq!(
            req.headers().get(CONTENT_TYPE).unwrap(),
            FORM_CONTENT_TYPE
        );
    }

    #[test]
    fn test_form_does_not_override_later_content_type() {
        let req = Request::post("https://example.com")
            .form("a", "1")
            .header("content-type", "text/plain")
            .form("b", "2");
        assert_eq!(req.headers().get(CONTENT_TYPE).unwrap(), "text/plain");
    }

    #[test]
    fn test_form_variants() {
        let req = Request::post("https://example.com")
            .form("k", "1")
            .form("k", "2")
            .form_force("single", "x")
            .form_force("single", "y")
            .form_array("arr", vec!["a", "b"]);
        let forms = req.get_forms().unwrap();
        assert_eq!(forms["k"], vec!["1", "2"]);
        assert_eq!(forms["single"], vec!["y"]);
        assert_eq!(forms["arr"], vec!["a", "b"]);

        let replaced = req.forms(HashMap::new());
        assert!(replaced.get_forms().unwrap().is_empty());
    }

    #[test]
    fn test_json_leaves_content_type_alone() {
        let req = Request::post("https://example.com").json(&serde_json::json!({"a": 1}));
        assert_eq!(req.get_json(), Some(&serde_json::json!({"a": 1})));
        assert!(req.headers().get(CONTENT_TYPE).is_none());
    }

    #[test]
    fn test_json_serialization_failure_is_deferred() {
        let mut bad = HashMap::new();
        bad.insert((1, 2), "tuple keys are not valid JSON object keys");
        let parts = Request::post("https://example.com").json(&bad).into_parts();
        assert!(matches!(parts.error, Some(Error::Serialization(_))));
        assert!(parts.json.is_none());
    }

    #[test]
    fn test_cookie_setters() {
        let req = Request::get("https://example.com")
            .cookie_str("a=1; b=2")
            .add_cookie(Cookie::new("c", "3"))
            .clear_cookies()
            .retry(2)
            .gb18030();
        assert_eq!(req.get_cookies().unwrap().len(), 3);
        assert!(req.is_clear_cookies());
        assert_eq!(req.get_retry(), 2);
        assert_eq!(req.get_charset(), Some(Charset::gb18030()));
    }
}
