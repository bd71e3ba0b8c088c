// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Cookie jar with public-suffix aware domain scoping

use std::sync::Arc;

use chrono::{DateTime, NaiveDateTime, Utc};
use dashmap::DashMap;
use parking_lot::RwLock;
use reqwest::cookie::CookieStore;
use reqwest::header::{HeaderMap, HeaderValue, SET_COOKIE};
use serde::{Deserialize, Serialize};
use url::{Host, Url};

/// A single HTTP cookie
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cookie {
    /// Cookie name
    pub name: String,
    /// Cookie value
    pub value: String,
    /// Domain the cookie belongs to (empty = resolve from the URL it is stored for)
    pub domain: String,
    /// Path the cookie is valid for (empty = default path of the URL)
    pub path: String,
    /// Expiration time (None = session cookie)
    pub expires: Option<DateTime<Utc>>,
    /// Secure flag (HTTPS only)
    pub secure: bool,
    /// HttpOnly flag (not accessible via JavaScript)
    pub http_only: bool,
    /// SameSite attribute
    pub same_site: SameSite,
    /// Only sent to the exact host that set it
    #[serde(default)]
    pub host_only: bool,
}

/// SameSite cookie attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SameSite {
    /// Cookie sent with all requests
    #[default]
    None,
    /// Cookie sent with same-site and top-level navigations
    Lax,
    /// Cookie only sent with same-site requests
    Strict,
}

impl Cookie {
    /// Create a new cookie scoped to `/`
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            domain: String::new(),
            path: "/".to_string(),
            expires: None,
            secure: false,
            http_only: false,
            same_site: SameSite::default(),
            host_only: false,
        }
    }

    /// Set the domain
    pub fn domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = domain.into();
        self
    }

    /// Set the path
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    /// Set secure flag
    pub fn secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    /// Set http_only flag
    pub fn http_only(mut self, http_only: bool) -> Self {
        self.http_only = http_only;
        self
    }

    /// Set same_site attribute
    pub fn same_site(mut self, same_site: SameSite) -> Self {
        self.same_site = same_site;
        self
    }

    /// Set expiration time
    pub fn expires(mut self, expires: DateTime<Utc>) -> Self {
        self.expires = Some(expires);
        self
    }

    /// Check if the cookie is expired
    pub fn is_expired(&self) -> bool {
        self.expires.map_or(false, |exp| exp <= Utc::now())
    }

    /// Check if the cookie should be sent to the given URL
    pub fn matches(&self, url: &Url) -> bool {
        let host = match url.host_str() {
            Some(host) => host.to_ascii_lowercase(),
            None => return false,
        };

        let domain_ok = if self.host_only {
            host == self.domain
        } else {
            domain_match(&host, &self.domain)
        };

        domain_ok
            && path_match(url.path(), &self.path)
            && (!self.secure || url.scheme() == "https")
            && !self.is_expired()
    }

    /// Parse a Set-Cookie header value.
    ///
    /// Domain and path are left as sent; the jar resolves them against the
    /// response URL when the cookie is stored.
    pub fn parse(header: &str) -> Option<Self> {
        let mut parts = header.split(';');
        let (name, value) = parts.next()?.trim().split_once('=')?;
        let name = name.trim();
        if name.is_empty() {
            return None;
        }

        let mut cookie = Cookie::new(name, trim_quotes(value.trim()));
        cookie.path = String::new();
        let mut max_age_seen = false;

        for part in parts {
            let part = part.trim();
            if let Some((attr, val)) = part.split_once('=') {
                let attr = attr.trim().to_lowercase();
                let val = val.trim();
                match attr.as_str() {
                    "domain" => cookie.domain = val.trim_start_matches('.').to_lowercase(),
                    "path" if val.starts_with('/') => cookie.path = val.to_string(),
                    "expires" if !max_age_seen => cookie.expires = parse_http_date(val),
                    "max-age" => {
                        if let Ok(secs) = val.parse::<i64>() {
                            max_age_seen = true;
                            cookie.expires = Some(if secs <= 0 {
                                DateTime::<Utc>::MIN_UTC
                            } else {
                                max_age_expiry(secs)
                            });
                        }
                    }
                    "samesite" => {
                        cookie.same_site = match val.to_lowercase().as_str() {
                            "strict" => SameSite::Strict,
                            "lax" => SameSite::Lax,
                            _ => SameSite::None,
                        };
                    }
                    _ => {}
                }
            } else {
                match part.to_lowercase().as_str() {
                    "secure" => cookie.secure = true,
                    "httponly" => cookie.http_only = true,
                    _ => {}
                }
            }
        }

        Some(cookie)
    }

    /// Parse a `Cookie` request header style string, e.g. `a=1; b=2`.
    ///
    /// Malformed segments are skipped.
    pub fn parse_list(cookies: &str) -> Vec<Self> {
        cookies
            .split(';')
            .filter_map(|pair| {
                let (name, value) = pair.trim().split_once('=')?;
                let name = name.trim();
                (!name.is_empty()).then(|| Cookie::new(name, trim_quotes(value.trim())))
            })
            .collect()
    }

    /// Convert to cookie header format
    pub fn to_header_value(&self) -> String {
        format!("{}={}", self.name, self.value)
    }
}

fn trim_quotes(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
}

/// Saturates at the latest representable instant
fn max_age_expiry(secs: i64) -> DateTime<Utc> {
    chrono::Duration::try_seconds(secs)
        .and_then(|age| Utc::now().checked_add_signed(age))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

fn parse_http_date(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc2822(value) {
        return Some(dt.with_timezone(&Utc));
    }
    // Netscape style: Wed, 21-Oct-2015 07:28:00 GMT
    NaiveDateTime::parse_from_str(value, "%a, %d-%b-%Y %H:%M:%S GMT")
        .ok()
        .map(|naive| naive.and_utc())
}

/// `host` is `domain` or a subdomain of it
fn domain_match(host: &str, domain: &str) -> bool {
    host == domain
        || (host.len() > domain.len()
            && host.ends_with(domain)
            && host.as_bytes()[host.len() - domain.len() - 1] == b'.')
}

/// RFC 6265 section 5.1.4
fn path_match(request_path: &str, cookie_path: &str) -> bool {
    if request_path == cookie_path {
        return true;
    }
    request_path.starts_with(cookie_path)
        && (cookie_path.ends_with('/') || request_path[cookie_path.len()..].starts_with('/'))
}

/// RFC 6265 section 5.1.4 default-path
fn default_path(url: &Url) -> String {
    let path = url.path();
    match path.rfind('/') {
        Some(0) | None => "/".to_string(),
        Some(idx) => path[..idx].to_string(),
    }
}

fn is_public_suffix(domain: &str) -> bool {
    psl::suffix_str(domain) == Some(domain)
}

/// Thread-safe cookie storage.
///
/// Clones share the same underlying store, so a jar handed to a driver and a
/// persistence hook observe the same state.
#[derive(Debug, Clone)]
pub struct CookieJar {
    /// Cookies stored by domain
    cookies: Arc<DashMap<String, Vec<Cookie>>>,
}

impl Default for CookieJar {
    fn default() -> Self {
        Self::new()
    }
}

impl CookieJar {
    /// Create a new empty cookie jar
    pub fn new() -> Self {
        Self {
            cookies: Arc::new(DashMap::new()),
        }
    }

    /// Store cookies on behalf of `url`.
    ///
    /// Each cookie's domain is checked against the URL host. A Domain
    /// attribute that names a public suffix (e.g. `co.uk`) is only honoured
    /// as a host-only cookie when it equals the host; otherwise the cookie
    /// is dropped, as is any cookie for a domain the host does not belong to.
    pub fn set_cookies(&self, url: &Url, cookies: impl IntoIterator<Item = Cookie>) {
        let host = match url.host_str() {
            Some(host) => host.to_ascii_lowercase(),
            None => return,
        };
        let is_ip = matches!(url.host(), Some(Host::Ipv4(_)) | Some(Host::Ipv6(_)));

        for mut cookie in cookies {
            let domain = cookie.domain.trim_start_matches('.').to_ascii_lowercase();

            if domain.is_empty() {
                cookie.host_only = true;
                cookie.domain = host.clone();
            } else if is_ip || is_public_suffix(&domain) {
                if domain != host {
                    tracing::debug!(cookie = %cookie.name, %domain, %host, "rejected cookie domain");
                    continue;
                }
                cookie.host_only = true;
                cookie.domain = domain;
            } else if domain_match(&host, &domain) {
                cookie.host_only = false;
                cookie.domain = domain;
            } else {
                tracing::debug!(cookie = %cookie.name, %domain, %host, "cookie domain does not match host");
                continue;
            }

            if !cookie.path.starts_with('/') {
                cookie.path = default_path(url);
            }

            if cookie.is_expired() {
                self.remove(&cookie.name, &cookie.domain, &cookie.path);
            } else {
                self.add(cookie);
            }
        }
    }

    /// Add a cookie to the jar as-is, replacing one with the same name and path
    pub fn add(&self, cookie: Cookie) {
        let mut entry = self.cookies.entry(cookie.domain.clone()).or_default();
        entry.retain(|c| c.name != cookie.name || c.path != cookie.path);
        entry.push(cookie);
    }

    /// Merge every Set-Cookie header of a response received from `url`
    pub fn store_response_cookies(&self, url: &Url, headers: &HeaderMap) {
        self.store_set_cookie_values(url, headers.get_all(SET_COOKIE).iter());
    }

    fn store_set_cookie_values<'a>(&self, url: &Url, values: impl Iterator<Item = &'a HeaderValue>) {
        let cookies: Vec<Cookie> = values
            .filter_map(|value| value.to_str().ok())
            .filter_map(Cookie::parse)
            .collect();
        if !cookies.is_empty() {
            self.set_cookies(url, cookies);
        }
    }

    /// Get all cookies for a URL, longest path first
    pub fn cookies(&self, url: &Url) -> Vec<Cookie> {
        let mut result: Vec<Cookie> = self
            .cookies
            .iter()
            .flat_map(|entry| {
                entry
                    .value()
                    .iter()
                    .filter(|c| c.matches(url))
                    .cloned()
                    .collect::<Vec<_>>()
            })
            .collect();
        result.sort_by(|a, b| b.path.len().cmp(&a.path.len()));

        self.remove_expired();

        result
    }

    /// Get Cookie header value for a URL
    pub fn cookie_header(&self, url: &Url) -> Option<String> {
        let cookies = self.cookies(url);
        if cookies.is_empty() {
            return None;
        }

        Some(
            cookies
                .iter()
                .map(|c| c.to_header_value())
                .collect::<Vec<_>>()
                .join("; "),
        )
    }

    /// Remove a specific cookie
    pub fn remove(&self, name: &str, domain: &str, path: &str) {
        if let Some(mut cookies) = self.cookies.get_mut(domain) {
            cookies.retain(|c| c.name != name || c.path != path);
        }
    }

    /// Clear all cookies
    pub fn clear(&self) {
        self.cookies.clear();
    }

    fn remove_expired(&self) {
        for mut entry in self.cookies.iter_mut() {
            entry.value_mut().retain(|c| !c.is_expired());
        }
    }

    /// Get total cookie count
    pub fn len(&self) -> usize {
        self.cookies.iter().map(|e| e.value().len()).sum()
    }

    /// Check if jar is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Export all cookies as JSON
    pub fn to_json(&self) -> serde_json::Result<String> {
        let all_cookies: Vec<Cookie> = self
            .cookies
            .iter()
            .flat_map(|e| e.value().clone())
            .collect();
        serde_json::to_string(&all_cookies)
    }

    /// Import cookies from JSON
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        let cookies: Vec<Cookie> = serde_json::from_str(json)?;
        let jar = CookieJar::new();
        for cookie in cookies {
            jar.add(cookie);
        }
        Ok(jar)
    }
}

/// Lets reqwest read and update the jar on every hop, redirects included
impl CookieStore for CookieJar {
    fn set_cookies(&self, cookie_headers: &mut dyn Iterator<Item = &HeaderValue>, url: &Url) {
        self.store_set_cookie_values(url, cookie_headers);
    }

    fn cookies(&self, url: &Url) -> Option<HeaderValue> {
        self.cookie_header(url)
            .and_then(|value| HeaderValue::from_str(&value).ok())
    }
}

/// Holder for the jar a driver currently sends with.
///
/// Clearing cookies swaps a new jar into the slot. Every clone of the slot,
/// including the one a cookie-aware transport keeps, sees the swap.
#[derive(Debug, Clone, Default)]
pub struct CookieJarSlot(Arc<RwLock<Option<CookieJar>>>);

impl CookieJarSlot {
    /// Create an empty slot
    pub fn new() -> Self {
        Self::default()
    }

    /// Jar currently installed, if any
    pub fn current(&self) -> Option<CookieJar> {
        self.0.read().clone()
    }

    /// Install `jar`, replacing the current one
    pub fn install(&self, jar: CookieJar) {
        *self.0.write() = Some(jar);
    }

    /// Jar to use for the next send: a fresh one when `reset` is set or
    /// nothing is installed yet, otherwise the current one
    pub fn checkout(&self, reset: bool) -> CookieJar {
        let mut slot = self.0.write();
        if let (false, Some(jar)) = (reset, slot.as_ref()) {
            return jar.clone();
        }

        tracing::debug!(reset, "installing empty cookie jar");
        let jar = CookieJar::new();
        *slot = Some(jar.clone());
        jar
    }
}

impl CookieStore for CookieJarSlot {
    fn set_cookies(&self, cookie_headers: &mut dyn Iterator<Item = &HeaderValue>, url: &Url) {
        CookieStore::set_cookies(&self.checkout(false), cookie_headers, url);
    }

    fn cookies(&self, url: &Url) -> Option<HeaderValue> {
        CookieStore::cookies(&self.current()?, url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_cookie_parsing() {
        let header = "session=abc123; Domain=.Example.com; Path=/; Secure; HttpOnly; SameSite=Lax";
        let cookie = Cookie::parse(header).unwrap();

        assert_eq!(cookie.name, "session");
        assert_eq!(cookie.value, "abc123");
        assert_eq!(cookie.domain, "example.com");
        assert_eq!(cookie.path, "/");
        assert!(cookie.secure);
        assert!(cookie.http_only);
        assert_eq!(cookie.same_site, SameSite::Lax);
    }

    #[test]
    fn test_parse_expires_formats() {
        let rfc = Cookie::parse("a=1; Expires=Wed, 21 Oct 2015 07:28:00 GMT").unwrap();
        let netscape = Cookie::parse("a=1; Expires=Wed, 21-Oct-2015 07:28:00 GMT").unwrap();
        assert!(rfc.expires.is_some());
        assert_eq!(rfc.expires, netscape.expires);
        assert!(rfc.is_expired());
    }

    #[test]
    fn test_parse_list() {
        let cookies = Cookie::parse_list("a=1; b=\"two\"; broken; =x");
        assert_eq!(cookies.len(), 2);
        assert_eq!(cookies[0].to_header_value(), "a=1");
        assert_eq!(cookies[1].to_header_value(), "b=two");
    }

    #[test]
    fn test_host_only_cookie_not_shared_with_sibling() {
        let jar = CookieJar::new();
        jar.set_cookies(&url("https://a.example.com/"), vec![Cookie::new("sid", "1")]);

        assert_eq!(jar.cookies(&url("https://a.example.com/x")).len(), 1);
        assert!(jar.cookies(&url("https://b.example.com/")).is_empty());
        assert!(jar.cookies(&url("https://sub.a.example.com/")).is_empty());
    }

    #[test]
    fn test_domain_cookie_shared_with_subdomains() {
        let jar = CookieJar::new();
        jar.set_cookies(
            &url("https://a.example.com/"),
            vec![Cookie::new("sid", "1").domain("example.com")],
        );

        assert_eq!(jar.cookies(&url("https://b.example.com/")).len(), 1);
        assert_eq!(jar.cookies(&url("https://example.com/")).len(), 1);
        assert!(jar.cookies(&url("https://notexample.com/")).is_empty());
    }

    #[test]
    fn test_public_suffix_domain_rejected() {
        let jar = CookieJar::new();
        jar.set_cookies(
            &url("https://shop.example.co.uk/"),
            vec![
                Cookie::new("a", "1").domain("co.uk"),
                Cookie::new("b", "2").domain("com"),
            ],
        );
        assert!(jar.is_empty());
    }

    #[test]
    fn test_foreign_domain_rejected() {
        let jar = CookieJar::new();
        jar.set_cookies(
            &url("https://example.com/"),
            vec![Cookie::new("a", "1").domain("other.org")],
        );
        assert!(jar.is_empty());
    }

    #[test]
    fn test_ip_host_is_host_only() {
        let jar = CookieJar::new();
        let local = url("http://127.0.0.1:8080/");
        jar.set_cookies(&local, vec![Cookie::new("a", "1")]);
        jar.set_cookies(&local, vec![Cookie::new("b", "2").domain("0.0.1")]);

        let cookies = jar.cookies(&local);
        assert_eq!(cookies.len(), 1);
        assert!(cookies[0].host_only);
    }

    #[test]
    fn test_path_matching_and_default_path() {
        let jar = CookieJar::new();
        let headers = {
            let mut h = HeaderMap::new();
            h.append(SET_COOKIE, HeaderValue::from_static("docs=1"));
            h.append(SET_COOKIE, HeaderValue::from_static("root=1; Path=/"));
            h
        };
        jar.store_response_cookies(&url("https://example.com/docs/index.html"), &headers);

        let under_docs = jar.cookies(&url("https://example.com/docs/page"));
        assert_eq!(under_docs.len(), 2);
        assert_eq!(under_docs[0].name, "docs");

        let elsewhere = jar.cookies(&url("https://example.com/docsearch"));
        assert_eq!(elsewhere.len(), 1);
        assert_eq!(elsewhere[0].name, "root");
    }

    #[test]
    fn test_secure_cookie_needs_https() {
        let jar = CookieJar::new();
        jar.set_cookies(
            &url("https://example.com/"),
            vec![Cookie::new("s", "1").secure(true)],
        );
        assert_eq!(jar.cookies(&url("https://example.com/")).len(), 1);
        assert!(jar.cookies(&url("http://example.com/")).is_empty());
    }

    #[test]
    fn test_expired_cookie_deletes_existing() {
        let jar = CookieJar::new();
        let site = url("https://example.com/");
        jar.set_cookies(&site, vec![Cookie::new("sid", "1")]);
        assert_eq!(jar.len(), 1);

        let mut headers = HeaderMap::new();
        headers.append(SET_COOKIE, HeaderValue::from_static("sid=; Path=/; Max-Age=0"));
        jar.store_response_cookies(&site, &headers);
        assert!(jar.cookies(&site).is_empty());
        assert!(jar.is_empty());
    }

    #[test]
    fn test_replace_same_name() {
        let jar = CookieJar::new();
        let site = url("https://example.com/");
        jar.set_cookies(&site, vec![Cookie::new("sid", "1")]);
        jar.set_cookies(&site, vec![Cookie::new("sid", "2")]);

        assert_eq!(jar.cookie_header(&site).as_deref(), Some("sid=2"));
    }

    #[test]
    fn test_json_roundtrip() {
        let jar = CookieJar::new();
        let site = url("https://example.com/");
        jar.set_cookies(&site, vec![Cookie::new("sid", "1"), Cookie::new("lang", "en")]);

        let restored = CookieJar::from_json(&jar.to_json().unwrap()).unwrap();
        assert_eq!(restored.len(), 2);
        assert_eq!(restored.cookies(&site).len(), 2);
        assert!(restored.cookies(&url("https://sub.example.com/")).is_empty());
    }

    #[test]
    fn test_huge_max_age_saturates() {
        let cookie = Cookie::parse("sid=1; Max-Age=9223372036854775807").unwrap();
        assert_eq!(cookie.expires, Some(DateTime::<Utc>::MAX_UTC));
        assert!(!cookie.is_expired());

        let cookie = Cookie::parse("sid=1; Max-Age=1000000000000000").unwrap();
        assert_eq!(cookie.expires, Some(DateTime::<Utc>::MAX_UTC));

        let cookie = Cookie::parse("sid=1; Max-Age=3600").unwrap();
        assert!(cookie.expires.unwrap() < DateTime::<Utc>::MAX_UTC);
    }

    #[test]
    fn test_hostile_set_cookie_headers_stored_safely() {
        let jar = CookieJar::new();
        let site = url("https://example.com/");
        let mut headers = HeaderMap::new();
        headers.append(SET_COOKIE, HeaderValue::from_static("a=1; Max-Age=9223372036854775807"));
        headers.append(SET_COOKIE, HeaderValue::from_static("b=2; Max-Age=-9223372036854775808"));
        headers.append(SET_COOKIE, HeaderValue::from_static("c=3; Expires=not a date"));
        headers.append(SET_COOKIE, HeaderValue::from_static("d=4; Max-Age=lots"));
        jar.store_response_cookies(&site, &headers);

        let names: Vec<String> = jar.cookies(&site).into_iter().map(|c| c.name).collect();
        assert_eq!(names.len(), 3);
        assert!(!names.contains(&"b".to_string()));
        assert!(jar.to_json().is_ok());
    }

    #[test]
    fn test_cookie_store_impl() {
        let jar = CookieJar::new();
        let site = url("https://example.com/account");
        let values = [
            HeaderValue::from_static("sid=abc; Path=/"),
            HeaderValue::from_static("lang=en; Path=/"),
        ];
        CookieStore::set_cookies(&jar, &mut values.iter(), &site);

        let header = CookieStore::cookies(&jar, &url("https://example.com/")).unwrap();
        let header = header.to_str().unwrap();
        assert!(header.contains("sid=abc"));
        assert!(header.contains("lang=en"));
        assert!(CookieStore::cookies(&jar, &url("https://other.com/")).is_none());
    }

    #[test]
    fn test_slot_follows_swapped_jar() {
        let slot = CookieJarSlot::new();
        let site = url("https://example.com/");
        assert!(CookieStore::cookies(&slot, &site).is_none());

        let values = [HeaderValue::from_static("sid=1")];
        CookieStore::set_cookies(&slot, &mut values.iter(), &site);
        let first = slot.current().unwrap();
        assert_eq!(first.len(), 1);

        let fresh = slot.checkout(true);
        assert!(fresh.is_empty());
        assert!(CookieStore::cookies(&slot, &site).is_none());
        assert_eq!(first.len(), 1);

        let kept = slot.checkout(false);
        kept.add(Cookie::new("x", "1").domain("example.com").path("/"));
        assert_eq!(slot.current().unwrap().len(), 1);
    }
}
