// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! # simplehttp - Fluent HTTP requests over a pluggable driver
//!
//! Build a request with chained setters, hand it to a [`Driver`], get back a
//! [`Response`] that carries either the result or the error.
//!
//! ## Features
//!
//! - Query pairs with repeated keys, form fields and JSON payloads
//! - Query/form text encoded in any WHATWG charset (UTF-8, GB18030, ...)
//! - Cookie jar shared across sends, scoped with the public suffix list
//! - Retry of requests canceled mid-flight
//! - Response charset resolved from Content-Type
//! - Pluggable [`Transport`] so tests can stub the network
//!
//! ## Example
//!
//! ```rust,no_run
//! use simplehttp::{HttpDriver, Request};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let driver = HttpDriver::default();
//!
//!     let resp = Request::get("https://example.com/search")
//!         .query("q", "go")
//!         .query("q", "rust")
//!         .retry(2)
//!         .send(&driver)
//!         .await
//!         .into_result()?;
//!
//!     println!("{} {:?}", resp.status_code(), resp.encoding);
//!     println!("{}", resp.text());
//!
//!     Ok(())
//! }
//! ```

pub mod charset;
pub mod driver;
pub mod encode;
pub mod error;
pub mod http;
pub mod transport;

// Re-exports for convenience

// Driver
pub use driver::{Driver, HttpDriver, StoreCookie};

// Transport
pub use transport::{ReqwestTransport, Transport, TransportConfig, TransportRequest, TransportResponse};

// HTTP types
pub use http::{Cookie, CookieJar, CookieJarSlot, Request, Response, SameSite};

// Encoding
pub use charset::Charset;
pub use encode::{encode_form, encode_query};

// Errors
pub use error::{is_transient_cancellation, Error, Result};

/// simplehttp version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
