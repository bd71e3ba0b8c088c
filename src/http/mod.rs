// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Request, response and cookie types
//!
//! The data side of simplehttp: a fluent request builder, the response it
//! turns into, and the cookie jar that carries state between sends.

mod cookie;
mod request;
mod response;

pub use cookie::{Cookie, CookieJar, CookieJarSlot, SameSite};
pub use request::Request;
pub(crate) use request::RequestParts;
pub use response::Response;

/// Default user agent string
pub const DEFAULT_USER_AGENT: &str = concat!("simplehttp/", env!("CARGO_PKG_VERSION"));

/// Content type set when form fields are added
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";
