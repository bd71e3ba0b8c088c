// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Named character encodings
//!
//! Thin handle over `encoding_rs` used to turn outgoing query/form text into
//! bytes and to label response bodies with the charset the server declared.

use std::borrow::Cow;
use std::fmt;

use encoding_rs::Encoding;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref CONTENT_TYPE_CHARSET: Regex =
        Regex::new(r#"(?i)charset\s*=\s*"?([^\s;"']+)"#).expect("charset regex is valid");
}

/// A resolved character encoding
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Charset(&'static Encoding);

impl Charset {
    /// UTF-8, the default for everything left on "auto"
    pub fn utf8() -> Self {
        Charset(encoding_rs::UTF_8)
    }

    /// GB18030, the legacy multi-byte Chinese encoding
    pub fn gb18030() -> Self {
        Charset(encoding_rs::GB18030)
    }

    /// Look up an encoding by label, case-insensitively.
    ///
    /// Labels follow the WHATWG Encoding Standard, so aliases such as
    /// `latin1` or `gbk` resolve as browsers resolve them. Unknown labels
    /// yield `None`.
    pub fn for_label(label: &str) -> Option<Self> {
        Encoding::for_label(label.trim().as_bytes()).map(Charset)
    }

    /// Canonical encoding name
    pub fn name(&self) -> &'static str {
        self.0.name()
    }

    /// Underlying `encoding_rs` encoding
    pub fn encoding(&self) -> &'static Encoding {
        self.0
    }

    /// Encode text into bytes of this charset.
    ///
    /// Characters the charset cannot represent become numeric character
    /// references, as browsers do for form submission.
    pub fn encode<'a>(&self, text: &'a str) -> Cow<'a, [u8]> {
        let (bytes, _, _) = self.0.encode(text);
        bytes
    }

    /// Decode bytes of this charset, replacing malformed sequences
    pub fn decode<'a>(&self, bytes: &'a [u8]) -> Cow<'a, str> {
        let (text, _) = self.0.decode_without_bom_handling(bytes);
        text
    }

    /// Resolve the `charset=` parameter of a Content-Type value.
    ///
    /// Returns `None` when the parameter is missing or names an encoding
    /// that is not supported.
    pub fn sniff_content_type(content_type: &str) -> Option<Self> {
        let label = CONTENT_TYPE_CHARSET
            .captures(content_type)
            .and_then(|caps| caps.get(1))?
            .as_str();
        tracing::debug!(label, "found charset in content-type");
        Self::for_label(label)
    }
}

impl Default for Charset {
    fn default() -> Self {
        Charset::utf8()
    }
}

impl fmt::Debug for Charset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Charset").field(&self.name()).finish()
    }
}

impl fmt::Display for Charset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_labels() {
        assert_eq!(Charset::for_label("utf-8"), Some(Charset::utf8()));
        assert_eq!(Charset::for_label("UTF8"), Some(Charset::utf8()));
        assert_eq!(Charset::for_label("gb18030"), Some(Charset::gb18030()));
        assert_eq!(Charset::for_label(" GB18030 "), Some(Charset::gb18030()));
    }

    #[test]
    fn test_unknown_label() {
        assert_eq!(Charset::for_label("klingon-8"), None);
        assert_eq!(Charset::for_label(""), None);
    }

    #[test]
    fn test_gb18030_roundtrip() {
        let bytes = Charset::gb18030().encode("中文");
        assert_eq!(bytes.as_ref(), &[0xD6, 0xD0, 0xCE, 0xC4]);
        assert_eq!(Charset::gb18030().decode(&bytes), "中文");
    }

    #[test]
    fn test_sniff_content_type() {
        assert_eq!(
            Charset::sniff_content_type("text/html; charset=gb18030"),
            Some(Charset::gb18030())
        );
        assert_eq!(
            Charset::sniff_content_type("text/html;Charset=\"UTF-8\""),
            Some(Charset::utf8())
        );
        assert_eq!(Charset::sniff_content_type("text/html"), None);
        assert_eq!(Charset::sniff_content_type("text/html; charset=bogus"), None);
    }
}
