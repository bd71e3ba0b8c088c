// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Query string and form body encoding

use std::collections::HashMap;

use bytes::Bytes;

use crate::charset::Charset;

/// Encode ordered query pairs as `k=v&k=v`.
///
/// Pair order and repeated keys are kept as given. Text is converted with
/// `charset` (UTF-8 when `None`) before percent-escaping.
pub fn encode_query(pairs: &[(String, String)], charset: Option<Charset>) -> String {
    let charset = charset.unwrap_or_default();
    let mut out = String::new();
    for (key, value) in pairs {
        push_pair(&mut out, key, value, charset);
    }
    out
}

/// Encode form fields as an `application/x-www-form-urlencoded` body.
///
/// Keys come out in map iteration order; values of one key keep their order.
pub fn encode_form(fields: &HashMap<String, Vec<String>>, charset: Option<Charset>) -> Bytes {
    let charset = charset.unwrap_or_default();
    let mut out = String::new();
    for (key, values) in fields {
        for value in values {
            push_pair(&mut out, key, value, charset);
        }
    }
    Bytes::from(out)
}

fn push_pair(out: &mut String, key: &str, value: &str, charset: Charset) {
    if !out.is_empty() {
        out.push('&');
    }
    out.extend(form_urlencoded::byte_serialize(&charset.encode(key)));
    out.push('=');
    out.extend(form_urlencoded::byte_serialize(&charset.encode(value)));
}
