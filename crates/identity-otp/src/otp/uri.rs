//! Percent-encoding helpers for `otpauth://` provisioning URIs.
//!
//! Query values use path-segment escaping, so a space becomes `%20` rather
//! than `+`, and keys are emitted in ascending order.

use std::collections::BTreeMap;

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Characters escaped in a single path segment (and in query keys/values).
const PATH_SEGMENT_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~')
    .remove(b'$')
    .remove(b'&')
    .remove(b'+')
    .remove(b':')
    .remove(b'=')
    .remove(b'@');

/// Characters escaped in a whole path; `/`, `,` and `;` stay literal.
const PATH_SET: &AsciiSet = &PATH_SEGMENT_SET.remove(b'/').remove(b',').remove(b';');

/// Escape `s` for use as one path segment or query component.
pub fn path_escape(s: &str) -> String {
    utf8_percent_encode(s, PATH_SEGMENT_SET).to_string()
}

/// Escape a full URI path.
pub fn escape_path(path: &str) -> String {
    utf8_percent_encode(path, PATH_SET).to_string()
}

/// Percent-decode `s`, replacing invalid UTF-8.
pub fn unescape(s: &str) -> String {
    percent_decode_str(s).decode_utf8_lossy().into_owned()
}

/// Encode `values` as `k=v` pairs joined with `&`, keys sorted ascending and
/// every value of a key emitted in insertion order.
pub fn encode_query(values: &BTreeMap<String, Vec<String>>) -> String {
    let mut pairs = Vec::new();
    for (key, vals) in values {
        let key = path_escape(key);
        for val in vals {
            pairs.push(format!("{}={}", key, path_escape(val)));
        }
    }
    pairs.join("&")
}
