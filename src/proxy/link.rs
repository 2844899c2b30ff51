//! Proxy links: absolute URLs routed back through the entry path.

use percent_encoding::{percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Query parameter carrying the encoded destination.
pub const TARGET_PARAM: &str = "u";

/// Everything except `A-Z a-z 0-9 - . _` is escaped.
const TARGET_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'.').remove(b'_');

/// Builds `{entry_path}?u=<percent-encoded target>`.
///
/// The target need not be UTF-8; every byte is encoded as is. Trailing
/// slashes on the entry path are dropped so `/portal/` and `/portal` produce
/// the same link.
pub fn proxy_link(entry_path: &str, target: impl AsRef<[u8]>) -> String {
    format!(
        "{}?{}={}",
        entry_path.trim_end_matches('/'),
        TARGET_PARAM,
        percent_encode(target.as_ref(), TARGET_ENCODE_SET)
    )
}
