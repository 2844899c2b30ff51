//! Secure path validation and entry path matching.

use subtle::ConstantTimeEq;

use crate::gate::GateError;

const MIN_LEN: usize = 6;
const MAX_LEN: usize = 64;

/// Trims and lower-cases a requested secure path, then checks it is 6-64
/// characters of `a-z`, `0-9` or `-`.
pub fn normalize_secure_path(input: &str) -> Result<String, GateError> {
    let token = input.trim().to_ascii_lowercase();
    let valid_len = (MIN_LEN..=MAX_LEN).contains(&token.len());
    let valid_chars = token
        .bytes()
        .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-');
    if valid_len && valid_chars {
        Ok(token)
    } else {
        Err(GateError::InvalidSecurePath)
    }
}

/// Constant-time byte comparison.
///
/// Length is not hidden; contents are.
#[must_use]
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}

/// True when `request_path` is the entry path, ignoring trailing slashes.
pub fn matches_entry_path(request_path: &str, entry_path: &str) -> bool {
    let request = request_path.trim_end_matches('/');
    let entry = entry_path.trim_end_matches('/');
    !entry.is_empty() && constant_time_eq(request.as_bytes(), entry.as_bytes())
}
