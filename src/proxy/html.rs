//! Entity decoding and escaping for attribute values.

use std::borrow::Cow;

/// Longest entity name considered, excluding `&` and `;`.
const MAX_ENTITY_LEN: usize = 10;

/// Escapes `& " ' < >` for use inside a quoted attribute or as page text.
pub fn escape_html(value: &str) -> Cow<'_, str> {
    if !value.contains(['&', '"', '\'', '<', '>']) {
        return Cow::Borrowed(value);
    }
    let mut escaped = String::with_capacity(value.len() + 16);
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#039;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            other => escaped.push(other),
        }
    }
    Cow::Owned(escaped)
}

/// Decodes the basic named entities and numeric character references.
///
/// Works on raw bytes; decoded characters are written as UTF-8 and all other
/// bytes are copied as is. Unknown or malformed entities are left as written.
pub fn decode_entities(value: &[u8]) -> Cow<'_, [u8]> {
    if !value.contains(&b'&') {
        return Cow::Borrowed(value);
    }

    let mut decoded = Vec::with_capacity(value.len());
    let mut rest = value;
    while let Some(pos) = rest.iter().position(|&b| b == b'&') {
        decoded.extend_from_slice(&rest[..pos]);
        let tail = &rest[pos..];

        let entity = tail[1..]
            .iter()
            .position(|&b| b == b';')
            .filter(|&end| end > 0 && end <= MAX_ENTITY_LEN)
            .and_then(|end| decode_entity(&tail[1..=end]).map(|c| (c, end + 2)));

        match entity {
            Some((c, consumed)) => {
                let mut buf = [0u8; 4];
                decoded.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
                rest = &tail[consumed..];
            }
            None => {
                decoded.push(b'&');
                rest = &tail[1..];
            }
        }
    }
    decoded.extend_from_slice(rest);
    Cow::Owned(decoded)
}

fn decode_entity(name: &[u8]) -> Option<char> {
    match name {
        b"amp" => Some('&'),
        b"lt" => Some('<'),
        b"gt" => Some('>'),
        b"quot" => Some('"'),
        b"apos" => Some('\''),
        b"nbsp" => Some('\u{a0}'),
        _ => {
            let numeric = std::str::from_utf8(name.strip_prefix(b"#")?).ok()?;
            let code = match numeric.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => numeric.parse::<u32>().ok()?,
            };
            char::from_u32(code).filter(|&c| c != '\0')
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(value: &str) -> String {
        String::from_utf8(decode_entities(value.as_bytes()).into_owned()).unwrap()
    }

    #[test]
    fn escapes_quotes_both_ways() {
        assert_eq!(escape_html(r#"a&b"c'd<e>"#), "a&amp;b&quot;c&#039;d&lt;e&gt;");
        assert!(matches!(escape_html("/p?u=x%3A"), Cow::Borrowed(_)));
    }

    #[test]
    fn decodes_named_and_numeric() {
        assert_eq!(decode("/a?x=1&amp;y=2"), "/a?x=1&y=2");
        assert_eq!(decode("&#47;path&#x2F;x&#X41;"), "/path/xA");
        assert_eq!(decode("&quot;&apos;&lt;&gt;"), "\"'<>");
    }

    #[test]
    fn leaves_unknown_entities_alone() {
        assert_eq!(decode("a&b"), "a&b");
        assert_eq!(decode("&bogus;"), "&bogus;");
        assert_eq!(decode("&#xZZ;&;"), "&#xZZ;&;");
        assert_eq!(decode("tail&"), "tail&");
    }

    #[test]
    fn non_utf8_bytes_pass_through_decoding() {
        assert_eq!(&*decode_entities(b"/\xd6\xd0?a=1&amp;b=&#x4e2d;"), b"/\xd6\xd0?a=1&b=\xe4\xb8\xad");
        assert!(matches!(decode_entities(b"/\xd6\xd0"), Cow::Borrowed(_)));
    }
}
