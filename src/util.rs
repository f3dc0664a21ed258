/// Current wall-clock time in epoch milliseconds.
pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Characters left untouched by percent-encoding, matching the
/// `encodeURIComponent` unreserved set so resume strings copied from the
/// old web links keep working.
fn is_unreserved(b: u8) -> bool {
    b.is_ascii_alphanumeric()
        || matches!(
            b,
            b'-' | b'_' | b'.' | b'!' | b'~' | b'*' | b'\'' | b'(' | b')'
        )
}

pub fn percent_encode(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for b in input.bytes() {
        if is_unreserved(b) {
            out.push(b as char);
        } else {
            out.push_str(&format!("%{b:02X}"));
        }
    }
    out
}

/// Decodes `%XX` escapes and `+` as space. Malformed escapes are kept
/// verbatim rather than erroring; invalid UTF-8 after decoding is replaced.
pub fn percent_decode(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            if let Some(hex) = bytes.get(i + 1..i + 3) {
                if let Some(v) = std::str::from_utf8(hex)
                    .ok()
                    .and_then(|s| u8::from_str_radix(s, 16).ok())
                {
                    out.push(v);
                    i += 3;
                    continue;
                }
            }
        }
        if bytes[i] == b'+' {
            out.push(b' ');
        } else {
            out.push(bytes[i]);
        }
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_unreserved_passthrough() {
        assert_eq!(percent_encode("abc-123_.!~*'()"), "abc-123_.!~*'()");
    }

    #[test]
    fn test_encode_reserved() {
        assert_eq!(percent_encode("a b&c=d"), "a%20b%26c%3Dd");
        assert_eq!(percent_encode("[{\"x\":1}]"), "%5B%7B%22x%22%3A1%7D%5D");
    }

    #[test]
    fn test_encode_korean() {
        assert_eq!(percent_encode("스케치"), "%EC%8A%A4%EC%BC%80%EC%B9%98");
    }

    #[test]
    fn test_decode_roundtrip() {
        for s in [
            "스케치",
            "풍경 그리기",
            "[{\"name\":\"채색\",\"endTime\":100}]",
        ] {
            assert_eq!(percent_decode(&percent_encode(s)), s);
        }
    }

    #[test]
    fn test_decode_plus_as_space() {
        assert_eq!(percent_decode("a+b"), "a b");
    }

    #[test]
    fn test_decode_malformed_kept_verbatim() {
        assert_eq!(percent_decode("100%"), "100%");
        assert_eq!(percent_decode("%zz"), "%zz");
        assert_eq!(percent_decode("%2"), "%2");
    }

    #[test]
    fn test_decode_empty() {
        assert_eq!(percent_decode(""), "");
    }
}
