use encoding_rs::{Encoding, UTF_8};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("unsupported charset {0}; only UTF-8 documents are handled")]
    UnsupportedCharset(String),
    #[error("document is not valid UTF-8")]
    InvalidUtf8,
}

/// Decodes page bytes as UTF-8, dropping a leading BOM.
///
/// A Content-Type header that declares any other charset is rejected rather than
/// transcoded.
pub fn decode_html(bytes: &[u8], content_type: Option<&str>) -> Result<String, DecodeError> {
    if let Some(label) = content_type.and_then(extract_charset) {
        let declared = Encoding::for_label(label.as_bytes());
        if declared != Some(UTF_8) {
            return Err(DecodeError::UnsupportedCharset(label));
        }
    }

    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    UTF_8
        .decode_without_bom_handling_and_without_replacement(bytes)
        .map(|text| text.into_owned())
        .ok_or(DecodeError::InvalidUtf8)
}

fn extract_charset(content_type: &str) -> Option<String> {
    content_type
        .split(';')
        .filter_map(|part| {
            let (key, value) = part.split_once('=')?;
            key.trim()
                .eq_ignore_ascii_case("charset")
                .then(|| value.trim_matches(&[' ', '"', '\''][..]).to_string())
        })
        .next()
}

#[cfg(test)]
mod tests {
    use super::{decode_html, DecodeError};

    #[test]
    fn utf8_with_bom_and_charset() {
        let bytes = "\u{feff}<b>₹ 593</b>".as_bytes();
        let html = decode_html(bytes, Some("text/html; Charset=\"utf-8\"")).unwrap();
        assert_eq!(html, "<b>₹ 593</b>");
    }

    #[test]
    fn declared_latin1_is_rejected() {
        let err = decode_html(b"caf\xe9", Some("text/html; charset=ISO-8859-1")).unwrap_err();
        assert_eq!(err, DecodeError::UnsupportedCharset("ISO-8859-1".to_string()));
    }

    #[test]
    fn invalid_bytes_without_header_are_rejected() {
        assert_eq!(decode_html(b"caf\xe9", None), Err(DecodeError::InvalidUtf8));
    }
}
