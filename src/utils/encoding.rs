use chardet::{charset2encoding, detect};
use encoding_rs::Encoding;
use once_cell::sync::Lazy;
use regex::bytes::Regex;

/// `CHARSET:1252` in an OFX 1.x header names a Windows code page.
static DECLARED_CHARSET: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^\s*CHARSET\s*:\s*(\d{3,4})\s*$").unwrap());

/// Decodes raw document bytes into UTF-8 text.
///
/// Valid UTF-8 is taken as is. Otherwise a code page declared in the OFX 1.x
/// header wins, then whatever `chardet` detects, then `fallback`. Bytes the
/// chosen encoding cannot map become U+FFFD, so decoding never fails.
pub fn decode_bytes(raw: &[u8], fallback: &'static Encoding) -> String {
    if let Ok(text) = std::str::from_utf8(raw) {
        return text.trim_start_matches('\u{feff}').to_string();
    }

    let encoding = match declared_encoding(raw) {
        Some(encoding) => encoding,
        None => {
            let charenc = detect(&raw.to_vec()).0;
            log::debug!("Detected character encoding: {}", charenc);
            Encoding::for_label(charset2encoding(&charenc).as_bytes()).unwrap_or(fallback)
        }
    };
    log::debug!("Decoding document as {}", encoding.name());

    let (text, _, had_errors) = encoding.decode(raw);
    if had_errors {
        log::warn!("Replaced bytes that are not valid {}", encoding.name());
    }
    text.into_owned()
}

fn declared_encoding(raw: &[u8]) -> Option<&'static Encoding> {
    let caps = DECLARED_CHARSET.captures(raw)?;
    let code_page = std::str::from_utf8(&caps[1]).ok()?;
    Encoding::for_label(format!("windows-{code_page}").as_bytes())
}
