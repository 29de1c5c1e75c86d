use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;

use super::error::{ParseError, Result};
use super::types::HeaderMap;

static XML_DECLARATION: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)<\?xml.*?\?>").unwrap());
static OFX_PI_DELIMITERS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<\?OFX|\?>").unwrap());

/// Whether the pre-body text is an OFX 2.x XML prolog.
pub fn is_xml_header(header_text: &str) -> bool {
    header_text
        .trim_start_matches('\u{feff}')
        .trim_start()
        .get(..5)
        .is_some_and(|start| start.eq_ignore_ascii_case("<?xml"))
}

pub fn parse_header(header_text: &str, is_xml_style: bool) -> Result<HeaderMap> {
    let header = if is_xml_style {
        parse_xml_header(header_text)
    } else {
        parse_colon_header(header_text)
    };

    if header.is_empty() {
        let preview: String = header_text.trim().chars().take(60).collect();
        return Err(ParseError::HeaderFormatUnrecognized(preview));
    }

    debug!("Parsed {} header entries", header.len());
    Ok(header)
}

/// `<?xml ...?><?OFX KEY="VALUE" ...?>`
fn parse_xml_header(header_text: &str) -> HeaderMap {
    let stripped = XML_DECLARATION.replace_all(header_text, " ");
    let stripped = OFX_PI_DELIMITERS.replace_all(&stripped, " ");

    let mut header = HeaderMap::new();
    for token in stripped.split_whitespace() {
        if let Some((key, value)) = token.split_once('=') {
            header.insert(unquote(key), unquote(value));
        }
    }
    header
}

/// `KEY:VALUE` per line, the OFX 1.x form.
fn parse_colon_header(header_text: &str) -> HeaderMap {
    let mut header = HeaderMap::new();
    for line in header_text
        .lines()
        .map(str::trim)
        .skip_while(|line| line.is_empty())
    {
        if let Some((key, value)) = line.split_once(':') {
            header.insert(key.trim(), value.trim());
        }
    }
    header
}

fn unquote(s: &str) -> &str {
    s.trim_matches(|c| c == '"' || c == '\'')
}
