use log::{debug, info};
use std::borrow::Cow;
use std::fs;
use std::path::Path;

use super::error::{ParseError, Result};
use super::header::{is_xml_header, parse_header};
use super::sgml::{break_before_tags, normalize};
use super::tree::parse_markup;
use super::types::{Dialect, HeaderMap, OfxDocument};
use crate::core::config::ParserConfig;
use crate::utils::encoding::decode_bytes;

#[derive(Debug, Clone, Copy)]
pub enum Source<'a> {
    Path(&'a Path),
    Text(&'a str),
    Bytes(&'a [u8]),
}

/// A document split into header and well-formed markup, before tree parsing.
#[derive(Debug, Clone)]
pub struct NormalizedDocument {
    pub dialect: Dialect,
    pub header: HeaderMap,
    pub markup: String,
}

pub fn load(source: Source<'_>, config: &ParserConfig) -> Result<OfxDocument> {
    let text = read_source(source, config)?;
    let NormalizedDocument {
        dialect,
        header,
        markup,
    } = normalize_document(&text, config)?;

    let root = parse_markup(&markup)?;
    info!(
        "Loaded {} document with {} header entries and {} elements",
        dialect,
        header.len(),
        root.descendants().count() + 1
    );

    Ok(OfxDocument {
        dialect,
        header,
        root,
    })
}

pub fn load_path(path: impl AsRef<Path>) -> Result<OfxDocument> {
    load(Source::Path(path.as_ref()), &ParserConfig::default())
}

pub fn load_str(text: &str) -> Result<OfxDocument> {
    load(Source::Text(text), &ParserConfig::default())
}

pub fn load_bytes(raw: &[u8]) -> Result<OfxDocument> {
    load(Source::Bytes(raw), &ParserConfig::default())
}

/// Reads the source into UTF-8 text.
pub fn read_source<'a>(source: Source<'a>, config: &ParserConfig) -> Result<Cow<'a, str>> {
    match source {
        Source::Path(path) => {
            debug!("Reading file: {}", path.display());
            let raw = fs::read(path).map_err(|source| ParseError::NotFound {
                path: path.to_path_buf(),
                source,
            })?;
            Ok(Cow::Owned(decode_bytes(&raw, config.fallback_encoding)))
        }
        Source::Text(text) => Ok(Cow::Borrowed(text.trim_start_matches('\u{feff}'))),
        Source::Bytes(raw) => Ok(Cow::Owned(decode_bytes(raw, config.fallback_encoding))),
    }
}

/// Splits header from body and turns an OFX 1.x body into well-formed markup.
pub fn normalize_document(text: &str, config: &ParserConfig) -> Result<NormalizedDocument> {
    let (header_text, body) = split_document(text, &config.root_tag)?;

    let is_xml = is_xml_header(header_text);
    let header = parse_header(header_text, is_xml)?;

    let (dialect, markup) = if is_xml {
        (Dialect::Xml, body.to_string())
    } else {
        let rules = config.repair_rules();
        (Dialect::Sgml, normalize(&break_before_tags(body), &rules))
    };
    debug!(
        "Normalized {} body: {} bytes in, {} bytes out",
        dialect,
        body.len(),
        markup.len()
    );

    Ok(NormalizedDocument {
        dialect,
        header,
        markup,
    })
}

/// Header text and trimmed body, split at the first `<ROOT>` in any case.
pub fn split_document<'a>(text: &'a str, root_tag: &str) -> Result<(&'a str, &'a str)> {
    let needle = format!("<{}>", root_tag.to_ascii_uppercase());
    let start = text
        .to_ascii_uppercase()
        .find(&needle)
        .ok_or_else(|| ParseError::malformed(format!("no {} element found", needle)))?;
    Ok((&text[..start], text[start..].trim()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ofx::tests::{get_test_file_path, read_test_file};

    #[test]
    fn test_split_document() {
        let (header, body) = split_document("VERSION:102\n\n<ofx>\n<A>1\n</ofx>\n\n", "OFX").unwrap();
        assert_eq!(header, "VERSION:102\n\n");
        assert_eq!(body, "<ofx>\n<A>1\n</ofx>");

        let xml = r#"<?xml version="1.0"?><?OFX OFXHEADER="200"?><OFX></OFX>"#;
        let (header, body) = split_document(xml, "OFX").unwrap();
        assert!(header.ends_with("?>"));
        assert_eq!(body, "<OFX></OFX>");
    }

    #[test]
    fn test_missing_root_tag() {
        let err = split_document("OFXHEADER:100\n<FOO></FOO>", "OFX").unwrap_err();
        assert_eq!(err.diagnostics().len(), 1);
    }

    #[test]
    fn test_sgml_bank_statement() {
        let doc = load_str(&read_test_file("sgml_bank_statement.ofx")).unwrap();

        assert_eq!(doc.dialect, Dialect::Sgml);
        assert_eq!(doc.header.len(), 9);
        assert_eq!(doc.header.get("DATA"), Some("OFXSGML"));
        assert_eq!(doc.header.version(), Some("102"));

        let stmtrs = doc.root.find("BANKMSGSRSV1/STMTTRNRS/STMTRS").unwrap();
        assert_eq!(stmtrs.child("CURDEF").unwrap().text, "GBP");
        assert_eq!(stmtrs.find("BANKACCTFROM/ACCTID").unwrap().text, "12345678");
        assert_eq!(stmtrs.find("LEDGERBAL/BALAMT").unwrap().text, "987.65");

        let trn = stmtrs.find("BANKTRANLIST/STMTTRN").unwrap();
        assert_eq!(trn.child("TRNAMT").unwrap().text, "-12.34");
        assert_eq!(trn.child("NAME").unwrap().text, "Café Zoë");
        assert_eq!(trn.child("MEMO").unwrap().text, "");
    }

    #[test]
    fn test_sgml_credit_card_with_tags_on_one_line() {
        let doc = load_str(&read_test_file("sgml_credit_card.ofx")).unwrap();

        let list = doc
            .root
            .find("CREDITCARDMSGSRSV1/CCSTMTTRNRS/CCSTMTRS/BANKTRANLIST")
            .unwrap();
        let trns: Vec<_> = list.children_named("STMTTRN").collect();
        assert_eq!(trns.len(), 2);
        assert_eq!(trns[0].child("NAME").unwrap().text, "FISH & CHIPS CO");
        assert_eq!(trns[0].child("MEMO").unwrap().text, "Lunch; table #4 (2 ppl)");
        assert_eq!(trns[1].child("NAME").unwrap().text, "PAYMENT - THANK YOU");
        assert_eq!(trns[1].child("MEMO").unwrap().text, "");
    }

    #[test]
    fn test_xml_bank_statement() {
        let doc = load_path(get_test_file_path("xml_bank_statement.ofx")).unwrap();

        assert_eq!(doc.dialect, Dialect::Xml);
        assert_eq!(
            doc.header.keys().collect::<Vec<_>>(),
            vec!["OFXHEADER", "VERSION", "SECURITY", "OLDFILEUID", "NEWFILEUID"]
        );
        let trn = doc
            .root
            .find("BANKMSGSRSV1/STMTTRNRS/STMTRS/BANKTRANLIST/STMTTRN")
            .unwrap();
        assert_eq!(trn.find("PAYEE/NAME").unwrap().text, "Banque Générale");
        assert_eq!(trn.child("MEMO").unwrap().text, "");
    }

    #[test]
    fn test_malformed_after_normalization() {
        let err = load_str(&read_test_file("malformed.ofx")).unwrap_err();
        match err {
            ParseError::MalformedMarkup { diagnostics } => assert!(!diagnostics.is_empty()),
            other => panic!("expected MalformedMarkup, got {other:?}"),
        }
    }

    #[test]
    fn test_normalize_document_markup() {
        let text = "OFXHEADER:100\nVERSION:102\n\n<OFX><CODE>0<MEMO></OFX>";
        let normalized = normalize_document(text, &ParserConfig::default()).unwrap();
        assert_eq!(normalized.dialect, Dialect::Sgml);
        assert_eq!(normalized.markup, "<OFX>\n<CODE>0</CODE>\n<MEMO></MEMO>\n</OFX>");
    }

    #[test]
    fn test_missing_header_is_unrecognized() {
        let err = load_str("<OFX><CODE>0</OFX>").unwrap_err();
        assert!(matches!(err, ParseError::HeaderFormatUnrecognized(_)));
    }
}
