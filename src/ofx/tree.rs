use log::debug;

use super::error::{Diagnostic, ParseError, Result};
use super::types::Element;

/// Parses well-formed markup into an owned [`Element`] tree.
pub fn parse_markup(markup: &str) -> Result<Element> {
    let mut options = roxmltree::ParsingOptions::default();
    options.allow_dtd = true;

    let xml_tree = roxmltree::Document::parse_with_options(markup, options).map_err(|e| {
        let pos = e.pos();
        debug!("Markup rejected at {}:{}: {}", pos.row, pos.col, e);
        ParseError::MalformedMarkup {
            diagnostics: vec![Diagnostic::new(pos.row, pos.col, e.to_string())],
        }
    })?;

    let root = build_element(xml_tree.root_element());
    if root.is_empty() {
        return Err(ParseError::malformed(format!(
            "<{}> has no content",
            root.name
        )));
    }
    Ok(root)
}

fn build_element(node: roxmltree::Node<'_, '_>) -> Element {
    let mut text = String::new();
    let mut children = Vec::new();

    for child in node.children() {
        if child.is_element() {
            children.push(build_element(child));
        } else if child.is_text() {
            text.push_str(child.text().unwrap_or(""));
        }
    }

    Element {
        name: node.tag_name().name().to_string(),
        text: text.trim().to_string(),
        children,
    }
}
