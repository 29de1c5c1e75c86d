//! OFX 1.x body to well-formed XML.
//!
//! The body is scanned one line at a time. Leaf lines get their end tag
//! inline, aggregate tags go on a [`NestingStack`], and end tags that would
//! close something twice are dropped. Nothing here fails: whatever cannot be
//! repaired is left for the tree parser to reject.

use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::borrow::Cow;

use super::repair::RepairRules;
use super::stack::{CloseResolution, FrameStatus, NestingStack};
use super::tag::LineKind;

/// Character references and the entities an XML parser knows without a DTD,
/// plus `&nbsp;`, which OFX 1.x exporters write although XML lacks it.
static AMPERSAND: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"&(#[0-9]+;|#x[0-9a-fA-F]+;|amp;|lt;|gt;|quot;|apos;|nbsp;)?").unwrap()
});

/// Escapes every `&` that does not start a reference the tree parser accepts.
pub fn escape_ampersands(text: &str) -> Cow<'_, str> {
    AMPERSAND.replace_all(text, |caps: &Captures| match caps.get(1).map(|m| m.as_str()) {
        Some("nbsp;") => "&#160;".to_string(),
        Some(_) => caps[0].to_string(),
        None => "&amp;".to_string(),
    })
}

/// Puts every tag at the start of its own line.
pub fn break_before_tags(body: &str) -> String {
    body.replace('<', "\n<")
}

pub fn normalize(body: &str, rules: &RepairRules) -> String {
    let escaped = escape_ampersands(body);

    let mut stack = NestingStack::new();
    let mut shallow_depth = 0usize;
    let mut output: Vec<Cow<'_, str>> = Vec::new();
    let mut previous_tag: Option<&str> = None;

    for (index, raw_line) in escaped.split('\n').enumerate() {
        let kind = LineKind::classify(raw_line, rules);
        let tag = kind.tag_name();

        match kind {
            LineKind::Blank | LineKind::Degenerate => continue,
            LineKind::Text(text) => output.push(Cow::Borrowed(text)),
            LineKind::LeafLine { name, line } => {
                stack.push(index, name, FrameStatus::Closed);
                shallow_depth += 1;
                output.push(line);
            }
            LineKind::OpenTag(name) | LineKind::Other(name) => {
                stack.push(index, name, FrameStatus::Open);
                output.push(Cow::Borrowed(raw_line.trim()));
            }
            LineKind::CloseTag(name) => match stack.resolve_close(name) {
                CloseResolution::Unmatched => {
                    warn!("Dropping stray </{}> on line {}", name, index + 1);
                    continue;
                }
                CloseResolution::Matched { frame, discarded } => {
                    if !discarded.is_empty() {
                        debug!(
                            "</{}> on line {} implicitly closed {} element(s)",
                            name,
                            index + 1,
                            discarded.len()
                        );
                    }
                    if frame.status == FrameStatus::Closed {
                        continue;
                    }
                    if shallow_depth == 1 && previous_tag == Some(name) {
                        shallow_depth = 0;
                        continue;
                    }
                    output.push(Cow::Borrowed(raw_line.trim()));
                }
            },
        }
        previous_tag = tag;
    }

    if !stack.is_empty() {
        debug!(
            "{} element(s) still open at end of body, outermost <{}>",
            stack.len(),
            stack.frames()[0].name
        );
    }

    output
        .iter()
        .map(|line| line.trim())
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
