use once_cell::sync::Lazy;
use regex::Regex;
use std::borrow::Cow;

use super::repair::RepairRules;

static BARE_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"^<(/?)([A-Za-z0-9.]+)>$").unwrap());

/// Name between the first `<` and the next `>`, without a leading `/`.
pub fn extract_tag_name(line: &str) -> Option<&str> {
    let start = line.find('<')? + 1;
    let end = start + line[start..].find('>')?;
    let name = &line[start..end];
    Some(name.strip_prefix('/').unwrap_or(name))
}

/// Shape of one body line, decided before the nesting stack sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind<'a> {
    Blank,
    /// `<>`, `</>` and the like.
    Degenerate,
    /// Continuation text with no tag in front of it.
    Text(&'a str),
    OpenTag(&'a str),
    CloseTag(&'a str),
    /// A leaf element, already passed through the repair rules.
    LeafLine { name: &'a str, line: Cow<'a, str> },
    /// A tag-only line whose name falls outside the plain tag name class, or
    /// a tag with text that no repair rule closed.
    Other(&'a str),
}

impl<'a> LineKind<'a> {
    pub fn classify(line: &'a str, rules: &RepairRules) -> Self {
        let line = line.trim();
        if line.is_empty() {
            return LineKind::Blank;
        }
        if !line.starts_with('<') {
            return LineKind::Text(line);
        }
        let Some(name) = extract_tag_name(line) else {
            return LineKind::Text(line);
        };
        if name.trim().is_empty() {
            return LineKind::Degenerate;
        }

        if let Some(caps) = BARE_TAG.captures(line) {
            let (_, [slash, name]) = caps.extract();
            if !slash.is_empty() {
                return LineKind::CloseTag(name);
            }
            return match rules.close_if_needed(line) {
                Cow::Owned(repaired) => LineKind::LeafLine {
                    name,
                    line: Cow::Owned(repaired),
                },
                Cow::Borrowed(_) => LineKind::OpenTag(name),
            };
        }

        let content_start = line.find('>').map_or(line.len(), |i| i + 1);
        if line[content_start..].trim().is_empty() {
            LineKind::Other(name)
        } else {
            let repaired = rules.close_if_needed(line);
            let closer = format!("</{name}>");
            match repaired {
                Cow::Borrowed(_) if !line.ends_with(&closer) => LineKind::Other(name),
                line => LineKind::LeafLine { name, line },
            }
        }
    }

    /// Tag name carried by the line, if any.
    pub fn tag_name(&self) -> Option<&'a str> {
        match self {
            LineKind::OpenTag(name)
            | LineKind::CloseTag(name)
            | LineKind::Other(name)
            | LineKind::LeafLine { name, .. } => Some(*name),
            LineKind::Blank | LineKind::Degenerate | LineKind::Text(_) => None,
        }
    }
}
