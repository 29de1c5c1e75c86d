//! Per-line fixes for leaf elements whose end tag was left out.
//!
//! Each quirk of real-world exporters is a separate [`RepairRule`] so that new
//! ones can be added without touching the nesting logic in [`super::sgml`].

use once_cell::sync::Lazy;
use regex::Regex;
use std::borrow::Cow;

/// `<NAME>text` with no end tag. Any memo text counts as long as it holds no
/// `<` or `>`.
static UNCLOSED_LEAF: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^<([A-Za-z0-9.]+)>([^<>]+)$").unwrap());

pub trait RepairRule: Send + Sync {
    fn name(&self) -> &'static str;

    /// The repaired line, or `None` when the rule does not apply.
    fn apply(&self, line: &str) -> Option<String>;
}

/// `<MEMO>` alone on a line becomes `<MEMO></MEMO>`.
#[derive(Debug, Clone)]
pub struct EmptyLeafRule {
    tags: Vec<String>,
}

impl EmptyLeafRule {
    pub fn new<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tags: tags.into_iter().map(Into::into).collect(),
        }
    }
}

impl RepairRule for EmptyLeafRule {
    fn name(&self) -> &'static str {
        "empty-leaf"
    }

    fn apply(&self, line: &str) -> Option<String> {
        let name = line.strip_prefix('<')?.strip_suffix('>')?;
        self.tags
            .iter()
            .any(|tag| tag == name)
            .then(|| format!("<{name}></{name}>"))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct UnclosedLeafRule;

impl RepairRule for UnclosedLeafRule {
    fn name(&self) -> &'static str {
        "unclosed-leaf"
    }

    fn apply(&self, line: &str) -> Option<String> {
        let caps = UNCLOSED_LEAF.captures(line)?;
        Some(format!("<{0}>{1}</{0}>", &caps[1], &caps[2]))
    }
}

/// Ordered rule set; the first rule that applies wins.
pub struct RepairRules {
    rules: Vec<Box<dyn RepairRule>>,
}

impl RepairRules {
    pub fn new(empty_leaf_tags: &[String]) -> Self {
        Self {
            rules: vec![
                Box::new(EmptyLeafRule::new(empty_leaf_tags.iter().cloned())),
                Box::new(UnclosedLeafRule),
            ],
        }
    }

    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    pub fn with_rule(mut self, rule: impl RepairRule + 'static) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    /// Applies the first matching rule to a trimmed line.
    pub fn close_if_needed<'a>(&self, line: &'a str) -> Cow<'a, str> {
        self.rules
            .iter()
            .find_map(|rule| rule.apply(line))
            .map_or(Cow::Borrowed(line), Cow::Owned)
    }
}

impl Default for RepairRules {
    fn default() -> Self {
        Self::new(&["MEMO".to_string()])
    }
}

impl std::fmt::Debug for RepairRules {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.rule_names()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closes_leaf_text() {
        let rules = RepairRules::default();
        assert_eq!(rules.close_if_needed("<TRNAMT>-12.34"), "<TRNAMT>-12.34</TRNAMT>");
        assert_eq!(
            rules.close_if_needed("<DTPOSTED>20210114000000[-4:GMT]"),
            "<DTPOSTED>20210114000000[-4:GMT]</DTPOSTED>"
        );
    }

    #[test]
    fn test_keeps_memo_punctuation_and_accents() {
        let rules = RepairRules::default();
        let line = r#"<MEMO>Café "Zoë" 50% off! (card #1234) £5/€6 ~ a&amp;b"#;
        assert_eq!(rules.close_if_needed(line), format!("{line}</MEMO>"));
    }

    #[test]
    fn test_empty_memo() {
        let rules = RepairRules::default();
        assert_eq!(rules.close_if_needed("<MEMO>"), "<MEMO></MEMO>");
    }

    #[test]
    fn test_empty_leaf_only_for_configured_tags() {
        let rules = RepairRules::new(&["MEMO".to_string(), "NAME".to_string()]);
        assert_eq!(rules.close_if_needed("<NAME>"), "<NAME></NAME>");
        assert_eq!(rules.close_if_needed("<STMTTRN>"), "<STMTTRN>");
    }

    #[test]
    fn test_leaves_tags_and_closed_leaves_alone() {
        let rules = RepairRules::default();
        for line in ["<STMTTRN>", "</STMTTRN>", "<NAME>ACME</NAME>", "plain text"] {
            assert!(matches!(rules.close_if_needed(line), Cow::Borrowed(_)), "{line}");
        }
    }

    #[test]
    fn test_closes_memo_text_with_any_characters() {
        let rules = RepairRules::default();
        for line in [
            "<NAME>McDonald\u{2019}s",
            "<MEMO>50\u{b0} off ^ today",
            "<MEMO>a\tb",
        ] {
            assert_eq!(rules.close_if_needed(line), format!("{line}</{}>", &line[1..5]));
        }
    }

    #[test]
    fn test_text_outside_class_is_not_repaired() {
        let rules = RepairRules::default();
        assert_eq!(rules.close_if_needed("<MEMO>a < b"), "<MEMO>a < b");
    }

    #[test]
    fn test_custom_rule() {
        struct Uppercase;
        impl RepairRule for Uppercase {
            fn name(&self) -> &'static str {
                "uppercase"
            }
            fn apply(&self, line: &str) -> Option<String> {
                line.starts_with("<x>").then(|| line.to_uppercase())
            }
        }

        let rules = RepairRules::empty().with_rule(Uppercase);
        assert_eq!(rules.rule_names(), vec!["uppercase"]);
        assert_eq!(rules.close_if_needed("<x>"), "<X>");
    }
}
