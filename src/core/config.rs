use anyhow::{anyhow, Result};
use encoding_rs::Encoding;

use crate::ofx::repair::RepairRules;

#[derive(Clone, Debug)]
pub struct ParserConfig {
    /// Tag that opens the document body, matched case-insensitively.
    pub root_tag: String,
    /// Leaf tags that exporters emit bare when their value is empty.
    pub empty_leaf_tags: Vec<String>,
    pub fallback_encoding: &'static Encoding,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            root_tag: "OFX".to_string(),
            empty_leaf_tags: vec!["MEMO".to_string()],
            fallback_encoding: encoding_rs::WINDOWS_1252,
        }
    }
}

impl ParserConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();

        let root_tag = lookup("OFX_ROOT_TAG")
            .map(|tag| tag.trim().to_string())
            .filter(|tag| !tag.is_empty())
            .unwrap_or(defaults.root_tag);

        let empty_leaf_tags = lookup("OFX_EMPTY_LEAF_TAGS")
            .map(|tags| {
                tags.split(',')
                    .map(str::trim)
                    .filter(|tag| !tag.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or(defaults.empty_leaf_tags);

        let fallback_encoding = match lookup("OFX_FALLBACK_ENCODING") {
            Some(label) => Encoding::for_label(label.trim().as_bytes()).ok_or_else(|| {
                anyhow!("OFX_FALLBACK_ENCODING is not a known encoding: {}", label)
            })?,
            None => defaults.fallback_encoding,
        };

        Ok(Self {
            root_tag,
            empty_leaf_tags,
            fallback_encoding,
        })
    }

    pub fn repair_rules(&self) -> RepairRules {
        RepairRules::new(&self.empty_leaf_tags)
    }
}
