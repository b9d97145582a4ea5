use anyhow::{Context, Result};
use regex::Regex;

use super::segment::Variant;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitContent {
    pub header: String,
    pub full: String,
}

#[derive(Debug)]
pub struct ContentSplitter {
    sentinel: Regex,
    special_needs_cue: Regex,
}

impl ContentSplitter {
    pub fn new() -> Result<Self> {
        Ok(Self {
            sentinel: Regex::new(r"(?i)Pada akhir fase [A-F]")
                .context("failed to compile narrative sentinel regex")?,
            special_needs_cue: Regex::new(r"(?i)Usia Mental|LB\)|Kekhususan")
                .context("failed to compile special-needs cue regex")?,
        })
    }

    pub fn split(&self, text: &str) -> SplitContent {
        if let Some(found) = self.sentinel.find(text) {
            return SplitContent {
                header: text[..found.start()].trim().to_string(),
                full: text[found.start()..].trim().to_string(),
            };
        }

        // Parenthetical-only layout: the header ends at the first ')'.
        if let Some(index) = text.find(')') {
            return SplitContent {
                header: text[..=index].trim().to_string(),
                full: text[index + 1..].trim().to_string(),
            };
        }

        SplitContent {
            header: String::new(),
            full: text.trim().to_string(),
        }
    }

    pub fn detect_variant(&self, header: &str) -> Variant {
        if self.special_needs_cue.is_match(header) {
            Variant::Lb
        } else {
            Variant::Regular
        }
    }
}
