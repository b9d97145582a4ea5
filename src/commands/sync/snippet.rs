use anyhow::{Context, Result};
use regex::Regex;

pub const SNIPPET_MAX_CHARS: usize = 500;
pub const ELLIPSIS: &str = "...";

const MIN_SENTENCE_CHARS: usize = 10;
const BASE_SENTENCES: usize = 2;
const WIDENING_STEPS: [(usize, usize); 3] = [(150, 3), (250, 4), (350, 5)];

#[derive(Debug)]
pub struct SnippetGenerator {
    intro_sentence: Regex,
    titled_outline_header: Regex,
    outline_number: Regex,
    leading_non_word: Regex,
    floating_dash: Regex,
    sentence_boundary: Regex,
    trailing_page_number: Regex,
}

impl SnippetGenerator {
    pub fn new() -> Result<Self> {
        Ok(Self {
            intro_sentence: Regex::new(
                r"(?i)^Pada akhir fase [A-F],? (?:murid|peserta didik|anak) memiliki kemampuan sebagai berikut[:.]?\s*",
            )
            .context("failed to compile intro sentence regex")?,
            titled_outline_header: Regex::new(
                r"\b\d+(?:\.\d+)+\.?\s+[A-Z][a-zA-Z]*(?:\s+(?:dan|atau|terhadap|dengan|tentang|unsur-unsur)\s+)?(?:[A-Z][a-zA-Z]*)*\b",
            )
            .context("failed to compile outline header regex")?,
            outline_number: Regex::new(r"\b\d+(?:\.\d+)+\.?\s*")
                .context("failed to compile outline number regex")?,
            leading_non_word: Regex::new(r"^[\W\s]+")
                .context("failed to compile leading non-word regex")?,
            floating_dash: Regex::new(r"\s+-\s*").context("failed to compile floating dash regex")?,
            sentence_boundary: Regex::new(r"[.!?]\s+")
                .context("failed to compile sentence boundary regex")?,
            trailing_page_number: Regex::new(r"\s+\d+\.?\s*$")
                .context("failed to compile trailing page number regex")?,
        })
    }

    pub fn strip_boilerplate(&self, full_text: &str) -> String {
        let clean = self.intro_sentence.replace(full_text, "");
        let clean = self.titled_outline_header.replace_all(clean.trim(), " ");
        let clean = self.outline_number.replace_all(&clean, " ");
        let clean = self.leading_non_word.replace(&clean, "");
        let clean = self.floating_dash.replace_all(clean.trim(), " ");
        clean.trim().to_string()
    }

    pub fn generate(&self, full_text: &str) -> String {
        if full_text.is_empty() {
            return String::new();
        }

        let clean = self.strip_boilerplate(full_text);
        let sentences = self.split_sentences(&clean);

        let mut snippet = sentences[..BASE_SENTENCES.min(sentences.len())].join(" ");
        for (threshold, count) in WIDENING_STEPS {
            if char_len(&snippet) < threshold && sentences.len() >= count {
                snippet = sentences[..count].join(" ");
            }
        }

        let snippet = self.trailing_page_number.replace(&snippet, "");
        truncate_with_ellipsis(snippet.trim(), SNIPPET_MAX_CHARS)
    }

    pub fn split_sentences<'t>(&self, text: &'t str) -> Vec<&'t str> {
        let mut sentences = Vec::new();
        let mut start = 0usize;

        for boundary in self.sentence_boundary.find_iter(text) {
            let next_is_capital = text[boundary.end()..]
                .chars()
                .next()
                .map(|character| character.is_ascii_uppercase())
                .unwrap_or(false);
            if next_is_capital {
                sentences.push(text[start..boundary.start() + 1].trim());
                start = boundary.end();
            }
        }
        sentences.push(text[start..].trim());

        sentences
            .into_iter()
            .filter(|sentence| char_len(sentence) > MIN_SENTENCE_CHARS)
            .collect()
    }
}

pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

pub fn truncate_with_ellipsis(text: &str, max_chars: usize) -> String {
    if char_len(text) <= max_chars {
        return text.to_string();
    }

    let keep = max_chars.saturating_sub(char_len(ELLIPSIS));
    let mut truncated = text.chars().take(keep).collect::<String>();
    truncated.push_str(ELLIPSIS);
    truncated
}
