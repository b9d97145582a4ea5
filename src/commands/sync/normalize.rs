use anyhow::{Context, Result};
use regex::Regex;

const WATERMARK: &str = "SALINAN";
const MISDECODED_PLUS_MINUS: &str = "Â±";
const MISDECODED_RIGHT_QUOTE: &str = "â€™";

#[derive(Debug)]
pub struct TextNormalizer {
    page_marker: Regex,
    page_footer: Regex,
    letterhead: Regex,
    decree_number: Regex,
    blank_run: Regex,
}

impl TextNormalizer {
    pub fn new() -> Result<Self> {
        Ok(Self {
            page_marker: Regex::new(r"(?m)^[ \t]*=== HALAMAN \d+ ===[ \t\r]*$")
                .context("failed to compile page marker regex")?,
            page_footer: Regex::new(r"-- \d+ [oO][fF] \d+ --")
                .context("failed to compile page footer regex")?,
            letterhead: Regex::new(
                r"(?i)KEPUTUSAN\s+KEPALA\s+BADAN\s+STANDAR,\s+KURIKULUM,\s+DAN\s+ASESMEN\s+PENDIDIKAN",
            )
            .context("failed to compile letterhead regex")?,
            decree_number: Regex::new(r"(?i)NOMOR \d+/H/KR/\d+")
                .context("failed to compile decree number regex")?,
            blank_run: Regex::new(r"\n\s+\n").context("failed to compile blank run regex")?,
        })
    }

    pub fn normalize(&self, raw: &str) -> String {
        let text = self.page_marker.replace_all(raw, " ");
        let text = self.page_footer.replace_all(&text, " ");
        let text = text.replace(WATERMARK, " ");
        let text = self.letterhead.replace_all(&text, " ");
        let text = self.decree_number.replace_all(&text, " ");
        let text = text
            .replace(MISDECODED_PLUS_MINUS, "±")
            .replace(MISDECODED_RIGHT_QUOTE, "'");
        self.blank_run.replace_all(&text, "\n").into_owned()
    }
}
