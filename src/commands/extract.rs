use std::path::Path;
use std::process::Command;

use anyhow::{Context, Result, bail};
use tracing::info;

use crate::cli::ExtractArgs;
use crate::util::write_text;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedText {
    pub text: String,
    pub page_count: usize,
}

pub fn run(args: ExtractArgs) -> Result<()> {
    info!(pdf = %args.pdf_path.display(), "extracting PDF text layer");

    let extracted = extract_pdf_text(&args.pdf_path, args.max_pages)?;
    write_text(&args.text_path, &extracted.text)?;

    info!(
        path = %args.text_path.display(),
        pages = extracted.page_count,
        chars = extracted.text.chars().count(),
        "wrote extracted text"
    );

    Ok(())
}

pub fn extract_pdf_text(pdf_path: &Path, max_pages: Option<usize>) -> Result<ExtractedText> {
    if !pdf_path.exists() {
        bail!("PDF not found: {}", pdf_path.display());
    }

    let output = pdftotext_command(pdf_path, max_pages)
        .output()
        .with_context(|| format!("failed to run pdftotext on {}", pdf_path.display()))?;
    if !output.status.success() {
        bail!(
            "pdftotext failed on {}: {}",
            pdf_path.display(),
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }

    Ok(mark_pages(&String::from_utf8_lossy(&output.stdout)))
}

fn pdftotext_command(pdf_path: &Path, max_pages: Option<usize>) -> Command {
    let mut command = Command::new("pdftotext");
    command.args(["-enc", "UTF-8", "-f", "1"]);
    if let Some(last_page) = max_pages {
        command.arg("-l").arg(last_page.to_string());
    }
    command.arg(pdf_path).arg("-");
    command
}

// Form feeds separate pages; blank pages keep their number but get no marker.
pub fn mark_pages(raw: &str) -> ExtractedText {
    let mut text = String::new();
    let mut page_count = 0;

    for (index, page) in raw.split('\u{000C}').enumerate() {
        let page = page.replace('\u{0000}', "");
        if page.trim().is_empty() {
            continue;
        }
        page_count = index + 1;
        text.push_str(&format!("\n\n=== HALAMAN {page_count} ===\n\n"));
        text.push_str(&page);
    }

    ExtractedText { text, page_count }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mark_pages_numbers_pages_and_skips_blank_ones() {
        let raw = "Halaman satu\u{000C}   \n\u{000C}Halaman\u{0000} tiga\u{000C}\n\u{000C}";

        let extracted = mark_pages(raw);
        assert_eq!(
            extracted.text,
            "\n\n=== HALAMAN 1 ===\n\nHalaman satu\n\n=== HALAMAN 3 ===\n\nHalaman tiga"
        );
        assert_eq!(extracted.page_count, 3);
    }

    #[test]
    fn extract_pdf_text_fails_for_missing_file() {
        let result = extract_pdf_text(Path::new("does/not/exist.pdf"), None);
        assert!(result.is_err());
    }
}
