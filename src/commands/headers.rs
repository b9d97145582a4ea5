use anyhow::{Context, Result};
use regex::Regex;
use tracing::info;

use crate::cli::HeadersArgs;
use crate::commands::sync::Segmenter;
use crate::util::read_text;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderHit {
    pub line_number: usize,
    pub line: String,
    pub accepted: bool,
    pub following: Vec<String>,
}

pub fn run(args: HeadersArgs) -> Result<()> {
    let content = read_text(&args.text_path)?;
    let lines = content.lines().collect::<Vec<&str>>();
    info!(path = %args.text_path.display(), lines = lines.len(), "analyzing header lines");

    let segmenter = Segmenter::new(true)?;
    let hits = find_header_lines(&lines, &segmenter, args.context_lines)?;

    for hit in &hits {
        info!(
            line_number = hit.line_number,
            accepted = hit.accepted,
            "{}",
            hit.line
        );
        for (offset, next) in hit.following.iter().enumerate() {
            info!(next = offset + 1, "  {}", next);
        }
    }

    info!(
        hits = hits.len(),
        accepted = hits.iter().filter(|hit| hit.accepted).count(),
        "header analysis complete"
    );

    Ok(())
}

pub fn find_header_lines(
    lines: &[&str],
    segmenter: &Segmenter,
    context_lines: usize,
) -> Result<Vec<HeaderHit>> {
    let phrase = Regex::new(r"(?i)CAPAIAN PEMBELAJARAN")
        .context("failed to compile header phrase regex")?;

    let hits = lines
        .iter()
        .enumerate()
        .filter(|(_, line)| phrase.is_match(line))
        .map(|(index, line)| HeaderHit {
            line_number: index + 1,
            line: line.trim().to_string(),
            accepted: segmenter.subject_header_fragment(line).is_some(),
            following: lines
                .iter()
                .skip(index + 1)
                .take(context_lines)
                .filter(|next| !next.is_empty())
                .map(|next| next.trim().to_string())
                .collect(),
        })
        .collect();

    Ok(hits)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn find_header_lines_reports_context_and_acceptance() {
        let lines = vec![
            "Daftar isi capaian pembelajaran",
            "VII. CAPAIAN PEMBELAJARAN MATEMATIKA",
            "MATEMATIKA",
            "A. Rasional",
            "",
        ];
        let segmenter = Segmenter::new(true).expect("segmenter should build");

        let hits = find_header_lines(&lines, &segmenter, 2).expect("analysis should succeed");
        assert_eq!(hits.len(), 2);

        assert_eq!(hits[0].line_number, 1);
        assert!(!hits[0].accepted);

        assert_eq!(hits[1].line_number, 2);
        assert!(hits[1].accepted);
        assert_eq!(hits[1].following, vec!["MATEMATIKA", "A. Rasional"]);
    }
}
