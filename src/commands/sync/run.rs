use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::Utc;
use tracing::{debug, info, warn};

use super::matching::{MatchRules, SubjectMatcher};
use super::merge::{MergeOutcome, merge_into_stores};
use super::normalize::TextNormalizer;
use super::segment::Segmenter;
use crate::cli::SyncArgs;
use crate::commands::extract::extract_pdf_text;
use crate::model::{IntelStore, SkipCounts, SyncReport, VerbatimStore};
use crate::util::{
    now_utc_string, read_json, read_text, sha256_text, utc_compact_string, write_json_pretty,
};

const REPORT_VERSION: u32 = 1;
const UNMATCHED_SAMPLE: usize = 10;

#[derive(Debug, Clone)]
pub struct SyncOptions<'p> {
    pub intel_path: &'p Path,
    pub verbatim_path: &'p Path,
    pub detect_variants: bool,
    pub dry_run: bool,
}

#[derive(Debug)]
pub struct SyncSummary {
    pub subjects_segmented: usize,
    pub blocks_retained: usize,
    pub phase_keys: BTreeMap<String, Vec<String>>,
    pub skips: SkipCounts,
    pub merge: MergeOutcome,
}

pub fn run(args: SyncArgs) -> Result<()> {
    let started_ts = Utc::now();
    let run_id = format!("sync-{}", utc_compact_string(started_ts));
    info!(run_id = %run_id, dry_run = args.dry_run, "starting sync");

    let (source_path, raw_text) = load_source_text(&args)?;
    info!(
        path = %source_path.display(),
        chars = raw_text.chars().count(),
        lines = raw_text.lines().count(),
        "loaded source text"
    );

    let rules = MatchRules::load(args.match_rules.as_deref())?;
    if let Some(path) = &args.match_rules {
        info!(path = %path.display(), "loaded match rules");
    }

    let options = SyncOptions {
        intel_path: &args.intel_path,
        verbatim_path: &args.verbatim_path,
        detect_variants: !args.no_variants,
        dry_run: args.dry_run,
    };
    let summary = sync_text(&raw_text, &rules, &options)?;

    info!(
        updated = summary.merge.updated_entries,
        unique_subjects = summary.merge.mapped_subjects.len(),
        unmatched = summary.merge.unmatched.len(),
        "mapping summary"
    );
    if !summary.merge.unmatched.is_empty() {
        warn!(
            sample = ?summary.merge.unmatched.iter().take(UNMATCHED_SAMPLE).collect::<Vec<_>>(),
            "entries without a matching curriculum block"
        );
    }
    if !summary.merge.unmapped_subjects.is_empty() {
        warn!(
            count = summary.merge.unmapped_subjects.len(),
            sample = ?summary.merge.unmapped_subjects.iter().take(UNMATCHED_SAMPLE).collect::<Vec<_>>(),
            "unmapped subjects in intel store"
        );
    }

    if let Some(report_path) = &args.report_path {
        let report = SyncReport {
            report_version: REPORT_VERSION,
            run_id,
            generated_at: now_utc_string(),
            source_path: source_path.display().to_string(),
            source_sha256: sha256_text(&raw_text),
            source_chars: raw_text.chars().count(),
            subjects_segmented: summary.subjects_segmented,
            blocks_retained: summary.blocks_retained,
            phase_keys: summary.phase_keys,
            skip_counts: summary.skips,
            updated_entries: summary.merge.updated_entries,
            unique_subjects_mapped: summary.merge.mapped_subjects.len(),
            matches: summary.merge.matches,
            unmatched: summary.merge.unmatched,
            unmapped_subjects: summary.merge.unmapped_subjects,
            dry_run: args.dry_run,
        };
        write_json_pretty(report_path, &report)?;
        info!(path = %report_path.display(), "wrote sync report");
    }

    Ok(())
}

fn load_source_text(args: &SyncArgs) -> Result<(PathBuf, String)> {
    match &args.pdf_path {
        Some(pdf_path) => {
            let extracted = extract_pdf_text(pdf_path, None)?;
            info!(pages = extracted.page_count, "extracted PDF text inline");
            Ok((pdf_path.clone(), extracted.text))
        }
        None => Ok((args.text_path.clone(), read_text(&args.text_path)?)),
    }
}

pub fn sync_text(raw_text: &str, rules: &MatchRules, options: &SyncOptions<'_>) -> Result<SyncSummary> {
    let normalizer = TextNormalizer::new()?;
    let segmenter = Segmenter::new(options.detect_variants)?;

    let clean_text = normalizer.normalize(raw_text);
    let segmentation = segmenter.segment(&clean_text);

    let phase_keys = segmentation
        .subjects
        .iter()
        .map(|(subject, blocks)| {
            (
                subject.clone(),
                blocks.keys().map(ToString::to_string).collect::<Vec<String>>(),
            )
        })
        .collect::<BTreeMap<String, Vec<String>>>();
    for (subject, keys) in &phase_keys {
        debug!(subject = %subject, keys = ?keys, "segmented subject");
    }
    info!(
        subjects = segmentation.subjects.len(),
        blocks = segmentation.blocks_retained(),
        skipped = segmentation.skips.total(),
        "segmented curriculum text"
    );

    let mut intel: IntelStore = read_json(options.intel_path)?;
    let mut verbatim = if options.verbatim_path.exists() {
        read_json::<VerbatimStore>(options.verbatim_path)?
    } else {
        info!(path = %options.verbatim_path.display(), "verbatim store missing, starting fresh");
        VerbatimStore::default()
    };

    let matcher = SubjectMatcher::new(rules, &segmentation.subjects);
    let merge = merge_into_stores(&mut intel, &mut verbatim, &matcher, &rules.levels);

    if options.dry_run {
        info!("dry run, stores left untouched");
    } else {
        write_json_pretty(options.intel_path, &intel)?;
        write_json_pretty(options.verbatim_path, &verbatim)?;
        info!(
            intel = %options.intel_path.display(),
            verbatim = %options.verbatim_path.display(),
            "stores saved"
        );
    }

    Ok(SyncSummary {
        subjects_segmented: segmentation.subjects.len(),
        blocks_retained: segmentation.blocks_retained(),
        phase_keys,
        skips: segmentation.skips,
        merge,
    })
}
