use anyhow::Result;
use tracing::{info, warn};

use crate::cli::InspectArgs;
use crate::model::{IntelStore, VerbatimStore};
use crate::util::read_json;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreCoverage {
    pub subject_entries: usize,
    pub semester_entries: usize,
    pub semesters_with_snippet: usize,
}

pub fn run(args: InspectArgs) -> Result<()> {
    let intel: IntelStore = read_json(&args.intel_path)?;

    info!(
        path = %args.intel_path.display(),
        version = %intel.version.clone().unwrap_or_default(),
        levels = ?intel.subjects.keys().collect::<Vec<_>>(),
        "loaded intel store"
    );

    for (level, grades) in &intel.subjects {
        info!(level = %level, grades = ?grades.keys().collect::<Vec<_>>(), "level grades");
    }

    match intel.subjects.get(&args.level) {
        Some(grades) => {
            for (grade, subjects) in grades {
                info!(
                    level = %args.level,
                    grade = %grade,
                    subjects = ?subjects.keys().collect::<Vec<_>>(),
                    "grade subjects"
                );
            }
        }
        None => warn!(level = %args.level, "level missing from intel store"),
    }

    let coverage = intel_coverage(&intel);
    info!(
        subject_entries = coverage.subject_entries,
        semester_entries = coverage.semester_entries,
        with_snippet = coverage.semesters_with_snippet,
        "intel snippet coverage"
    );

    if args.verbatim_path.exists() {
        let verbatim: VerbatimStore = read_json(&args.verbatim_path)?;
        info!(
            path = %args.verbatim_path.display(),
            version = %verbatim.version,
            entries = verbatim_entry_count(&verbatim),
            "loaded verbatim store"
        );
    } else {
        warn!(path = %args.verbatim_path.display(), "verbatim store missing");
    }

    Ok(())
}

pub fn intel_coverage(intel: &IntelStore) -> StoreCoverage {
    let mut coverage = StoreCoverage::default();

    for subjects in intel.subjects.values().flat_map(|grades| grades.values()) {
        for entry in subjects.values() {
            coverage.subject_entries += 1;
            for semester in entry.semesters() {
                coverage.semester_entries += 1;
                if semester.cp_snippet().is_some_and(|snippet| !snippet.is_empty()) {
                    coverage.semesters_with_snippet += 1;
                }
            }
        }
    }

    coverage
}

pub fn verbatim_entry_count(verbatim: &VerbatimStore) -> usize {
    verbatim
        .subjects
        .values()
        .flat_map(|grades| grades.values())
        .map(|subjects| subjects.len())
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intel_coverage_counts_semesters_with_snippets() {
        let raw = r#"{
            "subjects": {
                "SD": {
                    "1": {
                        "Matematika": {"ganjil": {"cp_snippet": "Bilangan cacah"}, "genap": {}},
                        "Seni Musik": {"ganjil": {"cp_snippet": ""}}
                    }
                }
            }
        }"#;
        let intel: IntelStore = serde_json::from_str(raw).expect("intel store should parse");

        let coverage = intel_coverage(&intel);
        assert_eq!(
            coverage,
            StoreCoverage {
                subject_entries: 2,
                semester_entries: 3,
                semesters_with_snippet: 1,
            }
        );
    }

    #[test]
    fn verbatim_entry_count_sums_all_levels() {
        let raw = r#"{
            "version": "2025.Verbatim",
            "subjects": {
                "SD": {"1": {"Matematika": {"cp_full": "a"}}, "2": {}},
                "SMP": {"7": {"IPA": {"cp_full": "b"}, "IPS": {"cp_full": "c"}}}
            }
        }"#;
        let verbatim: VerbatimStore = serde_json::from_str(raw).expect("verbatim should parse");
        assert_eq!(verbatim_entry_count(&verbatim), 3);
    }
}
