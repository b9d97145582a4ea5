use indexmap::{IndexMap, IndexSet};
use tracing::debug;

use super::matching::SubjectMatcher;
use crate::model::{IntelStore, MatchedEntry, VerbatimEntry, VerbatimStore};

#[derive(Debug, Default)]
pub struct MergeOutcome {
    pub updated_entries: usize,
    pub mapped_subjects: IndexSet<String>,
    pub matches: Vec<MatchedEntry>,
    pub unmatched: Vec<String>,
    pub unmapped_subjects: Vec<String>,
}

pub fn merge_into_stores(
    intel: &mut IntelStore,
    verbatim: &mut VerbatimStore,
    matcher: &SubjectMatcher<'_>,
    levels: &[String],
) -> MergeOutcome {
    let mut outcome = MergeOutcome::default();

    for level in levels {
        let Some(grades) = intel.subjects.get_mut(level) else {
            continue;
        };
        let verbatim_grades = verbatim.subjects.entry(level.clone()).or_default();

        for (grade, subjects) in grades.iter_mut() {
            let verbatim_subjects = verbatim_grades
                .entry(grade.clone())
                .or_insert_with(IndexMap::new);

            for (subject_key, entry) in subjects.iter_mut() {
                let Some(found) = matcher.find(grade, subject_key) else {
                    outcome
                        .unmatched
                        .push(format!("{level} G-{grade} {subject_key}"));
                    continue;
                };

                debug!(
                    level = %level,
                    grade = %grade,
                    subject = %subject_key,
                    source = %found.raw_subject,
                    key = %found.key,
                    pass = found.pass.as_str(),
                    "matched curriculum block"
                );

                for semester in entry.semesters_mut() {
                    semester.set_cp_snippet(&found.block.snippet);
                }
                verbatim_subjects.insert(
                    subject_key.clone(),
                    VerbatimEntry::new(found.block.cp_full()),
                );

                outcome.updated_entries += 1;
                outcome.mapped_subjects.insert(subject_key.clone());
                outcome.matches.push(MatchedEntry {
                    level: level.clone(),
                    grade: grade.clone(),
                    subject_key: subject_key.clone(),
                    source_subject: found.raw_subject.to_string(),
                    block_key: found.key.to_string(),
                    phase: found.key.phase.as_str().to_string(),
                    pass: found.pass.as_str().to_string(),
                });
            }
        }
    }

    let mut all_subjects = IndexSet::new();
    for grades in intel.subjects.values() {
        for subjects in grades.values() {
            all_subjects.extend(subjects.keys().cloned());
        }
    }
    outcome.unmapped_subjects = all_subjects
        .into_iter()
        .filter(|subject| !outcome.mapped_subjects.contains(subject))
        .collect();

    outcome
}
