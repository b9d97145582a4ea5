use std::path::Path;

use anyhow::Result;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::segment::{BlockKey, Phase, RawBlock, SubjectBlocks, Variant};
use crate::util::read_json;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Replacement {
    pub pattern: String,
    #[serde(default)]
    pub replacement: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseGrades {
    pub phase: Phase,
    pub grades: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetAlias {
    pub grades: Vec<String>,
    pub subjects: Vec<String>,
    pub extra_targets: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchRules {
    pub levels: Vec<String>,
    pub phase_grades: Vec<PhaseGrades>,
    pub replacements: Vec<Replacement>,
    pub target_aliases: Vec<TargetAlias>,
    pub special_needs_marker: String,
}

impl Default for MatchRules {
    fn default() -> Self {
        let phase_grades = [
            (Phase::A, &["1", "2"][..]),
            (Phase::B, &["3", "4"][..]),
            (Phase::C, &["5", "6"][..]),
            (Phase::D, &["7", "8", "9"][..]),
            (Phase::E, &["10"][..]),
            (Phase::F, &["11", "12"][..]),
        ]
        .into_iter()
        .map(|(phase, grades)| PhaseGrades {
            phase,
            grades: to_strings(grades),
        })
        .collect();

        let replacements = [
            ("DAN BUDI PEKERTI", ""),
            ("TINGKAT LANJUT", ""),
            ("(IPA)", ""),
            ("(IPS)", ""),
            ("(IPAS)", ""),
            ("ILMU PENGETAHUAN ALAM DAN SOSIAL", "IPAS"),
            ("ILMU PENGETAHUAN ALAM", "IPA"),
            ("ILMU PENGETAHUAN SOSIAL", "IPS"),
            ("JASMANI, OLAHRAGA, DAN KESEHATAN", "PJOK"),
            ("PRAKARYA DAN KEWIRAUSAHAAN", "PKWU"),
            ("PENDIDIKAN AGAMA", "AGAMA"),
        ]
        .into_iter()
        .map(|(pattern, replacement)| Replacement {
            pattern: pattern.to_string(),
            replacement: replacement.to_string(),
        })
        .collect();

        Self {
            levels: to_strings(&["SD", "SMP", "SMA", "SMK"]),
            phase_grades,
            replacements,
            target_aliases: vec![TargetAlias {
                grades: to_strings(&["10"]),
                subjects: to_strings(&["KIMIA", "FISIKA", "BIOLOGI"]),
                extra_targets: to_strings(&["IPA", "IPAS", "ILMUPENGETAHUANALAM"]),
            }],
            special_needs_marker: "LB".to_string(),
        }
    }
}

impl MatchRules {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => read_json(path),
            None => Ok(Self::default()),
        }
    }

    pub fn phases_for_grade(&self, grade: &str) -> Vec<Phase> {
        self.phase_grades
            .iter()
            .filter(|entry| entry.grades.iter().any(|candidate| candidate == grade))
            .map(|entry| entry.phase)
            .collect()
    }
}

fn to_strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}

#[derive(Debug, Clone)]
pub struct NameNormalizer {
    replacements: Vec<(String, String)>,
}

impl NameNormalizer {
    pub fn new(rules: &MatchRules) -> Self {
        Self {
            replacements: rules
                .replacements
                .iter()
                .filter(|rule| !rule.pattern.is_empty())
                .map(|rule| (rule.pattern.to_uppercase(), rule.replacement.to_uppercase()))
                .collect(),
        }
    }

    pub fn normalize(&self, name: &str) -> String {
        let mut current = self.apply_once(name);

        // Repeat only while the name keeps shrinking; this terminates even
        // for rule files whose replacements grow or cycle.
        loop {
            let next = self.apply_once(&current);
            if next.len() >= current.len() {
                return current;
            }
            current = next;
        }
    }

    fn apply_once(&self, name: &str) -> String {
        let mut value = name.to_uppercase();
        for (pattern, replacement) in &self.replacements {
            value = value.replace(pattern.as_str(), replacement);
        }

        value
            .chars()
            .filter(|character| !character.is_whitespace() && *character != ',')
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchPass {
    Exact,
    Substring,
}

impl MatchPass {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Exact => "exact",
            Self::Substring => "substring",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct CpMatch<'a> {
    pub raw_subject: &'a str,
    pub key: BlockKey,
    pub block: &'a RawBlock,
    pub pass: MatchPass,
}

#[derive(Debug)]
struct Candidate<'a> {
    normalized: String,
    raw_subject: &'a str,
    blocks: &'a IndexMap<BlockKey, RawBlock>,
}

#[derive(Debug)]
pub struct SubjectMatcher<'a> {
    rules: &'a MatchRules,
    normalizer: NameNormalizer,
    candidates: Vec<Candidate<'a>>,
}

impl<'a> SubjectMatcher<'a> {
    pub fn new(rules: &'a MatchRules, subjects: &'a SubjectBlocks) -> Self {
        let normalizer = NameNormalizer::new(rules);
        let candidates = subjects
            .iter()
            .map(|(raw_subject, blocks)| Candidate {
                normalized: normalizer.normalize(raw_subject),
                raw_subject: raw_subject.as_str(),
                blocks,
            })
            .filter(|candidate| !candidate.normalized.is_empty())
            .collect();

        Self {
            rules,
            normalizer,
            candidates,
        }
    }

    pub fn search_targets(&self, grade: &str, subject_key: &str) -> Vec<String> {
        let normalized = self.normalizer.normalize(subject_key);
        let mut targets = vec![normalized.clone()];

        for alias in &self.rules.target_aliases {
            let grade_applies = alias.grades.iter().any(|candidate| candidate == grade);
            let subject_applies = alias
                .subjects
                .iter()
                .any(|candidate| self.normalizer.normalize(candidate) == normalized);
            if grade_applies && subject_applies {
                for extra in &alias.extra_targets {
                    if !targets.contains(extra) {
                        targets.push(extra.clone());
                    }
                }
            }
        }

        targets.retain(|target| !target.is_empty());
        targets
    }

    pub fn find(&self, grade: &str, subject_key: &str) -> Option<CpMatch<'a>> {
        let phases = self.rules.phases_for_grade(grade);
        if phases.is_empty() {
            return None;
        }

        for target in self.search_targets(grade, subject_key) {
            let exact = self
                .candidates
                .iter()
                .filter(|candidate| candidate.normalized == target)
                .find_map(|candidate| lookup(candidate, &phases, MatchPass::Exact));
            if exact.is_some() {
                return exact;
            }

            let substring = self
                .candidates
                .iter()
                .filter(|candidate| {
                    candidate.normalized.contains(&target) || target.contains(&candidate.normalized)
                })
                .filter(|candidate| !self.excluded_special_needs(&candidate.normalized, &target))
                .find_map(|candidate| lookup(candidate, &phases, MatchPass::Substring));
            if substring.is_some() {
                return substring;
            }
        }

        None
    }

    fn excluded_special_needs(&self, normalized: &str, target: &str) -> bool {
        let marker = self.rules.special_needs_marker.as_str();
        !marker.is_empty() && normalized.contains(marker) && !target.contains(marker)
    }
}

fn lookup<'a>(candidate: &Candidate<'a>, phases: &[Phase], pass: MatchPass) -> Option<CpMatch<'a>> {
    for phase in phases {
        let keys = [
            BlockKey::new(*phase, Some(Variant::Regular)),
            BlockKey::new(*phase, Some(Variant::Lb)),
            BlockKey::new(*phase, None),
        ];
        for key in keys {
            if let Some(block) = candidate.blocks.get(&key) {
                return Some(CpMatch {
                    raw_subject: candidate.raw_subject,
                    key,
                    block,
                    pass,
                });
            }
        }
    }

    None
}
