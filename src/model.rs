use std::collections::BTreeMap;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const VERBATIM_STORE_VERSION: &str = "2025.Verbatim";

pub type SubjectTree<T> = IndexMap<String, IndexMap<String, IndexMap<String, T>>>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SemesterPlan(Map<String, Value>);

impl SemesterPlan {
    pub fn cp_snippet(&self) -> Option<&str> {
        self.0.get("cp_snippet").and_then(Value::as_str)
    }

    pub fn set_cp_snippet(&mut self, snippet: &str) {
        self.0
            .insert("cp_snippet".to_string(), Value::String(snippet.to_string()));
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IntelSubjectEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ganjil: Option<SemesterPlan>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genap: Option<SemesterPlan>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl IntelSubjectEntry {
    pub fn semesters_mut(&mut self) -> impl Iterator<Item = &mut SemesterPlan> {
        self.ganjil.iter_mut().chain(self.genap.iter_mut())
    }

    pub fn semesters(&self) -> impl Iterator<Item = &SemesterPlan> {
        self.ganjil.iter().chain(self.genap.iter())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IntelStore {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    pub subjects: SubjectTree<IntelSubjectEntry>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerbatimEntry {
    pub cp_full: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl VerbatimEntry {
    pub fn new(cp_full: String) -> Self {
        Self {
            cp_full,
            extra: Map::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerbatimStore {
    pub version: String,
    #[serde(default)]
    pub subjects: SubjectTree<VerbatimEntry>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for VerbatimStore {
    fn default() -> Self {
        Self {
            version: VERBATIM_STORE_VERSION.to_string(),
            subjects: IndexMap::new(),
            extra: Map::new(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SkipCounts {
    pub missing_subject: usize,
    pub missing_phase: usize,
    pub empty_narrative: usize,
    pub shorter_duplicate: usize,
}

impl SkipCounts {
    pub fn total(&self) -> usize {
        self.missing_subject + self.missing_phase + self.empty_narrative + self.shorter_duplicate
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchedEntry {
    pub level: String,
    pub grade: String,
    pub subject_key: String,
    pub source_subject: String,
    pub block_key: String,
    pub phase: String,
    pub pass: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SyncReport {
    pub report_version: u32,
    pub run_id: String,
    pub generated_at: String,
    pub source_path: String,
    pub source_sha256: String,
    pub source_chars: usize,
    pub subjects_segmented: usize,
    pub blocks_retained: usize,
    pub phase_keys: BTreeMap<String, Vec<String>>,
    pub skip_counts: SkipCounts,
    pub updated_entries: usize,
    pub unique_subjects_mapped: usize,
    pub matches: Vec<MatchedEntry>,
    pub unmatched: Vec<String>,
    pub unmapped_subjects: Vec<String>,
    pub dry_run: bool,
}
