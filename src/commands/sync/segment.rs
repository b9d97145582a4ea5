use std::fmt;
use std::mem;

use anyhow::{Context, Result};
use indexmap::IndexMap;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::snippet::SnippetGenerator;
use super::split::ContentSplitter;
use crate::model::SkipCounts;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Phase {
    A,
    B,
    C,
    D,
    E,
    F,
}

impl Phase {
    pub fn from_letter(letter: &str) -> Option<Self> {
        match letter.trim().to_ascii_uppercase().as_str() {
            "A" => Some(Self::A),
            "B" => Some(Self::B),
            "C" => Some(Self::C),
            "D" => Some(Self::D),
            "E" => Some(Self::E),
            "F" => Some(Self::F),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
            Self::E => "E",
            Self::F => "F",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Variant {
    Regular,
    Lb,
}

impl Variant {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Regular => "REGULAR",
            Self::Lb => "LB",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockKey {
    pub phase: Phase,
    pub variant: Option<Variant>,
}

impl BlockKey {
    pub fn new(phase: Phase, variant: Option<Variant>) -> Self {
        Self { phase, variant }
    }
}

impl fmt::Display for BlockKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.variant {
            Some(variant) => write!(f, "{}_{}", self.phase.as_str(), variant.as_str()),
            None => f.write_str(self.phase.as_str()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawBlock {
    pub subject_raw_name: String,
    pub phase: Phase,
    pub variant: Variant,
    pub header_text: String,
    pub full_text: String,
    pub snippet: String,
}

impl RawBlock {
    pub fn key(&self, detect_variants: bool) -> BlockKey {
        BlockKey::new(self.phase, detect_variants.then_some(self.variant))
    }

    pub fn cp_full(&self) -> String {
        if self.header_text.is_empty() {
            self.full_text.clone()
        } else {
            format!("{} {}", self.header_text, self.full_text)
        }
    }
}

pub type SubjectBlocks = IndexMap<String, IndexMap<BlockKey, RawBlock>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    MissingSubject,
    MissingPhase,
    EmptyNarrative,
    ShorterDuplicate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SegmentState {
    #[default]
    Search,
    SubjectHeader,
    SubjectBody,
    FaseHeader,
    FaseBody,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineAction {
    StartSubject,
    FinishTitle,
    StartFase,
    EndFase,
    EndDocument,
}

#[derive(Debug)]
struct LineRule {
    action: LineAction,
    states: &'static [SegmentState],
    pattern: Regex,
}

const ANY_STATE: &[SegmentState] = &[
    SegmentState::Search,
    SegmentState::SubjectHeader,
    SegmentState::SubjectBody,
    SegmentState::FaseHeader,
    SegmentState::FaseBody,
];
const TITLE_STATES: &[SegmentState] = &[SegmentState::SubjectHeader];
const SUBJECT_STATES: &[SegmentState] = &[
    SegmentState::SubjectBody,
    SegmentState::FaseHeader,
    SegmentState::FaseBody,
];
const NARRATIVE_STATES: &[SegmentState] = &[SegmentState::FaseBody];

#[derive(Debug, Default)]
pub struct SegmentMachine {
    pub state: SegmentState,
    pub subject: String,
    pub fase: Option<Phase>,
    title_buffer: Vec<String>,
    block_buffer: Vec<String>,
}

impl SegmentMachine {
    fn flush(&mut self) -> Option<PendingBlock> {
        if self.block_buffer.is_empty() {
            return None;
        }

        Some(PendingBlock {
            subject: self.subject.clone(),
            fase: self.fase,
            lines: mem::take(&mut self.block_buffer),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingBlock {
    pub subject: String,
    pub fase: Option<Phase>,
    pub lines: Vec<String>,
}

#[derive(Debug, Default)]
pub struct Segmentation {
    pub subjects: SubjectBlocks,
    pub skips: SkipCounts,
}

impl Segmentation {
    pub fn blocks_retained(&self) -> usize {
        self.subjects.values().map(IndexMap::len).sum()
    }

    fn record_skip(&mut self, reason: SkipReason) {
        match reason {
            SkipReason::MissingSubject => self.skips.missing_subject += 1,
            SkipReason::MissingPhase => self.skips.missing_phase += 1,
            SkipReason::EmptyNarrative => self.skips.empty_narrative += 1,
            SkipReason::ShorterDuplicate => self.skips.shorter_duplicate += 1,
        }
    }

    fn insert(&mut self, block: RawBlock, key: BlockKey) -> Result<(), SkipReason> {
        let blocks = self
            .subjects
            .entry(block.subject_raw_name.clone())
            .or_default();

        if let Some(existing) = blocks.get(&key) {
            if block.full_text.chars().count() <= existing.full_text.chars().count() {
                return Err(SkipReason::ShorterDuplicate);
            }
            self.skips.shorter_duplicate += 1;
        }

        blocks.insert(key, block);
        Ok(())
    }
}

#[derive(Debug)]
pub struct Segmenter {
    rules: Vec<LineRule>,
    title_phrase: Regex,
    splitter: ContentSplitter,
    snippets: SnippetGenerator,
    detect_variants: bool,
}

impl Segmenter {
    pub fn new(detect_variants: bool) -> Result<Self> {
        let rules = vec![
            LineRule {
                action: LineAction::StartSubject,
                states: ANY_STATE,
                pattern: Regex::new(r"(?i)^[IVXLC\d.]+\s+CAPAIAN PEMBELAJARAN\s*(.*)$")
                    .context("failed to compile subject header regex")?,
            },
            LineRule {
                action: LineAction::FinishTitle,
                states: TITLE_STATES,
                pattern: Regex::new(r"(?i)^[A-Z]\.\s+Rasional")
                    .context("failed to compile rationale marker regex")?,
            },
            LineRule {
                action: LineAction::StartFase,
                states: SUBJECT_STATES,
                pattern: Regex::new(r"^(?:\d+\.\s+)?(?i:fase)\s+([A-F])\b")
                    .context("failed to compile fase header regex")?,
            },
            LineRule {
                action: LineAction::EndFase,
                states: NARRATIVE_STATES,
                pattern: Regex::new(r"^[A-Z]\.\s+(?:Tujuan|Karakteristik|Capaian Pembelajaran)")
                    .context("failed to compile section marker regex")?,
            },
            LineRule {
                action: LineAction::EndDocument,
                states: NARRATIVE_STATES,
                pattern: Regex::new(r"(?i)^KEPALA BADAN$|^TTD\.$|^TONI TOHARUDIN")
                    .context("failed to compile signature block regex")?,
            },
        ];

        Ok(Self {
            rules,
            title_phrase: Regex::new(r"(?i)CAPAIAN PEMBELAJARAN")
                .context("failed to compile title phrase regex")?,
            splitter: ContentSplitter::new()?,
            snippets: SnippetGenerator::new()?,
            detect_variants,
        })
    }

    pub fn segment(&self, text: &str) -> Segmentation {
        let mut machine = SegmentMachine::default();
        let mut segmentation = Segmentation::default();

        for line in text.split('\n') {
            if let Some(pending) = self.step(&mut machine, line) {
                self.retain(&mut segmentation, pending);
            }
        }

        if let Some(pending) = machine.flush() {
            self.retain(&mut segmentation, pending);
        }

        segmentation
    }

    pub fn subject_header_fragment<'l>(&self, line: &'l str) -> Option<&'l str> {
        match self.match_rule(SegmentState::Search, line.trim()) {
            Some((LineAction::StartSubject, fragment)) => Some(fragment.unwrap_or("")),
            _ => None,
        }
    }

    pub fn step(&self, machine: &mut SegmentMachine, raw_line: &str) -> Option<PendingBlock> {
        let line = raw_line.trim();
        if line.is_empty() {
            return None;
        }

        if let Some((action, capture)) = self.match_rule(machine.state, line) {
            return self.apply(machine, action, line, capture);
        }

        match machine.state {
            SegmentState::SubjectHeader => machine.title_buffer.push(line.to_string()),
            SegmentState::FaseHeader => {
                machine.block_buffer.push(line.to_string());
                if line.contains(')') {
                    machine.state = SegmentState::FaseBody;
                }
            }
            SegmentState::FaseBody => machine.block_buffer.push(line.to_string()),
            SegmentState::Search | SegmentState::SubjectBody => {}
        }

        None
    }

    fn match_rule<'l>(
        &self,
        state: SegmentState,
        line: &'l str,
    ) -> Option<(LineAction, Option<&'l str>)> {
        self.rules
            .iter()
            .filter(|rule| rule.states.contains(&state))
            .find_map(|rule| {
                rule.pattern.captures(line).map(|captures| {
                    (
                        rule.action,
                        captures.get(1).map(|capture| capture.as_str()),
                    )
                })
            })
    }

    fn apply(
        &self,
        machine: &mut SegmentMachine,
        action: LineAction,
        line: &str,
        capture: Option<&str>,
    ) -> Option<PendingBlock> {
        match action {
            LineAction::StartSubject => {
                let pending = machine.flush();
                machine.state = SegmentState::SubjectHeader;
                machine.title_buffer = vec![capture.unwrap_or("").trim().to_string()];
                machine.subject.clear();
                machine.fase = None;
                pending
            }
            LineAction::FinishTitle => {
                machine.subject = self.clean_subject_title(&machine.title_buffer);
                machine.title_buffer.clear();
                machine.state = SegmentState::SubjectBody;
                None
            }
            LineAction::StartFase => {
                let pending = machine.flush();
                machine.fase = capture.and_then(Phase::from_letter);
                machine.state = if line.contains(')') {
                    SegmentState::FaseBody
                } else {
                    SegmentState::FaseHeader
                };
                machine.block_buffer = vec![line.to_string()];
                pending
            }
            LineAction::EndFase => {
                let pending = machine.flush();
                machine.state = SegmentState::SubjectBody;
                machine.fase = None;
                pending
            }
            LineAction::EndDocument => {
                let pending = machine.flush();
                machine.state = SegmentState::Search;
                machine.subject.clear();
                machine.fase = None;
                pending
            }
        }
    }

    pub fn clean_subject_title(&self, buffer: &[String]) -> String {
        let joined = collapse_whitespace(&buffer.join(" "));
        let mut name = collapse_whitespace(&self.title_phrase.replace_all(&joined, ""));

        let characters = name.chars().collect::<Vec<char>>();
        let mid = characters.len() / 2;
        let first_half = characters[..mid].iter().collect::<String>();
        let second_half = characters[mid..].iter().collect::<String>();
        if first_half.trim() == second_half.trim() {
            name = first_half.trim().to_string();
        }

        if name.contains(',') {
            let parts = name.split(',').map(str::trim).collect::<Vec<&str>>();
            if parts.len() > 1 && parts[0] == parts[1] {
                name = parts[0].to_string();
            }
        }

        name.trim_matches(|character: char| {
            character == ',' || character == '.' || character.is_whitespace()
        })
        .to_uppercase()
    }

    pub fn build_block(&self, pending: PendingBlock) -> Result<RawBlock, SkipReason> {
        if pending.subject.is_empty() {
            return Err(SkipReason::MissingSubject);
        }
        let phase = pending.fase.ok_or(SkipReason::MissingPhase)?;

        let text = collapse_whitespace(&pending.lines.join(" "));
        let split = self.splitter.split(&text);
        if split.full.is_empty() {
            return Err(SkipReason::EmptyNarrative);
        }

        let variant = if self.detect_variants {
            self.splitter.detect_variant(&split.header)
        } else {
            Variant::Regular
        };
        let snippet = self.snippets.generate(&split.full);

        Ok(RawBlock {
            subject_raw_name: pending.subject,
            phase,
            variant,
            header_text: split.header,
            full_text: split.full,
            snippet,
        })
    }

    fn retain(&self, segmentation: &mut Segmentation, pending: PendingBlock) {
        let outcome = self.build_block(pending).and_then(|block| {
            let key = block.key(self.detect_variants);
            segmentation.insert(block, key)
        });

        if let Err(reason) = outcome {
            segmentation.record_skip(reason);
        }
    }
}

pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<&str>>().join(" ")
}
