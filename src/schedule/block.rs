use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, warn};

use super::grid::{CellAddress, Grid};
use super::header::parse_header;
use super::layout::SectionSpec;
use super::slot::{IgnoreReason, SlotState, classify_slot};
use super::types::{Language, Role, Tally};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SlotCounts {
    pub quota: i64,
    pub filled: i64,
    pub empty: i64,
    pub ignored: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockOutcome {
    Counted(SlotCounts),
    NotApplicable,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlotDiagnostic {
    pub address: CellAddress,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockResult {
    pub document: String,
    pub date: NaiveDate,
    pub role: Role,
    pub language: Language,
    pub outcome: BlockOutcome,
    pub malformed: Vec<SlotDiagnostic>,
}

impl BlockResult {
    pub fn not_applicable(document: &str, spec: &SectionSpec) -> Self {
        Self {
            document: document.to_string(),
            date: spec.date,
            role: spec.role,
            language: spec.language,
            outcome: BlockOutcome::NotApplicable,
            malformed: Vec::new(),
        }
    }

    pub fn counts(&self) -> Option<SlotCounts> {
        match self.outcome {
            BlockOutcome::Counted(counts) => Some(counts),
            BlockOutcome::NotApplicable => None,
        }
    }

    pub fn quota(&self) -> Tally {
        self.tally(|counts| counts.quota)
    }

    pub fn filled(&self) -> Tally {
        self.tally(|counts| counts.filled)
    }

    pub fn empty(&self) -> Tally {
        self.tally(|counts| counts.empty)
    }

    pub fn ignored(&self) -> Tally {
        self.tally(|counts| counts.ignored)
    }

    /// `quota - filled`, unclamped: a negative value signals over-booking.
    pub fn vacancy(&self) -> Tally {
        self.tally(|counts| counts.quota - counts.filled)
    }

    fn tally(&self, pick: impl Fn(&SlotCounts) -> i64) -> Tally {
        self.counts()
            .map(|counts| Tally::Count(pick(&counts)))
            .unwrap_or(Tally::NotApplicable)
    }
}

pub fn evaluate_block(grid: &Grid, document: &str, spec: &SectionSpec) -> BlockResult {
    let header = parse_header(grid.cell(spec.header), spec.role, spec.language);
    let Tally::Count(quota) = header.quota else {
        debug!(
            document,
            date = %spec.date,
            role = %spec.role,
            language = %spec.language,
            header = %spec.header,
            "section header not parseable"
        );
        return BlockResult::not_applicable(document, spec);
    };

    let mut counts = SlotCounts {
        quota,
        ..SlotCounts::default()
    };
    let mut malformed = Vec::new();

    for address in &spec.data {
        let text = grid.cell(*address);
        match classify_slot(text, spec.role) {
            SlotState::Filled => counts.filled += 1,
            SlotState::Empty => counts.empty += 1,
            SlotState::Ignored(reason) => {
                counts.ignored += 1;
                if reason == IgnoreReason::Malformed {
                    warn!(
                        document,
                        date = %spec.date,
                        role = %spec.role,
                        language = %spec.language,
                        cell = %address,
                        text,
                        "slot text has no bracket tag; not counted"
                    );
                    malformed.push(SlotDiagnostic {
                        address: *address,
                        text: text.to_string(),
                    });
                }
            }
        }
    }

    BlockResult {
        document: document.to_string(),
        date: spec.date,
        role: spec.role,
        language: spec.language,
        outcome: BlockOutcome::Counted(counts),
        malformed,
    }
}
