use std::collections::HashSet;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, warn};

use super::grid::{CellAddress, Grid, GridSet};
use super::header::parse_header_context;
use super::layout::{Pooling, ScanRange, ScheduleDay, SectionLocator, SectionSpec};
use super::slot::split_bracket_tag;
use super::types::{Language, Role};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct AssignmentRecord {
    pub document: String,
    pub date: NaiveDate,
    pub label: String,
    pub role: Role,
    pub language: Language,
    pub occupant: String,
    /// Judge the occupant interprets for; only set for judge sections.
    pub partner: Option<String>,
    /// Context came from scanning upward rather than from a declared section.
    pub inferred: bool,
}

pub fn lookup_person(locator: &SectionLocator, grids: &GridSet, name: &str) -> Vec<AssignmentRecord> {
    let mut records = Vec::new();
    for document in locator.documents() {
        match grids.get(&document.id) {
            Some(grid) => records.extend(find_assignments(grid, &document.id, locator, name)),
            None => debug!(document = %document.id, "no grid for document; skipping lookup"),
        }
    }

    dedup_records(records)
}

pub fn find_assignments(
    grid: &Grid,
    document: &str,
    locator: &SectionLocator,
    name: &str,
) -> Vec<AssignmentRecord> {
    let target = name.trim();
    if target.is_empty() {
        return Vec::new();
    }

    let mut records = Vec::new();
    for day in locator.days() {
        let mut covered = HashSet::new();
        for spec in locator.sections_for(day.date) {
            collect_declared_hits(grid, document, day, spec, target, &mut records);
            covered.insert(spec.header.row);
            covered.extend(spec.data.iter().map(|address| address.row));
        }

        // Rows of the scan range outside every declared section.
        if let Some(scan) = day.scan {
            collect_scanned_hits(grid, document, day, scan, &covered, target, &mut records);
        }
    }

    dedup_records(records)
}

fn collect_declared_hits(
    grid: &Grid,
    document: &str,
    day: &ScheduleDay,
    spec: &SectionSpec,
    target: &str,
    records: &mut Vec<AssignmentRecord>,
) {
    for address in &spec.data {
        let text = grid.cell(*address);
        if !text.contains(target) {
            continue;
        }

        let (occupant, partner) = split_occupant(text, spec.role);
        if occupant != target {
            debug!(document, cell = %address, text, "substring hit is a different occupant");
            continue;
        }

        records.push(AssignmentRecord {
            document: document.to_string(),
            date: day.date,
            label: day.label.clone(),
            role: spec.role,
            language: spec.language,
            occupant: occupant.to_string(),
            partner: partner.map(ToOwned::to_owned),
            inferred: false,
        });
    }
}

// Best-effort: relies on no other header-shaped text sitting between a hit and its header.
fn collect_scanned_hits(
    grid: &Grid,
    document: &str,
    day: &ScheduleDay,
    scan: ScanRange,
    covered: &HashSet<usize>,
    target: &str,
    records: &mut Vec<AssignmentRecord>,
) {
    for row in scan.first_row..=scan.last_row {
        if covered.contains(&row) {
            continue;
        }

        let address = CellAddress::new(row, scan.column);
        let text = grid.cell(address);
        if !text.contains(target) || parse_header_context(text).is_some() {
            continue;
        }

        let context = (scan.first_row..row).rev().find_map(|above| {
            parse_header_context(grid.cell(CellAddress::new(above, scan.column)))
        });
        let Some((role, language)) = context else {
            warn!(
                document,
                date = %day.date,
                cell = %address,
                "no section header above scanned hit; skipped"
            );
            continue;
        };

        let (occupant, partner) = split_occupant(text, role);
        if occupant != target {
            continue;
        }

        records.push(AssignmentRecord {
            document: document.to_string(),
            date: day.date,
            label: day.label.clone(),
            role,
            language,
            occupant: occupant.to_string(),
            partner: partner.map(ToOwned::to_owned),
            inferred: true,
        });
    }
}

/// Splits a slot cell into (occupant, partner). The bracket contents are the
/// judge and only count as a partner in judge sections.
fn split_occupant(text: &str, role: Role) -> (&str, Option<&str>) {
    match split_bracket_tag(text) {
        Some(tag) => {
            let partner = (role == Role::Judge).then_some(tag.tag);
            (tag.rest, partner)
        }
        None => (text.trim(), None),
    }
}

fn dedup_records(records: Vec<AssignmentRecord>) -> Vec<AssignmentRecord> {
    let mut seen = HashSet::new();
    records
        .into_iter()
        .filter(|record| seen.insert(record.clone()))
        .collect()
}

#[derive(Debug, Clone, Serialize)]
pub struct ScheduleBucket {
    pub group: String,
    pub title: String,
    pub document: Option<String>,
    pub records: Vec<AssignmentRecord>,
}

pub fn group_schedule(locator: &SectionLocator, records: &[AssignmentRecord]) -> Vec<ScheduleBucket> {
    let mut buckets = Vec::new();

    for group in locator.groups() {
        let in_group = records
            .iter()
            .filter(|record| group.dates.contains(&record.date));

        match group.pooling {
            Pooling::Separate => {
                for document in locator.documents() {
                    buckets.push(ScheduleBucket {
                        group: group.name.clone(),
                        title: group.title.clone(),
                        document: Some(document.id.clone()),
                        records: sorted(
                            in_group
                                .clone()
                                .filter(|record| record.document == document.id),
                        ),
                    });
                }
            }
            Pooling::Pooled => buckets.push(ScheduleBucket {
                group: group.name.clone(),
                title: group.title.clone(),
                document: None,
                records: sorted(in_group),
            }),
        }
    }

    let ungrouped = sorted(
        records
            .iter()
            .filter(|record| locator.group_of(record.date).is_none()),
    );
    if !ungrouped.is_empty() {
        buckets.push(ScheduleBucket {
            group: "ungrouped".to_string(),
            title: "other dates".to_string(),
            document: None,
            records: ungrouped,
        });
    }

    buckets
}

fn sorted<'a>(records: impl Iterator<Item = &'a AssignmentRecord>) -> Vec<AssignmentRecord> {
    let mut records = records.cloned().collect::<Vec<_>>();
    records.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.document.cmp(&b.document)));
    records
}
