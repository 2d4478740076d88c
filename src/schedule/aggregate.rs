use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;

use super::block::{BlockResult, evaluate_block};
use super::grid::GridSet;
use super::layout::{DateGroup, Pooling, SectionLocator};
use super::types::{Language, Role, Tally};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentVacancy {
    pub document: String,
    pub vacancy: Tally,
    /// Declared not applicable for this date/role; left out of pooled sums.
    pub excluded: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VacancyCell {
    pub document: Option<String>,
    pub role: Role,
    pub vacancy: Tally,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub breakdown: Vec<DocumentVacancy>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VacancyRow {
    pub date: NaiveDate,
    pub label: String,
    pub cells: Vec<VacancyCell>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VacancyTable {
    pub group: String,
    pub title: String,
    pub pooling: Pooling,
    pub rows: Vec<VacancyRow>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VacancyReport {
    pub language: Language,
    pub tables: Vec<VacancyTable>,
}

pub fn vacancy_table(locator: &SectionLocator, grids: &GridSet, language: Language) -> VacancyReport {
    let tables = locator
        .groups()
        .iter()
        .map(|group| build_table(locator, grids, group, language))
        .collect();

    VacancyReport { language, tables }
}

fn build_table(
    locator: &SectionLocator,
    grids: &GridSet,
    group: &DateGroup,
    language: Language,
) -> VacancyTable {
    let mut rows = Vec::with_capacity(group.dates.len());

    for date in &group.dates {
        let cells = match group.pooling {
            Pooling::Separate => separate_cells(locator, grids, *date, language),
            Pooling::Pooled => pooled_cells(locator, grids, *date, language),
        };
        if cells.is_empty() {
            debug!(date = %date, language = %language, "no declared sections; row omitted");
            continue;
        }

        let label = locator
            .day(*date)
            .map(|day| day.label.clone())
            .unwrap_or_else(|| date.to_string());
        rows.push(VacancyRow {
            date: *date,
            label,
            cells,
        });
    }

    VacancyTable {
        group: group.name.clone(),
        title: group.title.clone(),
        pooling: group.pooling,
        rows,
    }
}

fn separate_cells(
    locator: &SectionLocator,
    grids: &GridSet,
    date: NaiveDate,
    language: Language,
) -> Vec<VacancyCell> {
    let mut cells = Vec::new();

    for document in locator.documents() {
        for role in Role::ALL {
            let Some(part) = contribution(locator, grids, date, &document.id, role, language) else {
                continue;
            };

            let vacancy = if part.excluded {
                Tally::NotApplicable
            } else {
                part.vacancy
            };
            cells.push(VacancyCell {
                document: Some(document.id.clone()),
                role,
                vacancy,
                breakdown: Vec::new(),
            });
        }
    }

    cells
}

fn pooled_cells(
    locator: &SectionLocator,
    grids: &GridSet,
    date: NaiveDate,
    language: Language,
) -> Vec<VacancyCell> {
    let mut cells = Vec::new();

    for role in Role::ALL {
        let breakdown = locator
            .documents()
            .iter()
            .filter_map(|document| contribution(locator, grids, date, &document.id, role, language))
            .collect::<Vec<_>>();
        if breakdown.is_empty() {
            continue;
        }

        let mut included = breakdown.iter().filter(|part| !part.excluded).peekable();
        let vacancy = if included.peek().is_none() {
            Tally::NotApplicable
        } else {
            included.fold(Tally::Count(0), |total, part| total + part.vacancy)
        };

        cells.push(VacancyCell {
            document: None,
            role,
            vacancy,
            breakdown,
        });
    }

    cells
}

/// `None` when the section is structurally absent for this date.
fn contribution(
    locator: &SectionLocator,
    grids: &GridSet,
    date: NaiveDate,
    document: &str,
    role: Role,
    language: Language,
) -> Option<DocumentVacancy> {
    let spec = locator.section(date, role, language)?;

    let vacancy = match grids.get(document) {
        Some(grid) => evaluate_block(grid, document, spec).vacancy(),
        None => Tally::NotApplicable,
    };

    Some(DocumentVacancy {
        document: document.to_string(),
        vacancy,
        excluded: locator.is_excluded(date, document, role),
    })
}

pub fn section_detail(
    locator: &SectionLocator,
    grids: &GridSet,
    date: NaiveDate,
    document: &str,
) -> Vec<BlockResult> {
    let grid = grids.get(document);

    locator
        .sections_for(date)
        .map(|spec| match grid {
            Some(grid) => evaluate_block(grid, document, spec),
            None => BlockResult::not_applicable(document, spec),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::grid::Grid;
    use crate::schedule::layout::LayoutFile;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 7, day).unwrap()
    }

    // 7/1 in column B and 7/2 in column C are reported per team; 7/3 in
    // column D is pooled, with team B declared out for participants.
    fn locator() -> SectionLocator {
        let file: LayoutFile = serde_json::from_str(
            r#"
            {
              "layout_version": 1,
              "documents": [{"id": "A", "tab": "team-a"}, {"id": "B", "tab": "team-b"}],
              "eras": [
                {
                  "name": "only",
                  "first_date": "2025-07-01",
                  "last_date": "2025-07-04",
                  "sections": [
                    {"role": "judge", "language": "zh", "header_row": 1, "data_rows": [2, 3]},
                    {"role": "participant", "language": "zh", "header_row": 4, "data_rows": [5, 6]}
                  ]
                }
              ],
              "dates": [
                {"date": "2025-07-01", "label": "7/1", "column": "B"},
                {"date": "2025-07-02", "label": "7/2", "column": "C"},
                {"date": "2025-07-03", "label": "7/3", "column": "D"}
              ],
              "groups": [
                {"name": "regular", "title": "7/1-7/2", "pooling": "separate", "dates": ["2025-07-01", "2025-07-02"]},
                {"name": "finals", "title": "7/3", "pooling": "pooled", "dates": ["2025-07-03"]}
              ],
              "exclusions": [{"date": "2025-07-03", "document": "B", "role": "participant"}]
            }
            "#,
        )
        .unwrap();
        SectionLocator::compile(&file).unwrap()
    }

    fn team_a() -> Grid {
        Grid::from_rows(vec![
            vec!["", "[judge] zh 2", "", "[judge] zh 3"],
            vec!["", "[p] x", "[p] x", "[p] x"],
            vec!["", "[q]", "", ""],
            vec!["", "[participant] zh 2", "[participant] zh 1", "[participant] zh 2"],
            vec!["", "y", "y", ""],
            vec!["", "", "z", ""],
        ])
    }

    fn team_b() -> Grid {
        team_b_with_finals_header("[심사위원] 중국어 2")
    }

    fn team_b_with_finals_header(header: &str) -> Grid {
        Grid::from_rows(vec![
            vec!["", "[심사위원] 중국어 2", "[심사위원] 중국어 2", header],
            vec!["", "", "", ""],
            vec!["", "", "", "[r] w"],
            vec!["", "[참가자] 중국어 1", "", "[참가자] 중국어 5"],
            vec!["", "", "", "v"],
            vec!["", "", "", ""],
        ])
    }

    fn cell_values(row: &VacancyRow) -> Vec<(Option<&str>, Role, Tally)> {
        row.cells
            .iter()
            .map(|cell| (cell.document.as_deref(), cell.role, cell.vacancy))
            .collect()
    }

    #[test]
    fn separate_group_reports_each_document_and_role() {
        let grids = GridSet::new().with("A", team_a()).with("B", team_b());
        let report = vacancy_table(&locator(), &grids, Language::Zh);

        let regular = &report.tables[0];
        assert_eq!(regular.rows.len(), 2);
        assert_eq!(
            cell_values(&regular.rows[0]),
            vec![
                (Some("A"), Role::Judge, Tally::Count(1)),
                (Some("A"), Role::Participant, Tally::Count(1)),
                (Some("B"), Role::Judge, Tally::Count(2)),
                (Some("B"), Role::Participant, Tally::Count(1)),
            ]
        );
        assert_eq!(
            cell_values(&regular.rows[1]),
            vec![
                (Some("A"), Role::Judge, Tally::NotApplicable),
                (Some("A"), Role::Participant, Tally::Count(-1)),
                (Some("B"), Role::Judge, Tally::Count(2)),
                (Some("B"), Role::Participant, Tally::NotApplicable),
            ]
        );
    }

    #[test]
    fn pooled_group_sums_included_documents_with_breakdown() {
        let grids = GridSet::new().with("A", team_a()).with("B", team_b());
        let report = vacancy_table(&locator(), &grids, Language::Zh);

        let finals = &report.tables[1];
        assert_eq!(finals.pooling, Pooling::Pooled);
        assert_eq!(
            cell_values(&finals.rows[0]),
            vec![
                (None, Role::Judge, Tally::Count(3)),
                (None, Role::Participant, Tally::Count(2)),
            ]
        );

        let participant = &finals.rows[0].cells[1];
        assert_eq!(
            participant.breakdown,
            vec![
                DocumentVacancy {
                    document: "A".to_string(),
                    vacancy: Tally::Count(2),
                    excluded: false
                },
                DocumentVacancy {
                    document: "B".to_string(),
                    vacancy: Tally::Count(4),
                    excluded: true
                },
            ]
        );
    }

    #[test]
    fn pooled_sum_with_a_not_applicable_part_is_not_applicable() {
        let b = team_b_with_finals_header("");
        let grids = GridSet::new().with("A", team_a()).with("B", b);
        let report = vacancy_table(&locator(), &grids, Language::Zh);

        let judge = &report.tables[1].rows[0].cells[0];
        assert_eq!(judge.breakdown[0].vacancy, Tally::Count(2));
        assert_eq!(judge.breakdown[1].vacancy, Tally::NotApplicable);
        assert_eq!(judge.vacancy, Tally::NotApplicable);
    }

    #[test]
    fn missing_document_grid_reports_not_applicable() {
        let grids = GridSet::new().with("A", team_a());
        let report = vacancy_table(&locator(), &grids, Language::Zh);

        let first = &report.tables[0].rows[0];
        assert_eq!(first.cells[0].vacancy, Tally::Count(1));
        assert_eq!(first.cells[2].vacancy, Tally::NotApplicable);
        assert_eq!(first.cells[3].vacancy, Tally::NotApplicable);
        assert_eq!(
            report.tables[1].rows[0].cells[0].vacancy,
            Tally::NotApplicable
        );
    }

    #[test]
    fn structurally_absent_language_produces_no_rows() {
        let grids = GridSet::new().with("A", team_a()).with("B", team_b());
        let report = vacancy_table(&locator(), &grids, Language::Ja);
        assert!(report.tables.iter().all(|table| table.rows.is_empty()));
    }

    #[test]
    fn vacancy_table_is_idempotent() {
        let grids = GridSet::new().with("A", team_a()).with("B", team_b());
        let locator = locator();
        assert_eq!(
            vacancy_table(&locator, &grids, Language::Zh),
            vacancy_table(&locator, &grids, Language::Zh)
        );
    }

    #[test]
    fn section_detail_lists_every_declared_section() {
        let grids = GridSet::new().with("A", team_a());
        let locator = locator();

        let detail = section_detail(&locator, &grids, date(1), "A");
        assert_eq!(detail.len(), 2);
        assert_eq!(detail[0].role, Role::Judge);
        assert_eq!(detail[0].vacancy(), Tally::Count(1));

        let absent = section_detail(&locator, &grids, date(1), "B");
        assert!(absent.iter().all(|result| result.vacancy() == Tally::NotApplicable));

        assert!(section_detail(&locator, &grids, date(4), "A").is_empty());
    }
}
