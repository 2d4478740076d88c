use std::collections::{HashMap, HashSet};

use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::grid::{CellAddress, column_index};
use super::types::{Language, Role};

pub const LAYOUT_VERSION: u32 = 1;

const BUILTIN_LAYOUT: &str = include_str!("../../layouts/default.json");

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutFile {
    pub layout_version: u32,
    pub documents: Vec<DocumentConfig>,
    pub eras: Vec<EraConfig>,
    pub dates: Vec<DateConfig>,
    #[serde(default)]
    pub groups: Vec<GroupConfig>,
    #[serde(default)]
    pub exclusions: Vec<ExclusionConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentConfig {
    pub id: String,
    pub tab: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EraConfig {
    pub name: String,
    pub first_date: NaiveDate,
    pub last_date: NaiveDate,
    #[serde(default)]
    pub sections: Vec<SectionConfig>,
}

/// Rows are 1-based, as they appear in the spreadsheet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionConfig {
    pub role: Role,
    pub language: Language,
    pub header_row: u32,
    pub data_rows: Vec<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DateConfig {
    pub date: NaiveDate,
    pub label: String,
    pub column: String,
    #[serde(default)]
    pub scan_rows: Option<[u32; 2]>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Pooling {
    Separate,
    Pooled,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupConfig {
    pub name: String,
    pub title: String,
    pub pooling: Pooling,
    pub dates: Vec<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExclusionConfig {
    pub date: NaiveDate,
    pub document: String,
    pub role: Role,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionSpec {
    pub date: NaiveDate,
    pub role: Role,
    pub language: Language,
    pub header: CellAddress,
    pub data: Vec<CellAddress>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScanRange {
    pub column: usize,
    pub first_row: usize,
    pub last_row: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScheduleDay {
    pub date: NaiveDate,
    pub label: String,
    pub era: String,
    pub column: usize,
    pub scan: Option<ScanRange>,
    /// False when the era declares no sections and only the scan range is known.
    pub declared: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct DocumentSpec {
    pub id: String,
    pub tab: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct DateGroup {
    pub name: String,
    pub title: String,
    pub pooling: Pooling,
    pub dates: Vec<NaiveDate>,
}

#[derive(Debug, Clone)]
pub struct SectionLocator {
    documents: Vec<DocumentSpec>,
    days: Vec<ScheduleDay>,
    sections: Vec<SectionSpec>,
    groups: Vec<DateGroup>,
    exclusions: HashSet<(NaiveDate, String, Role)>,
}

impl SectionLocator {
    pub fn builtin() -> Result<Self> {
        Self::from_json(BUILTIN_LAYOUT).context("failed to load built-in layout")
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        let file: LayoutFile = serde_json::from_str(raw).context("failed to parse layout json")?;
        Self::compile(&file)
    }

    pub fn compile(file: &LayoutFile) -> Result<Self> {
        if file.layout_version != LAYOUT_VERSION {
            bail!(
                "unsupported layout_version {} (expected {LAYOUT_VERSION})",
                file.layout_version
            );
        }

        let documents = compile_documents(&file.documents)?;
        validate_eras(&file.eras)?;

        let mut days = Vec::with_capacity(file.dates.len());
        let mut sections = Vec::new();
        let mut seen_dates = HashSet::new();
        let mut seen_labels = HashSet::new();

        for date in &file.dates {
            if !seen_dates.insert(date.date) {
                bail!("date {} is declared twice", date.date);
            }
            if !seen_labels.insert(date.label.as_str()) {
                bail!("date label {:?} is declared twice", date.label);
            }

            let column = column_index(&date.column)
                .with_context(|| format!("invalid column for {}", date.date))?;
            let scan = date
                .scan_rows
                .map(|rows| compile_scan_range(column, rows))
                .transpose()
                .with_context(|| format!("invalid scan_rows for {}", date.date))?;

            let era = era_for(&file.eras, date.date)?;
            if era.sections.is_empty() && scan.is_none() {
                bail!(
                    "date {} falls in era {:?}, which declares no sections, and has no scan_rows",
                    date.date,
                    era.name
                );
            }

            for section in &era.sections {
                sections.push(compile_section(date.date, &date.column, section)?);
            }

            days.push(ScheduleDay {
                date: date.date,
                label: date.label.clone(),
                era: era.name.clone(),
                column,
                scan,
                declared: !era.sections.is_empty(),
            });
        }

        days.sort_by_key(|day| day.date);
        validate_section_overlap(&sections)?;

        let groups = compile_groups(&file.groups, &seen_dates)?;

        let document_ids = documents
            .iter()
            .map(|document| document.id.as_str())
            .collect::<HashSet<_>>();
        let mut exclusions = HashSet::new();
        for exclusion in &file.exclusions {
            if !seen_dates.contains(&exclusion.date) {
                bail!("exclusion names unknown date {}", exclusion.date);
            }
            if !document_ids.contains(exclusion.document.as_str()) {
                bail!("exclusion names unknown document {:?}", exclusion.document);
            }
            exclusions.insert((exclusion.date, exclusion.document.clone(), exclusion.role));
        }

        Ok(Self {
            documents,
            days,
            sections,
            groups,
            exclusions,
        })
    }

    pub fn documents(&self) -> &[DocumentSpec] {
        &self.documents
    }

    pub fn document(&self, id: &str) -> Option<&DocumentSpec> {
        self.documents.iter().find(|document| document.id == id)
    }

    pub fn days(&self) -> &[ScheduleDay] {
        &self.days
    }

    pub fn day(&self, date: NaiveDate) -> Option<&ScheduleDay> {
        self.days.iter().find(|day| day.date == date)
    }

    pub fn resolve_day(&self, query: &str) -> Option<&ScheduleDay> {
        let query = query.trim();
        match NaiveDate::parse_from_str(query, "%Y-%m-%d") {
            Ok(date) => self.day(date),
            Err(_) => self.days.iter().find(|day| day.label == query),
        }
    }

    pub fn sections(&self) -> &[SectionSpec] {
        &self.sections
    }

    pub fn sections_for(&self, date: NaiveDate) -> impl Iterator<Item = &SectionSpec> {
        self.sections
            .iter()
            .filter(move |section| section.date == date)
    }

    /// `None` means the combination is structurally absent and is never reported.
    pub fn section(&self, date: NaiveDate, role: Role, language: Language) -> Option<&SectionSpec> {
        self.sections.iter().find(|section| {
            section.date == date && section.role == role && section.language == language
        })
    }

    pub fn groups(&self) -> &[DateGroup] {
        &self.groups
    }

    pub fn group_of(&self, date: NaiveDate) -> Option<&DateGroup> {
        self.groups.iter().find(|group| group.dates.contains(&date))
    }

    pub fn is_excluded(&self, date: NaiveDate, document: &str, role: Role) -> bool {
        self.exclusions.contains(&(date, document.to_string(), role))
    }
}

fn compile_documents(configs: &[DocumentConfig]) -> Result<Vec<DocumentSpec>> {
    if configs.is_empty() {
        bail!("layout declares no documents");
    }

    let mut seen = HashSet::new();
    let mut documents = Vec::with_capacity(configs.len());
    for config in configs {
        let id = config.id.trim();
        if id.is_empty() {
            bail!("document id must not be empty (tab {:?})", config.tab);
        }
        if !seen.insert(id) {
            bail!("document id {id:?} is declared twice");
        }
        documents.push(DocumentSpec {
            id: id.to_string(),
            tab: config.tab.clone(),
        });
    }

    Ok(documents)
}

fn validate_eras(eras: &[EraConfig]) -> Result<()> {
    for era in eras {
        if era.first_date > era.last_date {
            bail!(
                "era {:?} ends ({}) before it starts ({})",
                era.name,
                era.last_date,
                era.first_date
            );
        }

        let mut pairs = HashSet::new();
        for section in &era.sections {
            if !pairs.insert((section.role, section.language)) {
                bail!(
                    "era {:?} declares {}/{} twice",
                    era.name,
                    section.role,
                    section.language
                );
            }
        }
    }

    for (index, era) in eras.iter().enumerate() {
        for other in &eras[index + 1..] {
            if era.first_date <= other.last_date && other.first_date <= era.last_date {
                bail!("eras {:?} and {:?} overlap", era.name, other.name);
            }
        }
    }

    Ok(())
}

fn era_for(eras: &[EraConfig], date: NaiveDate) -> Result<&EraConfig> {
    eras.iter()
        .find(|era| era.first_date <= date && date <= era.last_date)
        .with_context(|| format!("date {date} is not covered by any era"))
}

fn compile_scan_range(column: usize, rows: [u32; 2]) -> Result<ScanRange> {
    let [first, last] = rows;
    if first == 0 || last < first {
        bail!("scan rows must be 1-based and ascending, got [{first}, {last}]");
    }

    Ok(ScanRange {
        column,
        first_row: first as usize - 1,
        last_row: last as usize - 1,
    })
}

fn compile_section(date: NaiveDate, column: &str, config: &SectionConfig) -> Result<SectionSpec> {
    let context = || format!("{date} {}/{}", config.role, config.language);

    let Some(&first_data_row) = config.data_rows.first() else {
        bail!("{} has no data rows", context());
    };
    if config.data_rows.contains(&config.header_row) {
        bail!("{}: header row {} is also a data row", context(), config.header_row);
    }
    if first_data_row != config.header_row + 1 {
        bail!(
            "{}: header row {} must immediately precede first data row {}",
            context(),
            config.header_row,
            first_data_row
        );
    }

    let header = CellAddress::from_a1(column, config.header_row).with_context(context)?;
    let data = config
        .data_rows
        .iter()
        .map(|row| CellAddress::from_a1(column, *row))
        .collect::<Result<Vec<_>>>()
        .with_context(context)?;

    Ok(SectionSpec {
        date,
        role: config.role,
        language: config.language,
        header,
        data,
    })
}

fn validate_section_overlap(sections: &[SectionSpec]) -> Result<()> {
    let mut owners: HashMap<(NaiveDate, CellAddress), (Role, Language)> = HashMap::new();

    for section in sections {
        let addresses = std::iter::once(section.header).chain(section.data.iter().copied());
        for address in addresses {
            if let Some((role, language)) =
                owners.insert((section.date, address), (section.role, section.language))
            {
                bail!(
                    "{} cell {address} is claimed by both {role}/{language} and {}/{}",
                    section.date,
                    section.role,
                    section.language
                );
            }
        }
    }

    Ok(())
}

fn compile_groups(configs: &[GroupConfig], known: &HashSet<NaiveDate>) -> Result<Vec<DateGroup>> {
    let mut placed = HashSet::new();
    let mut groups = Vec::with_capacity(configs.len());

    for config in configs {
        for date in &config.dates {
            if !known.contains(date) {
                bail!("group {:?} names unknown date {date}", config.name);
            }
            if !placed.insert(*date) {
                bail!("date {date} belongs to more than one group");
            }
        }

        let mut dates = config.dates.clone();
        dates.sort();
        groups.push(DateGroup {
            name: config.name.clone(),
            title: config.title.clone(),
            pooling: config.pooling,
            dates,
        });
    }

    Ok(groups)
}
