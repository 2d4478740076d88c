use std::io::{self, Write};

use anyhow::Result;
use serde::Serialize;

use crate::cli::LayoutArgs;
use crate::schedule::{CellAddress, Language, Role, SectionLocator};
use crate::util::write_json_stdout;

#[derive(Debug, Serialize)]
struct LayoutView {
    documents: Vec<DocumentView>,
    days: Vec<DayView>,
}

#[derive(Debug, Serialize)]
struct DocumentView {
    id: String,
    tab: String,
}

#[derive(Debug, Serialize)]
struct DayView {
    date: String,
    label: String,
    era: String,
    group: Option<String>,
    scan_range: Option<String>,
    sections: Vec<SectionView>,
}

#[derive(Debug, Serialize)]
struct SectionView {
    role: Role,
    language: Language,
    header: String,
    data: Vec<String>,
}

pub fn run(args: LayoutArgs, locator: &SectionLocator) -> Result<()> {
    let view = build_view(locator);

    if args.json {
        write_json_stdout(&view)
    } else {
        write_text(&view)
    }
}

fn build_view(locator: &SectionLocator) -> LayoutView {
    let documents = locator
        .documents()
        .iter()
        .map(|document| DocumentView {
            id: document.id.clone(),
            tab: document.tab.clone(),
        })
        .collect();

    let days = locator
        .days()
        .iter()
        .map(|day| DayView {
            date: day.date.to_string(),
            label: day.label.clone(),
            era: day.era.clone(),
            group: locator.group_of(day.date).map(|group| group.name.clone()),
            scan_range: day.scan.map(|scan| {
                format!(
                    "{}:{}",
                    CellAddress::new(scan.first_row, scan.column),
                    CellAddress::new(scan.last_row, scan.column)
                )
            }),
            sections: locator
                .sections_for(day.date)
                .map(|section| SectionView {
                    role: section.role,
                    language: section.language,
                    header: section.header.to_a1(),
                    data: section.data.iter().map(|address| address.to_a1()).collect(),
                })
                .collect(),
        })
        .collect();

    LayoutView { documents, days }
}

fn write_text(view: &LayoutView) -> Result<()> {
    let mut output = io::BufWriter::new(io::stdout().lock());

    for document in &view.documents {
        writeln!(output, "Document {}\t{}", document.id, document.tab)?;
    }

    for day in &view.days {
        writeln!(
            output,
            "{}\t{}\tera={}\tgroup={}\tscan={}",
            day.date,
            day.label,
            day.era,
            day.group.as_deref().unwrap_or("-"),
            day.scan_range.as_deref().unwrap_or("-"),
        )?;
        if day.sections.is_empty() {
            writeln!(output, "\t(undeclared; upward scan only)")?;
        }
        for section in &day.sections {
            writeln!(
                output,
                "\t{}/{}\theader {}\tdata {}",
                section.role,
                section.language,
                section.header,
                section.data.join(",")
            )?;
        }
    }

    output.flush()?;
    Ok(())
}
