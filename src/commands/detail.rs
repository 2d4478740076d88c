use std::io::{self, Write};

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use crate::cli::DetailArgs;
use crate::schedule::{BlockResult, Language, Role, SectionLocator, Tally, section_detail};
use crate::snapshot::{load_grids, snapshot_dir};
use crate::util::write_json_stdout;

#[derive(Debug, Serialize)]
struct DetailResponse {
    date: String,
    label: String,
    document: String,
    tab: String,
    sections: Vec<SectionRow>,
}

#[derive(Debug, Serialize)]
struct SectionRow {
    role: Role,
    language: Language,
    quota: Tally,
    filled: Tally,
    empty: Tally,
    ignored: Tally,
    vacancy: Tally,
    malformed: Vec<MalformedCell>,
}

#[derive(Debug, Serialize)]
struct MalformedCell {
    cell: String,
    text: String,
}

pub fn run(args: DetailArgs, locator: &SectionLocator) -> Result<()> {
    let day = locator
        .resolve_day(&args.date)
        .with_context(|| format!("unknown date: {}", args.date))?;
    let document = locator
        .document(&args.document)
        .with_context(|| format!("unknown document: {}", args.document))?;

    let grids = load_grids(&snapshot_dir(&args.cache_root), locator)?;
    let results = section_detail(locator, &grids, day.date, &document.id);
    info!(
        date = %day.date,
        document = %document.id,
        sections = results.len(),
        "section detail evaluated"
    );

    let response = DetailResponse {
        date: day.date.to_string(),
        label: day.label.clone(),
        document: document.id.clone(),
        tab: document.tab.clone(),
        sections: results.iter().map(section_row).collect(),
    };

    if args.json {
        write_json_stdout(&response)
    } else {
        write_text(&response)
    }
}

fn section_row(result: &BlockResult) -> SectionRow {
    SectionRow {
        role: result.role,
        language: result.language,
        quota: result.quota(),
        filled: result.filled(),
        empty: result.empty(),
        ignored: result.ignored(),
        vacancy: result.vacancy(),
        malformed: result
            .malformed
            .iter()
            .map(|diagnostic| MalformedCell {
                cell: diagnostic.address.to_a1(),
                text: diagnostic.text.clone(),
            })
            .collect(),
    }
}

fn write_text(response: &DetailResponse) -> Result<()> {
    let mut output = io::BufWriter::new(io::stdout().lock());

    writeln!(
        output,
        "{} ({})\tteam {}\t{}",
        response.label, response.date, response.document, response.tab
    )?;
    if response.sections.is_empty() {
        writeln!(output, "\t(no declared sections)")?;
    }

    for section in &response.sections {
        writeln!(
            output,
            "\t{}/{}\tquota={} filled={} empty={} ignored={} vacancy={}",
            section.role,
            section.language,
            section.quota,
            section.filled,
            section.empty,
            section.ignored,
            section.vacancy,
        )?;
        for cell in &section.malformed {
            writeln!(output, "\t\tmalformed {}: {:?}", cell.cell, cell.text)?;
        }
    }

    output.flush()?;
    Ok(())
}
