use std::io::{self, Write};

use anyhow::Result;
use tracing::info;

use crate::cli::VacancyArgs;
use crate::schedule::{DocumentVacancy, SectionLocator, VacancyCell, VacancyReport, vacancy_table};
use crate::snapshot::{load_grids, snapshot_dir};
use crate::util::write_json_stdout;

pub fn run(args: VacancyArgs, locator: &SectionLocator) -> Result<()> {
    let grids = load_grids(&snapshot_dir(&args.cache_root), locator)?;

    let report = vacancy_table(locator, &grids, args.language);
    info!(
        language = %args.language,
        tables = report.tables.len(),
        rows = report.tables.iter().map(|table| table.rows.len()).sum::<usize>(),
        "vacancy table built"
    );

    if args.json {
        write_json_stdout(&report)
    } else {
        write_text(&report)
    }
}

fn write_text(report: &VacancyReport) -> Result<()> {
    let mut output = io::BufWriter::new(io::stdout().lock());

    writeln!(output, "Language: {}", report.language)?;

    for table in &report.tables {
        writeln!(output, "[{}] {}", table.group, table.title)?;

        let Some(first) = table.rows.first() else {
            writeln!(output, "\t(no declared sections)")?;
            continue;
        };

        let headings = first.cells.iter().map(column_heading).collect::<Vec<_>>();
        writeln!(output, "\tdate\t{}", headings.join("\t"))?;

        for row in &table.rows {
            let values = row.cells.iter().map(render_cell).collect::<Vec<_>>();
            writeln!(output, "\t{}\t{}", row.label, values.join("\t"))?;
        }
    }

    output.flush()?;
    Ok(())
}

fn column_heading(cell: &VacancyCell) -> String {
    match &cell.document {
        Some(document) => format!("{document} {}", cell.role),
        None => cell.role.to_string(),
    }
}

fn render_cell(cell: &VacancyCell) -> String {
    if cell.breakdown.is_empty() {
        return cell.vacancy.to_string();
    }

    let parts = cell.breakdown.iter().map(render_part).collect::<Vec<_>>();
    format!("{} ({})", cell.vacancy, parts.join(", "))
}

fn render_part(part: &DocumentVacancy) -> String {
    if part.excluded {
        format!("{}=excluded", part.document)
    } else {
        format!("{}={}", part.document, part.vacancy)
    }
}
