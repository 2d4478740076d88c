use std::io::{self, Write};

use anyhow::Result;
use serde::Serialize;
use tracing::info;

use crate::cli::LookupArgs;
use crate::schedule::{
    AssignmentRecord, Role, ScheduleBucket, SectionLocator, group_schedule, lookup_person,
};
use crate::snapshot::{load_grids, snapshot_dir};
use crate::util::write_json_stdout;

#[derive(Debug, Serialize)]
struct LookupResponse {
    name: String,
    returned: usize,
    buckets: Vec<ScheduleBucket>,
}

pub fn run(args: LookupArgs, locator: &SectionLocator) -> Result<()> {
    let grids = load_grids(&snapshot_dir(&args.cache_root), locator)?;

    let records = lookup_person(locator, &grids, &args.name);
    info!(name = %args.name, returned = records.len(), "lookup completed");

    let response = LookupResponse {
        name: args.name.trim().to_string(),
        returned: records.len(),
        buckets: group_schedule(locator, &records),
    };

    if args.json {
        write_json_stdout(&response)
    } else {
        write_text(&response)
    }
}

fn write_text(response: &LookupResponse) -> Result<()> {
    let mut output = io::BufWriter::new(io::stdout().lock());

    writeln!(output, "Name: {}", response.name)?;
    writeln!(output, "Assignments: {}", response.returned)?;

    for bucket in &response.buckets {
        match &bucket.document {
            Some(document) => writeln!(output, "[{}] {} - team {}", bucket.group, bucket.title, document)?,
            None => writeln!(output, "[{}] {}", bucket.group, bucket.title)?,
        }

        if bucket.records.is_empty() {
            writeln!(output, "\t(none)")?;
        }
        for record in &bucket.records {
            writeln!(output, "\t{}", describe(record, bucket.document.is_none()))?;
        }
    }

    output.flush()?;
    Ok(())
}

fn describe(record: &AssignmentRecord, show_document: bool) -> String {
    let mut line = format!("{}\t{}", record.label, record.language);

    match (record.role, record.partner.as_deref()) {
        (Role::Judge, Some(judge)) => line.push_str(&format!("\tjudge interpreter for {judge}")),
        (Role::Judge, None) => line.push_str("\tjudge interpreter"),
        (Role::Participant, _) => line.push_str("\tparticipant interpreter"),
    }
    if show_document {
        line.push_str(&format!("\tteam {}", record.document));
    }
    if record.inferred {
        line.push_str("\t(inferred)");
    }

    line
}
