use std::fmt::Write;

use crate::{report::ReportOutcome, utils::time::format_total};

/// Text printed for a report. Warnings about broken records come first, then every task with its
/// total on an indented line.
pub fn render(outcome: &ReportOutcome) -> String {
    let mut out = String::new();
    match outcome {
        ReportOutcome::MissingLog(path) => {
            let _ = writeln!(out, "Unable to find {}, does it exist here?", path.display());
        }
        ReportOutcome::Report(report) => {
            for record in &report.malformed {
                let _ = writeln!(
                    out,
                    "Unable to parse timespan {:?}, task: {:?}",
                    record.range_line, record.description
                );
            }
            for entry in &report.entries {
                let _ = writeln!(out, "{}\n\t{}", entry.description, format_total(entry.total));
            }
        }
    }
    out
}
