//! Daily summaries computed from the timesheet. Nothing here is persisted, every report is
//! recomputed from the records.

use std::{collections::BTreeMap, io::ErrorKind, path::PathBuf};

use anyhow::Result;
use chrono::{Duration, NaiveDate};
use tracing::{debug, info};

use crate::storage::timesheet::{MalformedRecord, RecordEntry, Timesheet};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportEntry {
    pub description: String,
    pub total: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    /// Sorted by description.
    pub entries: Vec<ReportEntry>,
    pub malformed: Vec<MalformedRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportOutcome {
    Report(Report),
    MissingLog(PathBuf),
}

/// Sums time spent per task on `date`. Records overlapping the day are counted in full.
pub async fn report_for_date(timesheet: &Timesheet, date: NaiveDate) -> Result<ReportOutcome> {
    let records = match timesheet.read_records().await {
        Ok(records) => records,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            info!("Timesheet {:?} doesn't exist", timesheet.path());
            return Ok(ReportOutcome::MissingLog(timesheet.path().to_path_buf()));
        }
        Err(e) => Err(e)?,
    };
    Ok(ReportOutcome::Report(aggregate(records, date)))
}

pub fn aggregate(records: impl IntoIterator<Item = RecordEntry>, date: NaiveDate) -> Report {
    let mut totals = BTreeMap::<String, Duration>::new();
    let mut malformed = vec![];

    for record in records {
        match record {
            Ok(interval) if interval.touches(date) => {
                *totals
                    .entry(interval.description.clone())
                    .or_insert_with(Duration::zero) += interval.duration();
            }
            Ok(interval) => debug!("Record {interval:?} is outside of {date}"),
            Err(record) => malformed.push(record),
        }
    }

    Report {
        entries: totals
            .into_iter()
            .map(|(description, total)| ReportEntry { description, total })
            .collect(),
        malformed,
    }
}
