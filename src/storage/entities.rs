use std::fmt::Display;

use chrono::{Duration, NaiveDate, NaiveDateTime};
use thiserror::Error;

use crate::utils::time::{format_record_time, RECORD_TIME_FORMAT};

const RANGE_SEPARATOR: &str = " - ";

/// One committed unit of work. Timestamps are local wall time without an offset, exactly as
/// they appear in the timesheet.
#[derive(PartialEq, Eq, Debug, Clone)]
pub struct TaskInterval {
    pub description: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl TaskInterval {
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Whether any part of the interval falls on `date`.
    pub fn touches(&self, date: NaiveDate) -> bool {
        self.start.date() <= date && date <= self.end.date()
    }

    /// Two line representation used by the timesheet, terminated by a new line.
    pub fn to_record(&self) -> String {
        format!(
            "{}\n\t{}\n",
            TimeRange {
                start: self.start,
                end: self.end
            },
            self.description
        )
    }
}

#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub struct TimeRange {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl Display for TimeRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}{RANGE_SEPARATOR}{}",
            format_record_time(self.start),
            format_record_time(self.end)
        )
    }
}

#[derive(Debug, Error)]
#[error("Unable to parse timespan {line:?}: {reason}")]
pub struct RangeParseError {
    pub line: String,
    pub reason: String,
}

impl TimeRange {
    pub fn parse(line: &str) -> Result<Self, RangeParseError> {
        let fail = |reason: String| RangeParseError {
            line: line.to_string(),
            reason,
        };
        let (start, end) = line
            .split_once(RANGE_SEPARATOR)
            .ok_or_else(|| fail(format!("missing {RANGE_SEPARATOR:?} separator")))?;
        let start = NaiveDateTime::parse_from_str(start, RECORD_TIME_FORMAT)
            .map_err(|e| fail(format!("bad start: {e}")))?;
        let end = NaiveDateTime::parse_from_str(end, RECORD_TIME_FORMAT)
            .map_err(|e| fail(format!("bad end: {e}")))?;
        Ok(Self { start, end })
    }
}
