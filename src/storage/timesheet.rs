use std::{
    fs::OpenOptions,
    io::{self, Write},
    path::{Path, PathBuf},
};

use anyhow::Result;
use futures::StreamExt;
use tokio::{
    fs::File,
    io::{AsyncBufReadExt, BufReader},
};
use tokio_stream::wrappers::LinesStream;
use tracing::{debug, info, warn};

use super::entities::{TaskInterval, TimeRange};

pub const DEFAULT_TIMESHEET: &str = "timesheet.txt";

/// Destination for committed task intervals.
#[cfg_attr(test, mockall::automock)]
pub trait TaskRecorder: Send + Sync {
    /// Appends the interval. Once this returns the record is handed over to the file system.
    fn store(&self, interval: &TaskInterval) -> Result<()>;
}

/// A record whose range line couldn't be understood. It is kept around so the caller can warn
/// about it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedRecord {
    pub range_line: String,
    pub description: String,
    pub reason: String,
}

pub type RecordEntry = std::result::Result<TaskInterval, MalformedRecord>;

/// The main realization of [TaskRecorder], a flat file in the timesheet layout.
#[derive(Debug, Clone)]
pub struct Timesheet {
    path: PathBuf,
}

impl Timesheet {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads every record in write order. The file is consumed two lines at a time; a trailing
    /// range line without a description is dropped.
    pub async fn read_records(&self) -> io::Result<Vec<RecordEntry>> {
        debug!("Reading records from {:?}", self.path);
        let file = File::open(&self.path).await?;
        let mut pairs = LinesStream::new(BufReader::new(file).lines()).chunks(2);

        let mut records = vec![];
        while let Some(pair) = pairs.next().await {
            let pair = pair.into_iter().collect::<io::Result<Vec<String>>>()?;
            match pair.as_slice() {
                [range_line, description] => records.push(parse_record(range_line, description)),
                [range_line] => {
                    warn!("Ignoring trailing line without description {range_line:?}")
                }
                _ => {}
            }
        }
        Ok(records)
    }
}

fn parse_record(range_line: &str, description: &str) -> RecordEntry {
    let description = description.trim().to_string();
    match TimeRange::parse(range_line.trim_end()) {
        Ok(TimeRange { start, end }) => Ok(TaskInterval {
            description,
            start,
            end,
        }),
        Err(e) => {
            warn!("Skipping malformed record: {e}");
            Err(MalformedRecord {
                range_line: range_line.trim().to_string(),
                description,
                reason: e.reason,
            })
        }
    }
}

impl TaskRecorder for Timesheet {
    fn store(&self, interval: &TaskInterval) -> Result<()> {
        info!(
            "Storing task {}-{}: {:?}",
            interval.start, interval.end, interval.description
        );
        // Opened per call so each record is complete on disk before the next one starts.
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(interval.to_record().as_bytes())?;
        file.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
    use tempfile::tempdir;

    use crate::storage::entities::TaskInterval;

    use super::{TaskRecorder, Timesheet};

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    fn at(hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDateTime::new(day(), NaiveTime::from_hms_opt(hour, minute, 0).unwrap())
    }

    #[tokio::test]
    async fn stored_records_are_appended_in_order() -> Result<()> {
        let dir = tempdir()?;
        let timesheet = Timesheet::new(dir.path().join("timesheet.txt"));
        let first = TaskInterval {
            description: "first".into(),
            start: at(9, 0),
            end: at(9, 30),
        };
        let second = TaskInterval {
            description: "second task".into(),
            start: at(9, 30),
            end: at(10, 0),
        };

        timesheet.store(&first)?;
        timesheet.store(&second)?;

        let content = std::fs::read_to_string(timesheet.path())?;
        assert_eq!(
            content,
            "2024-01-01 09:00:00 - 2024-01-01 09:30:00\n\tfirst\n\
             2024-01-01 09:30:00 - 2024-01-01 10:00:00\n\tsecond task\n"
        );

        let records = timesheet.read_records().await?;
        assert_eq!(records, vec![Ok(first), Ok(second)]);
        Ok(())
    }

    #[tokio::test]
    async fn empty_description_is_kept() -> Result<()> {
        let dir = tempdir()?;
        let timesheet = Timesheet::new(dir.path().join("timesheet.txt"));
        let interval = TaskInterval {
            description: String::new(),
            start: at(9, 0),
            end: at(9, 0),
        };
        timesheet.store(&interval)?;

        assert_eq!(timesheet.read_records().await?, vec![Ok(interval)]);
        Ok(())
    }

    #[tokio::test]
    async fn malformed_range_does_not_stop_reading() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("timesheet.txt");
        std::fs::write(
            &path,
            "garbage\n\tbroken\n2024-01-01 09:00:00 - 2024-01-01 09:30:00\n\tfine\n",
        )?;

        let records = Timesheet::new(path).read_records().await?;

        assert_eq!(records.len(), 2);
        let malformed = records[0].clone().unwrap_err();
        assert_eq!(malformed.range_line, "garbage");
        assert_eq!(malformed.description, "broken");
        assert_eq!(records[1].clone().unwrap().description, "fine");
        Ok(())
    }

    #[tokio::test]
    async fn trailing_unpaired_line_is_ignored() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("timesheet.txt");
        std::fs::write(
            &path,
            "2024-01-01 09:00:00 - 2024-01-01 09:30:00\n\tfine\n2024-01-01 10:00:00 - 2024-01-01 10:30:00\n",
        )?;

        let records = Timesheet::new(path).read_records().await?;
        assert_eq!(records.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn missing_file_is_not_found() {
        let dir = tempdir().unwrap();
        let err = Timesheet::new(dir.path().join("nope.txt"))
            .read_records()
            .await
            .unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::NotFound);
    }
}
