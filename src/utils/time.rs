use chrono::{Duration, NaiveDateTime};

/// Layout of a single timestamp inside the timesheet.
pub const RECORD_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub fn format_record_time(time: NaiveDateTime) -> String {
    time.format(RECORD_TIME_FORMAT).to_string()
}

/// Formats elapsed time as `HH:MM:SS`. Hours keep growing past 99, there is no day wraparound.
pub fn format_elapsed(elapsed: Duration) -> String {
    let total = elapsed.num_seconds().max(0);
    let hours = total / 3600;
    let minutes = total % 3600 / 60;
    let seconds = total % 60;
    format!("{hours:0>2}:{minutes:0>2}:{seconds:0>2}")
}

/// Formats a summed duration for reports, e.g. `1:00:00`.
pub fn format_total(total: Duration) -> String {
    let total = total.num_seconds().max(0);
    format!("{}:{:0>2}:{:0>2}", total / 3600, total % 3600 / 60, total % 60)
}
