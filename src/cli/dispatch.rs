use chrono::NaiveDate;

use crate::session::countdown::CountdownSpan;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    Track,
    Report(NaiveDate),
    Countdown(CountdownSpan),
    Unknown(String),
}

/// Picks a mode from the positional arguments joined by spaces. `today` is resolved against
/// `today` so that callers decide what the current date is.
pub fn select_mode(args: &str, today: NaiveDate) -> Mode {
    let args = args.trim();
    if args.is_empty() {
        return Mode::Track;
    }
    if args == "today" {
        return Mode::Report(today);
    }
    match args.parse::<CountdownSpan>() {
        Ok(span) => Mode::Countdown(span),
        Err(_) => Mode::Unknown(args.to_string()),
    }
}
