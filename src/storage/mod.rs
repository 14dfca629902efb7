//! Storage is organized through [timesheet::Timesheet].
//! The basic idea is:
//!  - There is one plain text file, appended to and never rewritten.
//!  - Every committed task takes exactly two lines: a time range and a tab indented description.

pub mod entities;
pub mod timesheet;
