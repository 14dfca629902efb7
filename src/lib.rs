//! Interactive time tracking from the terminal. Type what you are working on, press Enter when
//! done and the time spent lands in a plain text timesheet that can be summarized per day.
//!

pub mod cli;
pub mod input;
pub mod report;
pub mod session;
pub mod storage;
pub mod utils;
