pub mod dispatch;
pub mod report;

use std::{path::PathBuf, sync::Arc};

use anyhow::Result;
use clap::Parser;
use dispatch::{select_mode, Mode};
use tracing::{debug, info, level_filters::LevelFilter};

use crate::{
    input::InputBackend,
    report::report_for_date,
    session::{countdown::pomodoro, tracking::track_time, Terminal},
    storage::timesheet::{Timesheet, DEFAULT_TIMESHEET},
    utils::{
        clock::{Clock, DefaultClock},
        logging::enable_logging,
    },
};

#[derive(Parser, Debug)]
#[command(name = "timetrack", version, about = "Fun with time tracking!", long_about = None)]
struct Args {
    #[arg(
        help = "Nothing to start tracking, \"today\" for a report of today, or a duration like \"1h 30m\" for a pomodoro"
    )]
    args: Vec<String>,
    #[arg(long, help = "Log diagnostics to the console and to the log file")]
    debug: bool,
    #[arg(long, default_value = DEFAULT_TIMESHEET, help = "File that tasks are recorded to")]
    timesheet: PathBuf,
    #[arg(long, default_value = "timetracker.log", help = "Where diagnostics go with --debug")]
    log_file: PathBuf,
}

pub async fn run_cli() -> Result<()> {
    let args = Args::parse();

    if args.debug {
        enable_logging(&args.log_file, LevelFilter::TRACE)?;
        info!("Logging information to {:?}", args.log_file);
    }
    debug!("Args {args:?}");

    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let terminal = Terminal::new(InputBackend::detect(), clock.clone());
    let timesheet = Timesheet::new(args.timesheet);

    match select_mode(&args.args.join(" "), clock.time().date_naive()) {
        Mode::Track => track_time(&terminal, Box::new(timesheet)).await?,
        Mode::Countdown(span) => pomodoro(&terminal, span).await?,
        Mode::Report(date) => {
            let outcome = report_for_date(&timesheet, date).await?;
            print!("{}", report::render(&outcome));
        }
        Mode::Unknown(argument) => println!("Unknown argument {argument:?}"),
    }

    println!("Bye!");
    debug!("Shut down");
    Ok(())
}
