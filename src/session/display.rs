use std::{io::Write, sync::Arc, time::Duration};

use anyhow::Result;
use crossterm::{
    queue,
    style::Print,
    terminal::{Clear, ClearType},
};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::utils::{clock::Clock, time::format_elapsed};

use super::SessionView;

const REPAINT_INTERVAL: Duration = Duration::from_secs(1);

/// Keeps a single status line up to date with the time spent on the current task.
///
/// The line is repainted once per [REPAINT_INTERVAL] and whenever a new [SessionView] is
/// published. Nothing is written once `stop` is cancelled apart from the new line that finishes
/// the status line.
pub struct LiveDisplay {
    view: watch::Receiver<SessionView>,
    stop: CancellationToken,
    clock: Arc<dyn Clock>,
    out: Box<dyn Write + Send>,
    painted: bool,
    painted_line: usize,
}

impl LiveDisplay {
    pub fn new(
        view: watch::Receiver<SessionView>,
        stop: CancellationToken,
        clock: Arc<dyn Clock>,
        out: Box<dyn Write + Send>,
    ) -> Self {
        let painted_line = view.borrow().line;
        Self {
            view,
            stop,
            clock,
            out,
            painted: false,
            painted_line,
        }
    }

    /// Executes the display loop until `stop` is cancelled.
    pub async fn run(mut self) -> Result<()> {
        let mut publisher_alive = true;
        loop {
            // A repaint racing shutdown must lose.
            if self.stop.is_cancelled() {
                debug!("Stopping display");
                break;
            }
            self.paint()?;

            tokio::select! {
                biased;
                _ = self.stop.cancelled() => (),
                changed = self.view.changed(), if publisher_alive => {
                    if changed.is_err() {
                        trace!("Session publisher is gone, waiting for stop");
                        publisher_alive = false;
                    }
                }
                _ = self.clock.sleep(REPAINT_INTERVAL) => (),
            }
        }

        if self.painted {
            writeln!(self.out)?;
            self.out.flush()?;
        }
        Ok(())
    }

    fn paint(&mut self) -> Result<()> {
        let view = self.view.borrow_and_update().clone();

        if view.line != self.painted_line {
            // Previous task was committed, keep its line on screen.
            writeln!(self.out)?;
            self.painted_line = view.line;
        }

        let elapsed = self.clock.time() - view.started;
        // Clearing the rest of the line wipes whatever a longer previous paint left behind.
        queue!(
            self.out,
            Print(format!("\r{} - Task: {}", format_elapsed(elapsed), view.text)),
            Clear(ClearType::UntilNewLine)
        )?;
        self.out.flush()?;
        self.painted = true;
        Ok(())
    }
}
