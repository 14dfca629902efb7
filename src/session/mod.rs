//! Interactive modes. Every mode runs two activities side by side:
//!  - a blocking input loop reading keystrokes, owning all mutable session state.
//!  - a [display::LiveDisplay] task painting the status line from published [SessionView]s.
//!
//! The input loop is the only writer, the display only ever sees immutable snapshots.

pub mod buffer;
pub mod countdown;
pub mod display;
pub mod tracking;

use std::{io::Write, sync::Arc};

use anyhow::Result;
use chrono::{DateTime, Local};
use display::LiveDisplay;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

use crate::{
    input::{CharacterSource, InputBackend, InputError, Keystroke},
    utils::clock::Clock,
};

/// Snapshot of a session that the display paints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionView {
    /// Start of the interval that is currently being timed.
    pub started: DateTime<Local>,
    pub text: String,
    /// Bumped every time a task is committed, so the display can move to a fresh line.
    pub line: usize,
}

impl SessionView {
    pub fn new(started: DateTime<Local>) -> Self {
        Self {
            started,
            text: String::new(),
            line: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Stop,
}

/// State machine of a mode. Runs on the input thread only.
pub trait KeyHandler: Send + 'static {
    fn on_key(&mut self, key: Keystroke) -> Result<Flow>;

    fn view(&self) -> SessionView;
}

/// Everything a mode needs from the outside world.
#[derive(Clone)]
pub struct Terminal {
    pub backend: InputBackend,
    pub clock: Arc<dyn Clock>,
}

impl Terminal {
    pub fn new(backend: InputBackend, clock: Arc<dyn Clock>) -> Self {
        Self { backend, clock }
    }

    /// Runs `handler` against standard input and output.
    pub async fn run<H: KeyHandler>(&self, handler: H) -> Result<H> {
        let source = self.backend.open_raw_mode()?;
        run_mode(
            source,
            handler,
            self.clock.clone(),
            Box::new(std::io::stdout()),
        )
        .await
    }
}

/// Drives `handler` with keys from `source` while a [LiveDisplay] repaints `out`.
///
/// Returns only after the display finished, so callers may print right away. `source` is dropped
/// when the input loop ends no matter how it ends, which is what restores the terminal. Faults
/// of the input loop are passed on after the display was stopped, panics are resumed.
pub async fn run_mode<H: KeyHandler>(
    mut source: Box<dyn CharacterSource>,
    mut handler: H,
    clock: Arc<dyn Clock>,
    out: Box<dyn Write + Send>,
) -> Result<H> {
    let (publisher, view) = watch::channel(handler.view());
    let stop = CancellationToken::new();

    let display = tokio::spawn(LiveDisplay::new(view, stop.clone(), clock, out).run());

    let input = tokio::task::spawn_blocking(move || {
        let result = input_loop(source.as_mut(), &mut handler, &publisher);
        drop(source);
        result.map(|()| handler)
    });

    let input_result = input.await;
    debug!("Input loop finished, stopping display");
    stop.cancel();
    let display_result = display.await;
    debug!("Display task absorbed");

    let handler = match input_result {
        Ok(result) => result.inspect_err(|e| error!("Input loop failed {e:?}"))?,
        Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
        Err(e) => Err(e)?,
    };
    display_result??;
    Ok(handler)
}

fn input_loop(
    source: &mut dyn CharacterSource,
    handler: &mut impl KeyHandler,
    publisher: &watch::Sender<SessionView>,
) -> Result<()> {
    loop {
        let key = source.read_char();
        debug!("Read key {key:?}");
        let flow = match key {
            Ok(key) => handler.on_key(key),
            Err(InputError::Interrupted | InputError::EndOfInput) => {
                debug!("Input was closed, stopping");
                Ok(Flow::Stop)
            }
            Err(e) => Err(e.into()),
        };

        // Every key repaints, even ones that didn't change anything.
        publisher.send_replace(handler.view());

        if flow? == Flow::Stop {
            return Ok(());
        }
    }
}
