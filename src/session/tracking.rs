use std::sync::Arc;

use anyhow::Result;
use chrono::{DateTime, Local};
use tracing::{debug, info, warn};

use crate::{
    input::Keystroke,
    storage::{entities::TaskInterval, timesheet::TaskRecorder},
    utils::clock::Clock,
};

use super::{buffer::EditBuffer, Flow, KeyHandler, SessionView, Terminal};

/// Committing this exact text ends tracking instead of recording a task.
pub const QUIT_SENTINEL: &str = "q";

/// Interactive tracking. Text is typed into an [EditBuffer] and Enter commits it as a
/// [TaskInterval] that lasted from the previous commit (or program start) until now.
///
/// Enter on an empty buffer still commits a task with an empty description.
pub struct TrackingSession {
    buffer: EditBuffer,
    started: DateTime<Local>,
    committed: usize,
    recorder: Box<dyn TaskRecorder>,
    clock: Arc<dyn Clock>,
}

impl TrackingSession {
    pub fn new(recorder: Box<dyn TaskRecorder>, clock: Arc<dyn Clock>) -> Self {
        Self {
            buffer: EditBuffer::default(),
            started: clock.time(),
            committed: 0,
            recorder,
            clock,
        }
    }

    fn commit(&mut self) -> Result<()> {
        let end = self.clock.time();
        self.recorder.store(&TaskInterval {
            description: self.buffer.snapshot(),
            start: self.started.naive_local(),
            end: end.naive_local(),
        })?;
        self.started = end;
        self.buffer.clear();
        self.committed += 1;
        Ok(())
    }
}

impl KeyHandler for TrackingSession {
    fn on_key(&mut self, key: Keystroke) -> Result<Flow> {
        match key {
            Keystroke::Enter if self.buffer.snapshot() == QUIT_SENTINEL => {
                debug!("Quitting...");
                return Ok(Flow::Stop);
            }
            Keystroke::Enter => self.commit()?,
            Keystroke::Char(ch) => {
                if !self.buffer.append(ch) {
                    warn!("Unknown char: {ch:?}");
                }
            }
            Keystroke::Backspace => {
                self.buffer.delete_last();
            }
            Keystroke::Escape(sequence) => {
                info!("Got control sequence {sequence:?}, eating it")
            }
            Keystroke::Control(byte) => warn!("Unknown char: {byte:#04x}"),
            Keystroke::Invalid(bytes) => warn!("Unable to decode bytes {bytes:?}"),
        }
        Ok(Flow::Continue)
    }

    fn view(&self) -> SessionView {
        SessionView {
            started: self.started,
            text: self.buffer.snapshot(),
            line: self.committed,
        }
    }
}

/// Tracks tasks until the user quits. Every commit goes to `recorder` right away.
pub async fn track_time(terminal: &Terminal, recorder: Box<dyn TaskRecorder>) -> Result<()> {
    debug!("Hacking time... well, to record time spent hacking");
    let session = terminal
        .run(TrackingSession::new(recorder, terminal.clock.clone()))
        .await?;
    info!("Tracking finished after {} committed tasks", session.committed);
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::{
        io::Cursor,
        sync::{Arc, Mutex},
        time::Duration,
    };

    use anyhow::{anyhow, Result};
    use chrono::{Local, NaiveDateTime, TimeZone};
    use tempfile::tempdir;

    use crate::{
        input::{fallback::FallbackReader, InputError, Keystroke, MockCharacterSource},
        session::{display::test_output::SharedOutput, run_mode, Flow, KeyHandler},
        storage::{
            entities::TaskInterval,
            timesheet::{MockTaskRecorder, TaskRecorder, Timesheet},
        },
        utils::{clock::test_clock::TestClock, logging::TEST_LOGGING},
    };

    use super::TrackingSession;

    /// Keeps every stored interval in memory.
    #[derive(Clone, Default)]
    struct MemoryRecorder(Arc<Mutex<Vec<TaskInterval>>>);

    impl TaskRecorder for MemoryRecorder {
        fn store(&self, interval: &TaskInterval) -> Result<()> {
            self.0.lock().unwrap().push(interval.clone());
            Ok(())
        }
    }

    fn clock() -> Arc<TestClock> {
        Arc::new(TestClock::new(
            Local.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap(),
        ))
    }

    fn typed(text: &str) -> Vec<Keystroke> {
        text.chars()
            .map(|ch| match ch {
                '\r' => Keystroke::Enter,
                '<' => Keystroke::Backspace,
                ch => Keystroke::Char(ch),
            })
            .collect()
    }

    fn feed(session: &mut TrackingSession, keys: Vec<Keystroke>) -> Vec<Flow> {
        keys.into_iter()
            .map(|key| session.on_key(key).unwrap())
            .collect()
    }

    #[test]
    fn enter_commits_typed_text() {
        let recorder = MemoryRecorder::default();
        let mut session = TrackingSession::new(Box::new(recorder.clone()), clock());

        feed(&mut session, typed("write docz<s\r"));

        let stored = recorder.0.lock().unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].description, "write docs");
        assert!(stored[0].start <= stored[0].end);
        assert_eq!(session.view().text, "");
        assert_eq!(session.view().line, 1);
    }

    #[test]
    fn quit_sentinel_never_records() {
        let mut recorder = MockTaskRecorder::new();
        recorder.expect_store().never();
        let mut session = TrackingSession::new(Box::new(recorder), clock());

        let flows = feed(&mut session, typed("q\r"));

        assert_eq!(flows, vec![Flow::Continue, Flow::Stop]);
    }

    #[test]
    fn sentinel_must_match_exactly() {
        let recorder = MemoryRecorder::default();
        let mut session = TrackingSession::new(Box::new(recorder.clone()), clock());

        let flows = feed(&mut session, typed("q \rquit\rxq<<q\r"));

        assert_eq!(*flows.last().unwrap(), Flow::Stop);
        let stored = recorder.0.lock().unwrap();
        let descriptions = stored
            .iter()
            .map(|v| v.description.as_str())
            .collect::<Vec<_>>();
        assert_eq!(descriptions, vec!["q ", "quit"]);
    }

    #[test]
    fn empty_enter_commits_empty_description() {
        let recorder = MemoryRecorder::default();
        let mut session = TrackingSession::new(Box::new(recorder.clone()), clock());

        feed(&mut session, typed("\r"));

        assert_eq!(recorder.0.lock().unwrap()[0].description, "");
    }

    #[test]
    fn backspace_on_empty_buffer_is_noop() {
        let recorder = MemoryRecorder::default();
        let mut session = TrackingSession::new(Box::new(recorder.clone()), clock());

        feed(&mut session, typed("<<a<<b\r"));

        assert_eq!(recorder.0.lock().unwrap()[0].description, "b");
    }

    #[test]
    fn unclassified_input_is_ignored() {
        let recorder = MemoryRecorder::default();
        let mut session = TrackingSession::new(Box::new(recorder.clone()), clock());

        let flows = feed(
            &mut session,
            vec![
                Keystroke::Char('a'),
                Keystroke::Control(0x01),
                Keystroke::Char('\u{1b}'),
                Keystroke::Escape("[A".into()),
                Keystroke::Invalid(vec![0xff]),
                Keystroke::Char('b'),
            ],
        );

        assert!(flows.iter().all(|flow| *flow == Flow::Continue));
        assert_eq!(session.view().text, "ab");
    }

    #[test]
    fn recorder_failure_is_a_fault() {
        let mut recorder = MockTaskRecorder::new();
        recorder
            .expect_store()
            .returning(|_| Err(anyhow!("disk full")));
        let mut session = TrackingSession::new(Box::new(recorder), clock());

        session.on_key(Keystroke::Char('x')).unwrap();
        assert!(session.on_key(Keystroke::Enter).is_err());
        assert_eq!(session.view().text, "x");
    }

    #[tokio::test(start_paused = true)]
    async fn consecutive_commits_share_endpoints() -> Result<()> {
        let recorder = MemoryRecorder::default();
        let clock = clock();
        let mut session = TrackingSession::new(Box::new(recorder.clone()), clock.clone());

        feed(&mut session, typed("one"));
        tokio::time::sleep(Duration::from_secs(90)).await;
        feed(&mut session, typed("\rtwo"));
        tokio::time::sleep(Duration::from_secs(30)).await;
        feed(&mut session, typed("\r"));

        let stored = recorder.0.lock().unwrap();
        let at = |s: &str| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap();
        assert_eq!(stored[0].start, at("2024-01-01 09:00:00"));
        assert_eq!(stored[0].end, at("2024-01-01 09:01:30"));
        assert_eq!(stored[1].start, stored[0].end);
        assert_eq!(stored[1].end, at("2024-01-01 09:02:00"));
        Ok(())
    }

    #[tokio::test]
    async fn typed_session_lands_in_timesheet() -> Result<()> {
        *TEST_LOGGING;
        let dir = tempdir()?;
        let timesheet = Timesheet::new(dir.path().join("timesheet.txt"));
        let clock = clock();

        let mut keys = typed("review<<<<<<fix bug\rq\r").into_iter().map(Ok);
        let mut source = MockCharacterSource::new();
        source
            .expect_read_char()
            .returning(move || keys.next().unwrap_or(Err(InputError::EndOfInput)));

        let output = SharedOutput::default();
        let session = run_mode(
            Box::new(source),
            TrackingSession::new(Box::new(timesheet.clone()), clock.clone()),
            clock,
            Box::new(output.clone()),
        )
        .await?;

        assert_eq!(session.committed, 1);
        let records = timesheet.read_records().await?;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].as_ref().unwrap().description, "fix bug");
        assert!(output.line_finished());
        Ok(())
    }

    #[tokio::test]
    async fn windows_line_endings_commit_once() -> Result<()> {
        let recorder = MemoryRecorder::default();
        let clock = clock();

        run_mode(
            Box::new(FallbackReader::new(Cursor::new(b"task\r\nq\r\n".to_vec()))),
            TrackingSession::new(Box::new(recorder.clone()), clock.clone()),
            clock,
            Box::new(SharedOutput::default()),
        )
        .await?;

        let stored = recorder.0.lock().unwrap();
        let descriptions = stored
            .iter()
            .map(|v| v.description.as_str())
            .collect::<Vec<_>>();
        assert_eq!(descriptions, vec!["task"]);
        Ok(())
    }

    #[tokio::test]
    async fn interrupt_drops_in_progress_text() -> Result<()> {
        let recorder = MemoryRecorder::default();
        let clock = clock();
        let mut keys = typed("half done")
            .into_iter()
            .map(Ok)
            .chain([Err(InputError::Interrupted)]);
        let mut source = MockCharacterSource::new();
        source
            .expect_read_char()
            .returning(move || keys.next().unwrap_or(Err(InputError::EndOfInput)));

        let session = run_mode(
            Box::new(source),
            TrackingSession::new(Box::new(recorder.clone()), clock.clone()),
            clock,
            Box::new(SharedOutput::default()),
        )
        .await?;

        assert!(recorder.0.lock().unwrap().is_empty());
        assert_eq!(session.view().text, "half done");
        Ok(())
    }
}
