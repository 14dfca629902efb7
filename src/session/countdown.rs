use std::{fmt::Display, str::FromStr};

use anyhow::{anyhow, bail, Result};
use chrono::{DateTime, Duration, Local};
use tracing::{debug, info, trace};

use crate::input::Keystroke;

use super::{Flow, KeyHandler, SessionView, Terminal};

/// Length of a countdown session, written as `<N>d <N>h <N>m <N>s`. Any subset of the
/// components may be given, in that order, spaces between them are optional.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CountdownSpan {
    pub days: u32,
    pub hours: u32,
    pub minutes: u32,
    pub seconds: u32,
}

impl CountdownSpan {
    pub fn as_duration(&self) -> Duration {
        Duration::days(self.days.into())
            + Duration::hours(self.hours.into())
            + Duration::minutes(self.minutes.into())
            + Duration::seconds(self.seconds.into())
    }
}

impl Display for CountdownSpan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}d{}h{}m{}s",
            self.days, self.hours, self.minutes, self.seconds
        )
    }
}

const UNITS: [char; 4] = ['d', 'h', 'm', 's'];

impl FromStr for CountdownSpan {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut values = [None::<u32>; 4];
        // Index of the smallest unit seen so far, units must keep getting smaller.
        let mut next_unit = 0;
        let mut chars = s.trim().chars().peekable();

        while chars.peek().is_some() {
            while chars.next_if(|c| c.is_whitespace()).is_some() {}

            let mut digits = String::new();
            while let Some(digit) = chars.next_if(char::is_ascii_digit) {
                digits.push(digit);
            }
            if digits.is_empty() {
                bail!("Expected a number in {s:?}");
            }
            let unit = chars
                .next()
                .ok_or_else(|| anyhow!("Missing unit after {digits} in {s:?}"))?;
            let position = UNITS[next_unit..]
                .iter()
                .position(|u| *u == unit)
                .map(|p| p + next_unit)
                .ok_or_else(|| anyhow!("Unexpected unit {unit:?} in {s:?}"))?;

            values[position] = Some(digits.parse()?);
            next_unit = position + 1;
        }

        if values.iter().all(Option::is_none) {
            bail!("Empty duration");
        }
        let [days, hours, minutes, seconds] = values.map(Option::unwrap_or_default);
        Ok(Self {
            days,
            hours,
            minutes,
            seconds,
        })
    }
}

/// Timed session that counts up from its start. Only `q`, an interrupt or the end of input stop
/// it; reaching the planned end doesn't.
pub struct CountdownSession {
    started: DateTime<Local>,
    planned_end: DateTime<Local>,
}

impl CountdownSession {
    pub fn new(started: DateTime<Local>, span: CountdownSpan) -> Result<Self> {
        let planned_end = started
            .checked_add_signed(span.as_duration())
            .ok_or_else(|| anyhow!("Countdown of {span} ends too far in the future"))?;
        Ok(Self {
            started,
            planned_end,
        })
    }

    pub fn planned_end(&self) -> DateTime<Local> {
        self.planned_end
    }
}

impl KeyHandler for CountdownSession {
    fn on_key(&mut self, key: Keystroke) -> Result<Flow> {
        match key {
            Keystroke::Char('q') => Ok(Flow::Stop),
            other => {
                trace!("Ignoring {other:?} during countdown");
                Ok(Flow::Continue)
            }
        }
    }

    fn view(&self) -> SessionView {
        SessionView::new(self.started)
    }
}

pub async fn pomodoro(terminal: &Terminal, span: CountdownSpan) -> Result<()> {
    debug!("Running pomodoro interval for {span}");
    let session = CountdownSession::new(terminal.clock.time(), span)?;
    info!("Pomodoro planned to end at {}", session.planned_end());
    terminal.run(session).await?;
    Ok(())
}
