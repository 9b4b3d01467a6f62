//! Run command implementation.

use crate::input::{parse_line, Control, Input};
use chanlog_core::{
    Clock, Config, LogWriter, MemberTable, Privileges, Recorded, RotationTicker, SystemClock,
};
use std::io::{self, BufRead};
use std::sync::Arc;
use tracing::{info, warn};

/// Counts reported when the input ends.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    /// Lines written to a segment.
    pub written: usize,
    /// Private own messages that were not logged.
    pub suppressed: usize,
    /// Lines that could not be parsed or recorded.
    pub rejected: usize,
}

/// Records stdin until EOF.
pub fn run(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let stdin = io::stdin();
    let summary = run_with(config, stdin.lock(), Arc::new(SystemClock))?;
    info!(
        written = summary.written,
        suppressed = summary.suppressed,
        rejected = summary.rejected,
        "input closed"
    );
    Ok(())
}

/// Records every line of `input`, rotating on `clock`.
pub fn run_with(
    config: &Config,
    input: impl BufRead,
    clock: Arc<dyn Clock>,
) -> Result<RunSummary, Box<dyn std::error::Error>> {
    let members = Arc::new(MemberTable::new());
    let writer = Arc::new(LogWriter::open(config, members.clone(), clock.now())?);
    let ticker = RotationTicker::spawn(Arc::clone(&writer), config.rotation_interval, clock)?;

    let mut summary = RunSummary::default();
    for (index, line) in input.lines().enumerate() {
        let line_no = index + 1;
        let parsed = match parse_line(&line?) {
            Ok(Some(parsed)) => parsed,
            Ok(None) => continue,
            Err(e) => {
                warn!(line = line_no, error = %e, "skipping unparseable input");
                summary.rejected += 1;
                continue;
            }
        };

        match parsed {
            Input::Event(event) => match writer.record(&event) {
                Ok(Recorded::Written { .. }) => summary.written += 1,
                Ok(Recorded::Suppressed) => summary.suppressed += 1,
                Err(e) => {
                    warn!(line = line_no, error = %e, "event not recorded");
                    summary.rejected += 1;
                }
            },
            Input::Control(Control::Member {
                channel,
                nick,
                op,
                half_op,
                voice,
            }) => members.set(&channel, &nick, Privileges { op, half_op, voice }),
            Input::Control(Control::Gone { channel, nick }) => members.remove(&channel, &nick),
            Input::Control(Control::OwnNick { nick }) => writer.set_own_nick(nick),
        }
    }

    ticker.stop();
    writer.shutdown()?;
    Ok(summary)
}
