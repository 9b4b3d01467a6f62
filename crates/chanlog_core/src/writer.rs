//! The single entry point for recording events.
//!
//! One mutex guards the active segment. `record`, `tick`, `rotate` and
//! `shutdown` all take it, so the order of lines in a segment is exactly
//! the order in which callers acquired the lock, and a rotation never
//! swaps the segment out from under an append.

use crate::config::Config;
use crate::dir::LogDir;
use crate::error::{CoreError, CoreResult};
use crate::event::{EventRecord, Timestamp};
use crate::render::{LogLine, Marks, Renderer};
use crate::rotation::{RotationDecision, RotationScheduler};
use crate::segment::{SegmentFormat, SegmentStore};
use crate::status::{ChannelDirectory, Marker, StatusResolver};
use chrono::{NaiveDate, Offset};
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// What [`LogWriter::record`] did with an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recorded {
    /// The line was appended at `offset` in the segment for `date`.
    Written {
        /// Segment the line went into.
        date: NaiveDate,
        /// The line's anchor id.
        anchor: String,
        /// Byte offset of the line.
        offset: u64,
    },
    /// The event is never logged (a private message the program sent).
    Suppressed,
}

struct WriterState {
    active: Option<SegmentStore>,
    scheduler: RotationScheduler,
    shut_down: bool,
}

/// Owns the active segment and serializes every write to it.
pub struct LogWriter {
    dir: LogDir,
    format: SegmentFormat,
    renderer: Renderer,
    resolver: StatusResolver,
    sync_on_append: bool,
    state: Mutex<WriterState>,
}

impl LogWriter {
    /// Locks the log directory and opens or resumes the segment for `now`.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid, the directory is
    /// locked by another process, or the segment cannot be opened.
    pub fn open(
        config: &Config,
        directory: Arc<dyn ChannelDirectory>,
        now: Timestamp,
    ) -> CoreResult<Self> {
        config.validate()?;

        let dir = LogDir::open(&config.log_dir, &config.extension, config.create_if_missing)?;
        let format = SegmentFormat {
            title: config.title.clone(),
            extension: config.extension.clone(),
            extra_head: config.extra_head.clone(),
        };
        let renderer = Renderer::new(config.time_format.clone())?;
        let resolver = StatusResolver::new(config.own_nick.clone(), directory);

        let segment = SegmentStore::open_or_resume(&dir, now.date_naive(), now.offset().fix(), &format)?
            .sync_on_append(config.sync_on_append);

        info!(
            dir = %dir.path().display(),
            date = %segment.date(),
            state = ?segment.state(),
            "log writer active"
        );

        Ok(Self {
            dir,
            format,
            renderer,
            resolver,
            sync_on_append: config.sync_on_append,
            state: Mutex::new(WriterState {
                active: Some(segment),
                scheduler: RotationScheduler::new(now),
                shut_down: false,
            }),
        })
    }

    /// Records one event in the active segment.
    ///
    /// Private messages sent by the program are suppressed. Everything
    /// else is rendered and appended under the writer lock.
    ///
    /// # Errors
    ///
    /// Returns `MalformedEvent` if the event cannot be rendered (nothing is
    /// written), `NoActiveSegment` if no segment is open, or a storage error
    /// if the append fails. None of these affect later calls.
    pub fn record(&self, event: &EventRecord) -> CoreResult<Recorded> {
        if event.is_suppressed() {
            debug!(kind = event.kind(), "suppressed private message");
            return Ok(Recorded::Suppressed);
        }

        let line = self.render(event).inspect_err(|e| {
            warn!(kind = event.kind(), error = %e, "dropping malformed event");
        })?;

        let mut state = self.state.lock();
        let segment = state.active.as_mut().ok_or(CoreError::NoActiveSegment)?;
        let date = segment.date();
        let offset = segment.append(&line).inspect_err(|e| {
            warn!(date = %date, anchor = %line.anchor, error = %e, "failed to append line");
        })?;

        Ok(Recorded::Written {
            date,
            anchor: line.anchor,
            offset,
        })
    }

    /// Periodic check: rotates if `now` is on a later day.
    ///
    /// Also retries opening a segment when an earlier rotation left the
    /// writer without one. Does nothing after [`shutdown`](Self::shutdown).
    ///
    /// # Errors
    ///
    /// Returns the rotation error; the next tick retries.
    pub fn tick(&self, now: Timestamp) -> CoreResult<RotationDecision> {
        let mut state = self.state.lock();
        if state.shut_down {
            return Ok(RotationDecision::NoAction);
        }

        let decision = state.scheduler.check(now);
        let stale = state
            .active
            .as_ref()
            .map_or(true, |segment| segment.date() != now.date_naive());

        let due = decision == RotationDecision::Rotate || stale;
        if due && self.rotate_locked(&mut state, now)? {
            return Ok(RotationDecision::Rotate);
        }
        Ok(RotationDecision::NoAction)
    }

    /// Finalizes the active segment and opens the one for `now`'s day.
    ///
    /// Does nothing if the active segment already covers that day, or if
    /// the clock has stepped back to an earlier day: segments only ever
    /// move forward, so a finalized day is never reopened.
    ///
    /// # Errors
    ///
    /// Returns an error if the old segment cannot be finalized (it stays
    /// active) or the new one cannot be opened (no segment is active until
    /// a later rotation succeeds).
    pub fn rotate(&self, now: Timestamp) -> CoreResult<()> {
        let mut state = self.state.lock();
        self.rotate_locked(&mut state, now).map(|_| ())
    }

    /// Returns whether a new segment was opened.
    fn rotate_locked(&self, state: &mut WriterState, now: Timestamp) -> CoreResult<bool> {
        let date = now.date_naive();

        if let Some(mut old) = state.active.take() {
            if old.date() == date {
                debug!(date = %date, "segment already current, nothing to rotate");
                state.active = Some(old);
                return Ok(false);
            }

            if date < old.date() {
                warn!(
                    active = %old.date(),
                    date = %date,
                    existing = self.dir.segment_path(date).exists(),
                    "clock stepped back a day, keeping current segment"
                );
                state.active = Some(old);
                return Ok(false);
            }

            if let Err(e) = old.finalize(&self.format) {
                error!(date = %old.date(), error = %e, "failed to finalize segment");
                state.active = Some(old);
                return Err(e);
            }
            // dropping the finalized store closes its handle
        }

        let segment = SegmentStore::open_or_resume(&self.dir, date, now.offset().fix(), &self.format)
            .inspect_err(|e| error!(date = %date, error = %e, "failed to open segment"))?
            .sync_on_append(self.sync_on_append);

        info!(date = %date, state = ?segment.state(), "rotated log segment");
        state.active = Some(segment);
        Ok(true)
    }

    /// Releases the active segment without finalizing it.
    ///
    /// Used at process exit: the file keeps no footer and is resumed by
    /// the next start. Later `record` calls fail with `NoActiveSegment` and
    /// ticks do nothing. Calling it twice is harmless.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the final sync fails.
    pub fn shutdown(&self) -> CoreResult<()> {
        let mut state = self.state.lock();
        state.shut_down = true;
        if let Some(segment) = state.active.take() {
            let date = segment.date();
            segment.release()?;
            info!(date = %date, "log writer shut down, segment left open for resume");
        }
        Ok(())
    }

    /// Changes the nick that gets the `:` marker.
    pub fn set_own_nick(&self, nick: impl Into<String>) {
        self.resolver.set_own_nick(nick);
    }

    /// The nick that gets the `:` marker.
    #[must_use]
    pub fn own_nick(&self) -> String {
        self.resolver.own_nick()
    }

    /// Day of the active segment, if any.
    #[must_use]
    pub fn active_date(&self) -> Option<NaiveDate> {
        self.state.lock().active.as_ref().map(SegmentStore::date)
    }

    /// The log directory.
    #[must_use]
    pub fn dir(&self) -> &LogDir {
        &self.dir
    }

    fn render(&self, event: &EventRecord) -> CoreResult<LogLine> {
        self.renderer.render(event, self.marks_for(event))
    }

    fn marks_for(&self, event: &EventRecord) -> Marks {
        match event {
            EventRecord::OwnMessage { .. } => Marks::single(Marker::OwnNick),
            EventRecord::NickChange {
                old_nick,
                new_nick,
                old_status_scope,
                new_status_scope,
                ..
            } => Marks {
                actor: self
                    .resolver
                    .resolve(Some(old_nick), old_status_scope.as_deref()),
                new_nick: self
                    .resolver
                    .resolve(Some(new_nick), new_status_scope.as_deref()),
            },
            EventRecord::Message {
                actor,
                status_scope,
                ..
            }
            | EventRecord::Topic {
                actor,
                status_scope,
                ..
            }
            | EventRecord::Join {
                actor,
                status_scope,
                ..
            }
            | EventRecord::Leave {
                actor,
                status_scope,
                ..
            }
            | EventRecord::ModeChange {
                actor,
                status_scope,
                ..
            } => Marks::single(self.resolver.resolve(Some(actor), status_scope.as_deref())),
        }
    }
}

impl std::fmt::Debug for LogWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogWriter")
            .field("dir", &self.dir.path())
            .field("resolver", &self.resolver)
            .finish_non_exhaustive()
    }
}
