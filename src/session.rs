//! An owned session over one recording.
//!
//! A [`Session`] owns its [`MessageStream`] and lazily builds the
//! keyframe index the first time a call needs it. Independent sessions
//! over the same data do not share state; snapshot results are pure
//! functions of the session's stream and the requested tick.

use std::collections::HashMap;

use crate::collect::{run_parse, ParseReport, ParseRequest};
use crate::combat_log::{extract_range, CombatLogEntry, CombatLogFilter};
use crate::error::{Result, TimelineError};
use crate::events::{derive_respawn_events, unify_attacks, AttackEvent, RespawnEvent};
use crate::index::{DemoIndex, DEFAULT_KEYFRAME_INTERVAL};
use crate::snapshot::{snapshot_at, EntitySnapshot, SnapshotOptions};
use crate::stream::MessageStream;

/// A stateful handle over one recording.
pub struct Session<S: MessageStream> {
    stream: S,
    index: Option<DemoIndex>,
    interval: u32,
}

impl<S: MessageStream> Session<S> {
    /// Creates a session with the default keyframe interval.
    #[must_use]
    pub fn new(stream: S) -> Self {
        Session::with_interval(stream, DEFAULT_KEYFRAME_INTERVAL)
    }

    /// Creates a session capturing keyframes every `interval` ticks.
    #[must_use]
    pub fn with_interval(stream: S, interval: u32) -> Self {
        Session {
            stream,
            index: None,
            interval,
        }
    }

    /// The underlying stream.
    #[must_use]
    pub fn stream(&self) -> &S {
        &self.stream
    }

    /// Consumes the session, returning the stream.
    #[must_use]
    pub fn into_stream(self) -> S {
        self.stream
    }

    /// The keyframe index, built and cached on first use.
    ///
    /// # Errors
    ///
    /// Propagates index-build failures; a failed build leaves the
    /// session reusable and the next call retries.
    pub fn index(&mut self) -> Result<&DemoIndex> {
        self.ensure_index()?;
        self.index.as_ref().ok_or(TimelineError::EmptyIndex)
    }

    /// Reconstructs a world-state snapshot at `tick`.
    ///
    /// # Errors
    ///
    /// Returns [`TimelineError::TickOutOfRange`] past the end of the
    /// recording, or index-build failures on first use.
    pub fn snapshot(&mut self, tick: u32, options: SnapshotOptions) -> Result<EntitySnapshot> {
        self.ensure_index()?;
        let index = self.index.as_ref().ok_or(TimelineError::EmptyIndex)?;
        snapshot_at(&self.stream, index, tick, options)
    }

    /// Extracts resolved combat log entries with `start <= tick <= end`,
    /// with game times anchored to the detected match start.
    ///
    /// # Errors
    ///
    /// Returns [`TimelineError::InvalidRequest`] when `start > end`, or
    /// index-build failures on first use.
    pub fn combat_log_range(
        &mut self,
        start: u32,
        end: u32,
        filter: &CombatLogFilter,
    ) -> Result<Vec<CombatLogEntry>> {
        self.ensure_index()?;
        let index = self.index.as_ref().ok_or(TimelineError::EmptyIndex)?;
        let match_start = index.match_start_tick().unwrap_or(0);
        extract_range(&self.stream, start, end, filter, match_start)
    }

    /// Derives respawn events from hero deaths.
    ///
    /// `level_overrides` is keyed by short hero name and applies only
    /// where the recording carries no level.
    #[must_use]
    pub fn respawn_events(&self, level_overrides: &HashMap<String, u32>) -> Vec<RespawnEvent> {
        derive_respawn_events(&self.stream, level_overrides)
    }

    /// The unified ranged/melee attack stream.
    #[must_use]
    pub fn attack_events(&self) -> Vec<AttackEvent> {
        unify_attacks(&self.stream)
    }

    /// Runs a multi-facet aggregation pass.
    ///
    /// # Errors
    ///
    /// As [`run_parse`]; a failed call leaves the session reusable.
    pub fn parse(&self, request: &ParseRequest) -> Result<ParseReport> {
        run_parse(&self.stream, request)
    }

    fn ensure_index(&mut self) -> Result<()> {
        if self.index.is_none() {
            self.index = Some(DemoIndex::build_with_interval(&self.stream, self.interval)?);
        }
        Ok(())
    }
}
