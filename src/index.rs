//! Sparse keyframe index over a message stream.
//!
//! One pass over the recording captures a [`Keyframe`] every
//! [`DEFAULT_KEYFRAME_INTERVAL`] ticks (one minute of game time at 30
//! ticks/second). Each keyframe stores a cursor into the message
//! sequence plus a clone of the world at that point, so a seek is a
//! binary search followed by replaying at most one interval of
//! messages instead of the whole recording.

use crate::error::{Result, TimelineError};
use crate::message::{CombatLogType, MessageKind, PropertyKey, GAME_STATE_IN_PROGRESS};
use crate::state::World;
use crate::stream::MessageStream;
use crate::time::tick_to_game_time;

/// Ticks between captured keyframes: one minute of game time.
pub const DEFAULT_KEYFRAME_INTERVAL: u32 = 1800;

/// A restorable point in the recording.
#[derive(Debug, Clone)]
pub struct Keyframe {
    /// Simulation tick of the first message at or past this capture point.
    pub tick: u32,
    /// Network tick of that message.
    pub net_tick: u32,
    /// Game-clock seconds at `tick`; negative before the horn.
    pub game_time: f32,
    /// Index into the stream's message slice; replay resumes here.
    pub cursor: usize,
    /// World state before the message at `cursor` is applied.
    pub world: World,
}

/// The result of locating a keyframe for a target tick.
#[derive(Debug, Clone, Copy)]
pub struct Seek<'a> {
    /// The governing keyframe (latest keyframe at or before the target,
    /// or the first keyframe when clamped).
    pub keyframe: &'a Keyframe,
    /// True when a keyframe exists exactly at the target tick.
    pub exact: bool,
    /// True when the target predates the first keyframe and the seek
    /// clamped forward to it.
    pub clamped: bool,
}

/// A tick-ordered keyframe index over one recording.
#[derive(Debug, Clone)]
pub struct DemoIndex {
    keyframes: Vec<Keyframe>,
    interval: u32,
    match_start_tick: Option<u32>,
    last_tick: u32,
}

impl DemoIndex {
    /// Builds an index with the default capture interval.
    ///
    /// # Errors
    ///
    /// Returns [`TimelineError::EmptyIndex`] for a stream with no
    /// messages, or [`TimelineError::NonMonotonicTick`] if the stream's
    /// tick ordering is violated.
    pub fn build<S: MessageStream>(stream: &S) -> Result<Self> {
        Self::build_with_interval(stream, DEFAULT_KEYFRAME_INTERVAL)
    }

    /// Builds an index capturing a keyframe every `interval` ticks.
    ///
    /// # Errors
    ///
    /// As [`DemoIndex::build`]; additionally rejects a zero interval
    /// with [`TimelineError::InvalidRequest`].
    pub fn build_with_interval<S: MessageStream>(stream: &S, interval: u32) -> Result<Self> {
        if interval == 0 {
            return Err(TimelineError::invalid_request(
                "keyframe interval must be positive",
            ));
        }
        let messages = stream.messages();
        if messages.is_empty() {
            return Err(TimelineError::EmptyIndex);
        }

        let mut keyframes: Vec<Keyframe> = Vec::new();
        let mut world = World::new();
        let mut match_start_tick: Option<u32> = None;
        let mut previous_tick = 0u32;
        let mut next_capture = messages[0].tick;

        for (cursor, msg) in messages.iter().enumerate() {
            if cursor > 0 && msg.tick < previous_tick {
                return Err(TimelineError::NonMonotonicTick {
                    previous: previous_tick,
                    found: msg.tick,
                });
            }
            previous_tick = msg.tick;

            if msg.tick >= next_capture {
                keyframes.push(Keyframe {
                    tick: msg.tick,
                    net_tick: msg.net_tick,
                    game_time: 0.0,
                    cursor,
                    world: world.clone(),
                });
                next_capture = msg.tick.saturating_add(interval);
            }

            if match_start_tick.is_none() && marks_match_start(&msg.kind) {
                match_start_tick = Some(msg.tick);
            }

            if let MessageKind::EntityUpdate(update) = &msg.kind {
                world.apply(update);
            }
        }

        let last_tick = previous_tick;
        let start = match_start_tick.unwrap_or(0);
        for kf in &mut keyframes {
            kf.game_time = tick_to_game_time(kf.tick, start);
        }

        log::debug!(
            "indexed {} keyframes over {} messages (last tick {last_tick})",
            keyframes.len(),
            messages.len()
        );

        Ok(DemoIndex {
            keyframes,
            interval,
            match_start_tick,
            last_tick,
        })
    }

    /// Locates the keyframe governing `tick`.
    ///
    /// Targets before the first keyframe clamp forward to it, flagged in
    /// [`Seek::clamped`].
    ///
    /// # Errors
    ///
    /// Returns [`TimelineError::TickOutOfRange`] when `tick` lies past
    /// the last recorded tick.
    pub fn find_keyframe(&self, tick: u32) -> Result<Seek<'_>> {
        if self.keyframes.is_empty() {
            return Err(TimelineError::EmptyIndex);
        }
        if tick > self.last_tick {
            return Err(TimelineError::TickOutOfRange {
                target: tick,
                last: self.last_tick,
            });
        }

        // First keyframe strictly past the target; its predecessor governs.
        let upper = self.keyframes.partition_point(|kf| kf.tick <= tick);
        if upper == 0 {
            let keyframe = &self.keyframes[0];
            return Ok(Seek {
                keyframe,
                exact: keyframe.tick == tick,
                clamped: true,
            });
        }

        let keyframe = &self.keyframes[upper - 1];
        Ok(Seek {
            keyframe,
            exact: keyframe.tick == tick,
            clamped: false,
        })
    }

    /// All captured keyframes in tick order.
    #[must_use]
    pub fn keyframes(&self) -> &[Keyframe] {
        &self.keyframes
    }

    /// The capture interval in ticks.
    #[must_use]
    pub fn interval(&self) -> u32 {
        self.interval
    }

    /// The tick at which the match started (horn), if observed.
    #[must_use]
    pub fn match_start_tick(&self) -> Option<u32> {
        self.match_start_tick
    }

    /// The last tick seen in the stream.
    #[must_use]
    pub fn last_tick(&self) -> u32 {
        self.last_tick
    }

    /// Number of keyframes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.keyframes.len()
    }

    /// True when no keyframes were captured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keyframes.is_empty()
    }
}

/// Detects the horn from either signal the recording carries: a
/// `GAME_STATE` combat log entry reaching the in-progress state, or the
/// game rules entity publishing a positive start time.
pub(crate) fn marks_match_start(kind: &MessageKind) -> bool {
    match kind {
        MessageKind::CombatLog(entry) => {
            entry.entry_type == CombatLogType::GameState && entry.value == GAME_STATE_IN_PROGRESS
        }
        MessageKind::EntityUpdate(update) => update.changes.iter().any(|c| {
            c.key == PropertyKey::GameStartTime
                && matches!(c.value, crate::message::PropertyValue::Float(v) if v > 0.0)
        }),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::{
        CombatLogMessage, EntityUpdateMessage, Message, PropertyChange, PropertyValue,
    };
    use crate::stream::RecordedStream;

    fn chat(tick: u32) -> Message {
        Message::at(tick, MessageKind::Chat(String::new()))
    }

    fn stream_over(ticks: &[u32]) -> RecordedStream {
        let mut stream = RecordedStream::new();
        for &t in ticks {
            stream.push(chat(t)).unwrap();
        }
        stream
    }

    #[test]
    fn test_empty_stream_rejected() {
        let stream = RecordedStream::new();
        assert!(matches!(
            DemoIndex::build(&stream),
            Err(TimelineError::EmptyIndex)
        ));
    }

    #[test]
    fn test_capture_interval() {
        let stream = stream_over(&[0, 100, 1800, 1900, 3600, 5400]);
        let index = DemoIndex::build(&stream).unwrap();

        let ticks: Vec<u32> = index.keyframes().iter().map(|kf| kf.tick).collect();
        assert_eq!(ticks, vec![0, 1800, 3600, 5400]);
        assert_eq!(index.last_tick(), 5400);
    }

    #[test]
    fn test_find_keyframe_between_captures() {
        let stream = stream_over(&[0, 1800, 3600]);
        let index = DemoIndex::build(&stream).unwrap();

        let seek = index.find_keyframe(2500).unwrap();
        assert_eq!(seek.keyframe.tick, 1800);
        assert!(!seek.exact);
        assert!(!seek.clamped);

        let seek = index.find_keyframe(1800).unwrap();
        assert!(seek.exact);
    }

    #[test]
    fn test_find_keyframe_clamps_before_first() {
        let stream = stream_over(&[500, 2500]);
        let index = DemoIndex::build(&stream).unwrap();

        let seek = index.find_keyframe(100).unwrap();
        assert_eq!(seek.keyframe.tick, 500);
        assert!(seek.clamped);
        assert!(!seek.exact);
    }

    #[test]
    fn test_find_keyframe_past_end() {
        let stream = stream_over(&[0, 1800]);
        let index = DemoIndex::build(&stream).unwrap();

        match index.find_keyframe(9999) {
            Err(TimelineError::TickOutOfRange { target, last }) => {
                assert_eq!(target, 9999);
                assert_eq!(last, 1800);
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_keyframe_world_excludes_cursor_message() {
        let mut stream = RecordedStream::new();
        stream
            .push(Message::at(
                0,
                MessageKind::EntityUpdate(EntityUpdateMessage::created(
                    1,
                    "CDOTA_Unit_Hero_Axe",
                    Vec::new(),
                )),
            ))
            .unwrap();
        stream
            .push(Message::at(
                2000,
                MessageKind::EntityUpdate(EntityUpdateMessage::created(
                    2,
                    "CDOTA_Unit_Hero_Lina",
                    Vec::new(),
                )),
            ))
            .unwrap();
        let index = DemoIndex::build(&stream).unwrap();

        // Second keyframe captured at tick 2000: Axe folded, Lina not yet.
        let kf = &index.keyframes()[1];
        assert_eq!(kf.tick, 2000);
        assert_eq!(kf.cursor, 1);
        assert_eq!(kf.world.len(), 1);
        assert!(kf.world.get(1).is_some());
        assert!(kf.world.get(2).is_none());
    }

    #[test]
    fn test_match_start_from_combat_log() {
        let mut stream = RecordedStream::new();
        stream.push(chat(0)).unwrap();
        stream
            .push(Message::at(
                1200,
                MessageKind::CombatLog(CombatLogMessage {
                    entry_type: CombatLogType::GameState,
                    value: GAME_STATE_IN_PROGRESS,
                    ..CombatLogMessage::default()
                }),
            ))
            .unwrap();
        stream.push(chat(3000)).unwrap();

        let index = DemoIndex::build(&stream).unwrap();
        assert_eq!(index.match_start_tick(), Some(1200));

        // Keyframe game times are relative to the horn.
        let first = &index.keyframes()[0];
        assert!((first.game_time - (-40.0)).abs() < 1e-4);
    }

    #[test]
    fn test_match_start_from_game_rules() {
        let mut stream = RecordedStream::new();
        stream
            .push(Message::at(
                0,
                MessageKind::EntityUpdate(EntityUpdateMessage::created(
                    9,
                    "CDOTAGamerulesProxy",
                    vec![PropertyChange::new(
                        PropertyKey::GameStartTime,
                        PropertyValue::Float(0.0),
                    )],
                )),
            ))
            .unwrap();
        stream
            .push(Message::at(
                900,
                MessageKind::EntityUpdate(EntityUpdateMessage::updated(
                    9,
                    vec![PropertyChange::new(
                        PropertyKey::GameStartTime,
                        PropertyValue::Float(631.4),
                    )],
                )),
            ))
            .unwrap();

        let index = DemoIndex::build(&stream).unwrap();
        assert_eq!(index.match_start_tick(), Some(900));
    }

    #[test]
    fn test_non_monotonic_stream_rejected() {
        // A stream impl that skips RecordedStream's ordering validation.
        struct Raw(Vec<Message>);
        impl MessageStream for Raw {
            fn messages(&self) -> &[Message] {
                &self.0
            }
            fn string_tables(&self) -> &[crate::stream::StringTable] {
                &[]
            }
        }

        let raw = Raw(vec![chat(100), chat(50)]);
        match DemoIndex::build(&raw) {
            Err(TimelineError::NonMonotonicTick { previous, found }) => {
                assert_eq!(previous, 100);
                assert_eq!(found, 50);
            }
            other => panic!("unexpected: {other:?}"),
        }
    }
}
