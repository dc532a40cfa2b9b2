//! Message stream abstraction and string tables.
//!
//! The engine walks a fully-decoded, tick-ordered message sequence. The
//! [`MessageStream`] trait is the seam between the engine and whatever
//! produced those messages; [`RecordedStream`] is the in-memory
//! implementation used by the indexer, the tests, and any decoder that
//! buffers a full recording.

use crate::error::{Result, TimelineError};
use crate::message::Message;

/// The string table that names combat log participants.
pub const COMBAT_LOG_NAMES: &str = "CombatLogNames";

/// A named string table from the recording.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringTable {
    /// Table name (e.g. `CombatLogNames`).
    pub name: String,
    /// Entries indexed by their table position.
    pub entries: Vec<String>,
}

impl StringTable {
    /// Creates a table from owned entries.
    #[must_use]
    pub fn new(name: &str, entries: Vec<String>) -> Self {
        StringTable {
            name: name.to_string(),
            entries,
        }
    }
}

/// A tick-ordered source of decoded messages.
///
/// Implementations expose the full message sequence as a slice so callers
/// can index at arbitrary positions; keyframe cursors are plain indices
/// into that slice.
pub trait MessageStream {
    /// All messages, ordered by non-decreasing tick.
    fn messages(&self) -> &[Message];

    /// All string tables captured from the recording.
    fn string_tables(&self) -> &[StringTable];

    /// Resolves `index` in the named table.
    ///
    /// Returns `None` when the table is absent or the index is out of
    /// range.
    fn resolve(&self, table: &str, index: u32) -> Option<&str> {
        self.string_tables()
            .iter()
            .find(|t| t.name == table)
            .and_then(|t| t.entries.get(index as usize))
            .map(String::as_str)
    }

    /// Resolves `index` in the named table, substituting `unknown_<index>`
    /// on failure.
    ///
    /// Name resolution is best-effort throughout the engine; a missing
    /// entry degrades to a sentinel rather than aborting extraction.
    fn resolve_or_sentinel(&self, table: &str, index: u32) -> String {
        match self.resolve(table, index) {
            Some(name) => name.to_string(),
            None => format!("unknown_{index}"),
        }
    }
}

/// An in-memory message stream.
#[derive(Debug, Clone, Default)]
pub struct RecordedStream {
    messages: Vec<Message>,
    string_tables: Vec<StringTable>,
}

impl RecordedStream {
    /// Creates an empty stream.
    #[must_use]
    pub fn new() -> Self {
        RecordedStream::default()
    }

    /// Creates a stream from pre-decoded messages and tables, validating
    /// tick ordering.
    ///
    /// # Errors
    ///
    /// Returns [`TimelineError::NonMonotonicTick`] if any message's tick
    /// is lower than its predecessor's.
    pub fn from_parts(messages: Vec<Message>, string_tables: Vec<StringTable>) -> Result<Self> {
        let mut previous = 0u32;
        for msg in &messages {
            if msg.tick < previous {
                return Err(TimelineError::NonMonotonicTick {
                    previous,
                    found: msg.tick,
                });
            }
            previous = msg.tick;
        }
        Ok(RecordedStream {
            messages,
            string_tables,
        })
    }

    /// Appends a message, validating tick ordering against the last one.
    ///
    /// # Errors
    ///
    /// Returns [`TimelineError::NonMonotonicTick`] if `message.tick` is
    /// lower than the last appended tick.
    pub fn push(&mut self, message: Message) -> Result<()> {
        if let Some(last) = self.messages.last() {
            if message.tick < last.tick {
                return Err(TimelineError::NonMonotonicTick {
                    previous: last.tick,
                    found: message.tick,
                });
            }
        }
        self.messages.push(message);
        Ok(())
    }

    /// Installs or replaces a string table.
    pub fn set_string_table(&mut self, table: StringTable) {
        if let Some(existing) = self
            .string_tables
            .iter_mut()
            .find(|t| t.name == table.name)
        {
            *existing = table;
        } else {
            self.string_tables.push(table);
        }
    }

    /// Number of messages in the stream.
    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// True when the stream holds no messages.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

impl MessageStream for RecordedStream {
    fn messages(&self) -> &[Message] {
        &self.messages
    }

    fn string_tables(&self) -> &[StringTable] {
        &self.string_tables
    }
}
