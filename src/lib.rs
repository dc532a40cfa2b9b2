//! # Demo Timeline
//!
//! Tick-indexed seeking and world-state reconstruction for recorded
//! Dota 2 matches.
//!
//! Given a tick-ordered stream of decoded demo messages, this library
//! provides:
//! - **Sparse keyframe indexing** for `O(log n)` seeks to any tick
//! - **World-state snapshots** at arbitrary ticks: heroes with abilities,
//!   talents and inventory, team scores, creeps, illusions
//! - **Combat log extraction** over a bounded tick range with
//!   string-table name resolution
//! - **Derived events**: respawn timing, a unified melee/ranged attack
//!   stream, hero-level backfill
//! - **Single-pass aggregation** of any combination of result facets
//!
//! ## Quick Start
//!
//! ```no_run
//! use demo_timeline::{RecordedStream, Session, SnapshotOptions};
//! use demo_timeline::error::Result;
//!
//! fn inspect(stream: RecordedStream) -> Result<()> {
//!     let mut session = Session::new(stream);
//!
//!     // Seek to the 10-minute mark and reconstruct the world there.
//!     let snapshot = session.snapshot(10 * 60 * 30, SnapshotOptions::default())?;
//!     for hero in &snapshot.heroes {
//!         println!("{} level {} at ({}, {})", hero.hero_name, hero.level, hero.x, hero.y);
//!     }
//!
//!     // Pull the first minute of the combat log.
//!     let entries = session.combat_log_range(0, 1800, &Default::default())?;
//!     println!("{} entries", entries.len());
//!     Ok(())
//! }
//! ```
//!
//! ## Module Overview
//!
//! - [`error`] - Error types and result alias
//! - [`time`] - Tick/game-clock conversion and formatting
//! - [`message`] - The decoded message model handed in by decoders
//! - [`stream`] - The [`MessageStream`] trait and string tables
//! - [`state`] - Entity property folding and the live world
//! - [`index`] - Keyframe capture and binary-search seeking
//! - [`snapshot`] - World-state snapshot assembly
//! - [`combat_log`] - Bounded-range combat log extraction
//! - [`events`] - Respawns, unified attacks, hero-level injection
//! - [`collect`] - Single-pass multi-facet aggregation
//! - [`session`] - The owned [`Session`] handle tying it together
//!
//! Binary container decoding, wire-protocol decoding and decompression
//! live outside this crate; it consumes already-decoded messages through
//! the [`MessageStream`] seam.

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod collect;
pub mod combat_log;
pub mod error;
pub mod events;
pub mod index;
pub mod message;
pub mod session;
pub mod snapshot;
pub mod state;
pub mod stream;
pub mod time;

// Re-export commonly used types at the crate root
pub use collect::{ParseReport, ParseRequest};
pub use combat_log::{CombatLogEntry, CombatLogFilter};
pub use error::{Result, TimelineError};
pub use events::{AttackEvent, RespawnEvent};
pub use index::{DemoIndex, Keyframe, Seek, DEFAULT_KEYFRAME_INTERVAL};
pub use message::{Message, MessageKind};
pub use session::Session;
pub use snapshot::{EntitySnapshot, HeroSnapshot, SnapshotOptions};
pub use state::{Entity, World};
pub use stream::{MessageStream, RecordedStream, StringTable};
pub use time::{format_game_time, tick_to_game_time, TICKS_PER_SECOND};
