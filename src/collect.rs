//! Single-pass multi-facet aggregation.
//!
//! A [`ParseRequest`] names the facets to collect; [`run_parse`] walks
//! the stream once, dispatching every message to exactly the requested
//! collectors, and returns a [`ParseReport`] with one `Option` field per
//! facet. Any collector failure aborts the whole call; a failed call
//! leaves nothing half-populated.
//!
//! Game times are recomputed at the end of the pass once the match start
//! is known, so pre-horn snapshots and entries carry negative clocks.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::combat_log::{resolve_entry, CombatLogEntry, CombatLogFilter};
use crate::error::{Result, TimelineError};
use crate::events::{AttackCollector, AttackEvent};
use crate::index::marks_match_start;
use crate::message::{
    FileHeaderMessage, FileInfoMessage, GameEventDescriptor, GameEventValue, MessageKind,
    PropertyKey,
};
use crate::snapshot::{EntitySnapshot, SnapshotOptions};
use crate::state::World;
use crate::stream::MessageStream;
use crate::time::tick_to_game_time;

/// Which facets to collect, with their per-facet options.
#[derive(Debug, Clone, Default)]
pub struct ParseRequest {
    /// Demo file header.
    pub header: bool,
    /// Match metadata, players and draft.
    pub game_info: bool,
    /// Resolved combat log entries.
    pub combat_log: Option<CombatLogRequest>,
    /// World-state snapshots.
    pub entities: Option<EntitiesRequest>,
    /// Message type names and ticks.
    pub messages: Option<MessagesRequest>,
    /// Resolved game events.
    pub game_events: Option<GameEventsRequest>,
    /// Modifier table entries.
    pub modifiers: Option<ModifiersRequest>,
    /// String table dumps.
    pub string_tables: Option<StringTablesRequest>,
    /// Unified attack events.
    pub attacks: Option<AttacksRequest>,
    /// Stream summary statistics.
    pub parser_info: bool,
}

/// Combat log facet options.
#[derive(Debug, Clone, Default)]
pub struct CombatLogRequest {
    /// Lower tick bound; 0 when absent.
    pub start: Option<u32>,
    /// Upper tick bound; end of stream when absent.
    pub end: Option<u32>,
    /// Sub-filters.
    pub filter: CombatLogFilter,
    /// Backfill zeroed hero levels from tracked entity state.
    pub inject_hero_levels: bool,
}

/// Entities facet options.
#[derive(Debug, Clone, Default)]
pub struct EntitiesRequest {
    /// Capture a snapshot every this many ticks.
    pub interval_ticks: Option<u32>,
    /// Capture snapshots at these exact ticks.
    pub target_ticks: Vec<u32>,
    /// Keep only heroes whose name contains this substring.
    pub hero_filter: Option<String>,
    /// Include alive creeps in each snapshot.
    pub include_creeps: bool,
    /// Include illusions and clones, tagged.
    pub include_illusions: bool,
    /// Stop capturing after this many snapshots.
    pub max_snapshots: Option<usize>,
}

/// Messages facet options.
#[derive(Debug, Clone, Default)]
pub struct MessagesRequest {
    /// Keep only type names containing this substring.
    pub name_contains: Option<String>,
    /// Stop after this many records.
    pub max_messages: Option<usize>,
}

/// Game events facet options.
#[derive(Debug, Clone, Default)]
pub struct GameEventsRequest {
    /// Keep only events with exactly these names; empty keeps all.
    pub names: Vec<String>,
    /// Keep only events whose name contains this substring.
    pub name_contains: Option<String>,
    /// Stop after this many events.
    pub max_events: Option<usize>,
}

/// Modifiers facet options.
#[derive(Debug, Clone, Default)]
pub struct ModifiersRequest {
    /// Keep only aura-applied modifiers.
    pub auras_only: bool,
    /// Stop after this many entries.
    pub max_entries: Option<usize>,
}

/// String tables facet options.
#[derive(Debug, Clone, Default)]
pub struct StringTablesRequest {
    /// Keep only tables whose name contains this substring.
    pub name_contains: Option<String>,
    /// Truncate each table to this many entries.
    pub max_entries_per_table: Option<usize>,
}

/// Attacks facet options.
#[derive(Debug, Clone, Default)]
pub struct AttacksRequest {
    /// Stop after this many events.
    pub max_events: Option<usize>,
}

/// The aggregated result: one `Option` per requested facet.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ParseReport {
    /// Demo file header.
    pub header: Option<FileHeaderMessage>,
    /// Match metadata, players and draft.
    pub game_info: Option<FileInfoMessage>,
    /// Resolved combat log entries.
    pub combat_log: Option<Vec<CombatLogEntry>>,
    /// World-state snapshots.
    pub entities: Option<EntitiesReport>,
    /// Message type names and ticks.
    pub messages: Option<Vec<MessageRecord>>,
    /// Resolved game events.
    pub game_events: Option<Vec<GameEventRecord>>,
    /// Modifier table entries.
    pub modifiers: Option<Vec<ModifierRecord>>,
    /// String table dumps.
    pub string_tables: Option<Vec<StringTableDump>>,
    /// Unified attack events.
    pub attacks: Option<Vec<AttackEvent>>,
    /// Stream summary statistics.
    pub parser_info: Option<ParserInfoReport>,
}

/// The entities facet result.
#[derive(Debug, Clone, Default, Serialize)]
pub struct EntitiesReport {
    /// Captured snapshots in tick order.
    pub snapshots: Vec<EntitySnapshot>,
    /// The detected match start, if the horn was observed.
    pub match_start_tick: Option<u32>,
}

/// One message occurrence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageRecord {
    /// Wire-protocol type name.
    pub type_name: String,
    /// Simulation tick.
    pub tick: u32,
}

/// One resolved game event.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameEventRecord {
    /// Event name from the descriptor list, or `event_<id>` when the
    /// descriptor never arrived.
    pub name: String,
    /// Simulation tick.
    pub tick: u32,
    /// Field name/value pairs in descriptor order.
    pub fields: Vec<GameEventField>,
}

/// One rendered game event field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameEventField {
    /// Field name.
    pub name: String,
    /// Rendered value.
    pub value: String,
}

/// One modifier table entry with its tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ModifierRecord {
    /// Simulation tick.
    pub tick: u32,
    /// Handle of the unit carrying the modifier.
    pub parent: u32,
    /// Handle of the casting unit.
    pub caster: u32,
    /// Handle of the creating ability.
    pub ability: u32,
    /// Modifier class id.
    pub modifier_class: i32,
    /// Serial number.
    pub serial_num: i32,
    /// Duration in seconds; -1 for permanent.
    pub duration: f32,
    /// Stack count.
    pub stack_count: i32,
    /// True for aura-applied modifiers.
    pub is_aura: bool,
}

/// One dumped string table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StringTableDump {
    /// Table name.
    pub name: String,
    /// Entries in index order, possibly truncated.
    pub entries: Vec<String>,
}

/// Stream summary statistics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParserInfoReport {
    /// Last simulation tick in the stream.
    pub last_tick: u32,
    /// Last network tick in the stream.
    pub last_net_tick: u32,
    /// Names of the captured string tables.
    pub string_tables: Vec<String>,
    /// Live entities at end of stream.
    pub entity_count: usize,
    /// Game build from server info; 0 when absent.
    pub game_build: i32,
}

/// Runs all requested collectors in one pass over the stream.
///
/// Identical requests over identical streams produce identical reports.
///
/// # Errors
///
/// Returns [`TimelineError::InvalidRequest`] for unusable facet options
/// (inverted combat log window, zero snapshot interval) and
/// [`TimelineError::TickOutOfRange`] when an entities target tick lies
/// past the end of the stream. A failed call populates nothing.
#[allow(clippy::too_many_lines)]
pub fn run_parse<S: MessageStream>(stream: &S, request: &ParseRequest) -> Result<ParseReport> {
    validate(request)?;
    log::debug!("aggregation pass over {} messages", stream.messages().len());

    let mut report = ParseReport::default();

    if let Some(st_req) = &request.string_tables {
        report.string_tables = Some(dump_string_tables(stream, st_req));
    }

    let need_world = request.entities.is_some()
        || request.parser_info
        || request
            .combat_log
            .as_ref()
            .is_some_and(|c| c.inject_hero_levels);

    let mut world = World::new();
    let mut hero_levels: HashMap<String, u32> = HashMap::new();
    let mut match_start_tick: Option<u32> = None;
    let mut game_build = 0i32;
    let mut last_tick = 0u32;
    let mut last_net_tick = 0u32;

    let mut combat_entries: Vec<CombatLogEntry> = Vec::new();
    let mut message_records: Vec<MessageRecord> = Vec::new();
    let mut event_records: Vec<GameEventRecord> = Vec::new();
    let mut descriptors: HashMap<i32, GameEventDescriptor> = HashMap::new();
    let mut modifier_records: Vec<ModifierRecord> = Vec::new();
    let mut attacks = request
        .attacks
        .as_ref()
        .map(|req| AttackCollector::new(req.max_events));

    let mut snapshots: Vec<EntitySnapshot> = Vec::new();
    let mut targets: Vec<u32> = request
        .entities
        .as_ref()
        .map(|req| {
            let mut t = req.target_ticks.clone();
            t.sort_unstable();
            t
        })
        .unwrap_or_default();
    let mut target_idx = 0usize;
    let mut next_capture: Option<u32> = None;
    let mut pending_capture: Option<(u32, u32)> = None;

    for msg in stream.messages() {
        last_tick = msg.tick;
        last_net_tick = msg.net_tick;

        if let Some(req) = &request.entities {
            // Explicit targets capture world state through their tick.
            while target_idx < targets.len() && msg.tick > targets[target_idx] {
                capture(&mut snapshots, &world, targets[target_idx], msg.net_tick, req);
                target_idx += 1;
            }
            if let Some(interval) = req.interval_ticks {
                // An interval capture flushes once the stream moves past its
                // tick, so updates at the labeled tick are included.
                if let Some((tick, net_tick)) = &mut pending_capture {
                    if msg.tick > *tick {
                        capture(&mut snapshots, &world, *tick, *net_tick, req);
                        pending_capture = None;
                    } else {
                        *net_tick = msg.net_tick;
                    }
                }
                let due = next_capture.get_or_insert(msg.tick);
                if pending_capture.is_none() && msg.tick >= *due {
                    pending_capture = Some((msg.tick, msg.net_tick));
                    next_capture = Some(msg.tick.saturating_add(interval));
                }
            }
        }

        if match_start_tick.is_none() && marks_match_start(&msg.kind) {
            match_start_tick = Some(msg.tick);
        }

        if let Some(req) = &request.messages {
            let cap_left = req
                .max_messages
                .is_none_or(|cap| message_records.len() < cap);
            let type_name = msg.kind.type_name();
            if cap_left
                && req
                    .name_contains
                    .as_ref()
                    .is_none_or(|needle| type_name.contains(needle.as_str()))
            {
                message_records.push(MessageRecord {
                    type_name: type_name.to_string(),
                    tick: msg.tick,
                });
            }
        }

        match &msg.kind {
            MessageKind::FileHeader(header) => {
                if request.header && report.header.is_none() {
                    report.header = Some(header.clone());
                }
            }
            MessageKind::FileInfo(info) => {
                if request.game_info && report.game_info.is_none() {
                    report.game_info = Some(info.clone());
                }
            }
            MessageKind::ServerInfo(info) => {
                game_build = info.protocol;
            }
            MessageKind::CombatLog(raw) => {
                if let Some(req) = &request.combat_log {
                    let start = req.start.unwrap_or(0);
                    let end = req.end.unwrap_or(u32::MAX);
                    let cap_left = req
                        .filter
                        .max_entries
                        .is_none_or(|cap| combat_entries.len() < cap);
                    if cap_left
                        && msg.tick >= start
                        && msg.tick <= end
                        && (req.filter.types.is_empty()
                            || req.filter.types.contains(&raw.entry_type))
                        && (!req.filter.heroes_only
                            || raw.is_attacker_hero
                            || raw.is_target_hero)
                    {
                        let mut entry = resolve_entry(stream, raw, msg.tick, msg.net_tick, 0);
                        if req.inject_hero_levels {
                            backfill_levels(&mut entry, &hero_levels);
                        }
                        let keep = req.filter.name_contains.as_ref().is_none_or(|needle| {
                            entry.attacker_name.contains(needle.as_str())
                                || entry.target_name.contains(needle.as_str())
                                || entry.inflictor_name.contains(needle.as_str())
                                || entry.damage_source_name.contains(needle.as_str())
                        });
                        if keep {
                            combat_entries.push(entry);
                        }
                    }
                }
            }
            MessageKind::EntityUpdate(update) => {
                if need_world {
                    world.apply(update);
                    if let Some(entity) = world.get(update.entity) {
                        if let (Some(name), Some(level)) =
                            (entity.hero_unit_name(), entity.uint(&PropertyKey::Level))
                        {
                            hero_levels.insert(name, level);
                        }
                    }
                }
            }
            MessageKind::GameEventList(list) => {
                if request.game_events.is_some() {
                    for descriptor in list {
                        descriptors.insert(descriptor.event_id, descriptor.clone());
                    }
                }
            }
            MessageKind::GameEvent(event) => {
                if let Some(req) = &request.game_events {
                    let cap_left = req.max_events.is_none_or(|cap| event_records.len() < cap);
                    if cap_left {
                        if let Some(record) =
                            resolve_game_event(&descriptors, event, msg.tick, req)
                        {
                            event_records.push(record);
                        }
                    }
                }
            }
            MessageKind::Modifier(modifier) => {
                if let Some(req) = &request.modifiers {
                    let cap_left = req
                        .max_entries
                        .is_none_or(|cap| modifier_records.len() < cap);
                    if cap_left && (!req.auras_only || modifier.is_aura) {
                        modifier_records.push(ModifierRecord {
                            tick: msg.tick,
                            parent: modifier.parent,
                            caster: modifier.caster,
                            ability: modifier.ability,
                            modifier_class: modifier.modifier_class,
                            serial_num: modifier.serial_num,
                            duration: modifier.duration,
                            stack_count: modifier.stack_count,
                            is_aura: modifier.is_aura,
                        });
                    }
                }
            }
            MessageKind::Projectile(_) | MessageKind::Chat(_) => {}
        }

        if let Some(collector) = &mut attacks {
            collector.observe(stream, msg);
        }
    }

    // Captures still open at end of stream take the final world state.
    if let Some(req) = &request.entities {
        if let Some((tick, net_tick)) = pending_capture {
            capture(&mut snapshots, &world, tick, net_tick, req);
        }
        while target_idx < targets.len() {
            let target = targets[target_idx];
            if target > last_tick {
                return Err(TimelineError::TickOutOfRange {
                    target,
                    last: last_tick,
                });
            }
            capture(&mut snapshots, &world, target, last_net_tick, req);
            target_idx += 1;
        }
        snapshots.sort_by_key(|s| s.tick);
        if let Some(cap) = req.max_snapshots {
            snapshots.truncate(cap);
        }
    }

    // Once the horn tick is known, anchor every derived clock to it.
    let start = match_start_tick.unwrap_or(0);
    for entry in &mut combat_entries {
        entry.game_time = tick_to_game_time(entry.tick, start);
    }
    for snap in &mut snapshots {
        snap.game_time = tick_to_game_time(snap.tick, start);
    }

    if request.combat_log.is_some() {
        report.combat_log = Some(combat_entries);
    }
    if request.entities.is_some() {
        report.entities = Some(EntitiesReport {
            snapshots,
            match_start_tick,
        });
    }
    if request.messages.is_some() {
        report.messages = Some(message_records);
    }
    if request.game_events.is_some() {
        report.game_events = Some(event_records);
    }
    if request.modifiers.is_some() {
        report.modifiers = Some(modifier_records);
    }
    if let Some(collector) = attacks {
        report.attacks = Some(collector.finish());
    }
    if request.parser_info {
        report.parser_info = Some(ParserInfoReport {
            last_tick,
            last_net_tick,
            string_tables: stream
                .string_tables()
                .iter()
                .map(|t| t.name.clone())
                .collect(),
            entity_count: world.len(),
            game_build,
        });
    }
    Ok(report)
}

fn validate(request: &ParseRequest) -> Result<()> {
    if let Some(combat) = &request.combat_log {
        if let (Some(start), Some(end)) = (combat.start, combat.end) {
            if start > end {
                return Err(TimelineError::invalid_request(format!(
                    "combat log range start {start} exceeds end {end}"
                )));
            }
        }
    }
    if let Some(entities) = &request.entities {
        if entities.interval_ticks == Some(0) {
            return Err(TimelineError::invalid_request(
                "snapshot interval must be positive",
            ));
        }
        if entities.interval_ticks.is_none() && entities.target_ticks.is_empty() {
            return Err(TimelineError::invalid_request(
                "entities facet needs an interval or target ticks",
            ));
        }
    }
    Ok(())
}

fn capture(
    snapshots: &mut Vec<EntitySnapshot>,
    world: &World,
    tick: u32,
    net_tick: u32,
    req: &EntitiesRequest,
) {
    if req.max_snapshots.is_some_and(|cap| snapshots.len() >= cap) {
        return;
    }
    let mut snap = EntitySnapshot::capture(
        world,
        tick,
        net_tick,
        0.0,
        SnapshotOptions {
            include_illusions: req.include_illusions,
            include_creeps: req.include_creeps,
        },
    );
    if let Some(filter) = &req.hero_filter {
        snap.heroes.retain(|h| h.hero_name.contains(filter.as_str()));
    }
    snapshots.push(snap);
}

fn backfill_levels(entry: &mut CombatLogEntry, levels: &HashMap<String, u32>) {
    if entry.is_attacker_hero && entry.attacker_hero_level == 0 {
        if let Some(level) = levels.get(&entry.attacker_name) {
            entry.attacker_hero_level = *level;
        }
    }
    if entry.is_target_hero && entry.target_hero_level == 0 {
        if let Some(level) = levels.get(&entry.target_name) {
            entry.target_hero_level = *level;
        }
    }
}

fn resolve_game_event(
    descriptors: &HashMap<i32, GameEventDescriptor>,
    event: &crate::message::GameEventMessage,
    tick: u32,
    req: &GameEventsRequest,
) -> Option<GameEventRecord> {
    let descriptor = descriptors.get(&event.event_id);
    let name = descriptor.map_or_else(
        || format!("event_{}", event.event_id),
        |d| d.name.clone(),
    );

    if !req.names.is_empty() && !req.names.iter().any(|n| *n == name) {
        return None;
    }
    if let Some(needle) = &req.name_contains {
        if !name.contains(needle.as_str()) {
            return None;
        }
    }

    let fields = event
        .fields
        .iter()
        .enumerate()
        .map(|(i, value)| GameEventField {
            name: descriptor
                .and_then(|d| d.field_names.get(i).cloned())
                .unwrap_or_else(|| format!("field_{i}")),
            value: render_event_value(value),
        })
        .collect();

    Some(GameEventRecord { name, tick, fields })
}

fn render_event_value(value: &GameEventValue) -> String {
    match value {
        GameEventValue::Text(v) => v.clone(),
        GameEventValue::Float(v) => v.to_string(),
        GameEventValue::Int(v) => v.to_string(),
        GameEventValue::Bool(v) => v.to_string(),
        GameEventValue::Uint64(v) => v.to_string(),
    }
}

fn dump_string_tables<S: MessageStream>(
    stream: &S,
    req: &StringTablesRequest,
) -> Vec<StringTableDump> {
    stream
        .string_tables()
        .iter()
        .filter(|table| {
            req.name_contains
                .as_ref()
                .is_none_or(|needle| table.name.contains(needle.as_str()))
        })
        .map(|table| {
            let mut entries = table.entries.clone();
            if let Some(cap) = req.max_entries_per_table {
                entries.truncate(cap);
            }
            StringTableDump {
                name: table.name.clone(),
                entries,
            }
        })
        .collect()
}
