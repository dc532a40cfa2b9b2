//! Combat log extraction over a bounded tick range.
//!
//! [`extract_range`] walks the stream once, resolves every string-table
//! index through the stream's resolver, and returns fully-resolved
//! [`CombatLogEntry`] values. Resolution is best-effort: a missing table
//! entry becomes `unknown_<index>` and extraction continues.

use serde::{Deserialize, Serialize};

use crate::error::{Result, TimelineError};
use crate::message::{CombatLogMessage, CombatLogType, MessageKind};
use crate::stream::{MessageStream, COMBAT_LOG_NAMES};
use crate::time::tick_to_game_time;

/// A fully-resolved combat log entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatLogEntry {
    /// Simulation tick.
    pub tick: u32,
    /// Network tick.
    pub net_tick: u32,
    /// Game-clock seconds; negative before the horn.
    pub game_time: f32,
    /// Raw entry type code.
    pub entry_type: i32,
    /// Protocol name of the entry type.
    pub type_name: String,
    /// Resolved attacker name.
    pub attacker_name: String,
    /// Resolved target name.
    pub target_name: String,
    /// Resolved target source name (owner for illusions/summons).
    pub target_source_name: String,
    /// Resolved inflictor (ability/item) name.
    pub inflictor_name: String,
    /// Resolved damage source name.
    pub damage_source_name: String,
    /// Type-dependent value.
    pub value: u32,
    /// Resolved value name for purchases.
    pub value_name: Option<String>,
    /// Target health after the event.
    pub health: i32,
    /// Event world location.
    pub x: f32,
    /// Event world location.
    pub y: f32,
    /// Stun duration applied, seconds.
    pub stun_duration: f32,
    /// Slow duration applied, seconds.
    pub slow_duration: f32,
    /// Modifier stack count.
    pub stack_count: u32,
    /// Level of the inflicting ability.
    pub ability_level: u32,
    /// Attacker team number.
    pub attacker_team: i32,
    /// Target team number.
    pub target_team: i32,
    /// Damage type classification.
    pub damage_type: i32,
    /// Damage category classification.
    pub damage_category: i32,
    /// True if the attacker is a hero.
    pub is_attacker_hero: bool,
    /// True if the attacker is an illusion.
    pub is_attacker_illusion: bool,
    /// True if the target is a hero.
    pub is_target_hero: bool,
    /// True if the target is an illusion.
    pub is_target_illusion: bool,
    /// True if the target is a building.
    pub is_target_building: bool,
    /// True if this damage came from a spell rather than an attack.
    pub spell_generated_attack: bool,
    /// Attacker hero level; 0 when the recording omitted it.
    pub attacker_hero_level: u32,
    /// Target hero level; 0 when the recording omitted it.
    pub target_hero_level: u32,
}

/// Sub-filters applied during range extraction.
#[derive(Debug, Clone, Default)]
pub struct CombatLogFilter {
    /// Entry types to keep; empty keeps all.
    pub types: Vec<CombatLogType>,
    /// Keep only entries where some resolved name contains this substring.
    pub name_contains: Option<String>,
    /// Keep only entries with a hero attacker or target.
    pub heroes_only: bool,
    /// Stop after this many entries.
    pub max_entries: Option<usize>,
}

/// Extracts resolved combat log entries with `start <= tick <= end`.
///
/// `match_start_tick` anchors per-entry game times; pass the index's
/// detected start, or 0 when unknown.
///
/// # Errors
///
/// Returns [`TimelineError::InvalidRequest`] when `start > end`.
pub fn extract_range<S: MessageStream>(
    stream: &S,
    start: u32,
    end: u32,
    filter: &CombatLogFilter,
    match_start_tick: u32,
) -> Result<Vec<CombatLogEntry>> {
    if start > end {
        return Err(TimelineError::invalid_request(format!(
            "combat log range start {start} exceeds end {end}"
        )));
    }

    let mut entries = Vec::new();
    for msg in stream.messages() {
        if msg.tick > end {
            break;
        }
        if msg.tick < start {
            continue;
        }
        let MessageKind::CombatLog(raw) = &msg.kind else {
            continue;
        };
        if !filter.types.is_empty() && !filter.types.contains(&raw.entry_type) {
            continue;
        }
        if filter.heroes_only && !raw.is_attacker_hero && !raw.is_target_hero {
            continue;
        }

        let entry = resolve_entry(stream, raw, msg.tick, msg.net_tick, match_start_tick);
        if let Some(needle) = &filter.name_contains {
            let hit = entry.attacker_name.contains(needle.as_str())
                || entry.target_name.contains(needle.as_str())
                || entry.inflictor_name.contains(needle.as_str())
                || entry.damage_source_name.contains(needle.as_str());
            if !hit {
                continue;
            }
        }

        entries.push(entry);
        if filter.max_entries.is_some_and(|cap| entries.len() >= cap) {
            break;
        }
    }
    Ok(entries)
}

/// Resolves one raw entry's name indices and derives its game time.
pub(crate) fn resolve_entry<S: MessageStream>(
    stream: &S,
    raw: &CombatLogMessage,
    tick: u32,
    net_tick: u32,
    match_start_tick: u32,
) -> CombatLogEntry {
    let value_name = (raw.entry_type == CombatLogType::Purchase)
        .then(|| stream.resolve_or_sentinel(COMBAT_LOG_NAMES, raw.value));

    CombatLogEntry {
        tick,
        net_tick,
        game_time: tick_to_game_time(tick, match_start_tick),
        entry_type: raw.entry_type.raw(),
        type_name: raw.entry_type.name().to_string(),
        attacker_name: stream.resolve_or_sentinel(COMBAT_LOG_NAMES, raw.attacker_name),
        target_name: stream.resolve_or_sentinel(COMBAT_LOG_NAMES, raw.target_name),
        target_source_name: stream.resolve_or_sentinel(COMBAT_LOG_NAMES, raw.target_source_name),
        inflictor_name: stream.resolve_or_sentinel(COMBAT_LOG_NAMES, raw.inflictor_name),
        damage_source_name: stream.resolve_or_sentinel(COMBAT_LOG_NAMES, raw.damage_source_name),
        value: raw.value,
        value_name,
        health: raw.health,
        x: raw.location_x,
        y: raw.location_y,
        stun_duration: raw.stun_duration,
        slow_duration: raw.slow_duration,
        stack_count: raw.stack_count,
        ability_level: raw.ability_level,
        attacker_team: raw.attacker_team,
        target_team: raw.target_team,
        damage_type: raw.damage_type,
        damage_category: raw.damage_category,
        is_attacker_hero: raw.is_attacker_hero,
        is_attacker_illusion: raw.is_attacker_illusion,
        is_target_hero: raw.is_target_hero,
        is_target_illusion: raw.is_target_illusion,
        is_target_building: raw.is_target_building,
        spell_generated_attack: raw.spell_generated_attack,
        attacker_hero_level: raw.attacker_hero_level,
        target_hero_level: raw.target_hero_level,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Message;
    use crate::stream::{RecordedStream, StringTable};

    fn names() -> StringTable {
        StringTable::new(
            COMBAT_LOG_NAMES,
            vec![
                "dota_unknown".to_string(),
                "npc_dota_hero_axe".to_string(),
                "npc_dota_hero_lina".to_string(),
                "lina_laguna_blade".to_string(),
                "item_tango".to_string(),
            ],
        )
    }

    fn damage(tick: u32, attacker: u32, target: u32) -> Message {
        Message::at(
            tick,
            MessageKind::CombatLog(CombatLogMessage {
                entry_type: CombatLogType::Damage,
                attacker_name: attacker,
                target_name: target,
                is_attacker_hero: attacker > 0,
                is_target_hero: target > 0,
                value: 120,
                ..CombatLogMessage::default()
            }),
        )
    }

    fn fixture() -> RecordedStream {
        let mut stream = RecordedStream::new();
        stream.set_string_table(names());
        stream.push(damage(100, 1, 2)).unwrap();
        stream.push(damage(200, 2, 1)).unwrap();
        stream
            .push(Message::at(
                300,
                MessageKind::CombatLog(CombatLogMessage {
                    entry_type: CombatLogType::Purchase,
                    target_name: 2,
                    value: 4,
                    ..CombatLogMessage::default()
                }),
            ))
            .unwrap();
        stream.push(damage(400, 1, 2)).unwrap();
        stream
    }

    #[test]
    fn test_range_containment() {
        let stream = fixture();
        let entries =
            extract_range(&stream, 150, 350, &CombatLogFilter::default(), 0).unwrap();
        assert_eq!(entries.len(), 2);
        assert!(entries.iter().all(|e| e.tick >= 150 && e.tick <= 350));
    }

    #[test]
    fn test_invalid_window_rejected() {
        let stream = fixture();
        let err = extract_range(&stream, 500, 100, &CombatLogFilter::default(), 0).unwrap_err();
        assert!(matches!(err, TimelineError::InvalidRequest { .. }));
    }

    #[test]
    fn test_name_resolution_and_sentinel() {
        let stream = fixture();
        let entries =
            extract_range(&stream, 0, 1000, &CombatLogFilter::default(), 0).unwrap();

        assert_eq!(entries[0].attacker_name, "npc_dota_hero_axe");
        assert_eq!(entries[0].target_name, "npc_dota_hero_lina");
        assert_eq!(entries[0].inflictor_name, "dota_unknown");

        // Purchases resolve their value as an item name.
        let purchase = &entries[2];
        assert_eq!(purchase.type_name, "DOTA_COMBATLOG_PURCHASE");
        assert_eq!(purchase.value_name.as_deref(), Some("item_tango"));

        // Out-of-table indices degrade to sentinels.
        let mut stream = RecordedStream::new();
        stream.set_string_table(names());
        stream.push(damage(10, 99, 1)).unwrap();
        let entries =
            extract_range(&stream, 0, 100, &CombatLogFilter::default(), 0).unwrap();
        assert_eq!(entries[0].attacker_name, "unknown_99");
    }

    #[test]
    fn test_type_and_hero_filters() {
        let stream = fixture();

        let filter = CombatLogFilter {
            types: vec![CombatLogType::Purchase],
            ..CombatLogFilter::default()
        };
        let entries = extract_range(&stream, 0, 1000, &filter, 0).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].entry_type, CombatLogType::Purchase.raw());

        let filter = CombatLogFilter {
            heroes_only: true,
            ..CombatLogFilter::default()
        };
        let entries = extract_range(&stream, 0, 1000, &filter, 0).unwrap();
        assert_eq!(entries.len(), 3);
    }

    #[test]
    fn test_name_substring_and_cap() {
        let stream = fixture();

        let filter = CombatLogFilter {
            name_contains: Some("axe".to_string()),
            ..CombatLogFilter::default()
        };
        let entries = extract_range(&stream, 0, 1000, &filter, 0).unwrap();
        assert_eq!(entries.len(), 3);

        let filter = CombatLogFilter {
            max_entries: Some(2),
            ..CombatLogFilter::default()
        };
        let entries = extract_range(&stream, 0, 1000, &filter, 0).unwrap();
        assert_eq!(entries.len(), 2);
    }

    #[test]
    fn test_game_time_anchoring() {
        let stream = fixture();
        let entries =
            extract_range(&stream, 0, 1000, &CombatLogFilter::default(), 300).unwrap();
        // Tick 100 sits 200 ticks before the horn.
        assert!((entries[0].game_time - (-200.0 / 30.0)).abs() < 1e-4);
        assert!((entries[3].game_time - (100.0 / 30.0)).abs() < 1e-4);
    }
}
