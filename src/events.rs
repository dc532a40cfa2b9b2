//! Derived events synthesized from multiple raw message categories.
//!
//! - [`derive_respawn_events`] turns hero deaths into respawn timing,
//!   using the level-indexed respawn table.
//! - [`unify_attacks`] merges attack projectiles (ranged) with
//!   auto-attack combat-log damage (melee) into one tick-ordered stream.
//! - [`inject_hero_levels`] backfills zeroed hero levels in combat log
//!   entries from a forward pass over entity updates.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::combat_log::CombatLogEntry;
use crate::message::{CombatLogType, MessageKind};
use crate::state::World;
use crate::stream::{MessageStream, COMBAT_LOG_NAMES};
use crate::time::TICKS_PER_SECOND;

/// Respawn time in seconds by hero level (levels 1 through 30).
///
/// Non-decreasing; levels past the table clamp to the last entry.
const RESPAWN_SECONDS: [u32; 30] = [
    12, 15, 18, 21, 24, 26, 28, 30, 32, 34, 36, 44, 46, 48, 50, 52, 54, 65, 70, 75, 80, 85, 90,
    95, 100, 100, 100, 100, 100, 100,
];

/// Prefix shared by hero unit names.
const HERO_NAME_PREFIX: &str = "npc_dota_hero_";

/// Respawn duration in seconds for a hero of `level`.
///
/// Level 0 is treated as level 1.
#[must_use]
pub fn respawn_duration(level: u32) -> u32 {
    let idx = level.clamp(1, RESPAWN_SECONDS.len() as u32) as usize - 1;
    RESPAWN_SECONDS[idx]
}

/// A hero death with its computed respawn timing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RespawnEvent {
    /// Hero unit name (`npc_dota_hero_*`).
    pub hero_name: String,
    /// Human-readable hero name (`Troll Warlord`).
    pub hero_display_name: String,
    /// Tick of the death entry.
    pub death_tick: u32,
    /// Hero level used for the respawn lookup.
    pub hero_level: u32,
    /// Respawn duration in seconds.
    pub respawn_duration: u32,
    /// Tick at which the hero respawns.
    pub respawn_tick: u32,
}

/// Derives respawn events from hero-death combat log entries.
///
/// The level comes from the death entry's own recorded target level when
/// positive; otherwise from `level_overrides`, keyed by short hero name
/// (`troll_warlord`); otherwise 1. An override never supersedes a level
/// the recording itself carries.
#[must_use]
pub fn derive_respawn_events<S: MessageStream>(
    stream: &S,
    level_overrides: &HashMap<String, u32>,
) -> Vec<RespawnEvent> {
    let mut events = Vec::new();
    for msg in stream.messages() {
        let MessageKind::CombatLog(raw) = &msg.kind else {
            continue;
        };
        if raw.entry_type != CombatLogType::Death || !raw.is_target_hero || raw.is_target_illusion
        {
            continue;
        }

        let hero_name = stream.resolve_or_sentinel(COMBAT_LOG_NAMES, raw.target_name);
        let short_name = hero_name
            .strip_prefix(HERO_NAME_PREFIX)
            .unwrap_or(&hero_name);
        let hero_level = if raw.target_hero_level > 0 {
            raw.target_hero_level
        } else {
            level_overrides.get(short_name).copied().unwrap_or(1)
        };

        let duration = respawn_duration(hero_level);
        events.push(RespawnEvent {
            hero_display_name: display_name(short_name),
            hero_name,
            death_tick: msg.tick,
            hero_level,
            respawn_duration: duration,
            respawn_tick: msg.tick + duration * TICKS_PER_SECOND as u32,
        });
    }
    events
}

/// Renders a short hero name as a display name: `troll_warlord` becomes
/// `Troll Warlord`.
#[must_use]
pub fn display_name(short_name: &str) -> String {
    short_name
        .split('_')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// One unified attack, ranged or melee.
///
/// Each side populates the fields its source message provides; the rest
/// stay at their zero values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttackEvent {
    /// Simulation tick.
    pub tick: u32,
    /// True for melee (combat-log sourced) attacks.
    pub is_melee: bool,
    /// Resolved attacker name (melee only).
    pub attacker_name: String,
    /// Resolved target name (melee only).
    pub target_name: String,
    /// Damage dealt (melee only).
    pub damage: u32,
    /// Target health after impact (melee only).
    pub target_health: i32,
    /// Attacker team (melee only).
    pub attacker_team: i32,
    /// Target team (melee only).
    pub target_team: i32,
    /// True if the attacker is a hero (melee only).
    pub is_attacker_hero: bool,
    /// True if the attacker is an illusion (melee only).
    pub is_attacker_illusion: bool,
    /// True if the target is a hero (melee only).
    pub is_target_hero: bool,
    /// True if the target is a building (melee only).
    pub is_target_building: bool,
    /// Damage type classification (melee only).
    pub damage_type: i32,
    /// Source entity handle (ranged only).
    pub source_entity: u32,
    /// Target entity handle (ranged only).
    pub target_entity: u32,
    /// Projectile speed, units/second (ranged only).
    pub projectile_speed: i32,
    /// True if the projectile can be disjointed (ranged only).
    pub dodgeable: bool,
    /// Launch tick (ranged only).
    pub launch_tick: u32,
}

/// Merges attack projectiles and auto-attack damage into one stream
/// ordered by tick, ranged before melee at equal ticks.
///
/// Melee attacks are combat-log damage entries with no meaningful
/// inflictor that were not generated by a spell.
#[must_use]
pub fn unify_attacks<S: MessageStream>(stream: &S) -> Vec<AttackEvent> {
    let mut collector = AttackCollector::new(None);
    for msg in stream.messages() {
        collector.observe(stream, msg);
    }
    collector.finish()
}

/// Per-message attack accumulator shared by [`unify_attacks`] and the
/// single-pass aggregator.
pub(crate) struct AttackCollector {
    events: Vec<AttackEvent>,
    cap: Option<usize>,
}

impl AttackCollector {
    pub(crate) fn new(cap: Option<usize>) -> Self {
        AttackCollector {
            events: Vec::new(),
            cap,
        }
    }

    pub(crate) fn observe<S: MessageStream>(&mut self, stream: &S, msg: &crate::message::Message) {
        match &msg.kind {
            MessageKind::Projectile(p) if p.is_attack => {
                self.events.push(AttackEvent {
                    tick: msg.tick,
                    is_melee: false,
                    source_entity: p.source,
                    target_entity: p.target,
                    projectile_speed: p.move_speed,
                    dodgeable: p.dodgeable,
                    launch_tick: if p.launch_tick > 0 {
                        p.launch_tick
                    } else {
                        msg.tick
                    },
                    ..blank_attack()
                });
            }
            MessageKind::CombatLog(raw)
                if raw.entry_type == CombatLogType::Damage
                    && !raw.spell_generated_attack
                    && is_plain_attack_inflictor(stream, raw.inflictor_name) =>
            {
                self.events.push(AttackEvent {
                    tick: msg.tick,
                    is_melee: true,
                    attacker_name: stream
                        .resolve_or_sentinel(COMBAT_LOG_NAMES, raw.attacker_name),
                    target_name: stream.resolve_or_sentinel(COMBAT_LOG_NAMES, raw.target_name),
                    damage: raw.value,
                    target_health: raw.health,
                    attacker_team: raw.attacker_team,
                    target_team: raw.target_team,
                    is_attacker_hero: raw.is_attacker_hero,
                    is_attacker_illusion: raw.is_attacker_illusion,
                    is_target_hero: raw.is_target_hero,
                    is_target_building: raw.is_target_building,
                    damage_type: raw.damage_type,
                    ..blank_attack()
                });
            }
            _ => {}
        }
    }

    pub(crate) fn finish(mut self) -> Vec<AttackEvent> {
        // Stable: preserves per-category stream order. The cap applies
        // after the merge so a capped result is a prefix of the full one.
        self.events.sort_by_key(|e| (e.tick, e.is_melee));
        if let Some(cap) = self.cap {
            self.events.truncate(cap);
        }
        self.events
    }
}

fn blank_attack() -> AttackEvent {
    AttackEvent {
        tick: 0,
        is_melee: false,
        attacker_name: String::new(),
        target_name: String::new(),
        damage: 0,
        target_health: 0,
        attacker_team: 0,
        target_team: 0,
        is_attacker_hero: false,
        is_attacker_illusion: false,
        is_target_hero: false,
        is_target_building: false,
        damage_type: 0,
        source_entity: 0,
        target_entity: 0,
        projectile_speed: 0,
        dodgeable: false,
        launch_tick: 0,
    }
}

/// True when the inflictor index names no real ability or item: a plain
/// auto-attack.
fn is_plain_attack_inflictor<S: MessageStream>(stream: &S, inflictor: u32) -> bool {
    match stream.resolve(COMBAT_LOG_NAMES, inflictor) {
        None => true,
        Some(name) => name.is_empty() || name == "dota_unknown",
    }
}

/// Backfills zeroed hero levels in `entries` from entity updates.
///
/// One forward pass folds entity updates and tracks the level of each
/// hero by unit name; entries whose attacker or target is a hero but
/// whose recorded level is 0 take the tracked level at their tick.
/// Non-hero participants stay at 0. `entries` must be tick-ordered, as
/// range extraction produces them.
pub fn inject_hero_levels<S: MessageStream>(stream: &S, entries: &mut [CombatLogEntry]) {
    let mut world = World::new();
    let mut levels: HashMap<String, u32> = HashMap::new();
    let mut next = 0usize;

    for msg in stream.messages() {
        while next < entries.len() && entries[next].tick < msg.tick {
            backfill(&mut entries[next], &levels);
            next += 1;
        }
        if next >= entries.len() {
            break;
        }
        if let MessageKind::EntityUpdate(update) = &msg.kind {
            world.apply(update);
            if let Some(entity) = world.get(update.entity) {
                if let (Some(name), Some(level)) = (
                    entity.hero_unit_name(),
                    entity.uint(&crate::message::PropertyKey::Level),
                ) {
                    levels.insert(name, level);
                }
            }
        }
    }
    for entry in &mut entries[next..] {
        backfill(entry, &levels);
    }
}

fn backfill(entry: &mut CombatLogEntry, levels: &HashMap<String, u32>) {
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
