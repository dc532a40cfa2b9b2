//! World-state snapshots at arbitrary ticks.
//!
//! Reconstruction replays entity updates forward from the nearest
//! keyframe, then [`EntitySnapshot::capture`] assembles the replayed
//! [`World`] into the output model: heroes with abilities, talents and
//! inventory, team scores, and (optionally) lane and neutral creeps.
//!
//! Main heroes are resolved through the player-resource entity's
//! selected-hero handles; hero-class entities outside that set are
//! illusions or clones and are skipped unless
//! [`SnapshotOptions::include_illusions`] is set.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::index::DemoIndex;
use crate::message::{MessageKind, PropertyKey, INVALID_HANDLE};
use crate::state::entity::HERO_CLASS_PREFIX;
use crate::state::{Entity, World};
use crate::stream::MessageStream;
use crate::time::tick_to_game_time;

/// Class name of the player-resource entity.
const PLAYER_RESOURCE_CLASS: &str = "CDOTA_PlayerResource";

/// Class name of the per-team score entities.
const TEAM_CLASS: &str = "CDOTATeam";

/// Class name prefix shared by lane, siege and neutral creeps.
const CREEP_CLASS_PREFIX: &str = "CDOTA_BaseNPC_Creep";

/// Highest player slot scanned in the player resource.
const MAX_PLAYER_SLOTS: u8 = 24;

/// Highest ability slot scanned on a hero.
const MAX_ABILITY_SLOTS: u8 = 24;

/// Highest inventory slot: 0-5 main, 6-8 backpack, 9 return-to-base,
/// 10-15 stash, 16 neutral.
const MAX_ITEM_SLOT: u8 = 16;

/// The ability slot that holds the ultimate.
const ULTIMATE_SLOT: u8 = 5;

/// Talent tiers in pair order.
const TALENT_TIERS: [u32; 4] = [10, 15, 20, 25];

/// Name prefix that marks a talent pseudo-ability.
const TALENT_NAME_PREFIX: &str = "special_bonus";

/// Controls what a snapshot includes.
#[derive(Debug, Clone, Copy, Default)]
pub struct SnapshotOptions {
    /// Include illusions and clones, tagged, alongside main heroes.
    pub include_illusions: bool,
    /// Include alive lane/siege/neutral creeps.
    pub include_creeps: bool,
}

/// A full world-state snapshot at one tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntitySnapshot {
    /// Simulation tick of the snapshot.
    pub tick: u32,
    /// Network tick of the last message folded in.
    pub net_tick: u32,
    /// Game-clock seconds; negative before the horn.
    pub game_time: f32,
    /// Heroes, ordered by player id then entity id.
    pub heroes: Vec<HeroSnapshot>,
    /// Team score states, ordered by team id.
    pub teams: Vec<TeamState>,
    /// Alive creeps; empty unless requested.
    pub creeps: Vec<CreepSnapshot>,
}

/// One hero at the snapshot tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeroSnapshot {
    /// Entity index.
    pub entity_id: u32,
    /// Owning player id; -1 when unresolvable (stray illusions).
    pub player_id: i32,
    /// Hero id from the player resource; 0 when unresolved.
    pub hero_id: i32,
    /// Unit name in `npc_dota_hero_*` form.
    pub hero_name: String,
    /// Team number (2 = Radiant, 3 = Dire).
    pub team: i32,
    /// World X.
    pub x: f32,
    /// World Y.
    pub y: f32,
    /// Current health.
    pub health: i32,
    /// Maximum health.
    pub max_health: i32,
    /// Current mana.
    pub mana: f32,
    /// Maximum mana.
    pub max_mana: f32,
    /// Hero level.
    pub level: i32,
    /// True while health is above zero.
    pub is_alive: bool,
    /// Current gold (reliable + unreliable).
    pub gold: i32,
    /// Net worth.
    pub net_worth: i32,
    /// Last hits.
    pub last_hits: i32,
    /// Denies.
    pub denies: i32,
    /// Total earned experience.
    pub xp: i32,
    /// Kills.
    pub kills: i32,
    /// Deaths.
    pub deaths: i32,
    /// Assists.
    pub assists: i32,
    /// Physical armor.
    pub armor: f32,
    /// Magic resistance.
    pub magic_resistance: f32,
    /// Minimum attack damage.
    pub damage_min: i32,
    /// Maximum attack damage.
    pub damage_max: i32,
    /// Attack range.
    pub attack_range: i32,
    /// Total strength.
    pub strength: f32,
    /// Total agility.
    pub agility: f32,
    /// Total intellect.
    pub intellect: f32,
    /// Unspent ability points.
    pub ability_points: i32,
    /// Abilities by slot, talents excluded.
    pub abilities: Vec<Ability>,
    /// Chosen talents, at most one per tier.
    pub talents: Vec<Talent>,
    /// Occupied inventory slots.
    pub inventory: Vec<InventoryItem>,
    /// True for a non-main real hero entity (e.g. Meepo clones).
    pub is_clone: bool,
    /// True for illusions.
    pub is_illusion: bool,
}

/// One leveled ability slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ability {
    /// Slot index on the hero.
    pub slot: u8,
    /// Ability name.
    pub name: String,
    /// Current level, 0 when unlearned.
    pub level: u32,
    /// Cooldown end time, seconds; 0 when ready.
    pub cooldown: f32,
    /// Full cooldown length, seconds.
    pub max_cooldown: f32,
    /// Mana cost.
    pub mana_cost: u32,
    /// Charges remaining.
    pub charges: u32,
    /// True for the ultimate slot.
    pub is_ultimate: bool,
    /// True once the ability cannot be leveled further.
    pub is_maxed: bool,
}

/// Whether an ability slot can take no further levels.
///
/// Ultimates max at level 3, regular abilities at level 4.
#[must_use]
pub fn ability_is_maxed(level: u32, is_ultimate: bool) -> bool {
    if is_ultimate {
        level >= 3
    } else {
        level >= 4
    }
}

/// Which half of a talent pair a talent occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TalentSide {
    /// First of the pair.
    Left,
    /// Second of the pair.
    Right,
}

/// A chosen talent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Talent {
    /// Level tier: 10, 15, 20 or 25.
    pub tier: u32,
    /// Ability slot the talent occupies.
    pub slot: u8,
    /// Left or right side of the pair.
    pub side: TalentSide,
    /// Talent name (`special_bonus_*`).
    pub name: String,
}

/// An occupied inventory slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryItem {
    /// Inventory slot.
    pub slot: u8,
    /// Item name.
    pub name: String,
    /// Charges remaining.
    pub charges: u32,
}

/// A team's score state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamState {
    /// Team number (2 = Radiant, 3 = Dire).
    pub team_id: i32,
    /// Team kill score.
    pub score: i32,
    /// Towers destroyed by this team.
    pub tower_kills: i32,
}

/// One alive creep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreepSnapshot {
    /// Entity index.
    pub entity_id: u32,
    /// Entity class name.
    pub class_name: String,
    /// Unit name (e.g. `npc_dota_creep_goodguys_melee`).
    pub unit_name: String,
    /// Team number.
    pub team: i32,
    /// World X.
    pub x: f32,
    /// World Y.
    pub y: f32,
    /// Current health.
    pub health: i32,
    /// Maximum health.
    pub max_health: i32,
    /// True for lane and siege creeps.
    pub is_lane: bool,
    /// True for neutral camp creeps.
    pub is_neutral: bool,
}

/// Replays the stream into a [`World`] at `target`, starting from the
/// governing keyframe.
///
/// Returns the world plus the net tick of the last message folded in.
///
/// # Errors
///
/// Propagates keyframe-location failures ([`crate::error::TimelineError::TickOutOfRange`],
/// [`crate::error::TimelineError::EmptyIndex`]).
pub fn reconstruct_at<S: MessageStream>(
    stream: &S,
    index: &DemoIndex,
    target: u32,
) -> Result<(World, u32)> {
    let seek = index.find_keyframe(target)?;
    let mut world = seek.keyframe.world.clone();
    let mut net_tick = seek.keyframe.net_tick;

    for msg in &stream.messages()[seek.keyframe.cursor..] {
        if msg.tick > target {
            break;
        }
        net_tick = msg.net_tick;
        if let MessageKind::EntityUpdate(update) = &msg.kind {
            world.apply(update);
        }
    }
    Ok((world, net_tick))
}

/// Reconstructs and assembles a snapshot at `target` in one call.
///
/// # Errors
///
/// As [`reconstruct_at`].
pub fn snapshot_at<S: MessageStream>(
    stream: &S,
    index: &DemoIndex,
    target: u32,
    options: SnapshotOptions,
) -> Result<EntitySnapshot> {
    let (world, net_tick) = reconstruct_at(stream, index, target)?;
    let game_time = tick_to_game_time(target, index.match_start_tick().unwrap_or(0));
    Ok(EntitySnapshot::capture(
        &world, target, net_tick, game_time, options,
    ))
}

impl EntitySnapshot {
    /// Assembles a snapshot from an already-reconstructed world.
    #[must_use]
    pub fn capture(
        world: &World,
        tick: u32,
        net_tick: u32,
        game_time: f32,
        options: SnapshotOptions,
    ) -> Self {
        let roster = Roster::from_world(world);

        let mut heroes: Vec<HeroSnapshot> = world
            .of_class(HERO_CLASS_PREFIX)
            .filter_map(|entity| build_hero(world, &roster, entity, options))
            .collect();
        heroes.sort_by_key(|h| (h.player_id, h.entity_id));

        let mut teams: Vec<TeamState> = world
            .of_class(TEAM_CLASS)
            .filter_map(|entity| {
                let team_id = entity.int(&PropertyKey::Team)?;
                (team_id == 2 || team_id == 3).then(|| TeamState {
                    team_id,
                    score: entity.int(&PropertyKey::Score).unwrap_or(0),
                    tower_kills: entity.int(&PropertyKey::TowerKills).unwrap_or(0),
                })
            })
            .collect();
        teams.sort_by_key(|t| t.team_id);

        let mut creeps: Vec<CreepSnapshot> = if options.include_creeps {
            world
                .of_class(CREEP_CLASS_PREFIX)
                .filter_map(build_creep)
                .collect()
        } else {
            Vec::new()
        };
        creeps.sort_by_key(|c| c.entity_id);

        EntitySnapshot {
            tick,
            net_tick,
            game_time,
            heroes,
            teams,
            creeps,
        }
    }
}

/// The player roster resolved from the player-resource entity:
/// selected-hero entity index → (player id, hero id).
struct Roster {
    players: Vec<(u32, i32, i32)>,
}

impl Roster {
    fn from_world(world: &World) -> Self {
        let mut players = Vec::new();
        if let Some(resource) = world.first_of_class(PLAYER_RESOURCE_CLASS) {
            for slot in 0..MAX_PLAYER_SLOTS {
                let Some(handle) = resource.handle(&PropertyKey::SelectedHero(slot)) else {
                    continue;
                };
                if handle == INVALID_HANDLE {
                    continue;
                }
                let hero_id = resource
                    .int(&PropertyKey::SelectedHeroId(slot))
                    .unwrap_or(0);
                players.push((
                    crate::message::handle_to_index(handle),
                    i32::from(slot),
                    hero_id,
                ));
            }
        }
        Roster { players }
    }

    /// Returns (player id, hero id) when `entity_index` is a main hero.
    fn main_hero(&self, entity_index: u32) -> Option<(i32, i32)> {
        self.players
            .iter()
            .find(|(idx, _, _)| *idx == entity_index)
            .map(|(_, player, hero)| (*player, *hero))
    }
}

fn build_hero(
    world: &World,
    roster: &Roster,
    entity: &Entity,
    options: SnapshotOptions,
) -> Option<HeroSnapshot> {
    let main = roster.main_hero(entity.index());
    let is_illusion = entity.boolean(&PropertyKey::IsIllusion).unwrap_or(false)
        || entity
            .handle(&PropertyKey::ReplicatingHero)
            .is_some_and(|h| h != INVALID_HANDLE);
    let is_clone = main.is_none() && !is_illusion;

    if main.is_none() && !options.include_illusions {
        return None;
    }

    let (player_id, hero_id) = main.unwrap_or_else(|| {
        (
            entity.int(&PropertyKey::PlayerId).unwrap_or(-1),
            0,
        )
    });
    let team = entity.int(&PropertyKey::Team).unwrap_or(0);
    let (x, y) = entity.position().unwrap_or((0.0, 0.0));
    let health = entity.int(&PropertyKey::Health).unwrap_or(0);

    let economy = Economy::resolve(world, team, player_id);
    let (abilities, talents) = build_abilities(world, entity);
    let inventory = build_inventory(world, entity);

    Some(HeroSnapshot {
        entity_id: entity.index(),
        player_id,
        hero_id,
        hero_name: entity
            .hero_unit_name()
            .unwrap_or_else(|| format!("unknown_{}", entity.index())),
        team,
        x,
        y,
        health,
        max_health: entity.int(&PropertyKey::MaxHealth).unwrap_or(0),
        mana: entity.float(&PropertyKey::Mana).unwrap_or(0.0),
        max_mana: entity.float(&PropertyKey::MaxMana).unwrap_or(0.0),
        level: entity.int(&PropertyKey::Level).unwrap_or(0),
        is_alive: health > 0,
        gold: economy.gold,
        net_worth: economy.net_worth,
        last_hits: economy.last_hits,
        denies: economy.denies,
        xp: economy.xp,
        kills: economy.kills,
        deaths: economy.deaths,
        assists: economy.assists,
        armor: entity.float(&PropertyKey::Armor).unwrap_or(0.0),
        magic_resistance: entity.float(&PropertyKey::MagicResistance).unwrap_or(0.0),
        damage_min: entity.int(&PropertyKey::DamageMin).unwrap_or(0),
        damage_max: entity.int(&PropertyKey::DamageMax).unwrap_or(0),
        attack_range: entity.int(&PropertyKey::AttackRange).unwrap_or(0),
        strength: entity.float(&PropertyKey::Strength).unwrap_or(0.0),
        agility: entity.float(&PropertyKey::Agility).unwrap_or(0.0),
        intellect: entity.float(&PropertyKey::Intellect).unwrap_or(0.0),
        ability_points: entity.int(&PropertyKey::AbilityPoints).unwrap_or(0),
        abilities,
        talents,
        inventory,
        is_clone,
        is_illusion,
    })
}

/// Per-player economy joined from the player-resource and per-team data
/// entities. Player-resource stats are keyed by global player slot; team
/// data is keyed by the slot within the team.
struct Economy {
    gold: i32,
    net_worth: i32,
    last_hits: i32,
    denies: i32,
    xp: i32,
    kills: i32,
    deaths: i32,
    assists: i32,
}

impl Economy {
    fn resolve(world: &World, team: i32, player_id: i32) -> Self {
        let mut economy = Economy {
            gold: 0,
            net_worth: 0,
            last_hits: 0,
            denies: 0,
            xp: 0,
            kills: 0,
            deaths: 0,
            assists: 0,
        };
        let Ok(player_slot) = u8::try_from(player_id) else {
            return economy;
        };

        if let Some(resource) = world.first_of_class(PLAYER_RESOURCE_CLASS) {
            economy.kills = resource.int(&PropertyKey::Kills(player_slot)).unwrap_or(0);
            economy.deaths = resource.int(&PropertyKey::Deaths(player_slot)).unwrap_or(0);
            economy.assists = resource
                .int(&PropertyKey::Assists(player_slot))
                .unwrap_or(0);
        }

        let data_class = match team {
            2 => "CDOTA_DataRadiant",
            3 => "CDOTA_DataDire",
            _ => return economy,
        };
        let team_slot = player_slot % 5;
        if let Some(data) = world.first_of_class(data_class) {
            let reliable = data
                .int(&PropertyKey::ReliableGold(team_slot))
                .unwrap_or(0);
            let unreliable = data
                .int(&PropertyKey::UnreliableGold(team_slot))
                .unwrap_or(0);
            economy.gold = reliable + unreliable;
            economy.net_worth = data.int(&PropertyKey::NetWorth(team_slot)).unwrap_or(0);
            economy.last_hits = data.int(&PropertyKey::LastHits(team_slot)).unwrap_or(0);
            economy.denies = data.int(&PropertyKey::Denies(team_slot)).unwrap_or(0);
            economy.xp = data.int(&PropertyKey::EarnedXp(team_slot)).unwrap_or(0);
        }
        economy
    }
}

/// Resolves ability slots into abilities and talents.
///
/// Talent pseudo-abilities (the `special_bonus` marker) are pulled out of
/// the ability list, paired in slot order, and mapped to tiers 10/15/20/25
/// with the first of each pair on the left. Only chosen talents (level
/// above zero) are reported; at most one per tier.
fn build_abilities(world: &World, hero: &Entity) -> (Vec<Ability>, Vec<Talent>) {
    let mut abilities = Vec::new();
    let mut talent_slots: Vec<(u8, String, u32)> = Vec::new();

    for slot in 0..MAX_ABILITY_SLOTS {
        let Some(handle) = hero.handle(&PropertyKey::AbilitySlot(slot)) else {
            continue;
        };
        if handle == INVALID_HANDLE {
            continue;
        }
        let Some(ability) = world.by_handle(handle) else {
            continue;
        };
        let name = ability
            .text(&PropertyKey::UnitName)
            .map_or_else(|| format!("unknown_{}", ability.index()), str::to_string);
        let level = ability.uint(&PropertyKey::AbilityLevel).unwrap_or(0);

        if name.starts_with(TALENT_NAME_PREFIX) {
            talent_slots.push((slot, name, level));
            continue;
        }

        let is_ultimate = slot == ULTIMATE_SLOT;
        abilities.push(Ability {
            slot,
            name,
            level,
            cooldown: ability.float(&PropertyKey::Cooldown).unwrap_or(0.0),
            max_cooldown: ability.float(&PropertyKey::CooldownLength).unwrap_or(0.0),
            mana_cost: ability.uint(&PropertyKey::ManaCost).unwrap_or(0),
            charges: ability.uint(&PropertyKey::Charges).unwrap_or(0),
            is_ultimate,
            is_maxed: ability_is_maxed(level, is_ultimate),
        });
    }

    // Pair by slot offset from the first talent slot, not by list
    // position: an unresolvable handle then leaves a gap instead of
    // shifting every later talent into the wrong tier.
    let mut talents = Vec::new();
    if let Some(base) = talent_slots.first().map(|(slot, _, _)| *slot) {
        let mut tier_taken = [false; TALENT_TIERS.len()];
        for (slot, name, level) in &talent_slots {
            if *level == 0 {
                continue;
            }
            let offset = usize::from(slot - base);
            let pair = (offset / 2).min(TALENT_TIERS.len() - 1);
            if tier_taken[pair] {
                continue;
            }
            tier_taken[pair] = true;
            talents.push(Talent {
                tier: TALENT_TIERS[pair],
                slot: *slot,
                side: if offset % 2 == 0 {
                    TalentSide::Left
                } else {
                    TalentSide::Right
                },
                name: name.clone(),
            });
        }
    }

    (abilities, talents)
}

fn build_inventory(world: &World, hero: &Entity) -> Vec<InventoryItem> {
    let mut items = Vec::new();
    for slot in 0..=MAX_ITEM_SLOT {
        let Some(handle) = hero.handle(&PropertyKey::ItemSlot(slot)) else {
            continue;
        };
        if handle == INVALID_HANDLE {
            continue;
        }
        let Some(item) = world.by_handle(handle) else {
            continue;
        };
        items.push(InventoryItem {
            slot,
            name: item
                .text(&PropertyKey::UnitName)
                .map_or_else(|| format!("unknown_{}", item.index()), str::to_string),
            charges: item.uint(&PropertyKey::Charges).unwrap_or(0),
        });
    }
    items
}

fn build_creep(entity: &Entity) -> Option<CreepSnapshot> {
    let health = entity.int(&PropertyKey::Health).unwrap_or(0);
    if health <= 0 {
        return None;
    }
    let class_name = entity.class_name().to_string();
    let is_neutral = class_name.contains("Neutral");
    let (x, y) = entity.position().unwrap_or((0.0, 0.0));
    Some(CreepSnapshot {
        entity_id: entity.index(),
        unit_name: entity
            .text(&PropertyKey::UnitName)
            .unwrap_or_default()
            .to_string(),
        team: entity.int(&PropertyKey::Team).unwrap_or(0),
        x,
        y,
        health,
        max_health: entity.int(&PropertyKey::MaxHealth).unwrap_or(0),
        is_lane: !is_neutral,
        is_neutral,
        class_name,
    })
}
