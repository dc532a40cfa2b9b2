//! Decoded protocol message model.
//!
//! The engine consumes a tick-ordered stream of already-decoded messages;
//! the binary container and wire-protocol decoding live outside this crate.
//! This module defines the shapes those decoders hand us:
//!
//! - **Combat log entries** with string-table-indexed name fields
//! - **Entity updates** carrying typed property changes
//! - **Attack projectiles** (tracked-entity projectile messages)
//! - **Game events** plus their descriptor list
//! - **Modifier (buff/debuff) table entries**
//! - Demo metadata: file header, file info, server info, chat
//!
//! # Property model
//!
//! Entity updates use a typed [`PropertyKey`] instead of the loosely-typed
//! string-keyed bag the wire format implies. Rare or unclassified
//! properties fall through to [`PropertyKey::Other`], which preserves the
//! raw name without giving up typed access for everything the engine
//! actually folds.

use serde::{Deserialize, Serialize};

/// The invalid entity handle sentinel (no entity referenced).
pub const INVALID_HANDLE: u32 = 16_777_215;

/// Extracts the entity index from an entity handle (lower 14 bits).
#[must_use]
pub fn handle_to_index(handle: u32) -> u32 {
    handle & 0x3FFF
}

/// One decoded message from the recording.
///
/// Ticks are non-decreasing across a stream; `net_tick` is the network
/// tick the server stamped alongside the simulation tick.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    /// Simulation tick at which the message occurred.
    pub tick: u32,
    /// Network tick at which the message occurred.
    pub net_tick: u32,
    /// The decoded payload.
    pub kind: MessageKind,
}

impl Message {
    /// Creates a message at the given tick with `net_tick == tick`.
    ///
    /// Real demos carry distinct net ticks; synthetic streams rarely care.
    #[must_use]
    pub fn at(tick: u32, kind: MessageKind) -> Self {
        Message {
            tick,
            net_tick: tick,
            kind,
        }
    }
}

/// The decoded payload of one message.
#[derive(Debug, Clone, PartialEq)]
pub enum MessageKind {
    /// Demo file header metadata.
    FileHeader(FileHeaderMessage),
    /// Demo file info: match metadata, players, draft.
    FileInfo(FileInfoMessage),
    /// Server info (protocol/build).
    ServerInfo(ServerInfoMessage),
    /// A combat log entry with unresolved name indices.
    CombatLog(CombatLogMessage),
    /// An entity create/update/delete with typed property changes.
    EntityUpdate(EntityUpdateMessage),
    /// A tracked projectile, possibly an attack projectile.
    Projectile(ProjectileMessage),
    /// The game event descriptor list (event id → name and field names).
    GameEventList(Vec<GameEventDescriptor>),
    /// A single game event keyed by descriptor id.
    GameEvent(GameEventMessage),
    /// A modifier (buff/debuff) table entry.
    Modifier(ModifierMessage),
    /// An in-game chat message.
    Chat(String),
}

impl MessageKind {
    /// Returns the wire-protocol type name of this message.
    ///
    /// These are the names the universal message collector reports, matching
    /// the protocol's own message naming.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            MessageKind::FileHeader(_) => "CDemoFileHeader",
            MessageKind::FileInfo(_) => "CDemoFileInfo",
            MessageKind::ServerInfo(_) => "CSVCMsg_ServerInfo",
            MessageKind::CombatLog(_) => "CMsgDOTACombatLogEntry",
            MessageKind::EntityUpdate(_) => "CSVCMsg_PacketEntities",
            MessageKind::Projectile(_) => "CDOTAUserMsg_TE_Projectile",
            MessageKind::GameEventList(_) => "CMsgSource1LegacyGameEventList",
            MessageKind::GameEvent(_) => "CMsgSource1LegacyGameEvent",
            MessageKind::Modifier(_) => "CDOTAModifierBuffTableEntry",
            MessageKind::Chat(_) => "CDOTAUserMsg_ChatMessage",
        }
    }
}

/// Demo file header fields.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FileHeaderMessage {
    /// Map name (e.g. `start`).
    pub map_name: String,
    /// Server name.
    pub server_name: String,
    /// Recording client name.
    pub client_name: String,
    /// Game directory (e.g. `/dota_v7`).
    pub game_directory: String,
    /// Network protocol version.
    pub network_protocol: i32,
    /// Demo file stamp bytes as a string.
    pub demo_file_stamp: String,
    /// Game build number.
    pub build_num: i32,
    /// Game identifier.
    pub game: String,
    /// Server tick at which recording started.
    pub server_start_tick: i32,
}

/// A player record from the demo file info.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PlayerRecord {
    /// Hero name in `npc_dota_hero_*` form.
    pub hero_name: String,
    /// Player display name.
    pub player_name: String,
    /// True for bot/fake clients.
    pub is_fake_client: bool,
    /// Steam id.
    pub steam_id: u64,
    /// Team number (2 = Radiant, 3 = Dire).
    pub game_team: i32,
}

/// A single pick or ban from the draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DraftEvent {
    /// True for a pick, false for a ban.
    pub is_pick: bool,
    /// Team that made the selection.
    pub team: i32,
    /// Hero id selected or banned.
    pub hero_id: i32,
}

/// Demo file info: playback stats plus match metadata.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FileInfoMessage {
    /// Playback length in seconds.
    pub playback_time: f32,
    /// Total playback ticks.
    pub playback_ticks: i32,
    /// Total playback frames.
    pub playback_frames: i32,
    /// Match id.
    pub match_id: u64,
    /// Game mode id.
    pub game_mode: i32,
    /// Winning team (2 = Radiant, 3 = Dire).
    pub game_winner: i32,
    /// League id, 0 outside organized play.
    pub league_id: u32,
    /// Match end time (unix seconds).
    pub end_time: u32,
    /// Radiant team id.
    pub radiant_team_id: u32,
    /// Dire team id.
    pub dire_team_id: u32,
    /// Radiant team tag.
    pub radiant_team_tag: String,
    /// Dire team tag.
    pub dire_team_tag: String,
    /// Per-player records.
    pub players: Vec<PlayerRecord>,
    /// Draft events in order.
    pub picks_bans: Vec<DraftEvent>,
}

/// Server info fields the engine cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ServerInfoMessage {
    /// Server protocol version, reported as the game build.
    pub protocol: i32,
}

/// Combat log entry type codes.
///
/// Discriminants match the protocol's `DOTA_COMBATLOG_TYPES` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CombatLogType {
    /// Physical/magical/pure damage dealt.
    Damage,
    /// Health restored.
    Heal,
    /// A modifier gained.
    ModifierAdd,
    /// A modifier lost.
    ModifierRemove,
    /// A unit died.
    Death,
    /// An ability was cast.
    Ability,
    /// An item was used.
    Item,
    /// A location event.
    Location,
    /// Gold gained or lost.
    Gold,
    /// Game rules state transition; value 5 marks the horn.
    GameState,
    /// Experience gained.
    Xp,
    /// An item was purchased; value indexes the item name.
    Purchase,
    /// A buyback.
    Buyback,
    /// An ability triggered passively.
    AbilityTrigger,
    /// Aggregate player stats.
    PlayerStats,
    /// A multi-kill.
    MultiKill,
    /// A kill streak.
    KillStreak,
    /// A team building kill.
    TeamBuildingKill,
    /// First blood.
    FirstBlood,
    /// A modifier stack count change.
    ModifierStackEvent,
    /// A neutral camp stack.
    NeutralCampStack,
    /// A rune pickup.
    PickupRune,
    /// A hero leveled up.
    HeroLevelUp,
    /// Any type this crate does not classify.
    Other(i32),
}

impl CombatLogType {
    /// Builds a type from the raw protocol value.
    #[must_use]
    pub fn from_raw(value: i32) -> Self {
        match value {
            0 => CombatLogType::Damage,
            1 => CombatLogType::Heal,
            2 => CombatLogType::ModifierAdd,
            3 => CombatLogType::ModifierRemove,
            4 => CombatLogType::Death,
            5 => CombatLogType::Ability,
            6 => CombatLogType::Item,
            7 => CombatLogType::Location,
            8 => CombatLogType::Gold,
            9 => CombatLogType::GameState,
            10 => CombatLogType::Xp,
            11 => CombatLogType::Purchase,
            12 => CombatLogType::Buyback,
            13 => CombatLogType::AbilityTrigger,
            14 => CombatLogType::PlayerStats,
            15 => CombatLogType::MultiKill,
            16 => CombatLogType::KillStreak,
            17 => CombatLogType::TeamBuildingKill,
            18 => CombatLogType::FirstBlood,
            19 => CombatLogType::ModifierStackEvent,
            20 => CombatLogType::NeutralCampStack,
            21 => CombatLogType::PickupRune,
            25 => CombatLogType::HeroLevelUp,
            other => CombatLogType::Other(other),
        }
    }

    /// Returns the raw protocol value.
    #[must_use]
    pub fn raw(self) -> i32 {
        match self {
            CombatLogType::Damage => 0,
            CombatLogType::Heal => 1,
            CombatLogType::ModifierAdd => 2,
            CombatLogType::ModifierRemove => 3,
            CombatLogType::Death => 4,
            CombatLogType::Ability => 5,
            CombatLogType::Item => 6,
            CombatLogType::Location => 7,
            CombatLogType::Gold => 8,
            CombatLogType::GameState => 9,
            CombatLogType::Xp => 10,
            CombatLogType::Purchase => 11,
            CombatLogType::Buyback => 12,
            CombatLogType::AbilityTrigger => 13,
            CombatLogType::PlayerStats => 14,
            CombatLogType::MultiKill => 15,
            CombatLogType::KillStreak => 16,
            CombatLogType::TeamBuildingKill => 17,
            CombatLogType::FirstBlood => 18,
            CombatLogType::ModifierStackEvent => 19,
            CombatLogType::NeutralCampStack => 20,
            CombatLogType::PickupRune => 21,
            CombatLogType::HeroLevelUp => 25,
            CombatLogType::Other(v) => v,
        }
    }

    /// Returns the protocol name of this type.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            CombatLogType::Damage => "DOTA_COMBATLOG_DAMAGE",
            CombatLogType::Heal => "DOTA_COMBATLOG_HEAL",
            CombatLogType::ModifierAdd => "DOTA_COMBATLOG_MODIFIER_ADD",
            CombatLogType::ModifierRemove => "DOTA_COMBATLOG_MODIFIER_REMOVE",
            CombatLogType::Death => "DOTA_COMBATLOG_DEATH",
            CombatLogType::Ability => "DOTA_COMBATLOG_ABILITY",
            CombatLogType::Item => "DOTA_COMBATLOG_ITEM",
            CombatLogType::Location => "DOTA_COMBATLOG_LOCATION",
            CombatLogType::Gold => "DOTA_COMBATLOG_GOLD",
            CombatLogType::GameState => "DOTA_COMBATLOG_GAME_STATE",
            CombatLogType::Xp => "DOTA_COMBATLOG_XP",
            CombatLogType::Purchase => "DOTA_COMBATLOG_PURCHASE",
            CombatLogType::Buyback => "DOTA_COMBATLOG_BUYBACK",
            CombatLogType::AbilityTrigger => "DOTA_COMBATLOG_ABILITY_TRIGGER",
            CombatLogType::PlayerStats => "DOTA_COMBATLOG_PLAYERSTATS",
            CombatLogType::MultiKill => "DOTA_COMBATLOG_MULTIKILL",
            CombatLogType::KillStreak => "DOTA_COMBATLOG_KILLSTREAK",
            CombatLogType::TeamBuildingKill => "DOTA_COMBATLOG_TEAM_BUILDING_KILL",
            CombatLogType::FirstBlood => "DOTA_COMBATLOG_FIRST_BLOOD",
            CombatLogType::ModifierStackEvent => "DOTA_COMBATLOG_MODIFIER_STACK_EVENT",
            CombatLogType::NeutralCampStack => "DOTA_COMBATLOG_NEUTRAL_CAMP_STACK",
            CombatLogType::PickupRune => "DOTA_COMBATLOG_PICKUP_RUNE",
            CombatLogType::HeroLevelUp => "DOTA_COMBATLOG_HERO_LEVELUP",
            CombatLogType::Other(_) => "DOTA_COMBATLOG_UNKNOWN",
        }
    }
}

/// The game-rules state value that marks the horn (game in progress).
pub const GAME_STATE_IN_PROGRESS: u32 = 5;

/// A raw combat log entry with unresolved name indices.
///
/// Name fields index the `CombatLogNames` string table; the range
/// extractor resolves them through the stream's resolver.
#[derive(Debug, Clone, PartialEq)]
pub struct CombatLogMessage {
    /// Entry type.
    pub entry_type: CombatLogType,
    /// Target name index.
    pub target_name: u32,
    /// Target source name index (the owner for illusions/summons).
    pub target_source_name: u32,
    /// Attacker name index.
    pub attacker_name: u32,
    /// Damage source name index.
    pub damage_source_name: u32,
    /// Inflictor (ability/item) name index; 0 for plain attacks.
    pub inflictor_name: u32,
    /// Type-dependent value (damage amount, gold delta, state id,
    /// purchased item name index, ...).
    pub value: u32,
    /// Target health after the event.
    pub health: i32,
    /// Server timestamp in seconds.
    pub timestamp: f32,
    /// Stun duration applied, seconds.
    pub stun_duration: f32,
    /// Slow duration applied, seconds.
    pub slow_duration: f32,
    /// Level of the inflicting ability.
    pub ability_level: u32,
    /// Event world location.
    pub location_x: f32,
    /// Event world location.
    pub location_y: f32,
    /// Attacker team number.
    pub attacker_team: i32,
    /// Target team number.
    pub target_team: i32,
    /// Damage type classification.
    pub damage_type: i32,
    /// Damage category classification.
    pub damage_category: i32,
    /// Modifier stack count.
    pub stack_count: u32,
    /// True if the attacker is an illusion.
    pub is_attacker_illusion: bool,
    /// True if the attacker is a hero.
    pub is_attacker_hero: bool,
    /// True if the target is an illusion.
    pub is_target_illusion: bool,
    /// True if the target is a hero.
    pub is_target_hero: bool,
    /// True if the target is a building.
    pub is_target_building: bool,
    /// True if this damage was generated by a spell rather than an attack.
    pub spell_generated_attack: bool,
    /// Attacker hero level; 0 when the server did not populate it.
    pub attacker_hero_level: u32,
    /// Target hero level; 0 when the server did not populate it.
    pub target_hero_level: u32,
}

impl Default for CombatLogMessage {
    fn default() -> Self {
        CombatLogMessage {
            entry_type: CombatLogType::Damage,
            target_name: 0,
            target_source_name: 0,
            attacker_name: 0,
            damage_source_name: 0,
            inflictor_name: 0,
            value: 0,
            health: 0,
            timestamp: 0.0,
            stun_duration: 0.0,
            slow_duration: 0.0,
            ability_level: 0,
            location_x: 0.0,
            location_y: 0.0,
            attacker_team: 0,
            target_team: 0,
            damage_type: 0,
            damage_category: 0,
            stack_count: 0,
            is_attacker_illusion: false,
            is_attacker_hero: false,
            is_target_illusion: false,
            is_target_hero: false,
            is_target_building: false,
            spell_generated_attack: false,
            attacker_hero_level: 0,
            target_hero_level: 0,
        }
    }
}

/// Whether an entity update creates, mutates, or removes the entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityOp {
    /// The entity entered the world; `class_name` is populated.
    Created,
    /// Properties changed on an existing entity.
    Updated,
    /// The entity left the world.
    Deleted,
}

/// An entity create/update/delete carrying typed property changes.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityUpdateMessage {
    /// Entity index (already stripped of the serial bits).
    pub entity: u32,
    /// The operation.
    pub op: EntityOp,
    /// Entity class name; present on create.
    pub class_name: Option<String>,
    /// Property changes carried by this update.
    pub changes: Vec<PropertyChange>,
}

impl EntityUpdateMessage {
    /// Builds a create for `entity` with the given class and changes.
    #[must_use]
    pub fn created(entity: u32, class_name: &str, changes: Vec<PropertyChange>) -> Self {
        EntityUpdateMessage {
            entity,
            op: EntityOp::Created,
            class_name: Some(class_name.to_string()),
            changes,
        }
    }

    /// Builds an update for `entity` with the given changes.
    #[must_use]
    pub fn updated(entity: u32, changes: Vec<PropertyChange>) -> Self {
        EntityUpdateMessage {
            entity,
            op: EntityOp::Updated,
            class_name: None,
            changes,
        }
    }

    /// Builds a delete for `entity`.
    #[must_use]
    pub fn deleted(entity: u32) -> Self {
        EntityUpdateMessage {
            entity,
            op: EntityOp::Deleted,
            class_name: None,
            changes: Vec::new(),
        }
    }
}

/// One typed property change.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyChange {
    /// Which property changed.
    pub key: PropertyKey,
    /// The new value.
    pub value: PropertyValue,
}

impl PropertyChange {
    /// Convenience constructor.
    #[must_use]
    pub fn new(key: PropertyKey, value: PropertyValue) -> Self {
        PropertyChange { key, value }
    }
}

/// A property value.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    /// Signed integer.
    Int(i32),
    /// Unsigned integer.
    Uint(u32),
    /// Floating point.
    Float(f32),
    /// Boolean.
    Bool(bool),
    /// Entity handle.
    Handle(u32),
    /// String.
    Text(String),
}

/// Typed property keys the engine folds into entity state.
///
/// Per-slot keys carry the slot/player index so a single update can touch
/// any element of the wire format's fixed-size arrays. Properties outside
/// this set fall through to `Other` and are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PropertyKey {
    /// Current health.
    Health,
    /// Maximum health.
    MaxHealth,
    /// Current mana.
    Mana,
    /// Maximum mana.
    MaxMana,
    /// Unit level.
    Level,
    /// Team number.
    Team,
    /// Owning player id.
    PlayerId,
    /// Grid cell X.
    CellX,
    /// Grid cell Y.
    CellY,
    /// Offset within cell, X.
    VecX,
    /// Offset within cell, Y.
    VecY,
    /// Unit name (e.g. `npc_dota_creep_goodguys_melee`).
    UnitName,
    /// Illusion flag.
    IsIllusion,
    /// Replicating-hero handle for clones.
    ReplicatingHero,
    /// Unspent ability points.
    AbilityPoints,
    /// Physical armor.
    Armor,
    /// Magic resistance.
    MagicResistance,
    /// Minimum attack damage.
    DamageMin,
    /// Maximum attack damage.
    DamageMax,
    /// Attack range.
    AttackRange,
    /// Total strength.
    Strength,
    /// Total agility.
    Agility,
    /// Total intellect.
    Intellect,
    /// Ability handle in the given slot (0..24).
    AbilitySlot(u8),
    /// Item handle in the given inventory slot (0..17).
    ItemSlot(u8),
    /// Ability entity: level.
    AbilityLevel,
    /// Ability entity: remaining cooldown end time.
    Cooldown,
    /// Ability entity: full cooldown length.
    CooldownLength,
    /// Ability entity: mana cost.
    ManaCost,
    /// Ability/item entity: current charges.
    Charges,
    /// Ability entity: hidden flag.
    Hidden,
    /// Player resource: selected hero handle for a player slot.
    SelectedHero(u8),
    /// Player resource: selected hero id for a player slot.
    SelectedHeroId(u8),
    /// Player resource: level for a player slot.
    PlayerLevel(u8),
    /// Player resource: kills for a player slot.
    Kills(u8),
    /// Player resource: deaths for a player slot.
    Deaths(u8),
    /// Player resource: assists for a player slot.
    Assists(u8),
    /// Team data: last hits for a team slot.
    LastHits(u8),
    /// Team data: denies for a team slot.
    Denies(u8),
    /// Team data: net worth for a team slot.
    NetWorth(u8),
    /// Team data: reliable gold for a team slot.
    ReliableGold(u8),
    /// Team data: unreliable gold for a team slot.
    UnreliableGold(u8),
    /// Team data: total earned XP for a team slot.
    EarnedXp(u8),
    /// Team data: camps stacked for a team slot.
    CampsStacked(u8),
    /// Team entity: score (kills).
    Score,
    /// Team entity: tower kills.
    TowerKills,
    /// Game rules: the game start time; positive once the horn sounds.
    GameStartTime,
    /// Fallback for unclassified properties, keyed by wire name.
    Other(String),
}

/// A tracked projectile message.
///
/// Only projectiles with `is_attack` participate in attack unification.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ProjectileMessage {
    /// Source entity handle.
    pub source: u32,
    /// Target entity handle.
    pub target: u32,
    /// Projectile move speed, units/second.
    pub move_speed: i32,
    /// True if the projectile can be disjointed.
    pub dodgeable: bool,
    /// True for attack projectiles (vs. spell projectiles).
    pub is_attack: bool,
    /// Tick at which the projectile was launched.
    pub launch_tick: u32,
}

/// Descriptor for one game event type.
#[derive(Debug, Clone, PartialEq)]
pub struct GameEventDescriptor {
    /// Numeric event id.
    pub event_id: i32,
    /// Event name (e.g. `dota_combatlog`).
    pub name: String,
    /// Ordered field names for this event type.
    pub field_names: Vec<String>,
}

/// A single game event, keyed by descriptor id.
#[derive(Debug, Clone, PartialEq)]
pub struct GameEventMessage {
    /// Event id matching a descriptor.
    pub event_id: i32,
    /// Field values in descriptor order.
    pub fields: Vec<GameEventValue>,
}

/// A game event field value.
#[derive(Debug, Clone, PartialEq)]
pub enum GameEventValue {
    /// String value.
    Text(String),
    /// Float value.
    Float(f32),
    /// Integer value (long/short/byte widths collapse here).
    Int(i32),
    /// Boolean value.
    Bool(bool),
    /// 64-bit unsigned value.
    Uint64(u64),
}

/// A modifier (buff/debuff) table entry.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ModifierMessage {
    /// Handle of the unit carrying the modifier.
    pub parent: u32,
    /// Handle of the casting unit.
    pub caster: u32,
    /// Handle of the ability that created the modifier.
    pub ability: u32,
    /// Modifier class id.
    pub modifier_class: i32,
    /// Serial number.
    pub serial_num: i32,
    /// Modifier index.
    pub index: i32,
    /// Creation time, seconds.
    pub creation_time: f32,
    /// Duration in seconds; -1 for permanent.
    pub duration: f32,
    /// Stack count.
    pub stack_count: i32,
    /// True for aura-applied modifiers.
    pub is_aura: bool,
}
