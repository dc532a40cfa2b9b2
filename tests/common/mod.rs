//! Shared synthetic match fixture for the integration suites.
//!
//! Builds a small but complete recording: two heroes (Axe, radiant melee;
//! Lina, dire ranged) plus an illusion, the player-resource and team data
//! entities, abilities, talents, inventory, a lane creep, the horn, combat
//! log traffic, an attack projectile, modifiers, a game event, and demo
//! metadata. Ticks span 0..=3900 so the default keyframe interval yields
//! three keyframes.

#![allow(dead_code)]

use demo_timeline::message::{
    CombatLogMessage, CombatLogType, EntityUpdateMessage, FileHeaderMessage, FileInfoMessage,
    GameEventDescriptor, GameEventMessage, GameEventValue, Message, MessageKind, ModifierMessage,
    PlayerRecord, ProjectileMessage, PropertyChange, PropertyKey, PropertyValue,
    ServerInfoMessage, GAME_STATE_IN_PROGRESS,
};
use demo_timeline::stream::{RecordedStream, StringTable, COMBAT_LOG_NAMES};

/// Axe's entity index (radiant, player 0).
pub const AXE_ENTITY: u32 = 101;
/// Lina's entity index (dire, player 5).
pub const LINA_ENTITY: u32 = 102;
/// Lina's illusion entity index.
pub const ILLUSION_ENTITY: u32 = 103;
/// The lane creep's entity index.
pub const CREEP_ENTITY: u32 = 400;
/// Tick of the horn.
pub const HORN_TICK: u32 = 900;
/// Tick of Axe's death entry.
pub const DEATH_TICK: u32 = 1300;
/// Last tick in the fixture.
pub const LAST_TICK: u32 = 3900;

/// Name-table indices.
pub const NAME_UNKNOWN: u32 = 0;
pub const NAME_AXE: u32 = 1;
pub const NAME_LINA: u32 = 2;
pub const NAME_LAGUNA: u32 = 3;
pub const NAME_TANGO: u32 = 4;

fn prop(key: PropertyKey, value: PropertyValue) -> PropertyChange {
    PropertyChange::new(key, value)
}

fn combat_log_names() -> StringTable {
    StringTable::new(
        COMBAT_LOG_NAMES,
        vec![
            "dota_unknown".to_string(),
            "npc_dota_hero_axe".to_string(),
            "npc_dota_hero_lina".to_string(),
            "lina_laguna_blade".to_string(),
            "item_tango".to_string(),
            "npc_dota_creep_goodguys_melee".to_string(),
        ],
    )
}

fn hero_create(
    entity: u32,
    class: &str,
    team: i32,
    player_id: i32,
    cell: u32,
) -> EntityUpdateMessage {
    EntityUpdateMessage::created(
        entity,
        class,
        vec![
            prop(PropertyKey::Team, PropertyValue::Int(team)),
            prop(PropertyKey::PlayerId, PropertyValue::Int(player_id)),
            prop(PropertyKey::Level, PropertyValue::Int(1)),
            prop(PropertyKey::Health, PropertyValue::Int(640)),
            prop(PropertyKey::MaxHealth, PropertyValue::Int(640)),
            prop(PropertyKey::Mana, PropertyValue::Float(290.0)),
            prop(PropertyKey::MaxMana, PropertyValue::Float(290.0)),
            prop(PropertyKey::CellX, PropertyValue::Uint(cell)),
            prop(PropertyKey::CellY, PropertyValue::Uint(cell)),
            prop(PropertyKey::VecX, PropertyValue::Float(0.0)),
            prop(PropertyKey::VecY, PropertyValue::Float(0.0)),
            prop(PropertyKey::Armor, PropertyValue::Float(3.5)),
            prop(PropertyKey::MagicResistance, PropertyValue::Float(25.0)),
            prop(PropertyKey::DamageMin, PropertyValue::Int(50)),
            prop(PropertyKey::DamageMax, PropertyValue::Int(54)),
            prop(PropertyKey::AttackRange, PropertyValue::Int(150)),
            prop(PropertyKey::Strength, PropertyValue::Float(25.0)),
            prop(PropertyKey::Agility, PropertyValue::Float(20.0)),
            prop(PropertyKey::Intellect, PropertyValue::Float(18.0)),
            prop(PropertyKey::AbilityPoints, PropertyValue::Int(1)),
        ],
    )
}

fn ability_create(entity: u32, name: &str, level: u32) -> EntityUpdateMessage {
    EntityUpdateMessage::created(
        entity,
        "CDOTABaseAbility",
        vec![
            prop(
                PropertyKey::UnitName,
                PropertyValue::Text(name.to_string()),
            ),
            prop(PropertyKey::AbilityLevel, PropertyValue::Uint(level)),
            prop(PropertyKey::ManaCost, PropertyValue::Uint(80)),
            prop(PropertyKey::CooldownLength, PropertyValue::Float(16.0)),
        ],
    )
}

/// Builds the full fixture stream.
#[must_use]
#[allow(clippy::too_many_lines)]
pub fn build_match_stream() -> RecordedStream {
    let mut stream = RecordedStream::new();
    stream.set_string_table(combat_log_names());

    let mut push = |tick: u32, kind: MessageKind| {
        stream
            .push(Message::at(tick, kind))
            .expect("fixture ticks are ordered");
    };

    push(
        0,
        MessageKind::FileHeader(FileHeaderMessage {
            map_name: "start".to_string(),
            server_name: "Valve Dota 2 Server".to_string(),
            client_name: "SourceTV Demo".to_string(),
            game_directory: "/dota".to_string(),
            network_protocol: 47,
            demo_file_stamp: "PBDEMS2".to_string(),
            build_num: 7500,
            game: "dota".to_string(),
            server_start_tick: 0,
        }),
    );
    push(0, MessageKind::ServerInfo(ServerInfoMessage { protocol: 7500 }));
    push(
        0,
        MessageKind::GameEventList(vec![GameEventDescriptor {
            event_id: 53,
            name: "dota_chase_hero".to_string(),
            field_names: vec!["target1".to_string(), "type".to_string()],
        }]),
    );

    // Bookkeeping entities.
    push(
        0,
        MessageKind::EntityUpdate(EntityUpdateMessage::created(
            50,
            "CDOTA_PlayerResource",
            vec![
                prop(PropertyKey::SelectedHero(0), PropertyValue::Handle(AXE_ENTITY)),
                prop(PropertyKey::SelectedHeroId(0), PropertyValue::Int(2)),
                prop(PropertyKey::Kills(0), PropertyValue::Int(0)),
                prop(PropertyKey::Deaths(0), PropertyValue::Int(0)),
                prop(PropertyKey::Assists(0), PropertyValue::Int(0)),
                prop(PropertyKey::SelectedHero(5), PropertyValue::Handle(LINA_ENTITY)),
                prop(PropertyKey::SelectedHeroId(5), PropertyValue::Int(25)),
                prop(PropertyKey::Kills(5), PropertyValue::Int(0)),
                prop(PropertyKey::Deaths(5), PropertyValue::Int(0)),
                prop(PropertyKey::Assists(5), PropertyValue::Int(0)),
            ],
        )),
    );
    push(
        0,
        MessageKind::EntityUpdate(EntityUpdateMessage::created(
            60,
            "CDOTA_DataRadiant",
            vec![
                prop(PropertyKey::ReliableGold(0), PropertyValue::Int(100)),
                prop(PropertyKey::UnreliableGold(0), PropertyValue::Int(500)),
                prop(PropertyKey::NetWorth(0), PropertyValue::Int(600)),
                prop(PropertyKey::LastHits(0), PropertyValue::Int(0)),
                prop(PropertyKey::Denies(0), PropertyValue::Int(0)),
                prop(PropertyKey::EarnedXp(0), PropertyValue::Int(0)),
            ],
        )),
    );
    push(
        0,
        MessageKind::EntityUpdate(EntityUpdateMessage::created(
            61,
            "CDOTA_DataDire",
            vec![
                prop(PropertyKey::ReliableGold(0), PropertyValue::Int(0)),
                prop(PropertyKey::UnreliableGold(0), PropertyValue::Int(600)),
                prop(PropertyKey::NetWorth(0), PropertyValue::Int(600)),
            ],
        )),
    );
    push(
        0,
        MessageKind::EntityUpdate(EntityUpdateMessage::created(
            70,
            "CDOTATeam",
            vec![
                prop(PropertyKey::Team, PropertyValue::Int(2)),
                prop(PropertyKey::Score, PropertyValue::Int(0)),
                prop(PropertyKey::TowerKills, PropertyValue::Int(0)),
            ],
        )),
    );
    push(
        0,
        MessageKind::EntityUpdate(EntityUpdateMessage::created(
            71,
            "CDOTATeam",
            vec![
                prop(PropertyKey::Team, PropertyValue::Int(3)),
                prop(PropertyKey::Score, PropertyValue::Int(0)),
                prop(PropertyKey::TowerKills, PropertyValue::Int(0)),
            ],
        )),
    );
    push(
        0,
        MessageKind::EntityUpdate(EntityUpdateMessage::created(
            90,
            "CDOTAGamerulesProxy",
            vec![prop(PropertyKey::GameStartTime, PropertyValue::Float(0.0))],
        )),
    );

    // Heroes.
    let mut axe = hero_create(AXE_ENTITY, "CDOTA_Unit_Hero_Axe", 2, 0, 70);
    axe.changes.extend([
        prop(PropertyKey::AbilitySlot(0), PropertyValue::Handle(201)),
        prop(PropertyKey::AbilitySlot(5), PropertyValue::Handle(202)),
        prop(PropertyKey::AbilitySlot(10), PropertyValue::Handle(210)),
        prop(PropertyKey::AbilitySlot(11), PropertyValue::Handle(211)),
        prop(PropertyKey::AbilitySlot(12), PropertyValue::Handle(212)),
        prop(PropertyKey::AbilitySlot(13), PropertyValue::Handle(213)),
        prop(PropertyKey::ItemSlot(0), PropertyValue::Handle(301)),
    ]);
    push(0, MessageKind::EntityUpdate(axe));
    push(
        0,
        MessageKind::EntityUpdate(hero_create(
            LINA_ENTITY,
            "CDOTA_Unit_Hero_Lina",
            3,
            5,
            200,
        )),
    );

    // Axe's abilities, talents and tango.
    push(0, MessageKind::EntityUpdate(ability_create(201, "axe_berserkers_call", 1)));
    push(0, MessageKind::EntityUpdate(ability_create(202, "axe_culling_blade", 0)));
    push(0, MessageKind::EntityUpdate(ability_create(210, "special_bonus_hp_200", 1)));
    push(0, MessageKind::EntityUpdate(ability_create(211, "special_bonus_mp_regen_2", 0)));
    push(0, MessageKind::EntityUpdate(ability_create(212, "special_bonus_attack_damage_30", 0)));
    push(0, MessageKind::EntityUpdate(ability_create(213, "special_bonus_hp_400", 0)));
    push(
        0,
        MessageKind::EntityUpdate(EntityUpdateMessage::created(
            301,
            "CDOTA_Item",
            vec![
                prop(
                    PropertyKey::UnitName,
                    PropertyValue::Text("item_tango".to_string()),
                ),
                prop(PropertyKey::Charges, PropertyValue::Uint(3)),
            ],
        )),
    );

    // An illusion of Lina shows up pre-horn.
    push(
        600,
        MessageKind::EntityUpdate(EntityUpdateMessage::created(
            ILLUSION_ENTITY,
            "CDOTA_Unit_Hero_Lina",
            vec![
                prop(PropertyKey::Team, PropertyValue::Int(3)),
                prop(PropertyKey::IsIllusion, PropertyValue::Bool(true)),
                prop(PropertyKey::ReplicatingHero, PropertyValue::Handle(LINA_ENTITY)),
                prop(PropertyKey::Health, PropertyValue::Int(320)),
                prop(PropertyKey::MaxHealth, PropertyValue::Int(640)),
                prop(PropertyKey::Level, PropertyValue::Int(1)),
            ],
        )),
    );

    // The horn.
    push(
        HORN_TICK,
        MessageKind::CombatLog(CombatLogMessage {
            entry_type: CombatLogType::GameState,
            value: GAME_STATE_IN_PROGRESS,
            ..CombatLogMessage::default()
        }),
    );

    // Levels move before the fighting starts.
    push(
        950,
        MessageKind::EntityUpdate(EntityUpdateMessage::updated(
            AXE_ENTITY,
            vec![prop(PropertyKey::Level, PropertyValue::Int(2))],
        )),
    );
    push(
        950,
        MessageKind::EntityUpdate(EntityUpdateMessage::updated(
            LINA_ENTITY,
            vec![prop(PropertyKey::Level, PropertyValue::Int(3))],
        )),
    );

    // Axe lands an auto attack; the recording omitted the hero levels.
    push(
        1000,
        MessageKind::CombatLog(CombatLogMessage {
            entry_type: CombatLogType::Damage,
            attacker_name: NAME_AXE,
            target_name: NAME_LINA,
            inflictor_name: NAME_UNKNOWN,
            value: 55,
            health: 500,
            attacker_team: 2,
            target_team: 3,
            is_attacker_hero: true,
            is_target_hero: true,
            ..CombatLogMessage::default()
        }),
    );

    // Lina answers with an attack projectile.
    push(
        1100,
        MessageKind::Projectile(ProjectileMessage {
            source: LINA_ENTITY,
            target: AXE_ENTITY,
            move_speed: 900,
            dodgeable: true,
            is_attack: true,
            launch_tick: 1100,
        }),
    );

    // Spell damage: carries a real inflictor, so it is not an attack.
    push(
        1200,
        MessageKind::CombatLog(CombatLogMessage {
            entry_type: CombatLogType::Damage,
            attacker_name: NAME_LINA,
            target_name: NAME_AXE,
            inflictor_name: NAME_LAGUNA,
            value: 300,
            health: 240,
            attacker_team: 3,
            target_team: 2,
            is_attacker_hero: true,
            is_target_hero: true,
            ..CombatLogMessage::default()
        }),
    );

    push(
        1250,
        MessageKind::CombatLog(CombatLogMessage {
            entry_type: CombatLogType::Purchase,
            target_name: NAME_AXE,
            value: NAME_TANGO,
            ..CombatLogMessage::default()
        }),
    );

    // Axe dies; again the entry carries no level.
    push(
        DEATH_TICK,
        MessageKind::CombatLog(CombatLogMessage {
            entry_type: CombatLogType::Death,
            attacker_name: NAME_LINA,
            target_name: NAME_AXE,
            is_attacker_hero: true,
            is_target_hero: true,
            ..CombatLogMessage::default()
        }),
    );

    // Mid-game bookkeeping.
    push(
        2000,
        MessageKind::EntityUpdate(EntityUpdateMessage::updated(
            60,
            vec![
                prop(PropertyKey::NetWorth(0), PropertyValue::Int(1500)),
                prop(PropertyKey::LastHits(0), PropertyValue::Int(20)),
            ],
        )),
    );
    push(
        2000,
        MessageKind::EntityUpdate(EntityUpdateMessage::updated(
            71,
            vec![prop(PropertyKey::Score, PropertyValue::Int(1))],
        )),
    );
    push(
        2000,
        MessageKind::Modifier(ModifierMessage {
            parent: AXE_ENTITY,
            caster: LINA_ENTITY,
            ability: 0,
            modifier_class: 12,
            serial_num: 1,
            index: 0,
            creation_time: 36.6,
            duration: 8.0,
            stack_count: 2,
            is_aura: false,
        }),
    );
    push(
        2005,
        MessageKind::Modifier(ModifierMessage {
            parent: LINA_ENTITY,
            caster: LINA_ENTITY,
            ability: 0,
            modifier_class: 40,
            serial_num: 2,
            index: 1,
            creation_time: 36.8,
            duration: -1.0,
            stack_count: 0,
            is_aura: true,
        }),
    );

    push(
        2800,
        MessageKind::GameEvent(GameEventMessage {
            event_id: 53,
            fields: vec![GameEventValue::Int(101), GameEventValue::Int(1)],
        }),
    );

    // A lane creep appears.
    push(
        3000,
        MessageKind::EntityUpdate(EntityUpdateMessage::created(
            CREEP_ENTITY,
            "CDOTA_BaseNPC_Creep_Lane",
            vec![
                prop(
                    PropertyKey::UnitName,
                    PropertyValue::Text("npc_dota_creep_goodguys_melee".to_string()),
                ),
                prop(PropertyKey::Team, PropertyValue::Int(2)),
                prop(PropertyKey::Health, PropertyValue::Int(550)),
                prop(PropertyKey::MaxHealth, PropertyValue::Int(550)),
                prop(PropertyKey::CellX, PropertyValue::Uint(128)),
                prop(PropertyKey::CellY, PropertyValue::Uint(128)),
                prop(PropertyKey::VecX, PropertyValue::Float(0.0)),
                prop(PropertyKey::VecY, PropertyValue::Float(0.0)),
            ],
        )),
    );

    push(LAST_TICK, MessageKind::Chat("gg".to_string()));
    push(
        LAST_TICK,
        MessageKind::FileInfo(FileInfoMessage {
            playback_time: 130.0,
            playback_ticks: LAST_TICK as i32,
            playback_frames: 1950,
            match_id: 7_654_321,
            game_mode: 22,
            game_winner: 3,
            players: vec![
                PlayerRecord {
                    hero_name: "npc_dota_hero_axe".to_string(),
                    player_name: "mogul".to_string(),
                    is_fake_client: false,
                    steam_id: 76_561_198_000_000_001,
                    game_team: 2,
                },
                PlayerRecord {
                    hero_name: "npc_dota_hero_lina".to_string(),
                    player_name: "slayer".to_string(),
                    is_fake_client: false,
                    steam_id: 76_561_198_000_000_002,
                    game_team: 3,
                },
            ],
            ..FileInfoMessage::default()
        }),
    );

    stream
}
