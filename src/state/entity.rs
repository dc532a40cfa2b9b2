//! Individual entity state.
//!
//! An [`Entity`] is the folded result of every property change an entity
//! index has received since it was created. Values stay in their typed
//! form; the accessors coerce between the numeric representations the
//! wire format uses interchangeably.

use std::collections::HashMap;

use crate::message::{PropertyKey, PropertyValue};

/// Class name prefix shared by all hero entities.
pub const HERO_CLASS_PREFIX: &str = "CDOTA_Unit_Hero_";

/// Half the map edge length; world coordinates are cell-relative.
const WORLD_ORIGIN_OFFSET: f32 = 16_384.0;

/// Units per grid cell.
const CELL_WIDTH: f32 = 128.0;

/// One live entity: its class and accumulated property state.
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    index: u32,
    class_name: String,
    properties: HashMap<PropertyKey, PropertyValue>,
}

impl Entity {
    /// Creates an entity with no properties yet.
    #[must_use]
    pub fn new(index: u32, class_name: &str) -> Self {
        Entity {
            index,
            class_name: class_name.to_string(),
            properties: HashMap::new(),
        }
    }

    /// The entity's index.
    #[must_use]
    pub fn index(&self) -> u32 {
        self.index
    }

    /// The entity's class name.
    #[must_use]
    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    /// Stores a property value, replacing any previous value.
    pub fn set(&mut self, key: PropertyKey, value: PropertyValue) {
        self.properties.insert(key, value);
    }

    /// Returns the raw value for a key.
    #[must_use]
    pub fn get(&self, key: &PropertyKey) -> Option<&PropertyValue> {
        self.properties.get(key)
    }

    /// Returns the value coerced to a signed integer.
    #[must_use]
    pub fn int(&self, key: &PropertyKey) -> Option<i32> {
        match self.properties.get(key)? {
            PropertyValue::Int(v) => Some(*v),
            PropertyValue::Uint(v) | PropertyValue::Handle(v) => i32::try_from(*v).ok(),
            PropertyValue::Bool(v) => Some(i32::from(*v)),
            _ => None,
        }
    }

    /// Returns the value coerced to an unsigned integer.
    #[must_use]
    pub fn uint(&self, key: &PropertyKey) -> Option<u32> {
        match self.properties.get(key)? {
            PropertyValue::Uint(v) | PropertyValue::Handle(v) => Some(*v),
            PropertyValue::Int(v) => u32::try_from(*v).ok(),
            PropertyValue::Bool(v) => Some(u32::from(*v)),
            _ => None,
        }
    }

    /// Returns the value coerced to a float.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn float(&self, key: &PropertyKey) -> Option<f32> {
        match self.properties.get(key)? {
            PropertyValue::Float(v) => Some(*v),
            PropertyValue::Int(v) => Some(*v as f32),
            PropertyValue::Uint(v) => Some(*v as f32),
            _ => None,
        }
    }

    /// Returns the value coerced to a boolean.
    #[must_use]
    pub fn boolean(&self, key: &PropertyKey) -> Option<bool> {
        match self.properties.get(key)? {
            PropertyValue::Bool(v) => Some(*v),
            PropertyValue::Int(v) => Some(*v != 0),
            PropertyValue::Uint(v) => Some(*v != 0),
            _ => None,
        }
    }

    /// Returns the value as an entity handle.
    #[must_use]
    pub fn handle(&self, key: &PropertyKey) -> Option<u32> {
        match self.properties.get(key)? {
            PropertyValue::Handle(v) | PropertyValue::Uint(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the value as a string.
    #[must_use]
    pub fn text(&self, key: &PropertyKey) -> Option<&str> {
        match self.properties.get(key)? {
            PropertyValue::Text(v) => Some(v.as_str()),
            _ => None,
        }
    }

    /// True if this entity is a hero.
    #[must_use]
    pub fn is_hero(&self) -> bool {
        self.class_name.starts_with(HERO_CLASS_PREFIX)
    }

    /// The hero's `npc_dota_hero_*` unit name, derived from the class.
    ///
    /// `CDOTA_Unit_Hero_TrollWarlord` becomes `npc_dota_hero_troll_warlord`.
    /// Returns `None` for non-hero entities.
    #[must_use]
    pub fn hero_unit_name(&self) -> Option<String> {
        let camel = self.class_name.strip_prefix(HERO_CLASS_PREFIX)?;
        let mut snake = String::with_capacity(camel.len() + 16);
        snake.push_str("npc_dota_hero");
        for ch in camel.chars() {
            if ch.is_ascii_uppercase() {
                snake.push('_');
                snake.push(ch.to_ascii_lowercase());
            } else {
                snake.push(ch);
            }
        }
        // Class names with embedded underscores would otherwise double up.
        while snake.contains("__") {
            snake = snake.replace("__", "_");
        }
        Some(snake)
    }

    /// The entity's world position from its cell and in-cell offset.
    ///
    /// Returns `None` until all four coordinate properties have arrived.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn position(&self) -> Option<(f32, f32)> {
        let cell_x = self.uint(&PropertyKey::CellX)? as f32;
        let cell_y = self.uint(&PropertyKey::CellY)? as f32;
        let vec_x = self.float(&PropertyKey::VecX)?;
        let vec_y = self.float(&PropertyKey::VecY)?;
        Some((
            cell_x * CELL_WIDTH + vec_x - WORLD_ORIGIN_OFFSET,
            cell_y * CELL_WIDTH + vec_y - WORLD_ORIGIN_OFFSET,
        ))
    }
}
