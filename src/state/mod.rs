//! Entity state tracking.
//!
//! [`entity`] holds per-entity property state; [`world`] folds the
//! update stream into the live entity set.

pub mod entity;
pub mod world;

pub use entity::Entity;
pub use world::World;
