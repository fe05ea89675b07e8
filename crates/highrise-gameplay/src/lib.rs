//! # Highrise Gameplay
//!
//! Gameplay core for Highrise, a top-down floor-by-floor shooter.
//!
//! This crate holds everything that runs inside a floor:
//! - NPC state machines (soldier, boss, innocent) and their registry
//! - Weapons, ammo and pooled projectiles
//! - Player controller, damage, lives and snapshots
//! - Pickups, melee and splash damage
//! - Level data and gameplay configuration
//! - Floor session driving one tick at a time
//! - Event bus between the core and the presentation layer

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod actor;
pub mod boss;
pub mod combat;
pub mod config;
pub mod events;
pub mod innocent;
pub mod input;
pub mod level;
pub mod npc;
pub mod pickup;
pub mod player;
pub mod projectile;
pub mod registry;
pub mod session;
pub mod soldier;
pub mod weapon;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::actor::*;
    pub use crate::boss::*;
    pub use crate::combat::*;
    pub use crate::config::*;
    pub use crate::events::*;
    pub use crate::innocent::*;
    pub use crate::input::*;
    pub use crate::level::*;
    pub use crate::npc::*;
    pub use crate::pickup::*;
    pub use crate::player::*;
    pub use crate::projectile::*;
    pub use crate::registry::*;
    pub use crate::session::*;
    pub use crate::soldier::*;
    pub use crate::weapon::*;
}

pub use prelude::*;

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    #[test]
    fn test_weapon_table_order() {
        for (i, def) in WEAPON_DEFINITIONS.iter().enumerate() {
            assert_eq!(def.category.index(), i);
        }
    }

    #[test]
    fn test_registry_holds_every_npc_kind() {
        let events = EventSender::detached();
        let mut registry = ActorRegistry::new();
        registry.spawn(Soldier::new(Vec2::ZERO, 1, events.clone()));
        registry.spawn(Boss::new(Vec2::ZERO, 1, events.clone()));
        registry.spawn(Innocent::new(Vec2::ZERO, events));

        assert_eq!(registry.len(), 3);
        assert_eq!(registry.ids_of(ActorKind::Boss).len(), 1);
    }

    #[test]
    fn test_default_session_config() {
        let config = GameplayConfig::default();
        assert_eq!(config.player_pool_size, PLAYER_POOL_SIZE);
        assert_eq!(config.enemy_pool_size, ENEMY_POOL_SIZE);
    }
}
