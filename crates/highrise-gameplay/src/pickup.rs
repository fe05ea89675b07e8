//! Floor pickups.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::events::{EventSender, GameEvent};
use crate::player::Player;
use crate::weapon::WeaponCategory;

/// Health restored by a health pack.
pub const HEALTH_PICKUP_AMOUNT: i32 = 25;

/// Armor granted by an armor vest.
pub const ARMOR_PICKUP_AMOUNT: i32 = 30;

/// Rounds an ammo box adds per held category, indexed by category.
pub const AMMO_BOX_ROUNDS: [u32; 5] = [0, 12, 8, 40, 4];

/// Radius within which the player collects a pickup.
pub const PICKUP_RADIUS: f32 = 16.0;

/// What a pickup grants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PickupKind {
    /// +25 health
    Health,
    /// +30 armor
    Armor,
    /// +1 life
    Life,
    /// Rounds for every held gun
    Ammo,
    /// A weapon and its pickup ammo
    Weapon(WeaponCategory),
}

impl PickupKind {
    /// Text shown in the pickup ticker.
    #[must_use]
    pub fn label(self) -> String {
        match self {
            Self::Health => format!("+{HEALTH_PICKUP_AMOUNT} Health"),
            Self::Armor => format!("+{ARMOR_PICKUP_AMOUNT} Armor"),
            Self::Life => "+1 Life!".to_string(),
            Self::Ammo => "Ammo picked up".to_string(),
            Self::Weapon(category) => format!("Picked up {}", category.display_name()),
        }
    }

    /// Applies the effect to `player`.
    pub fn apply(self, player: &mut Player) {
        match self {
            Self::Health => player.add_health(HEALTH_PICKUP_AMOUNT),
            Self::Armor => player.add_armor(ARMOR_PICKUP_AMOUNT),
            Self::Life => player.add_life(),
            Self::Ammo => {
                let weapons = player.weapons_mut();
                for category in WeaponCategory::ALL.into_iter().filter(|c| !c.is_melee()) {
                    if weapons.is_held(category) {
                        weapons.add_ammo(category, AMMO_BOX_ROUNDS[category.index()]);
                    }
                }
            },
            Self::Weapon(category) => player.weapons_mut().add_weapon(category),
        }
    }
}

/// An item lying on the floor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pickup {
    kind: PickupKind,
    position: Vec2,
    active: bool,
}

impl Pickup {
    /// Places a pickup.
    #[must_use]
    pub const fn new(kind: PickupKind, position: Vec2) -> Self {
        Self {
            kind,
            position,
            active: true,
        }
    }

    /// What it grants.
    #[must_use]
    pub const fn kind(&self) -> PickupKind {
        self.kind
    }

    /// Where it lies.
    #[must_use]
    pub const fn position(&self) -> Vec2 {
        self.position
    }

    /// Checks if it can still be collected.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Gives the pickup to `player` and deactivates it.
    ///
    /// Returns false if it was already collected.
    pub fn collect(&mut self, player: &mut Player, events: &EventSender) -> bool {
        if !self.active {
            return false;
        }
        self.kind.apply(player);
        self.active = false;
        debug!("Collected {:?}", self.kind);
        events.emit(GameEvent::PickupMessage {
            text: self.kind.label(),
        });
        true
    }
}
