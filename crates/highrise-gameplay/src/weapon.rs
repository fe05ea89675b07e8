//! Weapons, ammo and firing.
//!
//! This module provides:
//! - The immutable weapon definition table (five categories)
//! - The per-actor weapon inventory (held flags, ammo, cooldowns)
//! - Pellet spread for multi-projectile weapons
//! - Auto-switch away from an empty weapon

use glam::Vec2;
use highrise_common::{Cooldown, Millis};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::events::{EventSender, GameEvent};
use crate::projectile::{ProjectilePool, ProjectileSpec};

/// Number of weapon categories.
pub const WEAPON_COUNT: usize = 5;

/// Ammo ceiling for every ammo-consuming category.
pub const MAX_AMMO: u32 = 999;

/// Rounds the handgun starts with.
pub const STARTING_HANDGUN_AMMO: u32 = 20;

// ============================================================================
// Weapon Categories
// ============================================================================

/// Weapon category, indexed 0-4.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeaponCategory {
    /// Melee, unlimited use
    Hammer,
    /// Single shot
    Handgun,
    /// Five-pellet spread
    Shotgun,
    /// Automatic fire
    MachineGun,
    /// Splash damage
    RocketLauncher,
}

impl WeaponCategory {
    /// All categories in index order.
    pub const ALL: [Self; WEAPON_COUNT] = [
        Self::Hammer,
        Self::Handgun,
        Self::Shotgun,
        Self::MachineGun,
        Self::RocketLauncher,
    ];

    /// Returns the category index (0-4).
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Hammer => 0,
            Self::Handgun => 1,
            Self::Shotgun => 2,
            Self::MachineGun => 3,
            Self::RocketLauncher => 4,
        }
    }

    /// Looks up a category by index.
    #[must_use]
    pub const fn from_index(index: usize) -> Option<Self> {
        if index < WEAPON_COUNT {
            Some(Self::ALL[index])
        } else {
            None
        }
    }

    /// Checks if this is the melee category.
    #[must_use]
    pub const fn is_melee(self) -> bool {
        matches!(self, Self::Hammer)
    }

    /// Checks if firing holds down for repeated shots.
    #[must_use]
    pub const fn is_automatic(self) -> bool {
        matches!(self, Self::MachineGun)
    }

    /// Returns the static definition for this category.
    #[must_use]
    pub fn definition(self) -> &'static WeaponDefinition {
        &WEAPON_DEFINITIONS[self.index()]
    }

    /// Get display name.
    #[must_use]
    pub fn display_name(self) -> &'static str {
        self.definition().name
    }
}

// ============================================================================
// Weapon Definitions
// ============================================================================

/// Static per-category weapon stats.
#[derive(Debug, Clone, PartialEq)]
pub struct WeaponDefinition {
    /// Category
    pub category: WeaponCategory,
    /// Display name
    pub name: &'static str,
    /// Damage per projectile (or per swing)
    pub damage: i32,
    /// Nominal range
    pub range: f32,
    /// Minimum time between shots
    pub fire_rate_ms: Millis,
    /// Projectile speed in units per second (0 for melee)
    pub projectile_speed: f32,
    /// Ammo granted by a weapon pickup (0 for melee)
    pub ammo_per_pickup: u32,
    /// Projectiles per shot
    pub pellets: u32,
    /// Total fan angle across all pellets, in radians
    pub spread: f32,
    /// Splash radius (0 = direct hit only)
    pub splash_radius: f32,
}

impl WeaponDefinition {
    /// Angles of every pellet for a shot aimed at `aim`.
    ///
    /// Pellets are spaced evenly across `spread`, centred on the aim angle.
    pub fn pellet_angles(&self, aim: f32) -> impl Iterator<Item = f32> + '_ {
        let pellets = self.pellets.max(1);
        let step = if pellets > 1 {
            self.spread / (pellets - 1) as f32
        } else {
            0.0
        };
        let centre = (pellets - 1) as f32 / 2.0;
        (0..pellets).map(move |i| aim + (i as f32 - centre) * step)
    }

    /// Projectile parameters for one pellet.
    #[must_use]
    pub fn projectile(&self, origin: Vec2, angle: f32) -> ProjectileSpec {
        ProjectileSpec {
            origin,
            angle,
            speed: self.projectile_speed,
            damage: self.damage,
            splash_radius: self.splash_radius,
        }
    }
}

/// The immutable weapon table, indexed by category.
pub static WEAPON_DEFINITIONS: [WeaponDefinition; WEAPON_COUNT] = [
    WeaponDefinition {
        category: WeaponCategory::Hammer,
        name: "Hammer",
        damage: 30,
        range: 50.0,
        fire_rate_ms: 400.0,
        projectile_speed: 0.0,
        ammo_per_pickup: 0,
        pellets: 1,
        spread: 0.0,
        splash_radius: 0.0,
    },
    WeaponDefinition {
        category: WeaponCategory::Handgun,
        name: "Handgun",
        damage: 6,
        range: 600.0,
        fire_rate_ms: 300.0,
        projectile_speed: 600.0,
        ammo_per_pickup: 12,
        pellets: 1,
        spread: 0.0,
        splash_radius: 0.0,
    },
    WeaponDefinition {
        category: WeaponCategory::Shotgun,
        name: "Shotgun",
        damage: 8,
        range: 400.0,
        fire_rate_ms: 700.0,
        projectile_speed: 500.0,
        ammo_per_pickup: 8,
        pellets: 5,
        spread: 0.26,
        splash_radius: 0.0,
    },
    WeaponDefinition {
        category: WeaponCategory::MachineGun,
        name: "Machine Gun",
        damage: 6,
        range: 550.0,
        fire_rate_ms: 80.0,
        projectile_speed: 700.0,
        ammo_per_pickup: 30,
        pellets: 1,
        spread: 0.0,
        splash_radius: 0.0,
    },
    WeaponDefinition {
        category: WeaponCategory::RocketLauncher,
        name: "Rocket Launcher",
        damage: 50,
        range: 800.0,
        fire_rate_ms: 1200.0,
        projectile_speed: 350.0,
        ammo_per_pickup: 3,
        pellets: 1,
        spread: 0.0,
        splash_radius: 120.0,
    },
];

// ============================================================================
// Ammo
// ============================================================================

/// Ammo count of one category as seen by the HUD.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Ammo {
    /// Melee never runs out
    Unlimited,
    /// Remaining rounds
    Rounds(u32),
}

impl Ammo {
    /// Checks if at least one shot is available.
    #[must_use]
    pub const fn is_available(self) -> bool {
        match self {
            Self::Unlimited => true,
            Self::Rounds(n) => n > 0,
        }
    }
}

impl std::fmt::Display for Ammo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unlimited => write!(f, "∞"),
            Self::Rounds(n) => write!(f, "{n}"),
        }
    }
}

/// One row of the ammo snapshot published on ammo changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmmoSlot {
    /// Category
    pub category: WeaponCategory,
    /// Ammo in that category
    pub ammo: Ammo,
    /// Whether the category is held
    pub held: bool,
}

// ============================================================================
// Inventory
// ============================================================================

/// What a successful `fire` produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shot {
    /// Melee swing; the caller resolves hits against nearby targets
    Melee,
    /// Projectiles launched (may be fewer than the pellet count if the pool ran dry)
    Projectiles {
        /// Number of projectiles actually spawned
        spawned: usize,
    },
}

/// Serializable weapon state, carried between floors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeaponSnapshot {
    /// Held flags per category
    pub held: [bool; WEAPON_COUNT],
    /// Ammo per category (ignored for melee)
    pub ammo: [u32; WEAPON_COUNT],
    /// Selected category
    pub current: WeaponCategory,
}

/// Weapons held by the player, with ammo and cooldowns.
#[derive(Debug, Clone)]
pub struct WeaponInventory {
    held: [bool; WEAPON_COUNT],
    ammo: [u32; WEAPON_COUNT],
    cooldowns: [Cooldown; WEAPON_COUNT],
    current: WeaponCategory,
    events: EventSender,
}

impl WeaponInventory {
    /// Creates the starting loadout: hammer and handgun, handgun selected.
    #[must_use]
    pub fn new(events: EventSender) -> Self {
        let mut held = [false; WEAPON_COUNT];
        held[WeaponCategory::Hammer.index()] = true;
        held[WeaponCategory::Handgun.index()] = true;
        let mut ammo = [0; WEAPON_COUNT];
        ammo[WeaponCategory::Handgun.index()] = STARTING_HANDGUN_AMMO;

        Self {
            held,
            ammo,
            cooldowns: Self::fresh_cooldowns(),
            current: WeaponCategory::Handgun,
            events,
        }
    }

    /// Rebuilds an inventory from a snapshot. Cooldowns start ready.
    ///
    /// An unheld `current` falls back to the first held category.
    #[must_use]
    pub fn restore(snapshot: &WeaponSnapshot, events: EventSender) -> Self {
        let mut ammo = snapshot.ammo;
        for a in &mut ammo {
            *a = (*a).min(MAX_AMMO);
        }
        let current = if snapshot.held[snapshot.current.index()] {
            snapshot.current
        } else {
            WeaponCategory::ALL
                .into_iter()
                .find(|c| snapshot.held[c.index()])
                .unwrap_or(WeaponCategory::Hammer)
        };

        Self {
            held: snapshot.held,
            ammo,
            cooldowns: Self::fresh_cooldowns(),
            current,
            events,
        }
    }

    fn fresh_cooldowns() -> [Cooldown; WEAPON_COUNT] {
        WeaponCategory::ALL.map(|c| Cooldown::new(c.definition().fire_rate_ms))
    }

    /// Captures held weapons, ammo and selection.
    #[must_use]
    pub fn snapshot(&self) -> WeaponSnapshot {
        WeaponSnapshot {
            held: self.held,
            ammo: self.ammo,
            current: self.current,
        }
    }

    /// Currently selected category.
    #[must_use]
    pub const fn current(&self) -> WeaponCategory {
        self.current
    }

    /// Definition of the selected weapon.
    #[must_use]
    pub fn current_definition(&self) -> &'static WeaponDefinition {
        self.current.definition()
    }

    /// Checks if a category is held.
    #[must_use]
    pub const fn is_held(&self, category: WeaponCategory) -> bool {
        self.held[category.index()]
    }

    /// Ammo of a category.
    #[must_use]
    pub const fn ammo(&self, category: WeaponCategory) -> Ammo {
        if category.is_melee() {
            Ammo::Unlimited
        } else {
            Ammo::Rounds(self.ammo[category.index()])
        }
    }

    /// Per-category view used for HUD updates.
    #[must_use]
    pub fn ammo_slots(&self) -> [AmmoSlot; WEAPON_COUNT] {
        WeaponCategory::ALL.map(|category| AmmoSlot {
            category,
            ammo: self.ammo(category),
            held: self.is_held(category),
        })
    }

    /// Selects a held category and announces it. Unheld categories are ignored.
    pub fn switch_to(&mut self, category: WeaponCategory) {
        if !self.is_held(category) {
            return;
        }
        self.current = category;
        self.events.emit(GameEvent::WeaponSwitched {
            category,
            ammo: self.ammo(category),
        });
    }

    /// Selects by raw slot index (number keys). Out-of-range indices are ignored.
    pub fn switch_to_index(&mut self, index: usize) {
        if let Some(category) = WeaponCategory::from_index(index) {
            self.switch_to(category);
        }
    }

    /// Picks up a weapon: marks it held, grants its pickup ammo and selects it.
    pub fn add_weapon(&mut self, category: WeaponCategory) {
        let idx = category.index();
        self.held[idx] = true;
        if !category.is_melee() {
            self.ammo[idx] = (self.ammo[idx] + category.definition().ammo_per_pickup).min(MAX_AMMO);
        }
        self.switch_to(category);
        self.emit_ammo();
    }

    /// Adds ammo to a category, capped at [`MAX_AMMO`]. No-op for melee.
    pub fn add_ammo(&mut self, category: WeaponCategory, amount: u32) {
        if category.is_melee() {
            return;
        }
        let idx = category.index();
        self.ammo[idx] = self.ammo[idx].saturating_add(amount).min(MAX_AMMO);
        self.emit_ammo();
    }

    /// Tries to fire the selected weapon.
    ///
    /// Returns `None` with no side effect while the weapon cools down. An empty
    /// weapon also returns `None` and switches to the first usable category.
    /// Melee returns [`Shot::Melee`] without touching the pool. Otherwise one
    /// projectile per pellet is requested from `pool`, and the shot costs one round.
    pub fn fire(
        &mut self,
        origin: Vec2,
        angle: f32,
        now: Millis,
        pool: &mut ProjectilePool,
    ) -> Option<Shot> {
        let category = self.current;
        let idx = category.index();
        if !self.cooldowns[idx].is_ready(now) {
            return None;
        }

        if category.is_melee() {
            self.cooldowns[idx].trigger(now);
            return Some(Shot::Melee);
        }

        if self.ammo[idx] == 0 {
            self.auto_switch();
            return None;
        }

        let def = category.definition();
        let spawned = def
            .pellet_angles(angle)
            .filter_map(|a| pool.fire(&def.projectile(origin, a)))
            .count();

        self.ammo[idx] -= 1;
        self.emit_ammo();
        self.cooldowns[idx].trigger(now);
        Some(Shot::Projectiles { spawned })
    }

    fn auto_switch(&mut self) {
        let fallback = WeaponCategory::ALL
            .into_iter()
            .find(|&c| !c.is_melee() && self.is_held(c) && self.ammo[c.index()] > 0)
            .or_else(|| {
                self.is_held(WeaponCategory::Hammer)
                    .then_some(WeaponCategory::Hammer)
            });
        if let Some(category) = fallback {
            debug!(
                "{} is empty, switching to {}",
                self.current.display_name(),
                category.display_name()
            );
            self.switch_to(category);
        }
    }

    /// Publishes the full weapon state, for a HUD that just attached.
    pub fn announce(&self) {
        self.emit_ammo();
        self.events.emit(GameEvent::WeaponSwitched {
            category: self.current,
            ammo: self.ammo(self.current),
        });
    }

    fn emit_ammo(&self) {
        self.events.emit(GameEvent::AmmoChanged {
            slots: self.ammo_slots(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventBus;
    use crate::projectile::ProjectileOwner;
    use proptest::prelude::*;

    fn pool() -> ProjectilePool {
        ProjectilePool::for_player()
    }

    #[test]
    fn test_definition_table_matches_categories() {
        for (i, def) in WEAPON_DEFINITIONS.iter().enumerate() {
            assert_eq!(def.category.index(), i);
        }
        assert_eq!(WeaponCategory::Shotgun.definition().pellets, 5);
        assert!((WeaponCategory::RocketLauncher.definition().splash_radius - 120.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_starting_loadout() {
        let inv = WeaponInventory::new(EventSender::detached());
        assert_eq!(inv.current(), WeaponCategory::Handgun);
        assert!(inv.is_held(WeaponCategory::Hammer));
        assert!(!inv.is_held(WeaponCategory::Shotgun));
        assert_eq!(inv.ammo(WeaponCategory::Handgun), Ammo::Rounds(20));
        assert_eq!(inv.ammo(WeaponCategory::Hammer), Ammo::Unlimited);
    }

    #[test]
    fn test_fire_consumes_one_round_and_respects_cooldown() {
        let mut inv = WeaponInventory::new(EventSender::detached());
        let mut pool = pool();

        let shot = inv.fire(Vec2::ZERO, 0.0, 1000.0, &mut pool);
        assert_eq!(shot, Some(Shot::Projectiles { spawned: 1 }));
        assert_eq!(inv.ammo(WeaponCategory::Handgun), Ammo::Rounds(19));

        assert_eq!(inv.fire(Vec2::ZERO, 0.0, 1299.0, &mut pool), None);
        assert_eq!(inv.ammo(WeaponCategory::Handgun), Ammo::Rounds(19));
        assert!(inv.fire(Vec2::ZERO, 0.0, 1300.0, &mut pool).is_some());
    }

    #[test]
    fn test_shotgun_spends_one_round_for_five_pellets() {
        let mut inv = WeaponInventory::new(EventSender::detached());
        inv.add_weapon(WeaponCategory::Shotgun);
        let mut pool = pool();

        let shot = inv.fire(Vec2::ZERO, 0.0, 0.0, &mut pool);
        assert_eq!(shot, Some(Shot::Projectiles { spawned: 5 }));
        assert_eq!(pool.active_count(), 5);
        assert_eq!(inv.ammo(WeaponCategory::Shotgun), Ammo::Rounds(7));
    }

    #[test]
    fn test_shotgun_pellet_angles() {
        let angles: Vec<f32> = WeaponCategory::Shotgun
            .definition()
            .pellet_angles(1.0)
            .collect();
        let expected = [0.87, 0.935, 1.0, 1.065, 1.13];
        assert_eq!(angles.len(), expected.len());
        for (a, e) in angles.iter().zip(expected) {
            assert!((a - e).abs() < 1e-5, "{a} vs {e}");
        }
    }

    #[test]
    fn test_melee_fires_without_pool() {
        let mut inv = WeaponInventory::new(EventSender::detached());
        inv.switch_to(WeaponCategory::Hammer);
        let mut pool = pool();

        assert_eq!(inv.fire(Vec2::ZERO, 0.0, 0.0, &mut pool), Some(Shot::Melee));
        assert_eq!(pool.active_count(), 0);
        assert_eq!(inv.fire(Vec2::ZERO, 0.0, 399.0, &mut pool), None);
        assert_eq!(inv.fire(Vec2::ZERO, 0.0, 400.0, &mut pool), Some(Shot::Melee));
    }

    #[test]
    fn test_empty_weapon_auto_switches_without_firing() {
        let snapshot = WeaponSnapshot {
            held: [true, true, false, true, false],
            ammo: [0, 0, 0, 5, 0],
            current: WeaponCategory::Handgun,
        };
        let mut inv = WeaponInventory::restore(&snapshot, EventSender::detached());
        let mut pool = pool();

        assert_eq!(inv.fire(Vec2::ZERO, 0.0, 0.0, &mut pool), None);
        assert_eq!(inv.current(), WeaponCategory::MachineGun);
        assert_eq!(pool.active_count(), 0);
    }

    #[test]
    fn test_auto_switch_falls_back_to_melee() {
        let snapshot = WeaponSnapshot {
            held: [true, true, true, false, false],
            ammo: [0, 0, 0, 0, 0],
            current: WeaponCategory::Shotgun,
        };
        let mut inv = WeaponInventory::restore(&snapshot, EventSender::detached());
        inv.fire(Vec2::ZERO, 0.0, 0.0, &mut pool());
        assert_eq!(inv.current(), WeaponCategory::Hammer);
    }

    #[test]
    fn test_pool_exhaustion_still_spends_round() {
        let mut inv = WeaponInventory::new(EventSender::detached());
        let mut full = ProjectilePool::new(1, ProjectileOwner::Player);
        inv.fire(Vec2::ZERO, 0.0, 0.0, &mut full);

        let shot = inv.fire(Vec2::ZERO, 0.0, 1000.0, &mut full);
        assert_eq!(shot, Some(Shot::Projectiles { spawned: 0 }));
        assert_eq!(full.active_count(), 1);
    }

    #[test]
    fn test_switch_to_ignores_unheld_and_out_of_range() {
        let bus = EventBus::new(16);
        let mut inv = WeaponInventory::new(bus.sender());

        inv.switch_to(WeaponCategory::RocketLauncher);
        inv.switch_to_index(7);
        assert_eq!(inv.current(), WeaponCategory::Handgun);
        assert_eq!(bus.pending_count(), 0);

        inv.switch_to_index(0);
        assert_eq!(inv.current(), WeaponCategory::Hammer);
        assert_eq!(
            bus.drain(),
            vec![GameEvent::WeaponSwitched {
                category: WeaponCategory::Hammer,
                ammo: Ammo::Unlimited,
            }]
        );
    }

    #[test]
    fn test_add_weapon_grants_ammo_and_selects() {
        let bus = EventBus::new(16);
        let mut inv = WeaponInventory::new(bus.sender());
        inv.add_weapon(WeaponCategory::RocketLauncher);

        assert_eq!(inv.current(), WeaponCategory::RocketLauncher);
        assert_eq!(inv.ammo(WeaponCategory::RocketLauncher), Ammo::Rounds(3));
        let events = bus.drain();
        assert!(matches!(events[0], GameEvent::WeaponSwitched { .. }));
        assert!(matches!(events[1], GameEvent::AmmoChanged { .. }));
    }

    #[test]
    fn test_add_ammo_ignores_melee() {
        let bus = EventBus::new(16);
        let mut inv = WeaponInventory::new(bus.sender());
        inv.add_ammo(WeaponCategory::Hammer, 50);
        assert_eq!(bus.pending_count(), 0);
        assert_eq!(inv.ammo(WeaponCategory::Hammer), Ammo::Unlimited);
    }

    proptest! {
        #[test]
        fn ammo_never_exceeds_cap(grants in proptest::collection::vec(0u32..2000, 1..20)) {
            let mut inv = WeaponInventory::new(EventSender::detached());
            for g in grants {
                inv.add_ammo(WeaponCategory::MachineGun, g);
                prop_assert!(matches!(inv.ammo(WeaponCategory::MachineGun), Ammo::Rounds(n) if n <= MAX_AMMO));
            }
        }

        #[test]
        fn pellets_fan_symmetrically(aim in -3.0f32..3.0) {
            let angles: Vec<f32> = WeaponCategory::Shotgun.definition().pellet_angles(aim).collect();
            let mean = angles.iter().sum::<f32>() / angles.len() as f32;
            prop_assert!((mean - aim).abs() < 1e-4);
            let width = angles[angles.len() - 1] - angles[0];
            prop_assert!((width - 0.26).abs() < 1e-4);
        }
    }
}
