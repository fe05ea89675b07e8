//! Player controller.
//!
//! This module handles:
//! - Movement relative to the facing, aim toward a world point
//! - Trigger handling (automatic vs one shot per press)
//! - Armor-first damage with a short invincibility window
//! - Lives, death and respawn
//! - Snapshots carried from one floor to the next

use glam::Vec2;
use highrise_common::{Deadline, HighriseError, HighriseResult, Millis, SchemaVersion, WorldBounds};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::actor::{Body, CombatStats, DamageOutcome, Damageable};
use crate::combat::MeleeSwing;
use crate::events::{EventSender, GameEvent};
use crate::input::PlayerInput;
use crate::projectile::ProjectilePool;
use crate::weapon::{Shot, WeaponInventory, WeaponSnapshot};

/// Speed above which the player counts as walking, per axis.
pub const PLAYER_MOVING_THRESHOLD: f32 = 5.0;

/// Player configuration parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerConfig {
    /// Movement speed in units per second
    pub speed: f32,
    /// Health cap
    pub max_health: i32,
    /// Armor cap
    pub max_armor: i32,
    /// Lives at the start of a run
    pub starting_lives: u32,
    /// Invincibility after a hit
    pub invincibility_ms: Millis,
    /// Distance from the body centre where projectiles spawn
    pub muzzle_offset: f32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            speed: 180.0,
            max_health: 100,
            max_armor: 100,
            starting_lives: 3,
            invincibility_ms: 400.0,
            muzzle_offset: 20.0,
        }
    }
}

/// Player state carried between floors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    /// Format version
    pub version: SchemaVersion,
    /// Health
    pub health: i32,
    /// Armor
    pub armor: i32,
    /// Lives
    pub lives: u32,
    /// Weapons, ammo and selection
    pub weapons: WeaponSnapshot,
}

impl PlayerSnapshot {
    /// Serializes to JSON.
    pub fn to_json(&self) -> HighriseResult<String> {
        serde_json::to_string(self)
            .map_err(|e| HighriseError::Serialization(e.to_string()))
    }

    /// Parses JSON, rejecting snapshots from an incompatible version.
    pub fn from_json(json: &str) -> HighriseResult<Self> {
        let snapshot: Self = serde_json::from_str(json)
            .map_err(|e| HighriseError::Serialization(e.to_string()))?;
        SchemaVersion::PLAYER_SNAPSHOT.ensure_readable(&snapshot.version)?;
        Ok(snapshot)
    }
}

/// Health, armor and lives as shown on the HUD.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerStats {
    /// Health
    pub health: i32,
    /// Armor
    pub armor: i32,
    /// Lives
    pub lives: u32,
}

/// The player character.
#[derive(Debug, Clone)]
pub struct Player {
    config: PlayerConfig,
    stats: CombatStats,
    armor: i32,
    lives: u32,
    body: Body,
    weapons: WeaponInventory,
    invincible_until: Deadline,
    trigger_held: bool,
    events: EventSender,
}

impl Player {
    /// Creates a fresh player at `position` with default settings.
    #[must_use]
    pub fn new(position: Vec2, events: EventSender) -> Self {
        Self::with_config(position, PlayerConfig::default(), events)
    }

    /// Creates a fresh player with custom settings.
    #[must_use]
    pub fn with_config(position: Vec2, config: PlayerConfig, events: EventSender) -> Self {
        Self {
            stats: CombatStats::new(config.max_health),
            armor: 0,
            lives: config.starting_lives,
            body: Body::new(position, config.speed),
            weapons: WeaponInventory::new(events.clone()),
            invincible_until: Deadline::NONE,
            trigger_held: false,
            events,
            config,
        }
    }

    /// Creates a player carrying state over from a previous floor.
    #[must_use]
    pub fn restore(
        position: Vec2,
        snapshot: &PlayerSnapshot,
        config: PlayerConfig,
        events: EventSender,
    ) -> Self {
        let mut stats = CombatStats::new(config.max_health);
        stats.set_health(snapshot.health);
        if stats.is_dead() {
            stats.revive(config.max_health);
        }
        Self {
            stats,
            armor: snapshot.armor.clamp(0, config.max_armor),
            lives: snapshot.lives,
            body: Body::new(position, config.speed),
            weapons: WeaponInventory::restore(&snapshot.weapons, events.clone()),
            invincible_until: Deadline::NONE,
            trigger_held: false,
            events,
            config,
        }
    }

    /// Captures the state that carries over to the next floor.
    #[must_use]
    pub fn snapshot(&self) -> PlayerSnapshot {
        PlayerSnapshot {
            version: SchemaVersion::PLAYER_SNAPSHOT,
            health: self.stats.health(),
            armor: self.armor,
            lives: self.lives,
            weapons: self.weapons.snapshot(),
        }
    }

    /// Get configuration.
    #[must_use]
    pub const fn config(&self) -> &PlayerConfig {
        &self.config
    }

    /// Current position.
    #[must_use]
    pub const fn position(&self) -> Vec2 {
        self.body.position
    }

    /// Moves the player without touching any other state.
    pub fn set_position(&mut self, position: Vec2) {
        self.body.position = position;
    }

    /// Kinematic state.
    #[must_use]
    pub const fn body(&self) -> &Body {
        &self.body
    }

    /// Facing angle in radians.
    #[must_use]
    pub const fn facing(&self) -> f32 {
        self.body.facing
    }

    /// Health.
    #[must_use]
    pub const fn health(&self) -> i32 {
        self.stats.health()
    }

    /// Armor.
    #[must_use]
    pub const fn armor(&self) -> i32 {
        self.armor
    }

    /// Remaining lives.
    #[must_use]
    pub const fn lives(&self) -> u32 {
        self.lives
    }

    /// Health, armor and lives together.
    #[must_use]
    pub const fn stats(&self) -> PlayerStats {
        PlayerStats {
            health: self.stats.health(),
            armor: self.armor,
            lives: self.lives,
        }
    }

    /// Checks if the player is dead (awaiting respawn or game over).
    #[must_use]
    pub const fn is_dead(&self) -> bool {
        self.stats.is_dead()
    }

    /// Checks if hits are currently ignored.
    #[must_use]
    pub fn is_invincible(&self, now: Millis) -> bool {
        self.invincible_until.is_pending(now)
    }

    /// Weapon inventory.
    #[must_use]
    pub const fn weapons(&self) -> &WeaponInventory {
        &self.weapons
    }

    /// Weapon inventory, mutably (pickups).
    pub fn weapons_mut(&mut self) -> &mut WeaponInventory {
        &mut self.weapons
    }

    /// Checks if the walk animation should play.
    #[must_use]
    pub fn is_moving(&self) -> bool {
        self.body.velocity.x.abs() > PLAYER_MOVING_THRESHOLD
            || self.body.velocity.y.abs() > PLAYER_MOVING_THRESHOLD
    }

    /// Applies one tick of input.
    ///
    /// Movement uses the facing from the previous tick, then the player turns
    /// toward the aim point, then the trigger is handled. Returns a melee swing
    /// when the hammer connected with its cooldown.
    pub fn update(
        &mut self,
        now: Millis,
        input: &PlayerInput,
        pool: &mut ProjectilePool,
    ) -> Option<MeleeSwing> {
        if self.is_dead() {
            return None;
        }

        if let Some(slot) = input.switch_to {
            self.weapons.switch_to_index(slot);
        }

        self.body.velocity = input.move_direction(self.body.facing) * self.config.speed;

        if self.body.position.distance_squared(input.aim) > f32::EPSILON {
            let angle = self.body.angle_to(input.aim);
            self.body.face(angle);
        }

        self.handle_fire(now, input.fire, pool)
    }

    fn handle_fire(&mut self, now: Millis, fire: bool, pool: &mut ProjectilePool) -> Option<MeleeSwing> {
        if !fire {
            self.trigger_held = false;
            return None;
        }

        let category = self.weapons.current();
        if self.trigger_held && !category.is_automatic() {
            return None;
        }
        self.trigger_held = true;

        let offset = if category.is_melee() {
            0.0
        } else {
            self.config.muzzle_offset
        };
        let angle = self.body.facing;
        let muzzle = self.body.position + Vec2::from_angle(angle) * offset;

        match self.weapons.fire(muzzle, angle, now, pool)? {
            Shot::Melee => Some(MeleeSwing {
                origin: self.body.position,
                angle,
                at: now,
            }),
            Shot::Projectiles { .. } => None,
        }
    }

    /// Advances position by the velocity and keeps the player inside `bounds`.
    pub fn integrate(&mut self, delta: Millis, bounds: &WorldBounds) {
        if self.is_dead() {
            return;
        }
        self.body.integrate(delta);
        self.body.position = bounds.clamp(self.body.position);
    }

    /// Restores health, capped at max.
    pub fn add_health(&mut self, amount: i32) {
        self.stats.heal(amount);
        self.emit_stats();
    }

    /// Adds armor, capped at max.
    pub fn add_armor(&mut self, amount: i32) {
        self.armor = (self.armor + amount.max(0)).min(self.config.max_armor);
        self.emit_stats();
    }

    /// Grants an extra life.
    pub fn add_life(&mut self) {
        self.lives = self.lives.saturating_add(1);
        self.emit_stats();
    }

    /// Brings the player back at `position` with full health and no armor.
    pub fn respawn(&mut self, position: Vec2) {
        self.stats.revive(self.config.max_health);
        self.armor = 0;
        self.invincible_until.clear();
        self.trigger_held = false;
        self.body.position = position;
        self.body.stop();
        info!("Player respawned, {} lives left", self.lives);
        self.emit_stats();
    }

    /// Publishes stats and weapon state, for a HUD that just attached.
    pub fn announce(&self) {
        self.emit_stats();
        self.weapons.announce();
    }

    fn emit_stats(&self) {
        self.events.emit(GameEvent::PlayerStatsChanged {
            health: self.stats.health(),
            armor: self.armor,
            lives: self.lives,
        });
    }
}

impl Damageable for Player {
    fn position(&self) -> Vec2 {
        self.body.position
    }

    fn is_alive(&self) -> bool {
        !self.is_dead()
    }

    fn take_damage(&mut self, amount: i32, now: Millis) -> DamageOutcome {
        if self.is_dead() || self.is_invincible(now) {
            return DamageOutcome::Ignored;
        }

        let mut remaining = amount.max(0);
        let absorbed = self.armor.min(remaining);
        self.armor -= absorbed;
        remaining -= absorbed;

        let outcome = self.stats.apply_damage(remaining);
        self.invincible_until = Deadline::at(now + self.config.invincibility_ms);
        debug!(
            "Player hit for {} ({} absorbed), health {}",
            amount,
            absorbed,
            self.stats.health()
        );

        if outcome == DamageOutcome::Killed {
            self.lives = self.lives.saturating_sub(1);
            self.body.stop();
            info!("Player died, {} lives left", self.lives);
            self.events.emit(GameEvent::PlayerDied { lives: self.lives });
        }

        self.emit_stats();
        outcome
    }
}
