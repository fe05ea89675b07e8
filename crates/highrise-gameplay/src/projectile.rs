//! Fixed-capacity projectile pools.
//!
//! Slots are created once with the floor and cycled between inactive and
//! active. Firing takes the first inactive slot; when every slot is in flight
//! the shot is dropped. Pool exhaustion is a soft cap, not an error.

use glam::Vec2;
use highrise_common::{Millis, WorldBounds};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Default number of player projectile slots.
pub const PLAYER_POOL_SIZE: usize = 60;

/// Default number of enemy projectile slots.
pub const ENEMY_POOL_SIZE: usize = 80;

/// Who fired a projectile. Decides which actors it can hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProjectileOwner {
    /// Hits NPCs
    Player,
    /// Hits the player
    Enemy,
}

/// Parameters of a single shot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectileSpec {
    /// Spawn position
    pub origin: Vec2,
    /// Travel direction in radians
    pub angle: f32,
    /// Speed in units per second
    pub speed: f32,
    /// Damage on hit
    pub damage: i32,
    /// Splash radius, 0 for direct hits only
    pub splash_radius: f32,
}

/// One pooled projectile slot.
#[derive(Debug, Clone, PartialEq)]
pub struct Projectile {
    active: bool,
    position: Vec2,
    velocity: Vec2,
    angle: f32,
    damage: i32,
    owner: ProjectileOwner,
    splash_radius: f32,
}

impl Projectile {
    fn inactive(owner: ProjectileOwner) -> Self {
        Self {
            active: false,
            position: Vec2::ZERO,
            velocity: Vec2::ZERO,
            angle: 0.0,
            damage: 0,
            owner,
            splash_radius: 0.0,
        }
    }

    fn launch(&mut self, spec: &ProjectileSpec) {
        self.active = true;
        self.position = spec.origin;
        self.angle = spec.angle;
        self.velocity = Vec2::from_angle(spec.angle) * spec.speed;
        self.damage = spec.damage;
        self.splash_radius = spec.splash_radius;
    }

    /// Returns whether the slot is in flight.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Current position.
    #[must_use]
    pub const fn position(&self) -> Vec2 {
        self.position
    }

    /// Velocity in units per second.
    #[must_use]
    pub const fn velocity(&self) -> Vec2 {
        self.velocity
    }

    /// Heading in radians, for sprite rotation.
    #[must_use]
    pub const fn angle(&self) -> f32 {
        self.angle
    }

    /// Damage dealt on hit (or at the centre of a splash).
    #[must_use]
    pub const fn damage(&self) -> i32 {
        self.damage
    }

    /// Who fired it.
    #[must_use]
    pub const fn owner(&self) -> ProjectileOwner {
        self.owner
    }

    /// Checks if the projectile was fired by an enemy.
    #[must_use]
    pub fn is_enemy_owned(&self) -> bool {
        self.owner == ProjectileOwner::Enemy
    }

    /// Splash radius (0 = direct hit only).
    #[must_use]
    pub const fn splash_radius(&self) -> f32 {
        self.splash_radius
    }

    /// Checks if the projectile detonates with splash damage.
    #[must_use]
    pub fn is_explosive(&self) -> bool {
        self.splash_radius > 0.0
    }
}

/// Fixed-size set of projectile slots for one owner.
#[derive(Debug, Clone)]
pub struct ProjectilePool {
    slots: Vec<Projectile>,
    owner: ProjectileOwner,
}

impl ProjectilePool {
    /// Creates a pool with `capacity` inactive slots.
    #[must_use]
    pub fn new(capacity: usize, owner: ProjectileOwner) -> Self {
        Self {
            slots: vec![Projectile::inactive(owner); capacity],
            owner,
        }
    }

    /// Creates the default player pool.
    #[must_use]
    pub fn for_player() -> Self {
        Self::new(PLAYER_POOL_SIZE, ProjectileOwner::Player)
    }

    /// Creates the default enemy pool.
    #[must_use]
    pub fn for_enemies() -> Self {
        Self::new(ENEMY_POOL_SIZE, ProjectileOwner::Enemy)
    }

    /// Total number of slots.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Owner of every projectile in this pool.
    #[must_use]
    pub const fn owner(&self) -> ProjectileOwner {
        self.owner
    }

    /// Number of slots in flight.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.slots.iter().filter(|p| p.active).count()
    }

    /// Launches a projectile from the first inactive slot.
    ///
    /// Returns the slot index, or `None` when the pool is exhausted.
    pub fn fire(&mut self, spec: &ProjectileSpec) -> Option<usize> {
        let Some(index) = self.slots.iter().position(|p| !p.active) else {
            debug!(
                "{:?} projectile pool exhausted ({} slots), shot dropped",
                self.owner,
                self.slots.len()
            );
            return None;
        };
        self.slots[index].launch(spec);
        Some(index)
    }

    /// Returns a slot to the pool. Inactive or out-of-range slots are ignored.
    pub fn deactivate(&mut self, index: usize) {
        if let Some(slot) = self.slots.get_mut(index) {
            slot.active = false;
        }
    }

    /// Returns every slot to the pool.
    pub fn clear(&mut self) {
        for slot in &mut self.slots {
            slot.active = false;
        }
    }

    /// Looks up a slot.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Projectile> {
        self.slots.get(index)
    }

    /// Iterates over in-flight projectiles with their slot indices.
    pub fn iter_active(&self) -> impl Iterator<Item = (usize, &Projectile)> {
        self.slots.iter().enumerate().filter(|(_, p)| p.active)
    }

    /// Moves every active projectile and deactivates those that leave `bounds`.
    ///
    /// Returns how many left the world this step.
    pub fn step(&mut self, delta: Millis, bounds: &WorldBounds) -> usize {
        let dt = (delta / 1000.0) as f32;
        let mut escaped = 0;
        for slot in self.slots.iter_mut().filter(|p| p.active) {
            slot.position += slot.velocity * dt;
            if !bounds.contains(slot.position) {
                slot.active = false;
                escaped += 1;
            }
        }
        escaped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shot(angle: f32) -> ProjectileSpec {
        ProjectileSpec {
            origin: Vec2::new(100.0, 100.0),
            angle,
            speed: 600.0,
            damage: 6,
            splash_radius: 0.0,
        }
    }

    #[test]
    fn test_fire_uses_first_inactive_slot() {
        let mut pool = ProjectilePool::new(3, ProjectileOwner::Player);
        assert_eq!(pool.fire(&shot(0.0)), Some(0));
        assert_eq!(pool.fire(&shot(0.0)), Some(1));
        pool.deactivate(0);
        assert_eq!(pool.fire(&shot(0.0)), Some(0));
        assert_eq!(pool.active_count(), 2);
    }

    #[test]
    fn test_exhausted_pool_drops_shot() {
        let mut pool = ProjectilePool::new(2, ProjectileOwner::Enemy);
        pool.fire(&shot(0.0));
        pool.fire(&shot(0.0));
        assert_eq!(pool.fire(&shot(0.0)), None);
        assert_eq!(pool.active_count(), 2);
    }

    #[test]
    fn test_velocity_from_angle() {
        let mut pool = ProjectilePool::for_player();
        let idx = pool.fire(&shot(std::f32::consts::FRAC_PI_2)).unwrap();
        let p = pool.get(idx).unwrap();
        assert!(p.velocity().x.abs() < 1e-3);
        assert!((p.velocity().y - 600.0).abs() < 1e-3);
        assert!(!p.is_enemy_owned());
        assert!(!p.is_explosive());
    }

    #[test]
    fn test_step_moves_and_culls() {
        let bounds = WorldBounds::from_tiles(10, 10, 32);
        let mut pool = ProjectilePool::new(2, ProjectileOwner::Player);
        pool.fire(&shot(0.0));
        pool.fire(&ProjectileSpec {
            origin: Vec2::new(315.0, 100.0),
            ..shot(0.0)
        });

        let escaped = pool.step(100.0, &bounds);
        assert_eq!(escaped, 1);
        assert_eq!(pool.active_count(), 1);
        let (_, p) = pool.iter_active().next().unwrap();
        assert!((p.position().x - 160.0).abs() < 1e-3);
    }

    #[test]
    fn test_default_capacities() {
        assert_eq!(ProjectilePool::for_player().capacity(), 60);
        assert_eq!(ProjectilePool::for_enemies().capacity(), 80);
        assert_eq!(ProjectilePool::for_enemies().owner(), ProjectileOwner::Enemy);
    }

    #[test]
    fn test_clear_returns_all_slots() {
        let mut pool = ProjectilePool::new(4, ProjectileOwner::Player);
        for _ in 0..4 {
            pool.fire(&shot(1.0));
        }
        pool.clear();
        assert_eq!(pool.active_count(), 0);
    }
}
