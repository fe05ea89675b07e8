//! Shared actor building blocks.
//!
//! There is no base class. Actors compose:
//! - [`CombatStats`]: health, max health and the terminal dead flag
//! - [`Body`]: position, velocity, facing and speed cap
//! - [`StateMachine`]: current state plus the perception timer
//!
//! and implement [`Damageable`] (everyone) and [`Updatable`] (NPCs).

use glam::Vec2;
use highrise_common::{angle_between, ActorId, Millis};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::events::{EventSender, GameEvent};
use crate::projectile::ProjectilePool;

/// Minimum time between NPC perception checks.
pub const PERCEPTION_INTERVAL: Millis = 150.0;

/// How long an NPC health bar stays visible after a hit.
pub const HEALTH_BAR_VISIBLE_MS: Millis = 2000.0;

/// Speed above which an NPC counts as walking for animation.
pub const NPC_MOVING_THRESHOLD: f32 = 10.0;

/// Floors above the first, saturated to `i32` for per-floor stat scaling.
#[must_use]
pub const fn floors_above_first(level: u32) -> i32 {
    let floors = level.saturating_sub(1);
    if floors > i32::MAX as u32 {
        i32::MAX
    } else {
        floors as i32
    }
}

/// Kind of actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActorKind {
    /// The player
    Player,
    /// Regular enemy
    Soldier,
    /// Floor boss
    Boss,
    /// Civilian, must not be harmed
    Innocent,
}

impl ActorKind {
    /// Collision radius used by the built-in overlap checks.
    #[must_use]
    pub const fn hit_radius(self) -> f32 {
        match self {
            Self::Player => 14.0,
            Self::Soldier | Self::Innocent => 13.0,
            // Boss sprite is drawn at 1.3x scale
            Self::Boss => 17.0,
        }
    }

    /// Checks if the kind fights the player.
    #[must_use]
    pub const fn is_hostile(self) -> bool {
        matches!(self, Self::Soldier | Self::Boss)
    }

    /// Get display name.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Player => "player",
            Self::Soldier => "soldier",
            Self::Boss => "boss",
            Self::Innocent => "innocent",
        }
    }
}

// ============================================================================
// Combat Stats
// ============================================================================

/// Result of applying damage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageOutcome {
    /// Already dead or otherwise immune; nothing changed
    Ignored,
    /// Health dropped, still alive
    Wounded,
    /// This hit was fatal
    Killed,
}

impl DamageOutcome {
    /// Checks if the hit landed.
    #[must_use]
    pub const fn landed(self) -> bool {
        !matches!(self, Self::Ignored)
    }
}

/// Health component shared by every actor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatStats {
    health: i32,
    max_health: i32,
    dead: bool,
}

impl CombatStats {
    /// Creates full-health stats.
    #[must_use]
    pub const fn new(max_health: i32) -> Self {
        Self {
            health: max_health,
            max_health,
            dead: false,
        }
    }

    /// Current health, always within `[0, max_health]`.
    #[must_use]
    pub const fn health(&self) -> i32 {
        self.health
    }

    /// Maximum health.
    #[must_use]
    pub const fn max_health(&self) -> i32 {
        self.max_health
    }

    /// Checks the terminal dead flag.
    #[must_use]
    pub const fn is_dead(&self) -> bool {
        self.dead
    }

    /// Deducts health. Reports [`DamageOutcome::Killed`] exactly once.
    pub fn apply_damage(&mut self, amount: i32) -> DamageOutcome {
        if self.dead {
            return DamageOutcome::Ignored;
        }
        self.health = (self.health - amount.max(0)).max(0);
        if self.health == 0 {
            self.dead = true;
            DamageOutcome::Killed
        } else {
            DamageOutcome::Wounded
        }
    }

    /// Restores health up to max. Does nothing for the dead.
    pub fn heal(&mut self, amount: i32) {
        if !self.dead {
            self.health = (self.health + amount.max(0)).min(self.max_health);
        }
    }

    /// Brings a dead actor back at `health` (clamped to max).
    pub fn revive(&mut self, health: i32) {
        self.health = health.clamp(1, self.max_health);
        self.dead = false;
    }

    /// Overwrites health directly, e.g. when restoring a snapshot.
    pub fn set_health(&mut self, health: i32) {
        self.health = health.clamp(0, self.max_health);
        self.dead = self.health == 0;
    }
}

// ============================================================================
// Body
// ============================================================================

/// Kinematic state. Velocity is a request; the physics layer resolves it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Body {
    /// World position
    pub position: Vec2,
    /// Requested velocity in units per second
    pub velocity: Vec2,
    /// Facing in radians
    pub facing: f32,
    /// Speed cap in units per second
    pub speed: f32,
}

impl Body {
    /// Creates a stationary body.
    #[must_use]
    pub const fn new(position: Vec2, speed: f32) -> Self {
        Self {
            position,
            velocity: Vec2::ZERO,
            facing: 0.0,
            speed,
        }
    }

    /// Distance to a point.
    #[must_use]
    pub fn distance_to(&self, point: Vec2) -> f32 {
        self.position.distance(point)
    }

    /// Angle toward a point.
    #[must_use]
    pub fn angle_to(&self, point: Vec2) -> f32 {
        angle_between(self.position, point)
    }

    /// Heads straight for `point` at `speed`.
    pub fn move_toward(&mut self, point: Vec2, speed: f32) {
        self.velocity = (point - self.position).normalize_or_zero() * speed;
    }

    /// Moves along `angle` at `speed`.
    pub fn move_along(&mut self, angle: f32, speed: f32) {
        self.velocity = Vec2::from_angle(angle) * speed;
    }

    /// Stops moving.
    pub fn stop(&mut self) {
        self.velocity = Vec2::ZERO;
    }

    /// Turns to face an angle.
    pub fn face(&mut self, angle: f32) {
        self.facing = angle;
    }

    /// Checks if the body moves faster than `threshold`.
    #[must_use]
    pub fn is_moving(&self, threshold: f32) -> bool {
        self.velocity.length() > threshold
    }

    /// Advances position by the velocity. Stand-in for a physics step.
    pub fn integrate(&mut self, delta: Millis) {
        self.position += self.velocity * (delta / 1000.0) as f32;
    }
}

// ============================================================================
// State Machine
// ============================================================================

/// Current AI state plus the time spent since the last perception check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateMachine<S> {
    state: S,
    timer: Millis,
}

impl<S: Copy + PartialEq + std::fmt::Debug> StateMachine<S> {
    /// Starts in `initial` with a zeroed timer.
    #[must_use]
    pub const fn new(initial: S) -> Self {
        Self {
            state: initial,
            timer: 0.0,
        }
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> S {
        self.state
    }

    /// Milliseconds since the last transition or perception check.
    #[must_use]
    pub const fn timer(&self) -> Millis {
        self.timer
    }

    /// Accumulates frame time.
    pub fn advance(&mut self, delta: Millis) {
        self.timer += delta;
    }

    /// Switches state and resets the timer.
    pub fn transition_to(&mut self, next: S) {
        if next != self.state {
            debug!("{:?} -> {:?}", self.state, next);
        }
        self.state = next;
        self.timer = 0.0;
    }

    /// Consumes a perception tick if `interval` has elapsed.
    ///
    /// Returns true (and resets the timer) when the actor may re-evaluate.
    pub fn perceive(&mut self, interval: Millis) -> bool {
        if self.timer >= interval {
            self.timer = 0.0;
            true
        } else {
            false
        }
    }
}

// ============================================================================
// Behaviour Traits
// ============================================================================

/// Anything that can be hurt.
pub trait Damageable {
    /// Current position.
    fn position(&self) -> Vec2;

    /// Checks if the actor can still take hits.
    fn is_alive(&self) -> bool;

    /// Applies damage at scene time `now`.
    fn take_damage(&mut self, amount: i32, now: Millis) -> DamageOutcome;
}

/// Per-tick inputs an NPC sees.
pub struct NpcContext<'a> {
    /// Scene time
    pub now: Millis,
    /// Time since the previous tick
    pub delta: Millis,
    /// Resolved position of the NPC's target, if it has a live one
    pub target: Option<Vec2>,
    /// Shared enemy projectile pool
    pub enemy_pool: &'a mut ProjectilePool,
    /// Session RNG
    pub rng: &'a mut fastrand::Rng,
}

/// Anything driven by the per-frame update.
pub trait Updatable {
    /// Runs one tick. A no-op once the actor is dead.
    fn update(&mut self, ctx: &mut NpcContext<'_>);
}

// ============================================================================
// NPC Core
// ============================================================================

/// State every NPC variant carries.
#[derive(Debug, Clone)]
pub struct NpcCore {
    kind: ActorKind,
    /// Health component
    pub stats: CombatStats,
    /// Kinematics
    pub body: Body,
    target: Option<ActorId>,
    last_hit_at: Option<Millis>,
    events: EventSender,
}

impl NpcCore {
    /// Creates a live NPC core.
    #[must_use]
    pub fn new(kind: ActorKind, position: Vec2, max_health: i32, speed: f32, events: EventSender) -> Self {
        Self {
            kind,
            stats: CombatStats::new(max_health),
            body: Body::new(position, speed),
            target: None,
            last_hit_at: None,
            events,
        }
    }

    /// Kind of NPC.
    #[must_use]
    pub const fn kind(&self) -> ActorKind {
        self.kind
    }

    /// Checks if alive.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        !self.stats.is_dead()
    }

    /// Target handle.
    #[must_use]
    pub const fn target(&self) -> Option<ActorId> {
        self.target
    }

    /// Sets or clears the target handle.
    pub fn set_target(&mut self, target: Option<ActorId>) {
        self.target = target;
    }

    /// Checks if the health bar should be drawn at `now`.
    #[must_use]
    pub fn health_bar_visible(&self, now: Millis) -> bool {
        self.is_alive() && self.last_hit_at.is_some_and(|t| now - t < HEALTH_BAR_VISIBLE_MS)
    }

    /// Checks if the walk animation should play.
    #[must_use]
    pub fn is_moving(&self) -> bool {
        self.is_alive() && self.body.is_moving(NPC_MOVING_THRESHOLD)
    }

    /// Deducts health and records the hit. Does not run death handling.
    pub fn wound(&mut self, amount: i32, now: Millis) -> DamageOutcome {
        let outcome = self.stats.apply_damage(amount);
        if outcome.landed() {
            self.last_hit_at = Some(now);
        }
        outcome
    }

    /// Death handling: freezes the body and announces the kill.
    pub fn die(&mut self) {
        self.body.stop();
        debug!(
            "{} died at ({:.0}, {:.0})",
            self.kind.display_name(),
            self.body.position.x,
            self.body.position.y
        );
        self.events.emit(GameEvent::EnemyKilled {
            kind: self.kind,
            position: self.body.position,
        });
    }

    /// Publishes an event through this NPC's sender.
    pub fn emit(&self, event: GameEvent) {
        self.events.emit(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventBus;
    use proptest::prelude::*;

    #[derive(Debug, Clone, Copy, PartialEq)]
    enum Toy {
        A,
        B,
    }

    #[test]
    fn test_stats_kill_once() {
        let mut stats = CombatStats::new(20);
        assert_eq!(stats.apply_damage(15), DamageOutcome::Wounded);
        assert_eq!(stats.apply_damage(15), DamageOutcome::Killed);
        assert_eq!(stats.health(), 0);
        assert_eq!(stats.apply_damage(15), DamageOutcome::Ignored);
        assert!(stats.is_dead());
    }

    #[test]
    fn test_heal_caps_and_skips_dead() {
        let mut stats = CombatStats::new(100);
        stats.apply_damage(40);
        stats.heal(25);
        assert_eq!(stats.health(), 85);
        stats.heal(100);
        assert_eq!(stats.health(), 100);

        stats.apply_damage(500);
        stats.heal(10);
        assert_eq!(stats.health(), 0);
        stats.revive(100);
        assert!(!stats.is_dead());
        assert_eq!(stats.health(), 100);
    }

    #[test]
    fn test_state_machine_perception_gate() {
        let mut fsm = StateMachine::new(Toy::A);
        fsm.advance(100.0);
        assert!(!fsm.perceive(PERCEPTION_INTERVAL));
        fsm.advance(50.0);
        assert!(fsm.perceive(PERCEPTION_INTERVAL));
        assert!(fsm.timer().abs() < f64::EPSILON);

        fsm.advance(80.0);
        fsm.transition_to(Toy::B);
        assert_eq!(fsm.state(), Toy::B);
        assert!(fsm.timer().abs() < f64::EPSILON);
    }

    #[test]
    fn test_body_move_toward() {
        let mut body = Body::new(Vec2::ZERO, 100.0);
        body.move_toward(Vec2::new(0.0, 50.0), 70.0);
        assert!((body.velocity.y - 70.0).abs() < 1e-4);
        body.integrate(1000.0);
        assert!((body.position.y - 70.0).abs() < 1e-3);
        assert!(body.is_moving(10.0));
        body.stop();
        assert!(!body.is_moving(10.0));
    }

    #[test]
    fn test_core_death_event() {
        let bus = EventBus::new(4);
        let mut core = NpcCore::new(ActorKind::Soldier, Vec2::new(5.0, 6.0), 10, 70.0, bus.sender());
        assert_eq!(core.wound(10, 0.0), DamageOutcome::Killed);
        core.die();
        assert!(!core.is_alive());
        assert_eq!(
            bus.drain(),
            vec![GameEvent::EnemyKilled {
                kind: ActorKind::Soldier,
                position: Vec2::new(5.0, 6.0),
            }]
        );
    }

    #[test]
    fn test_health_bar_window() {
        let mut core = NpcCore::new(ActorKind::Innocent, Vec2::ZERO, 30, 100.0, EventSender::detached());
        assert!(!core.health_bar_visible(0.0));
        core.wound(5, 1000.0);
        assert!(core.health_bar_visible(2999.0));
        assert!(!core.health_bar_visible(3000.0));
    }

    proptest! {
        #[test]
        fn health_never_increases_under_damage(hits in proptest::collection::vec(0i32..60, 1..30)) {
            let mut stats = CombatStats::new(100);
            let mut kills = 0;
            let mut last = stats.health();
            for h in hits {
                if stats.apply_damage(h) == DamageOutcome::Killed {
                    kills += 1;
                }
                prop_assert!(stats.health() <= last);
                prop_assert!(stats.health() >= 0);
                last = stats.health();
            }
            prop_assert!(kills <= 1);
            prop_assert_eq!(kills == 1, stats.is_dead());
        }
    }
}
