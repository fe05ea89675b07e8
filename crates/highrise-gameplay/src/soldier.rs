//! Soldier AI: idle, chase, attack.
//!
//! Leaving a state uses a wider distance than entering it (1.3x detect range to
//! give up, 1.2x attack range to resume chasing), so a soldier sitting exactly
//! on a threshold does not flap between states.

use glam::Vec2;
use highrise_common::{Cooldown, Millis};
use serde::{Deserialize, Serialize};

use crate::actor::{
    floors_above_first, ActorKind, DamageOutcome, Damageable, NpcContext, NpcCore, StateMachine, Updatable,
    PERCEPTION_INTERVAL,
};
use crate::events::EventSender;
use crate::projectile::ProjectileSpec;

/// Distance at which an idle soldier notices its target.
pub const DETECT_RANGE: f32 = 320.0;

/// Distance at which a chasing soldier stops and shoots.
pub const ATTACK_RANGE: f32 = 220.0;

/// Chase is abandoned beyond `DETECT_RANGE * GIVE_UP_FACTOR`.
pub const GIVE_UP_FACTOR: f32 = 1.3;

/// Attack resumes chasing beyond `ATTACK_RANGE * REENGAGE_FACTOR`.
pub const REENGAGE_FACTOR: f32 = 1.2;

/// Soldiers fire on a fixed cadence regardless of weapon table.
pub const SOLDIER_FIRE_RATE: Millis = 800.0;

/// Enemy bullet speed.
pub const SOLDIER_BULLET_SPEED: f32 = 350.0;

/// Enemy bullet damage.
pub const SOLDIER_BULLET_DAMAGE: i32 = 8;

/// Soldier behaviour states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SoldierState {
    /// Standing, scanning for the target
    Idle,
    /// Running at the target
    Chase,
    /// Standing and shooting
    Attack,
}

/// Rank-and-file enemy.
#[derive(Debug, Clone)]
pub struct Soldier {
    core: NpcCore,
    fsm: StateMachine<SoldierState>,
    level: u32,
    gun: Cooldown,
}

impl Soldier {
    /// Creates a soldier scaled for floor `level`.
    #[must_use]
    pub fn new(position: Vec2, level: u32, events: EventSender) -> Self {
        let level = level.max(1);
        Self {
            core: NpcCore::new(
                ActorKind::Soldier,
                position,
                Self::max_health_for(level),
                Self::speed_for(level),
                events,
            ),
            fsm: StateMachine::new(SoldierState::Idle),
            level,
            gun: Cooldown::new(SOLDIER_FIRE_RATE),
        }
    }

    /// Health at floor `level`: 40, +15 per floor.
    #[must_use]
    pub const fn max_health_for(level: u32) -> i32 {
        40_i32.saturating_add(floors_above_first(level).saturating_mul(15))
    }

    /// Speed at floor `level`: 70 + 5 per floor.
    #[must_use]
    pub fn speed_for(level: u32) -> f32 {
        70.0 + level as f32 * 5.0
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> SoldierState {
        self.fsm.state()
    }

    /// Floor this soldier was scaled for.
    #[must_use]
    pub const fn level(&self) -> u32 {
        self.level
    }

    /// Shared NPC state.
    #[must_use]
    pub const fn core(&self) -> &NpcCore {
        &self.core
    }

    /// Shared NPC state, mutably.
    pub fn core_mut(&mut self) -> &mut NpcCore {
        &mut self.core
    }

    /// Forces a state change.
    pub fn transition_to(&mut self, state: SoldierState) {
        self.fsm.transition_to(state);
    }

    fn on_hit(&mut self) {
        if self.fsm.state() == SoldierState::Idle {
            self.fsm.transition_to(SoldierState::Chase);
        }
    }

    fn state_idle(&mut self, ctx: &NpcContext<'_>) {
        if !self.fsm.perceive(PERCEPTION_INTERVAL) {
            return;
        }
        if let Some(target) = ctx.target {
            if self.core.body.distance_to(target) < DETECT_RANGE {
                self.fsm.transition_to(SoldierState::Chase);
            }
        }
    }

    fn state_chase(&mut self, ctx: &NpcContext<'_>) {
        let Some(target) = ctx.target else { return };
        let dist = self.core.body.distance_to(target);

        if self.fsm.perceive(PERCEPTION_INTERVAL) {
            if dist > DETECT_RANGE * GIVE_UP_FACTOR {
                self.fsm.transition_to(SoldierState::Idle);
                self.core.body.stop();
                return;
            }
            if dist < ATTACK_RANGE {
                self.fsm.transition_to(SoldierState::Attack);
                self.core.body.stop();
                return;
            }
        }

        let speed = self.core.body.speed;
        self.core.body.move_toward(target, speed);
        let angle = self.core.body.angle_to(target);
        self.core.body.face(angle);
    }

    fn state_attack(&mut self, ctx: &mut NpcContext<'_>) {
        let Some(target) = ctx.target else { return };
        let dist = self.core.body.distance_to(target);

        if self.fsm.perceive(PERCEPTION_INTERVAL) && dist > ATTACK_RANGE * REENGAGE_FACTOR {
            self.fsm.transition_to(SoldierState::Chase);
            return;
        }

        self.core.body.stop();
        let angle = self.core.body.angle_to(target);
        self.core.body.face(angle);
        self.try_fire(angle, ctx);
    }

    fn try_fire(&mut self, angle: f32, ctx: &mut NpcContext<'_>) {
        if !self.gun.try_trigger(ctx.now) {
            return;
        }
        ctx.enemy_pool.fire(&ProjectileSpec {
            origin: self.core.body.position,
            angle,
            speed: SOLDIER_BULLET_SPEED,
            damage: SOLDIER_BULLET_DAMAGE,
            splash_radius: 0.0,
        });
    }
}

impl Updatable for Soldier {
    fn update(&mut self, ctx: &mut NpcContext<'_>) {
        if !self.core.is_alive() {
            return;
        }
        self.fsm.advance(ctx.delta);
        match self.fsm.state() {
            SoldierState::Idle => self.state_idle(ctx),
            SoldierState::Chase => self.state_chase(ctx),
            SoldierState::Attack => self.state_attack(ctx),
        }
    }
}

impl Damageable for Soldier {
    fn position(&self) -> Vec2 {
        self.core.body.position
    }

    fn is_alive(&self) -> bool {
        self.core.is_alive()
    }

    fn take_damage(&mut self, amount: i32, now: Millis) -> DamageOutcome {
        let outcome = self.core.wound(amount, now);
        if !outcome.landed() {
            return outcome;
        }
        self.on_hit();
        if outcome == DamageOutcome::Killed {
            self.core.die();
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{EventBus, GameEvent};
    use crate::projectile::ProjectilePool;

    struct Harness {
        pool: ProjectilePool,
        rng: fastrand::Rng,
        now: Millis,
    }

    impl Harness {
        fn new() -> Self {
            Self {
                pool: ProjectilePool::for_enemies(),
                rng: fastrand::Rng::with_seed(7),
                now: 0.0,
            }
        }

        fn tick(&mut self, soldier: &mut Soldier, target: Option<Vec2>, delta: Millis) {
            self.now += delta;
            let mut ctx = NpcContext {
                now: self.now,
                delta,
                target,
                enemy_pool: &mut self.pool,
                rng: &mut self.rng,
            };
            soldier.update(&mut ctx);
        }
    }

    fn soldier() -> Soldier {
        Soldier::new(Vec2::ZERO, 1, EventSender::detached())
    }

    #[test]
    fn test_level_scaling() {
        assert_eq!(Soldier::max_health_for(1), 40);
        assert_eq!(Soldier::max_health_for(3), 70);
        assert!((Soldier::speed_for(2) - 80.0).abs() < f32::EPSILON);
        assert_eq!(Soldier::max_health_for(u32::MAX), i32::MAX);
    }

    #[test]
    fn test_idle_waits_for_perception_interval() {
        let mut h = Harness::new();
        let mut s = soldier();
        let target = Some(Vec2::new(300.0, 0.0));

        h.tick(&mut s, target, 100.0);
        assert_eq!(s.state(), SoldierState::Idle);
        h.tick(&mut s, target, 50.0);
        assert_eq!(s.state(), SoldierState::Chase);
    }

    #[test]
    fn test_idle_ignores_target_beyond_detect_range() {
        let mut h = Harness::new();
        let mut s = soldier();
        h.tick(&mut s, Some(Vec2::new(350.0, 0.0)), 200.0);
        assert_eq!(s.state(), SoldierState::Idle);
    }

    #[test]
    fn test_detect_range_edges_after_one_interval() {
        let mut h = Harness::new();
        let mut idle = soldier();
        h.tick(&mut idle, Some(Vec2::new(350.0, 0.0)), PERCEPTION_INTERVAL);
        assert_eq!(idle.state(), SoldierState::Idle);

        let mut chasing = soldier();
        chasing.transition_to(SoldierState::Chase);
        h.tick(&mut chasing, Some(Vec2::new(500.0, 0.0)), PERCEPTION_INTERVAL);
        assert_eq!(chasing.state(), SoldierState::Idle);
    }

    #[test]
    fn test_chase_holds_inside_hysteresis_band() {
        let mut h = Harness::new();
        let mut s = soldier();
        s.transition_to(SoldierState::Chase);

        // 350 is past the detect range but inside the give-up band (416)
        h.tick(&mut s, Some(Vec2::new(350.0, 0.0)), 200.0);
        assert_eq!(s.state(), SoldierState::Chase);
        assert!(s.core().is_moving());
    }

    #[test]
    fn test_chase_gives_up_far_away() {
        let mut h = Harness::new();
        let mut s = soldier();
        s.transition_to(SoldierState::Chase);

        h.tick(&mut s, Some(Vec2::new(500.0, 0.0)), 200.0);
        assert_eq!(s.state(), SoldierState::Idle);
        assert!(!s.core().is_moving());
    }

    #[test]
    fn test_chase_moves_toward_target_and_faces_it() {
        let mut h = Harness::new();
        let mut s = soldier();
        s.transition_to(SoldierState::Chase);

        h.tick(&mut s, Some(Vec2::new(0.0, 300.0)), 16.0);
        let v = s.core().body.velocity;
        assert!(v.x.abs() < 1e-3);
        assert!((v.y - 75.0).abs() < 1e-3);
        assert!((s.core().body.facing - std::f32::consts::FRAC_PI_2).abs() < 1e-5);
    }

    #[test]
    fn test_attack_fires_on_fixed_cadence() {
        let mut h = Harness::new();
        let mut s = soldier();
        s.transition_to(SoldierState::Chase);
        let target = Some(Vec2::new(100.0, 0.0));

        h.tick(&mut s, target, 150.0);
        assert_eq!(s.state(), SoldierState::Attack);

        h.tick(&mut s, target, 16.0);
        assert_eq!(h.pool.active_count(), 1);
        h.tick(&mut s, target, 16.0);
        assert_eq!(h.pool.active_count(), 1);
        h.tick(&mut s, target, 800.0);
        assert_eq!(h.pool.active_count(), 2);

        let (_, bullet) = h.pool.iter_active().next().unwrap();
        assert_eq!(bullet.damage(), SOLDIER_BULLET_DAMAGE);
        assert!(bullet.is_enemy_owned());
    }

    #[test]
    fn test_attack_resumes_chase_when_target_backs_off() {
        let mut h = Harness::new();
        let mut s = soldier();
        s.transition_to(SoldierState::Attack);

        // 250 is inside the re-engage band (264), keep shooting
        h.tick(&mut s, Some(Vec2::new(250.0, 0.0)), 200.0);
        assert_eq!(s.state(), SoldierState::Attack);

        h.tick(&mut s, Some(Vec2::new(300.0, 0.0)), 200.0);
        assert_eq!(s.state(), SoldierState::Chase);
    }

    #[test]
    fn test_no_target_is_a_no_op() {
        let mut h = Harness::new();
        let mut s = soldier();
        s.transition_to(SoldierState::Attack);
        h.tick(&mut s, None, 1000.0);
        assert_eq!(s.state(), SoldierState::Attack);
        assert_eq!(h.pool.active_count(), 0);
    }

    #[test]
    fn test_hit_while_idle_forces_chase() {
        let mut s = soldier();
        assert_eq!(s.take_damage(5, 0.0), DamageOutcome::Wounded);
        assert_eq!(s.state(), SoldierState::Chase);
    }

    #[test]
    fn test_death_is_reported_once_and_stops_updates() {
        let bus = EventBus::new(8);
        let mut s = Soldier::new(Vec2::new(10.0, 20.0), 1, bus.sender());
        let mut h = Harness::new();

        assert_eq!(s.take_damage(100, 0.0), DamageOutcome::Killed);
        assert_eq!(s.take_damage(100, 1.0), DamageOutcome::Ignored);
        assert_eq!(s.core().stats.health(), 0);

        let kills = bus
            .drain()
            .into_iter()
            .filter(|e| matches!(e, GameEvent::EnemyKilled { .. }))
            .count();
        assert_eq!(kills, 1);

        s.transition_to(SoldierState::Attack);
        h.tick(&mut s, Some(Vec2::new(50.0, 20.0)), 1000.0);
        assert_eq!(h.pool.active_count(), 0);
    }
}
