//! Floor boss: guards its spawn point, bursts fire when alerted.

use glam::Vec2;
use highrise_common::{Cooldown, Millis};
use serde::{Deserialize, Serialize};

use crate::actor::{
    floors_above_first, ActorKind, DamageOutcome, Damageable, NpcContext, NpcCore, StateMachine, Updatable,
    PERCEPTION_INTERVAL,
};
use crate::events::{EventSender, GameEvent};
use crate::projectile::{ProjectileSpec, ENEMY_POOL_SIZE};

/// Distance at which a guarding boss turns hostile.
pub const ALERT_RANGE: f32 = 400.0;

/// Alert is dropped beyond `ALERT_RANGE * BOSS_CALM_FACTOR`.
pub const BOSS_CALM_FACTOR: f32 = 1.4;

/// Walking speed back to the spawn point.
pub const PATROL_SPEED: f32 = 30.0;

/// The boss stops patrolling once this close to its spawn point.
pub const HOME_RADIUS: f32 = 40.0;

/// Angular gap between burst projectiles, in radians.
pub const BURST_SPREAD: f32 = 0.12;

/// Upper bound on projectiles per burst; the enemy pool holds no more.
pub const MAX_BURST_SIZE: u32 = ENEMY_POOL_SIZE as u32;

/// Boss bullet speed.
pub const BOSS_BULLET_SPEED: f32 = 380.0;

/// Boss base speed.
pub const BOSS_SPEED: f32 = 50.0;

/// Boss behaviour states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BossState {
    /// Just spawned
    Idle,
    /// Holding position near spawn
    Guard,
    /// Shooting at the target
    Alert,
}

/// The one boss on each floor.
#[derive(Debug, Clone)]
pub struct Boss {
    core: NpcCore,
    fsm: StateMachine<BossState>,
    level: u32,
    spawn: Vec2,
    gun: Cooldown,
}

impl Boss {
    /// Creates the boss for floor `level` at its spawn point.
    #[must_use]
    pub fn new(position: Vec2, level: u32, events: EventSender) -> Self {
        let level = level.max(1);
        Self {
            core: NpcCore::new(
                ActorKind::Boss,
                position,
                Self::max_health_for(level),
                BOSS_SPEED,
                events,
            ),
            fsm: StateMachine::new(BossState::Idle),
            level,
            spawn: position,
            gun: Cooldown::new(Self::fire_rate_for(level)),
        }
    }

    /// Health at floor `level`: 100, +80 per floor.
    #[must_use]
    pub const fn max_health_for(level: u32) -> i32 {
        100_i32.saturating_add(floors_above_first(level).saturating_mul(80))
    }

    /// Burst cooldown at floor `level`, floored at 300 ms.
    #[must_use]
    pub fn fire_rate_for(level: u32) -> Millis {
        (900.0 - f64::from(level.saturating_sub(1)) * 100.0).max(300.0)
    }

    /// Projectiles per burst at floor `level`.
    #[must_use]
    pub const fn burst_size_for(level: u32) -> u32 {
        let shots = 1 + level / 2;
        if shots > MAX_BURST_SIZE {
            MAX_BURST_SIZE
        } else {
            shots
        }
    }

    /// Damage per projectile at floor `level`.
    #[must_use]
    pub const fn bullet_damage_for(level: u32) -> i32 {
        let floor = if level > i32::MAX as u32 { i32::MAX } else { level as i32 };
        10_i32.saturating_add(floor.saturating_mul(3))
    }

    /// Angles of one burst aimed at `aim`.
    #[must_use]
    pub fn burst_angles(level: u32, aim: f32) -> Vec<f32> {
        let shots = Self::burst_size_for(level);
        let centre = (shots - 1) as f32 / 2.0;
        (0..shots)
            .map(|i| aim + (i as f32 - centre) * BURST_SPREAD)
            .collect()
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> BossState {
        self.fsm.state()
    }

    /// Floor this boss guards.
    #[must_use]
    pub const fn level(&self) -> u32 {
        self.level
    }

    /// Spawn point it patrols back to.
    #[must_use]
    pub const fn spawn(&self) -> Vec2 {
        self.spawn
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
    pub fn transition_to(&mut self, state: BossState) {
        self.fsm.transition_to(state);
    }

    fn on_hit(&mut self) {
        if matches!(self.fsm.state(), BossState::Idle | BossState::Guard) {
            self.fsm.transition_to(BossState::Alert);
        }
    }

    fn state_guard(&mut self, ctx: &NpcContext<'_>) {
        if !self.fsm.perceive(PERCEPTION_INTERVAL) {
            return;
        }

        if let Some(target) = ctx.target {
            if self.core.body.distance_to(target) < ALERT_RANGE {
                self.fsm.transition_to(BossState::Alert);
                return;
            }
        }

        if self.core.body.distance_to(self.spawn) > HOME_RADIUS {
            self.core.body.move_toward(self.spawn, PATROL_SPEED);
        } else {
            self.core.body.stop();
        }
    }

    fn state_alert(&mut self, ctx: &mut NpcContext<'_>) {
        let Some(target) = ctx.target else { return };

        if self.fsm.perceive(PERCEPTION_INTERVAL)
            && self.core.body.distance_to(target) > ALERT_RANGE * BOSS_CALM_FACTOR
        {
            self.fsm.transition_to(BossState::Guard);
            self.core.body.stop();
            return;
        }

        self.core.body.stop();
        let aim = self.core.body.angle_to(target);
        self.core.body.face(aim);

        if self.gun.try_trigger(ctx.now) {
            self.fire_burst(aim, ctx);
        }
    }

    fn fire_burst(&self, aim: f32, ctx: &mut NpcContext<'_>) {
        let damage = Self::bullet_damage_for(self.level);
        for angle in Self::burst_angles(self.level, aim) {
            ctx.enemy_pool.fire(&ProjectileSpec {
                origin: self.core.body.position,
                angle,
                speed: BOSS_BULLET_SPEED,
                damage,
                splash_radius: 0.0,
            });
        }
    }
}

impl Updatable for Boss {
    fn update(&mut self, ctx: &mut NpcContext<'_>) {
        if !self.core.is_alive() {
            return;
        }
        self.fsm.advance(ctx.delta);
        match self.fsm.state() {
            BossState::Idle => self.fsm.transition_to(BossState::Guard),
            BossState::Guard => self.state_guard(ctx),
            BossState::Alert => self.state_alert(ctx),
        }
    }
}

impl Damageable for Boss {
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
            self.core.emit(GameEvent::BossKilled { level: self.level });
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventBus;
    use crate::projectile::ProjectilePool;

    fn tick(boss: &mut Boss, pool: &mut ProjectilePool, now: Millis, delta: Millis, target: Option<Vec2>) {
        let mut rng = fastrand::Rng::with_seed(1);
        let mut ctx = NpcContext {
            now,
            delta,
            target,
            enemy_pool: pool,
            rng: &mut rng,
        };
        boss.update(&mut ctx);
    }

    #[test]
    fn test_level_scaling() {
        assert_eq!(Boss::max_health_for(1), 100);
        assert_eq!(Boss::max_health_for(4), 340);
        assert!((Boss::fire_rate_for(1) - 900.0).abs() < f64::EPSILON);
        assert!((Boss::fire_rate_for(5) - 500.0).abs() < f64::EPSILON);
        assert!((Boss::fire_rate_for(12) - 300.0).abs() < f64::EPSILON);
        assert_eq!(Boss::burst_size_for(1), 1);
        assert_eq!(Boss::burst_size_for(5), 3);
        assert_eq!(Boss::bullet_damage_for(2), 16);
    }

    #[test]
    fn test_extreme_floor_saturates() {
        assert_eq!(Boss::max_health_for(u32::MAX), i32::MAX);
        assert_eq!(Boss::bullet_damage_for(u32::MAX), i32::MAX);
        assert_eq!(Boss::burst_size_for(u32::MAX), MAX_BURST_SIZE);
        assert_eq!(Boss::burst_angles(u32::MAX, 0.0).len(), MAX_BURST_SIZE as usize);
    }

    #[test]
    fn test_level_three_burst_is_symmetric_pair() {
        let angles = Boss::burst_angles(3, 0.0);
        assert_eq!(angles.len(), 2);
        assert!((angles[0] + 0.06).abs() < 1e-6);
        assert!((angles[1] - 0.06).abs() < 1e-6);
    }

    #[test]
    fn test_idle_goes_straight_to_guard() {
        let mut pool = ProjectilePool::for_enemies();
        let mut boss = Boss::new(Vec2::ZERO, 1, EventSender::detached());
        tick(&mut boss, &mut pool, 16.0, 16.0, None);
        assert_eq!(boss.state(), BossState::Guard);
    }

    #[test]
    fn test_guard_alerts_and_fires_burst() {
        let mut pool = ProjectilePool::for_enemies();
        let mut boss = Boss::new(Vec2::ZERO, 3, EventSender::detached());
        let target = Some(Vec2::new(300.0, 0.0));

        boss.transition_to(BossState::Guard);
        tick(&mut boss, &mut pool, 150.0, 150.0, target);
        assert_eq!(boss.state(), BossState::Alert);

        tick(&mut boss, &mut pool, 166.0, 16.0, target);
        assert_eq!(pool.active_count(), 2);
        let mut angles: Vec<f32> = pool.iter_active().map(|(_, p)| p.angle()).collect();
        angles.sort_by(f32::total_cmp);
        assert!((angles[0] + 0.06).abs() < 1e-5);
        assert!((angles[1] - 0.06).abs() < 1e-5);
        assert!(pool.iter_active().all(|(_, p)| p.damage() == 19));

        // 700 ms cooldown at level 3
        tick(&mut boss, &mut pool, 500.0, 16.0, target);
        assert_eq!(pool.active_count(), 2);
        tick(&mut boss, &mut pool, 866.0, 16.0, target);
        assert_eq!(pool.active_count(), 4);
    }

    #[test]
    fn test_guard_walks_home() {
        let mut pool = ProjectilePool::for_enemies();
        let mut boss = Boss::new(Vec2::ZERO, 1, EventSender::detached());
        boss.transition_to(BossState::Guard);
        boss.core_mut().body.position = Vec2::new(100.0, 0.0);

        tick(&mut boss, &mut pool, 150.0, 150.0, Some(Vec2::new(1000.0, 0.0)));
        assert_eq!(boss.state(), BossState::Guard);
        assert!((boss.core().body.velocity.x + PATROL_SPEED).abs() < 1e-4);

        boss.core_mut().body.position = Vec2::new(30.0, 0.0);
        tick(&mut boss, &mut pool, 300.0, 150.0, Some(Vec2::new(1000.0, 0.0)));
        assert!(!boss.core().is_moving());
    }

    #[test]
    fn test_alert_calms_down_far_away() {
        let mut pool = ProjectilePool::for_enemies();
        let mut boss = Boss::new(Vec2::ZERO, 1, EventSender::detached());
        boss.transition_to(BossState::Alert);

        // 500 is inside the calm band (560)
        tick(&mut boss, &mut pool, 150.0, 150.0, Some(Vec2::new(500.0, 0.0)));
        assert_eq!(boss.state(), BossState::Alert);

        tick(&mut boss, &mut pool, 300.0, 150.0, Some(Vec2::new(600.0, 0.0)));
        assert_eq!(boss.state(), BossState::Guard);
    }

    #[test]
    fn test_hit_while_guarding_alerts() {
        let mut boss = Boss::new(Vec2::ZERO, 1, EventSender::detached());
        boss.transition_to(BossState::Guard);
        boss.take_damage(10, 0.0);
        assert_eq!(boss.state(), BossState::Alert);
    }

    #[test]
    fn test_death_emits_kill_and_boss_events() {
        let bus = EventBus::new(8);
        let mut boss = Boss::new(Vec2::new(64.0, 64.0), 2, bus.sender());
        assert_eq!(boss.take_damage(1000, 0.0), DamageOutcome::Killed);
        assert_eq!(boss.take_damage(1000, 5.0), DamageOutcome::Ignored);

        let events = bus.drain();
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], GameEvent::EnemyKilled { kind: ActorKind::Boss, .. }));
        assert_eq!(events[1], GameEvent::BossKilled { level: 2 });
    }
}
