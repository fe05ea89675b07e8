//! Civilians. They wander, panic near the player and never fight back.

use glam::Vec2;
use highrise_common::{angle_between, Millis};
use serde::{Deserialize, Serialize};

use crate::actor::{ActorKind, DamageOutcome, Damageable, NpcContext, NpcCore, StateMachine, Updatable};
use crate::events::EventSender;

/// Distance at which an innocent starts to flee.
pub const PANIC_RANGE: f32 = 250.0;

/// Panic ends beyond `PANIC_RANGE * INNOCENT_CALM_FACTOR`.
pub const INNOCENT_CALM_FACTOR: f32 = 1.5;

/// How often a new wander point is picked.
pub const WANDER_INTERVAL: Millis = 2000.0;

/// Half-width of the box wander points are drawn from.
pub const WANDER_RANGE: i32 = 150;

/// Walking speed while wandering.
pub const WANDER_SPEED: f32 = 40.0;

/// A wander point counts as reached within this distance.
pub const ARRIVE_RADIUS: f32 = 10.0;

/// Running speed while panicking.
pub const FLEE_SPEED: f32 = 110.0;

/// Innocent health.
pub const INNOCENT_HEALTH: i32 = 30;

/// Innocent speed cap.
pub const INNOCENT_SPEED: f32 = 100.0;

/// Innocent behaviour states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InnocentState {
    /// Just spawned
    Idle,
    /// Strolling between random points
    Wander,
    /// Running away from the target
    Panic,
}

/// A civilian.
#[derive(Debug, Clone)]
pub struct Innocent {
    core: NpcCore,
    fsm: StateMachine<InnocentState>,
    wander_target: Option<Vec2>,
    wander_timer: Millis,
}

impl Innocent {
    /// Creates an innocent.
    #[must_use]
    pub fn new(position: Vec2, events: EventSender) -> Self {
        Self {
            core: NpcCore::new(
                ActorKind::Innocent,
                position,
                INNOCENT_HEALTH,
                INNOCENT_SPEED,
                events,
            ),
            fsm: StateMachine::new(InnocentState::Idle),
            wander_target: None,
            wander_timer: 0.0,
        }
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> InnocentState {
        self.fsm.state()
    }

    /// Point currently walked to, if any.
    #[must_use]
    pub const fn wander_target(&self) -> Option<Vec2> {
        self.wander_target
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
    pub fn transition_to(&mut self, state: InnocentState) {
        self.fsm.transition_to(state);
    }

    fn pick_wander_target(&mut self, rng: &mut fastrand::Rng) {
        let dx = rng.i32(-WANDER_RANGE..=WANDER_RANGE) as f32;
        let dy = rng.i32(-WANDER_RANGE..=WANDER_RANGE) as f32;
        self.wander_target = Some(self.core.body.position + Vec2::new(dx, dy));
    }

    fn state_wander(&mut self, ctx: &mut NpcContext<'_>) {
        if let Some(target) = ctx.target {
            if self.core.body.distance_to(target) < PANIC_RANGE {
                self.fsm.transition_to(InnocentState::Panic);
                return;
            }
        }

        self.wander_timer += ctx.delta;
        if self.wander_timer > WANDER_INTERVAL || self.wander_target.is_none() {
            self.wander_timer = 0.0;
            self.pick_wander_target(ctx.rng);
        }

        let Some(point) = self.wander_target else { return };
        if self.core.body.distance_to(point) < ARRIVE_RADIUS {
            self.core.body.stop();
            self.wander_target = None;
        } else {
            self.core.body.move_toward(point, WANDER_SPEED);
            let angle = self.core.body.angle_to(point);
            self.core.body.face(angle);
        }
    }

    fn state_panic(&mut self, ctx: &NpcContext<'_>) {
        let Some(target) = ctx.target else {
            self.fsm.transition_to(InnocentState::Wander);
            return;
        };

        let away = angle_between(target, self.core.body.position);
        self.core.body.move_along(away, FLEE_SPEED);
        self.core.body.face(away);

        if self.core.body.distance_to(target) > PANIC_RANGE * INNOCENT_CALM_FACTOR {
            self.fsm.transition_to(InnocentState::Wander);
        }
    }
}

impl Updatable for Innocent {
    fn update(&mut self, ctx: &mut NpcContext<'_>) {
        if !self.core.is_alive() {
            return;
        }
        self.fsm.advance(ctx.delta);
        match self.fsm.state() {
            InnocentState::Idle => self.fsm.transition_to(InnocentState::Wander),
            InnocentState::Wander => self.state_wander(ctx),
            InnocentState::Panic => self.state_panic(ctx),
        }
    }
}

impl Damageable for Innocent {
    fn position(&self) -> Vec2 {
        self.core.body.position
    }

    fn is_alive(&self) -> bool {
        self.core.is_alive()
    }

    fn take_damage(&mut self, amount: i32, now: Millis) -> DamageOutcome {
        let outcome = self.core.wound(amount, now);
        if outcome == DamageOutcome::Killed {
            self.core.die();
        }
        outcome
    }
}
