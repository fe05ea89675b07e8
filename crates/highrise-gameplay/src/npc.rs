//! Closed set of NPC variants, dispatched by `match`.

use glam::Vec2;
use highrise_common::{ActorId, Millis};

use crate::actor::{ActorKind, DamageOutcome, Damageable, NpcContext, NpcCore, Updatable};
use crate::boss::Boss;
use crate::innocent::Innocent;
use crate::soldier::Soldier;

/// Any NPC on a floor.
#[derive(Debug, Clone)]
pub enum Npc {
    /// Rank-and-file enemy
    Soldier(Soldier),
    /// Floor boss
    Boss(Boss),
    /// Civilian
    Innocent(Innocent),
}

impl Npc {
    /// Shared NPC state.
    #[must_use]
    pub const fn core(&self) -> &NpcCore {
        match self {
            Self::Soldier(s) => s.core(),
            Self::Boss(b) => b.core(),
            Self::Innocent(i) => i.core(),
        }
    }

    /// Shared NPC state, mutably.
    pub fn core_mut(&mut self) -> &mut NpcCore {
        match self {
            Self::Soldier(s) => s.core_mut(),
            Self::Boss(b) => b.core_mut(),
            Self::Innocent(i) => i.core_mut(),
        }
    }

    /// Kind of NPC.
    #[must_use]
    pub const fn kind(&self) -> ActorKind {
        self.core().kind()
    }

    /// Checks if this NPC fights the player.
    #[must_use]
    pub const fn is_hostile(&self) -> bool {
        self.kind().is_hostile()
    }

    /// Target handle.
    #[must_use]
    pub const fn target(&self) -> Option<ActorId> {
        self.core().target()
    }

    /// Sets or clears the target handle.
    pub fn set_target(&mut self, target: Option<ActorId>) {
        self.core_mut().set_target(target);
    }

    /// Name of the current AI state, for logs and debug overlays.
    #[must_use]
    pub fn state_name(&self) -> String {
        match self {
            Self::Soldier(s) => format!("{:?}", s.state()),
            Self::Boss(b) => format!("{:?}", b.state()),
            Self::Innocent(i) => format!("{:?}", i.state()),
        }
    }

    /// Advances the body by its velocity. Hosts with their own physics skip this.
    pub fn integrate(&mut self, delta: Millis) {
        if self.is_alive() {
            self.core_mut().body.integrate(delta);
        }
    }
}

impl Updatable for Npc {
    fn update(&mut self, ctx: &mut NpcContext<'_>) {
        match self {
            Self::Soldier(s) => s.update(ctx),
            Self::Boss(b) => b.update(ctx),
            Self::Innocent(i) => i.update(ctx),
        }
    }
}

impl Damageable for Npc {
    fn position(&self) -> Vec2 {
        self.core().body.position
    }

    fn is_alive(&self) -> bool {
        self.core().is_alive()
    }

    fn take_damage(&mut self, amount: i32, now: Millis) -> DamageOutcome {
        match self {
            Self::Soldier(s) => s.take_damage(amount, now),
            Self::Boss(b) => b.take_damage(amount, now),
            Self::Innocent(i) => i.take_damage(amount, now),
        }
    }
}

impl From<Soldier> for Npc {
    fn from(value: Soldier) -> Self {
        Self::Soldier(value)
    }
}

impl From<Boss> for Npc {
    fn from(value: Boss) -> Self {
        Self::Boss(value)
    }
}

impl From<Innocent> for Npc {
    fn from(value: Innocent) -> Self {
        Self::Innocent(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventSender;

    #[test]
    fn test_dispatch_by_variant() {
        let events = EventSender::detached();
        let npcs: Vec<Npc> = vec![
            Soldier::new(Vec2::ZERO, 1, events.clone()).into(),
            Boss::new(Vec2::ZERO, 1, events.clone()).into(),
            Innocent::new(Vec2::ZERO, events).into(),
        ];
        let kinds: Vec<ActorKind> = npcs.iter().map(Npc::kind).collect();
        assert_eq!(kinds, vec![ActorKind::Soldier, ActorKind::Boss, ActorKind::Innocent]);
        assert_eq!(npcs.iter().filter(|n| n.is_hostile()).count(), 2);
        assert_eq!(npcs[0].state_name(), "Idle");
    }

    #[test]
    fn test_damage_routes_to_variant_reaction() {
        let mut npc: Npc = Soldier::new(Vec2::ZERO, 1, EventSender::detached()).into();
        npc.take_damage(1, 0.0);
        assert_eq!(npc.state_name(), "Chase");
        assert_eq!(npc.core().stats.health(), 39);
    }

    #[test]
    fn test_dead_npc_does_not_move() {
        let mut npc: Npc = Innocent::new(Vec2::ZERO, EventSender::detached()).into();
        npc.core_mut().body.velocity = Vec2::new(50.0, 0.0);
        npc.take_damage(100, 0.0);
        npc.integrate(1000.0);
        assert_eq!(npc.position(), Vec2::ZERO);
    }
}
