//! One floor of play.
//!
//! A [`FloorSession`] owns everything that lives on a floor: the player, the
//! NPC registry, both projectile pools, pickups and the elevator. The host
//! calls [`FloorSession::tick`] once per frame with the player's input and
//! drains the event bus afterwards.
//!
//! Tick order:
//! 1. pending respawn / game over timers
//! 2. player movement, aim, fire and melee
//! 3. NPC updates against their resolved targets
//! 4. projectile integration and world-bounds culling
//! 5. overlaps: player shots vs NPCs, enemy shots vs player, pickups
//! 6. boss death unlocks the elevator; interacting near it ends the floor
//! 7. player death schedules a respawn or the end of the run

use glam::Vec2;
use highrise_common::{ActorId, Millis, WorldBounds};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::actor::{ActorKind, Damageable, NpcContext, Updatable};
use crate::boss::Boss;
use crate::combat::{circles_overlap, Blast, MeleeSwing};
use crate::config::GameplayConfig;
use crate::events::{EventSender, GameEvent};
use crate::innocent::Innocent;
use crate::input::PlayerInput;
use crate::level::LevelData;
use crate::npc::Npc;
use crate::pickup::{Pickup, PICKUP_RADIUS};
use crate::player::{Player, PlayerSnapshot};
use crate::projectile::{ProjectileOwner, ProjectilePool};
use crate::registry::ActorRegistry;
use crate::soldier::Soldier;

/// Collision radius of every projectile.
pub const PROJECTILE_RADIUS: f32 = 4.0;

/// Message shown when the player shoots a civilian.
pub const INNOCENT_HURT_MESSAGE: &str = "Innocent hurt! Watch out!";

/// Where the floor is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SessionPhase {
    /// Normal play
    Playing,
    /// Player is dead and comes back at `at`
    Respawning {
        /// Respawn time
        at: Millis,
    },
    /// Player is out of lives; the run ends at `at`
    GameOverPending {
        /// Game over time
        at: Millis,
    },
    /// The run is over
    GameOver,
    /// The player took the elevator
    LevelComplete,
}

impl SessionPhase {
    /// Checks if the floor no longer accepts ticks.
    #[must_use]
    pub const fn is_finished(self) -> bool {
        matches!(self, Self::GameOver | Self::LevelComplete)
    }
}

/// The exit. Locked until the boss dies.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Elevator {
    /// World position
    pub position: Vec2,
    /// Whether the boss is dead
    pub unlocked: bool,
}

/// State of one floor.
#[derive(Debug)]
pub struct FloorSession {
    config: GameplayConfig,
    level: u32,
    bounds: WorldBounds,
    cull_bounds: WorldBounds,
    player_start: Vec2,
    player: Player,
    npcs: ActorRegistry,
    boss: ActorId,
    player_pool: ProjectilePool,
    enemy_pool: ProjectilePool,
    pickups: Vec<Pickup>,
    elevator: Elevator,
    phase: SessionPhase,
    rng: fastrand::Rng,
    events: EventSender,
    now: Millis,
}

impl FloorSession {
    /// Builds a floor with a fresh player.
    #[must_use]
    pub fn new(level: &LevelData, config: &GameplayConfig, events: EventSender) -> Self {
        Self::build(level, config, None, events)
    }

    /// Builds a floor, carrying the player over from the previous one.
    #[must_use]
    pub fn with_player(
        level: &LevelData,
        config: &GameplayConfig,
        snapshot: &PlayerSnapshot,
        events: EventSender,
    ) -> Self {
        Self::build(level, config, Some(snapshot), events)
    }

    fn build(
        level: &LevelData,
        config: &GameplayConfig,
        snapshot: Option<&PlayerSnapshot>,
        events: EventSender,
    ) -> Self {
        let floor = level.id.max(1);
        let bounds = level.world_bounds();
        let player_start = level.to_world(level.player_start);

        let player = match snapshot {
            Some(s) => Player::restore(player_start, s, config.player_config(), events.clone()),
            None => Player::with_config(player_start, config.player_config(), events.clone()),
        };

        let mut npcs = ActorRegistry::with_capacity(level.soldiers.len() + level.innocents.len() + 1);
        for tile in &level.soldiers {
            let id = npcs.spawn(Soldier::new(level.to_world(*tile), floor, events.clone()));
            Self::aim_at_player(&mut npcs, id);
        }
        let boss = npcs.spawn(Boss::new(level.to_world(level.boss), floor, events.clone()));
        Self::aim_at_player(&mut npcs, boss);
        for tile in &level.innocents {
            let id = npcs.spawn(Innocent::new(level.to_world(*tile), events.clone()));
            Self::aim_at_player(&mut npcs, id);
        }

        let pickups = level
            .pickups
            .iter()
            .filter_map(|p| p.kind().map(|kind| Pickup::new(kind, level.to_world(p.tile()))))
            .collect();

        info!(
            "Floor {} ready: {} soldiers, {} innocents, {} pickups",
            floor,
            level.soldiers.len(),
            level.innocents.len(),
            level.pickups.len()
        );

        Self {
            config: config.clone(),
            level: floor,
            bounds,
            cull_bounds: bounds.expanded(config.bounds_margin),
            player_start,
            player,
            npcs,
            boss,
            player_pool: ProjectilePool::new(config.player_pool_size, ProjectileOwner::Player),
            enemy_pool: ProjectilePool::new(config.enemy_pool_size, ProjectileOwner::Enemy),
            pickups,
            elevator: Elevator {
                position: level.to_world(level.elevator),
                unlocked: false,
            },
            phase: SessionPhase::Playing,
            rng: fastrand::Rng::with_seed(config.rng_seed ^ u64::from(floor)),
            events,
            now: 0.0,
        }
    }

    fn aim_at_player(npcs: &mut ActorRegistry, id: ActorId) {
        if let Some(npc) = npcs.get_mut(id) {
            npc.set_target(Some(ActorId::PLAYER));
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Floor number.
    #[must_use]
    pub const fn level(&self) -> u32 {
        self.level
    }

    /// Scene time of the last tick.
    #[must_use]
    pub const fn now(&self) -> Millis {
        self.now
    }

    /// Lifecycle phase.
    #[must_use]
    pub const fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// Checks if the floor is over (elevator taken or run lost).
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        self.phase.is_finished()
    }

    /// Playable area.
    #[must_use]
    pub const fn bounds(&self) -> WorldBounds {
        self.bounds
    }

    /// The player.
    #[must_use]
    pub const fn player(&self) -> &Player {
        &self.player
    }

    /// The player, mutably.
    pub fn player_mut(&mut self) -> &mut Player {
        &mut self.player
    }

    /// Every NPC on the floor.
    #[must_use]
    pub const fn npcs(&self) -> &ActorRegistry {
        &self.npcs
    }

    /// Every NPC on the floor, mutably.
    pub fn npcs_mut(&mut self) -> &mut ActorRegistry {
        &mut self.npcs
    }

    /// Handle of the floor boss.
    #[must_use]
    pub const fn boss_id(&self) -> ActorId {
        self.boss
    }

    /// Player projectile pool.
    #[must_use]
    pub const fn player_pool(&self) -> &ProjectilePool {
        &self.player_pool
    }

    /// Enemy projectile pool.
    #[must_use]
    pub const fn enemy_pool(&self) -> &ProjectilePool {
        &self.enemy_pool
    }

    /// Enemy projectile pool, mutably (for hosts injecting shots).
    pub fn enemy_pool_mut(&mut self) -> &mut ProjectilePool {
        &mut self.enemy_pool
    }

    /// Pickups, collected ones included.
    #[must_use]
    pub fn pickups(&self) -> &[Pickup] {
        &self.pickups
    }

    /// The exit.
    #[must_use]
    pub const fn elevator(&self) -> Elevator {
        self.elevator
    }

    /// Living hostile NPCs.
    #[must_use]
    pub fn hostiles_remaining(&self) -> usize {
        self.npcs
            .iter()
            .filter(|(_, n)| n.is_hostile() && n.is_alive())
            .count()
    }

    /// Player state to carry into the next floor.
    #[must_use]
    pub fn player_snapshot(&self) -> PlayerSnapshot {
        self.player.snapshot()
    }

    /// Publishes the current HUD state.
    pub fn announce(&self) {
        self.player.announce();
    }

    /// Drops dead NPCs from the registry. Returns how many were removed.
    pub fn prune_dead(&mut self) -> usize {
        let removed = self.npcs.retain(Npc::is_alive);
        if removed > 0 {
            debug!("Pruned {} dead NPCs", removed);
        }
        removed
    }

    // ========================================================================
    // Tick
    // ========================================================================

    /// Advances the floor by `delta` milliseconds.
    pub fn tick(&mut self, delta: Millis, input: &PlayerInput) {
        if self.phase.is_finished() {
            return;
        }
        self.now += delta;
        let now = self.now;

        self.resolve_pending(now);

        if self.phase == SessionPhase::Playing {
            let swing = self.player.update(now, input, &mut self.player_pool);
            self.player.integrate(delta, &self.bounds);
            if let Some(swing) = swing {
                self.resolve_melee(&swing);
            }
        }

        self.update_npcs(now, delta);

        self.player_pool.step(delta, &self.cull_bounds);
        self.enemy_pool.step(delta, &self.cull_bounds);

        self.resolve_player_projectiles(now);
        self.resolve_enemy_projectiles(now);
        self.resolve_pickups();

        self.check_elevator(input);
        self.check_player_death(now);
    }

    fn resolve_pending(&mut self, now: Millis) {
        match self.phase {
            SessionPhase::Respawning { at } if now >= at => {
                self.player.respawn(self.player_start);
                self.phase = SessionPhase::Playing;
            },
            SessionPhase::GameOverPending { at } if now >= at => {
                info!("Game over on floor {}", self.level);
                self.events.emit(GameEvent::GameOver { level: self.level });
                self.phase = SessionPhase::GameOver;
            },
            _ => {},
        }
    }

    fn resolve_target(&self, target: Option<ActorId>) -> Option<Vec2> {
        let id = target?;
        if id.is_player() {
            return self.player.is_alive().then(|| self.player.position());
        }
        self.npcs
            .get(id)
            .filter(|n| n.is_alive())
            .map(Damageable::position)
    }

    fn update_npcs(&mut self, now: Millis, delta: Millis) {
        let targets: Vec<(ActorId, Option<Vec2>)> = self
            .npcs
            .iter()
            .filter(|(_, n)| n.is_alive())
            .map(|(id, n)| (id, self.resolve_target(n.target())))
            .collect();

        for (id, target) in targets {
            let Some(npc) = self.npcs.get_mut(id) else { continue };
            let mut ctx = NpcContext {
                now,
                delta,
                target,
                enemy_pool: &mut self.enemy_pool,
                rng: &mut self.rng,
            };
            npc.update(&mut ctx);
            npc.integrate(delta);
            let body = &mut npc.core_mut().body;
            body.position = self.bounds.clamp(body.position);
        }
    }

    fn resolve_melee(&mut self, swing: &MeleeSwing) {
        let reach = self.config.melee_reach;
        let radius = self.config.melee_radius;
        let damage = self.config.melee_damage;
        for (_, npc) in self.npcs.iter_mut() {
            if npc.is_alive() && swing.hits(npc.position(), reach, radius) {
                npc.take_damage(damage, swing.at);
            }
        }
    }

    fn resolve_player_projectiles(&mut self, now: Millis) {
        let shots: Vec<(usize, Vec2, i32, f32)> = self
            .player_pool
            .iter_active()
            .map(|(i, p)| (i, p.position(), p.damage(), p.splash_radius()))
            .collect();

        for (slot, position, damage, splash_radius) in shots {
            let Some((victim, kind)) = self.first_npc_hit(position) else {
                continue;
            };
            self.player_pool.deactivate(slot);

            if kind == ActorKind::Innocent {
                if let Some(npc) = self.npcs.get_mut(victim) {
                    npc.take_damage(damage, now);
                }
                self.events.emit(GameEvent::PickupMessage {
                    text: INNOCENT_HURT_MESSAGE.to_string(),
                });
            } else if splash_radius > 0.0 {
                self.detonate(
                    &Blast {
                        centre: position,
                        damage,
                        radius: splash_radius,
                    },
                    now,
                );
            } else if let Some(npc) = self.npcs.get_mut(victim) {
                npc.take_damage(damage, now);
            }
        }
    }

    /// First live NPC touching `position`, hostiles checked before innocents.
    fn first_npc_hit(&self, position: Vec2) -> Option<(ActorId, ActorKind)> {
        let touching = |n: &Npc| {
            n.is_alive()
                && circles_overlap(position, PROJECTILE_RADIUS, n.position(), n.kind().hit_radius())
        };
        let hostile = self
            .npcs
            .iter()
            .find(|(_, n)| n.is_hostile() && touching(*n));
        hostile
            .or_else(|| self.npcs.iter().find(|(_, n)| !n.is_hostile() && touching(*n)))
            .map(|(id, n)| (id, n.kind()))
    }

    fn detonate(&mut self, blast: &Blast, now: Millis) {
        debug!(
            "Rocket detonated at ({:.0}, {:.0})",
            blast.centre.x, blast.centre.y
        );
        for (_, npc) in self.npcs.iter_mut() {
            if !npc.is_hostile() || !npc.is_alive() {
                continue;
            }
            if let Some(damage) = blast.damage_at(npc.position()) {
                npc.take_damage(damage, now);
            }
        }
    }

    fn resolve_enemy_projectiles(&mut self, now: Millis) {
        if !self.player.is_alive() {
            return;
        }
        let player_pos = self.player.position();
        let player_radius = ActorKind::Player.hit_radius();
        let hits: Vec<(usize, i32)> = self
            .enemy_pool
            .iter_active()
            .filter(|(_, p)| circles_overlap(p.position(), PROJECTILE_RADIUS, player_pos, player_radius))
            .map(|(i, p)| (i, p.damage()))
            .collect();

        for (slot, damage) in hits {
            self.enemy_pool.deactivate(slot);
            if self.player.is_alive() {
                self.player.take_damage(damage, now);
            }
        }
    }

    fn resolve_pickups(&mut self) {
        if !self.player.is_alive() {
            return;
        }
        let player_pos = self.player.position();
        let player_radius = ActorKind::Player.hit_radius();
        for pickup in &mut self.pickups {
            if pickup.is_active()
                && circles_overlap(pickup.position(), PICKUP_RADIUS, player_pos, player_radius)
            {
                pickup.collect(&mut self.player, &self.events);
            }
        }
    }

    fn check_elevator(&mut self, input: &PlayerInput) {
        if !self.elevator.unlocked && self.boss_defeated() {
            self.elevator.unlocked = true;
            info!("Boss down on floor {}, elevator unlocked", self.level);
            self.events.emit(GameEvent::ElevatorUnlocked {
                position: self.elevator.position,
            });
        }

        if self.elevator.unlocked
            && self.phase == SessionPhase::Playing
            && input.interact
            && self.player.is_alive()
            && self.player.position().distance(self.elevator.position) < self.config.elevator_radius
        {
            info!("Floor {} complete", self.level);
            self.phase = SessionPhase::LevelComplete;
            self.events.emit(GameEvent::LevelComplete {
                level: self.level,
                next_level: self.level.saturating_add(1),
            });
        }
    }

    fn boss_defeated(&self) -> bool {
        self.npcs.get(self.boss).map_or(true, |b| !b.is_alive())
    }

    fn check_player_death(&mut self, now: Millis) {
        if self.phase != SessionPhase::Playing || self.player.is_alive() {
            return;
        }
        self.phase = if self.player.lives() > 0 {
            SessionPhase::Respawning {
                at: now + self.config.respawn_delay_ms,
            }
        } else {
            SessionPhase::GameOverPending {
                at: now + self.config.game_over_delay_ms,
            }
        };
        debug!("Player down, phase now {:?}", self.phase);
    }
}
