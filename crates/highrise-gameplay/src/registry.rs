//! Generational storage for the NPCs on a floor.
//!
//! Slots are reused through a free list. Each reuse bumps the slot's
//! generation, so an [`ActorId`] held by someone else stops resolving once
//! its NPC is removed instead of pointing at the newcomer.

use highrise_common::ActorId;
use thiserror::Error;

use crate::actor::ActorKind;
use crate::npc::Npc;

/// Errors from registry operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// No NPC lives under this handle
    #[error("Actor not found: {0}")]
    NotFound(ActorId),
    /// The player handle does not name a registry slot
    #[error("{0} is not stored in the NPC registry")]
    NotAnNpc(ActorId),
}

/// Result type for registry operations.
pub type RegistryResult<T> = Result<T, RegistryError>;

#[derive(Debug, Clone)]
struct Slot {
    generation: u32,
    npc: Option<Npc>,
}

/// NPC arena keyed by generational handles.
#[derive(Debug, Clone, Default)]
pub struct ActorRegistry {
    slots: Vec<Slot>,
    free_list: Vec<u32>,
    live: usize,
}

impl ActorRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry with room for `capacity` NPCs.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free_list: Vec::new(),
            live: 0,
        }
    }

    /// Number of stored NPCs, dead bodies included until pruned.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.live
    }

    /// Returns true if nothing is stored.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Stores an NPC and returns its handle.
    pub fn spawn(&mut self, npc: impl Into<Npc>) -> ActorId {
        let npc = npc.into();
        self.live += 1;
        if let Some(index) = self.free_list.pop() {
            let slot = &mut self.slots[index as usize];
            slot.generation = slot.generation.wrapping_add(1);
            slot.npc = Some(npc);
            return ActorId::new(index, slot.generation);
        }
        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            npc: Some(npc),
        });
        ActorId::new(index, 0)
    }

    /// Removes an NPC. Its handle never resolves again.
    pub fn despawn(&mut self, id: ActorId) -> RegistryResult<Npc> {
        if id.is_player() {
            return Err(RegistryError::NotAnNpc(id));
        }
        let slot = self
            .slots
            .get_mut(id.index() as usize)
            .filter(|s| s.generation == id.generation())
            .ok_or(RegistryError::NotFound(id))?;
        let npc = slot.npc.take().ok_or(RegistryError::NotFound(id))?;
        self.free_list.push(id.index());
        self.live -= 1;
        Ok(npc)
    }

    /// Resolves a handle.
    #[must_use]
    pub fn get(&self, id: ActorId) -> Option<&Npc> {
        self.slots
            .get(id.index() as usize)
            .filter(|s| s.generation == id.generation())
            .and_then(|s| s.npc.as_ref())
    }

    /// Resolves a handle mutably.
    pub fn get_mut(&mut self, id: ActorId) -> Option<&mut Npc> {
        self.slots
            .get_mut(id.index() as usize)
            .filter(|s| s.generation == id.generation())
            .and_then(|s| s.npc.as_mut())
    }

    /// Checks if a handle still resolves.
    #[must_use]
    pub fn contains(&self, id: ActorId) -> bool {
        self.get(id).is_some()
    }

    /// Iterates over stored NPCs with their handles.
    pub fn iter(&self) -> impl Iterator<Item = (ActorId, &Npc)> {
        self.slots.iter().enumerate().filter_map(|(i, s)| {
            s.npc
                .as_ref()
                .map(|npc| (ActorId::new(i as u32, s.generation), npc))
        })
    }

    /// Iterates mutably over stored NPCs with their handles.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (ActorId, &mut Npc)> {
        self.slots.iter_mut().enumerate().filter_map(|(i, s)| {
            let generation = s.generation;
            s.npc
                .as_mut()
                .map(move |npc| (ActorId::new(i as u32, generation), npc))
        })
    }

    /// Handles of every stored NPC of `kind`.
    #[must_use]
    pub fn ids_of(&self, kind: ActorKind) -> Vec<ActorId> {
        self.iter()
            .filter(|(_, npc)| npc.kind() == kind)
            .map(|(id, _)| id)
            .collect()
    }

    /// Drops every NPC for which `keep` returns false.
    ///
    /// Returns how many were removed.
    pub fn retain(&mut self, mut keep: impl FnMut(&Npc) -> bool) -> usize {
        let mut removed = 0;
        for (index, slot) in self.slots.iter_mut().enumerate() {
            if slot.npc.as_ref().is_some_and(|npc| !keep(npc)) {
                slot.npc = None;
                self.free_list.push(index as u32);
                removed += 1;
            }
        }
        self.live -= removed;
        removed
    }

    /// Removes everything. Outstanding handles stop resolving.
    pub fn clear(&mut self) {
        for (index, slot) in self.slots.iter_mut().enumerate() {
            if slot.npc.take().is_some() {
                self.free_list.push(index as u32);
            }
        }
        self.live = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::Damageable;
    use crate::events::EventSender;
    use crate::innocent::Innocent;
    use crate::soldier::Soldier;
    use glam::Vec2;

    fn soldier() -> Soldier {
        Soldier::new(Vec2::ZERO, 1, EventSender::detached())
    }

    #[test]
    fn test_spawn_and_lookup() {
        let mut reg = ActorRegistry::new();
        let a = reg.spawn(soldier());
        let b = reg.spawn(Innocent::new(Vec2::ONE, EventSender::detached()));
        assert_eq!(reg.len(), 2);
        assert_eq!(reg.get(a).map(Npc::kind), Some(ActorKind::Soldier));
        assert_eq!(reg.get(b).map(Npc::kind), Some(ActorKind::Innocent));
        assert_eq!(reg.ids_of(ActorKind::Innocent), vec![b]);
    }

    #[test]
    fn test_stale_handle_does_not_resolve_after_reuse() {
        let mut reg = ActorRegistry::new();
        let old = reg.spawn(soldier());
        reg.despawn(old).unwrap();
        let new = reg.spawn(soldier());

        assert_eq!(old.index(), new.index());
        assert_ne!(old, new);
        assert!(reg.get(old).is_none());
        assert!(reg.contains(new));
        assert_eq!(reg.despawn(old).unwrap_err(), RegistryError::NotFound(old));
    }

    #[test]
    fn test_player_handle_is_rejected() {
        let mut reg = ActorRegistry::new();
        reg.spawn(soldier());
        assert!(reg.get(ActorId::PLAYER).is_none());
        assert_eq!(
            reg.despawn(ActorId::PLAYER).unwrap_err(),
            RegistryError::NotAnNpc(ActorId::PLAYER)
        );
    }

    #[test]
    fn test_retain_prunes_dead() {
        let mut reg = ActorRegistry::with_capacity(4);
        let a = reg.spawn(soldier());
        let b = reg.spawn(soldier());
        reg.get_mut(a).unwrap().take_damage(1000, 0.0);

        assert_eq!(reg.retain(Npc::is_alive), 1);
        assert_eq!(reg.len(), 1);
        assert!(!reg.contains(a));
        assert!(reg.contains(b));
    }

    #[test]
    fn test_clear_invalidates_everything() {
        let mut reg = ActorRegistry::new();
        let a = reg.spawn(soldier());
        reg.clear();
        assert!(reg.is_empty());
        assert!(reg.get(a).is_none());
        let b = reg.spawn(soldier());
        assert_ne!(a, b);
    }
}
