//! ID types for actors.

use serde::{Deserialize, Serialize};

/// Handle to an actor in a floor's registry.
///
/// Handles are generational: once the slot is freed and reused, stale handles
/// stop resolving instead of pointing at the new occupant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActorId {
    index: u32,
    generation: u32,
}

impl ActorId {
    /// Handle reserved for the player, who lives outside the NPC registry.
    pub const PLAYER: Self = Self {
        index: u32::MAX,
        generation: 0,
    };

    /// Creates a handle from a slot index and generation.
    #[must_use]
    pub const fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Returns the registry slot index.
    #[must_use]
    pub const fn index(self) -> u32 {
        self.index
    }

    /// Returns the slot generation this handle was issued for.
    #[must_use]
    pub const fn generation(self) -> u32 {
        self.generation
    }

    /// Checks if this handle refers to the player.
    #[must_use]
    pub const fn is_player(self) -> bool {
        self.index == u32::MAX
    }
}

impl std::fmt::Display for ActorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_player() {
            write!(f, "player")
        } else {
            write!(f, "actor#{}v{}", self.index, self.generation)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(ActorId::PLAYER.to_string(), "player");
        assert_eq!(ActorId::new(3, 1).to_string(), "actor#3v1");
    }

    #[test]
    fn test_generation_distinguishes_handles() {
        assert_ne!(ActorId::new(2, 0), ActorId::new(2, 1));
    }
}
