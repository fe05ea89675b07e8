//! Event bus between the gameplay core and the presentation layer.
//!
//! Components never reach a global emitter. Each one is handed an
//! [`EventSender`] when it is built and publishes through it; the host drains
//! the [`EventBus`] once per frame.

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use glam::Vec2;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::actor::ActorKind;
use crate::weapon::{Ammo, AmmoSlot, WeaponCategory, WEAPON_COUNT};

/// Events the core publishes. These are its only observable side effects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// Player health, armor or lives changed
    PlayerStatsChanged {
        /// Current health
        health: i32,
        /// Current armor
        armor: i32,
        /// Remaining lives
        lives: u32,
    },
    /// Ammo or held weapons changed
    AmmoChanged {
        /// Per-category snapshot
        slots: [AmmoSlot; WEAPON_COUNT],
    },
    /// Current weapon changed
    WeaponSwitched {
        /// New category
        category: WeaponCategory,
        /// Ammo in the new category
        ammo: Ammo,
    },
    /// Short text for the pickup ticker
    PickupMessage {
        /// Message text
        text: String,
    },
    /// An NPC died
    EnemyKilled {
        /// Kind of NPC
        kind: ActorKind,
        /// Last position
        position: Vec2,
    },
    /// The floor boss died
    BossKilled {
        /// Floor number
        level: u32,
    },
    /// The player died
    PlayerDied {
        /// Lives left after this death
        lives: u32,
    },
    /// The elevator accepts the player
    ElevatorUnlocked {
        /// Elevator position
        position: Vec2,
    },
    /// The player rode the elevator
    LevelComplete {
        /// Floor just finished
        level: u32,
        /// Floor to load next
        next_level: u32,
    },
    /// No lives left
    GameOver {
        /// Floor the run ended on
        level: u32,
    },
}

/// Publishing handle given to components at construction.
#[derive(Debug, Clone)]
pub struct EventSender {
    sender: Sender<GameEvent>,
}

impl EventSender {
    /// Creates a sender whose events go nowhere.
    ///
    /// Useful for components driven outside a session.
    #[must_use]
    pub fn detached() -> Self {
        let (sender, _receiver) = bounded(1);
        Self { sender }
    }

    /// Publishes an event. Never blocks; a full or closed bus drops it.
    pub fn emit(&self, event: GameEvent) {
        match self.sender.try_send(event) {
            Ok(()) => {},
            Err(TrySendError::Full(event) | TrySendError::Disconnected(event)) => {
                trace!("Dropped event {:?}", event);
            },
        }
    }
}

/// Event bus for broadcasting events to subscribers.
#[derive(Debug)]
pub struct EventBus {
    /// Sender for broadcasting events
    sender: Sender<GameEvent>,
    /// Receiver for collecting events
    receiver: Receiver<GameEvent>,
    /// Channel capacity
    capacity: usize,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(1024)
    }
}

impl EventBus {
    /// Creates a new event bus with the given capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, receiver) = bounded(capacity);
        Self {
            sender,
            receiver,
            capacity,
        }
    }

    /// Drains all pending events.
    pub fn drain(&self) -> Vec<GameEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.receiver.try_recv() {
            events.push(event);
        }
        events
    }

    /// Drains pending events into every handler, in publish order.
    ///
    /// Returns the number of events delivered.
    pub fn dispatch(&self, handlers: &mut [&mut dyn EventHandler]) -> usize {
        let mut delivered = 0;
        while let Ok(event) = self.receiver.try_recv() {
            for handler in handlers.iter_mut() {
                handler.handle(&event);
            }
            delivered += 1;
        }
        delivered
    }

    /// Returns the number of pending events.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.receiver.len()
    }

    /// Returns the channel capacity.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Creates a new sender handle for publishing events.
    #[must_use]
    pub fn sender(&self) -> EventSender {
        EventSender {
            sender: self.sender.clone(),
        }
    }
}

/// Subscriber on the presentation side.
pub trait EventHandler {
    /// Handles an event.
    fn handle(&mut self, event: &GameEvent);
}
