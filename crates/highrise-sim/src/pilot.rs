//! Scripted player.
//!
//! Walks toward the nearest living hostile, fires when in range and heads for
//! the elevator once it opens.

use glam::Vec2;
use highrise_gameplay::{Damageable, FloorSession, PlayerInput, WeaponCategory};

/// Distance at which the pilot stops closing in and starts shooting.
const ENGAGE_RANGE: f32 = 180.0;

/// Drives a [`FloorSession`] with generated input.
#[derive(Debug, Default)]
pub struct Pilot {
    tick: u64,
}

impl Pilot {
    /// Creates a pilot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Input for the next tick.
    pub fn next_input(&mut self, session: &FloorSession) -> PlayerInput {
        self.tick += 1;
        let player = session.player();
        let position = player.position();

        let elevator = session.elevator();
        if elevator.unlocked {
            let mut input = PlayerInput::aiming_at(elevator.position).moving_forward();
            input.interact = true;
            return input;
        }

        let Some(target) = Self::nearest_hostile(session, position) else {
            return PlayerInput::aiming_at(position + Vec2::X);
        };

        let mut input = PlayerInput::aiming_at(target);
        if position.distance(target) > ENGAGE_RANGE {
            input = input.moving_forward();
        }

        // Semi-auto guns need the trigger released between shots
        let weapons = player.weapons();
        let trigger = weapons.current().is_automatic() || self.tick % 2 == 0;
        input = input.firing(trigger);

        if !weapons.ammo(weapons.current()).is_available() {
            input.switch_to = Some(WeaponCategory::Hammer.index());
        }
        input
    }

    fn nearest_hostile(session: &FloorSession, from: Vec2) -> Option<Vec2> {
        session
            .npcs()
            .iter()
            .filter(|(_, n)| n.is_hostile() && n.is_alive())
            .map(|(_, n)| n.position())
            .min_by(|a, b| from.distance_squared(*a).total_cmp(&from.distance_squared(*b)))
    }
}
