//! Per-tick player intent.
//!
//! The host samples its devices and fills a [`PlayerInput`]; the core never
//! reads keyboards or pointers directly.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// What the player wants to do this tick.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PlayerInput {
    /// Move along the facing
    pub forward: bool,
    /// Move against the facing
    pub back: bool,
    /// Step to the left of the facing
    pub strafe_left: bool,
    /// Step to the right of the facing
    pub strafe_right: bool,
    /// Aim point in world space
    pub aim: Vec2,
    /// Trigger held
    pub fire: bool,
    /// Use key (elevator)
    pub interact: bool,
    /// Weapon slot requested this tick (number keys)
    pub switch_to: Option<usize>,
}

impl PlayerInput {
    /// Input that only aims at `point`.
    #[must_use]
    pub fn aiming_at(point: Vec2) -> Self {
        Self {
            aim: point,
            ..Self::default()
        }
    }

    /// Sets the trigger.
    #[must_use]
    pub const fn firing(mut self, fire: bool) -> Self {
        self.fire = fire;
        self
    }

    /// Holds forward.
    #[must_use]
    pub const fn moving_forward(mut self) -> Self {
        self.forward = true;
        self
    }

    /// Checks if any movement key is held.
    #[must_use]
    pub const fn wants_to_move(&self) -> bool {
        self.forward || self.back || self.strafe_left || self.strafe_right
    }

    /// Unit movement direction in world space for a body facing `facing`.
    ///
    /// Opposite keys cancel out; the result is zero when nothing is held.
    #[must_use]
    pub fn move_direction(&self, facing: f32) -> Vec2 {
        let ahead = Vec2::from_angle(facing);
        let right = Vec2::from_angle(facing + std::f32::consts::FRAC_PI_2);
        let mut dir = Vec2::ZERO;
        if self.forward {
            dir += ahead;
        }
        if self.back {
            dir -= ahead;
        }
        if self.strafe_left {
            dir -= right;
        }
        if self.strafe_right {
            dir += right;
        }
        dir.normalize_or_zero()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_follows_facing() {
        let input = PlayerInput::default().moving_forward();
        let dir = input.move_direction(std::f32::consts::FRAC_PI_2);
        assert!(dir.x.abs() < 1e-5);
        assert!((dir.y - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_diagonal_is_normalized() {
        let input = PlayerInput {
            forward: true,
            strafe_right: true,
            ..PlayerInput::default()
        };
        let dir = input.move_direction(0.0);
        assert!((dir.length() - 1.0).abs() < 1e-5);
        assert!(dir.x > 0.0 && dir.y > 0.0);
    }

    #[test]
    fn test_opposites_cancel() {
        let input = PlayerInput {
            forward: true,
            back: true,
            ..PlayerInput::default()
        };
        assert!(input.wants_to_move());
        assert_eq!(input.move_direction(1.0), Vec2::ZERO);
        assert!(!PlayerInput::aiming_at(Vec2::ONE).wants_to_move());
    }
}
