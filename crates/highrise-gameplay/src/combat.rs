//! Hit resolution helpers: melee swings, splash falloff and circle overlaps.
//!
//! Collision here is plain circle-vs-circle. Hosts with a physics engine can
//! ignore these and call [`Damageable::take_damage`](crate::actor::Damageable)
//! from their own contact callbacks.

use glam::Vec2;
use highrise_common::Millis;
use serde::{Deserialize, Serialize};

/// Distance from the attacker to the centre of a melee swing.
pub const MELEE_REACH: f32 = 55.0;

/// Radius of the melee hit zone.
pub const MELEE_RADIUS: f32 = 40.0;

/// Damage of one melee hit.
pub const MELEE_DAMAGE: i32 = 30;

/// Falloff damage at `distance` from a blast centre.
///
/// Returns `None` outside the blast. The edge itself is outside.
#[must_use]
pub fn splash_damage(damage: i32, radius: f32, distance: f32) -> Option<i32> {
    if radius <= 0.0 || distance >= radius {
        return None;
    }
    let falloff = 1.0 - distance / radius;
    Some((damage as f32 * falloff).round() as i32)
}

/// Checks if two circles overlap.
#[must_use]
pub fn circles_overlap(a: Vec2, a_radius: f32, b: Vec2, b_radius: f32) -> bool {
    a.distance_squared(b) < (a_radius + b_radius).powi(2)
}

/// A rocket detonation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Blast {
    /// Detonation point
    pub centre: Vec2,
    /// Damage at the centre
    pub damage: i32,
    /// Blast radius
    pub radius: f32,
}

impl Blast {
    /// Damage dealt to something at `position`, if it is caught.
    #[must_use]
    pub fn damage_at(&self, position: Vec2) -> Option<i32> {
        splash_damage(self.damage, self.radius, self.centre.distance(position))
    }
}

/// A melee swing waiting to be resolved against nearby actors.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeleeSwing {
    /// Attacker position
    pub origin: Vec2,
    /// Swing direction in radians
    pub angle: f32,
    /// Scene time of the swing
    pub at: Millis,
}

impl MeleeSwing {
    /// Centre of the hit zone `reach` units ahead of the attacker.
    #[must_use]
    pub fn centre(&self, reach: f32) -> Vec2 {
        self.origin + Vec2::from_angle(self.angle) * reach
    }

    /// Checks if `position` lies within `radius` of the hit zone centre.
    #[must_use]
    pub fn hits(&self, position: Vec2, reach: f32, radius: f32) -> bool {
        self.centre(reach).distance(position) < radius
    }
}
