//! Coordinate types for the tile grid and world space.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Grid coordinate used by level data (column, row).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileCoord {
    /// Column index
    pub col: i32,
    /// Row index
    pub row: i32,
}

impl TileCoord {
    /// Creates a new tile coordinate.
    #[must_use]
    pub const fn new(col: i32, row: i32) -> Self {
        Self { col, row }
    }

    /// Converts to the world-space centre of the tile.
    #[must_use]
    pub fn to_world(self, tile_size: u32) -> Vec2 {
        let size = tile_size as f32;
        Vec2::new(
            self.col as f32 * size + size / 2.0,
            self.row as f32 * size + size / 2.0,
        )
    }
}

/// Axis-aligned rectangle bounding the playable world.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorldBounds {
    /// Top-left corner
    pub min: Vec2,
    /// Bottom-right corner
    pub max: Vec2,
}

impl WorldBounds {
    /// Creates bounds from two corners.
    #[must_use]
    pub const fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    /// Creates bounds covering a grid of `width` x `height` tiles from the origin.
    ///
    /// Extents saturate at `u32::MAX` world units.
    #[must_use]
    pub fn from_tiles(width: u32, height: u32, tile_size: u32) -> Self {
        Self {
            min: Vec2::ZERO,
            max: Vec2::new(
                width.saturating_mul(tile_size) as f32,
                height.saturating_mul(tile_size) as f32,
            ),
        }
    }

    /// Returns true if the point lies inside the bounds (edges inclusive).
    #[must_use]
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.min.x
            && point.y >= self.min.y
            && point.x <= self.max.x
            && point.y <= self.max.y
    }

    /// Clamps a point into the bounds.
    #[must_use]
    pub fn clamp(&self, point: Vec2) -> Vec2 {
        point.clamp(self.min, self.max)
    }

    /// Returns the bounds grown by `margin` on every side.
    #[must_use]
    pub fn expanded(&self, margin: f32) -> Self {
        Self {
            min: self.min - Vec2::splat(margin),
            max: self.max + Vec2::splat(margin),
        }
    }
}

/// Angle in radians of the direction from `from` to `to`.
///
/// Zero points along +x, positive angles turn toward +y (screen down).
#[must_use]
pub fn angle_between(from: Vec2, to: Vec2) -> f32 {
    let d = to - from;
    d.y.atan2(d.x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_from_tiles_saturates_huge_grid() {
        let bounds = WorldBounds::from_tiles(70_000, 2, 70_000);
        assert!((bounds.max.x - u32::MAX as f32).abs() < 1.0);
        assert!((bounds.max.y - 140_000.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_bounds_contains_edges() {
        let bounds = WorldBounds::from_tiles(10, 5, 32);
        assert!(bounds.contains(Vec2::new(0.0, 0.0)));
        assert!(bounds.contains(Vec2::new(320.0, 160.0)));
        assert!(!bounds.contains(Vec2::new(320.5, 10.0)));
        assert!(!bounds.contains(Vec2::new(10.0, -1.0)));
    }

    #[test]
    fn test_bounds_expanded() {
        let bounds = WorldBounds::from_tiles(1, 1, 10).expanded(5.0);
        assert!(bounds.contains(Vec2::new(-5.0, 15.0)));
        assert!(!bounds.contains(Vec2::new(-5.1, 0.0)));
    }

    #[test]
    fn test_angle_between_axes() {
        let origin = Vec2::ZERO;
        assert!(angle_between(origin, Vec2::new(1.0, 0.0)).abs() < 1e-6);
        let down = angle_between(origin, Vec2::new(0.0, 1.0));
        assert!((down - std::f32::consts::FRAC_PI_2).abs() < 1e-6);
    }

    proptest! {
        #[test]
        fn tile_centre_lies_inside_its_tile(col in 0i32..500, row in 0i32..500, size in 1u32..128) {
            let p = TileCoord::new(col, row).to_world(size);
            let s = size as f32;
            prop_assert!(p.x > col as f32 * s && p.x < (col + 1) as f32 * s);
            prop_assert!(p.y > row as f32 * s && p.y < (row + 1) as f32 * s);
        }
    }
}
