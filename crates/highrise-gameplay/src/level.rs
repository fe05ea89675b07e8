//! Level data loading.
//!
//! Levels are JSON documents describing one floor: grid size, spawn tiles for
//! every actor, pickups and the elevator. A level set is a JSON array of them.

use std::fs;
use std::path::Path;

use glam::Vec2;
use highrise_common::{HighriseError, SchemaVersion, TileCoord, WorldBounds};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::pickup::PickupKind;
use crate::weapon::WeaponCategory;

/// Highest accepted level id.
pub const MAX_LEVEL_ID: u32 = 9999;

/// Largest accepted grid extent along either axis, in world units.
pub const MAX_WORLD_EXTENT: u32 = 1 << 20;

/// Errors that can occur while loading levels.
#[derive(Debug, Error)]
pub enum LevelError {
    /// Failed to read file.
    #[error("Failed to read level file: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to parse JSON.
    #[error("Failed to parse level JSON: {0}")]
    Parse(#[from] serde_json::Error),

    /// No level with this id.
    #[error("Level {0} not found")]
    NotFound(u32),

    /// Structurally valid but unusable data.
    #[error("Level {id} is invalid: {reason}")]
    Invalid {
        /// Level id
        id: u32,
        /// What is wrong
        reason: String,
    },

    /// Unreadable format version.
    #[error(transparent)]
    Version(#[from] HighriseError),
}

/// Result type for level operations.
pub type LevelResult<T> = Result<T, LevelError>;

/// Pickup type tag as written in level files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PickupType {
    /// Health pack
    Health,
    /// Armor vest
    Armor,
    /// Extra life
    Life,
    /// Ammo box
    Ammo,
    /// Weapon, category given by `weaponType`
    Weapon,
}

/// A pickup placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PickupSpawn {
    /// Column
    pub col: i32,
    /// Row
    pub row: i32,
    /// Pickup type
    #[serde(rename = "type")]
    pub pickup_type: PickupType,
    /// Weapon category index for weapon pickups
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weapon_type: Option<usize>,
}

impl PickupSpawn {
    /// Tile the pickup sits on.
    #[must_use]
    pub const fn tile(&self) -> TileCoord {
        TileCoord::new(self.col, self.row)
    }

    /// Resolves the placement to a concrete pickup kind.
    ///
    /// Weapon pickups need a ranged `weaponType` (1-4).
    #[must_use]
    pub fn kind(&self) -> Option<PickupKind> {
        match self.pickup_type {
            PickupType::Health => Some(PickupKind::Health),
            PickupType::Armor => Some(PickupKind::Armor),
            PickupType::Life => Some(PickupKind::Life),
            PickupType::Ammo => Some(PickupKind::Ammo),
            PickupType::Weapon => self
                .weapon_type
                .and_then(WeaponCategory::from_index)
                .filter(|c| !c.is_melee())
                .map(PickupKind::Weapon),
        }
    }
}

/// One floor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelData {
    /// Format version; files without one are read as current
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<SchemaVersion>,
    /// Floor number, 1-based
    pub id: u32,
    /// Display name
    #[serde(default)]
    pub name: String,
    /// Tile edge length in world units
    pub tile_size: u32,
    /// Grid width in tiles
    pub width: u32,
    /// Grid height in tiles
    pub height: u32,
    /// Player spawn
    pub player_start: TileCoord,
    /// Elevator tile
    pub elevator: TileCoord,
    /// Boss spawn
    pub boss: TileCoord,
    /// Soldier spawns
    #[serde(default)]
    pub soldiers: Vec<TileCoord>,
    /// Innocent spawns
    #[serde(default)]
    pub innocents: Vec<TileCoord>,
    /// Pickup placements
    #[serde(default)]
    pub pickups: Vec<PickupSpawn>,
}

impl LevelData {
    /// Parses and validates a single level.
    pub fn from_json(json: &str) -> LevelResult<Self> {
        let level: Self = serde_json::from_str(json)?;
        level.validate()?;
        Ok(level)
    }

    /// World-space centre of a tile on this floor.
    #[must_use]
    pub fn to_world(&self, tile: TileCoord) -> Vec2 {
        tile.to_world(self.tile_size)
    }

    /// Rectangle covering the whole grid.
    #[must_use]
    pub fn world_bounds(&self) -> WorldBounds {
        WorldBounds::from_tiles(self.width, self.height, self.tile_size)
    }

    fn contains_tile(&self, tile: TileCoord) -> bool {
        tile.col >= 0
            && tile.row >= 0
            && (tile.col as u32) < self.width
            && (tile.row as u32) < self.height
    }

    fn invalid(&self, reason: impl Into<String>) -> LevelError {
        LevelError::Invalid {
            id: self.id,
            reason: reason.into(),
        }
    }

    /// Checks version, grid size, spawn tiles and pickup types.
    pub fn validate(&self) -> LevelResult<()> {
        if let Some(version) = &self.version {
            SchemaVersion::LEVEL_DATA.ensure_readable(version)?;
        }
        if self.id > MAX_LEVEL_ID {
            return Err(self.invalid(format!("id is above {MAX_LEVEL_ID}")));
        }
        if self.tile_size == 0 || self.width == 0 || self.height == 0 {
            return Err(self.invalid(format!(
                "empty grid {}x{} with tile size {}",
                self.width, self.height, self.tile_size
            )));
        }
        let extent = |tiles: u32| {
            tiles
                .checked_mul(self.tile_size)
                .filter(|e| *e <= MAX_WORLD_EXTENT)
        };
        if extent(self.width).is_none() || extent(self.height).is_none() {
            return Err(self.invalid(format!(
                "grid {}x{} with tile size {} exceeds {MAX_WORLD_EXTENT} world units",
                self.width, self.height, self.tile_size
            )));
        }

        let named = [
            ("player start", self.player_start),
            ("elevator", self.elevator),
            ("boss", self.boss),
        ];
        for (what, tile) in named {
            if !self.contains_tile(tile) {
                return Err(self.invalid(format!(
                    "{what} at ({}, {}) is outside the grid",
                    tile.col, tile.row
                )));
            }
        }

        let spawns = self.soldiers.iter().chain(&self.innocents);
        if let Some(tile) = spawns.copied().find(|t| !self.contains_tile(*t)) {
            return Err(self.invalid(format!(
                "spawn at ({}, {}) is outside the grid",
                tile.col, tile.row
            )));
        }

        for pickup in &self.pickups {
            if !self.contains_tile(pickup.tile()) {
                return Err(self.invalid(format!(
                    "pickup at ({}, {}) is outside the grid",
                    pickup.col, pickup.row
                )));
            }
            if pickup.kind().is_none() {
                return Err(self.invalid(format!(
                    "weapon pickup at ({}, {}) has bad weaponType {:?}",
                    pickup.col, pickup.row, pickup.weapon_type
                )));
            }
        }

        Ok(())
    }
}

/// Every floor of a run, looked up by id.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LevelSet {
    levels: Vec<LevelData>,
}

impl LevelSet {
    /// Builds a set from already-parsed levels.
    pub fn new(levels: Vec<LevelData>) -> LevelResult<Self> {
        for level in &levels {
            level.validate()?;
        }
        Ok(Self { levels })
    }

    /// Parses a JSON array of levels.
    pub fn from_json(json: &str) -> LevelResult<Self> {
        let levels: Vec<LevelData> = serde_json::from_str(json)?;
        Self::new(levels)
    }

    /// Loads a level file. Accepts either a single level or an array.
    pub fn load(path: &Path) -> LevelResult<Self> {
        let content = fs::read_to_string(path)?;
        let set = if content.trim_start().starts_with('[') {
            Self::from_json(&content)?
        } else {
            Self::new(vec![serde_json::from_str(&content)?])?
        };
        info!("Loaded {} level(s) from {}", set.len(), path.display());
        Ok(set)
    }

    /// Number of levels.
    #[must_use]
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    /// Returns true if the set has no levels.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Looks up a level by id.
    pub fn get(&self, id: u32) -> LevelResult<&LevelData> {
        self.levels
            .iter()
            .find(|l| l.id == id)
            .ok_or(LevelError::NotFound(id))
    }

    /// Lowest level id, where a run starts.
    #[must_use]
    pub fn first_id(&self) -> Option<u32> {
        self.levels.iter().map(|l| l.id).min()
    }

    /// Checks if a level follows `id`.
    #[must_use]
    pub fn has_next(&self, id: u32) -> bool {
        let Some(next) = id.checked_add(1) else {
            return false;
        };
        let found = self.levels.iter().any(|l| l.id == next);
        debug!("Level after {id}: {}", if found { "present" } else { "none" });
        found
    }

    /// Iterates over levels in file order.
    pub fn iter(&self) -> impl Iterator<Item = &LevelData> {
        self.levels.iter()
    }
}
