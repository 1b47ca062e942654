use std::collections::HashMap;
use std::fs::read_to_string;
use std::io;

use ron::error::SpannedError;
use tracing::warn;

use crate::is_default;

/// The closed set of obstacle kinds a battlefield can hold.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    serde::Serialize,
    serde::Deserialize,
    bincode::Encode,
    bincode::Decode,
)]
pub enum ObstacleKind {
    LowCover,
    HighWall,
    Terrain,
}

impl ObstacleKind {
    pub const ALL: [ObstacleKind; 3] = [
        ObstacleKind::LowCover,
        ObstacleKind::HighWall,
        ObstacleKind::Terrain,
    ];
}

/// Static per-kind obstacle data, resolved once from assets or the
/// compiled defaults and immutable afterwards.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ObstacleBlueprint {
    /// World-space height of the collision geometry, > 0
    pub height: f32,
    pub blocks_sight: bool,
    pub partial_cover: bool,
    pub blocks_movement: bool,
    /// In [0, 1], the cover contributed to a shot passing over this obstacle
    pub cover_value: f32,
    /// `f32::INFINITY` means impassable
    pub movement_cost: f32,
    #[serde(default, skip_serializing_if = "is_default")]
    pub destructible: bool,
    #[serde(default, skip_serializing_if = "is_default")]
    pub health: i32,
}

impl Default for ObstacleBlueprint {
    fn default() -> Self {
        Self {
            height: 1.0,
            blocks_sight: false,
            partial_cover: false,
            blocks_movement: true,
            cover_value: 0.0,
            movement_cost: f32::INFINITY,
            destructible: false,
            health: 0,
        }
    }
}

/// Lookup table of obstacle data keyed by kind.
#[derive(Debug, Clone, PartialEq, Default, serde::Serialize, serde::Deserialize)]
pub struct Blueprints {
    pub obstacles: HashMap<ObstacleKind, ObstacleBlueprint>,
}

#[derive(Debug)]
pub enum BlueprintLoadError {
    ReadingFile {
        error: io::Error,
        path: String,
        current_dir: String,
    },
    Parsing(SpannedError),
}

impl From<SpannedError> for BlueprintLoadError {
    fn from(value: SpannedError) -> Self {
        Self::Parsing(value)
    }
}

fn read_file(path: &str) -> Result<String, BlueprintLoadError> {
    read_to_string(path).map_err(|io_err| BlueprintLoadError::ReadingFile {
        error: io_err,
        path: path.to_string(),
        current_dir: std::env::current_dir()
            .map(|dir| dir.to_string_lossy().to_string())
            .unwrap_or_default(),
    })
}

impl Blueprints {
    /// Compiled-in table used when no asset override is supplied.
    pub fn defaults() -> Self {
        let obstacles = [
            (
                ObstacleKind::LowCover,
                ObstacleBlueprint {
                    height: 0.5,
                    blocks_sight: false,
                    partial_cover: true,
                    blocks_movement: true,
                    cover_value: 0.5,
                    movement_cost: f32::INFINITY,
                    destructible: true,
                    health: 2,
                },
            ),
            (
                ObstacleKind::HighWall,
                ObstacleBlueprint {
                    height: 1.5,
                    blocks_sight: true,
                    partial_cover: false,
                    blocks_movement: true,
                    cover_value: 1.0,
                    movement_cost: f32::INFINITY,
                    destructible: false,
                    health: 0,
                },
            ),
            (
                ObstacleKind::Terrain,
                ObstacleBlueprint {
                    height: 0.3,
                    blocks_sight: false,
                    partial_cover: true,
                    blocks_movement: false,
                    cover_value: 0.2,
                    movement_cost: 1.5,
                    destructible: false,
                    health: 0,
                },
            ),
        ];
        Self {
            obstacles: obstacles.into_iter().collect(),
        }
    }

    /// Loads an obstacle table from a ron asset.
    /// Kinds missing from the asset fall back to the compiled defaults in `get`.
    pub fn from_assets_location(path: &str) -> Result<Self, BlueprintLoadError> {
        let entries: Vec<(ObstacleKind, ObstacleBlueprint)> =
            ron::from_str(&read_file(path)?)?;
        Ok(Self {
            obstacles: entries.into_iter().collect(),
        })
    }

    /// Resolves the data for a kind, preferring the loaded table and
    /// falling back to the compiled default for that kind.
    pub fn get(&self, kind: ObstacleKind) -> ObstacleBlueprint {
        self.obstacles.get(&kind).cloned().unwrap_or_else(|| {
            Blueprints::defaults()
                .obstacles
                .remove(&kind)
                .unwrap_or_default()
        })
    }

    /// Startup check of every entry. Each violation is reported, a single
    /// failure makes the whole table invalid.
    pub fn validate(&self) -> bool {
        let mut valid = true;
        for (kind, bp) in &self.obstacles {
            if bp.height <= 0.0 {
                warn!(target: "blueprints", "{:?}: height {} is not positive", kind, bp.height);
                valid = false;
            }
            if !(0.0..=1.0).contains(&bp.cover_value) {
                warn!(target: "blueprints", "{:?}: cover value {} outside [0, 1]", kind, bp.cover_value);
                valid = false;
            }
            if bp.movement_cost < 0.0 {
                warn!(target: "blueprints", "{:?}: movement cost {} is negative", kind, bp.movement_cost);
                valid = false;
            }
        }
        valid
    }
}
