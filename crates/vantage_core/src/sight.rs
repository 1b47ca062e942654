use std::collections::HashMap;

use tracing::trace;

use crate::blueprints::Blueprints;
use crate::cell::Cell;
use crate::obstacle::{ObstacleId, ObstacleRegistry};
use crate::rules::Rules;

/// Sight rays sample at body height: half a unit above the cell floor.
pub const SAMPLE_HEIGHT: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Default, serde::Serialize, serde::Deserialize)]
pub struct WorldPos {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl WorldPos {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn distance(&self, other: WorldPos) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }
}

/// Mapping between grid cells and world space, supplied by the host.
/// Sight and cover degrade to permissive answers when absent.
pub trait GridContext {
    fn cell_to_world(&self, cell: Cell) -> WorldPos;
    fn contains(&self, cell: Cell) -> bool;
    fn size(&self) -> Cell;
}

/// A square grid of uniform cell size with its origin at world zero.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct UniformGrid {
    pub size: Cell,
    pub cell_size: f32,
}

impl UniformGrid {
    pub fn new(size: Cell, cell_size: f32) -> Self {
        Self { size, cell_size }
    }
}

impl GridContext for UniformGrid {
    fn cell_to_world(&self, cell: Cell) -> WorldPos {
        WorldPos::new(
            (cell.x as f32 + 0.5) * self.cell_size,
            0.0,
            (cell.z as f32 + 0.5) * self.cell_size,
        )
    }

    fn contains(&self, cell: Cell) -> bool {
        (0..self.size.x).contains(&cell.x) && (0..self.size.z).contains(&cell.z)
    }

    fn size(&self) -> Cell {
        self.size
    }
}

/// Nearest surface struck along a segment, as reported by the geometry
/// oracle. `obstacle` identifies the struck obstacle when the geometry
/// belongs to one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub distance: f32,
    pub height: f32,
    pub obstacle: Option<ObstacleId>,
}

/// Opaque geometry query: the first surface hit between two world points.
/// The engine never looks into the geometry itself, it only resolves the
/// reported obstacle against the registry and blueprints.
pub trait RayOracle {
    fn first_hit(&self, from: WorldPos, to: WorldPos) -> Option<RayHit>;
}

/// An oracle for worlds with no collision geometry: nothing is ever hit.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoGeometry;

impl RayOracle for NoGeometry {
    fn first_hit(&self, _from: WorldPos, _to: WorldPos) -> Option<RayHit> {
        None
    }
}

/// Everything a sight query needs besides the engine's own cache.
pub struct SightContext<'a> {
    pub rules: &'a Rules,
    pub grid: Option<&'a dyn GridContext>,
    pub oracle: &'a dyn RayOracle,
    pub registry: &'a ObstacleRegistry,
    pub blueprints: &'a Blueprints,
}

/// Cached line-of-sight queries between cells.
///
/// Results are cached under both directional keys. Any obstacle mutation
/// must clear the whole cache before the next query; a periodic clear
/// additionally bounds staleness and growth even if an invalidation is
/// somehow missed.
#[derive(Debug, Clone, Default)]
pub struct SightEngine {
    cache: HashMap<(Cell, Cell), bool>,
    ticks_since_clear: u32,
}

impl SightEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether an unobstructed sight line exists between the two cells at
    /// body height. Permissive when blocking is disabled, the cells are
    /// equal or no grid context is available.
    pub fn has_line_of_sight(&mut self, from: Cell, to: Cell, ctx: &SightContext) -> bool {
        if !ctx.rules.sight_blocking || from == to {
            return true;
        }
        let Some(grid) = ctx.grid else {
            return true;
        };
        if let Some(cached) = self.cache.get(&(from, to)) {
            return *cached;
        }

        let mut origin = grid.cell_to_world(from);
        let mut target = grid.cell_to_world(to);
        origin.y += SAMPLE_HEIGHT;
        target.y += SAMPLE_HEIGHT;

        let clear = match ctx.oracle.first_hit(origin, target) {
            Some(hit) => !Self::hit_blocks_sight(&hit, ctx),
            None => true,
        };

        self.cache.insert((from, to), clear);
        self.cache.insert((to, from), clear);
        clear
    }

    /// A hit blocks sight only when it belongs to a registered obstacle
    /// whose blueprint blocks sight at the struck height.
    fn hit_blocks_sight(hit: &RayHit, ctx: &SightContext) -> bool {
        let Some(obstacle) = hit.obstacle.and_then(|id| ctx.registry.get_by_id(id)) else {
            return false;
        };
        let bp = ctx.blueprints.get(obstacle.kind);
        bp.blocks_sight && hit.height <= bp.height
    }

    /// Drops every cached result. Called synchronously from every
    /// obstacle mutation.
    pub fn invalidate(&mut self) {
        if !self.cache.is_empty() {
            trace!(target: "sight", "cache invalidated, {} entries dropped", self.cache.len());
        }
        self.cache.clear();
    }

    /// Advances the periodic-clear counter by one engine tick.
    pub fn tick(&mut self, clear_interval: u32) {
        self.ticks_since_clear += 1;
        if clear_interval > 0 && self.ticks_since_clear >= clear_interval {
            trace!(target: "sight", "periodic cache clear after {} ticks", self.ticks_since_clear);
            self.cache.clear();
            self.ticks_since_clear = 0;
        }
    }

    pub fn cached_len(&self) -> usize {
        self.cache.len()
    }
}
