use std::collections::HashMap;

use tracing::{trace, warn};

use crate::blueprints::ObstacleKind;
use crate::cell::{iter_square, Cell};

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    serde::Serialize,
    serde::Deserialize,
    bincode::Encode,
    bincode::Decode,
)]
pub struct ObstacleId(pub u32);

impl ObstacleId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }
    pub fn get(&self) -> u32 {
        self.0
    }
}

/// A placed obstacle. The static data lives in the blueprint for its
/// kind; this struct holds what changes at runtime.
#[derive(
    Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize, bincode::Encode, bincode::Decode,
)]
pub struct Obstacle {
    pub id: ObstacleId,
    pub kind: ObstacleKind,
    pub at: Cell,
    /// Remaining health, meaningful only for destructible kinds
    pub health: i32,
}

impl Obstacle {
    pub fn new(id: ObstacleId, kind: ObstacleKind, at: Cell) -> Self {
        Self {
            id,
            kind,
            at,
            health: 0,
        }
    }
}

/// Coordinate index over the currently placed obstacles.
///
/// At most one obstacle occupies a cell; registering over an occupant
/// evicts it. The registry only indexes, obstacle lifetime is decided by
/// whoever registers and unregisters them. The cell map and the id map
/// always hold exactly the same set of obstacles.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ObstacleRegistry {
    by_cell: HashMap<Cell, ObstacleId>,
    obstacles: HashMap<ObstacleId, Obstacle>,
}

impl ObstacleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Places an obstacle, evicting and returning any prior occupant of
    /// the same cell. Eviction is a replacement, not an error.
    /// Re-registering an already known id drops its old cell entry, so
    /// the maps stay bijective.
    pub fn register(&mut self, obstacle: Obstacle) -> Option<Obstacle> {
        if let Some(prior) = self.obstacles.remove(&obstacle.id) {
            if self.by_cell.get(&prior.at) == Some(&obstacle.id) {
                self.by_cell.remove(&prior.at);
            }
        }
        let evicted = self
            .by_cell
            .get(&obstacle.at)
            .copied()
            .and_then(|prior| self.obstacles.remove(&prior));
        if let Some(prior) = &evicted {
            warn!(target: "registry",
                "obstacle {:?} replaced {:?} at {}", obstacle.id, prior.id, obstacle.at);
        }
        self.by_cell.insert(obstacle.at, obstacle.id);
        self.obstacles.insert(obstacle.id, obstacle);
        evicted
    }

    /// Removes an obstacle. The cell entry is dropped only while it still
    /// points at this obstacle, so unregistering something that has
    /// already been replaced at its cell does not disturb the replacement.
    pub fn unregister(&mut self, id: ObstacleId) -> Option<Obstacle> {
        let removed = self.obstacles.remove(&id)?;
        if self.by_cell.get(&removed.at) == Some(&id) {
            self.by_cell.remove(&removed.at);
        }
        Some(removed)
    }

    pub fn get(&self, cell: Cell) -> Option<&Obstacle> {
        self.by_cell
            .get(&cell)
            .and_then(|id| self.obstacles.get(id))
    }

    pub fn get_by_id(&self, id: ObstacleId) -> Option<&Obstacle> {
        self.obstacles.get(&id)
    }

    pub fn get_by_id_mut(&mut self, id: ObstacleId) -> Option<&mut Obstacle> {
        self.obstacles.get_mut(&id)
    }

    pub fn has(&self, cell: Cell) -> bool {
        self.by_cell.contains_key(&cell)
    }

    pub fn len(&self) -> usize {
        self.obstacles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.obstacles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Obstacle> {
        self.obstacles.values()
    }

    /// Obstacles within the inclusive square of `radius` around `center`,
    /// row-major by x then z.
    pub fn in_range(&self, center: Cell, radius: i32) -> impl Iterator<Item = &Obstacle> + '_ {
        iter_square(center, radius).filter_map(move |cell| self.get(cell))
    }

    /// Re-indexes a moved obstacle. The entry at `old` is removed only if
    /// it is still this obstacle; the insert at `new` evicts whatever sits
    /// there.
    pub fn position_changed(&mut self, id: ObstacleId, old: Cell, new: Cell) {
        if self.by_cell.get(&old) == Some(&id) {
            self.by_cell.remove(&old);
        }
        if let Some(prior) = self.by_cell.insert(new, id) {
            if prior != id {
                trace!(target: "registry",
                    "move of {:?} to {} displaced {:?}", id, new, prior);
                self.obstacles.remove(&prior);
            }
        }
        if let Some(obstacle) = self.obstacles.get_mut(&id) {
            obstacle.at = new;
        }
    }
}
