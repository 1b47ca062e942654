use std::rc::Rc;
use std::sync::Arc;

use crate::prelude::*;

/// Axis-aligned block geometry for tests: each wall fills one cell up to
/// the given height. Counts oracle calls so tests can assert on cache
/// hits and misses.
pub struct BlockOracle {
    pub walls: Vec<(Cell, f32, Option<ObstacleId>)>,
    pub calls: Rc<std::cell::Cell<u32>>,
}

impl RayOracle for BlockOracle {
    fn first_hit(&self, from: WorldPos, to: WorldPos) -> Option<RayHit> {
        self.calls.set(self.calls.get() + 1);
        let dist = from.distance(to);
        if dist == 0.0 {
            return None;
        }
        let steps = (dist / 0.05).ceil() as i32;
        for i in 1..steps {
            let t = i as f32 / steps as f32;
            let x = from.x + (to.x - from.x) * t;
            let z = from.z + (to.z - from.z) * t;
            let cell = Cell::new(x.floor() as i32, z.floor() as i32);
            for (wall, height, id) in &self.walls {
                if *wall == cell && from.y <= *height {
                    return Some(RayHit {
                        distance: dist * t,
                        height: from.y,
                        obstacle: *id,
                    });
                }
            }
        }
        None
    }
}

/// An 8x8 battlefield with default blueprints and the given walls baked
/// into the oracle geometry.
pub fn test_field(
    rules: Rules,
    walls: Vec<(Cell, f32, Option<ObstacleId>)>,
) -> (Battlefield, Rc<std::cell::Cell<u32>>) {
    let calls = Rc::new(std::cell::Cell::new(0));
    let oracle = BlockOracle {
        walls,
        calls: calls.clone(),
    };
    let grid = UniformGrid::new(Cell::new(8, 8), 1.0);
    let field = Battlefield::new(
        Arc::new(Blueprints::defaults()),
        rules,
        Some(Box::new(grid)),
        Box::new(oracle),
    );
    (field, calls)
}

/// A battlefield with no grid context, for the permissive degradation
/// paths.
pub fn gridless_field(rules: Rules) -> Battlefield {
    Battlefield::new(
        Arc::new(Blueprints::defaults()),
        rules,
        None,
        Box::new(NoGeometry),
    )
}

pub fn fighter(id: u32, team: u32, at: Cell) -> Combatant {
    Combatant::new(CombatantId::new(id), TeamId::new(team), at)
}
