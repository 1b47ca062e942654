use std::sync::Arc;

use clap::Parser;
use tracing::{info, warn, Level};
use vantage_core::prelude::*;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Obstacle table ron asset, compiled defaults when absent
    #[arg(short, long)]
    obstacles: Option<String>,

    /// Rules ron asset
    #[arg(short, long)]
    rules: Option<String>,

    /// Engine ticks to run after the skirmish
    #[arg(short, long, default_value_t = 10)]
    ticks: u32,
}

fn setup_tracing() {
    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber)
        .map_err(|_err| eprintln!("Unable to set global default subscriber"));
}

fn load_blueprints(path: Option<&str>) -> Blueprints {
    let Some(path) = path else {
        return Blueprints::defaults();
    };
    match Blueprints::from_assets_location(path) {
        Ok(bp) if bp.validate() => bp,
        Ok(_) => {
            warn!(target: "demo", "obstacle table at {} failed validation, using defaults", path);
            Blueprints::defaults()
        }
        Err(err) => {
            warn!(target: "demo", "could not load obstacle table at {}: {:?}", path, err);
            Blueprints::defaults()
        }
    }
}

fn load_rules(path: Option<&str>) -> Rules {
    let Some(path) = path else {
        return Rules::default();
    };
    std::fs::read_to_string(path)
        .ok()
        .and_then(|raw| Rules::from_string(&raw).ok())
        .unwrap_or_else(|| {
            warn!(target: "demo", "could not load rules at {}, using defaults", path);
            Rules::default()
        })
}

/// Demo geometry: every wall fills its cell as a block of the blueprint
/// height. A real host plugs its physics world in here instead.
struct BlockWorld {
    walls: Vec<(Cell, f32, ObstacleId)>,
}

impl RayOracle for BlockWorld {
    fn first_hit(&self, from: WorldPos, to: WorldPos) -> Option<RayHit> {
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
                        obstacle: Some(*id),
                    });
                }
            }
        }
        None
    }
}

fn main() {
    setup_tracing();
    let args = Args::parse();

    let bp = Arc::new(load_blueprints(args.obstacles.as_deref()));
    let rules = load_rules(args.rules.as_deref());

    let layout = [
        (ObstacleKind::HighWall, c!(4, 3)),
        (ObstacleKind::HighWall, c!(4, 4)),
        (ObstacleKind::LowCover, c!(4, 5)),
        (ObstacleKind::Terrain, c!(2, 5)),
    ];
    let walls = layout
        .iter()
        .enumerate()
        .map(|(i, (kind, at))| (*at, bp.get(*kind).height, ObstacleId::new(i as u32)))
        .collect();

    let grid = UniformGrid::new(c!(12, 12), 1.0);
    let mut field = Battlefield::new(
        bp,
        rules,
        Some(Box::new(grid)),
        Box::new(BlockWorld { walls }),
    );
    field.subscribe(|event| info!(target: "events", "{:?}", event));

    for (kind, at) in layout {
        field.spawn_obstacle(kind, at);
    }

    let mut archer = Combatant::new(CombatantId::new(0), TeamId::new(0), c!(1, 4)).with_health(12);
    archer.stats.damage = 3;
    archer.stats.range = 8;
    let raider = Combatant::new(CombatantId::new(1), TeamId::new(1), c!(7, 4)).with_health(10);
    let scout = Combatant::new(CombatantId::new(2), TeamId::new(1), c!(7, 6)).with_health(8);
    field.add_combatant(archer);
    field.add_combatant(raider);
    field.add_combatant(scout);

    // the wall pair blocks this lane
    let report = field.resolve_attack(CombatantId::new(0), CombatantId::new(1));
    info!(target: "demo", "archer vs raider: {:?}", report);

    // clear past the low cover
    field.refresh_turn();
    let report = field.resolve_attack(CombatantId::new(0), CombatantId::new(2));
    info!(target: "demo", "archer vs scout: {:?}", report);

    for _ in 0..args.ticks {
        field.advance(0.1);
    }
    info!(target: "demo", "done after {} ticks", args.ticks);
}
