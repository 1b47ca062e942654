use std::collections::HashMap;
use std::sync::Arc;

use tracing::trace;

use crate::blueprints::{Blueprints, ObstacleKind};
use crate::cell::Cell;
use crate::combat::{
    validate_as_target, Attacker, AttackReport, Combatant, CombatantId, TargetValidation,
    Targetable,
};
use crate::cover::cover_between;
use crate::events::{Event, EventBus, SubscriberId};
use crate::obstacle::{Obstacle, ObstacleId, ObstacleRegistry};
use crate::rules::Rules;
use crate::sight::{GridContext, RayOracle, SightContext, SightEngine};

/// The battlefield aggregate: obstacle registry, sight engine, combatants
/// and the event bus, with the grid context and ray oracle injected at
/// construction.
///
/// The registry map and the sight cache are never handed out for direct
/// mutation; every layout change goes through the methods here so the
/// cache is invalidated before the next query can observe the new layout.
pub struct Battlefield {
    pub bp: Arc<Blueprints>,
    pub rules: Rules,
    registry: ObstacleRegistry,
    sight: SightEngine,
    combatants: HashMap<CombatantId, Combatant>,
    events: EventBus,
    grid: Option<Box<dyn GridContext>>,
    oracle: Box<dyn RayOracle>,
    next_obstacle_id: u32,
}

impl Battlefield {
    pub fn new(
        bp: Arc<Blueprints>,
        rules: Rules,
        grid: Option<Box<dyn GridContext>>,
        oracle: Box<dyn RayOracle>,
    ) -> Self {
        Self {
            bp,
            rules,
            registry: ObstacleRegistry::new(),
            sight: SightEngine::new(),
            combatants: HashMap::new(),
            events: EventBus::new(),
            grid,
            oracle,
            next_obstacle_id: 0,
        }
    }

    pub fn registry(&self) -> &ObstacleRegistry {
        &self.registry
    }

    pub fn subscribe(&mut self, callback: impl FnMut(&Event) + 'static) -> SubscriberId {
        self.events.subscribe(callback)
    }

    pub fn unsubscribe(&mut self, id: SubscriberId) {
        self.events.unsubscribe(id);
    }

    // ------------------------------------------------------------------
    // obstacles
    // ------------------------------------------------------------------

    /// Creates and registers an obstacle of `kind` at `at`, with health
    /// taken from its blueprint.
    pub fn spawn_obstacle(&mut self, kind: ObstacleKind, at: Cell) -> ObstacleId {
        let id = ObstacleId::new(self.next_obstacle_id);
        self.next_obstacle_id += 1;
        let mut obstacle = Obstacle::new(id, kind, at);
        obstacle.health = self.bp.get(kind).health;
        self.register_obstacle(obstacle);
        id
    }

    /// Registers an externally created obstacle, evicting any prior
    /// occupant of the cell.
    pub fn register_obstacle(&mut self, obstacle: Obstacle) {
        let (id, kind, at) = (obstacle.id, obstacle.kind, obstacle.at);
        let evicted = self.registry.register(obstacle);
        self.sight.invalidate();
        if let Some(prior) = evicted {
            self.events.emit(&Event::ObstacleRemoved {
                id: prior.id,
                at: prior.at,
            });
        }
        self.events.emit(&Event::ObstacleAdded { id, kind, at });
    }

    pub fn remove_obstacle(&mut self, id: ObstacleId) -> Option<Obstacle> {
        let removed = self.registry.unregister(id)?;
        self.sight.invalidate();
        self.events.emit(&Event::ObstacleRemoved {
            id: removed.id,
            at: removed.at,
        });
        Some(removed)
    }

    /// Re-indexes a moved obstacle, silently displacing any occupant of
    /// the destination cell.
    pub fn move_obstacle(&mut self, id: ObstacleId, to: Cell) {
        let Some(old) = self.registry.get_by_id(id).map(|o| o.at) else {
            return;
        };
        self.registry.position_changed(id, old, to);
        self.sight.invalidate();
    }

    /// Damages a destructible obstacle, removing it when its health is
    /// exhausted. Returns true when the obstacle was destroyed.
    pub fn damage_obstacle(&mut self, id: ObstacleId, amount: i32) -> bool {
        if amount <= 0 {
            return false;
        }
        let Some(obstacle) = self.registry.get_by_id_mut(id) else {
            return false;
        };
        if !self.bp.get(obstacle.kind).destructible {
            return false;
        }
        obstacle.health = (obstacle.health - amount).max(0);
        let destroyed = obstacle.health == 0;
        if destroyed {
            trace!(target: "registry", "obstacle {:?} destroyed", id);
            self.remove_obstacle(id);
        }
        destroyed
    }

    /// Obstacles within the inclusive square of `radius` around `center`,
    /// limited to valid grid cells, row-major by x then z.
    pub fn obstacles_in_range(&self, center: Cell, radius: i32) -> Vec<&Obstacle> {
        self.registry
            .in_range(center, radius)
            .filter(|obstacle| match &self.grid {
                Some(grid) => grid.contains(obstacle.at),
                None => true,
            })
            .collect()
    }

    // ------------------------------------------------------------------
    // sight and cover
    // ------------------------------------------------------------------

    pub fn has_line_of_sight(&mut self, from: Cell, to: Cell) -> bool {
        let ctx = SightContext {
            rules: &self.rules,
            grid: self.grid.as_deref(),
            oracle: self.oracle.as_ref(),
            registry: &self.registry,
            blueprints: &self.bp,
        };
        let clear = self.sight.has_line_of_sight(from, to, &ctx);
        self.events.emit(&Event::SightChecked { from, to, clear });
        clear
    }

    /// Maximum cover between two cells; zero without a grid context.
    pub fn cover_between(&self, from: Cell, to: Cell) -> f32 {
        if self.grid.is_none() {
            return 0.0;
        }
        cover_between(from, to, &self.rules, &self.registry, &self.bp)
    }

    // ------------------------------------------------------------------
    // combatants
    // ------------------------------------------------------------------

    pub fn add_combatant(&mut self, combatant: Combatant) -> CombatantId {
        let id = combatant.id;
        self.combatants.insert(id, combatant);
        id
    }

    pub fn combatant(&self, id: CombatantId) -> Option<&Combatant> {
        self.combatants.get(&id)
    }

    pub fn combatant_mut(&mut self, id: CombatantId) -> Option<&mut Combatant> {
        self.combatants.get_mut(&id)
    }

    pub fn validate_as_target(
        &self,
        attacker: Option<CombatantId>,
        target: CombatantId,
    ) -> TargetValidation {
        let Some(target_ref) = self.combatants.get(&target) else {
            return TargetValidation::fail(attacker, target, "unknown target");
        };
        let attacker_ref = attacker
            .and_then(|id| self.combatants.get(&id))
            .map(|combatant| (combatant.id, combatant as &dyn Attacker));
        validate_as_target(attacker_ref, (target, target_ref as &dyn Targetable))
    }

    /// Full attack resolution: validation, range, line of sight, then the
    /// damage pipeline. The report carries the cover between the two
    /// cells for the caller's hit presentation.
    pub fn resolve_attack(&mut self, attacker: CombatantId, target: CombatantId) -> AttackReport {
        let fail = |message: &str| AttackReport {
            success: false,
            message: message.to_string(),
            attacker,
            target,
            damage_applied: 0,
            cover: 0.0,
        };

        let validation = self.validate_as_target(Some(attacker), target);
        if !validation.valid {
            return fail(&validation.reason);
        }
        // both ends exist past validation
        let (from, damage, range, diagonal, attacks_left) = {
            let a = &self.combatants[&attacker];
            (
                a.at,
                a.stats.damage,
                a.stats.range,
                a.stats.diagonal,
                a.attacks_left,
            )
        };
        let to = self.combatants[&target].at;

        let distance = if diagonal {
            from.chebyshev(to)
        } else {
            from.manhattan(to)
        };
        if distance > range {
            return fail("target out of range");
        }
        if attacks_left <= 0 {
            return fail("no attacks left this turn");
        }
        if !self.has_line_of_sight(from, to) {
            return fail("no line of sight");
        }

        let cover = self.cover_between(from, to);
        let applied = self.take_damage(target, damage, Some(attacker));
        if let Some(a) = self.combatants.get_mut(&attacker) {
            a.attacks_left -= 1;
        }
        trace!(target: "combat",
            "{:?} hit {:?} for {} (cover {})", attacker, target, applied, cover);
        AttackReport {
            success: true,
            message: String::new(),
            attacker,
            target,
            damage_applied: applied,
            cover,
        }
    }

    /// The damage pipeline: rejection, flat reduction, clamped health
    /// mutation, death transition, events, reflection. Returns the damage
    /// actually applied, the real health delta.
    pub fn take_damage(
        &mut self,
        target: CombatantId,
        amount: i32,
        attacker: Option<CombatantId>,
    ) -> i32 {
        self.apply_damage(target, amount, attacker, false)
    }

    fn apply_damage(
        &mut self,
        target_id: CombatantId,
        amount: i32,
        attacker: Option<CombatantId>,
        reflected: bool,
    ) -> i32 {
        let Some(target) = self.combatants.get_mut(&target_id) else {
            return 0;
        };
        if amount <= 0 || !target.alive || target.invulnerable || !target.targetable {
            return 0;
        }

        let reduced = (amount - target.damage_reduction).max(0);
        let absorbed = amount - reduced;
        let before = target.health;
        target.health = (target.health - reduced).max(0);
        let actual = before - target.health;
        target.damage_taken += actual;
        if attacker.is_some() {
            target.last_attacker = attacker;
        }

        let died = target.health == 0 && !target.death_immune;
        if died {
            target.alive = false;
            target.targetable = false;
        }
        let health = target.health;
        let max_health = target.max_health;
        let reflect_fraction = target.reflect_fraction;

        if absorbed > 0 {
            self.events.emit(&Event::DamageReduced {
                target: target_id,
                absorbed,
            });
        }
        // zero-delta notifications are intentional, listeners must
        // tolerate no-op damage and health events
        self.events.emit(&Event::DamageTaken {
            target: target_id,
            attacker,
            amount: actual,
        });
        self.events.emit(&Event::HealthChanged {
            target: target_id,
            health,
            max_health,
            attacker,
        });
        if died {
            trace!(target: "combat", "{:?} died to {:?}", target_id, attacker);
            self.events.emit(&Event::Died {
                target: target_id,
                killer: attacker,
            });
        }

        // Reflection never chains: a reflected hit carries no attacker
        // and the explicit flag bars it from reflecting again, so two
        // mutually reflecting combatants cannot loop.
        if self.rules.damage_reflection && !reflected && reflect_fraction > 0.0 {
            if let Some(attacker_id) = attacker {
                if self.combatants.contains_key(&attacker_id) {
                    let reflect = (actual as f32 * reflect_fraction).round() as i32;
                    if reflect > 0 {
                        self.events.emit(&Event::DamageReflected {
                            target: target_id,
                            onto: attacker_id,
                            amount: reflect,
                        });
                        self.apply_damage(attacker_id, reflect, None, true);
                    }
                }
            }
        }

        actual
    }

    /// Restores health up to the maximum. No-op on the dead.
    pub fn heal(&mut self, target_id: CombatantId, amount: i32) -> i32 {
        let Some(target) = self.combatants.get_mut(&target_id) else {
            return 0;
        };
        if !target.alive || amount <= 0 {
            return 0;
        }
        let gain = amount.min(target.max_health - target.health);
        target.health += gain;
        let health = target.health;
        let max_health = target.max_health;
        self.events.emit(&Event::HealthChanged {
            target: target_id,
            health,
            max_health,
            attacker: None,
        });
        gain
    }

    /// Brings a dead combatant back, targetable again, at the given
    /// health clamped to [1, max] or at full health when unspecified.
    pub fn revive(&mut self, target_id: CombatantId, health: Option<i32>) {
        let Some(target) = self.combatants.get_mut(&target_id) else {
            return;
        };
        if target.alive {
            return;
        }
        target.alive = true;
        target.targetable = true;
        target.health = health
            .unwrap_or(target.max_health)
            .clamp(1, target.max_health);
        let health = target.health;
        self.events.emit(&Event::Revived {
            target: target_id,
            health,
        });
    }

    /// Resets every combatant's attack allowance for a new turn.
    pub fn refresh_turn(&mut self) {
        for combatant in self.combatants.values_mut() {
            combatant.attacks_left = combatant.stats.attacks_per_turn;
        }
    }

    /// One engine tick: counts down timed invulnerability and advances
    /// the periodic sight-cache clear.
    pub fn advance(&mut self, dt: f32) {
        for combatant in self.combatants.values_mut() {
            if !combatant.invulnerable {
                continue;
            }
            // no timer means sticky invulnerability
            if let Some(timer) = &mut combatant.invulnerability_timer {
                *timer = (*timer - dt).max(0.0);
                if *timer == 0.0 {
                    combatant.clear_invulnerable();
                }
            }
        }
        self.sight.tick(self.rules.cache_clear_ticks);
    }

    #[cfg(test)]
    pub(crate) fn sight_cache_len(&self) -> usize {
        self.sight.cached_len()
    }
}
