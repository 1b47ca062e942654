use crate::cell::Cell;
use crate::is_default;

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
pub struct TeamId(pub u32);

impl TeamId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }
    pub fn get(&self) -> u32 {
        self.0
    }
}

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
pub struct CombatantId(pub u32);

impl CombatantId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }
    pub fn get(&self) -> u32 {
        self.0
    }
}

/// What an attacking entity exposes. Stateless contract; the implementer
/// owns the real state.
pub trait Attacker {
    fn attack_cell(&self) -> Cell;
    fn attack_team(&self) -> TeamId;
    fn base_damage(&self) -> i32;
    fn attack_range(&self) -> i32;
    fn attacks_per_turn(&self) -> i32;
    fn diagonal_attacks(&self) -> bool;
    fn attack_enabled(&self) -> bool;
}

/// What a targetable entity exposes to validation and the damage
/// pipeline.
pub trait Targetable {
    fn target_cell(&self) -> Cell;
    fn target_team(&self) -> TeamId;
    fn health(&self) -> i32;
    fn max_health(&self) -> i32;
    fn is_alive(&self) -> bool;
    fn can_be_targeted(&self) -> bool;
    fn is_invulnerable(&self) -> bool;
}

/// Attack stats carried by a unit-backed combatant.
#[derive(
    Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize, bincode::Encode, bincode::Decode,
)]
#[serde(default)]
pub struct AttackStats {
    pub damage: i32,
    pub range: i32,
    pub attacks_per_turn: i32,
    #[serde(default, skip_serializing_if = "is_default")]
    pub diagonal: bool,
    pub enabled: bool,
}

impl Default for AttackStats {
    fn default() -> Self {
        Self {
            damage: 1,
            range: 1,
            attacks_per_turn: 1,
            diagonal: false,
            enabled: true,
        }
    }
}

/// A unit on the battlefield, implementing both capability contracts.
///
/// Health stays in [0, max_health]; when it reaches 0 the combatant dies
/// and stops being targetable until revived.
#[derive(
    Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize, bincode::Encode, bincode::Decode,
)]
#[serde(default)]
pub struct Combatant {
    pub id: CombatantId,
    pub team: TeamId,
    pub at: Cell,
    pub stats: AttackStats,

    pub health: i32,
    pub max_health: i32,
    pub alive: bool,
    pub targetable: bool,

    #[serde(default, skip_serializing_if = "is_default")]
    pub invulnerable: bool,
    /// Seconds of invulnerability left; `None` while invulnerable means
    /// it stays until cleared explicitly
    #[serde(default, skip_serializing_if = "is_default")]
    pub invulnerability_timer: Option<f32>,

    /// Flat damage absorbed from every hit before health mutates
    #[serde(default, skip_serializing_if = "is_default")]
    pub damage_reduction: i32,
    /// Fraction of applied damage returned to the attacker, 0 disables
    #[serde(default, skip_serializing_if = "is_default")]
    pub reflect_fraction: f32,
    #[serde(default, skip_serializing_if = "is_default")]
    pub death_immune: bool,

    /// Lookup relation only, never ownership
    #[serde(default, skip_serializing_if = "is_default")]
    pub last_attacker: Option<CombatantId>,
    #[serde(default, skip_serializing_if = "is_default")]
    pub damage_taken: i32,
    /// Attacks remaining this turn, reset by `Battlefield::refresh_turn`
    pub attacks_left: i32,
}

impl Default for Combatant {
    fn default() -> Self {
        Self {
            id: CombatantId::default(),
            team: TeamId::default(),
            at: Cell::ZERO,
            stats: AttackStats::default(),
            health: 10,
            max_health: 10,
            alive: true,
            targetable: true,
            invulnerable: false,
            invulnerability_timer: None,
            damage_reduction: 0,
            reflect_fraction: 0.0,
            death_immune: false,
            last_attacker: None,
            damage_taken: 0,
            attacks_left: 1,
        }
    }
}

impl Combatant {
    pub fn new(id: CombatantId, team: TeamId, at: Cell) -> Self {
        Self {
            id,
            team,
            at,
            ..Default::default()
        }
    }

    pub fn with_health(mut self, health: i32) -> Self {
        self.health = health;
        self.max_health = health.max(self.max_health);
        self
    }

    /// Grants invulnerability, timed when a duration is given, sticky
    /// otherwise.
    pub fn set_invulnerable(&mut self, duration: Option<f32>) {
        self.invulnerable = true;
        self.invulnerability_timer = duration;
    }

    pub fn clear_invulnerable(&mut self) {
        self.invulnerable = false;
        self.invulnerability_timer = None;
    }
}

impl Attacker for Combatant {
    fn attack_cell(&self) -> Cell {
        self.at
    }
    fn attack_team(&self) -> TeamId {
        self.team
    }
    fn base_damage(&self) -> i32 {
        self.stats.damage
    }
    fn attack_range(&self) -> i32 {
        self.stats.range
    }
    fn attacks_per_turn(&self) -> i32 {
        self.stats.attacks_per_turn
    }
    fn diagonal_attacks(&self) -> bool {
        self.stats.diagonal
    }
    fn attack_enabled(&self) -> bool {
        self.stats.enabled && self.alive
    }
}

impl Targetable for Combatant {
    fn target_cell(&self) -> Cell {
        self.at
    }
    fn target_team(&self) -> TeamId {
        self.team
    }
    fn health(&self) -> i32 {
        self.health
    }
    fn max_health(&self) -> i32 {
        self.max_health
    }
    fn is_alive(&self) -> bool {
        self.alive
    }
    fn can_be_targeted(&self) -> bool {
        self.targetable
    }
    fn is_invulnerable(&self) -> bool {
        self.invulnerable
    }
}

/// Outcome of target validation. Immutable once produced; callers branch
/// on `valid` and surface `reason` to logs or UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetValidation {
    pub valid: bool,
    pub reason: String,
    pub attacker: Option<CombatantId>,
    pub target: CombatantId,
}

impl TargetValidation {
    pub fn ok(attacker: Option<CombatantId>, target: CombatantId) -> Self {
        Self {
            valid: true,
            reason: String::new(),
            attacker,
            target,
        }
    }

    pub fn fail(attacker: Option<CombatantId>, target: CombatantId, reason: &str) -> Self {
        Self {
            valid: false,
            reason: reason.to_string(),
            attacker,
            target,
        }
    }
}

/// Outcome of a resolved attack.
#[derive(Debug, Clone, PartialEq)]
pub struct AttackReport {
    pub success: bool,
    pub message: String,
    pub attacker: CombatantId,
    pub target: CombatantId,
    pub damage_applied: i32,
    /// Cover between the two cells at resolution time, informational
    pub cover: f32,
}

/// Ordered validation, first failure wins: attacker presence, target
/// self-state, attacker capability, team equality, identity.
pub fn validate_as_target(
    attacker: Option<(CombatantId, &dyn Attacker)>,
    target: (CombatantId, &dyn Targetable),
) -> TargetValidation {
    let (target_id, target) = target;
    let Some((attacker_id, attacker)) = attacker else {
        return TargetValidation::fail(None, target_id, "no attacker");
    };
    let attacker_ref = Some(attacker_id);
    if !target.can_be_targeted() {
        return TargetValidation::fail(attacker_ref, target_id, "target cannot be targeted");
    }
    if !target.is_alive() {
        return TargetValidation::fail(attacker_ref, target_id, "target is dead");
    }
    if target.is_invulnerable() {
        return TargetValidation::fail(attacker_ref, target_id, "target is invulnerable");
    }
    if !attacker.attack_enabled() {
        return TargetValidation::fail(attacker_ref, target_id, "attacker cannot attack");
    }
    if attacker.attack_team() == target.target_team() {
        return TargetValidation::fail(attacker_ref, target_id, "target is an ally");
    }
    if attacker_id == target_id {
        return TargetValidation::fail(attacker_ref, target_id, "cannot target self");
    }
    TargetValidation::ok(attacker_ref, target_id)
}
