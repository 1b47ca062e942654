use crate::blueprints::ObstacleKind;
use crate::cell::Cell;
use crate::combat::CombatantId;
use crate::obstacle::ObstacleId;

/// Everything the battlefield announces to presentation-layer listeners.
/// Delivery is synchronous and best-effort; nothing is persisted or
/// retried.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    ObstacleAdded {
        id: ObstacleId,
        kind: ObstacleKind,
        at: Cell,
    },
    ObstacleRemoved {
        id: ObstacleId,
        at: Cell,
    },
    SightChecked {
        from: Cell,
        to: Cell,
        clear: bool,
    },
    DamageTaken {
        target: CombatantId,
        attacker: Option<CombatantId>,
        amount: i32,
    },
    DamageReduced {
        target: CombatantId,
        absorbed: i32,
    },
    DamageReflected {
        target: CombatantId,
        onto: CombatantId,
        amount: i32,
    },
    HealthChanged {
        target: CombatantId,
        health: i32,
        max_health: i32,
        attacker: Option<CombatantId>,
    },
    Died {
        target: CombatantId,
        killer: Option<CombatantId>,
    },
    Revived {
        target: CombatantId,
        health: i32,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(u32);

/// Multi-subscriber callback registration. Subscribers are called in
/// registration order; cancellation is an explicit unsubscribe.
#[derive(Default)]
pub struct EventBus {
    subscribers: Vec<(SubscriberId, Box<dyn FnMut(&Event)>)>,
    next_id: u32,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, callback: impl FnMut(&Event) + 'static) -> SubscriberId {
        let id = SubscriberId(self.next_id);
        self.next_id += 1;
        self.subscribers.push((id, Box::new(callback)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriberId) {
        self.subscribers.retain(|(sub, _)| *sub != id);
    }

    pub fn emit(&mut self, event: &Event) {
        for (_, callback) in self.subscribers.iter_mut() {
            callback(event);
        }
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}
