//! Virtual-time event queue
//!
//! Deferred actions (staggered kart release, item grants) are queued against
//! the simulation clock instead of a host timer. Every event is stamped with
//! the world generation it was scheduled in; after a reset, events from an
//! older generation are dropped instead of acting on the new world.

use serde::{Deserialize, Serialize};

/// A deferred action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventKind {
    /// Release the kart at this roster index and queue the next one
    ReleaseKart { index: usize },
    /// Hand an item to a kart that touched a box
    GrantItem { kart_id: u32 },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ScheduledEvent {
    at_ms: f64,
    seq: u64,
    generation: u32,
    kind: EventKind,
}

/// Pending events, ordered by due time then insertion order
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Schedule {
    events: Vec<ScheduledEvent>,
    next_seq: u64,
    generation: u32,
}

impl Schedule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Queue `kind` to fire at virtual time `at_ms`
    pub fn push(&mut self, at_ms: f64, kind: EventKind) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.events.push(ScheduledEvent {
            at_ms,
            seq,
            generation: self.generation,
            kind,
        });
    }

    /// Is an event matching `pred` still waiting?
    pub fn contains(&self, pred: impl Fn(&EventKind) -> bool) -> bool {
        self.events
            .iter()
            .any(|e| e.generation == self.generation && pred(&e.kind))
    }

    /// Remove and return every event due at `now_ms`, in firing order.
    /// Events from an older generation are discarded.
    pub fn drain_due(&mut self, now_ms: f64) -> Vec<EventKind> {
        let generation = self.generation;
        let mut due = Vec::new();
        self.events.retain(|e| {
            if e.generation != generation {
                return false;
            }
            if e.at_ms <= now_ms {
                due.push((e.at_ms, e.seq, e.kind));
                return false;
            }
            true
        });
        due.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
        due.into_iter().map(|(_, _, kind)| kind).collect()
    }

    /// Drop everything and start a new generation
    pub fn reset(&mut self) -> u32 {
        self.events.clear();
        self.bump_generation()
    }

    fn bump_generation(&mut self) -> u32 {
        self.generation = self.generation.wrapping_add(1);
        self.generation
    }
}
