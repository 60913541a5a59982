//! Turn queue storage and the match phase state machine.

use skirmish_core::{EntityId, MatchPhase};

#[derive(Debug, Default)]
pub(crate) struct TurnState {
    queue: Vec<EntityId>,
    phase: MatchPhase,
}

impl TurnState {
    pub(crate) fn enqueue(&mut self, entity: EntityId) {
        self.queue.push(entity);
    }

    pub(crate) fn queue(&self) -> &[EntityId] {
        &self.queue
    }

    pub(crate) const fn phase(&self) -> MatchPhase {
        self.phase
    }

    pub(crate) fn set_phase(&mut self, phase: MatchPhase) {
        self.phase = phase;
    }

    /// Replaces the queue with `order` when it is a permutation of the queue.
    ///
    /// Returns `false` and leaves the queue untouched otherwise.
    pub(crate) fn reorder(&mut self, order: Vec<EntityId>) -> bool {
        if order.len() != self.queue.len() {
            return false;
        }

        let mut expected = self.queue.clone();
        let mut proposed = order.clone();
        expected.sort_unstable();
        proposed.sort_unstable();
        if expected != proposed {
            return false;
        }

        self.queue = order;
        true
    }
}
