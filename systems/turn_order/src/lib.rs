#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that schedules turns by initiative and decides when a match ends.

use std::collections::BTreeMap;

use skirmish_core::{Command, EntityId, Event, TeamId, TurnQueueView, TurnSlot};

/// Initiative-driven turn scheduler.
///
/// Lower current initiative acts sooner. Whenever a turn has to start the
/// queue is stably re-sorted, the first living character is chosen and its
/// initiative is debited from every living character.
#[derive(Debug, Default)]
pub struct TurnScheduler {
    teams: Vec<TeamId>,
    acting: Option<EntityId>,
    finished: bool,
    order_scratch: Vec<TurnSlot>,
}

impl TurnScheduler {
    /// Creates a scheduler waiting for the match to start.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a scheduler that also counts `teams` when deciding the outcome,
    /// so a team that fielded no characters loses instead of being ignored.
    #[must_use]
    pub fn with_teams(teams: Vec<TeamId>) -> Self {
        Self {
            teams,
            ..Self::default()
        }
    }

    /// Consumes world events and the current turn queue to emit scheduling commands.
    pub fn handle(&mut self, events: &[Event], queue: &TurnQueueView, out: &mut Vec<Command>) {
        let mut advance = false;
        for event in events {
            match event {
                Event::MatchStarted => advance = true,
                Event::TurnStarted { entity } => {
                    self.acting = Some(*entity);
                    advance = false;
                }
                Event::TurnEnded { entity } => {
                    if self.acting == Some(*entity) {
                        self.acting = None;
                    }
                    advance = true;
                }
                Event::EntityRemoved { entity } if self.acting == Some(*entity) => {
                    self.acting = None;
                    advance = true;
                }
                Event::MatchFinished { .. } => self.finished = true,
                _ => {}
            }
        }

        if self.finished || !advance {
            return;
        }

        if let Some(winner) = decided_outcome(&self.teams, queue) {
            out.push(Command::FinishMatch { winner });
            return;
        }

        self.begin_turn(queue, out);
    }

    /// Character the scheduler last handed the turn to.
    #[must_use]
    pub const fn acting(&self) -> Option<EntityId> {
        self.acting
    }

    fn begin_turn(&mut self, queue: &TurnQueueView, out: &mut Vec<Command>) {
        self.order_scratch.clear();
        self.order_scratch.extend(queue.iter().copied());
        self.order_scratch.sort_by_key(|slot| slot.initiative);

        let reordered = self
            .order_scratch
            .iter()
            .zip(queue.iter())
            .any(|(sorted, current)| sorted.entity != current.entity);
        if reordered {
            out.push(Command::ReorderTurnQueue {
                order: self.order_scratch.iter().map(|slot| slot.entity).collect(),
            });
        }

        let Some(actor) = self.order_scratch.iter().find(|slot| slot.alive) else {
            out.push(Command::FinishMatch { winner: None });
            return;
        };

        out.push(Command::DebitInitiative {
            amount: actor.initiative,
        });
        out.push(Command::BeginTurn {
            entity: actor.entity,
        });
    }
}

/// Counts living characters per team and reports the outcome once any team
/// has none left.
///
/// Every team in `teams` starts at zero, then each team seen in the queue is
/// counted. Returns `None` while every team is still standing, `Some(Some(team))`
/// when exactly one team survives and `Some(None)` when no team does.
#[must_use]
pub fn decided_outcome(teams: &[TeamId], queue: &TurnQueueView) -> Option<Option<TeamId>> {
    let mut living: BTreeMap<TeamId, usize> = teams.iter().map(|team| (*team, 0)).collect();
    for slot in queue.iter() {
        *living.entry(slot.team).or_default() += usize::from(slot.alive);
    }

    if living.values().all(|count| *count > 0) {
        return None;
    }

    let mut survivors = living
        .into_iter()
        .filter(|(_, count)| *count > 0)
        .map(|(team, _)| team);
    let winner = survivors.next().filter(|_| survivors.next().is_none());
    Some(winner)
}
