#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Skirmish.
//!
//! The [`World`] aggregate owns the tile grid, the entity registry, the turn
//! queue and the selection set. It is mutated exclusively through [`apply`],
//! which reports every change as an [`Event`]. Read access goes through the
//! [`query`] module.

mod grid;
mod registry;
mod selection;
mod turns;

use skirmish_core::{Command, EntityId, Event, MatchPhase, SpawnError};
use tracing::{debug, trace};

use self::{grid::Grid, registry::EntityRegistry, selection::Selection, turns::TurnState};

/// Registry capacity used by [`World::new`].
pub const DEFAULT_ENTITY_CAPACITY: usize = 64;

/// Represents the authoritative Skirmish match state.
#[derive(Debug)]
pub struct World {
    grid: Grid,
    registry: EntityRegistry,
    turns: TurnState,
    selection: Selection,
}

impl World {
    /// Creates an empty world with the default registry capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_ENTITY_CAPACITY)
    }

    /// Creates an empty world whose registry holds at most `capacity` entities.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            grid: Grid::default(),
            registry: EntityRegistry::new(capacity),
            turns: TurnState::default(),
            selection: Selection::default(),
        }
    }

    fn reset_match(&mut self) {
        self.registry = EntityRegistry::new(self.registry.capacity());
        self.turns = TurnState::default();
        self.selection.clear();
    }

    fn kill(&mut self, entity: EntityId, out_events: &mut Vec<Event>) {
        let victim = self.registry.get_mut(entity);
        victim.alive = false;
        victim.blocks_movement = false;
        let Some(tile) = victim.tile.take() else {
            return;
        };
        let _ = self.grid.vacate(tile);
        debug!(%entity, %tile, "entity killed");
        out_events.push(Event::EntityKilled { entity, tile });
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
///
/// # Panics
///
/// Commands naming entities or tiles that do not exist are programming errors
/// and panic; every identifier reaching this function originates from the
/// engine itself.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    trace!(?command, "applying command");
    match command {
        Command::BuildGrid {
            columns,
            rows,
            height_jitter,
            seed,
        } => {
            world.grid = Grid::build(columns, rows, height_jitter, seed);
            world.reset_match();
            debug!(columns, rows, height_jitter, "grid built");
            out_events.push(Event::GridBuilt { columns, rows });
        }
        Command::SetWalkable { tile, walkable } => {
            if world.grid.set_walkable(tile, walkable) {
                out_events.push(Event::WalkabilityChanged { tile, walkable });
            }
        }
        Command::SpawnEntity {
            template,
            team,
            tile,
        } => {
            let standing = world.grid.tile(tile);
            let rejection = if world.registry.is_full() {
                Some(SpawnError::CapacityExhausted {
                    capacity: world.registry.capacity(),
                })
            } else if standing.occupant.is_some() {
                Some(SpawnError::TileOccupied { tile })
            } else {
                None
            };
            if let Some(reason) = rejection {
                debug!(%team, %tile, %reason, "spawn rejected");
                out_events.push(Event::SpawnRejected { team, tile, reason });
                return;
            }

            let kind = template.kind();
            let position = standing.standing_position();
            let entity = world.registry.insert(template, team, tile, position);
            world.grid.occupy(tile, entity);
            if world.registry.get(entity).character().is_some() {
                world.turns.enqueue(entity);
            }
            debug!(%entity, ?kind, %team, %tile, "entity spawned");
            out_events.push(Event::EntitySpawned {
                entity,
                kind,
                team,
                tile,
            });
        }
        Command::RemoveEntity { entity } => {
            let removed = world.registry.get_mut(entity);
            if !removed.active {
                return;
            }
            removed.active = false;
            if let Some(tile) = removed.tile.take() {
                let _ = world.grid.vacate(tile);
            }
            if world.selection.entity() == Some(entity) {
                world.selection.clear();
            }
            if world.turns.phase() == MatchPhase::Acting(entity) {
                world.turns.set_phase(MatchPhase::Idle);
            }
            out_events.push(Event::EntityRemoved { entity });
        }
        Command::StartMatch => {
            if world.turns.phase() == MatchPhase::Setup {
                world.turns.set_phase(MatchPhase::Idle);
                out_events.push(Event::MatchStarted);
            }
        }
        Command::ReorderTurnQueue { order } => {
            if world.turns.queue() == order.as_slice() {
                return;
            }
            let reordered = world.turns.reorder(order);
            assert!(
                reordered,
                "turn queue reorder must be a permutation of the queue"
            );
            out_events.push(Event::TurnQueueReordered {
                order: world.turns.queue().to_vec(),
            });
        }
        Command::DebitInitiative { amount } => {
            for index in 0..world.turns.queue().len() {
                let entity = world.registry.get_mut(world.turns.queue()[index]);
                if !entity.is_living_character() {
                    continue;
                }
                if let Some(character) = entity.character_mut() {
                    character.initiative = character.initiative.saturating_sub(amount);
                }
            }
            out_events.push(Event::InitiativeDebited { amount });
        }
        Command::BeginTurn { entity } => {
            if world.turns.phase().is_finished() {
                return;
            }
            assert!(
                world.registry.get(entity).is_living_character(),
                "only living characters can take a turn"
            );
            world.turns.set_phase(MatchPhase::Acting(entity));
            debug!(%entity, "turn started");
            out_events.push(Event::TurnStarted { entity });
        }
        Command::SetSelection {
            entity,
            tiles,
            mode,
        } => {
            world.selection.replace(entity, tiles, mode);
            out_events.push(Event::SelectionChanged {
                entity,
                mode,
                tiles: world.selection.len(),
            });
        }
        Command::MoveEntity { entity, to } => {
            let mover = world.registry.get(entity);
            let Some(from) = mover.tile.filter(|_| mover.active) else {
                return;
            };
            if from == to {
                return;
            }
            let _ = world.grid.vacate(from);
            world.grid.occupy(to, entity);
            let position = world.grid.tile(to).standing_position();
            let mover = world.registry.get_mut(entity);
            mover.tile = Some(to);
            mover.position = position;
            debug!(%entity, %from, %to, "entity moved");
            out_events.push(Event::EntityMoved { entity, from, to });
        }
        Command::DesignateTarget { attacker, target } => {
            if let Some(character) = world.registry.get_mut(attacker).character_mut() {
                character.target = Some(target);
                out_events.push(Event::TargetDesignated { attacker, target });
            }
        }
        Command::Strike {
            attacker,
            target,
            damage,
        } => {
            if let Some(character) = world.registry.get_mut(attacker).character_mut() {
                character.target = None;
            }

            let victim = world.registry.get_mut(target);
            if !victim.alive {
                return;
            }
            let Some(character) = victim.character_mut() else {
                return;
            };
            character.health = character.health.saturating_sub(damage);
            let remaining = character.health;
            debug!(%attacker, %target, damage, remaining, "strike landed");
            out_events.push(Event::EntityDamaged {
                attacker,
                target,
                damage,
                remaining,
            });

            if remaining == 0 {
                world.kill(target, out_events);
            }
        }
        Command::EndTurn { entity } => {
            if world.turns.phase() != MatchPhase::Acting(entity) {
                return;
            }
            if let Some(character) = world.registry.get_mut(entity).character_mut() {
                character.initiative = character.base_initiative;
                character.target = None;
            }
            world.selection.clear();
            world.turns.set_phase(MatchPhase::Idle);
            out_events.push(Event::TurnEnded { entity });
        }
        Command::FinishMatch { winner } => {
            if world.turns.phase().is_finished() {
                return;
            }
            world.selection.clear();
            world.turns.set_phase(MatchPhase::Finished { winner });
            debug!(?winner, "match finished");
            out_events.push(Event::MatchFinished { winner });
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use super::World;
    use skirmish_core::{
        EntityId, EntitySnapshot, EntityView, MatchPhase, SelectionView, TileCoord, TileView,
        TurnQueueView, TurnSlot,
    };

    /// Provides the dimensions of the grid as `(columns, rows)`.
    #[must_use]
    pub fn dimensions(world: &World) -> (u32, u32) {
        world.grid.dimensions()
    }

    /// Captures a read-only view of every tile.
    #[must_use]
    pub fn tile_view(world: &World) -> TileView {
        let (columns, rows) = world.grid.dimensions();
        TileView::from_snapshots(columns, rows, world.grid.snapshots())
    }

    /// Returns the entity occupying the provided tile, if any.
    #[must_use]
    pub fn occupant(world: &World, tile: TileCoord) -> Option<EntityId> {
        if !world.grid.contains(tile) {
            return None;
        }
        world.grid.tile(tile).occupant
    }

    /// Captures a read-only view of every entity ever spawned.
    #[must_use]
    pub fn entity_view(world: &World) -> EntityView {
        EntityView::from_snapshots(world.registry.iter().map(|entity| entity.snapshot()).collect())
    }

    /// Captures a single entity, if the identifier was allocated.
    #[must_use]
    pub fn entity(world: &World, id: EntityId) -> Option<EntitySnapshot> {
        world.registry.try_get(id).map(|entity| entity.snapshot())
    }

    /// Number of entity slots the registry offers.
    #[must_use]
    pub fn capacity(world: &World) -> usize {
        world.registry.capacity()
    }

    /// Captures the current selection set.
    #[must_use]
    pub fn selection_view(world: &World) -> SelectionView {
        world.selection.view()
    }

    /// Captures the turn queue in queue order.
    #[must_use]
    pub fn turn_queue_view(world: &World) -> TurnQueueView {
        let slots = world
            .turns
            .queue()
            .iter()
            .map(|id| {
                let entity = world.registry.get(*id);
                TurnSlot {
                    entity: *id,
                    team: entity.team,
                    alive: entity.is_living_character(),
                    initiative: entity.character().map_or(0, |character| character.initiative),
                }
            })
            .collect();
        TurnQueueView::from_slots(slots)
    }

    /// Reports the current phase of the match.
    #[must_use]
    pub fn phase(world: &World) -> MatchPhase {
        world.turns.phase()
    }

    /// Character currently holding the turn, if any.
    #[must_use]
    pub fn acting_entity(world: &World) -> Option<EntityId> {
        world.turns.phase().acting()
    }
}
