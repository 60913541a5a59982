#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that computes the tiles an acting character may move to or attack.

use glam::Vec2;
use skirmish_core::{
    Command, EntityId, EntitySnapshot, EntityView, Event, SelectionMode, SelectionView,
    TileCoord, TileSnapshot, TileView, MELEE_RANGE,
};

/// Selection and range engine.
///
/// Reacts to turn starts by publishing the full movement/attack selection of
/// the new actor, and to target designations by narrowing the current
/// selection to the melee neighbourhood of the target.
#[derive(Debug, Default)]
pub struct RangeEngine {
    scratch: Vec<TileCoord>,
}

impl RangeEngine {
    /// Creates a new range engine.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Consumes world events plus read-only views and emits selection commands.
    pub fn handle(
        &mut self,
        events: &[Event],
        tiles: &TileView,
        entities: &EntityView,
        selection: &SelectionView,
        out: &mut Vec<Command>,
    ) {
        for event in events {
            match event {
                Event::TurnStarted { entity } => {
                    let Some(actor) = entities.get(*entity) else {
                        continue;
                    };
                    selectable_tiles_into(actor, tiles, entities, &mut self.scratch);
                    out.push(Command::SetSelection {
                        entity: *entity,
                        tiles: self.scratch.clone(),
                        mode: SelectionMode::Moving,
                    });
                }
                Event::TargetDesignated { attacker, target } => {
                    if selection.entity != Some(*attacker) {
                        continue;
                    }
                    let Some(target_center) = entities
                        .get(*target)
                        .and_then(|target| target.tile)
                        .map(TileCoord::center)
                    else {
                        continue;
                    };
                    out.push(Command::SetSelection {
                        entity: *attacker,
                        tiles: narrow_to_melee(&selection.tiles, target_center),
                        mode: SelectionMode::Targeting,
                    });
                }
                _ => {}
            }
        }
    }
}

/// Computes the selection set of `actor` from scratch.
///
/// A tile qualifies when it is walkable, its center lies within `speed` of the
/// actor and no other movement-blocking entity stands on it, or when it hosts
/// a living hostile character within melee range of the actor. Tiles are
/// returned in row-major order.
#[must_use]
pub fn selectable_tiles(
    actor: &EntitySnapshot,
    tiles: &TileView,
    entities: &EntityView,
) -> Vec<TileCoord> {
    let mut selection = Vec::new();
    selectable_tiles_into(actor, tiles, entities, &mut selection);
    selection
}

fn selectable_tiles_into(
    actor: &EntitySnapshot,
    tiles: &TileView,
    entities: &EntityView,
    out: &mut Vec<TileCoord>,
) {
    out.clear();
    let Some(character) = actor.character() else {
        return;
    };
    let origin = actor.planar_position();

    for tile in tiles.iter() {
        let occupant = tile.occupant.and_then(|id| entities.get(id));
        let distance = origin.distance(tile.center);
        if is_reachable(actor.id, tile, occupant, distance, character.speed)
            || is_attackable(actor, occupant, distance)
        {
            out.push(tile.coord);
        }
    }
}

fn is_reachable(
    actor: EntityId,
    tile: &TileSnapshot,
    occupant: Option<&EntitySnapshot>,
    distance: f32,
    speed: f32,
) -> bool {
    let blocked = occupant.is_some_and(|other| other.id != actor && other.blocks_movement);
    tile.walkable && distance <= speed && !blocked
}

fn is_attackable(actor: &EntitySnapshot, occupant: Option<&EntitySnapshot>, distance: f32) -> bool {
    occupant.is_some_and(|other| actor.is_hostile_to(other)) && distance <= MELEE_RANGE
}

/// Keeps the tiles of `selection` that lie within melee range of `target_center`.
#[must_use]
pub fn narrow_to_melee(selection: &[TileCoord], target_center: Vec2) -> Vec<TileCoord> {
    selection
        .iter()
        .copied()
        .filter(|tile| tile.center().distance(target_center) <= MELEE_RANGE)
        .collect()
}
