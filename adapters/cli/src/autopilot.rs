//! Greedy controller that plays whichever team holds the turn.

use skirmish_core::{EntitySnapshot, TileCoord};
use skirmish_session::{FrameInput, Skirmish};

/// Picks this frame's input for the acting character.
///
/// Confirms a pending designation, otherwise designates the weakest enemy in
/// reach, otherwise walks to the selectable tile closest to any enemy.
pub(crate) fn choose(skirmish: &Skirmish) -> FrameInput {
    let entities = skirmish.entities();
    let Some(actor) = skirmish.acting_entity().and_then(|id| entities.get(id)) else {
        return FrameInput::default();
    };
    let Some(character) = actor.character() else {
        return pass();
    };
    if character.target.is_some() {
        return FrameInput {
            confirm_attack: true,
            ..FrameInput::default()
        };
    }

    let selection = skirmish.selection();
    let enemies: Vec<&EntitySnapshot> = entities
        .iter()
        .filter(|other| actor.is_hostile_to(other))
        .collect();

    let weakest_in_reach = enemies
        .iter()
        .filter(|enemy| enemy.tile.is_some_and(|tile| selection.contains(tile)))
        .min_by_key(|enemy| enemy.character().map_or(u32::MAX, |stats| stats.health));
    if let Some(enemy) = weakest_in_reach {
        return FrameInput::entity(enemy.id);
    }

    let tiles = skirmish.tiles();
    selection
        .tiles
        .iter()
        .copied()
        .filter(|tile| tiles.occupant(*tile).map_or(true, |id| id == actor.id))
        .min_by(|a, b| nearest_enemy(&enemies, *a).total_cmp(&nearest_enemy(&enemies, *b)))
        .map_or_else(pass, FrameInput::tile)
}

fn pass() -> FrameInput {
    FrameInput {
        end_turn: true,
        ..FrameInput::default()
    }
}

fn nearest_enemy(enemies: &[&EntitySnapshot], tile: TileCoord) -> f32 {
    enemies
        .iter()
        .map(|enemy| enemy.planar_position().distance(tile.center()))
        .fold(f32::INFINITY, f32::min)
}

#[cfg(test)]
mod tests {
    use super::*;
    use skirmish_session::SkirmishConfig;

    #[test]
    fn opening_move_walks_towards_the_enemy() {
        let skirmish = Skirmish::init(SkirmishConfig::default()).expect("valid config");
        let actor = skirmish.acting_entity().expect("actor");
        let start = skirmish
            .entities()
            .get(actor)
            .and_then(|entity| entity.tile)
            .expect("placed");

        let input = choose(&skirmish);

        let tile = input.clicked_tile.expect("a move is chosen");
        assert!(skirmish.selection().contains(tile));
        let towards_center = |tile: TileCoord| (tile.column() as i64 - 5).abs();
        assert!(towards_center(tile) < towards_center(start));
    }

    #[test]
    fn autopilots_finish_the_reference_match() {
        let mut skirmish = Skirmish::init(SkirmishConfig::default()).expect("valid config");
        for _ in 0..10_000 {
            if skirmish.is_finished() {
                break;
            }
            let input = choose(&skirmish);
            let _ = skirmish.update(&input).expect("autopilot input is valid");
        }
        assert!(skirmish.is_finished());
        assert!(skirmish.winner().is_some());
    }
}
