use skirmish_core::{
    ActionError, EntityKind, EntitySnapshot, InvalidSelection, SpawnError, TeamId, TileCoord,
};
use skirmish_session::{
    FrameInput, Resolution, Skirmish, SkirmishConfig, TerrainConfig, ZoneConfig,
};

fn open_field(seed: u64) -> SkirmishConfig {
    SkirmishConfig {
        seed,
        terrain: TerrainConfig {
            trees: 0,
            rocks: 0,
            ..TerrainConfig::default()
        },
        ..SkirmishConfig::default()
    }
}

/// Chooses the input a simple aggressive player would give this frame.
fn aggressive_input(skirmish: &Skirmish) -> FrameInput {
    let Some(actor) = skirmish.acting_entity() else {
        return FrameInput::default();
    };
    let entities = skirmish.entities();
    let Some(actor) = entities.get(actor) else {
        return FrameInput::default();
    };
    let selection = skirmish.selection();

    let enemies: Vec<&EntitySnapshot> = entities
        .iter()
        .filter(|other| actor.is_hostile_to(other))
        .collect();

    if let Some(target) = actor.character().and_then(|character| character.target) {
        return FrameInput::entity(target);
    }
    if let Some(enemy) = enemies
        .iter()
        .find(|enemy| enemy.tile.is_some_and(|tile| selection.contains(tile)))
    {
        return FrameInput::entity(enemy.id);
    }

    let closeness = |tile: &TileCoord| {
        enemies
            .iter()
            .map(|enemy| enemy.planar_position().distance(tile.center()))
            .fold(f32::INFINITY, f32::min)
    };
    let occupied = |tile: &TileCoord| {
        entities
            .iter()
            .any(|other| other.id != actor.id && other.tile == Some(*tile))
    };
    selection
        .tiles
        .iter()
        .filter(|tile| !occupied(tile))
        .min_by(|a, b| closeness(a).total_cmp(&closeness(b)))
        .map_or(
            FrameInput {
                end_turn: true,
                ..FrameInput::default()
            },
            |tile| FrameInput::tile(*tile),
        )
}

fn play_out(skirmish: &mut Skirmish, max_steps: usize) {
    for _ in 0..max_steps {
        if skirmish.is_finished() {
            return;
        }
        let input = aggressive_input(skirmish);
        skirmish.update(&input).expect("scripted input is valid");
    }
}

fn living_per_team(skirmish: &Skirmish) -> Vec<(TeamId, usize)> {
    let mut counts: Vec<(TeamId, usize)> = Vec::new();
    for slot in skirmish.turn_queue().iter() {
        match counts.iter_mut().find(|(team, _)| *team == slot.team) {
            Some((_, count)) => *count += usize::from(slot.alive),
            None => counts.push((slot.team, usize::from(slot.alive))),
        }
    }
    counts.sort_unstable();
    counts
}

#[test]
fn reference_scenario_deploys_both_teams_and_starts_a_turn() {
    let skirmish = Skirmish::init(SkirmishConfig::default()).expect("valid config");

    assert!(skirmish.spawn_report().is_clean());
    assert!(!skirmish.is_finished());
    assert_eq!(skirmish.tiles().dimensions(), (10, 8));
    assert_eq!(
        living_per_team(&skirmish),
        vec![(TeamId::new(1), 3), (TeamId::new(2), 3)]
    );

    let actor = skirmish.acting_entity().expect("first turn started");
    let entities = skirmish.entities();
    let actor = entities.get(actor).expect("actor");
    let column = actor.tile.expect("placed").column();
    assert!(column == 0 || column == 9, "characters start on their edge");
    assert_eq!(skirmish.selection().entity, Some(actor.id));
}

#[test]
fn selection_never_offers_terrain_tiles() {
    let mut skirmish = Skirmish::init(SkirmishConfig::default()).expect("valid config");

    for _ in 0..12 {
        if skirmish.is_finished() {
            break;
        }
        let entities = skirmish.entities();
        for tile in &skirmish.selection().tiles {
            let occupant = skirmish
                .tiles()
                .occupant(*tile)
                .and_then(|id| entities.get(id));
            assert!(
                occupant.map_or(true, |entity| entity.kind() == EntityKind::Character),
                "terrain tile {tile} was selectable"
            );
        }
        let _ = skirmish.update(&FrameInput {
            end_turn: true,
            ..FrameInput::default()
        });
    }
    assert!(!skirmish.is_finished());
}

#[test]
fn every_entity_sits_on_its_own_tile() {
    let skirmish = Skirmish::init(SkirmishConfig::default()).expect("valid config");
    let tiles = skirmish.tiles();
    for entity in skirmish.entities().iter() {
        let tile = entity.tile.expect("deployed entities are placed");
        assert_eq!(tiles.occupant(tile), Some(entity.id));
    }
    let occupied = tiles.iter().filter(|tile| tile.occupant.is_some()).count();
    assert_eq!(occupied, skirmish.entities().len());
}

#[test]
fn aggressive_play_ends_with_exactly_one_team_standing() {
    let mut skirmish = Skirmish::init(open_field(21)).expect("valid config");
    play_out(&mut skirmish, 5_000);

    assert!(skirmish.is_finished(), "match did not finish");
    let winner = skirmish.winner().expect("one team survives");
    for (team, living) in living_per_team(&skirmish) {
        if team == winner {
            assert!(living > 0);
        } else {
            assert_eq!(living, 0);
        }
    }
    assert_eq!(skirmish.acting_entity(), None);
    assert!(skirmish.selection().is_empty());
}

#[test]
fn finished_match_rejects_further_input() {
    let mut skirmish = Skirmish::init(open_field(5)).expect("valid config");
    play_out(&mut skirmish, 5_000);
    assert!(skirmish.is_finished());

    assert_eq!(
        skirmish.update(&FrameInput {
            end_turn: true,
            ..FrameInput::default()
        }),
        Err(ActionError::InvalidSelection(InvalidSelection::MatchFinished))
    );
}

#[test]
fn identical_seeds_and_inputs_replay_identically() {
    let run = || {
        let mut skirmish = Skirmish::init(SkirmishConfig::default()).expect("valid config");
        play_out(&mut skirmish, 60);
        skirmish.events().to_vec()
    };
    assert_eq!(run(), run());
}

#[test]
fn different_seeds_change_the_terrain() {
    let heights = |seed| {
        let skirmish = Skirmish::init(SkirmishConfig {
            seed,
            ..SkirmishConfig::default()
        })
        .expect("valid config");
        skirmish
            .tiles()
            .iter()
            .map(|tile| tile.center_height)
            .collect::<Vec<_>>()
    };
    assert_ne!(heights(1), heights(2));
}

#[test]
fn invalid_clicks_leave_the_match_untouched() {
    let mut skirmish = Skirmish::init(SkirmishConfig::default()).expect("valid config");
    let actor = skirmish.acting_entity();
    let logged = skirmish.events().len();

    let outside = (0..10)
        .flat_map(|column| (0..8).map(move |row| TileCoord::new(column, row)))
        .find(|tile| !skirmish.selection().contains(*tile))
        .expect("selection does not cover the grid");
    assert_eq!(
        skirmish.update(&FrameInput::tile(outside)),
        Err(ActionError::InvalidSelection(
            InvalidSelection::OutsideSelection(outside)
        ))
    );
    assert_eq!(
        skirmish.update(&FrameInput {
            confirm_attack: true,
            ..FrameInput::default()
        }),
        Err(ActionError::InvalidSelection(
            InvalidSelection::NoDesignatedTarget
        ))
    );
    assert_eq!(skirmish.acting_entity(), actor);
    assert_eq!(skirmish.events().len(), logged);
}

#[test]
fn moving_passes_the_turn_to_the_next_character() {
    let mut skirmish = Skirmish::init(open_field(3)).expect("valid config");
    let first = skirmish.acting_entity().expect("actor");
    let input = aggressive_input(&skirmish);

    let resolution = skirmish.update(&input).expect("valid move");

    assert!(matches!(resolution, Resolution::Moved { .. }));
    assert_ne!(skirmish.acting_entity(), Some(first));
    let slot = skirmish
        .turn_queue()
        .iter()
        .find(|slot| slot.entity == first)
        .copied()
        .expect("queued");
    let base = skirmish
        .entities()
        .get(first)
        .and_then(|entity| entity.character().map(|character| character.base_initiative))
        .expect("character");
    assert!(slot.initiative <= base);
}

#[test]
fn crowded_zone_reports_spawn_failures_and_still_starts() {
    let mut config = open_field(9);
    config.teams[0].zone = ZoneConfig::Tiles {
        tiles: vec![TileCoord::new(0, 3)],
    };

    let skirmish = Skirmish::init(config).expect("valid config");

    let failures = skirmish.spawn_report().failures();
    assert_eq!(failures.len(), 2);
    for failure in failures {
        assert_eq!(failure.team, TeamId::new(1));
        assert_eq!(failure.error, SpawnError::NoFreeTile { attempts: 1 });
    }
    assert_eq!(failures[0].name, "Scout");
    assert_eq!(
        living_per_team(&skirmish),
        vec![(TeamId::new(1), 1), (TeamId::new(2), 3)]
    );
    assert!(skirmish.acting_entity().is_some());
}

#[test]
fn registry_capacity_limits_deployment() {
    let mut config = open_field(4);
    config.capacity = 4;

    let skirmish = Skirmish::init(config).expect("valid config");

    assert_eq!(skirmish.entities().len(), 4);
    let exhausted = skirmish
        .spawn_report()
        .failures()
        .iter()
        .filter(|failure| failure.error == SpawnError::CapacityExhausted { capacity: 4 })
        .count();
    assert_eq!(exhausted, 2);
}

#[test]
fn blocked_tiles_stay_empty() {
    let mut config = SkirmishConfig::default();
    config.blocked_tiles = vec![TileCoord::new(0, 0), TileCoord::new(0, 1)];

    let skirmish = Skirmish::init(config).expect("valid config");

    let tiles = skirmish.tiles();
    for row in 0..2 {
        let tile = tiles.get(TileCoord::new(0, row)).expect("inside grid");
        assert!(!tile.walkable);
        assert_eq!(tile.occupant, None);
    }
    for failure in skirmish.spawn_report().failures() {
        assert!(matches!(failure.error, SpawnError::NoFreeTile { .. }));
    }
}

#[test]
fn team_left_without_characters_by_capacity_loses() {
    let mut config = open_field(6);
    config.capacity = 3;

    let skirmish = Skirmish::init(config).expect("valid config");

    let failures = skirmish.spawn_report().failures();
    assert_eq!(failures.len(), 3);
    assert!(failures.iter().all(|failure| failure.team == TeamId::new(2)));
    assert!(skirmish.is_finished());
    assert_eq!(skirmish.winner(), Some(TeamId::new(1)));
    assert_eq!(skirmish.acting_entity(), None);
}

#[test]
fn team_with_empty_roster_loses() {
    let mut config = open_field(8);
    config.teams[1].roster.clear();

    let mut skirmish = Skirmish::init(config).expect("valid config");

    assert!(skirmish.is_finished());
    assert_eq!(skirmish.winner(), Some(TeamId::new(1)));
    assert_eq!(
        skirmish.update(&FrameInput {
            end_turn: true,
            ..FrameInput::default()
        }),
        Err(ActionError::InvalidSelection(InvalidSelection::MatchFinished))
    );
}
