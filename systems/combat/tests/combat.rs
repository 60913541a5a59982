use skirmish_core::{
    ActionError, CharacterTemplate, Command, EntityId, EntityTemplate, Event, InvalidSelection,
    SelectionMode, TeamId, TerrainKind, TileCoord,
};
use skirmish_system_combat::{CombatResolver, PlayerAction, Resolution};
use skirmish_world::{self as world, query, World};

fn template(speed: f32, max_health: u32, min_attack: u32, max_attack: u32) -> EntityTemplate {
    EntityTemplate::Character(CharacterTemplate {
        name: "Duelist".to_owned(),
        speed,
        initiative: 5,
        max_health,
        min_attack,
        max_attack,
    })
}

/// World with an actor on (2, 2) whose turn has begun and whose selection
/// covers every tile within its speed.
struct Duel {
    world: World,
    resolver: CombatResolver,
    actor: EntityId,
    log: Vec<Event>,
}

impl Duel {
    fn new(
        seed: u64,
        actor: EntityTemplate,
        others: Vec<(EntityTemplate, u32, TileCoord)>,
    ) -> Self {
        let mut world = World::new();
        let mut log = Vec::new();
        world::apply(
            &mut world,
            Command::BuildGrid {
                columns: 6,
                rows: 6,
                height_jitter: 0.0,
                seed: 0,
            },
            &mut log,
        );
        world::apply(
            &mut world,
            Command::SpawnEntity {
                template: actor,
                team: TeamId::new(1),
                tile: TileCoord::new(2, 2),
            },
            &mut log,
        );
        for (template, team, tile) in others {
            world::apply(
                &mut world,
                Command::SpawnEntity {
                    template,
                    team: TeamId::new(team),
                    tile,
                },
                &mut log,
            );
        }

        let actor = EntityId::new(0);
        let snapshot = query::entity(&world, actor).expect("actor");
        let selection = tiles_within_two(&world, &snapshot);
        for command in [
            Command::StartMatch,
            Command::BeginTurn { entity: actor },
            Command::SetSelection {
                entity: actor,
                tiles: selection,
                mode: SelectionMode::Moving,
            },
        ] {
            world::apply(&mut world, command, &mut log);
        }

        Self {
            world,
            resolver: CombatResolver::new(seed),
            actor,
            log,
        }
    }

    fn act(&mut self, action: PlayerAction) -> Result<Resolution, ActionError> {
        let mut commands = Vec::new();
        let resolution = self.resolver.handle(
            action,
            query::phase(&self.world),
            &query::tile_view(&self.world),
            &query::entity_view(&self.world),
            &query::selection_view(&self.world),
            &mut commands,
        );
        for command in commands {
            world::apply(&mut self.world, command, &mut self.log);
        }
        resolution
    }

    fn health(&self, entity: EntityId) -> u32 {
        query::entity(&self.world, entity)
            .and_then(|snapshot| snapshot.character().map(|character| character.health))
            .expect("character")
    }
}

/// Every tile whose center lies within two units of the actor, occupied or not.
fn tiles_within_two(
    world: &World,
    actor: &skirmish_core::EntitySnapshot,
) -> Vec<TileCoord> {
    query::tile_view(world)
        .iter()
        .filter(|tile| tile.center.distance(actor.planar_position()) <= 2.0)
        .map(|tile| tile.coord)
        .collect()
}

#[test]
fn clicking_a_free_tile_moves_and_ends_the_turn() {
    let mut duel = Duel::new(1, template(2.0, 10, 1, 2), Vec::new());

    let result = duel.act(PlayerAction::SelectTile(TileCoord::new(3, 3)));

    assert_eq!(
        result,
        Ok(Resolution::Moved {
            to: TileCoord::new(3, 3)
        })
    );
    assert_eq!(query::occupant(&duel.world, TileCoord::new(3, 3)), Some(duel.actor));
    assert_eq!(query::occupant(&duel.world, TileCoord::new(2, 2)), None);
    assert_eq!(duel.log.last(), Some(&Event::TurnEnded { entity: duel.actor }));
}

#[test]
fn clicking_the_own_tile_is_a_stationary_move() {
    let mut duel = Duel::new(1, template(2.0, 10, 1, 2), Vec::new());
    let result = duel.act(PlayerAction::SelectTile(TileCoord::new(2, 2)));
    assert_eq!(
        result,
        Ok(Resolution::Moved {
            to: TileCoord::new(2, 2)
        })
    );
    assert!(!duel
        .log
        .iter()
        .any(|event| matches!(event, Event::EntityMoved { .. })));
}

#[test]
fn first_click_on_an_enemy_designates_and_second_strikes() {
    let enemy_tile = TileCoord::new(3, 2);
    let mut duel = Duel::new(
        9,
        template(2.0, 10, 3, 3),
        vec![(template(2.0, 10, 1, 1), 2, enemy_tile)],
    );
    let enemy = EntityId::new(1);

    assert_eq!(
        duel.act(PlayerAction::SelectTile(enemy_tile)),
        Ok(Resolution::TargetDesignated { target: enemy })
    );
    assert_eq!(query::acting_entity(&duel.world), Some(duel.actor));

    assert_eq!(
        duel.act(PlayerAction::SelectTile(enemy_tile)),
        Ok(Resolution::Attacked {
            target: enemy,
            damage: 3
        })
    );
    assert_eq!(duel.health(enemy), 7);
    assert_eq!(query::occupant(&duel.world, TileCoord::new(2, 2)), Some(duel.actor));
    let actor = query::entity(&duel.world, duel.actor).expect("actor");
    assert_eq!(actor.character().and_then(|character| character.target), None);
}

#[test]
fn confirm_attack_strikes_the_designated_target() {
    let enemy_tile = TileCoord::new(1, 1);
    let mut duel = Duel::new(
        4,
        template(2.0, 10, 2, 2),
        vec![(template(2.0, 10, 1, 1), 2, enemy_tile)],
    );
    assert_eq!(
        duel.act(PlayerAction::ConfirmAttack),
        Err(ActionError::InvalidSelection(
            InvalidSelection::NoDesignatedTarget
        ))
    );

    let _ = duel.act(PlayerAction::SelectTile(enemy_tile));
    assert!(matches!(
        duel.act(PlayerAction::ConfirmAttack),
        Ok(Resolution::Attacked { damage: 2, .. })
    ));
    assert_eq!(duel.health(EntityId::new(1)), 8);
}

#[test]
fn moving_with_a_designated_target_strikes_after_the_move() {
    let mut duel = Duel::new(
        4,
        template(2.0, 10, 4, 4),
        vec![(template(2.0, 10, 1, 1), 2, TileCoord::new(3, 2))],
    );
    let _ = duel.act(PlayerAction::SelectTile(TileCoord::new(3, 2)));

    let result = duel.act(PlayerAction::SelectTile(TileCoord::new(3, 3)));

    assert_eq!(
        result,
        Ok(Resolution::Attacked {
            target: EntityId::new(1),
            damage: 4
        })
    );
    assert_eq!(query::occupant(&duel.world, TileCoord::new(3, 3)), Some(duel.actor));
    assert_eq!(duel.health(EntityId::new(1)), 6);
}

#[test]
fn six_to_twelve_damage_against_ten_health() {
    for seed in 0..64 {
        let enemy_tile = TileCoord::new(2, 3);
        let mut duel = Duel::new(
            seed,
            template(1.0, 10, 6, 12),
            vec![(template(1.0, 10, 1, 1), 2, enemy_tile)],
        );
        let enemy = EntityId::new(1);
        let _ = duel.act(PlayerAction::SelectTile(enemy_tile));
        let Ok(Resolution::Attacked { damage, .. }) = duel.act(PlayerAction::ConfirmAttack) else {
            panic!("attack was not resolved");
        };

        assert!((6..=12).contains(&damage));
        assert_eq!(duel.health(enemy), 10u32.saturating_sub(damage));
        let victim = query::entity(&duel.world, enemy).expect("enemy");
        assert_eq!(victim.alive, damage < 10);
        if !victim.alive {
            assert_eq!(query::occupant(&duel.world, enemy_tile), None);
            assert!(duel
                .log
                .contains(&Event::EntityKilled {
                    entity: enemy,
                    tile: enemy_tile,
                }));
        }
    }
}

#[test]
fn terrain_allies_and_outside_tiles_are_rejected_without_commands() {
    let mut duel = Duel::new(
        2,
        template(2.0, 10, 1, 1),
        vec![
            (EntityTemplate::Terrain(TerrainKind::Tree), 0, TileCoord::new(1, 2)),
            (template(2.0, 10, 1, 1), 1, TileCoord::new(2, 1)),
        ],
    );
    let logged = duel.log.len();

    assert_eq!(
        duel.act(PlayerAction::SelectTile(TileCoord::new(1, 2))),
        Err(ActionError::InvalidSelection(
            InvalidSelection::UnreachableOccupant(TileCoord::new(1, 2))
        ))
    );
    assert_eq!(
        duel.act(PlayerAction::SelectTile(TileCoord::new(2, 1))),
        Err(ActionError::InvalidSelection(
            InvalidSelection::UnreachableOccupant(TileCoord::new(2, 1))
        ))
    );
    assert_eq!(
        duel.act(PlayerAction::SelectTile(TileCoord::new(5, 5))),
        Err(ActionError::InvalidSelection(
            InvalidSelection::OutsideSelection(TileCoord::new(5, 5))
        ))
    );
    assert_eq!(duel.log.len(), logged);
}

#[test]
fn end_turn_clears_designation_without_acting() {
    let mut duel = Duel::new(
        3,
        template(2.0, 10, 5, 5),
        vec![(template(2.0, 10, 1, 1), 2, TileCoord::new(3, 3))],
    );
    let _ = duel.act(PlayerAction::SelectTile(TileCoord::new(3, 3)));

    assert_eq!(duel.act(PlayerAction::EndTurn), Ok(Resolution::TurnPassed));
    assert_eq!(duel.health(EntityId::new(1)), 10);
    let actor = query::entity(&duel.world, duel.actor).expect("actor");
    assert_eq!(actor.character().and_then(|character| character.target), None);
    assert_eq!(query::acting_entity(&duel.world), None);
}

#[test]
fn same_seed_rolls_same_damage() {
    let run = |seed| {
        let mut duel = Duel::new(
            seed,
            template(2.0, 10, 1, 9),
            vec![(template(2.0, 50, 1, 1), 2, TileCoord::new(3, 2))],
        );
        let _ = duel.act(PlayerAction::SelectTile(TileCoord::new(3, 2)));
        duel.act(PlayerAction::ConfirmAttack)
    };
    assert_eq!(run(42), run(42));
}
