#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Match façade that wires the world and every system into a single step function.
//!
//! A caller builds a [`Skirmish`] from a [`SkirmishConfig`], feeds one
//! [`FrameInput`] per frame to [`Skirmish::update`] and reads the resulting
//! state through the accessors before rendering.

mod config;

use skirmish_core::{
    ActionError, Command, EntityId, EntityTemplate, EntityView, Event, MatchPhase, SelectionView,
    SpawnError, TeamId, TerrainKind, TileCoord, TileView, TurnQueueView,
};
use skirmish_system_combat::CombatResolver;
use skirmish_system_range::RangeEngine;
use skirmish_system_spawning::{SpawnAllocator, SpawnZone};
use skirmish_system_turn_order::TurnScheduler;
use skirmish_world::{self as world, query, World};
use tracing::{debug, info, instrument, warn};

pub use config::{ConfigError, SkirmishConfig, TeamConfig, TerrainConfig, ZoneConfig};
pub use skirmish_system_combat::{PlayerAction, Resolution};

const SPAWN_STREAM: u64 = 0x9e37_79b9_7f4a_7c15;
const COMBAT_STREAM: u64 = 0xbf58_476d_1ce4_e5b9;

/// Input resolved by the presentation layer for a single frame.
///
/// When several fields are set, the turn button wins over the attack button,
/// which wins over clicks; a clicked tile wins over a clicked entity.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameInput {
    /// Tile under the cursor when the pointer was pressed.
    pub clicked_tile: Option<TileCoord>,
    /// Entity under the cursor when the pointer was pressed.
    pub clicked_entity: Option<EntityId>,
    /// The end-turn button was activated.
    pub end_turn: bool,
    /// The confirm-attack button was activated.
    pub confirm_attack: bool,
}

impl FrameInput {
    /// Input that clicks the provided tile.
    #[must_use]
    pub fn tile(tile: TileCoord) -> Self {
        Self {
            clicked_tile: Some(tile),
            ..Self::default()
        }
    }

    /// Input that clicks the provided entity.
    #[must_use]
    pub fn entity(entity: EntityId) -> Self {
        Self {
            clicked_entity: Some(entity),
            ..Self::default()
        }
    }
}

/// Spawn request that did not produce an entity.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SpawnFailure {
    /// Team the entity was meant to join.
    pub team: TeamId,
    /// Name of the character template, or the terrain kind.
    pub name: String,
    /// Reason the spawn failed.
    pub error: SpawnError,
}

/// Outcome of the initial deployment.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SpawnReport {
    spawned: Vec<EntityId>,
    failures: Vec<SpawnFailure>,
}

impl SpawnReport {
    /// Entities placed during deployment, in spawn order.
    #[must_use]
    pub fn spawned(&self) -> &[EntityId] {
        &self.spawned
    }

    /// Spawn requests that were rejected.
    #[must_use]
    pub fn failures(&self) -> &[SpawnFailure] {
        &self.failures
    }

    /// Reports whether every spawn request succeeded.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Running match.
#[derive(Debug)]
pub struct Skirmish {
    config: SkirmishConfig,
    world: World,
    scheduler: TurnScheduler,
    range: RangeEngine,
    combat: CombatResolver,
    spawn_report: SpawnReport,
    events: Vec<Event>,
}

impl Skirmish {
    /// Builds the grid, deploys terrain and teams, and begins the first turn.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the configuration fails validation. Spawn
    /// failures do not abort the match; they are collected in
    /// [`Skirmish::spawn_report`].
    pub fn init(config: SkirmishConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut skirmish = Self {
            world: World::with_capacity(config.capacity),
            scheduler: TurnScheduler::with_teams(
                config.teams.iter().map(|team| team.team).collect(),
            ),
            range: RangeEngine::new(),
            combat: CombatResolver::new(config.seed ^ COMBAT_STREAM),
            spawn_report: SpawnReport::default(),
            events: Vec::new(),
            config,
        };

        let mut setup = vec![Command::BuildGrid {
            columns: skirmish.config.columns,
            rows: skirmish.config.rows,
            height_jitter: skirmish.config.height_jitter,
            seed: skirmish.config.seed,
        }];
        setup.extend(
            skirmish
                .config
                .blocked_tiles
                .iter()
                .map(|tile| Command::SetWalkable {
                    tile: *tile,
                    walkable: false,
                }),
        );
        skirmish.pump(setup);
        skirmish.deploy();

        info!(
            spawned = skirmish.spawn_report.spawned.len(),
            failed = skirmish.spawn_report.failures.len(),
            "deployment complete"
        );
        skirmish.pump(vec![Command::StartMatch]);
        Ok(skirmish)
    }

    fn deploy(&mut self) {
        let mut allocator = SpawnAllocator::new(self.config.seed ^ SPAWN_STREAM);

        let terrain = &self.config.terrain;
        let terrain_zone = terrain.zone.to_zone(TeamId::NEUTRAL);
        let obstacles: Vec<EntityTemplate> = std::iter::repeat(TerrainKind::Tree)
            .take(terrain.trees)
            .chain(std::iter::repeat(TerrainKind::Rock).take(terrain.rocks))
            .map(EntityTemplate::Terrain)
            .collect();

        let mut requests: Vec<(EntityTemplate, SpawnZone)> = obstacles
            .into_iter()
            .map(|template| (template, terrain_zone.clone()))
            .collect();
        for team in &self.config.teams {
            let zone = team.zone.to_zone(team.team);
            requests.extend(
                team.roster
                    .iter()
                    .cloned()
                    .map(|template| (EntityTemplate::Character(template), zone.clone())),
            );
        }

        for (template, zone) in requests {
            let name = template_name(&template);
            let mut commands = Vec::new();
            let tiles = query::tile_view(&self.world);
            if let Err(error) = allocator.spawn(template, &zone, &tiles, &mut commands) {
                self.record_spawn_failure(zone.team(), name, error);
                continue;
            }

            let logged = self.events.len();
            self.pump(commands);
            let rejection = self.events[logged..].iter().find_map(|event| match event {
                Event::SpawnRejected { reason, .. } => Some(*reason),
                _ => None,
            });
            if let Some(error) = rejection {
                self.record_spawn_failure(zone.team(), name, error);
            }
        }
    }

    fn record_spawn_failure(&mut self, team: TeamId, name: String, error: SpawnError) {
        warn!(%team, %name, %error, "spawn failed");
        self.spawn_report.failures.push(SpawnFailure { team, name, error });
    }

    /// Resolves one frame of input and runs the systems until the world settles.
    ///
    /// # Errors
    ///
    /// Returns [`ActionError::InvalidSelection`] when the input names nothing
    /// the acting character may act on. The world is left untouched.
    #[instrument(level = "debug", skip(self))]
    pub fn update(&mut self, input: &FrameInput) -> Result<Resolution, ActionError> {
        let Some(action) = self.resolve_input(input) else {
            return Ok(Resolution::Idle);
        };

        let mut commands = Vec::new();
        let resolution = self
            .combat
            .handle(
                action,
                query::phase(&self.world),
                &query::tile_view(&self.world),
                &query::entity_view(&self.world),
                &query::selection_view(&self.world),
                &mut commands,
            )
            .map_err(|error| {
                debug!(?action, %error, "action ignored");
                error
            })?;

        self.pump(commands);
        Ok(resolution)
    }

    fn resolve_input(&self, input: &FrameInput) -> Option<PlayerAction> {
        if input.end_turn {
            return Some(PlayerAction::EndTurn);
        }
        if input.confirm_attack {
            return Some(PlayerAction::ConfirmAttack);
        }
        if let Some(tile) = input.clicked_tile {
            return Some(PlayerAction::SelectTile(tile));
        }
        input
            .clicked_entity
            .and_then(|entity| query::entity(&self.world, entity))
            .and_then(|snapshot| snapshot.tile)
            .map(PlayerAction::SelectTile)
    }

    fn pump(&mut self, commands: Vec<Command>) {
        let mut pending = commands;
        while !pending.is_empty() {
            let mut events = Vec::new();
            for command in pending.drain(..) {
                world::apply(&mut self.world, command, &mut events);
            }

            self.scheduler.handle(
                &events,
                &query::turn_queue_view(&self.world),
                &mut pending,
            );
            self.range.handle(
                &events,
                &query::tile_view(&self.world),
                &query::entity_view(&self.world),
                &query::selection_view(&self.world),
                &mut pending,
            );

            for event in &events {
                self.observe(event);
            }
            self.events.extend(events);
        }
    }

    fn observe(&mut self, event: &Event) {
        match event {
            Event::EntitySpawned { entity, .. } => self.spawn_report.spawned.push(*entity),
            Event::TurnStarted { entity } => {
                let name = self.character_name(*entity);
                info!(entity = %entity, %name, "turn started");
            }
            Event::EntityKilled { entity, tile } => {
                let name = self.character_name(*entity);
                info!(entity = %entity, %name, %tile, "entity killed");
            }
            Event::MatchFinished { winner: Some(team) } => info!(%team, "match won"),
            Event::MatchFinished { winner: None } => info!("match ended without a winner"),
            _ => {}
        }
    }

    fn character_name(&self, entity: EntityId) -> String {
        query::entity(&self.world, entity)
            .and_then(|snapshot| snapshot.character().map(|character| character.name.clone()))
            .unwrap_or_default()
    }

    /// Reports whether the match has reached its terminal state.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        query::phase(&self.world).is_finished()
    }

    /// Team that won the match, if it finished with a single surviving team.
    #[must_use]
    pub fn winner(&self) -> Option<TeamId> {
        match query::phase(&self.world) {
            MatchPhase::Finished { winner } => winner,
            _ => None,
        }
    }

    /// Current phase of the match.
    #[must_use]
    pub fn phase(&self) -> MatchPhase {
        query::phase(&self.world)
    }

    /// Character holding the turn, if any.
    #[must_use]
    pub fn acting_entity(&self) -> Option<EntityId> {
        query::acting_entity(&self.world)
    }

    /// Read-only view of every tile.
    #[must_use]
    pub fn tiles(&self) -> TileView {
        query::tile_view(&self.world)
    }

    /// Read-only view of every entity, dead ones included.
    #[must_use]
    pub fn entities(&self) -> EntityView {
        query::entity_view(&self.world)
    }

    /// Current selection set of the acting character.
    #[must_use]
    pub fn selection(&self) -> SelectionView {
        query::selection_view(&self.world)
    }

    /// Turn queue in its current order.
    #[must_use]
    pub fn turn_queue(&self) -> TurnQueueView {
        query::turn_queue_view(&self.world)
    }

    /// Outcome of the initial deployment.
    #[must_use]
    pub fn spawn_report(&self) -> &SpawnReport {
        &self.spawn_report
    }

    /// Configuration the match was built from.
    #[must_use]
    pub fn config(&self) -> &SkirmishConfig {
        &self.config
    }

    /// Every event the world emitted since the match was built.
    #[must_use]
    pub fn events(&self) -> &[Event] {
        &self.events
    }
}

fn template_name(template: &EntityTemplate) -> String {
    match template {
        EntityTemplate::Character(character) => character.name.clone(),
        EntityTemplate::Terrain(TerrainKind::Tree) => String::from("tree"),
        EntityTemplate::Terrain(TerrainKind::Rock) => String::from("rock"),
    }
}
