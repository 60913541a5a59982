#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Skirmish engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters and systems submit
//! [`Command`] values describing desired mutations, the world executes those
//! commands via its `apply` entry point, and then broadcasts [`Event`] values
//! for systems to react to deterministically. Systems consume event streams,
//! query immutable views such as [`TileView`] and [`EntityView`], and respond
//! exclusively with new command batches.

use std::fmt;

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Distance threshold, measured between tile centers, within which two
/// entities can trade melee blows.
///
/// Orthogonal neighbours sit at `1.0` and diagonal neighbours at `~1.414`,
/// while tiles two steps away start at `2.0`.
pub const MELEE_RANGE: f32 = 1.45;

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Lays out a fresh tile grid, discarding any previous grid.
    BuildGrid {
        /// Number of tile columns laid out in the grid.
        columns: u32,
        /// Number of tile rows laid out in the grid.
        rows: u32,
        /// Largest absolute height offset sampled for each lattice vertex.
        height_jitter: f32,
        /// Seed for the vertex height field.
        seed: u64,
    },
    /// Marks a tile as walkable or impassable.
    SetWalkable {
        /// Tile being changed.
        tile: TileCoord,
        /// Whether entities may move onto the tile.
        walkable: bool,
    },
    /// Requests that a new entity is created on the provided tile.
    SpawnEntity {
        /// Stat template describing the entity.
        template: EntityTemplate,
        /// Team that owns the entity.
        team: TeamId,
        /// Tile the entity should occupy.
        tile: TileCoord,
    },
    /// Deactivates an entity and detaches it from its tile.
    RemoveEntity {
        /// Entity targeted for removal.
        entity: EntityId,
    },
    /// Closes the setup phase so the first turn can begin.
    StartMatch,
    /// Replaces the turn queue order with a permutation of itself.
    ReorderTurnQueue {
        /// Every queued character, in the new order.
        order: Vec<EntityId>,
    },
    /// Subtracts the provided amount from every living character's initiative.
    DebitInitiative {
        /// Initiative removed from each living character.
        amount: u32,
    },
    /// Hands the turn to the provided character.
    BeginTurn {
        /// Character that acts next.
        entity: EntityId,
    },
    /// Replaces the current selection set.
    SetSelection {
        /// Entity the selection belongs to.
        entity: EntityId,
        /// Tiles the entity may act on.
        tiles: Vec<TileCoord>,
        /// Whether the selection designates move destinations or attack positions.
        mode: SelectionMode,
    },
    /// Moves an entity onto another tile.
    MoveEntity {
        /// Entity being moved.
        entity: EntityId,
        /// Destination tile.
        to: TileCoord,
    },
    /// Records the enemy an attacker intends to strike.
    DesignateTarget {
        /// Character preparing the attack.
        attacker: EntityId,
        /// Character being attacked.
        target: EntityId,
    },
    /// Applies a rolled amount of damage from an attacker to a target.
    Strike {
        /// Character delivering the blow.
        attacker: EntityId,
        /// Character receiving the blow.
        target: EntityId,
        /// Damage rolled for the blow before clamping.
        damage: u32,
    },
    /// Closes the provided character's turn.
    EndTurn {
        /// Character whose turn ends.
        entity: EntityId,
    },
    /// Moves the match into its terminal state.
    FinishMatch {
        /// Team left standing, if exactly one team survived.
        winner: Option<TeamId>,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Confirms that a new tile grid was laid out.
    GridBuilt {
        /// Number of tile columns in the grid.
        columns: u32,
        /// Number of tile rows in the grid.
        rows: u32,
    },
    /// Confirms that a tile changed walkability.
    WalkabilityChanged {
        /// Tile that changed.
        tile: TileCoord,
        /// Whether entities may move onto the tile.
        walkable: bool,
    },
    /// Confirms that an entity entered the world.
    EntitySpawned {
        /// Identifier allocated to the entity.
        entity: EntityId,
        /// Variant of the spawned entity.
        kind: EntityKind,
        /// Team that owns the entity.
        team: TeamId,
        /// Tile the entity occupies.
        tile: TileCoord,
    },
    /// Reports that a spawn request was rejected by the world.
    SpawnRejected {
        /// Team that requested the spawn.
        team: TeamId,
        /// Tile named in the request.
        tile: TileCoord,
        /// Specific reason the spawn failed.
        reason: SpawnError,
    },
    /// Confirms that an entity was deactivated.
    EntityRemoved {
        /// Entity that left the world.
        entity: EntityId,
    },
    /// Announces that setup completed and turns may begin.
    MatchStarted,
    /// Confirms that the turn queue changed order.
    TurnQueueReordered {
        /// Queue order after the change.
        order: Vec<EntityId>,
    },
    /// Confirms that living characters paid initiative.
    InitiativeDebited {
        /// Initiative removed from each living character.
        amount: u32,
    },
    /// Announces the character that acts now.
    TurnStarted {
        /// Character that received the turn.
        entity: EntityId,
    },
    /// Reports that the selection set was replaced.
    SelectionChanged {
        /// Entity the selection belongs to.
        entity: EntityId,
        /// Mode of the new selection.
        mode: SelectionMode,
        /// Number of tiles in the new selection.
        tiles: usize,
    },
    /// Confirms that an entity moved between tiles.
    EntityMoved {
        /// Entity that moved.
        entity: EntityId,
        /// Tile the entity left.
        from: TileCoord,
        /// Tile the entity entered.
        to: TileCoord,
    },
    /// Confirms that an attacker designated a target.
    TargetDesignated {
        /// Character preparing the attack.
        attacker: EntityId,
        /// Character being attacked.
        target: EntityId,
    },
    /// Confirms that a blow landed.
    EntityDamaged {
        /// Character that delivered the blow.
        attacker: EntityId,
        /// Character that received the blow.
        target: EntityId,
        /// Damage rolled for the blow.
        damage: u32,
        /// Health left on the target after clamping.
        remaining: u32,
    },
    /// Announces that a character ran out of health.
    EntityKilled {
        /// Character that died.
        entity: EntityId,
        /// Tile the character vacated.
        tile: TileCoord,
    },
    /// Announces that a character's turn is over.
    TurnEnded {
        /// Character whose turn ended.
        entity: EntityId,
    },
    /// Announces the end of the match.
    MatchFinished {
        /// Team left standing, if exactly one team survived.
        winner: Option<TeamId>,
    },
}

/// Unique identifier assigned to an entity, stable for the lifetime of a match.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(u32);

impl EntityId {
    /// Creates a new entity identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Slot of the entity inside the registry arena.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Identifier of the side an entity fights for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TeamId(u32);

impl TeamId {
    /// Team assigned to terrain objects that fight for nobody.
    pub const NEUTRAL: TeamId = TeamId(0);

    /// Creates a new team identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for TeamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "team {}", self.0)
    }
}

/// Location of a single tile expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileCoord {
    column: u32,
    row: u32,
}

impl TileCoord {
    /// Creates a new tile coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the tile.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the tile.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Center of the tile on the ground plane, measured in tile units.
    #[must_use]
    pub fn center(self) -> Vec2 {
        Vec2::new(self.column as f32 + 0.5, self.row as f32 + 0.5)
    }
}

impl fmt::Display for TileCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.column, self.row)
    }
}

/// Projects a world-space position onto the ground plane used for distance queries.
#[must_use]
pub fn planar(position: Vec3) -> Vec2 {
    Vec2::new(position.x, position.z)
}

/// Variants an entity can take.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    /// Turn-taking combatant.
    Character,
    /// Static obstacle that blocks movement.
    Terrain,
}

/// Static obstacles that can be scattered across the grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerrainKind {
    /// A tree.
    Tree,
    /// A rock.
    Rock,
}

/// Stat block used to create a character.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CharacterTemplate {
    /// Display name of the character.
    pub name: String,
    /// Movement range measured in tile units.
    pub speed: f32,
    /// Base initiative; lower values act sooner.
    pub initiative: u32,
    /// Health the character spawns with.
    pub max_health: u32,
    /// Smallest damage roll of the character's attack.
    pub min_attack: u32,
    /// Largest damage roll of the character's attack.
    pub max_attack: u32,
}

/// Template describing either variant of entity.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum EntityTemplate {
    /// A character built from the provided stat block.
    Character(CharacterTemplate),
    /// A terrain object of the provided kind.
    Terrain(TerrainKind),
}

impl EntityTemplate {
    /// Variant of entity the template produces.
    #[must_use]
    pub const fn kind(&self) -> EntityKind {
        match self {
            Self::Character(_) => EntityKind::Character,
            Self::Terrain(_) => EntityKind::Terrain,
        }
    }
}

/// Distinguishes move selection from attack-target selection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum SelectionMode {
    /// Tiles are move destinations or enemies that can be designated.
    #[default]
    Moving,
    /// Tiles are positions from which the designated target can be struck.
    Targeting,
}

/// Lifecycle of a match as observed by the turn scheduler.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum MatchPhase {
    /// Grid and entities are being prepared.
    #[default]
    Setup,
    /// Turns are running but nobody holds the turn right now.
    Idle,
    /// The provided character holds the turn.
    Acting(EntityId),
    /// The match is over.
    Finished {
        /// Team left standing, if exactly one team survived.
        winner: Option<TeamId>,
    },
}

impl MatchPhase {
    /// Character currently holding the turn, if any.
    #[must_use]
    pub const fn acting(&self) -> Option<EntityId> {
        match self {
            Self::Acting(entity) => Some(*entity),
            _ => None,
        }
    }

    /// Reports whether the match reached its terminal state.
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        matches!(self, Self::Finished { .. })
    }
}

/// Reasons a spawn may fail.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error, Serialize, Deserialize)]
pub enum SpawnError {
    /// Every attempt to pick a free tile from the zone hit an occupied tile.
    #[error("no free tile found in the spawn zone after {attempts} attempts")]
    NoFreeTile {
        /// Number of random picks that were tried.
        attempts: usize,
    },
    /// The entity registry has no slot left.
    #[error("entity registry is full ({capacity} slots)")]
    CapacityExhausted {
        /// Configured capacity of the registry.
        capacity: usize,
    },
    /// The requested tile already hosts an entity.
    #[error("tile {tile} is already occupied")]
    TileOccupied {
        /// Tile named in the request.
        tile: TileCoord,
    },
}

/// Reasons a player action is ignored.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error)]
pub enum InvalidSelection {
    /// No character holds the turn.
    #[error("no entity is acting")]
    NoActingEntity,
    /// The clicked tile is not part of the current selection set.
    #[error("tile {0} is outside the selection set")]
    OutsideSelection(TileCoord),
    /// The clicked tile hosts an entity that cannot be moved onto or attacked.
    #[error("tile {0} hosts an entity that cannot be acted on")]
    UnreachableOccupant(TileCoord),
    /// An attack was confirmed without a designated target.
    #[error("no target has been designated")]
    NoDesignatedTarget,
    /// The match already ended.
    #[error("the match has finished")]
    MatchFinished,
}

/// Errors produced while resolving a player action.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum ActionError {
    /// The action did not name anything the acting entity may act on.
    #[error("invalid selection: {0}")]
    InvalidSelection(#[from] InvalidSelection),
}

/// World-space corners of a tile quad.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TileCorners {
    /// Corner at the lowest column and row.
    pub bottom_left: Vec3,
    /// Corner at the highest column and lowest row.
    pub bottom_right: Vec3,
    /// Corner at the lowest column and highest row.
    pub top_left: Vec3,
    /// Corner at the highest column and row.
    pub top_right: Vec3,
}

impl TileCorners {
    /// Mean height of the four corners.
    #[must_use]
    pub fn mean_height(&self) -> f32 {
        (self.bottom_left.y + self.bottom_right.y + self.top_left.y + self.top_right.y) / 4.0
    }

    /// Midpoint of opposite corners projected onto the ground plane.
    #[must_use]
    pub fn planar_center(&self) -> Vec2 {
        (planar(self.bottom_left) + planar(self.top_right)) / 2.0
    }
}

/// Immutable representation of a single tile used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TileSnapshot {
    /// Coordinate of the tile.
    pub coord: TileCoord,
    /// World-space corners of the tile.
    pub corners: TileCorners,
    /// Center of the tile on the ground plane.
    pub center: Vec2,
    /// Height at which entities standing on the tile are placed.
    pub center_height: f32,
    /// Whether entities may move onto the tile.
    pub walkable: bool,
    /// Entity currently occupying the tile.
    pub occupant: Option<EntityId>,
}

/// Read-only snapshot describing every tile of the grid.
#[derive(Clone, Debug, Default)]
pub struct TileView {
    columns: u32,
    rows: u32,
    snapshots: Vec<TileSnapshot>,
}

impl TileView {
    /// Creates a new tile view from snapshots laid out in row-major order.
    #[must_use]
    pub fn from_snapshots(columns: u32, rows: u32, snapshots: Vec<TileSnapshot>) -> Self {
        debug_assert_eq!(snapshots.len(), columns as usize * rows as usize);
        Self {
            columns,
            rows,
            snapshots,
        }
    }

    /// Returns the snapshot of the provided tile, if it lies inside the grid.
    #[must_use]
    pub fn get(&self, coord: TileCoord) -> Option<&TileSnapshot> {
        if coord.column() >= self.columns || coord.row() >= self.rows {
            return None;
        }
        let index = coord.row() as usize * self.columns as usize + coord.column() as usize;
        self.snapshots.get(index)
    }

    /// Entity occupying the provided tile, if any.
    #[must_use]
    pub fn occupant(&self, coord: TileCoord) -> Option<EntityId> {
        self.get(coord).and_then(|tile| tile.occupant)
    }

    /// Iterator over the tiles in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = &TileSnapshot> {
        self.snapshots.iter()
    }

    /// Provides the dimensions of the grid as `(columns, rows)`.
    #[must_use]
    pub const fn dimensions(&self) -> (u32, u32) {
        (self.columns, self.rows)
    }

    /// Number of tiles in the grid.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the grid has no tiles.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

/// Character-only state captured in an [`EntitySnapshot`].
#[derive(Clone, Debug, PartialEq)]
pub struct CharacterSnapshot {
    /// Display name.
    pub name: String,
    /// Movement range measured in tile units.
    pub speed: f32,
    /// Initiative restored after each turn.
    pub base_initiative: u32,
    /// Initiative remaining before the character acts.
    pub initiative: u32,
    /// Current health.
    pub health: u32,
    /// Health the character spawned with.
    pub max_health: u32,
    /// Smallest damage roll of the character's attack.
    pub min_attack: u32,
    /// Largest damage roll of the character's attack.
    pub max_attack: u32,
    /// Enemy the character intends to strike this turn.
    pub target: Option<EntityId>,
}

/// Variant-specific state captured in an [`EntitySnapshot`].
#[derive(Clone, Debug, PartialEq)]
pub enum BodySnapshot {
    /// State of a character.
    Character(CharacterSnapshot),
    /// Kind of terrain object.
    Terrain(TerrainKind),
}

/// Immutable representation of a single entity used for queries.
#[derive(Clone, Debug, PartialEq)]
pub struct EntitySnapshot {
    /// Identifier allocated to the entity.
    pub id: EntityId,
    /// Team the entity fights for.
    pub team: TeamId,
    /// World-space position of the entity.
    pub position: Vec3,
    /// Tile the entity occupies.
    pub tile: Option<TileCoord>,
    /// Whether the entity is present in the world.
    pub active: bool,
    /// Whether the entity can still fight.
    pub alive: bool,
    /// Whether the entity keeps others off its tile.
    pub blocks_movement: bool,
    /// Variant-specific state.
    pub body: BodySnapshot,
}

impl EntitySnapshot {
    /// Variant of the entity.
    #[must_use]
    pub const fn kind(&self) -> EntityKind {
        match &self.body {
            BodySnapshot::Character(_) => EntityKind::Character,
            BodySnapshot::Terrain(_) => EntityKind::Terrain,
        }
    }

    /// Character state, if the entity is a character.
    #[must_use]
    pub const fn character(&self) -> Option<&CharacterSnapshot> {
        match &self.body {
            BodySnapshot::Character(character) => Some(character),
            BodySnapshot::Terrain(_) => None,
        }
    }

    /// Position of the entity projected onto the ground plane.
    #[must_use]
    pub fn planar_position(&self) -> Vec2 {
        planar(self.position)
    }

    /// Reports whether the entity is an active character that can still fight.
    #[must_use]
    pub fn is_living_character(&self) -> bool {
        self.active && self.alive && self.character().is_some()
    }

    /// Reports whether `other` is a living character fighting for another team.
    #[must_use]
    pub fn is_hostile_to(&self, other: &EntitySnapshot) -> bool {
        other.is_living_character() && other.team != self.team
    }
}

/// Read-only snapshot describing every entity in the registry.
#[derive(Clone, Debug, Default)]
pub struct EntityView {
    snapshots: Vec<EntitySnapshot>,
}

impl EntityView {
    /// Creates a new entity view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<EntitySnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Returns the snapshot of the provided entity.
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&EntitySnapshot> {
        self.snapshots
            .binary_search_by_key(&id, |snapshot| snapshot.id)
            .ok()
            .map(|index| &self.snapshots[index])
    }

    /// Iterator over the captured entity snapshots in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = &EntitySnapshot> {
        self.snapshots.iter()
    }

    /// Number of entities in the registry, including dead and removed ones.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the registry holds no entities.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<EntitySnapshot> {
        self.snapshots
    }
}

/// Read-only snapshot of the current selection set.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SelectionView {
    /// Entity the selection belongs to.
    pub entity: Option<EntityId>,
    /// Tiles the entity may act on.
    pub tiles: Vec<TileCoord>,
    /// Mode of the selection.
    pub mode: SelectionMode,
}

impl SelectionView {
    /// Reports whether the provided tile is part of the selection set.
    #[must_use]
    pub fn contains(&self, tile: TileCoord) -> bool {
        self.tiles.iter().any(|candidate| *candidate == tile)
    }

    /// Reports whether the selection holds no tiles.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }
}

/// Entry of the turn queue captured for scheduling decisions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TurnSlot {
    /// Queued character.
    pub entity: EntityId,
    /// Team the character fights for.
    pub team: TeamId,
    /// Whether the character can still act.
    pub alive: bool,
    /// Initiative remaining before the character acts.
    pub initiative: u32,
}

/// Read-only snapshot of the turn queue in queue order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TurnQueueView {
    slots: Vec<TurnSlot>,
}

impl TurnQueueView {
    /// Creates a new view from slots listed in queue order.
    #[must_use]
    pub fn from_slots(slots: Vec<TurnSlot>) -> Self {
        Self { slots }
    }

    /// Iterator over the slots in queue order.
    pub fn iter(&self) -> impl Iterator<Item = &TurnSlot> {
        self.slots.iter()
    }

    /// Number of queued characters, living or dead.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Reports whether no character was ever queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Consumes the view, yielding the slots in queue order.
    #[must_use]
    pub fn into_vec(self) -> Vec<TurnSlot> {
        self.slots
    }
}
