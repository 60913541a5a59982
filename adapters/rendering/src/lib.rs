#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Skirmish adapters.
//!
//! Backends never query the simulation directly. They receive a [`Scene`]
//! captured from read-only views after each step and draw it as they see fit.

use anyhow::Result as AnyResult;
use glam::{Vec2, Vec3};
use skirmish_core::{
    BodySnapshot, EntityId, EntityKind, EntitySnapshot, EntityView, SelectionMode, SelectionView,
    TeamId, TerrainKind, TileCoord, TileCorners, TileView,
};

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }

    /// Moves every color channel `amount` of the way towards white, keeping alpha.
    #[must_use]
    pub fn lighten(self, amount: f32) -> Self {
        let amount = amount.clamp(0.0, 1.0);
        let towards_white = |channel: f32| channel + (1.0 - channel) * amount;
        Self::new(
            towards_white(self.red),
            towards_white(self.green),
            towards_white(self.blue),
            self.alpha,
        )
    }
}

/// How far the acting character's tint is lightened so it stands out.
pub const ACTING_LIGHTEN: f32 = 0.35;

const NEUTRAL_COLOR: Color = Color::from_rgb_u8(0x8a, 0x8a, 0x80);
const TEAM_PALETTE: [Color; 4] = [
    Color::from_rgb_u8(0x2f, 0x6f, 0xd6),
    Color::from_rgb_u8(0xc8, 0x2a, 0x36),
    Color::from_rgb_u8(0x2f, 0x95, 0x32),
    Color::from_rgb_u8(0xff, 0xc1, 0x07),
];

/// Color used to tint the sprites and health bars of `team`.
#[must_use]
pub fn team_color(team: TeamId) -> Color {
    if team == TeamId::NEUTRAL {
        return NEUTRAL_COLOR;
    }
    TEAM_PALETTE[(team.get() as usize - 1) % TEAM_PALETTE.len()]
}

/// Team tint for an entity, lightened while it holds the turn.
#[must_use]
pub fn entity_tint(team: TeamId, acting: bool) -> Color {
    let color = team_color(team);
    if acting {
        color.lighten(ACTING_LIGHTEN)
    } else {
        color
    }
}

/// Sprites a backend must be able to draw.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SpriteKey {
    /// Character that can still fight.
    Character,
    /// Character whose health reached zero.
    CharacterDead,
    /// Tree obstacle.
    Tree,
    /// Rock obstacle.
    Rock,
}

/// Emphasis applied to a tile of the current selection set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TileHighlight {
    /// Tile is not part of the selection.
    None,
    /// Acting character may move onto the tile.
    Movable,
    /// Tile hosts an enemy the acting character may designate.
    Attackable,
    /// Tile hosts the designated target.
    Target,
}

/// Renderer-ready tile quad.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneTile {
    /// Grid coordinate of the tile.
    pub coord: TileCoord,
    /// World-space corners of the quad.
    pub corners: TileCorners,
    /// Whether entities may stand on the tile.
    pub walkable: bool,
    /// Selection emphasis.
    pub highlight: TileHighlight,
}

/// Renderer-ready entity sprite.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneEntity {
    /// Identifier of the entity.
    pub id: EntityId,
    /// Team the entity fights for.
    pub team: TeamId,
    /// World-space anchor of the sprite.
    pub position: Vec3,
    /// Sprite to draw.
    pub sprite: SpriteKey,
    /// Team tint.
    pub tint: Color,
    /// Remaining health as a fraction of maximum health, for characters.
    pub health_fraction: Option<f32>,
    /// Whether the entity holds the turn.
    pub acting: bool,
}

/// Immutable snapshot of everything a backend draws for one frame.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Scene {
    /// Number of tile columns.
    pub columns: u32,
    /// Number of tile rows.
    pub rows: u32,
    /// Tiles in row-major order.
    pub tiles: Vec<SceneTile>,
    /// Every active entity, dead characters included.
    pub entities: Vec<SceneEntity>,
    /// Character holding the turn, if any.
    pub acting: Option<EntityId>,
    /// Whether the selection is narrowed to a designated target.
    pub targeting: bool,
}

impl Scene {
    /// Captures a scene from the simulation's read-only views.
    #[must_use]
    pub fn capture(
        tiles: &TileView,
        entities: &EntityView,
        selection: &SelectionView,
        acting: Option<EntityId>,
    ) -> Self {
        let actor = acting.and_then(|id| entities.get(id));
        let designated = actor
            .and_then(EntitySnapshot::character)
            .and_then(|character| character.target);

        let scene_tiles = tiles
            .iter()
            .map(|tile| {
                let highlight = if !selection.contains(tile.coord) {
                    TileHighlight::None
                } else {
                    let occupant = tile.occupant.and_then(|id| entities.get(id));
                    match (occupant, actor) {
                        (Some(other), _) if Some(other.id) == designated => TileHighlight::Target,
                        (Some(other), Some(actor)) if actor.is_hostile_to(other) => {
                            TileHighlight::Attackable
                        }
                        _ => TileHighlight::Movable,
                    }
                };
                SceneTile {
                    coord: tile.coord,
                    corners: tile.corners,
                    walkable: tile.walkable,
                    highlight,
                }
            })
            .collect();

        let scene_entities = entities
            .iter()
            .filter(|entity| entity.active)
            .map(|entity| SceneEntity {
                id: entity.id,
                team: entity.team,
                position: entity.position,
                sprite: sprite_for(entity),
                tint: entity_tint(entity.team, Some(entity.id) == acting),
                health_fraction: entity.character().map(|character| {
                    if character.max_health == 0 {
                        0.0
                    } else {
                        character.health as f32 / character.max_health as f32
                    }
                }),
                acting: Some(entity.id) == acting,
            })
            .collect();

        let (columns, rows) = tiles.dimensions();
        Self {
            columns,
            rows,
            tiles: scene_tiles,
            entities: scene_entities,
            acting,
            targeting: selection.mode == SelectionMode::Targeting,
        }
    }

    /// Returns the tile containing the provided ground-plane point, if any.
    #[must_use]
    pub fn tile_at(&self, ground: Vec2) -> Option<TileCoord> {
        if ground.x < 0.0 || ground.y < 0.0 {
            return None;
        }
        let (column, row) = (ground.x.floor() as u32, ground.y.floor() as u32);
        (column < self.columns && row < self.rows).then(|| TileCoord::new(column, row))
    }

    /// Returns the scene tile at `coord`, if it lies inside the grid.
    #[must_use]
    pub fn tile(&self, coord: TileCoord) -> Option<&SceneTile> {
        if coord.column() >= self.columns || coord.row() >= self.rows {
            return None;
        }
        self.tiles
            .get(coord.row() as usize * self.columns as usize + coord.column() as usize)
    }

    /// Returns the sprite standing on `coord`, if any.
    ///
    /// Dead characters no longer occupy a tile but are still drawn where they
    /// fell; living entities take precedence.
    #[must_use]
    pub fn entity_on(&self, coord: TileCoord) -> Option<&SceneEntity> {
        let on_tile = |entity: &&SceneEntity| {
            self.tile_at(Vec2::new(entity.position.x, entity.position.z)) == Some(coord)
        };
        self.entities
            .iter()
            .filter(on_tile)
            .find(|entity| entity.sprite != SpriteKey::CharacterDead)
            .or_else(|| self.entities.iter().find(on_tile))
    }
}

fn sprite_for(entity: &EntitySnapshot) -> SpriteKey {
    match &entity.body {
        BodySnapshot::Character(_) if entity.alive => SpriteKey::Character,
        BodySnapshot::Character(_) => SpriteKey::CharacterDead,
        BodySnapshot::Terrain(TerrainKind::Tree) => SpriteKey::Tree,
        BodySnapshot::Terrain(TerrainKind::Rock) => SpriteKey::Rock,
    }
}

/// Presentation descriptor consumed by rendering backends.
#[derive(Clone, Debug, PartialEq)]
pub struct Presentation {
    /// Title shown by the backend.
    pub title: String,
    /// Solid color used to clear each frame.
    pub clear_color: Color,
    /// Scene content that should be displayed.
    pub scene: Scene,
}

impl Presentation {
    /// Constructs a new presentation descriptor.
    #[must_use]
    pub fn new<T>(title: T, clear_color: Color, scene: Scene) -> Self
    where
        T: Into<String>,
    {
        Self {
            title: title.into(),
            clear_color,
            scene,
        }
    }

    /// Number of entities of the provided kind drawn in the scene.
    #[must_use]
    pub fn count(&self, kind: EntityKind) -> usize {
        self.scene
            .entities
            .iter()
            .filter(|entity| match kind {
                EntityKind::Character => matches!(
                    entity.sprite,
                    SpriteKey::Character | SpriteKey::CharacterDead
                ),
                EntityKind::Terrain => matches!(entity.sprite, SpriteKey::Tree | SpriteKey::Rock),
            })
            .count()
    }
}

/// Rendering backend capable of presenting Skirmish scenes.
pub trait RenderingBackend {
    /// Draws a single frame.
    fn present(&mut self, presentation: &Presentation) -> AnyResult<()>;
}
