//! Tile lattice laid over a seeded, height-perturbed vertex field.

use glam::{Vec2, Vec3};
use rand::{distributions::Uniform, Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use skirmish_core::{EntityId, TileCoord, TileCorners, TileSnapshot};

/// Single walkable (or not) quad of the grid.
#[derive(Clone, Debug)]
pub(crate) struct Tile {
    pub(crate) corners: TileCorners,
    pub(crate) center: Vec2,
    pub(crate) center_height: f32,
    pub(crate) walkable: bool,
    pub(crate) occupant: Option<EntityId>,
}

impl Tile {
    fn from_corners(corners: TileCorners) -> Self {
        Self {
            center: corners.planar_center(),
            center_height: corners.mean_height(),
            corners,
            walkable: true,
            occupant: None,
        }
    }

    /// Position at which an entity standing on the tile is placed.
    pub(crate) fn standing_position(&self) -> Vec3 {
        Vec3::new(self.center.x, self.center_height, self.center.y)
    }
}

/// Dense row-major store of tiles.
#[derive(Clone, Debug, Default)]
pub(crate) struct Grid {
    columns: u32,
    rows: u32,
    tiles: Vec<Tile>,
}

impl Grid {
    /// Lays out `columns` x `rows` tiles whose corners share a vertex height field.
    ///
    /// Each lattice vertex receives an offset sampled uniformly from
    /// `[-height_jitter, height_jitter]`; a jitter of zero yields a flat grid.
    pub(crate) fn build(columns: u32, rows: u32, height_jitter: f32, seed: u64) -> Self {
        let vertex_columns = columns as usize + 1;
        let heights = height_field(vertex_columns, rows as usize + 1, height_jitter, seed);
        let height_at =
            |column: u32, row: u32| heights[row as usize * vertex_columns + column as usize];

        let mut tiles = Vec::with_capacity(columns as usize * rows as usize);
        for row in 0..rows {
            for column in 0..columns {
                let (left, right) = (column as f32, column as f32 + 1.0);
                let (bottom, top) = (row as f32, row as f32 + 1.0);
                let corners = TileCorners {
                    bottom_left: Vec3::new(left, height_at(column, row), bottom),
                    bottom_right: Vec3::new(right, height_at(column + 1, row), bottom),
                    top_left: Vec3::new(left, height_at(column, row + 1), top),
                    top_right: Vec3::new(right, height_at(column + 1, row + 1), top),
                };
                tiles.push(Tile::from_corners(corners));
            }
        }

        Self {
            columns,
            rows,
            tiles,
        }
    }

    pub(crate) const fn dimensions(&self) -> (u32, u32) {
        (self.columns, self.rows)
    }

    pub(crate) fn contains(&self, coord: TileCoord) -> bool {
        coord.column() < self.columns && coord.row() < self.rows
    }

    /// Returns the tile at `coord`.
    ///
    /// # Panics
    ///
    /// Panics when `coord` lies outside the grid; coordinates are produced by
    /// the engine itself, so an out-of-range tile is a programming error.
    pub(crate) fn tile(&self, coord: TileCoord) -> &Tile {
        &self.tiles[self.index(coord)]
    }

    fn tile_mut(&mut self, coord: TileCoord) -> &mut Tile {
        let index = self.index(coord);
        &mut self.tiles[index]
    }

    pub(crate) fn occupy(&mut self, coord: TileCoord, entity: EntityId) {
        let tile = self.tile_mut(coord);
        assert!(
            tile.occupant.is_none() || tile.occupant == Some(entity),
            "tile {coord} is already occupied"
        );
        tile.occupant = Some(entity);
    }

    pub(crate) fn vacate(&mut self, coord: TileCoord) -> Option<EntityId> {
        self.tile_mut(coord).occupant.take()
    }

    /// Updates walkability, reporting whether the flag changed.
    pub(crate) fn set_walkable(&mut self, coord: TileCoord, walkable: bool) -> bool {
        let tile = self.tile_mut(coord);
        let changed = tile.walkable != walkable;
        tile.walkable = walkable;
        changed
    }

    pub(crate) fn snapshots(&self) -> Vec<TileSnapshot> {
        self.tiles
            .iter()
            .enumerate()
            .map(|(index, tile)| TileSnapshot {
                coord: self.coord_at(index),
                corners: tile.corners,
                center: tile.center,
                center_height: tile.center_height,
                walkable: tile.walkable,
                occupant: tile.occupant,
            })
            .collect()
    }

    fn coord_at(&self, index: usize) -> TileCoord {
        let columns = self.columns.max(1) as usize;
        TileCoord::new((index % columns) as u32, (index / columns) as u32)
    }

    fn index(&self, coord: TileCoord) -> usize {
        assert!(
            self.contains(coord),
            "tile {coord} lies outside the {}x{} grid",
            self.columns,
            self.rows
        );
        coord.row() as usize * self.columns as usize + coord.column() as usize
    }
}

fn height_field(columns: usize, rows: usize, height_jitter: f32, seed: u64) -> Vec<f32> {
    let count = columns * rows;
    let jitter = height_jitter.abs();
    if jitter == 0.0 || !jitter.is_finite() {
        return vec![0.0; count];
    }

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let offsets = Uniform::new_inclusive(-jitter, jitter);
    (0..count).map(|_| rng.sample(offsets)).collect()
}
