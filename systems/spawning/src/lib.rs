#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic spawn allocator that places team entities inside their zones.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use skirmish_core::{Command, EntityTemplate, SpawnError, TeamId, TileCoord, TileView};

/// Tiles reserved for one team's initial placement.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SpawnZone {
    team: TeamId,
    tiles: Vec<TileCoord>,
}

impl SpawnZone {
    /// Creates a zone owned by `team` covering the provided candidate tiles.
    #[must_use]
    pub fn new(team: TeamId, tiles: Vec<TileCoord>) -> Self {
        Self { team, tiles }
    }

    /// Builds a zone covering every tile of the rectangle spanned by
    /// `first` and `last`, inclusive, in row-major order.
    #[must_use]
    pub fn rectangle(team: TeamId, first: TileCoord, last: TileCoord) -> Self {
        let (min_column, max_column) = ordered(first.column(), last.column());
        let (min_row, max_row) = ordered(first.row(), last.row());
        let tiles = (min_row..=max_row)
            .flat_map(|row| {
                (min_column..=max_column).map(move |column| TileCoord::new(column, row))
            })
            .collect();
        Self { team, tiles }
    }

    /// Team that owns the zone.
    #[must_use]
    pub const fn team(&self) -> TeamId {
        self.team
    }

    /// Candidate tiles in their declared order.
    #[must_use]
    pub fn tiles(&self) -> &[TileCoord] {
        &self.tiles
    }

    /// Number of candidate tiles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    /// Reports whether the zone has no candidate tiles.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }
}

fn ordered(a: u32, b: u32) -> (u32, u32) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Pure system that chooses spawn tiles using a seeded random stream.
#[derive(Debug)]
pub struct SpawnAllocator {
    rng: ChaCha8Rng,
}

impl SpawnAllocator {
    /// Creates an allocator whose choices are fully determined by `seed`.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Emits a spawn command for `template` on a free tile of `zone`.
    ///
    /// A tile is drawn uniformly from the zone up to once per candidate tile;
    /// the first draw that lands on a walkable, unoccupied tile wins. The
    /// chosen tile is returned so callers can track placements made within the
    /// same step, since `tiles` only reflects state applied before the call.
    ///
    /// # Errors
    ///
    /// Returns [`SpawnError::NoFreeTile`] when every draw hit an occupied or
    /// unwalkable tile, or when the zone is empty.
    pub fn spawn(
        &mut self,
        template: EntityTemplate,
        zone: &SpawnZone,
        tiles: &TileView,
        out: &mut Vec<Command>,
    ) -> Result<TileCoord, SpawnError> {
        let attempts = zone.len();
        for _ in 0..attempts {
            let candidate = zone.tiles[self.rng.gen_range(0..attempts)];
            if is_free(tiles, candidate) {
                out.push(Command::SpawnEntity {
                    template,
                    team: zone.team,
                    tile: candidate,
                });
                return Ok(candidate);
            }
        }

        Err(SpawnError::NoFreeTile { attempts })
    }
}

fn is_free(tiles: &TileView, coord: TileCoord) -> bool {
    tiles
        .get(coord)
        .is_some_and(|tile| tile.walkable && tile.occupant.is_none())
}
