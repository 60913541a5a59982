//! Match configuration loaded from TOML.

use std::{
    collections::BTreeSet,
    fs, io,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use skirmish_core::{CharacterTemplate, TeamId, TileCoord};
use skirmish_system_spawning::SpawnZone;
use thiserror::Error;

/// Errors raised while loading or validating a [`SkirmishConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read configuration at {}", path.display())]
    Io {
        /// Path that was read.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// The configuration is not valid TOML or does not match the schema.
    #[error("failed to parse configuration toml contents")]
    Parse(#[from] toml::de::Error),
    /// The grid has no tiles.
    #[error("grid must have at least one column and one row, got {columns}x{rows}")]
    EmptyGrid {
        /// Configured column count.
        columns: u32,
        /// Configured row count.
        rows: u32,
    },
    /// The height jitter is negative or not a number.
    #[error("height jitter must be a finite, non-negative number, got {0}")]
    InvalidJitter(f32),
    /// The entity registry cannot hold anything.
    #[error("entity capacity must be positive")]
    ZeroCapacity,
    /// Fewer than two teams are configured.
    #[error("a match needs at least two teams, got {0}")]
    TooFewTeams(usize),
    /// A team uses the identifier reserved for terrain.
    #[error("{0} is reserved for terrain")]
    ReservedTeam(TeamId),
    /// Two team entries share an identifier.
    #[error("{0} is configured more than once")]
    DuplicateTeam(TeamId),
    /// A zone lists no tiles.
    #[error("spawn zone of {0} is empty")]
    EmptyZone(TeamId),
    /// A configured tile lies outside the grid.
    #[error("tile {tile} lies outside the {columns}x{rows} grid")]
    TileOutsideGrid {
        /// Offending tile.
        tile: TileCoord,
        /// Configured column count.
        columns: u32,
        /// Configured row count.
        rows: u32,
    },
    /// A character template carries unusable statistics.
    #[error("character `{name}` is invalid: {reason}")]
    InvalidCharacter {
        /// Name of the template.
        name: String,
        /// Explanation of the problem.
        reason: &'static str,
    },
}

/// Candidate tiles of a spawn zone as written in configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ZoneConfig {
    /// Explicit list of tiles.
    Tiles {
        /// Candidate tiles in order.
        tiles: Vec<TileCoord>,
    },
    /// Every tile of the inclusive rectangle spanned by two corners.
    Rectangle {
        /// One corner of the rectangle.
        from: TileCoord,
        /// Opposite corner of the rectangle.
        to: TileCoord,
    },
}

impl ZoneConfig {
    /// Resolves the configured tiles into a zone owned by `team`.
    #[must_use]
    pub fn to_zone(&self, team: TeamId) -> SpawnZone {
        match self {
            Self::Tiles { tiles } => SpawnZone::new(team, tiles.clone()),
            Self::Rectangle { from, to } => SpawnZone::rectangle(team, *from, *to),
        }
    }
}

/// One side of the match.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TeamConfig {
    /// Identifier of the team.
    pub team: TeamId,
    /// Tiles the team's characters are placed on.
    pub zone: ZoneConfig,
    /// Characters fielded by the team, spawned in order.
    pub roster: Vec<CharacterTemplate>,
}

/// Static obstacles scattered before the teams deploy.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainConfig {
    /// Number of trees to place.
    pub trees: usize,
    /// Number of rocks to place.
    pub rocks: usize,
    /// Tiles obstacles may be placed on.
    pub zone: ZoneConfig,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            trees: 3,
            rocks: 2,
            zone: ZoneConfig::Rectangle {
                from: TileCoord::new(2, 0),
                to: TileCoord::new(7, 7),
            },
        }
    }
}

/// Complete description of a match.
///
/// Every field has a default, so a configuration file only needs to name the
/// values it changes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkirmishConfig {
    /// Number of tile columns.
    pub columns: u32,
    /// Number of tile rows.
    pub rows: u32,
    /// Maximum vertical offset applied to each grid vertex.
    pub height_jitter: f32,
    /// Number of entity slots in the registry.
    pub capacity: usize,
    /// Seed every random stream of the match derives from.
    pub seed: u64,
    /// Tiles marked unwalkable before anything spawns.
    pub blocked_tiles: Vec<TileCoord>,
    /// Obstacles placed before the teams.
    pub terrain: TerrainConfig,
    /// Participating teams.
    pub teams: Vec<TeamConfig>,
}

impl Default for SkirmishConfig {
    fn default() -> Self {
        Self {
            columns: 10,
            rows: 8,
            height_jitter: 0.2,
            capacity: 64,
            seed: 0x5eed_0001,
            blocked_tiles: Vec::new(),
            terrain: TerrainConfig::default(),
            teams: vec![
                TeamConfig {
                    team: TeamId::new(1),
                    zone: ZoneConfig::Rectangle {
                        from: TileCoord::new(0, 0),
                        to: TileCoord::new(0, 7),
                    },
                    roster: default_roster(),
                },
                TeamConfig {
                    team: TeamId::new(2),
                    zone: ZoneConfig::Rectangle {
                        from: TileCoord::new(9, 0),
                        to: TileCoord::new(9, 7),
                    },
                    roster: default_roster(),
                },
            ],
        }
    }
}

fn default_roster() -> Vec<CharacterTemplate> {
    vec![
        CharacterTemplate {
            name: "Knight".to_owned(),
            speed: 3.0,
            initiative: 12,
            max_health: 20,
            min_attack: 3,
            max_attack: 6,
        },
        CharacterTemplate {
            name: "Scout".to_owned(),
            speed: 5.0,
            initiative: 8,
            max_health: 12,
            min_attack: 2,
            max_attack: 4,
        },
        CharacterTemplate {
            name: "Brute".to_owned(),
            speed: 2.5,
            initiative: 15,
            max_health: 26,
            min_attack: 6,
            max_attack: 12,
        },
    ]
}

impl SkirmishConfig {
    /// Parses and validates a configuration from TOML text.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates the configuration stored at `path`.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    /// Checks the configuration for values a match cannot be built from.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.columns == 0 || self.rows == 0 {
            return Err(ConfigError::EmptyGrid {
                columns: self.columns,
                rows: self.rows,
            });
        }
        if !self.height_jitter.is_finite() || self.height_jitter < 0.0 {
            return Err(ConfigError::InvalidJitter(self.height_jitter));
        }
        if self.capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        if self.teams.len() < 2 {
            return Err(ConfigError::TooFewTeams(self.teams.len()));
        }

        for tile in &self.blocked_tiles {
            self.check_tile(*tile)?;
        }
        for tile in self.terrain.zone.to_zone(TeamId::NEUTRAL).tiles() {
            self.check_tile(*tile)?;
        }

        let mut seen = BTreeSet::new();
        for team in &self.teams {
            if team.team == TeamId::NEUTRAL {
                return Err(ConfigError::ReservedTeam(team.team));
            }
            if !seen.insert(team.team) {
                return Err(ConfigError::DuplicateTeam(team.team));
            }
            let zone = team.zone.to_zone(team.team);
            if zone.is_empty() {
                return Err(ConfigError::EmptyZone(team.team));
            }
            for tile in zone.tiles() {
                self.check_tile(*tile)?;
            }
            for template in &team.roster {
                validate_character(template)?;
            }
        }

        Ok(())
    }

    fn check_tile(&self, tile: TileCoord) -> Result<(), ConfigError> {
        if tile.column() < self.columns && tile.row() < self.rows {
            return Ok(());
        }
        Err(ConfigError::TileOutsideGrid {
            tile,
            columns: self.columns,
            rows: self.rows,
        })
    }
}

fn validate_character(template: &CharacterTemplate) -> Result<(), ConfigError> {
    let reason = if !template.speed.is_finite() || template.speed < 0.0 {
        "speed must be a finite, non-negative number"
    } else if template.max_health == 0 {
        "maximum health must be positive"
    } else if template.min_attack > template.max_attack {
        "minimum attack exceeds maximum attack"
    } else {
        return Ok(());
    };
    Err(ConfigError::InvalidCharacter {
        name: template.name.clone(),
        reason,
    })
}
