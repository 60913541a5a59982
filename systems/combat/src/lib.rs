#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that turns resolved player input into movement and attack commands.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use skirmish_core::{
    ActionError, CharacterSnapshot, Command, EntityId, EntityView, InvalidSelection, MatchPhase,
    SelectionView, TileCoord, TileView,
};

/// Input the acting character's controller issued this step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlayerAction {
    /// A tile was clicked, either directly or through the entity standing on it.
    SelectTile(TileCoord),
    /// The attack against the designated target was confirmed.
    ConfirmAttack,
    /// The turn is passed without acting.
    EndTurn,
}

/// Outcome of a resolved action.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Resolution {
    /// No action was requested.
    Idle,
    /// The actor moved to the tile and its turn ended.
    Moved {
        /// Destination tile.
        to: TileCoord,
    },
    /// The actor struck its target and its turn ended.
    Attacked {
        /// Entity that was struck.
        target: EntityId,
        /// Damage rolled for the strike.
        damage: u32,
    },
    /// A hostile character was designated; the turn continues in targeting mode.
    TargetDesignated {
        /// Entity designated as target.
        target: EntityId,
    },
    /// The actor passed its turn.
    TurnPassed,
}

/// Combat resolver rolling damage from a seeded random stream.
#[derive(Debug)]
pub struct CombatResolver {
    rng: ChaCha8Rng,
}

impl CombatResolver {
    /// Creates a resolver whose damage rolls are fully determined by `seed`.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Resolves `action` for the acting character and emits the resulting commands.
    ///
    /// # Errors
    ///
    /// Returns [`ActionError::InvalidSelection`] when the action names nothing
    /// the actor may act on. No commands are emitted in that case.
    pub fn handle(
        &mut self,
        action: PlayerAction,
        phase: MatchPhase,
        tiles: &TileView,
        entities: &EntityView,
        selection: &SelectionView,
        out: &mut Vec<Command>,
    ) -> Result<Resolution, ActionError> {
        let actor = match phase {
            MatchPhase::Acting(actor) => actor,
            MatchPhase::Finished { .. } => return Err(InvalidSelection::MatchFinished.into()),
            MatchPhase::Setup | MatchPhase::Idle => {
                return Err(InvalidSelection::NoActingEntity.into())
            }
        };
        let character = entities
            .get(actor)
            .and_then(|snapshot| snapshot.character())
            .ok_or(InvalidSelection::NoActingEntity)?;

        let tile = match action {
            PlayerAction::EndTurn => {
                out.push(Command::EndTurn { entity: actor });
                return Ok(Resolution::TurnPassed);
            }
            PlayerAction::ConfirmAttack => character
                .target
                .and_then(|target| entities.get(target))
                .and_then(|target| target.tile)
                .ok_or(InvalidSelection::NoDesignatedTarget)?,
            PlayerAction::SelectTile(tile) => tile,
        };

        if selection.entity != Some(actor) || !selection.contains(tile) {
            return Err(InvalidSelection::OutsideSelection(tile).into());
        }

        match tiles.occupant(tile) {
            None => Ok(self.move_and_strike(actor, character, tile, out)),
            Some(occupant) if occupant == actor => {
                Ok(self.move_and_strike(actor, character, tile, out))
            }
            Some(occupant) if character.target == Some(occupant) => {
                let damage = self.strike(actor, occupant, character, out);
                out.push(Command::EndTurn { entity: actor });
                Ok(Resolution::Attacked {
                    target: occupant,
                    damage,
                })
            }
            Some(occupant) => {
                let hostile = entities
                    .get(actor)
                    .zip(entities.get(occupant))
                    .is_some_and(|(actor, other)| actor.is_hostile_to(other));
                if !hostile {
                    return Err(InvalidSelection::UnreachableOccupant(tile).into());
                }
                out.push(Command::DesignateTarget {
                    attacker: actor,
                    target: occupant,
                });
                Ok(Resolution::TargetDesignated { target: occupant })
            }
        }
    }

    fn move_and_strike(
        &mut self,
        actor: EntityId,
        character: &CharacterSnapshot,
        to: TileCoord,
        out: &mut Vec<Command>,
    ) -> Resolution {
        out.push(Command::MoveEntity { entity: actor, to });
        let resolution = match character.target {
            Some(target) => Resolution::Attacked {
                target,
                damage: self.strike(actor, target, character, out),
            },
            None => Resolution::Moved { to },
        };
        out.push(Command::EndTurn { entity: actor });
        resolution
    }

    fn strike(
        &mut self,
        attacker: EntityId,
        target: EntityId,
        character: &CharacterSnapshot,
        out: &mut Vec<Command>,
    ) -> u32 {
        let damage = self.roll_damage(character.min_attack, character.max_attack);
        out.push(Command::Strike {
            attacker,
            target,
            damage,
        });
        damage
    }

    /// Rolls damage uniformly within `[min_attack, max_attack]`, inclusive.
    ///
    /// Swapped bounds are normalised rather than rejected.
    pub fn roll_damage(&mut self, min_attack: u32, max_attack: u32) -> u32 {
        let (low, high) = if min_attack <= max_attack {
            (min_attack, max_attack)
        } else {
            (max_attack, min_attack)
        };
        self.rng.gen_range(low..=high)
    }
}
