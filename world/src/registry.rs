//! Fixed-capacity arena that stores every entity spawned during a match.

use glam::Vec3;
use skirmish_core::{
    BodySnapshot, CharacterSnapshot, CharacterTemplate, EntityId, EntitySnapshot,
    EntityTemplate, TeamId, TerrainKind, TileCoord,
};

/// Combat state carried by characters only.
#[derive(Clone, Debug)]
pub(crate) struct CharacterState {
    pub(crate) name: String,
    pub(crate) speed: f32,
    pub(crate) base_initiative: u32,
    pub(crate) initiative: u32,
    pub(crate) health: u32,
    pub(crate) max_health: u32,
    pub(crate) min_attack: u32,
    pub(crate) max_attack: u32,
    pub(crate) target: Option<EntityId>,
}

impl CharacterState {
    fn from_template(template: CharacterTemplate) -> Self {
        Self {
            name: template.name,
            speed: template.speed,
            base_initiative: template.initiative,
            initiative: template.initiative,
            health: template.max_health,
            max_health: template.max_health,
            min_attack: template.min_attack,
            max_attack: template.max_attack,
            target: None,
        }
    }

    fn snapshot(&self) -> CharacterSnapshot {
        CharacterSnapshot {
            name: self.name.clone(),
            speed: self.speed,
            base_initiative: self.base_initiative,
            initiative: self.initiative,
            health: self.health,
            max_health: self.max_health,
            min_attack: self.min_attack,
            max_attack: self.max_attack,
            target: self.target,
        }
    }
}

#[derive(Clone, Debug)]
pub(crate) enum Body {
    Character(CharacterState),
    Terrain(TerrainKind),
}

#[derive(Clone, Debug)]
pub(crate) struct Entity {
    pub(crate) id: EntityId,
    pub(crate) team: TeamId,
    pub(crate) position: Vec3,
    pub(crate) tile: Option<TileCoord>,
    pub(crate) active: bool,
    pub(crate) alive: bool,
    pub(crate) blocks_movement: bool,
    pub(crate) body: Body,
}

impl Entity {
    pub(crate) fn character(&self) -> Option<&CharacterState> {
        match &self.body {
            Body::Character(character) => Some(character),
            Body::Terrain(_) => None,
        }
    }

    pub(crate) fn character_mut(&mut self) -> Option<&mut CharacterState> {
        match &mut self.body {
            Body::Character(character) => Some(character),
            Body::Terrain(_) => None,
        }
    }

    /// Reports whether the entity is an active character that can still act.
    pub(crate) fn is_living_character(&self) -> bool {
        self.active && self.alive && self.character().is_some()
    }

    pub(crate) fn snapshot(&self) -> EntitySnapshot {
        let body = match &self.body {
            Body::Character(character) => BodySnapshot::Character(character.snapshot()),
            Body::Terrain(kind) => BodySnapshot::Terrain(*kind),
        };
        EntitySnapshot {
            id: self.id,
            team: self.team,
            position: self.position,
            tile: self.tile,
            active: self.active,
            alive: self.alive,
            blocks_movement: self.blocks_movement,
            body,
        }
    }
}

/// Dense entity store with stable indices.
///
/// Slots are never reused: removed and dead entities keep their index so the
/// turn queue and renderers can still refer to them.
#[derive(Debug)]
pub(crate) struct EntityRegistry {
    capacity: usize,
    entities: Vec<Entity>,
}

impl EntityRegistry {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entities: Vec::with_capacity(capacity),
        }
    }

    pub(crate) const fn capacity(&self) -> usize {
        self.capacity
    }

    pub(crate) fn is_full(&self) -> bool {
        self.entities.len() >= self.capacity
    }

    /// Fills the next free slot with an entity built from `template`.
    ///
    /// Callers check [`EntityRegistry::is_full`] first.
    pub(crate) fn insert(
        &mut self,
        template: EntityTemplate,
        team: TeamId,
        tile: TileCoord,
        position: Vec3,
    ) -> EntityId {
        debug_assert!(!self.is_full(), "registry capacity exceeded");
        let id = EntityId::new(self.entities.len() as u32);
        let body = match template {
            EntityTemplate::Character(template) => {
                Body::Character(CharacterState::from_template(template))
            }
            EntityTemplate::Terrain(kind) => Body::Terrain(kind),
        };
        self.entities.push(Entity {
            id,
            team,
            position,
            tile: Some(tile),
            active: true,
            alive: true,
            blocks_movement: true,
            body,
        });
        id
    }

    /// Returns the entity stored under `id`.
    ///
    /// # Panics
    ///
    /// Panics when `id` was never allocated by this registry.
    pub(crate) fn get(&self, id: EntityId) -> &Entity {
        &self.entities[id.index()]
    }

    /// Mutable counterpart of [`EntityRegistry::get`].
    pub(crate) fn get_mut(&mut self, id: EntityId) -> &mut Entity {
        &mut self.entities[id.index()]
    }

    pub(crate) fn try_get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(id.index())
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn template() -> EntityTemplate {
        EntityTemplate::Character(CharacterTemplate {
            name: "Scout".to_owned(),
            speed: 4.0,
            initiative: 8,
            max_health: 12,
            min_attack: 2,
            max_attack: 5,
        })
    }

    #[test]
    fn identifiers_follow_insertion_order() {
        let mut registry = EntityRegistry::new(4);
        let first = registry.insert(template(), TeamId::new(1), TileCoord::new(0, 0), Vec3::ZERO);
        let second = registry.insert(
            EntityTemplate::Terrain(TerrainKind::Rock),
            TeamId::NEUTRAL,
            TileCoord::new(1, 0),
            Vec3::ZERO,
        );
        assert_eq!(first, EntityId::new(0));
        assert_eq!(second, EntityId::new(1));
        assert!(registry.get(first).character().is_some());
        assert!(registry.get(second).character().is_none());
    }

    #[test]
    fn characters_spawn_with_full_health_and_base_initiative() {
        let mut registry = EntityRegistry::new(1);
        let id = registry.insert(template(), TeamId::new(1), TileCoord::new(0, 0), Vec3::ZERO);
        let entity = registry.get(id);
        let character = entity.character().expect("character");
        assert_eq!(character.health, 12);
        assert_eq!(character.initiative, character.base_initiative);
        assert!(entity.active && entity.alive && entity.blocks_movement);
        assert!(registry.is_full());
    }

    #[test]
    fn unknown_identifiers_are_not_found() {
        let registry = EntityRegistry::new(2);
        assert!(registry.try_get(EntityId::new(0)).is_none());
    }
}
