//! Selection set owned by the acting entity.

use skirmish_core::{EntityId, SelectionMode, SelectionView, TileCoord};

#[derive(Debug, Default)]
pub(crate) struct Selection {
    entity: Option<EntityId>,
    tiles: Vec<TileCoord>,
    mode: SelectionMode,
}

impl Selection {
    pub(crate) fn replace(&mut self, entity: EntityId, tiles: Vec<TileCoord>, mode: SelectionMode) {
        self.entity = Some(entity);
        self.tiles = tiles;
        self.mode = mode;
    }

    pub(crate) fn clear(&mut self) {
        self.entity = None;
        self.tiles.clear();
        self.mode = SelectionMode::Moving;
    }

    pub(crate) const fn entity(&self) -> Option<EntityId> {
        self.entity
    }

    pub(crate) fn len(&self) -> usize {
        self.tiles.len()
    }

    pub(crate) fn view(&self) -> SelectionView {
        SelectionView {
            entity: self.entity,
            tiles: self.tiles.clone(),
            mode: self.mode,
        }
    }
}
