//! Plain-text rendering backend used by the headless runner.

use std::io::Write;

use anyhow::{Context, Result};
use skirmish_core::TileCoord;
use skirmish_rendering::{Presentation, RenderingBackend, SceneEntity, SpriteKey, TileHighlight};

/// Draws each frame as a character grid, north row first.
///
/// Every tile takes three columns. The acting character is bracketed, living
/// characters show their team number, fallen ones an `x`. Empty tiles show
/// `*` when the actor may move there, `#` when unwalkable and `.` otherwise.
#[derive(Debug)]
pub(crate) struct TextBoard<W> {
    out: W,
}

impl<W: Write> TextBoard<W> {
    pub(crate) fn new(out: W) -> Self {
        Self { out }
    }

    #[cfg(test)]
    pub(crate) fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> RenderingBackend for TextBoard<W> {
    fn present(&mut self, presentation: &Presentation) -> Result<()> {
        let scene = &presentation.scene;
        let mut frame = format!("== {} ==\n", presentation.title);
        for row in (0..scene.rows).rev() {
            for column in 0..scene.columns {
                let coord = TileCoord::new(column, row);
                let cell = match scene.entity_on(coord) {
                    Some(entity) if entity.acting => format!("[{}]", entity_glyph(entity)),
                    Some(entity) => format!(" {} ", entity_glyph(entity)),
                    None => {
                        let tile = scene.tile(coord).map(|tile| (tile.walkable, tile.highlight));
                        format!(" {} ", tile_glyph(tile))
                    }
                };
                frame.push_str(&cell);
            }
            frame.push('\n');
        }

        self.out
            .write_all(frame.as_bytes())
            .context("failed to write board")?;
        self.out.flush().context("failed to flush board")
    }
}

fn entity_glyph(entity: &SceneEntity) -> char {
    match entity.sprite {
        SpriteKey::Character => char::from_digit(entity.team.get() % 10, 10).unwrap_or('?'),
        SpriteKey::CharacterDead => 'x',
        SpriteKey::Tree => 'T',
        SpriteKey::Rock => 'R',
    }
}

fn tile_glyph(tile: Option<(bool, TileHighlight)>) -> char {
    match tile {
        Some((false, _)) => '#',
        Some((true, TileHighlight::Movable)) => '*',
        _ => '.',
    }
}
