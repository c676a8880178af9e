use serde::{Deserialize, Serialize};

use crate::*;

/// Edge length of one tile in pixels.
pub const GRID_SIZE: f32 = 50.0;

/// Continuous position in pixels.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Linear blend, `t` is clamped to `0.0..=1.0`.
    pub fn lerp(self, to: Position, t: f32) -> Position {
        let t = t.clamp(0.0, 1.0);
        Position::new(self.x + (to.x - self.x) * t, self.y + (to.y - self.y) * t)
    }

    pub fn offset(self, dx: f32, dy: f32) -> Position {
        Position::new(self.x + dx, self.y + dy)
    }
}

/// Maps between pixel positions and board tiles for a board centered in a viewport.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoardGeometry {
    pub grid_size: f32,
    pub offset: Position,
}

impl BoardGeometry {
    pub fn centered(board_size: Tile, grid_size: f32, (viewport_w, viewport_h): (f32, f32)) -> Self {
        let (width, height) = board_size;
        Self {
            grid_size,
            offset: Position::new(
                (viewport_w - f32::from(width) * grid_size) / 2.0,
                (viewport_h - f32::from(height) * grid_size) / 2.0,
            ),
        }
    }

    pub fn tile_of(&self, pos: Position) -> Tile {
        (
            ((pos.x - self.offset.x) / self.grid_size).floor() as Coord,
            ((pos.y - self.offset.y) / self.grid_size).floor() as Coord,
        )
    }

    pub fn tile_center(&self, (x, y): Tile) -> Position {
        let half = self.grid_size / 2.0;
        Position::new(
            self.offset.x + f32::from(x) * self.grid_size + half,
            self.offset.y + f32::from(y) * self.grid_size + half,
        )
    }

    /// Every tile touched by an axis-aligned square of half extent `half`
    /// centered on `center`. The far edges are exclusive.
    pub fn tiles_covered(&self, center: Position, half: f32) -> impl Iterator<Item = Tile> + use<> {
        let edge = f32::EPSILON * self.grid_size.max(1.0) * 16.0;
        let (min_x, min_y) = self.tile_of(center.offset(-half, -half));
        let (max_x, max_y) = self.tile_of(center.offset(half - edge, half - edge));
        (min_x..=max_x).flat_map(move |x| (min_y..=max_y).map(move |y| (x, y)))
    }
}
