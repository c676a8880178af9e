use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::*;

/// Up to five tiles: the center plus its orthogonal neighbors.
pub type BlastCells = SmallVec<[Tile; 5]>;

/// Result of resolving one bomb against the board and the known players.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExplosionEvent {
    pub bomb: BombId,
    pub tile: Tile,
    pub blast_cells: BlastCells,
    /// Blast cells a renderer may draw fire on, i.e. everything but solid walls.
    pub visual_cells: BlastCells,
    pub destroyed_cells: BlastCells,
    pub players_hit: Vec<PlayerId>,
}

impl ExplosionEvent {
    pub fn hits(&self, player: &PlayerId) -> bool {
        self.players_hit.contains(player)
    }
}

/// The fixed radius-one blast pattern around `center`.
///
/// The center is always included; neighbors outside the board are dropped.
/// The blast never reaches further, whatever the neighboring cells are.
pub fn blast_ring(board: &Board, center: Tile) -> BlastCells {
    let mut cells = BlastCells::new();
    cells.push(center);
    cells.extend(board.iter_orthogonal(center));
    cells
}

pub fn visual_cells(board: &Board, cells: &[Tile]) -> BlastCells {
    cells
        .iter()
        .copied()
        .filter(|&tile| board.cell_at(tile) != Cell::Solid)
        .collect()
}

fn destroy_walls(board: &mut Board, cells: &[Tile]) -> BlastCells {
    cells
        .iter()
        .copied()
        .filter(|&tile| board.destroy(tile).has_update())
        .collect()
}

/// Resolves `bomb`: destroys destructible walls in its blast and reports
/// which living players stand inside it.
///
/// Only the board is mutated. Applying damage is left to the caller.
pub fn resolve<'a>(
    board: &mut Board,
    bomb: &Bomb,
    players: impl IntoIterator<Item = &'a Player>,
    geometry: &BoardGeometry,
) -> ExplosionEvent {
    let blast_cells = blast_ring(board, bomb.tile);
    // visual cells are taken before walls turn into empty cells; destroyed
    // walls still show the blast
    let visual = visual_cells(board, &blast_cells);
    let destroyed_cells = destroy_walls(board, &blast_cells);

    let players_hit = players
        .into_iter()
        .filter(|player| player.is_alive())
        .filter(|player| blast_cells.contains(&geometry.tile_of(player.position())))
        .map(|player| player.id().clone())
        .collect();

    let event = ExplosionEvent {
        bomb: bomb.id.clone(),
        tile: bomb.tile,
        blast_cells,
        visual_cells: visual,
        destroyed_cells,
        players_hit,
    };
    log::info!(
        "Bomb {} exploded at {:?}, destroyed {:?}, hit {:?}",
        event.bomb,
        event.tile,
        event.destroyed_cells,
        event.players_hit
    );
    event
}

/// Applies the terrain part of an explosion resolved by another client.
pub fn apply_remote(board: &mut Board, center: Tile) -> (BlastCells, BlastCells) {
    let blast_cells = blast_ring(board, center);
    let visual = visual_cells(board, &blast_cells);
    let destroyed = destroy_walls(board, &blast_cells);
    (visual, destroyed)
}
