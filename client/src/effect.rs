use blastgrid_core::{BlastCells, BombId, Health, PlayerId, Tile};

/// Render notice produced by the session; the renderer drains these each frame.
#[derive(Clone, Debug, PartialEq)]
pub enum Effect {
    PlayerJoined(PlayerId),
    /// Sprite should be destroyed, after any death animation.
    PlayerRemoved(PlayerId),
    DamageFlash(PlayerId),
    HealthChanged { player: PlayerId, health: Health },
    PlayerDied(PlayerId),
    BombPlaced { bomb: BombId, tile: Tile },
    Explosion { bomb: BombId, cells: BlastCells },
    WallDestroyed(Tile),
}
