use blastgrid_core::*;
use serde::{Deserialize, Serialize};

use crate::{ClientError, Result};

/// Which clients resolve an explosion once its fuse runs out.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResolutionMode {
    /// Every client that saw the placement resolves it on its own timer and
    /// broadcasts the result. Peers can diverge if they miss a placement.
    PeerLocal,
    /// Only the bomb owner resolves; everyone else applies the broadcast
    /// result, terrain included.
    OwnerResolves,
}

impl Default for ResolutionMode {
    fn default() -> Self {
        Self::PeerLocal
    }
}

/// Session tuning. The board layout is fixed and not part of this.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct SessionConfig {
    pub grid_size: f32,
    pub viewport_width: f32,
    pub viewport_height: f32,
    pub player_speed: f32,
    pub fuse_ms: Millis,
    pub damage: Health,
    pub damage_cooldown_ms: Millis,
    pub move_tween_ms: Millis,
    pub resolution: ResolutionMode,
    /// Disarm a player's bombs when it leaves or dies instead of letting
    /// them go off anyway.
    pub cancel_orphaned_fuses: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            grid_size: GRID_SIZE,
            viewport_width: 1280.0,
            viewport_height: 720.0,
            player_speed: PLAYER_SPEED,
            fuse_ms: FUSE_MS,
            damage: BLAST_DAMAGE,
            damage_cooldown_ms: 200,
            move_tween_ms: 100,
            resolution: ResolutionMode::default(),
            cancel_orphaned_fuses: false,
        }
    }
}

impl SessionConfig {
    pub fn from_toml(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.grid_size.is_finite() && self.grid_size > 0.0) {
            return Err(ClientError::InvalidConfig("grid-size must be positive"));
        }
        if !(self.viewport_width.is_finite() && self.viewport_height.is_finite()) {
            return Err(ClientError::InvalidConfig("viewport must be finite"));
        }
        if !(self.player_speed.is_finite() && self.player_speed >= 0.0) {
            return Err(ClientError::InvalidConfig("player-speed must not be negative"));
        }
        Ok(())
    }

    pub fn geometry(&self, board: &Board) -> BoardGeometry {
        BoardGeometry::centered(
            board.size(),
            self.grid_size,
            (self.viewport_width, self.viewport_height),
        )
    }
}
