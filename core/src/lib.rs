//! Board, player, bomb and explosion model for a peer-synchronized arena game.
//!
//! Everything in here is transport-agnostic: callers feed in timestamps on a
//! millisecond session clock and receive plain outcome values back.

pub use board::*;
pub use bomb::*;
pub use cell::*;
pub use damage::*;
pub use error::*;
pub use explosion::*;
pub use geometry::*;
pub use movement::*;
pub use player::*;
pub use types::*;

mod board;
mod bomb;
mod cell;
mod damage;
mod error;
mod explosion;
mod geometry;
mod movement;
mod player;
mod types;
