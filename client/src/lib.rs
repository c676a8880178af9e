//! Session controller for one peer: owns the board and player registry,
//! dispatches relay messages once per tick and queues outbound messages and
//! render notices for the caller.

pub use client::*;
pub use clock::*;
pub use config::*;
pub use effect::*;
pub use error::*;
pub use input::*;
pub use script::*;
pub use session::*;
pub use transport::*;

mod client;
mod clock;
mod config;
mod effect;
mod error;
mod input;
mod script;
mod session;
mod transport;
