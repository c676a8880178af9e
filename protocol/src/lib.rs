//! Message contract spoken over the relay.
//!
//! Every frame is a JSON object `{"event": <name>, "data": <payload>}` with
//! camelCase payload fields. Fields that the relay may omit are either
//! `Option`s or carry an explicit default, anything else is required.

pub use error::*;
pub use message::*;

mod error;
mod message;
