use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::*;

/// Health assumed when a payload leaves it out.
pub const DEFAULT_HEALTH: i32 = 100;

fn default_health() -> i32 {
    DEFAULT_HEALTH
}

/// Shared encode/decode for both directions of the relay.
pub trait Message: Serialize + DeserializeOwned {
    /// Event names this message type understands.
    const EVENTS: &'static [&'static str];

    fn event(&self) -> &'static str;

    fn encode(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decodes one frame, telling unknown events apart from bad payloads.
    fn decode(text: &str) -> Result<Self> {
        #[derive(Deserialize)]
        struct Envelope {
            event: String,
        }

        let envelope: Envelope = serde_json::from_str(text)?;
        if !Self::EVENTS.contains(&envelope.event.as_str()) {
            return Err(ProtocolError::UnknownEvent(envelope.event));
        }
        Ok(serde_json::from_str(text)?)
    }
}

// ============== Client -> Relay ==============

/// Full state of the sending player, used for `newPlayer` and `move`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlayerState {
    pub id: String,
    pub x: f32,
    pub y: f32,
    #[serde(default = "default_health")]
    pub health: i32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BombPlaced {
    pub id: String,
    pub x: f32,
    pub y: f32,
    pub tile_x: i32,
    pub tile_y: i32,
    pub bomb_id: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BombResolved {
    /// Id of the client that resolved the explosion.
    pub id: String,
    pub tile_x: i32,
    pub tile_y: i32,
    pub bomb_id: String,
    #[serde(default)]
    pub players_hit: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HealthReport {
    pub id: String,
    pub health: i32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlayerRef {
    pub id: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ClientMessage {
    NewPlayer(PlayerState),
    Move(PlayerState),
    AddBomb(BombPlaced),
    BombExploded(BombResolved),
    UpdateHealth(HealthReport),
    PlayerDied(PlayerRef),
}

impl Message for ClientMessage {
    const EVENTS: &'static [&'static str] = &[
        "newPlayer",
        "move",
        "addBomb",
        "bombExploded",
        "updateHealth",
        "playerDied",
    ];

    fn event(&self) -> &'static str {
        use ClientMessage::*;
        match self {
            NewPlayer(_) => "newPlayer",
            Move(_) => "move",
            AddBomb(_) => "addBomb",
            BombExploded(_) => "bombExploded",
            UpdateHealth(_) => "updateHealth",
            PlayerDied(_) => "playerDied",
        }
    }
}

// ============== Relay -> Client ==============

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RosterPlayer {
    pub x: f32,
    pub y: f32,
    #[serde(default = "default_health")]
    pub health: i32,
}

/// Full roster snapshot keyed by player id.
pub type Roster = BTreeMap<String, RosterPlayer>;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlayerMoved {
    pub id: String,
    pub x: f32,
    pub y: f32,
}

/// Bomb placement relayed from a peer. Only the pixel position is required.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteBomb {
    pub x: f32,
    pub y: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tile_x: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tile_y: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bomb_id: Option<String>,
}

impl RemoteBomb {
    pub fn tile(&self) -> Option<(i32, i32)> {
        self.tile_x.zip(self.tile_y)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteExplosion {
    pub tile_x: i32,
    pub tile_y: i32,
    #[serde(default)]
    pub players_hit: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bomb_id: Option<String>,
    /// Id of the client that resolved the explosion.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ServerMessage {
    Players(Roster),
    PlayerMoved(PlayerMoved),
    AddBomb(RemoteBomb),
    BombExploded(RemoteExplosion),
    PlayerHealthUpdate(HealthReport),
    PlayerDied(PlayerRef),
    PlayerLeft(PlayerRef),
}

impl Message for ServerMessage {
    const EVENTS: &'static [&'static str] = &[
        "players",
        "playerMoved",
        "addBomb",
        "bombExploded",
        "playerHealthUpdate",
        "playerDied",
        "playerLeft",
    ];

    fn event(&self) -> &'static str {
        use ServerMessage::*;
        match self {
            Players(_) => "players",
            PlayerMoved(_) => "playerMoved",
            AddBomb(_) => "addBomb",
            BombExploded(_) => "bombExploded",
            PlayerHealthUpdate(_) => "playerHealthUpdate",
            PlayerDied(_) => "playerDied",
            PlayerLeft(_) => "playerLeft",
        }
    }
}
