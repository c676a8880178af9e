use blastgrid_protocol::{ClientMessage, Message, ServerMessage};
use futures_channel::mpsc::{UnboundedReceiver, UnboundedSender, unbounded};

use crate::{ClientError, Result};

/// Seam to the relay. Delivery is fire-and-forget and nothing is retried.
pub trait Transport {
    fn send(&mut self, message: &ClientMessage) -> Result<()>;

    /// Next received frame, if one is waiting. Frames that fail to decode
    /// are still returned so the caller can account for them.
    fn try_recv(&mut self) -> Option<blastgrid_protocol::Result<ServerMessage>>;
}

/// In-memory transport carrying encoded JSON frames over unbounded channels.
#[derive(Debug)]
pub struct ChannelTransport {
    outgoing: UnboundedSender<String>,
    incoming: UnboundedReceiver<String>,
}

/// The relay side of a [`ChannelTransport`].
#[derive(Debug)]
pub struct RelayEnd {
    to_client: UnboundedSender<String>,
    from_client: UnboundedReceiver<String>,
}

pub fn channel() -> (ChannelTransport, RelayEnd) {
    let (to_client, incoming) = unbounded();
    let (outgoing, from_client) = unbounded();
    (
        ChannelTransport { outgoing, incoming },
        RelayEnd {
            to_client,
            from_client,
        },
    )
}

impl Transport for ChannelTransport {
    fn send(&mut self, message: &ClientMessage) -> Result<()> {
        let frame = message.encode()?;
        self.outgoing
            .unbounded_send(frame)
            .map_err(|_| ClientError::TransportClosed)
    }

    fn try_recv(&mut self) -> Option<blastgrid_protocol::Result<ServerMessage>> {
        match self.incoming.try_next() {
            Ok(Some(frame)) => Some(ServerMessage::decode(&frame)),
            // closed, or nothing waiting
            Ok(None) | Err(_) => None,
        }
    }
}

impl RelayEnd {
    pub fn push(&self, message: &ServerMessage) -> Result<()> {
        self.push_raw(message.encode()?)
    }

    /// Delivers a frame as-is, valid or not.
    pub fn push_raw(&self, frame: impl Into<String>) -> Result<()> {
        self.to_client
            .unbounded_send(frame.into())
            .map_err(|_| ClientError::TransportClosed)
    }

    /// Everything the client sent since the last call, decoded. Frames that
    /// fail to decode are logged and skipped.
    pub fn drain(&mut self) -> Vec<ClientMessage> {
        self.drain_raw()
            .into_iter()
            .filter_map(|frame| match ClientMessage::decode(&frame) {
                Ok(message) => Some(message),
                Err(err) => {
                    log::warn!("Relay dropped client frame: {}", err);
                    None
                }
            })
            .collect()
    }

    pub fn drain_raw(&mut self) -> Vec<String> {
        let mut frames = Vec::new();
        while let Ok(Some(frame)) = self.from_client.try_next() {
            frames.push(frame);
        }
        frames
    }
}
