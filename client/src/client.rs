use blastgrid_core::Millis;
use blastgrid_protocol::Message;

use crate::{Effect, InputState, Session, Transport};

/// Couples a [`Session`] to a [`Transport`]: each pump drains the transport
/// into the session, ticks it once and sends whatever it queued.
#[derive(Debug)]
pub struct Client<T> {
    session: Session,
    transport: T,
}

impl<T: Transport> Client<T> {
    /// Wraps the session and immediately announces the local player.
    pub fn new(session: Session, transport: T) -> Self {
        let mut client = Self { session, transport };
        client.flush();
        client
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn into_session(self) -> Session {
        self.session
    }

    pub fn pump(&mut self, now: Millis, input: InputState) -> Vec<Effect> {
        self.receive();
        self.session.tick(now, input);
        self.flush();
        self.session.drain_effects()
    }

    fn receive(&mut self) {
        while let Some(frame) = self.transport.try_recv() {
            match frame {
                Ok(message) => self.session.enqueue(message),
                Err(err) => self.session.record_malformed(&err),
            }
        }
    }

    fn flush(&mut self) {
        for message in self.session.drain_outbox() {
            if let Err(err) = self.transport.send(&message) {
                log::warn!("Dropping outbound {}: {}", message.event(), err);
            }
        }
    }
}
