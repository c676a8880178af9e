use blastgrid_core::{Millis, PlayerId};
use blastgrid_protocol::ClientMessage;
use serde::Deserialize;

use crate::*;

/// One line of a replay script.
///
/// ```text
/// {"at": 0, "recv": {"event": "players", "data": {"peer": {"x": 340, "y": 110}}}}
/// {"at": 16, "input": "BOMB"}
/// {"at": 48, "input": ""}
/// {"at": 900, "raw": "{not json"}
/// ```
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScriptStep {
    pub at: Millis,
    /// Keys held from this step on, until the next step that sets input.
    #[serde(default)]
    pub input: Option<InputState>,
    /// Inbound message, delivered as its JSON encoding.
    #[serde(default)]
    pub recv: Option<serde_json::Value>,
    /// Inbound frame delivered verbatim.
    #[serde(default)]
    pub raw: Option<String>,
}

/// Parses a JSON-lines script. Blank lines and lines starting with `#` are skipped.
pub fn parse_script(text: &str) -> Result<Vec<ScriptStep>> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| {
            let line = line.trim();
            !line.is_empty() && !line.starts_with('#')
        })
        .map(|(index, line)| {
            serde_json::from_str(line).map_err(|source| ClientError::Script {
                line: index + 1,
                source,
            })
        })
        .collect()
}

/// Everything a replay produced.
#[derive(Debug)]
pub struct Replay {
    /// Outbound messages in send order, as the relay received them.
    pub sent: Vec<ClientMessage>,
    /// Render notices tagged with the frame time they were emitted at.
    pub effects: Vec<(Millis, Effect)>,
    pub session: Session,
}

/// Runs a session against a scripted relay, ticking every `frame_ms` until
/// `tail_ms` after the last step. `on_frame` runs before each tick with the
/// frame time.
pub fn replay(
    config: SessionConfig,
    local_id: PlayerId,
    steps: &[ScriptStep],
    frame_ms: Millis,
    tail_ms: Millis,
    mut on_frame: impl FnMut(Millis),
) -> Result<Replay> {
    let frame_ms = frame_ms.max(1);
    let mut steps = steps.to_vec();
    steps.sort_by_key(|step| step.at);
    let end = steps
        .last()
        .map_or(0, |step| step.at)
        .saturating_add(tail_ms);

    let (transport, mut relay) = channel();
    let mut client = Client::new(Session::new(config, local_id), transport);
    let mut sent = relay.drain();
    let mut effects = Vec::new();

    let mut pending = steps.iter().peekable();
    let mut input = InputState::empty();
    let mut now: Millis = 0;
    loop {
        while let Some(step) = pending.next_if(|step| step.at <= now) {
            if let Some(held) = step.input {
                input = held;
            }
            if let Some(message) = &step.recv {
                relay.push_raw(message.to_string())?;
            }
            if let Some(frame) = &step.raw {
                relay.push_raw(frame.as_str())?;
            }
        }

        on_frame(now);
        effects.extend(client.pump(now, input).into_iter().map(|effect| (now, effect)));
        sent.extend(relay.drain());

        if now >= end {
            break;
        }
        now = now.saturating_add(frame_ms).min(end);
    }

    log::info!(
        "Replay finished at {}ms: {} sent, {} effects",
        now,
        sent.len(),
        effects.len()
    );
    Ok(Replay {
        sent,
        effects,
        session: client.into_session(),
    })
}
