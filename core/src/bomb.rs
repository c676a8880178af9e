use core::fmt;

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::*;

/// Delay between placement and explosion.
pub const FUSE_MS: Millis = 3000;

/// Bomb identifier shared between peers, `"{owner}#{seq}"` for bombs whose
/// owner announced an id.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BombId(String);

impl BombId {
    pub fn owned(owner: &PlayerId, seq: u32) -> Self {
        Self(format!("{owner}#{seq}"))
    }

    /// Local-only id for a placement that arrived without one.
    pub fn anonymous((x, y): Tile, seq: u32) -> Self {
        Self(format!("@{x},{y}#{seq}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BombId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BombId {
    fn from(id: &str) -> Self {
        Self(id.into())
    }
}

impl From<String> for BombId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Valid transitions:
/// - Armed -> Exploded
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BombState {
    Armed,
    Exploded,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bomb {
    pub id: BombId,
    pub owner: Option<PlayerId>,
    pub tile: Tile,
    pub planted_at: Millis,
    pub fuse_ms: Millis,
    pub state: BombState,
}

impl Bomb {
    pub fn detonates_at(&self) -> Millis {
        self.planted_at.saturating_add(self.fuse_ms)
    }

    pub fn is_due(&self, now: Millis) -> bool {
        matches!(self.state, BombState::Armed) && now >= self.detonates_at()
    }

    pub fn is_owned_by(&self, player: &PlayerId) -> bool {
        self.owner.as_ref() == Some(player)
    }
}

/// How many fuse windows an exploded bomb is remembered for.
pub const RETAINED_FUSES: Millis = 4;

/// Armed bombs known to this client, each with its own fuse.
///
/// Every placement this client learns about, its own or a peer's, gets an
/// independent timer here. Nothing is shared with other clients.
///
/// Exploded and disarmed ids are remembered for [`BombManager::retention`] so
/// late duplicates can still be recognized, then forgotten.
#[derive(Clone, Debug)]
pub struct BombManager {
    fuse_ms: Millis,
    armed: Vec<Bomb>,
    exploded: HashMap<BombId, Millis>,
    last_on_tile: HashMap<Tile, (BombId, Millis)>,
    next_seq: u32,
}

impl BombManager {
    pub fn new(fuse_ms: Millis) -> Self {
        Self {
            fuse_ms,
            armed: Vec::new(),
            exploded: HashMap::new(),
            last_on_tile: HashMap::new(),
            next_seq: 0,
        }
    }

    pub fn fuse_ms(&self) -> Millis {
        self.fuse_ms
    }

    pub fn retention(&self) -> Millis {
        self.fuse_ms.saturating_mul(RETAINED_FUSES)
    }

    /// Plants a bomb for `owner` and starts its fuse.
    pub fn place(&mut self, owner: &Player, tile: Tile, now: Millis) -> Result<Bomb> {
        if !owner.is_alive() {
            return Err(GameError::OwnerNotAlive);
        }

        let id = BombId::owned(owner.id(), self.take_seq());
        let bomb = self.arm(id, Some(owner.id().clone()), tile, now);
        log::info!("Bomb {} placed at {:?}", bomb.id, tile);
        Ok(bomb)
    }

    /// Starts a local fuse for a placement announced by someone else.
    /// Returns `None` when the bomb is already known.
    pub fn observe(
        &mut self,
        id: Option<BombId>,
        owner: Option<PlayerId>,
        tile: Tile,
        now: Millis,
    ) -> Option<Bomb> {
        let id = match id {
            Some(id) if self.is_known(&id) => {
                log::debug!("Bomb {} already known", id);
                return None;
            }
            Some(id) => id,
            None => self.mint_id(tile),
        };

        Some(self.arm(id, owner, tile, now))
    }

    fn arm(&mut self, id: BombId, owner: Option<PlayerId>, tile: Tile, now: Millis) -> Bomb {
        let bomb = Bomb {
            id,
            owner,
            tile,
            planted_at: now,
            fuse_ms: self.fuse_ms,
            state: BombState::Armed,
        };
        self.armed.push(bomb.clone());
        bomb
    }

    /// Fresh local-only id for a bomb on `tile` that arrived without one.
    pub fn mint_id(&mut self, tile: Tile) -> BombId {
        BombId::anonymous(tile, self.take_seq())
    }

    fn take_seq(&mut self) -> u32 {
        let seq = self.next_seq;
        self.next_seq = self.next_seq.wrapping_add(1);
        seq
    }

    /// Names the bomb behind an explosion reported on `tile` without an id:
    /// the oldest bomb still armed there, else the one that went off there
    /// within the last fuse window, else a freshly minted id.
    pub fn identify(&mut self, tile: Tile, now: Millis) -> BombId {
        if let Some(bomb) = self.armed_at(tile) {
            return bomb.id.clone();
        }
        if let Some(id) = self.exploded_at(tile, now) {
            return id.clone();
        }
        self.mint_id(tile)
    }

    pub fn is_known(&self, id: &BombId) -> bool {
        self.is_exploded(id) || self.armed.iter().any(|bomb| bomb.id == *id)
    }

    pub fn is_exploded(&self, id: &BombId) -> bool {
        self.exploded.contains_key(id)
    }

    pub fn get(&self, id: &BombId) -> Option<&Bomb> {
        self.armed.iter().find(|bomb| bomb.id == *id)
    }

    /// Oldest armed bomb on `tile`.
    pub fn armed_at(&self, tile: Tile) -> Option<&Bomb> {
        self.armed
            .iter()
            .filter(|bomb| bomb.tile == tile)
            .min_by_key(|bomb| bomb.planted_at)
    }

    /// Bomb that went off on `tile` no longer than one fuse window ago.
    pub fn exploded_at(&self, tile: Tile, now: Millis) -> Option<&BombId> {
        self.last_on_tile
            .get(&tile)
            .filter(|(_, at)| now.saturating_sub(*at) <= self.fuse_ms)
            .map(|(id, _)| id)
    }

    pub fn armed(&self) -> &[Bomb] {
        &self.armed
    }

    pub fn armed_count(&self) -> usize {
        self.armed.len()
    }

    /// Number of exploded or disarmed ids still remembered.
    pub fn remembered_count(&self) -> usize {
        self.exploded.len()
    }

    /// Removes and returns every bomb whose fuse has run out, in detonation
    /// order. Each bomb is returned exactly once, already marked exploded.
    pub fn expire(&mut self, now: Millis) -> Vec<Bomb> {
        self.expire_where(now, |_| true)
    }

    /// Like [`BombManager::expire`], but due bombs rejected by `fires` stay
    /// armed until reported exploded, or until they outlive the retention window.
    pub fn expire_where(&mut self, now: Millis, fires: impl Fn(&Bomb) -> bool) -> Vec<Bomb> {
        self.prune(now);

        let (mut due, armed): (Vec<_>, Vec<_>) = self
            .armed
            .drain(..)
            .partition(|bomb| bomb.is_due(now) && fires(bomb));
        self.armed = armed;

        due.sort_by(|a, b| {
            a.detonates_at()
                .cmp(&b.detonates_at())
                .then_with(|| a.id.cmp(&b.id))
        });
        for bomb in &mut due {
            bomb.state = BombState::Exploded;
            self.record_explosion(bomb.id.clone(), bomb.tile, now);
        }
        due
    }

    /// Marks a bomb exploded without waiting for its fuse, for explosions
    /// reported by another client. Returns the bomb if it was still armed.
    pub fn mark_exploded(&mut self, id: &BombId, tile: Tile, now: Millis) -> Option<Bomb> {
        self.record_explosion(id.clone(), tile, now);
        let index = self.armed.iter().position(|bomb| bomb.id == *id)?;
        let mut bomb = self.armed.remove(index);
        bomb.state = BombState::Exploded;
        Some(bomb)
    }

    fn record_explosion(&mut self, id: BombId, tile: Tile, now: Millis) {
        self.exploded.insert(id.clone(), now);
        self.last_on_tile.insert(tile, (id, now));
    }

    /// Drops every armed bomb owned by `owner` without exploding it.
    pub fn disarm_owned_by(&mut self, owner: &PlayerId, now: Millis) -> Vec<Bomb> {
        let (disarmed, armed): (Vec<_>, Vec<_>) = self
            .armed
            .drain(..)
            .partition(|bomb| bomb.is_owned_by(owner));
        self.armed = armed;
        for bomb in &disarmed {
            log::info!("Bomb {} disarmed, owner {} is gone", bomb.id, owner);
            self.exploded.insert(bomb.id.clone(), now);
        }
        disarmed
    }

    /// Forgets exploded ids and overdue armed bombs older than the retention window.
    fn prune(&mut self, now: Millis) {
        let Some(cutoff) = now.checked_sub(self.retention()) else {
            return;
        };

        self.exploded.retain(|_, at| *at >= cutoff);
        self.last_on_tile.retain(|_, (_, at)| *at >= cutoff);
        self.armed.retain(|bomb| {
            let keep = bomb.detonates_at() >= cutoff;
            if !keep {
                log::debug!("Bomb {} was never reported exploded", bomb.id);
            }
            keep
        });
    }
}

impl Default for BombManager {
    fn default() -> Self {
        Self::new(FUSE_MS)
    }
}
