use hashbrown::HashMap;

use crate::*;

/// Damage dealt by one explosion to each player it hits.
pub const BLAST_DAMAGE: Health = 25;

/// Remembers which `(bomb, target)` pairs already dealt damage, so a
/// duplicated or re-resolved explosion never hurts the same player twice.
#[derive(Clone, Debug, Default)]
pub struct DamageGuard {
    applied: HashMap<(BombId, PlayerId), Millis>,
}

impl DamageGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the pair at `now`, returning `false` if it was already recorded.
    pub fn admit(&mut self, bomb: &BombId, target: &PlayerId, now: Millis) -> bool {
        let key = (bomb.clone(), target.clone());
        if self.applied.contains_key(&key) {
            return false;
        }
        self.applied.insert(key, now);
        true
    }

    pub fn contains(&self, bomb: &BombId, target: &PlayerId) -> bool {
        self.applied.contains_key(&(bomb.clone(), target.clone()))
    }

    /// Forgets pairs recorded before `cutoff`.
    pub fn prune(&mut self, cutoff: Millis) {
        self.applied.retain(|_, at| *at >= cutoff);
    }

    pub fn len(&self) -> usize {
        self.applied.len()
    }

    pub fn is_empty(&self) -> bool {
        self.applied.is_empty()
    }
}
