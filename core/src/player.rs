use core::fmt;

use hashbrown::{HashMap, HashSet};
use serde::{Deserialize, Serialize};

use crate::*;

/// Relay-assigned player identifier.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(String);

impl PlayerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PlayerId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for PlayerId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Valid transitions:
/// - Alive -> Dead
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LifeState {
    Alive,
    Dead,
}

impl Default for LifeState {
    fn default() -> Self {
        Self::Alive
    }
}

/// Linear position blend over a fixed window.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Tween {
    pub from: Position,
    pub to: Position,
    pub started_at: Millis,
    pub duration: Millis,
}

impl Tween {
    pub fn progress(&self, now: Millis) -> f32 {
        if self.duration == 0 {
            return 1.0;
        }
        let elapsed = now.saturating_sub(self.started_at);
        (elapsed as f32 / self.duration as f32).min(1.0)
    }

    pub fn sample(&self, now: Millis) -> Position {
        self.from.lerp(self.to, self.progress(now))
    }

    pub fn is_finished(&self, now: Millis) -> bool {
        now >= self.started_at.saturating_add(self.duration)
    }
}

/// Health before and after an update.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct HealthChange {
    pub previous: Health,
    pub current: Health,
    /// Set only on the update that moved the player from alive to dead.
    pub died: bool,
}

impl HealthChange {
    pub const fn decreased(&self) -> bool {
        self.current < self.previous
    }
}

/// Outcome of applying explosion damage
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DamageOutcome {
    /// Player was already dead
    Ignored,
    Damaged { health: Health },
    Killed,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Player {
    id: PlayerId,
    position: Position,
    health: Health,
    life: LifeState,
    cooldown_until: Option<Millis>,
    tween: Option<Tween>,
}

impl Player {
    pub fn new(id: PlayerId, position: Position) -> Self {
        Self::with_health(id, position, MAX_HEALTH)
    }

    pub fn with_health(id: PlayerId, position: Position, health: Health) -> Self {
        let health = health.min(MAX_HEALTH);
        Self {
            id,
            position,
            health,
            life: if health == 0 {
                LifeState::Dead
            } else {
                LifeState::Alive
            },
            cooldown_until: None,
            tween: None,
        }
    }

    pub fn id(&self) -> &PlayerId {
        &self.id
    }

    /// Latest known position; used for hit detection and movement.
    pub fn position(&self) -> Position {
        self.position
    }

    /// Position a renderer should draw, following any in-flight tween.
    pub fn displayed_position(&self, now: Millis) -> Position {
        self.tween
            .map_or(self.position, |tween| tween.sample(now))
    }

    pub fn health(&self) -> Health {
        self.health
    }

    pub fn health_text(&self) -> String {
        self.health.to_string()
    }

    pub fn life(&self) -> LifeState {
        self.life
    }

    pub fn is_alive(&self) -> bool {
        matches!(self.life, LifeState::Alive)
    }

    pub fn damage_cooldown(&self, now: Millis) -> bool {
        self.cooldown_until.is_some_and(|until| now < until)
    }

    pub fn set_position(&mut self, position: Position) {
        self.position = position;
        self.tween = None;
    }

    /// Starts a new tween from wherever the player is currently drawn,
    /// replacing any tween still in flight.
    pub fn glide_to(&mut self, target: Position, now: Millis, duration: Millis) {
        let from = self.displayed_position(now);
        self.position = target;
        self.tween = Some(Tween {
            from,
            to: target,
            started_at: now,
            duration,
        });
    }

    pub fn tween(&self) -> Option<&Tween> {
        self.tween.as_ref()
    }

    pub(crate) fn settle(&mut self, now: Millis) {
        if self.tween.is_some_and(|tween| tween.is_finished(now)) {
            self.tween = None;
        }
    }

    /// Lowers health to `reported` if that is lower. Health never rises since
    /// there is no respawn, so stale or reordered reports cannot undo damage.
    pub fn merge_health(&mut self, reported: Health) -> HealthChange {
        let previous = self.health;
        self.health = previous.min(reported);
        HealthChange {
            previous,
            current: self.health,
            died: self.kill_if_depleted(),
        }
    }

    pub fn take_damage(&mut self, amount: Health, now: Millis, cooldown: Millis) -> DamageOutcome {
        if !self.is_alive() {
            return DamageOutcome::Ignored;
        }

        self.health = self.health.saturating_sub(amount);
        self.cooldown_until = Some(now.saturating_add(cooldown));

        if self.kill_if_depleted() {
            DamageOutcome::Killed
        } else {
            DamageOutcome::Damaged {
                health: self.health,
            }
        }
    }

    fn kill_if_depleted(&mut self) -> bool {
        if self.health == 0 && self.is_alive() {
            self.life = LifeState::Dead;
            log::info!("Player {} died", self.id);
            true
        } else {
            false
        }
    }
}

/// One player's entry in a roster snapshot.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RosterEntry {
    pub position: Position,
    pub health: Health,
}

/// What a roster snapshot changed in the store.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RosterUpdate {
    pub joined: Vec<PlayerId>,
    pub left: Vec<PlayerId>,
    /// Remote players whose health dropped in this snapshot.
    pub damaged: Vec<PlayerId>,
    /// Remote players this snapshot brought to zero health.
    pub died: Vec<PlayerId>,
}

/// Local player plus the registry of remote players.
#[derive(Clone, Debug)]
pub struct PlayerStore {
    local: Player,
    remotes: HashMap<PlayerId, Player>,
    tombstones: HashSet<PlayerId>,
}

impl PlayerStore {
    pub fn new(local: Player) -> Self {
        Self {
            local,
            remotes: HashMap::new(),
            tombstones: HashSet::new(),
        }
    }

    pub fn local(&self) -> &Player {
        &self.local
    }

    pub fn local_mut(&mut self) -> &mut Player {
        &mut self.local
    }

    pub fn local_id(&self) -> &PlayerId {
        &self.local.id
    }

    pub fn is_local(&self, id: &PlayerId) -> bool {
        self.local.id == *id
    }

    pub fn get(&self, id: &PlayerId) -> Option<&Player> {
        if self.is_local(id) {
            Some(&self.local)
        } else {
            self.remotes.get(id)
        }
    }

    pub fn remote(&self, id: &PlayerId) -> Option<&Player> {
        self.remotes.get(id)
    }

    pub fn remote_count(&self) -> usize {
        self.remotes.len()
    }

    /// Remote players sorted by id.
    pub fn remotes(&self) -> Vec<&Player> {
        let mut remotes: Vec<_> = self.remotes.values().collect();
        remotes.sort_by(|a, b| a.id.cmp(&b.id));
        remotes
    }

    /// Local player first, then remote players sorted by id.
    pub fn iter(&self) -> impl Iterator<Item = &Player> {
        core::iter::once(&self.local).chain(self.remotes())
    }

    /// Reconciles the registry against a full roster snapshot.
    pub fn apply_roster(
        &mut self,
        roster: impl IntoIterator<Item = (PlayerId, RosterEntry)>,
    ) -> RosterUpdate {
        let mut update = RosterUpdate::default();
        let roster: HashMap<PlayerId, RosterEntry> = roster.into_iter().collect();

        let mut gone: Vec<PlayerId> = self
            .remotes
            .keys()
            .filter(|id| !roster.contains_key(*id))
            .cloned()
            .collect();
        gone.sort();
        for id in gone {
            self.remotes.remove(&id);
            update.left.push(id);
        }

        let mut entries: Vec<_> = roster.into_iter().collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        for (id, entry) in entries {
            if self.is_local(&id) {
                continue;
            }
            if self.tombstones.contains(&id) {
                log::debug!("Ignoring roster entry for dead player {}", id);
                continue;
            }

            match self.remotes.get_mut(&id) {
                Some(player) => {
                    player.set_position(entry.position);
                    let change = player.merge_health(entry.health);
                    if change.died {
                        update.died.push(id.clone());
                    }
                    if change.decreased() {
                        update.damaged.push(id);
                    }
                }
                None => {
                    log::info!("Player {} joined", id);
                    self.remotes.insert(
                        id.clone(),
                        Player::with_health(id.clone(), entry.position, entry.health),
                    );
                    update.joined.push(id);
                }
            }
        }

        update
    }

    /// Glides a remote player towards `target`. Returns `false` for unknown ids.
    pub fn move_remote(&mut self, id: &PlayerId, target: Position, now: Millis, duration: Millis) -> bool {
        match self.remotes.get_mut(id) {
            Some(player) => {
                player.glide_to(target, now, duration);
                true
            }
            None => false,
        }
    }

    /// Applies a reported health value to a remote player.
    pub fn update_remote_health(&mut self, id: &PlayerId, health: Health) -> Result<HealthChange> {
        let player = self.remotes.get_mut(id).ok_or(GameError::UnknownPlayer)?;
        Ok(player.merge_health(health))
    }

    pub fn remove(&mut self, id: &PlayerId) -> Option<Player> {
        self.remotes.remove(id)
    }

    /// Removes a remote player after its death sequence and remembers the id
    /// so later snapshots cannot bring it back.
    pub fn bury(&mut self, id: &PlayerId) -> Option<Player> {
        let removed = self.remotes.remove(id)?;
        self.tombstones.insert(id.clone());
        Some(removed)
    }

    pub fn is_buried(&self, id: &PlayerId) -> bool {
        self.tombstones.contains(id)
    }

    pub fn settle(&mut self, now: Millis) {
        for player in self.remotes.values_mut() {
            player.settle(now);
        }
    }
}
