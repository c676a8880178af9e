use std::collections::VecDeque;
use std::mem;

use blastgrid_core::*;
use blastgrid_protocol::*;

use crate::{Effect, InputState, ResolutionMode, SessionConfig};

/// Tile the local player spawns on.
pub const SPAWN_TILE: Tile = (1, 1);

/// Counters for messages and effects that were dropped rather than applied.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct SessionStats {
    pub malformed: u32,
    pub unknown_events: u32,
    pub unknown_refs: u32,
    pub duplicates: u32,
    pub explosions: u32,
}

fn saturate_coord(value: i32) -> Coord {
    value.clamp(Coord::MIN.into(), Coord::MAX.into()) as Coord
}

/// All game state of one peer.
///
/// Inbound messages are queued with [`Session::enqueue`] and applied in
/// arrival order at the start of the next [`Session::tick`]. Outbound messages
/// and render notices pile up until drained.
#[derive(Debug)]
pub struct Session {
    config: SessionConfig,
    geometry: BoardGeometry,
    board: Board,
    players: PlayerStore,
    bombs: BombManager,
    guard: DamageGuard,
    inbox: VecDeque<ServerMessage>,
    outbox: Vec<ClientMessage>,
    effects: Vec<Effect>,
    stats: SessionStats,
    now: Millis,
    prev_input: InputState,
    last_sent: Option<Position>,
}

impl Session {
    pub fn new(config: SessionConfig, local_id: PlayerId) -> Self {
        Self::with_board(config, local_id, Board::standard())
    }

    pub fn with_board(config: SessionConfig, local_id: PlayerId, board: Board) -> Self {
        let geometry = config.geometry(&board);
        let spawn = geometry.tile_center(SPAWN_TILE);
        let bombs = BombManager::new(config.fuse_ms);
        log::info!("Session for {} started at {:?}", local_id, spawn);

        let mut session = Self {
            config,
            geometry,
            board,
            players: PlayerStore::new(Player::new(local_id, spawn)),
            bombs,
            guard: DamageGuard::new(),
            inbox: VecDeque::new(),
            outbox: Vec::new(),
            effects: Vec::new(),
            stats: SessionStats::default(),
            now: 0,
            prev_input: InputState::empty(),
            last_sent: Some(spawn),
        };
        let hello = session.local_state();
        session.outbox.push(ClientMessage::NewPlayer(hello));
        session
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn geometry(&self) -> &BoardGeometry {
        &self.geometry
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn players(&self) -> &PlayerStore {
        &self.players
    }

    pub fn local(&self) -> &Player {
        self.players.local()
    }

    /// Where a renderer should draw `id` right now, following its tween.
    pub fn displayed_position(&self, id: &PlayerId) -> Option<Position> {
        self.players
            .get(id)
            .map(|player| player.displayed_position(self.now))
    }

    pub fn bombs(&self) -> &BombManager {
        &self.bombs
    }

    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    pub fn now(&self) -> Millis {
        self.now
    }

    pub fn enqueue(&mut self, message: ServerMessage) {
        self.inbox.push_back(message);
    }

    /// Counts a frame that could not be decoded. The frame itself is dropped.
    pub fn record_malformed(&mut self, err: &ProtocolError) {
        match err {
            ProtocolError::UnknownEvent(event) => {
                log::warn!("Dropping unknown event `{}`", event);
                self.stats.unknown_events += 1;
            }
            ProtocolError::Malformed(_) => {
                log::warn!("Dropping malformed message: {}", err);
                self.stats.malformed += 1;
            }
        }
    }

    pub fn drain_outbox(&mut self) -> Vec<ClientMessage> {
        mem::take(&mut self.outbox)
    }

    pub fn drain_effects(&mut self) -> Vec<Effect> {
        mem::take(&mut self.effects)
    }

    /// Advances the session to `now`: applies queued messages, then local
    /// input, then fuses that ran out.
    pub fn tick(&mut self, now: Millis, input: InputState) {
        let now = now.max(self.now);
        let dt = now - self.now;
        self.now = now;
        log::trace!("Tick at {}ms, {} queued", now, self.inbox.len());

        while let Some(message) = self.inbox.pop_front() {
            self.dispatch(message);
        }
        self.step_local(dt, input);
        self.fire_due_bombs();
        self.guard.prune(now.saturating_sub(self.bombs.retention()));
        self.players.settle(now);
    }

    fn local_state(&self) -> PlayerState {
        let local = self.players.local();
        let position = local.position();
        PlayerState {
            id: local.id().to_string(),
            x: position.x,
            y: position.y,
            health: local.health().into(),
        }
    }

    fn unknown_ref(&mut self, what: &str, id: &str) {
        log::debug!("Ignoring {} for unknown player {}", what, id);
        self.stats.unknown_refs += 1;
    }

    fn dispatch(&mut self, message: ServerMessage) {
        log::trace!("Dispatching {}", message.event());
        match message {
            ServerMessage::Players(roster) => self.on_roster(roster),
            ServerMessage::PlayerMoved(moved) => self.on_player_moved(moved),
            ServerMessage::AddBomb(bomb) => self.on_remote_bomb(bomb),
            ServerMessage::BombExploded(explosion) => self.on_remote_explosion(explosion),
            ServerMessage::PlayerHealthUpdate(report) => self.on_health_update(report),
            ServerMessage::PlayerDied(player) => self.on_player_died(PlayerId::from(player.id)),
            ServerMessage::PlayerLeft(player) => self.on_player_left(PlayerId::from(player.id)),
        }
    }

    fn on_roster(&mut self, roster: Roster) {
        let entries = roster.into_iter().map(|(id, player)| {
            let entry = RosterEntry {
                position: Position::new(player.x, player.y),
                health: clamp_health(player.health.into()),
            };
            (PlayerId::from(id), entry)
        });
        let update = self.players.apply_roster(entries);

        for id in update.left {
            self.forget_owner(&id);
            self.effects.push(Effect::PlayerRemoved(id));
        }
        for id in update.joined {
            self.effects.push(Effect::PlayerJoined(id));
        }
        for id in update.damaged {
            self.flash_remote(id);
        }
        for id in update.died {
            self.remote_died(id);
        }
    }

    fn flash_remote(&mut self, id: PlayerId) {
        if let Some(player) = self.players.remote(&id) {
            let health = player.health();
            self.effects.push(Effect::DamageFlash(id.clone()));
            self.effects.push(Effect::HealthChanged { player: id, health });
        }
    }

    /// A peer reached zero health. It stays listed until its `playerDied`
    /// arrives, which only removes it.
    fn remote_died(&mut self, id: PlayerId) {
        self.forget_owner(&id);
        self.effects.push(Effect::PlayerDied(id));
    }

    fn on_player_moved(&mut self, moved: PlayerMoved) {
        let id = PlayerId::from(moved.id);
        if self.players.is_local(&id) {
            log::debug!("Ignoring relayed move of the local player");
            return;
        }

        let target = Position::new(moved.x, moved.y);
        if !self
            .players
            .move_remote(&id, target, self.now, self.config.move_tween_ms)
        {
            self.unknown_ref("move", id.as_str());
        }
    }

    fn on_remote_bomb(&mut self, bomb: RemoteBomb) {
        let owner = bomb.id.clone().map(PlayerId::from);
        if owner.as_ref().is_some_and(|owner| self.players.is_local(owner)) {
            log::debug!("Ignoring relayed copy of a local bomb");
            return;
        }

        let tile = match bomb.tile() {
            Some((x, y)) => (saturate_coord(x), saturate_coord(y)),
            None => self.geometry.tile_of(Position::new(bomb.x, bomb.y)),
        };
        let id = bomb.bomb_id.map(BombId::from);
        if let Some(bomb) = self.bombs.observe(id, owner, tile, self.now) {
            log::info!("Bomb {} observed at {:?}", bomb.id, tile);
            self.effects.push(Effect::BombPlaced {
                bomb: bomb.id,
                tile,
            });
        }
    }

    fn on_remote_explosion(&mut self, explosion: RemoteExplosion) {
        let tile = (
            saturate_coord(explosion.tile_x),
            saturate_coord(explosion.tile_y),
        );
        let bomb_id = match explosion.bomb_id {
            Some(id) => BombId::from(id),
            None => self.bombs.identify(tile, self.now),
        };

        // terrain is applied in every mode, a second pass over the same ring is a no-op
        let first_report = !self.bombs.is_exploded(&bomb_id);
        self.bombs.mark_exploded(&bomb_id, tile, self.now);
        let (visual, destroyed) = apply_remote(&mut self.board, tile);
        if first_report {
            self.stats.explosions += 1;
            self.effects.push(Effect::Explosion {
                bomb: bomb_id.clone(),
                cells: visual,
            });
        } else {
            log::debug!("Explosion {} already applied", bomb_id);
        }
        self.effects
            .extend(destroyed.into_iter().map(Effect::WallDestroyed));

        let local_id = self.players.local_id().as_str();
        if explosion.players_hit.iter().any(|id| id == local_id) {
            self.apply_hit(&bomb_id);
        }
    }

    fn on_health_update(&mut self, report: HealthReport) {
        let id = PlayerId::from(report.id);
        let health = clamp_health(report.health.into());

        if self.players.is_local(&id) {
            let change = self.players.local_mut().merge_health(health);
            if change.decreased() {
                self.effects.push(Effect::HealthChanged {
                    player: id,
                    health: change.current,
                });
            }
            if change.died {
                self.local_died();
            }
            return;
        }

        match self.players.update_remote_health(&id, health) {
            Ok(change) => {
                if change.decreased() {
                    self.flash_remote(id.clone());
                }
                if change.died {
                    self.remote_died(id);
                }
            }
            Err(_) => self.unknown_ref("health update", id.as_str()),
        }
    }

    fn on_player_died(&mut self, id: PlayerId) {
        if self.players.is_local(&id) {
            if self.players.local_mut().merge_health(0).died {
                self.local_died();
            }
            return;
        }

        match self.players.bury(&id) {
            Some(player) => {
                if player.is_alive() {
                    log::info!("Player {} died", id);
                    self.remote_died(id.clone());
                }
                self.effects.push(Effect::PlayerRemoved(id));
            }
            None => self.unknown_ref("death", id.as_str()),
        }
    }

    fn on_player_left(&mut self, id: PlayerId) {
        if self.players.is_local(&id) {
            log::debug!("Ignoring leave notice for the local player");
            return;
        }

        if self.players.remove(&id).is_some() {
            log::info!("Player {} left", id);
            self.forget_owner(&id);
            self.effects.push(Effect::PlayerRemoved(id));
        } else {
            self.unknown_ref("leave", id.as_str());
        }
    }

    /// Bombs of a player that left or died keep ticking unless configured otherwise.
    fn forget_owner(&mut self, owner: &PlayerId) {
        if self.config.cancel_orphaned_fuses {
            self.bombs.disarm_owned_by(owner, self.now);
        } else if self.bombs.armed().iter().any(|bomb| bomb.is_owned_by(owner)) {
            log::debug!("Bombs of {} stay armed", owner);
        }
    }

    /// Applies one explosion hit to the local player, at most once per bomb.
    fn apply_hit(&mut self, bomb: &BombId) {
        let local_id = self.players.local_id().clone();
        if !self.guard.admit(bomb, &local_id, self.now) {
            log::debug!("Hit by {} already applied", bomb);
            self.stats.duplicates += 1;
            return;
        }

        let outcome = self.players.local_mut().take_damage(
            self.config.damage,
            self.now,
            self.config.damage_cooldown_ms,
        );
        let health = match outcome {
            DamageOutcome::Ignored => {
                log::debug!("Hit by {} ignored, local player is dead", bomb);
                return;
            }
            DamageOutcome::Damaged { health } => health,
            DamageOutcome::Killed => 0,
        };

        log::info!("Hit by {}, health now {}", bomb, health);
        self.effects.push(Effect::DamageFlash(local_id.clone()));
        self.effects.push(Effect::HealthChanged {
            player: local_id.clone(),
            health,
        });
        self.outbox.push(ClientMessage::UpdateHealth(HealthReport {
            id: local_id.to_string(),
            health: health.into(),
        }));

        if outcome == DamageOutcome::Killed {
            self.local_died();
        }
    }

    fn local_died(&mut self) {
        let local_id = self.players.local_id().clone();
        log::info!("Local player {} died", local_id);
        self.forget_owner(&local_id);
        self.effects.push(Effect::PlayerDied(local_id.clone()));
        self.outbox.push(ClientMessage::PlayerDied(PlayerRef {
            id: local_id.to_string(),
        }));
    }

    fn step_local(&mut self, dt: Millis, input: InputState) {
        let pressed = input.just_pressed(self.prev_input);
        self.prev_input = input;

        if !self.players.local().is_alive() {
            return;
        }

        if let Some(direction) = input.direction() {
            let distance = self.config.player_speed * dt as f32 / 1000.0;
            let from = self.players.local().position();
            let to = step(&self.board, &self.geometry, from, direction, distance);
            if to != from {
                self.players.local_mut().set_position(to);
            }
        }
        self.send_move_if_changed();

        if pressed.contains(InputState::BOMB) {
            self.place_bomb();
        }
    }

    fn send_move_if_changed(&mut self) {
        let local = self.players.local();
        if local.damage_cooldown(self.now) {
            return;
        }

        let position = local.position();
        if self.last_sent != Some(position) {
            self.last_sent = Some(position);
            let state = self.local_state();
            self.outbox.push(ClientMessage::Move(state));
        }
    }

    fn place_bomb(&mut self) {
        let local = self.players.local();
        let position = local.position();
        let tile = self.geometry.tile_of(position);

        match self.bombs.place(local, tile, self.now) {
            Ok(bomb) => {
                self.outbox.push(ClientMessage::AddBomb(BombPlaced {
                    id: local.id().to_string(),
                    x: position.x,
                    y: position.y,
                    tile_x: tile.0.into(),
                    tile_y: tile.1.into(),
                    bomb_id: bomb.id.to_string(),
                }));
                self.effects.push(Effect::BombPlaced {
                    bomb: bomb.id,
                    tile,
                });
            }
            Err(err) => log::warn!("Bomb placement rejected: {}", err),
        }
    }

    fn fire_due_bombs(&mut self) {
        let resolves_all = self.config.resolution == ResolutionMode::PeerLocal;
        let local_id = self.players.local_id().clone();
        let due = self
            .bombs
            .expire_where(self.now, |bomb| resolves_all || bomb.is_owned_by(&local_id));

        for bomb in due {
            let event = resolve(&mut self.board, &bomb, self.players.iter(), &self.geometry);
            self.stats.explosions += 1;

            self.outbox.push(ClientMessage::BombExploded(BombResolved {
                id: local_id.to_string(),
                tile_x: event.tile.0.into(),
                tile_y: event.tile.1.into(),
                bomb_id: event.bomb.to_string(),
                players_hit: event.players_hit.iter().map(ToString::to_string).collect(),
            }));
            self.effects.push(Effect::Explosion {
                bomb: event.bomb.clone(),
                cells: event.visual_cells.clone(),
            });
            self.effects.extend(
                event
                    .destroyed_cells
                    .iter()
                    .copied()
                    .map(Effect::WallDestroyed),
            );

            if event.hits(&local_id) {
                self.apply_hit(&event.bomb);
            }
        }
    }
}
