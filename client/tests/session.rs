use blastgrid_client::*;
use blastgrid_core::*;
use blastgrid_protocol::*;

const ARENA: [[u8; 5]; 5] = [
    [1, 2, 1, 1, 1],
    [2, 0, 2, 0, 2],
    [1, 2, 1, 0, 1],
    [1, 0, 0, 0, 1],
    [1, 1, 1, 1, 1],
];

fn me() -> PlayerId {
    PlayerId::from("me")
}

fn peer() -> PlayerId {
    PlayerId::from("peer")
}

fn session(config: SessionConfig) -> Session {
    let mut session = Session::new(config, me());
    session.drain_outbox();
    session
}

fn arena_session(config: SessionConfig) -> Session {
    let mut session = Session::with_board(config, me(), Board::from_rows(&ARENA).unwrap());
    session.drain_outbox();
    session
}

fn roster(players: &[(&str, f32, f32, i32)]) -> ServerMessage {
    ServerMessage::Players(
        players
            .iter()
            .map(|&(id, x, y, health)| (id.to_string(), RosterPlayer { x, y, health }))
            .collect(),
    )
}

fn explosion(tile: (i32, i32), bomb_id: &str, hit: &[&str]) -> ServerMessage {
    ServerMessage::BombExploded(RemoteExplosion {
        tile_x: tile.0,
        tile_y: tile.1,
        players_hit: hit.iter().map(|id| id.to_string()).collect(),
        bomb_id: Some(bomb_id.into()),
        id: Some("peer".into()),
    })
}

fn peer_bomb(tile: (i32, i32), bomb_id: &str) -> ServerMessage {
    ServerMessage::AddBomb(RemoteBomb {
        x: 0.0,
        y: 0.0,
        id: Some("peer".into()),
        tile_x: Some(tile.0),
        tile_y: Some(tile.1),
        bomb_id: Some(bomb_id.into()),
    })
}

fn unnamed_bomb(x: f32, y: f32) -> ServerMessage {
    ServerMessage::decode(&format!(r#"{{"event":"addBomb","data":{{"x":{x},"y":{y}}}}}"#)).unwrap()
}

fn unnamed_explosion(tile: (i32, i32), hit: &[&str]) -> ServerMessage {
    ServerMessage::BombExploded(RemoteExplosion {
        tile_x: tile.0,
        tile_y: tile.1,
        players_hit: hit.iter().map(|id| id.to_string()).collect(),
        bomb_id: None,
        id: None,
    })
}

fn count<T>(items: &[T], pred: impl Fn(&T) -> bool) -> usize {
    items.iter().filter(|item| pred(item)).count()
}

fn deaths(outbox: &[ClientMessage]) -> usize {
    count(outbox, |msg| matches!(msg, ClientMessage::PlayerDied(_)))
}

#[test]
fn new_session_announces_the_local_player_at_spawn() {
    let mut session = Session::new(SessionConfig::default(), me());

    let outbox = session.drain_outbox();
    let ClientMessage::NewPlayer(state) = &outbox[0] else {
        panic!("expected newPlayer, got {:?}", outbox);
    };
    assert_eq!(outbox.len(), 1);
    assert_eq!((state.x, state.y, state.health), (390.0, 160.0, 100));
    assert_eq!(session.geometry().tile_of(session.local().position()), SPAWN_TILE);
}

#[test]
fn standard_board_bomb_at_spawn_leaves_terrain_alone() {
    let mut session = session(SessionConfig::default());

    session.tick(0, InputState::BOMB);
    let outbox = session.drain_outbox();
    assert!(matches!(
        &outbox[..],
        [ClientMessage::AddBomb(BombPlaced { tile_x: 1, tile_y: 1, .. })]
    ));

    session.tick(2_999, InputState::empty());
    assert_eq!(session.bombs().armed_count(), 1);

    session.tick(3_000, InputState::empty());
    let outbox = session.drain_outbox();
    let Some(ClientMessage::BombExploded(resolved)) = outbox.first() else {
        panic!("expected bombExploded, got {:?}", outbox);
    };
    assert_eq!((resolved.tile_x, resolved.tile_y), (1, 1));
    assert_eq!(resolved.players_hit, vec!["me".to_string()]);
    assert_eq!(session.board(), &Board::standard());
    assert_eq!(session.local().health(), 75);
    assert_eq!(session.bombs().armed_count(), 0);
}

#[test]
fn bomb_destroys_only_the_ring_around_it() {
    let mut session = arena_session(SessionConfig::default());

    session.tick(0, InputState::BOMB);
    session.tick(3_000, InputState::empty());

    let board = session.board();
    for tile in [(1, 0), (0, 1), (2, 1), (1, 2)] {
        assert_eq!(board.cell_at(tile), Cell::Empty, "{:?}", tile);
    }
    assert_eq!(board.cell_at((4, 1)), Cell::Destructible);
    assert_eq!(board.cell_at((0, 0)), Cell::Solid);
    assert_eq!(board.destructible_count(), 1);

    let destroyed = count(&session.drain_effects(), |effect| {
        matches!(effect, Effect::WallDestroyed(_))
    });
    assert_eq!(destroyed, 4);
}

#[test]
fn roster_health_drop_flashes_once() {
    let mut session = session(SessionConfig::default());

    session.enqueue(roster(&[("peer", 440.0, 160.0, 100)]));
    session.tick(0, InputState::empty());
    assert_eq!(session.drain_effects(), vec![Effect::PlayerJoined(peer())]);

    session.enqueue(roster(&[("peer", 440.0, 160.0, 75)]));
    session.tick(16, InputState::empty());
    assert_eq!(
        session.drain_effects(),
        vec![
            Effect::DamageFlash(peer()),
            Effect::HealthChanged {
                player: peer(),
                health: 75
            },
        ]
    );
    assert_eq!(session.players().remote(&peer()).unwrap().health_text(), "75");

    session.enqueue(roster(&[("peer", 440.0, 160.0, 75)]));
    session.enqueue(roster(&[("peer", 440.0, 160.0, 100)]));
    session.tick(32, InputState::empty());
    assert!(session.drain_effects().is_empty());
    assert_eq!(session.players().remote(&peer()).unwrap().health(), 75);
}

#[test]
fn roster_ignores_self_and_removes_absent_peers() {
    let mut session = session(SessionConfig::default());

    session.enqueue(roster(&[("me", 0.0, 0.0, 10), ("peer", 440.0, 160.0, 100)]));
    session.enqueue(roster(&[("me", 0.0, 0.0, 10)]));
    session.tick(0, InputState::empty());

    assert_eq!(session.local().health(), 100);
    assert_eq!(session.players().remote_count(), 0);
    assert_eq!(
        session.drain_effects(),
        vec![Effect::PlayerJoined(peer()), Effect::PlayerRemoved(peer())]
    );
}

#[test]
fn same_explosion_twice_damages_once() {
    let mut session = session(SessionConfig::default());

    session.enqueue(explosion((1, 1), "peer#0", &["me"]));
    session.enqueue(explosion((1, 1), "peer#0", &["me"]));
    session.tick(0, InputState::empty());

    assert_eq!(session.local().health(), 75);
    assert_eq!(session.stats().duplicates, 1);
    let updates = count(&session.drain_outbox(), |msg| {
        matches!(msg, ClientMessage::UpdateHealth(HealthReport { health: 75, .. }))
    });
    assert_eq!(updates, 1);
}

#[test]
fn local_fuse_and_relayed_report_of_one_bomb_damage_once() {
    let mut session = session(SessionConfig::default());

    session.enqueue(peer_bomb((1, 1), "peer#0"));
    session.tick(0, InputState::empty());
    session.tick(3_000, InputState::empty());
    assert_eq!(session.local().health(), 75);

    session.enqueue(explosion((1, 1), "peer#0", &["me"]));
    session.tick(3_016, InputState::empty());
    assert_eq!(session.local().health(), 75);
    assert_eq!(session.stats().duplicates, 1);
}

#[test]
fn last_hit_kills_once() {
    let mut session = session(SessionConfig::default());

    session.enqueue(ServerMessage::PlayerHealthUpdate(HealthReport {
        id: "me".into(),
        health: 25,
    }));
    session.tick(0, InputState::empty());
    assert_eq!(session.local().health(), 25);

    session.enqueue(explosion((1, 1), "peer#0", &["me"]));
    session.tick(16, InputState::empty());
    assert_eq!(session.local().health(), 0);
    assert_eq!(session.local().life(), LifeState::Dead);

    session.enqueue(explosion((1, 1), "peer#1", &["me"]));
    session.enqueue(ServerMessage::PlayerDied(PlayerRef { id: "me".into() }));
    session.tick(400, InputState::empty());
    assert_eq!(session.local().health(), 0);

    let outbox = session.drain_outbox();
    assert_eq!(deaths(&outbox), 1);
    let effects = session.drain_effects();
    assert_eq!(count(&effects, |e| matches!(e, Effect::PlayerDied(_))), 1);
}

#[test]
fn health_reports_never_raise_health() {
    let mut session = session(SessionConfig::default());
    session.enqueue(roster(&[("peer", 440.0, 160.0, 50)]));
    session.tick(0, InputState::empty());

    for health in [80, 40, 120, 60, -5, 30] {
        session.enqueue(ServerMessage::PlayerHealthUpdate(HealthReport {
            id: "peer".into(),
            health,
        }));
    }
    session.tick(16, InputState::empty());

    assert_eq!(session.players().remote(&peer()).unwrap().health(), 0);
    assert!(!session.players().remote(&peer()).unwrap().is_alive());
}

#[test]
fn peer_brought_to_zero_by_a_report_dies_once() {
    let mut session = session(SessionConfig::default());
    session.enqueue(roster(&[("peer", 440.0, 160.0, 25)]));
    session.tick(0, InputState::empty());
    session.drain_effects();

    session.enqueue(ServerMessage::PlayerHealthUpdate(HealthReport {
        id: "peer".into(),
        health: 0,
    }));
    session.enqueue(ServerMessage::PlayerHealthUpdate(HealthReport {
        id: "peer".into(),
        health: 0,
    }));
    session.tick(16, InputState::empty());
    assert_eq!(
        session.drain_effects(),
        vec![
            Effect::DamageFlash(peer()),
            Effect::HealthChanged {
                player: peer(),
                health: 0
            },
            Effect::PlayerDied(peer()),
        ]
    );
    assert!(!session.players().remote(&peer()).unwrap().is_alive());

    session.enqueue(ServerMessage::PlayerDied(PlayerRef { id: "peer".into() }));
    session.tick(32, InputState::empty());
    assert_eq!(session.drain_effects(), vec![Effect::PlayerRemoved(peer())]);
}

#[test]
fn peer_brought_to_zero_by_a_roster_dies_once() {
    let mut session = session(SessionConfig::default());
    session.enqueue(roster(&[("peer", 440.0, 160.0, 25)]));
    session.enqueue(roster(&[("peer", 440.0, 160.0, 0)]));
    session.enqueue(roster(&[("peer", 440.0, 160.0, 0)]));
    session.tick(0, InputState::empty());

    let effects = session.drain_effects();
    assert_eq!(count(&effects, |e| *e == Effect::PlayerDied(peer())), 1);
    assert_eq!(count(&effects, |e| *e == Effect::DamageFlash(peer())), 1);
}

#[test]
fn dead_peer_is_not_resurrected_by_a_stale_roster() {
    let mut session = session(SessionConfig::default());
    session.enqueue(roster(&[("peer", 440.0, 160.0, 100)]));
    session.enqueue(ServerMessage::PlayerDied(PlayerRef { id: "peer".into() }));
    session.enqueue(roster(&[("peer", 440.0, 160.0, 100)]));
    session.tick(0, InputState::empty());

    assert!(session.players().is_buried(&peer()));
    assert_eq!(session.players().remote_count(), 0);
    assert_eq!(
        session.drain_effects(),
        vec![
            Effect::PlayerJoined(peer()),
            Effect::PlayerDied(peer()),
            Effect::PlayerRemoved(peer()),
        ]
    );
}

#[test]
fn unknown_references_are_ignored() {
    let mut session = session(SessionConfig::default());
    session.enqueue(ServerMessage::PlayerMoved(PlayerMoved {
        id: "ghost".into(),
        x: 1.0,
        y: 1.0,
    }));
    session.enqueue(ServerMessage::PlayerHealthUpdate(HealthReport {
        id: "ghost".into(),
        health: 10,
    }));
    session.enqueue(ServerMessage::PlayerLeft(PlayerRef { id: "ghost".into() }));
    session.tick(0, InputState::empty());

    assert_eq!(session.stats().unknown_refs, 3);
    assert!(session.drain_effects().is_empty());
    assert_eq!(session.local().health(), 100);
}

#[test]
fn remote_moves_tween_towards_the_target() {
    let mut session = session(SessionConfig::default());
    session.enqueue(roster(&[("peer", 400.0, 160.0, 100)]));
    session.tick(0, InputState::empty());

    session.enqueue(ServerMessage::PlayerMoved(PlayerMoved {
        id: "peer".into(),
        x: 500.0,
        y: 160.0,
    }));
    session.tick(100, InputState::empty());
    assert_eq!(session.displayed_position(&peer()), Some(Position::new(400.0, 160.0)));

    let player = session.players().remote(&peer()).unwrap();
    assert_eq!(player.position(), Position::new(500.0, 160.0));
    assert_eq!(player.displayed_position(150), Position::new(450.0, 160.0));

    session.tick(200, InputState::empty());
    assert!(session.players().remote(&peer()).unwrap().tween().is_none());
}

#[test]
fn relayed_copy_of_own_bomb_is_ignored() {
    let mut session = session(SessionConfig::default());
    session.tick(0, InputState::BOMB);
    session.enqueue(ServerMessage::AddBomb(RemoteBomb {
        x: 390.0,
        y: 160.0,
        id: Some("me".into()),
        tile_x: None,
        tile_y: None,
        bomb_id: None,
    }));
    session.tick(16, InputState::BOMB);

    assert_eq!(session.bombs().armed_count(), 1);
}

#[test]
fn remote_bomb_without_tile_uses_pixel_position() {
    let mut session = session(SessionConfig::default());
    session.enqueue(ServerMessage::AddBomb(RemoteBomb {
        x: 540.0,
        y: 260.0,
        id: None,
        tile_x: None,
        tile_y: None,
        bomb_id: None,
    }));
    session.tick(0, InputState::empty());

    let bomb = &session.bombs().armed()[0];
    assert_eq!(bomb.tile, (4, 3));
    assert_eq!(bomb.owner, None);
}

#[test]
fn owner_resolves_waits_for_the_owner_and_applies_remote_terrain() {
    let config = SessionConfig {
        resolution: ResolutionMode::OwnerResolves,
        ..SessionConfig::default()
    };
    let mut session = arena_session(config);

    session.enqueue(peer_bomb((1, 1), "peer#0"));
    session.tick(0, InputState::empty());
    session.tick(3_500, InputState::empty());
    assert_eq!(session.board().destructible_count(), 5);
    assert_eq!(session.stats().explosions, 0);
    assert!(session.drain_outbox().is_empty());

    session.drain_effects();
    session.enqueue(explosion((1, 1), "peer#0", &[]));
    session.tick(3_516, InputState::empty());
    assert_eq!(session.board().destructible_count(), 1);
    assert_eq!(session.local().health(), 100);

    let effects = session.drain_effects();
    assert_eq!(count(&effects, |e| matches!(e, Effect::WallDestroyed(_))), 4);
    assert_eq!(count(&effects, |e| matches!(e, Effect::Explosion { .. })), 1);
}

#[test]
fn peer_local_applies_reported_terrain() {
    let mut session = arena_session(SessionConfig::default());

    session.enqueue(explosion((1, 1), "peer#0", &[]));
    session.tick(0, InputState::empty());
    assert_eq!(session.board().destructible_count(), 1);
    assert_eq!(session.stats().explosions, 1);

    session.enqueue(explosion((1, 1), "peer#0", &[]));
    session.tick(16, InputState::empty());
    let effects = session.drain_effects();
    assert_eq!(count(&effects, |e| matches!(e, Effect::Explosion { .. })), 1);
    assert_eq!(count(&effects, |e| matches!(e, Effect::WallDestroyed(_))), 4);
    assert_eq!(session.stats().explosions, 1);
}

#[test]
fn unnamed_report_after_local_fuse_is_the_same_explosion() {
    let mut session = session(SessionConfig::default());

    session.enqueue(unnamed_bomb(390.0, 160.0));
    session.tick(0, InputState::empty());
    session.tick(3_000, InputState::empty());
    assert_eq!(session.local().health(), 75);

    session.enqueue(unnamed_explosion((1, 1), &["me"]));
    session.tick(3_016, InputState::empty());

    assert_eq!(session.local().health(), 75);
    assert_eq!(session.stats().duplicates, 1);
    assert_eq!(session.stats().explosions, 1);
    let updates = count(&session.drain_outbox(), |msg| {
        matches!(msg, ClientMessage::UpdateHealth(_))
    });
    assert_eq!(updates, 1);
}

#[test]
fn unnamed_report_before_local_fuse_stops_it() {
    let mut session = session(SessionConfig::default());

    session.enqueue(unnamed_bomb(390.0, 160.0));
    session.tick(0, InputState::empty());
    session.enqueue(unnamed_explosion((1, 1), &["me"]));
    session.tick(1_000, InputState::empty());
    assert_eq!(session.local().health(), 75);
    assert_eq!(session.bombs().armed_count(), 0);

    session.tick(3_000, InputState::empty());
    session.tick(4_000, InputState::empty());

    assert_eq!(session.local().health(), 75);
    assert_eq!(session.stats().explosions, 1);
    let outbox = session.drain_outbox();
    assert!(!outbox
        .iter()
        .any(|msg| matches!(msg, ClientMessage::BombExploded(_))));
}

#[test]
fn unnamed_reports_of_separate_bombs_both_hit() {
    let mut session = session(SessionConfig::default());

    session.enqueue(unnamed_explosion((1, 1), &["me"]));
    session.tick(0, InputState::empty());
    session.enqueue(unnamed_explosion((1, 1), &["me"]));
    session.tick(3_500, InputState::empty());

    assert_eq!(session.local().health(), 50);
    assert_eq!(session.stats().duplicates, 0);
}

#[test]
fn orphaned_fuse_fires_by_default() {
    let mut session = session(SessionConfig::default());
    session.enqueue(roster(&[("peer", 540.0, 260.0, 100)]));
    session.enqueue(peer_bomb((4, 3), "peer#0"));
    session.enqueue(ServerMessage::PlayerLeft(PlayerRef { id: "peer".into() }));
    session.tick(0, InputState::empty());
    session.tick(3_000, InputState::empty());

    let outbox = session.drain_outbox();
    assert!(outbox.iter().any(|msg| matches!(
        msg,
        ClientMessage::BombExploded(BombResolved { bomb_id, .. }) if bomb_id == "peer#0"
    )));
}

#[test]
fn orphaned_fuse_is_disarmed_when_configured() {
    let config = SessionConfig {
        cancel_orphaned_fuses: true,
        ..SessionConfig::default()
    };
    let mut session = session(config);
    session.enqueue(roster(&[("peer", 540.0, 260.0, 100)]));
    session.enqueue(peer_bomb((4, 3), "peer#0"));
    session.enqueue(ServerMessage::PlayerLeft(PlayerRef { id: "peer".into() }));
    session.tick(0, InputState::empty());
    session.tick(3_000, InputState::empty());

    assert_eq!(session.bombs().armed_count(), 0);
    assert_eq!(session.stats().explosions, 0);
    assert!(session.drain_outbox().is_empty());
}

#[test]
fn damage_cooldown_holds_back_move_updates() {
    let mut session = session(SessionConfig::default());
    session.enqueue(explosion((1, 1), "peer#0", &["me"]));
    session.tick(0, InputState::empty());
    session.drain_outbox();

    session.tick(16, InputState::RIGHT);
    assert!(session.local().position().x > 390.0);
    assert!(session.drain_outbox().is_empty());

    session.tick(250, InputState::RIGHT);
    let outbox = session.drain_outbox();
    let [ClientMessage::Move(state)] = &outbox[..] else {
        panic!("expected one move, got {:?}", outbox);
    };
    assert_eq!(state.health, 75);
    assert_eq!(state.x, session.local().position().x);
}

#[test]
fn walls_stop_local_movement() {
    let mut session = session(SessionConfig::default());

    session.tick(100, InputState::LEFT);
    session.tick(200, InputState::UP);

    assert_eq!(session.local().position(), Position::new(390.0, 160.0));
    assert!(session.drain_outbox().is_empty());
}

#[test]
fn dead_player_cannot_act() {
    let mut session = session(SessionConfig::default());
    session.enqueue(ServerMessage::PlayerDied(PlayerRef { id: "me".into() }));
    session.tick(0, InputState::empty());
    assert_eq!(deaths(&session.drain_outbox()), 1);

    session.tick(16, InputState::BOMB | InputState::RIGHT);
    session.tick(100, InputState::RIGHT);

    assert_eq!(session.bombs().armed_count(), 0);
    assert_eq!(session.local().position(), Position::new(390.0, 160.0));
    assert!(session.drain_outbox().is_empty());
}

#[test]
fn bomb_key_is_edge_triggered() {
    let mut session = session(SessionConfig::default());

    session.tick(0, InputState::BOMB);
    session.tick(16, InputState::BOMB);
    session.tick(32, InputState::empty());
    session.tick(48, InputState::BOMB);

    let ids: Vec<_> = session.bombs().armed().iter().map(|bomb| bomb.id.to_string()).collect();
    assert_eq!(ids, vec!["me#0", "me#1"]);
}
