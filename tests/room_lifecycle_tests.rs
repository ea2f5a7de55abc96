//! End-to-end room lifecycle through the registry command surface

use blockbrawl::core::powerups::{self, PowerUp, PowerUpKind};
use blockbrawl::error::{JoinError, StartError};
use blockbrawl::events::EngineEvent;
use blockbrawl::registry::RoomRegistry;
use blockbrawl::types::{CellColor, MoveDir, PieceKind, PlayerId, RoomState, ROOM_CAPACITY};
use tokio::sync::mpsc::UnboundedReceiver;

fn drain(rx: &mut UnboundedReceiver<EngineEvent>) -> Vec<EngineEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

fn switch_boards_power_up() -> PowerUp {
    let def = powerups::CATALOG
        .iter()
        .find(|d| d.kind == PowerUpKind::SwitchBoards)
        .unwrap();
    PowerUp::from(def)
}

#[tokio::test]
async fn test_create_join_start_flow() {
    let (registry, mut rx) = RoomRegistry::new().unwrap();
    let host = PlayerId::new();
    let guest = PlayerId::new();

    let room_id = registry
        .create_room_with_seed("arena", host, "alice", 42)
        .await;
    registry.join_room(room_id, guest, "bob").await.unwrap();
    registry.start_game(room_id, host).await.unwrap();

    let room = registry.room(room_id).await.unwrap();
    let guard = room.lock().await;
    assert_eq!(guard.state(), RoomState::Playing);
    assert_eq!(guard.player_count(), 2);
    for player in guard.players() {
        assert!(player.current.is_some());
    }
    drop(guard);

    let events = drain(&mut rx);
    assert!(events
        .iter()
        .any(|e| matches!(e, EngineEvent::GameStarted { .. })));
}

#[tokio::test]
async fn test_room_fills_up_and_rejects() {
    let (registry, _rx) = RoomRegistry::new().unwrap();
    let host = PlayerId::new();
    let room_id = registry.create_room("arena", host, "alice").await;

    for i in 1..ROOM_CAPACITY {
        let id = PlayerId::new();
        registry
            .join_room(room_id, id, format!("p{}", i))
            .await
            .unwrap();
    }
    let result = registry.join_room(room_id, PlayerId::new(), "late").await;
    assert_eq!(result, Err(JoinError::RoomFull));
}

#[tokio::test]
async fn test_start_rejected_for_non_host_and_solo() {
    let (registry, mut rx) = RoomRegistry::new().unwrap();
    let host = PlayerId::new();
    let guest = PlayerId::new();
    let room_id = registry.create_room("arena", host, "alice").await;

    assert_eq!(
        registry.start_game(room_id, host).await,
        Err(StartError::NotEnoughPlayers)
    );
    registry.join_room(room_id, guest, "bob").await.unwrap();
    assert_eq!(
        registry.start_game(room_id, guest).await,
        Err(StartError::NotHost)
    );

    let events = drain(&mut rx);
    let messages: Vec<&str> = events
        .iter()
        .filter_map(|e| match e {
            EngineEvent::StartError { message, .. } => Some(message.as_str()),
            _ => None,
        })
        .collect();
    assert!(messages.contains(&"need at least 2 players to start the game"));
    assert!(messages.contains(&"only the host can start the game"));
}

#[tokio::test]
async fn test_host_transfer_on_leave() {
    let (registry, _rx) = RoomRegistry::new().unwrap();
    let host = PlayerId::new();
    let room_id = registry.create_room("arena", host, "alice").await;
    let b = PlayerId::new();
    let c = PlayerId::new();
    registry.join_room(room_id, b, "bob").await.unwrap();
    registry.join_room(room_id, c, "carol").await.unwrap();

    registry.leave_room(room_id, host).await;

    let room = registry.room(room_id).await.unwrap();
    let guard = room.lock().await;
    assert_eq!(guard.player_count(), 2);
    let hosts: Vec<PlayerId> = guard
        .players()
        .filter(|p| p.is_host)
        .map(|p| p.id)
        .collect();
    assert_eq!(hosts.len(), 1);
    assert_eq!(hosts[0], guard.host());
    // Deterministic succession: the lowest remaining id inherits.
    assert_eq!(hosts[0], b.min(c));
}

#[tokio::test]
async fn test_moves_flow_through_registry() {
    let (registry, _rx) = RoomRegistry::new().unwrap();
    let host = PlayerId::new();
    let guest = PlayerId::new();
    let room_id = registry
        .create_room_with_seed("arena", host, "alice", 5)
        .await;
    registry.join_room(room_id, guest, "bob").await.unwrap();
    registry.start_game(room_id, host).await.unwrap();

    let room = registry.room(room_id).await.unwrap();
    let x_before = room.lock().await.player(host).unwrap().x;

    registry.move_piece(room_id, host, MoveDir::Left).await;
    registry.move_piece(room_id, host, MoveDir::Down).await;

    let guard = room.lock().await;
    let player = guard.player(host).unwrap();
    assert_eq!(player.x, x_before - 1);
    assert_eq!(player.y, 1);
}

#[tokio::test]
async fn test_top_out_finishes_game_and_names_winner() {
    let (registry, mut rx) = RoomRegistry::new().unwrap();
    let host = PlayerId::new();
    let guest = PlayerId::new();
    let room_id = registry
        .create_room_with_seed("arena", host, "alice", 99)
        .await;
    registry.join_room(room_id, guest, "bob").await.unwrap();
    registry.start_game(room_id, host).await.unwrap();
    drain(&mut rx);

    let room = registry.room(room_id).await.unwrap();
    {
        let mut guard = room.lock().await;
        let player = guard.player_mut(host).unwrap();
        // Bury everything below the spawn rows, leaving a column open so
        // nothing counts as a full line.
        for y in 2..20 {
            for x in 0..9 {
                player.board.set(x, y, Some(CellColor::Gray));
            }
        }
    }
    registry.hard_drop(room_id, host).await;

    let guard = room.lock().await;
    assert_eq!(guard.state(), RoomState::Finished);
    assert_eq!(guard.winner(), Some(guest));
    drop(guard);

    let events = drain(&mut rx);
    let ended = events.iter().find_map(|e| match e {
        EngineEvent::GameEnded {
            winner,
            winner_name,
            ..
        } => Some((*winner, winner_name.clone())),
        _ => None,
    });
    assert_eq!(ended, Some((Some(guest), Some("bob".to_string()))));
}

#[tokio::test]
async fn test_no_game_updates_after_finish() {
    let (registry, mut rx) = RoomRegistry::new().unwrap();
    let host = PlayerId::new();
    let guest = PlayerId::new();
    let room_id = registry
        .create_room_with_seed("arena", host, "alice", 99)
        .await;
    registry.join_room(room_id, guest, "bob").await.unwrap();
    registry.start_game(room_id, host).await.unwrap();

    let room = registry.room(room_id).await.unwrap();
    {
        let mut guard = room.lock().await;
        let player = guard.player_mut(host).unwrap();
        for y in 2..20 {
            for x in 0..9 {
                player.board.set(x, y, Some(CellColor::Gray));
            }
        }
    }
    registry.hard_drop(room_id, host).await;
    drain(&mut rx);

    registry.move_piece(room_id, guest, MoveDir::Down).await;
    registry.hard_drop(room_id, guest).await;
    registry.use_power_up(room_id, guest, None).await;

    let events = drain(&mut rx);
    assert!(events
        .iter()
        .all(|e| !matches!(e, EngineEvent::GameUpdate { .. })));
}

#[tokio::test]
async fn test_switch_boards_never_targets_self() {
    let (registry, mut rx) = RoomRegistry::new().unwrap();
    let host = PlayerId::new();
    let guest = PlayerId::new();
    let room_id = registry
        .create_room_with_seed("arena", host, "alice", 3)
        .await;
    registry.join_room(room_id, guest, "bob").await.unwrap();
    registry.start_game(room_id, host).await.unwrap();
    drain(&mut rx);

    let room = registry.room(room_id).await.unwrap();
    {
        let mut guard = room.lock().await;
        guard
            .player_mut(host)
            .unwrap()
            .power_ups
            .push_back(switch_boards_power_up());
        guard
            .player_mut(host)
            .unwrap()
            .board
            .set(0, 19, Some(CellColor::Red));
    }

    // Target self explicitly; the effect must still pick the other player.
    registry.use_power_up(room_id, host, Some(host)).await;

    let guard = room.lock().await;
    assert!(guard.player(host).unwrap().board.is_empty());
    assert_eq!(
        guard.player(guest).unwrap().board.get(0, 19),
        Some(Some(CellColor::Red))
    );
    drop(guard);

    let events = drain(&mut rx);
    let used = events.iter().find_map(|e| match e {
        EngineEvent::PowerUpUsed {
            player_id,
            player_name,
            target_id,
            target_name,
            ..
        } => Some((*player_id, player_name.clone(), *target_id, target_name.clone())),
        _ => None,
    });
    assert_eq!(
        used,
        Some((host, "alice".to_string(), guest, "bob".to_string()))
    );
}

#[tokio::test]
async fn test_topped_out_player_still_fires_power_ups() {
    let (registry, _rx) = RoomRegistry::new().unwrap();
    let host = PlayerId::new();
    let guest = PlayerId::new();
    let third = PlayerId::new();
    let room_id = registry
        .create_room_with_seed("arena", host, "alice", 21)
        .await;
    registry.join_room(room_id, guest, "bob").await.unwrap();
    registry.join_room(room_id, third, "carol").await.unwrap();
    registry.start_game(room_id, host).await.unwrap();

    let room = registry.room(room_id).await.unwrap();
    {
        let mut guard = room.lock().await;
        let player = guard.player_mut(host).unwrap();
        player.game_over = true;
        player.power_ups.push_back(PowerUp::from(&powerups::CATALOG[0]));
        assert_eq!(powerups::CATALOG[0].kind, PowerUpKind::GarbageRows);
    }

    registry.use_power_up(room_id, host, Some(guest)).await;

    let guard = room.lock().await;
    assert!(guard.player(host).unwrap().power_ups.is_empty());
    // Two garbage rows landed on the live target.
    assert_eq!(guard.player(guest).unwrap().board.occupied_count(), 18);
    assert_eq!(guard.state(), RoomState::Playing);
}

#[tokio::test(start_paused = true)]
async fn test_gravity_task_advances_pieces() {
    let (registry, _rx) = RoomRegistry::new().unwrap();
    let host = PlayerId::new();
    let guest = PlayerId::new();
    let room_id = registry
        .create_room_with_seed("arena", host, "alice", 11)
        .await;
    registry.join_room(room_id, guest, "bob").await.unwrap();
    registry.start_game(room_id, host).await.unwrap();

    // Under a paused clock this sleep fast-forwards past one gravity tick.
    tokio::time::sleep(std::time::Duration::from_millis(1100)).await;
    tokio::task::yield_now().await;

    let room = registry.room(room_id).await.unwrap();
    let guard = room.lock().await;
    for player in guard.players() {
        assert!(player.y >= 1, "gravity never reached {}", player.name);
    }
}

#[tokio::test]
async fn test_game_update_wire_shape() {
    let (registry, mut rx) = RoomRegistry::new().unwrap();
    let host = PlayerId::new();
    let guest = PlayerId::new();
    let room_id = registry
        .create_room_with_seed("arena", host, "alice", 8)
        .await;
    registry.join_room(room_id, guest, "bob").await.unwrap();
    registry.start_game(room_id, host).await.unwrap();
    drain(&mut rx);

    registry.move_piece(room_id, host, MoveDir::Down).await;
    let events = drain(&mut rx);
    let update = events
        .iter()
        .find(|e| matches!(e, EngineEvent::GameUpdate { .. }))
        .unwrap();

    let json = serde_json::to_value(update).unwrap();
    assert_eq!(json["event"], "gameUpdate");
    let players = json["data"]["game"]["players"].as_array().unwrap();
    assert_eq!(players.len(), 2);
    let board = players[0]["board"].as_array().unwrap();
    assert_eq!(board.len(), 20);
    assert_eq!(board[0].as_array().unwrap().len(), 10);
    assert!(players[0].get("currentPiece").is_some());
    assert!(players[0].get("isGameOver").is_some());

    // Piece names cross the wire uppercase.
    let piece = serde_json::to_value(PieceKind::I).unwrap();
    assert_eq!(piece, "I");
}

#[tokio::test]
async fn test_multi_line_clear_emits_powerup_acquired() {
    let (registry, mut rx) = RoomRegistry::new().unwrap();
    let host = PlayerId::new();
    let guest = PlayerId::new();
    let room_id = registry
        .create_room_with_seed("arena", host, "alice", 6)
        .await;
    registry.join_room(room_id, guest, "bob").await.unwrap();
    registry.start_game(room_id, host).await.unwrap();
    drain(&mut rx);

    let room = registry.room(room_id).await.unwrap();
    {
        let mut guard = room.lock().await;
        let player = guard.player_mut(host).unwrap();
        // Two nearly-full bottom rows; a vertical I in the last column
        // completes both.
        for y in [18, 19] {
            for x in 0..9 {
                player.board.set(x, y, Some(CellColor::Gray));
            }
        }
        player.current = Some(PieceKind::I);
        player.rotation = 1;
        player.x = 7;
        player.y = 0;
    }
    registry.hard_drop(room_id, host).await;

    let guard = room.lock().await;
    let player = guard.player(host).unwrap();
    assert_eq!(player.lines_cleared, 2);
    assert_eq!(player.score, 200);
    assert_eq!(player.power_ups.len(), 1);
    drop(guard);

    let events = drain(&mut rx);
    assert!(events.iter().any(|e| matches!(
        e,
        EngineEvent::PowerUpAcquired { player_id, player_name, .. }
            if *player_id == host && player_name == "alice"
    )));
}
