//! Snapshot module - serializable projections of room state
//!
//! Views are value snapshots taken under the room lock: once built they are
//! detached from live state and safe to ship over any transport. Boards are
//! projected as numeric code grids (0 = empty, 1-7 = piece colors, 8 =
//! garbage). Field names follow the camelCase wire convention.

use serde::{Deserialize, Serialize};

use crate::core::player::Player;
use crate::core::powerups::PowerUp;
use crate::core::room::GameRoom;
use crate::types::{PieceKind, PlayerId, RoomId, RoomState, BOARD_HEIGHT, BOARD_WIDTH};

const WIDTH: usize = BOARD_WIDTH as usize;
const HEIGHT: usize = BOARD_HEIGHT as usize;

/// Lobby-level view of one player
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LobbyPlayer {
    pub id: PlayerId,
    pub name: String,
    pub is_host: bool,
    pub is_game_over: bool,
}

/// Roster snapshot of a room, for everyone in it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LobbyView {
    pub room_id: RoomId,
    pub name: String,
    pub state: RoomState,
    pub players: Vec<LobbyPlayer>,
    pub max_players: usize,
}

/// In-game view of one player, board included
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerView {
    pub id: PlayerId,
    pub name: String,
    pub board: [[u8; WIDTH]; HEIGHT],
    pub current_piece: Option<PieceKind>,
    pub next_piece: Option<PieceKind>,
    pub x: i8,
    pub y: i8,
    pub rotation: u8,
    pub score: u32,
    pub lines_cleared: u32,
    pub power_ups: Vec<PowerUp>,
    pub is_game_over: bool,
    pub is_host: bool,
}

impl PlayerView {
    pub fn of(player: &Player) -> Self {
        let mut board = [[0u8; WIDTH]; HEIGHT];
        player.board.write_codes(&mut board);
        Self {
            id: player.id,
            name: player.name.clone(),
            board,
            current_piece: player.current,
            next_piece: player.next,
            x: player.x,
            y: player.y,
            rotation: player.rotation,
            score: player.score,
            lines_cleared: player.lines_cleared,
            power_ups: player.power_ups.iter().cloned().collect(),
            is_game_over: player.game_over,
            is_host: player.is_host,
        }
    }
}

/// Full game snapshot of a room: every player's in-game view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameView {
    pub room_id: RoomId,
    pub state: RoomState,
    pub players: Vec<PlayerView>,
    pub winner: Option<PlayerId>,
}

/// One row of the public room list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSummary {
    pub id: RoomId,
    pub name: String,
    pub host_name: String,
    pub player_count: usize,
    pub max_players: usize,
    pub state: RoomState,
}

impl LobbyView {
    pub fn of(room: &GameRoom) -> Self {
        Self {
            room_id: room.id,
            name: room.name.clone(),
            state: room.state(),
            players: room
                .players()
                .map(|p| LobbyPlayer {
                    id: p.id,
                    name: p.name.clone(),
                    is_host: p.is_host,
                    is_game_over: p.game_over,
                })
                .collect(),
            max_players: crate::types::ROOM_CAPACITY,
        }
    }
}

impl GameView {
    pub fn of(room: &GameRoom) -> Self {
        Self {
            room_id: room.id,
            state: room.state(),
            players: room.players().map(PlayerView::of).collect(),
            winner: room.winner(),
        }
    }
}

impl RoomSummary {
    pub fn of(room: &GameRoom) -> Self {
        Self {
            id: room.id,
            name: room.name.clone(),
            host_name: room.host_name().unwrap_or_default(),
            player_count: room.player_count(),
            max_players: crate::types::ROOM_CAPACITY,
            state: room.state(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CellColor;

    #[test]
    fn test_player_view_projects_board_codes() {
        let mut player = Player::new(PlayerId::new(), "alice", true);
        player.board.set(0, 19, Some(CellColor::Cyan));
        player.board.set(9, 19, Some(CellColor::Gray));
        player.score = 300;

        let view = PlayerView::of(&player);
        assert_eq!(view.board[19][0], 1);
        assert_eq!(view.board[19][9], 8);
        assert_eq!(view.board[0][0], 0);
        assert_eq!(view.score, 300);
        assert!(view.is_host);
    }

    #[test]
    fn test_player_view_serializes_camel_case() {
        let player = Player::new(PlayerId::new(), "bob", false);
        let json = serde_json::to_value(PlayerView::of(&player)).unwrap();
        assert!(json.get("isGameOver").is_some());
        assert!(json.get("linesCleared").is_some());
        assert!(json.get("powerUps").is_some());
        assert!(json.get("currentPiece").is_some());
        assert!(json.get("game_over").is_none());
    }

    #[test]
    fn test_view_is_detached_from_live_state() {
        let mut player = Player::new(PlayerId::new(), "carol", false);
        let view = PlayerView::of(&player);
        player.board.set(5, 5, Some(CellColor::Red));
        player.score = 999;
        assert_eq!(view.board[5][5], 0);
        assert_eq!(view.score, 0);
    }
}
