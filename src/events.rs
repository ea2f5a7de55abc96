//! Events module - the outbound notification stream
//!
//! Rooms and the registry publish state changes as values on an unbounded
//! channel; a transport layer drains the receiver and fans the payloads out
//! to clients. Serialized form is `{"event": ..., "data": {...}}` with
//! camelCase event names.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::core::powerups::PowerUp;
use crate::snapshot::{GameView, LobbyView, RoomSummary};
use crate::types::{PlayerId, RoomId};

/// Everything the simulation announces to the outside world
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum EngineEvent {
    /// The public room list changed
    #[serde(rename = "roomListUpdate")]
    RoomListUpdate { rooms: Vec<RoomSummary> },

    /// A room was created; the creator is its host
    #[serde(rename = "roomCreated")]
    RoomCreated {
        #[serde(rename = "roomId")]
        room_id: RoomId,
        #[serde(rename = "playerId")]
        player_id: PlayerId,
    },

    /// A player joined a room
    #[serde(rename = "roomJoined")]
    RoomJoined {
        #[serde(rename = "roomId")]
        room_id: RoomId,
        #[serde(rename = "playerId")]
        player_id: PlayerId,
    },

    /// A join command was rejected
    #[serde(rename = "joinError")]
    JoinError {
        #[serde(rename = "playerId")]
        player_id: PlayerId,
        message: String,
    },

    /// A start command was rejected
    #[serde(rename = "startError")]
    StartError {
        #[serde(rename = "playerId")]
        player_id: PlayerId,
        message: String,
    },

    /// Room roster or lifecycle state changed
    #[serde(rename = "lobbyUpdate")]
    LobbyUpdate { lobby: LobbyView },

    /// A round began
    #[serde(rename = "gameStarted")]
    GameStarted { game: GameView },

    /// In-game state changed (tick, move, power-up effect)
    #[serde(rename = "gameUpdate")]
    GameUpdate { game: GameView },

    /// A player earned a power-up from a multi-line clear
    #[serde(rename = "powerupAcquired")]
    PowerUpAcquired {
        #[serde(rename = "roomId")]
        room_id: RoomId,
        #[serde(rename = "playerId")]
        player_id: PlayerId,
        #[serde(rename = "playerName")]
        player_name: String,
        #[serde(rename = "powerup")]
        power_up: PowerUp,
    },

    /// A player consumed a power-up against a target
    #[serde(rename = "powerupUsed")]
    PowerUpUsed {
        #[serde(rename = "roomId")]
        room_id: RoomId,
        #[serde(rename = "playerId")]
        player_id: PlayerId,
        #[serde(rename = "playerName")]
        player_name: String,
        #[serde(rename = "targetId")]
        target_id: PlayerId,
        #[serde(rename = "targetPlayerName")]
        target_name: String,
        #[serde(rename = "powerup")]
        power_up: PowerUp,
    },

    /// The round ended; at most one player was still alive
    #[serde(rename = "gameEnded")]
    GameEnded {
        #[serde(rename = "roomId")]
        room_id: RoomId,
        winner: Option<PlayerId>,
        #[serde(rename = "winnerName")]
        winner_name: Option<String>,
        game: GameView,
    },
}

/// Cloneable handle for publishing events. Delivery is best-effort: if the
/// receiver is gone the simulation keeps running and the event is dropped.
#[derive(Debug, Clone)]
pub struct EventSender {
    tx: mpsc::UnboundedSender<EngineEvent>,
}

impl EventSender {
    pub fn new(tx: mpsc::UnboundedSender<EngineEvent>) -> Self {
        Self { tx }
    }

    /// Create a connected sender/receiver pair
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<EngineEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }

    pub fn send(&self, event: EngineEvent) {
        let _ = self.tx.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_wire_names() {
        let event = EngineEvent::RoomListUpdate { rooms: vec![] };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "roomListUpdate");
        assert!(json["data"]["rooms"].is_array());

        let event = EngineEvent::JoinError {
            player_id: PlayerId::new(),
            message: "room is full".into(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "joinError");
        assert_eq!(json["data"]["message"], "room is full");
    }

    #[test]
    fn test_send_without_receiver_is_silent() {
        let (sender, rx) = EventSender::channel();
        drop(rx);
        // Must not panic or error.
        sender.send(EngineEvent::RoomListUpdate { rooms: vec![] });
    }

    #[tokio::test]
    async fn test_events_arrive_in_order() {
        let (sender, mut rx) = EventSender::channel();
        let a = PlayerId::new();
        let b = PlayerId::new();
        sender.send(EngineEvent::JoinError {
            player_id: a,
            message: "first".into(),
        });
        sender.send(EngineEvent::JoinError {
            player_id: b,
            message: "second".into(),
        });

        match rx.recv().await.unwrap() {
            EngineEvent::JoinError { player_id, message } => {
                assert_eq!(player_id, a);
                assert_eq!(message, "first");
            }
            other => panic!("unexpected event: {:?}", other),
        }
        match rx.recv().await.unwrap() {
            EngineEvent::JoinError { message, .. } => assert_eq!(message, "second"),
            other => panic!("unexpected event: {:?}", other),
        }
    }
}
