//! Engine module - piece physics for one player
//!
//! All movement is validated against the player's own board. Illegal moves
//! revert silently; an illegal downward step is the lock trigger. Locking
//! commits the piece, clears full lines, scores them, and spawns the next
//! piece in one atomic step.

use arrayvec::ArrayVec;

use crate::core::pieces::{self, Shape};
use crate::core::player::Player;
use crate::core::rng::SimpleRng;
use crate::core::Board;
use crate::types::{MoveDir, BOARD_HEIGHT, POINTS_PER_LINE};

const HEIGHT: usize = BOARD_HEIGHT as usize;

/// What happened when a piece locked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LockOutcome {
    /// Number of lines cleared by this lock
    pub lines_cleared: usize,
    /// The follow-up spawn had no room: the player is out
    pub topped_out: bool,
}

fn active_shape(player: &Player) -> Option<Shape> {
    if player.game_over {
        return None;
    }
    player.current_shape()
}

/// Step the active piece one cell. Left/right either apply or revert with no
/// other effect; an impossible downward step locks the piece and reports the
/// outcome.
pub fn try_move(player: &mut Player, dir: MoveDir, rng: &mut SimpleRng) -> Option<LockOutcome> {
    let shape = active_shape(player)?;
    let (dx, dy) = match dir {
        MoveDir::Left => (-1, 0),
        MoveDir::Right => (1, 0),
        MoveDir::Down => (0, 1),
    };

    if pieces::fits(&player.board, &shape, player.x + dx, player.y + dy) {
        player.x += dx;
        player.y += dy;
        return None;
    }
    if dir == MoveDir::Down {
        return Some(lock(player, rng));
    }
    None
}

/// Rotate the active piece one quarter turn clockwise, with wall kicks.
/// The rotated shape is probed at the current x, then one cell left, then one
/// cell right; if none fit the rotation reverts entirely.
pub fn rotate(player: &mut Player) {
    let Some(kind) = (if player.game_over { None } else { player.current }) else {
        return;
    };
    let next_rotation = (player.rotation + 1) % 4;
    let shape = pieces::shape_at(kind, next_rotation);

    for dx in [0, -1, 1] {
        if pieces::fits(&player.board, &shape, player.x + dx, player.y) {
            player.rotation = next_rotation;
            player.x += dx;
            return;
        }
    }
}

/// Drop the active piece to its lowest legal position and lock immediately
pub fn hard_drop(player: &mut Player, rng: &mut SimpleRng) -> Option<LockOutcome> {
    let shape = active_shape(player)?;
    while pieces::fits(&player.board, &shape, player.x, player.y + 1) {
        player.y += 1;
    }
    Some(lock(player, rng))
}

/// Commit the active piece to the board, clear and score full lines, then
/// spawn the next piece.
pub fn lock(player: &mut Player, rng: &mut SimpleRng) -> LockOutcome {
    if let Some(kind) = player.current {
        let shape = pieces::shape_at(kind, player.rotation);
        let color = kind.color();
        for (dx, dy) in shape.offsets() {
            // Cells still above the top edge are simply not committed.
            player.board.set(player.x + dx, player.y + dy, Some(color));
        }
    }

    let cleared = clear_lines(&mut player.board);
    let n = cleared.len();
    player.score += POINTS_PER_LINE * n as u32;
    player.lines_cleared += n as u32;

    spawn(player, rng);
    LockOutcome {
        lines_cleared: n,
        topped_out: player.game_over,
    }
}

/// Remove every full row, bottom-up. After a removal the same index is
/// re-examined, since the row above has shifted into it; power-up effects can
/// leave more than four full rows at once. Returns the cleared row indices in
/// removal order.
pub fn clear_lines(board: &mut Board) -> ArrayVec<usize, HEIGHT> {
    let mut cleared = ArrayVec::new();
    let mut y = HEIGHT;
    while y > 0 {
        y -= 1;
        if board.is_row_full(y) {
            board.clear_row(y);
            cleared.push(y);
            // Re-examine the same index on the next iteration.
            y += 1;
        }
    }
    cleared
}

/// Promote the look-ahead piece to active (drawing one if the queue is cold),
/// draw a fresh look-ahead, and place the piece at the spawn anchor. If the
/// spawn position is blocked the player tops out.
pub fn spawn(player: &mut Player, rng: &mut SimpleRng) {
    let kind = player.next.take().unwrap_or_else(|| rng.random_piece());
    player.current = Some(kind);
    player.next = Some(rng.random_piece());
    player.rotation = 0;
    player.x = pieces::spawn_x(kind);
    player.y = 0;

    let shape = pieces::base_shape(kind);
    if !pieces::fits(&player.board, &shape, player.x, player.y) {
        player.game_over = true;
    }
}
