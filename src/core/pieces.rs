//! Pieces module - shape catalog and rotation
//!
//! Each piece is defined as an occupancy matrix on its bounding box (4 for I,
//! 2 for O, 3 for the rest), so rotating never changes the bounding-box size.
//! Rotation index r in 0..4 applies r 90-degree clockwise rotations via
//! transpose-then-row-reverse. The catalog is process-wide and immutable.

use crate::core::Board;
use crate::types::{PieceKind, BOARD_HEIGHT, BOARD_WIDTH};

/// Maximum bounding-box side across all pieces
const MAX_SIZE: usize = 4;

/// A piece shape: square occupancy matrix on its bounding box
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shape {
    size: u8,
    cells: [[bool; MAX_SIZE]; MAX_SIZE],
}

impl Shape {
    /// Side length of the bounding box
    pub fn size(&self) -> u8 {
        self.size
    }

    /// Whether the cell at (x, y) within the bounding box is occupied
    pub fn is_set(&self, x: u8, y: u8) -> bool {
        x < self.size && y < self.size && self.cells[y as usize][x as usize]
    }

    /// Occupied cell offsets from the anchor (top-left of the bounding box)
    pub fn offsets(&self) -> impl Iterator<Item = (i8, i8)> + '_ {
        let n = self.size as i8;
        (0..n).flat_map(move |y| {
            (0..n).filter_map(move |x| {
                if self.cells[y as usize][x as usize] {
                    Some((x, y))
                } else {
                    None
                }
            })
        })
    }

    /// One 90-degree clockwise rotation: transpose, then reverse each row
    pub fn rotate_cw(&self) -> Shape {
        let n = self.size as usize;
        let mut out = [[false; MAX_SIZE]; MAX_SIZE];
        for (y, row) in out.iter_mut().enumerate().take(n) {
            for (x, cell) in row.iter_mut().enumerate().take(n) {
                *cell = self.cells[n - 1 - x][y];
            }
        }
        Shape {
            size: self.size,
            cells: out,
        }
    }
}

/// Base (rotation 0) shape for a piece kind
pub fn base_shape(kind: PieceKind) -> Shape {
    fn grid<const N: usize>(rows: [[u8; N]; N]) -> Shape {
        let mut cells = [[false; MAX_SIZE]; MAX_SIZE];
        for (y, row) in rows.iter().enumerate() {
            for (x, v) in row.iter().enumerate() {
                cells[y][x] = *v != 0;
            }
        }
        Shape {
            size: N as u8,
            cells,
        }
    }

    match kind {
        PieceKind::I => grid([[0, 0, 0, 0], [1, 1, 1, 1], [0, 0, 0, 0], [0, 0, 0, 0]]),
        PieceKind::O => grid([[1, 1], [1, 1]]),
        PieceKind::T => grid([[0, 1, 0], [1, 1, 1], [0, 0, 0]]),
        PieceKind::S => grid([[0, 1, 1], [1, 1, 0], [0, 0, 0]]),
        PieceKind::Z => grid([[1, 1, 0], [0, 1, 1], [0, 0, 0]]),
        PieceKind::J => grid([[1, 0, 0], [1, 1, 1], [0, 0, 0]]),
        PieceKind::L => grid([[0, 0, 1], [1, 1, 1], [0, 0, 0]]),
    }
}

/// Shape for a piece kind after `rotation` clockwise quarter turns
pub fn shape_at(kind: PieceKind, rotation: u8) -> Shape {
    let mut shape = base_shape(kind);
    for _ in 0..(rotation % 4) {
        shape = shape.rotate_cw();
    }
    shape
}

/// Placement legality. A shape cell at board (x+dx, y+dy) is illegal when the
/// horizontal coordinate leaves [0, width) or the vertical coordinate reaches
/// the floor, or when it lands on an occupied cell. Cells above the top edge
/// (y+dy < 0) are always legal so pieces can spawn partially off-screen.
pub fn fits(board: &Board, shape: &Shape, x: i8, y: i8) -> bool {
    for (dx, dy) in shape.offsets() {
        let px = x + dx;
        let py = y + dy;
        if px < 0 || px >= BOARD_WIDTH as i8 || py >= BOARD_HEIGHT as i8 {
            return false;
        }
        if py >= 0 && matches!(board.get(px, py), Some(Some(_))) {
            return false;
        }
    }
    true
}

/// Spawn anchor x: the bounding box centered over the board width, rounded down
pub fn spawn_x(kind: PieceKind) -> i8 {
    (BOARD_WIDTH / 2) as i8 - (base_shape(kind).size() / 2) as i8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CellColor;

    fn offsets_of(kind: PieceKind, rotation: u8) -> Vec<(i8, i8)> {
        shape_at(kind, rotation).offsets().collect()
    }

    #[test]
    fn test_every_piece_has_four_cells() {
        for kind in PieceKind::ALL {
            for rotation in 0..4 {
                assert_eq!(
                    offsets_of(kind, rotation).len(),
                    4,
                    "{:?} r{}",
                    kind,
                    rotation
                );
            }
        }
    }

    #[test]
    fn test_bounding_box_sizes() {
        assert_eq!(base_shape(PieceKind::I).size(), 4);
        assert_eq!(base_shape(PieceKind::O).size(), 2);
        for kind in [PieceKind::T, PieceKind::S, PieceKind::Z, PieceKind::J, PieceKind::L] {
            assert_eq!(base_shape(kind).size(), 3);
        }
    }

    #[test]
    fn test_rotation_group_of_order_four() {
        for kind in PieceKind::ALL {
            let base = base_shape(kind);
            let full_turn = base.rotate_cw().rotate_cw().rotate_cw().rotate_cw();
            assert_eq!(base, full_turn, "{:?}", kind);
            assert_eq!(shape_at(kind, 0), full_turn);
        }
    }

    #[test]
    fn test_i_piece_rotates_vertical() {
        // Base I occupies row 1; one clockwise turn puts it in column 2.
        let rotated = shape_at(PieceKind::I, 1);
        let offsets: Vec<_> = rotated.offsets().collect();
        assert_eq!(offsets, vec![(2, 0), (2, 1), (2, 2), (2, 3)]);
    }

    #[test]
    fn test_o_piece_rotation_invariant() {
        let base = base_shape(PieceKind::O);
        for rotation in 0..4 {
            assert_eq!(shape_at(PieceKind::O, rotation), base);
        }
    }

    #[test]
    fn test_spawn_x_centers_bounding_box() {
        assert_eq!(spawn_x(PieceKind::I), 3); // 5 - 2
        assert_eq!(spawn_x(PieceKind::O), 4); // 5 - 1
        assert_eq!(spawn_x(PieceKind::T), 4); // 5 - 1
    }

    #[test]
    fn test_fits_walls_and_floor() {
        let board = Board::new();
        let shape = base_shape(PieceKind::O);

        assert!(fits(&board, &shape, 0, 0));
        assert!(fits(&board, &shape, 8, 0));
        assert!(!fits(&board, &shape, 9, 0)); // right wall
        assert!(!fits(&board, &shape, -1, 0)); // left wall
        assert!(fits(&board, &shape, 0, 18));
        assert!(!fits(&board, &shape, 0, 19)); // floor
    }

    #[test]
    fn test_fits_above_top_is_legal() {
        let board = Board::new();
        let shape = base_shape(PieceKind::O);
        assert!(fits(&board, &shape, 4, -1));
        assert!(fits(&board, &shape, 4, -2));
    }

    #[test]
    fn test_fits_rejects_occupied_cells() {
        let mut board = Board::new();
        board.set(4, 1, Some(CellColor::Gray));
        let shape = base_shape(PieceKind::O);
        assert!(!fits(&board, &shape, 4, 0));
        assert!(fits(&board, &shape, 5, 0));
    }
}
