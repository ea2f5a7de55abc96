//! Board module - one player's grid
//!
//! The board is a 10x20 grid where each cell is empty or holds a color.
//! Uses a flat array for cache locality; coordinates are (x, y) with x
//! ranging 0..9 left to right and y ranging 0..19 top to bottom.
//! Dimensions never change; power-ups mutate cell contents and row order only.

use crate::error::OutOfBounds;
use crate::types::{Cell, BOARD_HEIGHT, BOARD_WIDTH};

/// Total number of cells on the board
const BOARD_SIZE: usize = (BOARD_WIDTH * BOARD_HEIGHT) as usize;

const WIDTH: usize = BOARD_WIDTH as usize;
const HEIGHT: usize = BOARD_HEIGHT as usize;

/// The game board - 10 columns x 20 rows using flat array storage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    /// Flat array of cells, row-major order (y * WIDTH + x)
    cells: [Cell; BOARD_SIZE],
}

impl Board {
    /// Create a new empty board
    pub fn new() -> Self {
        Self {
            cells: [None; BOARD_SIZE],
        }
    }

    /// Calculate flat index from (x, y) coordinates
    #[inline(always)]
    fn index(x: i8, y: i8) -> Option<usize> {
        if x < 0 || x >= BOARD_WIDTH as i8 || y < 0 || y >= BOARD_HEIGHT as i8 {
            return None;
        }
        Some((y as usize) * WIDTH + (x as usize))
    }

    pub fn width(&self) -> u8 {
        BOARD_WIDTH
    }

    pub fn height(&self) -> u8 {
        BOARD_HEIGHT
    }

    /// Get cell at position (x, y), None if out of bounds
    pub fn get(&self, x: i8, y: i8) -> Option<Cell> {
        Self::index(x, y).map(|idx| self.cells[idx])
    }

    /// Fallible cell query for callers that need to distinguish "empty"
    /// from "outside the grid". Hot paths bound-check themselves and use
    /// [`Board::get`] instead.
    pub fn cell(&self, x: i8, y: i8) -> Result<Cell, OutOfBounds> {
        self.get(x, y).ok_or(OutOfBounds { x, y })
    }

    /// Whether the cell at (x, y) is filled; errors outside the grid
    pub fn is_occupied(&self, x: i8, y: i8) -> Result<bool, OutOfBounds> {
        self.cell(x, y).map(|c| c.is_some())
    }

    /// Set cell at position (x, y); returns false if out of bounds
    pub fn set(&mut self, x: i8, y: i8, cell: Cell) -> bool {
        match Self::index(x, y) {
            Some(idx) => {
                self.cells[idx] = cell;
                true
            }
            None => false,
        }
    }

    /// Check if a row is completely filled
    pub fn is_row_full(&self, y: usize) -> bool {
        if y >= HEIGHT {
            return false;
        }
        let start = y * WIDTH;
        self.cells[start..start + WIDTH].iter().all(|c| c.is_some())
    }

    /// Remove row `y`: rows above shift down by one and an empty row is
    /// inserted at the top. Out-of-range rows are ignored.
    pub fn clear_row(&mut self, y: usize) {
        if y >= HEIGHT {
            return;
        }
        for row in (1..=y).rev() {
            let src = (row - 1) * WIDTH;
            let dst = row * WIDTH;
            self.cells.copy_within(src..src + WIDTH, dst);
        }
        self.fill_row(0, None);
    }

    /// Drop the top row: every row moves up by one and a fresh empty row
    /// appears at the bottom. Used when garbage enters from below.
    pub fn shift_rows_up(&mut self) {
        self.cells.copy_within(WIDTH.., 0);
        self.fill_row(HEIGHT - 1, None);
    }

    /// Drop the bottom row: every row moves down by one and a fresh empty
    /// row appears at the top.
    pub fn shift_rows_down(&mut self) {
        self.cells.copy_within(..BOARD_SIZE - WIDTH, WIDTH);
        self.fill_row(0, None);
    }

    /// Swap the contents of two rows (a row may swap with itself)
    pub fn swap_rows(&mut self, a: usize, b: usize) {
        if a >= HEIGHT || b >= HEIGHT || a == b {
            return;
        }
        let (lo, hi) = if a < b { (a, b) } else { (b, a) };
        let (head, tail) = self.cells.split_at_mut(hi * WIDTH);
        head[lo * WIDTH..lo * WIDTH + WIDTH].swap_with_slice(&mut tail[..WIDTH]);
    }

    /// Rotate a row's contents one cell left, wrapping
    pub fn rotate_row_left(&mut self, y: usize) {
        if let Some(row) = self.row_mut(y) {
            row.rotate_left(1);
        }
    }

    /// Rotate a row's contents one cell right, wrapping
    pub fn rotate_row_right(&mut self, y: usize) {
        if let Some(row) = self.row_mut(y) {
            row.rotate_right(1);
        }
    }

    /// Overwrite a whole row
    pub fn set_row(&mut self, y: usize, row: [Cell; WIDTH]) {
        if y >= HEIGHT {
            return;
        }
        self.cells[y * WIDTH..(y + 1) * WIDTH].copy_from_slice(&row);
    }

    /// Borrow a row's cells
    pub fn row(&self, y: usize) -> Option<&[Cell]> {
        if y >= HEIGHT {
            return None;
        }
        Some(&self.cells[y * WIDTH..(y + 1) * WIDTH])
    }

    fn row_mut(&mut self, y: usize) -> Option<&mut [Cell]> {
        if y >= HEIGHT {
            return None;
        }
        Some(&mut self.cells[y * WIDTH..(y + 1) * WIDTH])
    }

    fn fill_row(&mut self, y: usize, cell: Cell) {
        for c in &mut self.cells[y * WIDTH..(y + 1) * WIDTH] {
            *c = cell;
        }
    }

    /// Clear every cell in a column
    pub fn clear_column(&mut self, x: usize) {
        if x >= WIDTH {
            return;
        }
        for y in 0..HEIGHT {
            self.cells[y * WIDTH + x] = None;
        }
    }

    /// Compact every column downward: occupied cells fall to the bottom
    /// preserving their relative order, empties bubble to the top.
    pub fn compact_columns(&mut self) {
        for x in 0..WIDTH {
            let mut write = HEIGHT;
            for y in (0..HEIGHT).rev() {
                if let Some(color) = self.cells[y * WIDTH + x] {
                    write -= 1;
                    if write != y {
                        self.cells[write * WIDTH + x] = Some(color);
                        self.cells[y * WIDTH + x] = None;
                    }
                }
            }
        }
    }

    /// Replace the whole grid in place
    pub fn replace(&mut self, other: Board) {
        self.cells = other.cells;
    }

    /// Clear the entire board
    pub fn clear(&mut self) {
        for cell in &mut self.cells {
            *cell = None;
        }
    }

    /// True if no cell is occupied
    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(|c| c.is_none())
    }

    /// Number of occupied cells
    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    /// Get a reference to the internal cells array
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Write the numeric cell codes into a snapshot grid (0 = empty)
    pub fn write_codes(&self, out: &mut [[u8; WIDTH]; HEIGHT]) {
        for y in 0..HEIGHT {
            for x in 0..WIDTH {
                out[y][x] = self.cells[y * WIDTH + x].map(|c| c.code()).unwrap_or(0);
            }
        }
    }

    /// Create from a 2D vector for testing
    #[cfg(test)]
    pub fn from_rows(rows: Vec<Vec<Cell>>) -> Self {
        assert_eq!(rows.len(), HEIGHT);
        assert!(rows.iter().all(|row| row.len() == WIDTH));

        let mut flat = [None; BOARD_SIZE];
        for (y, row) in rows.iter().enumerate() {
            for (x, cell) in row.iter().enumerate() {
                flat[y * WIDTH + x] = *cell;
            }
        }
        Self { cells: flat }
    }

    /// Convert to a 2D vector for testing
    #[cfg(test)]
    pub fn to_rows(&self) -> Vec<Vec<Cell>> {
        (0..HEIGHT)
            .map(|y| self.cells[y * WIDTH..(y + 1) * WIDTH].to_vec())
            .collect()
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}
