//! Step grid and hi-hat pattern.
//!
//! The grid is `ROWS` pitch rows by `STEPS` columns. Each column holds at most
//! one active row, which makes the melodic voice monophonic: one note per step.
//! The hi-hat pattern runs alongside it with no such restriction.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::config::{ROWS, STEPS};

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Grid {
    cells: [[bool; STEPS]; ROWS],
}

impl Grid {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rows(&self) -> usize {
        ROWS
    }

    pub fn steps(&self) -> usize {
        STEPS
    }

    pub fn get(&self, row: usize, col: usize) -> bool {
        self.cells
            .get(row)
            .and_then(|r| r.get(col))
            .copied()
            .unwrap_or(false)
    }

    /// Select `row` in column `col`, or clear the column if `row` was already
    /// the active cell. Every other row in the column ends up false.
    ///
    /// Returns `false` (and leaves the grid untouched) for out-of-range indices.
    pub fn toggle_cell(&mut self, row: usize, col: usize) -> bool {
        if row >= ROWS || col >= STEPS {
            return false;
        }

        let was_active = self.cells[row][col];
        for r in 0..ROWS {
            self.cells[r][col] = false;
        }
        self.cells[row][col] = !was_active;
        true
    }

    /// The active row in a column, if any.
    pub fn active_row(&self, col: usize) -> Option<usize> {
        (0..ROWS).find(|&row| self.get(row, col))
    }

    /// Rows with an active cell in `col`, in row order.
    pub fn active_rows(&self, col: usize) -> impl Iterator<Item = usize> + '_ {
        (0..ROWS).filter(move |&row| self.get(row, col))
    }

    pub fn clear(&mut self) {
        self.cells = [[false; STEPS]; ROWS];
    }

    pub fn is_empty(&self) -> bool {
        self.cells.iter().flatten().all(|&cell| !cell)
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HiHatPattern {
    steps: [bool; STEPS],
}

impl HiHatPattern {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, step: usize) -> bool {
        self.steps.get(step).copied().unwrap_or(false)
    }

    /// Flip one step. Returns `false` for an out-of-range step.
    pub fn toggle_step(&mut self, step: usize) -> bool {
        match self.steps.get_mut(step) {
            Some(s) => {
                *s = !*s;
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.steps = [false; STEPS];
    }
}
