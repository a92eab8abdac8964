use crate::config::{ROWS, ROW_INTERVALS, STEPS};

use super::grid::{Grid, HiHatPattern};
use super::notes::{transpose, Note};

/// Everything that fires on one step, already transposed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StepEvents {
    /// Melodic notes by grid row (at most one is `Some` while the grid is exclusive)
    pub notes: [Option<Note>; ROWS],
    /// Whether the hi-hat fires on this step
    pub hihat: bool,
}

impl StepEvents {
    pub fn melodic(&self) -> impl Iterator<Item = Note> + '_ {
        self.notes.iter().flatten().copied()
    }
}

/// The running sequence: a snapshot of grid, hi-hat pattern, root and pitch
/// offset resolved into per-step events.
///
/// Rebuilt from scratch whenever any of its inputs change. The tick position
/// lives in the transport, not here, so a rebuild never moves playback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StepSequence {
    steps: [StepEvents; STEPS],
}

impl StepSequence {
    pub fn build(grid: &Grid, hihat: &HiHatPattern, root: Note, pitch_offset: i32) -> Self {
        let mut steps = [StepEvents::default(); STEPS];

        for (col, events) in steps.iter_mut().enumerate() {
            for row in grid.active_rows(col) {
                events.notes[row] = Some(transpose(row_base_note(root, row), pitch_offset));
            }
            events.hihat = hihat.get(col);
        }

        Self { steps }
    }

    pub fn step(&self, index: usize) -> &StepEvents {
        &self.steps[index % STEPS]
    }

    pub fn len(&self) -> usize {
        STEPS
    }

    pub fn is_empty(&self) -> bool {
        self.steps
            .iter()
            .all(|s| !s.hihat && s.notes.iter().all(Option::is_none))
    }
}

/// Untransposed base note of a grid row for a given root.
pub fn row_base_note(root: Note, row: usize) -> Note {
    transpose(root, ROW_INTERVALS[row % ROWS])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_map_to_root_plus_interval() {
        assert_eq!(row_base_note(Note::C4, 0), Note::C4);
        assert_eq!(row_base_note(Note::C4, 1), Note(62));
        assert_eq!(row_base_note(Note::C4, 2), Note(64));
        assert_eq!(row_base_note(Note::C4, 3), Note(67));
    }

    #[test]
    fn build_applies_pitch_offset_without_touching_grid() {
        let mut grid = Grid::new();
        grid.toggle_cell(0, 0);
        grid.toggle_cell(3, 4);
        let before = grid;

        let seq = StepSequence::build(&grid, &HiHatPattern::new(), Note::C4, 2);

        assert_eq!(seq.step(0).melodic().collect::<Vec<_>>(), vec![Note(62)]);
        assert_eq!(seq.step(4).melodic().collect::<Vec<_>>(), vec![Note(69)]);
        assert_eq!(seq.step(1).melodic().count(), 0);
        assert_eq!(grid, before);
    }

    #[test]
    fn hihat_is_carried_per_step() {
        let mut hats = HiHatPattern::new();
        hats.toggle_step(2);
        let seq = StepSequence::build(&Grid::new(), &hats, Note::C4, 0);

        assert!(seq.step(2).hihat);
        assert!(!seq.step(3).hihat);
        assert!(!seq.is_empty());
    }
}
