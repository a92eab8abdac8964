use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::Error;

/*
Notes and Transposition
=======================

A note is a MIDI note number. Middle C (C4) = 60, A4 = 69 = 440 Hz.

The formula: note_number = 12 * (octave + 1) + semitone
Where semitone: C=0, C#=1, D=2, D#=3, E=4, F=5, F#=6, G=7, G#=8, A=9, A#=10, B=11

Notes are stored as i32 rather than u8 so that transposition is plain integer
addition and always invertible:

  transpose(transpose(n, k), -k) == n     for every k

Voices clamp into the playable MIDI range (0-127) only when they render, so a
temporarily out-of-range note never loses information.

Example usage:
  let root: Note = "C4".parse()?;
  let third = root.transpose(4);   // E4
  assert_eq!(third.to_string(), "E4");
*/

const NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Note(pub i32);

impl Note {
    pub const C4: Note = Note(60);
    pub const A4: Note = Note(69);
    pub const C5: Note = Note(72);

    /// Shift by a signed number of semitones.
    pub fn transpose(self, semitones: i32) -> Note {
        Note(self.0.wrapping_add(semitones))
    }

    /// Frequency in Hz, A4 = 440.
    pub fn to_freq(self) -> f32 {
        440.0 * 2.0_f32.powf((self.0 as f32 - 69.0) / 12.0)
    }

    pub fn octave(self) -> i32 {
        self.0.div_euclid(12) - 1
    }

    pub fn pitch_class(self) -> usize {
        self.0.rem_euclid(12) as usize
    }
}

/// Free-function form used by the scheduler and the display alike.
#[inline]
pub fn transpose(note: Note, semitones: i32) -> Note {
    note.transpose(semitones)
}

impl fmt::Display for Note {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", NAMES[self.pitch_class()], self.octave())
    }
}

impl FromStr for Note {
    type Err = Error;

    /// Parse scientific pitch notation: `C4`, `F#3`, `Eb5`, `A-1`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || Error::InvalidNote(s.to_string());
        let mut chars = s.trim().chars().peekable();

        let letter = chars.next().ok_or_else(invalid)?;
        let mut semitone: i32 = match letter.to_ascii_uppercase() {
            'C' => 0,
            'D' => 2,
            'E' => 4,
            'F' => 5,
            'G' => 7,
            'A' => 9,
            'B' => 11,
            _ => return Err(invalid()),
        };

        match chars.peek() {
            Some('#') => {
                semitone += 1;
                chars.next();
            }
            Some('b') => {
                semitone -= 1;
                chars.next();
            }
            _ => {}
        }

        let octave: i32 = chars.collect::<String>().parse().map_err(|_| invalid())?;
        let midi = octave
            .checked_add(1)
            .and_then(|o| o.checked_mul(12))
            .and_then(|n| n.checked_add(semitone))
            .ok_or_else(invalid)?;
        Ok(Note(midi))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transpose_by_zero_is_identity() {
        for n in -20..150 {
            assert_eq!(transpose(Note(n), 0), Note(n));
        }
    }

    #[test]
    fn transpose_is_invertible() {
        for n in [0, 21, 60, 127] {
            for k in -48..=48 {
                assert_eq!(transpose(transpose(Note(n), k), -k), Note(n));
            }
        }
        assert_eq!(transpose(transpose(Note(60), i32::MAX), -i32::MAX), Note(60));
    }

    #[test]
    fn parses_and_prints_pitch_names() {
        assert_eq!("C4".parse::<Note>().unwrap(), Note::C4);
        assert_eq!("A4".parse::<Note>().unwrap(), Note::A4);
        assert_eq!("F#3".parse::<Note>().unwrap(), Note(54));
        assert_eq!("Eb5".parse::<Note>().unwrap(), Note(75));
        assert_eq!(Note(61).to_string(), "C#4");
        assert_eq!(Note(0).to_string(), "C-1");
        assert!("H2".parse::<Note>().is_err());
        assert!("C".parse::<Note>().is_err());
        assert_eq!(
            "C2147483647".parse::<Note>(),
            Err(Error::InvalidNote("C2147483647".into()))
        );
        assert!("Cb-2147483648".parse::<Note>().is_err());
    }

    #[test]
    fn a4_is_440() {
        assert!((Note::A4.to_freq() - 440.0).abs() < 1e-3);
        assert!((Note::A4.transpose(12).to_freq() - 880.0).abs() < 1e-2);
    }
}
