//! Move-square and class-label mapping.
//!
//! Moves are indexed by square 0..=63, row-major. The four starting squares
//! (27, 28, 35, 36) are occupied before the first move and can never be
//! played, so the classifier's output alphabet compacts the remaining 60
//! squares into class labels 0..=59, in ascending square order.

use thiserror::Error;

/// Total squares on the board.
pub const NUM_SQUARES: usize = 64;

/// Playable squares, i.e. the classifier's output alphabet size.
pub const NUM_CLASSES: usize = 60;

/// The four starting squares. No move class exists for these.
pub const START_SQUARES: [u8; 4] = [27, 28, 35, 36];

/// A square or class index outside the move-class domain.
///
/// Raised for the four starting squares, for square indices >= 64, and for
/// class indices >= 60. A move byte in this domain means the sample it came
/// from is corrupt.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("index {0} is outside the move-class domain")]
pub struct InvalidSquare(pub u8);

/// Map a move square to its class label.
///
/// Strictly increasing in the square index, with single-unit gaps across the
/// two excluded pairs (27/28 and 35/36).
pub fn square_to_class(square: u8) -> Result<u8, InvalidSquare> {
    match square {
        27 | 28 | 35 | 36 => Err(InvalidSquare(square)),
        s if s < 27 => Ok(s),
        s if s < 35 => Ok(s - 2),
        s if s < 64 => Ok(s - 4),
        s => Err(InvalidSquare(s)),
    }
}

/// Map a class label back to its move square.
///
/// Inverse of [`square_to_class`] over the valid domain.
pub fn class_to_square(class: u8) -> Result<u8, InvalidSquare> {
    match class {
        c if c < 27 => Ok(c),
        c if c < 33 => Ok(c + 2),
        c if c < 60 => Ok(c + 4),
        c => Err(InvalidSquare(c)),
    }
}

/// Pick the move square for a 60-way policy output, restricted to legal squares.
///
/// `legal` is a square-indexed bitboard supplied by the move generator; the
/// four starting squares are never set in any legal mask. Ties resolve to the
/// lowest class. Returns `None` when the mask asserts no playable square.
pub fn select_move(policy: &[f32; NUM_CLASSES], legal: u64) -> Option<u8> {
    let mut best: Option<(u8, f32)> = None;
    for class in 0..NUM_CLASSES as u8 {
        let square = match class_to_square(class) {
            Ok(s) => s,
            Err(_) => break,
        };
        if (legal >> square) & 1 == 0 {
            continue;
        }
        let p = policy[class as usize];
        match best {
            Some((_, bp)) if bp >= p => {}
            _ => best = Some((square, p)),
        }
    }
    best.map(|(square, _)| square)
}
