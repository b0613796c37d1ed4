//! Board tensor schema.
//!
//! The classifier consumes a channels-last 8x8x2 binary grid: channel 0 is
//! black occupancy, channel 1 is white occupancy.
//!
//! ### Orientation
//! Cell `(row, col)` holds bit `56 - 8*row + col` of the side's bitboard.
//! Equivalently: the mask is expanded most-significant-bit first into eight
//! rows of eight digits, and each row is then mirrored left to right. The
//! same bit-to-coordinate mapping is assumed by the move-class alphabet, so
//! it must never change independently of it.

/// Increment this whenever the tensor layout changes.
pub const FEATURE_SCHEMA_ID: u32 = 1;

/// Board edge length.
pub const BOARD_SIDE: usize = 8;

/// Occupancy channels (black, white).
pub const CHANNELS: usize = 2;
