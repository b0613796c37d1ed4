//! ot-features: Bitboard-to-tensor feature encoding.

pub mod encode;
pub mod schema;

pub use encode::{encode_position, plane_from_mask, BoardTensor, Plane};
pub use schema::{BOARD_SIDE, CHANNELS, FEATURE_SCHEMA_ID};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_nonempty() {
        assert!(!VERSION.is_empty());
    }
}
