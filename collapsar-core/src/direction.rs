//! The four grid directions.
//!
//! A direction is an index in `0..4` with row/column offsets taken from the
//! tables below. The encoding is chosen so that the opposite of `d` is
//! `3 - d`; the propagator's supporter arithmetic relies on this.

/// Number of directions on the 2D grid.
pub const NUM_DIRECTIONS: usize = 4;

/// Row offset of each direction: up, left, right, down.
pub const DIRECTIONS_Y: [isize; NUM_DIRECTIONS] = [-1, 0, 0, 1];

/// Column offset of each direction: up, left, right, down.
pub const DIRECTIONS_X: [isize; NUM_DIRECTIONS] = [0, -1, 1, 0];

/// Returns the direction opposite to `direction`.
#[inline]
pub const fn opposite(direction: usize) -> usize {
    3 - direction
}
