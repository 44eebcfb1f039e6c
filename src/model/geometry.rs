//! Diagonal geometry of the 32-square board.
//!
//! The move generator works purely in the 0..31 index space with
//! `row = ix / 4`. Even rows are shifted one file to the right of odd
//! rows on the underlying 8x8 grid, so the index delta to a diagonal
//! neighbor depends on the parity of the row:
//!
//! ```text
//!            even row      odd row
//!  NW  NE    -4  -3        -5  -4
//!  SW  SE    +4  +5        +3  +4
//! ```
//!
//! The bijections to the 8x8 grid are only needed at the rendering and
//! notation boundary.

use strum::VariantArray;

use crate::model::Player;

/// The four diagonal directions. North is towards row 0.
#[allow(non_camel_case_types)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, VariantArray)]
pub enum Direction {
    NORTHEAST,
    NORTHWEST,
    SOUTHEAST,
    SOUTHWEST,
}

/// Length of a diagonal hop: one row for a step, two rows for a jump.
#[allow(non_camel_case_types)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Diagonal {
    SHORT = 1,
    LONG = 2,
}

impl Direction {
    /// Directions a piece may travel in, in generation order.
    ///
    /// Men only move forward: black north, white south. Kings use all four.
    #[inline]
    pub fn for_piece(player: Player, king: bool) -> &'static [Direction] {
        use Direction::*;
        match (king, player) {
            (true, _) => &[NORTHEAST, NORTHWEST, SOUTHEAST, SOUTHWEST],
            (false, Player::BLACK) => &[NORTHEAST, NORTHWEST],
            (false, Player::WHITE) => &[SOUTHEAST, SOUTHWEST],
        }
    }

    /// Index deltas of the first and second row crossed, for a square
    /// on an even or odd row.
    #[inline]
    fn deltas(self, even_row: bool) -> (i32, i32) {
        use Direction::*;
        match (self, even_row) {
            (NORTHEAST, true) => (-3, -4),
            (NORTHEAST, false) => (-4, -3),
            (NORTHWEST, true) => (-4, -5),
            (NORTHWEST, false) => (-5, -4),
            (SOUTHEAST, true) => (5, 4),
            (SOUTHEAST, false) => (4, 5),
            (SOUTHWEST, true) => (4, 3),
            (SOUTHWEST, false) => (3, 4),
        }
    }
}

/// Row of a 0-based square index.
#[inline]
pub fn row(ix: u8) -> u8 {
    ix / 4
}

/// The square reached by travelling `diagonal` from `ix` in `direction`.
///
/// Returns `None` when the hop leaves the board, including wrapping
/// around the left or right edge, which shows up as a row distance
/// different from the diagonal length.
pub fn offset(ix: u8, direction: Direction, diagonal: Diagonal) -> Option<u8> {
    let start = ix as i32;
    let (first, second) = direction.deltas(row(ix) % 2 == 0);
    let end = match diagonal {
        Diagonal::SHORT => start + first,
        Diagonal::LONG => start + first + second,
    };

    if !(0..32).contains(&end) {
        return None;
    }

    if (start / 4).abs_diff(end / 4) != diagonal as u32 {
        return None;
    }

    Some(end as u8)
}

/// 1-based square number to 0-based index.
#[inline]
pub fn sq32_to_ix(n: u8) -> u8 {
    n - 1
}

/// 0-based index to 1-based square number.
#[inline]
pub fn ix_to_sq32(ix: u8) -> u8 {
    ix + 1
}

/// 1-based square number (1..=32) to its cell on the 0..63 grid.
#[inline]
pub fn sq32_to_sq64(n: u8) -> u8 {
    if ((n - 1) / 4) % 2 == 0 {
        n * 2 - 1
    } else {
        (n - 1) * 2
    }
}

/// Dark cell of the 0..63 grid back to its 1-based square number.
#[inline]
pub fn sq64_to_sq32(ix: u8) -> u8 {
    if ix % 2 == 1 { (ix + 1) / 2 } else { ix / 2 + 1 }
}

/// Split a grid cell into `(file, rank)`, rank 0 being the top row.
#[inline]
pub fn coords(sq64: u8) -> (u8, u8) {
    (sq64 % 8, sq64 / 8)
}

/// True for the dark (playable) cells of the 8x8 grid.
#[inline]
pub fn is_dark(sq64: u8) -> bool {
    let (file, rank) = coords(sq64);
    (file + rank) % 2 == 1
}

/// The square jumped over between two 1-based squares a jump apart.
///
/// The parity of the starting square's row decides which way the
/// midpoint of the two square numbers is rounded.
#[inline]
pub fn jumped_square(a: u8, b: u8) -> u8 {
    let sum = a + b;
    if row(sq32_to_ix(a)) % 2 == 0 {
        (sum + 1) / 2
    } else {
        (sum - 1) / 2
    }
}

#[test]
fn grid_bijection() {
    for n in 1..=32 {
        let cell = sq32_to_sq64(n);
        assert!(is_dark(cell), "square {n} mapped to light cell {cell}");
        assert_eq!(sq64_to_sq32(cell), n);
    }
    assert_eq!(sq32_to_sq64(1), 1);
    assert_eq!(sq32_to_sq64(5), 8);
    assert_eq!(sq32_to_sq64(32), 62);
}

#[test]
fn step_offsets() {
    use Diagonal::*;
    use Direction::*;

    assert_eq!(offset(9, NORTHEAST, SHORT), Some(6));
    assert_eq!(offset(9, NORTHWEST, SHORT), Some(5));
    assert_eq!(offset(9, SOUTHEAST, SHORT), Some(14));
    assert_eq!(offset(9, SOUTHWEST, SHORT), Some(13));

    assert_eq!(offset(9, NORTHEAST, LONG), Some(2));
    assert_eq!(offset(9, SOUTHWEST, LONG), Some(16));

    // Left and right edges do not wrap.
    assert_eq!(offset(4, NORTHWEST, SHORT), None);
    assert_eq!(offset(4, SOUTHWEST, SHORT), None);
    assert_eq!(offset(3, SOUTHWEST, SHORT), Some(7));
    assert_eq!(offset(3, SOUTHEAST, SHORT), None);
    assert_eq!(offset(3, SOUTHEAST, LONG), None);
    assert_eq!(offset(11, NORTHEAST, SHORT), None);

    // Top and bottom edges.
    assert_eq!(offset(1, NORTHEAST, SHORT), None);
    assert_eq!(offset(30, SOUTHWEST, SHORT), None);
    assert_eq!(offset(5, NORTHEAST, LONG), None);
}

#[test]
fn jumped_square_matches_geometry() {
    for ix in 0..32u8 {
        for &dir in Direction::VARIANTS {
            let (Some(mid), Some(land)) = (
                offset(ix, dir, Diagonal::SHORT),
                offset(ix, dir, Diagonal::LONG),
            ) else {
                continue;
            };
            assert_eq!(
                jumped_square(ix_to_sq32(ix), ix_to_sq32(land)),
                ix_to_sq32(mid),
                "jump {ix} -> {land}"
            );
        }
    }
}
