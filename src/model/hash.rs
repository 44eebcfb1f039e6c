//! Zobrist hashing of checkers positions.
//!
//! The tables are generated once from a fixed seed, so hashes are stable
//! between runs. The hash is what [`Board`] and [`Position`] feed to
//! [`Hasher`]s; equality is still a full comparison of the squares.

use std::{
    hash::{Hash, Hasher},
    sync::LazyLock,
};

use rand::{Rng, RngCore, SeedableRng, rngs::SmallRng};

use crate::model::{Board, Player, Position, Square};

#[derive(Debug, Clone)]
pub struct ZobristTables {
    /// Indexed by square index, then [`Square::ix`].
    pub squares: [[u64; 5]; 32],
    pub white_to_move: u64,
}

pub fn pi_rng() -> SmallRng {
    SmallRng::from_seed(*b"3.141592653589793238462643383279")
}

impl ZobristTables {
    pub fn new() -> Self {
        let mut pi = pi_rng();

        let mut squares = [[0; 5]; 32];
        for square in &mut squares {
            pi.fill(&mut square[1..]);
        }

        let white_to_move = pi.next_u64();

        Self {
            squares,
            white_to_move,
        }
    }

    #[inline]
    pub fn hash_square(&self, ix: u8, sq: Square) -> u64 {
        self.squares[ix as usize][sq.ix()]
    }

    pub fn hash_board(&self, board: &Board) -> u64 {
        board
            .pieces()
            .fold(0, |acc, (ix, sq)| acc ^ self.hash_square(ix, sq))
    }
}

impl Default for ZobristTables {
    fn default() -> Self {
        Self::new()
    }
}

pub static ZOBRIST: LazyLock<ZobristTables> = LazyLock::new(ZobristTables::new);

impl Board {
    /// Zobrist hash of the pieces alone.
    pub fn zobrist(&self) -> u64 {
        ZOBRIST.hash_board(self)
    }
}

impl Position {
    /// Zobrist hash of the pieces and the side to move.
    pub fn zobrist(&self) -> u64 {
        let turn = if self.turn == Player::WHITE {
            ZOBRIST.white_to_move
        } else {
            0
        };
        self.board.zobrist() ^ turn
    }
}

impl Hash for Board {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.zobrist());
    }
}

#[test]
fn empty_squares_hash_to_zero() {
    assert_eq!(Board::default().zobrist(), 0);
    for ix in 0..32 {
        assert_eq!(ZOBRIST.hash_square(ix, Square::EMPTY), 0);
    }
}

#[test]
fn zobrist_distinguishes_turn_and_kings() {
    let start = Position::startpos();
    let mut white = start;
    white.turn = Player::WHITE;
    assert_ne!(start.zobrist(), white.zobrist());

    let mut crowned = start;
    crowned.board.set(20, Square::BLACK_KING);
    assert_ne!(start.board.zobrist(), crowned.board.zobrist());

    assert_eq!(start.zobrist(), Position::startpos().zobrist());
}
