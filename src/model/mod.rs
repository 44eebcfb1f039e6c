//! # Modeling the game of checkers.
//!
//! This module contains the small value types of the 32-square
//! checkers variant, as well as the rules machinery in its
//! sub-modules.

use strum::{EnumIs, FromRepr, VariantArray};

pub mod game;
pub mod geometry;
pub mod hash;
pub mod movegen;
pub mod moving;
pub mod perft;

/// The contents of one playable square.
///
/// The discriminants form a small bitfield: bit 0 marks a black piece,
/// bit 1 a white piece, and bit 2 a king. The two color bits are never
/// both set, and an empty square is zero.
#[allow(non_camel_case_types)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, FromRepr, VariantArray)]
#[repr(u8)]
pub enum Square {
    #[default]
    EMPTY = 0b000,
    BLACK_MAN = 0b001,
    WHITE_MAN = 0b010,
    BLACK_KING = 0b101,
    WHITE_KING = 0b110,
}

impl Square {
    const KING_BIT: u8 = 0b100;

    /// Use as an array index into tables of the five states.
    #[inline]
    pub fn ix(self) -> usize {
        match self {
            Self::EMPTY => 0,
            Self::BLACK_MAN => 1,
            Self::WHITE_MAN => 2,
            Self::BLACK_KING => 3,
            Self::WHITE_KING => 4,
        }
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self == Self::EMPTY
    }

    #[inline]
    pub fn is_king(self) -> bool {
        self as u8 & Self::KING_BIT != 0
    }

    /// True if this square holds a piece belonging to `player`.
    #[inline]
    pub fn belongs_to(self, player: Player) -> bool {
        self as u8 & player as u8 != 0
    }

    /// The owner of the piece, if any.
    pub fn owner(self) -> Option<Player> {
        Player::VARIANTS
            .iter()
            .copied()
            .find(|&player| self.belongs_to(player))
    }

    /// The man of the given color.
    #[inline]
    pub fn man(player: Player) -> Self {
        match player {
            Player::BLACK => Self::BLACK_MAN,
            Player::WHITE => Self::WHITE_MAN,
        }
    }

    /// The king of the given color.
    #[inline]
    pub fn king(player: Player) -> Self {
        match player {
            Player::BLACK => Self::BLACK_KING,
            Player::WHITE => Self::WHITE_KING,
        }
    }

    /// Promote a man to a king, leaving kings and empty squares as they are.
    #[inline]
    pub fn crowned(self) -> Self {
        if self.is_empty() {
            self
        } else {
            Self::from_repr(self as u8 | Self::KING_BIT).unwrap_or(self)
        }
    }
}

/// Representation of the two sides.
///
/// The discriminants are the color bits of [`Square`].
#[allow(non_camel_case_types)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, EnumIs, VariantArray)]
#[repr(u8)]
pub enum Player {
    BLACK = 0b01,
    WHITE = 0b10,
}

impl Player {
    /// Opposing side.
    #[inline]
    pub fn opp(self) -> Self {
        match self {
            Self::BLACK => Self::WHITE,
            Self::WHITE => Self::BLACK,
        }
    }

    /// The row on which this side's men are crowned.
    #[inline]
    pub fn crowning_row(self) -> u8 {
        match self {
            Self::BLACK => 0,
            Self::WHITE => 7,
        }
    }
}

/// The 32 playable squares, indexed 0..31 in reading order.
///
/// Row `i / 4` of square `i` runs from 0 at the top of the board
/// (where black men are crowned) to 7 at the bottom (where white
/// men are crowned).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(transparent)]
pub struct Board(pub [Square; 32]);

impl Board {
    /// Number of playable squares.
    pub const SIZE: usize = 32;

    #[inline]
    pub fn get(&self, ix: u8) -> Square {
        self.0[ix as usize]
    }

    #[inline]
    pub fn set(&mut self, ix: u8, sq: Square) {
        self.0[ix as usize] = sq
    }

    /// Write `sq` to `ix`, returning what was there.
    #[inline]
    pub fn exchange(&mut self, ix: u8, sq: Square) -> Square {
        std::mem::replace(&mut self.0[ix as usize], sq)
    }

    #[inline]
    pub fn swap(&mut self, a: u8, b: u8) {
        self.0.swap(a as usize, b as usize)
    }

    /// Iterate over the occupied squares as `(index, contents)`.
    pub fn pieces(&self) -> impl Iterator<Item = (u8, Square)> + '_ {
        self.0
            .iter()
            .enumerate()
            .filter(|(_, sq)| !sq.is_empty())
            .map(|(ix, &sq)| (ix as u8, sq))
    }

    /// Number of pieces belonging to `player`.
    pub fn count(&self, player: Player) -> usize {
        self.0.iter().filter(|sq| sq.belongs_to(player)).count()
    }
}

/// A board snapshot paired with the side to move.
///
/// This is the unit of the position notation, and the key used to
/// detect threefold repetition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    pub board: Board,
    pub turn: Player,
}

impl Position {
    /// The standard starting position, black to move.
    pub fn startpos() -> Self {
        let mut board = Board::default();
        for ix in 0..12 {
            board.set(ix, Square::WHITE_MAN);
        }
        for ix in 20..32 {
            board.set(ix, Square::BLACK_MAN);
        }
        Self {
            board,
            turn: Player::BLACK,
        }
    }
}

/// Representation of a move, in 0-based square indices.
///
/// Moves are compared structurally; a proposed move is legal exactly
/// when it equals one of the moves produced by
/// [`movegen::generate`](crate::model::movegen::generate) for the
/// current position.
#[derive(Debug, Clone, PartialEq, Eq, Hash, EnumIs)]
pub enum Move {
    /// A single diagonal step without capturing.
    Normal { from: u8, to: u8 },
    /// One continuous chain of jumps. `to` is never empty, and lists
    /// every landing square in order.
    Capture { from: u8, to: Vec<u8> },
}

impl Move {
    /// The square the moving piece starts on.
    #[inline]
    pub fn source(&self) -> u8 {
        match self {
            Self::Normal { from, .. } | Self::Capture { from, .. } => *from,
        }
    }

    /// The square the moving piece ends up on.
    #[inline]
    pub fn destination(&self) -> u8 {
        match self {
            Self::Normal { to, .. } => *to,
            Self::Capture { from, to } => to.last().copied().unwrap_or(*from),
        }
    }
}

/// Terminal status of a game.
#[allow(non_camel_case_types)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GameOver {
    #[default]
    NONE,
    WINNER_BLACK,
    WINNER_WHITE,
    TIE,
}

impl GameOver {
    #[inline]
    pub fn is_over(self) -> bool {
        self != Self::NONE
    }

    /// The outcome where `player` has won.
    #[inline]
    pub fn winner(player: Player) -> Self {
        match player {
            Player::BLACK => Self::WINNER_BLACK,
            Player::WHITE => Self::WINNER_WHITE,
        }
    }
}

impl std::fmt::Display for GameOver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::NONE => "in progress",
            Self::WINNER_BLACK => "winner black",
            Self::WINNER_WHITE => "winner white",
            Self::TIE => "tie between both players",
        })
    }
}

impl std::fmt::Display for Player {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if f.alternate() {
            match *self {
                Self::BLACK => write!(f, "B"),
                Self::WHITE => write!(f, "W"),
            }
        } else {
            match *self {
                Self::BLACK => write!(f, "black"),
                Self::WHITE => write!(f, "white"),
            }
        }
    }
}

#[test]
fn square_bitfield() {
    assert_eq!(Square::BLACK_MAN.crowned(), Square::BLACK_KING);
    assert_eq!(Square::WHITE_MAN.crowned(), Square::WHITE_KING);
    assert_eq!(Square::WHITE_KING.crowned(), Square::WHITE_KING);
    assert_eq!(Square::EMPTY.crowned(), Square::EMPTY);

    assert_eq!(Square::BLACK_KING.owner(), Some(Player::BLACK));
    assert_eq!(Square::WHITE_MAN.owner(), Some(Player::WHITE));
    assert_eq!(Square::EMPTY.owner(), None);

    for sq in Square::VARIANTS {
        assert!(!(sq.belongs_to(Player::BLACK) && sq.belongs_to(Player::WHITE)));
    }
}

#[test]
fn startpos_layout() {
    let pos = Position::startpos();
    assert_eq!(pos.board.count(Player::BLACK), 12);
    assert_eq!(pos.board.count(Player::WHITE), 12);
    assert!(pos.board.get(12).is_empty());
    assert!(pos.board.get(19).is_empty());
    assert_eq!(pos.turn, Player::BLACK);
}
