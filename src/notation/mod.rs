//! # Text notations
//!
//! Positions and moves are exchanged with engines and save files in two
//! compact ASCII notations, both numbering the playable squares 1 to 32
//! in reading order:
//!
//! - positions, as in `B:W1,2,K7:B21,22`, see [`position`];
//! - moves, as in `9x13` or `12x19x26`, see [`moves`].
//!
//! Each notation is first checked against a regular expression for its
//! overall shape, then parsed structurally into a notation value, and
//! finally validated into the model type with a typed
//! [`NotationError`](crate::error::NotationError).
//!
//! This module also renders a [`Board`] as an 8x8 text grid.

pub mod moves;
pub mod position;

use std::fmt::{Display, Write};

use chumsky::{error::EmptyErr, prelude::*};

use crate::model::{
    Board, Player, Square,
    geometry::{is_dark, sq32_to_ix, sq64_to_sq32},
};

/// Shorthand for a string parser with default error handling.
pub trait Prs<'s, T>: Parser<'s, &'s str, T> {}

impl<'s, T, P: Parser<'s, &'s str, T>> Prs<'s, T> for P {}

/// Types with a canonical text parser.
pub trait Parsable: Sized {
    fn parser<'s>() -> impl Prs<'s, Self>;
}

/// A decimal square number, not yet range checked.
pub fn square_number<'s>() -> impl Prs<'s, u32> {
    text::digits(10)
        .to_slice()
        .try_map(|digits: &str, _| digits.parse::<u32>().map_err(|_| EmptyErr::default()))
}

impl Parsable for Player {
    fn parser<'s>() -> impl Prs<'s, Self> {
        choice((just('B').to(Player::BLACK), just('W').to(Player::WHITE)))
    }
}

impl Square {
    /// Single letter used in board diagrams.
    pub fn letter(self) -> char {
        match self {
            Self::EMPTY => '.',
            Self::BLACK_MAN => 'b',
            Self::WHITE_MAN => 'w',
            Self::BLACK_KING => 'B',
            Self::WHITE_KING => 'W',
        }
    }
}

impl Display for Board {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for rank in 0..8u8 {
            for file in 0..8u8 {
                let cell = rank * 8 + file;
                if is_dark(cell) {
                    f.write_char(self.get(sq32_to_ix(sq64_to_sq32(cell))).letter())?;
                } else {
                    f.write_char(' ')?;
                }
            }
            f.write_char('\n')?;
        }
        Ok(())
    }
}

#[test]
fn square_number_parser() {
    let parse = |s: &str| square_number().then_ignore(end()).parse(s).into_output();
    assert_eq!(parse("7"), Some(7));
    assert_eq!(parse("032"), Some(32));
    assert_eq!(parse("99"), Some(99));
    assert_eq!(parse(""), None);
    assert_eq!(parse("K7"), None);
}

#[test]
fn board_diagram() {
    let board = crate::model::Position::startpos().board;
    let diagram = board.to_string();
    let rows: Vec<_> = diagram.lines().collect();

    assert_eq!(rows.len(), 8);
    assert_eq!(rows[0], " w w w w");
    assert_eq!(rows[1], "w w w w ");
    assert_eq!(rows[3], ". . . . ");
    assert_eq!(rows[4], " . . . .");
    assert_eq!(rows[7], "b b b b ");
}
