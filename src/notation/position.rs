//! # Position notation
//!
//! A position is written as the side to move followed by the pieces of
//! both sides, separated by colons:
//!
//! ```text
//! B:W1,2,3,4,5,6,7,8,9,10,11,12:B21,22,23,24,25,26,27,28,29,30,31,32
//! ```
//!
//! Each side starts with its color letter, followed by a comma separated
//! list of square numbers. A `K` before a number marks a king. The two
//! sides may come in either order but must use different letters, and a
//! side may have no pieces left at all (`W:W8:B`).
//!
//! Positions are always written white first, with squares in ascending
//! order.

use std::{fmt::Display, str::FromStr};

use chumsky::prelude::*;
use regex::Regex;
use static_init::dynamic;

use crate::{
    error::NotationError,
    model::{Board, Player, Position, Square, geometry::ix_to_sq32},
    notation::{Parsable, Prs, square_number},
};

#[dynamic]
static POSITION_FORMAT: Regex =
    Regex::new(r"^(W|B)(:(W|B)(K?[0-9]+(,K?[0-9]+){0,31})?){2}$").unwrap();

/// A position as written, before any validation of its contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionNotation {
    pub turn: Player,
    pub sides: [SideNotation; 2],
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SideNotation {
    pub player: Player,
    pub pieces: Vec<PieceNotation>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PieceNotation {
    pub king: bool,
    pub square: u32,
}

impl Parsable for PieceNotation {
    fn parser<'s>() -> impl Prs<'s, Self> {
        just('K')
            .or_not()
            .then(square_number())
            .map(|(king, square)| Self {
                king: king.is_some(),
                square,
            })
    }
}

impl Parsable for SideNotation {
    fn parser<'s>() -> impl Prs<'s, Self> {
        Player::parser()
            .then(
                PieceNotation::parser()
                    .separated_by(just(','))
                    .collect::<Vec<_>>(),
            )
            .map(|(player, pieces)| Self { player, pieces })
    }
}

impl Parsable for PositionNotation {
    fn parser<'s>() -> impl Prs<'s, Self> {
        Player::parser()
            .then_ignore(just(':'))
            .then(SideNotation::parser())
            .then_ignore(just(':'))
            .then(SideNotation::parser())
            .map(|((turn, first), second)| Self {
                turn,
                sides: [first, second],
            })
    }
}

impl FromStr for PositionNotation {
    type Err = NotationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if !POSITION_FORMAT.is_match(s) {
            return Err(NotationError::PositionFormat(s.to_string()));
        }

        Self::parser()
            .then_ignore(end())
            .parse(s)
            .into_result()
            .map_err(|_| NotationError::PositionFormat(s.to_string()))
    }
}

impl TryFrom<&PositionNotation> for Position {
    type Error = NotationError;

    fn try_from(value: &PositionNotation) -> Result<Self, Self::Error> {
        let [first, second] = &value.sides;
        if first.player == second.player {
            return Err(NotationError::SameSideMarkers);
        }

        let mut board = Board::default();
        for side in &value.sides {
            for piece in &side.pieces {
                if !(1..=32).contains(&piece.square) {
                    return Err(NotationError::SquareOutOfRange(piece.square));
                }

                let ix = piece.square as u8 - 1;
                let sq = if piece.king {
                    Square::king(side.player)
                } else {
                    Square::man(side.player)
                };

                if !board.exchange(ix, sq).is_empty() {
                    return Err(NotationError::DuplicateSquare(piece.square as u8));
                }
            }
        }

        Ok(Position {
            board,
            turn: value.turn,
        })
    }
}

impl From<&Position> for PositionNotation {
    fn from(value: &Position) -> Self {
        let side = |player| SideNotation {
            player,
            pieces: value
                .board
                .pieces()
                .filter(|(_, sq)| sq.belongs_to(player))
                .map(|(ix, sq)| PieceNotation {
                    king: sq.is_king(),
                    square: ix_to_sq32(ix) as u32,
                })
                .collect(),
        };

        Self {
            turn: value.turn,
            sides: [side(Player::WHITE), side(Player::BLACK)],
        }
    }
}

impl Display for PieceNotation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.king {
            write!(f, "K{}", self.square)
        } else {
            write!(f, "{}", self.square)
        }
    }
}

impl Display for SideNotation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#}", self.player)?;
        for (i, piece) in self.pieces.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{piece}")?;
        }
        Ok(())
    }
}

impl Display for PositionNotation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let [first, second] = &self.sides;
        write!(f, "{:#}:{first}:{second}", self.turn)
    }
}

impl FromStr for Position {
    type Err = NotationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Position::try_from(&s.parse::<PositionNotation>()?)
    }
}

impl Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        PositionNotation::from(self).fmt(f)
    }
}

#[cfg(test)]
const START: &str = "B:W1,2,3,4,5,6,7,8,9,10,11,12:B21,22,23,24,25,26,27,28,29,30,31,32";

#[test]
fn start_position() {
    let pos: Position = START.parse().unwrap();
    assert_eq!(pos, Position::startpos());
    assert_eq!(pos.to_string(), START);
}

#[test]
fn round_trip() {
    for s in [
        "B:W1,3,8,9,10,16,17:B12,20,21,23,26,27,29,31",
        "W:WK4:B6,7,8,14,15,16,22,23,24",
        "W:WK7,K8:B16",
        "W:WK2:BK30",
        "B:W1,2,K7:B5,6,9,15",
        "W:W8:B",
    ] {
        let pos: Position = s.parse().unwrap();
        assert_eq!(pos.to_string(), s);
        assert_eq!(pos.to_string().parse::<Position>().unwrap(), pos);
    }
}

#[test]
fn crowded_sides_round_trip() {
    let s = "B:W1,2,3,4,5,6,7,8,9,10,11,12,K13:B32";
    let pos: Position = s.parse().unwrap();
    assert_eq!(pos.board.count(Player::WHITE), 13);
    assert_eq!(pos.to_string(), s);

    let mut full = Board::default();
    for ix in 0..32 {
        full.set(ix, Square::BLACK_KING);
    }
    let pos = Position {
        board: full,
        turn: Player::WHITE,
    };
    assert_eq!(pos.to_string().parse::<Position>().unwrap(), pos);
}

#[test]
fn sides_in_either_order() {
    let pos: Position = "W:BK14,29,30:W6,25".parse().unwrap();
    assert_eq!(pos.turn, Player::WHITE);
    assert_eq!(pos.board.get(13), Square::BLACK_KING);
    assert_eq!(pos.board.get(5), Square::WHITE_MAN);
    assert_eq!(pos.to_string(), "W:W6,25:BK14,29,30");
}

#[test]
fn rejected_positions() {
    use NotationError::*;

    let err = |s: &str| s.parse::<Position>().unwrap_err();

    assert_eq!(err(""), PositionFormat(String::new()));
    assert!(matches!(err("X:W1:B2"), PositionFormat(_)));
    assert!(matches!(err("B:W1,2"), PositionFormat(_)));
    assert!(matches!(err("B:W1,:B2"), PositionFormat(_)));
    assert!(matches!(err("B:Wk1:B2"), PositionFormat(_)));
    assert!(matches!(err("B:W1:B2:W3"), PositionFormat(_)));
    assert!(matches!(err(" B:W1:B2"), PositionFormat(_)));

    assert_eq!(err("B:W1,2:W3"), SameSideMarkers);
    assert_eq!(err("B:W0:B5"), SquareOutOfRange(0));
    assert_eq!(err("B:W1:B33"), SquareOutOfRange(33));
    assert_eq!(err("B:W1,5:B5"), DuplicateSquare(5));
}
