//! # Move notation
//!
//! A move is a list of at least two square numbers separated by `x`,
//! such as `9x13` or `12x19x26`. The legacy separator `-` is accepted as
//! a synonym; moves are always written with `x`.
//!
//! The separator does not decide what kind of move is meant. The
//! distance between the first two squares does: a step to a neighbor is
//! a normal move, and a jump over one is a capture, whose remaining
//! squares are the further landing squares of the chain.

use std::{fmt::Display, str::FromStr};

use chumsky::prelude::*;
use regex::Regex;
use static_init::dynamic;

use crate::{
    error::NotationError,
    model::{Move, geometry::ix_to_sq32},
    notation::{Parsable, Prs, square_number},
};

#[dynamic]
static MOVE_FORMAT: Regex = Regex::new(r"^([0-9]+[x-])+[0-9]+$").unwrap();

/// The square numbers of a move as written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveNotation(pub Vec<u32>);

impl Parsable for MoveNotation {
    fn parser<'s>() -> impl Prs<'s, Self> {
        square_number()
            .separated_by(one_of("x-"))
            .at_least(2)
            .collect::<Vec<_>>()
            .map(Self)
    }
}

impl FromStr for MoveNotation {
    type Err = NotationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if !MOVE_FORMAT.is_match(s) {
            return Err(NotationError::MoveFormat(s.to_string()));
        }

        Self::parser()
            .then_ignore(end())
            .parse(s)
            .into_result()
            .map_err(|_| NotationError::MoveFormat(s.to_string()))
    }
}

impl TryFrom<&MoveNotation> for Move {
    type Error = NotationError;

    fn try_from(value: &MoveNotation) -> Result<Self, Self::Error> {
        let squares = value
            .0
            .iter()
            .map(|&n| {
                if (1..=32).contains(&n) {
                    Ok(n as u8 - 1)
                } else {
                    Err(NotationError::SquareOutOfRange(n))
                }
            })
            .collect::<Result<Vec<u8>, _>>()?;

        let &[from, to, ..] = squares.as_slice() else {
            return Err(NotationError::MoveFormat(value.to_string()));
        };

        match from.abs_diff(to) {
            3..=5 if squares.len() == 2 => Ok(Move::Normal { from, to }),
            3..=5 => Err(NotationError::NormalMoveLength(squares.len())),
            7 | 9 => Ok(Move::Capture {
                from,
                to: squares[1..].to_vec(),
            }),
            _ => Err(NotationError::BadStepDistance {
                from: ix_to_sq32(from),
                to: ix_to_sq32(to),
            }),
        }
    }
}

impl From<&Move> for MoveNotation {
    fn from(value: &Move) -> Self {
        let squares = match value {
            Move::Normal { from, to } => vec![*from, *to],
            Move::Capture { from, to } => std::iter::once(*from).chain(to.iter().copied()).collect(),
        };
        Self(squares.into_iter().map(|ix| ix_to_sq32(ix) as u32).collect())
    }
}

impl Display for MoveNotation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, n) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("x")?;
            }
            write!(f, "{n}")?;
        }
        Ok(())
    }
}

impl FromStr for Move {
    type Err = NotationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Move::try_from(&s.parse::<MoveNotation>()?)
    }
}

impl Display for Move {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        MoveNotation::from(self).fmt(f)
    }
}

#[test]
fn normal_moves() {
    assert_eq!("9x13".parse::<Move>(), Ok(Move::Normal { from: 8, to: 12 }));
    assert_eq!("22-18".parse::<Move>(), Ok(Move::Normal { from: 21, to: 17 }));
    assert_eq!(Move::Normal { from: 21, to: 17 }.to_string(), "22x18");
}

#[test]
fn capture_moves() {
    let mv: Move = "12x19x26".parse().unwrap();
    assert_eq!(
        mv,
        Move::Capture {
            from: 11,
            to: vec![18, 25]
        }
    );
    assert_eq!(mv.to_string(), "12x19x26");

    assert_eq!(
        "21-14".parse::<Move>(),
        Ok(Move::Capture {
            from: 20,
            to: vec![13]
        })
    );
}

#[test]
fn every_generated_move_round_trips() {
    use crate::model::{Position, movegen::generate};

    for s in [
        "B:W1,2,3,4,5,6,7,8,9,10,11,12:B21,22,23,24,25,26,27,28,29,30,31,32",
        "B:W1,3,8,9,10,16,17:B12,20,21,23,26,27,29,31",
        "W:WK4:B6,7,8,14,15,16,22,23,24",
        "W:WK7,K8:B16",
    ] {
        let pos: Position = s.parse().unwrap();
        for mv in generate(&pos.board, pos.turn) {
            assert_eq!(mv.to_string().parse::<Move>(), Ok(mv));
        }
    }
}

#[test]
fn rejected_moves() {
    use NotationError::*;

    let err = |s: &str| s.parse::<Move>().unwrap_err();

    assert!(matches!(err("9"), MoveFormat(_)));
    assert!(matches!(err("9x"), MoveFormat(_)));
    assert!(matches!(err("x9x13"), MoveFormat(_)));
    assert!(matches!(err("9 x 13"), MoveFormat(_)));
    assert!(matches!(err("9xx13"), MoveFormat(_)));

    assert_eq!(err("0x4"), SquareOutOfRange(0));
    assert_eq!(err("29x33"), SquareOutOfRange(33));
    assert_eq!(err("9x13x17"), NormalMoveLength(3));
    assert_eq!(err("1x2"), BadStepDistance { from: 1, to: 2 });
    assert_eq!(err("1x32"), BadStepDistance { from: 1, to: 32 });
}
