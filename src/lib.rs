//! Rules engine for 8x8 checkers, with the text notations, saved games and
//! opening books around it, and a runner for matches between external
//! engines.

use crate::model::{Position, perft::perft_divide};

#[test]
fn main_perft() {
    perft_divide(&Position::startpos(), 6).unwrap().pretty_print();
}

/// Playing engines against each other.
pub mod comparator;
/// The external engine protocol.
pub mod engine;
pub mod error;
/// Modeling the game of checkers.
pub mod model;
pub mod notation;
pub mod openings;
pub mod record;
