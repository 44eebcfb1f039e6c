use std::{
    collections::BTreeMap,
    time::{Duration, Instant},
};

use crate::{
    error::GameError,
    model::{Move, Position, movegen::generate_into},
};

/// Count the leaves of the legal move tree below `position`.
///
/// Fails only if a generated move disagrees with its own board.
pub fn perft(position: &Position, depth: usize) -> Result<usize, GameError> {
    if depth == 0 {
        return Ok(1);
    }

    let mut moves = Vec::with_capacity(16);
    generate_into(&position.board, position.turn, &mut moves);
    perft_recurse(position, depth, &moves)
}

fn child(position: &Position, mv: &Move) -> Result<Position, GameError> {
    let (board, _) = position.board.clone_make_move(position.turn, mv)?;
    Ok(Position {
        board,
        turn: position.turn.opp(),
    })
}

fn perft_recurse(position: &Position, depth: usize, moves: &[Move]) -> Result<usize, GameError> {
    if depth == 1 {
        return Ok(moves.len());
    }

    let mut res = 0;
    let mut buf = Vec::with_capacity(16);
    for mv in moves {
        let next = child(position, mv)?;

        buf.clear();
        generate_into(&next.board, next.turn, &mut buf);
        res += perft_recurse(&next, depth - 1, &buf)?;
    }

    Ok(res)
}

/// [`perft`] broken down by first move.
pub fn perft_divide(position: &Position, depth: usize) -> Result<PerfTestRes, GameError> {
    let now = Instant::now();
    let mut breakdown = BTreeMap::new();

    if depth != 0 {
        let mut firstmoves = Vec::new();
        generate_into(&position.board, position.turn, &mut firstmoves);

        for mv in &firstmoves {
            let next = child(position, mv)?;
            breakdown.insert(mv.to_string(), perft(&next, depth - 1)?);
        }
    }

    Ok(PerfTestRes {
        depth,
        elapsed_duration: now.elapsed(),
        breakdown,
    })
}

pub struct PerfTestRes {
    pub depth: usize,
    pub elapsed_duration: Duration,
    pub breakdown: BTreeMap<String, usize>,
}

impl PerfTestRes {
    pub fn nodes(&self) -> usize {
        self.breakdown.values().sum()
    }

    pub fn pretty_print(&self) {
        println!("Performance test depth {}", self.depth);
        for (mv, n) in &self.breakdown {
            println!("{}: {}", mv, n);
        }
        println!(
            "Time elapsed: {:.02}ms",
            self.elapsed_duration.as_secs_f64() * 1000.0
        );
        println!(
            "Nodes per second: {:.02}",
            self.nodes() as f64 / self.elapsed_duration.as_secs_f64()
        );
        println!("Nodes searched: {}", self.nodes())
    }
}

#[test]
fn perft_startpos() {
    let start = Position::startpos();
    let counts: Vec<_> = (0..=6).map(|depth| perft(&start, depth).unwrap()).collect();
    assert_eq!(counts, [1, 7, 49, 302, 1469, 7361, 36768]);
}

#[test]
fn perft_divide_startpos() {
    let res = perft_divide(&Position::startpos(), 3).unwrap();
    assert_eq!(res.breakdown.len(), 7);
    assert_eq!(res.nodes(), 302);
    assert!(res.breakdown.contains_key("22x18"));
    res.pretty_print();
}

#[test]
fn corrupt_moves_are_not_skipped() {
    let start = Position::startpos();
    let err = child(&start, &Move::Normal { from: 12, to: 16 }).unwrap_err();
    assert!(matches!(err, GameError::Invariant { square: 12, .. }));
}
