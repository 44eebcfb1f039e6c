//! Three-move openings.
//!
//! An openings file has one opening per line: three whitespace separated
//! moves played from the standard start. Blank lines are skipped. From it
//! we derive either the start positions of a match, or an opening book
//! mapping each position reached to the moves played from it.

use indexmap::{IndexMap, IndexSet};

use crate::{error::OpeningError, model::game::CheckersGame};

/// Moves per opening.
pub const OPENING_LENGTH: usize = 3;

fn openings(text: &str) -> impl Iterator<Item = (usize, Vec<&str>)> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| (i + 1, line.split_whitespace().collect()))
}

/// Play `moves` from the start, calling `visit` with the position before
/// each move and the move itself.
fn play_opening(
    line: usize,
    moves: &[&str],
    mut visit: impl FnMut(String, &str),
) -> Result<CheckersGame, OpeningError> {
    if moves.len() != OPENING_LENGTH {
        return Err(OpeningError::MoveCount { line });
    }

    let mut game = CheckersGame::new();
    for &mv in moves {
        visit(game.position_string(), mv);
        game.play(mv)
            .map_err(|source| OpeningError::Game { line, source })?;
    }

    Ok(game)
}

/// The position reached by each opening, in file order.
pub fn positions_from_openings(text: &str) -> Result<Vec<String>, OpeningError> {
    openings(text)
        .map(|(line, moves)| {
            play_opening(line, &moves, |_, _| ()).map(|game| game.position_string())
        })
        .collect()
}

/// Opening book: every position met while playing the openings, with the
/// distinct moves played from it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Book(pub IndexMap<String, IndexSet<String>>);

impl Book {
    pub fn moves(&self, position: &str) -> Option<&IndexSet<String>> {
        self.0.get(position)
    }
}

pub fn book_from_openings(text: &str) -> Result<Book, OpeningError> {
    let mut book = Book::default();

    for (line, moves) in openings(text) {
        play_opening(line, &moves, |position, mv| {
            book.0.entry(position).or_default().insert(mv.to_string());
        })?;
    }

    Ok(book)
}

impl std::fmt::Display for Book {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (position, moves) in &self.0 {
            f.write_str(position)?;
            for mv in moves {
                write!(f, " {mv}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
const OPENINGS: &str = "22x18 11x15 18x11\n\n22x18 10x14 23x19\n  \n22x18 10x14 24x20\n";

#[test]
fn positions() {
    let positions = positions_from_openings(OPENINGS).unwrap();
    assert_eq!(positions.len(), 3);
    assert_eq!(
        positions[0],
        "W:W1,2,3,4,5,6,7,8,9,10,12:B11,21,23,24,25,26,27,28,29,30,31,32"
    );
}

#[test]
fn book() {
    let book = book_from_openings(OPENINGS).unwrap();
    let start = crate::model::Position::startpos().to_string();

    assert_eq!(book.0.len(), 4);
    assert_eq!(book.moves(&start).unwrap().len(), 1);

    let rendered = book.to_string();
    let lines: Vec<_> = rendered.lines().collect();
    assert_eq!(lines[0], format!("{start} 22x18"));
    assert!(lines[1].ends_with(" 11x15 10x14"));
    assert!(lines[2].ends_with(" 18x11"));
    assert!(lines[3].ends_with(" 23x19 24x20"));
}

#[test]
fn malformed_openings() {
    assert_eq!(
        positions_from_openings("22x18 11x15\n"),
        Err(OpeningError::MoveCount { line: 1 })
    );
    assert!(matches!(
        book_from_openings("22x18 11x15 18x11\n22x18 11x15 18x14\n"),
        Err(OpeningError::Game { line: 2, .. })
    ));
}
