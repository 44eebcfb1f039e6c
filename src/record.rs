//! Saved games.
//!
//! A saved game is the starting position and the moves played from it,
//! both in their text notations, stored as JSON:
//!
//! ```json
//! {"position": "B:W1,2,3,4,5,6,7,8,9,10,11,12:B21,22,23,24,25,26,27,28,29,30,31,32",
//!  "moves": ["22x18", "11x15"]}
//! ```

use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::{
    error::{GameError, RecordError},
    model::{Move, Position, game::CheckersGame},
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedGame {
    pub position: String,
    pub moves: Vec<String>,
}

impl SavedGame {
    pub fn from_game(start: &Position, moves: &[Move]) -> Self {
        Self {
            position: start.to_string(),
            moves: moves.iter().map(Move::to_string).collect(),
        }
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, RecordError> {
        let text = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), RecordError> {
        fs::write(path, serde_json::to_string(self)?)?;
        Ok(())
    }

    /// Play every move from the stored position.
    pub fn replay(&self) -> Result<CheckersGame, GameError> {
        self.replay_to(self.moves.len())
    }

    /// Play only the first `n` moves from the stored position.
    pub fn replay_to(&self, n: usize) -> Result<CheckersGame, GameError> {
        let mut game = CheckersGame::from_notation(&self.position)?;
        for mv in self.moves.iter().take(n) {
            game.play(mv)?;
        }
        Ok(game)
    }

    /// The moves grouped in numbered turns, as in `3. 22x18 11x15`.
    ///
    /// Turns are counted from the side to move in the stored position.
    pub fn numbered_moves(&self) -> Vec<String> {
        self.moves
            .chunks(2)
            .enumerate()
            .map(|(i, pair)| format!("{}. {}", i + 1, pair.join(" ")))
            .collect()
    }
}

#[cfg(test)]
fn sample() -> SavedGame {
    SavedGame {
        position: Position::startpos().to_string(),
        moves: ["22x18", "11x15", "18x11", "8x15"]
            .map(String::from)
            .to_vec(),
    }
}

#[test]
fn replay_and_step() {
    let saved = sample();

    let game = saved.replay().unwrap();
    assert_eq!(game.board().count(crate::model::Player::BLACK), 11);
    assert_eq!(game.board().count(crate::model::Player::WHITE), 11);

    let halfway = saved.replay_to(2).unwrap();
    assert_eq!(
        halfway.position_string(),
        "B:W1,2,3,4,5,6,7,8,9,10,12,15:B18,21,23,24,25,26,27,28,29,30,31,32"
    );

    assert_eq!(saved.replay_to(0).unwrap().position(), Position::startpos());
    assert_eq!(saved.numbered_moves(), ["1. 22x18 11x15", "2. 18x11 8x15"]);
}

#[test]
fn bad_records_fail_to_replay() {
    let mut saved = sample();
    saved.moves[2] = "18x14".to_string();
    assert_eq!(
        saved.replay().unwrap_err(),
        GameError::IllegalMove("18x14".to_string())
    );

    saved.position = "B:W1".to_string();
    assert!(matches!(saved.replay(), Err(GameError::Notation(_))));
}

#[test]
fn save_and_load() {
    let game = CheckersGame::new();
    let moves = vec![game.legal_moves()[0].clone()];
    let saved = SavedGame::from_game(&game.position(), &moves);
    assert_eq!(saved.moves, ["21x17"]);

    let path = std::env::temp_dir().join(format!("kingrow-saved-{}.json", std::process::id()));
    saved.save(&path).unwrap();
    let loaded = SavedGame::load(&path).unwrap();
    fs::remove_file(&path).unwrap();

    assert_eq!(loaded, saved);
    assert!(SavedGame::load(&path).is_err());
}
