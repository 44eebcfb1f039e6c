//! In-memory engine for tests.
//!
//! It keeps its own game, answers `GO` with the first legal move (or
//! `none` once the game is over), and records every line it was sent.

use std::{collections::VecDeque, time::Duration};

use crate::{
    engine::{EngineLink, protocol::EngineMessage},
    error::EngineError,
    model::game::CheckersGame,
};

pub struct FakeEngine {
    pub name: String,
    pub game: CheckersGame,
    pub sent: Vec<String>,
    pub outbox: VecDeque<String>,
    pub depth: u32,
    /// Answer `GO` only after `STOP`.
    pub wait_for_stop: bool,
    /// Never answer anything.
    pub mute: bool,
    /// Answered to `GO` instead of the first legal move.
    pub forced_move: Option<String>,
}

impl FakeEngine {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            game: CheckersGame::new(),
            sent: Vec::new(),
            outbox: VecDeque::from(["READY".to_string()]),
            depth: 4,
            wait_for_stop: false,
            mute: false,
            forced_move: None,
        }
    }

    fn best_move(&mut self) -> String {
        let best = match (&self.forced_move, self.game.legal_moves().first()) {
            (Some(mv), _) => format!("BESTMOVE {mv}"),
            (None, Some(mv)) if !self.game.game_over().is_over() => format!("BESTMOVE {mv}"),
            _ => "BESTMOVE none".to_string(),
        };

        if let EngineMessage::BestMove(Some(mv)) = EngineMessage::parse(&best) {
            // a forced illegal move is simply not played here
            let _ = self.game.play(&mv);
        }

        best
    }

    fn respond(&mut self, line: &str) {
        let mut tokens = line.split_whitespace();

        let replies = match tokens.next() {
            Some("GETPARAMETERS") => vec!["PARAMETERS depth style".to_string()],
            Some("GETPARAMETER") => match tokens.next() {
                Some("depth") => vec![format!("PARAMETER depth int {}", self.depth)],
                Some("style") => vec!["PARAMETER style string calm".to_string()],
                _ => vec![],
            },
            Some("SETPARAMETER") => {
                if let (Some("depth"), Some(value)) = (tokens.next(), tokens.next()) {
                    self.depth = value.parse().unwrap();
                }
                vec![]
            }
            Some("GETNAME") => vec![format!("NAME {}", self.name)],
            Some("NEWGAME") => {
                self.game.reset(tokens.next()).unwrap();
                vec![]
            }
            Some("MOVE") => {
                self.game.play(tokens.next().unwrap()).unwrap();
                vec![]
            }
            Some("GO") => {
                let mut replies = vec![
                    "INFO depth 1 nodes 7".to_string(),
                    format!("INFO depth {} nodes 300", self.depth),
                    "INFO nodes 310".to_string(),
                ];
                if !self.wait_for_stop {
                    replies.push(self.best_move());
                }
                replies
            }
            Some("STOP") if self.wait_for_stop => vec![self.best_move()],
            _ => vec![],
        };

        if !self.mute {
            self.outbox.extend(replies);
        }
    }
}

impl EngineLink for FakeEngine {
    async fn send(&mut self, line: &str) -> Result<(), EngineError> {
        self.sent.push(line.to_string());
        self.respond(line);
        Ok(())
    }

    async fn receive(&mut self, timeout: Duration) -> Result<Option<String>, EngineError> {
        match self.outbox.pop_front() {
            Some(line) => Ok(Some(line)),
            None => {
                tokio::time::sleep(timeout).await;
                Ok(None)
            }
        }
    }
}
