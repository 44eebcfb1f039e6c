//! # Engine comparator
//!
//! Plays two engines against each other from every position of a
//! [`MatchFile`](config::MatchFile): once with the first engine as black,
//! then a rematch with the colors swapped. Every move an engine names is
//! checked against a local [`CheckersGame`], which also decides when and how
//! each game ends.

pub mod config;
pub mod report;

use std::time::{Duration, Instant};

use chrono::Local;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::{
    comparator::{
        config::MatchFile,
        report::{EngineStats, MatchEnding, MatchPair, MatchReport, MatchResult},
    },
    engine::{EngineLink, session::Engine},
    error::ComparatorError,
    model::{Player, game::CheckersGame},
};

/// An engine with the file it was started from.
#[derive(Debug)]
pub struct Contestant<L> {
    pub engine: Engine<L>,
    pub file_name: String,
}

impl<L: EngineLink> Contestant<L> {
    pub fn new(engine: Engine<L>, file_name: &str) -> Self {
        Self {
            engine,
            file_name: file_name.to_string(),
        }
    }

    /// Initialize the engine, apply `overrides` and describe it.
    async fn prepare(&mut self, overrides: &[String]) -> Result<EngineStats, ComparatorError> {
        self.engine.init().await?;

        let known = self.engine.parameters().await?;
        self.engine.set_parameters(overrides, &known).await?;

        let parameters = self.engine.parameters().await?;
        for parameter in &parameters {
            info!(engine = %self.file_name, %parameter, "parameter");
        }

        Ok(EngineStats {
            file_name: self.file_name.clone(),
            name: self.engine.name().await?,
            parameters: parameters.iter().map(ToString::to_string).collect(),
        })
    }
}

pub struct Comparator<L> {
    /// Black in the first match of each position, white in the rematch.
    contestants: [Contestant<L>; 2],
    cancel: CancellationToken,
}

impl<L: EngineLink> Comparator<L> {
    pub fn new(black: Contestant<L>, white: Contestant<L>, cancel: CancellationToken) -> Self {
        Self {
            contestants: [black, white],
            cancel,
        }
    }

    pub fn into_contestants(self) -> [Contestant<L>; 2] {
        self.contestants
    }

    /// Play every position of `file` twice.
    pub async fn run(&mut self, file: &MatchFile) -> Result<MatchReport, ComparatorError> {
        let think_time = file.think_time()?;
        let [black, white] = &mut self.contestants;
        let black_engine = black.prepare(&file.black_parameters).await?;
        let white_engine = white.prepare(&file.white_parameters).await?;

        let mut matches = Vec::with_capacity(file.positions.len());
        for (i, position) in file.positions.iter().enumerate() {
            info!(position, "position {}/{}", i + 1, file.positions.len());

            let first = self.play(position, 0, think_time).await?;
            info!(ending = %first.ending, moves = first.played_moves.len(), "match over");
            let rematch = self.play(position, 1, think_time).await?;
            info!(ending = %rematch.ending, moves = rematch.played_moves.len(), "rematch over");

            matches.push(MatchPair { first, rematch });
        }

        let report = MatchReport {
            black_engine,
            white_engine,
            matches,
            datetime: Local::now().format("%Y-%m-%d %H-%M-%S").to_string(),
        };

        let score = report.score();
        info!(
            black_engine = score.black_engine,
            white_engine = score.white_engine,
            ties = score.ties,
            "all matches over"
        );

        Ok(report)
    }

    /// Stop with [`ComparatorError::Cancelled`] if the token fires first.
    async fn cancellable<T, E: Into<ComparatorError>>(
        cancel: &CancellationToken,
        work: impl Future<Output = Result<T, E>>,
    ) -> Result<T, ComparatorError> {
        tokio::select! {
            _ = cancel.cancelled() => Err(ComparatorError::Cancelled),
            result = work => result.map_err(Into::into),
        }
    }

    /// One game from `position` with contestant `black` playing black.
    async fn play(
        &mut self,
        position: &str,
        black: usize,
        think_time: Option<Duration>,
    ) -> Result<MatchResult, ComparatorError> {
        let mut game =
            CheckersGame::from_notation(position).map_err(|source| ComparatorError::Position {
                position: position.to_string(),
                source,
            })?;

        for contestant in &mut self.contestants {
            contestant.engine.new_game(Some(position)).await?;
        }

        let started = Instant::now();
        let mut played_moves = Vec::new();

        let ending = loop {
            if let Some(ending) = MatchEnding::from_game_over(game.game_over()) {
                break ending;
            }
            if self.cancel.is_cancelled() {
                return Err(ComparatorError::Cancelled);
            }

            let current = match game.turn() {
                Player::BLACK => black,
                Player::WHITE => 1 - black,
            };
            let [first, second] = &mut self.contestants;
            let (mover, other) = match current {
                0 => (first, second),
                _ => (second, first),
            };

            let search = Self::cancellable(&self.cancel, mover.engine.go(think_time)).await?;

            let Some(notation) = search.best_move else {
                let answer = Self::cancellable(&self.cancel, other.engine.go(None)).await?;

                return Err(ComparatorError::Disagreement(match answer.best_move {
                    Some(_) => format!(
                        "{} says the game is over, {} does not",
                        mover.file_name, other.file_name
                    ),
                    None => format!(
                        "the engines say the game is over, but {} is still going",
                        game.position_string()
                    ),
                }));
            };

            let mv = game
                .play(&notation)
                .map_err(|source| ComparatorError::IllegalMove {
                    engine: mover.file_name.clone(),
                    source,
                })?;
            debug!(engine = %mover.file_name, %mv, depth = search.depth, "played");

            other.engine.play_move(&notation).await?;
            played_moves.push(mv.to_string());
        };

        Ok(MatchResult {
            position: position.to_string(),
            time: started.elapsed().as_secs_f64(),
            ending,
            played_moves,
        })
    }
}

#[cfg(test)]
use crate::engine::{EngineSettings, fake::FakeEngine};

#[cfg(test)]
fn contestant(name: &str) -> Contestant<FakeEngine> {
    let settings = EngineSettings {
        reply_timeout: Duration::from_millis(500),
        poll_interval: Duration::from_millis(10),
        ..Default::default()
    };
    Contestant::new(Engine::new(FakeEngine::new(name), settings), name)
}

#[cfg(test)]
fn match_file(overrides: &str) -> MatchFile {
    MatchFile::parse(&format!("positions = [\"B:W5:B14,23\"]\n{overrides}")).unwrap()
}

#[tokio::test]
async fn full_match() {
    let mut comparator = Comparator::new(
        contestant("alpha"),
        contestant("beta"),
        CancellationToken::new(),
    );
    let report = comparator
        .run(&match_file("black_parameters = [\"depth=6\", \"speed=2\"]"))
        .await
        .unwrap();

    assert_eq!(report.black_engine.name, "alpha");
    assert_eq!(
        report.black_engine.parameters,
        ["depth int 6", "style string calm"]
    );
    assert_eq!(report.white_engine.parameters[0], "depth int 4");

    let pair = &report.matches[0];
    assert_eq!(
        pair.first.played_moves,
        ["14x10", "5x9", "10x7", "9x14", "7x3", "14x18", "23x14"]
    );
    assert_eq!(pair.first.ending, MatchEnding::WINNER_BLACK);
    assert_eq!(pair.rematch.ending, MatchEnding::WINNER_BLACK);
    assert_eq!(report.score().black_engine, 1);
    assert_eq!(report.score().white_engine, 1);

    let [alpha, beta] = comparator.into_contestants();
    let alpha = alpha.engine.into_inner().sent;
    assert!(alpha.contains(&"SETPARAMETER depth 6".to_string()));
    assert!(!alpha.iter().any(|line| line.contains("speed")));
    assert_eq!(
        beta.engine.link().sent.iter().filter(|line| *line == "NEWGAME B:W5:B14,23").count(),
        2
    );
}

#[tokio::test]
async fn illegal_engine_move() {
    let mut alpha = contestant("alpha");
    alpha.engine.link_mut().forced_move = Some("14x18".to_string());
    let mut comparator = Comparator::new(alpha, contestant("beta"), CancellationToken::new());

    let err = comparator.run(&match_file("")).await.unwrap_err();
    assert!(matches!(
        err,
        ComparatorError::IllegalMove { ref engine, .. } if engine == "alpha"
    ));
}

#[tokio::test]
async fn premature_game_over() {
    let mut alpha = contestant("alpha");
    alpha.engine.link_mut().forced_move = Some("none".to_string());
    let mut comparator = Comparator::new(alpha, contestant("beta"), CancellationToken::new());

    let err = comparator.run(&match_file("")).await.unwrap_err();
    assert!(matches!(err, ComparatorError::Disagreement(_)));
}

#[tokio::test]
async fn cancelled_match() {
    let cancel = CancellationToken::new();
    cancel.cancel();
    let mut comparator = Comparator::new(contestant("alpha"), contestant("beta"), cancel);

    let err = comparator.run(&match_file("")).await.unwrap_err();
    assert!(matches!(err, ComparatorError::Cancelled));
}

#[tokio::test]
async fn both_engines_end_a_running_game() {
    let mut alpha = contestant("alpha");
    let mut beta = contestant("beta");
    alpha.engine.link_mut().forced_move = Some("none".to_string());
    beta.engine.link_mut().forced_move = Some("none".to_string());
    let mut comparator = Comparator::new(alpha, beta, CancellationToken::new());

    let err = comparator.run(&match_file("")).await.unwrap_err();
    assert!(matches!(
        err,
        ComparatorError::Disagreement(ref message) if message.contains("is still going")
    ));
}
