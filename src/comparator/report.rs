use std::path::{Path, PathBuf};

use serde::Serialize;
use strum::Display;

use crate::{error::ComparatorError, model::GameOver};

/// How a game between two engines ended.
#[allow(non_camel_case_types)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
pub enum MatchEnding {
    #[serde(rename = "winner black")]
    #[strum(serialize = "winner black")]
    WINNER_BLACK,
    #[serde(rename = "winner white")]
    #[strum(serialize = "winner white")]
    WINNER_WHITE,
    #[serde(rename = "tie between both players")]
    #[strum(serialize = "tie between both players")]
    TIE,
}

impl MatchEnding {
    /// `None` while the game is still going.
    pub fn from_game_over(game_over: GameOver) -> Option<Self> {
        match game_over {
            GameOver::NONE => None,
            GameOver::WINNER_BLACK => Some(Self::WINNER_BLACK),
            GameOver::WINNER_WHITE => Some(Self::WINNER_WHITE),
            GameOver::TIE => Some(Self::TIE),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchResult {
    pub position: String,
    /// Seconds.
    pub time: f64,
    pub ending: MatchEnding,
    pub played_moves: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EngineStats {
    pub file_name: String,
    pub name: String,
    /// `name type value` of every parameter.
    pub parameters: Vec<String>,
}

/// The two games played from one position.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchPair {
    /// The black engine plays black.
    #[serde(rename = "match")]
    pub first: MatchResult,
    /// The black engine plays white.
    pub rematch: MatchResult,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchReport {
    /// The engine given first, which plays black in every first match.
    pub black_engine: EngineStats,
    pub white_engine: EngineStats,
    pub matches: Vec<MatchPair>,
    pub datetime: String,
}

/// Games won by each engine over a whole report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Score {
    pub black_engine: usize,
    pub white_engine: usize,
    pub ties: usize,
}

impl MatchReport {
    pub fn score(&self) -> Score {
        let mut score = Score::default();

        for pair in &self.matches {
            match pair.first.ending {
                MatchEnding::WINNER_BLACK => score.black_engine += 1,
                MatchEnding::WINNER_WHITE => score.white_engine += 1,
                MatchEnding::TIE => score.ties += 1,
            }
            match pair.rematch.ending {
                MatchEnding::WINNER_BLACK => score.white_engine += 1,
                MatchEnding::WINNER_WHITE => score.black_engine += 1,
                MatchEnding::TIE => score.ties += 1,
            }
        }

        score
    }

    pub fn file_name(&self) -> String {
        format!("match {}.json", self.datetime)
    }

    /// Write the report as pretty JSON into `dir`, returning the file's path.
    pub fn write(&self, dir: impl AsRef<Path>) -> Result<PathBuf, ComparatorError> {
        let path = dir.as_ref().join(self.file_name());
        let json = serde_json::to_string_pretty(self)?;

        std::fs::write(&path, json).map_err(|source| ComparatorError::File {
            path: path.display().to_string(),
            source,
        })?;

        Ok(path)
    }
}

#[cfg(test)]
fn sample_report() -> MatchReport {
    let stats = |name: &str| EngineStats {
        file_name: format!("./{name}"),
        name: name.to_string(),
        parameters: vec!["depth int 4".to_string()],
    };
    let result = |ending| MatchResult {
        position: "W:WK2:BK30".to_string(),
        time: 1.5,
        ending,
        played_moves: vec!["2x7".to_string()],
    };

    MatchReport {
        black_engine: stats("alpha"),
        white_engine: stats("beta"),
        matches: vec![
            MatchPair {
                first: result(MatchEnding::WINNER_BLACK),
                rematch: result(MatchEnding::WINNER_BLACK),
            },
            MatchPair {
                first: result(MatchEnding::TIE),
                rematch: result(MatchEnding::WINNER_BLACK),
            },
        ],
        datetime: "2024-05-01 12-00-00".to_string(),
    }
}

#[test]
fn score() {
    assert_eq!(
        sample_report().score(),
        Score {
            black_engine: 1,
            white_engine: 2,
            ties: 1
        }
    );
}

#[test]
fn report_json() {
    let dir = std::env::temp_dir().join(format!("kingrow-report-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();

    let path = sample_report().write(&dir).unwrap();
    assert_eq!(path.file_name().unwrap(), "match 2024-05-01 12-00-00.json");

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(json["black_engine"]["name"], "alpha");
    assert_eq!(json["matches"][0]["match"]["ending"], "winner black");
    assert_eq!(
        json["matches"][1]["match"]["ending"],
        "tie between both players"
    );
    assert_eq!(json["matches"][0]["rematch"]["played_moves"][0], "2x7");

    std::fs::remove_dir_all(dir).unwrap();
}

#[test]
fn endings() {
    assert_eq!(MatchEnding::from_game_over(GameOver::NONE), None);
    assert_eq!(
        MatchEnding::from_game_over(GameOver::TIE).unwrap().to_string(),
        "tie between both players"
    );
}
