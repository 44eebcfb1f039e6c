use std::{path::Path, time::Duration};

use serde::{Deserialize, Serialize};

use crate::{engine::EngineSettings, error::ComparatorError, model::Position};

/// A match file.
///
/// ```toml
/// positions = ["B:W1,2,3,4,5,6,7,8,9,10,11,12:B21,22,23,24,25,26,27,28,29,30,31,32"]
/// max_think_time = 2.5
/// black_parameters = ["depth=6"]
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MatchFile {
    /// Start positions; each is played twice, once per color assignment.
    pub positions: Vec<String>,
    /// Seconds an engine may think about a move. Unlimited when absent.
    #[serde(default)]
    pub max_think_time: Option<f64>,
    /// Seconds a started engine has to become ready.
    #[serde(default)]
    pub engine_start_timeout: Option<f64>,
    /// `name=value` overrides for the black engine.
    #[serde(default)]
    pub black_parameters: Vec<String>,
    #[serde(default)]
    pub white_parameters: Vec<String>,
}

fn seconds(name: &'static str, value: Option<f64>) -> Result<Option<Duration>, ComparatorError> {
    value
        .map(|value| {
            Duration::try_from_secs_f64(value).map_err(|_| ComparatorError::Setting { name, value })
        })
        .transpose()
}

impl MatchFile {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ComparatorError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ComparatorError::File {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&text)
    }

    /// Parse and check a match file.
    pub fn parse(text: &str) -> Result<Self, ComparatorError> {
        let file: Self = toml::from_str(text)?;

        if file.positions.is_empty() {
            return Err(ComparatorError::NoPositions);
        }
        for position in &file.positions {
            position
                .parse::<Position>()
                .map_err(|err| ComparatorError::Position {
                    position: position.clone(),
                    source: err.into(),
                })?;
        }
        file.think_time()?;
        file.engine_settings()?;

        Ok(file)
    }

    pub fn think_time(&self) -> Result<Option<Duration>, ComparatorError> {
        seconds("max_think_time", self.max_think_time)
    }

    pub fn engine_settings(&self) -> Result<EngineSettings, ComparatorError> {
        let mut settings = EngineSettings::default();
        if let Some(timeout) = seconds("engine_start_timeout", self.engine_start_timeout)? {
            settings.start_timeout = timeout;
        }
        Ok(settings)
    }
}

#[test]
fn minimal_match_file() {
    let file = MatchFile::parse("positions = [\"W:WK2:BK30\"]").unwrap();

    assert_eq!(file.positions, ["W:WK2:BK30"]);
    assert_eq!(file.think_time().unwrap(), None);
    assert!(file.black_parameters.is_empty());
    assert_eq!(file.engine_settings().unwrap(), EngineSettings::default());
}

#[test]
fn full_match_file() {
    let file = MatchFile::parse(
        r#"
positions = ["W:WK2:BK30", "B:W18:B14"]
max_think_time = 0.5
engine_start_timeout = 10
black_parameters = ["depth=6"]
white_parameters = ["depth=4", "style=wild"]
"#,
    )
    .unwrap();

    assert_eq!(file.positions.len(), 2);
    assert_eq!(file.think_time().unwrap(), Some(Duration::from_millis(500)));
    assert_eq!(
        file.engine_settings().unwrap().start_timeout,
        Duration::from_secs(10)
    );
    assert_eq!(file.white_parameters, ["depth=4", "style=wild"]);
}

#[test]
fn rejected_match_files() {
    assert!(matches!(
        MatchFile::parse("positions = []"),
        Err(ComparatorError::NoPositions)
    ));
    assert!(matches!(
        MatchFile::parse("positions = [\"X:W1:B2\"]"),
        Err(ComparatorError::Position { .. })
    ));
    assert!(matches!(
        MatchFile::parse("positions = [\"W:WK2:BK30\"]\nmax_think_time = -1.0"),
        Err(ComparatorError::Setting { name: "max_think_time", .. })
    ));
    assert!(matches!(
        MatchFile::parse("position = [\"W:WK2:BK30\"]"),
        Err(ComparatorError::Config(_))
    ));
}
