use std::{
    fmt::Display,
    time::{Duration, Instant},
};

use tracing::{debug, info, warn};

use crate::{
    engine::{
        EngineLink, EngineSettings,
        process::EngineProcess,
        protocol::{EngineMessage, HostCommand, ParameterKind},
    },
    error::EngineError,
};

/// A parameter as reported by the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineParameter {
    pub name: String,
    pub kind: ParameterKind,
    pub value: String,
}

impl Display for EngineParameter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} {}", self.name, self.kind, self.value)
    }
}

/// Outcome of a `GO`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult {
    /// `None` when the engine considers the game over.
    pub best_move: Option<String>,
    /// Deepest `INFO depth` reported during the search, 0 if none was.
    pub depth: u32,
}

/// The protocol conversations with one engine.
#[derive(Debug)]
pub struct Engine<L> {
    link: L,
    settings: EngineSettings,
}

impl<L: EngineLink> Engine<L> {
    pub fn new(link: L, settings: EngineSettings) -> Self {
        Self { link, settings }
    }

    pub fn link(&self) -> &L {
        &self.link
    }

    pub fn link_mut(&mut self) -> &mut L {
        &mut self.link
    }

    pub fn into_inner(self) -> L {
        self.link
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    async fn command(&mut self, command: HostCommand) -> Result<(), EngineError> {
        self.link.send(&command.to_string()).await
    }

    /// Read messages until `pick` accepts one, skipping the others.
    async fn expect<T>(
        &mut self,
        expected: &'static str,
        mut pick: impl FnMut(EngineMessage) -> Option<T>,
    ) -> Result<T, EngineError> {
        let timeout = self.settings.reply_timeout;
        let deadline = Instant::now() + timeout;

        loop {
            let left = deadline.saturating_duration_since(Instant::now());
            let Some(line) = self.link.receive(left).await? else {
                warn!(expected, "engine did not answer");
                return Err(EngineError::Timeout(timeout));
            };

            match pick(EngineMessage::parse(&line)) {
                Some(picked) => return Ok(picked),
                None => debug!(expected, %line, "skipped"),
            }
        }
    }

    pub async fn init(&mut self) -> Result<(), EngineError> {
        self.command(HostCommand::Init).await
    }

    /// Every parameter the engine declares, with its current value.
    pub async fn parameters(&mut self) -> Result<Vec<EngineParameter>, EngineError> {
        self.command(HostCommand::GetParameters).await?;
        let names = self
            .expect("PARAMETERS", |message| match message {
                EngineMessage::Parameters(names) => Some(names),
                _ => None,
            })
            .await?;

        let mut parameters = Vec::with_capacity(names.len());
        for name in names {
            self.command(HostCommand::GetParameter(name.clone())).await?;
            let parameter = self
                .expect("PARAMETER", |message| match message {
                    EngineMessage::Parameter { name, kind, value } => {
                        Some(EngineParameter { name, kind, value })
                    }
                    _ => None,
                })
                .await?;

            if parameter.name != name {
                return Err(EngineError::Unexpected {
                    expected: "PARAMETER",
                    got: parameter.to_string(),
                });
            }
            parameters.push(parameter);
        }

        Ok(parameters)
    }

    /// Apply `name=value` overrides for parameters in `known`.
    ///
    /// Malformed overrides and unknown names are logged and skipped. Returns
    /// the pairs that were sent.
    pub async fn set_parameters(
        &mut self,
        overrides: &[String],
        known: &[EngineParameter],
    ) -> Result<Vec<(String, String)>, EngineError> {
        let mut applied = Vec::new();

        for entry in overrides {
            let Some((name, value)) = entry.split_once('=') else {
                warn!(%entry, "invalid parameter override");
                continue;
            };
            if name.is_empty() || value.is_empty() || value.contains('=') {
                warn!(%entry, "invalid parameter override");
                continue;
            }
            if !known.iter().any(|parameter| parameter.name == name) {
                warn!(name, "engine has no such parameter");
                continue;
            }

            self.command(HostCommand::SetParameter {
                name: name.to_string(),
                value: value.to_string(),
            })
            .await?;
            info!(name, value, "parameter set");
            applied.push((name.to_string(), value.to_string()));
        }

        Ok(applied)
    }

    pub async fn name(&mut self) -> Result<String, EngineError> {
        self.command(HostCommand::GetName).await?;
        self.expect("NAME", |message| match message {
            EngineMessage::Name(name) => Some(name),
            _ => None,
        })
        .await
    }

    /// Start a game from `position`, or the standard start.
    pub async fn new_game(&mut self, position: Option<&str>) -> Result<(), EngineError> {
        self.command(HostCommand::NewGame(position.map(str::to_string)))
            .await
    }

    /// Tell the engine about its opponent's move.
    pub async fn play_move(&mut self, mv: &str) -> Result<(), EngineError> {
        self.command(HostCommand::Move(mv.to_string())).await
    }

    /// Ask for a move.
    ///
    /// With a think time, `STOP` is sent once it has elapsed and the engine
    /// then has the stop grace period to answer. Without one, the engine may
    /// think as long as it likes.
    pub async fn go(&mut self, think_time: Option<Duration>) -> Result<SearchResult, EngineError> {
        self.command(HostCommand::Go).await?;

        let started = Instant::now();
        let mut stopped: Option<Instant> = None;
        let mut depth = 0;

        loop {
            match stopped {
                Some(at) if at.elapsed() > self.settings.stop_grace => {
                    warn!("engine ignored STOP");
                    return Err(EngineError::Timeout(self.settings.stop_grace));
                }
                None if think_time.is_some_and(|limit| started.elapsed() >= limit) => {
                    debug!("think time is up");
                    self.command(HostCommand::Stop).await?;
                    stopped = Some(Instant::now());
                }
                _ => {}
            }

            let Some(line) = self.link.receive(self.settings.poll_interval).await? else {
                continue;
            };

            match EngineMessage::parse(&line) {
                EngineMessage::BestMove(best_move) => {
                    return Ok(SearchResult { best_move, depth });
                }
                EngineMessage::Info { depth: Some(reached) } => depth = depth.max(reached),
                EngineMessage::Info { depth: None } => {}
                _ => debug!(%line, "skipped while searching"),
            }
        }
    }
}

impl Engine<EngineProcess> {
    /// Start the engine at `path`.
    pub async fn start(path: &str, settings: EngineSettings) -> Result<Self, EngineError> {
        let process = EngineProcess::start(path, settings.clone()).await?;
        Ok(Self::new(process, settings))
    }

    pub async fn quit(self) -> Result<(), EngineError> {
        self.link.quit().await
    }
}

#[cfg(test)]
use crate::engine::fake::FakeEngine;

#[cfg(test)]
fn quick() -> EngineSettings {
    EngineSettings {
        reply_timeout: Duration::from_millis(200),
        poll_interval: Duration::from_millis(10),
        stop_grace: Duration::from_millis(200),
        ..Default::default()
    }
}

#[tokio::test]
async fn query_parameters_and_name() {
    let mut engine = Engine::new(FakeEngine::new("cherry"), quick());
    engine.init().await.unwrap();

    let parameters = engine.parameters().await.unwrap();
    assert_eq!(
        parameters
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>(),
        ["depth int 4", "style string calm"]
    );
    assert_eq!(engine.name().await.unwrap(), "cherry");
    assert_eq!(
        engine.link().sent,
        ["INIT", "GETPARAMETERS", "GETPARAMETER depth", "GETPARAMETER style", "GETNAME"]
    );
}

#[tokio::test]
async fn parameter_overrides() {
    let mut engine = Engine::new(FakeEngine::new("cherry"), quick());
    let known = engine.parameters().await.unwrap();

    let overrides = ["depth=7", "bogus=1", "nonsense", "style=", "depth=1=2"].map(String::from);
    let applied = engine.set_parameters(&overrides, &known).await.unwrap();

    assert_eq!(applied, [("depth".to_string(), "7".to_string())]);
    assert_eq!(engine.link().depth, 7);
    assert_eq!(engine.link().sent.last().unwrap(), "SETPARAMETER depth 7");
}

#[tokio::test]
async fn go_reports_deepest_search() {
    let mut engine = Engine::new(FakeEngine::new("cherry"), quick());
    engine.new_game(None).await.unwrap();

    let result = engine.go(None).await.unwrap();
    assert_eq!(
        result,
        SearchResult {
            best_move: Some("21x17".to_string()),
            depth: 4
        }
    );

    engine.play_move("9x13").await.unwrap();
    assert_eq!(
        engine.link().game.position_string(),
        "B:W1,2,3,4,5,6,7,8,10,11,12,13:B17,22,23,24,25,26,27,28,29,30,31,32"
    );
}

#[tokio::test]
async fn go_stops_after_think_time() {
    let mut fake = FakeEngine::new("cherry");
    fake.wait_for_stop = true;
    let mut engine = Engine::new(fake, quick());

    let result = engine.go(Some(Duration::from_millis(30))).await.unwrap();
    assert_eq!(result.best_move.as_deref(), Some("21x17"));
    assert_eq!(engine.link().sent, ["GO", "STOP"]);
}

#[tokio::test]
async fn go_on_finished_game() {
    let mut engine = Engine::new(FakeEngine::new("cherry"), quick());
    engine.new_game(Some("B:W1,2:B")).await.unwrap();

    let result = engine.go(None).await.unwrap();
    assert_eq!(result.best_move, None);
}

#[tokio::test]
async fn silent_engine() {
    let mut fake = FakeEngine::new("cherry");
    fake.mute = true;
    fake.wait_for_stop = true;
    let mut engine = Engine::new(fake, quick());

    assert!(matches!(
        engine.name().await,
        Err(EngineError::Timeout(_))
    ));
    assert!(matches!(
        engine.go(Some(Duration::from_millis(20))).await,
        Err(EngineError::Timeout(_))
    ));
}
