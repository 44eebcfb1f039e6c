use std::{
    process::Stdio,
    time::{Duration, Instant},
};

use tokio::{
    io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines},
    process::{Child, ChildStdin, ChildStdout, Command},
    time::timeout,
};
use tracing::{debug, info, warn};

use crate::{
    engine::{
        EngineLink, EngineSettings,
        protocol::{EngineMessage, HostCommand},
    },
    error::EngineError,
};

/// An engine running as a child process.
#[derive(Debug)]
pub struct EngineProcess {
    path: String,
    child: Child,
    stdin: ChildStdin,
    stdout: Lines<BufReader<ChildStdout>>,
    settings: EngineSettings,
}

impl EngineProcess {
    /// Spawn the engine at `path` and wait for it to say `READY`.
    ///
    /// An engine that is silent for longer than the start timeout is
    /// killed.
    pub async fn start(path: &str, settings: EngineSettings) -> Result<Self, EngineError> {
        let spawn_err = |source| EngineError::Spawn {
            path: path.to_string(),
            source,
        };

        let mut child = Command::new(path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(spawn_err)?;

        let (Some(stdin), Some(stdout)) = (child.stdin.take(), child.stdout.take()) else {
            return Err(spawn_err(std::io::Error::other("engine pipes unavailable")));
        };

        let mut engine = Self {
            path: path.to_string(),
            child,
            stdin,
            stdout: BufReader::new(stdout).lines(),
            settings,
        };

        let deadline = Instant::now() + engine.settings.start_timeout;
        loop {
            let left = deadline.saturating_duration_since(Instant::now());
            match engine.receive(left).await? {
                Some(line) if EngineMessage::parse(&line).is_ready() => break,
                Some(line) => debug!(path, %line, "ignored before READY"),
                None => {
                    warn!(path, "engine did not become ready, killing it");
                    engine.child.kill().await?;
                    return Err(EngineError::StartTimeout(engine.settings.start_timeout));
                }
            }
        }

        info!(path, "engine started");
        Ok(engine)
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Ask the engine to exit, killing it if it does not within the quit
    /// grace period.
    pub async fn quit(mut self) -> Result<(), EngineError> {
        if let Err(err) = self.send(&HostCommand::Quit.to_string()).await {
            warn!(path = %self.path, %err, "could not send QUIT");
        }

        match timeout(self.settings.quit_grace, self.child.wait()).await {
            Ok(status) => {
                let status = status?;
                info!(path = %self.path, %status, "engine stopped");
            }
            Err(_) => {
                warn!(path = %self.path, "engine ignored QUIT, killing it");
                self.child.kill().await?;
            }
        }

        Ok(())
    }
}

impl EngineLink for EngineProcess {
    async fn send(&mut self, line: &str) -> Result<(), EngineError> {
        debug!(path = %self.path, line, "host >");
        self.stdin.write_all(line.as_bytes()).await?;
        self.stdin.write_all(b"\n").await?;
        self.stdin.flush().await?;
        Ok(())
    }

    async fn receive(&mut self, wait: Duration) -> Result<Option<String>, EngineError> {
        match timeout(wait, self.stdout.next_line()).await {
            Err(_) => Ok(None),
            Ok(Ok(Some(line))) => {
                debug!(path = %self.path, %line, "engine <");
                Ok(Some(line))
            }
            Ok(Ok(None)) => Err(EngineError::Closed),
            Ok(Err(err)) => Err(err.into()),
        }
    }
}

#[cfg(all(test, unix))]
fn script_engine(name: &str, body: &str) -> std::path::PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = std::env::temp_dir().join(format!("kingrow-{name}-{}.sh", std::process::id()));
    std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

#[cfg(unix)]
#[tokio::test]
async fn process_round_trip() {
    let path = script_engine(
        "echo",
        "echo READY\nwhile read line; do\n  case \"$line\" in\n    QUIT) exit 0;;\n    GETNAME) echo NAME shell;;\n  esac\ndone",
    );

    let mut engine = EngineProcess::start(path.to_str().unwrap(), EngineSettings::default())
        .await
        .unwrap();
    engine.send("GETNAME").await.unwrap();
    let reply = engine.receive(Duration::from_secs(5)).await.unwrap();
    assert_eq!(reply.as_deref(), Some("NAME shell"));
    assert_eq!(engine.receive(Duration::from_millis(50)).await.unwrap(), None);

    engine.quit().await.unwrap();
    std::fs::remove_file(path).unwrap();
}

#[cfg(unix)]
#[tokio::test]
async fn silent_engine_times_out() {
    let path = script_engine("silent", "sleep 10");
    let settings = EngineSettings {
        start_timeout: Duration::from_millis(200),
        ..Default::default()
    };

    let err = EngineProcess::start(path.to_str().unwrap(), settings)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::StartTimeout(_)));
    std::fs::remove_file(path).unwrap();
}

#[cfg(unix)]
#[tokio::test]
async fn stubborn_engine_is_killed() {
    let path = script_engine("stubborn", "echo READY\nwhile true; do sleep 1; done");
    let settings = EngineSettings {
        quit_grace: Duration::from_millis(200),
        ..Default::default()
    };

    let engine = EngineProcess::start(path.to_str().unwrap(), settings)
        .await
        .unwrap();
    let started = Instant::now();
    engine.quit().await.unwrap();
    assert!(started.elapsed() < Duration::from_secs(3));

    std::fs::remove_file(path).unwrap();
}

#[tokio::test]
async fn missing_engine() {
    let err = EngineProcess::start("/nonexistent/kingrow-engine", EngineSettings::default())
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Spawn { .. }));
}
