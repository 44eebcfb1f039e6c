//! # Talking to engines
//!
//! An engine is an independent program playing checkers over a line
//! based text protocol on its standard input and output. The host sends
//! [`HostCommand`](protocol::HostCommand)s and reads
//! [`EngineMessage`](protocol::EngineMessage)s back:
//!
//! ```text
//! host                      engine
//!                           READY
//! INIT
//! GETPARAMETERS
//!                           PARAMETERS depth
//! GETPARAMETER depth
//!                           PARAMETER depth int 6
//! NEWGAME B:W1,2,...:B...,32
//! GO
//!                           INFO depth 5
//!                           BESTMOVE 22x18
//! QUIT
//! ```
//!
//! The transport is abstracted by [`EngineLink`], implemented for real
//! processes by [`EngineProcess`](process::EngineProcess). The protocol
//! conversations live in [`Engine`](session::Engine).

pub mod process;
pub mod protocol;
pub mod session;

#[cfg(test)]
pub(crate) mod fake;

use std::{future::Future, time::Duration};

use crate::error::EngineError;

/// A line oriented connection to an engine.
pub trait EngineLink {
    /// Send one line; the newline is added.
    fn send(&mut self, line: &str) -> impl Future<Output = Result<(), EngineError>> + Send;

    /// Wait up to `timeout` for the next line. `Ok(None)` means nothing
    /// arrived in time.
    fn receive(
        &mut self,
        timeout: Duration,
    ) -> impl Future<Output = Result<Option<String>, EngineError>> + Send;
}

/// Timing of an engine conversation.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineSettings {
    /// How long a started engine has to say `READY`.
    pub start_timeout: Duration,
    /// How long to wait for the answer to a query.
    pub reply_timeout: Duration,
    /// Granularity of waiting for a move.
    pub poll_interval: Duration,
    /// How long after `STOP` the engine has to name its move.
    pub stop_grace: Duration,
    /// How long after `QUIT` the engine has to exit before it is killed.
    pub quit_grace: Duration,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            start_timeout: Duration::from_secs(3),
            reply_timeout: Duration::from_secs(10),
            poll_interval: Duration::from_millis(100),
            stop_grace: Duration::from_secs(5),
            quit_grace: Duration::from_secs(5),
        }
    }
}
