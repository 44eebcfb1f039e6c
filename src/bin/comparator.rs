//! Play two checkers engines against each other.
//!
//! ```text
//! comparator match.toml ./engine_a ./engine_b
//! ```
//!
//! Writes `match <datetime>.json` into the output directory when all games
//! are over. Ctrl-C aborts the match; the engines are still shut down.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use kingrow::{
    comparator::{Comparator, Contestant, config::MatchFile},
    engine::session::Engine,
};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// TOML file listing the start positions and match settings
    match_file: PathBuf,

    /// Engine playing black in the first game of every position
    path_black: String,

    /// Engine playing white in the first game of every position
    path_white: String,

    /// Directory the report is written to
    #[arg(short, long, default_value = ".")]
    output: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let file = MatchFile::load(&args.match_file)
        .with_context(|| format!("loading {}", args.match_file.display()))?;
    let settings = file.engine_settings()?;

    let cancel = CancellationToken::new();
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("interrupted, cancelling the match");
                cancel.cancel();
            }
        }
    });

    let black = Engine::start(&args.path_black, settings.clone())
        .await
        .context("starting the black engine")?;
    let white = match Engine::start(&args.path_white, settings).await {
        Ok(white) => white,
        Err(err) => {
            black.quit().await?;
            return Err(err).context("starting the white engine");
        }
    };

    let mut comparator = Comparator::new(
        Contestant::new(black, &args.path_black),
        Contestant::new(white, &args.path_white),
        cancel,
    );
    let outcome = comparator.run(&file).await;

    for contestant in comparator.into_contestants() {
        if let Err(err) = contestant.engine.quit().await {
            warn!(engine = %contestant.file_name, %err, "could not stop engine");
        }
    }

    let report = outcome.context("running the match")?;
    let path = report.write(&args.output)?;
    info!(path = %path.display(), "report written");

    Ok(())
}
