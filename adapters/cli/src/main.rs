#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plays a headless Skirmish match between two autopilots.

mod autopilot;
mod board;

use std::{io, path::PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use skirmish_core::TeamId;
use skirmish_rendering::{Color, Presentation, RenderingBackend, Scene};
use skirmish_session::{FrameInput, Resolution, Skirmish, SkirmishConfig};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::board::TextBoard;

#[derive(Debug, Parser)]
#[command(name = "skirmish", about = "Plays a headless Skirmish match")]
struct Opts {
    /// TOML file describing the match; the reference scenario is used otherwise.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Overrides the seed from the configuration.
    #[arg(long)]
    seed: Option<u64>,

    /// Stops the match after this many turns.
    #[arg(long, default_value_t = 500)]
    max_turns: usize,

    /// Prints only the result.
    #[arg(long)]
    quiet: bool,
}

/// Result of a headless run.
#[derive(Debug, PartialEq, Eq)]
struct Outcome {
    turns: usize,
    finished: bool,
    winner: Option<TeamId>,
}

/// Entry point for the Skirmish command-line interface.
fn main() -> Result<()> {
    let opts = Opts::parse();
    let default_level = if opts.quiet { "warn" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(io::stderr)
        .init();

    let mut config = match &opts.config {
        Some(path) => SkirmishConfig::from_path(path)
            .with_context(|| format!("failed to load configuration from {}", path.display()))?,
        None => SkirmishConfig::default(),
    };
    if let Some(seed) = opts.seed {
        config.seed = seed;
    }

    let mut skirmish = Skirmish::init(config).context("failed to set up the match")?;
    let mut board = TextBoard::new(io::stdout());
    let backend: Option<&mut dyn RenderingBackend> = if opts.quiet {
        None
    } else {
        Some(&mut board)
    };
    let outcome = play(&mut skirmish, opts.max_turns, backend)?;

    match outcome {
        Outcome {
            finished: true,
            winner: Some(team),
            turns,
        } => println!("{team} wins after {turns} turns"),
        Outcome {
            finished: true,
            winner: None,
            turns,
        } => println!("no team survived after {turns} turns"),
        Outcome { turns, .. } => println!("turn limit reached after {turns} turns"),
    }
    Ok(())
}

/// Lets the autopilot act until the match ends or `max_turns` turns were played.
fn play(
    skirmish: &mut Skirmish,
    max_turns: usize,
    mut backend: Option<&mut dyn RenderingBackend>,
) -> Result<Outcome> {
    let mut turns = 0;
    if let Some(backend) = backend.as_deref_mut() {
        present(skirmish, turns, backend)?;
    }

    while !skirmish.is_finished() && turns < max_turns {
        let input = autopilot::choose(skirmish);
        let resolution = match skirmish.update(&input) {
            Ok(resolution) => resolution,
            Err(error) => {
                warn!(%error, "autopilot chose an invalid action, passing the turn");
                skirmish
                    .update(&FrameInput {
                        end_turn: true,
                        ..FrameInput::default()
                    })
                    .context("failed to pass the turn")?
            }
        };

        if matches!(resolution, Resolution::TargetDesignated { .. } | Resolution::Idle) {
            continue;
        }
        turns += 1;
        if let Some(backend) = backend.as_deref_mut() {
            present(skirmish, turns, backend)?;
        }
    }

    info!(turns, finished = skirmish.is_finished(), "run complete");
    Ok(Outcome {
        turns,
        finished: skirmish.is_finished(),
        winner: skirmish.winner(),
    })
}

fn present(skirmish: &Skirmish, turn: usize, backend: &mut dyn RenderingBackend) -> Result<()> {
    let scene = Scene::capture(
        &skirmish.tiles(),
        &skirmish.entities(),
        &skirmish.selection(),
        skirmish.acting_entity(),
    );
    let presentation = Presentation::new(
        format!("turn {turn}"),
        Color::from_rgb_u8(0x10, 0x12, 0x18),
        scene,
    );
    backend.present(&presentation)
}
