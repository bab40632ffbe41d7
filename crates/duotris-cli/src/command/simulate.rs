use std::{path::PathBuf, time::Duration};

use anyhow::Context as _;
use chrono::{DateTime, Utc};
use duotris_bot::Difficulty;
use duotris_engine::{GameStats, PieceSeed, PlayerSession, SessionState};
use duotris_sim::{Outcome, Simulation, SimulationConfig};
use rand::Rng as _;
use serde::Serialize;

use crate::report;

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, derive_more::FromStr)]
pub(crate) enum MatchMode {
    /// One bot playing alone
    #[default]
    Solo,
    /// Two bots exchanging garbage
    Versus,
}

impl MatchMode {
    pub(crate) fn config(self) -> SimulationConfig {
        match self {
            MatchMode::Solo => SimulationConfig::single_bot(),
            MatchMode::Versus => SimulationConfig::bot_vs_bot(),
        }
    }
}

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct SimulateArg {
    /// Match mode: solo or versus
    #[arg(long, default_value = "solo")]
    mode: MatchMode,
    /// Match seed as 32 hex digits (random when omitted)
    #[arg(long)]
    seed: Option<PieceSeed>,
    /// Simulated time advanced per frame, in milliseconds
    #[arg(long, default_value_t = 16)]
    frame_ms: u64,
    /// Stop after this much simulated time, in seconds
    #[arg(long, default_value_t = 600)]
    max_seconds: u64,
    /// Bot difficulty: easy, normal or hard
    #[arg(long)]
    difficulty: Option<Difficulty>,
    /// Match configuration JSON file, used instead of the mode's preset
    #[arg(long)]
    config: Option<PathBuf>,
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
    /// Print the final boards to stderr
    #[arg(long, default_value_t = false)]
    print_boards: bool,
    /// Print match events to stderr as they happen
    #[arg(long, default_value_t = false)]
    verbose: bool,
}

#[derive(Debug, Serialize)]
struct MatchSummary {
    seed: PieceSeed,
    finished: bool,
    simulated_ms: u128,
    outcome: Option<Outcome>,
    players: Vec<PlayerSummary>,
    finished_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
struct PlayerSummary {
    state: SessionState,
    level: usize,
    #[serde(flatten)]
    stats: GameStats,
    play_time_ms: u128,
}

impl PlayerSummary {
    fn new(session: &PlayerSession) -> Self {
        Self {
            state: session.state(),
            level: session.stats().level(),
            stats: session.stats().clone(),
            play_time_ms: session.play_time().as_millis(),
        }
    }
}

pub(crate) fn run(arg: &SimulateArg) -> anyhow::Result<()> {
    let SimulateArg {
        mode,
        seed,
        frame_ms,
        max_seconds,
        difficulty,
        config,
        output,
        print_boards,
        verbose,
    } = arg;
    anyhow::ensure!(*frame_ms > 0, "--frame-ms must be greater than zero");

    let mut config = match config {
        Some(path) => report::read_config(path)?,
        None => mode.config(),
    };
    if let Some(difficulty) = difficulty {
        config.bot.difficulty = *difficulty;
    }
    if config.players.iter().any(|player| player.is_human()) {
        eprintln!("Warning: human players receive no input in a headless match");
    }

    let seed = seed.unwrap_or_else(|| rand::rng().random());
    eprintln!("Match seed: {:032x}", seed.to_u128());

    let mut sim = Simulation::new(config, seed).context("Failed to set up the match")?;
    sim.start().context("Failed to start the match")?;

    let frame = Duration::from_millis(*frame_ms);
    let limit = Duration::from_secs(*max_seconds);
    let mut elapsed = Duration::ZERO;
    while !sim.is_finished() && elapsed < limit {
        sim.tick(frame);
        elapsed += frame;
        for event in sim.drain_events() {
            if *verbose {
                eprintln!("[{:>9.3}s] {event}", elapsed.as_secs_f64());
            }
        }
    }

    if sim.is_finished() {
        eprintln!("Match finished after {:.1}s", elapsed.as_secs_f64());
    } else {
        eprintln!("Time limit of {max_seconds}s reached");
    }
    if let Some(outcome) = sim.outcome() {
        eprintln!("Outcome: {outcome}");
    }
    if *print_boards {
        for (index, session) in sim.sessions().enumerate() {
            eprintln!("Player {index} ({} points):", session.stats().score());
            eprint!("{}", session.board());
        }
    }

    let summary = MatchSummary {
        seed,
        finished: sim.is_finished(),
        simulated_ms: elapsed.as_millis(),
        outcome: sim.outcome(),
        players: sim.sessions().map(PlayerSummary::new).collect(),
        finished_at: Utc::now(),
    };
    report::write_report(&summary, output.as_deref())
}
