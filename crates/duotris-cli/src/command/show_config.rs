use std::path::PathBuf;

use duotris_bot::Difficulty;

use crate::{command::simulate::MatchMode, report};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct ShowConfigArg {
    /// Match mode: solo or versus
    #[arg(long, default_value = "solo")]
    mode: MatchMode,
    /// Bot difficulty: easy, normal or hard
    #[arg(long)]
    difficulty: Option<Difficulty>,
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
}

pub(crate) fn run(arg: &ShowConfigArg) -> anyhow::Result<()> {
    let ShowConfigArg {
        mode,
        difficulty,
        output,
    } = arg;
    let mut config = mode.config();
    if let Some(difficulty) = difficulty {
        config.bot.difficulty = *difficulty;
    }
    report::write_report(&config, output.as_deref())
}
