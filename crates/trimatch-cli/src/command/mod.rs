use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use rand::Rng as _;
use trimatch_ai::policy::Objective;
use trimatch_engine::Seed;

use crate::config::AppConfig;

use self::{
    auto_play::AutoPlayArg, play::ManualPlayArg, replay::ReplayArg, simulate::SimulateArg,
};

mod auto_play;
mod play;
mod replay;
mod simulate;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// JSON file with board settings and autoplay pacing
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// What mode to run the program in
    #[command(subcommand)]
    mode: Option<Mode>,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Play from the terminal, one `row col` per line
    #[command(name = "play")]
    ManualPlay(#[clap(flatten)] ManualPlayArg),
    /// Watch the autoplayer play one session
    #[command(name = "auto-play")]
    AutoPlay(#[clap(flatten)] AutoPlayArg),
    /// Play many sessions headlessly and report outcomes
    Simulate(#[clap(flatten)] SimulateArg),
    /// Re-run a recording and check it reaches the same outcome
    Replay(#[clap(flatten)] ReplayArg),
}

/// Objective selectable on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ObjectiveArg {
    Win,
    Lose,
}

impl From<ObjectiveArg> for Objective {
    fn from(arg: ObjectiveArg) -> Self {
        match arg {
            ObjectiveArg::Win => Objective::MaximizeWin,
            ObjectiveArg::Lose => Objective::MaximizeLoss,
        }
    }
}

fn seed_or_random(seed: Option<Seed>) -> Seed {
    seed.unwrap_or_else(|| rand::rng().random())
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    let config = AppConfig::load(args.config.as_deref())?;
    match args
        .mode
        .unwrap_or(Mode::ManualPlay(ManualPlayArg::default()))
    {
        Mode::ManualPlay(arg) => play::run(&arg, &config)?,
        Mode::AutoPlay(arg) => auto_play::run(&arg, &config)?,
        Mode::Simulate(arg) => simulate::run(&arg, &config)?,
        Mode::Replay(arg) => replay::run(&arg)?,
    }
    Ok(())
}
