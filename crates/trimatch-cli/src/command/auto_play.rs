use std::{path::PathBuf, thread};

use trimatch_ai::{
    autoplay::{AutoplayPacing, Autoplayer, Tick},
    policy::Objective,
};
use trimatch_engine::{AddResult, Seed};

use crate::{
    config::AppConfig, record::RecordingSession, render::render_session,
    schema::record::PlayerInfo,
};

use super::ObjectiveArg;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct AutoPlayArg {
    /// Whether to play toward a win or toward a loss
    #[clap(long, value_enum, default_value_t = ObjectiveArg::Win)]
    pub(super) objective: ObjectiveArg,
    /// Run in turbo mode (no delays)
    #[clap(long, default_value_t = false)]
    pub(super) turbo: bool,
    /// Seed for the board layout (32 hex digits); random if omitted
    #[clap(long)]
    pub(super) seed: Option<Seed>,
    /// Seed for the policy's random fallback; random if omitted
    #[clap(long)]
    policy_seed: Option<Seed>,
    /// Save the game recording to a file when the session ends
    #[clap(long)]
    save_recording: bool,
    /// Directory to save recording files
    #[clap(long, default_value = "./data/recordings/")]
    record_dir: PathBuf,
}

pub(crate) fn run(arg: &AutoPlayArg, config: &AppConfig) -> anyhow::Result<()> {
    let AutoPlayArg {
        objective,
        turbo,
        seed,
        policy_seed,
        save_recording,
        record_dir,
    } = arg;

    let objective = Objective::from(*objective);
    let seed = super::seed_or_random(*seed);
    let policy_seed = super::seed_or_random(*policy_seed);
    let pacing = if *turbo {
        AutoplayPacing::turbo()
    } else {
        config.pacing.clone()
    };
    eprintln!("Board seed: {seed}, policy seed: {policy_seed}, objective: {objective}");

    let player_info = PlayerInfo::Auto {
        objective,
        policy_seed,
    };
    let mut session = RecordingSession::new(&config.settings, seed, player_info)?;
    let mut player = Autoplayer::new(objective, pacing.clone(), policy_seed);
    println!("{}", render_session(&session));

    loop {
        match session.tick(&mut player) {
            Tick::Wait(delay) => thread::sleep(delay),
            Tick::Stalled(_) => {
                println!("No tile left to move.");
                break;
            }
            Tick::Submitted { pending, next_tick } => {
                println!(
                    "\nMove {} {} from {} to slot {}",
                    pending.tile_id(),
                    pending.kind(),
                    pending.origin(),
                    pending.slot()
                );
                // Stand-in for the presentation layer animating the tile.
                thread::sleep(pacing.settle());
                let result = session.complete_move(pending)?;
                if let AddResult::Cleared(count) = result.add_result {
                    println!("Cleared {count} tiles");
                }
                println!("{}", render_session(&session));
                thread::sleep(next_tick.saturating_sub(pacing.settle()));
            }
            Tick::Finished(outcome) => {
                println!("\n{outcome}");
                break;
            }
        }
    }

    let stats = session.stats();
    println!(
        "{} after {} moves ({} matches)",
        session.outcome(),
        stats.moves(),
        stats.matches()
    );

    if *save_recording {
        let path = session.into_recording().save(record_dir)?;
        eprintln!("Recording saved to {}", path.display());
    }

    Ok(())
}
