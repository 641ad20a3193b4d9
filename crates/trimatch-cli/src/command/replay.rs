use std::path::PathBuf;

use anyhow::{Context as _, bail, ensure};
use trimatch_ai::autoplay::{AutoplayPacing, Autoplayer};
use trimatch_engine::{GameSession, Outcome};

use crate::{
    render::render_session,
    schema::record::{PlayerInfo, RecordedSession},
    util,
};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct ReplayArg {
    /// Path to the recording file (JSON format)
    recording_file: PathBuf,
    /// Print the board after every move
    #[clap(long)]
    show_steps: bool,
}

pub(crate) fn run(arg: &ReplayArg) -> anyhow::Result<()> {
    let ReplayArg {
        recording_file,
        show_steps,
    } = arg;

    eprintln!("Loading recording from {}", recording_file.display());
    let recording: RecordedSession = util::read_json_file("recording", recording_file)?;
    eprintln!(
        "Loaded {} moves recorded at {}",
        recording.moves.len(),
        recording.recorded_at
    );

    let session = replay(&recording, |step, session| {
        if *show_steps {
            println!("\nAfter move {}:\n{}", step + 1, render_session(session));
        }
    })?;
    println!("{}", render_session(&session));
    println!(
        "Replay matches recording: {} after {} moves",
        session.outcome(),
        session.stats().moves()
    );

    Ok(())
}

/// Plays the recorded moves on a board regenerated from the recording's seed
/// and checks the result against what was recorded.
///
/// For autoplay recordings the policy is also re-run from its seed, and must
/// pick the same cells.
fn replay<F>(recording: &RecordedSession, mut on_step: F) -> anyhow::Result<GameSession>
where
    F: FnMut(usize, &GameSession),
{
    let mut session = GameSession::new(&recording.settings, recording.seed)
        .context("Failed to regenerate the recorded board")?;

    for (step, &position) in recording.moves.iter().enumerate() {
        session
            .play_move(position)
            .with_context(|| format!("Move {} at {position} was rejected", step + 1))?;
        on_step(step, &session);
    }

    ensure!(
        session.outcome() == recording.outcome,
        "Replay ended {} but the recording says {}",
        session.outcome(),
        recording.outcome
    );
    ensure!(
        *session.stats() == recording.final_stats,
        "Replay stats {:?} differ from recorded {:?}",
        session.stats(),
        recording.final_stats
    );

    if let PlayerInfo::Auto {
        objective,
        policy_seed,
    } = &recording.player
    {
        let mut fresh = GameSession::new(&recording.settings, recording.seed)?;
        let report = Autoplayer::new(*objective, AutoplayPacing::turbo(), *policy_seed)
            .play_to_end(&mut fresh, recording.moves.len());
        if report.moves != recording.moves {
            bail!("The {objective} policy no longer plays the recorded moves");
        }
        if session.outcome() == Outcome::Ongoing {
            log::warn!("autoplay recording ended before the session was decided");
        }
    }

    Ok(session)
}
