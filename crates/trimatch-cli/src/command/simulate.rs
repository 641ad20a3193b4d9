use std::path::PathBuf;

use clap::ValueEnum;
use rand::{Rng, RngCore};
use serde::Serialize;
use trimatch_ai::{
    autoplay::{AutoplayPacing, Autoplayer, SessionReport},
    policy::Objective,
};
use trimatch_engine::{GameSession, GameSettings, Outcome, Seed};

use crate::{config::AppConfig, util};

const MOVES_HISTOGRAM_WIDTH: usize = 5;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct SimulateArg {
    /// Number of sessions to play per objective
    #[arg(long, default_value_t = 1000)]
    sessions: usize,
    /// Which objectives to simulate
    #[arg(long, value_enum, default_value_t = SimulateObjective::Both)]
    objective: SimulateObjective,
    /// Seed the per-session board and policy seeds are drawn from
    #[arg(long)]
    seed: Option<Seed>,
    /// Stop each session after this many moves
    #[arg(long)]
    move_limit: Option<usize>,
    /// Leave per-session reports out of the JSON output
    #[arg(long)]
    summary_only: bool,
    /// Output file path (stdout if omitted)
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum SimulateObjective {
    Win,
    Lose,
    Both,
}

impl SimulateObjective {
    fn objectives(self) -> &'static [Objective] {
        match self {
            SimulateObjective::Win => &[Objective::MaximizeWin],
            SimulateObjective::Lose => &[Objective::MaximizeLoss],
            SimulateObjective::Both => &Objective::ALL,
        }
    }
}

#[derive(Debug, Serialize)]
struct SimulationReport {
    settings: GameSettings,
    seed: Seed,
    summaries: Vec<ObjectiveSummary>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    sessions: Vec<SessionReport>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
struct ObjectiveSummary {
    objective: Objective,
    sessions: usize,
    won: usize,
    lost: usize,
    unfinished: usize,
    min_moves: usize,
    max_moves: usize,
    mean_moves: f64,
}

impl ObjectiveSummary {
    #[expect(clippy::cast_precision_loss)]
    fn from_reports(objective: Objective, reports: &[SessionReport]) -> Self {
        let count = |outcome| reports.iter().filter(|r| r.outcome == outcome).count();
        let moves = || reports.iter().map(|r| r.moves.len());
        let total_moves: usize = moves().sum();
        Self {
            objective,
            sessions: reports.len(),
            won: count(Outcome::Won),
            lost: count(Outcome::Lost),
            unfinished: count(Outcome::Ongoing),
            min_moves: moves().min().unwrap_or(0),
            max_moves: moves().max().unwrap_or(0),
            mean_moves: if reports.is_empty() {
                0.0
            } else {
                total_moves as f64 / reports.len() as f64
            },
        }
    }
}

pub(crate) fn run(arg: &SimulateArg, config: &AppConfig) -> anyhow::Result<()> {
    let SimulateArg {
        sessions,
        objective,
        seed,
        move_limit,
        summary_only,
        output,
    } = arg;

    let seed = super::seed_or_random(*seed);
    let move_limit = move_limit.unwrap_or(usize::MAX);
    let mut rng = seed.rng();
    eprintln!("Simulating {sessions} sessions per objective (seed {seed})...");

    let mut summaries = vec![];
    let mut all_reports = vec![];
    for &objective in objective.objectives() {
        let reports = simulate(
            &config.settings,
            objective,
            *sessions,
            move_limit,
            &mut rng,
        )?;
        let summary = ObjectiveSummary::from_reports(objective, &reports);
        print_summary(&summary, &reports);
        summaries.push(summary);
        if !summary_only {
            all_reports.extend(reports);
        }
    }

    let report = SimulationReport {
        settings: config.settings.clone(),
        seed,
        summaries,
        sessions: all_reports,
    };
    util::save_json(&report, output.as_deref())?;

    Ok(())
}

fn simulate<R>(
    settings: &GameSettings,
    objective: Objective,
    sessions: usize,
    move_limit: usize,
    rng: &mut R,
) -> anyhow::Result<Vec<SessionReport>>
where
    R: RngCore,
{
    (0..sessions)
        .map(|_| {
            let board_seed: Seed = rng.random();
            let policy_seed: Seed = rng.random();
            let mut session = GameSession::new(settings, board_seed)?;
            let mut player = Autoplayer::new(objective, AutoplayPacing::turbo(), policy_seed);
            Ok(player.play_to_end(&mut session, move_limit))
        })
        .collect()
}

fn print_summary(summary: &ObjectiveSummary, reports: &[SessionReport]) {
    eprintln!();
    eprintln!(
        "{}: {} won, {} lost, {} unfinished; moves min {} / mean {:.1} / max {}",
        summary.objective,
        summary.won,
        summary.lost,
        summary.unfinished,
        summary.min_moves,
        summary.mean_moves,
        summary.max_moves
    );

    let mut histogram = vec![0; summary.max_moves / MOVES_HISTOGRAM_WIDTH + 1];
    for report in reports {
        histogram[report.moves.len() / MOVES_HISTOGRAM_WIDTH] += 1;
    }
    util::print_histogram(
        histogram
            .into_iter()
            .enumerate()
            .map(|(i, count)| (i * MOVES_HISTOGRAM_WIDTH, count)),
    );
}
