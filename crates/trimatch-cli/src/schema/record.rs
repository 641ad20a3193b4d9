use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use trimatch_ai::policy::Objective;
use trimatch_engine::{GameSettings, GameStats, Outcome, Position, Seed};

/// Recorded play session with metadata for replay
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordedSession {
    /// Timestamp when recording was created (ISO 8601 format)
    pub recorded_at: DateTime<Utc>,
    /// Seed the board was generated from
    pub seed: Seed,
    /// Settings the board was generated with
    pub settings: GameSettings,
    pub player: PlayerInfo,
    /// Cells played, in order
    pub moves: Vec<Position>,
    pub outcome: Outcome,
    pub final_stats: GameStats,
}

/// Information about the player type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerInfo {
    /// Manual play by human
    Manual,
    /// Autoplay with the seed driving its random fallback
    Auto {
        objective: Objective,
        policy_seed: Seed,
    },
}

impl PlayerInfo {
    /// Short label used in recording file names.
    pub fn file_prefix(&self) -> &'static str {
        match self {
            PlayerInfo::Manual => "manual",
            PlayerInfo::Auto {
                objective: Objective::MaximizeWin,
                ..
            } => "auto_win",
            PlayerInfo::Auto {
                objective: Objective::MaximizeLoss,
                ..
            } => "auto_lose",
        }
    }
}
