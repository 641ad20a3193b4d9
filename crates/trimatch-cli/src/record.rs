use std::{
    fs::{self, File},
    io::{BufWriter, Write as _},
    ops::Deref,
    path::{Path, PathBuf},
};

use anyhow::Context;
use chrono::Utc;
use trimatch_ai::autoplay::{Autoplayer, Tick};
use trimatch_engine::{
    GameSession, GameSettings, ListenerId, MoveError, MoveResult, Outcome, PendingMove, Position,
    QueueEvent, Seed,
};

use crate::schema::record::{PlayerInfo, RecordedSession};

/// A [`GameSession`] that remembers every completed move.
///
/// Moves must go through this type so they get recorded; only read access to
/// the session is exposed through [`Deref`].
#[derive(Debug)]
pub struct RecordingSession {
    session: GameSession,
    seed: Seed,
    settings: GameSettings,
    player: PlayerInfo,
    moves: Vec<Position>,
}

impl Deref for RecordingSession {
    type Target = GameSession;

    fn deref(&self) -> &Self::Target {
        &self.session
    }
}

impl RecordingSession {
    pub fn new(settings: &GameSettings, seed: Seed, player: PlayerInfo) -> anyhow::Result<Self> {
        let session = GameSession::new(settings, seed)
            .with_context(|| format!("Failed to generate board from seed {seed}"))?;
        Ok(Self {
            session,
            seed,
            settings: settings.clone(),
            player,
            moves: vec![],
        })
    }

    pub fn submit_move(&mut self, position: Position) -> Result<PendingMove, MoveError> {
        self.session.submit_move(position)
    }

    pub fn complete_move(&mut self, pending: PendingMove) -> Result<MoveResult, MoveError> {
        let origin = pending.origin();
        let result = self.session.complete_move(pending)?;
        self.moves.push(origin);
        Ok(result)
    }

    pub fn play_move(&mut self, position: Position) -> Result<MoveResult, MoveError> {
        let pending = self.submit_move(position)?;
        self.complete_move(pending)
    }

    /// Runs one autoplay step; a submitted move must be completed through
    /// [`Self::complete_move`].
    pub fn tick(&mut self, player: &mut Autoplayer) -> Tick {
        player.tick(&mut self.session)
    }

    pub fn subscribe_queue<F>(&mut self, callback: F) -> ListenerId
    where
        F: FnMut(&QueueEvent) + 'static,
    {
        self.session.subscribe_queue(callback)
    }

    pub fn subscribe_outcome<F>(&mut self, callback: F) -> ListenerId
    where
        F: FnMut(&Outcome) + 'static,
    {
        self.session.subscribe_outcome(callback)
    }

    pub fn moves(&self) -> &[Position] {
        &self.moves
    }

    /// Freezes the session into a recording stamped with the current time.
    pub fn into_recording(self) -> RecordedSession {
        RecordedSession {
            recorded_at: Utc::now(),
            seed: self.seed,
            settings: self.settings,
            player: self.player,
            outcome: self.session.outcome(),
            final_stats: self.session.stats().clone(),
            moves: self.moves,
        }
    }
}

impl RecordedSession {
    /// Saves the recording as `{player}_{YYYYMMDD_HHMMSS}.json` in `record_dir`,
    /// creating the directory if needed.
    pub fn save(&self, record_dir: &Path) -> anyhow::Result<PathBuf> {
        fs::create_dir_all(record_dir)
            .with_context(|| format!("Failed to create directory {}", record_dir.display()))?;

        let filename = format!(
            "{}_{}.json",
            self.player.file_prefix(),
            self.recorded_at.format("%Y%m%d_%H%M%S")
        );
        let filepath = record_dir.join(filename);

        let file = File::create(&filepath)
            .with_context(|| format!("Failed to create file: {}", filepath.display()))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, self)
            .with_context(|| format!("Failed to write JSON to {}", filepath.display()))?;
        writer
            .flush()
            .with_context(|| format!("Failed to flush output to {}", filepath.display()))?;

        log::info!("saved recording to {}", filepath.display());
        Ok(filepath)
    }
}
