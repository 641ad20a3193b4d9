use std::{
    cell::RefCell,
    io::{self, BufRead as _, Write as _},
    path::PathBuf,
    rc::Rc,
    str::FromStr,
};

use trimatch_engine::{Outcome, Position, QueueEvent, Seed};

use crate::{
    config::AppConfig, record::RecordingSession, render::render_session,
    schema::record::PlayerInfo,
};

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct ManualPlayArg {
    /// Seed for the board layout (32 hex digits); random if omitted
    #[clap(long)]
    seed: Option<Seed>,
    /// Save the game recording to a file when the session ends
    #[clap(long)]
    save_recording: bool,
    /// Directory to save recording files
    #[clap(long, default_value = "./data/recordings/")]
    record_dir: PathBuf,
}

/// One line of player input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Input {
    Move(Position),
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("expected `row col` or `q`, got {_0:?}")]
struct ParseInputError(#[error(not(source))] String);

impl FromStr for Input {
    type Err = ParseInputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("q") || s.eq_ignore_ascii_case("quit") {
            return Ok(Input::Quit);
        }
        let err = || ParseInputError(s.to_owned());
        let mut parts = s.split(|c: char| c.is_whitespace() || c == ',').filter(|p| !p.is_empty());
        let row = parts.next().and_then(|p| p.parse().ok()).ok_or_else(err)?;
        let col = parts.next().and_then(|p| p.parse().ok()).ok_or_else(err)?;
        if parts.next().is_some() {
            return Err(err());
        }
        Ok(Input::Move(Position::new(row, col)))
    }
}

pub(crate) fn run(arg: &ManualPlayArg, config: &AppConfig) -> anyhow::Result<()> {
    let ManualPlayArg {
        seed,
        save_recording,
        record_dir,
    } = arg;

    let seed = super::seed_or_random(*seed);
    let mut session = RecordingSession::new(&config.settings, seed, PlayerInfo::Manual)?;
    eprintln!("Board seed: {seed}");

    let messages = Rc::new(RefCell::new(vec![]));
    {
        let messages = Rc::clone(&messages);
        session.subscribe_queue(move |event| {
            let message = match event {
                QueueEvent::MatchCleared { count } => format!("Cleared {count} tiles!"),
                QueueEvent::Overflow => "The holding queue overflowed.".to_owned(),
            };
            messages.borrow_mut().push(message);
        });
    }
    {
        let messages = Rc::clone(&messages);
        session.subscribe_outcome(move |outcome| {
            let message = match outcome {
                Outcome::Won => "You won!",
                Outcome::Lost => "You lost.",
                Outcome::Ongoing => return,
            };
            messages.borrow_mut().push(message.to_owned());
        });
    }

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    while !session.outcome().is_terminal() {
        println!("{}", render_session(&session));
        print!("> ");
        io::stdout().flush()?;

        let Some(line) = lines.next().transpose()? else {
            break;
        };
        match line.parse::<Input>() {
            Ok(Input::Quit) => break,
            Ok(Input::Move(position)) => {
                if let Err(e) = session.play_move(position) {
                    println!("{e}");
                }
            }
            Err(e) => println!("{e}"),
        }
        for message in messages.borrow_mut().drain(..) {
            println!("{message}");
        }
    }

    println!("{}", render_session(&session));
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_input() {
        assert_eq!("2 3".parse(), Ok(Input::Move(Position::new(2, 3))));
        assert_eq!(" 0,4 \n".parse(), Ok(Input::Move(Position::new(0, 4))));
        assert_eq!("Q".parse(), Ok(Input::Quit));
        assert_eq!("quit".parse(), Ok(Input::Quit));
    }

    #[test]
    fn test_parse_input_rejects_garbage() {
        for line in ["", "1", "1 2 3", "a b", "-1 2"] {
            let err = line.parse::<Input>().unwrap_err();
            assert!(err.to_string().starts_with("expected `row col`"), "{line:?}");
        }
    }
}
