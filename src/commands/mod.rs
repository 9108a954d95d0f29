//! Command dispatch - maps a (participant, verb, args) triple onto the game
//! service and formats the reply shown in chat

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::game::geometry::parse_shots;
use crate::game::{BoardSnapshot, GameError, GameService};

/// A parsed chat command as delivered by the transport
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandRequest {
    pub participant: String,
    pub verb: String,
    #[serde(default)]
    pub args: Vec<String>,
}

/// Game verbs understood by the dispatcher
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Create,
    Reset,
    Destroy,
    Start,
    Join { name: String },
    Leave,
    Move { tile: String },
    Attack { tile: String, shots: u32 },
    Transfer { tile: String, shots: u32 },
    Vote { target: String },
    Board,
}

impl Command {
    pub fn parse(verb: &str, args: &[String]) -> Result<Self, CommandError> {
        let arg = |i: usize| args.get(i).map(String::as_str);
        let required = |i: usize, what: &'static str| {
            arg(i)
                .map(str::to_string)
                .ok_or(CommandError::MissingArgument(what))
        };

        let command = match verb.trim().to_ascii_lowercase().as_str() {
            "create" => Command::Create,
            "reset" => Command::Reset,
            "destroy" => Command::Destroy,
            "start" => Command::Start,
            "join" => Command::Join {
                name: required(0, "name")?,
            },
            "leave" => Command::Leave,
            "move" => Command::Move {
                tile: required(0, "tile")?,
            },
            "attack" | "shoot" => Command::Attack {
                tile: required(0, "tile")?,
                shots: parse_shots(arg(1)),
            },
            "transfer" | "give" => Command::Transfer {
                tile: required(0, "tile")?,
                shots: parse_shots(arg(1)),
            },
            "vote" => Command::Vote {
                target: required(0, "target")?,
            },
            "board" | "status" => Command::Board,
            other => return Err(CommandError::UnknownVerb(other.to_string())),
        };
        Ok(command)
    }
}

/// Reply to a command
#[derive(Debug, Clone, Serialize)]
pub struct CommandReply {
    pub ok: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshot: Option<BoardSnapshot>,
}

impl CommandReply {
    fn text(message: impl Into<String>) -> Self {
        Self {
            ok: true,
            message: message.into(),
            snapshot: None,
        }
    }

    fn refused(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            message: message.into(),
            snapshot: None,
        }
    }

    fn with_board(mut self, service: &GameService) -> Self {
        self.snapshot = Some(service.snapshot());
        self
    }
}

/// Failures before the game is even consulted
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("Unknown command '{0}'")]
    UnknownVerb(String),

    #[error("Missing argument: {0}")]
    MissingArgument(&'static str),

    #[error(transparent)]
    Game(#[from] GameError),
}

impl CommandError {
    pub fn code(&self) -> &'static str {
        match self {
            CommandError::UnknownVerb(_) => "unknown_verb",
            CommandError::MissingArgument(_) => "missing_argument",
            CommandError::Game(e) => e.code(),
        }
    }
}

/// Run one command against the game and produce the chat reply
pub fn dispatch(
    service: &GameService,
    participant: &str,
    command: Command,
) -> Result<CommandReply, CommandError> {
    debug!(participant = %participant, command = ?command, "Dispatching command");

    let reply = match command {
        Command::Create => {
            if !service.create_session() {
                return Err(GameError::SessionAlreadyInitialized.into());
            }
            CommandReply::text("A new game lobby is open. Use `join <name>` to take part")
        }
        Command::Reset => {
            service.reset_session();
            CommandReply::text("The game was reset and a fresh lobby is open")
        }
        Command::Destroy => {
            if service.destroy_session() {
                CommandReply::text("The game session was closed")
            } else {
                CommandReply::refused("There was no game session to close")
            }
        }
        Command::Start => {
            if service.start_session() {
                CommandReply::text("The game has started! Points arrive every midnight")
                    .with_board(service)
            } else {
                CommandReply::refused(
                    "The game could not start. It needs an open lobby with at least 2 players",
                )
            }
        }
        Command::Join { name } => {
            let player = service.join(participant, &name)?;
            CommandReply::text(format!(
                "{} joined as {} at {}",
                player.name, player.avatar, player.position
            ))
            .with_board(service)
        }
        Command::Leave => {
            let player = service.leave(participant)?;
            CommandReply::text(format!("{} left the lobby", player.name))
        }
        Command::Move { tile } => {
            let to = service.move_player(participant, &tile)?;
            CommandReply::text(format!("Moved to {to}")).with_board(service)
        }
        Command::Attack { tile, shots } => {
            let outcome = service.attack(participant, &tile, shots)?;
            let mut message = format!(
                "Hit {} {} time(s), {} health left",
                outcome.target.name, shots, outcome.target.health
            );
            if outcome.eliminated {
                message.push_str(&format!(". {} joins the jury", outcome.target.name));
            }
            if let Some(winner) = &outcome.winner {
                message.push_str(&format!(". {} wins the game!", winner.name));
            }
            CommandReply::text(message).with_board(service)
        }
        Command::Transfer { tile, shots } => {
            let outcome = service.transfer(participant, &tile, shots)?;
            CommandReply::text(format!(
                "Gave {} point(s) to {}",
                outcome.amount, outcome.target.name
            ))
            .with_board(service)
        }
        Command::Vote { target } => {
            let target = service.vote(participant, &target)?;
            CommandReply::text(format!("Your vote for {} was counted", target.name))
        }
        Command::Board => {
            let snapshot = service.snapshot();
            CommandReply {
                ok: true,
                message: snapshot.scoreboard(),
                snapshot: Some(snapshot),
            }
        }
    };

    Ok(reply)
}
