//! Move scripts: whitespace separated tokens replayed against the scheduler.
//!
//! | Token        | Meaning                                         |
//! |--------------|-------------------------------------------------|
//! | `1R` `1L` `1U` `1D` | participant 1 moves right, left, up, down |
//! | `1H`         | participant 1 holds the adjacent container      |
//! | `1Fn` `1Ff` `1Fc` | participant 1 fires normal, fire, cheese   |
//! | `1C` / `1c`  | participant 1 crouches / stands up              |
//! | `1use:star`  | participant 1 uses a consumable                 |
//! | `code:1234`  | types and submits a code                        |
//! | `cancel`     | dismisses the code prompt                       |
//! | `wait:500`   | advances the simulation by 500 ms               |

use std::time::Duration;

use maze_escape_core::{Command, Consumable, Direction, ParticipantId, PayloadKind};
use thiserror::Error;

/// One scripted instruction.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Step {
    /// Submit a command immediately.
    Submit(Command),
    /// Let simulation time pass.
    Wait(Duration),
}

/// Reasons a move script is refused.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub(crate) enum ScriptError {
    /// The token does not start with a participant number from 1 to 4.
    #[error("token `{0}` does not name a participant between 1 and 4")]
    UnknownParticipant(String),
    /// The action part of the token is not recognised.
    #[error("token `{0}` is not a known action")]
    UnknownAction(String),
    /// The consumable name is not recognised.
    #[error("`{0}` is not a consumable")]
    UnknownItem(String),
    /// The code is not made of decimal digits.
    #[error("code `{0}` must only contain digits")]
    InvalidCode(String),
    /// The wait duration is not a whole number of milliseconds.
    #[error("wait `{0}` must be a number of milliseconds")]
    InvalidWait(String),
}

/// Parses a full script into steps.
pub(crate) fn parse(script: &str) -> Result<Vec<Step>, ScriptError> {
    let mut steps = Vec::new();
    for token in script.split_whitespace() {
        steps.extend(parse_token(token)?);
    }
    Ok(steps)
}

fn parse_token(token: &str) -> Result<Vec<Step>, ScriptError> {
    if token == "cancel" {
        return Ok(vec![Step::Submit(Command::CancelCodeEntry)]);
    }
    if let Some(millis) = token.strip_prefix("wait:") {
        let millis = millis
            .parse::<u64>()
            .map_err(|_| ScriptError::InvalidWait(millis.to_owned()))?;
        return Ok(vec![Step::Wait(Duration::from_millis(millis))]);
    }
    if let Some(code) = token.strip_prefix("code:") {
        return parse_code(code);
    }

    let mut chars = token.chars();
    let participant = chars
        .next()
        .and_then(|c| c.to_digit(10))
        .and_then(|digit| u8::try_from(digit).ok())
        .filter(|digit| (1..=4).contains(digit))
        .map(ParticipantId::new)
        .ok_or_else(|| ScriptError::UnknownParticipant(token.to_owned()))?;
    let action = chars.as_str();

    let command = match action {
        "R" => move_command(participant, Direction::East),
        "L" => move_command(participant, Direction::West),
        "U" => move_command(participant, Direction::North),
        "D" => move_command(participant, Direction::South),
        "H" => Command::HoldContainer { participant },
        "C" => Command::SetCrouch {
            participant,
            crouching: true,
        },
        "c" => Command::SetCrouch {
            participant,
            crouching: false,
        },
        "Fn" => fire(participant, PayloadKind::Normal),
        "Ff" => fire(participant, PayloadKind::Fire),
        "Fc" => fire(participant, PayloadKind::Cheese),
        other => match other.strip_prefix("use:") {
            Some(item) => Command::UseConsumable {
                participant,
                item: consumable(item)?,
            },
            None => return Err(ScriptError::UnknownAction(token.to_owned())),
        },
    };
    Ok(vec![Step::Submit(command)])
}

fn parse_code(code: &str) -> Result<Vec<Step>, ScriptError> {
    let digits = code
        .chars()
        .map(|c| c.to_digit(10).and_then(|digit| u8::try_from(digit).ok()))
        .collect::<Option<Vec<u8>>>()
        .filter(|digits| !digits.is_empty())
        .ok_or_else(|| ScriptError::InvalidCode(code.to_owned()))?;

    let mut steps: Vec<Step> = digits
        .into_iter()
        .map(|digit| Step::Submit(Command::EnterDigit { digit }))
        .collect();
    steps.push(Step::Submit(Command::SubmitCode));
    Ok(steps)
}

fn consumable(name: &str) -> Result<Consumable, ScriptError> {
    match name {
        "poison" => Ok(Consumable::RatPoison),
        "cheese" => Ok(Consumable::Cheese),
        "knife" => Ok(Consumable::Knife),
        "flute" => Ok(Consumable::Flute),
        "bucket" => Ok(Consumable::WaterBucket),
        "star" => Ok(Consumable::MagicStar),
        other => Err(ScriptError::UnknownItem(other.to_owned())),
    }
}

const fn move_command(participant: ParticipantId, direction: Direction) -> Command {
    Command::AttemptMove {
        participant,
        direction,
    }
}

const fn fire(participant: ParticipantId, payload: PayloadKind) -> Command {
    Command::Fire {
        participant,
        payload,
    }
}
