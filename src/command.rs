//! Line-oriented command protocol for the main machine.
//!
//! One command per line, whitespace separated, case-insensitive:
//!
//! | Command | Effect |
//! |---|---|
//! | `SET_TEMPERATURE n`, `TEMPERATURE n` | set the target temperature |
//! | `SET_VOLUME n`, `VOLUME n` | set the water volume in litres |
//! | `HEAT [n]`, `WAIT_TEMPERATURE [n]` | heat to `n` °C (default 95) |
//! | `TIMER secs` | be ready `secs` seconds from now |
//! | `WATTS n` | heating element power |
//! | `HYSTERESIS_TEMP n`, `HYSTERESIS_TIME n` | hysteresis settings |
//! | `PID [kp ki kd p_on]` | PID tunings |
//! | `ENTER_CONFIRM`, `CONFIRM`, `STOP` | flow control |
//! | `WAIT [secs]`, `DELAY [secs]` | pause the script (default 1 s) |
//!
//! Blank lines and lines starting with `#` or `//` are skipped.

use crate::machines::main::MainEvent;
use chrono::{DateTime, TimeDelta, Utc};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

const DEFAULT_HEAT_TEMPERATURE: f64 = 95.0;
const DEFAULT_DELAY_SECONDS: u64 = 1;

/// Errors raised while parsing a command line.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CommandError {
    #[error("{command} requires an argument")]
    MissingArgument { command: String },

    #[error("invalid value for {command}: {value}")]
    InvalidNumber { command: String, value: String },

    #[error("unknown command: {0}")]
    UnknownCommand(String),
}

/// A parsed command line.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Send this event to the main machine.
    Event(MainEvent),
    /// Pause the script; handled by the runner, never sent to a machine.
    Delay(Duration),
}

/// Parse one line. `now` anchors relative timers.
///
/// Returns `Ok(None)` for blank and comment lines.
pub fn parse_line(line: &str, now: DateTime<Utc>) -> Result<Option<Command>, CommandError> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') || line.starts_with("//") {
        return Ok(None);
    }

    let mut parts = line.split_whitespace();
    let Some(head) = parts.next() else {
        return Ok(None);
    };
    let command = head.to_uppercase();
    let args: Vec<&str> = parts.collect();

    let event = match command.as_str() {
        "SET_TEMPERATURE" | "TEMPERATURE" => MainEvent::Temperature {
            temperature: required(&command, &args, 0)?,
        },
        "SET_VOLUME" | "VOLUME" => MainEvent::Volume {
            volume: required(&command, &args, 0)?,
        },
        "HEAT" | "WAIT_TEMPERATURE" => MainEvent::WaitTemperature {
            temperature: optional(&command, &args, 0, DEFAULT_HEAT_TEMPERATURE)?,
        },
        "TIMER" => {
            let seconds: i64 = required(&command, &args, 0)?;
            let preparing_time = TimeDelta::try_seconds(seconds)
                .and_then(|lead| now.checked_add_signed(lead))
                .ok_or_else(|| invalid(&command, &seconds.to_string()))?;
            MainEvent::PrepareAbsoluteTime { preparing_time }
        }
        "STOP" => MainEvent::Stop,
        "CONFIRM" => MainEvent::Confirm,
        "ENTER_CONFIRM" => MainEvent::EnterConfirm,
        "WATTS" => MainEvent::Watts {
            watts: required(&command, &args, 0)?,
        },
        "HYSTERESIS_TEMP" => MainEvent::HysteresisTemp {
            temperature: required(&command, &args, 0)?,
        },
        "HYSTERESIS_TIME" => MainEvent::HysteresisTime {
            time: required(&command, &args, 0)?,
        },
        "PID" => MainEvent::Pid {
            kp: optional(&command, &args, 0, 0.1)?,
            ki: optional(&command, &args, 1, 0.01)?,
            kd: optional(&command, &args, 2, 0.001)?,
            p_on: optional(&command, &args, 3, 0.0)?,
        },
        "WAIT" | "DELAY" => {
            let seconds: u64 = optional(&command, &args, 0, DEFAULT_DELAY_SECONDS)?;
            // The runner advances a chrono clock by this amount.
            if i64::try_from(seconds).ok().and_then(TimeDelta::try_seconds).is_none() {
                return Err(invalid(&command, &seconds.to_string()));
            }
            return Ok(Some(Command::Delay(Duration::from_secs(seconds))));
        }
        _ => return Err(CommandError::UnknownCommand(command)),
    };

    Ok(Some(Command::Event(event)))
}

/// A command argument type.
trait Argument: FromStr {
    fn is_acceptable(&self) -> bool {
        true
    }
}

impl Argument for f64 {
    fn is_acceptable(&self) -> bool {
        self.is_finite()
    }
}

impl Argument for i64 {}

impl Argument for u64 {}

fn required<T: Argument>(
    command: &str,
    args: &[&str],
    index: usize,
) -> Result<T, CommandError> {
    let Some(value) = args.get(index) else {
        return Err(CommandError::MissingArgument {
            command: command.to_string(),
        });
    };
    parse(command, value)
}

fn optional<T: Argument>(
    command: &str,
    args: &[&str],
    index: usize,
    default: T,
) -> Result<T, CommandError> {
    match args.get(index) {
        Some(value) => parse(command, value),
        None => Ok(default),
    }
}

fn parse<T: Argument>(command: &str, value: &str) -> Result<T, CommandError> {
    match value.parse::<T>() {
        Ok(parsed) if parsed.is_acceptable() => Ok(parsed),
        _ => Err(invalid(command, value)),
    }
}

fn invalid(command: &str, value: &str) -> CommandError {
    CommandError::InvalidNumber {
        command: command.to_string(),
        value: value.to_string(),
    }
}
