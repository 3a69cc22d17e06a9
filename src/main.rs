//! # brewstate
//!
//! Runs a command script against the main appliance machine and logs every
//! state change and context update.
//!
//! Time is simulated: `WAIT`/`DELAY` advance the machine clock instantly
//! unless `--realtime` is given.

use brewstate::clock::{Clock, ManualClock};
use brewstate::command::{parse_line, Command};
use brewstate::config::ApplianceConfig;
use brewstate::core::{Context, ContextField};
use brewstate::machines::main::{self as main_machine, MainContext, MainMachine};
use chrono::Utc;
use clap::Parser;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;
use std::process;
use std::rc::Rc;
use tracing::{error, info, warn, Level};
use tracing_subscriber::EnvFilter;

/// Brewing appliance state machine simulator
#[derive(Parser, Debug)]
#[command(name = "brewstate")]
#[command(version)]
#[command(about = "Run a command script against the brewing appliance state machine")]
struct Args {
    /// Command script; reads stdin when absent.
    #[arg(long, value_name = "FILE")]
    script: Option<PathBuf>,

    /// Appliance configuration TOML.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Sleep through delays instead of advancing the clock instantly.
    #[arg(long)]
    realtime: bool,

    /// Enable verbose logging (DEBUG level).
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let args = Args::parse();
    setup_tracing(&args);

    if let Err(e) = run(&args) {
        error!("FATAL: {e}");
        process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let config = match &args.config {
        Some(path) => {
            info!("Loading config from {:?}", path);
            ApplianceConfig::load(path)?
        }
        None => ApplianceConfig::default(),
    };

    let clock = Rc::new(ManualClock::new(Utc::now()));
    let machine = main_machine::create_with_clock(clock.clone())?;
    machine.update_context(|ctx| ctx.pid = config.pid.tunings());
    log_notifications(&machine);
    info!(state = %machine.state(), "machine started");

    let reader: Box<dyn BufRead> = match &args.script {
        Some(path) => Box::new(BufReader::new(File::open(path)?)),
        None => Box::new(BufReader::new(io::stdin())),
    };

    run_script(reader, &machine, &clock, args.realtime)?;
    Ok(())
}

/// Feed every line of `reader` to `machine`, stopping at a terminal state.
fn run_script<R: BufRead>(
    reader: R,
    machine: &MainMachine,
    clock: &ManualClock,
    realtime: bool,
) -> io::Result<()> {
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let command = match parse_line(&line, clock.now()) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                warn!(line = index + 1, "{e}");
                continue;
            }
        };

        match command {
            Command::Event(event) => {
                machine.send(event);
            }
            Command::Delay(delay) => {
                info!(seconds = delay.as_secs_f64(), "waiting");
                if realtime {
                    std::thread::sleep(delay);
                }
                let advanced = chrono::Duration::from_std(delay)
                    .ok()
                    .and_then(|step| clock.advance(step));
                if advanced.is_none() {
                    warn!(line = index + 1, "delay out of range, clock unchanged");
                }
            }
        }

        if machine.is_final() {
            info!(state = %machine.state(), "terminal state reached");
            break;
        }
    }

    Ok(())
}

fn log_notifications(machine: &MainMachine) {
    machine.on_state_change(|change| {
        info!(
            from = %change.previous,
            to = %change.current,
            event = ?change.event,
            "state change"
        );
    });
    for field in MainContext::FIELDS {
        machine.on_context_update(*field, |update| {
            info!(field = update.field.name(), value = %update.value, "context update");
        });
    }
}

/// Setup tracing subscriber based on CLI arguments.
fn setup_tracing(args: &Args) {
    let level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .compact()
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use brewstate::machines::main::MainState;
    use chrono::{Duration, TimeZone};

    fn start() -> Rc<ManualClock> {
        Rc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2024, 5, 1, 6, 0, 0).unwrap(),
        ))
    }

    #[test]
    fn script_drives_machine_and_clock() {
        let clock = start();
        let begin = clock.now();
        let machine = main_machine::create_with_clock(clock.clone()).unwrap();
        let script = "# warm up\nTEMPERATURE nan\nWAIT 30\nHEAT 60\nREAD_ME\nDELAY 2\n";

        run_script(script.as_bytes(), &machine, &clock, false).unwrap();

        assert_eq!(machine.state(), MainState::Heating);
        assert_eq!(machine.context().target_temperature, 60.0);
        assert_eq!(clock.now(), begin + Duration::seconds(32));
    }

    #[test]
    fn script_stops_at_terminal_state() {
        let clock = start();
        let machine = main_machine::create_with_clock(clock.clone()).unwrap();

        run_script("STOP\nHEAT 80\n".as_bytes(), &machine, &clock, false).unwrap();

        assert_eq!(machine.state(), MainState::Done);
        assert_eq!(machine.context().target_temperature, 0.0);
    }
}
