//! Heating sub-machine: collects temperature readings and hands control to
//! a PID collaborator every [`MEASUREMENTS_PER_CYCLE`] readings.
//!
//! ```text
//! idle --HEAT--> heating --READ_TEMPERATURE (10th)--> pid
//!                   ^  \--STOP--> idle                 |
//!                   \-----------------DONE-------------/
//! ```
//!
//! Whoever listens on `state.enter.pid` is expected to compute an output and
//! answer with [`HeatingEvent::Done`]; the stored output is then published on
//! `context.update.output`.

use crate::builder::{transition_to, BuildError, MachineBuilder, StateBuilder};
use crate::engine::Machine;
use crate::{context_struct, event_enum, state_enum};
use chrono::{DateTime, Utc};

/// Readings taken in `heating` before control passes to `pid`.
pub const MEASUREMENTS_PER_CYCLE: u32 = 10;

state_enum! {
    pub enum HeatingState {
        Idle => "idle",
        Heating => "heating",
        Pid => "pid",
    }
}

event_enum! {
    pub enum HeatingEvent: HeatingEventKind {
        ReadTemperature { temperature: f64 },
        Heat { target: f64 },
        Stop,
        Done { output: f64, last_time_pid: DateTime<Utc> },
    }
}

context_struct! {
    #[derive(Default)]
    pub struct HeatingContext: HeatingField {
        Temperature => temperature: f64,
        Target => target: f64,
        CounterMeasurement => counter_measurement: u32,
        Output => output: f64,
        LastTimePid => last_time_pid: Option<DateTime<Utc>>,
    }
}

pub type HeatingMachine = Machine<HeatingState, HeatingContext, HeatingEvent>;

fn record_temperature(ctx: &mut HeatingContext, event: &HeatingEvent) {
    if let HeatingEvent::ReadTemperature { temperature } = event {
        ctx.temperature = *temperature;
    }
}

/// Build the heating machine, starting in `idle` with an empty context.
pub fn create() -> Result<HeatingMachine, BuildError> {
    MachineBuilder::<HeatingState, HeatingContext, HeatingEvent>::new()
        .initial(HeatingState::Idle)
        .context(HeatingContext::default())
        .state(
            HeatingState::Idle,
            StateBuilder::new()
                .on(
                    HeatingEventKind::ReadTemperature,
                    transition_to(HeatingState::Idle).action(record_temperature),
                )
                .on(
                    HeatingEventKind::Heat,
                    transition_to(HeatingState::Heating).action(
                        |ctx: &mut HeatingContext, event: &HeatingEvent| {
                            if let HeatingEvent::Heat { target } = event {
                                ctx.target = *target;
                            }
                        },
                    ),
                ),
        )
        .state(
            HeatingState::Heating,
            StateBuilder::new()
                .on_exit(|ctx: &mut HeatingContext, _| ctx.counter_measurement = 0)
                // The guards count the reading being delivered, so they stay
                // complementary: readings 1..=9 stay, reading 10 advances.
                .on(
                    HeatingEventKind::ReadTemperature,
                    transition_to(HeatingState::Heating)
                        .when(|ctx: &HeatingContext, _: &HeatingEvent| {
                            ctx.counter_measurement + 1 < MEASUREMENTS_PER_CYCLE
                        })
                        .action(|ctx: &mut HeatingContext, event: &HeatingEvent| {
                            ctx.counter_measurement += 1;
                            record_temperature(ctx, event);
                        }),
                )
                .on(
                    HeatingEventKind::ReadTemperature,
                    transition_to(HeatingState::Pid)
                        .when(|ctx: &HeatingContext, _: &HeatingEvent| {
                            ctx.counter_measurement + 1 >= MEASUREMENTS_PER_CYCLE
                        })
                        .action(record_temperature),
                )
                .on(HeatingEventKind::Stop, transition_to(HeatingState::Idle)),
        )
        .state(
            HeatingState::Pid,
            StateBuilder::new().on(
                HeatingEventKind::Done,
                transition_to(HeatingState::Heating).action(
                    |ctx: &mut HeatingContext, event: &HeatingEvent| {
                        if let HeatingEvent::Done {
                            output,
                            last_time_pid,
                        } = event
                        {
                            ctx.output = *output;
                            ctx.last_time_pid = Some(*last_time_pid);
                        }
                    },
                ),
            ),
        )
        .build()
}
