//! Main appliance machine: collects brewing parameters while idle, then
//! either waits for a deadline (`preparing`) or heats straight to a target.
//!
//! Every non-terminal state accepts `STOP`, which ends in the terminal
//! `done` state.

use crate::builder::{transition_to, BuildError, MachineBuilder, StateBuilder, TransitionBuilder};
use crate::calc::heating_time_seconds;
use crate::clock::{Clock, SystemClock};
use crate::control::PidTunings;
use crate::engine::Machine;
use crate::{context_struct, event_enum, state_enum};
use chrono::{DateTime, Utc};
use std::rc::Rc;

state_enum! {
    pub enum MainState {
        Idle => "idle",
        Preparing => "preparing",
        Confirm => "confirm",
        Timer => "timer",
        Heating => "heating",
        Done => "done",
    }
    final: [Done]
}

event_enum! {
    pub enum MainEvent: MainEventKind {
        Stop,
        EnterConfirm,
        Confirm,
        Temperature { temperature: f64 },
        ReadTemperature { temperature: f64 },
        HysteresisTemp { temperature: f64 },
        HysteresisTime { time: f64 },
        Volume { volume: f64 },
        WaitTemperature { temperature: f64 },
        Pid { kp: f64, ki: f64, kd: f64, p_on: f64 },
        Watts { watts: f64 },
        PrepareAbsoluteTime { preparing_time: DateTime<Utc> },
    }
}

context_struct! {
    #[derive(Default)]
    pub struct MainContext: MainField {
        Pid => pid: PidTunings,
        CurrentTemperature => current_temperature: f64,
        TargetTemperature => target_temperature: f64,
        HysteresisTemp => hysteresis_temp: f64,
        HysteresisTime => hysteresis_time: f64,
        Volume => volume: f64,
        Watts => watts: f64,
        PreparingTime => preparing_time: Option<DateTime<Utc>>,
    }
}

pub type MainMachine = Machine<MainState, MainContext, MainEvent>;
type MainTransition = TransitionBuilder<MainState, MainContext, MainEvent>;

/// Build the main machine against the system clock.
pub fn create() -> Result<MainMachine, BuildError> {
    create_with_clock(Rc::new(SystemClock))
}

/// Build the main machine reading time from `clock`.
pub fn create_with_clock(clock: Rc<dyn Clock>) -> Result<MainMachine, BuildError> {
    MachineBuilder::<MainState, MainContext, MainEvent>::new()
        .initial(MainState::Idle)
        .context(MainContext::default())
        .state(MainState::Idle, idle())
        .state(
            MainState::Preparing,
            StateBuilder::new()
                .on(
                    MainEventKind::ReadTemperature,
                    transition_to(MainState::Preparing)
                        .when(move |ctx: &MainContext, _: &MainEvent| {
                            has_lead_time(ctx, clock.now())
                        })
                        .action(record_temperature),
                )
                .on(MainEventKind::Stop, transition_to(MainState::Done)),
        )
        .state(
            MainState::Confirm,
            StateBuilder::new()
                .on(MainEventKind::Stop, transition_to(MainState::Done))
                .on(MainEventKind::Confirm, transition_to(MainState::Idle)),
        )
        .state(
            MainState::Timer,
            StateBuilder::new().on(MainEventKind::Stop, transition_to(MainState::Done)),
        )
        .state(
            MainState::Heating,
            StateBuilder::new()
                .on(
                    MainEventKind::ReadTemperature,
                    transition_to(MainState::Idle)
                        .when(|ctx: &MainContext, event: &MainEvent| {
                            matches!(
                                event,
                                MainEvent::ReadTemperature { temperature }
                                    if *temperature >= ctx.target_temperature - ctx.hysteresis_temp
                            )
                        })
                        .action(record_temperature),
                )
                .on(
                    MainEventKind::ReadTemperature,
                    transition_to(MainState::Heating).action(record_temperature),
                )
                .on(MainEventKind::Stop, transition_to(MainState::Done)),
        )
        .state(MainState::Done, StateBuilder::new())
        .build()
}

fn idle() -> StateBuilder<MainState, MainContext, MainEvent> {
    StateBuilder::new()
        .on(MainEventKind::Stop, transition_to(MainState::Done))
        .on(MainEventKind::EnterConfirm, transition_to(MainState::Confirm))
        .on(
            MainEventKind::Temperature,
            set(|ctx, event| {
                if let MainEvent::Temperature { temperature } = event {
                    ctx.target_temperature = *temperature;
                }
            }),
        )
        .on(
            MainEventKind::Volume,
            set(|ctx, event| {
                if let MainEvent::Volume { volume } = event {
                    ctx.volume = *volume;
                }
            }),
        )
        .on(
            MainEventKind::HysteresisTemp,
            set(|ctx, event| {
                if let MainEvent::HysteresisTemp { temperature } = event {
                    ctx.hysteresis_temp = *temperature;
                }
            }),
        )
        .on(
            MainEventKind::HysteresisTime,
            set(|ctx, event| {
                if let MainEvent::HysteresisTime { time } = event {
                    ctx.hysteresis_time = *time;
                }
            }),
        )
        .on(
            MainEventKind::Pid,
            set(|ctx, event| {
                if let MainEvent::Pid { kp, ki, kd, p_on } = event {
                    ctx.pid = PidTunings {
                        kp: *kp,
                        ki: *ki,
                        kd: *kd,
                        p_on: *p_on,
                    };
                }
            }),
        )
        .on(
            MainEventKind::Watts,
            set(|ctx, event| {
                if let MainEvent::Watts { watts } = event {
                    ctx.watts = *watts;
                }
            }),
        )
        .on(
            MainEventKind::PrepareAbsoluteTime,
            transition_to(MainState::Preparing).action(
                |ctx: &mut MainContext, event: &MainEvent| {
                    if let MainEvent::PrepareAbsoluteTime { preparing_time } = event {
                        ctx.preparing_time = Some(*preparing_time);
                    }
                },
            ),
        )
        .on(
            MainEventKind::WaitTemperature,
            transition_to(MainState::Heating).action(
                |ctx: &mut MainContext, event: &MainEvent| {
                    if let MainEvent::WaitTemperature { temperature } = event {
                        ctx.target_temperature = *temperature;
                    }
                },
            ),
        )
}

/// Parameter setter: a self-transition on `idle`.
fn set<F>(action: F) -> MainTransition
where
    F: Fn(&mut MainContext, &MainEvent) + 'static,
{
    transition_to(MainState::Idle).action(action)
}

fn record_temperature(ctx: &mut MainContext, event: &MainEvent) {
    if let MainEvent::ReadTemperature { temperature } = event {
        ctx.current_temperature = *temperature;
    }
}

/// Whether the deadline still leaves enough time to heat the water.
///
/// A missing deadline or a non-finite heating estimate (no power configured)
/// counts as no lead time.
fn has_lead_time(ctx: &MainContext, now: DateTime<Utc>) -> bool {
    let Some(deadline) = ctx.preparing_time else {
        return false;
    };
    let needed = heating_time_seconds(
        ctx.volume,
        ctx.watts,
        ctx.current_temperature,
        ctx.target_temperature,
    );
    if !needed.is_finite() {
        return false;
    }
    let remaining = (deadline - now).num_milliseconds() as f64 / 1000.0;
    remaining >= needed
}
