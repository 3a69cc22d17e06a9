//! Heating controller: the collaborator that closes the loop around the
//! heating machine.
//!
//! Sensor readings go through a Kalman filter into `READ_TEMPERATURE`. When
//! the machine enters `pid`, the controller computes a new output and answers
//! with `DONE` before the triggering `send` returns. Output changes are
//! mapped onto a heater duty cycle.
//!
//! [`ThermistorSensor`] turns a raw divider reading into °C for boards that
//! measure temperature through an NTC thermistor.

use crate::calc::map_range;
use crate::clock::Clock;
use crate::config::ApplianceConfig;
use crate::control::{ControlError, KalmanFilter, Pid, ThermistorParams};
use crate::engine::MachineSubscription;
use crate::machines::heating::{
    HeatingContext, HeatingEvent, HeatingField, HeatingMachine, HeatingState,
};
use std::cell::RefCell;
use std::rc::Rc;
use tracing::{debug, warn};

/// Actuator driven by the controller.
pub trait Heater {
    /// Set the heating element duty cycle, `0.0..=1.0`.
    fn set_duty(&mut self, duty: f64);
}

/// Source of raw temperature readings.
pub trait TemperatureSensor {
    /// Current temperature in °C, or `None` when the sensor cannot be read.
    fn read_celsius(&mut self) -> Option<f64>;
}

/// Analog input returning the divider voltage as a fraction of the
/// reference voltage.
pub trait AnalogInput {
    fn read_fraction(&mut self) -> Option<f64>;
}

/// Temperature sensor backed by a thermistor divider.
pub struct ThermistorSensor<A> {
    input: A,
    params: ThermistorParams,
}

impl<A: AnalogInput> ThermistorSensor<A> {
    pub fn new(input: A, params: ThermistorParams) -> Self {
        Self { input, params }
    }
}

impl<A: AnalogInput> TemperatureSensor for ThermistorSensor<A> {
    fn read_celsius(&mut self) -> Option<f64> {
        let fraction = self.input.read_fraction()?;
        let celsius = self.params.celsius(fraction);
        if celsius.is_none() {
            warn!(fraction, "thermistor reading at the rail, sensor open or shorted");
        }
        celsius
    }
}

type SharedHeater = Rc<RefCell<Box<dyn Heater>>>;
type HeatingSubscription = MachineSubscription<HeatingState, HeatingContext, HeatingEvent>;

/// Drives a heating machine from a sensor and towards a heater.
pub struct HeatingController {
    machine: HeatingMachine,
    sensor: Box<dyn TemperatureSensor>,
    filter: KalmanFilter,
    subscriptions: Vec<HeatingSubscription>,
}

impl HeatingController {
    /// Attach a controller to `machine`.
    pub fn new(
        machine: HeatingMachine,
        config: &ApplianceConfig,
        sensor: Box<dyn TemperatureSensor>,
        heater: Box<dyn Heater>,
        clock: Rc<dyn Clock>,
    ) -> Result<Self, ControlError> {
        let pid = Rc::new(RefCell::new(config.pid.controller()?));
        let heater: SharedHeater = Rc::new(RefCell::new(heater));
        let (min_output, max_output) = (config.pid.min_output, config.pid.max_output);
        let period = config.heating.pid_period_seconds();

        let subscriptions = vec![
            compute_on_pid(&machine, pid, clock, period),
            drive_on_output(&machine, Rc::clone(&heater), min_output, max_output),
            switch_off_on_idle(&machine, heater),
        ];

        Ok(Self {
            machine,
            sensor,
            filter: config.kalman.filter(),
            subscriptions,
        })
    }

    /// Attach a controller that reads a thermistor on `input`, converted with
    /// the `[thermistor]` section of `config`.
    pub fn with_thermistor<A: AnalogInput + 'static>(
        machine: HeatingMachine,
        config: &ApplianceConfig,
        input: A,
        heater: Box<dyn Heater>,
        clock: Rc<dyn Clock>,
    ) -> Result<Self, ControlError> {
        let sensor = ThermistorSensor::new(input, config.thermistor);
        Self::new(machine, config, Box::new(sensor), heater, clock)
    }

    pub fn machine(&self) -> &HeatingMachine {
        &self.machine
    }

    /// Start heating towards `target` °C.
    pub fn heat(&self, target: f64) -> HeatingState {
        self.machine.send(HeatingEvent::Heat { target })
    }

    pub fn stop(&self) -> HeatingState {
        self.machine.send(HeatingEvent::Stop)
    }

    /// Take one filtered reading and feed it to the machine.
    ///
    /// A failed sensor read skips the cycle.
    pub fn tick(&mut self) -> HeatingState {
        let Some(raw) = self.sensor.read_celsius() else {
            warn!("temperature sensor read failed, skipping cycle");
            return self.machine.state();
        };
        let temperature = self.filter.update_estimate(raw);
        self.machine.send(HeatingEvent::ReadTemperature { temperature })
    }
}

impl Drop for HeatingController {
    fn drop(&mut self) {
        for subscription in self.subscriptions.drain(..) {
            subscription.unsubscribe();
        }
    }
}

fn compute_on_pid(
    machine: &HeatingMachine,
    pid: Rc<RefCell<Pid>>,
    clock: Rc<dyn Clock>,
    period: f64,
) -> HeatingSubscription {
    let weak = machine.downgrade();
    machine.on_state_enter(HeatingState::Pid, move |_| {
        let Some(machine) = weak.upgrade() else {
            return;
        };
        let ctx = machine.context();
        let now = clock.now();
        let dt = ctx
            .last_time_pid
            .map(|last| (now - last).num_milliseconds() as f64 / 1000.0)
            .unwrap_or(period);

        let output = {
            let mut pid = pid.borrow_mut();
            pid.set_setpoint(ctx.target);
            pid.compute(ctx.temperature, dt)
        };
        debug!(
            temperature = ctx.temperature,
            target = ctx.target,
            dt,
            output,
            "pid cycle"
        );

        machine.send(HeatingEvent::Done {
            output,
            last_time_pid: now,
        });
    })
}

fn drive_on_output(
    machine: &HeatingMachine,
    heater: SharedHeater,
    min_output: f64,
    max_output: f64,
) -> HeatingSubscription {
    machine.on_context_update(HeatingField::Output, move |update| {
        let Some(output) = update.value.as_f64() else {
            return;
        };
        let duty = map_range(output, min_output, max_output, 0.0, 1.0).clamp(0.0, 1.0);
        heater.borrow_mut().set_duty(duty);
    })
}

fn switch_off_on_idle(machine: &HeatingMachine, heater: SharedHeater) -> HeatingSubscription {
    machine.on_state_enter(HeatingState::Idle, move |_| {
        heater.borrow_mut().set_duty(0.0);
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::machines::heating::{self, MEASUREMENTS_PER_CYCLE};
    use chrono::{Duration, TimeZone, Utc};
    use std::collections::VecDeque;

    struct ScriptedSensor {
        readings: VecDeque<Option<f64>>,
    }

    impl TemperatureSensor for ScriptedSensor {
        fn read_celsius(&mut self) -> Option<f64> {
            self.readings.pop_front().flatten()
        }
    }

    struct ConstantSensor(f64);

    impl TemperatureSensor for ConstantSensor {
        fn read_celsius(&mut self) -> Option<f64> {
            Some(self.0)
        }
    }

    struct ScriptedInput(VecDeque<Option<f64>>);

    impl AnalogInput for ScriptedInput {
        fn read_fraction(&mut self) -> Option<f64> {
            self.0.pop_front().flatten()
        }
    }

    #[derive(Clone, Default)]
    struct RecordingHeater {
        duties: Rc<RefCell<Vec<f64>>>,
    }

    impl Heater for RecordingHeater {
        fn set_duty(&mut self, duty: f64) {
            self.duties.borrow_mut().push(duty);
        }
    }

    fn controller(
        sensor: Box<dyn TemperatureSensor>,
        heater: &RecordingHeater,
        clock: Rc<ManualClock>,
    ) -> HeatingController {
        HeatingController::new(
            heating::create().unwrap(),
            &ApplianceConfig::default(),
            sensor,
            Box::new(heater.clone()),
            clock,
        )
        .unwrap()
    }

    fn clock() -> Rc<ManualClock> {
        Rc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2024, 5, 1, 6, 0, 0).unwrap(),
        ))
    }

    #[test]
    fn ticks_while_idle_only_record_temperature() {
        let heater = RecordingHeater::default();
        let mut controller = controller(Box::new(ConstantSensor(20.0)), &heater, clock());

        assert_eq!(controller.tick(), HeatingState::Idle);
        assert!(controller.machine().context().temperature > 0.0);
        assert!(heater.duties.borrow().is_empty());
    }

    #[test]
    fn full_cycle_drives_heater() {
        let heater = RecordingHeater::default();
        let clock = clock();
        let mut controller = controller(Box::new(ConstantSensor(30.0)), &heater, clock.clone());

        controller.heat(100.0);
        let mut state = HeatingState::Heating;
        for _ in 0..MEASUREMENTS_PER_CYCLE {
            clock.advance(Duration::milliseconds(100));
            state = controller.tick();
        }

        // The pid state is left again before tick returns.
        assert_eq!(state, HeatingState::Heating);
        let ctx = controller.machine().context();
        assert!(ctx.output > 0.0);
        assert_eq!(ctx.last_time_pid, Some(clock.now()));
        assert_eq!(ctx.counter_measurement, 0);

        let duties = heater.duties.borrow();
        assert_eq!(duties.len(), 1);
        assert!(duties[0] > 0.0 && duties[0] <= 1.0);
    }

    #[test]
    fn second_cycle_uses_elapsed_time() {
        let heater = RecordingHeater::default();
        let clock = clock();
        let mut controller = controller(Box::new(ConstantSensor(30.0)), &heater, clock.clone());

        controller.heat(100.0);
        for _ in 0..2 * MEASUREMENTS_PER_CYCLE {
            clock.advance(Duration::milliseconds(100));
            controller.tick();
        }

        assert_eq!(heater.duties.borrow().len(), 2);
        assert_eq!(controller.machine().context().last_time_pid, Some(clock.now()));
    }

    #[test]
    fn failed_reads_skip_the_cycle() {
        let heater = RecordingHeater::default();
        let sensor = ScriptedSensor {
            readings: VecDeque::from(vec![None, Some(25.0), None]),
        };
        let mut controller = controller(Box::new(sensor), &heater, clock());
        controller.heat(90.0);

        controller.tick();
        assert_eq!(controller.machine().context().counter_measurement, 0);
        controller.tick();
        assert_eq!(controller.machine().context().counter_measurement, 1);
        controller.tick();
        assert_eq!(controller.machine().context().counter_measurement, 1);
    }

    #[test]
    fn stop_switches_heater_off() {
        let heater = RecordingHeater::default();
        let controller = controller(Box::new(ConstantSensor(30.0)), &heater, clock());

        controller.heat(100.0);
        assert_eq!(controller.stop(), HeatingState::Idle);
        assert_eq!(*heater.duties.borrow(), vec![0.0]);
    }

    #[test]
    fn dropping_the_controller_detaches_it() {
        let heater = RecordingHeater::default();
        let controller = controller(Box::new(ConstantSensor(30.0)), &heater, clock());
        let machine = controller.machine().clone();
        drop(controller);

        machine.send(HeatingEvent::Heat { target: 100.0 });
        machine.send(HeatingEvent::Stop);
        assert!(heater.duties.borrow().is_empty());
    }

    #[test]
    fn thermistor_sensor_converts_and_rejects_rails() {
        let params = ThermistorParams {
            r_series: 10_000.0,
            ..ThermistorParams::default()
        };
        let input = ScriptedInput(VecDeque::from(vec![Some(0.5), Some(1.0), None, Some(0.0)]));
        let mut sensor = ThermistorSensor::new(input, params);

        let celsius = sensor.read_celsius().unwrap();
        assert!((celsius - 25.0).abs() < 1e-9);
        assert_eq!(sensor.read_celsius(), None);
        assert_eq!(sensor.read_celsius(), None);
        assert_eq!(sensor.read_celsius(), None);
    }

    #[test]
    fn thermistor_controller_feeds_converted_readings() {
        let heater = RecordingHeater::default();
        let input = ScriptedInput(VecDeque::from(vec![Some(0.05), Some(1.0)]));
        let mut controller = HeatingController::with_thermistor(
            heating::create().unwrap(),
            &ApplianceConfig::default(),
            input,
            Box::new(heater.clone()),
            clock(),
        )
        .unwrap();
        controller.heat(90.0);

        controller.tick();
        assert_eq!(controller.machine().context().counter_measurement, 1);
        assert!(controller.machine().context().temperature > 0.0);
        // A shorted divider is skipped like any failed read.
        controller.tick();
        assert_eq!(controller.machine().context().counter_measurement, 1);
    }

    #[test]
    fn empty_output_range_is_refused() {
        let mut config = ApplianceConfig::default();
        config.pid.min_output = 100.0;
        config.pid.max_output = 100.0;

        let result = HeatingController::new(
            heating::create().unwrap(),
            &config,
            Box::new(ConstantSensor(30.0)),
            Box::new(RecordingHeater::default()),
            clock(),
        );
        assert!(matches!(result, Err(ControlError::InvertedLimits { .. })));
    }
}
