//! Property-based tests for the machine engine and the appliance machines.
//!
//! These tests use proptest to verify properties hold across
//! many randomly generated inputs.

use brewstate::calc::{cooling_constant, INVALID};
use brewstate::core::{Context, ContextField};
use brewstate::engine::{Machine, Topic};
use brewstate::machines::heating::{
    self, HeatingContext, HeatingEvent, HeatingMachine, HeatingState, MEASUREMENTS_PER_CYCLE,
};
use brewstate::{
    context_struct, event_enum, state_enum, transition_to, MachineBuilder, StateBuilder,
};
use proptest::prelude::*;
use std::cell::RefCell;
use std::rc::Rc;

state_enum! {
    enum Dial {
        Start => "start",
        Left => "left",
        Right => "right",
    }
}

event_enum! {
    enum DialEvent: DialEventKind {
        Turn,
        Noise,
    }
}

context_struct! {
    #[derive(Default)]
    struct DialContext: DialField {
        Chosen => chosen: Option<usize>,
        Turns => turns: u32,
    }
}

type DialMachine = Machine<Dial, DialContext, DialEvent>;

fn target_for(index: usize) -> Dial {
    match index % 3 {
        0 => Dial::Start,
        1 => Dial::Left,
        _ => Dial::Right,
    }
}

/// A machine whose `Turn` candidates in `start` pass or fail as given.
fn dial(guards: &[bool]) -> DialMachine {
    let mut start: StateBuilder<Dial, DialContext, DialEvent> = StateBuilder::new();
    for (index, passes) in guards.iter().copied().enumerate() {
        start = start.on(
            DialEventKind::Turn,
            transition_to(target_for(index))
                .when(move |_: &DialContext, _: &DialEvent| passes)
                .action(move |ctx: &mut DialContext, _: &DialEvent| {
                    ctx.chosen = Some(index);
                    ctx.turns += 1;
                }),
        );
    }

    MachineBuilder::<Dial, DialContext, DialEvent>::new()
        .initial(Dial::Start)
        .context(DialContext::default())
        .state(Dial::Start, start)
        .state(Dial::Left, StateBuilder::new())
        .state(Dial::Right, StateBuilder::new())
        .build()
        .unwrap()
}

fn record_dial(machine: &DialMachine) -> Rc<RefCell<Vec<String>>> {
    let log = Rc::new(RefCell::new(Vec::new()));
    let mut topics = vec![Topic::StateChange];
    for state in [Dial::Start, Dial::Left, Dial::Right] {
        topics.push(Topic::StateEnter(state));
        topics.push(Topic::StateExit(state));
    }
    for field in DialContext::FIELDS {
        topics.push(Topic::ContextUpdate(*field));
    }
    for topic in topics {
        let sink = Rc::clone(&log);
        machine.on(topic, move |_| sink.borrow_mut().push(topic.to_string()));
    }
    log
}

fn record_heating(machine: &HeatingMachine) -> Rc<RefCell<Vec<String>>> {
    let log = Rc::new(RefCell::new(Vec::new()));
    let mut topics = vec![Topic::StateChange];
    for state in [HeatingState::Idle, HeatingState::Heating, HeatingState::Pid] {
        topics.push(Topic::StateEnter(state));
        topics.push(Topic::StateExit(state));
    }
    for field in HeatingContext::FIELDS {
        topics.push(Topic::ContextUpdate(*field));
    }
    for topic in topics {
        let sink = Rc::clone(&log);
        machine.on(topic, move |_| sink.borrow_mut().push(topic.to_string()));
    }
    log
}

proptest! {
    #[test]
    fn first_passing_candidate_wins(guards in prop::collection::vec(any::<bool>(), 1..8)) {
        let machine = dial(&guards);
        let log = record_dial(&machine);

        let state = machine.send(DialEvent::Turn);

        match guards.iter().position(|passes| *passes) {
            Some(winner) => {
                prop_assert_eq!(state, target_for(winner));
                prop_assert_eq!(machine.context().chosen, Some(winner));
                prop_assert_eq!(machine.context().turns, 1);
                let lifecycle = log.borrow().iter().filter(|t| t.starts_with("state.")).count();
                if target_for(winner) == Dial::Start {
                    prop_assert_eq!(lifecycle, 0);
                } else {
                    prop_assert_eq!(lifecycle, 3);
                }
            }
            None => {
                prop_assert_eq!(state, Dial::Start);
                prop_assert_eq!(machine.context(), DialContext::default());
                prop_assert!(log.borrow().is_empty());
            }
        }
    }

    #[test]
    fn unmatched_events_change_nothing(
        guards in prop::collection::vec(any::<bool>(), 1..8),
        noise in 1..5usize,
    ) {
        let machine = dial(&guards);
        let log = record_dial(&machine);
        let before = machine.context();

        for _ in 0..noise {
            prop_assert_eq!(machine.send(DialEvent::Noise), Dial::Start);
        }

        prop_assert_eq!(machine.context(), before);
        prop_assert!(log.borrow().is_empty());
    }

    #[test]
    fn self_transition_reports_only_changed_fields(
        temperatures in prop::collection::vec(-20.0f64..120.0, 1..20),
    ) {
        let machine = heating::create().unwrap();
        let log = record_heating(&machine);
        let mut last = machine.context().temperature;

        for temperature in temperatures {
            log.borrow_mut().clear();
            prop_assert_eq!(
                machine.send(HeatingEvent::ReadTemperature { temperature }),
                HeatingState::Idle
            );

            let expected: Vec<String> = if temperature != last {
                vec!["context.update.temperature".to_string()]
            } else {
                Vec::new()
            };
            prop_assert_eq!(&*log.borrow(), &expected);
            last = temperature;
        }
    }

    #[test]
    fn heating_cycle_counts_to_pid(
        target in 40.0f64..100.0,
        reads in prop::collection::vec(0.0f64..100.0, 0..25),
    ) {
        let machine = heating::create().unwrap();
        prop_assert_eq!(machine.send(HeatingEvent::Heat { target }), HeatingState::Heating);

        for temperature in &reads {
            machine.send(HeatingEvent::ReadTemperature { temperature: *temperature });
        }

        let ctx = machine.context();
        prop_assert_eq!(ctx.target, target);
        if reads.len() < MEASUREMENTS_PER_CYCLE as usize {
            prop_assert_eq!(machine.state(), HeatingState::Heating);
            prop_assert_eq!(ctx.counter_measurement as usize, reads.len());
        } else {
            // Further readings are not handled in `pid` until DONE arrives.
            prop_assert_eq!(machine.state(), HeatingState::Pid);
            prop_assert_eq!(ctx.counter_measurement, 0);
            prop_assert_eq!(ctx.temperature, reads[MEASUREMENTS_PER_CYCLE as usize - 1]);
        }
    }

    #[test]
    fn context_copies_are_equal_and_independent(
        temperature in -20.0f64..120.0,
        target in 0.0f64..100.0,
    ) {
        let machine = heating::create().unwrap();
        machine.send(HeatingEvent::ReadTemperature { temperature });
        machine.send(HeatingEvent::Heat { target });

        let mut first = machine.context();
        let second = machine.context();
        prop_assert_eq!(&first, &second);

        first.target += 1.0;
        first.counter_measurement += 3;
        prop_assert_eq!(machine.context(), second);
    }

    #[test]
    fn field_names_match_topics(index in 0..5usize) {
        let field = HeatingContext::FIELDS[index];
        prop_assert_eq!(
            Topic::<HeatingState, _>::ContextUpdate(field).to_string(),
            format!("context.update.{}", field.name())
        );
    }

    #[test]
    fn cooling_constant_sentinel_only_on_domain_errors(
        initial in -50.0f64..150.0,
        later in -50.0f64..150.0,
        ambient in -20.0f64..40.0,
        elapsed in -10.0f64..600.0,
    ) {
        let k = cooling_constant(initial, later, ambient, elapsed);
        if later <= ambient || initial <= ambient || elapsed <= 0.0 {
            prop_assert_eq!(k, INVALID);
        } else {
            let expected = -((later - ambient) / (initial - ambient)).ln() / elapsed;
            prop_assert!((k - expected).abs() < 1e-9);
        }
    }
}
