//! Builder for constructing machines.

use crate::builder::error::{BuildError, TableViolation};
use crate::builder::state::StateBuilder;
use crate::core::{Context, EventKind, MachineEvent, State};
use crate::engine::{Machine, MachineConfig, StateConfig, Transition};
use std::collections::{HashMap, HashSet};
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;

type Check = Validation<(), NonEmptyVec<TableViolation>>;

/// Builder for constructing machines with a fluent API.
///
/// `build` validates the whole table and reports every violation at once,
/// so a broken table fails before the machine ever runs.
pub struct MachineBuilder<S: State, C: Context, E: MachineEvent> {
    initial: Option<S>,
    context: Option<C>,
    states: Vec<(S, StateBuilder<S, C, E>)>,
}

impl<S: State, C: Context, E: MachineEvent> MachineBuilder<S, C, E> {
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            initial: None,
            context: None,
            states: Vec::new(),
        }
    }

    /// Set the initial state (required).
    pub fn initial(mut self, state: S) -> Self {
        self.initial = Some(state);
        self
    }

    /// Set the starting context (required).
    pub fn context(mut self, context: C) -> Self {
        self.context = Some(context);
        self
    }

    /// Declare a state.
    pub fn state(mut self, state: S, definition: StateBuilder<S, C, E>) -> Self {
        self.states.push((state, definition));
        self
    }

    /// Validate the table and start the machine.
    pub fn build(self) -> Result<Machine<S, C, E>, BuildError> {
        let initial = self.initial.ok_or(BuildError::MissingInitialState)?;
        let context = self.context.ok_or(BuildError::MissingContext)?;

        let mut checks: Vec<Check> = Vec::new();
        let mut declared = HashSet::new();
        for (state, _) in &self.states {
            checks.push(if declared.insert(*state) {
                Validation::success(())
            } else {
                Validation::fail(TableViolation::DuplicateState {
                    state: state.name().to_string(),
                })
            });
        }
        checks.push(if declared.contains(&initial) {
            Validation::success(())
        } else {
            Validation::fail(TableViolation::UndeclaredInitialState {
                state: initial.name().to_string(),
            })
        });

        let mut states: HashMap<S, StateConfig<S, C, E>> = HashMap::new();
        for (state, definition) in self.states {
            let mut transitions: HashMap<E::Kind, Vec<Transition<S, C, E>>> = HashMap::new();
            for (kind, candidate) in definition.transitions {
                match candidate.build() {
                    Ok(transition) => {
                        checks.push(check_target(&declared, state, kind, &transition));
                        transitions.entry(kind).or_default().push(transition);
                    }
                    Err(_) => checks.push(Validation::fail(TableViolation::MissingTarget {
                        state: state.name().to_string(),
                        event: kind.name().to_string(),
                    })),
                }
            }

            // Duplicates are already reported; keep the first declaration.
            states.entry(state).or_insert(StateConfig {
                on_enter: definition.on_enter,
                on_exit: definition.on_exit,
                transitions,
            });
        }

        match Validation::all_vec(checks) {
            Validation::Success(_) => {
                Ok(Machine::start(MachineConfig { initial, states }, context))
            }
            Validation::Failure(violations) => {
                Err(BuildError::InvalidTable(violations.iter().cloned().collect()))
            }
        }
    }
}

impl<S: State, C: Context, E: MachineEvent> Default for MachineBuilder<S, C, E> {
    fn default() -> Self {
        Self::new()
    }
}

fn check_target<S: State, C, E, K: EventKind>(
    declared: &HashSet<S>,
    state: S,
    kind: K,
    transition: &Transition<S, C, E>,
) -> Check {
    if declared.contains(&transition.target) {
        Validation::success(())
    } else {
        Validation::fail(TableViolation::UnknownTarget {
            state: state.name().to_string(),
            event: kind.name().to_string(),
            target: transition.target.name().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{transition_to, TransitionBuilder};
    use crate::{context_struct, event_enum, state_enum};

    state_enum! {
        enum TestState {
            Idle => "idle",
            Heating => "heating",
            Done => "done",
        }
        final: [Done]
    }

    event_enum! {
        enum TestEvent: TestEventKind {
            Heat,
            Stop,
        }
    }

    context_struct! {
        #[derive(Default)]
        struct TestContext: TestField {
            Target => target: f64,
        }
    }

    type Builder = MachineBuilder<TestState, TestContext, TestEvent>;

    fn violations(
        result: Result<Machine<TestState, TestContext, TestEvent>, BuildError>,
    ) -> Vec<TableViolation> {
        match result {
            Err(BuildError::InvalidTable(violations)) => violations,
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("expected an invalid table"),
        }
    }

    #[test]
    fn builder_validates_required_fields() {
        let result = Builder::new().context(TestContext::default()).build();
        assert!(matches!(result, Err(BuildError::MissingInitialState)));

        let result = Builder::new().initial(TestState::Idle).build();
        assert!(matches!(result, Err(BuildError::MissingContext)));
    }

    #[test]
    fn fluent_api_builds_machine() {
        let machine = Builder::new()
            .initial(TestState::Idle)
            .context(TestContext::default())
            .state(
                TestState::Idle,
                StateBuilder::new().on(TestEventKind::Heat, transition_to(TestState::Heating)),
            )
            .state(
                TestState::Heating,
                StateBuilder::new().on(TestEventKind::Stop, transition_to(TestState::Done)),
            )
            .state(TestState::Done, StateBuilder::new())
            .build()
            .unwrap();

        assert_eq!(machine.state(), TestState::Idle);
        assert_eq!(machine.config().states().count(), 3);
    }

    #[test]
    fn undeclared_initial_state_is_rejected() {
        let result = Builder::new()
            .initial(TestState::Heating)
            .context(TestContext::default())
            .state(TestState::Idle, StateBuilder::new())
            .build();

        assert_eq!(
            violations(result),
            vec![TableViolation::UndeclaredInitialState {
                state: "heating".to_string()
            }]
        );
    }

    #[test]
    fn all_violations_are_reported_together() {
        let result = Builder::new()
            .initial(TestState::Idle)
            .context(TestContext::default())
            .state(
                TestState::Idle,
                StateBuilder::new()
                    .on(TestEventKind::Heat, transition_to(TestState::Heating))
                    .on(TestEventKind::Stop, TransitionBuilder::new()),
            )
            .state(TestState::Idle, StateBuilder::new())
            .build();

        let found = violations(result);
        assert_eq!(found.len(), 3);
        assert!(found.contains(&TableViolation::DuplicateState {
            state: "idle".to_string()
        }));
        assert!(found.contains(&TableViolation::UnknownTarget {
            state: "idle".to_string(),
            event: "Heat".to_string(),
            target: "heating".to_string(),
        }));
        assert!(found.contains(&TableViolation::MissingTarget {
            state: "idle".to_string(),
            event: "Stop".to_string(),
        }));
    }

    #[test]
    fn invalid_table_error_lists_violations() {
        let result = Builder::new()
            .initial(TestState::Idle)
            .context(TestContext::default())
            .state(
                TestState::Idle,
                StateBuilder::new().on(TestEventKind::Heat, transition_to(TestState::Done)),
            )
            .build();

        let message = result.unwrap_err().to_string();
        assert!(message.contains("targets undeclared state 'done'"));
    }
}
