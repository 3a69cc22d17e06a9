//! Event-driven state machine handle.

use crate::core::{Context, EventKind, MachineEvent, State};
use crate::emitter::{Emitter, Subscription};
use crate::engine::notification::{FieldUpdate, Notification, StateChange, Topic};
use crate::engine::transition::MachineConfig;
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use tracing::{debug, trace, warn};

/// Topic type of a machine.
pub type MachineTopic<S, C> = Topic<S, <C as Context>::Field>;

/// Payload type of a machine.
pub type MachineNotification<S, C, E> = Notification<S, <C as Context>::Field, E>;

/// Subscription handle returned by a machine.
pub type MachineSubscription<S, C, E> =
    Subscription<MachineTopic<S, C>, MachineNotification<S, C, E>>;

struct Runtime<S, C> {
    current: S,
    context: C,
}

struct Inner<S: State, C: Context, E: MachineEvent> {
    config: MachineConfig<S, C, E>,
    runtime: RefCell<Runtime<S, C>>,
    emitter: Emitter<MachineTopic<S, C>, MachineNotification<S, C, E>>,
}

/// A running machine.
///
/// `Machine` is a cheap handle: clones share the same current state, context
/// and subscribers. Everything runs on the caller's thread. No internal
/// borrow is held while guards, actions, hooks or subscribers run, so any of
/// them may call back into the machine, including a nested [`Machine::send`].
///
/// Build one with [`MachineBuilder`](crate::builder::MachineBuilder).
pub struct Machine<S: State, C: Context, E: MachineEvent> {
    inner: Rc<Inner<S, C, E>>,
}

impl<S: State, C: Context, E: MachineEvent> Clone for Machine<S, C, E> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<S: State, C: Context, E: MachineEvent> Machine<S, C, E> {
    /// Start a machine from a validated table, running the initial state's
    /// entry hook with no event.
    pub(crate) fn start(config: MachineConfig<S, C, E>, mut context: C) -> Self {
        let current = config.initial;
        if let Some(initial) = config.state(&current) {
            initial.enter(&mut context, None);
        }
        debug!(state = current.name(), "machine started");

        Self {
            inner: Rc::new(Inner {
                config,
                runtime: RefCell::new(Runtime { current, context }),
                emitter: Emitter::new(),
            }),
        }
    }

    /// Current state identifier.
    pub fn state(&self) -> S {
        self.inner.runtime.borrow().current
    }

    /// Copy of the current context.
    pub fn context(&self) -> C {
        self.inner.runtime.borrow().context.clone()
    }

    /// Whether the machine is currently in `state`.
    pub fn matches(&self, state: S) -> bool {
        self.state() == state
    }

    /// Whether the current state is terminal.
    pub fn is_final(&self) -> bool {
        self.state().is_final()
    }

    /// Overwrite context fields directly.
    ///
    /// Bypasses guards, actions and notifications entirely. Meant for test
    /// setup and administrative resets, not for driving behaviour.
    pub fn update_context<F>(&self, update: F)
    where
        F: FnOnce(&mut C),
    {
        let mut working = self.context();
        update(&mut working);
        self.inner.runtime.borrow_mut().context = working;
    }

    /// Feed an event to the machine and return the state it ends up in.
    ///
    /// Candidates declared for the event's kind in the current state are
    /// tried in order; the first one whose guard passes is applied and ends
    /// the evaluation, whether it is a self-transition or not. Unknown events
    /// and exhausted guards leave the machine untouched.
    pub fn send(&self, event: E) -> S {
        let current = self.state();
        let kind = event.kind();

        let Some(source) = self.inner.config.state(&current) else {
            // Unreachable for a built machine: every target is declared.
            warn!(state = current.name(), "current state has no definition");
            return current;
        };

        let Some(candidates) = source.candidates(&kind) else {
            warn!(
                state = current.name(),
                event = kind.name(),
                "no transition for event"
            );
            return current;
        };

        for transition in candidates {
            let live = self.context();
            if !transition.permits(&live, &event) {
                continue;
            }

            let mut staged = live.clone();
            transition.apply(&mut staged, &event);

            if transition.target == current {
                let changed = staged.changed_fields(&live);
                trace!(
                    state = current.name(),
                    event = kind.name(),
                    changed = changed.len(),
                    "self-transition"
                );
                self.inner.runtime.borrow_mut().context = staged.clone();
                self.publish_updates(&staged, &changed);
                return self.state();
            }

            let target = transition.target;
            let Some(destination) = self.inner.config.state(&target) else {
                warn!(
                    state = current.name(),
                    target = target.name(),
                    "transition target has no definition"
                );
                return current;
            };

            // Exit hook sees the context as it was before this transition's
            // action; the action's own field changes are merged afterwards.
            let mut committed = live.clone();
            source.exit(&mut committed, Some(&event));
            for field in staged.changed_fields(&live) {
                committed.copy_field(&staged, field);
            }
            destination.enter(&mut committed, Some(&event));

            let changed = committed.changed_fields(&live);
            {
                let mut runtime = self.inner.runtime.borrow_mut();
                runtime.current = target;
                runtime.context = committed.clone();
            }
            debug!(
                from = current.name(),
                to = target.name(),
                event = kind.name(),
                "transition"
            );

            self.publish_updates(&committed, &changed);
            self.publish_lifecycle(current, target, &event);
            return self.state();
        }

        trace!(
            state = current.name(),
            event = kind.name(),
            "all guards rejected event"
        );
        current
    }

    /// Subscribe to a topic.
    pub fn on<F>(&self, topic: MachineTopic<S, C>, handler: F) -> MachineSubscription<S, C, E>
    where
        F: Fn(&MachineNotification<S, C, E>) + 'static,
    {
        self.inner.emitter.on(topic, handler)
    }

    /// Subscribe to the next emission on a topic only.
    pub fn once<F>(&self, topic: MachineTopic<S, C>, handler: F) -> MachineSubscription<S, C, E>
    where
        F: Fn(&MachineNotification<S, C, E>) + 'static,
    {
        self.inner.emitter.once(topic, handler)
    }

    /// Subscribe to `state.enter.<state>`.
    pub fn on_state_enter<F>(&self, state: S, handler: F) -> MachineSubscription<S, C, E>
    where
        F: Fn(&StateChange<S, E>) + 'static,
    {
        self.on(Topic::StateEnter(state), lifecycle(handler))
    }

    /// Subscribe to `state.exit.<state>`.
    pub fn on_state_exit<F>(&self, state: S, handler: F) -> MachineSubscription<S, C, E>
    where
        F: Fn(&StateChange<S, E>) + 'static,
    {
        self.on(Topic::StateExit(state), lifecycle(handler))
    }

    /// Subscribe to `state.change`.
    pub fn on_state_change<F>(&self, handler: F) -> MachineSubscription<S, C, E>
    where
        F: Fn(&StateChange<S, E>) + 'static,
    {
        self.on(Topic::StateChange, lifecycle(handler))
    }

    /// Subscribe to `context.update.<field>`.
    pub fn on_context_update<F>(&self, field: C::Field, handler: F) -> MachineSubscription<S, C, E>
    where
        F: Fn(&FieldUpdate<C::Field>) + 'static,
    {
        self.on(Topic::ContextUpdate(field), move |notification| {
            if let Notification::ContextUpdate(update) = notification {
                handler(update);
            }
        })
    }

    /// Number of handlers on a topic.
    pub fn listener_count(&self, topic: &MachineTopic<S, C>) -> usize {
        self.inner.emitter.listener_count(topic)
    }

    /// Non-owning handle, for subscribers that need to call back into the
    /// machine without keeping it alive.
    pub fn downgrade(&self) -> WeakMachine<S, C, E> {
        WeakMachine {
            inner: Rc::downgrade(&self.inner),
        }
    }

    /// The transition table this machine was built from.
    pub fn config(&self) -> &MachineConfig<S, C, E> {
        &self.inner.config
    }

    fn publish_updates(&self, context: &C, changed: &[C::Field]) {
        for field in changed {
            let notification = Notification::ContextUpdate(FieldUpdate {
                field: *field,
                value: context.field_value(*field),
            });
            self.inner
                .emitter
                .emit(&Topic::ContextUpdate(*field), &notification);
        }
    }

    fn publish_lifecycle(&self, previous: S, current: S, event: &E) {
        let notification = Notification::Lifecycle(StateChange {
            previous,
            current,
            event: event.clone(),
        });
        let emitter = &self.inner.emitter;
        emitter.emit(&Topic::StateExit(previous), &notification);
        emitter.emit(&Topic::StateEnter(current), &notification);
        emitter.emit(&Topic::StateChange, &notification);
    }
}

fn lifecycle<S, F, E, H>(handler: H) -> impl Fn(&Notification<S, F, E>) + 'static
where
    H: Fn(&StateChange<S, E>) + 'static,
{
    move |notification| {
        if let Notification::Lifecycle(change) = notification {
            handler(change);
        }
    }
}

impl<S: State, C: Context, E: MachineEvent> std::fmt::Debug for Machine<S, C, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let runtime = self.inner.runtime.borrow();
        f.debug_struct("Machine")
            .field("state", &runtime.current)
            .field("context", &runtime.context)
            .finish()
    }
}

/// Weak counterpart of [`Machine`].
pub struct WeakMachine<S: State, C: Context, E: MachineEvent> {
    inner: Weak<Inner<S, C, E>>,
}

impl<S: State, C: Context, E: MachineEvent> WeakMachine<S, C, E> {
    /// Recover a strong handle, or `None` once every `Machine` is dropped.
    pub fn upgrade(&self) -> Option<Machine<S, C, E>> {
        self.inner.upgrade().map(|inner| Machine { inner })
    }
}

impl<S: State, C: Context, E: MachineEvent> Clone for WeakMachine<S, C, E> {
    fn clone(&self) -> Self {
        Self {
            inner: Weak::clone(&self.inner),
        }
    }
}
