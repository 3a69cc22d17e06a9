//! Guard predicates for controlling state transitions.
//!
//! Guards are pure boolean functions over the machine context and the
//! incoming event. A transition candidate whose guard rejects is skipped
//! without running its action.

/// Pure predicate that determines if a transition candidate applies.
///
/// # Example
///
/// ```rust
/// use brewstate::core::Guard;
///
/// struct Reading {
///     celsius: f64,
/// }
///
/// let hot_enough = Guard::new(|target: &f64, reading: &Reading| reading.celsius >= *target);
///
/// assert!(hot_enough.check(&90.0, &Reading { celsius: 95.0 }));
/// assert!(!hot_enough.check(&90.0, &Reading { celsius: 20.0 }));
/// ```
pub struct Guard<C, E> {
    predicate: Box<dyn Fn(&C, &E) -> bool>,
}

impl<C, E> Guard<C, E> {
    /// Create a guard from a predicate over `(context, event)`.
    ///
    /// The predicate should be deterministic for a given context and event;
    /// the engine may evaluate it at most once per candidate per `send`.
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&C, &E) -> bool + 'static,
    {
        Guard {
            predicate: Box::new(predicate),
        }
    }

    /// Evaluate the guard.
    pub fn check(&self, context: &C, event: &E) -> bool {
        (self.predicate)(context, event)
    }
}

impl<C, E> std::fmt::Debug for Guard<C, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Guard(..)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Debug)]
    struct Counter {
        value: u32,
    }

    #[derive(Clone, Debug)]
    enum Tick {
        Read(f64),
        Stop,
    }

    #[test]
    fn guard_sees_context() {
        let guard = Guard::new(|ctx: &Counter, _: &Tick| ctx.value < 10);

        assert!(guard.check(&Counter { value: 3 }, &Tick::Stop));
        assert!(!guard.check(&Counter { value: 10 }, &Tick::Stop));
    }

    #[test]
    fn guard_sees_event_payload() {
        let guard = Guard::new(|_: &Counter, event: &Tick| match event {
            Tick::Read(celsius) => *celsius > 50.0,
            Tick::Stop => false,
        });

        assert!(guard.check(&Counter { value: 0 }, &Tick::Read(60.0)));
        assert!(!guard.check(&Counter { value: 0 }, &Tick::Read(20.0)));
        assert!(!guard.check(&Counter { value: 0 }, &Tick::Stop));
    }

    #[test]
    fn guard_is_deterministic() {
        let ctx = Counter { value: 5 };
        let guard = Guard::new(|c: &Counter, _: &Tick| c.value % 2 == 1);

        assert_eq!(guard.check(&ctx, &Tick::Stop), guard.check(&ctx, &Tick::Stop));
    }

    #[test]
    fn complementary_guards_never_overlap() {
        let below = Guard::new(|c: &Counter, _: &Tick| c.value + 1 < 10);
        let at_or_above = Guard::new(|c: &Counter, _: &Tick| c.value + 1 >= 10);

        for value in 0..20 {
            let ctx = Counter { value };
            assert_ne!(below.check(&ctx, &Tick::Stop), at_or_above.check(&ctx, &Tick::Stop));
        }
    }
}
