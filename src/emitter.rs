//! Minimal typed publish/subscribe.
//!
//! An [`Emitter`] maps topics to ordered handler lists. `emit` snapshots the
//! handler list for a topic before invoking anything, so handlers may
//! subscribe, unsubscribe, or emit again without disturbing the dispatch in
//! progress. Handlers run synchronously in registration order; a panicking
//! handler propagates to the caller of `emit`.

use std::cell::RefCell;
use std::collections::HashMap;
use std::hash::Hash;
use std::rc::{Rc, Weak};

type Handler<P> = Rc<dyn Fn(&P)>;

struct Entry<P> {
    id: u64,
    once: bool,
    handler: Handler<P>,
}

struct Registry<K, P> {
    next_id: u64,
    topics: HashMap<K, Vec<Entry<P>>>,
}

impl<K: Eq + Hash, P> Registry<K, P> {
    fn remove(&mut self, topic: &K, id: u64) -> bool {
        let Some(entries) = self.topics.get_mut(topic) else {
            return false;
        };
        let before = entries.len();
        entries.retain(|entry| entry.id != id);
        let removed = entries.len() != before;
        if entries.is_empty() {
            self.topics.remove(topic);
        }
        removed
    }
}

/// Topic-keyed handler registry.
///
/// # Example
///
/// ```rust
/// use brewstate::emitter::Emitter;
/// use std::cell::Cell;
/// use std::rc::Rc;
///
/// let emitter: Emitter<&'static str, u32> = Emitter::new();
/// let total = Rc::new(Cell::new(0));
///
/// let sink = Rc::clone(&total);
/// let subscription = emitter.on("tick", move |n| sink.set(sink.get() + n));
///
/// emitter.emit(&"tick", &2);
/// emitter.emit(&"tick", &3);
/// subscription.unsubscribe();
/// emitter.emit(&"tick", &100);
///
/// assert_eq!(total.get(), 5);
/// ```
pub struct Emitter<K, P> {
    registry: Rc<RefCell<Registry<K, P>>>,
}

impl<K: Eq + Hash + Clone + 'static, P: 'static> Emitter<K, P> {
    pub fn new() -> Self {
        Self {
            registry: Rc::new(RefCell::new(Registry {
                next_id: 0,
                topics: HashMap::new(),
            })),
        }
    }

    /// Register `handler` for `topic`.
    pub fn on<F>(&self, topic: K, handler: F) -> Subscription<K, P>
    where
        F: Fn(&P) + 'static,
    {
        self.register(topic, Rc::new(handler), false)
    }

    /// Register `handler` for the next emission on `topic` only.
    pub fn once<F>(&self, topic: K, handler: F) -> Subscription<K, P>
    where
        F: Fn(&P) + 'static,
    {
        self.register(topic, Rc::new(handler), true)
    }

    /// Invoke every handler currently registered for `topic`.
    ///
    /// Returns the number of handlers invoked.
    pub fn emit(&self, topic: &K, payload: &P) -> usize {
        let snapshot: Vec<Handler<P>> = {
            let mut registry = self.registry.borrow_mut();
            let Some(entries) = registry.topics.get_mut(topic) else {
                return 0;
            };
            let snapshot = entries
                .iter()
                .map(|entry| Rc::clone(&entry.handler))
                .collect();
            entries.retain(|entry| !entry.once);
            if entries.is_empty() {
                registry.topics.remove(topic);
            }
            snapshot
        };

        for handler in &snapshot {
            handler(payload);
        }
        snapshot.len()
    }

    /// Number of handlers registered for `topic`.
    pub fn listener_count(&self, topic: &K) -> usize {
        self.registry
            .borrow()
            .topics
            .get(topic)
            .map_or(0, Vec::len)
    }

    fn register(&self, topic: K, handler: Handler<P>, once: bool) -> Subscription<K, P> {
        let mut registry = self.registry.borrow_mut();
        let id = registry.next_id;
        registry.next_id += 1;
        registry
            .topics
            .entry(topic.clone())
            .or_default()
            .push(Entry { id, once, handler });

        Subscription {
            registry: Rc::downgrade(&self.registry),
            topic,
            id,
        }
    }
}

impl<K: Eq + Hash + Clone + 'static, P: 'static> Default for Emitter<K, P> {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle to one registered handler.
///
/// Dropping a subscription leaves the handler registered; call
/// [`Subscription::unsubscribe`] to remove it.
pub struct Subscription<K, P> {
    registry: Weak<RefCell<Registry<K, P>>>,
    topic: K,
    id: u64,
}

impl<K: Eq + Hash, P> Subscription<K, P> {
    /// Remove exactly the handler this subscription was created for.
    ///
    /// Returns `false` if it was already gone (fired `once`, or the emitter
    /// was dropped).
    pub fn unsubscribe(self) -> bool {
        match self.registry.upgrade() {
            Some(registry) => registry.borrow_mut().remove(&self.topic, self.id),
            None => false,
        }
    }

    pub fn topic(&self) -> &K {
        &self.topic
    }
}

impl<K: std::fmt::Debug, P> std::fmt::Debug for Subscription<K, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("topic", &self.topic)
            .field("id", &self.id)
            .finish()
    }
}
