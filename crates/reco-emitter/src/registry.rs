use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::atomic::{AtomicU64, Ordering};

/// Opaque handle returned by [`Registry::on`], passed back to [`Registry::off`].
///
/// The spec's reference API removes handlers by reference identity
/// (`off(channel, handler)`); Rust closures don't carry a stable identity to
/// compare against, so `on` hands the caller a token instead. This is a
/// deliberate, documented generalization of the spec's `off` signature, not
/// a semantic change: the caller still controls exactly which subscription
/// is removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Single-channel handler list with registration-order delivery and panic
/// containment (spec.md §4.3). Generic over the event payload type so
/// `Emitter` can hold one of these per channel without triplicating the
/// dispatch logic.
pub struct Registry<T> {
    handlers: Vec<(SubscriptionId, Box<dyn Fn(&T) + Send + Sync>)>,
    next_id: AtomicU64,
    emitted: AtomicU64,
    handler_panics: AtomicU64,
}

impl<T> Default for Registry<T> {
    fn default() -> Self {
        Self {
            handlers: Vec::new(),
            next_id: AtomicU64::new(1),
            emitted: AtomicU64::new(0),
            handler_panics: AtomicU64::new(0),
        }
    }
}

impl<T> Registry<T> {
    pub fn on(&mut self, handler: impl Fn(&T) + Send + Sync + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.handlers.push((id, Box::new(handler)));
        id
    }

    pub fn off(&mut self, id: SubscriptionId) -> bool {
        let before = self.handlers.len();
        self.handlers.retain(|(existing, _)| *existing != id);
        self.handlers.len() != before
    }

    pub fn remove_all(&mut self) {
        self.handlers.clear();
    }

    pub fn listener_count(&self) -> usize {
        self.handlers.len()
    }

    /// Invokes every handler in registration order, catching panics so one
    /// faulty handler never prevents the rest from observing the event.
    /// Returns the number of handlers whose invocation panicked, so callers
    /// that need to escalate (entity/remove channels escalate to a
    /// diagnostic event; the diagnostic channel itself does not, to avoid
    /// infinite recursion) can decide what to do next.
    pub fn emit(&self, event: &T) -> usize {
        self.emitted.fetch_add(1, Ordering::Relaxed);
        let mut panicked = 0;
        for (_, handler) in &self.handlers {
            let result = catch_unwind(AssertUnwindSafe(|| handler(event)));
            if result.is_err() {
                panicked += 1;
                self.handler_panics.fetch_add(1, Ordering::Relaxed);
            }
        }
        panicked
    }

    pub fn emitted_count(&self) -> u64 {
        self.emitted.load(Ordering::Relaxed)
    }

    pub fn handler_panic_count(&self) -> u64 {
        self.handler_panics.load(Ordering::Relaxed)
    }
}
