//! Type-dispatched subscription registry with fault isolation (spec.md §4.3).
//!
//! Three channels — `entity`, `remove`, `diagnostic` — each get their own
//! [`registry::Registry`] rather than one polymorphic stream, per spec.md
//! §9's own recommendation ("expose per-channel subscription... to keep
//! handler signatures precise"). Handler panics are caught
//! (`registry::Registry::emit`); a panic on the entity or remove channel is
//! converted into an `error`-severity diagnostic dispatched to diagnostic
//! handlers, while a panic *on* a diagnostic handler is swallowed outright to
//! avoid feedback loops (spec.md §4.3).

mod registry;

pub use registry::SubscriptionId;

use reco_types::{Channel, DiagnosticEvent, EntityEvent, RemoveEvent, Severity};
use registry::Registry;

#[derive(Default)]
pub struct Emitter {
    entity: Registry<EntityEvent>,
    remove: Registry<RemoveEvent>,
    diagnostic: Registry<DiagnosticEvent>,
}

impl Emitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_entity(&mut self, handler: impl Fn(&EntityEvent) + Send + Sync + 'static) -> SubscriptionId {
        self.entity.on(handler)
    }

    pub fn on_remove(&mut self, handler: impl Fn(&RemoveEvent) + Send + Sync + 'static) -> SubscriptionId {
        self.remove.on(handler)
    }

    pub fn on_diagnostic(
        &mut self,
        handler: impl Fn(&DiagnosticEvent) + Send + Sync + 'static,
    ) -> SubscriptionId {
        self.diagnostic.on(handler)
    }

    pub fn off_entity(&mut self, id: SubscriptionId) -> bool {
        self.entity.off(id)
    }

    pub fn off_remove(&mut self, id: SubscriptionId) -> bool {
        self.remove.off(id)
    }

    pub fn off_diagnostic(&mut self, id: SubscriptionId) -> bool {
        self.diagnostic.off(id)
    }

    pub fn emit_entity(&self, event: EntityEvent) {
        let panicked = self.entity.emit(&event);
        if panicked > 0 {
            self.dispatch_handler_fault("entity", panicked);
        }
    }

    pub fn emit_remove(&self, event: RemoveEvent) {
        let panicked = self.remove.emit(&event);
        if panicked > 0 {
            self.dispatch_handler_fault("remove", panicked);
        }
    }

    /// Emits a diagnostic. Unlike the other two channels, a panicking
    /// diagnostic handler is swallowed rather than escalated, since
    /// escalating would mean emitting another diagnostic that could panic
    /// the same handler again.
    pub fn emit_diagnostic(&self, event: DiagnosticEvent) {
        self.diagnostic.emit(&event);
    }

    fn dispatch_handler_fault(&self, channel: &str, panicked: usize) {
        tracing::warn!(target: "emitter", channel, panicked, "handler_panicked");
        self.diagnostic.emit(&DiagnosticEvent {
            severity: Severity::Error,
            message: format!("{panicked} handler(s) on channel '{channel}' panicked"),
            span: None,
            source: Some("emitter".to_string()),
        });
    }

    pub fn remove_all_listeners(&mut self, channel: Option<Channel>) {
        match channel {
            Some(Channel::Entity) => self.entity.remove_all(),
            Some(Channel::Remove) => self.remove.remove_all(),
            Some(Channel::Diagnostic) => self.diagnostic.remove_all(),
            None => {
                self.entity.remove_all();
                self.remove.remove_all();
                self.diagnostic.remove_all();
            }
        }
    }

    pub fn listener_count(&self, channel: Channel) -> usize {
        match channel {
            Channel::Entity => self.entity.listener_count(),
            Channel::Remove => self.remove.listener_count(),
            Channel::Diagnostic => self.diagnostic.listener_count(),
        }
    }
}
