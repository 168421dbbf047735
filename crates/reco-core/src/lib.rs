//! Composition root (spec.md §4.6).
//!
//! `Recognizer` owns one `Buffer`, one `Store`, one `Emitter`, one
//! `Scheduler`, and one `Runner`, exactly the way `core-model::EditorModel`
//! is the single place `EditorState` and view state are mutated together.
//! The collaborators that need to be reachable from the `Scheduler`'s
//! spawned timer tasks live behind an `Arc<Mutex<Inner>>`; the lock is never
//! held across an `.await`, so a `std::sync::Mutex` is enough even though
//! the scheduler's tasks may run on a multi-threaded `tokio` runtime.

mod pass;

use pass::PassMode;
use reco_buffer::Buffer;
use reco_emitter::{Emitter, SubscriptionId};
use reco_plugin::Plugin;
use reco_runner::{Runner, Thresholds};
use reco_scheduler::{ScheduleConfig, Scheduler};
use reco_store::Store;
use reco_types::{DiagnosticEvent, Entity, EntityEvent, RemoveEvent};
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;

/// Config shape for [`Recognizer::new`] (spec.md §6 `createRecognizer`).
pub struct RecognizerOptions {
    pub plugins: Vec<Arc<dyn Plugin>>,
    pub schedule: ScheduleConfig,
    pub thresholds: Thresholds,
    pub window_size: usize,
}

impl Default for RecognizerOptions {
    fn default() -> Self {
        Self {
            plugins: Vec::new(),
            schedule: ScheduleConfig::default(),
            thresholds: Thresholds::default(),
            window_size: 500,
        }
    }
}

/// `Recognizer.commit(reason)` reasons (spec.md §6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitReason {
    Enter,
    Blur,
    Timeout,
    Manual,
}

impl CommitReason {
    fn as_str(&self) -> &'static str {
        match self {
            CommitReason::Enter => "enter",
            CommitReason::Blur => "blur",
            CommitReason::Timeout => "timeout",
            CommitReason::Manual => "manual",
        }
    }
}

/// `Recognizer.feed` input (spec.md §6).
#[derive(Debug, Clone, Default)]
pub struct FeedInput {
    pub text: String,
    pub cursor: Option<usize>,
    pub composing: Option<bool>,
}

/// `Recognizer.state()` snapshot (spec.md §4.6).
#[derive(Debug, Clone)]
pub struct RecognizerState {
    pub text: String,
    pub revision: u64,
    pub entities: Vec<Entity>,
    pub pending_commit: bool,
}

pub(crate) struct Inner {
    pub(crate) buffer: Buffer,
    pub(crate) store: Store,
    pub(crate) emitter: Emitter,
    pub(crate) destroyed: bool,
    pub(crate) window_size: usize,
    pub(crate) realtime_signal: CancellationToken,
    pub(crate) commit_signal: CancellationToken,
    pub(crate) destroy_root: CancellationToken,
}

/// The composition root (spec.md §4.6). Cheap to clone: internally
/// `Arc`-backed, so handing a `Recognizer` to a UI layer and to a
/// background task is just a reference-count bump.
pub struct Recognizer {
    inner: Arc<Mutex<Inner>>,
    scheduler: Arc<Mutex<Scheduler>>,
}

impl Recognizer {
    pub fn new(options: RecognizerOptions) -> Self {
        let runner = Arc::new(Runner::new(options.plugins, options.thresholds));
        let destroy_root = CancellationToken::new();
        let inner = Arc::new(Mutex::new(Inner {
            buffer: Buffer::new(),
            store: Store::new(),
            emitter: Emitter::new(),
            destroyed: false,
            window_size: options.window_size,
            realtime_signal: destroy_root.child_token(),
            commit_signal: destroy_root.child_token(),
            destroy_root,
        }));

        let on_realtime = pass::make_callback(inner.clone(), runner.clone(), PassMode::Realtime);
        let on_commit = pass::make_callback(inner.clone(), runner.clone(), PassMode::Commit);
        let scheduler = Arc::new(Mutex::new(Scheduler::new(options.schedule, on_realtime, on_commit)));

        tracing::debug!(target: "core", "recognizer_constructed");
        Self { inner, scheduler }
    }

    /// `Recognizer.feed` (spec.md §4.6). The buffer always absorbs the
    /// latest text/cursor, even while composing (spec.md §5: "feeds still
    /// update the buffer so on composition end the next scheduleAnalysis
    /// sees current state") — only scheduling analysis is gated.
    pub fn feed(&self, input: FeedInput) {
        let mut inner = self.inner.lock().unwrap();
        if inner.destroyed {
            return;
        }
        let changed = inner.buffer.update(&input.text, input.cursor);
        drop(inner);

        if let Some(composing) = input.composing {
            let mut scheduler = self.scheduler.lock().unwrap();
            scheduler.set_composing(composing);
            if composing {
                return;
            }
        }

        if changed {
            self.scheduler.lock().unwrap().schedule_analysis();
        }
    }

    /// `Recognizer.commit(reason)` (spec.md §4.6).
    pub fn commit(&self, reason: CommitReason) {
        let inner = self.inner.lock().unwrap();
        if inner.destroyed {
            return;
        }
        inner.emitter.emit_diagnostic(DiagnosticEvent::info(
            format!("Commit triggered: {}", reason.as_str()),
            "recognizer",
        ));
        drop(inner);
        self.scheduler.lock().unwrap().force_commit();
    }

    /// `Recognizer.state()` (spec.md §4.6).
    pub fn state(&self) -> RecognizerState {
        let inner = self.inner.lock().unwrap();
        RecognizerState {
            text: inner.buffer.text(),
            revision: inner.buffer.revision(),
            entities: inner.store.get_all(),
            pending_commit: self.scheduler.lock().unwrap().is_pending_commit(),
        }
    }

    pub fn on_entity(&self, handler: impl Fn(&EntityEvent) + Send + Sync + 'static) -> SubscriptionId {
        self.inner.lock().unwrap().emitter.on_entity(handler)
    }

    pub fn on_remove(&self, handler: impl Fn(&RemoveEvent) + Send + Sync + 'static) -> SubscriptionId {
        self.inner.lock().unwrap().emitter.on_remove(handler)
    }

    pub fn on_diagnostic(
        &self,
        handler: impl Fn(&DiagnosticEvent) + Send + Sync + 'static,
    ) -> SubscriptionId {
        self.inner.lock().unwrap().emitter.on_diagnostic(handler)
    }

    pub fn off_entity(&self, id: SubscriptionId) -> bool {
        self.inner.lock().unwrap().emitter.off_entity(id)
    }

    pub fn off_remove(&self, id: SubscriptionId) -> bool {
        self.inner.lock().unwrap().emitter.off_remove(id)
    }

    pub fn off_diagnostic(&self, id: SubscriptionId) -> bool {
        self.inner.lock().unwrap().emitter.off_diagnostic(id)
    }

    /// `Recognizer.destroy()` (spec.md §4.6): idempotent.
    pub fn destroy(&self) {
        let mut inner = self.inner.lock().unwrap();
        if inner.destroyed {
            return;
        }
        inner.destroyed = true;
        inner.destroy_root.cancel();
        self.scheduler.lock().unwrap().destroy();
        inner.emitter.remove_all_listeners(None);
        inner.store.clear();
        inner.buffer.reset();
        tracing::debug!(target: "core", "recognizer_destroyed");
    }
}
