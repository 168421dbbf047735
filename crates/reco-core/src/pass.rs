//! Realtime/commit pass bodies (spec.md §4.6).
//!
//! Both passes share this one body, parameterized by [`PassMode`]: build a
//! `PluginContext` from the current buffer/store snapshot, run the plugin
//! pipeline, apply the stale-pass guard, reconcile into the store, and emit
//! events in the `remove`, `add`, `update` order spec.md §4.6 requires.

use crate::Inner;
use reco_runner::{RunInput, RunOutcome, Runner};
use reco_types::{DiagnosticEvent, EntityCandidate, EntityEvent, EntityStatus, RemoveEvent};
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PassMode {
    Realtime,
    Commit,
}

/// Builds the `AnalysisCallback` closure `Scheduler::new` expects for one
/// pass mode. Lives as a free function rather than a `Recognizer` method so
/// the closure only captures the two `Arc`s it needs, not `&Recognizer`
/// (which would fight the `'static` bound `tokio::spawn` requires).
pub(crate) fn make_callback(
    inner: Arc<Mutex<Inner>>,
    runner: Arc<Runner>,
    mode: PassMode,
) -> impl Fn() -> futures::future::BoxFuture<'static, ()> + Send + Sync + 'static {
    move || {
        let inner = inner.clone();
        let runner = runner.clone();
        Box::pin(run_pass(inner, runner, mode))
    }
}

async fn run_pass(inner: Arc<Mutex<Inner>>, runner: Arc<Runner>, mode: PassMode) {
    let (text, window, cursor, entities, revision_at_start, on_entity, signal) = {
        let mut guard = inner.lock().unwrap();
        if guard.destroyed {
            return;
        }
        let signal_field = match mode {
            PassMode::Realtime => &mut guard.realtime_signal,
            PassMode::Commit => &mut guard.commit_signal,
        };
        signal_field.cancel();
        let child = guard.destroy_root.child_token();
        match mode {
            PassMode::Realtime => guard.realtime_signal = child.clone(),
            PassMode::Commit => guard.commit_signal = child.clone(),
        }

        let window_size = guard.window_size;
        let window = guard.buffer.get_window(window_size);
        let text = guard.buffer.text();
        let cursor = guard.buffer.cursor();
        let entities = guard.store.get_all();
        let revision = guard.buffer.revision();

        let sink_inner = inner.clone();
        let on_entity: Arc<dyn Fn(EntityCandidate) + Send + Sync> = Arc::new(move |mut candidate| {
            if mode == PassMode::Commit {
                candidate.status = EntityStatus::Confirmed;
            }
            let mut guard = sink_inner.lock().unwrap();
            if guard.destroyed {
                return;
            }
            let diff = guard.store.upsert(vec![candidate]);
            emit_store_rejections(&mut guard, diff.rejected);
            emit_upsert_diff(&mut guard, diff.added, false);
            emit_upsert_diff(&mut guard, diff.updated, true);
        });

        (text, window, cursor, entities, revision, on_entity, child)
    };

    let run = AssertUnwindSafe(async {
        let input = RunInput {
            text: &text,
            window: &window,
            cursor,
            entities: &entities,
            on_entity: Some(on_entity),
            signal: signal.clone(),
        };
        match mode {
            PassMode::Realtime => runner.run_realtime(input).await,
            PassMode::Commit => runner.run_commit(input).await,
        }
    });

    let outcome = match futures::FutureExt::catch_unwind(run).await {
        Ok(outcome) => outcome,
        Err(_) => {
            tracing::warn!(target: "core", ?mode, "pass_panicked");
            let mut guard = inner.lock().unwrap();
            if !guard.destroyed {
                guard.emitter.emit_diagnostic(DiagnosticEvent::error(
                    "analysis pass failed unexpectedly",
                    "recognizer",
                ));
            }
            return;
        }
    };

    if !outcome.errors.is_empty() {
        let mut guard = inner.lock().unwrap();
        if !guard.destroyed {
            for err in &outcome.errors {
                guard.emitter.emit_diagnostic(DiagnosticEvent::warning(err.to_string(), "runner"));
            }
        }
    }

    reconcile_and_emit(inner, mode, revision_at_start, outcome);
}

fn reconcile_and_emit(
    inner: Arc<Mutex<Inner>>,
    mode: PassMode,
    revision_at_start: u64,
    outcome: RunOutcome,
) {
    let mut guard = inner.lock().unwrap();
    if guard.destroyed {
        return;
    }

    let current_len = guard.buffer.len_chars();
    let stale = guard.buffer.revision() != revision_at_start;

    let mut candidates = Vec::with_capacity(outcome.upsert.len());
    for mut candidate in outcome.upsert {
        if mode == PassMode::Commit {
            candidate.status = EntityStatus::Confirmed;
        }
        if stale {
            match candidate.span.clamped(current_len) {
                Some(clamped) => candidate.span = clamped,
                None => {
                    guard.emitter.emit_diagnostic(
                        DiagnosticEvent::warning(
                            format!("dropped stale candidate '{}': span out of range", candidate.key),
                            "recognizer",
                        ),
                    );
                    continue;
                }
            }
        }
        candidates.push(candidate);
    }

    let diff = guard.store.reconcile(candidates);
    emit_store_rejections(&mut guard, diff.rejected);

    for (id, key) in &diff.removed {
        guard.emitter.emit_remove(RemoveEvent { id: *id, key: key.clone() });
    }
    emit_upsert_diff(&mut guard, diff.added, false);
    emit_upsert_diff(&mut guard, diff.updated, true);

    if mode == PassMode::Commit {
        let promoted = guard.store.confirm_all();
        for entity in promoted {
            guard.emitter.emit_entity(EntityEvent { entity, is_update: true });
        }
    }
}

fn emit_store_rejections(guard: &mut Inner, rejected: Vec<reco_store::StoreError>) {
    for err in rejected {
        guard.emitter.emit_diagnostic(DiagnosticEvent::warning(err.to_string(), "store"));
    }
}

fn emit_upsert_diff(guard: &mut Inner, ids: Vec<reco_types::EntityId>, is_update: bool) {
    for id in ids {
        if let Some(entity) = guard.store.get(id).cloned() {
            guard.emitter.emit_entity(EntityEvent { entity, is_update });
        }
    }
}
