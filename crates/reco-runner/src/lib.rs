//! Plugin orchestration (spec.md §4.5).
//!
//! Split into one file per concern — `ordering`, `merge`, `threshold` — the
//! way `core-actions::dispatcher` splits `motion`/`command`/`edit`/`undo`/
//! `mode` into sibling modules behind one `dispatch` entry point, rather
//! than one large file mixing plugin selection, merge semantics, and
//! threshold filtering together.

mod merge;
mod ordering;
mod threshold;

pub use merge::MergedResult;
pub use threshold::Thresholds;

use futures::FutureExt;
use reco_plugin::{Plugin, PluginContext, PluginResult};
use reco_types::{Entity, EntityCandidate, Key, Mode};
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// Internally-recoverable, named failure modes for [`Runner`] (SPEC_FULL.md
/// §7). A panicking plugin never aborts the run — the plugin's contribution
/// is simply dropped for that pass — but the failure is named instead of a
/// bare `tracing::warn!`, so callers that want to surface it as a
/// `diagnostic` event have something typed to match on.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RunnerError {
    #[error("plugin '{0}' panicked during run")]
    PluginPanicked(String),
}

/// Everything the Runner needs to build a `PluginContext` per plugin
/// invocation, borrowed for the duration of one pass.
pub struct RunInput<'a> {
    pub text: &'a str,
    pub window: &'a reco_types::Window,
    pub cursor: usize,
    pub entities: &'a [Entity],
    pub on_entity: Option<Arc<dyn Fn(EntityCandidate) + Send + Sync + 'a>>,
    pub signal: CancellationToken,
}

/// Final, threshold-filtered outcome of one pass (spec.md §4.5 step 6).
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RunOutcome {
    pub upsert: Vec<EntityCandidate>,
    pub remove: Vec<Key>,
    pub errors: Vec<RunnerError>,
}

/// Orchestrates registered plugins: partitions them by `mode` at
/// construction time, then on each `run_realtime`/`run_commit` call selects
/// the right plugin list, invokes each in priority order, merges results,
/// and filters by confidence threshold.
pub struct Runner {
    realtime_plugins: Vec<Arc<dyn Plugin>>,
    commit_plugins: Vec<Arc<dyn Plugin>>,
    thresholds: Thresholds,
}

impl Runner {
    pub fn new(plugins: Vec<Arc<dyn Plugin>>, thresholds: Thresholds) -> Self {
        let mut realtime_plugins = Vec::new();
        let mut commit_plugins = Vec::new();
        for plugin in plugins {
            match plugin.mode() {
                Mode::Realtime => realtime_plugins.push(plugin),
                Mode::Commit => commit_plugins.push(plugin),
            }
        }
        ordering::stable_sort_by_priority(&mut realtime_plugins);
        ordering::stable_sort_by_priority(&mut commit_plugins);
        tracing::debug!(
            target: "runner",
            realtime = realtime_plugins.len(),
            commit = commit_plugins.len(),
            "runner_constructed"
        );
        Self { realtime_plugins, commit_plugins, thresholds }
    }

    pub async fn run_realtime<'a>(&self, input: RunInput<'a>) -> RunOutcome {
        self.run(Mode::Realtime, &self.realtime_plugins, input).await
    }

    pub async fn run_commit<'a>(&self, input: RunInput<'a>) -> RunOutcome {
        // Commit re-runs realtime plugins too so provisional spans get a
        // chance to confirm (spec.md §4.5 step 2).
        let chained: Vec<Arc<dyn Plugin>> = self
            .realtime_plugins
            .iter()
            .chain(self.commit_plugins.iter())
            .cloned()
            .collect();
        self.run(Mode::Commit, &chained, input).await
    }

    async fn run<'a>(&self, mode: Mode, plugins: &[Arc<dyn Plugin>], input: RunInput<'a>) -> RunOutcome {
        let mut results = Vec::with_capacity(plugins.len());
        let mut errors = Vec::new();
        for plugin in plugins {
            let ctx = PluginContext {
                text: input.text,
                window: input.window,
                cursor: input.cursor,
                mode,
                entities: input.entities,
                on_entity: input.on_entity.clone(),
                signal: input.signal.clone(),
            };
            let result = match AssertUnwindSafe(plugin.run(ctx)).catch_unwind().await {
                Ok(result) => result,
                Err(_) => {
                    let err = RunnerError::PluginPanicked(plugin.name().to_string());
                    tracing::warn!(target: "runner", error = %err, "plugin_panicked");
                    errors.push(err);
                    PluginResult::default()
                }
            };
            results.push(result);
        }

        let merged = merge::merge(results);
        let threshold = self.thresholds.for_mode(mode);
        let upsert = threshold::filter_by_confidence(merged.upsert, threshold);
        tracing::trace!(
            target: "runner",
            mode = ?mode,
            upserted = upsert.len(),
            explicit_removes = merged.remove.len(),
            errors = errors.len(),
            "runner_pass_complete"
        );
        RunOutcome { upsert, remove: merged.remove, errors }
    }
}
