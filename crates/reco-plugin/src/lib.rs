//! Plugin contract (spec.md §6).
//!
//! Grounded directly in this workspace's own `core-plugin::PluginHost`
//! scaffold: a small, object-safe, `Send`-bounded trait returning owned
//! data, with a no-op implementation kept around as the trivial reference
//! case. Where `PluginHost` only had to *discover* plugins, `Plugin` here is
//! the contract plugins themselves implement, so `run` is the hot path and
//! gets the async treatment `core-plugin` deferred ("no async fn yet").

use futures::future::BoxFuture;
use reco_types::{Entity, EntityCandidate, Key, Mode};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Everything a plugin's `run` needs to inspect the current buffer/store
/// state and contribute candidates (spec.md §6 `PluginContext`).
///
/// `signal` is the idiomatic-Rust stand-in for the spec's `AbortSignal`:
/// a `tokio_util::sync::CancellationToken` child the Runner cancels when a
/// new pass starts or the Recognizer is destroyed (spec.md §4.5, §5).
/// Plugins that suspend on I/O should poll `signal.is_cancelled()` at
/// suspension points, or race their I/O future against
/// `signal.cancelled()`.
pub struct PluginContext<'a> {
    pub text: &'a str,
    pub window: &'a reco_types::Window,
    pub cursor: usize,
    pub mode: Mode,
    pub entities: &'a [Entity],
    /// Optional incremental sink (spec.md §4.5 "Streaming emission").
    /// Plugins that produce candidates incrementally invoke this for each
    /// one as it becomes available; the final `PluginResult` must still
    /// carry the cumulative set so the Runner/Store can compute removals.
    pub on_entity: Option<Arc<dyn Fn(EntityCandidate) + Send + Sync + 'a>>,
    pub signal: CancellationToken,
}

impl<'a> PluginContext<'a> {
    /// Invokes the streaming sink if the plugin was given one and the pass
    /// has not been cancelled. Plugins should prefer this over calling
    /// `on_entity` directly so cancellation is checked uniformly.
    pub fn emit_incremental(&self, candidate: EntityCandidate) {
        if self.signal.is_cancelled() {
            return;
        }
        if let Some(sink) = &self.on_entity {
            sink(candidate);
        }
    }
}

/// What a plugin's `run` returns: candidates to upsert, and keys to remove.
///
/// Per spec.md §9 Open Questions, the engine's reconciler currently derives
/// removals from the candidate key set alone and ignores `remove` — it is
/// kept on the contract as a documented future extension point, not dead
/// weight; a Runner or Recognizer built against a different reconciliation
/// policy can start honoring it without a contract change.
#[derive(Debug, Default, Clone)]
pub struct PluginResult {
    pub upsert: Vec<EntityCandidate>,
    pub remove: Vec<Key>,
}

/// A single matcher contributing entity candidates (spec.md §6 `Plugin`).
pub trait Plugin: Send + Sync {
    fn name(&self) -> &str;
    fn mode(&self) -> Mode;
    /// Lower runs first; ties break by registration order. Default `100`
    /// matches spec.md §4.5.
    fn priority(&self) -> u32 {
        100
    }
    fn run<'a>(&'a self, ctx: PluginContext<'a>) -> BoxFuture<'a, PluginResult>;
}

/// Trivial plugin that never contributes anything. Useful as a contract
/// smoke test and as scaffolding while wiring up a Runner before real
/// matchers exist, mirroring `core-plugin::NoopPluginHost`'s role in the
/// teacher workspace.
pub struct NoopPlugin {
    name: String,
    mode: Mode,
}

impl NoopPlugin {
    pub fn new(name: impl Into<String>, mode: Mode) -> Self {
        Self { name: name.into(), mode }
    }
}

impl Plugin for NoopPlugin {
    fn name(&self) -> &str {
        &self.name
    }

    fn mode(&self) -> Mode {
        self.mode
    }

    fn run<'a>(&'a self, _ctx: PluginContext<'a>) -> BoxFuture<'a, PluginResult> {
        Box::pin(async { PluginResult::default() })
    }
}
