//! Debounced dual-timer scheduler (spec.md §4.4).
//!
//! Every `schedule_analysis` call rearms two `tokio::time::sleep`-backed
//! timers, the way `core-render::RenderScheduler` accumulates pending
//! deltas and `core-events::TickEventSource` drives a periodic callback off
//! a spawned task — here the "accumulate, then fire" shape becomes
//! "debounce, then fire", and the scheduler owns the `JoinHandle` for each
//! armed timer so rearming can simply abort-and-replace it.

use futures::FutureExt;
use futures::future::BoxFuture;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use thiserror::Error;
use tokio::task::JoinHandle;

/// Internally-recoverable, named failure modes for [`Scheduler`]
/// (SPEC_FULL.md §7). A panicking analysis callback runs detached inside a
/// spawned task — nothing awaits its `JoinHandle` — so without catching the
/// unwind here the panic would simply vanish. Named instead of a bare
/// `tracing::error!` so a future caller has something typed to route into a
/// `diagnostic` event.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerError {
    #[error("{phase} analysis callback panicked")]
    CallbackPanicked { phase: &'static str },
}

/// `{realtimeMs, commitAfterMs}` (spec.md §4.4), defaulting to `150`/`700`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleConfig {
    pub realtime_ms: u64,
    pub commit_after_ms: u64,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            realtime_ms: 150,
            commit_after_ms: 700,
        }
    }
}

/// A zero-argument async callback the scheduler fires on timer expiry.
/// Implemented for any `Fn() -> Fut` where `Fut: Future<Output = ()>`, so
/// callers can hand over a closure that clones whatever state it needs to
/// kick off a pass without the scheduler knowing anything about buffers,
/// stores, or runners.
pub trait AnalysisCallback: Send + Sync + 'static {
    fn call(&self) -> BoxFuture<'static, ()>;
}

impl<F, Fut> AnalysisCallback for F
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: std::future::Future<Output = ()> + Send + 'static,
{
    fn call(&self) -> BoxFuture<'static, ()> {
        Box::pin(self())
    }
}

/// Debounced dual-timer driver gating analysis passes behind IME
/// composition (spec.md §4.4). Must be constructed and used from within a
/// `tokio` runtime since it spawns tasks for its timers.
pub struct Scheduler {
    config: ScheduleConfig,
    realtime_handle: Option<JoinHandle<()>>,
    commit_handle: Option<JoinHandle<()>>,
    composing: bool,
    destroyed: bool,
    commit_pending: Arc<AtomicBool>,
    on_realtime: Arc<dyn AnalysisCallback>,
    on_commit: Arc<dyn AnalysisCallback>,
}

impl Scheduler {
    pub fn new(
        config: ScheduleConfig,
        on_realtime: impl AnalysisCallback,
        on_commit: impl AnalysisCallback,
    ) -> Self {
        Self {
            config,
            realtime_handle: None,
            commit_handle: None,
            composing: false,
            destroyed: false,
            commit_pending: Arc::new(AtomicBool::new(false)),
            on_realtime: Arc::new(on_realtime),
            on_commit: Arc::new(on_commit),
        }
    }

    /// Cancels and rearms both timers. No-op if destroyed or currently
    /// composing (spec.md §4.4, §5 IME gate).
    pub fn schedule_analysis(&mut self) {
        if self.destroyed || self.composing {
            return;
        }
        self.abort_timers();

        let realtime_ms = self.config.realtime_ms;
        let on_realtime = self.on_realtime.clone();
        self.realtime_handle = Some(tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(realtime_ms)).await;
            tracing::trace!(target: "scheduler", "realtime_fire");
            if AssertUnwindSafe(on_realtime.call()).catch_unwind().await.is_err() {
                let err = SchedulerError::CallbackPanicked { phase: "realtime" };
                tracing::error!(target: "scheduler", error = %err, "callback_panicked");
            }
        }));

        let commit_ms = self.config.commit_after_ms;
        let on_commit = self.on_commit.clone();
        let commit_pending = self.commit_pending.clone();
        commit_pending.store(true, Ordering::SeqCst);
        self.commit_handle = Some(tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(commit_ms)).await;
            commit_pending.store(false, Ordering::SeqCst);
            tracing::trace!(target: "scheduler", "commit_fire");
            if AssertUnwindSafe(on_commit.call()).catch_unwind().await.is_err() {
                let err = SchedulerError::CallbackPanicked { phase: "commit" };
                tracing::error!(target: "scheduler", error = %err, "callback_panicked");
            }
        }));
    }

    /// Cancels both timers and invokes the commit callback immediately;
    /// realtime is suppressed because commit subsumes it (spec.md §4.4).
    pub fn force_commit(&mut self) {
        if self.destroyed {
            return;
        }
        self.abort_timers();
        self.commit_pending.store(false, Ordering::SeqCst);
        let on_commit = self.on_commit.clone();
        tokio::spawn(async move {
            tracing::trace!(target: "scheduler", "force_commit_fire");
            if AssertUnwindSafe(on_commit.call()).catch_unwind().await.is_err() {
                let err = SchedulerError::CallbackPanicked { phase: "force_commit" };
                tracing::error!(target: "scheduler", error = %err, "callback_panicked");
            }
        });
    }

    /// Sets the IME composing flag; resuming from composing re-arms
    /// analysis exactly once (spec.md §4.4, §5).
    pub fn set_composing(&mut self, composing: bool) {
        let was_composing = self.composing;
        self.composing = composing;
        if was_composing && !composing {
            self.schedule_analysis();
        }
    }

    /// Cancels both timers without invoking either callback.
    pub fn cancel(&mut self) {
        self.abort_timers();
        self.commit_pending.store(false, Ordering::SeqCst);
    }

    /// Cancels timers and marks the scheduler permanently inert;
    /// idempotent.
    pub fn destroy(&mut self) {
        self.destroyed = true;
        self.cancel();
    }

    pub fn is_pending_commit(&self) -> bool {
        self.commit_pending.load(Ordering::SeqCst)
    }

    fn abort_timers(&mut self) {
        if let Some(handle) = self.realtime_handle.take() {
            handle.abort();
        }
        if let Some(handle) = self.commit_handle.take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    fn counting_callback(counter: Arc<AtomicUsize>) -> impl AnalysisCallback {
        move || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn debounced_input_yields_a_single_realtime_fire() {
        let realtime_count = Arc::new(AtomicUsize::new(0));
        let commit_count = Arc::new(AtomicUsize::new(0));
        let mut scheduler = Scheduler::new(
            ScheduleConfig { realtime_ms: 150, commit_after_ms: 700 },
            counting_callback(realtime_count.clone()),
            counting_callback(commit_count.clone()),
        );

        scheduler.schedule_analysis();
        tokio::time::advance(Duration::from_millis(100)).await;
        scheduler.schedule_analysis(); // resets the realtime timer
        tokio::time::advance(Duration::from_millis(100)).await;
        scheduler.schedule_analysis();
        tokio::time::advance(Duration::from_millis(200)).await;
        tokio::task::yield_now().await;

        assert_eq!(realtime_count.load(Ordering::SeqCst), 1);
        assert_eq!(commit_count.load(Ordering::SeqCst), 0);

        tokio::time::advance(Duration::from_millis(500)).await;
        tokio::task::yield_now().await;
        assert_eq!(commit_count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn force_commit_cancels_pending_realtime_and_fires_commit_only() {
        let realtime_count = Arc::new(AtomicUsize::new(0));
        let commit_count = Arc::new(AtomicUsize::new(0));
        let mut scheduler = Scheduler::new(
            ScheduleConfig::default(),
            counting_callback(realtime_count.clone()),
            counting_callback(commit_count.clone()),
        );

        scheduler.schedule_analysis();
        scheduler.force_commit();
        tokio::task::yield_now().await;

        assert_eq!(commit_count.load(Ordering::SeqCst), 1);

        tokio::time::advance(Duration::from_millis(1000)).await;
        tokio::task::yield_now().await;
        assert_eq!(realtime_count.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn composing_suppresses_analysis_until_cleared() {
        let realtime_count = Arc::new(AtomicUsize::new(0));
        let commit_count = Arc::new(AtomicUsize::new(0));
        let mut scheduler = Scheduler::new(
            ScheduleConfig::default(),
            counting_callback(realtime_count.clone()),
            counting_callback(commit_count.clone()),
        );

        scheduler.set_composing(true);
        scheduler.schedule_analysis();
        tokio::time::advance(Duration::from_millis(1000)).await;
        tokio::task::yield_now().await;
        assert_eq!(realtime_count.load(Ordering::SeqCst), 0);

        scheduler.set_composing(false); // resumes analysis once
        tokio::time::advance(Duration::from_millis(150)).await;
        tokio::task::yield_now().await;
        assert_eq!(realtime_count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn is_pending_commit_reflects_armed_and_fired_state() {
        let realtime_count = Arc::new(AtomicUsize::new(0));
        let commit_count = Arc::new(AtomicUsize::new(0));
        let mut scheduler = Scheduler::new(
            ScheduleConfig::default(),
            counting_callback(realtime_count),
            counting_callback(commit_count),
        );

        assert!(!scheduler.is_pending_commit());
        scheduler.schedule_analysis();
        assert!(scheduler.is_pending_commit());

        tokio::time::advance(Duration::from_millis(700)).await;
        tokio::task::yield_now().await;
        assert!(!scheduler.is_pending_commit());
    }

    #[tokio::test]
    async fn destroy_is_idempotent_and_suppresses_future_scheduling() {
        let realtime_count = Arc::new(AtomicUsize::new(0));
        let commit_count = Arc::new(AtomicUsize::new(0));
        let mut scheduler = Scheduler::new(
            ScheduleConfig::default(),
            counting_callback(realtime_count.clone()),
            counting_callback(commit_count),
        );

        scheduler.destroy();
        scheduler.destroy();
        scheduler.schedule_analysis();
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(realtime_count.load(Ordering::SeqCst), 0);
    }
}
