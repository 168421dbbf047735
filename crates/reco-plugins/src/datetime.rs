//! Matches ISO-style dates (`2026-07-31`) and `HH:MM` times.
//!
//! Registered as a `Mode::Commit` plugin: date/time parsing benefits from
//! the fuller context a commit pass affords (spec.md §4.5 step 2 re-runs
//! realtime plugins at commit, but a plugin can also opt into commit-only
//! to begin with when realtime latency isn't worth the candidate churn).

use crate::common::{candidate, span_of};
use futures::future::BoxFuture;
use reco_plugin::{Plugin, PluginContext, PluginResult};
use reco_types::{EntityKind, EntityStatus, Mode};
use regex::Regex;
use serde_json::json;
use std::sync::LazyLock;

const CONFIDENCE: f64 = 0.75;

static DATE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{4})-(\d{2})-(\d{2})\b").unwrap());
static TIME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b([01]?\d|2[0-3]):([0-5]\d)\b").unwrap());

pub struct DatetimePlugin;

impl Plugin for DatetimePlugin {
    fn name(&self) -> &str {
        "datetime"
    }

    fn mode(&self) -> Mode {
        Mode::Commit
    }

    fn run<'a>(&'a self, ctx: PluginContext<'a>) -> BoxFuture<'a, PluginResult> {
        Box::pin(async move {
            let mut upsert = Vec::new();

            for caps in DATE_PATTERN.captures_iter(ctx.text) {
                let whole = caps.get(0).unwrap();
                let span = span_of(ctx.text, &whole);
                let value = json!({
                    "year": caps[1].parse::<u32>().unwrap_or(0),
                    "month": caps[2].parse::<u32>().unwrap_or(0),
                    "day": caps[3].parse::<u32>().unwrap_or(0),
                });
                let c = candidate(
                    EntityKind::Datetime,
                    span,
                    whole.as_str(),
                    value,
                    CONFIDENCE,
                    EntityStatus::Confirmed,
                );
                ctx.emit_incremental(c.clone());
                upsert.push(c);
            }

            for caps in TIME_PATTERN.captures_iter(ctx.text) {
                let whole = caps.get(0).unwrap();
                let span = span_of(ctx.text, &whole);
                let value = json!({
                    "hour": caps[1].parse::<u32>().unwrap_or(0),
                    "minute": caps[2].parse::<u32>().unwrap_or(0),
                });
                let c = candidate(
                    EntityKind::Datetime,
                    span,
                    whole.as_str(),
                    value,
                    CONFIDENCE,
                    EntityStatus::Confirmed,
                );
                ctx.emit_incremental(c.clone());
                upsert.push(c);
            }

            PluginResult { upsert, remove: vec![] }
        })
    }
}
