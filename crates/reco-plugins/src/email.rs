//! Matches email addresses.

use crate::common::{candidate, span_of};
use futures::future::BoxFuture;
use reco_plugin::{Plugin, PluginContext, PluginResult};
use reco_types::{EntityKind, EntityStatus, Mode};
use regex::Regex;
use serde_json::json;
use std::sync::LazyLock;

const CONFIDENCE: f64 = 0.95;

static PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b").unwrap()
});

pub struct EmailPlugin;

impl Plugin for EmailPlugin {
    fn name(&self) -> &str {
        "email"
    }

    fn mode(&self) -> Mode {
        Mode::Realtime
    }

    fn run<'a>(&'a self, ctx: PluginContext<'a>) -> BoxFuture<'a, PluginResult> {
        Box::pin(async move {
            let mut upsert = Vec::new();
            for m in PATTERN.find_iter(ctx.text) {
                let span = span_of(ctx.text, &m);
                let c = candidate(
                    EntityKind::Email,
                    span,
                    m.as_str(),
                    json!({ "address": m.as_str() }),
                    CONFIDENCE,
                    EntityStatus::Provisional,
                );
                ctx.emit_incremental(c.clone());
                upsert.push(c);
            }
            PluginResult { upsert, remove: vec![] }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_util::sync::CancellationToken;

    #[tokio::test]
    async fn matches_address() {
        let text = "reach me at jane.doe@example.com please";
        let window = reco_types::Window { text: text.into(), offset: 0 };
        let ctx = PluginContext {
            text,
            window: &window,
            cursor: text.chars().count(),
            mode: Mode::Realtime,
            entities: &[],
            on_entity: None,
            signal: CancellationToken::new(),
        };
        let result = EmailPlugin.run(ctx).await;
        assert_eq!(result.upsert.len(), 1);
        assert_eq!(result.upsert[0].text, "jane.doe@example.com");
    }
}
