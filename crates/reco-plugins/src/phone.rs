//! Matches phone numbers in common North American formats.

use crate::common::{candidate, span_of};
use futures::future::BoxFuture;
use reco_plugin::{Plugin, PluginContext, PluginResult};
use reco_types::{EntityKind, EntityStatus, Mode};
use regex::Regex;
use serde_json::json;
use std::sync::LazyLock;

const CONFIDENCE: f64 = 0.85;

static PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\(?\b\d{3}\)?[-. ]\d{3}[-. ]\d{4}\b").unwrap()
});

pub struct PhonePlugin;

impl Plugin for PhonePlugin {
    fn name(&self) -> &str {
        "phone"
    }

    fn mode(&self) -> Mode {
        Mode::Realtime
    }

    fn run<'a>(&'a self, ctx: PluginContext<'a>) -> BoxFuture<'a, PluginResult> {
        Box::pin(async move {
            let mut upsert = Vec::new();
            for m in PATTERN.find_iter(ctx.text) {
                let span = span_of(ctx.text, &m);
                let digits: String = m.as_str().chars().filter(|c| c.is_ascii_digit()).collect();
                let c = candidate(
                    EntityKind::Phone,
                    span,
                    m.as_str(),
                    json!({ "digits": digits }),
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
    async fn matches_dashed_number() {
        let text = "call 555-867-5309 now";
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
        let result = PhonePlugin.run(ctx).await;
        assert_eq!(result.upsert.len(), 1);
        assert_eq!(result.upsert[0].text, "555-867-5309");
    }
}
