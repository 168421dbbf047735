//! Matches `<number> <unit>` quantities (spec.md §3 example: `quantity:10:km:8:13`).

use crate::common::{candidate, span_of};
use futures::future::BoxFuture;
use reco_plugin::{Plugin, PluginContext, PluginResult};
use reco_types::{EntityKind, EntityStatus, Mode};
use regex::Regex;
use serde_json::json;
use std::sync::LazyLock;

const CONFIDENCE: f64 = 0.9;

static PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(\d+(?:\.\d+)?)\s?(km|kg|m|cm|mm|mi|lb|lbs|oz|ml|l|g)\b").unwrap()
});

pub struct QuantityPlugin;

impl Plugin for QuantityPlugin {
    fn name(&self) -> &str {
        "quantity"
    }

    fn mode(&self) -> Mode {
        Mode::Realtime
    }

    fn run<'a>(&'a self, ctx: PluginContext<'a>) -> BoxFuture<'a, PluginResult> {
        Box::pin(async move {
            let mut upsert = Vec::new();
            for caps in PATTERN.captures_iter(ctx.text) {
                let whole = caps.get(0).unwrap();
                let amount: f64 = caps[1].parse().unwrap_or(0.0);
                let unit = caps[2].to_lowercase();
                let span = span_of(ctx.text, &whole);
                let value = json!({ "amount": amount, "unit": unit });
                let c = candidate(
                    EntityKind::Quantity,
                    span,
                    whole.as_str(),
                    value,
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

    fn ctx<'a>(text: &'a str, window: &'a reco_types::Window) -> PluginContext<'a> {
        PluginContext {
            text,
            window,
            cursor: text.chars().count(),
            mode: Mode::Realtime,
            entities: &[],
            on_entity: None,
            signal: CancellationToken::new(),
        }
    }

    #[tokio::test]
    async fn matches_number_and_unit() {
        let window = reco_types::Window { text: "walked 10 km today".into(), offset: 0 };
        let plugin = QuantityPlugin;
        let result = plugin.run(ctx("walked 10 km today", &window)).await;
        assert_eq!(result.upsert.len(), 1);
        assert_eq!(result.upsert[0].text, "10 km");
        assert_eq!(result.upsert[0].span, reco_types::Span::new(7, 12));
    }

    #[tokio::test]
    async fn no_match_yields_empty_result() {
        let window = reco_types::Window { text: "no numbers here".into(), offset: 0 };
        let plugin = QuantityPlugin;
        let result = plugin.run(ctx("no numbers here", &window)).await;
        assert!(result.upsert.is_empty());
    }
}
