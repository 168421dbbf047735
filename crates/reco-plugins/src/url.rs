//! Matches `http(s)://` URLs.

use crate::common::{byte_to_char_offset, candidate};
use futures::future::BoxFuture;
use reco_plugin::{Plugin, PluginContext, PluginResult};
use reco_types::{EntityKind, EntityStatus, Mode, Span};
use regex::Regex;
use serde_json::json;
use std::sync::LazyLock;

const CONFIDENCE: f64 = 0.97;

static PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bhttps?://[^\s<>\x22']+").unwrap());

pub struct UrlPlugin;

impl Plugin for UrlPlugin {
    fn name(&self) -> &str {
        "url"
    }

    fn mode(&self) -> Mode {
        Mode::Realtime
    }

    fn run<'a>(&'a self, ctx: PluginContext<'a>) -> BoxFuture<'a, PluginResult> {
        Box::pin(async move {
            let mut upsert = Vec::new();
            for m in PATTERN.find_iter(ctx.text) {
                let trimmed = m.as_str().trim_end_matches(|c| matches!(c, '.' | ',' | ')' | ';' | ':'));
                let end_byte = m.start() + trimmed.len();
                let span = Span::new(
                    byte_to_char_offset(ctx.text, m.start()),
                    byte_to_char_offset(ctx.text, end_byte),
                );
                let c = candidate(
                    EntityKind::Url,
                    span,
                    trimmed,
                    json!({ "url": trimmed }),
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
