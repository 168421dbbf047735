//! Built-in entity matchers (SPEC_FULL.md §10.5).
//!
//! Each matcher is a small `regex`-backed [`reco_plugin::Plugin`], grounded
//! the way `core-plugin::NoopPluginHost` keeps the contract minimal: one
//! file per kind, a fixed confidence constant chosen from how reliably the
//! pattern identifies its kind, and a module-level `LazyLock<Regex>` so the
//! pattern compiles once per process rather than once per pass.

mod common;
mod datetime;
mod email;
mod phone;
mod quantity;
mod url;

pub use datetime::DatetimePlugin;
pub use email::EmailPlugin;
pub use phone::PhonePlugin;
pub use quantity::QuantityPlugin;
pub use url::UrlPlugin;

use reco_plugin::Plugin;
use std::sync::Arc;

/// Every built-in plugin, in a reasonable default registration order. A
/// `reco-core` caller can pass this straight to `Runner::new`, or splice in
/// additional third-party plugins alongside it.
pub fn built_in_plugins() -> Vec<Arc<dyn Plugin>> {
    vec![
        Arc::new(EmailPlugin),
        Arc::new(UrlPlugin),
        Arc::new(PhonePlugin),
        Arc::new(QuantityPlugin),
        Arc::new(DatetimePlugin),
    ]
}
