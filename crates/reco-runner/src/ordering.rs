use reco_plugin::Plugin;
use std::sync::Arc;

/// Stable-sorts plugins ascending by `priority()`; ties keep their original
/// (registration) order because `Vec::sort_by_key` is a stable sort
/// (spec.md §4.5).
pub fn stable_sort_by_priority(plugins: &mut [Arc<dyn Plugin>]) {
    plugins.sort_by_key(|p| p.priority());
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::future::BoxFuture;
    use reco_plugin::{PluginContext, PluginResult};
    use reco_types::Mode;

    struct Stub {
        name: &'static str,
        priority: u32,
    }

    impl Plugin for Stub {
        fn name(&self) -> &str {
            self.name
        }
        fn mode(&self) -> Mode {
            Mode::Realtime
        }
        fn priority(&self) -> u32 {
            self.priority
        }
        fn run<'a>(&'a self, _ctx: PluginContext<'a>) -> BoxFuture<'a, PluginResult> {
            Box::pin(async { PluginResult::default() })
        }
    }

    #[test]
    fn ties_preserve_registration_order() {
        let mut plugins: Vec<Arc<dyn Plugin>> = vec![
            Arc::new(Stub { name: "b", priority: 100 }),
            Arc::new(Stub { name: "a", priority: 50 }),
            Arc::new(Stub { name: "c", priority: 100 }),
        ];
        stable_sort_by_priority(&mut plugins);
        let names: Vec<&str> = plugins.iter().map(|p| p.name()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }
}
