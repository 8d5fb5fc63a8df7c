use std::sync::OnceLock;

use tracing::subscriber::Interest;
use tracing::{Event, Metadata, Subscriber};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::Layer;

use super::record::{logger_name, LogRecord};
use super::registry::LogRegistry;
use crate::domain::models::Severity;

static INSTALLED: OnceLock<bool> = OnceLock::new();

/// Feeds `tracing` events into a [`LogRegistry`].
///
/// Filtering follows the registry's logger levels, which may change at any
/// time, so callsite interest is never cached.
#[derive(Debug, Clone, Copy)]
pub struct RegistryLayer {
    registry: &'static LogRegistry,
}

impl RegistryLayer {
    pub fn new(registry: &'static LogRegistry) -> Self {
        Self { registry }
    }

    /// Layer over the process-wide registry.
    pub fn global() -> Self {
        Self::new(LogRegistry::global())
    }
}

impl<S: Subscriber> Layer<S> for RegistryLayer {
    fn register_callsite(&self, _metadata: &'static Metadata<'static>) -> Interest {
        Interest::sometimes()
    }

    fn enabled(&self, metadata: &Metadata<'_>, _ctx: Context<'_, S>) -> bool {
        if !metadata.is_event() {
            return true;
        }
        self.registry.is_enabled_for(
            &logger_name(metadata.target()),
            Severity::level_no(metadata.level()),
        )
    }

    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        self.registry.dispatch(&LogRecord::from_event(event));
    }
}

/// Install the global registry as the process `tracing` subscriber.
///
/// Only the first call does anything. Returns `false` if another global
/// subscriber was already set, in which case records do not reach the
/// registry.
pub fn install() -> bool {
    *INSTALLED.get_or_init(|| {
        tracing_subscriber::registry()
            .with(RegistryLayer::global())
            .try_init()
            .is_ok()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::logging::format::RecordFormat;
    use crate::infrastructure::logging::handler::{Handler, MemoryBuffer};

    fn leaked_registry() -> &'static LogRegistry {
        Box::leak(Box::new(LogRegistry::new()))
    }

    #[test]
    fn test_events_reach_registry_handlers() {
        let registry = leaked_registry();
        let buffer = MemoryBuffer::new();
        registry.set_level("layer_test", Severity::Info);
        registry.add_handler(
            "layer_test",
            Handler::memory(
                buffer.clone(),
                RecordFormat::parse("%(levelname)s %(name)s %(message)s"),
            ),
        );

        let subscriber = tracing_subscriber::registry().with(RegistryLayer::new(registry));
        tracing::subscriber::with_default(subscriber, || {
            tracing::info!(target: "layer_test::inner", user = "ana", "signed in");
            tracing::debug!(target: "layer_test", "too verbose");
            tracing::error!(target: "layer_test", code = 7, "failed");
        });

        assert_eq!(
            buffer.lines(),
            vec![
                "INFO layer_test.inner signed in user=ana",
                "ERROR layer_test failed code=7",
            ]
        );
    }

    #[test]
    fn test_level_changes_apply_to_existing_callsites() {
        let registry = leaked_registry();
        let buffer = MemoryBuffer::new();
        registry.add_handler(
            "layer_dyn",
            Handler::memory(buffer.clone(), RecordFormat::parse("%(message)s")),
        );

        let subscriber = tracing_subscriber::registry().with(RegistryLayer::new(registry));
        tracing::subscriber::with_default(subscriber, || {
            for round in 0..2 {
                tracing::debug!(target: "layer_dyn", round, "tick");
                registry.set_level("layer_dyn", Severity::Debug);
            }
        });

        assert_eq!(buffer.lines(), vec!["tick round=1"]);
    }
}
