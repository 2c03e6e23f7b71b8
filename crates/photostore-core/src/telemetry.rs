//! Tracing initialization shared by all binaries.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_FILTER: &str = "info,photostore_bus=debug,\
photostore_storage=debug,photostore_vision=debug,photostore_web=debug,\
photostore_worker=debug,tower_http=debug";

/// Initialize tracing with an env-filter and the fmt layer.
///
/// `RUST_LOG` overrides the default filter.
pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into()))
        .with(tracing_subscriber::fmt::layer())
        .init();
}
