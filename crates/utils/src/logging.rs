use tracing_subscriber::{EnvFilter, prelude::*};

/// Directive used when `RUST_LOG` is unset or unparsable
pub const DEFAULT_LOG_FILTER: &str = "info,server=debug,services=debug,db=info";

/// Install the global tracing subscriber. Safe to call more than once; later
/// calls are ignored.
pub fn init_tracing(default_filter: &str) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .try_init();
}
