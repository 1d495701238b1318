use tracing_subscriber::EnvFilter;

use crate::types::LogLevel;

/// Install the stderr subscriber. `RUST_LOG` overrides `--log-level`.
pub fn init(level: LogLevel) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "warn,spanweave={level},spanweave_engine={level},spanweave_providers={level}"
        ))
    });

    // A second init (e.g. from tests) is harmless.
    let _ = tracing_subscriber::fmt()
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .with_env_filter(filter)
        .try_init();
}
