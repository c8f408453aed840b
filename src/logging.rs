//! Logging setup for the binary.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install a stderr subscriber. `RUST_LOG` overrides the default filter.
pub fn init_logging(verbose: bool) {
    let default_directive = if verbose {
        "sales_visualiser=debug"
    } else {
        "sales_visualiser=info"
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    let console_layer = fmt::layer().with_writer(std::io::stderr).with_target(false);

    // `try_init` so tests and repeated calls don't panic
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .try_init();
}
