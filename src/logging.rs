//! Diagnostic logging on stderr.
//!
//! User-facing output goes through [`crate::ui::Ui`]; this is for `-v` and
//! `RUST_LOG` troubleshooting only.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

pub fn init(verbose: bool) {
    let default_filter = if verbose { "ccc=debug" } else { "ccc=warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .without_time()
                .compact(),
        )
        .init();
}
