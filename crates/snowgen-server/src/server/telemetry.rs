//! Log output for the server.
//!
//! Everything goes through `tracing`. Spans and events are printed to the
//! console by `tracing_subscriber::fmt`, filtered with `RUST_LOG` (default
//! `info`). The core crate's `tracing` feature is enabled, so clock warnings
//! from the generator land here too.
//!
//! ```bash
//! RUST_LOG=snowgen=debug,info cargo run -p snowgen-server
//! ```

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

pub fn init_telemetry() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(
            tracing_subscriber::fmt::layer()
                .with_thread_ids(true)
                .with_line_number(true)
                .with_target(false)
                .with_timer(tracing_subscriber::fmt::time::ChronoLocal::rfc_3339())
                .with_file(true)
                .pretty(),
        )
        .try_init()?;

    Ok(())
}
