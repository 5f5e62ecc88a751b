//! Structured logging setup.
//!
//! Log verbosity is controlled via `RUST_LOG` (e.g. `RUST_LOG=fedctl=debug`).

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize the tracing subscriber.
///
/// Defaults to `info` for this crate and `warn` for dependencies when
/// `RUST_LOG` is unset.
pub fn init_telemetry() -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn,fedctl=info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init()?;

    Ok(())
}
