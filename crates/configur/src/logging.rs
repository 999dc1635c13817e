use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Install a global tracing subscriber for applications embedding Configur.
///
/// Logs go to stdout in compact form. The `RUST_LOG` environment variable
/// selects the level, defaulting to "info"; use `configur=debug` to see
/// registrations and resolutions, `configur_fs=trace` for lock traffic.
///
/// # Errors
///
/// Fails if the filter is invalid or a global subscriber is already set.
pub fn init() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let fmt_layer = fmt::layer()
        .with_target(true)
        .with_level(true)
        .compact();

    let filter_layer = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("info"))?;

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}
