use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum LogFormat {
    Pretty,
    Json,
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Installs the global subscriber. `RUST_LOG` selects levels, `info` when unset.
pub fn init_tracing_subscriber(format: LogFormat) -> Result<(), anyhow::Error> {
    let builder = tracing_subscriber::fmt().with_env_filter(env_filter());

    match format {
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Json => builder.json().try_init(),
    }
    .map_err(|e| anyhow::anyhow!("failed to set global subscriber: {e}"))
}
