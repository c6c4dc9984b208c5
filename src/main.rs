use anyhow::Context;
use clap::Parser;
use island_builder::{
    api,
    config::Args,
    instrumentation,
    store::{MemoryStore, Seed},
};

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    instrumentation::init_tracing_subscriber(args.log_format)?;
    tracing::info!("Starting the island server...");

    let seed = Seed::load(&args.seed)?;
    let store = MemoryStore::from_seed(seed);

    let listener = tokio::net::TcpListener::bind(args.listen)
        .await
        .with_context(|| format!("failed to bind to address {}", args.listen))?;

    let shutdown = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => tracing::info!("Received Ctrl+C, stopping server..."),
            Err(e) => {
                tracing::error!("Unable to listen for shutdown signal: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    api::serve(listener, store, args.admin_secret, shutdown).await;

    tracing::info!("Server stopped.");
    Ok(())
}
