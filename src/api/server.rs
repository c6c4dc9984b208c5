use std::future::Future;

use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio::task::JoinSet;

use crate::api::websocket::accept_connection;
use crate::store::Store;

const SHUTDOWN_GRACE: tokio::time::Duration = tokio::time::Duration::from_secs(5);

/// Accepts connections until `shutdown` resolves, then asks every connection
/// to finish and waits up to five seconds before aborting the rest.
pub async fn serve<S, F>(listener: TcpListener, store: S, admin_secret: String, shutdown: F)
where
    S: Store,
    F: Future<Output = ()>,
{
    let (stop_tx, stop_rx) = watch::channel(false);
    let mut handles = JoinSet::new();
    tokio::pin!(shutdown);

    match listener.local_addr() {
        Ok(addr) => tracing::info!("Listening for TCP connections on {}", addr),
        Err(e) => tracing::warn!(error = %e, "listening on unknown address"),
    }

    loop {
        tokio::select! {
            accepted = listener.accept() => match accepted {
                Ok((stream, peer)) => {
                    tracing::info!("New connection from {}", peer);
                    handles.spawn(accept_connection(
                        stream,
                        store.clone(),
                        admin_secret.clone(),
                        stop_rx.clone(),
                    ));
                }
                Err(e) => tracing::warn!(error = %e, "failed to accept connection"),
            },
            _ = &mut shutdown => {
                tracing::info!("Shutdown requested, closing {} connections", handles.len());
                break;
            }
        }
    }

    let _ = stop_tx.send(true);

    let drain = async {
        while let Some(result) = handles.join_next().await {
            if let Err(e) = result {
                tracing::warn!("Connection task ended with error: {:?}", e);
            }
        }
    };
    if tokio::time::timeout(SHUTDOWN_GRACE, drain).await.is_err() {
        tracing::warn!("Timeout waiting for connections to close. Aborting remaining connections.");
        handles.abort_all();
    }

    tracing::info!("All connections closed.");
}
