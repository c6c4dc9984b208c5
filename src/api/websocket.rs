use futures_util::{SinkExt, Stream, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, watch};
use tokio_tungstenite::tungstenite::{
    self, Message,
    handshake::server::{ErrorResponse, Request, Response},
};

use crate::api::admin::AdminEndpoint;
use crate::api::model::{ApiRequest, ServerMessage};
use crate::api::player::PlayerSession;
use crate::island::Island;
use crate::store::Store;
use crate::store::feed::next_change;

pub const ADMIN_PATH: &str = "/admin";

/// Which page a connection belongs to, chosen by the handshake path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Surface {
    Player,
    Admin,
}

impl Surface {
    pub fn from_path(path: &str) -> Self {
        if path.trim_end_matches('/') == ADMIN_PATH {
            Surface::Admin
        } else {
            Surface::Player
        }
    }
}

#[derive(Debug)]
enum Incoming {
    Request(ApiRequest),
    Malformed(String),
    Skip,
    Closed,
}

fn decode(message: Option<Result<Message, tungstenite::Error>>) -> Incoming {
    match message {
        None | Some(Ok(Message::Close(_))) => Incoming::Closed,
        Some(Err(e)) => {
            tracing::error!(error = %e, "error reading message");
            Incoming::Closed
        }
        Some(Ok(Message::Text(text))) => match serde_json::from_str::<ApiRequest>(text.as_str()) {
            Ok(request) => Incoming::Request(request),
            Err(e) => Incoming::Malformed(format!("malformed request: {e}")),
        },
        Some(Ok(_)) => Incoming::Skip,
    }
}

async fn send_all(tx: &mpsc::Sender<ServerMessage>, frames: Vec<ServerMessage>) -> bool {
    for frame in frames {
        if tx.send(frame).await.is_err() {
            tracing::debug!("response writer closed");
            return false;
        }
    }
    true
}

pub async fn accept_connection<S: Store>(
    stream: TcpStream,
    store: S,
    admin_secret: String,
    shutdown: watch::Receiver<bool>,
) {
    let addr = stream
        .peer_addr()
        .map(|a| a.to_string())
        .unwrap_or_else(|_| "unknown".to_string());
    let mut surface = Surface::Player;

    let callback = |req: &Request, response: Response| {
        surface = Surface::from_path(req.uri().path());
        Ok::<Response, ErrorResponse>(response)
    };

    let ws_stream = match tokio_tungstenite::accept_hdr_async(stream, callback).await {
        Ok(stream) => stream,
        Err(e) => {
            tracing::error!("WebSocket handshake failed for address {}: {}", addr, e);
            return;
        }
    };

    tracing::debug!(%addr, ?surface, "accepted connection");

    let (mut write, read) = ws_stream.split();
    let (response_tx, mut response_rx) = mpsc::channel::<ServerMessage>(100);

    let writer = tokio::spawn(async move {
        while let Some(frame) = response_rx.recv().await {
            let text = match serde_json::to_string(&frame) {
                Ok(text) => text,
                Err(e) => {
                    tracing::error!(error = %e, "failed to encode frame");
                    continue;
                }
            };
            if let Err(e) = write.send(Message::Text(text.into())).await {
                tracing::warn!(error = %e, "failed to send frame");
                break;
            }
        }
        let _ = write.close().await;
    });

    match surface {
        Surface::Player => run_player(read, response_tx, store, shutdown).await,
        Surface::Admin => {
            let endpoint = AdminEndpoint::new(store, admin_secret);
            run_admin(read, response_tx, endpoint, shutdown).await
        }
    }

    if let Err(e) = writer.await {
        tracing::warn!(error = %e, "response writer ended abnormally");
    }
    tracing::debug!(%addr, "connection closed");
}

async fn run_player<R, S>(
    mut read: R,
    tx: mpsc::Sender<ServerMessage>,
    store: S,
    mut shutdown: watch::Receiver<bool>,
) where
    R: Stream<Item = Result<Message, tungstenite::Error>> + Unpin,
    S: Store,
{
    let mut feed = store.subscribe_teams();
    let island = match Island::load(store).await {
        Ok(island) => island,
        Err(e) => {
            tracing::error!(error = %e, "failed to load island");
            send_all(&tx, vec![ServerMessage::error(None, e)]).await;
            return;
        }
    };
    let mut session = PlayerSession::new(island);

    if !send_all(&tx, vec![session.view_event()]).await {
        return;
    }

    let mut feed_open = true;
    loop {
        let frames = tokio::select! {
            message = read.next() => match decode(message) {
                Incoming::Request(request) => {
                    tracing::debug!(method = %request.method, id = %request.id, "player request");
                    session.dispatch(request).await
                }
                Incoming::Malformed(e) => vec![ServerMessage::error(None, e)],
                Incoming::Skip => continue,
                Incoming::Closed => break,
            },
            change = next_change(&mut feed), if feed_open => match change {
                Some(team) => session.on_team_change(team),
                None => {
                    tracing::warn!("team feed closed");
                    feed_open = false;
                    continue;
                }
            },
            _ = shutdown.changed() => break,
        };

        if !send_all(&tx, frames).await {
            break;
        }
    }
}

async fn run_admin<R, S>(
    mut read: R,
    tx: mpsc::Sender<ServerMessage>,
    mut endpoint: AdminEndpoint<S>,
    mut shutdown: watch::Receiver<bool>,
) where
    R: Stream<Item = Result<Message, tungstenite::Error>> + Unpin,
    S: Store,
{
    if !send_all(&tx, vec![endpoint.view_event()]).await {
        return;
    }

    loop {
        let frames = tokio::select! {
            message = read.next() => match decode(message) {
                Incoming::Request(request) => {
                    tracing::debug!(method = %request.method, id = %request.id, "admin request");
                    endpoint.dispatch(request).await
                }
                Incoming::Malformed(e) => vec![ServerMessage::error(None, e)],
                Incoming::Skip => continue,
                Incoming::Closed => break,
            },
            _ = shutdown.changed() => break,
        };

        if !send_all(&tx, frames).await {
            break;
        }
    }
}
