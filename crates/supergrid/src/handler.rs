//! Per-connection handler: handshake, writer task, and the read loop.
//!
//! Flow for each accepted socket:
//!   1. Websocket upgrade, then a `hello` frame within 5 seconds
//!   2. Authenticate the token → [`Party`], reply `welcome`
//!   3. Split the socket: a writer task drains this connection's event
//!      queue into the sink while the read loop forwards client events
//!      to the coordinator
//!   4. Socket close (or error) becomes the implicit `disconnect`
//!
//! The outbound queue is what lets the coordinator broadcast to a room
//! without ever touching a socket: it pushes events, the writer owns the
//! sink.

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use futures_util::stream::SplitStream;
use futures_util::{SinkExt, StreamExt};
use supergrid_protocol::{ClientEvent, Codec, ConnectionId, JsonCodec, ServerEvent};
use supergrid_room::CoordinatorHandle;
use supergrid_session::{Authenticator, Party};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::WebSocketStream;
use tokio_tungstenite::tungstenite::Message;

use crate::ServerError;

/// Counter for connection ids; transient, process-local.
static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(5);

type WsStream = WebSocketStream<TcpStream>;

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<A: Authenticator>(
    stream: TcpStream,
    addr: SocketAddr,
    auth: Arc<A>,
    coordinator: CoordinatorHandle,
) -> Result<(), ServerError> {
    let mut ws = tokio_tungstenite::accept_async(stream).await?;
    let conn = ConnectionId(NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed));
    let codec = JsonCodec;
    tracing::debug!(%conn, %addr, "websocket accepted");

    let party = match perform_handshake(&mut ws, &codec, auth.as_ref()).await {
        Ok(party) => party,
        Err(e) => {
            let _ = ws.close(None).await;
            return Err(e);
        }
    };
    tracing::info!(%conn, account = %party.account, name = %party.name, "party authenticated");

    let (mut sink, source) = ws.split();

    // The connection's outbound queue. The coordinator holds the sender
    // from attach until disconnect; this task's writer drains it.
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerEvent>();
    let writer = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            let bytes = match codec.encode(&event) {
                Ok(bytes) => bytes,
                Err(e) => {
                    tracing::warn!(error = %e, "dropping unencodable event");
                    continue;
                }
            };
            if sink.send(Message::Binary(bytes.into())).await.is_err() {
                break;
            }
        }
        let _ = sink.close().await;
    });

    coordinator.attach(conn, party, tx).await?;

    let result = read_loop(conn, source, &codec, &coordinator).await;

    // The socket is gone either way: run the implicit disconnect, then
    // let the writer finish once the coordinator drops our sender.
    if coordinator.disconnect(conn).await.is_err() {
        writer.abort();
    }
    let _ = writer.await;
    result
}

/// Receives the `hello`, authenticates, and acks with `welcome`.
async fn perform_handshake<A: Authenticator>(
    ws: &mut WsStream,
    codec: &JsonCodec,
    auth: &A,
) -> Result<Party, ServerError> {
    let data = match tokio::time::timeout(HANDSHAKE_TIMEOUT, next_frame(ws)).await {
        Ok(Ok(Some(data))) => data,
        Ok(Ok(None)) => {
            return Err(ServerError::Handshake("closed before hello".into()));
        }
        Ok(Err(e)) => return Err(e),
        Err(_) => return Err(ServerError::Handshake("hello timed out".into())),
    };

    let event: ClientEvent = codec.decode(&data)?;
    let ClientEvent::Hello { token } = event else {
        return Err(ServerError::Handshake("first event must be hello".into()));
    };

    let party = auth.authenticate(&token).await?;

    let welcome = ServerEvent::Welcome {
        account: party.account.clone(),
        name: party.name.clone(),
        guest: party.guest,
    };
    ws.send(Message::Binary(codec.encode(&welcome)?.into()))
        .await?;

    Ok(party)
}

/// Forwards decoded client events to the coordinator until the socket
/// closes. Malformed frames are skipped, not fatal.
async fn read_loop(
    conn: ConnectionId,
    mut source: SplitStream<WsStream>,
    codec: &JsonCodec,
    coordinator: &CoordinatorHandle,
) -> Result<(), ServerError> {
    while let Some(message) = source.next().await {
        let data = match message {
            Ok(Message::Binary(data)) => data.to_vec(),
            Ok(Message::Text(text)) => text.as_bytes().to_vec(),
            Ok(Message::Close(_)) => break,
            Ok(_) => continue, // ping/pong/frame
            Err(e) => {
                tracing::debug!(%conn, error = %e, "recv error");
                break;
            }
        };

        let event: ClientEvent = match codec.decode(&data) {
            Ok(event) => event,
            Err(e) => {
                tracing::debug!(%conn, error = %e, "undecodable client event, skipping");
                continue;
            }
        };

        dispatch(conn, event, coordinator).await?;
    }
    tracing::info!(%conn, "connection closed");
    Ok(())
}

/// One client event becomes one coordinator command.
async fn dispatch(
    conn: ConnectionId,
    event: ClientEvent,
    coordinator: &CoordinatorHandle,
) -> Result<(), ServerError> {
    match event {
        ClientEvent::Hello { .. } => {
            tracing::debug!(%conn, "ignoring repeated hello");
            Ok(())
        }
        ClientEvent::Create => coordinator.create(conn).await,
        ClientEvent::Join { room } => coordinator.join(conn, room).await,
        ClientEvent::Ready { room } => coordinator.ready(conn, room).await,
        ClientEvent::Move { room, board, cell } => {
            coordinator.play_move(conn, room, board, cell).await
        }
        // The client's claimed symbol is ignored; the seat binding is
        // authoritative.
        ClientEvent::Resign { room, .. } => coordinator.resign(conn, room).await,
        ClientEvent::Rematch { room } => coordinator.rematch(conn, room).await,
        ClientEvent::Chat { room, message } => coordinator.chat(conn, room, message).await,
    }
    .map_err(ServerError::from)
}

/// Next data frame from the unsplit socket; used only during handshake.
async fn next_frame(ws: &mut WsStream) -> Result<Option<Vec<u8>>, ServerError> {
    while let Some(message) = ws.next().await {
        match message? {
            Message::Binary(data) => return Ok(Some(data.to_vec())),
            Message::Text(text) => return Ok(Some(text.as_bytes().to_vec())),
            Message::Close(_) => return Ok(None),
            _ => continue,
        }
    }
    Ok(None)
}
