//! Per-connection handler: seat the connection, pump frames, clean up.
//!
//! Each accepted connection gets its own Tokio task running this handler,
//! plus a writer task that drains the connection's outbound queue:
//!   1. Spawn the writer, then ask the session to seat the connection
//!   2. Loop: receive frames → forward them to the session actor
//!   3. On exit report the disconnect before returning; a drop guard
//!      covers the panic path

use std::sync::Arc;

use oddeven_protocol::Codec;
use oddeven_session::{Outbound, SessionHandle};
use oddeven_transport::{Connection, ConnectionId, WebSocketConnection};
use tokio::sync::mpsc;

use crate::server::ServerState;
use crate::OddEvenError;

/// Drop guard that reports the disconnect if the handler unwinds.
///
/// The normal exit path disarms it and awaits the disconnect inline, so the
/// seat is free before the handler returns. `Drop` is synchronous, so the
/// fallback send happens in a fire-and-forget task.
struct DisconnectGuard {
    conn_id: ConnectionId,
    session: SessionHandle,
    armed: bool,
}

impl DisconnectGuard {
    fn new(conn_id: ConnectionId, session: SessionHandle) -> Self {
        Self {
            conn_id,
            session,
            armed: true,
        }
    }

    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for DisconnectGuard {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let conn_id = self.conn_id;
        let session = self.session.clone();
        tokio::spawn(async move {
            let _ = session.disconnect(conn_id).await;
        });
    }
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<C>(
    conn: WebSocketConnection,
    state: Arc<ServerState<C>>,
) -> Result<(), OddEvenError>
where
    C: Codec + Clone,
{
    let conn_id = conn.id();
    tracing::debug!(%conn_id, peer = %conn.peer_addr(), "handling new connection");

    let conn = Arc::new(conn);
    let (tx, rx) = mpsc::unbounded_channel();
    let writer = tokio::spawn(write_loop(
        Arc::clone(&conn),
        rx,
        state.codec.clone(),
    ));

    // On rejection the session has queued ERROR + Close, or dropped the
    // sender; either way the writer finishes and closes the socket.
    if let Err(e) = state.session.connect(conn_id, tx).await {
        let _ = writer.await;
        return Err(e.into());
    }
    let mut guard = DisconnectGuard::new(conn_id, state.session.clone());

    let result = read_loop(&conn, conn_id, &state).await;

    // Seat released before returning. The session drops the sender and the
    // writer closes the socket.
    guard.disarm();
    if let Err(e) = state.session.disconnect(conn_id).await {
        tracing::debug!(%conn_id, error = %e, "disconnect not delivered");
    }
    result
}

/// Forwards frames to the session until the peer goes away or idles out.
async fn read_loop<C>(
    conn: &WebSocketConnection,
    conn_id: ConnectionId,
    state: &ServerState<C>,
) -> Result<(), OddEvenError>
where
    C: Codec,
{
    loop {
        let received = match state.idle_timeout {
            Some(limit) => {
                match tokio::time::timeout(limit, conn.recv()).await {
                    Ok(received) => received,
                    Err(_) => {
                        tracing::info!(%conn_id, "connection idle, closing");
                        return Ok(());
                    }
                }
            }
            None => conn.recv().await,
        };

        let data = match received {
            Ok(Some(data)) => data,
            Ok(None) => {
                tracing::info!(%conn_id, "connection closed cleanly");
                return Ok(());
            }
            Err(e) => {
                tracing::debug!(%conn_id, error = %e, "recv error");
                return Ok(());
            }
        };

        state.session.inbound(conn_id, data).await?;
    }
}

/// Encodes and sends everything queued for one connection, in order.
async fn write_loop<C: Codec>(
    conn: Arc<WebSocketConnection>,
    mut rx: mpsc::UnboundedReceiver<Outbound>,
    codec: C,
) {
    let conn_id = conn.id();

    while let Some(outbound) = rx.recv().await {
        let msg = match outbound {
            Outbound::Message(msg) => msg,
            Outbound::Close => break,
        };
        let bytes = match codec.encode(&msg) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::debug!(%conn_id, error = %e, kind = msg.kind(), "encode failed");
                continue;
            }
        };
        if let Err(e) = conn.send(&bytes).await {
            tracing::debug!(%conn_id, error = %e, "send failed");
            break;
        }
    }

    if let Err(e) = conn.close().await {
        tracing::trace!(%conn_id, error = %e, "close failed");
    }
}
