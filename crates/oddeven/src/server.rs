//! `OddEvenServer` builder and accept loop.
//!
//! Ties the layers together: the WebSocket transport accepts connections,
//! each connection gets a handler task, and every handler talks to the one
//! session actor through a cloned [`SessionHandle`].

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use oddeven_protocol::{Codec, JsonCodec};
use oddeven_session::{spawn_session, SessionHandle};
use oddeven_transport::{Transport, WebSocketTransport};

use crate::handler::handle_connection;
use crate::{OddEvenError, ServerConfig};

/// Shared server state passed to each connection handler task.
pub(crate) struct ServerState<C: Codec> {
    pub(crate) session: SessionHandle,
    pub(crate) codec: C,
    pub(crate) idle_timeout: Option<Duration>,
}

/// Builder for configuring and starting an oddeven server.
///
/// # Example
///
/// ```rust,no_run
/// use oddeven::prelude::*;
///
/// # async fn start() -> Result<(), OddEvenError> {
/// let server = OddEvenServer::builder()
///     .bind("0.0.0.0:8080")
///     .build()
///     .await?;
/// server.run().await
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct OddEvenServerBuilder {
    config: ServerConfig,
}

impl OddEvenServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the whole configuration.
    pub fn config(mut self, config: ServerConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.config.bind_addr = addr.to_string();
        self
    }

    /// Closes connections that stay silent for longer than `timeout`.
    pub fn idle_timeout(mut self, timeout: Duration) -> Self {
        self.config.idle_timeout = Some(timeout);
        self
    }

    /// Binds the listener and starts the session actor, speaking JSON.
    pub async fn build(self) -> Result<OddEvenServer<JsonCodec>, OddEvenError> {
        self.build_with_codec(JsonCodec).await
    }

    /// Binds the listener and starts the session actor with `codec`.
    pub async fn build_with_codec<C: Codec + Clone>(
        self,
        codec: C,
    ) -> Result<OddEvenServer<C>, OddEvenError> {
        self.config.validate()?;
        let transport = WebSocketTransport::bind(&self.config.bind_addr).await?;
        let session = spawn_session(codec.clone(), self.config.command_buffer);

        let state = Arc::new(ServerState {
            session,
            codec,
            idle_timeout: self.config.idle_timeout,
        });

        Ok(OddEvenServer { transport, state })
    }
}

/// A bound oddeven server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct OddEvenServer<C: Codec> {
    transport: WebSocketTransport,
    state: Arc<ServerState<C>>,
}

impl OddEvenServer<JsonCodec> {
    /// Creates a new builder.
    ///
    /// The builder produces a JSON server by default; use
    /// [`OddEvenServerBuilder::build_with_codec`] for any other codec.
    pub fn builder() -> OddEvenServerBuilder {
        OddEvenServerBuilder::new()
    }
}

impl<C> OddEvenServer<C>
where
    C: Codec + Clone,
{
    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> Result<SocketAddr, OddEvenError> {
        Ok(self.transport.local_addr()?)
    }

    /// Returns a handle to the session actor.
    pub fn session(&self) -> SessionHandle {
        self.state.session.clone()
    }

    /// Runs the accept loop until the process is terminated.
    pub async fn run(self) -> Result<(), OddEvenError> {
        self.run_until(std::future::pending::<()>()).await
    }

    /// Runs the accept loop until `signal` resolves, then stops accepting
    /// and shuts the session down, which closes every open connection.
    pub async fn run_until<F>(mut self, signal: F) -> Result<(), OddEvenError>
    where
        F: Future,
    {
        let addr = self.local_addr()?;
        tracing::info!(%addr, "oddeven server listening");

        tokio::pin!(signal);
        loop {
            tokio::select! {
                _ = &mut signal => {
                    tracing::info!("shutdown signal received");
                    break;
                }
                accepted = self.transport.accept() => match accepted {
                    Ok(conn) => {
                        let state = Arc::clone(&self.state);
                        tokio::spawn(async move {
                            if let Err(e) = handle_connection(conn, state).await {
                                tracing::debug!(
                                    error = %e,
                                    "connection ended with error"
                                );
                            }
                        });
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "accept failed");
                    }
                },
            }
        }

        // The actor may already be gone; nothing left to close then.
        let _ = self.state.session.shutdown().await;
        tracing::info!("oddeven server stopped");
        Ok(())
    }
}
