//! ODD/EVEN game server.
//!
//! Listens on `ODDEVEN_ADDR`, or `0.0.0.0:$PORT`, or `0.0.0.0:8080`.
//! Log filtering follows `RUST_LOG` (default `info`). Ctrl-C stops accepting
//! and closes every open connection.

use oddeven::prelude::*;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = ServerConfig::from_env()?;
    tracing::info!(
        bind = %config.bind_addr,
        idle_timeout = ?config.idle_timeout,
        "starting oddeven server"
    );

    let server = OddEvenServer::builder().config(config).build().await?;
    server
        .run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "failed to listen for ctrl-c");
            }
        })
        .await?;
    Ok(())
}
