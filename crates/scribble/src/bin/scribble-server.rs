//! Standalone Scribble server.
//!
//! Configured through the environment:
//!
//! - `SCRIBBLE_BIND` (default `0.0.0.0:42069`)
//! - `SCRIBBLE_ROUND_SECS` (default `80`)
//! - `SCRIBBLE_MAX_ROUNDS` (default `10`)
//! - `RUST_LOG` (default `info`)

use scribble::prelude::*;

#[tokio::main]
async fn main() -> Result<(), ScribbleError> {
    scribble::logging::init();

    let config = ServerConfig::from_env()?;
    tracing::info!(
        bind = %config.bind,
        round_secs = config.room.round_secs,
        max_rounds = config.room.max_rounds,
        "starting"
    );

    let server = ScribbleServer::builder().config(config).build().await?;
    tracing::info!(addr = %server.local_addr()?, "listening for players");

    tokio::select! {
        result = server.run() => result,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("shutting down");
            Ok(())
        }
    }
}
